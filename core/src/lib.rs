//! Manager-facing alert desk over a self-referential org chart.
//!
//! A manager lists the alerts raised against their direct reports or
//! their whole reporting subtree, filtered, ordered newest first and
//! paginated, and dismisses alerts one at a time.

pub mod config;
pub mod error;
pub mod hierarchy;
pub mod model;
pub mod name_generator;
pub mod pipeline;
pub mod query;
pub mod rng;
pub mod seed;
pub mod service;
pub mod store;
pub mod types;
