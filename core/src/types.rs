//! Shared primitive types used across the crate.

/// Opaque, stable identifier of an employee (e.g. `"MGR001"`).
pub type EmployeeId = String;

/// Opaque, stable identifier of an alert (e.g. `"ALT001"`).
pub type AlertId = String;
