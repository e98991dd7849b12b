//! Seed data: the fixed demo org and deterministic synthetic orgs.
//!
//! Both seeders only insert rows that are not already present, so
//! running them twice leaves the database unchanged.

use crate::{
    error::AlertResult,
    model::{AlertStatus, Employee, NewAlert, Severity},
    name_generator::NameGenerator,
    rng::{SeedRng, SeedStream},
    store::AlertStore,
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Rows actually written by a seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub employees: usize,
    pub alerts:    usize,
}

/// `MGR001 -> EMP002, EMP003`, with one open alert each, both
/// stamped `now` (ties order by id).
pub fn seed_demo(store: &AlertStore, now: DateTime<Utc>) -> AlertResult<SeedSummary> {
    let employees = [
        Employee::new("MGR001", "Jane Manager", None),
        Employee::new("EMP002", "John Employee", Some("MGR001")),
        Employee::new("EMP003", "Sarah Employee", Some("MGR001")),
    ];
    let alerts = [
        NewAlert::new("ALT001", "EMP002", Severity::High, "Missed check-in", now),
        NewAlert::new("ALT002", "EMP003", Severity::Medium, "Performance alert", now),
    ];

    let summary = store.with_transaction(|s| {
        let mut summary = SeedSummary::default();
        for e in &employees {
            if s.insert_employee_if_absent(e)? {
                summary.employees += 1;
            }
        }
        for a in &alerts {
            if s.insert_alert_if_absent(a)? {
                summary.alerts += 1;
            }
        }
        Ok(summary)
    })?;
    log::info!(
        "Demo seed wrote {} employees, {} alerts",
        summary.employees,
        summary.alerts
    );
    Ok(summary)
}

/// Shape of a synthetic org.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticOrg {
    pub seed:      u64,
    pub employees: usize,
    pub alerts:    usize,
    /// Alerts are spread over this many days before `now`.
    pub span_days: i64,
}

impl Default for SyntheticOrg {
    fn default() -> Self {
        Self { seed: 42, employees: 50, alerts: 200, span_days: 30 }
    }
}

/// Build a random but reproducible org chart under a single root
/// (`SYN0001`), then scatter alerts over it.
///
/// Every employee after the root reports to a uniformly chosen earlier
/// one, so the generated hierarchy is always a tree.
pub fn seed_synthetic(
    store: &AlertStore,
    org: &SyntheticOrg,
    now: DateTime<Utc>,
) -> AlertResult<SeedSummary> {
    let mut names = SeedRng::new(org.seed, SeedStream::Names);
    let mut shape = SeedRng::new(org.seed, SeedStream::Hierarchy);
    let mut draws = SeedRng::new(org.seed, SeedStream::Alerts);

    let ids: Vec<String> = (1..=org.employees).map(|i| format!("SYN{i:04}")).collect();
    let span_minutes = (org.span_days.max(1) * 24 * 60) as u64;

    let summary = store.with_transaction(|s| {
        let mut summary = SeedSummary::default();

        for (i, id) in ids.iter().enumerate() {
            let manager = (i > 0).then(|| ids[shape.index(i)].as_str());
            let employee = Employee::new(id.as_str(), NameGenerator::full_name(&mut names), manager);
            if s.insert_employee_if_absent(&employee)? {
                summary.employees += 1;
            }
        }

        if ids.is_empty() {
            return Ok(summary);
        }
        for n in 1..=org.alerts {
            let roll = draws.next_f64();
            let severity = if roll < 0.5 {
                Severity::Low
            } else if roll < 0.85 {
                Severity::Medium
            } else {
                Severity::High
            };
            let age = Duration::minutes(draws.next_u64_below(span_minutes) as i64);
            let mut alert = NewAlert::new(
                format!("SYNALT{n:05}"),
                ids[draws.index(ids.len())].as_str(),
                severity,
                NameGenerator::alert_category(&mut draws),
                now - age,
            );
            if draws.chance(0.2) {
                alert.status = AlertStatus::Dismissed;
            }
            if s.insert_alert_if_absent(&alert)? {
                summary.alerts += 1;
            }
        }
        Ok(summary)
    })?;

    log::info!(
        "Synthetic seed {} wrote {} employees, {} alerts",
        org.seed,
        summary.employees,
        summary.alerts
    );
    Ok(summary)
}
