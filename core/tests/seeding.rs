//! Seed data tests: demo org idempotence and synthetic determinism.

use chrono::{TimeZone, Utc};
use orgalerts_core::{
    hierarchy::{subtree_reports, OrgChart},
    pipeline::AlertPredicate,
    query::PageWindow,
    seed::{seed_demo, seed_synthetic, SeedSummary, SyntheticOrg},
    store::AlertStore,
};
use std::collections::BTreeSet;

fn store() -> AlertStore {
    let store = AlertStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store
}

fn all_alert_ids(store: &AlertStore) -> Vec<(String, String)> {
    let everyone: BTreeSet<String> = store
        .all_employees()
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect();
    let no_filters: [AlertPredicate; 0] = [];
    let (alerts, _) = store
        .query_alerts(&everyone, &no_filters, PageWindow { offset: 0, limit: 100_000 })
        .unwrap();
    alerts.into_iter().map(|a| (a.id, a.employee.id)).collect()
}

#[test]
fn demo_seed_is_idempotent() {
    let store = store();
    let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();

    let first = seed_demo(&store, now).unwrap();
    assert_eq!(first, SeedSummary { employees: 3, alerts: 2 });

    let second = seed_demo(&store, now).unwrap();
    assert_eq!(second, SeedSummary::default(), "re-seeding must not write");
    assert_eq!(store.employee_count().unwrap(), 3);
    assert_eq!(store.alert_count().unwrap(), 2);
}

#[test]
fn migrate_is_repeatable() {
    let store = store();
    store.migrate().expect("second migration");
    assert_eq!(store.employee_count().unwrap(), 0);
}

#[test]
fn synthetic_org_is_a_single_tree() {
    let store = store();
    let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
    let org = SyntheticOrg { seed: 3, employees: 75, alerts: 300, span_days: 14 };
    let summary = seed_synthetic(&store, &org, now).unwrap();

    assert_eq!(summary, SeedSummary { employees: 75, alerts: 300 });
    assert_eq!(subtree_reports(&store, "SYN0001").unwrap().len(), 74);

    let chart = OrgChart::load(&store).unwrap();
    assert_eq!(chart.len(), 75);
    let tree = chart.render_tree("SYN0001");
    assert_eq!(tree.lines().count(), 75);
    assert!(!tree.contains("(cycle)"));
}

#[test]
fn same_seed_produces_identical_orgs() {
    let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
    let org = SyntheticOrg { seed: 0xDEAD_BEEF, employees: 40, alerts: 120, span_days: 30 };

    let a = store();
    let b = store();
    seed_synthetic(&a, &org, now).unwrap();
    seed_synthetic(&b, &org, now).unwrap();

    assert_eq!(a.all_employees().unwrap(), b.all_employees().unwrap());
    assert_eq!(all_alert_ids(&a), all_alert_ids(&b));
}

#[test]
fn different_seeds_produce_different_orgs() {
    let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
    let a = store();
    let b = store();
    seed_synthetic(&a, &SyntheticOrg { seed: 1, ..Default::default() }, now).unwrap();
    seed_synthetic(&b, &SyntheticOrg { seed: 2, ..Default::default() }, now).unwrap();

    assert_ne!(a.all_employees().unwrap(), b.all_employees().unwrap());
}
