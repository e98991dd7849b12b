//! Subtree resolver tests against the SQLite store.
//!
//! Covers direct vs subtree scope, corrupted (cyclic) hierarchies,
//! orphaning on manager deletion, and agreement with an independent
//! ancestor-walk oracle over generated org charts.

use orgalerts_core::{
    hierarchy::{direct_reports, resolve_scope, subtree_reports, OrgChart},
    model::Employee,
    query::Scope,
    seed::{seed_synthetic, SyntheticOrg},
    store::AlertStore,
    types::EmployeeId,
};
use chrono::{TimeZone, Utc};
use std::collections::{BTreeSet, HashMap};

fn store() -> AlertStore {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = AlertStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store
}

fn add(store: &AlertStore, id: &str, boss: Option<&str>) {
    store
        .insert_employee(&Employee::new(id, format!("Employee {id}"), boss))
        .expect("insert employee");
}

fn ids(v: &[&str]) -> BTreeSet<EmployeeId> {
    v.iter().map(|s| s.to_string()).collect()
}

/// Everyone whose chain of managers passes through `root`.
fn reachable_by_ancestor_walk(employees: &[Employee], root: &str) -> BTreeSet<EmployeeId> {
    let parent: HashMap<&str, Option<&str>> = employees
        .iter()
        .map(|e| (e.id.as_str(), e.reports_to.as_deref()))
        .collect();
    employees
        .iter()
        .filter(|e| e.id != root)
        .filter(|e| {
            let mut current = e.reports_to.as_deref();
            // A chain longer than the org can only be a cycle.
            for _ in 0..=employees.len() {
                match current {
                    Some(id) if id == root => return true,
                    Some(id) => current = parent.get(id).copied().flatten(),
                    None => return false,
                }
            }
            false
        })
        .map(|e| e.id.clone())
        .collect()
}

#[test]
fn direct_and_subtree_scopes() {
    let store = store();
    add(&store, "MGR001", None);
    add(&store, "EMP002", Some("MGR001"));
    add(&store, "EMP003", Some("MGR001"));
    add(&store, "EMP004", Some("EMP002"));
    add(&store, "EMP005", Some("EMP004"));

    assert_eq!(direct_reports(&store, "MGR001").unwrap(), ids(&["EMP002", "EMP003"]));
    assert_eq!(
        subtree_reports(&store, "MGR001").unwrap(),
        ids(&["EMP002", "EMP003", "EMP004", "EMP005"])
    );
    assert_eq!(subtree_reports(&store, "EMP002").unwrap(), ids(&["EMP004", "EMP005"]));
}

#[test]
fn subtree_equals_direct_when_reports_are_leaves() {
    let store = store();
    add(&store, "M", None);
    add(&store, "A", Some("M"));
    add(&store, "B", Some("M"));

    let direct = direct_reports(&store, "M").unwrap();
    let subtree = subtree_reports(&store, "M").unwrap();
    assert_eq!(direct, subtree);
}

#[test]
fn three_cycle_through_root_terminates() {
    let store = store();
    add(&store, "A", None);
    add(&store, "B", Some("A"));
    add(&store, "C", Some("B"));
    // Corrupt the chart: A now reports to C.
    store.set_reports_to("A", Some("C")).unwrap();

    assert_eq!(subtree_reports(&store, "A").unwrap(), ids(&["B", "C"]));
    assert_eq!(subtree_reports(&store, "B").unwrap(), ids(&["C", "A"]));
    assert_eq!(direct_reports(&store, "A").unwrap(), ids(&["B"]));
}

#[test]
fn leaf_manager_scope_is_empty_not_an_error() {
    let store = store();
    add(&store, "M", None);
    add(&store, "LEAF", Some("M"));

    for scope in [Scope::Direct, Scope::Subtree] {
        let scoped = resolve_scope(&store, "LEAF", scope).unwrap();
        assert!(scoped.is_empty(), "{scope:?} scope of a leaf should be empty");
    }
}

#[test]
fn unknown_manager_is_not_found() {
    let store = store();
    let err = resolve_scope(&store, "GHOST", Scope::Direct).unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

#[test]
fn deleting_a_manager_orphans_their_reports() {
    let store = store();
    add(&store, "TOP", None);
    add(&store, "MID", Some("TOP"));
    add(&store, "LOW", Some("MID"));

    store.delete_employee("MID").unwrap();

    let low = store.get_employee("LOW").unwrap().expect("LOW survives");
    assert_eq!(low.reports_to, None);
    assert!(subtree_reports(&store, "TOP").unwrap().is_empty());
    assert_eq!(store.employee_count().unwrap(), 2);
}

#[test]
fn subtree_matches_ancestor_walk_on_generated_orgs() {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    for seed in 1..=5u64 {
        let store = store();
        let org = SyntheticOrg { seed, employees: 60, alerts: 0, span_days: 1 };
        seed_synthetic(&store, &org, now).unwrap();
        let employees = store.all_employees().unwrap();
        let chart = OrgChart::load(&store).unwrap();

        for e in &employees {
            let expected = reachable_by_ancestor_walk(&employees, &e.id);
            let from_store = subtree_reports(&store, &e.id).unwrap();
            let from_chart = subtree_reports(&chart, &e.id).unwrap();
            assert_eq!(from_store, expected, "seed {seed}: subtree of {} diverged", e.id);
            assert_eq!(from_chart, from_store, "seed {seed}: snapshot and store disagree");

            let direct = direct_reports(&store, &e.id).unwrap();
            assert!(direct.is_subset(&from_store), "direct reports must be in the subtree");
        }
    }
}

#[test]
fn cycle_injected_into_generated_org_is_tolerated() {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let store = store();
    let org = SyntheticOrg { seed: 99, employees: 40, alerts: 0, span_days: 1 };
    seed_synthetic(&store, &org, now).unwrap();

    // Point the root at the last employee, closing a loop through it.
    store.set_reports_to("SYN0001", Some("SYN0040")).unwrap();

    let everyone_else: BTreeSet<EmployeeId> =
        (2..=40).map(|i| format!("SYN{i:04}")).collect();
    assert_eq!(subtree_reports(&store, "SYN0001").unwrap(), everyone_else);

    let employees = store.all_employees().unwrap();
    for e in &employees {
        assert_eq!(
            subtree_reports(&store, &e.id).unwrap(),
            reachable_by_ancestor_walk(&employees, &e.id),
            "subtree of {} diverged after cycle injection",
            e.id
        );
    }
}
