//! Org-chart traversal.
//!
//! The hierarchy is a self-referential `reports_to` graph. Bad data can
//! make it cyclic, so traversal works on ids with an explicit visited
//! set and an explicit queue. It never recurses and never follows the
//! same id twice.

use crate::{
    error::{AlertError, AlertResult},
    model::Employee,
    query::Scope,
    store::AlertStore,
    types::EmployeeId,
};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// Read access to the parent → children edges of the org chart.
pub trait ReportingLines {
    fn contains_employee(&self, id: &str) -> AlertResult<bool>;

    /// Ids whose `reports_to` is `manager_id`.
    fn direct_report_ids(&self, manager_id: &str) -> AlertResult<Vec<EmployeeId>>;
}

impl ReportingLines for AlertStore {
    fn contains_employee(&self, id: &str) -> AlertResult<bool> {
        Ok(self.get_employee(id)?.is_some())
    }

    fn direct_report_ids(&self, manager_id: &str) -> AlertResult<Vec<EmployeeId>> {
        AlertStore::direct_report_ids(self, manager_id)
    }
}

pub fn direct_reports<R>(lines: &R, manager_id: &str) -> AlertResult<BTreeSet<EmployeeId>>
where
    R: ReportingLines + ?Sized,
{
    Ok(lines.direct_report_ids(manager_id)?.into_iter().collect())
}

/// Everyone reachable from `manager_id` by following reporting edges
/// down any number of hops, excluding the manager.
///
/// Breadth-first with a visited set seeded with the manager, so each
/// id is expanded at most once: O(V + E) over the reachable subgraph
/// even when a cycle leads back to the root.
pub fn subtree_reports<R>(lines: &R, manager_id: &str) -> AlertResult<BTreeSet<EmployeeId>>
where
    R: ReportingLines + ?Sized,
{
    let mut visited: HashSet<EmployeeId> = HashSet::new();
    visited.insert(manager_id.to_string());

    let mut frontier: VecDeque<EmployeeId> = lines.direct_report_ids(manager_id)?.into();
    let mut result = BTreeSet::new();
    let mut revisits = 0usize;

    while let Some(id) = frontier.pop_front() {
        if !visited.insert(id.clone()) {
            revisits += 1;
            continue;
        }
        for child in lines.direct_report_ids(&id)? {
            if !visited.contains(&child) {
                frontier.push_back(child);
            } else {
                revisits += 1;
            }
        }
        result.insert(id);
    }

    if revisits > 0 {
        log::warn!(
            "Reporting lines under {manager_id} revisit {revisits} employee(s); hierarchy has a cycle"
        );
    }
    log::debug!("Subtree of {manager_id}: {} employees", result.len());
    Ok(result)
}

/// Resolve the employee ids a listing covers. Fails with `NotFound`
/// before any traversal when the manager does not exist.
pub fn resolve_scope<R>(lines: &R, manager_id: &str, scope: Scope) -> AlertResult<BTreeSet<EmployeeId>>
where
    R: ReportingLines + ?Sized,
{
    if !lines.contains_employee(manager_id)? {
        return Err(AlertError::not_found("employee", manager_id));
    }
    match scope {
        Scope::Direct  => direct_reports(lines, manager_id),
        Scope::Subtree => subtree_reports(lines, manager_id),
    }
}

// ── In-memory snapshot ───────────────────────────────────────────────────────

/// Id-keyed adjacency snapshot of the whole org chart.
#[derive(Debug, Clone, Default)]
pub struct OrgChart {
    names:    HashMap<EmployeeId, String>,
    children: HashMap<EmployeeId, Vec<EmployeeId>>,
}

impl OrgChart {
    pub fn from_employees(employees: impl IntoIterator<Item = Employee>) -> Self {
        let mut chart = Self::default();
        for e in employees {
            if let Some(manager) = e.reports_to {
                chart.children.entry(manager).or_default().push(e.id.clone());
            }
            chart.names.insert(e.id, e.name);
        }
        for kids in chart.children.values_mut() {
            kids.sort();
        }
        chart
    }

    pub fn load(store: &AlertStore) -> AlertResult<Self> {
        Ok(Self::from_employees(store.all_employees()?))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Indented tree below `root`, one employee per line. An employee
    /// reached a second time (a cycle) is printed once more with a
    /// marker and not expanded.
    pub fn render_tree(&self, root: &str) -> String {
        let mut out = String::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut stack: Vec<(&str, usize)> = vec![(root, 0)];

        while let Some((id, depth)) = stack.pop() {
            let indent = "  ".repeat(depth);
            let name = self.name(id).unwrap_or("?");
            if !seen.insert(id) {
                out.push_str(&format!("{indent}{id} {name} (cycle)\n"));
                continue;
            }
            out.push_str(&format!("{indent}{id} {name}\n"));
            if let Some(kids) = self.children.get(id) {
                for kid in kids.iter().rev() {
                    stack.push((kid.as_str(), depth + 1));
                }
            }
        }
        out
    }
}

impl ReportingLines for OrgChart {
    fn contains_employee(&self, id: &str) -> AlertResult<bool> {
        Ok(self.names.contains_key(id))
    }

    fn direct_report_ids(&self, manager_id: &str) -> AlertResult<Vec<EmployeeId>> {
        Ok(self.children.get(manager_id).cloned().unwrap_or_default())
    }
}
