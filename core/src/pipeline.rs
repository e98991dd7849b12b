//! Alert filter pipeline.
//!
//! Turns a scope (a set of employee ids) plus [`AlertFilters`] into one
//! ordered page of alerts and the size of the full filtered set.
//!
//! Filters compile to a list of [`AlertPredicate`]s that are ANDed
//! together, so the order they are applied in never changes the result.
//! A filter holding an unrecognised value short-circuits to an empty
//! page (fail closed) before the store is touched.

use crate::{
    error::AlertResult,
    model::{Alert, AlertStatus, Severity},
    query::{AlertFilters, FilterSet, PageWindow},
    store::AlertStore,
    types::EmployeeId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One conjunct of an alert query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertPredicate {
    SeverityIn(BTreeSet<Severity>),
    StatusIn(BTreeSet<AlertStatus>),
    /// Case-insensitive substring of the employee's name.
    NameContains(String),
}

impl AlertFilters {
    /// Compile to predicates. `None` when a filter was rejected and the
    /// whole listing must come back empty.
    pub fn predicates(&self) -> Option<Vec<AlertPredicate>> {
        let mut out = Vec::new();
        match &self.severity {
            FilterSet::Any         => {}
            FilterSet::Only(set)   => out.push(AlertPredicate::SeverityIn(set.clone())),
            FilterSet::Rejected(_) => return None,
        }
        match &self.status {
            FilterSet::Any         => {}
            FilterSet::Only(set)   => out.push(AlertPredicate::StatusIn(set.clone())),
            FilterSet::Rejected(_) => return None,
        }
        if let Some(q) = &self.query {
            out.push(AlertPredicate::NameContains(q.clone()));
        }
        Some(out)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPage {
    /// Size of the filtered set before pagination.
    #[serde(rename = "count")]
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
    pub next_offset: Option<usize>,
    pub previous_offset: Option<usize>,
    #[serde(rename = "results")]
    pub items: Vec<Alert>,
}

impl AlertPage {
    pub fn new(items: Vec<Alert>, total: usize, window: PageWindow) -> Self {
        let end = window.offset.saturating_add(window.limit);
        Self {
            total,
            offset: window.offset,
            limit: window.limit,
            next_offset: (end < total).then_some(end),
            previous_offset: (window.offset > 0)
                .then(|| window.offset.saturating_sub(window.limit).min(total)),
            items,
        }
    }

    pub fn empty(window: PageWindow) -> Self {
        Self::new(Vec::new(), 0, window)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Select, filter, order and paginate the alerts of `employee_ids`.
pub fn list_alerts(
    store: &AlertStore,
    employee_ids: &BTreeSet<EmployeeId>,
    filters: &AlertFilters,
    window: PageWindow,
) -> AlertResult<AlertPage> {
    let Some(predicates) = filters.predicates() else {
        log::warn!(
            "Rejected alert filter ({}); returning empty page",
            filters.rejection().unwrap_or_default()
        );
        return Ok(AlertPage::empty(window));
    };

    if employee_ids.is_empty() {
        log::debug!("Empty scope; no alerts to select");
        return Ok(AlertPage::empty(window));
    }

    let (items, total) = store.query_alerts(employee_ids, &predicates, window)?;
    log::debug!(
        "Listed {} of {total} alerts across {} employees (offset {}, {} predicates)",
        items.len(),
        employee_ids.len(),
        window.offset,
        predicates.len()
    );
    Ok(AlertPage::new(items, total, window))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_filters_compile_to_nothing() {
        let filters = AlertFilters {
            status: FilterSet::Rejected("closed".into()),
            ..Default::default()
        };
        assert_eq!(filters.predicates(), None);
    }

    #[test]
    fn unfiltered_compiles_to_no_predicates() {
        assert_eq!(AlertFilters::default().predicates(), Some(vec![]));
    }

    #[test]
    fn page_links() {
        let page = AlertPage::new(Vec::new(), 45, PageWindow::page(1, 20).unwrap());
        assert_eq!(page.offset, 20);
        assert_eq!(page.next_offset, Some(40));
        assert_eq!(page.previous_offset, Some(0));

        let last = AlertPage::new(Vec::new(), 45, PageWindow::page(2, 20).unwrap());
        assert_eq!(last.next_offset, None);
        assert_eq!(last.previous_offset, Some(20));

        let first = AlertPage::empty(PageWindow::page(0, 20).unwrap());
        assert_eq!(first.next_offset, None);
        assert_eq!(first.previous_offset, None);
    }
}
