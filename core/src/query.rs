//! Listing request: scope, filters and page selection.
//!
//! Every recognised option is an explicit field here. Raw parameters
//! (CLI flags, IPC payloads) are parsed once into a [`ListRequest`];
//! nothing downstream inspects raw strings again.

use crate::{
    config::ServiceConfig,
    error::{AlertError, AlertResult},
    model::{AlertStatus, Severity},
    types::EmployeeId,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

// ── Scope ────────────────────────────────────────────────────────────────────

/// Which part of a manager's organisation a listing targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Direct,
    Subtree,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct  => "direct",
            Self::Subtree => "subtree",
        }
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct"  => Ok(Self::Direct),
            "subtree" => Ok(Self::Subtree),
            other     => Err(format!("unknown scope '{other}'")),
        }
    }
}

// ── Value filters ────────────────────────────────────────────────────────────

/// A parsed multi-value filter such as `severity=high,medium`.
///
/// `Rejected` keeps the first value that failed to parse. A rejected
/// filter admits nothing, so the listing fails closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSet<T: Ord> {
    Any,
    Only(BTreeSet<T>),
    Rejected(String),
}

impl<T: Ord> Default for FilterSet<T> {
    fn default() -> Self {
        Self::Any
    }
}

impl<T> FilterSet<T>
where
    T: Ord + FromStr<Err = String>,
{
    /// Parse a comma-separated list. Absent or empty input means no filter.
    ///
    /// Segments are taken verbatim: an empty segment (`high,`) or a padded
    /// one (`high, low`) is not a recognised value and rejects the filter.
    pub fn parse(raw: Option<&str>) -> Self {
        let raw = match raw {
            None | Some("") => return Self::Any,
            Some(raw) => raw,
        };
        let mut values = BTreeSet::new();
        for part in raw.split(',') {
            match part.parse::<T>() {
                Ok(v)  => { values.insert(v); }
                Err(_) => return Self::Rejected(part.to_string()),
            }
        }
        Self::Only(values)
    }
}

impl<T: Ord> FilterSet<T> {
    pub fn only(values: impl IntoIterator<Item = T>) -> Self {
        Self::Only(values.into_iter().collect())
    }

    pub fn admits(&self, value: &T) -> bool {
        match self {
            Self::Any         => true,
            Self::Only(set)   => set.contains(value),
            Self::Rejected(_) => false,
        }
    }

    pub fn rejected_value(&self) -> Option<&str> {
        match self {
            Self::Rejected(v) => Some(v),
            _                 => None,
        }
    }
}

/// Conjunctive alert filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertFilters {
    pub severity: FilterSet<Severity>,
    pub status:   FilterSet<AlertStatus>,
    /// Case-insensitive substring of the employee's name.
    pub query:    Option<String>,
}

impl AlertFilters {
    /// Describes the first rejected filter value, if any.
    pub fn rejection(&self) -> Option<String> {
        if let Some(v) = self.severity.rejected_value() {
            return Some(format!("invalid severity '{v}'"));
        }
        self.status
            .rejected_value()
            .map(|v| format!("invalid status '{v}'"))
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

/// Resolved slice `[offset, offset + limit)` of the ordered result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub offset: usize,
    pub limit:  usize,
}

impl PageWindow {
    /// Zero-based page `index` of `size` items. `None` when the page
    /// starts beyond any addressable offset.
    pub fn page(index: usize, size: usize) -> Option<Self> {
        let offset = index.checked_mul(size)?;
        Some(Self { offset, limit: size })
    }
}

/// Page selection as the caller expressed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageRequest {
    #[default]
    First,
    /// One-based page number with an optional size.
    Number { page: usize, size: Option<usize> },
    Offset { offset: usize, limit: Option<usize> },
}

impl PageRequest {
    /// Resolve against configured sizes. Sizes of 0 or above the
    /// configured maximum are clamped.
    pub fn window(&self, config: &ServiceConfig) -> AlertResult<PageWindow> {
        let clamp = |size: Option<usize>| {
            size.filter(|s| *s > 0)
                .unwrap_or(config.default_page_size)
                .min(config.max_page_size)
                .max(1)
        };
        match *self {
            Self::First => Ok(PageWindow { offset: 0, limit: clamp(None) }),
            Self::Number { page, size } => {
                if page == 0 {
                    return Err(AlertError::validation("page numbers start at 1"));
                }
                PageWindow::page(page - 1, clamp(size))
                    .ok_or_else(|| AlertError::validation(format!("page {page} is out of range")))
            }
            Self::Offset { offset, limit } => Ok(PageWindow { offset, limit: clamp(limit) }),
        }
    }
}

// ── Request ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub manager_id: EmployeeId,
    pub scope:      Scope,
    pub filters:    AlertFilters,
    pub page:       PageRequest,
}

impl ListRequest {
    pub fn new(manager_id: impl Into<String>) -> Self {
        Self {
            manager_id: manager_id.into(),
            scope:      Scope::default(),
            filters:    AlertFilters::default(),
            page:       PageRequest::default(),
        }
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn severity(mut self, raw: &str) -> Self {
        self.filters.severity = FilterSet::parse(Some(raw));
        self
    }

    pub fn status(mut self, raw: &str) -> Self {
        self.filters.status = FilterSet::parse(Some(raw));
        self
    }

    pub fn search(mut self, q: &str) -> Self {
        self.filters.query = non_blank(Some(q));
        self
    }

    pub fn page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }

    /// Build from named string parameters: `manager_id`, `scope`,
    /// `severity`, `status`, `q`, and either `page`/`page_size` or
    /// `offset`/`limit`.
    ///
    /// Missing `manager_id`, an unknown scope, or a malformed number is a
    /// validation error. Unknown severity/status values are kept as
    /// rejected filters and handled by the service.
    pub fn from_params(params: &HashMap<String, String>) -> AlertResult<Self> {
        let get = |key: &str| params.get(key).map(String::as_str);

        let manager_id = non_blank(get("manager_id"))
            .ok_or_else(|| AlertError::validation("manager_id is required"))?;

        let scope = match non_blank(get("scope")) {
            None      => Scope::default(),
            Some(raw) => raw.parse::<Scope>().map_err(AlertError::validation)?,
        };

        let filters = AlertFilters {
            severity: FilterSet::parse(get("severity")),
            status:   FilterSet::parse(get("status")),
            query:    non_blank(get("q")),
        };

        let page_number = parse_count(get("page"), "page")?;
        let page_size   = parse_count(get("page_size"), "page_size")?;
        let offset      = parse_count(get("offset"), "offset")?;
        let limit       = parse_count(get("limit"), "limit")?;

        let page = match (page_number, offset) {
            (Some(_), Some(_)) => {
                return Err(AlertError::validation("use either page or offset, not both"))
            }
            (Some(page), None) => PageRequest::Number { page, size: page_size },
            (None, Some(offset)) => PageRequest::Offset { offset, limit: limit.or(page_size) },
            (None, None) => match limit.or(page_size) {
                Some(size) => PageRequest::Number { page: 1, size: Some(size) },
                None       => PageRequest::First,
            },
        };

        Ok(Self { manager_id, scope, filters, page })
    }
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_count(raw: Option<&str>, name: &str) -> AlertResult<Option<usize>> {
    match non_blank(raw) {
        None => Ok(None),
        Some(v) => v
            .parse::<usize>()
            .map(Some)
            .map_err(|_| AlertError::validation(format!("{name} must be a non-negative integer"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn filter_set_parsing() {
        assert_eq!(FilterSet::<Severity>::parse(None), FilterSet::Any);
        assert_eq!(FilterSet::<Severity>::parse(Some("")), FilterSet::Any);
        assert_eq!(
            FilterSet::<Severity>::parse(Some("high,low,high")),
            FilterSet::only([Severity::High, Severity::Low]),
        );
        assert_eq!(
            FilterSet::<Severity>::parse(Some("high,critical")),
            FilterSet::Rejected("critical".into()),
        );
        assert!(!FilterSet::<AlertStatus>::Rejected("x".into()).admits(&AlertStatus::Open));
    }

    #[test]
    fn stray_commas_and_padding_reject_the_filter() {
        assert_eq!(FilterSet::<Severity>::parse(Some("high,")), FilterSet::Rejected("".into()));
        assert_eq!(FilterSet::<Severity>::parse(Some(",high")), FilterSet::Rejected("".into()));
        assert_eq!(FilterSet::<Severity>::parse(Some(" high")), FilterSet::Rejected(" high".into()));
        assert_eq!(
            FilterSet::<AlertStatus>::parse(Some("open, dismissed")),
            FilterSet::Rejected(" dismissed".into()),
        );
        assert_eq!(FilterSet::<Severity>::parse(Some(" ")), FilterSet::Rejected(" ".into()));
    }

    #[test]
    fn defaults_to_direct_scope_and_first_page() {
        let req = ListRequest::from_params(&params(&[("manager_id", "MGR001")])).unwrap();
        assert_eq!(req.scope, Scope::Direct);
        assert_eq!(req.page, PageRequest::First);
        assert_eq!(req.filters, AlertFilters::default());
    }

    #[test]
    fn missing_manager_and_bad_scope_are_validation_errors() {
        let err = ListRequest::from_params(&params(&[("scope", "direct")])).unwrap_err();
        assert_eq!(err.kind(), "validation");

        let err = ListRequest::from_params(&params(&[("manager_id", "M"), ("scope", "everyone")]))
            .unwrap_err();
        assert_eq!(err.kind(), "validation");

        let err = ListRequest::from_params(&params(&[("manager_id", "M"), ("page", "two")]))
            .unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn bad_filter_values_are_kept_as_rejections() {
        let req = ListRequest::from_params(&params(&[
            ("manager_id", "M"),
            ("severity", "urgent"),
        ]))
        .unwrap();
        assert_eq!(req.filters.rejection().as_deref(), Some("invalid severity 'urgent'"));
    }

    #[test]
    fn page_windows_are_clamped() {
        let config = ServiceConfig { default_page_size: 20, max_page_size: 50, ..Default::default() };
        assert_eq!(PageRequest::First.window(&config).unwrap(), PageWindow { offset: 0, limit: 20 });
        assert_eq!(
            PageRequest::Number { page: 3, size: Some(10) }.window(&config).unwrap(),
            PageWindow { offset: 20, limit: 10 },
        );
        assert_eq!(
            PageRequest::Offset { offset: 7, limit: Some(500) }.window(&config).unwrap(),
            PageWindow { offset: 7, limit: 50 },
        );
        assert!(PageRequest::Number { page: 0, size: None }.window(&config).is_err());
    }

    #[test]
    fn page_beyond_addressable_range_is_a_validation_error() {
        let config = ServiceConfig::default();
        let err = PageRequest::Number { page: usize::MAX, size: Some(20) }
            .window(&config)
            .unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert_eq!(PageWindow::page(usize::MAX, 2), None);
        assert_eq!(PageWindow::page(3, 0), Some(PageWindow { offset: 0, limit: 0 }));
    }
}
