//! Employees, alerts, and the alert status state machine.

use crate::types::{AlertId, EmployeeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Employee ─────────────────────────────────────────────────────────────────

/// Row from the `employee` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id:         EmployeeId,
    pub name:       String,
    pub reports_to: Option<EmployeeId>,
}

impl Employee {
    pub fn new(id: impl Into<String>, name: impl Into<String>, reports_to: Option<&str>) -> Self {
        Self {
            id:         id.into(),
            name:       name.into(),
            reports_to: reports_to.map(str::to_string),
        }
    }

    pub fn summary(&self) -> EmployeeSummary {
        EmployeeSummary { id: self.id.clone(), name: self.name.clone() }
    }
}

/// Minimal employee representation nested inside an alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSummary {
    pub id:   EmployeeId,
    pub name: String,
}

// ── Severity ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Low, Severity::Medium, Severity::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low    => "low",
            Self::Medium => "medium",
            Self::High   => "high",
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low"    => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high"   => Ok(Self::High),
            other    => Err(format!("unknown severity '{other}'")),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Status state machine ─────────────────────────────────────────────────────

/// Alert lifecycle. The only transition is `Open -> Dismissed`; nothing
/// in this crate ever reopens an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Open,
    Dismissed,
}

/// Outcome of applying a transition to an [`AlertStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed { from: AlertStatus, to: AlertStatus },
    Unchanged(AlertStatus),
}

impl Transition {
    /// The state after the transition.
    pub fn status(&self) -> AlertStatus {
        match *self {
            Self::Changed { to, .. } => to,
            Self::Unchanged(s)       => s,
        }
    }

    pub fn is_change(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }
}

impl AlertStatus {
    pub const ALL: [AlertStatus; 2] = [AlertStatus::Open, AlertStatus::Dismissed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open      => "open",
            Self::Dismissed => "dismissed",
        }
    }

    /// Total over both states: dismissing a dismissed alert is a no-op.
    pub fn dismiss(self) -> Transition {
        match self {
            Self::Open      => Transition::Changed { from: self, to: Self::Dismissed },
            Self::Dismissed => Transition::Unchanged(self),
        }
    }
}

impl Default for AlertStatus {
    fn default() -> Self {
        Self::Open
    }
}

impl FromStr for AlertStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open"      => Ok(Self::Open),
            "dismissed" => Ok(Self::Dismissed),
            other       => Err(format!("unknown status '{other}'")),
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Alert ────────────────────────────────────────────────────────────────────

/// An alert joined with its employee, as returned to callers.
/// Field order matches the serialized representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id:         AlertId,
    pub employee:   EmployeeSummary,
    pub severity:   Severity,
    pub category:   String,
    pub status:     AlertStatus,
    pub created_at: DateTime<Utc>,
}

/// Input for inserting an alert. A missing id is generated.
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub id:          Option<AlertId>,
    pub employee_id: EmployeeId,
    pub severity:    Severity,
    pub category:    String,
    pub created_at:  DateTime<Utc>,
    pub status:      AlertStatus,
}

impl NewAlert {
    pub fn new(
        id: impl Into<String>,
        employee_id: impl Into<String>,
        severity: Severity,
        category: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id:          Some(id.into()),
            employee_id: employee_id.into(),
            severity,
            category:    category.into(),
            created_at,
            status:      AlertStatus::default(),
        }
    }
}
