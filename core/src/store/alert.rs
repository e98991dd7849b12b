//! Alert queries and the filtered, ordered, paginated listing.

use super::{AlertStore, CASEFOLD_FN};
use crate::{
    error::{AlertError, AlertResult},
    model::{Alert, AlertStatus, EmployeeSummary, NewAlert, Severity},
    pipeline::AlertPredicate,
    query::PageWindow,
    types::{AlertId, EmployeeId},
};
use chrono::{DateTime, Utc};
use rusqlite::{
    params, params_from_iter,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Value, ValueRef},
    OptionalExtension, Row, ToSql,
};
use std::collections::BTreeSet;

const ALERT_COLUMNS: &str =
    "a.id, e.id, e.name, a.severity, a.category, a.status, a.created_at";

impl ToSql for Severity {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Severity {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

impl ToSql for AlertStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for AlertStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

fn alert_from_row(r: &Row<'_>) -> rusqlite::Result<Alert> {
    let micros: i64 = r.get(6)?;
    let created_at = DateTime::<Utc>::from_timestamp_micros(micros).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            6,
            rusqlite::types::Type::Integer,
            format!("timestamp out of range: {micros}").into(),
        )
    })?;
    Ok(Alert {
        id: r.get(0)?,
        employee: EmployeeSummary {
            id:   r.get(1)?,
            name: r.get(2)?,
        },
        severity: r.get(3)?,
        category: r.get(4)?,
        status: r.get(5)?,
        created_at,
    })
}

/// Append the SQL for one predicate to a WHERE clause, pushing its
/// bound values in placeholder order.
fn push_predicate(sql: &mut String, values: &mut Vec<Value>, predicate: &AlertPredicate) {
    match predicate {
        AlertPredicate::SeverityIn(set) => {
            push_in_list(sql, "a.severity", set.len());
            values.extend(set.iter().map(|s| Value::Text(s.as_str().to_string())));
        }
        AlertPredicate::StatusIn(set) => {
            push_in_list(sql, "a.status", set.len());
            values.extend(set.iter().map(|s| Value::Text(s.as_str().to_string())));
        }
        AlertPredicate::NameContains(needle) => {
            // instr() takes the needle literally; no LIKE escaping needed.
            // Both sides fold through the same Rust lowercase.
            sql.push_str(&format!(" AND instr({CASEFOLD_FN}(e.name), ?) > 0"));
            values.push(Value::Text(needle.to_lowercase()));
        }
    }
}

fn push_in_list(sql: &mut String, column: &str, n: usize) {
    let placeholders = vec!["?"; n].join(", ");
    sql.push_str(&format!(" AND {column} IN ({placeholders})"));
}

impl AlertStore {
    /// Insert an alert, generating a UUID id when none is given.
    pub fn insert_alert(&self, alert: &NewAlert) -> AlertResult<AlertId> {
        self.write_alert(alert, "INSERT").map(|(id, _)| id)
    }

    /// Insert unless an alert with the same id exists.
    /// Returns whether a row was written.
    pub fn insert_alert_if_absent(&self, alert: &NewAlert) -> AlertResult<bool> {
        self.write_alert(alert, "INSERT OR IGNORE").map(|(_, written)| written)
    }

    fn write_alert(&self, alert: &NewAlert, verb: &str) -> AlertResult<(AlertId, bool)> {
        let id = alert
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let n = self.conn.execute(
            &format!(
                "{verb} INTO alert (id, employee_id, severity, category, created_at, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
            ),
            params![
                id,
                alert.employee_id,
                alert.severity,
                alert.category,
                alert.created_at.timestamp_micros(),
                alert.status,
            ],
        )?;
        Ok((id, n > 0))
    }

    pub fn get_alert(&self, id: &str) -> AlertResult<Option<Alert>> {
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT {ALERT_COLUMNS}
                     FROM alert a JOIN employee e ON e.id = a.employee_id
                     WHERE a.id = ?1"
                ),
                params![id],
                alert_from_row,
            )
            .optional()?)
    }

    /// Persist a new status. The write is a single-row UPDATE in
    /// autocommit mode, so it is durable once this returns.
    pub fn save_alert_status(&self, id: &str, status: AlertStatus) -> AlertResult<()> {
        let n = self.conn.execute(
            "UPDATE alert SET status = ?1 WHERE id = ?2",
            params![status, id],
        )?;
        if n == 0 {
            return Err(AlertError::not_found("alert", id));
        }
        Ok(())
    }

    /// Alerts raised against any of `employee_ids` that satisfy every
    /// predicate, newest first (ties by id), restricted to `window`.
    /// Also returns the size of the whole filtered set.
    pub fn query_alerts(
        &self,
        employee_ids: &BTreeSet<EmployeeId>,
        predicates: &[AlertPredicate],
        window: PageWindow,
    ) -> AlertResult<(Vec<Alert>, usize)> {
        // Scope ids go through a temp table so large subtrees never hit
        // the bound-parameter limit. The transaction is never committed;
        // dropping it rolls the temp rows back.
        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch(
            "CREATE TEMP TABLE IF NOT EXISTS scope_member (employee_id TEXT PRIMARY KEY);
             DELETE FROM temp.scope_member;",
        )?;
        {
            let mut insert = tx.prepare(
                "INSERT OR IGNORE INTO temp.scope_member (employee_id) VALUES (?1)",
            )?;
            for id in employee_ids {
                insert.execute(params![id])?;
            }
        }

        let mut where_sql =
            String::from("a.employee_id IN (SELECT employee_id FROM temp.scope_member)");
        let mut values: Vec<Value> = Vec::new();
        for predicate in predicates {
            push_predicate(&mut where_sql, &mut values, predicate);
        }

        let total: i64 = tx.query_row(
            &format!(
                "SELECT COUNT(*) FROM alert a JOIN employee e ON e.id = a.employee_id
                 WHERE {where_sql}"
            ),
            params_from_iter(values.iter()),
            |r| r.get(0),
        )?;

        values.push(Value::Integer(i64::try_from(window.limit).unwrap_or(i64::MAX)));
        values.push(Value::Integer(i64::try_from(window.offset).unwrap_or(i64::MAX)));
        let mut stmt = tx.prepare(&format!(
            "SELECT {ALERT_COLUMNS}
             FROM alert a JOIN employee e ON e.id = a.employee_id
             WHERE {where_sql}
             ORDER BY a.created_at DESC, a.id ASC
             LIMIT ? OFFSET ?"
        ))?;
        let items = stmt
            .query_map(params_from_iter(values.iter()), alert_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok((items, usize::try_from(total).unwrap_or_default()))
    }

    pub fn alert_count(&self) -> AlertResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM alert", [], |r| r.get(0))?)
    }
}
