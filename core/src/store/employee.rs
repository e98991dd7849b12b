//! Employee and reporting-line queries.

use super::AlertStore;
use crate::{
    error::{AlertError, AlertResult},
    model::Employee,
    types::EmployeeId,
};
use rusqlite::{params, OptionalExtension, Row};

fn employee_from_row(r: &Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id:         r.get(0)?,
        name:       r.get(1)?,
        reports_to: r.get(2)?,
    })
}

impl AlertStore {
    /// Insert an employee. The manager, if any, must already exist.
    pub fn insert_employee(&self, e: &Employee) -> AlertResult<()> {
        self.conn.execute(
            "INSERT INTO employee (id, name, reports_to) VALUES (?1, ?2, ?3)",
            params![e.id, e.name, e.reports_to],
        )?;
        Ok(())
    }

    /// Insert unless an employee with the same id exists.
    /// Returns whether a row was written.
    pub fn insert_employee_if_absent(&self, e: &Employee) -> AlertResult<bool> {
        let n = self.conn.execute(
            "INSERT OR IGNORE INTO employee (id, name, reports_to) VALUES (?1, ?2, ?3)",
            params![e.id, e.name, e.reports_to],
        )?;
        Ok(n > 0)
    }

    pub fn get_employee(&self, id: &str) -> AlertResult<Option<Employee>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name, reports_to FROM employee WHERE id = ?1",
                params![id],
                employee_from_row,
            )
            .optional()?)
    }

    /// Ids of employees whose `reports_to` is `manager_id`, in id order.
    pub fn direct_report_ids(&self, manager_id: &str) -> AlertResult<Vec<EmployeeId>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT id FROM employee WHERE reports_to = ?1 ORDER BY id")?;
        let ids = stmt
            .query_map(params![manager_id], |r| r.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    /// Every employee, in id order.
    pub fn all_employees(&self) -> AlertResult<Vec<Employee>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, reports_to FROM employee ORDER BY id")?;
        let rows = stmt
            .query_map([], employee_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Point `id` at a new manager, or clear the link with `None`.
    /// No cycle check: the hierarchy readers tolerate cycles.
    pub fn set_reports_to(&self, id: &str, manager_id: Option<&str>) -> AlertResult<()> {
        let n = self.conn.execute(
            "UPDATE employee SET reports_to = ?1 WHERE id = ?2",
            params![manager_id, id],
        )?;
        if n == 0 {
            return Err(AlertError::not_found("employee", id));
        }
        Ok(())
    }

    /// Delete an employee. Their alerts are deleted with them; their
    /// reports are orphaned, not deleted.
    pub fn delete_employee(&self, id: &str) -> AlertResult<()> {
        let n = self
            .conn
            .execute("DELETE FROM employee WHERE id = ?1", params![id])?;
        if n == 0 {
            return Err(AlertError::not_found("employee", id));
        }
        Ok(())
    }

    pub fn employee_count(&self) -> AlertResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM employee", [], |r| r.get(0))?)
    }
}
