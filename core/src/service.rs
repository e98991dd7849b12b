//! The two operations exposed to callers: list and dismiss.
//!
//! Listing:  request → scope resolution (NotFound if no such manager)
//!           → filter pipeline → one ordered page.
//! Dismiss:  locate alert (NotFound) → status transition → persist only
//!           when the status actually changed.

use crate::{
    config::ServiceConfig,
    error::{AlertError, AlertResult},
    hierarchy::resolve_scope,
    model::Alert,
    pipeline::{list_alerts, AlertPage},
    query::ListRequest,
    store::AlertStore,
};
use std::collections::HashMap;
use std::time::Duration;

pub struct AlertService {
    store:  AlertStore,
    config: ServiceConfig,
}

impl AlertService {
    pub fn new(store: AlertStore, config: ServiceConfig) -> AlertResult<Self> {
        store.set_busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        Ok(Self { store, config })
    }

    pub fn store(&self) -> &AlertStore {
        &self.store
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// A second service on its own connection to the same database,
    /// for use from another thread.
    pub fn reopen(&self) -> AlertResult<Self> {
        Self::new(self.store.reopen()?, self.config.clone())
    }

    pub fn list(&self, req: &ListRequest) -> AlertResult<AlertPage> {
        let window = req.page.window(&self.config)?;
        if self.config.strict_filters {
            if let Some(reason) = req.filters.rejection() {
                return Err(AlertError::validation(reason));
            }
        }

        let employee_ids = resolve_scope(&self.store, &req.manager_id, req.scope)?;
        log::debug!(
            "List for {} ({}): {} employees in scope",
            req.manager_id,
            req.scope.as_str(),
            employee_ids.len()
        );
        list_alerts(&self.store, &employee_ids, &req.filters, window)
    }

    /// Parse named parameters and list. See [`ListRequest::from_params`].
    pub fn list_params(&self, params: &HashMap<String, String>) -> AlertResult<AlertPage> {
        self.list(&ListRequest::from_params(params)?)
    }

    /// Idempotent: dismissing an already dismissed alert returns it
    /// unchanged without writing.
    pub fn dismiss(&self, alert_id: &str) -> AlertResult<Alert> {
        if alert_id.trim().is_empty() {
            return Err(AlertError::validation("alert_id is required"));
        }
        let mut alert = self
            .store
            .get_alert(alert_id)?
            .ok_or_else(|| AlertError::not_found("alert", alert_id))?;

        let transition = alert.status.dismiss();
        if transition.is_change() {
            self.store.save_alert_status(&alert.id, transition.status())?;
            log::info!("Alert {} dismissed", alert.id);
        } else {
            log::debug!("Alert {} already dismissed", alert.id);
        }
        alert.status = transition.status();
        Ok(alert)
    }
}
