//! Diagnostics
//!
//! Startup banners, logging of uncaught page errors, and a check for
//! critical page elements that runs on local development hosts.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use folio_dom::{EventKind, EventTarget, Host};

use crate::bindings::Registrations;
use crate::config::{DiagnosticsConfig, EnhanceConfig};
use crate::error::Result;

/// Log each banner line
pub fn log_banners(banners: &[String]) {
    for line in banners {
        tracing::info!("{line}");
    }
}

/// Check if `hostname` is one of the local development hosts
pub fn is_local_host(hostname: &str, local_hosts: &[String]) -> bool {
    local_hosts.iter().any(|h| h.eq_ignore_ascii_case(hostname))
}

/// Selectors among `selectors` that match nothing (or do not parse).
/// Each one is logged as a warning.
pub fn check_critical_elements(host: &dyn Host, selectors: &[String]) -> Vec<String> {
    let mut missing = Vec::new();
    for selector in selectors {
        match host.query_selector(selector) {
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::warn!(selector = %selector, "critical element not found");
                missing.push(selector.clone());
            }
            Err(err) => {
                tracing::warn!(selector = %selector, error = %err, "critical selector is invalid");
                missing.push(selector.clone());
            }
        }
    }
    missing
}

#[derive(Debug)]
pub struct Diagnostics {
    host: Weak<dyn Host>,
    config: DiagnosticsConfig,
    captured: Rc<Cell<usize>>,
    registrations: Registrations,
}

impl Diagnostics {
    /// Start logging uncaught errors. The listener never prevents the
    /// host's default error handling.
    pub fn install(host: &Rc<dyn Host>, config: &EnhanceConfig) -> Result<Option<Self>> {
        let captured = Rc::new(Cell::new(0));
        let mut registrations = Registrations::new();

        let count = captured.clone();
        registrations.listen(host, EventTarget::Window, EventKind::Error, move |_, event| {
            count.set(count.get() + 1);
            let message = event.message.as_deref().unwrap_or("unknown error");
            tracing::error!(error = %message, "uncaught page error");
        });

        Ok(Some(Self {
            host: Rc::downgrade(host),
            config: config.diagnostics.clone(),
            captured,
            registrations,
        }))
    }

    /// Uncaught errors seen so far
    pub fn captured_errors(&self) -> usize {
        self.captured.get()
    }

    pub fn log_banners(&self) {
        log_banners(&self.config.banners);
    }

    /// Run the critical element check on local hosts. Returns `None`
    /// elsewhere.
    pub fn check_local(&self) -> Option<Vec<String>> {
        let host = self.host.upgrade()?;
        let hostname = host.hostname();
        if !is_local_host(&hostname, &self.config.local_hosts) {
            return None;
        }

        tracing::debug!(hostname = %hostname, "running critical element check");
        Some(check_critical_elements(host.as_ref(), &self.config.critical_selectors))
    }

    pub fn dispose(&mut self) {
        if let Some(host) = self.host.upgrade() {
            self.registrations.dispose(host.as_ref());
        }
    }
}
