// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Debug-only call inspector.
//
// In debug builds with `debug_tools` on, the registry records every
// dispatched call into a bounded ring and logs it. Release builds never
// attach one. The inspector only observes settled calls; it has no path
// back into detection.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use qrdetect_core::config::DetectorConfig;
use qrdetect_core::rejection::ErrorCode;
use serde::Serialize;
use tracing::{debug, info};

use crate::module::ModuleRegistry;
use crate::response::Settlement;

/// How a recorded call settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "channel", content = "code", rename_all = "lowercase")]
pub enum CallOutcome {
    Resolved,
    Rejected(ErrorCode),
}

/// One dispatched call as seen by the inspector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRecord {
    pub module: String,
    pub method: String,
    /// Argument keys only; values are never kept.
    pub argument_keys: Vec<String>,
    pub outcome: CallOutcome,
    pub elapsed_ms: u64,
}

/// Bounded in-memory log of recent calls.
#[derive(Debug)]
pub struct CallInspector {
    capacity: usize,
    records: Mutex<VecDeque<CallRecord>>,
}

impl CallInspector {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            records: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn record(
        &self,
        module: &str,
        method: &str,
        argument_keys: Vec<String>,
        settlement: &Settlement,
        elapsed: Duration,
    ) {
        let outcome = match settlement {
            Ok(_) => CallOutcome::Resolved,
            Err(rejection) => CallOutcome::Rejected(rejection.code),
        };
        let record = CallRecord {
            module: module.to_owned(),
            method: method.to_owned(),
            argument_keys,
            outcome,
            elapsed_ms: elapsed.as_millis() as u64,
        };
        debug!(
            module = %record.module,
            method = %record.method,
            outcome = ?record.outcome,
            elapsed_ms = record.elapsed_ms,
            "inspected native call"
        );

        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }

    /// Snapshot, oldest first.
    pub fn recent(&self) -> Vec<CallRecord> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records.iter().cloned().collect()
    }
}

/// Attach debug tooling to `registry`. Returns whether anything attached.
///
/// Always a no-op in release builds.
#[cfg(debug_assertions)]
pub fn attach_debug_tools(registry: &mut ModuleRegistry, config: &DetectorConfig) -> bool {
    if !config.debug_tools {
        return false;
    }
    registry.attach_inspector(Arc::new(CallInspector::new(config.inspector_capacity)));
    info!(capacity = config.inspector_capacity, "debug call inspector attached");
    true
}

#[cfg(not(debug_assertions))]
pub fn attach_debug_tools(_registry: &mut ModuleRegistry, _config: &DetectorConfig) -> bool {
    false
}
