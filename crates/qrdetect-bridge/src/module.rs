// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Native module registry.
//
// The host framework knows modules only by name. It dispatches
// `(module, method, args)` here and gets back a settled value: either the
// resolved JSON or a classified `(code, message)` rejection. Each call runs
// on its own task so a panicking module becomes an UNKNOWN_ERROR rejection
// instead of taking the host down.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use qrdetect_core::config::DetectorConfig;
use qrdetect_core::error::{DetectorError, Result};
use qrdetect_core::rejection::Rejection;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::detector::QrDetectorModule;
use crate::inspector::CallInspector;
use crate::response::Settlement;

/// A named set of callable operations exposed to the host.
#[async_trait]
pub trait NativeModule: Send + Sync {
    /// Name the host dispatches by.
    fn name(&self) -> &str;

    /// Methods `invoke` accepts.
    fn methods(&self) -> &[&'static str];

    async fn invoke(&self, method: &str, args: Value) -> Result<Value>;

    /// Host teardown notification. Runs once per registry teardown.
    fn on_destroy(&self) {}
}

/// Modules the application ships, in registration order.
pub fn default_package(config: &DetectorConfig) -> Result<Vec<Arc<dyn NativeModule>>> {
    let detector: Arc<dyn NativeModule> = Arc::new(QrDetectorModule::new(config)?);
    Ok(vec![detector])
}

/// Name-indexed set of native modules.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<String, Arc<dyn NativeModule>>,
    inspector: Option<Arc<CallInspector>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module. Names are unique.
    pub fn register(&mut self, module: Arc<dyn NativeModule>) -> Result<()> {
        let name = module.name().to_owned();
        if self.modules.contains_key(&name) {
            return Err(DetectorError::DuplicateModule(name));
        }
        info!(module = %name, methods = ?module.methods(), "native module registered");
        self.modules.insert(name, module);
        Ok(())
    }

    /// Register every module of a package, stopping at the first conflict.
    pub fn register_package(&mut self, package: Vec<Arc<dyn NativeModule>>) -> Result<()> {
        package.into_iter().try_for_each(|module| self.register(module))
    }

    pub fn module_names(&self) -> Vec<&str> {
        self.modules.keys().map(String::as_str).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn NativeModule>> {
        self.modules.get(name)
    }

    pub(crate) fn attach_inspector(&mut self, inspector: Arc<CallInspector>) {
        self.inspector = Some(inspector);
    }

    /// The call inspector, if debug tools are attached.
    pub fn inspector(&self) -> Option<&Arc<CallInspector>> {
        self.inspector.as_ref()
    }

    /// Dispatch one call and settle it.
    pub async fn dispatch(&self, module: &str, method: &str, args: Value) -> Settlement {
        let started = Instant::now();
        let argument_keys = argument_keys(&args);

        let settlement = self.run(module, method, args).await.map_err(|err| {
            let rejection = Rejection::from(&err);
            debug!(
                module,
                method,
                code = %rejection.code,
                recoverable = rejection.code.caller_recoverable(),
                error = %err,
                "native call rejected"
            );
            rejection
        });

        if let Some(inspector) = &self.inspector {
            inspector.record(module, method, argument_keys, &settlement, started.elapsed());
        }
        settlement
    }

    async fn run(&self, module: &str, method: &str, args: Value) -> Result<Value> {
        let target = self
            .modules
            .get(module)
            .cloned()
            .ok_or_else(|| DetectorError::UnknownModule(module.to_owned()))?;
        if !target.methods().contains(&method) {
            return Err(DetectorError::UnknownMethod {
                module: module.to_owned(),
                method: method.to_owned(),
            });
        }

        let method = method.to_owned();
        tokio::spawn(async move { target.invoke(&method, args).await })
            .await
            .map_err(|err| {
                warn!(error = %err, "native call task failed");
                DetectorError::Unexpected(format!("native call did not complete: {err}"))
            })?
    }

    /// Host teardown: notify every module once, then forget them.
    pub fn destroy_all(&mut self) {
        for (name, module) in std::mem::take(&mut self.modules) {
            module.on_destroy();
            debug!(module = %name, "native module destroyed");
        }
    }
}

/// Keys of an object argument, never the values (which may be large or
/// sensitive).
fn argument_keys(args: &Value) -> Vec<String> {
    args.as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default()
}
