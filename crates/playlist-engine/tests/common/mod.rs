//! Common test utilities for the playlist engine
//!
//! [`Stage`] registers a `probe` action that records every `begin` and
//! either settles right away (when its options say so) or waits for the test
//! to settle it by name.
#![allow(dead_code)]

use playlist_core::{Action, ActionError, ActionResult, Completion};
use playlist_engine::{EngineConfig, PlaylistCompiler};
use playlist_registry::{ActionRegistry, SharedActionRegistry};
use playlist_signals::{SharedSignalBus, SignalBus};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Options understood by the `probe` action
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeOptions {
    pub name: String,
    /// Complete immediately with this value
    #[serde(default)]
    pub result: Option<Value>,
    /// Fail immediately with this message
    #[serde(default)]
    pub fail: Option<String>,
}

/// Action that reports to a [`Stage`]
pub struct Probe {
    completion: Completion,
    options: ProbeOptions,
    stage: Stage,
}

impl Action for Probe {
    fn completion(&self) -> &Completion {
        &self.completion
    }

    fn begin(&self, input: Value) {
        let name = self.options.name.clone();
        self.stage.record(&name, input);

        if let Some(message) = &self.options.fail {
            self.fail(ActionError::failed(message.clone()));
        } else if let Some(result) = &self.options.result {
            self.complete(result.clone());
        } else {
            self.stage.park(name, self.completion.clone());
        }
    }
}

/// Shared record of what probes did
#[derive(Clone, Default)]
pub struct Stage {
    begun: Arc<Mutex<Vec<(String, Value)>>>,
    parked: Arc<Mutex<HashMap<String, Completion>>>,
    built: Arc<Mutex<Vec<String>>>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `probe` plus the built-in actions bound to `bus`
    pub fn registry_with_bus(&self, bus: SharedSignalBus) -> SharedActionRegistry {
        let registry = ActionRegistry::new();
        let stage = self.clone();
        registry.register("probe", move |options: Value| -> ActionResult<Probe> {
            let options: ProbeOptions = serde_json::from_value(options)
                .map_err(|e| ActionError::invalid_options(e.to_string()))?;
            stage.built.lock().unwrap().push(options.name.clone());
            Ok(Probe {
                completion: Completion::new(),
                options,
                stage: stage.clone(),
            })
        });
        playlist_actions::register_builtins(&registry, bus);
        Arc::new(registry)
    }

    pub fn registry(&self) -> SharedActionRegistry {
        self.registry_with_bus(Arc::new(SignalBus::new()))
    }

    pub fn compiler(&self) -> PlaylistCompiler {
        PlaylistCompiler::new(self.registry())
    }

    pub fn compiler_with_config(&self, config: EngineConfig) -> PlaylistCompiler {
        PlaylistCompiler::new(self.registry()).with_config(config)
    }

    fn record(&self, name: &str, input: Value) {
        self.begun.lock().unwrap().push((name.to_string(), input));
    }

    fn park(&self, name: String, completion: Completion) {
        self.parked.lock().unwrap().insert(name, completion);
    }

    /// Names of probes in the order they began
    pub fn begun(&self) -> Vec<String> {
        self.begun
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Input the named probe began with
    pub fn input_of(&self, name: &str) -> Option<Value> {
        self.begun
            .lock()
            .unwrap()
            .iter()
            .find(|(begun, _)| begun == name)
            .map(|(_, input)| input.clone())
    }

    /// Names of probes constructed so far
    pub fn built(&self) -> Vec<String> {
        self.built.lock().unwrap().clone()
    }

    /// Complete a parked probe
    pub fn complete(&self, name: &str, result: Value) -> bool {
        match self.parked.lock().unwrap().get(name) {
            Some(completion) => completion.complete(result),
            None => false,
        }
    }

    /// Fail a parked probe
    pub fn fail(&self, name: &str, message: &str) -> bool {
        match self.parked.lock().unwrap().get(name) {
            Some(completion) => completion.fail(ActionError::failed(message)),
            None => false,
        }
    }
}

/// Probe that parks until settled by the test
pub fn probe(name: &str) -> Value {
    serde_json::json!({"actionName": "probe", "options": {"name": name}})
}

/// Probe that completes as soon as it begins
pub fn probe_ok(name: &str, result: Value) -> Value {
    serde_json::json!({"actionName": "probe", "options": {"name": name, "result": result}})
}

/// Probe that fails as soon as it begins
pub fn probe_err(name: &str, message: &str) -> Value {
    serde_json::json!({"actionName": "probe", "options": {"name": name, "fail": message}})
}

/// Let spawned playlist drivers run until nothing is ready
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// Route engine logs to the test harness
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("playlist_engine=trace")
        .with_test_writer()
        .try_init();
}
