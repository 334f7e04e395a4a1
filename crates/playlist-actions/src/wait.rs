//! Wait action
//!
//! Completes after a fixed delay. With a `result` option it completes with
//! that value; otherwise it passes its input through, so a wait can sit in
//! the middle of a sequence without breaking the value chain.

use crate::parse_options;
use playlist_core::{Action, ActionError, ActionResult, Completion};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Delay specification: milliseconds or a duration string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Timeout {
    /// Milliseconds
    Millis(u64),
    /// Seconds (`"1.5"`), `"MM:SS"` or `"HH:MM:SS"`
    Text(String),
}

impl Timeout {
    /// Convert to a Duration, if the text form parses
    pub fn to_duration(&self) -> Option<Duration> {
        match self {
            Timeout::Millis(ms) => Some(Duration::from_millis(*ms)),
            Timeout::Text(text) => parse_duration(text),
        }
    }
}

/// Options accepted by [`WaitAction`]
#[derive(Debug, Clone, Deserialize)]
pub struct WaitOptions {
    /// How long to wait
    pub timeout: Timeout,

    /// Value to complete with instead of the input
    #[serde(default)]
    pub result: Option<Value>,
}

/// Completes after `timeout` has elapsed
pub struct WaitAction {
    completion: Completion,
    duration: Duration,
    result: Option<Value>,
}

impl WaitAction {
    /// Create a wait of the given duration
    pub fn new(duration: Duration) -> Self {
        Self {
            completion: Completion::new(),
            duration,
            result: None,
        }
    }

    /// Complete with `result` instead of passing the input through
    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }

    /// Build from descriptor options
    pub fn from_options(options: Value) -> ActionResult<Self> {
        let options: WaitOptions = parse_options(options)?;
        let duration = options.timeout.to_duration().ok_or_else(|| {
            ActionError::invalid_options(format!("invalid timeout: {:?}", options.timeout))
        })?;

        Ok(Self {
            completion: Completion::new(),
            duration,
            result: options.result,
        })
    }

    /// Configured delay
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Action for WaitAction {
    fn completion(&self) -> &Completion {
        &self.completion
    }

    fn begin(&self, input: Value) {
        let completion = self.completion.clone();
        let duration = self.duration;
        let result = self.result.clone().unwrap_or(input);

        debug!("Waiting for {:?}", duration);
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            completion.complete(result);
        });
    }
}

/// Parse duration from string (seconds, MM:SS or HH:MM:SS)
fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();

    if let Ok(secs) = s.parse::<f64>() {
        return Duration::try_from_secs_f64(secs).ok();
    }

    let parts: Vec<&str> = s.split(':').collect();
    match parts.len() {
        2 => {
            let mins: u64 = parts[0].parse().ok()?;
            let secs: u64 = parts[1].parse().ok()?;
            Some(Duration::from_secs(mins.checked_mul(60)?.checked_add(secs)?))
        }
        3 => {
            let hours: u64 = parts[0].parse().ok()?;
            let mins: u64 = parts[1].parse().ok()?;
            let secs: u64 = parts[2].parse().ok()?;
            let total = hours
                .checked_mul(3600)?
                .checked_add(mins.checked_mul(60)?)?
                .checked_add(secs)?;
            Some(Duration::from_secs(total))
        }
        _ => None,
    }
}
