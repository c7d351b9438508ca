use crate::domain::Number;
use crate::domain::sensor_key::{SensorDescriptor, SensorKey};
use chrono::{DateTime, Utc};
use std::fmt::Display;

/// The display value of a sensor whose device answered the last tick.
#[derive(PartialEq, Debug, Clone)]
pub enum SensorValue {
    Number(Number),
    Text(String),
    Boolean(bool),
    Unknown,
}

impl Display for SensorValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorValue::Number(number) => write!(f, "{}", number),
            SensorValue::Text(text) => write!(f, "{}", text),
            SensorValue::Boolean(flag) => write!(f, "{}", flag),
            SensorValue::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum SensorState {
    Uninitialized,
    Live(SensorValue),
    Errored(String),
}

impl Display for SensorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorState::Uninitialized => write!(f, "uninitialized"),
            SensorState::Live(value) => write!(f, "{}", value),
            SensorState::Errored(cause) => write!(f, "Error: {}", cause),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct SensorEntity {
    key: SensorKey,
    unique_id: String,
    state: SensorState,
    last_updated: Option<DateTime<Utc>>,
}

impl SensorEntity {
    pub fn new(entry_id: &str, key: SensorKey) -> Self {
        SensorEntity {
            key,
            unique_id: format!("{}_{}", entry_id, key.wire_key()),
            state: SensorState::Uninitialized,
            last_updated: None,
        }
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn descriptor(&self) -> &'static SensorDescriptor {
        self.key.descriptor()
    }

    pub fn display_name(&self, device_name: &str) -> String {
        format!("{} {}", device_name, self.descriptor().label)
    }

    pub fn state(&self) -> &SensorState {
        &self.state
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Applies a freshly projected state. Returns whether the state changed.
    pub fn apply(&mut self, state: SensorState, now: DateTime<Utc>) -> bool {
        if self.state == state {
            return false;
        }

        self.state = state;
        self.last_updated = Some(now);
        true
    }
}
