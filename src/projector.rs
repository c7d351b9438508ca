use crate::domain::sensor::{SensorState, SensorValue};
use crate::domain::sensor_key::SensorKey;
use crate::domain::snapshot::{DeviceSnapshot, RawValue};
use crate::miner::FetchError;
use std::sync::Arc;

const MAX_TEXT_LENGTH: usize = 255;
const DECIMALS: usize = 2;

/// The result of the most recent tick of a device, shared by all of its sensors.
#[derive(PartialEq, Debug, Clone)]
pub enum PollOutcome {
    Snapshot(Arc<DeviceSnapshot>),
    Failed(FetchError),
}

impl From<Result<DeviceSnapshot, FetchError>> for PollOutcome {
    fn from(result: Result<DeviceSnapshot, FetchError>) -> Self {
        match result {
            Ok(snapshot) => PollOutcome::Snapshot(Arc::new(snapshot)),
            Err(e) => PollOutcome::Failed(e),
        }
    }
}

/// Derives the state of a single sensor from the latest outcome, if there is one.
pub fn project(outcome: Option<&PollOutcome>, key: SensorKey) -> SensorState {
    match outcome {
        None => SensorState::Errored("no snapshot available".to_string()),
        Some(PollOutcome::Failed(e)) => SensorState::Errored(e.to_string()),
        Some(PollOutcome::Snapshot(snapshot)) => SensorState::Live(project_value(snapshot, key)),
    }
}

pub fn project_all(outcome: Option<&PollOutcome>) -> Vec<(SensorKey, SensorState)> {
    SensorKey::ALL.into_iter().map(|key| (key, project(outcome, key))).collect()
}

fn project_value(snapshot: &DeviceSnapshot, key: SensorKey) -> SensorValue {
    match snapshot.get(key) {
        None => SensorValue::Unknown,
        Some(RawValue::Number(number)) => SensorValue::Number(number.rounded(DECIMALS)),
        Some(RawValue::Text(text)) => SensorValue::Text(truncate(text)),
        Some(RawValue::Boolean(flag)) => SensorValue::Boolean(*flag),
    }
}

fn truncate(text: &str) -> String {
    match text.char_indices().nth(MAX_TEXT_LENGTH) {
        Some((index, _)) => text[..index].to_string(),
        None => text.to_string(),
    }
}
