use crate::domain::Number;
use crate::domain::sensor_key::SensorKey;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::trace;

/// A scalar value as reported by the device.
#[derive(PartialEq, Debug, Clone)]
pub enum RawValue {
    Number(Number),
    Text(String),
    Boolean(bool),
}

/// The last successfully parsed `/api/system/info` document, restricted to known sensor keys.
///
/// A snapshot is immutable; the next successful fetch replaces it as a whole.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct DeviceSnapshot {
    values: HashMap<SensorKey, RawValue>,
}

impl DeviceSnapshot {
    pub fn from_object(document: Map<String, Value>) -> Self {
        let values = document
            .into_iter()
            .filter_map(|(key, value)| {
                let Some(sensor_key) = SensorKey::from_wire_key(&key) else {
                    trace!("Ignoring unknown key '{}'", key);
                    return None;
                };

                let raw_value = match value {
                    Value::Number(number) => RawValue::Number(Number::from(&number)),
                    Value::String(text) => RawValue::Text(text),
                    Value::Bool(flag) => RawValue::Boolean(flag),
                    Value::Null => return None,
                    Value::Array(_) | Value::Object(_) => {
                        trace!("Ignoring non-scalar value for key '{}'", key);
                        return None;
                    }
                };

                Some((sensor_key, raw_value))
            })
            .collect();

        DeviceSnapshot { values }
    }

    pub fn get(&self, key: SensorKey) -> Option<&RawValue> {
        self.values.get(&key)
    }

    /// The hostname the device reports for itself, if any.
    pub fn hostname(&self) -> Option<&str> {
        match self.values.get(&SensorKey::Hostname) {
            Some(RawValue::Text(hostname)) if !hostname.is_empty() => Some(hostname),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
impl<const N: usize> From<[(SensorKey, RawValue); N]> for DeviceSnapshot {
    fn from(values: [(SensorKey, RawValue); N]) -> Self {
        DeviceSnapshot {
            values: HashMap::from(values),
        }
    }
}
