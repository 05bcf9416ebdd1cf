//! Shared data model for the portal capability layer.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Canonical name of the inverter state-code attribute.
pub const INVERTER_STATE: &str = "state";

/// Canonical name of the daily energy counter attribute.
pub const ENERGY_TODAY: &str = "energy_today";

/// Unique identifier for an inverter (its portal serial number).
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct InverterSerial(pub String);

impl InverterSerial {
    /// Create a new serial from a string.
    pub fn new(serial: impl Into<String>) -> Self {
        Self(serial.into())
    }

    /// Get the serial as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for InverterSerial {
    fn from(serial: String) -> Self {
        Self(serial)
    }
}

impl From<&str> for InverterSerial {
    fn from(serial: &str) -> Self {
        Self(serial.to_string())
    }
}

impl fmt::Display for InverterSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One reading reported by the portal.
///
/// Readings are heterogeneous: power and energy values are numeric, state
/// codes arrive as numbers, and a handful of fields (model names, firmware
/// versions) are plain text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// A numeric reading.
    Number(f64),
    /// A textual reading.
    Text(String),
}

impl AttributeValue {
    /// The numeric value, when this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            AttributeValue::Text(_) => None,
        }
    }

    /// The text value, when this is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Number(_) => None,
            AttributeValue::Text(s) => Some(s),
        }
    }

    /// Convert a raw portal JSON value into a reading.
    ///
    /// Portals are inconsistent about numeric fields: the same field can
    /// arrive as a JSON number or as a numeric string. Strings that parse as
    /// numbers become [`AttributeValue::Number`].
    pub(crate) fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(AttributeValue::Number),
            Value::String(s) => Some(
                s.parse::<f64>()
                    .map(AttributeValue::Number)
                    .unwrap_or_else(|_| AttributeValue::Text(s.clone())),
            ),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Number(n) => write!(f, "{}", n),
            AttributeValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Operating state reported by an inverter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InverterState {
    /// Powering up after a standby period.
    Starting,
    /// Powered down, typically overnight.
    Standby,
    /// Generating normally.
    Running,
    /// A code this crate does not know about.
    Unknown(i64),
}

impl InverterState {
    /// Map a raw portal state code to a state.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => InverterState::Starting,
            2 => InverterState::Standby,
            3 => InverterState::Running,
            other => InverterState::Unknown(other),
        }
    }

    /// The raw portal state code.
    pub fn code(&self) -> i64 {
        match self {
            InverterState::Starting => 1,
            InverterState::Standby => 2,
            InverterState::Running => 3,
            InverterState::Unknown(code) => *code,
        }
    }
}

/// All attributes reported by one inverter in one fetch.
///
/// Produced fresh per poll and discarded after dispatch; nothing holds on to
/// a snapshot across cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InverterData {
    serial: InverterSerial,
    attributes: HashMap<String, AttributeValue>,
}

impl InverterData {
    /// Create a snapshot from a serial and its attribute map.
    pub fn new(serial: InverterSerial, attributes: HashMap<String, AttributeValue>) -> Self {
        Self { serial, attributes }
    }

    /// The inverter this snapshot belongs to.
    pub fn serial(&self) -> &InverterSerial {
        &self.serial
    }

    /// Look up one attribute by canonical name.
    pub fn get(&self, attribute: &str) -> Option<&AttributeValue> {
        self.attributes.get(attribute)
    }

    /// Names of all attributes present in this snapshot.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.attributes.keys()
    }

    /// All (attribute, value) pairs in this snapshot.
    pub fn attributes(&self) -> impl Iterator<Item = (&String, &AttributeValue)> {
        self.attributes.iter()
    }

    /// Number of attributes in this snapshot.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether the snapshot carries no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// The inverter state carried in this snapshot, when present.
    pub fn state(&self) -> Option<InverterState> {
        self.get(INVERTER_STATE)
            .and_then(AttributeValue::as_f64)
            .map(|code| InverterState::from_code(code as i64))
    }
}

/// Map raw portal detail fields to canonical attribute names.
///
/// `fields` pairs the portal's field name with the canonical attribute name.
/// Fields absent from the payload are skipped; fields that cannot be read as
/// a number or string are logged and skipped.
pub(crate) fn map_portal_fields(
    detail: &Value,
    fields: &[(&str, &str)],
) -> HashMap<String, AttributeValue> {
    let mut attributes = HashMap::new();
    for (portal_key, attribute) in fields {
        let Some(raw) = detail.get(portal_key) else {
            continue;
        };
        match AttributeValue::from_json(raw) {
            Some(value) => {
                attributes.insert((*attribute).to_string(), value);
            }
            None => warn!("ignoring unparseable portal field {}", portal_key),
        }
    }
    attributes
}
