//! Sensor reporting schema
//!
//! The message set spoken by the field sensors: a [`SensorData`] report
//! carrying a nested [`Value`] reading.

use crate::array::FixedString;
use crate::error::Result;
use crate::message;
use crate::DEFAULT_STRING_CAPACITY;

/// Message type constants
pub mod msg_types {
    /// Sensor report
    pub const SENSOR_DATA: u16 = 0;
    /// Measured value with unit
    pub const VALUE: u16 = 1;
}

message! {
    /// A measurement and its unit
    pub struct Value(msg_types::VALUE) {
        /// Raw reading
        0 => pub value: u32,
        /// Unit label, e.g. `"mV"`
        1 => pub unit: FixedString<DEFAULT_STRING_CAPACITY>,
    }
}

message! {
    /// Report from one sensor
    pub struct SensorData(msg_types::SENSOR_DATA) {
        /// Sensor identifier
        0 => pub id: u32,
        /// Human readable sensor name
        1 => pub name: FixedString<DEFAULT_STRING_CAPACITY>,
        /// Current reading
        2 => pub value: Value,
    }
}

impl Value {
    /// Build a reading, failing if `unit` does not fit
    pub fn new(value: u32, unit: &str) -> Result<Self> {
        Ok(Self {
            value,
            unit: FixedString::try_from_str(unit)?,
        })
    }
}

impl SensorData {
    /// Build a report, failing if `name` does not fit
    pub fn new(id: u32, name: &str, value: Value) -> Result<Self> {
        Ok(Self {
            id,
            name: FixedString::try_from_str(name)?,
            value,
        })
    }
}
