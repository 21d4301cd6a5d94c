use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A named area of the home with its own temperature reading.
///
/// The set is closed: anything coming from outside the crate as a string goes
/// through [`Zone::from_str`] or [`Zone::from_value`] before it reaches the
/// registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    LivingRoom,
    Bedroom,
    Kitchen,
    Bathroom,
    Office,
}

impl Zone {
    /// Every zone, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::LivingRoom,
        Self::Bedroom,
        Self::Kitchen,
        Self::Bathroom,
        Self::Office,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LivingRoom => "living_room",
            Self::Bedroom => "bedroom",
            Self::Kitchen => "kitchen",
            Self::Bathroom => "bathroom",
            Self::Office => "office",
        }
    }

    /// Reading (Celsius) a fresh registry starts with.
    #[must_use]
    pub const fn default_celsius(self) -> i64 {
        match self {
            Self::LivingRoom => 22,
            Self::Bedroom => 20,
            Self::Kitchen => 24,
            Self::Bathroom => 23,
            Self::Office => 21,
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    /// Coerce a raw JSON argument into a zone.
    ///
    /// # Errors
    /// Returns [`ZoneError::Unknown`] for a string outside the enumeration and
    /// [`ZoneError::Malformed`] for any non-string value.
    pub fn from_value(value: &Value) -> Result<Self, ZoneError> {
        match value {
            Value::String(raw) => raw.parse(),
            Value::Null => Err(ZoneError::Malformed("null")),
            Value::Bool(_) => Err(ZoneError::Malformed("boolean")),
            Value::Number(_) => Err(ZoneError::Malformed("number")),
            Value::Array(_) => Err(ZoneError::Malformed("array")),
            Value::Object(_) => Err(ZoneError::Malformed("object")),
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Zone {
    type Err = ZoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|zone| zone.as_str() == s)
            .ok_or_else(|| ZoneError::Unknown(s.to_string()))
    }
}

/// Why an external value could not be turned into a [`Zone`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZoneError {
    /// A string that names no zone, e.g. `"garage"`.
    #[error("unknown zone `{0}`, expected one of living_room, bedroom, kitchen, bathroom, office")]
    Unknown(String),
    /// Not a string at all. Carries the JSON type that was supplied.
    #[error("zone must be a string, got {0}")]
    Malformed(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_every_snake_case_name() {
        for zone in Zone::ALL {
            assert_eq!(zone.as_str().parse::<Zone>(), Ok(zone));
        }
    }

    #[test]
    fn display_matches_wire_name() {
        assert_eq!(Zone::LivingRoom.to_string(), "living_room");
        assert_eq!(serde_json::to_value(Zone::LivingRoom).unwrap(), json!("living_room"));
    }

    #[test]
    fn rejects_other_casings() {
        assert_eq!(
            "Kitchen".parse::<Zone>(),
            Err(ZoneError::Unknown("Kitchen".to_string()))
        );
        assert_eq!(
            "LIVING_ROOM".parse::<Zone>(),
            Err(ZoneError::Unknown("LIVING_ROOM".to_string()))
        );
    }

    #[test]
    fn from_value_distinguishes_unknown_and_malformed() {
        assert_eq!(
            Zone::from_value(&json!("garage")),
            Err(ZoneError::Unknown("garage".to_string()))
        );
        assert_eq!(Zone::from_value(&json!(3)), Err(ZoneError::Malformed("number")));
        assert_eq!(Zone::from_value(&json!(null)), Err(ZoneError::Malformed("null")));
        assert_eq!(Zone::from_value(&json!({"zone": "office"})), Err(ZoneError::Malformed("object")));
        assert_eq!(Zone::from_value(&json!("office")), Ok(Zone::Office));
    }

    #[test]
    fn index_follows_all_order() {
        for (i, zone) in Zone::ALL.into_iter().enumerate() {
            assert_eq!(zone.index(), i);
        }
    }
}
