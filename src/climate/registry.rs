use super::zone::{Zone, ZoneError};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// A zone's temperature at the moment of an operation, with the sentence the
/// voice pipeline reads back to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemperatureReading {
    pub zone: Zone,
    pub celsius: i64,
    pub message: String,
}

/// Current temperature per zone for one session.
///
/// Every zone holds a value from construction until drop. Each zone lives in
/// its own atomic cell, so concurrent calls against different zones never
/// contend and a write is atomic with respect to reads of the same zone.
///
/// Share a registry between handlers with `Arc`; build a fresh one per session.
pub struct ZoneRegistry {
    cells: [AtomicI64; Zone::ALL.len()],
}

impl ZoneRegistry {
    /// Create a registry holding the default reading for every zone.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: Zone::ALL.map(|zone| AtomicI64::new(zone.default_celsius())),
        }
    }

    /// Current reading for `zone`.
    pub fn read(&self, zone: Zone) -> TemperatureReading {
        tracing::info!(zone = %zone, "get temp");
        let celsius = self.cell(zone).load(Ordering::SeqCst);
        TemperatureReading {
            zone,
            celsius,
            message: format!("The temperature in the {zone} is {celsius}C"),
        }
    }

    /// Replace the reading for `zone`. Any integer is accepted.
    pub fn write(&self, zone: Zone, celsius: i64) -> TemperatureReading {
        tracing::info!(zone = %zone, temp = celsius, "set temp");
        let previous = self.cell(zone).swap(celsius, Ordering::SeqCst);
        tracing::debug!(zone = %zone, previous, current = celsius, "temperature replaced");
        TemperatureReading {
            zone,
            celsius,
            message: format!("The temperature in the {zone} is now {celsius}C"),
        }
    }

    /// Parse `zone` and read it.
    ///
    /// # Errors
    /// Returns [`ZoneError::Unknown`] if `zone` names no zone.
    pub fn read_str(&self, zone: &str) -> Result<TemperatureReading, ZoneError> {
        Ok(self.read(zone.parse()?))
    }

    /// Parse `zone` and write it. Nothing is stored when parsing fails.
    ///
    /// # Errors
    /// Returns [`ZoneError::Unknown`] if `zone` names no zone.
    pub fn write_str(&self, zone: &str, celsius: i64) -> Result<TemperatureReading, ZoneError> {
        Ok(self.write(zone.parse()?, celsius))
    }

    /// Every zone with its current value, in [`Zone::ALL`] order.
    #[must_use]
    pub fn snapshot(&self) -> [(Zone, i64); Zone::ALL.len()] {
        Zone::ALL.map(|zone| (zone, self.cell(zone).load(Ordering::SeqCst)))
    }

    fn cell(&self, zone: Zone) -> &AtomicI64 {
        &self.cells[zone.index()]
    }
}

impl Default for ZoneRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ZoneRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.snapshot().iter().map(|(zone, celsius)| (zone.as_str(), celsius)))
            .finish()
    }
}
