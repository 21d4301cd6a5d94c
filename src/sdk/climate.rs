//! The smart-home climate functions exposed to the voice runtime.
//!
//! | name              | parameters                 |
//! |-------------------|----------------------------|
//! | `get_temperature` | `zone`                     |
//! | `set_temperature` | `zone`, `temp` (integer)   |
//!
//! Both return the sentence the assistant should speak.

use super::tools::{ToolRegistry, ToolSpec, decode_arguments};
use crate::Result;
use crate::climate::{Zone, ZoneRegistry};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetTemperatureArgs {
    #[schemars(description = "The specific zone")]
    pub zone: Zone,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SetTemperatureArgs {
    #[schemars(description = "The specific zone")]
    pub zone: Zone,
    #[schemars(description = "The temperature to set")]
    pub temp: i64,
}

/// `get_temperature`: read one zone.
#[derive(Debug, Clone)]
pub struct GetTemperature {
    registry: Arc<ZoneRegistry>,
}

impl GetTemperature {
    #[must_use]
    pub const fn new(registry: Arc<ZoneRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl ToolSpec for GetTemperature {
    type Args = GetTemperatureArgs;
    type Output = String;

    const NAME: &'static str = "get_temperature";
    const DESCRIPTION: &'static str = "get the temperature in a specific room";

    fn decode(&self, arguments: Value) -> Result<Self::Args> {
        decode_zone_arguments(Self::NAME, arguments)
    }

    async fn call(&self, args: GetTemperatureArgs) -> Result<String> {
        Ok(self.registry.read(args.zone).message)
    }
}

/// `set_temperature`: overwrite one zone.
#[derive(Debug, Clone)]
pub struct SetTemperature {
    registry: Arc<ZoneRegistry>,
}

impl SetTemperature {
    #[must_use]
    pub const fn new(registry: Arc<ZoneRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl ToolSpec for SetTemperature {
    type Args = SetTemperatureArgs;
    type Output = String;

    const NAME: &'static str = "set_temperature";
    const DESCRIPTION: &'static str = "set the temperature in a specific room";

    fn decode(&self, arguments: Value) -> Result<Self::Args> {
        decode_zone_arguments(Self::NAME, arguments)
    }

    async fn call(&self, args: SetTemperatureArgs) -> Result<String> {
        Ok(self.registry.write(args.zone, args.temp).message)
    }
}

// The zone is checked on its own first so a bad zone surfaces as
// `Error::InvalidZone` rather than a generic argument error.
#[allow(clippy::result_large_err)]
fn decode_zone_arguments<T: serde::de::DeserializeOwned>(tool: &str, arguments: Value) -> Result<T> {
    if let Some(raw) = arguments.get("zone") {
        Zone::from_value(raw)?;
    }
    decode_arguments(tool, arguments)
}

/// Build the callable-function table for one session's registry.
#[must_use]
pub fn climate_tools(registry: &Arc<ZoneRegistry>) -> ToolRegistry {
    let mut tools = ToolRegistry::new();
    tools.register(GetTemperature::new(Arc::clone(registry)));
    tools.register(SetTemperature::new(Arc::clone(registry)));
    tools
}
