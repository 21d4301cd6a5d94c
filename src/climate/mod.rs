//! Zone temperature state for a single voice session.
//!
//! [`ZoneRegistry`] is the only stateful piece of the crate. It knows nothing
//! about tools, transports or credentials; the callable-function table in
//! [`crate::sdk`] wraps it for the voice runtime.

mod registry;
mod zone;

pub use registry::{TemperatureReading, ZoneRegistry};
pub use zone::{Zone, ZoneError};
