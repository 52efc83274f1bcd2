//! Domain layer: hat identity, sensor value normalization, and event records.
//!
//! The normalizers in [`impact`] and [`light`] are pure and total. They
//! turn whatever the device firmware sends into the canonical values the
//! event store holds.

mod coerce;
pub mod event;
pub mod hard_hat;
pub mod hat_id;
pub mod impact;
pub mod light;

pub use event::{EventSnapshot, EventWithOwner, NewImpactEvent, StoredImpactEvent};
pub use hard_hat::{HardHat, HatProfileUpdate};
pub use hat_id::HatId;
pub use impact::{ImpactSeverity, normalize_impact};
pub use light::{LightState, normalize_light};
