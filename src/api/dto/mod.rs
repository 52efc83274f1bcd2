//! Data Transfer Objects for REST request/response serialization.

pub mod common_dto;
pub mod events_dto;
pub mod hat_dto;
pub mod impact_dto;

pub use common_dto::*;
pub use events_dto::*;
pub use hat_dto::*;
pub use impact_dto::*;
