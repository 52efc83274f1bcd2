//! Hard hat profile DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::HatProfileUpdate;

/// Request body for `PUT /api/hardhat`. Omitted or `null` fields keep
/// their stored value.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateHatRequest {
    /// New display label.
    #[serde(default)]
    pub nickname: Option<String>,
    /// New owner name.
    #[serde(default)]
    pub owner_name: Option<String>,
}

impl From<UpdateHatRequest> for HatProfileUpdate {
    fn from(req: UpdateHatRequest) -> Self {
        Self {
            nickname: req.nickname,
            owner_name: req.owner_name,
        }
    }
}

/// Response body for `PUT /api/hardhat`.
#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateHatResponse {
    /// Always `true` once the update statement has run.
    pub updated: bool,
}
