use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GearDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub total_quantity: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpdateGearDescriptor {
    pub id: i64,
    #[serde(flatten)]
    pub gear: GearDescriptor,
    /// Overrides the available stock. Kept as is when absent.
    #[serde(default)]
    pub available_quantity: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GearTargetDescriptor {
    pub gear_id: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GearRequestTargetDescriptor {
    pub request_id: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreatedResult {
    pub id: i64,
}
