use crate::ids::{ItemId, RepairId};
use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct PurchaseCompletedEvent {
    pub event_id: Uuid,
    pub username: String,
    pub item_id: ItemId,
    pub item_name: String,
    pub price: u32,
    pub loyalty_points_earned: u32,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct RepairStatusChangedEvent {
    pub event_id: Uuid,
    pub repair_id: RepairId,
    pub item_name: String,
    pub from_status: String,
    pub to_status: String,
    pub technician: Option<String>,
    pub timestamp: i64,
}
