use chrono::{DateTime, Utc};
use reshop_shared::{ItemId, RepairId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A completed sale. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    /// Catalog item sold; `None` for sales loaded from files that predate item ids
    pub item_id: Option<ItemId>,
    /// Item name at the time of sale
    pub item_name: String,
    /// Amount actually paid, after any discount
    pub price: u32,
    pub timestamp: DateTime<Utc>,
}

/// Repair request status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepairStatus {
    Pending,
    InProgress,
    Assigned,
    Completed,
}

impl RepairStatus {
    /// Parse a status typed by an admin.
    ///
    /// Only "pending", "in progress" and "completed" are accepted, in any
    /// case. `Assigned` is reachable through technician assignment only.
    pub fn parse_update(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "pending" => Some(RepairStatus::Pending),
            "in progress" => Some(RepairStatus::InProgress),
            "completed" => Some(RepairStatus::Completed),
            _ => None,
        }
    }

    /// Parse a status read back from the data file (any case, including "assigned")
    pub fn parse_stored(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "assigned" => Some(RepairStatus::Assigned),
            _ => Self::parse_update(raw),
        }
    }

    /// Canonical label
    pub fn as_str(self) -> &'static str {
        match self {
            RepairStatus::Pending => "Pending",
            RepairStatus::InProgress => "In Progress",
            RepairStatus::Assigned => "Assigned",
            RepairStatus::Completed => "Completed",
        }
    }

    /// Position in the lifecycle; `InProgress` and `Assigned` share a stage.
    pub fn stage(self) -> u8 {
        match self {
            RepairStatus::Pending => 0,
            RepairStatus::InProgress | RepairStatus::Assigned => 1,
            RepairStatus::Completed => 2,
        }
    }
}

impl fmt::Display for RepairStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An item brought in for repair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepairRequest {
    pub id: RepairId,
    /// Free-text name of the customer's item; need not exist in the catalog
    pub item_name: String,
    pub issue: String,
    pub status: RepairStatus,
    pub submitted_at: DateTime<Utc>,
    /// 1 (trivial) to 5 (hard), set when queued for assignment
    pub complexity: Option<u8>,
    pub assigned_technician: Option<String>,
}

impl RepairRequest {
    pub fn new(id: RepairId, item_name: String, issue: String, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id,
            item_name,
            issue,
            status: RepairStatus::Pending,
            submitted_at,
            complexity: None,
            assigned_technician: None,
        }
    }
}

/// A staff member who can take repair jobs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Technician {
    pub name: String,
    /// 1 to 5, compared against repair complexity
    pub expertise: u8,
}

impl Technician {
    pub fn new(name: impl Into<String>, expertise: u8) -> Self {
        Self {
            name: name.into(),
            expertise,
        }
    }
}
