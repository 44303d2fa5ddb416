use reshop_catalog::InventoryError;
use reshop_core::UserError;
use reshop_order::{RecyclingError, RepairError};
use reshop_store::PersistenceError;
use serde::Serialize;

/// Coarse error classes the front end reacts to.
/// Every one of them is recoverable: report and re-prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    OutOfStock,
    NoTechnicianAvailable,
    InvalidStatus,
    InvalidTransition,
    InsufficientPoints,
    Persistence,
}

#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Repair(#[from] RepairError),

    #[error(transparent)]
    User(#[from] UserError),

    #[error(transparent)]
    Recycling(#[from] RecyclingError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl ShopError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShopError::Inventory(err) => match err {
                InventoryError::NotFound(_) => ErrorKind::NotFound,
                InventoryError::OutOfStock { .. } => ErrorKind::OutOfStock,
                InventoryError::InvalidArgument(_) | InventoryError::InvalidField(_) => {
                    ErrorKind::InvalidArgument
                }
            },
            ShopError::Repair(err) => match err {
                RepairError::NotFound(_) | RepairError::QueueEmpty => ErrorKind::NotFound,
                RepairError::InvalidStatus(_) => ErrorKind::InvalidStatus,
                RepairError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
                RepairError::NoTechnicianAvailable(_) => ErrorKind::NoTechnicianAvailable,
                RepairError::InvalidComplexity(_)
                | RepairError::AlreadyQueued(_)
                | RepairError::TrackerFull
                | RepairError::InvalidField(_) => ErrorKind::InvalidArgument,
            },
            ShopError::User(err) => match err {
                UserError::NotFound(_) => ErrorKind::NotFound,
                UserError::InsufficientPoints { .. } => ErrorKind::InsufficientPoints,
                UserError::Duplicate(_) | UserError::InvalidArgument(_) | UserError::InvalidField(_) => {
                    ErrorKind::InvalidArgument
                }
            },
            ShopError::Recycling(_) => ErrorKind::InvalidArgument,
            ShopError::Persistence(_) => ErrorKind::Persistence,
        }
    }
}
