pub mod item;
pub mod pricing;
pub mod inventory;

pub use item::{demo_catalog, Condition, Item, NewItem};
pub use pricing::{DamageSeverity, PricingConfig, PricingEngine};
pub use inventory::{InventoryError, InventoryLedger, InventoryStatus};
