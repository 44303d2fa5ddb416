pub mod models;
pub mod transactions;
pub mod repairs;
pub mod assignment;
pub mod recycling;

pub use models::{RepairRequest, RepairStatus, Technician, Transaction};
pub use transactions::{PopularItem, SalesSummary, TransactionLog};
pub use repairs::{Assignment, RepairError, RepairTracker, StatusChange};
pub use recycling::{RecycledItem, RecyclingError, RecyclingLog, RecyclingRecord, RecyclingStats};
