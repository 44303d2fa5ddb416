pub mod ids;
pub mod models;
pub mod pii;
pub mod text;

pub use ids::{ItemId, RepairId};
pub use pii::Masked;
pub use text::{check_field, FieldError, FIELD_DELIMITER};
