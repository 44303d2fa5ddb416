pub mod error;
pub mod shop;

pub use error::{ErrorKind, ShopError};
pub use shop::{Receipt, Shop, ShopOverview};
