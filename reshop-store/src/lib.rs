pub mod app_config;
pub mod codec;
pub mod data_file;

pub use codec::{PersistenceError, ShopSnapshot};
pub use data_file::DataFile;
