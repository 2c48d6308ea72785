pub mod connection;
pub mod field_data;

pub use connection::{Store, StoreConfig, StoreError, StoreStatus};
