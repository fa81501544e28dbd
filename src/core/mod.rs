pub mod error;
pub mod types;

pub use error::{Result, ShopError};
pub use types::{ID_FIELD, Record, RecordId, record_from};
