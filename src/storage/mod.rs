pub mod document;
pub mod persistence;
pub mod store;

pub use document::{Document, validate_collection_name};
pub use persistence::DocumentFile;
pub use store::DocumentStore;
