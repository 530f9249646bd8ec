/// JSON file backend for the persisted record.
#[cfg(feature = "json-store")]
pub mod json_file;
/// Volatile backend.
pub mod memory;
/// Storage abstraction shared by the backends.
pub mod storage;
