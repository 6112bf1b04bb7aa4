/// Persisted record definitions.
pub mod models;
/// Finished rounds history.
pub mod rounds;
/// Persisted settings slots.
pub mod settings;
/// Slot store implementations.
pub mod slot_store;
/// Storage abstraction layer.
pub mod storage;
