mod file;
mod memory;

pub use file::{FileSlotStore, FileStoreError};
pub use memory::MemorySlotStore;
