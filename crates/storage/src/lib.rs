//! Storage layer: the key-value persistence port, its adapters, and the bill
//! store that mirrors the bill book after every successful transition.

pub mod file;
pub mod kv;
pub mod layout;
pub mod store;

pub use file::FileKeyValueStore;
pub use kv::{InMemoryKeyValueStore, KeyValueStore, StorageError};
pub use layout::{BACKUP_KEY, DecodedBook, STORAGE_KEY, decode_book, decode_stored, encode_book};
pub use store::{BillStore, StoreError};
