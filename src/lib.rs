//! Validated person records and their SQLite-backed store.

pub mod config;
pub mod error;
pub mod models;
pub mod ops;
pub mod seed;
pub mod store;
pub mod transfer;

pub use config::DbConfig;
pub use error::{
    ConfigError, EditError, Field, PersonError, StoreError, StoreResult, TransferError,
};
pub use models::{Person, RawPerson, UNSAVED_ID};
pub use store::PersonStore;
