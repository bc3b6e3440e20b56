//! URL model, round engine, error taxonomy and the storage adapters.

pub mod engine;
pub mod error;
pub mod hash;
pub mod remote_store;
pub mod store;
pub mod time;
pub mod types;
pub mod url;
