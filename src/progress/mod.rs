//! Persistent training progress: counters, the compact record they are
//! stored as, and the machine that loads, saves and reconciles them.

pub mod gateway;
pub mod machine;
pub mod record;
pub mod state;
pub mod telemetry;

pub use gateway::{PersistenceGateway, RemoteLoad, RemoteWrite, StoreGateway};
pub use machine::{LoadOptions, Phase, ProgressMachine};
pub use record::CompactRecord;
pub use state::ProgressState;
