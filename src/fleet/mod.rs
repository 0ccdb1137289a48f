//! Fleet records: messengers, clients and vehicles.

pub mod directory;
pub mod types;

pub use directory::FleetDirectory;
pub use types::{Client, Messenger, MessengerStatus, Vehicle};
