//! # Office SDK - polling synchronization for the smart-office dashboard
//!
//! Keeps a local view of a simulated smart office in sync with its backend
//! by polling each REST resource on its own schedule:
//!
//! ```rust,no_run
//! use office_sdk::{OfficeSdk, SyncConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), office_sdk::SdkError> {
//!     let sdk = OfficeSdk::new(SyncConfig::from_env())?;
//!     sdk.start()?;
//!
//!     let mut changes = sdk.view().subscribe_changes();
//!     while changes.recv().await.is_ok() {
//!         let snapshot = sdk.snapshot();
//!         for room in snapshot.room_views() {
//!             println!("{}: {:.1} °C", room.room.name, room.display_temperature());
//!         }
//!     }
//!
//!     sdk.shutdown().await
//! }
//! ```
//!
//! ## Resources
//!
//! | Resource | Interval | On failure |
//! |---|---|---|
//! | environment state | 1 s | cycle skipped, logged |
//! | alerts | 2 s | empty list |
//! | agent messages | 2 s | empty list |
//! | heating, per room | 1 s | previous value kept |
//!
//! Heating pollers follow the rooms of the latest environment snapshot:
//! a room that appears gets a poller, a room that disappears loses it.
//!
//! ## Architecture
//!
//! ```text
//! office-sdk (SyncClient, OfficeSdk)
//!     ↓
//! office-state (ViewModel)      office-stream (pollers, supervisor)
//!     ↓                               ↓
//! office-api (model, typed fetches)
//!     ↓
//! http-client (Transport)
//! ```

pub use client::SyncClient;
pub use config::{SyncConfig, API_URL_ENV};
pub use error::{Result, SdkError};
pub use sdk::OfficeSdk;

// Re-export commonly used types
pub use http_client::{HttpTransport, Transport, TransportError};
pub use office_api::{
    AgentMessage, Alert, BlindState, Comfort, DeviceState, EnvironmentState, MessageType, Room,
    RoomHeatingResponse, RoomId, Severity,
};
pub use office_state::{
    init_logging, init_logging_from_env, LoggingMode, OfficeSnapshot, RoomView, ViewChange,
    ViewModel,
};
pub use office_stream::{FailurePolicy, PollStream, PollerStats};

mod client;
mod config;
mod error;
mod sdk;
