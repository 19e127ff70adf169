//! Latest-value view model for the smart-office dashboard
//!
//! The [`ViewModel`] merges the independent poller outputs of the SDK into
//! four slots that a renderer can read at any time:
//!
//! ```rust,ignore
//! let view = ViewModel::new();
//! view.bind(sources);
//!
//! let mut changes = view.subscribe_changes();
//! while changes.recv().await.is_ok() {
//!     let snapshot = view.snapshot();
//!     for room in snapshot.room_views() {
//!         println!("{}: {:.1} °C heating={:?}",
//!             room.room.name, room.display_temperature(), room.heating_active);
//!     }
//! }
//! ```

pub mod logging;
pub mod snapshot;
pub mod view;

pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use snapshot::{OfficeSnapshot, RoomView};
pub use view::{ViewChange, ViewModel, ViewSources, DEFAULT_CHANGE_BUFFER};
