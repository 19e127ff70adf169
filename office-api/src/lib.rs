//! Typed access to the smart-office simulation backend
//!
//! This crate provides the data model served by the backend and a thin,
//! type-safe client for its REST surface. It uses the private `http-client`
//! crate for the actual request/response exchange.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use http_client::HttpTransport;
//! use office_api::{EnvironmentApi, DEFAULT_BASE_URL};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let api = EnvironmentApi::new(Arc::new(HttpTransport::new()?), DEFAULT_BASE_URL)?;
//! let state = api.get_environment_state().await?;
//! println!("{} rooms at {}", state.rooms.len(), state.simulation_time);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod endpoint;
pub mod error;
pub mod model;

pub use client::{EnvironmentApi, DEFAULT_BASE_URL};
pub use endpoint::Endpoint;
pub use error::{ApiError, Result};
pub use model::*;
