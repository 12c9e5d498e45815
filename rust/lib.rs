pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod portal;
pub mod prompt;
pub mod render;
pub mod router;
pub mod session;
pub mod transport;
pub mod workflow;

pub use client::ApiClient;
pub use config::Config;
pub use error::{PortalError, PortalResult};
pub use portal::Portal;
