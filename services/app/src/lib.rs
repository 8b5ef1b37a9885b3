//! services/app/src/lib.rs
//!
//! The client side of the kids learning platform: an API client, the
//! persisted application state and the routing guard that keeps every role
//! on screens it may see.

pub mod api_client;
pub mod config;
pub mod controller;
pub mod error;
pub mod pin;
pub mod storage;
pub mod transport;

pub use api_client::{ApiClient, ApiRequest, ApiResponse, Transport};
pub use controller::AppController;
pub use error::{AppError, AppResult, ClientError};
pub use storage::{FileStorage, MemoryStorage};
pub use transport::{HttpTransport, OfflineTransport, RouterTransport};
