//! Filedock Server - HTTP API for uploads and tabular previews
//!
//! This crate exposes the Filedock upload store and previewer over HTTP:
//!
//! - **Uploads**: multipart forms whose labelled parts are saved under
//!   sanitized, deterministic names
//! - **Static retrieval**: stored files served read-only under a prefix
//! - **Previews**: header plus the first rows of a stored delimited file,
//!   with the delimiter detected when not supplied
//! - **Health**: liveness and readiness checks
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - API information
//! - `GET /api/hello` - Greeting
//! - `POST /api/upload` - Store the `spec` and/or `csv` parts of a multipart form
//! - `POST /api/preview` - Preview a stored file
//! - `GET /files/{stored_name}` - Retrieve a stored file
//! - `GET /health` - Liveness check
//! - `GET /ready` - Readiness check

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ErrorResponse, ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
