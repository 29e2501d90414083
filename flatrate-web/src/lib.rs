//! Flatrate Web - JSON API Server

#![deny(missing_docs)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]
//!
//! Answers which streaming services carry a title, either by free-text
//! title search across all sources or by a direct detail page link.

pub mod handlers;
pub mod server;

// Re-export main types
pub use server::{AppState, ServerConfig, build_router, run_server};
