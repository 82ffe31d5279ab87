// src/application/mod.rs
//
// Application Layer
//
// ARCHITECTURE:
// - Boundary between a UI host (CLI, desktop shell) and the services
// - Translates domain values into DTOs
// - Translates AppError into ErrorResponse

pub mod commands;
pub mod dto;
pub mod error_handling;
pub mod state;

pub use commands::*;
pub use dto::*;
pub use error_handling::{ErrorResponse, ErrorType, ToErrorResponse};
pub use state::AppState;
