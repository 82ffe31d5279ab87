// src/application/commands/mod.rs
//
// Command Handlers
//
// ARCHITECTURE:
// - Commands are thin adapters between UI and Services
// - Commands accept plain values, return DTOs
// - Errors cross the boundary as serialized ErrorResponse JSON
// - Commands NEVER contain business logic

pub mod auth_commands;
pub mod favorites_commands;
pub mod movie_commands;

pub use auth_commands::*;
pub use favorites_commands::*;
pub use movie_commands::*;
