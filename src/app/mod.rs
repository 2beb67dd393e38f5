//! Application orchestration: state management, event loop, and input handling.

pub mod event;
pub mod gesture;
pub mod handler;
pub mod host;
pub mod state;
pub mod terminal;
