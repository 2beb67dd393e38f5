//! Core logic – the sheet state machine and the host messaging bridge.
//!
//! Nothing in this module depends on any TUI or rendering crate, so every
//! piece can be exercised from unit tests without a terminal.

pub mod bridge;
pub mod sheet;
