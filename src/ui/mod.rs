//! UI / rendering layer: everything that touches Ratatui widgets.
//!
//! This layer takes the *core* state and turns it into cells on the
//! terminal.  No bridge I/O happens here.

pub mod animation;
pub mod background;
pub mod layout;
pub mod sheet_widget;
pub mod theme;
