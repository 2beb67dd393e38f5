//! Three-state swipeable bottom sheet.
//!
//! The sheet rests at one of three snap positions and follows the pointer
//! while it is being dragged.  `policy` decides where a released drag lands,
//! `controller` owns the live state and derives what should be drawn.

pub mod controller;
pub mod policy;
pub mod snap;

pub use controller::{MidDragPolicy, RenderMode, RequestOutcome, SheetController};
pub use policy::Thresholds;
pub use snap::{SnapFractions, SnapPositions, SnapState};
