//! Layout calculation modules for printing
//!
//! This module handles all the geometric calculations for putting an image
//! on paper:
//! - Page geometry (paper, margins, orientation, centering) and its validation
//! - Content placement (printable area, physical size, scaling, centering)
//! - Interactive edits of the placed rectangle
//! - A session that keeps the last valid placement

mod editor;
mod geometry;
mod placement;
mod session;

pub use editor::*;
pub use geometry::*;
pub use placement::*;
pub use session::*;
