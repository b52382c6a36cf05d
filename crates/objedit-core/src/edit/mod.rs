//! In-place region editors.
//!
//! Both editors take a [`ValidRegion`](crate::region::ValidRegion), so they
//! never see a rectangle that has not passed the bounds checks.
//!
//! - **Mask**: overwrite the region with a flat color
//! - **Rotate**: rotate the region's content about its own center, keeping
//!   the region's size
//!
//! # Coordinate System
//!
//! - Regions cover half-open pixel ranges, origin at the top-left corner
//! - Rotation angles are in degrees, positive = counter-clockwise

pub mod mask;
pub(crate) mod patch;
pub mod rotate;

pub use mask::{apply_mask, MASK_RED};
pub use rotate::{apply_region_rotation, is_identity_angle, InterpolationFilter};
