use thiserror::Error;

use crate::geometry::{Point, Size};
use crate::snapshot::SnapshotError;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("snapshot could not be decoded: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("drawing backend failed: {0}")]
    Backend(String),
    #[error("surface is no longer attached")]
    Detached,
}

/// The 2-D bitmap the board draws on.
///
/// Coordinates are logical; the implementation applies its device scale.
/// `capture` and `restore` work on raw physical pixels at the origin and are
/// only used to carry content across a resize.
pub trait Surface {
    type Capture;

    fn draw_line(&mut self, from: Point, to: Point, color: &str, width: u32)
        -> Result<(), SurfaceError>;

    /// Filled square of side `size` with its top-left corner at `position`.
    fn fill_dot(&mut self, position: Point, size: u32, color: &str) -> Result<(), SurfaceError>;

    fn draw_text(
        &mut self,
        text: &str,
        position: Point,
        color: &str,
        font: &str,
    ) -> Result<(), SurfaceError>;

    fn clear_region(&mut self, position: Point, width: f64, height: f64);

    fn clear(&mut self) {
        let size = self.logical_size();
        self.clear_region(Point::ORIGIN, size.width, size.height);
    }

    fn export_snapshot(&self) -> Result<String, SurfaceError>;

    /// Draws a previously exported snapshot at the origin. Browser surfaces
    /// finish the draw asynchronously once the image has decoded.
    fn import_snapshot(&mut self, snapshot: &str) -> Result<(), SurfaceError>;

    /// True while an imported snapshot has not been drawn yet.
    fn is_importing(&self) -> bool {
        false
    }

    fn capture(&self) -> Result<Self::Capture, SurfaceError>;

    fn restore(&mut self, capture: &Self::Capture) -> Result<(), SurfaceError>;

    /// Reallocates the backing bitmap in physical pixels. Content is lost.
    fn resize(&mut self, width: u32, height: u32);

    fn set_device_scale(&mut self, factor: f64);

    fn logical_size(&self) -> Size;
}
