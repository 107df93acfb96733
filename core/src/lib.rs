//! Freehand drawing board logic.
//!
//! [`Board`] turns pointer and keyboard input into calls on a [`Surface`] and
//! persists style and bitmap snapshots into a [`Store`]. The browser client
//! supplies canvas- and `localStorage`-backed implementations; [`Raster`] and
//! [`MemoryStore`] run the same logic headless.

pub mod board;
pub mod config;
pub mod eraser;
pub mod error;
pub mod geometry;
pub mod keys;
pub mod persistence;
pub mod pointer;
pub mod raster;
pub mod snapshot;
pub mod style;
pub mod surface;

#[cfg(test)]
mod testing;

pub use board::{Board, TextPrompt};
pub use config::{Config, ConfigError, StorageKeys};
pub use eraser::{eraser_cursor, Cursor, EraserState};
pub use error::{Error, Result, ResultExt};
pub use geometry::{normalize_point, Point, Size};
pub use keys::Key;
pub use persistence::{MemoryStore, PersistenceCycle, SaveError, Store, StoreError};
pub use pointer::{PointerButton, PointerEvent, PointerKind, PointerMachine, StrokeState};
pub use raster::Raster;
pub use snapshot::{decode_snapshot, encode_snapshot, Bitmap, SnapshotError};
pub use style::StyleState;
pub use surface::{Surface, SurfaceError};
