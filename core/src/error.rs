use thiserror::Error;

use crate::config::ConfigError;
use crate::persistence::{SaveError, StoreError};
use crate::snapshot::SnapshotError;
use crate::surface::SurfaceError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Turns a failure the caller cannot act on into a logged `None`.
pub trait ResultExt<T, E> {
    fn ok_or_log(self) -> Option<T>
    where
        E: std::fmt::Display;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E> {
    fn ok_or_log(self) -> Option<T>
    where
        E: std::fmt::Display,
    {
        self.inspect_err(|err| tracing::error!("{}", err)).ok()
    }
}
