use std::io;

use thiserror::Error;

use crate::tree::ViewId;

/// Errors returned by scene mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("view {0} does not exist or was destroyed")]
    StaleView(ViewId),
    #[error("cannot attach {child} to {parent}: {parent} is inside the subtree of {child}")]
    Cycle { child: ViewId, parent: ViewId },
    #[error("the scene root cannot be reparented or destroyed")]
    RootImmutable,
}

/// Errors returned when starting a compositor.
#[derive(Debug, Error)]
pub enum CompositorError {
    #[error("failed to spawn the animation thread: {0}")]
    Spawn(#[from] io::Error),
}
