use blockworld_common::{BlockPos, ConfigError};
use blockworld_kernel::WorldError;
use blockworld_stream::StreamError;

/// Errors surfaced by [`crate::Session`].
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("world error: {0}")]
    World(#[from] WorldError),
    #[error("stream error: {0}")]
    Stream(#[from] StreamError),
    #[error("block at {0} cannot be mined")]
    Unbreakable(BlockPos),
    #[error("{0} is occupied by the actor")]
    Obstructed(BlockPos),
}
