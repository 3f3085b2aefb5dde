//! Chunking Context - Errors

use thiserror::Error;

use super::ChunkStatus;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("Chunk 不存在: {0}")]
    NotFound(u32),

    #[error("无效的状态转换: chunk {id} {from} -> {to}")]
    InvalidTransition {
        id: u32,
        from: ChunkStatus,
        to: ChunkStatus,
    },
}
