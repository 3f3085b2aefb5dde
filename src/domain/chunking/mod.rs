//! Chunking Context - TTS 批量请求分块
//!
//! 职责:
//! - 按句子贪心装箱，句子永不跨块
//! - Chunk 生命周期（Pending -> Loading -> Ready/Error）

mod chunker;
mod entities;
mod errors;
mod value_objects;

pub use chunker::{
    chunk_for_sentence, chunk_for_word, create_chunks, ChunkerConfig, DEFAULT_MAX_CHARS,
};
pub use entities::Chunk;
pub use errors::ChunkError;
pub use value_objects::{AudioHandle, ChunkStatus};
