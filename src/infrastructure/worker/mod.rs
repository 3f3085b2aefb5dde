//! Worker Layer - Background Task Processing
//!
//! 实现 ChunkPrefetchWorker，后台预取块的合成音频和计时

mod chunk_prefetch_worker;

pub use chunk_prefetch_worker::{ChunkJob, ChunkPrefetchWorker, PrefetchWorkerConfig};
