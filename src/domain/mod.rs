//! Domain Layer - 领域层
//!
//! 纯同步逻辑，不做 I/O:
//! - Document Context: 句子/单词结构与单词计时
//! - Chunking Context: TTS 请求分块
//! - Alignment Context: STT 识别结果的模糊对齐
//! - Timing Context: 播放时间到单词的映射
//! - Session Context: 朗读会话与模式切换

pub mod alignment;
pub mod chunking;
pub mod document;
pub mod session;
pub mod timing;

// 共享的文本分割器
mod text_segmenter;

pub use text_segmenter::{segment_text, segment_text_default, SegmentConfig};
