//! Document Context - 文档限界上下文
//!
//! 职责:
//! - 句子/单词结构（Segmenter 的输出形状）
//! - 全局单词索引（按句子顺序展开）
//! - 单词计时的唯一写入入口

mod aggregate;
mod entities;
mod errors;
mod value_objects;

pub use aggregate::Document;
pub use entities::{reconstruct_words, Sentence, Word};
pub use errors::DocumentError;
pub use value_objects::WordTiming;
