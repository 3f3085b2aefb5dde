//! Document Context - Errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("单词索引越界: {index} (总单词数: {word_count})")]
    WordIndexOutOfRange { index: usize, word_count: usize },

    #[error("无效的计时: {0}")]
    InvalidTiming(String),
}
