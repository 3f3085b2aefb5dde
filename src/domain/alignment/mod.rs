//! Alignment Context - 实时朗读对齐
//!
//! 把 STT 流式识别出的单词近似匹配到参考文本，
//! 容忍跳读、插入（口头语）和误识别。

mod aligner;
mod distance;

pub use aligner::{
    clean_word, AlignerConfig, FuzzyAligner, RecognizedWord, DEFAULT_MAX_DISTANCE,
    DEFAULT_SEARCH_WINDOW,
};
pub use distance::bounded_levenshtein;
