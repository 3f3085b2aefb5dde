//! Timing Context - 播放时间与单词的映射
//!
//! 三种供应商计时格式统一为 TimingMetadata，
//! 由同一个映射函数按变体处理:
//! - PerCharacter: 逐字符起始时间
//! - NamedMarks: `word_<n>` 标记时间点
//! - PerGrapheme: 逐字素 [start, end] 区间

mod mapper;
mod markup;
mod metadata;

pub use mapper::{assign_word_timings, seek_time, word_at_time};
pub use markup::build_marked_request;
pub use metadata::{
    GraphemeRange, SeparatorPolicy, Timepoint, TimingFormat, TimingMetadata, WORD_MARK_PREFIX,
};
