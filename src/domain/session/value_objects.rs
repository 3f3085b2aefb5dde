//! Session Context - Value Objects

use serde::{Deserialize, Serialize};

/// 朗读模式
///
/// 播放和听写都会写入单词计时，二者互斥。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ReadingMode {
    #[default]
    Idle,
    /// TTS 播放某个块
    Playback { chunk_id: u32 },
    /// 用户朗读，STT 结果经对齐器写入
    Dictation,
}

impl ReadingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingMode::Idle => "idle",
            ReadingMode::Playback { .. } => "playback",
            ReadingMode::Dictation => "dictation",
        }
    }
}

impl std::fmt::Display for ReadingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 高亮结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Highlight {
    /// 当前高亮的全局单词索引
    pub word_index: Option<usize>,
    /// 与上一次相比是否变化
    pub changed: bool,
}

/// 跳转目标
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeekTarget {
    pub chunk_id: u32,
    pub time_seconds: f64,
}
