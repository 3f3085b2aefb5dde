//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;

use crate::domain::alignment::AlignerConfig;
use crate::domain::chunking::ChunkerConfig;
use crate::domain::session::SessionSettings;
use crate::domain::timing::{SeparatorPolicy, TimingFormat};
use crate::domain::SegmentConfig;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 分句配置
    #[serde(default)]
    pub segmenter: SegmenterConfig,

    /// 分块配置
    #[serde(default)]
    pub chunker: ChunkingConfig,

    /// 对齐配置
    #[serde(default)]
    pub aligner: AlignmentConfig,

    /// 计时元数据配置
    #[serde(default)]
    pub timing: TimingConfig,

    /// TTS 配置
    #[serde(default)]
    pub tts: TtsConfig,

    /// 预取配置
    #[serde(default)]
    pub prefetch: PrefetchConfig,

    /// 会话配置
    #[serde(default)]
    pub session: SessionConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// 打开会话用的领域配置
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            segment: SegmentConfig {
                extra_abbreviations: self.segmenter.extra_abbreviations.clone(),
            },
            chunker: ChunkerConfig {
                max_chars: self.chunker.max_chars,
            },
            aligner: AlignerConfig {
                search_window: self.aligner.search_window,
                max_distance: self.aligner.max_distance,
            },
        }
    }
}

/// 分句配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SegmenterConfig {
    /// 追加的缩写（如 "approx."），区分大小写
    #[serde(default)]
    pub extra_abbreviations: Vec<String>,
}

/// 分块配置
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkingConfig {
    /// 每块最大字符数
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

fn default_max_chars() -> usize {
    crate::domain::chunking::DEFAULT_MAX_CHARS
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
        }
    }
}

/// 对齐配置
///
/// 两个阈值都是经验值
#[derive(Debug, Clone, Deserialize)]
pub struct AlignmentConfig {
    #[serde(default = "default_search_window")]
    pub search_window: usize,

    #[serde(default = "default_max_distance")]
    pub max_distance: usize,
}

fn default_search_window() -> usize {
    crate::domain::alignment::DEFAULT_SEARCH_WINDOW
}

fn default_max_distance() -> usize {
    crate::domain::alignment::DEFAULT_MAX_DISTANCE
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            search_window: default_search_window(),
            max_distance: default_max_distance(),
        }
    }
}

/// 计时元数据配置
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    /// 逐字符时间是否包含分隔空格
    #[serde(default = "default_per_character_separators")]
    pub per_character_separators: SeparatorPolicy,

    /// 逐字素区间是否包含分隔空格
    #[serde(default = "default_per_grapheme_separators")]
    pub per_grapheme_separators: SeparatorPolicy,
}

fn default_per_character_separators() -> SeparatorPolicy {
    SeparatorPolicy::Counted
}

fn default_per_grapheme_separators() -> SeparatorPolicy {
    SeparatorPolicy::Skipped
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            per_character_separators: default_per_character_separators(),
            per_grapheme_separators: default_per_grapheme_separators(),
        }
    }
}

/// TTS 配置（演示用的模拟合成器）
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    /// 回报的计时格式: per_character, named_marks, per_grapheme
    #[serde(default = "default_timing_format")]
    pub timing_format: TimingFormat,

    /// 语速（字符/秒）
    #[serde(default = "default_chars_per_second")]
    pub chars_per_second: f64,

    /// 模拟合成延迟（毫秒）
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
}

fn default_timing_format() -> TimingFormat {
    TimingFormat::PerCharacter
}

fn default_chars_per_second() -> f64 {
    15.0
}

fn default_latency_ms() -> u64 {
    200
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            timing_format: default_timing_format(),
            chars_per_second: default_chars_per_second(),
            latency_ms: default_latency_ms(),
        }
    }
}

/// 预取配置
#[derive(Debug, Clone, Deserialize)]
pub struct PrefetchConfig {
    /// 最大并发合成数
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// 队列容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_max_concurrent() -> usize {
    2
}

fn default_queue_capacity() -> usize {
    256
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// 会话配置
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// 空闲过期时间（秒）
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

fn default_idle_timeout() -> u64 {
    1800 // 30 分钟
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
