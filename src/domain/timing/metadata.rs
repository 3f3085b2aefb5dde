//! Timing Context - 计时元数据

use serde::{Deserialize, Serialize};

/// 单词标记名前缀，`word_3` 表示块内第 3 个单词之前的位置
pub const WORD_MARK_PREFIX: &str = "word_";

/// 单词之间的分隔空格是否占用字符流中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparatorPolicy {
    /// 每个单词之后计入一个分隔符
    Counted,
    /// 字符流不含空白
    Skipped,
}

/// 命名时间点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timepoint {
    pub name: String,
    pub time_seconds: f64,
}

impl Timepoint {
    pub fn new(name: impl Into<String>, time_seconds: f64) -> Self {
        Self {
            name: name.into(),
            time_seconds,
        }
    }

    /// 块内第 ordinal 个单词的标记
    pub fn for_word(ordinal: usize, time_seconds: f64) -> Self {
        Self::new(format!("{}{}", WORD_MARK_PREFIX, ordinal), time_seconds)
    }

    /// 解析 `word_<n>`，格式不符返回 None
    pub fn word_ordinal(&self) -> Option<usize> {
        self.name.strip_prefix(WORD_MARK_PREFIX)?.parse().ok()
    }
}

/// 字素时间区间
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphemeRange {
    pub start: f64,
    pub end: f64,
}

impl GraphemeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}

/// 供应商计时元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimingMetadata {
    /// 与块文本逐字符一一对应的起始时间
    PerCharacter {
        start_times: Vec<f64>,
        separators: SeparatorPolicy,
    },
    /// 标记型时间点（需要带标记的合成请求）
    NamedMarks { timepoints: Vec<Timepoint> },
    /// 与块文本逐字素一一对应的时间区间
    PerGrapheme {
        ranges: Vec<GraphemeRange>,
        separators: SeparatorPolicy,
    },
}

impl TimingMetadata {
    pub fn format(&self) -> TimingFormat {
        match self {
            TimingMetadata::PerCharacter { .. } => TimingFormat::PerCharacter,
            TimingMetadata::NamedMarks { .. } => TimingFormat::NamedMarks,
            TimingMetadata::PerGrapheme { .. } => TimingFormat::PerGrapheme,
        }
    }

    /// 条目数
    pub fn len(&self) -> usize {
        match self {
            TimingMetadata::PerCharacter { start_times, .. } => start_times.len(),
            TimingMetadata::NamedMarks { timepoints } => timepoints.len(),
            TimingMetadata::PerGrapheme { ranges, .. } => ranges.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 计时格式（供应商能力）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingFormat {
    PerCharacter,
    NamedMarks,
    PerGrapheme,
}

impl TimingFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimingFormat::PerCharacter => "per_character",
            TimingFormat::NamedMarks => "named_marks",
            TimingFormat::PerGrapheme => "per_grapheme",
        }
    }

    /// 是否需要带 `<mark>` 的合成请求
    pub fn needs_markup(&self) -> bool {
        matches!(self, TimingFormat::NamedMarks)
    }
}

impl std::fmt::Display for TimingFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_ordinal_parsing() {
        assert_eq!(Timepoint::for_word(12, 1.0).word_ordinal(), Some(12));
        assert_eq!(Timepoint::new("word_", 1.0).word_ordinal(), None);
        assert_eq!(Timepoint::new("word_x", 1.0).word_ordinal(), None);
        assert_eq!(Timepoint::new("sentence_1", 1.0).word_ordinal(), None);
    }

    #[test]
    fn test_metadata_json_shape() {
        let json = r#"{"kind":"named_marks","timepoints":[{"name":"word_0","time_seconds":0.25}]}"#;
        let metadata: TimingMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.format(), TimingFormat::NamedMarks);
        assert_eq!(metadata.len(), 1);

        let per_char = TimingMetadata::PerCharacter {
            start_times: vec![0.0, 0.1],
            separators: SeparatorPolicy::Counted,
        };
        let value = serde_json::to_value(&per_char).unwrap();
        assert_eq!(value["kind"], "per_character");
        assert_eq!(value["separators"], "counted");
    }

    #[test]
    fn test_format_needs_markup() {
        assert!(TimingFormat::NamedMarks.needs_markup());
        assert!(!TimingFormat::PerCharacter.needs_markup());
        assert_eq!(TimingFormat::PerGrapheme.to_string(), "per_grapheme");
    }
}
