//! 模糊对齐器
//!
//! 每个识别词只在 cursor 之后的有限窗口内寻找编辑距离最小的参考词:
//! - 距离 <= max_distance 视为匹配，写入计时并把 cursor 推进到匹配词之后
//! - 否则视为插入/口头语直接丢弃，cursor 不动
//!
//! cursor 与匹配词之间被跳过的参考词保持无计时（"尚未朗读"）。

use serde::{Deserialize, Serialize};

use super::bounded_levenshtein;
use crate::domain::document::{Document, WordTiming};

/// 默认搜索窗口（参考词个数）
pub const DEFAULT_SEARCH_WINDOW: usize = 10;

/// 默认最大编辑距离
pub const DEFAULT_MAX_DISTANCE: usize = 2;

/// 比较前剔除的标点
const STRIPPED_PUNCTUATION: &[char] = &[
    '.', ',', '/', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '-', '_', '`', '~',
    '(', ')', '?', '"', '\'', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}', '\u{2014}',
    '\u{2013}',
];

/// 对齐器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignerConfig {
    /// 从 cursor 开始向后搜索的参考词数量
    pub search_window: usize,
    /// 判定为匹配的最大编辑距离
    pub max_distance: usize,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            search_window: DEFAULT_SEARCH_WINDOW,
            max_distance: DEFAULT_MAX_DISTANCE,
        }
    }
}

/// STT 识别出的单词
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
    pub conf: f32,
}

impl RecognizedWord {
    pub fn new(word: impl Into<String>, start: f64, end: f64, conf: f32) -> Self {
        Self {
            word: word.into(),
            start,
            end,
            conf,
        }
    }
}

/// 比较用的归一化：去空白、小写、剔除标点
pub fn clean_word(word: &str) -> String {
    let cleaned: String = word
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .flat_map(char::to_lowercase)
        .collect();
    cleaned.trim().to_string()
}

/// 模糊对齐器
///
/// 会话级状态只有 cursor。同一实例的 align 调用必须串行，
/// 每次新的录音会话开始前调用 reset。
#[derive(Debug, Clone)]
pub struct FuzzyAligner {
    config: AlignerConfig,
    cursor: usize,
}

impl FuzzyAligner {
    pub fn new(config: AlignerConfig) -> Self {
        Self { config, cursor: 0 }
    }

    pub fn config(&self) -> &AlignerConfig {
        &self.config
    }

    /// 下一次搜索的起点（全局单词索引）
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn reset(&mut self) {
        tracing::debug!(previous_cursor = self.cursor, "Aligner reset");
        self.cursor = 0;
    }

    /// 对齐一批识别词，返回本次调用中最后一个匹配的全局单词索引
    pub fn align(
        &mut self,
        document: &mut Document,
        recognized: &[RecognizedWord],
    ) -> Option<usize> {
        let word_count = document.word_count();
        let mut last_match = None;
        let mut discarded = 0usize;

        for heard in recognized {
            let target = clean_word(&heard.word);
            if target.is_empty() {
                discarded += 1;
                continue;
            }

            let window_end = (self.cursor + self.config.search_window).min(word_count);
            let Some(matched) = self.best_candidate(document, &target, window_end) else {
                discarded += 1;
                continue;
            };

            let timing = WordTiming::new(heard.start, Some(heard.end), Some(heard.conf));
            if let Err(e) = document.set_word_timing(matched, timing) {
                // 计时无效（例如 end < start）时仍然推进 cursor，只是不写入
                tracing::warn!(index = matched, error = %e, "Recognized word timing rejected");
            }
            self.cursor = matched + 1;
            last_match = Some(matched);
        }

        tracing::debug!(
            recognized = recognized.len(),
            discarded = discarded,
            cursor = self.cursor,
            last_match = ?last_match,
            "Alignment batch processed"
        );
        last_match
    }

    /// 窗口内编辑距离最小的候选；并列时取最靠前的
    fn best_candidate(
        &self,
        document: &Document,
        target: &str,
        window_end: usize,
    ) -> Option<usize> {
        let bound = self.config.max_distance;
        let mut best: Option<(usize, usize)> = None;

        for index in self.cursor..window_end {
            let Some(word) = document.word(index) else {
                break;
            };
            let candidate = clean_word(word.text());
            if candidate.is_empty() {
                continue;
            }

            let distance = bounded_levenshtein(target, &candidate, bound);
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((index, distance));
            }
            if distance == 0 {
                break;
            }
        }

        best.filter(|&(_, distance)| distance <= bound)
            .map(|(index, _)| index)
    }
}

impl Default for FuzzyAligner {
    fn default() -> Self {
        Self::new(AlignerConfig::default())
    }
}
