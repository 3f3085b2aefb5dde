//! Document Context - Entities

use serde::{Deserialize, Serialize};

use super::WordTiming;

/// 单词 - 最小高亮单位
///
/// 不变量:
/// - index 在所属 Sentence 内从 0 开始连续
/// - text 不为空，最多带一个 Segmenter 附加的尾随空格
/// - 计时只能通过 Document 写入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    text: String,
    index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    confidence: Option<f32>,
}

impl Word {
    pub fn new(index: u32, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            index,
            start: None,
            end: None,
            confidence: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// 去掉附加分隔符后的内容
    pub fn content(&self) -> &str {
        self.text.trim_end()
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn start(&self) -> Option<f64> {
        self.start
    }

    pub fn end(&self) -> Option<f64> {
        self.end
    }

    pub fn confidence(&self) -> Option<f32> {
        self.confidence
    }

    /// 是否已有计时（没有计时表示"尚未朗读"）
    pub fn is_timed(&self) -> bool {
        self.start.is_some()
    }

    pub(super) fn apply_timing(&mut self, timing: WordTiming) {
        self.start = Some(timing.start);
        self.end = timing.end;
        self.confidence = timing.confidence;
    }

    pub(super) fn clear_timing(&mut self) {
        self.start = None;
        self.end = None;
        self.confidence = None;
    }

    fn ends_with_whitespace(&self) -> bool {
        self.text.chars().last().is_some_and(char::is_whitespace)
    }
}

/// 句子
///
/// 不变量:
/// - words 非空
/// - text 等于 reconstruct_words(words)
/// - start/end 由单词计时推导
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    text: String,
    words: Vec<Word>,
    index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end: Option<f64>,
}

impl Sentence {
    /// 由单词列表构造句子，空列表返回 None
    pub fn from_words(index: u32, words: Vec<Word>) -> Option<Self> {
        if words.is_empty() {
            return None;
        }
        Some(Self {
            text: reconstruct_words(&words),
            words,
            index,
            start: None,
            end: None,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn start(&self) -> Option<f64> {
        self.start
    }

    pub fn end(&self) -> Option<f64> {
        self.end
    }

    /// 文本长度（Unicode 标量）
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub(super) fn apply_word_timing(&mut self, word: usize, timing: WordTiming) {
        self.words[word].apply_timing(timing);
        self.refresh_bounds();
    }

    pub(super) fn clear_timings(&mut self) {
        self.words.iter_mut().for_each(Word::clear_timing);
        self.start = None;
        self.end = None;
    }

    fn refresh_bounds(&mut self) {
        self.start = self
            .words
            .iter()
            .filter_map(Word::start)
            .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.min(s))));
        self.end = self
            .words
            .iter()
            .filter_map(|w| w.end().or(w.start()))
            .fold(None, |acc: Option<f64>, e| Some(acc.map_or(e, |a| a.max(e))));
    }
}

/// 由单词还原句子文本
///
/// 单词未自带尾随空白时补一个空格，最后去掉首尾空白
pub fn reconstruct_words(words: &[Word]) -> String {
    let mut out = String::new();
    for word in words {
        out.push_str(word.text());
        if !word.ends_with_whitespace() {
            out.push(' ');
        }
    }
    out.trim().to_string()
}
