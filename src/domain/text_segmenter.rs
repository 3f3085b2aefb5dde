//! 文本分割器
//!
//! 把任意纯文本切成句子/单词结构:
//! 1. UAX #29 句子边界
//! 2. 缩写合并（"Mr." "Jan." 等后面的边界不算句末）
//! 3. UAX #29 单词边界 + 单词组装状态机（标点、引号、连字符附着规则）
//!
//! 分割永不失败；只有空白输入才产生零个句子。

use std::collections::HashSet;

use once_cell::sync::Lazy;
use unicode_segmentation::UnicodeSegmentation;

use super::document::{Document, Sentence, Word};

/// 不构成句末的缩写（区分大小写）
static ABBREVIATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // 称谓/头衔
        "Mr.", "Mrs.", "Ms.", "Dr.", "Prof.", "Sr.", "Jr.", "St.", "Sen.", "Rep.", "Gov.",
        "Gen.", "Col.", "Capt.", "Lt.", "Sgt.", "Rev.", "Hon.", "Pres.",
        // 地名/常用
        "Mt.", "Ft.", "vs.", "etc.", "e.g.", "i.e.", "Inc.", "Ltd.", "Co.", "Corp.", "No.",
        "Vol.", "Fig.",
        // 月份
        "Jan.", "Feb.", "Mar.", "Apr.", "Jun.", "Jul.", "Aug.", "Sep.", "Sept.", "Oct.", "Nov.",
        "Dec.",
    ]
    .into_iter()
    .collect()
});

/// 缩写判断前从词首剥离的开引号/括号
const OPENING_MARKS: &[char] = &['"', '\'', '(', '[', '\u{201C}', '\u{2018}'];

/// 连字符（复合词连接）
const HYPHENS: &[char] = &['-', '\u{2010}'];

/// 文本分割配置
#[derive(Debug, Clone, Default)]
pub struct SegmentConfig {
    /// 额外的缩写（与内置表合并）
    pub extra_abbreviations: Vec<String>,
}

impl SegmentConfig {
    fn is_abbreviation(&self, token: &str) -> bool {
        ABBREVIATIONS.contains(token) || self.extra_abbreviations.iter().any(|a| a == token)
    }
}

/// 对文本进行分段
pub fn segment_text(text: &str, config: &SegmentConfig) -> Document {
    let raw_spans: Vec<&str> = text
        .split_sentence_bounds()
        .filter(|span| !span.trim().is_empty())
        .collect();
    let raw_count = raw_spans.len();
    let merged = merge_abbreviations(raw_spans, config);

    let mut sentences = Vec::with_capacity(merged.len());
    for span in &merged {
        let words = assemble_words(span);
        if let Some(sentence) = Sentence::from_words(sentences.len() as u32, words) {
            sentences.push(sentence);
        }
    }

    let document = Document::new(text, sentences);
    tracing::debug!(
        raw_spans = raw_count,
        merged = raw_count - merged.len(),
        sentences = document.sentence_count(),
        words = document.word_count(),
        "Text segmented"
    );
    document
}

/// 使用默认配置分段（便捷方法）
pub fn segment_text_default(text: &str) -> Document {
    segment_text(text, &SegmentConfig::default())
}

/// 缩写合并：句子以缩写结尾时与下一个片段原样拼接，拼接后重新判断
fn merge_abbreviations(spans: Vec<&str>, config: &SegmentConfig) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(spans.len());
    let mut pending: Option<String> = None;

    for span in spans {
        let current = match pending.take() {
            Some(mut carried) => {
                carried.push_str(span);
                carried
            }
            None => span.to_string(),
        };

        if ends_with_abbreviation(&current, config) {
            pending = Some(current);
        } else {
            merged.push(current);
        }
    }

    // 文本以缩写结尾
    if let Some(rest) = pending {
        merged.push(rest);
    }

    merged
}

fn ends_with_abbreviation(span: &str, config: &SegmentConfig) -> bool {
    span.split_whitespace()
        .last()
        .map(|token| token.trim_start_matches(OPENING_MARKS))
        .is_some_and(|token| config.is_abbreviation(token))
}

#[inline]
fn is_word_like(segment: &str) -> bool {
    segment.chars().any(char::is_alphanumeric)
}

#[inline]
fn is_whitespace_segment(segment: &str) -> bool {
    segment.chars().all(char::is_whitespace)
}

#[inline]
fn ends_with_hyphen(buffer: &str) -> bool {
    buffer.ends_with(HYPHENS)
}

/// 单词组装状态机
///
/// buffer 累积当前 token；buffer_has_word 表示其中已有字母/数字内容。
/// 空白片段统一折叠为单个空格。
fn assemble_words(span: &str) -> Vec<Word> {
    let sentence = span.trim();
    let mut words: Vec<Word> = Vec::new();
    let mut buffer = String::new();
    let mut buffer_has_word = false;

    for segment in sentence.split_word_bounds() {
        if is_word_like(segment) {
            if buffer_has_word {
                // 连字符复合词 "sub-agents"
                if ends_with_hyphen(&buffer) {
                    buffer.push_str(segment);
                    continue;
                }
                flush_word(&mut words, &mut buffer);
            }
            buffer.push_str(segment);
            buffer_has_word = true;
        } else if is_whitespace_segment(segment) {
            if !buffer.is_empty() && !buffer.ends_with(' ') {
                buffer.push(' ');
            }
        } else if buffer_has_word && buffer.ends_with(' ') {
            // 新 token 的开头（例如下一个单词前的开引号）
            flush_word(&mut words, &mut buffer);
            buffer.push_str(segment);
            buffer_has_word = false;
        } else {
            buffer.push_str(segment);
        }
    }

    if !buffer.trim().is_empty() {
        flush_word(&mut words, &mut buffer);
    }

    if words.is_empty() && !sentence.is_empty() {
        tracing::warn!(
            len = sentence.len(),
            "Word segmentation produced nothing, keeping span as one word"
        );
        words.push(Word::new(0, sentence));
    }

    words
}

fn flush_word(words: &mut Vec<Word>, buffer: &mut String) {
    let text = std::mem::take(buffer);
    words.push(Word::new(words.len() as u32, text));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::reconstruct_words;

    fn word_texts(doc: &Document, sentence: usize) -> Vec<String> {
        doc.sentence(sentence)
            .unwrap()
            .words()
            .iter()
            .map(|w| w.text().to_string())
            .collect()
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert!(segment_text_default("").is_empty());
        assert!(segment_text_default("   \n\t  ").is_empty());
    }

    #[test]
    fn test_basic_sentences() {
        let doc = segment_text_default("Hello there. How are you? I'm fine!");
        assert_eq!(doc.sentence_count(), 3);
        assert_eq!(doc.sentence(0).unwrap().text(), "Hello there.");
        assert_eq!(doc.sentence(1).unwrap().text(), "How are you?");
        assert_eq!(doc.sentence(2).unwrap().text(), "I'm fine!");
        assert_eq!(word_texts(&doc, 2), vec!["I'm ", "fine!"]);
    }

    #[test]
    fn test_month_abbreviation_merge() {
        let doc = segment_text_default("He said on Jan. 19. The event is over.");
        assert_eq!(doc.sentence_count(), 2);
        assert_eq!(doc.sentence(0).unwrap().text(), "He said on Jan. 19.");
        assert!(doc.sentence(0).unwrap().text().ends_with("19."));
        assert_eq!(doc.sentence(1).unwrap().text(), "The event is over.");
    }

    #[test]
    fn test_title_abbreviation_merge() {
        let doc = segment_text_default("Mr. Smith goes to Washington.");
        assert_eq!(doc.sentence_count(), 1);
        assert_eq!(doc.sentence(0).unwrap().word_count(), 5);
        assert_eq!(
            word_texts(&doc, 0),
            vec!["Mr. ", "Smith ", "goes ", "to ", "Washington."]
        );
    }

    #[test]
    fn test_chained_abbreviations() {
        let doc = segment_text_default("We met Dr. St. James today. Then we left.");
        assert_eq!(doc.sentence_count(), 2);
        assert_eq!(doc.sentence(0).unwrap().text(), "We met Dr. St. James today.");
    }

    #[test]
    fn test_extra_abbreviations_from_config() {
        let config = SegmentConfig {
            extra_abbreviations: vec!["approx.".to_string()],
        };
        let doc = segment_text("It costs approx. Ten dollars.", &config);
        assert_eq!(doc.sentence_count(), 1);
    }

    #[test]
    fn test_hyphenated_compound_stays_one_word() {
        let doc = segment_text_default("sub-agents");
        assert_eq!(doc.word_count(), 1);
        assert_eq!(doc.word(0).unwrap().text(), "sub-agents");
    }

    #[test]
    fn test_opening_quote_attaches_to_next_word() {
        let doc = segment_text_default("idea of \"vibecoding,\"");
        assert_eq!(word_texts(&doc, 0), vec!["idea ", "of ", "\"vibecoding,\""]);
        assert_eq!(doc.sentence(0).unwrap().text(), "idea of \"vibecoding,\"");
    }

    #[test]
    fn test_trailing_punctuation_attaches() {
        let doc = segment_text_default("Well, this works; right");
        assert_eq!(word_texts(&doc, 0), vec!["Well, ", "this ", "works; ", "right"]);
    }

    #[test]
    fn test_line_break_ends_sentence() {
        let doc = segment_text_default("Chapter One\nIt was late.");
        assert_eq!(doc.sentence_count(), 2);
        assert_eq!(doc.sentence(0).unwrap().text(), "Chapter One");
    }

    #[test]
    fn test_whitespace_runs_are_normalized() {
        let doc = segment_text_default("Too   many \t spaces here.");
        assert_eq!(doc.sentence(0).unwrap().text(), "Too many spaces here.");
        assert_eq!(doc.word_count(), 4);
    }

    #[test]
    fn test_adjacent_words_are_joined_with_one_space() {
        let cjk = segment_text_default("你好世界。");
        assert_eq!(cjk.word_count(), 4);
        assert_eq!(cjk.sentence(0).unwrap().text(), "你 好 世 界。");
        // 原文保留在 full_text
        assert_eq!(cjk.full_text(), "你好世界。");

        let comma = segment_text_default("a,b");
        assert_eq!(comma.sentence(0).unwrap().text(), "a, b");
    }

    #[test]
    fn test_round_trip_reconstruction() {
        let samples = [
            "The quick brown fox. It jumped over the lazy dog!",
            "She said, \"Don't go.\" He went anyway.",
            "A list: apples, pears - and (some) plums. Done.",
            "Prices rose 3.5% in Q1. Mrs. Jones disagreed.",
        ];
        for text in samples {
            let doc = segment_text_default(text);
            for sentence in doc.sentences() {
                assert_eq!(reconstruct_words(sentence.words()), sentence.text());
            }
            let joined: Vec<&str> = doc.sentences().iter().map(|s| s.text()).collect();
            assert_eq!(joined.join(" "), text);
        }
    }

    #[test]
    fn test_indices_are_sequential() {
        let doc = segment_text_default("One two. Three four five.");
        for (i, sentence) in doc.sentences().iter().enumerate() {
            assert_eq!(sentence.index() as usize, i);
            for (j, word) in sentence.words().iter().enumerate() {
                assert_eq!(word.index() as usize, j);
            }
        }
    }

    #[test]
    fn test_full_text_is_kept() {
        let text = "  Leading space. Trailing  ";
        let doc = segment_text_default(text);
        assert_eq!(doc.full_text(), text);
    }
}
