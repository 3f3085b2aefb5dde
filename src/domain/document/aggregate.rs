//! Document Context - Aggregate Root

use std::ops::Range;

use serde::Serialize;

use super::{DocumentError, Sentence, Word, WordTiming};

/// Document 聚合根（对齐映射）
///
/// 不变量:
/// - 句子数量和顺序在创建后不可变
/// - 全局单词索引 = sentences[].words[] 按顺序展开后的位置
/// - 单词只能通过 set_word_timing / clear_timings 修改
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    full_text: String,
    sentences: Vec<Sentence>,
    /// sentence i 的第一个单词的全局索引，末尾附加总单词数
    #[serde(skip)]
    word_offsets: Vec<usize>,
}

impl Document {
    pub fn new(full_text: impl Into<String>, sentences: Vec<Sentence>) -> Self {
        let word_offsets = build_offsets(&sentences);
        Self {
            full_text: full_text.into(),
            sentences,
            word_offsets,
        }
    }

    pub fn empty() -> Self {
        Self::new(String::new(), Vec::new())
    }

    // Getters
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn sentence(&self, index: usize) -> Option<&Sentence> {
        self.sentences.get(index)
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.offsets().last().copied().unwrap_or(0)
    }

    /// 按全局顺序遍历所有单词
    pub fn words(&self) -> impl Iterator<Item = &Word> + '_ {
        self.sentences.iter().flat_map(|s| s.words().iter())
    }

    /// 全局索引 -> (句子索引, 句内单词索引)
    pub fn locate(&self, global: usize) -> Option<(usize, usize)> {
        if global >= self.word_count() {
            return None;
        }
        let offsets = self.offsets();
        // offsets 单调不减；找到最后一个 <= global 的句子起点
        let sentence = offsets.partition_point(|&start| start <= global) - 1;
        Some((sentence, global - offsets[sentence]))
    }

    pub fn word(&self, global: usize) -> Option<&Word> {
        let (sentence, word) = self.locate(global)?;
        self.sentences[sentence].words().get(word)
    }

    /// 句子包含的全局单词索引范围
    pub fn sentence_word_range(&self, sentence: usize) -> Option<Range<usize>> {
        if sentence >= self.sentences.len() {
            return None;
        }
        let offsets = self.offsets();
        Some(offsets[sentence]..offsets[sentence + 1])
    }

    pub fn sentence_of_word(&self, global: usize) -> Option<usize> {
        self.locate(global).map(|(sentence, _)| sentence)
    }

    /// 写入单词计时（唯一的单词写入口）
    pub fn set_word_timing(
        &mut self,
        global: usize,
        timing: WordTiming,
    ) -> Result<(), DocumentError> {
        timing.validate()?;
        let (sentence, word) = self
            .locate(global)
            .ok_or(DocumentError::WordIndexOutOfRange {
                index: global,
                word_count: self.word_count(),
            })?;
        self.sentences[sentence].apply_word_timing(word, timing);
        Ok(())
    }

    /// 清除所有单词计时（切换音频源时）
    pub fn clear_timings(&mut self) {
        self.sentences.iter_mut().for_each(Sentence::clear_timings);
    }

    /// 已有计时的单词数
    pub fn timed_word_count(&self) -> usize {
        self.words().filter(|w| w.is_timed()).count()
    }

    fn offsets(&self) -> &[usize] {
        &self.word_offsets
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

fn build_offsets(sentences: &[Sentence]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(sentences.len() + 1);
    let mut total = 0;
    offsets.push(0);
    for sentence in sentences {
        total += sentence.word_count();
        offsets.push(total);
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let first = Sentence::from_words(0, vec![Word::new(0, "One "), Word::new(1, "two.")]);
        let second = Sentence::from_words(
            1,
            vec![Word::new(0, "Three "), Word::new(1, "four "), Word::new(2, "five.")],
        );
        Document::new(
            "One two. Three four five.",
            vec![first.unwrap(), second.unwrap()],
        )
    }

    #[test]
    fn test_global_index_flattening() {
        let doc = sample();
        assert_eq!(doc.word_count(), 5);
        assert_eq!(doc.locate(0), Some((0, 0)));
        assert_eq!(doc.locate(1), Some((0, 1)));
        assert_eq!(doc.locate(2), Some((1, 0)));
        assert_eq!(doc.locate(4), Some((1, 2)));
        assert_eq!(doc.locate(5), None);
        assert_eq!(doc.word(3).map(Word::content), Some("four"));

        let flat: Vec<&str> = doc.words().map(Word::content).collect();
        assert_eq!(flat, vec!["One", "two.", "Three", "four", "five."]);
    }

    #[test]
    fn test_sentence_word_range() {
        let doc = sample();
        assert_eq!(doc.sentence_word_range(0), Some(0..2));
        assert_eq!(doc.sentence_word_range(1), Some(2..5));
        assert_eq!(doc.sentence_word_range(2), None);
        assert_eq!(doc.sentence_of_word(4), Some(1));
    }

    #[test]
    fn test_set_word_timing() {
        let mut doc = sample();
        doc.set_word_timing(3, WordTiming::new(1.0, Some(1.3), Some(0.8)))
            .unwrap();

        let word = doc.word(3).unwrap();
        assert_eq!(word.start(), Some(1.0));
        assert_eq!(word.end(), Some(1.3));
        assert_eq!(doc.sentence(1).unwrap().start(), Some(1.0));
        assert_eq!(doc.timed_word_count(), 1);

        doc.clear_timings();
        assert_eq!(doc.timed_word_count(), 0);
        assert_eq!(doc.sentence(1).unwrap().start(), None);
    }

    #[test]
    fn test_set_word_timing_out_of_range() {
        let mut doc = sample();
        let err = doc
            .set_word_timing(9, WordTiming::starting_at(0.0))
            .unwrap_err();
        assert_eq!(
            err,
            DocumentError::WordIndexOutOfRange {
                index: 9,
                word_count: 5
            }
        );
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::empty();
        assert!(doc.is_empty());
        assert_eq!(doc.word_count(), 0);
        assert_eq!(doc.locate(0), None);
    }
}
