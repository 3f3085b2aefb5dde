//! Chunking Context - Entities

use std::ops::Range;

use serde::Serialize;

use super::{AudioHandle, ChunkError, ChunkStatus};
use crate::domain::document::{Document, Sentence};
use crate::domain::timing::TimingMetadata;

/// Chunk - 一次 TTS 请求的单位
///
/// 不变量:
/// - 只包含完整句子（sentence_range 指向所属 Document）
/// - start_word_index..=end_word_index 与 sentence_range 覆盖的单词一致
/// - status 只按 ChunkStatus::can_transition_to 变化
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    id: u32,
    text: String,
    sentence_range: Range<usize>,
    start_word_index: usize,
    end_word_index: usize,
    status: ChunkStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio: Option<AudioHandle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timing: Option<TimingMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Chunk {
    pub(super) fn new(
        id: u32,
        text: String,
        sentence_range: Range<usize>,
        start_word_index: usize,
        end_word_index: usize,
    ) -> Self {
        Self {
            id,
            text,
            sentence_range,
            start_word_index,
            end_word_index,
            status: ChunkStatus::Pending,
            audio: None,
            timing: None,
            error: None,
        }
    }

    // Getters
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sentence_range(&self) -> Range<usize> {
        self.sentence_range.clone()
    }

    /// 从所属 Document 借出本块的句子
    pub fn sentences<'a>(&self, document: &'a Document) -> &'a [Sentence] {
        let sentences = document.sentences();
        let end = self.sentence_range.end.min(sentences.len());
        let start = self.sentence_range.start.min(end);
        &sentences[start..end]
    }

    pub fn start_word_index(&self) -> usize {
        self.start_word_index
    }

    /// 最后一个单词的全局索引（包含）
    pub fn end_word_index(&self) -> usize {
        self.end_word_index
    }

    pub fn word_count(&self) -> usize {
        self.end_word_index + 1 - self.start_word_index
    }

    pub fn contains_word(&self, global: usize) -> bool {
        global >= self.start_word_index && global <= self.end_word_index
    }

    pub fn contains_sentence(&self, sentence: usize) -> bool {
        self.sentence_range.contains(&sentence)
    }

    pub fn status(&self) -> ChunkStatus {
        self.status
    }

    pub fn audio(&self) -> Option<&AudioHandle> {
        self.audio.as_ref()
    }

    pub fn timing(&self) -> Option<&TimingMetadata> {
        self.timing.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Pending/Error -> Loading
    pub fn begin_loading(&mut self) -> Result<(), ChunkError> {
        self.transition(ChunkStatus::Loading)?;
        self.error = None;
        Ok(())
    }

    /// Loading -> Ready，保存音频句柄和计时元数据
    pub fn complete(
        &mut self,
        audio: AudioHandle,
        timing: TimingMetadata,
    ) -> Result<(), ChunkError> {
        self.transition(ChunkStatus::Ready)?;
        self.audio = Some(audio);
        self.timing = Some(timing);
        Ok(())
    }

    /// Loading -> Error
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), ChunkError> {
        self.transition(ChunkStatus::Error)?;
        self.error = Some(message.into());
        Ok(())
    }

    fn transition(&mut self, next: ChunkStatus) -> Result<(), ChunkError> {
        if !self.status.can_transition_to(next) {
            return Err(ChunkError::InvalidTransition {
                id: self.id,
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk() -> Chunk {
        Chunk::new(0, "One two.".to_string(), 0..1, 0, 1)
    }

    #[test]
    fn test_lifecycle_ready() {
        let mut chunk = chunk();
        assert_eq!(chunk.status(), ChunkStatus::Pending);

        chunk.begin_loading().unwrap();
        chunk
            .complete(
                AudioHandle::new("audio-0", Some(1.2)),
                TimingMetadata::NamedMarks {
                    timepoints: Vec::new(),
                },
            )
            .unwrap();

        assert_eq!(chunk.status(), ChunkStatus::Ready);
        assert_eq!(chunk.audio().map(AudioHandle::key), Some("audio-0"));
        assert!(chunk.timing().is_some());
    }

    #[test]
    fn test_lifecycle_retry_after_error() {
        let mut chunk = chunk();
        chunk.begin_loading().unwrap();
        chunk.fail("timeout").unwrap();
        assert_eq!(chunk.error(), Some("timeout"));

        chunk.begin_loading().unwrap();
        assert_eq!(chunk.status(), ChunkStatus::Loading);
        assert_eq!(chunk.error(), None);
    }

    #[test]
    fn test_invalid_transition() {
        let mut chunk = chunk();
        let err = chunk.fail("nope").unwrap_err();
        assert_eq!(
            err,
            ChunkError::InvalidTransition {
                id: 0,
                from: ChunkStatus::Pending,
                to: ChunkStatus::Error,
            }
        );
    }

    #[test]
    fn test_word_range() {
        let chunk = Chunk::new(3, "a b c.".to_string(), 2..3, 10, 12);
        assert_eq!(chunk.word_count(), 3);
        assert!(chunk.contains_word(10));
        assert!(chunk.contains_word(12));
        assert!(!chunk.contains_word(13));
        assert!(chunk.contains_sentence(2));
        assert!(!chunk.contains_sentence(3));
    }
}
