//! Session Context - Aggregate Root

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Highlight, ReadingMode, SeekTarget, SessionError};
use crate::domain::alignment::{AlignerConfig, FuzzyAligner, RecognizedWord};
use crate::domain::chunking::{
    chunk_for_sentence, create_chunks, AudioHandle, Chunk, ChunkError, ChunkStatus, ChunkerConfig,
};
use crate::domain::document::Document;
use crate::domain::text_segmenter::{segment_text, SegmentConfig};
use crate::domain::timing::{assign_word_timings, seek_time, word_at_time, TimingMetadata};

/// 打开会话所需的领域配置
#[derive(Debug, Clone, Default)]
pub struct SessionSettings {
    pub segment: SegmentConfig,
    pub chunker: ChunkerConfig,
    pub aligner: AlignerConfig,
}

/// ReadingSession 聚合根
///
/// 不变量:
/// - Document 的单词计时只通过本聚合写入
/// - Dictation 模式下只有对齐器写入，Playback 模式下只有当前块的计时写入
/// - highlighted_word 只在有新匹配或跳转时改变
#[derive(Debug)]
pub struct ReadingSession {
    id: String,
    document: Document,
    chunks: Vec<Chunk>,
    aligner: FuzzyAligner,
    mode: ReadingMode,
    highlighted_word: Option<usize>,
    created_at: DateTime<Utc>,
}

impl ReadingSession {
    /// 分段 + 分块
    pub fn open(text: &str, settings: &SessionSettings) -> Self {
        let document = segment_text(text, &settings.segment);
        let chunks = create_chunks(&document, &settings.chunker);
        let session = Self {
            id: Uuid::new_v4().to_string(),
            document,
            chunks,
            aligner: FuzzyAligner::new(settings.aligner.clone()),
            mode: ReadingMode::Idle,
            highlighted_word: None,
            created_at: Utc::now(),
        };

        tracing::info!(
            session_id = %session.id,
            sentences = session.document.sentence_count(),
            words = session.document.word_count(),
            chunks = session.chunks.len(),
            "Reading session opened"
        );
        session
    }

    // Getters
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn chunk(&self, chunk_id: u32) -> Option<&Chunk> {
        self.chunks.get(chunk_id as usize)
    }

    pub fn mode(&self) -> ReadingMode {
        self.mode
    }

    pub fn highlighted_word(&self) -> Option<usize> {
        self.highlighted_word
    }

    pub fn aligner_cursor(&self) -> usize {
        self.aligner.cursor()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 进入听写模式，对齐器从文档开头重新开始
    ///
    /// 录音是新的音频源，之前的单词计时和高亮全部作废
    pub fn start_dictation(&mut self) {
        self.aligner.reset();
        self.document.clear_timings();
        self.highlighted_word = None;
        self.switch_mode(ReadingMode::Dictation);
    }

    /// 对齐一批识别结果，返回本批最后一个匹配的单词
    pub fn ingest_recognition(
        &mut self,
        recognized: &[RecognizedWord],
    ) -> Result<Option<usize>, SessionError> {
        if self.mode != ReadingMode::Dictation {
            return Err(SessionError::InvalidOperation(format!(
                "识别结果只能在听写模式下写入，当前模式: {}",
                self.mode
            )));
        }

        let matched = self.aligner.align(&mut self.document, recognized);
        if matched.is_some() {
            self.highlighted_word = matched;
        }
        Ok(matched)
    }

    /// 开始播放一个已就绪的块，写入该块的单词计时，返回计时的单词数
    pub fn start_playback(&mut self, chunk_id: u32) -> Result<usize, SessionError> {
        let chunk = self
            .chunks
            .get(chunk_id as usize)
            .ok_or(ChunkError::NotFound(chunk_id))?;
        let Some(timing) = chunk.timing().filter(|_| chunk.status() == ChunkStatus::Ready)
        else {
            return Err(SessionError::ChunkNotReady {
                id: chunk_id,
                status: chunk.status(),
            });
        };

        let next = ReadingMode::Playback { chunk_id };
        // 换块或从其他模式进入时，旧音频源的计时不再有效
        if self.mode != next {
            self.document.clear_timings();
        }
        let timed = assign_word_timings(&mut self.document, chunk, timing);
        if self.mode == ReadingMode::Dictation {
            self.aligner.reset();
        }
        self.switch_mode(next);
        Ok(timed)
    }

    /// 播放时间 -> 高亮；无匹配时保留上一个高亮
    pub fn playback_position(&mut self, time_seconds: f64) -> Result<Highlight, SessionError> {
        let ReadingMode::Playback { chunk_id } = self.mode else {
            return Err(SessionError::InvalidOperation(format!(
                "播放位置只能在播放模式下更新，当前模式: {}",
                self.mode
            )));
        };
        let chunk = self
            .chunks
            .get(chunk_id as usize)
            .ok_or(ChunkError::NotFound(chunk_id))?;

        let found = chunk
            .timing()
            .and_then(|timing| word_at_time(&self.document, chunk, timing, time_seconds));

        let highlight = match found {
            Some(word) => {
                let changed = self.highlighted_word != Some(word);
                self.highlighted_word = Some(word);
                Highlight {
                    word_index: Some(word),
                    changed,
                }
            }
            None => Highlight {
                word_index: self.highlighted_word,
                changed: false,
            },
        };
        Ok(highlight)
    }

    /// 跳转到句子开头，高亮移动到该句第一个单词
    pub fn seek(&mut self, sentence_index: usize) -> Result<SeekTarget, SessionError> {
        let sentence_count = self.document.sentence_count();
        let out_of_range = SessionError::SentenceOutOfRange {
            index: sentence_index,
            sentence_count,
        };
        let chunk = chunk_for_sentence(&self.chunks, sentence_index).ok_or(out_of_range)?;

        let time_seconds = chunk
            .timing()
            .map_or(0.0, |timing| {
                seek_time(&self.document, chunk, timing, sentence_index)
            });
        let target = SeekTarget {
            chunk_id: chunk.id(),
            time_seconds,
        };

        self.highlighted_word = self
            .document
            .sentence_word_range(sentence_index)
            .map(|range| range.start);

        tracing::debug!(
            session_id = %self.id,
            sentence = sentence_index,
            chunk_id = target.chunk_id,
            time = target.time_seconds,
            "Seek resolved"
        );
        Ok(target)
    }

    /// 回到空闲状态
    pub fn stop(&mut self) {
        self.aligner.reset();
        self.switch_mode(ReadingMode::Idle);
    }

    pub fn begin_chunk_load(&mut self, chunk_id: u32) -> Result<(), SessionError> {
        self.chunk_mut(chunk_id)?.begin_loading()?;
        Ok(())
    }

    pub fn complete_chunk_load(
        &mut self,
        chunk_id: u32,
        audio: AudioHandle,
        timing: TimingMetadata,
    ) -> Result<(), SessionError> {
        self.chunk_mut(chunk_id)?.complete(audio, timing)?;
        Ok(())
    }

    pub fn fail_chunk_load(
        &mut self,
        chunk_id: u32,
        message: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.chunk_mut(chunk_id)?.fail(message)?;
        Ok(())
    }

    fn chunk_mut(&mut self, chunk_id: u32) -> Result<&mut Chunk, ChunkError> {
        self.chunks
            .get_mut(chunk_id as usize)
            .ok_or(ChunkError::NotFound(chunk_id))
    }

    fn switch_mode(&mut self, next: ReadingMode) {
        if self.mode != next {
            tracing::debug!(
                session_id = %self.id,
                from = %self.mode,
                to = %next,
                "Reading mode switched"
            );
        }
        self.mode = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::timing::{SeparatorPolicy, Timepoint};

    const TEXT: &str = "The quick brown fox. It jumped over the lazy dog.";

    fn session_with_chunk_size(max_chars: usize) -> ReadingSession {
        let settings = SessionSettings {
            chunker: ChunkerConfig { max_chars },
            ..Default::default()
        };
        ReadingSession::open(TEXT, &settings)
    }

    fn char_timing(chunk: &Chunk) -> TimingMetadata {
        TimingMetadata::PerCharacter {
            start_times: (0..chunk.text().chars().count())
                .map(|i| i as f64 * 0.1)
                .collect(),
            separators: SeparatorPolicy::Counted,
        }
    }

    fn load_all(session: &mut ReadingSession) {
        for id in 0..session.chunks().len() as u32 {
            let timing = char_timing(session.chunk(id).unwrap());
            session.begin_chunk_load(id).unwrap();
            session
                .complete_chunk_load(id, AudioHandle::new(format!("audio-{}", id), None), timing)
                .unwrap();
        }
    }

    fn heard(word: &str, start: f64) -> RecognizedWord {
        RecognizedWord::new(word, start, start + 0.2, 0.8)
    }

    #[test]
    fn test_open_segments_and_chunks() {
        let session = session_with_chunk_size(25);
        assert_eq!(session.document().sentence_count(), 2);
        assert_eq!(session.chunks().len(), 2);
        assert_eq!(session.mode(), ReadingMode::Idle);
        assert_eq!(session.highlighted_word(), None);
    }

    #[test]
    fn test_playback_requires_ready_chunk() {
        let mut session = session_with_chunk_size(25);
        let err = session.start_playback(0).unwrap_err();
        assert_eq!(
            err,
            SessionError::ChunkNotReady {
                id: 0,
                status: ChunkStatus::Pending
            }
        );
        assert_eq!(
            session.start_playback(9).unwrap_err(),
            SessionError::Chunk(ChunkError::NotFound(9))
        );
    }

    #[test]
    fn test_playback_highlight_is_sticky() {
        let mut session = session_with_chunk_size(25);
        load_all(&mut session);

        let timed = session.start_playback(1).unwrap();
        assert_eq!(timed, 6);
        assert_eq!(session.mode(), ReadingMode::Playback { chunk_id: 1 });

        // 第二块从全局单词 4 开始
        let first = session.playback_position(0.05).unwrap();
        assert_eq!(first.word_index, Some(4));
        assert!(first.changed);

        let same = session.playback_position(0.15).unwrap();
        assert_eq!(same.word_index, Some(4));
        assert!(!same.changed);

        let next = session.playback_position(0.35).unwrap();
        assert_eq!(next.word_index, Some(5));
        assert!(next.changed);

        // 非法时间不清除高亮
        let kept = session.playback_position(f64::NAN).unwrap();
        assert_eq!(kept.word_index, Some(5));
        assert!(!kept.changed);
    }

    #[test]
    fn test_dictation_and_playback_are_exclusive_writers() {
        let mut session = session_with_chunk_size(25);
        load_all(&mut session);

        assert!(matches!(
            session.ingest_recognition(&[heard("the", 0.0)]),
            Err(SessionError::InvalidOperation(_))
        ));

        session.start_dictation();
        assert_eq!(session.ingest_recognition(&[heard("the", 0.0)]).unwrap(), Some(0));
        assert!(matches!(
            session.playback_position(0.0),
            Err(SessionError::InvalidOperation(_))
        ));

        session.start_playback(0).unwrap();
        assert_eq!(session.aligner_cursor(), 0);
        assert!(session.ingest_recognition(&[heard("quick", 1.0)]).is_err());

        session.stop();
        assert_eq!(session.mode(), ReadingMode::Idle);
    }

    #[test]
    fn test_dictation_highlight_follows_matches() {
        let mut session = session_with_chunk_size(2500);
        session.start_dictation();

        session
            .ingest_recognition(&[heard("the", 0.0), heard("quick", 0.4)])
            .unwrap();
        assert_eq!(session.highlighted_word(), Some(1));

        // 噪声不改变高亮
        assert_eq!(session.ingest_recognition(&[heard("zebra", 1.0)]).unwrap(), None);
        assert_eq!(session.highlighted_word(), Some(1));
        assert_eq!(session.document().timed_word_count(), 2);
    }

    #[test]
    fn test_dictation_starts_without_playback_timing() {
        let mut session = session_with_chunk_size(2500);
        load_all(&mut session);
        session.start_playback(0).unwrap();
        session.playback_position(1.6).unwrap();
        assert_eq!(session.document().timed_word_count(), 10);

        session.start_dictation();
        assert_eq!(session.document().timed_word_count(), 0);
        assert_eq!(session.highlighted_word(), None);

        session.ingest_recognition(&[heard("the", 5.0)]).unwrap();
        assert_eq!(session.document().word(0).unwrap().start(), Some(5.0));
        // "fox." 还没读到
        assert_eq!(session.document().word(3).unwrap().start(), None);
        assert_eq!(session.document().timed_word_count(), 1);
    }

    #[test]
    fn test_switching_chunks_drops_previous_chunk_timing() {
        let mut session = session_with_chunk_size(25);
        load_all(&mut session);

        assert_eq!(session.start_playback(0).unwrap(), 4);
        assert_eq!(session.document().timed_word_count(), 4);

        // 重复进入同一块不清除
        assert_eq!(session.start_playback(0).unwrap(), 4);
        assert_eq!(session.document().timed_word_count(), 4);

        assert_eq!(session.start_playback(1).unwrap(), 6);
        assert!(session.document().word(0).unwrap().start().is_none());
        assert_eq!(session.document().timed_word_count(), 6);
    }

    #[test]
    fn test_seek_resolves_chunk_and_time() {
        let mut session = session_with_chunk_size(2500);
        // 未加载时时间为 0
        let target = session.seek(1).unwrap();
        assert_eq!(target.chunk_id, 0);
        assert_eq!(target.time_seconds, 0.0);
        assert_eq!(session.highlighted_word(), Some(4));

        load_all(&mut session);
        let target = session.seek(1).unwrap();
        // "The quick brown fox. " 共 21 个字符
        assert!((target.time_seconds - 2.1).abs() < 1e-9);

        assert_eq!(
            session.seek(7).unwrap_err(),
            SessionError::SentenceOutOfRange {
                index: 7,
                sentence_count: 2
            }
        );
    }

    #[test]
    fn test_chunk_load_failure_and_retry() {
        let mut session = session_with_chunk_size(25);
        session.begin_chunk_load(0).unwrap();
        session.fail_chunk_load(0, "provider timeout").unwrap();
        assert_eq!(session.chunk(0).unwrap().status(), ChunkStatus::Error);

        session.begin_chunk_load(0).unwrap();
        let marks = TimingMetadata::NamedMarks {
            timepoints: vec![Timepoint::for_word(0, 0.0)],
        };
        session
            .complete_chunk_load(0, AudioHandle::new("a", Some(1.0)), marks)
            .unwrap();
        assert_eq!(session.chunk(0).unwrap().status(), ChunkStatus::Ready);

        assert!(matches!(
            session.complete_chunk_load(
                0,
                AudioHandle::new("b", None),
                TimingMetadata::NamedMarks { timepoints: vec![] }
            ),
            Err(SessionError::Chunk(ChunkError::InvalidTransition { .. }))
        ));
    }

    #[test]
    fn test_empty_text_session() {
        let mut session = ReadingSession::open("   ", &SessionSettings::default());
        assert!(session.chunks().is_empty());
        assert!(session.seek(0).is_err());
    }
}
