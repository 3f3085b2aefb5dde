//! 分块器
//!
//! 按句子贪心装箱：累加句子直到下一句会超出 max_chars，
//! 超长的单句独占一个块，绝不在句子内部切分。

use super::Chunk;
use crate::domain::document::Document;

/// 默认批量字符上限
pub const DEFAULT_MAX_CHARS: usize = 2500;

/// 分块配置
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// 每块最大字符数（Unicode 标量，不含拼接空格）
    pub max_chars: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

/// 累积中的块
struct PendingChunk {
    first_sentence: usize,
    sentence_count: usize,
    char_count: usize,
}

/// 把 Document 切成有序的 Chunk 列表
pub fn create_chunks(document: &Document, config: &ChunkerConfig) -> Vec<Chunk> {
    let max_chars = config.max_chars.max(1);
    let mut chunks: Vec<Chunk> = Vec::new();
    let mut pending: Option<PendingChunk> = None;

    for (index, sentence) in document.sentences().iter().enumerate() {
        let len = sentence.char_len();

        if let Some(current) = pending.as_mut() {
            if current.char_count + len <= max_chars {
                current.sentence_count += 1;
                current.char_count += len;
                continue;
            }
        }

        if let Some(full) = pending.take() {
            chunks.push(finalize(document, full, chunks.len() as u32));
        }
        pending = Some(PendingChunk {
            first_sentence: index,
            sentence_count: 1,
            char_count: len,
        });
    }

    if let Some(rest) = pending {
        chunks.push(finalize(document, rest, chunks.len() as u32));
    }

    tracing::debug!(
        sentences = document.sentence_count(),
        chunks = chunks.len(),
        max_chars = max_chars,
        "Document chunked"
    );
    chunks
}

fn finalize(document: &Document, pending: PendingChunk, id: u32) -> Chunk {
    let range = pending.first_sentence..pending.first_sentence + pending.sentence_count;
    let sentences = &document.sentences()[range.clone()];
    let text = sentences
        .iter()
        .map(|s| s.text())
        .collect::<Vec<_>>()
        .join(" ");

    // Document 的句子都非空，范围一定有效
    let start_word = document
        .sentence_word_range(range.start)
        .map_or(0, |r| r.start);
    let end_word = document
        .sentence_word_range(range.end - 1)
        .map_or(start_word, |r| r.end.saturating_sub(1));

    tracing::trace!(chunk_id = id, chars = pending.char_count, "Chunk finalized");
    Chunk::new(id, text, range, start_word, end_word)
}

/// 查找包含全局单词索引的块
pub fn chunk_for_word(chunks: &[Chunk], global: usize) -> Option<&Chunk> {
    let position = chunks.partition_point(|c| c.end_word_index() < global);
    chunks.get(position).filter(|c| c.contains_word(global))
}

/// 查找包含句子的块
pub fn chunk_for_sentence(chunks: &[Chunk], sentence: usize) -> Option<&Chunk> {
    let position = chunks.partition_point(|c| c.sentence_range().end <= sentence);
    chunks.get(position).filter(|c| c.contains_sentence(sentence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chunking::ChunkStatus;
    use crate::domain::text_segmenter::segment_text_default;

    const TEXT: &str = "The first sentence is here. A second one follows. \
        Third is short. The fourth sentence is somewhat longer than the others. End.";

    fn config(max_chars: usize) -> ChunkerConfig {
        ChunkerConfig { max_chars }
    }

    fn assert_coverage(document: &Document, chunks: &[Chunk], max_chars: usize) {
        let mut next_sentence = 0;
        let mut next_word = 0;
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.id() as usize, i);
            assert_eq!(chunk.status(), ChunkStatus::Pending);
            assert_eq!(chunk.sentence_range().start, next_sentence);
            assert_eq!(chunk.start_word_index(), next_word);
            next_sentence = chunk.sentence_range().end;
            next_word = chunk.end_word_index() + 1;

            let sentences = chunk.sentences(document);
            let total: usize = sentences.iter().map(|s| s.char_len()).sum();
            assert!(total <= max_chars || sentences.len() == 1);

            let joined: Vec<&str> = sentences.iter().map(|s| s.text()).collect();
            assert_eq!(chunk.text(), joined.join(" "));
        }
        assert_eq!(next_sentence, document.sentence_count());
        assert_eq!(next_word, document.word_count());
    }

    #[test]
    fn test_empty_document_has_no_chunks() {
        let document = segment_text_default("");
        assert!(create_chunks(&document, &ChunkerConfig::default()).is_empty());
    }

    #[test]
    fn test_everything_fits_one_chunk() {
        let document = segment_text_default(TEXT);
        let chunks = create_chunks(&document, &ChunkerConfig::default());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].sentence_range(), 0..5);
        assert_eq!(chunks[0].text(), TEXT);
        assert_coverage(&document, &chunks, DEFAULT_MAX_CHARS);
    }

    #[test]
    fn test_coverage_for_many_limits() {
        let document = segment_text_default(TEXT);
        for max_chars in [1, 5, 16, 27, 40, 50, 80, 200] {
            let chunks = create_chunks(&document, &config(max_chars));
            assert_coverage(&document, &chunks, max_chars);
        }
    }

    #[test]
    fn test_oversized_sentence_gets_own_chunk() {
        let document =
            segment_text_default("Tiny. This sentence is far too long for the limit. Ok.");
        let chunks = create_chunks(&document, &config(10));
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1].text(), "This sentence is far too long for the limit.");
        assert_eq!(chunks[1].sentence_range(), 1..2);
    }

    #[test]
    fn test_exact_fit_stays_together() {
        // "Ab cd." = 6, "Ef." = 3
        let document = segment_text_default("Ab cd. Ef.");
        let chunks = create_chunks(&document, &config(9));
        assert_eq!(chunks.len(), 1);

        let chunks = create_chunks(&document, &config(8));
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn test_zero_limit_is_treated_as_one() {
        let document = segment_text_default("One. Two.");
        let chunks = create_chunks(&document, &config(0));
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn test_lookup_helpers() {
        let document = segment_text_default(TEXT);
        let chunks = create_chunks(&document, &config(30));

        for global in 0..document.word_count() {
            let chunk = chunk_for_word(&chunks, global).unwrap();
            assert!(chunk.contains_word(global));
        }
        assert!(chunk_for_word(&chunks, document.word_count()).is_none());

        for sentence in 0..document.sentence_count() {
            let chunk = chunk_for_sentence(&chunks, sentence).unwrap();
            assert!(chunk.contains_sentence(sentence));
        }
        assert!(chunk_for_sentence(&chunks, document.sentence_count()).is_none());
    }
}
