//! 时间 -> 单词映射器
//!
//! 字符型元数据：倒序找到最后一个时间 <= 当前时间的字符，
//! 再按单词占用的字符数在块内累加，定位该字符所属单词。
//! 标记型元数据：倒序找到最后一个已触发的 `word_<n>` 标记。
//!
//! 任何缺失/畸形数据都返回 None，由调用方保留上一个高亮。

use unicode_segmentation::UnicodeSegmentation;

use super::{SeparatorPolicy, TimingMetadata};
use crate::domain::chunking::Chunk;
use crate::domain::document::{Document, Word, WordTiming};

/// 字符流的计数单位
#[derive(Debug, Clone, Copy)]
enum StreamUnit {
    Char,
    Grapheme,
}

/// 单词在字符流中占用的单位数
fn word_units(word: &Word, unit: StreamUnit, separators: SeparatorPolicy) -> usize {
    let content = word.content();
    match (unit, separators) {
        (StreamUnit::Char, SeparatorPolicy::Counted) => content.chars().count() + 1,
        (StreamUnit::Char, SeparatorPolicy::Skipped) => {
            content.chars().filter(|c| !c.is_whitespace()).count()
        }
        (StreamUnit::Grapheme, SeparatorPolicy::Counted) => content.graphemes(true).count() + 1,
        (StreamUnit::Grapheme, SeparatorPolicy::Skipped) => content
            .graphemes(true)
            .filter(|g| !g.trim().is_empty())
            .count(),
    }
}

fn chunk_words<'a>(document: &'a Document, chunk: &Chunk) -> impl Iterator<Item = &'a Word> + 'a {
    chunk.sentences(document).iter().flat_map(|s| s.words().iter())
}

/// 字符流偏移 -> 块内单词序号（偏移超出时落在最后一个单词）
fn ordinal_at_offset(
    document: &Document,
    chunk: &Chunk,
    unit: StreamUnit,
    separators: SeparatorPolicy,
    offset: usize,
) -> Option<usize> {
    let mut consumed = 0;
    let mut last = None;
    for (ordinal, word) in chunk_words(document, chunk).enumerate() {
        let span = word_units(word, unit, separators);
        if offset < consumed + span {
            return Some(ordinal);
        }
        consumed += span;
        last = Some(ordinal);
    }
    last
}

/// 块内每个单词首个单位在字符流中的偏移
fn word_offsets(
    document: &Document,
    chunk: &Chunk,
    unit: StreamUnit,
    separators: SeparatorPolicy,
) -> Vec<usize> {
    let mut consumed = 0;
    chunk_words(document, chunk)
        .map(|word| {
            let offset = consumed;
            consumed += word_units(word, unit, separators);
            offset
        })
        .collect()
}

/// 当前播放时间对应的全局单词索引
pub fn word_at_time(
    document: &Document,
    chunk: &Chunk,
    timing: &TimingMetadata,
    time_seconds: f64,
) -> Option<usize> {
    if !time_seconds.is_finite() {
        return None;
    }

    let ordinal = match timing {
        TimingMetadata::PerCharacter {
            start_times,
            separators,
        } => {
            let offset = start_times.iter().rposition(|&t| t <= time_seconds)?;
            ordinal_at_offset(document, chunk, StreamUnit::Char, *separators, offset)?
        }
        TimingMetadata::NamedMarks { timepoints } => timepoints
            .iter()
            .rev()
            .filter(|tp| tp.time_seconds <= time_seconds)
            .find_map(|tp| tp.word_ordinal())?,
        TimingMetadata::PerGrapheme { ranges, separators } => {
            let offset = ranges.iter().rposition(|r| r.start <= time_seconds)?;
            ordinal_at_offset(document, chunk, StreamUnit::Grapheme, *separators, offset)?
        }
    };

    if ordinal >= chunk.word_count() {
        tracing::debug!(
            chunk_id = chunk.id(),
            ordinal = ordinal,
            "Timing ordinal outside chunk"
        );
        return None;
    }
    Some(chunk.start_word_index() + ordinal)
}

/// 跳转：句子第一个单词的起始时间，找不到锚点时为 0
pub fn seek_time(
    document: &Document,
    chunk: &Chunk,
    timing: &TimingMetadata,
    sentence_index: usize,
) -> f64 {
    if !chunk.contains_sentence(sentence_index) {
        return 0.0;
    }
    let Some(range) = document.sentence_word_range(sentence_index) else {
        return 0.0;
    };
    let ordinal = range.start - chunk.start_word_index();

    let anchor = match timing {
        TimingMetadata::PerCharacter {
            start_times,
            separators,
        } => word_offsets(document, chunk, StreamUnit::Char, *separators)
            .get(ordinal)
            .and_then(|&offset| start_times.get(offset).copied()),
        TimingMetadata::NamedMarks { timepoints } => timepoints
            .iter()
            .find(|tp| tp.word_ordinal() == Some(ordinal))
            .map(|tp| tp.time_seconds),
        TimingMetadata::PerGrapheme { ranges, separators } => {
            word_offsets(document, chunk, StreamUnit::Grapheme, *separators)
                .get(ordinal)
                .and_then(|&offset| ranges.get(offset).map(|r| r.start))
        }
    };

    anchor.filter(|t| t.is_finite()).unwrap_or(0.0)
}

/// 按计时元数据给块内单词写入 start/end，返回成功计时的单词数
///
/// end 取下一个有锚点单词的 start；最后一个单词只有字素区间能给出 end。
pub fn assign_word_timings(
    document: &mut Document,
    chunk: &Chunk,
    timing: &TimingMetadata,
) -> usize {
    let word_count = chunk.word_count();
    let (starts, tail_end): (Vec<Option<f64>>, Option<f64>) = match timing {
        TimingMetadata::PerCharacter {
            start_times,
            separators,
        } => (
            word_offsets(document, chunk, StreamUnit::Char, *separators)
                .into_iter()
                .map(|offset| start_times.get(offset).copied())
                .collect(),
            None,
        ),
        TimingMetadata::NamedMarks { timepoints } => {
            let mut starts = vec![None; word_count];
            for tp in timepoints {
                if let Some(slot) = tp.word_ordinal().and_then(|n| starts.get_mut(n)) {
                    slot.get_or_insert(tp.time_seconds);
                }
            }
            (starts, None)
        }
        TimingMetadata::PerGrapheme { ranges, separators } => (
            word_offsets(document, chunk, StreamUnit::Grapheme, *separators)
                .into_iter()
                .map(|offset| ranges.get(offset).map(|r| r.start))
                .collect(),
            ranges.last().map(|r| r.end),
        ),
    };

    let mut assigned = 0;
    for (ordinal, start) in starts.iter().enumerate() {
        let Some(start) = *start else {
            continue;
        };
        let end = starts[ordinal + 1..]
            .iter()
            .find_map(|s| *s)
            .or(tail_end)
            .filter(|&end| end >= start);

        let global = chunk.start_word_index() + ordinal;
        match document.set_word_timing(global, WordTiming::new(start, end, None)) {
            Ok(()) => assigned += 1,
            Err(e) => {
                tracing::warn!(chunk_id = chunk.id(), index = global, error = %e, "Skipping word timing");
            }
        }
    }

    tracing::debug!(
        chunk_id = chunk.id(),
        format = %timing.format(),
        assigned = assigned,
        words = word_count,
        "Word timings assigned"
    );
    assigned
}
