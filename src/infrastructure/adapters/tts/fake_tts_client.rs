//! Fake TTS Client - 用于测试和演示的 TTS 客户端
//!
//! 不产生真实音频，只按固定语速为块文本伪造供应商形状的计时元数据

use async_trait::async_trait;
use unicode_segmentation::UnicodeSegmentation;

use crate::application::ports::{
    SpeechSynthesizerPort, SynthesisRequest, SynthesisResponse, TtsError,
};
use crate::domain::chunking::AudioHandle;
use crate::domain::timing::{GraphemeRange, SeparatorPolicy, Timepoint, TimingFormat, TimingMetadata};

/// Fake TTS Client 配置
#[derive(Debug, Clone)]
pub struct FakeTtsClientConfig {
    /// 回报的计时格式
    pub timing_format: TimingFormat,
    /// 语速（字符/秒）
    pub chars_per_second: f64,
    /// 模拟合成延迟（毫秒）
    pub latency_ms: u64,
    /// 字符流是否计入分隔空格
    pub per_character_separators: SeparatorPolicy,
    pub per_grapheme_separators: SeparatorPolicy,
    /// 这些块总是合成失败
    pub fail_chunk_ids: Vec<u32>,
    /// false 时健康检查失败，所有请求被拒绝
    pub available: bool,
}

impl Default for FakeTtsClientConfig {
    fn default() -> Self {
        Self {
            timing_format: TimingFormat::PerCharacter,
            chars_per_second: 15.0,
            latency_ms: 200,
            per_character_separators: SeparatorPolicy::Counted,
            per_grapheme_separators: SeparatorPolicy::Skipped,
            fail_chunk_ids: Vec::new(),
            available: true,
        }
    }
}

/// Fake TTS Client
pub struct FakeTtsClient {
    config: FakeTtsClientConfig,
}

impl FakeTtsClient {
    pub fn new(config: FakeTtsClientConfig) -> Self {
        tracing::info!(
            format = %config.timing_format,
            chars_per_second = config.chars_per_second,
            latency_ms = config.latency_ms,
            "FakeTtsClient initialized"
        );
        Self { config }
    }

    fn seconds(&self, position: usize) -> f64 {
        position as f64 / self.config.chars_per_second
    }

    fn per_character(&self, text: &str) -> TimingMetadata {
        let separators = self.config.per_character_separators;
        let start_times = text
            .chars()
            .enumerate()
            .filter(|(_, c)| separators == SeparatorPolicy::Counted || !c.is_whitespace())
            .map(|(i, _)| self.seconds(i))
            .collect();
        TimingMetadata::PerCharacter {
            start_times,
            separators,
        }
    }

    fn per_grapheme(&self, text: &str) -> TimingMetadata {
        let separators = self.config.per_grapheme_separators;
        let ranges = text
            .graphemes(true)
            .enumerate()
            .filter(|(_, g)| separators == SeparatorPolicy::Counted || !g.trim().is_empty())
            .map(|(i, _)| GraphemeRange::new(self.seconds(i), self.seconds(i + 1)))
            .collect();
        TimingMetadata::PerGrapheme { ranges, separators }
    }

    /// 按标记之前的可见字符数计算每个 `<mark>` 的时间
    fn named_marks(&self, markup: &str) -> Result<TimingMetadata, TtsError> {
        let mut timepoints = Vec::new();
        let mut spoken = 0usize;
        let mut rest = markup;

        while let Some(c) = rest.chars().next() {
            match c {
                '<' => {
                    let end = rest
                        .find('>')
                        .ok_or_else(|| TtsError::InvalidResponse("unterminated tag".to_string()))?;
                    let tag = &rest[1..end];
                    if let Some(name) = tag
                        .strip_prefix("mark name=\"")
                        .and_then(|t| t.split('"').next())
                    {
                        timepoints.push(Timepoint::new(name, self.seconds(spoken)));
                    }
                    rest = &rest[end + 1..];
                }
                '&' => {
                    // 实体算一个字符
                    let end = rest.find(';').unwrap_or(0);
                    spoken += 1;
                    rest = &rest[end + 1..];
                }
                _ => {
                    spoken += 1;
                    rest = &rest[c.len_utf8()..];
                }
            }
        }

        Ok(TimingMetadata::NamedMarks { timepoints })
    }
}

#[async_trait]
impl SpeechSynthesizerPort for FakeTtsClient {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResponse, TtsError> {
        tracing::debug!(
            session_id = %request.session_id,
            chunk_id = request.chunk_id,
            text_len = request.text.len(),
            "FakeTtsClient: fabricating timing"
        );

        // 模拟合成延迟
        tokio::time::sleep(tokio::time::Duration::from_millis(self.config.latency_ms)).await;

        if !self.config.available {
            return Err(TtsError::ServiceError("synthesizer unavailable".to_string()));
        }
        if request.text.trim().is_empty() {
            return Err(TtsError::EmptyText(request.chunk_id));
        }
        if self.config.fail_chunk_ids.contains(&request.chunk_id) {
            return Err(TtsError::ServiceError(format!(
                "synthesis rejected for chunk {}",
                request.chunk_id
            )));
        }

        let timing = match self.config.timing_format {
            TimingFormat::PerCharacter => self.per_character(&request.text),
            TimingFormat::PerGrapheme => self.per_grapheme(&request.text),
            TimingFormat::NamedMarks => {
                let markup = request.markup.as_deref().ok_or_else(|| {
                    TtsError::ServiceError("named marks require a marked-up request".to_string())
                })?;
                self.named_marks(markup)?
            }
        };

        let duration = self.seconds(request.text.chars().count());
        let audio = AudioHandle::new(
            format!("fake-{}-{}", request.chunk_id, uuid::Uuid::new_v4()),
            Some(duration),
        );
        Ok(SynthesisResponse { audio, timing })
    }

    fn timing_format(&self) -> TimingFormat {
        self.config.timing_format
    }

    async fn health_check(&self) -> bool {
        self.config.available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(timing_format: TimingFormat) -> FakeTtsClient {
        FakeTtsClient::new(FakeTtsClientConfig {
            timing_format,
            chars_per_second: 10.0,
            latency_ms: 0,
            ..Default::default()
        })
    }

    fn request(text: &str, markup: Option<&str>) -> SynthesisRequest {
        SynthesisRequest {
            session_id: "s".to_string(),
            chunk_id: 0,
            text: text.to_string(),
            markup: markup.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_per_character_timing() {
        let response = client(TimingFormat::PerCharacter)
            .synthesize(request("Hi you.", None))
            .await
            .unwrap();
        assert_eq!(response.timing.len(), 7);
        assert_eq!(response.audio.duration_secs(), Some(0.7));
    }

    #[tokio::test]
    async fn test_per_grapheme_skips_spaces() {
        let response = client(TimingFormat::PerGrapheme)
            .synthesize(request("Hi you.", None))
            .await
            .unwrap();
        match response.timing {
            TimingMetadata::PerGrapheme { ranges, separators } => {
                assert_eq!(separators, SeparatorPolicy::Skipped);
                assert_eq!(ranges.len(), 6);
                // 'y' 是第 4 个字素
                assert_eq!(ranges[2].start, 0.3);
            }
            other => panic!("unexpected timing: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_named_marks_from_markup() {
        let markup = "<speak><mark name=\"word_0\"/>Tom <mark name=\"word_1\"/>&amp; \
                      <mark name=\"word_2\"/>Jerry.</speak>";
        let response = client(TimingFormat::NamedMarks)
            .synthesize(request("Tom & Jerry.", Some(markup)))
            .await
            .unwrap();
        match response.timing {
            TimingMetadata::NamedMarks { timepoints } => {
                let names: Vec<&str> = timepoints.iter().map(|t| t.name.as_str()).collect();
                assert_eq!(names, vec!["word_0", "word_1", "word_2"]);
                assert_eq!(timepoints[1].time_seconds, 0.4);
                assert_eq!(timepoints[2].time_seconds, 0.6);
            }
            other => panic!("unexpected timing: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_errors() {
        let marks = client(TimingFormat::NamedMarks);
        assert!(matches!(
            marks.synthesize(request("Hi.", None)).await,
            Err(TtsError::ServiceError(_))
        ));
        assert!(matches!(
            marks.synthesize(request("  ", None)).await,
            Err(TtsError::EmptyText(0))
        ));

        let failing = FakeTtsClient::new(FakeTtsClientConfig {
            latency_ms: 0,
            fail_chunk_ids: vec![0],
            ..Default::default()
        });
        assert!(failing.synthesize(request("Hi.", None)).await.is_err());
        assert!(failing.health_check().await);
    }

    #[tokio::test]
    async fn test_unavailable_client() {
        let down = FakeTtsClient::new(FakeTtsClientConfig {
            latency_ms: 0,
            available: false,
            ..Default::default()
        });
        assert!(!down.health_check().await);
        assert!(matches!(
            down.synthesize(request("Hi.", None)).await,
            Err(TtsError::ServiceError(_))
        ));
    }
}
