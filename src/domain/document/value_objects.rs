//! Document Context - Value Objects

use serde::{Deserialize, Serialize};

use super::DocumentError;

/// 单词计时
///
/// 时间单位为秒，相对于当前音频源的起点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    pub start: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl WordTiming {
    pub fn new(start: f64, end: Option<f64>, confidence: Option<f32>) -> Self {
        Self {
            start,
            end,
            confidence,
        }
    }

    /// 只有起点的计时（标记型元数据的最后一个单词）
    pub fn starting_at(start: f64) -> Self {
        Self::new(start, None, None)
    }

    pub fn validate(&self) -> Result<(), DocumentError> {
        if !self.start.is_finite() || self.start < 0.0 {
            return Err(DocumentError::InvalidTiming(format!(
                "start must be a non-negative finite number, got {}",
                self.start
            )));
        }
        if let Some(end) = self.end {
            if !end.is_finite() || end < self.start {
                return Err(DocumentError::InvalidTiming(format!(
                    "end {} precedes start {}",
                    end, self.start
                )));
            }
        }
        Ok(())
    }
}
