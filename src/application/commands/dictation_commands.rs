//! Dictation Commands - 用户朗读（STT）相关命令

use crate::domain::alignment::RecognizedWord;

/// 开始听写命令
#[derive(Debug, Clone)]
pub struct StartDictationCommand {
    pub session_id: String,
}

/// 开始听写响应
#[derive(Debug, Clone)]
pub struct StartDictationResponse {
    pub session_id: String,
}

/// 写入识别结果命令
#[derive(Debug, Clone)]
pub struct IngestRecognitionCommand {
    pub session_id: String,
    pub words: Vec<RecognizedWord>,
}

/// 写入识别结果响应
#[derive(Debug, Clone)]
pub struct IngestRecognitionResponse {
    pub session_id: String,
    /// 本批最后一个匹配的单词
    pub matched_word: Option<usize>,
    /// 当前高亮（无匹配时保留上一个）
    pub highlighted_word: Option<usize>,
    pub aligner_cursor: usize,
}
