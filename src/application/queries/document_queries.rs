//! Document Queries

/// 获取文档结构（含单词计时）
#[derive(Debug, Clone)]
pub struct GetDocument {
    pub session_id: String,
}

/// 获取块列表
#[derive(Debug, Clone)]
pub struct GetChunks {
    pub session_id: String,
}
