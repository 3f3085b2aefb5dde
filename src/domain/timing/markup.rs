//! 带标记的合成请求
//!
//! 标记型供应商只在请求里出现 `<mark>` 的位置回报时间点，
//! 因此在块内每个单词前插入 `<mark name="word_<n>"/>`。

use super::WORD_MARK_PREFIX;
use crate::domain::chunking::Chunk;
use crate::domain::document::Document;

/// 为块构造 SSML 请求，n 为块内单词序号
pub fn build_marked_request(document: &Document, chunk: &Chunk) -> String {
    let mut body = String::with_capacity(chunk.text().len() * 2);

    let words = chunk.sentences(document).iter().flat_map(|s| s.words().iter());
    for (ordinal, word) in words.enumerate() {
        body.push_str("<mark name=\"");
        body.push_str(WORD_MARK_PREFIX);
        body.push_str(&ordinal.to_string());
        body.push_str("\"/>");
        escape_into(&mut body, word.content());
        body.push(' ');
    }

    format!("<speak>{}</speak>", body.trim_end())
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
}
