//! 外部走法提议解析器
//!
//! 外部来源（LLM 等）返回的是自由文本，这里负责清理并提取可能的走法记号。
//! 提取出的候选记号本身不可信，合法性由 [`crate::MoveSelector`] 判定。

use tracing::debug;

/// 走法提议解析器
pub struct ProposalParser;

impl ProposalParser {
    /// 清理 LLM 原始回复
    ///
    /// 移除推理标签和 markdown 代码块标记，换行视为空格。
    pub fn clean_response(response: &str) -> String {
        let mut cleaned = response.to_string();

        // 1. 移除 deepseek-r1 等模型的 <think>...</think> 标签
        if let Some(think_end) = cleaned.find("</think>") {
            cleaned = cleaned[think_end + "</think>".len()..].to_string();
        }

        // 2. 移除 markdown 代码块标记
        cleaned = cleaned.replace("```json", "").replace("```", "");

        // 3. 换行视为空格
        cleaned = cleaned.replace(|c: char| c == '\n' || c == '\r', " ");

        Self::normalize(&cleaned)
    }

    /// 去掉首尾空白，并把内部连续空白压缩为一个空格
    pub fn normalize(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// 提取候选记号，按优先级排列
    ///
    /// 整段文本优先，其次是逐个单词（去掉回合编号和标点）。
    pub fn candidates(text: &str) -> Vec<String> {
        let normalized = Self::normalize(text);
        let mut candidates: Vec<String> = Vec::new();

        let mut push = |token: String| {
            if !token.is_empty() && !candidates.contains(&token) {
                candidates.push(token);
            }
        };

        push(Self::clean_token(&normalized));
        for word in normalized.split(' ') {
            push(Self::clean_token(word));
        }

        debug!("Proposal candidates: {:?}", candidates);
        candidates
    }

    /// 清理单个记号：去掉包裹符号、回合编号、结尾标点，并修正数字零写法的易位
    fn clean_token(token: &str) -> String {
        let trimmed = token.trim_matches(|c: char| {
            matches!(
                c,
                '"' | '\'' | '`' | '*' | '(' | ')' | '[' | ']' | '{' | '}' | ',' | ';' | ':' | '.'
            )
        });

        // 去掉回合编号，如 "1." "12..." "3…"
        let without_number = match trimmed.find(|c: char| !c.is_ascii_digit()) {
            Some(idx) if idx > 0 && trimmed[idx..].starts_with(is_ellipsis) => {
                trimmed[idx..].trim_start_matches(is_ellipsis).trim()
            }
            Some(_) => trimmed,
            None => "",
        };

        match without_number {
            "0-0" => "O-O".to_string(),
            "0-0-0" => "O-O-O".to_string(),
            other => other.to_string(),
        }
    }
}

fn is_ellipsis(c: char) -> bool {
    c == '.' || c == '…'
}
