//! LLM 提示模板

/// LLM 提示模板
pub struct PromptTemplate;

impl PromptTemplate {
    /// 走法请求：局面 FEN 加合法走法列表，要求只返回一个走法
    pub fn move_request(fen: &str, legal_moves: &[String]) -> String {
        format!(
            "Chess position FEN: {}\nLegal moves: {}\nReturn only one move from the legal moves list:",
            fen,
            legal_moves.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{Position, INITIAL_FEN};

    #[test]
    fn test_move_request() {
        let moves = vec!["e4".to_string(), "Nf3".to_string()];
        let prompt = PromptTemplate::move_request(INITIAL_FEN, &moves);
        assert_eq!(
            prompt,
            format!(
                "Chess position FEN: {}\nLegal moves: e4, Nf3\nReturn only one move from the legal moves list:",
                INITIAL_FEN
            )
        );
    }

    #[test]
    fn test_prompt_lists_every_legal_move() {
        let position = Position::initial();
        let moves = position.legal_notations();
        let prompt = PromptTemplate::move_request(&position.to_fen(), &moves);
        for mv in &moves {
            assert!(prompt.contains(mv.as_str()));
        }
    }
}
