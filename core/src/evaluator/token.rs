//! Classification of a single line of input.

/// A token, classified by shape only.
///
/// Whether a token is legal is decided by the evaluator from its current
/// expectation, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Number(i64),
    Open,
    Close,
    Plus,
    Star,
    Equals,
    /// Neither a symbol nor an integer literal that fits in an `i64`.
    Malformed,
}

impl Token {
    /// Classify `text` exactly as given; callers trim whitespace first.
    pub fn classify(text: &str) -> Token {
        match text {
            "(" => Token::Open,
            ")" => Token::Close,
            "+" => Token::Plus,
            "*" => Token::Star,
            "=" => Token::Equals,
            _ => text
                .parse::<i64>()
                .map(Token::Number)
                .unwrap_or(Token::Malformed),
        }
    }
}
