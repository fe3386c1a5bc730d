use thiserror::Error;

/// Failure to read a cell as literal data. Offsets are byte positions in the cell text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    #[error("unexpected end of input at offset {offset}, expected {expected}")]
    UnexpectedEnd {
        offset: usize,
        expected: &'static str,
    },

    #[error("unexpected character '{found}' at offset {offset}, expected {expected}")]
    UnexpectedChar {
        offset: usize,
        found: char,
        expected: &'static str,
    },

    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("invalid escape at offset {offset}: {message}")]
    InvalidEscape { offset: usize, message: String },

    #[error("invalid number '{text}' at offset {offset}")]
    InvalidNumber { offset: usize, text: String },

    #[error("'{name}' at offset {offset} is not a literal")]
    NotALiteral { offset: usize, name: String },

    #[error("unhashable mapping key at offset {offset}")]
    UnhashableKey { offset: usize },

    #[error("nesting deeper than {limit} levels at offset {offset}")]
    TooDeep { offset: usize, limit: usize },

    #[error("trailing content at offset {offset}")]
    TrailingContent { offset: usize },

    #[error("expected a list of records, found {found}")]
    NotAList { found: &'static str },
}
