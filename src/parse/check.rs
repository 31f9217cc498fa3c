//! Screening for notation strings before they're handed to an importer or a naming service.

use crate::utils::echar::*;
use smallvec::SmallVec;
use thiserror::Error;

/// Longest notation that will be passed along
pub const MAX_NOTATION_LEN: usize = 1000;

/// Bytes that can appear in a notation string
pub fn is_notation_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"()[]{}@+-=#$%:;.,".contains(&b)
}

/// Inner enum for `NotationError`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NotationErrorKind {
    #[error("the notation is empty")]
    Empty,
    #[error("the notation is {0} bytes long, which is over the limit")]
    TooLong(usize),
    #[error("{0} isn't allowed in a notation")]
    BadChar(TextByte),
    #[error("{0} doesn't close anything")]
    Unmatched(TextByte),
    #[error("{0} is never closed")]
    Unclosed(TextByte),
}

/// A notation string failed screening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("an error occured at {} in the notation: {kind}", IdxPrint(*.index))]
pub struct NotationError {
    pub index: usize,
    pub kind: NotationErrorKind,
}
impl NotationError {
    /// Convenience method
    pub const fn new(index: usize, kind: NotationErrorKind) -> Self {
        Self { index, kind }
    }
}

/// Check that a notation is non-empty, not too long, uses only notation characters, and has its
/// parentheses, brackets, and braces properly nested.
pub fn check_notation(notation: &str) -> Result<(), NotationError> {
    use NotationErrorKind::*;
    let input = notation.as_bytes();
    if input.is_empty() {
        return Err(NotationError::new(usize::MAX, Empty));
    }
    if input.len() > MAX_NOTATION_LEN {
        return Err(NotationError::new(MAX_NOTATION_LEN, TooLong(input.len())));
    }
    let mut open = SmallVec::<(usize, u8), 8>::new();
    for (idx, &b) in input.iter().enumerate() {
        if !is_notation_byte(b) {
            return Err(NotationError::new(idx, BadChar(TextByte(b))));
        }
        let opener = match b {
            b'(' | b'[' | b'{' => {
                open.push((idx, b));
                continue;
            }
            b')' => b'(',
            b']' => b'[',
            b'}' => b'{',
            _ => continue,
        };
        match open.pop() {
            Some((_, o)) if o == opener => {}
            _ => return Err(NotationError::new(idx, Unmatched(TextByte(b)))),
        }
    }
    match open.pop() {
        Some((idx, b)) => Err(NotationError::new(idx, Unclosed(TextByte(b)))),
        None => Ok(()),
    }
}

/// Drop everything that isn't a notation character, then cut to the length limit
pub fn sanitize_notation(notation: &str) -> String {
    notation
        .bytes()
        .filter(|&b| is_notation_byte(b))
        .take(MAX_NOTATION_LEN)
        .map(char::from)
        .collect()
}
