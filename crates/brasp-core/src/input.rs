//! Input sequences: ordered, 0-indexed symbols
use crate::error::BraspError;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct InputSequence {
    symbols: Vec<char>,
}

impl InputSequence {
    /// Build a sequence from individual symbols, each of which must be
    /// exactly one character.
    pub fn from_symbols<S: AsRef<str>>(symbols: &[S]) -> Result<Self, BraspError> {
        let symbols = symbols
            .iter()
            .enumerate()
            .map(|(position, s)| single_char(s.as_ref()).ok_or_else(|| {
                BraspError::InputError(format!(
                    "symbol at position {} is {:?}, expected exactly one character",
                    position,
                    s.as_ref()
                ))
            }))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { symbols })
    }

    /// Split a word into its characters.
    pub fn from_word(word: &str) -> Self {
        Self { symbols: word.chars().collect() }
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl From<&str> for InputSequence {
    fn from(word: &str) -> Self {
        Self::from_word(word)
    }
}

pub(crate) fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
