use std::collections::BTreeSet;

use crate::{Result, SyntaxError};

/// A set of characters written as a bracket expression like `[a-cx]`.
///
/// The class compiles to a single NFA fragment with one edge per character, which is
/// equivalent to the alternation of all its characters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CharacterClass {
    chars: BTreeSet<char>,
}

// The two states of the bracket scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Plain,
    // A '-' was read after this character, the next character closes the range.
    RangePending(char),
}

impl CharacterClass {
    /// Create an empty character class.
    pub fn new() -> Self {
        CharacterClass::default()
    }

    /// Add a character to the class.
    pub fn insert(&mut self, c: char) {
        self.chars.insert(c);
    }

    /// Add every character of the inclusive range `start..=end` to the class.
    pub fn insert_range(&mut self, start: char, end: char) {
        self.chars.extend(start..=end);
    }

    /// Returns true if the character belongs to the class.
    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    /// The characters of the class in ascending order.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.chars.iter().copied()
    }

    /// The number of characters in the class.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Returns true if the class has no characters.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Scan a bracket expression.
    ///
    /// `open` is the index of the `[` in `pattern`. On success the class is returned together
    /// with the index of the closing `]`.
    ///
    /// Inside the brackets every character except `-` and `]` stands for itself. A `-` opens a
    /// range that the following character closes. A `-` at the very beginning or directly
    /// before the closing `]` is taken literally.
    pub(crate) fn scan(pattern: &[char], open: usize) -> Result<(CharacterClass, usize)> {
        let mut class = CharacterClass::new();
        let mut previous: Option<char> = None;
        let mut state = ScanState::Plain;

        for (index, &c) in pattern.iter().enumerate().skip(open + 1) {
            match state {
                ScanState::Plain => match (c, previous) {
                    (']', _) => {
                        if class.is_empty() {
                            return Err(SyntaxError::EmptyCharacterClass(open).into());
                        }
                        return Ok((class, index));
                    }
                    ('-', Some(start)) if pattern.get(index + 1) != Some(&']') => {
                        state = ScanState::RangePending(start);
                    }
                    _ => {
                        class.insert(c);
                        previous = Some(c);
                    }
                },
                ScanState::RangePending(start) => {
                    if c < start {
                        return Err(SyntaxError::DescendingRange {
                            start,
                            end: c,
                            position: index,
                        }
                        .into());
                    }
                    class.insert_range(start, c);
                    previous = Some(c);
                    state = ScanState::Plain;
                }
            }
        }

        Err(SyntaxError::UnterminatedCharacterClass(open).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(input: &str) -> Result<(CharacterClass, usize)> {
        let chars: Vec<char> = input.chars().collect();
        CharacterClass::scan(&chars, 0)
    }

    #[test]
    fn test_plain_characters() {
        let (class, close) = scan("[xay]b").unwrap();
        assert_eq!(close, 4);
        assert_eq!(class.chars().collect::<String>(), "axy");
    }

    #[test]
    fn test_range() {
        let (class, close) = scan("[b-d]").unwrap();
        assert_eq!(close, 4);
        assert_eq!(class.chars().collect::<String>(), "bcd");
    }

    #[test]
    fn test_mixed_ranges() {
        let (class, _) = scan("[bcA-CdeD-E]").unwrap();
        assert_eq!(class.chars().collect::<String>(), "ABCDEbcde");
    }

    #[test]
    fn test_chained_range() {
        // The end of a range can open the next one.
        let (class, _) = scan("[a-c-e]").unwrap();
        assert_eq!(class.chars().collect::<String>(), "abcde");
    }

    #[test]
    fn test_literal_dash() {
        let (class, _) = scan("[-a]").unwrap();
        assert_eq!(class.chars().collect::<String>(), "-a");
        let (class, _) = scan("[a-]").unwrap();
        assert_eq!(class.chars().collect::<String>(), "-a");
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let (class, _) = scan("[(|*)]").unwrap();
        assert!(class.contains('('));
        assert!(class.contains('|'));
        assert!(class.contains('*'));
        assert!(class.contains(')'));
        assert_eq!(class.len(), 4);
    }

    #[test]
    fn test_unterminated() {
        let error = scan("[abc").unwrap_err();
        assert_eq!(
            error.syntax_error(),
            Some(&SyntaxError::UnterminatedCharacterClass(0))
        );
        // A pending range does not close the class either.
        let error = scan("[a-").unwrap_err();
        assert_eq!(
            error.syntax_error(),
            Some(&SyntaxError::UnterminatedCharacterClass(0))
        );
    }

    #[test]
    fn test_descending_range() {
        let error = scan("[z-a]").unwrap_err();
        assert_eq!(
            error.syntax_error(),
            Some(&SyntaxError::DescendingRange {
                start: 'z',
                end: 'a',
                position: 3
            })
        );
    }

    #[test]
    fn test_empty_class() {
        let error = scan("[]").unwrap_err();
        assert_eq!(
            error.syntax_error(),
            Some(&SyntaxError::EmptyCharacterClass(0))
        );
    }
}
