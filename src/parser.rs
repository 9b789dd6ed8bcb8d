//! This module contains the parser for the regex syntax.
//! The parser builds the NFA directly while it scans the pattern (Thompson construction).
//! It is a shunting-yard evaluator with one stack for operators and one for NFA fragments.
//!
//! Supported syntax: literal characters, grouping with `(` and `)`, character classes with
//! `[` and `]` including `a-z` ranges, alternation `|`, explicit concatenation `&` and the
//! postfix repetitions `*`, `+` and `?`. Adjacent operands are concatenated implicitly.

use log::trace;
use std::time::Instant;

use crate::{
    nfa::Fragment, CharacterClass, DfaGenError, Nfa, Result, StateIdGenerator, SyntaxError,
};

macro_rules! syntax_error {
    ($error:expr) => {
        DfaGenError::from($error)
    };
}

macro_rules! missing_operand {
    ($operator:expr, $position:expr) => {
        syntax_error!(SyntaxError::MissingOperand {
            operator: $operator,
            position: $position,
        })
    };
}

/// The operators on the operator stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Alternation,
    Concatenation,
    // An open '(' that waits for its ')'.
    Group,
}

impl Operator {
    const ALTERNATION: char = '|';
    const CONCATENATION: char = '&';

    fn precedence(self) -> u8 {
        match self {
            Operator::Group => 0,
            Operator::Alternation => 1,
            Operator::Concatenation => 2,
        }
    }

    fn as_char(self) -> char {
        match self {
            Operator::Alternation => Self::ALTERNATION,
            Operator::Concatenation => Self::CONCATENATION,
            Operator::Group => '(',
        }
    }
}

// The postfix repetitions share the highest precedence, 3. They are applied as soon as they
// are read, so they never wait on the operator stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repetition {
    ZeroOrMore,
    OneOrMore,
    ZeroOrOne,
}

/// Parse the pattern and build its NFA.
///
/// The returned NFA carries the outermost fragment as its start and end state. The caller
/// flags them as the global start and end with [Nfa::mark_terminals].
///
/// # Errors
/// A [SyntaxError] is returned if the pattern is empty or malformed. No partial NFA is
/// returned in that case.
pub fn parse_regex_syntax(pattern: &str, ids: &mut StateIdGenerator) -> Result<Nfa> {
    let now = Instant::now();
    let nfa = ThompsonConstructor::new(ids).build(pattern)?;
    let elapsed_time = now.elapsed();
    trace!(
        "Parsing '{}' took {} microseconds, {} NFA states.",
        pattern.escape_default(),
        elapsed_time.as_micros(),
        nfa.states().len()
    );
    Ok(nfa)
}

struct ThompsonConstructor<'a> {
    ids: &'a mut StateIdGenerator,
    nfa: Nfa,
    // Operators together with their position in the pattern
    operators: Vec<(Operator, usize)>,
    fragments: Vec<Fragment>,
    // True if the last token completed an operand: a literal, a class, a ')' or a repetition.
    after_operand: bool,
}

impl<'a> ThompsonConstructor<'a> {
    fn new(ids: &'a mut StateIdGenerator) -> Self {
        ThompsonConstructor {
            ids,
            nfa: Nfa::new(),
            operators: Vec::new(),
            fragments: Vec::new(),
            after_operand: false,
        }
    }

    fn build(mut self, pattern: &str) -> Result<Nfa> {
        let chars: Vec<char> = pattern.chars().collect();
        if chars.is_empty() {
            return Err(syntax_error!(SyntaxError::EmptyPattern));
        }

        let mut index = 0;
        while index < chars.len() {
            let c = chars[index];
            match c {
                '(' => {
                    self.insert_concatenation(index)?;
                    self.operators.push((Operator::Group, index));
                    self.after_operand = false;
                }
                ')' => self.close_group(index)?,
                '[' => {
                    let (class, close) = CharacterClass::scan(&chars, index)?;
                    self.insert_concatenation(index)?;
                    let fragment = self.nfa.char_class(self.ids, &class);
                    self.push_operand(fragment);
                    index = close;
                }
                '*' => self.repeat(Repetition::ZeroOrMore, c, index)?,
                '+' => self.repeat(Repetition::OneOrMore, c, index)?,
                '?' => self.repeat(Repetition::ZeroOrOne, c, index)?,
                Operator::ALTERNATION => self.push_infix(Operator::Alternation, index)?,
                Operator::CONCATENATION => self.push_infix(Operator::Concatenation, index)?,
                _ => {
                    self.insert_concatenation(index)?;
                    let fragment = self.nfa.literal(self.ids, c);
                    self.push_operand(fragment);
                }
            }
            index += 1;
        }

        self.finish()
    }

    fn push_operand(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
        self.after_operand = true;
    }

    // An operand that directly follows another operand is concatenated to it.
    fn insert_concatenation(&mut self, position: usize) -> Result<()> {
        if self.after_operand {
            self.push_infix(Operator::Concatenation, position)?;
        }
        Ok(())
    }

    fn push_infix(&mut self, operator: Operator, position: usize) -> Result<()> {
        if !self.after_operand {
            return Err(missing_operand!(operator.as_char(), position));
        }
        while let Some(&(top, top_position)) = self.operators.last() {
            if top == Operator::Group || top.precedence() < operator.precedence() {
                break;
            }
            self.operators.pop();
            self.apply(top, top_position)?;
        }
        self.operators.push((operator, position));
        self.after_operand = false;
        Ok(())
    }

    fn repeat(&mut self, repetition: Repetition, operator: char, position: usize) -> Result<()> {
        if !self.after_operand {
            return Err(missing_operand!(operator, position));
        }
        let a = self
            .fragments
            .pop()
            .ok_or_else(|| missing_operand!(operator, position))?;
        let fragment = match repetition {
            Repetition::ZeroOrMore => self.nfa.zero_or_more(self.ids, a),
            Repetition::OneOrMore => self.nfa.one_or_more(self.ids, a),
            Repetition::ZeroOrOne => self.nfa.zero_or_one(self.ids, a),
        };
        self.push_operand(fragment);
        Ok(())
    }

    fn close_group(&mut self, position: usize) -> Result<()> {
        if !self.after_operand {
            return match self.operators.last() {
                Some((Operator::Group, _)) => Err(syntax_error!(SyntaxError::EmptyGroup(
                    position
                ))),
                Some((operator, operator_position)) => {
                    Err(missing_operand!(operator.as_char(), *operator_position))
                }
                None => Err(syntax_error!(SyntaxError::UnmatchedClosingParenthesis(
                    position
                ))),
            };
        }
        loop {
            match self.operators.pop() {
                Some((Operator::Group, _)) => break,
                Some((operator, operator_position)) => self.apply(operator, operator_position)?,
                None => {
                    return Err(syntax_error!(SyntaxError::UnmatchedClosingParenthesis(
                        position
                    )))
                }
            }
        }
        // A closed group is an operand itself.
        self.after_operand = true;
        Ok(())
    }

    fn apply(&mut self, operator: Operator, position: usize) -> Result<()> {
        if operator == Operator::Group {
            return Err(syntax_error!(SyntaxError::UnmatchedOpeningParenthesis(
                position
            )));
        }
        let b = self.fragments.pop();
        let a = self.fragments.pop();
        let (Some(a), Some(b)) = (a, b) else {
            return Err(missing_operand!(operator.as_char(), position));
        };
        let fragment = if operator == Operator::Alternation {
            self.nfa.alternation(self.ids, a, b)
        } else {
            self.nfa.concat(a, b)
        };
        self.fragments.push(fragment);
        Ok(())
    }

    fn finish(mut self) -> Result<Nfa> {
        if !self.after_operand {
            return match self.operators.last() {
                Some((Operator::Group, position)) => Err(syntax_error!(
                    SyntaxError::UnmatchedOpeningParenthesis(*position)
                )),
                Some((operator, position)) => Err(missing_operand!(operator.as_char(), *position)),
                None => Err(syntax_error!(SyntaxError::EmptyPattern)),
            };
        }
        while let Some((operator, position)) = self.operators.pop() {
            self.apply(operator, position)?;
        }

        // Any fragments left over are concatenated from left to right.
        let mut fragments = std::mem::take(&mut self.fragments).into_iter();
        let first = fragments
            .next()
            .ok_or_else(|| syntax_error!(SyntaxError::EmptyPattern))?;
        let fragment = fragments.fold(first, |a, b| self.nfa.concat(a, b));

        self.nfa.set_fragment(fragment);
        Ok(self.nfa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Symbol;

    fn parse(pattern: &str) -> Result<Nfa> {
        let mut ids = StateIdGenerator::new();
        let mut nfa = parse_regex_syntax(pattern, &mut ids)?;
        nfa.mark_terminals();
        Ok(nfa)
    }

    fn syntax_error_of(pattern: &str) -> SyntaxError {
        match parse(pattern) {
            Ok(_) => panic!("pattern '{}' should not parse", pattern),
            Err(e) => e
                .syntax_error()
                .cloned()
                .unwrap_or_else(|| panic!("no syntax error: {}", e)),
        }
    }

    #[test]
    fn test_single_literal() {
        let nfa = parse("a").unwrap();
        assert_eq!(nfa.states().len(), 2);
        assert_eq!(nfa.start_state().as_usize(), 0);
        assert_eq!(nfa.end_state().as_usize(), 1);
    }

    #[test]
    fn test_implicit_concatenation() {
        let nfa = parse("ab").unwrap();
        assert_eq!(nfa.states().len(), 4);
        assert_eq!(nfa.start_state().as_usize(), 0);
        assert_eq!(nfa.end_state().as_usize(), 3);
        assert!(nfa.accepts("ab"));
        assert!(!nfa.accepts("a"));
    }

    #[test]
    fn test_explicit_concatenation() {
        let nfa = parse("a&b").unwrap();
        assert_eq!(nfa.states().len(), 4);
        assert!(nfa.accepts("ab"));
        assert!(!nfa.accepts("a&b"));
    }

    #[test]
    fn test_precedence_of_explicit_concatenation() {
        // a|b&c* reads as a|(b(c*))
        let nfa = parse("a|b&c*").unwrap();
        for input in ["a", "b", "bc", "bccc"] {
            assert!(nfa.accepts(input), "{}", input);
        }
        for input in ["ab", "ac", "abc", "c", "bcb"] {
            assert!(!nfa.accepts(input), "{}", input);
        }
        // (a|b)&c binds the group first
        let nfa = parse("(a|b)&c").unwrap();
        assert!(nfa.accepts("ac"));
        assert!(nfa.accepts("bc"));
        assert!(!nfa.accepts("a"));
    }

    #[test]
    fn test_precedence_of_alternation() {
        // ab|c reads as (ab)|c
        let nfa = parse("ab|c").unwrap();
        assert!(nfa.accepts("ab"));
        assert!(nfa.accepts("c"));
        assert!(!nfa.accepts("ac"));
    }

    #[test]
    fn test_concatenation_after_group() {
        // (a)b|c reads as ((a)b)|c
        let nfa = parse("(a)b|c").unwrap();
        assert!(nfa.accepts("ab"));
        assert!(nfa.accepts("c"));
        assert!(!nfa.accepts("ac"));
    }

    #[test]
    fn test_concatenation_after_repetition() {
        let nfa = parse("a*b+c?d").unwrap();
        assert!(nfa.accepts("bd"));
        assert!(nfa.accepts("aabbcd"));
        assert!(!nfa.accepts("ad"));
        let nfa = parse("a?(b)").unwrap();
        assert!(nfa.accepts("b"));
        assert!(nfa.accepts("ab"));
    }

    #[test]
    fn test_repetition_binds_tighter_than_concatenation() {
        let nfa = parse("ab*").unwrap();
        assert!(nfa.accepts("a"));
        assert!(nfa.accepts("abbb"));
        assert!(!nfa.accepts("abab"));
    }

    #[test]
    fn test_character_class_operand() {
        let nfa = parse("a[b-d]").unwrap();
        assert_eq!(nfa.states().len(), 4);
        let class_start = nfa.state(nfa.start_state() + 2);
        assert_eq!(class_start.edges().len(), 3);
        assert!(class_start.edges().contains_key(&Symbol::Char('c')));
        let nfa = parse("[ab]c").unwrap();
        assert!(nfa.accepts("bc"));
    }

    #[test]
    fn test_dragon_ids() {
        let nfa = parse("(a|b)*abb").unwrap();
        assert_eq!(nfa.states().len(), 14);
        assert_eq!(nfa.start_state().as_usize(), 6);
        assert_eq!(nfa.end_state().as_usize(), 13);
    }

    #[test]
    fn test_nested_groups() {
        let nfa = parse("a((b|c)*)(d*e)").unwrap();
        assert!(nfa.accepts("ae"));
        assert!(nfa.accepts("abcdde"));
        assert!(!nfa.accepts("abcd"));
    }

    #[test]
    fn test_empty_pattern() {
        assert_eq!(syntax_error_of(""), SyntaxError::EmptyPattern);
    }

    #[test]
    fn test_unmatched_parentheses() {
        assert_eq!(
            syntax_error_of("ab)"),
            SyntaxError::UnmatchedClosingParenthesis(2)
        );
        assert_eq!(
            syntax_error_of(")"),
            SyntaxError::UnmatchedClosingParenthesis(0)
        );
        assert_eq!(
            syntax_error_of("(ab"),
            SyntaxError::UnmatchedOpeningParenthesis(0)
        );
        assert_eq!(
            syntax_error_of("(a|(b)"),
            SyntaxError::UnmatchedOpeningParenthesis(0)
        );
    }

    #[test]
    fn test_empty_group() {
        assert_eq!(syntax_error_of("a()"), SyntaxError::EmptyGroup(2));
    }

    #[test]
    fn test_missing_operands() {
        assert_eq!(
            syntax_error_of("*a"),
            SyntaxError::MissingOperand {
                operator: '*',
                position: 0
            }
        );
        assert_eq!(
            syntax_error_of("|a"),
            SyntaxError::MissingOperand {
                operator: '|',
                position: 0
            }
        );
        assert_eq!(
            syntax_error_of("a||b"),
            SyntaxError::MissingOperand {
                operator: '|',
                position: 2
            }
        );
        assert_eq!(
            syntax_error_of("a|"),
            SyntaxError::MissingOperand {
                operator: '|',
                position: 1
            }
        );
        assert_eq!(
            syntax_error_of("(a|)"),
            SyntaxError::MissingOperand {
                operator: '|',
                position: 2
            }
        );
        assert_eq!(
            syntax_error_of("a|*"),
            SyntaxError::MissingOperand {
                operator: '*',
                position: 2
            }
        );
    }

    #[test]
    fn test_character_class_errors_abort_parsing() {
        assert_eq!(
            syntax_error_of("a[bc"),
            SyntaxError::UnterminatedCharacterClass(1)
        );
        assert_eq!(
            syntax_error_of("a[z-a]"),
            SyntaxError::DescendingRange {
                start: 'z',
                end: 'a',
                position: 4
            }
        );
    }
}
