//! The compilation pipeline from a pattern to a minimal DFA.
//! Each entry point uses its own [StateIdGenerator], so compilations are independent of each
//! other.

use log::debug;

use crate::{parse_regex_syntax, Dfa, Nfa, Result, StateIdGenerator, SyntaxError};

/// Compile a pattern into an NFA whose outer start and end state are flagged.
///
/// # Errors
/// A [SyntaxError] is returned for an empty or malformed pattern.
pub fn compile_nfa(pattern: &str) -> Result<Nfa> {
    if pattern.is_empty() {
        return Err(SyntaxError::EmptyPattern.into());
    }
    let mut ids = StateIdGenerator::new();
    let mut nfa = parse_regex_syntax(pattern, &mut ids)?;
    nfa.mark_terminals();
    Ok(nfa)
}

/// Compile a pattern into a DFA by subset construction. The DFA is not minimized.
pub fn compile_dfa(pattern: &str) -> Result<Dfa> {
    let nfa = compile_nfa(pattern)?;
    Ok(Dfa::from(&nfa))
}

/// Compile a pattern into a minimal DFA.
///
/// # Example
/// ```
/// let dfa = dfagen::compile("a(b|c)*d").unwrap();
/// assert!(dfa.accepts("abcbd"));
/// assert!(!dfa.accepts("abc"));
/// ```
pub fn compile(pattern: &str) -> Result<Dfa> {
    let dfa = compile_dfa(pattern)?.minimize();
    debug!(
        "Compiled '{}' into {} states.",
        pattern.escape_default(),
        dfa.states().len()
    );
    Ok(dfa)
}
