#![forbid(missing_docs)]
//! The `dfagen` crate compiles a regex pattern into a minimal DFA.
//! The pattern is parsed into an NFA by Thompson construction, converted into a DFA by subset
//! construction and minimized by partition refinement. The minimal DFA can be emitted as a
//! switch based scanner skeleton.

/// Module with error definitions
mod errors;
pub use errors::{DfaGenError, DfaGenErrorKind, Result, SyntaxError};

/// Module that provides types for integer ids that can also be used to index into slices.
mod ids;
pub use ids::{DfaStateID, StateID, StateIdGenerator};

/// The labels of NFA edges.
mod symbol;
pub use symbol::Symbol;

/// Bracket expressions.
mod character_class;
pub use character_class::CharacterClass;

/// The nfa module contains the NFA implementation.
mod nfa;
pub use nfa::{Fragment, Nfa, NfaState};

/// The parser module contains the regex syntax parser.
mod parser;
pub use parser::parse_regex_syntax;

/// Epsilon closure and edges over sets of NFA states.
mod closure;

/// The dfa module contains the DFA implementation and the subset construction.
mod dfa;
pub use dfa::{CanonicalId, Dfa, DfaState, TransformRecord};

/// DFA minimization.
mod minimizer;

/// Adjacency list projections of the automata.
mod projection;
pub use projection::Projection;

/// The generator module contains the code generator.
/// The code generator generates a scanner skeleton from a minimal DFA.
mod generator;
pub use generator::{generate_code, write_scanner_skeleton};

/// The pipeline from a pattern to an automaton.
mod compiler;
pub use compiler::{compile, compile_dfa, compile_nfa};

/// Module with conversion to graphviz dot format
#[cfg(feature = "dot")]
mod dot;
#[cfg(feature = "dot")]
pub use dot::{dfa_render_to, nfa_render_to};
