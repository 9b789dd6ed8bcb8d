//! This module contains the source generator for the scanner skeleton.
//! The skeleton is a nested switch over an integer state and the next input character.

use crate::{compile, Dfa, DfaStateID, Result};
use log::trace;
use std::io::Write;
use std::time::Instant;

/// The state number of the error case in the generated code.
const ERROR_STATE: i64 = -1;

// DFA states are numbered from 1 in the order of their ids.
#[inline]
fn state_number(dfa: &Dfa, id: DfaStateID) -> i64 {
    debug_assert!(id.as_usize() < dfa.states().len());
    id.as_usize() as i64 + 1
}

/// Write the scanner skeleton of a DFA.
///
/// The DFA should be minimized. Each DFA state becomes a `case` of the outer switch, numbered
/// from 1 in the order of the state ids. The transitions of a state are emitted in character
/// order and every inner switch ends with a `default` case that enters the error state `-1`.
///
/// # Errors
/// An error is returned if writing to `output` fails.
pub fn write_scanner_skeleton(dfa: &Dfa, output: &mut dyn Write) -> Result<()> {
    let start = if dfa.states().is_empty() {
        ERROR_STATE
    } else {
        state_number(dfa, dfa.start_state())
    };
    writeln!(output, "int state = {};", start)?;
    writeln!(output, "char input;")?;
    writeln!(output, "switch(state){{")?;
    writeln!(output, "\tcase {}:", ERROR_STATE)?;
    writeln!(output, "\t\thandleError();")?;
    writeln!(output, "\t\tbreak;")?;

    for state in dfa.states() {
        writeln!(output, "\tcase {}:", state_number(dfa, state.id()))?;
        writeln!(output, "\t\tinput = next();")?;
        writeln!(output, "\t\tswitch(input){{")?;
        if let Some(targets) = dfa.transitions().get(&state.id()) {
            for (c, target) in targets {
                writeln!(output, "\t\t\tcase {}:", c)?;
                writeln!(output, "\t\t\t\tstate = {};", state_number(dfa, *target))?;
                writeln!(output, "\t\t\t\tbreak;")?;
            }
        }
        writeln!(output, "\t\t\tdefault:")?;
        writeln!(output, "\t\t\t\tstate = {};", ERROR_STATE)?;
        writeln!(output, "\t\t\t\tbreak;")?;
        writeln!(output, "\t\t}}")?;
        writeln!(output, "\t\tbreak;")?;
    }

    writeln!(output, "}}")?;
    Ok(())
}

/// Generate the scanner skeleton for a regex pattern.
///
/// The pattern is compiled into a minimal DFA which is then written with
/// [write_scanner_skeleton].
///
/// # Arguments
/// * `pattern` - The regex pattern.
/// * `output` - A Write trait object that receives the generated code.
///
/// # Errors
/// An error is returned if the pattern is invalid or if writing fails. Nothing is written for
/// an invalid pattern.
pub fn generate_code(pattern: &str, output: &mut dyn Write) -> Result<()> {
    let now = Instant::now();
    let dfa = compile(pattern)?;
    write_scanner_skeleton(&dfa, output)?;
    let elapsed_time = now.elapsed();
    trace!(
        "Code generation took {} milliseconds.",
        elapsed_time.as_millis()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntaxError;

    const AB_SKELETON: &str = "\
int state = 1;
char input;
switch(state){
\tcase -1:
\t\thandleError();
\t\tbreak;
\tcase 1:
\t\tinput = next();
\t\tswitch(input){
\t\t\tcase a:
\t\t\t\tstate = 3;
\t\t\t\tbreak;
\t\t\tdefault:
\t\t\t\tstate = -1;
\t\t\t\tbreak;
\t\t}
\t\tbreak;
\tcase 2:
\t\tinput = next();
\t\tswitch(input){
\t\t\tdefault:
\t\t\t\tstate = -1;
\t\t\t\tbreak;
\t\t}
\t\tbreak;
\tcase 3:
\t\tinput = next();
\t\tswitch(input){
\t\t\tcase b:
\t\t\t\tstate = 2;
\t\t\t\tbreak;
\t\t\tdefault:
\t\t\t\tstate = -1;
\t\t\t\tbreak;
\t\t}
\t\tbreak;
}
";

    #[test]
    fn test_generate_code() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut buffer = Vec::new();
        generate_code("ab", &mut buffer).unwrap();
        let generated_code = String::from_utf8(buffer).unwrap();
        assert_eq!(generated_code, AB_SKELETON);
    }

    #[test]
    fn test_generate_code_is_deterministic() {
        let mut first = Vec::new();
        let mut second = Vec::new();
        generate_code("(a|b)*abb", &mut first).unwrap();
        generate_code("(a|b)*abb", &mut second).unwrap();
        assert_eq!(first, second);
        let generated_code = String::from_utf8(first).unwrap();
        assert!(generated_code.starts_with("int state = 1;\n"));
        // One case per state of the minimal DFA plus the error case.
        let cases = generated_code.matches("\tcase ").count();
        let inner_cases = generated_code.matches("\t\t\tcase ").count();
        assert_eq!(cases - inner_cases, 5);
        assert_eq!(inner_cases, 8);
    }

    #[test]
    fn test_generate_code_invalid_pattern() {
        let mut buffer = Vec::new();
        let error = generate_code("[ab", &mut buffer).unwrap_err();
        assert_eq!(
            error.syntax_error(),
            Some(&SyntaxError::UnterminatedCharacterClass(0))
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_empty_dfa_skeleton() {
        let mut buffer = Vec::new();
        write_scanner_skeleton(&Dfa::default(), &mut buffer).unwrap();
        let generated_code = String::from_utf8(buffer).unwrap();
        assert_eq!(
            generated_code,
            "int state = -1;\nchar input;\nswitch(state){\n\tcase -1:\n\t\thandleError();\n\t\tbreak;\n}\n"
        );
    }
}
