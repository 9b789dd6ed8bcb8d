//! The `dot` module contains the conversion from the automata to the graphviz dot format.

use std::io::Write;

use dot_writer::{Attributes, DotWriter, RankDirection};

use crate::{Dfa, Nfa};

/// Render the NFA to a graphviz dot format.
pub fn nfa_render_to<W: Write>(nfa: &Nfa, label: &str, output: &mut W) {
    let mut writer = DotWriter::from(output);
    writer.set_pretty_print(true);
    let mut digraph = writer.digraph();
    digraph
        .set_label(label)
        .set_rank_direction(RankDirection::LeftRight);
    // Nodes are numbered by their position in the NFA, ids start at the id of the first state.
    let first_id = nfa.states().first().map_or(0, |state| state.id().as_usize());
    for state in nfa.states() {
        let source_id = {
            let mut source_node = digraph.node_auto();
            source_node.set_label(&state.id().to_string());
            if state.id() == nfa.start_state() {
                source_node
                    .set_shape(dot_writer::Shape::Circle)
                    .set_color(dot_writer::Color::Blue)
                    .set_pen_width(3.0);
            }
            if state.id() == nfa.end_state() {
                source_node
                    .set_shape(dot_writer::Shape::Circle)
                    .set_color(dot_writer::Color::Red)
                    .set_pen_width(3.0);
            }
            source_node.id()
        };
        for (symbol, targets) in state.edges() {
            let label = if symbol.is_epsilon() {
                "ε".to_string()
            } else {
                symbol.to_string().escape_default().to_string()
            };
            for target_state in targets {
                digraph
                    .edge(
                        source_id.clone(),
                        &format!("node_{}", target_state.as_usize() - first_id),
                    )
                    .attributes()
                    .set_label(&label);
            }
        }
    }
}

/// Render a DFA to a graphviz dot format.
pub fn dfa_render_to<W: Write>(dfa: &Dfa, label: &str, output: &mut W) {
    let mut writer = DotWriter::from(output);
    writer.set_pretty_print(true);
    let mut digraph = writer.digraph();
    digraph
        .set_label(label)
        .set_rank_direction(RankDirection::LeftRight);
    // Render the states of the DFA
    for state in dfa.states() {
        let mut source_node = digraph.node_auto();
        source_node.set_label(&format!("{}\n{{{}}}", state.id(), state.canonical_id()));
        if state.id() == dfa.start_state() {
            source_node
                .set_shape(dot_writer::Shape::Circle)
                .set_color(dot_writer::Color::Blue)
                .set_pen_width(3.0);
        }
        if state.is_end() {
            source_node
                .set_color(dot_writer::Color::Red)
                .set_pen_width(3.0);
        }
    }
    // Render the transitions of the DFA
    for (source_id, targets) in dfa.transitions() {
        for (c, target_id) in targets.iter() {
            digraph
                .edge(
                    &format!("node_{}", source_id.as_usize()),
                    &format!("node_{}", target_id.as_usize()),
                )
                .attributes()
                .set_label(&c.escape_default().to_string());
        }
    }
}
