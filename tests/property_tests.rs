//! Property-based tests for the Natural front end
//!
//! These tests use proptest to verify invariants across many randomly
//! generated inputs, catching edge cases that hand-written tests might miss.

use std::path::Path;

use natfront::frontend::ast::{NodeKind, SyntaxTree};
use natfront::frontend::lexer;
use natfront::frontend::module::{ModuleParser, NaturalModule};
use natfront::frontend::provider::EmptyProvider;
use proptest::prelude::*;

fn parse(source: &str) -> NaturalModule {
    ModuleParser::new(&EmptyProvider)
        .parse_file(Path::new("PROP.NSP"), source)
        .expect("known file type")
}

fn program(declarations: &str, statements: &str) -> String {
    format!("DEFINE DATA LOCAL\n{declarations}END-DEFINE\n{statements}END\n")
}

/// Every node of the module's trees.
fn all_nodes(module: &NaturalModule) -> Vec<natfront::frontend::ast::NodeId> {
    [module.define_data, module.body]
        .into_iter()
        .flatten()
        .flat_map(|root| module.tree.descendants(root))
        .collect()
}

// =============================================================================
// Lexer Properties
// =============================================================================

mod lexer_tests {
    use super::*;

    /// Fragments that never start a comment, whatever their place on the line.
    fn fragment() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec![
            "#A",
            "#LONG-NAME",
            "MOVE",
            "TO",
            "ADD",
            "'TEXT'",
            "12",
            "1.5",
            "(",
            ")",
            ":=",
            "=",
            "#G.#M",
            "PERS.CITY",
        ])
    }

    fn separator() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec![" ", "  ", "\n", " \n  "])
    }

    proptest! {
        /// Property: Every token's text is exactly the source slice at its offset, at the line and column it claims
        #[test]
        fn token_positions_match_the_source(parts in prop::collection::vec((fragment(), separator()), 1..40)) {
            let source: String = parts.iter().flat_map(|(f, s)| [*f, *s]).collect();
            let tokens = lexer::lex(&source, Path::new("PROP.NSP"));

            for token in tokens.iter() {
                prop_assert!(token.offset + token.length <= source.len());
                prop_assert_eq!(&source[token.offset..token.offset + token.length], token.text.as_str());

                let before = &source[..token.offset];
                let line = before.matches('\n').count() as u32;
                let column = (token.offset - before.rfind('\n').map_or(0, |i| i + 1)) as u32;
                prop_assert_eq!(token.line, line, "line of {:?}", token.text);
                prop_assert_eq!(token.column, column, "column of {:?}", token.text);
            }
        }
    }

    #[derive(Debug, Clone)]
    enum CursorOp {
        Advance,
        AdvanceBy(usize),
        Rollback(usize),
        ResetTo(usize),
        Peek(usize),
        Subrange(usize, usize),
    }

    fn cursor_op() -> impl Strategy<Value = CursorOp> {
        prop_oneof![
            Just(CursorOp::Advance),
            (0usize..50).prop_map(CursorOp::AdvanceBy),
            (0usize..50).prop_map(CursorOp::Rollback),
            (0usize..50).prop_map(CursorOp::ResetTo),
            prop_oneof![0usize..50, Just(usize::MAX)].prop_map(CursorOp::Peek),
            (0usize..50, 0usize..50).prop_map(|(a, b)| CursorOp::Subrange(a, b)),
        ]
    }

    proptest! {
        /// Property: No sequence of cursor operations panics or moves the cursor past the end
        #[test]
        fn token_cursor_is_total(ops in prop::collection::vec(cursor_op(), 0..60)) {
            let mut tokens = lexer::lex("MOVE #A TO #B\nADD 1 TO #C\n", Path::new("PROP.NSP"));
            for op in ops {
                match op {
                    CursorOp::Advance => {
                        tokens.advance();
                    }
                    CursorOp::AdvanceBy(n) => tokens.advance_by(n),
                    CursorOp::Rollback(n) => tokens.rollback(n),
                    CursorOp::ResetTo(n) => tokens.reset_to(n),
                    CursorOp::Peek(n) => {
                        let _ = tokens.peek(n);
                    }
                    CursorOp::Subrange(a, b) => {
                        prop_assert!(tokens.subrange(a, b).len() <= tokens.len());
                    }
                }
                prop_assert!(tokens.offset() <= tokens.len());
                prop_assert_eq!(tokens.is_at_end(), tokens.current().is_none());
            }
        }
    }
}

// =============================================================================
// Declaration Properties
// =============================================================================

mod declaration_tests {
    use super::*;

    proptest! {
        /// Property: Members are qualified by their level 1 group, and the name is stable across calls and parses
        #[test]
        fn qualified_names_are_deterministic(members in prop::collection::vec(1usize..4, 1..5)) {
            let mut declarations = String::new();
            for (group, count) in members.iter().enumerate() {
                declarations.push_str(&format!("1 #G{group}\n"));
                for member in 0..*count {
                    declarations.push_str(&format!("2 #M{group}X{member} (A5)\n"));
                }
            }
            let source = program(&declarations, "");
            let first = parse(&source);
            let second = parse(&source);

            let names = |module: &NaturalModule| -> Vec<String> {
                module
                    .variables()
                    .filter_map(|(id, _)| module.tree.qualified_name(id).map(str::to_string))
                    .collect()
            };
            for (id, variable) in first.variables() {
                let qualified = first.tree.qualified_name(id);
                if variable.level == 1 {
                    prop_assert_eq!(qualified, Some(variable.name.as_str()));
                } else {
                    let group = variable.name.trim_start_matches("#M").split('X').next().unwrap_or_default();
                    let expected = format!("#G{group}.{}", variable.name);
                    prop_assert_eq!(qualified, Some(expected.as_str()));
                }
                prop_assert_eq!(first.tree.qualified_name(id), qualified);
            }
            prop_assert_eq!(names(&first), names(&second));
        }

        /// Property: A redefinition is reported exactly when its members need more bytes than the target has
        #[test]
        fn redefinition_length_is_checked(target in 1u32..50, members in prop::collection::vec(1u32..20, 1..5)) {
            let mut declarations = format!("1 #A (A{target})\n1 REDEFINE #A\n");
            for (index, length) in members.iter().enumerate() {
                declarations.push_str(&format!("2 #B{index} (A{length})\n"));
            }
            let module = parse(&program(&declarations, ""));

            let total: u32 = members.iter().sum();
            let reported = module.diagnostics.iter().any(|d| d.code() == "NPP015");
            prop_assert_eq!(reported, total > target, "members {:?} into A{}", members, target);
        }

        /// Property: Array bounds anywhere in the i64 range never abort the parse, and a target whose occurrence
        /// count can't be computed is not length checked
        #[test]
        fn redefinition_of_arrays_with_any_bounds(lower in any::<i64>(), upper in any::<i64>(), member in 1u32..20) {
            let declarations = format!("1 #A (A1/{lower}:{upper})\n1 REDEFINE #A\n2 #B (A{member})\n");
            let module = parse(&program(&declarations, ""));

            let expected = match upper.checked_sub(lower).and_then(|span| span.checked_add(1)) {
                Some(count) => i64::from(member) > count.max(1),
                None => false,
            };
            let reported = module.diagnostics.iter().any(|d| d.code() == "NPP015");
            prop_assert_eq!(reported, expected, "A1/{}:{} redefined by A{}", lower, upper, member);
        }
    }
}

// =============================================================================
// Resolution Properties
// =============================================================================

mod resolution_tests {
    use super::*;

    fn check_symmetry(tree: &SyntaxTree, nodes: &[natfront::frontend::ast::NodeId]) -> Result<(), TestCaseError> {
        for &node in nodes {
            if let Some(target) = tree.reference_target(node) {
                let references = tree.kind(target).references();
                prop_assert!(references.is_some_and(|refs| refs.contains(&node)));
            }
            if let Some(references) = tree.kind(node).references() {
                for &reference in references {
                    prop_assert_eq!(tree.reference_target(reference), Some(node));
                }
            }
        }
        Ok(())
    }

    proptest! {
        /// Property: A reference points at a declaration iff the declaration lists the reference
        #[test]
        fn bindings_are_symmetric(
            declared in 1usize..5,
            moves in prop::collection::vec((0usize..7, 0usize..7), 1..10),
        ) {
            let declarations: String = (0..declared).map(|i| format!("1 #V{i} (N5)\n")).collect();
            let statements: String = moves.iter().map(|(from, to)| format!("MOVE #V{from} TO #V{to}\n")).collect();
            let module = parse(&program(&declarations, &statements));
            let nodes = all_nodes(&module);
            check_symmetry(&module.tree, &nodes)?;

            let unresolved = moves
                .iter()
                .flat_map(|(from, to)| [*from, *to])
                .filter(|index| *index >= declared)
                .count();
            let bound = nodes
                .iter()
                .filter(|node| matches!(module.tree.kind(**node), NodeKind::VariableReference { .. }))
                .filter(|node| module.tree.reference_target(**node).is_some())
                .count();
            prop_assert_eq!(bound, moves.len() * 2 - unresolved);
            prop_assert_eq!(
                module.diagnostics.iter().filter(|d| d.code() == "NPP016").count(),
                unresolved
            );
        }
    }
}
