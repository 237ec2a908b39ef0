#[cfg(test)]
/// Parser unit tests.
///
/// These cover the statement and declaration forms the front end models, the diagnostics the parser raises on
/// its own, and recovery (one malformed construct must not cascade into follow-up errors).
mod tests {
    use super::*;
    use crate::lexer;
    use crate::provider::{EmptyProvider, InMemoryProvider};
    use std::path::Path;

    const PERSON_DDM: &str = "\
T L DB Name                             F Leng  S D Remark
- - -- -------------------------------- - ----  - - ------------------------
  1 AA PERSON-ID                        A    8  N D
M 1 AD CITY                             A   20  N
";

    fn statements(source: &str) -> ParseOutput {
        statements_with(source, &EmptyProvider)
    }

    fn statements_with(source: &str, provider: &dyn ModuleProvider) -> ParseOutput {
        parse_statements(lexer::lex(source, Path::new("TEST.NSN")), provider)
    }

    fn data(source: &str) -> ParseOutput {
        data_with(source, &EmptyProvider, FileType::Subprogram)
    }

    fn data_with(source: &str, provider: &dyn ModuleProvider, file_type: FileType) -> ParseOutput {
        parse_define_data(lexer::lex(source, Path::new("TEST.NSN")), provider, file_type)
    }

    fn program(source: &str) -> ParseOutput {
        let tokens = lexer::lex(source, Path::new("TEST.NSP"));
        let mut parser = Parser::new(tokens, &EmptyProvider, ParseOptions::default());
        parser.parse_body(FileType::Program);
        parser.finish()
    }

    fn codes(output: &ParseOutput) -> Vec<&'static str> {
        output.diagnostics.iter().map(|d| d.code()).collect()
    }

    fn statement_nodes(output: &ParseOutput) -> Vec<NodeId> {
        let body = output.body.expect("body");
        output.tree.child_nodes(body).collect()
    }

    fn variable<'a>(output: &'a ParseOutput, name: &str) -> &'a Variable {
        output
            .referencables
            .iter()
            .filter_map(|node| output.tree.variable(*node))
            .find(|variable| variable.name == name)
            .unwrap_or_else(|| panic!("variable {name} not declared"))
    }

    // ========================================================================
    // Statements
    // ========================================================================

    #[test]
    fn callnat_to_unknown_module_keeps_the_node() {
        let output = statements("CALLNAT 'MODULE'");
        assert_eq!(codes(&output), vec!["NPP026"]);
        let nodes = statement_nodes(&output);
        assert_eq!(nodes.len(), 1);
        match output.tree.kind(nodes[0]) {
            NodeKind::ModuleCall { kind, module, .. } => {
                assert_eq!(*kind, ModuleCallKind::Callnat);
                assert!(module.is_none());
            }
            other => panic!("expected CALLNAT, got {other:?}"),
        }
    }

    #[test]
    fn callnat_resolves_through_the_provider() {
        let provider = InMemoryProvider::new().with_module("SUBPROG", FileType::Subprogram, "END\n");
        let output = statements_with("CALLNAT 'SUBPROG' #A #B\n", &provider);
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        let call = statement_nodes(&output)[0];
        assert!(matches!(output.tree.kind(call), NodeKind::ModuleCall { module: Some(_), .. }));
        assert_eq!(output.unresolved.len(), 2);
    }

    #[test]
    fn for_loop_with_single_statement_body() {
        let output = statements("FOR #I := 1 TO 10\nIGNORE\nEND-FOR\n");
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        let nodes = statement_nodes(&output);
        assert_eq!(nodes.len(), 1);
        let NodeKind::ForLoop { body: Some(body), variable: Some(_), .. } = output.tree.kind(nodes[0]) else {
            panic!("expected FOR, got {:?}", output.tree.kind(nodes[0]));
        };
        let body: Vec<NodeId> = output.tree.child_nodes(*body).collect();
        assert_eq!(body.len(), 1);
        assert_eq!(output.tree.kind(body[0]), &NodeKind::Ignore);
    }

    #[test]
    fn if_without_end_if_is_unclosed() {
        let output = statements("IF #A = 1\nIGNORE\n");
        assert_eq!(codes(&output), vec!["NPP030"]);
    }

    #[test]
    fn if_with_empty_body_is_reported() {
        let output = statements("IF #A = 1\nEND-IF\n");
        assert_eq!(codes(&output), vec!["NPP043"]);
    }

    #[test]
    fn if_else_bodies_are_kept_apart() {
        let output = statements("IF #A = 1 THEN\n#B := 1\nELSE\n#B := 2\nIGNORE\nEND-IF\n");
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        let node = statement_nodes(&output)[0];
        let NodeKind::If { body: Some(body), else_body: Some(else_body), .. } = output.tree.kind(node) else {
            panic!("expected IF with ELSE");
        };
        assert_eq!(output.tree.child_nodes(*body).count(), 1);
        assert_eq!(output.tree.child_nodes(*else_body).count(), 2);
    }

    #[test]
    fn decide_on_without_none_is_reported() {
        let output = statements("DECIDE ON FIRST VALUE OF #A\nVALUE 1\nIGNORE\nEND-DECIDE\n");
        assert_eq!(codes(&output), vec!["NPP044"]);
    }

    #[test]
    fn decide_for_collects_branches() {
        let source = "DECIDE FOR FIRST CONDITION\nWHEN #A = 1\nIGNORE\nWHEN #A = 2\nIGNORE\nWHEN NONE\nIGNORE\nEND-DECIDE\n";
        let output = statements(source);
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        let node = statement_nodes(&output)[0];
        let NodeKind::DecideFor { branches, none } = output.tree.kind(node) else {
            panic!("expected DECIDE FOR");
        };
        assert_eq!(branches.len(), 2);
        assert!(none.is_some());
    }

    #[test]
    fn broken_condition_does_not_cascade() {
        let output = statements("IF #A =\nIGNORE\nEND-IF\n");
        assert_eq!(codes(&output), vec!["NPP049"]);
    }

    #[test]
    fn perform_binds_to_later_subroutine() {
        let output = statements("PERFORM SUB\nDEFINE SUBROUTINE SUB\nIGNORE\nEND-SUBROUTINE\n");
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        let nodes = statement_nodes(&output);
        let perform = nodes[0];
        let subroutine = nodes[1];
        assert_eq!(output.tree.reference_target(perform), Some(subroutine));
        let references = output.tree.kind(subroutine).references().expect("subroutine references");
        assert!(references.contains(&perform));
    }

    #[test]
    fn unknown_perform_becomes_external() {
        let output = statements("PERFORM MISSING\n");
        assert_eq!(codes(&output), vec!["NPP026"]);
        let node = statement_nodes(&output)[0];
        assert!(matches!(output.tree.kind(node), NodeKind::ExternalPerform { module: None, .. }));
    }

    #[test]
    fn subroutine_without_terminator_is_unclosed() {
        let output = statements("DEFINE SUBROUTINE SUB\nIGNORE\n");
        assert_eq!(codes(&output), vec!["NPP030"]);
    }

    #[test]
    fn source_after_end_is_reported() {
        let output = program("IGNORE\nEND\nIGNORE\n");
        assert_eq!(codes(&output), vec!["NPP054"]);
    }

    #[test]
    fn missing_end_is_reported_for_programs() {
        let output = program("IGNORE\n");
        assert_eq!(codes(&output), vec!["NPP055"]);
    }

    #[test]
    fn assignments_and_calculations_record_their_targets() {
        let output = statements("#A := #B + 1\nADD 1 TO #C\nDIVIDE 2 INTO #D GIVING #E REMAINDER #F\n");
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        let nodes = statement_nodes(&output);
        assert_eq!(nodes.len(), 3);
        assert!(matches!(
            output.tree.kind(nodes[0]),
            NodeKind::Assignment { kind: AssignmentKind::Bare, target: Some(_), value: Some(_) }
        ));
        let NodeKind::Calculation { target: Some(target), .. } = output.tree.kind(nodes[1]) else {
            panic!("expected ADD");
        };
        assert!(matches!(output.tree.kind(*target), NodeKind::VariableReference { name, .. } if name.text == "#C"));
        assert!(matches!(
            output.tree.kind(nodes[2]),
            NodeKind::Calculation { kind: CalculationKind::Divide, giving: Some(_), remainder: Some(_), .. }
        ));
    }

    #[test]
    fn find_uses_the_first_identifier_as_view() {
        let output = statements("FIND PERS WITH NAME = #NAME\nIGNORE\nEND-FIND\n");
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        let node = statement_nodes(&output)[0];
        let NodeKind::Access { kind: AccessKind::Find, view: Some(view), body: Some(_) } = output.tree.kind(node) else {
            panic!("expected FIND");
        };
        assert!(matches!(output.tree.kind(*view), NodeKind::VariableReference { name, .. } if name.text == "PERS"));
        let names: Vec<String> = output
            .unresolved
            .iter()
            .filter_map(|node| match output.tree.kind(*node) {
                NodeKind::VariableReference { name, .. } => Some(name.symbol_name()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["PERS", "#NAME"]);
    }

    #[test]
    fn write_work_remembers_the_variable_keyword() {
        let output = statements("WRITE WORK FILE 1 VARIABLE #A #B\n");
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        let node = statement_nodes(&output)[0];
        let NodeKind::WriteWork { variable, operands } = output.tree.kind(node) else {
            panic!("expected WRITE WORK");
        };
        assert!(*variable);
        assert_eq!(operands.len(), 2);
    }

    #[test]
    fn function_call_without_arguments() {
        let provider = InMemoryProvider::new().with_module("NOW", FileType::Function, "");
        let output = statements_with("#X := NOW(<>)\nWRITE #X\n", &provider);
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        let nodes = statement_nodes(&output);
        assert_eq!(nodes.len(), 2);
        let NodeKind::Assignment { value: Some(value), .. } = output.tree.kind(nodes[0]) else {
            panic!("expected assignment");
        };
        let NodeKind::FunctionCall { name, module: Some(_), arguments } = output.tree.kind(*value) else {
            panic!("expected function call, got {:?}", output.tree.kind(*value));
        };
        assert_eq!(name.symbol_name(), "NOW");
        assert!(arguments.is_empty());
    }

    #[test]
    fn function_call_without_arguments_as_statement() {
        let provider = InMemoryProvider::new().with_module("NOW", FileType::Function, "");
        let output = statements_with("NOW(<>)\nIGNORE\n", &provider);
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        let nodes = statement_nodes(&output);
        assert_eq!(nodes.len(), 2);
        assert!(matches!(
            output.tree.kind(nodes[0]),
            NodeKind::FunctionCall { arguments, .. } if arguments.is_empty()
        ));
    }

    // ========================================================================
    // INCLUDE
    // ========================================================================

    #[test]
    fn include_parses_the_copycode_in_place() {
        let provider = InMemoryProvider::new().with_module("CC1", FileType::Copycode, "#A := 1\nIGNORE\n");
        let output = statements_with("INCLUDE CC1\n", &provider);
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        let include = statement_nodes(&output)[0];
        let NodeKind::Include { module: Some(_), body: Some(body), .. } = output.tree.kind(include) else {
            panic!("expected resolved INCLUDE");
        };
        assert_eq!(output.tree.child_nodes(*body).count(), 2);
        assert_eq!(output.unresolved.len(), 1);
    }

    #[test]
    fn include_diagnostics_point_at_the_include() {
        let provider = InMemoryProvider::new().with_module("CC1", FileType::Copycode, "CALLNAT 'MISSING'\n");
        let output = statements_with("IGNORE\nINCLUDE CC1\n", &provider);
        assert_eq!(codes(&output), vec!["NPP026"]);
        let diagnostic = &output.diagnostics[0];
        assert_eq!(diagnostic.position.line, 1);
        assert_eq!(&*diagnostic.position.path, Path::new("TEST.NSN"));
        assert_eq!(diagnostic.notes.len(), 1);
    }

    #[test]
    fn missing_copycode_gets_an_empty_body() {
        let output = statements("INCLUDE NOWHERE\n");
        assert_eq!(codes(&output), vec!["NPP026"]);
        let include = statement_nodes(&output)[0];
        let NodeKind::Include { module: None, body: Some(body), .. } = output.tree.kind(include) else {
            panic!("expected unresolved INCLUDE");
        };
        assert_eq!(output.tree.child_nodes(*body).count(), 0);
    }

    #[test]
    fn include_cycle_is_detected() {
        let provider = InMemoryProvider::new().with_module("CC1", FileType::Copycode, "INCLUDE CC1\n");
        let output = statements_with("INCLUDE CC1\n", &provider);
        assert_eq!(codes(&output), vec!["NPP047"]);
    }

    #[test]
    fn include_of_the_root_module_is_a_cycle() {
        let provider = InMemoryProvider::new()
            .with_module("CC1", FileType::Copycode, "INCLUDE TEST\n")
            .with_module("TEST", FileType::Copycode, "INCLUDE CC1\n");
        let tokens = lexer::lex("INCLUDE CC1\n", Path::new("TEST.NSC"));
        let mut parser = Parser::new(tokens, &provider, ParseOptions::default()).with_root_module("TEST");
        parser.parse_body(FileType::Copycode);
        let output = parser.finish();
        assert_eq!(codes(&output), vec!["NPP047"]);
        let includes = output
            .tree
            .descendants(output.body.expect("body"))
            .into_iter()
            .filter(|node| matches!(output.tree.kind(*node), NodeKind::Include { .. }))
            .count();
        assert_eq!(includes, 2);
    }

    #[test]
    fn include_depth_is_bounded() {
        let provider = InMemoryProvider::new()
            .with_module("CC1", FileType::Copycode, "INCLUDE CC2\n")
            .with_module("CC2", FileType::Copycode, "IGNORE\n");
        let tokens = lexer::lex("INCLUDE CC1\n", Path::new("TEST.NSN"));
        let options = ParseOptions {
            max_include_depth: 1,
            ..ParseOptions::default()
        };
        let mut parser = Parser::new(tokens, &provider, options);
        parser.parse_body(FileType::Copycode);
        let output = parser.finish();
        assert_eq!(codes(&output), vec!["NPP047"]);
    }

    // ========================================================================
    // DEFINE DATA
    // ========================================================================

    #[test]
    fn single_typed_variable() {
        let output = data("DEFINE DATA LOCAL\n1 #X (A5)\nEND-DEFINE\n");
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        let x = variable(&output, "#X");
        assert_eq!(x.level, 1);
        assert_eq!(x.scope, VariableScope::Local);
        assert_eq!(x.data_type(), Some(&DataType::fixed(DataFormat::Alphanumeric, 5)));
    }

    #[test]
    fn duplicate_variables_are_reported_once() {
        let output = data("DEFINE DATA LOCAL\n1 #X (A5)\n1 #X (A5)\nEND-DEFINE\n");
        assert_eq!(codes(&output), vec!["NPP027"]);
    }

    #[test]
    fn same_member_name_in_different_groups_is_fine() {
        let source = "DEFINE DATA LOCAL\n1 #G1\n2 #X (A5)\n1 #G2\n2 #X (A5)\nEND-DEFINE\n";
        let output = data(source);
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        let qualified: Vec<&str> = output
            .referencables
            .iter()
            .filter(|node| output.tree.variable(**node).is_some_and(|v| v.name == "#X"))
            .filter_map(|node| output.tree.qualified_name(*node))
            .collect();
        assert_eq!(qualified, vec!["#G1.#X", "#G2.#X"]);
    }

    #[test]
    fn missing_end_define_is_reported() {
        let output = data("DEFINE DATA LOCAL\n1 #X (A5)\n");
        assert_eq!(codes(&output), vec!["NPP002"]);
    }

    #[test]
    fn broken_line_does_not_cascade() {
        let output = data("DEFINE DATA LOCAL\n1 #A (A5\n1 #B (A5)\nEND-DEFINE\n");
        assert_eq!(codes(&output), vec!["NPP003"]);
        assert_eq!(variable(&output, "#B").data_type(), Some(&DataType::fixed(DataFormat::Alphanumeric, 5)));
    }

    #[test]
    fn data_type_rules() {
        let cases = [
            ("1 #A (A)", vec!["NPP005"]),
            ("1 #A (A) DYNAMIC", vec![]),
            ("1 #A (N5) DYNAMIC", vec!["NPP004"]),
            ("1 #A (A10) DYNAMIC", vec!["NPP008"]),
            ("1 #A (I3)", vec!["NPP025"]),
            ("1 #A (N20.8)", vec!["NPP025"]),
            ("1 #A (L)", vec![]),
            ("1 #A (N5) INIT <'X'>", vec!["NPP006"]),
            ("1 #A (A5) INIT <>", vec!["NPP007"]),
            ("1 #A (A5) BY VALUE", vec!["NPP018"]),
            ("1 #A (A5) OPTIONAL", vec!["NPP019"]),
            ("1 #A (A5/5:1)", vec!["NPP009"]),
        ];
        for (line, expected) in cases {
            let output = data(&format!("DEFINE DATA LOCAL\n{line}\nEND-DEFINE\n"));
            assert_eq!(codes(&output), expected, "for {line}");
        }
    }

    #[test]
    fn group_rules() {
        assert_eq!(codes(&data("DEFINE DATA LOCAL\n1 #GRP\nEND-DEFINE\n")), vec!["NPP013"]);
        assert_eq!(
            codes(&data("DEFINE DATA INDEPENDENT\n1 #X (A5)\nEND-DEFINE\n")),
            vec!["NPP011"]
        );
        assert_eq!(
            codes(&data("DEFINE DATA LOCAL\n1 #G\n2 #A (A1) CONST <'A'>\n2 #B (A1)\nEND-DEFINE\n")),
            vec!["NPP046"]
        );
    }

    #[test]
    fn parameter_modifiers_are_fine_in_parameter_scope() {
        let output = data("DEFINE DATA PARAMETER\n1 #P (A5) BY VALUE OPTIONAL\nEND-DEFINE\n");
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        let typed = variable(&output, "#P").typed().expect("typed");
        assert!(typed.by_value);
        assert!(typed.optional);
    }

    #[test]
    fn reserved_keyword_as_name_is_reported_and_retagged() {
        let output = data("DEFINE DATA LOCAL\n1 IF (A5)\nEND-DEFINE\n");
        assert_eq!(codes(&output), vec!["NPP048"]);
        assert_eq!(variable(&output, "IF").declaration.kind, TokenKind::Identifier);
    }

    #[test]
    fn soft_keyword_as_name_is_silent() {
        let output = data("DEFINE DATA LOCAL\n1 RESULT (A5)\nEND-DEFINE\n");
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    }

    #[test]
    fn scope_restricted_by_file_type() {
        let output = data_with("DEFINE DATA PARAMETER\n1 #P (A1)\nEND-DEFINE\n", &EmptyProvider, FileType::Lda);
        assert_eq!(codes(&output), vec!["NPP050"]);
    }

    #[test]
    fn constant_array_bound() {
        let output = data("DEFINE DATA LOCAL\n1 #MAX (I4) CONST <10>\n1 #ARR (A5/1:#MAX)\nEND-DEFINE\n");
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        let arr = variable(&output, "#ARR");
        assert_eq!(arr.dimensions.len(), 1);
        assert_eq!(arr.dimensions[0].occurrences(), Some(10));
    }

    #[test]
    fn non_constant_array_bound_is_reported() {
        let output = data("DEFINE DATA LOCAL\n1 #N (I4)\n1 #ARR (A5/#N)\nEND-DEFINE\n");
        assert_eq!(codes(&output), vec!["NPP017"]);
    }

    #[test]
    fn group_members_inherit_dimensions() {
        let output = data("DEFINE DATA LOCAL\n1 #G (1:3)\n2 #M (A5)\nEND-DEFINE\n");
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        assert_eq!(variable(&output, "#M").dimensions[0].occurrences(), Some(3));
    }

    #[test]
    fn redefinition_longer_than_target() {
        let source = "DEFINE DATA LOCAL\n1 #A (A4)\n1 REDEFINE #A\n2 #B (A3)\n2 #C (A2)\nEND-DEFINE\n";
        assert_eq!(codes(&data(source)), vec!["NPP015"]);
    }

    #[test]
    fn redefinition_with_filler_fits() {
        let source = "DEFINE DATA LOCAL\n1 #A (A4)\n1 REDEFINE #A\n2 FILLER 1X\n2 #B (A3)\nEND-DEFINE\n";
        let output = data(source);
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    }

    #[test]
    fn redefinition_of_array_with_extreme_bounds() {
        let wide = "DEFINE DATA LOCAL\n1 #A (A1/-9223372036854775807:9223372036854775807)\n1 REDEFINE #A\n2 #B (A1)\nEND-DEFINE\n";
        let output = data(wide);
        assert!(!codes(&output).contains(&"NPP015"), "{:?}", output.diagnostics);
        assert_eq!(variable(&output, "#A").dimensions[0].occurrences(), None);

        let many = "DEFINE DATA LOCAL\n1 #M (A1/1:4000000000,1:4000000000)\n1 REDEFINE #M\n2 #B (A1)\nEND-DEFINE\n";
        let output = data(many);
        assert!(!codes(&output).contains(&"NPP015"), "{:?}", output.diagnostics);
    }

    #[test]
    fn redefinition_rules() {
        assert_eq!(
            codes(&data("DEFINE DATA LOCAL\n1 REDEFINE #NOPE\n2 #B (A3)\nEND-DEFINE\n")),
            vec!["NPP014"]
        );
        assert_eq!(
            codes(&data("DEFINE DATA LOCAL\n1 #A (A) DYNAMIC\n1 REDEFINE #A\n2 #B (A3)\nEND-DEFINE\n")),
            vec!["NPP023"]
        );
        assert_eq!(
            codes(&data("DEFINE DATA LOCAL\n1 #A (A1/1:*)\n1 REDEFINE #A\n2 #B (A1)\nEND-DEFINE\n")),
            vec!["NPP022"]
        );
        assert_eq!(
            codes(&data("DEFINE DATA LOCAL\n1 #A (A4)\n1 REDEFINE #A\n2 FILLER 2\nEND-DEFINE\n")),
            vec!["NPP021"]
        );
    }

    #[test]
    fn view_members_take_their_type_from_the_ddm() {
        let ddm = RecordDefinition::parse("PERSON", PERSON_DDM).expect("ddm");
        let provider = InMemoryProvider::new().with_record_definition(ddm);
        let source = "DEFINE DATA LOCAL\n1 PERS VIEW OF PERSON\n2 PERSON-ID\n2 CITY\n2 UNKNOWN-FIELD\nEND-DEFINE\n";
        let output = data_with(source, &provider, FileType::Program);
        assert_eq!(codes(&output), vec!["NPP016"]);
        assert_eq!(
            variable(&output, "PERSON-ID").data_type(),
            Some(&DataType::fixed(DataFormat::Alphanumeric, 8))
        );
        let city = variable(&output, "CITY");
        assert_eq!(city.dimensions[0].occurrences(), Some(199));
    }

    #[test]
    fn view_member_type_must_match_the_ddm() {
        let ddm = RecordDefinition::parse("PERSON", PERSON_DDM).expect("ddm");
        let provider = InMemoryProvider::new().with_record_definition(ddm);
        let source = "DEFINE DATA LOCAL\n1 PERS VIEW OF PERSON\n2 PERSON-ID (A10)\nEND-DEFINE\n";
        let output = data_with(source, &provider, FileType::Program);
        assert_eq!(codes(&output), vec!["NPP037"]);
    }

    #[test]
    fn unknown_ddm_is_unresolved() {
        let output = data("DEFINE DATA LOCAL\n1 PERS VIEW OF PERSON\n2 PERSON-ID\nEND-DEFINE\n");
        assert_eq!(codes(&output), vec!["NPP026"]);
    }

    #[test]
    fn using_imports_data_area_variables() {
        let provider = InMemoryProvider::new().with_module(
            "MYLDA",
            FileType::Lda,
            "DEFINE DATA LOCAL\n1 #SHARED (A5)\nEND-DEFINE\n",
        );
        let source = "DEFINE DATA LOCAL USING MYLDA\nLOCAL\n1 #OWN (N5)\nEND-DEFINE\n";
        let output = data_with(source, &provider, FileType::Program);
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        assert_eq!(variable(&output, "#SHARED").scope, VariableScope::Local);
        assert_eq!(variable(&output, "#OWN").level, 1);
    }

    #[test]
    fn duplicate_using_is_reported() {
        let provider = InMemoryProvider::new().with_module(
            "MYLDA",
            FileType::Lda,
            "DEFINE DATA LOCAL\n1 #SHARED (A5)\nEND-DEFINE\n",
        );
        let source = "DEFINE DATA LOCAL USING MYLDA\nLOCAL USING MYLDA\nEND-DEFINE\n";
        let output = data_with(source, &provider, FileType::Program);
        assert_eq!(codes(&output), vec!["NPP028"]);
    }

    #[test]
    fn function_header_declares_the_return_variable() {
        let source = "DEFINE FUNCTION ADDONE\nRETURNS (I4)\nDEFINE DATA PARAMETER\n1 #A (I4)\nEND-DEFINE\nADDONE := #A + 1\nEND-FUNCTION\n";
        let tokens = lexer::lex(source, Path::new("ADDONE.NS7"));
        let mut parser = Parser::new(tokens, &EmptyProvider, ParseOptions::default());
        let function = parser.parse_function_header().expect("function header");
        assert!(parser.advance_to_define_data());
        parser.parse_define_data(FileType::Function);
        parser.parse_body(FileType::Function);
        let output = parser.finish();
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);

        let NodeKind::DefineFunction { return_variable: Some(ret), .. } = output.tree.kind(function) else {
            panic!("expected function header");
        };
        let ret = output.tree.variable(*ret).expect("return variable");
        assert_eq!(ret.name, "ADDONE");
        assert_eq!(ret.data_type(), Some(&DataType::fixed(DataFormat::Integer, 4)));
    }
}
