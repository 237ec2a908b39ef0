//! Integration tests for the Natural front end
//!
//! Every test goes through [`ModuleParser`], so lexing, parsing, reference resolution and type checking all run.

use std::fs;
use std::path::Path;

use natfront::frontend::ast::NodeKind;
use natfront::frontend::diagnostics::Diagnostic;
use natfront::frontend::lexer::{self, TokenKind};
use natfront::frontend::module::{ModuleParser, NaturalModule, Stage};
use natfront::frontend::provider::{EmptyProvider, InMemoryProvider, ModuleProvider};
use natfront::frontend::record_definition::RecordDefinition;
use natfront::LibraryProvider;
use natfront_core::lang::file_types::FileType;
use natfront_core::types::{DataFormat, DataType};

const PERSON_DDM: &str = "\
T L DB Name                             F Leng  S D Remark
- - -- -------------------------------- - ----  - - ------------------------
  1 AA PERSON-ID                        A    8  N D
  1 AB NAME                             A   20  N D
M 1 AD CITY                             A   20  N
";

fn parse_with(file_name: &str, source: &str, provider: &dyn ModuleProvider) -> NaturalModule {
    ModuleParser::new(provider)
        .parse_file(Path::new(file_name), source)
        .expect("known file type")
}

fn parse(source: &str) -> NaturalModule {
    parse_with("TEST.NSP", source, &EmptyProvider)
}

fn with_person() -> InMemoryProvider {
    InMemoryProvider::new().with_record_definition(RecordDefinition::parse("PERSON", PERSON_DDM).expect("ddm"))
}

fn codes(module: &NaturalModule) -> Vec<&'static str> {
    module.diagnostics.iter().map(Diagnostic::code).collect()
}

fn statements(module: &NaturalModule) -> Vec<NodeKind> {
    let body = module.body.expect("body");
    module.tree.child_nodes(body).map(|node| module.tree.kind(node).clone()).collect()
}

/// The declaration a reference named `name` in the body is bound to.
fn binding_of(module: &NaturalModule, name: &str) -> Option<String> {
    let body = module.body.expect("body");
    module.tree.descendants(body).into_iter().find_map(|node| match module.tree.kind(node) {
        NodeKind::VariableReference { name: token, reference, .. } if token.symbol_name() == name => {
            reference.and_then(|target| module.tree.qualified_name(target).map(str::to_string))
        }
        _ => None,
    })
}

// ============================================================================
// Fixtures
// ============================================================================

/// Every fixture in tests/fixtures/valid checks without diagnostics.
#[test]
fn test_valid_fixtures() {
    let library = LibraryProvider::open(Path::new("tests/fixtures/library")).expect("library");
    let fixtures_dir = Path::new("tests/fixtures/valid");
    for path in natfront::frontend::workspace::natural_files(fixtures_dir).expect("fixtures") {
        let source = fs::read_to_string(&path).unwrap();
        let module = parse_with(&path.to_string_lossy(), &source, &library);
        assert!(
            module.diagnostics.is_empty(),
            "{} should check cleanly: {:?}",
            path.display(),
            module.diagnostics
        );
    }
}

/// Every fixture in tests/fixtures/invalid names the diagnostic it expects in its first line.
#[test]
fn test_invalid_fixtures() {
    let library = LibraryProvider::open(Path::new("tests/fixtures/library")).expect("library");
    let fixtures_dir = Path::new("tests/fixtures/invalid");
    for path in natfront::frontend::workspace::natural_files(fixtures_dir).expect("fixtures") {
        let source = fs::read_to_string(&path).unwrap();
        let expected = source
            .lines()
            .next()
            .and_then(|line| line.strip_prefix("* EXPECT "))
            .unwrap_or_else(|| panic!("{} has no EXPECT line", path.display()))
            .trim();
        let module = parse_with(&path.to_string_lossy(), &source, &library);
        assert!(
            codes(&module).contains(&expected),
            "{} should report {expected}: {:?}",
            path.display(),
            module.diagnostics
        );
    }
}

// ============================================================================
// Module scenarios
// ============================================================================

mod scenarios {
    use super::*;

    #[test]
    fn single_declaration() {
        let module = parse("DEFINE DATA LOCAL\n1 #X (A5)\nEND-DEFINE\nEND\n");
        assert!(module.diagnostics.is_empty(), "{:?}", module.diagnostics);
        let variables: Vec<_> = module.variables().collect();
        assert_eq!(variables.len(), 1);
        assert_eq!(variables[0].1.name, "#X");
        assert_eq!(
            variables[0].1.data_type(),
            Some(&DataType::fixed(DataFormat::Alphanumeric, 5))
        );
        assert_eq!(module.stage(), Stage::Done);
    }

    #[test]
    fn duplicated_symbol() {
        let module = parse("DEFINE DATA LOCAL\n1 #X (A5)\n1 #X (A5)\nEND-DEFINE\nEND\n");
        assert_eq!(codes(&module), vec!["NPP027"]);
    }

    #[test]
    fn identifiers_on_two_lines() {
        let tokens = lexer::lex("abc\nabc", Path::new("TEST.NSP"));
        let tokens = tokens.all_tokens();
        assert_eq!(tokens.len(), 2);
        assert!(tokens.iter().all(|token| token.kind == TokenKind::Identifier));
        assert_eq!((tokens[0].line, tokens[0].column, tokens[0].offset), (0, 0, 0));
        assert_eq!((tokens[1].line, tokens[1].column, tokens[1].offset), (1, 0, 4));
    }

    #[test]
    fn callnat_to_unknown_module() {
        let module = parse_with("TEST.NSN", "CALLNAT 'MODULE'\nEND\n", &EmptyProvider);
        assert_eq!(codes(&module), vec!["NPP026"]);
        let nodes = statements(&module);
        assert!(matches!(nodes[0], NodeKind::ModuleCall { module: None, .. }));
        assert!(matches!(nodes[1], NodeKind::End));
    }

    #[test]
    fn for_loop_with_one_statement() {
        let module = parse("DEFINE DATA LOCAL\n1 #I (I4)\nEND-DEFINE\nFOR #I := 1 TO 10\nIGNORE\nEND-FOR\nEND\n");
        assert!(module.diagnostics.is_empty(), "{:?}", module.diagnostics);
        let nodes = statements(&module);
        let NodeKind::ForLoop { body: Some(body), .. } = &nodes[0] else {
            panic!("expected FOR");
        };
        assert_eq!(module.tree.child_nodes(*body).count(), 1);
        assert_eq!(binding_of(&module, "#I").as_deref(), Some("#I"));
    }

    #[test]
    fn reporting_mode_is_only_lexed() {
        let source = "* >Natural Source Header 000000\n* :Mode R\n* <Natural Source Header\nMOVE 1 TO #NOWHERE\nEND\n";
        let module = parse(source);
        assert_eq!(codes(&module), vec!["NPP040"]);
        assert!(module.body.is_none());
        assert!(!module.tokens.is_empty());
    }

    #[test]
    fn data_area_without_define_data() {
        let module = parse_with("MYLDA.NSL", "", &EmptyProvider);
        assert_eq!(codes(&module), vec!["NPP001"]);
    }

    #[test]
    fn record_definition_is_not_parsed() {
        let module = parse_with("PERSON.NSD", PERSON_DDM, &EmptyProvider);
        assert_eq!(module.stage(), Stage::Done);
        assert!(module.define_data.is_none() && module.body.is_none());
    }

    #[test]
    fn unknown_extension_is_an_error() {
        let result = ModuleParser::new(&EmptyProvider).parse_file(Path::new("README.md"), "");
        assert!(result.is_err());
    }

    #[test]
    fn find_variable_by_qualified_name() {
        let module = parse("DEFINE DATA LOCAL\n1 #G\n2 #A (A5)\nEND-DEFINE\nEND\n");
        let (_, by_name) = module.find_variable("#a").expect("by name");
        let (_, by_qualified) = module.find_variable("#G.#A").expect("by qualified name");
        assert_eq!(by_name.name, by_qualified.name);
    }
}

// ============================================================================
// Reference resolution
// ============================================================================

mod resolution {
    use super::*;

    #[test]
    fn unresolved_reference_points_at_the_reference() {
        let module = parse("DEFINE DATA LOCAL\nEND-DEFINE\nMOVE 1 TO #NOWHERE\nEND\n");
        assert_eq!(codes(&module), vec!["NPP016"]);
        let diagnostic = &module.diagnostics[0];
        assert_eq!(diagnostic.message, "Unresolved reference: #NOWHERE");
        assert_eq!((diagnostic.position.line, diagnostic.position.column), (2, 10));
    }

    #[test]
    fn references_are_case_insensitive() {
        let module = parse("DEFINE DATA LOCAL\n1 #Count (N5)\nEND-DEFINE\nADD 1 TO #COUNT\nEND\n");
        assert!(module.diagnostics.is_empty(), "{:?}", module.diagnostics);
        assert_eq!(binding_of(&module, "#COUNT").as_deref(), Some("#COUNT"));
    }

    #[test]
    fn same_member_in_two_groups_is_ambiguous() {
        let source = "DEFINE DATA LOCAL\n1 #G1\n2 #X (A5)\n1 #G2\n2 #X (A5)\nEND-DEFINE\nMOVE 'A' TO #X\nEND\n";
        let module = parse(source);
        assert_eq!(codes(&module), vec!["NPP029"]);
        assert_eq!(module.diagnostics[0].notes, vec!["Candidates: #G1.#X, #G2.#X".to_string()]);
        assert_eq!(binding_of(&module, "#X"), None);
    }

    #[test]
    fn qualification_disambiguates() {
        let source = "DEFINE DATA LOCAL\n1 #G1\n2 #X (A5)\n1 #G2\n2 #X (A5)\nEND-DEFINE\nMOVE 'A' TO #G2.#X\nEND\n";
        let module = parse(source);
        assert!(module.diagnostics.is_empty(), "{:?}", module.diagnostics);
        assert_eq!(binding_of(&module, "#G2.#X").as_deref(), Some("#G2.#X"));
    }

    #[test]
    fn deep_member_qualified_by_its_top_group() {
        let source = "DEFINE DATA LOCAL\n1 #TOP\n2 #MID\n3 #LEAF (A5)\nEND-DEFINE\nMOVE 'A' TO #TOP.#LEAF\nEND\n";
        let module = parse(source);
        assert!(module.diagnostics.is_empty(), "{:?}", module.diagnostics);
        assert_eq!(binding_of(&module, "#TOP.#LEAF").as_deref(), Some("#TOP.#LEAF"));
    }

    #[test]
    fn enclosing_find_picks_the_view() {
        let declarations = "1 PERS1 VIEW OF PERSON\n2 PERSON-ID\n1 PERS2 VIEW OF PERSON\n2 PERSON-ID\n";
        let statements = "FIND PERS2 WITH PERSON-ID = 'X'\nWRITE PERSON-ID\nEND-FIND\n";
        let source = format!("DEFINE DATA LOCAL\n{declarations}END-DEFINE\n{statements}END\n");
        let module = parse_with("TEST.NSP", &source, &with_person());
        assert!(module.diagnostics.is_empty(), "{:?}", module.diagnostics);
        assert_eq!(binding_of(&module, "PERSON-ID").as_deref(), Some("PERS2.PERSON-ID"));
    }

    #[test]
    fn view_members_outside_access_stay_ambiguous() {
        let declarations = "1 PERS1 VIEW OF PERSON\n2 PERSON-ID\n1 PERS2 VIEW OF PERSON\n2 PERSON-ID\n";
        let source = format!("DEFINE DATA LOCAL\n{declarations}END-DEFINE\nWRITE PERSON-ID\nEND\n");
        let module = parse_with("TEST.NSP", &source, &with_person());
        assert_eq!(codes(&module), vec!["NPP029"]);
    }

    #[test]
    fn undeclared_ddm_fields_are_accepted() {
        let declarations = "1 PERS VIEW OF PERSON\n2 PERSON-ID\n";
        let statements = "FIND PERS WITH NAME = 'SMITH'\nIGNORE\nEND-FIND\n";
        let source = format!("DEFINE DATA LOCAL\n{declarations}END-DEFINE\n{statements}END\n");
        let module = parse_with("TEST.NSP", &source, &with_person());
        assert!(module.diagnostics.is_empty(), "{:?}", module.diagnostics);
    }

    #[test]
    fn historic_prefixes() {
        let declarations = "1 PERS VIEW OF PERSON\n2 CITY\n1 #COUNTER (N5)\n1 #N (N5)\n";
        let statements = "ADD 1 TO +#COUNTER\n#N := C*CITY\n";
        let source = format!("DEFINE DATA LOCAL\n{declarations}END-DEFINE\n{statements}END\n");
        let module = parse_with("TEST.NSP", &source, &with_person());
        assert!(module.diagnostics.is_empty(), "{:?}", module.diagnostics);
        assert_eq!(binding_of(&module, "+#COUNTER").as_deref(), Some("#COUNTER"));
        assert_eq!(binding_of(&module, "C*CITY").as_deref(), Some("PERS.CITY"));
    }

    #[test]
    fn copycode_parameters_are_not_references() {
        let module = parse("DEFINE DATA LOCAL\n1 #A (A5)\nEND-DEFINE\nMOVE &1& TO #A\nEND\n");
        assert!(module.diagnostics.is_empty(), "{:?}", module.diagnostics);
    }

    #[test]
    fn function_refers_to_its_own_name() {
        let source = "DEFINE FUNCTION ADDONE\nRETURNS (I4)\nDEFINE DATA PARAMETER\n1 #A (I4)\nEND-DEFINE\nADDONE := #A + 1\nEND-FUNCTION\n";
        let module = parse_with("ADDONE.NS7", source, &EmptyProvider);
        assert!(module.diagnostics.is_empty(), "{:?}", module.diagnostics);
        assert!(module.function.is_some());
    }

    #[test]
    fn copycode_references_resolve_in_the_including_module() {
        let provider = InMemoryProvider::new().with_module("CC1", FileType::Copycode, "MOVE 1 TO #A\n");
        let source = "DEFINE DATA LOCAL\n1 #A (N5)\nEND-DEFINE\nINCLUDE CC1\nEND\n";
        let module = parse_with("TEST.NSP", source, &provider);
        assert!(module.diagnostics.is_empty(), "{:?}", module.diagnostics);
        assert_eq!(binding_of(&module, "#A").as_deref(), Some("#A"));
    }

    #[test]
    fn unresolved_reference_in_copycode_points_at_the_include() {
        let provider = InMemoryProvider::new().with_module("CC1", FileType::Copycode, "MOVE 1 TO #MISSING\n");
        let source = "DEFINE DATA LOCAL\nEND-DEFINE\nINCLUDE CC1\nEND\n";
        let module = parse_with("TEST.NSP", source, &provider);
        assert_eq!(codes(&module), vec!["NPP016"]);
        let diagnostic = &module.diagnostics[0];
        assert_eq!(diagnostic.position.line, 2);
        assert_eq!(&*diagnostic.position.path, Path::new("TEST.NSP"));
        assert!(diagnostic.notes[0].starts_with("raised in included source at"));
    }

    #[test]
    fn copycode_including_itself_is_stopped_at_once() {
        let provider = InMemoryProvider::new().with_module("CC1", FileType::Copycode, "INCLUDE CC1\n");
        let module = parse_with("CC1.NSC", "INCLUDE CC1\n", &provider);
        assert_eq!(codes(&module), vec!["NPP047"]);
        let body = module.body.expect("body");
        let includes = module
            .tree
            .descendants(body)
            .into_iter()
            .filter(|node| matches!(module.tree.kind(*node), NodeKind::Include { .. }))
            .count();
        assert_eq!(includes, 1);
        assert_eq!(module.diagnostics[0].position.line, 0);
    }

    #[test]
    fn copycode_on_its_own_does_not_report_unresolved() {
        let module = parse_with("CC1.NSC", "MOVE 1 TO #DECLARED-ELSEWHERE\nCALLNAT 'ELSEWHERE'\n", &EmptyProvider);
        assert!(module.diagnostics.is_empty(), "{:?}", module.diagnostics);
    }

    #[test]
    fn data_area_variables_are_visible() {
        let provider = InMemoryProvider::new().with_module(
            "MYLDA",
            FileType::Lda,
            "DEFINE DATA LOCAL\n1 #SHARED (A5)\nEND-DEFINE\n",
        );
        let source = "DEFINE DATA LOCAL USING MYLDA\nEND-DEFINE\nMOVE 'X' TO #SHARED\nEND\n";
        let module = parse_with("TEST.NSP", source, &provider);
        assert!(module.diagnostics.is_empty(), "{:?}", module.diagnostics);
        assert_eq!(binding_of(&module, "#SHARED").as_deref(), Some("#SHARED"));
    }
}
