use std::collections::HashMap;

use natfront_core::lang::errors::{self, DiagnosticComponent};
use natfront_core::lang::file_types::FileType;
use natfront_core::lang::keywords;
use natfront_core::lang::operators;
use natfront_core::lang::punctuation;
use natfront_core::lang::system;

#[test]
fn keyword_table_is_ordered_like_the_enum() {
    for (index, info) in keywords::KEYWORDS.iter().enumerate() {
        assert_eq!(info.id as usize, index, "keyword table out of order at {:?}", info.id);
    }
}

#[test]
fn keywords_spellings_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, keywords::KeywordId> = HashMap::new();

    for info in keywords::KEYWORDS {
        assert_eq!(
            keywords::from_str(info.canonical),
            Some(info.id),
            "keyword canonical spelling not resolvable: {}",
            info.canonical
        );
        assert_eq!(
            keywords::from_str(&info.canonical.to_lowercase()),
            Some(info.id),
            "keyword lookup is case-sensitive for {}",
            info.canonical
        );
        assert_eq!(keywords::as_str(info.id), info.canonical);

        if let Some(prev) = seen.insert(info.canonical, info.id) {
            panic!(
                "duplicate keyword spelling {:?}: {:?} and {:?}",
                info.canonical, prev, info.id
            );
        }
    }
}

#[test]
fn block_terminators_are_reserved() {
    for info in keywords::KEYWORDS {
        if info.canonical.starts_with("END-") {
            assert!(info.reserved, "{} must be reserved", info.canonical);
        }
    }
}

#[test]
fn system_table_is_ordered_and_resolvable() {
    let mut seen: HashMap<&'static str, system::SystemId> = HashMap::new();

    for (index, info) in system::SYSTEM_NAMES.iter().enumerate() {
        assert_eq!(info.id as usize, index, "system table out of order at {:?}", info.id);
        assert_eq!(system::from_str(info.name), Some(info.id));
        assert_eq!(
            system::longest_match(info.name),
            Some((info.id, info.name.len())),
            "longest match does not find {}",
            info.name
        );
        if let Some(prev) = seen.insert(info.name, info.id) {
            panic!("duplicate system name {:?}: {:?} and {:?}", info.name, prev, info.id);
        }
    }
}

#[test]
fn operators_and_punctuation_are_ordered_and_resolvable() {
    for (index, info) in operators::OPERATORS.iter().enumerate() {
        assert_eq!(info.id as usize, index);
        assert_eq!(operators::from_str(info.canonical), Some(info.id));
        for alias in info.aliases {
            assert_eq!(operators::from_str(alias), Some(info.id));
        }
    }
    for (index, info) in punctuation::PUNCTUATION.iter().enumerate() {
        assert_eq!(info.id as usize, index);
        assert_eq!(punctuation::from_str(info.canonical), Some(info.id));
    }
}

#[test]
fn diagnostic_codes_are_unique_and_prefixed_by_component() {
    let mut seen: HashMap<&'static str, errors::DiagnosticId> = HashMap::new();

    for (index, info) in errors::DIAGNOSTICS.iter().enumerate() {
        assert_eq!(info.id as usize, index, "diagnostic table out of order at {:?}", info.id);
        assert_eq!(errors::from_code(info.code), Some(info.id));

        let prefix = match info.component {
            DiagnosticComponent::Lexer => "NPL",
            DiagnosticComponent::Parser => "NPP",
        };
        assert!(info.code.starts_with(prefix), "{} has the wrong prefix", info.code);
        assert_eq!(info.code.len(), 6);

        if let Some(prev) = seen.insert(info.code, info.id) {
            panic!("duplicate diagnostic code {:?}: {:?} and {:?}", info.code, prev, info.id);
        }
    }
}

#[test]
fn file_type_extensions_round_trip() {
    for file_type in FileType::ALL {
        assert_eq!(FileType::from_extension(file_type.extension()), Some(file_type));
        assert_eq!(
            FileType::from_extension(&file_type.extension().to_lowercase()),
            Some(file_type)
        );
    }
    assert_eq!(FileType::from_extension("txt"), None);
}
