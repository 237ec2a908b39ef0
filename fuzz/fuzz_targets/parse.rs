#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use natfront::frontend::module::ModuleParser;
use natfront::frontend::provider::EmptyProvider;
use natfront_core::lang::file_types::FileType;

fuzz_target!(|data: &[u8]| {
    // The first byte picks the file type, the rest is the source (ignore invalid UTF-8)
    let Some((selector, rest)) = data.split_first() else {
        return;
    };
    let file_type = FileType::ALL[*selector as usize % FileType::ALL.len()];
    if let Ok(source) = std::str::from_utf8(rest) {
        let path = format!("FUZZ.{}", file_type.extension());
        // Lex, parse, resolve and type check; nothing may panic
        let module = ModuleParser::new(&EmptyProvider).parse(Path::new(&path), file_type, source);
        for token in module.tokens.all_tokens() {
            assert!(token.offset + token.length <= source.len());
        }
    }
});
