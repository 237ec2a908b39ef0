// ============================================================================
// Public API
// ============================================================================

/// Parse a source that consists of statements only, such as a copycode.
///
/// No `END` is required and no `DEFINE DATA` is looked for.
#[tracing::instrument(skip_all, fields(tokens = tokens.len()))]
pub fn parse_statements(tokens: TokenList, provider: &dyn ModuleProvider) -> ParseOutput {
    let mut parser = Parser::new(tokens, provider, ParseOptions::default());
    parser.parse_body(FileType::Copycode);
    parser.finish()
}

/// Parse only the `DEFINE DATA` block of a source.
///
/// ## Returns
/// - A [`ParseOutput`] whose `define_data` is `None` if the source has no `DEFINE DATA`.
#[tracing::instrument(skip_all, fields(tokens = tokens.len(), file_type = ?file_type))]
pub fn parse_define_data(tokens: TokenList, provider: &dyn ModuleProvider, file_type: FileType) -> ParseOutput {
    let mut parser = Parser::new(tokens, provider, ParseOptions::default());
    if parser.advance_to_define_data() {
        parser.parse_define_data(file_type);
    }
    parser.finish()
}
