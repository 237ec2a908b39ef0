/// Token-stream helpers, reporting and error recovery.
///
/// This chunk contains the low-level primitives used throughout parsing:
/// - Peeking at the cursor (`check_*`) without consuming anything
/// - Consuming tokens into the tree (`bump`, `match_*`, `expect_*`)
/// - Reporting diagnostics, relocated for included copycodes
/// - Line-based recovery (`skip_line`)
///
/// Every consumed token is attached as a leaf to the node passed in as `parent`.
impl<'p> Parser<'p> {
    // ========================================================================
    // Peeking
    // ========================================================================

    fn current(&self) -> Option<&Token> {
        self.tokens.current()
    }

    fn peek_kind(&self, offset: usize) -> Option<TokenKind> {
        self.tokens.peek_kind(offset)
    }

    fn is_at_end(&self) -> bool {
        self.tokens.is_at_end()
    }

    fn check_kind(&self, kind: TokenKind) -> bool {
        self.peek_kind(0) == Some(kind)
    }

    fn check_keyword(&self, id: KeywordId) -> bool {
        self.check_keyword_at(0, id)
    }

    fn check_keyword_at(&self, offset: usize, id: KeywordId) -> bool {
        self.peek_kind(offset).is_some_and(|kind| kind.is_keyword(id))
    }

    fn check_punct(&self, id: PunctuationId) -> bool {
        self.check_punct_at(0, id)
    }

    fn check_punct_at(&self, offset: usize, id: PunctuationId) -> bool {
        self.peek_kind(offset).is_some_and(|kind| kind.is_punctuation(id))
    }

    fn check_op(&self, id: OperatorId) -> bool {
        self.check_op_at(0, id)
    }

    fn check_op_at(&self, offset: usize, id: OperatorId) -> bool {
        self.peek_kind(offset).is_some_and(|kind| kind.is_operator(id))
    }

    /// `NAME(<` or `NAME(<>` starts a function call; `<>` is an empty argument list.
    fn is_function_call(&self) -> bool {
        self.check_punct_at(1, PunctuationId::LParen)
            && (self.check_op_at(2, OperatorId::Less) || self.check_op_at(2, OperatorId::NotEqual))
    }

    /// The comparison operator under the cursor, spelled as a symbol or as a keyword (`EQ`, `EQUAL`, ...).
    fn check_comparison(&self) -> Option<OperatorId> {
        match self.peek_kind(0)? {
            TokenKind::Operator(id) if operators::is_comparison(id) => Some(id),
            TokenKind::Keyword(id) => operators::relational_keyword(id),
            _ => None,
        }
    }

    /// Return `true` if the current token starts a new source line.
    fn is_on_new_line(&self) -> bool {
        let offset = self.tokens.offset();
        match (self.tokens.all_tokens().get(offset.wrapping_sub(1)), self.current()) {
            (Some(previous), Some(current)) => current.line != previous.line || current.path != previous.path,
            _ => true,
        }
    }

    /// Return `true` if the token `offset` positions ahead is on the same line as the current token.
    fn is_same_line_at(&self, offset: usize) -> bool {
        match (self.current(), self.tokens.peek(offset)) {
            (Some(current), Some(ahead)) => current.line == ahead.line && current.path == ahead.path,
            _ => false,
        }
    }

    /// Return `true` if `(` at `offset` opens an attribute list such as `(AD=O)` or `(EM=99)`.
    fn is_attribute_list_at(&self, offset: usize) -> bool {
        if !self.check_punct_at(offset, PunctuationId::LParen) {
            return false;
        }
        match self.peek_kind(offset + 1) {
            Some(TokenKind::EditMask | TokenKind::AttributeDefinition | TokenKind::ColorDefinition) => true,
            Some(TokenKind::Identifier) => self.check_op_at(offset + 2, OperatorId::Equals),
            _ => false,
        }
    }

    // ========================================================================
    // Consuming
    // ========================================================================

    /// Consume the current token and attach it to `parent`.
    fn bump(&mut self, parent: NodeId) -> Option<Token> {
        let token = self.tokens.advance()?.clone();
        self.tree.add_token(parent, token.clone());
        Some(token)
    }

    /// Consume the current token, attaching it as `kind` instead of its lexed kind.
    fn bump_as(&mut self, parent: NodeId, kind: TokenKind) -> Option<Token> {
        let token = self.tokens.advance()?.with_kind(kind);
        self.tree.add_token(parent, token.clone());
        Some(token)
    }

    fn match_keyword(&mut self, parent: NodeId, id: KeywordId) -> bool {
        if self.check_keyword(id) {
            self.bump(parent);
            true
        } else {
            false
        }
    }

    fn match_punct(&mut self, parent: NodeId, id: PunctuationId) -> bool {
        if self.check_punct(id) {
            self.bump(parent);
            true
        } else {
            false
        }
    }

    fn match_op(&mut self, parent: NodeId, id: OperatorId) -> bool {
        if self.check_op(id) {
            self.bump(parent);
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, parent: NodeId, id: KeywordId) -> PResult<Token> {
        self.expect_kind(parent, TokenKind::Keyword(id))
    }

    fn expect_punct(&mut self, parent: NodeId, id: PunctuationId) -> PResult<Token> {
        self.expect_kind(parent, TokenKind::Punctuation(id))
    }

    /// Consume a token of exactly `kind` or raise NPP003.
    fn expect_kind(&mut self, parent: NodeId, kind: TokenKind) -> PResult<Token> {
        if self.check_kind(kind) {
            if let Some(token) = self.bump(parent) {
                return Ok(token);
            }
        }
        Err(self.error_expected(&kind.describe()))
    }

    /// Consume one of `kinds` or raise NPP003.
    fn expect_any(&mut self, parent: NodeId, kinds: &[TokenKind]) -> PResult<Token> {
        if self.tokens.peek_kinds(kinds) {
            if let Some(token) = self.bump(parent) {
                return Ok(token);
            }
        }
        let expected: Vec<String> = kinds.iter().map(|kind| kind.describe()).collect();
        Err(self.error_expected(&expected.join(" or ")))
    }

    /// Consume an identifier.
    ///
    /// Keywords that may double as names (`RESULT`, `VALUE`, ...) are re-tagged as identifiers silently. Reserved
    /// keywords are re-tagged too, but raise NPP048. Any other token raises NPP048 and fails.
    fn expect_identifier(&mut self, parent: NodeId) -> PResult<Token> {
        let Some(token) = self.current().cloned() else {
            return Err(self.error_at_end("identifier"));
        };
        match token.kind {
            TokenKind::Identifier => {}
            TokenKind::Keyword(id) if keywords::can_be_identifier(id) => {}
            TokenKind::Keyword(_) => {
                self.report(errors::expected_identifier(&token.text, token.position()));
            }
            _ => {
                self.report(errors::expected_identifier(&token.text, token.position()));
                return Err(ParseError { token: Some(token) });
            }
        }
        self.bump_as(parent, TokenKind::Identifier)
            .ok_or_else(|| ParseError { token: Some(token) })
    }

    // ========================================================================
    // Reporting
    // ========================================================================

    /// Record a diagnostic, moving it to the including statement when parsing a copycode.
    fn report(&mut self, diagnostic: Diagnostic) {
        let diagnostic = match &self.relocation {
            Some(position) => diagnostic.relocate(position),
            None => diagnostic,
        };
        self.diagnostics.push(diagnostic);
    }

    /// Report NPP003 for the current token (or the end of input) and build the matching error.
    fn error_expected(&mut self, expected: &str) -> ParseError {
        let Some(token) = self.current().cloned() else {
            return self.error_at_end(expected);
        };
        self.report(errors::unexpected_token(expected, &token.text, token.position()));
        ParseError { token: Some(token) }
    }

    fn error_at_end(&mut self, expected: &str) -> ParseError {
        let position = self.end_position();
        self.report(errors::unexpected_end_of_input(expected, position));
        ParseError { token: None }
    }

    /// Position of the current token, or of the last token when the input is exhausted.
    fn current_position(&self) -> Position {
        self.current().map(Token::position).unwrap_or_else(|| self.end_position())
    }

    fn end_position(&self) -> Position {
        match self.tokens.all_tokens().last() {
            Some(token) => token.position(),
            None => Position {
                path: std::sync::Arc::from(self.tokens.path()),
                offset: 0,
                line: 0,
                column: 0,
                length: 0,
            },
        }
    }

    /// Position of a node for diagnostics raised by the parser itself.
    fn node_position(&self, node: NodeId) -> Position {
        self.tree.position(node).unwrap_or_else(|| self.current_position())
    }

    // ========================================================================
    // Recovery
    // ========================================================================

    /// Skip the rest of the current line.
    fn skip_line(&mut self) {
        let Some(line) = self.current().map(|token| token.line) else {
            return;
        };
        while self.current().is_some_and(|token| token.line == line) {
            self.tokens.advance();
        }
    }

    /// Skip everything up to the next line without consuming `stop`.
    fn skip_line_before(&mut self, stop: KeywordId) {
        let Some(line) = self.current().map(|token| token.line) else {
            return;
        };
        while self.current().is_some_and(|token| token.line == line && !token.is_keyword(stop)) {
            self.tokens.advance();
        }
    }

    /// Consume the rest of the current line into `parent`.
    fn bump_rest_of_line(&mut self, parent: NodeId) {
        while !self.is_at_end() && !self.is_on_new_line() {
            self.bump(parent);
        }
    }

    /// Consume a balanced `( ... )` group into `parent`, returning `false` if it was not closed.
    fn bump_parenthesized(&mut self, parent: NodeId) -> bool {
        let mut depth = 0usize;
        while let Some(kind) = self.peek_kind(0) {
            self.bump(parent);
            if kind.is_punctuation(PunctuationId::LParen) {
                depth += 1;
            } else if kind.is_punctuation(PunctuationId::RParen) {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return true;
                }
            }
        }
        false
    }

    // ========================================================================
    // Module lookup
    // ========================================================================

    /// Ask the provider for `name`, reporting NPP026 when it does not know the module.
    ///
    /// User exits (`USR...N`) ship with the runtime and are never reported.
    fn sideload_module(&mut self, token: &Token, name: &str) -> Option<ModuleRef> {
        let module = self.provider.find_module(name);
        if module.is_none() && !is_user_exit(name) {
            self.report(errors::unresolved_module(name, token.position()));
        }
        module
    }
}

/// Return `true` for the runtime's user exits (`USR1234N`).
fn is_user_exit(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    upper.len() > 4 && upper.starts_with("USR") && upper.ends_with('N')
}
