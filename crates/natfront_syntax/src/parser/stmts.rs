/// Statement parsing.
///
/// The statement grammar is permissive: statements the front end does not model become [`NodeKind::Simple`]
/// nodes, tokens that start nothing are attached to the surrounding list, and bare identifiers become variable
/// references so they still take part in resolution. Block statements collect their body with
/// [`Parser::statement_list`] and report NPP030 when the closing keyword is missing.
impl<'p> Parser<'p> {
    /// Parse the executable part of a module, up to and including `END`.
    #[tracing::instrument(skip_all, fields(file_type = ?file_type))]
    pub fn parse_body(&mut self, file_type: FileType) -> NodeId {
        let body = self.tree.alloc(NodeKind::StatementList, None);
        self.body = Some(body);

        let mut ended = false;
        while !self.is_at_end() {
            if self.check_keyword(KeywordId::End) || self.check_keyword(KeywordId::EndFunction) {
                let end = self.tree.alloc(NodeKind::End, Some(body));
                self.bump(end);
                ended = true;
                if let Some(trailing) = self.current().map(Token::position) {
                    self.report(errors::source_after_end(trailing));
                }
                break;
            }
            self.statement_item(body, &[]);
        }

        if !ended && file_type.requires_end_statement() && self.tree.child_nodes(body).next().is_some() {
            let position = self.end_position();
            self.report(errors::end_statement_missing(position));
        }
        body
    }

    /// Parse statements below `parent` until one of `terminators` (not consumed) or the end of input.
    ///
    /// Nested lists also stop at `END`, so a missing block terminator does not swallow the module end.
    fn statement_list(&mut self, parent: NodeId, terminators: &[KeywordId]) -> NodeId {
        let list = self.tree.alloc(NodeKind::StatementList, Some(parent));
        while !self.is_at_end() {
            if terminators.iter().any(|terminator| self.check_keyword(*terminator)) {
                break;
            }
            if !terminators.is_empty() && (self.check_keyword(KeywordId::End) || self.check_keyword(KeywordId::EndFunction))
            {
                break;
            }
            self.statement_item(list, terminators);
        }
        list
    }

    /// Parse one statement, recovering to the next line on error.
    fn statement_item(&mut self, list: NodeId, terminators: &[KeywordId]) {
        let start = self.tokens.offset();
        if let Err(error) = self.statement(list) {
            tracing::trace!(?error, "recovering from malformed statement");
            if !self.is_on_new_line() {
                self.skip_line_before_any(terminators);
            }
            if self.tokens.offset() == start {
                self.tokens.advance();
            }
        }
    }

    fn skip_line_before_any(&mut self, terminators: &[KeywordId]) {
        let Some(line) = self.current().map(|token| token.line) else {
            return;
        };
        while self
            .current()
            .is_some_and(|token| token.line == line && !terminators.iter().any(|terminator| token.is_keyword(*terminator)))
        {
            self.tokens.advance();
        }
    }

    fn statement(&mut self, list: NodeId) -> PResult<()> {
        let Some(token) = self.current().cloned() else {
            return Ok(());
        };
        match token.kind {
            TokenKind::Keyword(keyword) => self.keyword_statement(list, keyword),
            TokenKind::Identifier if self.check_op_at(1, OperatorId::ColonEquals) => {
                self.assignment(list, AssignmentKind::Bare)
            }
            TokenKind::Identifier if self.is_function_call() => {
                self.function_call(list).map(drop)
            }
            TokenKind::Identifier if !is_clause_word(&token) => self.variable_reference(list).map(drop),
            _ => {
                if self.is_attribute_list_at(0) {
                    self.bump_parenthesized(list);
                } else {
                    self.bump(list);
                }
                Ok(())
            }
        }
    }

    fn keyword_statement(&mut self, list: NodeId, keyword: KeywordId) -> PResult<()> {
        match keyword {
            KeywordId::Callnat => self.module_call(list, ModuleCallKind::Callnat),
            KeywordId::Fetch => self.module_call(list, ModuleCallKind::Fetch),
            KeywordId::Include => self.include(list),
            KeywordId::Perform => self.perform(list),
            KeywordId::Define if self.check_keyword_at(1, KeywordId::Subroutine) => self.subroutine(list),
            KeywordId::Define => {
                let node = self.tree.alloc(NodeKind::Simple(keyword), Some(list));
                self.bump(node);
                self.bump_rest_of_line(node);
                Ok(())
            }
            KeywordId::End => {
                let node = self.tree.alloc(NodeKind::End, Some(list));
                self.bump(node);
                Ok(())
            }
            KeywordId::Ignore => {
                let node = self.tree.alloc(NodeKind::Ignore, Some(list));
                self.bump(node);
                Ok(())
            }
            KeywordId::For => self.for_loop(list),
            KeywordId::If if self.check_keyword_at(1, KeywordId::No) => self.if_no_records(list),
            KeywordId::If => self.if_statement(list),
            KeywordId::Read if self.check_keyword_at(1, KeywordId::Work) => self.read_work(list),
            KeywordId::Find => self.access(list, AccessKind::Find),
            KeywordId::Read => self.access(list, AccessKind::Read),
            KeywordId::Histogram => self.access(list, AccessKind::Histogram),
            KeywordId::Repeat => self.repeat(list),
            KeywordId::Decide if self.check_keyword_at(1, KeywordId::For) => self.decide_for(list),
            KeywordId::Decide => self.decide_on(list),
            KeywordId::Assign => self.assignment(list, AssignmentKind::Assign),
            KeywordId::Compute => self.assignment(list, AssignmentKind::Compute),
            KeywordId::Move => self.move_statement(list),
            KeywordId::Reset => self.reset(list),
            KeywordId::Add => self.calculation(list, CalculationKind::Add),
            KeywordId::Subtract => self.calculation(list, CalculationKind::Subtract),
            KeywordId::Multiply => self.calculation(list, CalculationKind::Multiply),
            KeywordId::Divide => self.calculation(list, CalculationKind::Divide),
            KeywordId::Write if self.check_keyword_at(1, KeywordId::Work) => self.write_work(list),
            KeywordId::Write => self.output(list, OutputKind::Write),
            KeywordId::Display => self.output(list, OutputKind::Display),
            KeywordId::Print => self.output(list, OutputKind::Print),
            KeywordId::Expand => self.array_resize(list, ArrayResizeKind::Expand),
            KeywordId::Reduce => self.array_resize(list, ArrayResizeKind::Reduce),
            KeywordId::Resize => self.array_resize(list, ArrayResizeKind::Resize),
            KeywordId::Escape => {
                let node = self.tree.alloc(NodeKind::Escape, Some(list));
                self.bump(node);
                self.bump_rest_of_line(node);
                Ok(())
            }
            KeywordId::Set if self.check_keyword_at(1, KeywordId::Key) => {
                let node = self.tree.alloc(NodeKind::SetKey, Some(list));
                self.bump(node);
                self.bump_rest_of_line(node);
                Ok(())
            }
            _ => {
                let node = self.tree.alloc(NodeKind::Simple(keyword), Some(list));
                self.bump(node);
                Ok(())
            }
        }
    }

    /// Position of the keyword that opened `node`.
    fn keyword_position(&self, node: NodeId) -> Position {
        self.tree
            .first_token(node)
            .map(Token::position)
            .unwrap_or_else(|| self.current_position())
    }

    /// Parse a block body and its closing keyword, reporting NPP043 and NPP030.
    fn block(&mut self, node: NodeId, statement: &str, terminator: KeywordId) -> NodeId {
        let body = self.statement_list(node, &[terminator]);
        self.check_block_body(node, body, statement);
        self.close_block(node, statement, terminator);
        body
    }

    fn check_block_body(&mut self, node: NodeId, body: NodeId, statement: &str) {
        if self.tree.child_nodes(body).next().is_none() {
            let position = self.keyword_position(node);
            self.report(errors::statement_has_empty_body(statement, position));
        }
    }

    fn close_block(&mut self, node: NodeId, statement: &str, terminator: KeywordId) {
        if !self.match_keyword(node, terminator) {
            let position = self.keyword_position(node);
            self.report(errors::unclosed_statement(statement, keywords::as_str(terminator), position));
        }
    }

    // ========================================================================
    // Operand lists
    // ========================================================================

    /// Return `true` if the current token continues the operand list of a statement that began on `line`.
    ///
    /// Operands may continue on following lines; a line that starts an assignment or a label does not.
    fn continues_operands(&self) -> bool {
        if !self.can_start_operand() {
            return false;
        }
        if self.check_op_at(1, OperatorId::ColonEquals) {
            return false;
        }
        if self.current().is_some_and(is_clause_word) {
            return false;
        }
        !(self.is_on_new_line() && self.check_kind(TokenKind::LabelIdentifier))
    }

    /// Operands up to the next keyword, skipping attribute lists, `nX`, `nT` and `/`.
    fn operand_list(&mut self, node: NodeId) -> PResult<Vec<NodeId>> {
        let mut operands = Vec::new();
        loop {
            if self.is_attribute_list_at(0) {
                self.bump_parenthesized(node);
            } else if matches!(
                self.peek_kind(0),
                Some(TokenKind::OperandSkip | TokenKind::TabSetting | TokenKind::Operator(OperatorId::Slash))
            ) || self.check_punct(PunctuationId::Comma)
            {
                self.bump(node);
            } else if self.continues_operands() {
                operands.push(self.operand(node)?);
            } else {
                break;
            }
        }
        Ok(operands)
    }

    /// An operand or `SUBSTRING(operand, start, length)`.
    fn substring_or_operand(&mut self, node: NodeId) -> PResult<NodeId> {
        let is_substring = self.current().is_some_and(|token| {
            token.kind == TokenKind::Identifier && token.symbol_name() == "SUBSTRING"
        }) && self.check_punct_at(1, PunctuationId::LParen);
        if !is_substring {
            return self.operand(node);
        }
        self.bump(node);
        self.bump(node);
        let operand = self.operand(node)?;
        while self.match_punct(node, PunctuationId::Comma) {
            if !self.check_punct(PunctuationId::Comma) && !self.check_punct(PunctuationId::RParen) {
                self.arithmetic(node)?;
            }
        }
        self.expect_punct(node, PunctuationId::RParen)?;
        Ok(operand)
    }

    // ========================================================================
    // Module calls
    // ========================================================================

    /// `CALLNAT|FETCH [RETURN|REPEAT] 'NAME' | #VAR [parameters]`.
    fn module_call(&mut self, list: NodeId, kind: ModuleCallKind) -> PResult<()> {
        let keyword = self.current().cloned();
        let placeholder = keyword.clone().ok_or(ParseError { token: None })?;
        let node = self.tree.alloc(
            NodeKind::ModuleCall {
                kind,
                target: placeholder,
                module: None,
            },
            Some(list),
        );
        self.bump(node);
        if kind == ModuleCallKind::Fetch {
            self.match_keyword(node, KeywordId::Return);
            self.match_keyword(node, KeywordId::Repeat);
        }

        let Some(target) = self.current().cloned() else {
            return Err(self.error_at_end("module name"));
        };
        let module = match target.kind {
            TokenKind::String => {
                self.bump(node);
                let name = target.string_value().trim().to_ascii_uppercase();
                self.sideload_module(&target, &name)
            }
            token_kind if token_kind.can_be_identifier() => {
                self.variable_reference(node)?;
                None
            }
            _ => return Err(self.error_expected("module name")),
        };
        if let NodeKind::ModuleCall {
            target: target_slot,
            module: module_slot,
            ..
        } = self.tree.kind_mut(node)
        {
            *target_slot = target;
            *module_slot = module;
        }

        self.operand_list(node)?;
        Ok(())
    }

    /// `INCLUDE name ['param' ...]`: parse the copycode in place, below the INCLUDE node.
    fn include(&mut self, list: NodeId) -> PResult<()> {
        let Some(target) = self.tokens.peek(1).map(|token| token.with_kind(TokenKind::Identifier)) else {
            self.bump(list);
            return Err(self.error_at_end("copycode name"));
        };
        let node = self.tree.alloc(
            NodeKind::Include {
                target: target.clone(),
                module: None,
                body: None,
            },
            Some(list),
        );
        self.bump(node);
        self.expect_identifier(node)?;
        while self.check_kind(TokenKind::String) && !self.is_on_new_line() {
            self.bump(node);
        }

        let name = target.symbol_name();
        let module = self.sideload_module(&target, &name);
        let body = match &module {
            Some(module) => self.include_body(node, &target, module),
            None => self.tree.alloc(NodeKind::StatementList, Some(node)),
        };
        if let NodeKind::Include {
            module: module_slot,
            body: body_slot,
            ..
        } = self.tree.kind_mut(node)
        {
            *module_slot = module;
            *body_slot = Some(body);
        }
        Ok(())
    }

    fn include_body(&mut self, node: NodeId, target: &Token, module: &ModuleRef) -> NodeId {
        let position = target.diagnostic_position();
        if self.is_being_parsed(&module.name) {
            tracing::debug!(copycode = %module.name, "include cycle detected");
            self.report(errors::cyclomatic_include(&module.name, target.position()));
            return self.tree.alloc(NodeKind::StatementList, Some(node));
        }
        if self.include_stack.len() >= self.options.max_include_depth {
            tracing::debug!(copycode = %module.name, depth = self.include_stack.len(), "include depth exceeded");
            self.report(errors::include_too_deep(
                &module.name,
                self.options.max_include_depth,
                target.position(),
            ));
            return self.tree.alloc(NodeKind::StatementList, Some(node));
        }
        let source = match self.provider.read_source(module) {
            Ok(source) => source,
            Err(error) => {
                tracing::debug!(%error, "failed to read copycode");
                return self.tree.alloc(NodeKind::StatementList, Some(node));
            }
        };

        let tokens = Lexer::new(&source, &module.path).relocated_to(position.clone()).tokenize();
        let mut nested = self.nested(tokens, Some(position), module.name.clone());
        let body = nested.statement_list(node, &[]);
        let diagnostics = self.absorb(nested);
        self.diagnostics.extend(diagnostics);
        body
    }

    // ========================================================================
    // Subroutines
    // ========================================================================

    /// `PERFORM name [parameters]`; bound to its subroutine when parsing finishes.
    fn perform(&mut self, list: NodeId) -> PResult<()> {
        let Some(name) = self.tokens.peek(1).map(|token| token.with_kind(TokenKind::Identifier)) else {
            self.bump(list);
            return Err(self.error_at_end("subroutine name"));
        };
        let node = self.tree.alloc(NodeKind::InternalPerform { name, reference: None }, Some(list));
        self.bump(node);
        self.expect_identifier(node)?;
        self.internal_performs.push(node);
        self.operand_list(node)?;
        Ok(())
    }

    /// `DEFINE SUBROUTINE name ... END-SUBROUTINE`.
    fn subroutine(&mut self, list: NodeId) -> PResult<()> {
        let Some(name) = self.tokens.peek(2).map(|token| token.with_kind(TokenKind::Identifier)) else {
            self.bump(list);
            self.bump(list);
            return Err(self.error_at_end("subroutine name"));
        };
        let node = self.tree.alloc(
            NodeKind::Subroutine {
                name,
                body: None,
                references: BTreeSet::new(),
            },
            Some(list),
        );
        self.bump(node);
        self.bump(node);
        self.expect_identifier(node)?;
        self.referencables.push(node);

        let body = self.statement_list(node, &[KeywordId::EndSubroutine]);
        if let NodeKind::Subroutine { body: slot, .. } = self.tree.kind_mut(node) {
            *slot = Some(body);
        }
        self.close_block(node, "DEFINE SUBROUTINE", KeywordId::EndSubroutine);
        Ok(())
    }

    /// Bind `PERFORM`s to the subroutines of this module, or to external subroutines found by the provider.
    fn resolve_performs(&mut self) {
        let subroutines: Vec<(String, NodeId)> = self
            .referencables
            .iter()
            .filter_map(|node| match self.tree.kind(*node) {
                NodeKind::Subroutine { name, .. } => Some((subroutine_name(name), *node)),
                _ => None,
            })
            .collect();

        for perform in std::mem::take(&mut self.internal_performs) {
            let NodeKind::InternalPerform { name, .. } = self.tree.kind(perform) else {
                continue;
            };
            let name = name.clone();
            let wanted = subroutine_name(&name);
            if let Some((_, subroutine)) = subroutines.iter().find(|(candidate, _)| *candidate == wanted) {
                self.tree.bind(perform, *subroutine);
                continue;
            }

            let module = self.provider.find_module(&wanted);
            if module.is_none() {
                tracing::trace!(subroutine = %wanted, "external subroutine not found");
                self.diagnostics
                    .push(errors::unresolved_module(&wanted, name.diagnostic_position()));
            }
            *self.tree.kind_mut(perform) = NodeKind::ExternalPerform { name, module };
        }
    }

    // ========================================================================
    // Loops and conditions
    // ========================================================================

    /// `FOR #I [:=|=|FROM] lower TO upper [STEP step] ... END-FOR`.
    fn for_loop(&mut self, list: NodeId) -> PResult<()> {
        let node = self.tree.alloc(
            NodeKind::ForLoop {
                variable: None,
                lower: None,
                upper: None,
                step: None,
                body: None,
            },
            Some(list),
        );
        self.bump(node);
        let variable = self.variable_reference(node)?;
        if !self.match_op(node, OperatorId::ColonEquals) && !self.match_op(node, OperatorId::Equals) {
            self.match_keyword(node, KeywordId::From);
        }
        let lower = self.arithmetic(node)?;
        if !self.match_keyword(node, KeywordId::To) && !self.match_keyword(node, KeywordId::Thru) {
            return Err(self.error_expected("TO"));
        }
        let upper = self.arithmetic(node)?;
        let step = if self.match_keyword(node, KeywordId::Step) {
            Some(self.arithmetic(node)?)
        } else {
            None
        };

        let body = self.block(node, "FOR", KeywordId::EndFor);
        *self.tree.kind_mut(node) = NodeKind::ForLoop {
            variable: Some(variable),
            lower: Some(lower),
            upper: Some(upper),
            step,
            body: Some(body),
        };
        Ok(())
    }

    /// `IF condition [THEN] ... [ELSE ...] END-IF`.
    fn if_statement(&mut self, list: NodeId) -> PResult<()> {
        let node = self.tree.alloc(
            NodeKind::If {
                condition: None,
                body: None,
                else_body: None,
            },
            Some(list),
        );
        self.bump(node);
        let condition = self.condition(node)?;
        self.match_keyword(node, KeywordId::Then);

        let body = self.statement_list(node, &[KeywordId::Else, KeywordId::EndIf]);
        self.check_block_body(node, body, "IF");
        let else_body = if self.check_keyword(KeywordId::Else) {
            let else_position = self.current_position();
            self.bump(node);
            let else_body = self.statement_list(node, &[KeywordId::EndIf]);
            if self.tree.child_nodes(else_body).next().is_none() {
                self.report(errors::statement_has_empty_body("ELSE", else_position));
            }
            Some(else_body)
        } else {
            None
        };
        self.close_block(node, "IF", KeywordId::EndIf);

        *self.tree.kind_mut(node) = NodeKind::If {
            condition: Some(condition),
            body: Some(body),
            else_body,
        };
        Ok(())
    }

    /// `IF NO [RECORDS] [FOUND] ... END-NOREC`.
    fn if_no_records(&mut self, list: NodeId) -> PResult<()> {
        let node = self.tree.alloc(NodeKind::IfNoRecord { body: None }, Some(list));
        self.bump(node);
        self.bump(node);
        self.match_keyword(node, KeywordId::Records);
        self.match_keyword(node, KeywordId::Found);
        let body = self.block(node, "IF NO RECORDS FOUND", KeywordId::EndNorec);
        *self.tree.kind_mut(node) = NodeKind::IfNoRecord { body: Some(body) };
        Ok(())
    }

    /// `REPEAT [UNTIL|WHILE cond] ... [UNTIL|WHILE cond] END-REPEAT`.
    fn repeat(&mut self, list: NodeId) -> PResult<()> {
        let node = self.tree.alloc(NodeKind::Repeat { body: None }, Some(list));
        self.bump(node);
        if (self.check_keyword(KeywordId::Until) || self.check_keyword(KeywordId::While)) && !self.is_on_new_line() {
            self.bump(node);
            self.condition(node)?;
        }

        let body = self.statement_list(node, &[KeywordId::EndRepeat, KeywordId::Until, KeywordId::While]);
        self.check_block_body(node, body, "REPEAT");
        if self.match_keyword(node, KeywordId::Until) || self.match_keyword(node, KeywordId::While) {
            self.condition(node)?;
        }
        self.close_block(node, "REPEAT", KeywordId::EndRepeat);
        *self.tree.kind_mut(node) = NodeKind::Repeat { body: Some(body) };
        Ok(())
    }

    /// `DECIDE ON [FIRST|EVERY] [VALUE [OF]] operand VALUE ... NONE ... END-DECIDE`.
    fn decide_on(&mut self, list: NodeId) -> PResult<()> {
        let node = self.tree.alloc(
            NodeKind::DecideOn {
                operand: None,
                branches: Vec::new(),
                none: None,
            },
            Some(list),
        );
        self.bump(node);
        self.expect_keyword(node, KeywordId::On)?;
        if !self.match_keyword(node, KeywordId::First) {
            self.match_keyword(node, KeywordId::Every);
        }
        self.match_keyword(node, KeywordId::Value);
        self.match_keyword(node, KeywordId::Of);
        let operand = self.operand(node)?;

        const BRANCH_STARTS: &[KeywordId] = &[
            KeywordId::Value,
            KeywordId::Any,
            KeywordId::All,
            KeywordId::None,
            KeywordId::EndDecide,
        ];
        let mut branches = Vec::new();
        let mut none = None;
        loop {
            let Some(keyword) = self.peek_kind(0).and_then(|kind| kind.keyword_id()) else {
                break;
            };
            if !BRANCH_STARTS.contains(&keyword) || keyword == KeywordId::EndDecide {
                break;
            }
            let branch = self.tree.alloc(
                NodeKind::DecideBranch {
                    values: Vec::new(),
                    body: None,
                },
                Some(node),
            );
            self.bump(branch);
            let mut values = Vec::new();
            if keyword == KeywordId::Value {
                loop {
                    let value = self.operand(branch)?;
                    values.push(value);
                    if self.match_punct(branch, PunctuationId::Colon) {
                        values.push(self.operand(branch)?);
                    }
                    if !self.match_punct(branch, PunctuationId::Comma) {
                        break;
                    }
                }
            } else {
                self.match_keyword(branch, KeywordId::Value);
            }

            let body = self.statement_list(branch, BRANCH_STARTS);
            self.check_block_body(branch, body, keywords::as_str(keyword));
            *self.tree.kind_mut(branch) = NodeKind::DecideBranch { values, body: Some(body) };
            if keyword == KeywordId::None {
                none = Some(branch);
            } else {
                branches.push(branch);
            }
        }
        self.close_block(node, "DECIDE ON", KeywordId::EndDecide);
        if none.is_none() {
            let position = self.keyword_position(node);
            self.report(errors::decide_misses_none_branch(position));
        }

        *self.tree.kind_mut(node) = NodeKind::DecideOn {
            operand: Some(operand),
            branches,
            none,
        };
        Ok(())
    }

    /// `DECIDE FOR FIRST|EVERY CONDITION WHEN cond ... WHEN NONE ... END-DECIDE`.
    fn decide_for(&mut self, list: NodeId) -> PResult<()> {
        let node = self.tree.alloc(
            NodeKind::DecideFor {
                branches: Vec::new(),
                none: None,
            },
            Some(list),
        );
        self.bump(node);
        self.bump(node);
        if !self.match_keyword(node, KeywordId::First) {
            self.match_keyword(node, KeywordId::Every);
        }
        self.expect_keyword(node, KeywordId::Condition)?;

        let mut branches = Vec::new();
        let mut none = None;
        while self.check_keyword(KeywordId::When) {
            let branch = self.tree.alloc(
                NodeKind::DecideBranch {
                    values: Vec::new(),
                    body: None,
                },
                Some(node),
            );
            self.bump(branch);
            let is_none = self.check_keyword(KeywordId::None);
            let mut values = Vec::new();
            if is_none || self.check_keyword(KeywordId::Any) || self.check_keyword(KeywordId::All) {
                self.bump(branch);
            } else {
                values.push(self.condition(branch)?);
            }

            let body = self.statement_list(branch, &[KeywordId::When, KeywordId::EndDecide]);
            self.check_block_body(branch, body, "WHEN");
            *self.tree.kind_mut(branch) = NodeKind::DecideBranch { values, body: Some(body) };
            if is_none {
                none = Some(branch);
            } else {
                branches.push(branch);
            }
        }
        self.close_block(node, "DECIDE FOR", KeywordId::EndDecide);
        if none.is_none() {
            let position = self.keyword_position(node);
            self.report(errors::decide_misses_none_branch(position));
        }

        *self.tree.kind_mut(node) = NodeKind::DecideFor { branches, none };
        Ok(())
    }

    // ========================================================================
    // Database access
    // ========================================================================

    /// `FIND|READ|HISTOGRAM [options] view [WITH|BY|WHERE ...] ... END-FIND|END-READ|END-HISTOGRAM`.
    ///
    /// `FIND NUMBER` has no body.
    fn access(&mut self, list: NodeId, kind: AccessKind) -> PResult<()> {
        let Some(start) = self.current().cloned() else {
            return Ok(());
        };
        let node = self.tree.alloc(
            NodeKind::Access {
                kind,
                view: None,
                body: None,
            },
            Some(list),
        );
        self.bump(node);
        let counts_only = kind == AccessKind::Find && self.check_keyword(KeywordId::Number);

        let mut view = None;
        while let Some(token) = self.current().cloned() {
            if token.line != start.line || token.path != start.path {
                break;
            }
            if token.kind == TokenKind::Identifier && !is_clause_word(&token) {
                view = Some(self.variable_reference(node)?);
                break;
            }
            if self.check_punct(PunctuationId::LParen) {
                self.bump_parenthesized(node);
            } else {
                self.bump(node);
            }
        }
        let Some(view) = view else {
            return Err(self.error_expected("view name"));
        };
        self.access_criteria(node, &start)?;

        let body = if counts_only {
            None
        } else {
            let (statement, terminator) = match kind {
                AccessKind::Find => ("FIND", KeywordId::EndFind),
                AccessKind::Read => ("READ", KeywordId::EndRead),
                AccessKind::Histogram => ("HISTOGRAM", KeywordId::EndHistogram),
            };
            Some(self.block(node, statement, terminator))
        };
        *self.tree.kind_mut(node) = NodeKind::Access {
            kind,
            view: Some(view),
            body,
        };
        Ok(())
    }

    /// Search criteria after the view. Descriptor names are kept as plain tokens.
    fn access_criteria(&mut self, node: NodeId, start: &Token) -> PResult<()> {
        while let Some(token) = self.current().cloned() {
            let same_line = token.line == start.line && token.path == start.path;
            let continues = same_line || (token.kind.keyword_id().is_some_and(is_access_clause));
            if !continues {
                break;
            }
            match token.kind {
                TokenKind::Keyword(KeywordId::Where) => {
                    self.bump(node);
                    self.condition(node)?;
                }
                TokenKind::Keyword(
                    KeywordId::With | KeywordId::By | KeywordId::And | KeywordId::Or | KeywordId::Descending,
                ) => {
                    self.bump(node);
                    if self.check_kind(TokenKind::Identifier) {
                        self.bump(node);
                    }
                }
                TokenKind::Keyword(keyword) if !is_access_clause(keyword) => break,
                _ if self.check_punct(PunctuationId::LParen) && self.is_attribute_list_at(0) => {
                    self.bump_parenthesized(node);
                }
                _ if self.can_start_operand() => {
                    self.arithmetic(node)?;
                }
                _ => {
                    self.bump(node);
                }
            }
        }
        Ok(())
    }

    /// `READ WORK [FILE] n [ONCE] operands ... END-WORK`.
    fn read_work(&mut self, list: NodeId) -> PResult<()> {
        let node = self.tree.alloc(NodeKind::Simple(KeywordId::Read), Some(list));
        self.bump(node);
        self.bump(node);
        self.match_keyword(node, KeywordId::File);
        self.expect_kind(node, TokenKind::Number)?;
        let once = self.current().is_some_and(|token| token.symbol_name() == "ONCE");
        if once {
            self.bump(node);
        }
        if self.current().is_some_and(|token| token.symbol_name() == "RECORD") {
            self.bump(node);
        }
        self.operand_list(node)?;
        if !once {
            self.block(node, "READ WORK FILE", KeywordId::EndWork);
        }
        Ok(())
    }

    // ========================================================================
    // Data manipulation
    // ========================================================================

    /// `ASSIGN|COMPUTE [ROUNDED] target := value` or `target := value`.
    fn assignment(&mut self, list: NodeId, kind: AssignmentKind) -> PResult<()> {
        let node = self.tree.alloc(
            NodeKind::Assignment {
                kind,
                target: None,
                value: None,
            },
            Some(list),
        );
        if kind != AssignmentKind::Bare {
            self.bump(node);
            self.match_keyword(node, KeywordId::Rounded);
        }
        let target = self.operand(node)?;
        if !self.match_op(node, OperatorId::ColonEquals) && !self.match_op(node, OperatorId::Equals) {
            return Err(self.error_expected(":="));
        }
        let value = self.arithmetic(node)?;
        *self.tree.kind_mut(node) = NodeKind::Assignment {
            kind,
            target: Some(target),
            value: Some(value),
        };
        Ok(())
    }

    /// `MOVE [options] source [(attributes)] TO target ...`.
    fn move_statement(&mut self, list: NodeId) -> PResult<()> {
        let node = self.tree.alloc(
            NodeKind::Move {
                source: None,
                targets: Vec::new(),
            },
            Some(list),
        );
        self.bump(node);
        loop {
            if self.check_keyword(KeywordId::Rounded) || self.check_keyword(KeywordId::All) {
                self.bump(node);
            } else if self.check_keyword(KeywordId::By) {
                self.bump(node);
                self.bump(node);
            } else if self.current().is_some_and(is_move_option) {
                self.bump(node);
            } else {
                break;
            }
        }

        let source = self.substring_or_operand(node)?;
        if self.is_attribute_list_at(0) {
            self.bump_parenthesized(node);
        }
        self.expect_keyword(node, KeywordId::To)?;
        let mut targets = Vec::new();
        while self.continues_operands() {
            targets.push(self.substring_or_operand(node)?);
        }
        if targets.is_empty() {
            return Err(self.error_expected("MOVE target"));
        }
        if self.match_keyword(node, KeywordId::Until) {
            self.operand(node)?;
        }
        *self.tree.kind_mut(node) = NodeKind::Move {
            source: Some(source),
            targets,
        };
        Ok(())
    }

    /// `RESET [INITIAL] operand ...`.
    fn reset(&mut self, list: NodeId) -> PResult<()> {
        let node = self.tree.alloc(
            NodeKind::Reset {
                initial: false,
                targets: Vec::new(),
            },
            Some(list),
        );
        self.bump(node);
        let initial = self.match_keyword(node, KeywordId::Initial);
        let targets = self.operand_list(node)?;
        *self.tree.kind_mut(node) = NodeKind::Reset { initial, targets };
        Ok(())
    }

    /// `ADD`, `SUBTRACT`, `MULTIPLY` and `DIVIDE` with their `TO|FROM|BY|INTO`, `GIVING` and `REMAINDER` parts.
    fn calculation(&mut self, list: NodeId, kind: CalculationKind) -> PResult<()> {
        let node = self.tree.alloc(
            NodeKind::Calculation {
                kind,
                operands: Vec::new(),
                target: None,
                giving: None,
                remainder: None,
            },
            Some(list),
        );
        self.bump(node);
        self.match_keyword(node, KeywordId::Rounded);

        let mut operands = Vec::new();
        while self.continues_operands() {
            operands.push(self.operand(node)?);
        }
        let preposition = match kind {
            CalculationKind::Add => KeywordId::To,
            CalculationKind::Subtract => KeywordId::From,
            CalculationKind::Multiply => KeywordId::By,
            CalculationKind::Divide => KeywordId::Into,
        };
        self.expect_keyword(node, preposition)?;
        let second = self.operand(node)?;
        operands.push(second);
        let target = match kind {
            CalculationKind::Multiply => operands.first().copied(),
            _ => Some(second),
        };

        let giving = if self.match_keyword(node, KeywordId::Giving) {
            Some(self.operand(node)?)
        } else {
            None
        };
        let remainder = if self.match_keyword(node, KeywordId::Remainder) {
            if self.current().is_some_and(|token| token.symbol_name() == "POSITION") {
                self.bump(node);
            }
            Some(self.operand(node)?)
        } else {
            None
        };

        *self.tree.kind_mut(node) = NodeKind::Calculation {
            kind,
            operands,
            target,
            giving,
            remainder,
        };
        Ok(())
    }

    /// `WRITE WORK [FILE] n [VARIABLE] operand ...`.
    fn write_work(&mut self, list: NodeId) -> PResult<()> {
        let node = self.tree.alloc(
            NodeKind::WriteWork {
                variable: false,
                operands: Vec::new(),
            },
            Some(list),
        );
        self.bump(node);
        self.bump(node);
        self.match_keyword(node, KeywordId::File);
        self.expect_kind(node, TokenKind::Number)?;
        let variable = self.match_keyword(node, KeywordId::Variable);
        let operands = self.operand_list(node)?;
        *self.tree.kind_mut(node) = NodeKind::WriteWork { variable, operands };
        Ok(())
    }

    /// `WRITE|DISPLAY|PRINT [(report)] [NOTITLE] operand ...`.
    fn output(&mut self, list: NodeId, kind: OutputKind) -> PResult<()> {
        let node = self.tree.alloc(
            NodeKind::Output {
                kind,
                operands: Vec::new(),
            },
            Some(list),
        );
        self.bump(node);
        if self.check_punct(PunctuationId::LParen) && !self.is_on_new_line() {
            self.bump_parenthesized(node);
        }
        self.match_keyword(node, KeywordId::Notitle);
        let operands = self.operand_list(node)?;
        *self.tree.kind_mut(node) = NodeKind::Output { kind, operands };
        Ok(())
    }

    /// `EXPAND|REDUCE|RESIZE [SIZE OF] [DYNAMIC [VARIABLE]] | [[AND RESET] OCCURRENCES OF] ARRAY name TO ...`.
    fn array_resize(&mut self, list: NodeId, kind: ArrayResizeKind) -> PResult<()> {
        let Some(start) = self.current().cloned() else {
            return Ok(());
        };
        let node = self.tree.alloc(NodeKind::ArrayResize { kind, array: None }, Some(list));
        self.bump(node);

        let mut array = None;
        while let Some(token) = self.current().cloned() {
            if token.line != start.line || token.path != start.path {
                break;
            }
            if self.can_start_operand() && !is_clause_word(&token) {
                array = Some(self.variable_reference(node)?);
                break;
            }
            self.bump(node);
        }
        let Some(array) = array else {
            return Err(self.error_expected("array name"));
        };

        if self.match_keyword(node, KeywordId::To) {
            if self.check_punct(PunctuationId::LParen) {
                self.bump_parenthesized(node);
            } else {
                self.operand(node)?;
            }
        }
        if self.match_keyword(node, KeywordId::Giving) {
            self.operand(node)?;
        }
        *self.tree.kind_mut(node) = NodeKind::ArrayResize {
            kind,
            array: Some(array),
        };
        Ok(())
    }
}

/// The subroutine name as Natural compares it: uppercased, at most 32 characters.
fn subroutine_name(token: &Token) -> String {
    token.symbol_name().chars().take(32).collect()
}

/// Words that read like identifiers but belong to a statement's syntax.
fn is_clause_word(token: &Token) -> bool {
    token.kind == TokenKind::Identifier
        && matches!(
            token.symbol_name().as_str(),
            "IN" | "SIZE"
                | "OCCURRENCES"
                | "REPOSITION"
                | "MODULE"
                | "MULTI-FETCH"
                | "ONCE"
                | "IMMEDIATE"
                | "BUT"
                | "ABSOLUTE"
                | "REPLACE"
                | "SEQUENCE"
        )
}

/// Options between `MOVE` and its source.
fn is_move_option(token: &Token) -> bool {
    token.kind == TokenKind::Identifier
        && matches!(
            token.symbol_name().as_str(),
            "LEFT" | "RIGHT" | "JUSTIFIED" | "EDITED" | "NORMALIZED" | "ENCODED"
        )
}

/// Keywords that continue the search criteria of `FIND`, `READ` and `HISTOGRAM` on a new line.
fn is_access_clause(keyword: KeywordId) -> bool {
    matches!(
        keyword,
        KeywordId::With
            | KeywordId::By
            | KeywordId::And
            | KeywordId::Or
            | KeywordId::Not
            | KeywordId::Where
            | KeywordId::Starting
            | KeywordId::Ending
            | KeywordId::From
            | KeywordId::Thru
            | KeywordId::To
            | KeywordId::Descending
            | KeywordId::Ascending
            | KeywordId::Value
            | KeywordId::Eq
            | KeywordId::Ne
            | KeywordId::Lt
            | KeywordId::Le
            | KeywordId::Gt
            | KeywordId::Ge
            | KeywordId::Equal
            | KeywordId::Physical
            | KeywordId::Logical
    )
}
