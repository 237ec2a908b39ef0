/// Where the next variable line of a `DEFINE DATA` goes.
struct ScopeState {
    scope: VariableScope,
    /// Created on the first variable line, so `LOCAL USING X` alone leaves no empty scope behind.
    node: Option<NodeId>,
    /// Variables that can still receive members, innermost last.
    open: Vec<NodeId>,
}

/// What a variable line declared between its name and its modifiers.
#[derive(Default)]
struct Declared {
    ty: Option<DataType>,
    type_position: Option<Position>,
    dimensions: Vec<ArrayDimension>,
}

/// Declaration parsing (`DEFINE DATA ... END-DEFINE`, `DEFINE FUNCTION` headers).
///
/// Variables are nested by level with a stack: a new line pops every open variable whose level is not lower
/// than its own, and the remaining top becomes its parent. Checks that need the whole block (duplicates, empty
/// groups, redefinition lengths) run once `END-DEFINE` is reached.
impl<'p> Parser<'p> {
    /// Skip leading tokens up to `DEFINE DATA`.
    ///
    /// ## Returns
    /// - `false` with the cursor unchanged if the source has no `DEFINE DATA`.
    pub fn advance_to_define_data(&mut self) -> bool {
        let start = self.tokens.offset();
        while !self.is_at_end() {
            if self.check_keyword(KeywordId::Define) && self.check_keyword_at(1, KeywordId::Data) {
                return true;
            }
            self.tokens.advance();
        }
        self.tokens.reset_to(start);
        false
    }

    /// Parse `DEFINE FUNCTION name RETURNS [name] [(type)]` if the cursor is on one.
    pub fn parse_function_header(&mut self) -> Option<NodeId> {
        if !self.check_keyword(KeywordId::Define) || !self.check_keyword_at(1, KeywordId::Function) {
            return None;
        }
        let name = self.tokens.peek(2)?.with_kind(TokenKind::Identifier);
        let node = self.tree.alloc(
            NodeKind::DefineFunction {
                name: name.clone(),
                return_variable: None,
            },
            None,
        );
        self.function = Some(node);
        self.referencables.push(node);
        self.bump(node);
        self.bump(node);
        if let Err(error) = self.function_returns(node, &name) {
            tracing::debug!(?error, "recovering from malformed function header");
            self.skip_line();
        }
        Some(node)
    }

    fn function_returns(&mut self, node: NodeId, name: &Token) -> PResult<()> {
        self.expect_identifier(node)?;
        if !self.match_keyword(node, KeywordId::Returns) {
            return Ok(());
        }

        let mut declaration = name.clone();
        if self.peek_kind(0).is_some_and(|kind| kind.can_be_identifier()) && !self.is_on_new_line() {
            declaration = self.expect_identifier(node)?;
        }
        let mut declared = Declared::default();
        if self.check_punct(PunctuationId::LParen) && !self.is_on_new_line() {
            declared = self.type_and_dimensions(node)?;
        }
        if self.check_keyword(KeywordId::By) && self.check_keyword_at(1, KeywordId::Value) {
            self.bump(node);
            self.bump(node);
        }

        let ty = declared.ty.unwrap_or(DataType::UNTYPED);
        let mut variable = Variable::new(
            declaration,
            1,
            VariableScope::Local,
            VariableKind::Typed(TypedVariable::new(ty)),
        );
        variable.dimensions = declared.dimensions;
        let variable = self.tree.alloc(NodeKind::Variable(Box::new(variable)), Some(node));
        self.referencables.push(variable);
        if let NodeKind::DefineFunction { return_variable, .. } = self.tree.kind_mut(node) {
            *return_variable = Some(variable);
        }
        Ok(())
    }

    /// Parse the `DEFINE DATA ... END-DEFINE` block under the cursor.
    ///
    /// ## Parameters
    /// - `file_type`: restricts the scopes a data area may declare.
    #[tracing::instrument(skip_all, fields(file_type = ?file_type))]
    pub fn parse_define_data(&mut self, file_type: FileType) -> Option<NodeId> {
        if !self.check_keyword(KeywordId::Define) || !self.check_keyword_at(1, KeywordId::Data) {
            return None;
        }
        let define_data = self.tree.alloc(NodeKind::DefineData, None);
        self.define_data = Some(define_data);
        self.declared.clear();
        self.bump(define_data);
        self.bump(define_data);

        let mut state: Option<ScopeState> = None;
        let mut imports = BTreeSet::new();
        let mut closed = false;
        while !self.is_at_end() {
            if self.match_keyword(define_data, KeywordId::EndDefine) {
                closed = true;
                break;
            }
            let start = self.tokens.offset();
            if let Err(error) = self.declaration_item(define_data, file_type, &mut state, &mut imports) {
                tracing::debug!(?error, "recovering inside DEFINE DATA");
                self.recover_declaration(start);
            }
        }
        if !closed {
            let position = self.end_position();
            self.report(errors::missing_end_define(position));
        }

        self.check_define_data(define_data);
        Some(define_data)
    }

    /// Skip the rest of a broken declaration line, stopping at the next declaration start.
    fn recover_declaration(&mut self, start: usize) {
        let starts_declaration = self.is_on_new_line()
            && (self.check_kind(TokenKind::Number) || self.check_scope_keyword().is_some());
        if !starts_declaration {
            self.skip_line_before(KeywordId::EndDefine);
        }
        if self.tokens.offset() == start {
            self.tokens.advance();
        }
    }

    fn check_scope_keyword(&self) -> Option<KeywordId> {
        match self.peek_kind(0)? {
            TokenKind::Keyword(
                id @ (KeywordId::Local | KeywordId::Global | KeywordId::Parameter | KeywordId::Independent),
            ) => Some(id),
            _ => None,
        }
    }

    fn declaration_item(
        &mut self,
        define_data: NodeId,
        file_type: FileType,
        state: &mut Option<ScopeState>,
        imports: &mut BTreeSet<String>,
    ) -> PResult<()> {
        if let Some(keyword) = self.check_scope_keyword() {
            let scope = VariableScope::from_keyword(keyword).unwrap_or(VariableScope::Local);
            if let Some(allowed) = file_type.restricted_scope() {
                if allowed != keyword {
                    let position = self.current_position();
                    self.report(errors::invalid_scope_for_file_type(
                        keywords::as_str(keyword),
                        file_type.extension(),
                        position,
                    ));
                }
            }

            if self.check_keyword_at(1, KeywordId::Using) {
                *state = Some(ScopeState {
                    scope,
                    node: None,
                    open: Vec::new(),
                });
                return self.using_clause(define_data, scope, imports);
            }

            let node = self.tree.alloc(NodeKind::Scope(scope), Some(define_data));
            self.bump(node);
            *state = Some(ScopeState {
                scope,
                node: Some(node),
                open: Vec::new(),
            });
            return Ok(());
        }

        if self.check_kind(TokenKind::Number) {
            let Some(state) = state.as_mut() else {
                return Err(self.error_expected("LOCAL, GLOBAL, PARAMETER or INDEPENDENT"));
            };
            return self.variable_line(define_data, state);
        }

        Err(self.error_expected("variable level"))
    }

    // ========================================================================
    // USING
    // ========================================================================

    /// `LOCAL USING name [WITH block]`: import the variables of a data area.
    fn using_clause(
        &mut self,
        define_data: NodeId,
        scope: VariableScope,
        imports: &mut BTreeSet<String>,
    ) -> PResult<()> {
        let Some(target) = self
            .tokens
            .peek(2)
            .filter(|token| token.kind.can_be_identifier())
            .map(|token| token.with_kind(TokenKind::Identifier))
        else {
            self.bump(define_data);
            self.bump(define_data);
            return Err(self.error_expected("data area name"));
        };

        let node = self.tree.alloc(
            NodeKind::Using {
                scope,
                target: target.clone(),
                module: None,
            },
            Some(define_data),
        );
        self.bump(node);
        self.bump(node);
        self.bump_as(node, TokenKind::Identifier);
        if self.match_keyword(node, KeywordId::With) {
            self.expect_identifier(node)?;
        }

        let name = target.symbol_name();
        if !imports.insert(name.clone()) {
            self.report(errors::duplicated_import(&name, target.position()));
            return Ok(());
        }

        let module = self.sideload_module(&target, &name);
        if let Some(module) = &module {
            self.import_data_area(node, module);
        }
        if let NodeKind::Using { module: slot, .. } = self.tree.kind_mut(node) {
            *slot = module;
        }
        Ok(())
    }

    /// Parse the data area's own `DEFINE DATA` into this tree, below `using`.
    ///
    /// Diagnostics of the data area belong to the data area and are dropped here.
    fn import_data_area(&mut self, using: NodeId, module: &ModuleRef) {
        if self.is_being_parsed(&module.name) {
            tracing::debug!(module = %module.name, "data area imports itself");
            return;
        }
        let source = match self.provider.read_source(module) {
            Ok(source) => source,
            Err(error) => {
                tracing::debug!(%error, "failed to read data area");
                return;
            }
        };

        let tokens = Lexer::new(&source, &module.path).tokenize();
        let mut nested = self.nested(tokens, None, module.name.clone());
        let imported = if nested.advance_to_define_data() {
            nested.parse_define_data(module.file_type)
        } else {
            None
        };
        let dropped = self.absorb(nested);
        tracing::trace!(module = %module.name, dropped = dropped.len(), "imported data area");
        if let Some(imported) = imported {
            self.tree.reparent(imported, using);
        }
    }

    // ========================================================================
    // Variable lines
    // ========================================================================

    fn variable_line(&mut self, define_data: NodeId, state: &mut ScopeState) -> PResult<()> {
        let level = self
            .current()
            .and_then(Token::int_value)
            .and_then(|level| u32::try_from(level).ok())
            .unwrap_or(1)
            .max(1);
        let scope_node = match state.node {
            Some(node) => node,
            None => {
                let node = self.tree.alloc(NodeKind::Scope(state.scope), Some(define_data));
                state.node = Some(node);
                node
            }
        };
        while state
            .open
            .last()
            .is_some_and(|open| self.tree.variable(*open).is_some_and(|variable| variable.level >= level))
        {
            state.open.pop();
        }
        let parent = state.open.last().copied().unwrap_or(scope_node);

        if self.check_keyword_at(1, KeywordId::Redefine) {
            let node = self.redefinition(parent, level, state.scope)?;
            state.open.push(node);
            return Ok(());
        }
        if self.check_keyword_at(1, KeywordId::Filler) {
            return self.filler(parent);
        }

        let Some(name) = self.tokens.peek(1).map(|token| token.with_kind(TokenKind::Identifier)) else {
            self.bump(parent);
            return Err(self.error_at_end("variable name"));
        };
        let variable = Variable::new(name, level, state.scope, VariableKind::Group);
        let node = self.tree.alloc(NodeKind::Variable(Box::new(variable)), Some(parent));
        self.bump(node);
        let name = match self.expect_identifier(node) {
            Ok(name) => name,
            Err(error) => {
                self.tree.remove(node);
                return Err(error);
            }
        };

        let result = self.variable_body(node, parent, &name, state.scope);
        if result.is_err() {
            // A broken line must not show up as an empty group as well.
            if let Some(variable) = self.tree.variable_mut(node) {
                if matches!(variable.kind, VariableKind::Group) {
                    variable.kind = VariableKind::Typed(TypedVariable::new(DataType::UNTYPED));
                }
            }
        }
        self.declared.push(node);
        self.referencables.push(node);
        state.open.push(node);
        result
    }

    /// Everything after the name: type or view, modifiers and initial values.
    fn variable_body(&mut self, node: NodeId, parent: NodeId, name: &Token, scope: VariableScope) -> PResult<()> {
        let mut dimensions = self.inherited_dimensions(parent);
        let in_view = self.tree.is_in_view(node);

        if self.match_keyword(node, KeywordId::View) {
            self.match_keyword(node, KeywordId::Of);
            let ddm = self.expect_identifier(node)?;
            self.load_view_definition(node, &ddm);
            self.set_variable(node, VariableKind::View { ddm }, dimensions);
            return Ok(());
        }

        let mut declared = Declared::default();
        if self.check_punct(PunctuationId::LParen) && !self.is_attribute_list_at(0) {
            declared = self.type_and_dimensions(node)?;
        }
        dimensions.append(&mut declared.dimensions);

        let mut typed = TypedVariable::new(declared.ty.unwrap_or(DataType::UNTYPED));
        let mut dynamic = None;
        loop {
            if self.check_keyword(KeywordId::Dynamic) {
                dynamic = self.bump(node);
            } else if self.check_keyword(KeywordId::By) && self.check_keyword_at(1, KeywordId::Value) {
                let by = self.current_position();
                self.bump(node);
                self.bump(node);
                self.match_keyword(node, KeywordId::Result);
                typed.by_value = true;
                if scope != VariableScope::Parameter {
                    self.report(errors::by_value_not_allowed_in_scope(&scope.to_string(), by));
                }
            } else if self.check_keyword(KeywordId::Optional) {
                let optional = self.current_position();
                self.bump(node);
                typed.optional = true;
                if scope != VariableScope::Parameter {
                    self.report(errors::optional_not_allowed_in_scope(&scope.to_string(), optional));
                }
            } else if self.check_keyword(KeywordId::Init) || self.check_keyword(KeywordId::Const) {
                self.initial_values(node, &mut typed)?;
            } else if self.is_attribute_list_at(0) {
                self.declaration_attributes(node, scope);
            } else {
                break;
            }
        }

        if let Some(mut ty) = declared.ty {
            let position = declared.type_position.unwrap_or_else(|| name.position());
            ty = self.check_data_type(name, ty, dynamic.as_ref(), position, in_view);
            typed.ty = ty;
        }

        let kind = if in_view {
            self.view_member_kind(node, name, declared.ty.map(|_| typed.ty), &mut dimensions)
        } else if declared.ty.is_some() {
            None
        } else {
            Some(VariableKind::Group)
        };
        let kind = match kind {
            Some(VariableKind::Typed(from_ddm)) if declared.ty.is_none() => {
                typed.ty = from_ddm.ty;
                VariableKind::Typed(typed)
            }
            Some(VariableKind::Typed(_)) | None => VariableKind::Typed(typed),
            Some(other) => other,
        };

        if let VariableKind::Typed(typed) = &kind {
            self.check_initial_values(typed);
        }
        if scope == VariableScope::Independent {
            if !name.text.starts_with('+') {
                self.report(errors::independent_variables_naming(&name.symbol_name(), name.position()));
            }
            if matches!(kind, VariableKind::Group) {
                self.report(errors::independent_cannot_be_group(&name.symbol_name(), name.position()));
            }
        }
        self.set_variable(node, kind, dimensions);
        Ok(())
    }

    fn set_variable(&mut self, node: NodeId, kind: VariableKind, dimensions: Vec<ArrayDimension>) {
        if let Some(variable) = self.tree.variable_mut(node) {
            variable.kind = kind;
            variable.dimensions = dimensions;
        }
    }

    /// Dimensions a new member inherits from its enclosing group array.
    fn inherited_dimensions(&self, parent: NodeId) -> Vec<ArrayDimension> {
        match self.tree.variable(parent) {
            Some(variable) if variable.is_group() => variable.dimensions.clone(),
            _ => Vec::new(),
        }
    }

    /// `(A10)`, `(N7.2/1:10)`, `(1:5)`, `(A5/*)`.
    fn type_and_dimensions(&mut self, node: NodeId) -> PResult<Declared> {
        self.expect_punct(node, PunctuationId::LParen)?;
        let mut declared = Declared::default();

        let type_token = self
            .current()
            .filter(|token| token.kind == TokenKind::Identifier)
            .filter(|token| DataType::parse(&token.text).is_ok())
            .cloned();
        match type_token {
            Some(token) => {
                self.bump(node);
                declared.ty = DataType::parse(&token.text).ok();
                declared.type_position = Some(token.position());
                if self.check_op(OperatorId::Slash) {
                    let slash = self.bump(node);
                    if self.check_punct(PunctuationId::RParen) {
                        if let Some(slash) = slash {
                            self.report(errors::incomplete_array_definition(slash.position()));
                        }
                    } else {
                        declared.dimensions = self.dimensions(node)?;
                    }
                }
            }
            None => declared.dimensions = self.dimensions(node)?,
        }

        self.expect_punct(node, PunctuationId::RParen)?;
        Ok(declared)
    }

    fn dimensions(&mut self, node: NodeId) -> PResult<Vec<ArrayDimension>> {
        let mut dimensions = Vec::new();
        loop {
            dimensions.push(self.dimension(node)?);
            if !self.match_punct(node, PunctuationId::Comma) {
                break;
            }
        }
        Ok(dimensions)
    }

    /// `n`, `n:m`, `*`, `V` or a `CONST` name; a single bound `n` means `1:n`.
    fn dimension(&mut self, node: NodeId) -> PResult<ArrayDimension> {
        let start = self.current_position();
        let first = self.bound(node)?;
        let (lower, upper) = if self.match_punct(node, PunctuationId::Colon) {
            (first, self.bound(node)?)
        } else {
            (Bound::Value(1), first)
        };
        let end = self
            .tokens
            .all_tokens()
            .get(self.tokens.offset().wrapping_sub(1))
            .map(Token::position)
            .unwrap_or_else(|| start.clone());
        let position = start.spanning(&end);

        if let (Bound::Value(low), Bound::Value(high)) = (lower, upper) {
            if low > high {
                self.report(errors::invalid_array_bound(
                    &format!("Lower bound {low} must not be greater than upper bound {high}"),
                    position.clone(),
                ));
            }
        }
        Ok(ArrayDimension { lower, upper, position })
    }

    fn bound(&mut self, node: NodeId) -> PResult<Bound> {
        let Some(token) = self.current().cloned() else {
            return Err(self.error_at_end("array bound"));
        };
        match token.kind {
            TokenKind::Number => {
                self.bump(node);
                Ok(token.int_value().map(Bound::Value).unwrap_or(Bound::Unbound))
            }
            TokenKind::Operator(OperatorId::Asterisk) => {
                self.bump(node);
                Ok(Bound::Unbound)
            }
            TokenKind::Identifier if token.symbol_name() == "V" => {
                self.bump(node);
                Ok(Bound::Variable)
            }
            kind if kind.can_be_identifier() => {
                self.bump_as(node, TokenKind::Identifier);
                Ok(self.constant_bound(node, &token))
            }
            _ => Err(self.error_expected("array bound")),
        }
    }

    /// Resolve a bound given by name against the variables declared so far.
    fn constant_bound(&mut self, node: NodeId, token: &Token) -> Bound {
        let name = token.symbol_name();
        let found = self
            .declared
            .iter()
            .rev()
            .copied()
            .find(|candidate| self.tree.variable(*candidate).is_some_and(|variable| variable.name == name));
        let Some(found) = found else {
            self.report(errors::unresolved_reference(&name, token.position()));
            return Bound::Variable;
        };

        let value = self
            .tree
            .variable(found)
            .and_then(Variable::typed)
            .filter(|typed| typed.constant || typed.has_initializer())
            .and_then(|typed| typed.initial_values.first())
            .and_then(Token::int_value);
        match value {
            Some(value) => Bound::Value(value),
            None => {
                if !self.tree.is_in_view(node) {
                    self.report(errors::array_dimension_must_be_const_or_init(&name, token.position()));
                }
                Bound::Variable
            }
        }
    }

    /// `INIT|CONST [ALL|FULL LENGTH|LENGTH n] [(index)] <value, ...> ...`.
    fn initial_values(&mut self, node: NodeId, typed: &mut TypedVariable) -> PResult<()> {
        typed.constant = self.check_keyword(KeywordId::Const);
        self.bump(node);
        if !self.match_keyword(node, KeywordId::All) {
            if self.match_keyword(node, KeywordId::Full) {
                self.match_keyword(node, KeywordId::Length);
            } else if self.match_keyword(node, KeywordId::Length) {
                self.expect_kind(node, TokenKind::Number)?;
            }
        }

        let mut values = Vec::new();
        let mut groups = 0usize;
        loop {
            if self.check_punct(PunctuationId::LParen) && !self.is_attribute_list_at(0) {
                self.bump_parenthesized(node);
                continue;
            }
            if self.check_op(OperatorId::NotEqual) {
                let empty = self.current_position();
                self.bump(node);
                self.report(errors::empty_initial_value(empty));
                groups += 1;
                continue;
            }
            if !self.check_op(OperatorId::Less) {
                break;
            }

            let open = self.current_position();
            self.bump(node);
            let before = values.len();
            while !self.is_at_end() && !self.check_op(OperatorId::Greater) {
                if self.match_punct(node, PunctuationId::Comma) {
                    continue;
                }
                match self.peek_kind(0) {
                    Some(
                        TokenKind::Number
                        | TokenKind::String
                        | TokenKind::System(_)
                        | TokenKind::Identifier
                        | TokenKind::Keyword(KeywordId::True | KeywordId::False),
                    ) => values.extend(self.bump(node)),
                    _ => return Err(self.error_expected("initial value")),
                }
            }
            let close = self.expect_kind(node, TokenKind::Operator(OperatorId::Greater))?;
            if values.len() == before {
                self.report(errors::empty_initial_value(open.spanning(&close.position())));
            }
            groups += 1;
        }

        if groups == 0 {
            return Err(self.error_expected("<"));
        }
        typed.initial_values = values;
        Ok(())
    }

    /// Attribute lists on a declaration, e.g. `(EM=99.99)` or `(HD='Name')`.
    fn declaration_attributes(&mut self, node: NodeId, scope: VariableScope) {
        let start = self.tokens.offset();
        self.bump_parenthesized(node);
        let end = self.tokens.offset();
        if scope != VariableScope::Parameter {
            return;
        }
        let offending = self
            .tokens
            .subrange(start, end.saturating_sub(1))
            .iter()
            .find(|token| {
                token.kind == TokenKind::EditMask
                    || (token.kind == TokenKind::Identifier
                        && matches!(token.symbol_name().as_str(), "EM" | "HD" | "PM"))
            })
            .map(Token::position);
        if let Some(position) = offending {
            self.report(errors::em_hd_pm_not_allowed_in_scope(&scope.to_string(), position));
        }
    }

    /// Validate a declared type and fold `DYNAMIC` into it.
    fn check_data_type(
        &mut self,
        name: &Token,
        mut ty: DataType,
        dynamic: Option<&Token>,
        position: Position,
        in_view: bool,
    ) -> DataType {
        if let Some(dynamic) = dynamic {
            if !ty.format.can_be_dynamic() {
                self.report(errors::invalid_data_type_for_dynamic_length(dynamic.position()));
            } else if ty.length > 0 {
                self.report(errors::dynamic_and_fixed_length(dynamic.position()));
            }
            ty.dynamic = true;
            ty.length = 0;
            ty.decimals = 0;
            return ty;
        }

        if ty.length == 0 && ty.decimals == 0 {
            if ty.format.can_have_user_defined_length() && !in_view {
                self.report(errors::variable_length_missing(&name.symbol_name(), position));
            }
            return ty;
        }

        if let Some(message) = invalid_length(&ty) {
            self.report(errors::invalid_length_for_data_type(&message, position));
        }
        ty
    }

    /// NPP006: every initial value must fit the variable's format.
    fn check_initial_values(&mut self, typed: &TypedVariable) {
        for value in &typed.initial_values {
            if let Some(expected) = expected_literal(&typed.ty, value) {
                self.report(errors::initial_value_type_mismatch(expected, value.position()));
                return;
            }
        }
    }

    // ========================================================================
    // REDEFINE and FILLER
    // ========================================================================

    fn redefinition(&mut self, parent: NodeId, level: u32, scope: VariableScope) -> PResult<NodeId> {
        let Some(target_name) = self.tokens.peek(2).map(|token| token.with_kind(TokenKind::Identifier)) else {
            self.bump(parent);
            self.bump(parent);
            return Err(self.error_at_end("redefinition target"));
        };
        let name = target_name.symbol_name();
        let target = self.declared.iter().rev().copied().find(|candidate| {
            self.tree
                .variable(*candidate)
                .is_some_and(|variable| variable.name == name && variable.level == level && !variable.is_redefinition())
        });

        let variable = Variable::new(
            target_name.clone(),
            level,
            scope,
            VariableKind::Redefinition {
                target,
                filler_bytes: 0,
            },
        );
        let node = self.tree.alloc(NodeKind::Variable(Box::new(variable)), Some(parent));
        self.bump(node);
        self.bump(node);
        self.expect_identifier(node)?;

        if target.is_none() {
            self.report(errors::no_target_variable_for_redefine_found(&name, target_name.position()));
        }
        self.declared.push(node);
        Ok(node)
    }

    /// `level FILLER nX` inside a redefinition.
    fn filler(&mut self, parent: NodeId) -> PResult<()> {
        self.bump(parent);
        let filler = self.bump(parent);
        if !self.tree.variable(parent).is_some_and(Variable::is_redefinition) {
            if let Some(filler) = filler {
                self.report(errors::unexpected_token("variable name", &filler.text, filler.position()));
            }
        }

        let Some(size) = self.current().cloned() else {
            return Err(self.error_at_end("filler length"));
        };
        match size.kind {
            TokenKind::OperandSkip => {
                self.bump(parent);
                let bytes = size.text.trim_end_matches(['X', 'x']).parse::<u32>().unwrap_or(0);
                if let Some(VariableKind::Redefinition { filler_bytes, .. }) =
                    self.tree.variable_mut(parent).map(|variable| &mut variable.kind)
                {
                    *filler_bytes += bytes;
                }
                Ok(())
            }
            TokenKind::Number => {
                self.bump(parent);
                self.report(errors::filler_missing_x(size.position()));
                Ok(())
            }
            _ => Err(self.error_expected("filler length")),
        }
    }

    // ========================================================================
    // Views
    // ========================================================================

    fn load_view_definition(&mut self, view: NodeId, ddm: &Token) {
        let name = ddm.symbol_name();
        match self.provider.find_record_definition(&name) {
            Some(definition) => self.view_definitions.push((view, definition)),
            None => {
                tracing::trace!(ddm = %name, "record definition not found");
                if !is_copycode_parameter(&name) {
                    self.report(errors::unresolved_module(&name, ddm.position()));
                }
            }
        }
    }

    /// The record definition of the view `node` is (indirectly) a member of.
    fn view_definition_of(&self, node: NodeId) -> Option<std::sync::Arc<RecordDefinition>> {
        let view = self.tree.ancestors(node).find(|ancestor| {
            self.tree
                .variable(*ancestor)
                .is_some_and(|variable| matches!(variable.kind, VariableKind::View { .. }))
        })?;
        self.view_definitions
            .iter()
            .find(|(candidate, _)| *candidate == view)
            .map(|(_, definition)| std::sync::Arc::clone(definition))
    }

    /// Kind of a view member, checked against its DDM field.
    ///
    /// ## Returns
    /// - `None` if the member keeps its declared type.
    fn view_member_kind(
        &mut self,
        node: NodeId,
        name: &Token,
        declared: Option<DataType>,
        dimensions: &mut Vec<ArrayDimension>,
    ) -> Option<VariableKind> {
        let definition = self.view_definition_of(node)?;
        let upper = name.symbol_name();
        let (field_name, counter) = match upper.strip_prefix("C*") {
            Some(stripped) => (stripped, true),
            None => (upper.as_str(), false),
        };

        let Some(field) = definition.find_field(field_name) else {
            self.report(errors::field_not_in_record_definition(
                field_name,
                &definition.name,
                name.position(),
            ));
            return declared.is_none().then_some(VariableKind::Group);
        };
        if counter {
            return Some(VariableKind::Typed(TypedVariable::new(DataType::fixed(DataFormat::Integer, 4))));
        }

        if dimensions.is_empty() && definition.is_repeating(field) {
            dimensions.push(ArrayDimension {
                lower: Bound::Value(1),
                upper: Bound::Value(199),
                position: name.position(),
            });
        }

        if field.is_group() {
            return declared.is_none().then_some(VariableKind::Group);
        }
        let ddm_type = field.data_type()?;
        match declared {
            None => Some(VariableKind::Typed(TypedVariable::new(ddm_type))),
            Some(ty) => {
                if !matches_record_type(&ty, &ddm_type) {
                    self.report(errors::type_mismatch(
                        &format!(
                            "Type mismatch: {upper} is declared as ({ty}) but DDM {} defines ({ddm_type})",
                            definition.name
                        ),
                        name.position(),
                    ));
                }
                None
            }
        }
    }

    // ========================================================================
    // Whole-block checks
    // ========================================================================

    fn check_define_data(&mut self, define_data: NodeId) {
        let variables: Vec<NodeId> = self
            .tree
            .descendants(define_data)
            .into_iter()
            .filter(|node| self.tree.variable(*node).is_some())
            .collect();

        self.check_duplicates(&variables);
        for &variable in &variables {
            let Some(declared) = self.tree.variable(variable) else {
                continue;
            };
            if self.is_imported(variable) {
                continue;
            }
            match &declared.kind {
                VariableKind::Group => self.check_group(variable),
                VariableKind::Redefinition { .. } => self.check_redefinition(variable),
                _ => {}
            }
        }
    }

    /// Return `true` for variables that come from a `USING` data area.
    fn is_imported(&self, node: NodeId) -> bool {
        self.tree
            .ancestors(node)
            .any(|ancestor| matches!(self.tree.kind(ancestor), NodeKind::Using { .. }))
    }

    fn check_duplicates(&mut self, variables: &[NodeId]) {
        let mut seen = BTreeSet::new();
        for &variable in variables {
            if self.tree.variable(variable).is_none_or(Variable::is_redefinition) {
                continue;
            }
            let Some(qualified) = self.tree.qualified_name(variable).map(str::to_string) else {
                continue;
            };
            if !seen.insert(qualified.clone()) && !self.is_imported(variable) {
                if let Some(position) = self.tree.variable(variable).map(|v| v.declaration.position()) {
                    self.report(errors::duplicated_symbol(&qualified, position));
                }
            }
        }
    }

    fn check_group(&mut self, group: NodeId) {
        let Some(variable) = self.tree.variable(group) else {
            return;
        };
        let name = variable.name.clone();
        let position = variable.declaration.position();
        let members: Vec<&Variable> = self
            .tree
            .child_nodes(group)
            .filter_map(|child| self.tree.variable(child))
            .collect();

        if members.is_empty() {
            if !self.tree.is_in_view(group) {
                self.report(errors::group_cannot_be_empty(&name, position));
            }
            return;
        }

        let typed: Vec<&TypedVariable> = members.iter().filter_map(|member| member.typed()).collect();
        let constants = typed.iter().filter(|member| member.constant).count();
        if constants > 0 && constants < typed.len() {
            self.report(errors::group_has_mixed_const(&name, position));
        }
    }

    fn check_redefinition(&mut self, redefinition: NodeId) {
        let Some(variable) = self.tree.variable(redefinition) else {
            return;
        };
        let VariableKind::Redefinition {
            target: Some(target),
            filler_bytes,
        } = variable.kind
        else {
            return;
        };
        let name = variable.name.clone();
        let position = variable.declaration.position();
        let Some(target_variable) = self.tree.variable(target) else {
            return;
        };

        if target_variable.dimensions.iter().any(ArrayDimension::is_unbound) {
            self.report(errors::redefine_target_cant_be_x_array(&name, position));
            return;
        }
        if target_variable.data_type().is_some_and(|ty| ty.dynamic) {
            self.report(errors::redefine_target_cant_be_dynamic(&name, position));
            return;
        }
        let dynamic_member = self
            .tree
            .descendants(target)
            .into_iter()
            .skip(1)
            .filter_map(|node| self.tree.variable(node))
            .find(|member| member.data_type().is_some_and(|ty| ty.dynamic))
            .map(|member| member.name.clone());
        if let Some(member) = dynamic_member {
            self.report(errors::redefine_target_cant_contain_dynamic(&name, &member, position));
            return;
        }

        // Bounds too wide to count leave the layout unknown.
        let (Some(target_size), Some(members)) = (self.byte_length(target), self.members_byte_length(redefinition))
        else {
            return;
        };
        let total = filler_bytes.saturating_add(members);
        if total > target_size {
            self.report(errors::redefine_length_exceeds_target_length(
                &name,
                total,
                target_size,
                position,
            ));
        }
    }

    /// Bytes a variable occupies; arrays count every occurrence. `None` if an occurrence count overflows.
    fn byte_length(&self, node: NodeId) -> Option<u32> {
        let Some(variable) = self.tree.variable(node) else {
            return Some(0);
        };
        match &variable.kind {
            VariableKind::Typed(typed) => {
                let mut occurrences: i64 = 1;
                for dimension in &variable.dimensions {
                    let count = match dimension.occurrences() {
                        Some(count) => count.max(1),
                        None if dimension.is_fixed() => return None,
                        None => 1,
                    };
                    occurrences = occurrences.checked_mul(count)?;
                }
                let occurrences = u32::try_from(occurrences).unwrap_or(u32::MAX);
                Some(typed.ty.byte_size().saturating_mul(occurrences))
            }
            VariableKind::Group | VariableKind::View { .. } => self.members_byte_length(node),
            VariableKind::Redefinition { .. } => Some(0),
        }
    }

    /// Sum of the direct members, leaving nested redefinitions out.
    fn members_byte_length(&self, node: NodeId) -> Option<u32> {
        self.tree
            .child_nodes(node)
            .filter(|child| self.tree.variable(*child).is_some_and(|v| !v.is_redefinition()))
            .try_fold(0u32, |total, child| Some(total.saturating_add(self.byte_length(child)?)))
    }
}

/// NPP025 message for a length the format does not allow.
fn invalid_length(ty: &DataType) -> Option<String> {
    let format = ty.format.identifier();
    match ty.format {
        DataFormat::Integer if !matches!(ty.length, 1 | 2 | 4) || ty.decimals > 0 => {
            Some(format!("Length of format {format} must be 1, 2 or 4"))
        }
        DataFormat::Float if !matches!(ty.length, 4 | 8) || ty.decimals > 0 => {
            Some(format!("Length of format {format} must be 4 or 8"))
        }
        DataFormat::Numeric | DataFormat::Packed => {
            let digits = ty.length + u32::from(ty.decimals);
            if ty.decimals > 7 {
                Some(format!("Format {format} allows at most 7 decimal digits"))
            } else if !(1..=29).contains(&digits) {
                Some(format!("Format {format} allows 1 to 29 digits"))
            } else {
                None
            }
        }
        DataFormat::Alphanumeric | DataFormat::Binary | DataFormat::Unicode
            if ty.length > ONE_GIGABYTE || ty.decimals > 0 =>
        {
            Some(format!("Length of format {format} must be between 1 and {ONE_GIGABYTE}"))
        }
        DataFormat::Control | DataFormat::Date | DataFormat::Logic | DataFormat::Time => {
            Some(format!("Format {format} takes no length"))
        }
        _ => None,
    }
}

/// What `value` should have been for a variable of type `ty`, if it doesn't fit.
fn expected_literal(ty: &DataType, value: &Token) -> Option<&'static str> {
    let kind = value.kind;
    let is_system = matches!(kind, TokenKind::System(_));
    match ty.format {
        DataFormat::Alphanumeric | DataFormat::Unicode => {
            (!matches!(kind, TokenKind::String) && !is_system).then_some("alphanumeric")
        }
        DataFormat::Binary => (!matches!(kind, TokenKind::String | TokenKind::Number) && !is_system).then_some("binary"),
        DataFormat::Numeric | DataFormat::Packed | DataFormat::Integer | DataFormat::Float => {
            (!matches!(kind, TokenKind::Number) && !is_system).then_some("numeric")
        }
        DataFormat::Logic => {
            (!matches!(kind, TokenKind::Keyword(KeywordId::True | KeywordId::False))).then_some("logical")
        }
        DataFormat::Date | DataFormat::Time => {
            matches!(kind, TokenKind::Keyword(KeywordId::True | KeywordId::False)).then_some("a date or time")
        }
        DataFormat::Control | DataFormat::None => None,
    }
}

/// Return `true` if a view member declared as `declared` matches the DDM field type.
///
/// Date and logic fields only need the same format.
fn matches_record_type(declared: &DataType, field: &DataType) -> bool {
    if declared.format != field.format {
        return false;
    }
    if matches!(declared.format, DataFormat::Date | DataFormat::Logic) {
        return true;
    }
    declared.dynamic == field.dynamic && declared.length == field.length && declared.decimals == field.decimals
}

/// `&1&`-style names are substituted when a copycode is included and can't be looked up.
fn is_copycode_parameter(name: &str) -> bool {
    name.starts_with('&') && name.ends_with('&') && name.len() > 2
}
