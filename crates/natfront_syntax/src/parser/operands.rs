/// Operand, arithmetic and condition grammar.
///
/// Operands are the leaves statements work on: literals, variable references (optionally indexed), system
/// variables and functions, function calls and labels. Arithmetic is left-associative without precedence, which is
/// all the front end needs to type the result. Conditions support `AND`/`OR`/`NOT`, parentheses, `THRU` ranges and
/// the extended form `#A = 1 OR = 2`.
impl<'p> Parser<'p> {
    // ========================================================================
    // Operands
    // ========================================================================

    /// Return `true` if the current token can start an operand without being a keyword.
    fn can_start_operand(&self) -> bool {
        match self.peek_kind(0) {
            Some(
                TokenKind::Identifier
                | TokenKind::Number
                | TokenKind::String
                | TokenKind::System(_)
                | TokenKind::LabelIdentifier
                | TokenKind::Keyword(KeywordId::True | KeywordId::False),
            ) => true,
            Some(TokenKind::Keyword(KeywordId::Val | KeywordId::Abs | KeywordId::Pos)) => {
                self.check_punct_at(1, PunctuationId::LParen)
            }
            _ => false,
        }
    }

    /// Parse one operand below `parent`.
    fn operand(&mut self, parent: NodeId) -> PResult<NodeId> {
        let Some(token) = self.current().cloned() else {
            return Err(self.error_at_end("operand"));
        };
        match token.kind {
            TokenKind::Number | TokenKind::String | TokenKind::Keyword(KeywordId::True | KeywordId::False) => {
                let node = self.tree.alloc(NodeKind::Literal(token), Some(parent));
                self.bump(node);
                Ok(node)
            }
            TokenKind::Keyword(KeywordId::Mask | KeywordId::Scan) => {
                let node = self.tree.alloc(NodeKind::Literal(token), Some(parent));
                self.bump(node);
                if self.check_punct(PunctuationId::LParen) {
                    self.bump_parenthesized(node);
                }
                Ok(node)
            }
            TokenKind::System(id) => self.system_operand(parent, id),
            TokenKind::Keyword(function @ (KeywordId::Val | KeywordId::Abs | KeywordId::Pos))
                if self.check_punct_at(1, PunctuationId::LParen) =>
            {
                self.intrinsic(parent, function)
            }
            TokenKind::LabelIdentifier => {
                let node = self.tree.alloc(NodeKind::LabelReference(token), Some(parent));
                self.bump(node);
                Ok(node)
            }
            TokenKind::Punctuation(PunctuationId::LParen) if !self.is_attribute_list_at(0) => {
                self.bump(parent);
                let inner = self.arithmetic(parent)?;
                self.expect_punct(parent, PunctuationId::RParen)?;
                Ok(inner)
            }
            kind if kind.can_be_identifier() => {
                if self.is_function_call() {
                    self.function_call(parent)
                } else {
                    self.variable_reference(parent)
                }
            }
            _ => {
                self.report(errors::expected_operand(&token.text, token.position()));
                Err(ParseError { token: Some(token) })
            }
        }
    }

    /// Parse an operand followed by any number of `op operand` pairs.
    fn arithmetic(&mut self, parent: NodeId) -> PResult<NodeId> {
        let lhs = self.operand(parent)?;
        self.continue_arithmetic(parent, lhs)
    }

    fn continue_arithmetic(&mut self, parent: NodeId, mut lhs: NodeId) -> PResult<NodeId> {
        while let Some(op) = self.arithmetic_operator() {
            let node = self.tree.alloc(NodeKind::Arithmetic { lhs, op, rhs: lhs }, Some(parent));
            self.tree.reparent(lhs, node);
            self.bump(node);
            let rhs = self.operand(node)?;
            if let NodeKind::Arithmetic { rhs: slot, .. } = self.tree.kind_mut(node) {
                *slot = rhs;
            }
            lhs = node;
        }
        Ok(lhs)
    }

    fn arithmetic_operator(&self) -> Option<OperatorId> {
        match self.peek_kind(0)? {
            TokenKind::Operator(
                id @ (OperatorId::Plus
                | OperatorId::Minus
                | OperatorId::Asterisk
                | OperatorId::Slash
                | OperatorId::Exponent),
            ) => Some(id),
            _ => None,
        }
    }

    /// `#NAME` or `#NAME(index, lower:upper, *)`.
    fn variable_reference(&mut self, parent: NodeId) -> PResult<NodeId> {
        let Some(name) = self.current().map(|token| token.with_kind(TokenKind::Identifier)) else {
            return Err(self.error_at_end("identifier"));
        };
        let node = self.tree.alloc(
            NodeKind::VariableReference {
                name,
                indices: Vec::new(),
                reference: None,
            },
            Some(parent),
        );
        self.bump_as(node, TokenKind::Identifier);
        self.unresolved.push(node);

        if self.check_punct(PunctuationId::LParen) && !self.is_attribute_list_at(0) {
            let indices = self.array_indices(node)?;
            if let NodeKind::VariableReference { indices: slot, .. } = self.tree.kind_mut(node) {
                *slot = indices;
            }
        }
        Ok(node)
    }

    fn array_indices(&mut self, reference: NodeId) -> PResult<Vec<NodeId>> {
        self.expect_punct(reference, PunctuationId::LParen)?;
        let mut indices = Vec::new();
        loop {
            indices.push(self.array_index(reference)?);
            if !self.match_punct(reference, PunctuationId::Comma) {
                break;
            }
        }
        self.expect_punct(reference, PunctuationId::RParen)?;
        Ok(indices)
    }

    /// One index: an expression, `*`, or `lower:upper` where either side may be `*`.
    fn array_index(&mut self, reference: NodeId) -> PResult<NodeId> {
        let lower = if self.check_op(OperatorId::Asterisk) {
            None
        } else {
            Some(self.arithmetic(reference)?)
        };

        if let Some(index) = lower {
            if !self.check_punct(PunctuationId::Colon) {
                return Ok(index);
            }
        }

        let range = self.tree.alloc(NodeKind::RangedAccess { lower, upper: None }, Some(reference));
        match lower {
            Some(lower) => self.tree.reparent(lower, range),
            None => {
                self.bump(range);
            }
        }
        if self.match_punct(range, PunctuationId::Colon) {
            let upper = if self.match_op(range, OperatorId::Asterisk) {
                None
            } else {
                Some(self.arithmetic(range)?)
            };
            if let NodeKind::RangedAccess { upper: slot, .. } = self.tree.kind_mut(range) {
                *slot = upper;
            }
        }
        Ok(range)
    }

    fn system_operand(&mut self, parent: NodeId, id: SystemId) -> PResult<NodeId> {
        let takes_arguments = system::info_for(id).is_function()
            && self.check_punct_at(1, PunctuationId::LParen)
            && !self.is_attribute_list_at(1);
        if !takes_arguments {
            let node = self.tree.alloc(NodeKind::SystemVariable(id), Some(parent));
            self.bump(node);
            return Ok(node);
        }

        let node = self.tree.alloc(
            NodeKind::SystemFunction {
                function: id,
                arguments: Vec::new(),
            },
            Some(parent),
        );
        self.bump(node);
        self.bump(node);
        let mut arguments = Vec::new();
        while !self.is_at_end() && !self.check_punct(PunctuationId::RParen) {
            if self.is_attribute_list_at(0) {
                self.bump_parenthesized(node);
            } else if self.current().is_some_and(is_function_option) {
                self.bump(node);
            } else {
                arguments.push(self.arithmetic(node)?);
            }
            self.match_punct(node, PunctuationId::Comma);
        }
        self.expect_punct(node, PunctuationId::RParen)?;
        if let NodeKind::SystemFunction { arguments: slot, .. } = self.tree.kind_mut(node) {
            *slot = arguments;
        }
        Ok(node)
    }

    fn intrinsic(&mut self, parent: NodeId, function: KeywordId) -> PResult<NodeId> {
        let node = self.tree.alloc(
            NodeKind::Intrinsic {
                function,
                argument: None,
            },
            Some(parent),
        );
        self.bump(node);
        self.expect_punct(node, PunctuationId::LParen)?;
        let argument = self.arithmetic(node)?;
        self.expect_punct(node, PunctuationId::RParen)?;
        if let NodeKind::Intrinsic { argument: slot, .. } = self.tree.kind_mut(node) {
            *slot = Some(argument);
        }
        Ok(node)
    }

    /// `NAME(<arg, ...>)` with an optional `(format)` cast.
    fn function_call(&mut self, parent: NodeId) -> PResult<NodeId> {
        let Some(name) = self.current().map(|token| token.with_kind(TokenKind::Identifier)) else {
            return Err(self.error_at_end("function name"));
        };
        let node = self.tree.alloc(
            NodeKind::FunctionCall {
                name: name.clone(),
                module: None,
                arguments: Vec::new(),
            },
            Some(parent),
        );
        self.bump_as(node, TokenKind::Identifier);
        let module = self.sideload_module(&name, &name.symbol_name());

        self.expect_punct(node, PunctuationId::LParen)?;
        let mut arguments = Vec::new();
        if !self.match_op(node, OperatorId::NotEqual) {
            self.expect_kind(node, TokenKind::Operator(OperatorId::Less))?;
            while !self.is_at_end() && !self.check_op(OperatorId::Greater) {
                if self.is_attribute_list_at(0) {
                    self.bump_parenthesized(node);
                } else {
                    arguments.push(self.arithmetic(node)?);
                }
                self.match_punct(node, PunctuationId::Comma);
            }
            self.expect_kind(node, TokenKind::Operator(OperatorId::Greater))?;
        }
        self.expect_punct(node, PunctuationId::RParen)?;

        if self.check_punct(PunctuationId::LParen)
            && self.peek_kind(1) == Some(TokenKind::Identifier)
            && self.check_punct_at(2, PunctuationId::RParen)
        {
            self.bump_parenthesized(node);
        }

        if let NodeKind::FunctionCall {
            module: module_slot,
            arguments: arguments_slot,
            ..
        } = self.tree.kind_mut(node)
        {
            *module_slot = module;
            *arguments_slot = arguments;
        }
        Ok(node)
    }

    // ========================================================================
    // Conditions
    // ========================================================================

    /// Parse a logical condition below `parent`.
    fn condition(&mut self, parent: NodeId) -> PResult<NodeId> {
        let mut lhs = self.condition_term(parent)?;
        loop {
            let op = if self.check_keyword(KeywordId::And) {
                KeywordId::And
            } else if self.check_keyword(KeywordId::Or) {
                KeywordId::Or
            } else {
                break;
            };
            let node = self.tree.alloc(NodeKind::Logical { op, lhs, rhs: lhs }, Some(parent));
            self.tree.reparent(lhs, node);
            self.bump(node);
            let rhs = self.condition_term(node)?;
            if let NodeKind::Logical { rhs: slot, .. } = self.tree.kind_mut(node) {
                *slot = rhs;
            }
            lhs = node;
        }
        Ok(lhs)
    }

    fn condition_term(&mut self, parent: NodeId) -> PResult<NodeId> {
        if self.check_keyword(KeywordId::Not) {
            let node = self.tree.alloc(NodeKind::Negation { operand: parent }, Some(parent));
            self.bump(node);
            let operand = self.condition_term(node)?;
            if let NodeKind::Negation { operand: slot } = self.tree.kind_mut(node) {
                *slot = operand;
            }
            return Ok(node);
        }

        if self.check_punct(PunctuationId::LParen) && !self.is_attribute_list_at(0) {
            self.bump(parent);
            let inner = self.condition(parent)?;
            self.expect_punct(parent, PunctuationId::RParen)?;
            let lhs = self.continue_arithmetic(parent, inner)?;
            return self.relational_tail(parent, lhs);
        }

        let lhs = self.arithmetic(parent)?;
        self.relational_tail(parent, lhs)
    }

    /// Everything after the left operand of a condition: a comparison, a `THRU` range, extended `OR` values, or
    /// a test such as `SPECIFIED`.
    fn relational_tail(&mut self, parent: NodeId, lhs: NodeId) -> PResult<NodeId> {
        let Some(op) = self.check_comparison() else {
            if self.current().is_some_and(is_condition_test) {
                self.bump(parent);
                if self.check_punct(PunctuationId::LParen) {
                    self.bump_parenthesized(parent);
                }
            }
            return Ok(lhs);
        };

        let node = self.tree.alloc(NodeKind::Relational { lhs, op, rhs: lhs }, Some(parent));
        self.tree.reparent(lhs, node);
        let equal_word = self.check_keyword(KeywordId::Equal);
        self.bump(node);
        if equal_word {
            self.match_keyword(node, KeywordId::To);
        }
        let rhs = self.arithmetic(node)?;
        if let NodeKind::Relational { rhs: slot, .. } = self.tree.kind_mut(node) {
            *slot = rhs;
        }
        self.range_tail(node)?;

        while self.check_keyword(KeywordId::Or) && self.is_extended_relational() {
            self.bump(node);
            if self.check_comparison().is_some() {
                self.bump(node);
            }
            self.arithmetic(node)?;
            self.range_tail(node)?;
        }
        Ok(node)
    }

    /// `THRU upper [BUT NOT value]`.
    fn range_tail(&mut self, node: NodeId) -> PResult<()> {
        if self.match_keyword(node, KeywordId::Thru) {
            self.arithmetic(node)?;
            if self.current().is_some_and(|token| token.symbol_name() == "BUT") {
                self.bump(node);
                self.match_keyword(node, KeywordId::Not);
                self.arithmetic(node)?;
            }
        }
        Ok(())
    }

    /// After `OR`: does another value for the same left operand follow (`OR = 2`, `OR 'B'`)?
    fn is_extended_relational(&self) -> bool {
        match self.peek_kind(1) {
            Some(TokenKind::Operator(id)) => operators::is_comparison(id),
            Some(TokenKind::Keyword(id)) => operators::relational_keyword(id).is_some(),
            Some(TokenKind::Number | TokenKind::String) => {
                !matches!(self.peek_kind(2), Some(TokenKind::Operator(id)) if operators::is_comparison(id))
            }
            _ => false,
        }
    }
}

/// Option words inside system function arguments (`*TRIM(#A, LEADING)`, `*TRANSLATE(#A, UPPER)`).
fn is_function_option(token: &Token) -> bool {
    token.kind == TokenKind::Identifier
        && matches!(token.symbol_name().as_str(), "LEADING" | "TRAILING" | "UPPER" | "LOWER")
}

/// Unary condition tests following an operand.
fn is_condition_test(token: &Token) -> bool {
    token.kind == TokenKind::Identifier
        && matches!(token.symbol_name().as_str(), "SPECIFIED" | "MODIFIED" | "IS")
}
