pub mod ast;
mod types;

use crate::diagnostics::LintError;
use crate::lexer::{self, token::Token};
use crate::span::{Span, Spanned};
use ast::*;

/// Lex and parse a source unit into a finished, parent-linked tree.
pub fn parse(source: &str) -> Result<SyntaxTree, LintError> {
    let tokens = lexer::lex(source)?;
    let mut parser = Parser::new(&tokens, source);
    parser.parse_program()
}

enum BinOpKind {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

fn binary_op(tok: &Token) -> Option<(u8, BinOpKind)> {
    let entry = match tok {
        Token::PipePipe => (1, BinOpKind::Logical(LogicalOp::Or)),
        Token::QuestionQuestion => (1, BinOpKind::Logical(LogicalOp::Nullish)),
        Token::AmpAmp => (2, BinOpKind::Logical(LogicalOp::And)),
        Token::EqEq => (3, BinOpKind::Binary(BinaryOp::Eq)),
        Token::BangEq => (3, BinOpKind::Binary(BinaryOp::Neq)),
        Token::EqEqEq => (3, BinOpKind::Binary(BinaryOp::StrictEq)),
        Token::BangEqEq => (3, BinOpKind::Binary(BinaryOp::StrictNeq)),
        Token::Lt => (4, BinOpKind::Binary(BinaryOp::Lt)),
        Token::Gt => (4, BinOpKind::Binary(BinaryOp::Gt)),
        Token::LtEq => (4, BinOpKind::Binary(BinaryOp::LtEq)),
        Token::GtEq => (4, BinOpKind::Binary(BinaryOp::GtEq)),
        Token::Plus => (5, BinOpKind::Binary(BinaryOp::Add)),
        Token::Minus => (5, BinOpKind::Binary(BinaryOp::Sub)),
        Token::Star => (6, BinOpKind::Binary(BinaryOp::Mul)),
        Token::Slash => (6, BinOpKind::Binary(BinaryOp::Div)),
        Token::Percent => (6, BinOpKind::Binary(BinaryOp::Mod)),
        _ => return None,
    };
    Some(entry)
}

/// Precedence of `as` / `satisfies`, which sit with the relational operators.
const TYPE_ASSERTION_PREC: u8 = 4;

pub struct Parser<'a> {
    tokens: &'a [Spanned<Token>],
    source: &'a str,
    pos: usize,
    builder: TreeBuilder,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Spanned<Token>], source: &'a str) -> Self {
        Self { tokens, source, pos: 0, builder: TreeBuilder::new() }
    }

    // ---- token cursor ----

    fn next_significant(&self, from: usize) -> Option<usize> {
        let mut i = from;
        while i < self.tokens.len() {
            if matches!(self.tokens[i].node, Token::Newline) {
                i += 1;
            } else {
                return Some(i);
            }
        }
        None
    }

    fn peek_index(&self) -> Option<usize> {
        self.next_significant(self.pos)
    }

    fn peek(&self) -> Option<&'a Spanned<Token>> {
        let tokens = self.tokens;
        self.peek_index().map(|i| &tokens[i])
    }

    /// The `n`th significant token after the current one (0 = `peek`).
    fn peek_nth(&self, n: usize) -> Option<&'a Spanned<Token>> {
        let tokens = self.tokens;
        let mut i = self.peek_index()?;
        for _ in 0..n {
            i = self.next_significant(i + 1)?;
        }
        Some(&tokens[i])
    }

    fn peek_raw(&self) -> Option<&'a Spanned<Token>> {
        let tokens = self.tokens;
        tokens.get(self.pos)
    }

    /// The raw token right after `peek`, newlines included.
    fn peek_raw_after(&self) -> Option<&'a Spanned<Token>> {
        let tokens = self.tokens;
        self.peek_index().and_then(|i| tokens.get(i + 1))
    }

    fn skip_newlines(&mut self) {
        while self.pos < self.tokens.len() && matches!(self.tokens[self.pos].node, Token::Newline) {
            self.pos += 1;
        }
    }

    fn bump(&mut self) -> Option<&'a Spanned<Token>> {
        self.skip_newlines();
        let tokens = self.tokens;
        let tok = tokens.get(self.pos)?;
        self.pos += 1;
        Some(tok)
    }

    fn check(&self, expected: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(&t.node) == std::mem::discriminant(expected))
    }

    fn check_raw(&self, expected: &Token) -> bool {
        self.peek_raw()
            .is_some_and(|t| std::mem::discriminant(&t.node) == std::mem::discriminant(expected))
    }

    fn nth_is(&self, n: usize, expected: &Token) -> bool {
        self.peek_nth(n)
            .is_some_and(|t| std::mem::discriminant(&t.node) == std::mem::discriminant(expected))
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<Span, LintError> {
        match self.peek() {
            Some(tok) if std::mem::discriminant(&tok.node) == std::mem::discriminant(expected) => {
                self.bump();
                Ok(tok.span)
            }
            Some(tok) => Err(LintError::syntax(
                format!("expected {expected}, found {}", tok.node),
                tok.span,
            )),
            None => Err(LintError::syntax(
                format!("expected {expected}, found end of file"),
                self.eof_span(),
            )),
        }
    }

    fn text(&self, tok: &Spanned<Token>) -> &'a str {
        &self.source[tok.span.start..tok.span.end]
    }

    fn ident_is(&self, tok: Option<&Spanned<Token>>, word: &str) -> bool {
        tok.is_some_and(|t| matches!(t.node, Token::Ident) && self.text(t) == word)
    }

    fn check_ident(&self, word: &str) -> bool {
        self.ident_is(self.peek(), word)
    }

    fn nth_is_ident(&self, n: usize, word: &str) -> bool {
        self.ident_is(self.peek_nth(n), word)
    }

    fn expect_ident(&mut self) -> Result<(String, Span), LintError> {
        match self.peek() {
            Some(tok) if matches!(tok.node, Token::Ident) => {
                self.bump();
                Ok((self.text(tok).to_string(), tok.span))
            }
            Some(tok) => Err(LintError::syntax(
                format!("expected identifier, found {}", tok.node),
                tok.span,
            )),
            None => Err(LintError::syntax(
                "expected identifier, found end of file",
                self.eof_span(),
            )),
        }
    }

    /// Member and property names also accept reserved words and string/number keys.
    fn expect_property_name(&mut self) -> Result<(String, Span), LintError> {
        match self.peek() {
            Some(tok) => {
                let name = match &tok.node {
                    Token::Ident => self.text(tok).to_string(),
                    Token::StringLit(s) => s.clone(),
                    Token::Number(_) => self.text(tok).to_string(),
                    _ if lexer::is_keyword(self.text(tok)) => self.text(tok).to_string(),
                    other => {
                        return Err(LintError::syntax(
                            format!("expected property name, found {other}"),
                            tok.span,
                        ));
                    }
                };
                self.bump();
                Ok((name, tok.span))
            }
            None => Err(LintError::syntax(
                "expected property name, found end of file",
                self.eof_span(),
            )),
        }
    }

    fn eof_span(&self) -> Span {
        if let Some(last) = self.tokens.last() {
            Span::new(last.span.end, last.span.end)
        } else {
            Span::dummy()
        }
    }

    /// End offset of the most recently consumed token.
    fn prev_end(&self) -> usize {
        self.tokens[..self.pos]
            .iter()
            .rev()
            .find(|t| !matches!(t.node, Token::Newline))
            .map(|t| t.span.end)
            .unwrap_or(0)
    }

    fn unexpected(&self, what: &str) -> LintError {
        match self.peek() {
            Some(tok) => LintError::syntax(format!("expected {what}, found {}", tok.node), tok.span),
            None => LintError::syntax(format!("expected {what}, found end of file"), self.eof_span()),
        }
    }

    fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.builder.alloc(kind, span)
    }

    fn span_of(&self, id: NodeId) -> Span {
        self.builder.span(id)
    }

    fn ident_node(&mut self, name: String, span: Span) -> NodeId {
        self.alloc(NodeKind::Identifier { name, type_annotation: None }, span)
    }

    fn end_statement(&mut self) {
        self.eat(&Token::Semi);
    }

    /// Index of the `)` closing the `(` at `open`.
    fn matching_paren(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (i, tok) in self.tokens.iter().enumerate().skip(open) {
            match tok.node {
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Skip a balanced `open ... close` group starting at the next token.
    fn skip_balanced(&mut self, open: &Token, close: &Token) -> Result<(), LintError> {
        self.expect(open)?;
        let mut depth = 1usize;
        while depth > 0 {
            let tok = self.bump().ok_or_else(|| {
                LintError::syntax(format!("expected {close}, found end of file"), self.eof_span())
            })?;
            if std::mem::discriminant(&tok.node) == std::mem::discriminant(open) {
                depth += 1;
            } else if std::mem::discriminant(&tok.node) == std::mem::discriminant(close) {
                depth -= 1;
            }
        }
        Ok(())
    }

    // ---- statements ----

    pub fn parse_program(&mut self) -> Result<SyntaxTree, LintError> {
        let mut body = Vec::new();
        while self.peek().is_some() {
            body.push(self.parse_statement()?);
        }
        let root = self.alloc(NodeKind::Program { body }, Span::new(0, self.source.len()));
        Ok(std::mem::take(&mut self.builder).finish(root))
    }

    fn parse_statement(&mut self) -> Result<NodeId, LintError> {
        let tok = self.peek().ok_or_else(|| self.unexpected("statement"))?;
        let start = tok.span.start;
        match &tok.node {
            Token::LBrace => self.parse_block(),
            Token::Semi => {
                self.bump();
                Ok(self.alloc(NodeKind::EmptyStatement, tok.span))
            }
            Token::Const | Token::Let | Token::Var => {
                let decl = self.parse_variable_declaration(false, start)?;
                self.end_statement();
                Ok(decl)
            }
            Token::Function => self.parse_function_declaration(false, start),
            Token::Class => self.parse_class(false, start),
            Token::Return => self.parse_return(),
            Token::If => self.parse_if(),
            Token::While => self.parse_while(),
            Token::For => self.parse_for(),
            Token::Throw => {
                self.bump();
                let argument = self.parse_expression()?;
                self.end_statement();
                let span = Span::new(start, self.prev_end());
                Ok(self.alloc(NodeKind::ThrowStatement { argument }, span))
            }
            Token::Ident => match self.text(tok) {
                "async" if self.nth_is(1, &Token::Function) => {
                    self.bump();
                    self.parse_function_declaration(true, start)
                }
                "declare" if self.starts_declaration(1) => self.parse_declare(start),
                "export" => {
                    self.bump();
                    if self.check_ident("default") {
                        self.bump();
                    }
                    self.parse_statement()
                }
                "import" if !self.nth_is(1, &Token::LParen) && !self.nth_is(1, &Token::Dot) => {
                    self.skip_import(start)
                }
                "type" if self.nth_is(1, &Token::Ident) => self.parse_type_alias(start),
                "interface" if self.nth_is(1, &Token::Ident) => self.parse_interface(start),
                "abstract" if self.nth_is(1, &Token::Class) => {
                    self.bump();
                    self.parse_class(false, start)
                }
                "switch" if self.nth_is(1, &Token::LParen) => self.parse_switch(start),
                "do" if self.nth_is(1, &Token::LBrace) => self.parse_do_while(start),
                "try" if self.nth_is(1, &Token::LBrace) => self.parse_try(start),
                word @ ("break" | "continue")
                    if matches!(
                        self.peek_raw_after().map(|t| &t.node),
                        None | Some(Token::Newline | Token::Semi | Token::RBrace | Token::Ident)
                    ) =>
                {
                    self.parse_jump(word == "break", start)
                }
                _ if self.nth_is(1, &Token::Colon) => self.parse_labeled(start),
                _ => self.parse_expression_statement(),
            },
            _ => self.parse_expression_statement(),
        }
    }

    fn starts_declaration(&self, n: usize) -> bool {
        match self.peek_nth(n).map(|t| &t.node) {
            Some(Token::Const | Token::Let | Token::Var | Token::Function | Token::Class) => true,
            Some(Token::Ident) => {
                ["type", "interface", "module", "namespace", "global", "async", "abstract"]
                    .iter()
                    .any(|w| self.nth_is_ident(n, w))
            }
            _ => false,
        }
    }

    fn parse_declare(&mut self, start: usize) -> Result<NodeId, LintError> {
        self.bump(); // declare
        let tok = self.peek().ok_or_else(|| self.unexpected("declaration"))?;
        match &tok.node {
            Token::Const | Token::Let | Token::Var => {
                let decl = self.parse_variable_declaration(true, start)?;
                self.end_statement();
                Ok(decl)
            }
            Token::Function => self.parse_function_declaration(false, start),
            Token::Class => self.parse_class(true, start),
            _ if self.check_ident("async") => {
                self.bump();
                self.parse_function_declaration(true, start)
            }
            _ if self.check_ident("abstract") => {
                self.bump();
                self.parse_class(true, start)
            }
            _ if self.check_ident("type") => self.parse_type_alias(start),
            _ if self.check_ident("interface") => self.parse_interface(start),
            _ => {
                // `declare module "x" { ... }`, `declare global { ... }`: nothing to analyze
                while self.peek().is_some() && !self.check(&Token::LBrace) {
                    self.bump();
                }
                self.skip_balanced(&Token::LBrace, &Token::RBrace)?;
                Ok(self.alloc(NodeKind::EmptyStatement, Span::new(start, self.prev_end())))
            }
        }
    }

    fn skip_import(&mut self, start: usize) -> Result<NodeId, LintError> {
        self.bump(); // import
        while let Some(tok) = self.peek_raw() {
            match tok.node {
                Token::Semi => {
                    self.pos += 1;
                    break;
                }
                Token::Newline if !self.inside_import_braces(start) => break,
                _ => self.pos += 1,
            }
        }
        Ok(self.alloc(NodeKind::EmptyStatement, Span::new(start, self.prev_end())))
    }

    /// True while an `import { ... }` clause is still open.
    fn inside_import_braces(&self, start: usize) -> bool {
        let mut depth = 0i32;
        for tok in self.tokens[..self.pos].iter().rev() {
            if tok.span.start < start {
                break;
            }
            match tok.node {
                Token::LBrace => depth += 1,
                Token::RBrace => depth -= 1,
                _ => {}
            }
        }
        depth > 0
    }

    fn parse_block(&mut self) -> Result<NodeId, LintError> {
        let open = self.expect(&Token::LBrace)?;
        let mut body = Vec::new();
        while !self.check(&Token::RBrace) {
            if self.peek().is_none() {
                return Err(self.unexpected("'}'"));
            }
            body.push(self.parse_statement()?);
        }
        let close = self.expect(&Token::RBrace)?;
        Ok(self.alloc(NodeKind::BlockStatement { body }, open.to(close)))
    }

    fn parse_expression_statement(&mut self) -> Result<NodeId, LintError> {
        let expression = self.parse_expression()?;
        self.end_statement();
        let span = self.span_of(expression);
        Ok(self.alloc(NodeKind::ExpressionStatement { expression }, span))
    }

    fn parse_variable_declaration(&mut self, declare: bool, start: usize) -> Result<NodeId, LintError> {
        let kind = match self.bump().map(|t| &t.node) {
            Some(Token::Const) => DeclKind::Const,
            Some(Token::Let) => DeclKind::Let,
            _ => DeclKind::Var,
        };
        let mut declarations = Vec::new();
        loop {
            let id = self.parse_binding_target()?;
            self.eat(&Token::Bang); // definite assignment `let x!: T`
            self.attach_annotation(id)?;
            let init = if self.eat(&Token::Eq) { Some(self.parse_assignment()?) } else { None };
            let end = init.map(|i| self.span_of(i)).unwrap_or_else(|| self.span_of(id));
            let span = self.span_of(id).to(end);
            declarations.push(self.alloc(NodeKind::VariableDeclarator { id, init }, span));
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        let span = Span::new(start, self.prev_end());
        Ok(self.alloc(NodeKind::VariableDeclaration { kind, declarations, declare }, span))
    }

    /// Parse `: Type` after a binding and hang it on the identifier.
    fn attach_annotation(&mut self, id: NodeId) -> Result<(), LintError> {
        if !self.check(&Token::Colon) {
            return Ok(());
        }
        self.bump();
        let annotation = self.parse_type_annotation()?;
        if let NodeKind::Identifier { name, .. } = self.builder.kind(id).clone() {
            let span = self.span_of(id);
            // Rebuild the identifier so the annotation is allocated before its parent.
            let rebuilt = NodeKind::Identifier { name, type_annotation: Some(annotation) };
            self.builder.replace(id, rebuilt, span);
        }
        Ok(())
    }

    fn parse_binding_target(&mut self) -> Result<NodeId, LintError> {
        let tok = self.peek().ok_or_else(|| self.unexpected("binding"))?;
        match &tok.node {
            Token::LBrace => {
                self.bump();
                let mut properties = Vec::new();
                while !self.check(&Token::RBrace) {
                    if self.eat(&Token::Ellipsis) {
                        let start = self.prev_end();
                        let argument = self.parse_binding_target()?;
                        let span = Span::new(start - 3, self.span_of(argument).end);
                        properties.push(self.alloc(NodeKind::RestElement { argument }, span));
                    } else {
                        let (name, span) = self.expect_property_name()?;
                        let key = self.ident_node(name, span);
                        let (value, shorthand) = if self.eat(&Token::Colon) {
                            (self.parse_binding_target()?, false)
                        } else {
                            (key, true)
                        };
                        self.skip_default_value()?;
                        let span = span.to(self.span_of(value));
                        properties.push(self.alloc(NodeKind::Property { key, value, shorthand }, span));
                    }
                    if !self.eat(&Token::Comma) {
                        break;
                    }
                }
                let close = self.expect(&Token::RBrace)?;
                Ok(self.alloc(NodeKind::ObjectPattern { properties }, tok.span.to(close)))
            }
            Token::LBracket => {
                self.bump();
                let mut elements = Vec::new();
                while !self.check(&Token::RBracket) {
                    if self.eat(&Token::Comma) {
                        continue;
                    }
                    if self.eat(&Token::Ellipsis) {
                        let start = self.prev_end();
                        let argument = self.parse_binding_target()?;
                        let span = Span::new(start - 3, self.span_of(argument).end);
                        elements.push(self.alloc(NodeKind::RestElement { argument }, span));
                    } else {
                        elements.push(self.parse_binding_target()?);
                        self.skip_default_value()?;
                    }
                    if !self.eat(&Token::Comma) {
                        break;
                    }
                }
                let close = self.expect(&Token::RBracket)?;
                Ok(self.alloc(NodeKind::ArrayPattern { elements }, tok.span.to(close)))
            }
            Token::This => {
                self.bump();
                Ok(self.ident_node("this".to_string(), tok.span))
            }
            _ => {
                let (name, span) = self.expect_ident()?;
                Ok(self.ident_node(name, span))
            }
        }
    }

    /// Default values in patterns and parameters are parsed for validity and dropped.
    fn skip_default_value(&mut self) -> Result<(), LintError> {
        if self.eat(&Token::Eq) {
            let mark = self.builder.mark();
            self.parse_assignment()?;
            self.builder.truncate(mark);
        }
        Ok(())
    }

    fn parse_params(&mut self) -> Result<Vec<NodeId>, LintError> {
        self.expect(&Token::LParen)?;
        let mut params = Vec::new();
        while !self.check(&Token::RParen) {
            while ["public", "private", "protected", "readonly", "override"]
                .iter()
                .any(|w| self.check_ident(w))
                && matches!(self.peek_nth(1).map(|t| &t.node), Some(Token::Ident | Token::LBrace | Token::LBracket))
            {
                self.bump();
            }
            let rest_start = self.peek().map(|t| t.span.start);
            let is_rest = self.eat(&Token::Ellipsis);
            let target = self.parse_binding_target()?;
            self.eat(&Token::Question);
            self.attach_annotation(target)?;
            self.skip_default_value()?;
            let param = if is_rest {
                let span = Span::new(rest_start.unwrap_or(0), self.span_of(target).end);
                self.alloc(NodeKind::RestElement { argument: target }, span)
            } else {
                target
            };
            params.push(param);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RParen)?;
        Ok(params)
    }

    fn parse_return_annotation(&mut self) -> Result<Option<NodeId>, LintError> {
        if !self.eat(&Token::Colon) {
            return Ok(None);
        }
        let start = self.peek().map(|t| t.span.start).unwrap_or(0);
        let ty = self.parse_return_type()?;
        let span = Span::new(start, self.prev_end());
        Ok(Some(self.alloc(NodeKind::TypeAnnotation { ty }, span)))
    }

    fn parse_function_declaration(&mut self, is_async: bool, start: usize) -> Result<NodeId, LintError> {
        self.expect(&Token::Function)?;
        self.eat(&Token::Star);
        let (name, name_span) = self.expect_ident()?;
        let id = self.ident_node(name, name_span);
        self.parse_type_params()?;
        let params = self.parse_params()?;
        let return_type = self.parse_return_annotation()?;
        let body = if self.check(&Token::LBrace) {
            Some(self.parse_block()?)
        } else {
            self.end_statement();
            None
        };
        let span = Span::new(start, self.prev_end());
        Ok(self.alloc(NodeKind::FunctionDeclaration { id, params, return_type, body, is_async }, span))
    }

    fn parse_class(&mut self, declare: bool, start: usize) -> Result<NodeId, LintError> {
        self.expect(&Token::Class)?;
        let (name, name_span) = self.expect_ident()?;
        let id = self.ident_node(name, name_span);
        let type_params = self.parse_type_params()?;
        let mut heritage = Vec::new();
        while self.check_ident("extends") || self.check_ident("implements") {
            self.bump();
            loop {
                heritage.push(self.parse_type()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(&Token::LBrace)?;
        let mut body = Vec::new();
        while !self.check(&Token::RBrace) {
            if self.peek().is_none() {
                return Err(self.unexpected("'}'"));
            }
            if self.eat(&Token::Semi) {
                continue;
            }
            body.push(self.parse_class_member()?);
        }
        self.expect(&Token::RBrace)?;
        let span = Span::new(start, self.prev_end());
        Ok(self.alloc(NodeKind::ClassDeclaration { id, type_params, heritage, body, declare }, span))
    }

    fn is_member_modifier(&self) -> bool {
        const MODIFIERS: [&str; 9] =
            ["public", "private", "protected", "readonly", "static", "abstract", "declare", "override", "async"];
        if !MODIFIERS.iter().any(|w| self.check_ident(w)) {
            return false;
        }
        // `static(): T` or `readonly: T` use the word as the member name
        !matches!(
            self.peek_nth(1).map(|t| &t.node),
            Some(Token::LParen | Token::Colon | Token::Eq | Token::Semi | Token::Question | Token::Lt | Token::RBrace)
        )
    }

    fn parse_class_member(&mut self) -> Result<NodeId, LintError> {
        let start = self.peek().map(|t| t.span.start).unwrap_or(0);
        let mut is_static = false;
        let mut is_async = false;
        while self.is_member_modifier() {
            if self.check_ident("static") {
                is_static = true;
            }
            if self.check_ident("async") {
                is_async = true;
            }
            self.bump();
        }
        if self.check(&Token::LBracket) {
            // index signature `[key: string]: T`
            self.skip_balanced(&Token::LBracket, &Token::RBracket)?;
            if self.eat(&Token::Colon) {
                self.parse_type()?;
            }
            self.end_statement();
            return Ok(self.alloc(NodeKind::EmptyStatement, Span::new(start, self.prev_end())));
        }
        let (name, name_span) = self.expect_property_name()?;
        let key = self.ident_node(name, name_span);
        if !self.eat(&Token::Question) {
            self.eat(&Token::Bang);
        }
        if self.check(&Token::Lt) || self.check(&Token::LParen) {
            self.parse_type_params()?;
            let params = self.parse_params()?;
            let return_type = self.parse_return_annotation()?;
            let body = if self.check(&Token::LBrace) {
                Some(self.parse_block()?)
            } else {
                self.end_statement();
                None
            };
            let span = Span::new(start, self.prev_end());
            return Ok(self.alloc(
                NodeKind::MethodDefinition { key, params, return_type, body, is_async, is_static },
                span,
            ));
        }
        let type_annotation = if self.eat(&Token::Colon) { Some(self.parse_type_annotation()?) } else { None };
        let value = if self.eat(&Token::Eq) { Some(self.parse_assignment()?) } else { None };
        if !self.eat(&Token::Semi) {
            self.eat(&Token::Comma);
        }
        let span = Span::new(start, self.prev_end());
        Ok(self.alloc(NodeKind::PropertyDefinition { key, type_annotation, value, is_static }, span))
    }

    fn parse_return(&mut self) -> Result<NodeId, LintError> {
        let start = self.expect(&Token::Return)?;
        let argument = match self.peek_raw().map(|t| &t.node) {
            None | Some(Token::Newline | Token::Semi | Token::RBrace) => None,
            Some(_) => Some(self.parse_expression()?),
        };
        self.end_statement();
        let span = Span::new(start.start, self.prev_end());
        Ok(self.alloc(NodeKind::ReturnStatement { argument }, span))
    }

    fn parse_if(&mut self) -> Result<NodeId, LintError> {
        let start = self.expect(&Token::If)?;
        self.expect(&Token::LParen)?;
        let test = self.parse_expression()?;
        self.expect(&Token::RParen)?;
        let consequent = self.parse_statement()?;
        let alternate = if self.eat(&Token::Else) { Some(self.parse_statement()?) } else { None };
        let span = Span::new(start.start, self.prev_end());
        Ok(self.alloc(NodeKind::IfStatement { test, consequent, alternate }, span))
    }

    fn parse_while(&mut self) -> Result<NodeId, LintError> {
        let start = self.expect(&Token::While)?;
        self.expect(&Token::LParen)?;
        let test = self.parse_expression()?;
        self.expect(&Token::RParen)?;
        let body = self.parse_statement()?;
        let span = Span::new(start.start, self.prev_end());
        Ok(self.alloc(NodeKind::WhileStatement { test, body }, span))
    }

    fn parse_do_while(&mut self, start: usize) -> Result<NodeId, LintError> {
        self.bump(); // do
        let body = self.parse_statement()?;
        self.expect(&Token::While)?;
        self.expect(&Token::LParen)?;
        let test = self.parse_expression()?;
        self.expect(&Token::RParen)?;
        self.end_statement();
        let span = Span::new(start, self.prev_end());
        Ok(self.alloc(NodeKind::DoWhileStatement { body, test }, span))
    }

    /// `for (init; test; update)`, `for (x of xs)` and `for (k in obj)`, with optional `await`.
    fn parse_for(&mut self) -> Result<NodeId, LintError> {
        let start = self.expect(&Token::For)?;
        self.eat(&Token::Await);
        self.expect(&Token::LParen)?;
        let init = match self.peek().map(|t| (&t.node, t.span.start)) {
            Some((Token::Semi, _)) => None,
            Some((Token::Const | Token::Let | Token::Var, decl_start)) => {
                Some(self.parse_variable_declaration(false, decl_start)?)
            }
            _ => Some(self.parse_expression()?),
        };

        if let Some(left) = init {
            if self.check_ident("of") || self.check_ident("in") {
                let is_of = self.check_ident("of");
                self.bump();
                let right = self.parse_expression()?;
                self.expect(&Token::RParen)?;
                let body = self.parse_statement()?;
                let span = Span::new(start.start, self.prev_end());
                let kind = if is_of {
                    NodeKind::ForOfStatement { left, right, body }
                } else {
                    NodeKind::ForInStatement { left, right, body }
                };
                return Ok(self.alloc(kind, span));
            }
        }

        self.expect(&Token::Semi)?;
        let test = if self.check(&Token::Semi) { None } else { Some(self.parse_expression()?) };
        self.expect(&Token::Semi)?;
        let update = if self.check(&Token::RParen) { None } else { Some(self.parse_expression()?) };
        self.expect(&Token::RParen)?;
        let body = self.parse_statement()?;
        let span = Span::new(start.start, self.prev_end());
        Ok(self.alloc(NodeKind::ForStatement { init, test, update, body }, span))
    }

    fn parse_switch(&mut self, start: usize) -> Result<NodeId, LintError> {
        self.bump(); // switch
        self.expect(&Token::LParen)?;
        let discriminant = self.parse_expression()?;
        self.expect(&Token::RParen)?;
        self.expect(&Token::LBrace)?;
        let mut cases = Vec::new();
        while !self.check(&Token::RBrace) {
            let case_start = self.peek().map(|t| t.span.start).ok_or_else(|| self.unexpected("'}'"))?;
            let test = if self.check_ident("case") {
                self.bump();
                Some(self.parse_expression()?)
            } else if self.check_ident("default") {
                self.bump();
                None
            } else {
                return Err(self.unexpected("'case' or 'default'"));
            };
            self.expect(&Token::Colon)?;
            let mut consequent = Vec::new();
            while !self.check(&Token::RBrace) && !self.at_switch_label() {
                if self.peek().is_none() {
                    return Err(self.unexpected("'}'"));
                }
                consequent.push(self.parse_statement()?);
            }
            let span = Span::new(case_start, self.prev_end());
            cases.push(self.alloc(NodeKind::SwitchCase { test, consequent }, span));
        }
        self.expect(&Token::RBrace)?;
        let span = Span::new(start, self.prev_end());
        Ok(self.alloc(NodeKind::SwitchStatement { discriminant, cases }, span))
    }

    fn at_switch_label(&self) -> bool {
        self.check_ident("case") || (self.check_ident("default") && self.nth_is(1, &Token::Colon))
    }

    fn parse_labeled(&mut self, start: usize) -> Result<NodeId, LintError> {
        let (label, _) = self.expect_ident()?;
        self.expect(&Token::Colon)?;
        let body = self.parse_statement()?;
        let span = Span::new(start, self.prev_end());
        Ok(self.alloc(NodeKind::LabeledStatement { label, body }, span))
    }

    /// `break` / `continue` with an optional label on the same line.
    fn parse_jump(&mut self, is_break: bool, start: usize) -> Result<NodeId, LintError> {
        self.bump();
        let label = match self.peek_raw() {
            Some(tok) if matches!(tok.node, Token::Ident) => {
                let label = self.text(tok).to_string();
                self.pos += 1;
                Some(label)
            }
            _ => None,
        };
        self.end_statement();
        let span = Span::new(start, self.prev_end());
        let kind = if is_break { NodeKind::BreakStatement { label } } else { NodeKind::ContinueStatement { label } };
        Ok(self.alloc(kind, span))
    }

    fn parse_try(&mut self, start: usize) -> Result<NodeId, LintError> {
        self.bump(); // try
        let block = self.parse_block()?;
        let handler = if self.check_ident("catch") {
            let catch_start = self.bump().map_or(start, |t| t.span.start);
            let param = if self.eat(&Token::LParen) {
                let param = self.parse_binding_target()?;
                self.attach_annotation(param)?;
                self.expect(&Token::RParen)?;
                Some(param)
            } else {
                None
            };
            let body = self.parse_block()?;
            let span = Span::new(catch_start, self.prev_end());
            Some(self.alloc(NodeKind::CatchClause { param, body }, span))
        } else {
            None
        };
        let finalizer = if self.check_ident("finally") {
            self.bump();
            Some(self.parse_block()?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.unexpected("'catch' or 'finally'"));
        }
        let span = Span::new(start, self.prev_end());
        Ok(self.alloc(NodeKind::TryStatement { block, handler, finalizer }, span))
    }

    fn parse_type_alias(&mut self, start: usize) -> Result<NodeId, LintError> {
        self.bump(); // type
        let (name, name_span) = self.expect_ident()?;
        let id = self.ident_node(name, name_span);
        let type_params = self.parse_type_params()?;
        self.expect(&Token::Eq)?;
        let annotation = self.parse_type_annotation()?;
        self.end_statement();
        let span = Span::new(start, self.prev_end());
        Ok(self.alloc(NodeKind::TypeAliasDeclaration { id, type_params, annotation }, span))
    }

    fn parse_interface(&mut self, start: usize) -> Result<NodeId, LintError> {
        self.bump(); // interface
        let (name, name_span) = self.expect_ident()?;
        let id = self.ident_node(name, name_span);
        let type_params = self.parse_type_params()?;
        let mut extends = Vec::new();
        if self.check_ident("extends") {
            self.bump();
            loop {
                extends.push(self.parse_type()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        let members = self.parse_type_members()?;
        let span = Span::new(start, self.prev_end());
        Ok(self.alloc(NodeKind::InterfaceDeclaration { id, type_params, extends, members }, span))
    }

    // ---- expressions ----

    pub fn parse_expression(&mut self) -> Result<NodeId, LintError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<NodeId, LintError> {
        if let Some(arrow) = self.try_parse_arrow()? {
            return Ok(arrow);
        }
        let left = self.parse_conditional()?;
        let operator = match self.peek().map(|t| &t.node) {
            Some(Token::Eq) => AssignOp::Assign,
            Some(Token::PlusEq) => AssignOp::AddAssign,
            Some(Token::MinusEq) => AssignOp::SubAssign,
            _ => return Ok(left),
        };
        self.bump();
        let right = self.parse_assignment()?;
        let span = self.span_of(left).to(self.span_of(right));
        Ok(self.alloc(NodeKind::AssignmentExpression { operator, left, right }, span))
    }

    /// Detect `x =>`, `(..) =>`, `(..): T =>` and their `async` forms.
    /// A `(..):` prefix is only a candidate, so it is parsed speculatively.
    fn try_parse_arrow(&mut self) -> Result<Option<NodeId>, LintError> {
        let Some(first) = self.peek_index() else { return Ok(None) };
        let start = self.tokens[first].span.start;
        let mut i = first;
        let is_async = self.ident_is(Some(&self.tokens[i]), "async")
            && self
                .next_significant(i + 1)
                .is_some_and(|j| matches!(self.tokens[j].node, Token::LParen | Token::Ident));
        if is_async {
            match self.next_significant(i + 1) {
                Some(j) => i = j,
                None => return Ok(None),
            }
        }
        let after = |j: usize| self.next_significant(j + 1).map(|k| &self.tokens[k].node);
        let (is_arrow, speculative) = match self.tokens[i].node {
            Token::Ident => (matches!(after(i), Some(Token::FatArrow)), false),
            Token::LParen => match self.matching_paren(i).map(|close| after(close)) {
                Some(Some(Token::FatArrow)) => (true, false),
                Some(Some(Token::Colon)) => (true, true),
                _ => (false, false),
            },
            _ => (false, false),
        };
        if !is_arrow {
            return Ok(None);
        }

        let saved = self.pos;
        let mark = self.builder.mark();
        match self.parse_arrow(is_async, start) {
            Ok(id) => Ok(Some(id)),
            Err(_) if speculative => {
                self.pos = saved;
                self.builder.truncate(mark);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn parse_arrow(&mut self, is_async: bool, start: usize) -> Result<NodeId, LintError> {
        if is_async {
            self.bump();
        }
        let params = if self.check(&Token::Ident) {
            let (name, span) = self.expect_ident()?;
            vec![self.ident_node(name, span)]
        } else {
            self.parse_params()?
        };
        let return_type = self.parse_return_annotation()?;
        self.expect(&Token::FatArrow)?;
        let body = if self.check(&Token::LBrace) { self.parse_block()? } else { self.parse_assignment()? };
        let span = Span::new(start, self.span_of(body).end);
        Ok(self.alloc(NodeKind::ArrowFunctionExpression { params, return_type, body, is_async }, span))
    }

    fn parse_conditional(&mut self) -> Result<NodeId, LintError> {
        let test = self.parse_binary(1)?;
        if !self.check(&Token::Question) {
            return Ok(test);
        }
        self.bump();
        let consequent = self.parse_assignment()?;
        self.expect(&Token::Colon)?;
        let alternate = self.parse_assignment()?;
        let span = self.span_of(test).to(self.span_of(alternate));
        Ok(self.alloc(NodeKind::ConditionalExpression { test, consequent, alternate }, span))
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<NodeId, LintError> {
        let mut left = self.parse_unary()?;
        loop {
            if min_prec <= TYPE_ASSERTION_PREC && (self.check_ident("as") || self.check_ident("satisfies")) {
                let is_as = self.check_ident("as");
                self.bump();
                let annotation = if is_as && self.check(&Token::Const) {
                    let tok = self.bump().map(|t| t.span).unwrap_or_else(Span::dummy);
                    self.alloc(NodeKind::TypeAnnotation { ty: TypeExpr::Opaque }, tok)
                } else {
                    self.parse_type_annotation()?
                };
                let span = self.span_of(left).to(self.span_of(annotation));
                let kind = if is_as {
                    NodeKind::AsExpression { expression: left, annotation }
                } else {
                    NodeKind::SatisfiesExpression { expression: left, annotation }
                };
                left = self.alloc(kind, span);
                continue;
            }
            let Some(tok) = self.peek() else { break };
            let Some((prec, op)) = binary_op(&tok.node) else { break };
            if prec < min_prec {
                break;
            }
            self.bump();
            let right = self.parse_binary(prec + 1)?;
            let span = self.span_of(left).to(self.span_of(right));
            let kind = match op {
                BinOpKind::Binary(operator) => NodeKind::BinaryExpression { operator, left, right },
                BinOpKind::Logical(operator) => NodeKind::LogicalExpression { operator, left, right },
            };
            left = self.alloc(kind, span);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<NodeId, LintError> {
        let Some(tok) = self.peek() else { return Err(self.unexpected("expression")) };
        let operator = match tok.node {
            Token::Bang => UnaryOp::Not,
            Token::Minus => UnaryOp::Neg,
            Token::Plus => UnaryOp::Plus,
            Token::Await => {
                self.bump();
                let argument = self.parse_unary()?;
                let span = tok.span.to(self.span_of(argument));
                return Ok(self.alloc(NodeKind::AwaitExpression { argument }, span));
            }
            Token::PlusPlus | Token::MinusMinus => {
                self.bump();
                let argument = self.parse_unary()?;
                let span = tok.span.to(self.span_of(argument));
                let increment = matches!(tok.node, Token::PlusPlus);
                return Ok(self.alloc(NodeKind::UpdateExpression { argument, increment, prefix: true }, span));
            }
            _ => {
                let expr = self.parse_call_member()?;
                return Ok(self.parse_postfix_update(expr));
            }
        };
        self.bump();
        let argument = self.parse_unary()?;
        let span = tok.span.to(self.span_of(argument));
        Ok(self.alloc(NodeKind::UnaryExpression { operator, argument }, span))
    }

    /// `x++` / `x--` bind only on the same line.
    fn parse_postfix_update(&mut self, argument: NodeId) -> NodeId {
        let Some(tok) = self.peek_raw() else { return argument };
        let increment = match tok.node {
            Token::PlusPlus => true,
            Token::MinusMinus => false,
            _ => return argument,
        };
        self.pos += 1;
        let span = self.span_of(argument).to(tok.span);
        self.alloc(NodeKind::UpdateExpression { argument, increment, prefix: false }, span)
    }

    fn parse_call_member(&mut self) -> Result<NodeId, LintError> {
        let mut expr = if self.check(&Token::New) { self.parse_new()? } else { self.parse_primary()? };
        loop {
            if self.check(&Token::Dot) {
                self.bump();
                expr = self.parse_member_tail(expr, false)?;
            } else if self.check(&Token::QuestionDot) {
                self.bump();
                expr = if self.check(&Token::LParen) {
                    let (arguments, end) = self.parse_arguments()?;
                    let span = Span::new(self.span_of(expr).start, end);
                    self.alloc(NodeKind::CallExpression { callee: expr, arguments }, span)
                } else if self.check(&Token::LBracket) {
                    self.parse_computed_member(expr, true)?
                } else {
                    self.parse_member_tail(expr, true)?
                };
            } else if self.check_raw(&Token::LParen) {
                let (arguments, end) = self.parse_arguments()?;
                let span = Span::new(self.span_of(expr).start, end);
                expr = self.alloc(NodeKind::CallExpression { callee: expr, arguments }, span);
            } else if self.check_raw(&Token::LBracket) {
                expr = self.parse_computed_member(expr, false)?;
            } else if self.check_raw(&Token::Bang) {
                let bang = self.bump().map(|t| t.span).unwrap_or_else(Span::dummy);
                let span = self.span_of(expr).to(bang);
                expr = self.alloc(NodeKind::NonNullExpression { expression: expr }, span);
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_member_tail(&mut self, object: NodeId, optional: bool) -> Result<NodeId, LintError> {
        let (name, name_span) = self.expect_property_name()?;
        let property = self.ident_node(name, name_span);
        let span = self.span_of(object).to(name_span);
        Ok(self.alloc(NodeKind::MemberExpression { object, property, computed: false, optional }, span))
    }

    fn parse_computed_member(&mut self, object: NodeId, optional: bool) -> Result<NodeId, LintError> {
        self.expect(&Token::LBracket)?;
        let property = self.parse_expression()?;
        let close = self.expect(&Token::RBracket)?;
        let span = Span::new(self.span_of(object).start, close.end);
        Ok(self.alloc(NodeKind::MemberExpression { object, property, computed: true, optional }, span))
    }

    fn parse_new(&mut self) -> Result<NodeId, LintError> {
        let start = self.expect(&Token::New)?;
        let mut callee = self.parse_primary()?;
        while self.check(&Token::Dot) {
            self.bump();
            callee = self.parse_member_tail(callee, false)?;
        }
        let (arguments, end) = if self.check_raw(&Token::LParen) {
            self.parse_arguments()?
        } else {
            (Vec::new(), self.span_of(callee).end)
        };
        Ok(self.alloc(NodeKind::NewExpression { callee, arguments }, Span::new(start.start, end)))
    }

    fn parse_arguments(&mut self) -> Result<(Vec<NodeId>, usize), LintError> {
        self.expect(&Token::LParen)?;
        let mut arguments = Vec::new();
        while !self.check(&Token::RParen) {
            arguments.push(self.parse_spread_or_assignment()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        let close = self.expect(&Token::RParen)?;
        Ok((arguments, close.end))
    }

    fn parse_spread_or_assignment(&mut self) -> Result<NodeId, LintError> {
        if self.check(&Token::Ellipsis) {
            let start = self.bump().map(|t| t.span).unwrap_or_else(Span::dummy);
            let argument = self.parse_assignment()?;
            let span = start.to(self.span_of(argument));
            return Ok(self.alloc(NodeKind::SpreadElement { argument }, span));
        }
        self.parse_assignment()
    }

    fn parse_primary(&mut self) -> Result<NodeId, LintError> {
        let Some(tok) = self.peek() else { return Err(self.unexpected("expression")) };
        let literal = |value| NodeKind::Literal { value };
        match &tok.node {
            Token::Ident if self.text(tok) == "async" && self.nth_is(1, &Token::Function) => {
                self.bump();
                self.parse_function_expression(true, tok.span.start)
            }
            Token::Ident => {
                self.bump();
                Ok(self.ident_node(self.text(tok).to_string(), tok.span))
            }
            Token::Number(n) => {
                self.bump();
                Ok(self.alloc(literal(LiteralValue::Number(*n)), tok.span))
            }
            Token::StringLit(s) => {
                self.bump();
                Ok(self.alloc(literal(LiteralValue::String(s.clone())), tok.span))
            }
            Token::True | Token::False => {
                self.bump();
                Ok(self.alloc(literal(LiteralValue::Bool(matches!(tok.node, Token::True))), tok.span))
            }
            Token::Null => {
                self.bump();
                Ok(self.alloc(literal(LiteralValue::Null), tok.span))
            }
            Token::This => {
                self.bump();
                Ok(self.alloc(NodeKind::ThisExpression, tok.span))
            }
            Token::LParen => {
                self.bump();
                let inner = self.parse_expression()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Token::LBracket => {
                self.bump();
                let mut elements = Vec::new();
                while !self.check(&Token::RBracket) {
                    if self.eat(&Token::Comma) {
                        continue;
                    }
                    elements.push(self.parse_spread_or_assignment()?);
                    if !self.eat(&Token::Comma) {
                        break;
                    }
                }
                let close = self.expect(&Token::RBracket)?;
                Ok(self.alloc(NodeKind::ArrayExpression { elements }, tok.span.to(close)))
            }
            Token::LBrace => self.parse_object_literal(),
            Token::Function => self.parse_function_expression(false, tok.span.start),
            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_object_literal(&mut self) -> Result<NodeId, LintError> {
        let open = self.expect(&Token::LBrace)?;
        let mut properties = Vec::new();
        while !self.check(&Token::RBrace) {
            if self.check(&Token::Ellipsis) {
                properties.push(self.parse_spread_or_assignment()?);
            } else {
                let is_shorthand_candidate = self.check(&Token::Ident);
                let (name, name_span) = self.expect_property_name()?;
                let key = self.ident_node(name, name_span);
                let (value, shorthand) = if self.check(&Token::LParen) || self.check(&Token::Lt) {
                    (self.parse_method_value(name_span.start)?, false)
                } else if self.eat(&Token::Colon) {
                    (self.parse_assignment()?, false)
                } else if is_shorthand_candidate {
                    (key, true)
                } else {
                    return Err(self.unexpected("':'"));
                };
                let span = name_span.to(self.span_of(value));
                properties.push(self.alloc(NodeKind::Property { key, value, shorthand }, span));
            }
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        let close = self.expect(&Token::RBrace)?;
        Ok(self.alloc(NodeKind::ObjectExpression { properties }, open.to(close)))
    }

    /// `name(params) { ... }` inside an object literal.
    fn parse_method_value(&mut self, start: usize) -> Result<NodeId, LintError> {
        self.parse_type_params()?;
        let params = self.parse_params()?;
        let return_type = self.parse_return_annotation()?;
        let body = self.parse_block()?;
        let span = Span::new(start, self.span_of(body).end);
        Ok(self.alloc(NodeKind::FunctionExpression { id: None, params, return_type, body, is_async: false }, span))
    }

    fn parse_function_expression(&mut self, is_async: bool, start: usize) -> Result<NodeId, LintError> {
        self.expect(&Token::Function)?;
        self.eat(&Token::Star);
        let id = if self.check(&Token::Ident) {
            let (name, span) = self.expect_ident()?;
            Some(self.ident_node(name, span))
        } else {
            None
        };
        self.parse_type_params()?;
        let params = self.parse_params()?;
        let return_type = self.parse_return_annotation()?;
        let body = self.parse_block()?;
        let span = Span::new(start, self.span_of(body).end);
        Ok(self.alloc(NodeKind::FunctionExpression { id, params, return_type, body, is_async }, span))
    }
}
