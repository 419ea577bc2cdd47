//! Type syntax: annotations, aliases, interface bodies and type parameter lists.
//!
//! Only the shape the checker needs survives parsing. Everything else (conditional
//! types, `keyof`, `typeof`, mapped types, call signatures) is consumed and collapsed
//! to [`TypeExpr::Opaque`] or dropped.

use super::Parser;
use super::ast::{MemberSig, NodeId, NodeKind, TypeExpr, TypeMember};
use crate::diagnostics::LintError;
use crate::lexer::token::Token;
use crate::span::Span;

impl<'a> Parser<'a> {
    /// `Type` wrapped in a type-annotation node.
    pub(super) fn parse_type_annotation(&mut self) -> Result<NodeId, LintError> {
        let start = self.peek().map(|t| t.span.start).unwrap_or(0);
        let ty = self.parse_type()?;
        let span = Span::new(start, self.prev_end());
        Ok(self.alloc(NodeKind::TypeAnnotation { ty }, span))
    }

    pub(super) fn parse_type(&mut self) -> Result<TypeExpr, LintError> {
        let ty = self.parse_union_type()?;
        if self.check_ident("extends") {
            // conditional type `A extends B ? X : Y`
            self.bump();
            self.parse_union_type()?;
            self.expect(&Token::Question)?;
            self.parse_type()?;
            self.expect(&Token::Colon)?;
            self.parse_type()?;
            return Ok(TypeExpr::Opaque);
        }
        Ok(ty)
    }

    /// Return position additionally accepts type predicates and assertion signatures.
    pub(super) fn parse_return_type(&mut self) -> Result<TypeExpr, LintError> {
        if self.check_ident("asserts") && matches!(self.peek_nth(1).map(|t| &t.node), Some(Token::Ident | Token::This)) {
            self.bump();
            self.bump();
            if self.check_ident("is") {
                self.bump();
                self.parse_type()?;
            }
            return Ok(named("void"));
        }
        if matches!(self.peek().map(|t| &t.node), Some(Token::Ident | Token::This)) && self.nth_is_ident(1, "is") {
            self.bump();
            self.bump();
            self.parse_type()?;
            return Ok(named("boolean"));
        }
        self.parse_type()
    }

    fn parse_union_type(&mut self) -> Result<TypeExpr, LintError> {
        self.eat(&Token::Pipe);
        let mut parts = vec![self.parse_intersection_type()?];
        while self.eat(&Token::Pipe) {
            parts.push(self.parse_intersection_type()?);
        }
        Ok(if parts.len() == 1 { parts.remove(0) } else { TypeExpr::Union(parts) })
    }

    fn parse_intersection_type(&mut self) -> Result<TypeExpr, LintError> {
        self.eat(&Token::Amp);
        let mut parts = vec![self.parse_postfix_type()?];
        while self.eat(&Token::Amp) {
            parts.push(self.parse_postfix_type()?);
        }
        Ok(if parts.len() == 1 { parts.remove(0) } else { TypeExpr::Intersection(parts) })
    }

    fn parse_postfix_type(&mut self) -> Result<TypeExpr, LintError> {
        let mut ty = self.parse_primary_type()?;
        while self.check_raw(&Token::LBracket) {
            self.bump();
            if self.eat(&Token::RBracket) {
                ty = TypeExpr::Array(Box::new(ty));
            } else {
                // indexed access `T[K]`
                self.parse_type()?;
                self.expect(&Token::RBracket)?;
                ty = TypeExpr::Opaque;
            }
        }
        Ok(ty)
    }

    fn parse_primary_type(&mut self) -> Result<TypeExpr, LintError> {
        let Some(tok) = self.peek() else { return Err(self.unexpected("type")) };
        match &tok.node {
            Token::LParen => {
                let is_function = self
                    .peek_index()
                    .and_then(|open| self.matching_paren(open))
                    .and_then(|close| self.next_significant(close + 1))
                    .is_some_and(|next| matches!(self.tokens[next].node, Token::FatArrow));
                if is_function {
                    return self.parse_function_type();
                }
                self.bump();
                let inner = self.parse_type()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Token::Lt => self.parse_function_type(),
            Token::New => {
                self.bump();
                self.parse_function_type()?;
                Ok(TypeExpr::Opaque)
            }
            Token::LBrace => Ok(TypeExpr::Object(self.parse_type_members()?)),
            Token::LBracket => self.parse_tuple_type(),
            Token::StringLit(_) | Token::Number(_) | Token::True | Token::False => {
                self.bump();
                Ok(TypeExpr::Literal(self.text(tok).to_string()))
            }
            Token::Minus => {
                self.bump();
                let num = self.expect(&Token::Number(0.0))?;
                Ok(TypeExpr::Literal(format!("-{}", &self.source[num.start..num.end])))
            }
            Token::Null => {
                self.bump();
                Ok(named("null"))
            }
            Token::This => {
                self.bump();
                Ok(named("this"))
            }
            Token::Ident => match self.text(tok) {
                "typeof" => {
                    self.bump();
                    self.expect_property_name()?;
                    while self.eat(&Token::Dot) {
                        self.expect_property_name()?;
                    }
                    Ok(TypeExpr::Opaque)
                }
                "keyof" | "unique" => {
                    self.bump();
                    self.parse_postfix_type()?;
                    Ok(TypeExpr::Opaque)
                }
                "readonly" => {
                    self.bump();
                    self.parse_postfix_type()
                }
                "infer" => {
                    self.bump();
                    self.expect_ident()?;
                    Ok(TypeExpr::Opaque)
                }
                _ => self.parse_type_reference(),
            },
            _ => Err(self.unexpected("type")),
        }
    }

    fn parse_type_reference(&mut self) -> Result<TypeExpr, LintError> {
        let (mut name, _) = self.expect_ident()?;
        while self.check(&Token::Dot) {
            self.bump();
            let (part, _) = self.expect_property_name()?;
            name.push('.');
            name.push_str(&part);
        }
        let args = self.parse_type_args()?;
        Ok(TypeExpr::Named { name, args })
    }

    fn parse_type_args(&mut self) -> Result<Vec<TypeExpr>, LintError> {
        let mut args = Vec::new();
        if !self.check_raw(&Token::Lt) {
            return Ok(args);
        }
        self.bump();
        while !self.check(&Token::Gt) {
            args.push(self.parse_type()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::Gt)?;
        Ok(args)
    }

    /// `<T>(a: A) => R`. Parameter types are irrelevant to the checker.
    fn parse_function_type(&mut self) -> Result<TypeExpr, LintError> {
        self.parse_type_params()?;
        self.skip_balanced(&Token::LParen, &Token::RParen)?;
        self.expect(&Token::FatArrow)?;
        let ret = self.parse_return_type()?;
        Ok(TypeExpr::Function { ret: Box::new(ret) })
    }

    fn parse_tuple_type(&mut self) -> Result<TypeExpr, LintError> {
        self.expect(&Token::LBracket)?;
        let mut elements = Vec::new();
        while !self.check(&Token::RBracket) {
            self.eat(&Token::Ellipsis);
            // labeled element `name: T` / `name?: T`
            if self.check(&Token::Ident)
                && (self.nth_is(1, &Token::Colon) || (self.nth_is(1, &Token::Question) && self.nth_is(2, &Token::Colon)))
            {
                self.bump();
                self.eat(&Token::Question);
                self.expect(&Token::Colon)?;
            }
            elements.push(self.parse_type()?);
            self.eat(&Token::Question);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RBracket)?;
        Ok(TypeExpr::Tuple(elements))
    }

    /// `<T, U extends X = Y>`; only the names are kept.
    pub(super) fn parse_type_params(&mut self) -> Result<Vec<String>, LintError> {
        let mut names = Vec::new();
        if !self.check(&Token::Lt) {
            return Ok(names);
        }
        self.bump();
        while !self.check(&Token::Gt) {
            while ["in", "out"].iter().any(|w| self.check_ident(w)) && self.nth_is(1, &Token::Ident) {
                self.bump();
            }
            self.eat(&Token::Const);
            let (name, _) = self.expect_ident()?;
            if self.check_ident("extends") {
                self.bump();
                self.parse_type()?;
            }
            if self.eat(&Token::Eq) {
                self.parse_type()?;
            }
            names.push(name);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::Gt)?;
        Ok(names)
    }

    /// `{ ... }` body of an interface or object type literal.
    pub(super) fn parse_type_members(&mut self) -> Result<Vec<TypeMember>, LintError> {
        self.expect(&Token::LBrace)?;
        let mut members = Vec::new();
        loop {
            while self.eat(&Token::Semi) || self.eat(&Token::Comma) {}
            if self.eat(&Token::RBrace) {
                break;
            }
            if self.peek().is_none() {
                return Err(self.unexpected("'}'"));
            }
            if let Some(member) = self.parse_type_member()? {
                members.push(member);
            }
        }
        Ok(members)
    }

    fn parse_type_member(&mut self) -> Result<Option<TypeMember>, LintError> {
        if self.check_ident("readonly") && !self.member_name_ends_here(1) {
            self.bump();
        }
        match self.peek().map(|t| &t.node) {
            Some(Token::LBracket) => {
                // index signature or mapped type
                self.skip_balanced(&Token::LBracket, &Token::RBracket)?;
                self.eat(&Token::Question);
                if self.eat(&Token::Colon) {
                    self.parse_type()?;
                }
                return Ok(None);
            }
            Some(Token::LParen | Token::Lt) => {
                // call signature
                self.skip_signature()?;
                return Ok(None);
            }
            Some(Token::New) => {
                self.bump();
                self.skip_signature()?;
                return Ok(None);
            }
            _ => {}
        }

        let accessor = (self.check_ident("get") || self.check_ident("set")) && !self.member_name_ends_here(1);
        if accessor {
            self.bump();
        }
        let (name, _) = self.expect_property_name()?;
        self.eat(&Token::Question);

        if self.check(&Token::Lt) || self.check(&Token::LParen) {
            self.parse_type_params()?;
            self.skip_balanced(&Token::LParen, &Token::RParen)?;
            let ret = if self.eat(&Token::Colon) { self.parse_return_type()? } else { TypeExpr::Opaque };
            let sig = if name == "constructor" {
                MemberSig::Constructor
            } else if accessor {
                MemberSig::Property(ret)
            } else {
                MemberSig::Method { ret }
            };
            return Ok(Some(TypeMember { name, sig }));
        }

        let ty = if self.eat(&Token::Colon) { self.parse_type()? } else { TypeExpr::Opaque };
        Ok(Some(TypeMember { name, sig: MemberSig::Property(ty) }))
    }

    /// True if the token `n` ahead closes a member name, so the current word is the name itself.
    fn member_name_ends_here(&self, n: usize) -> bool {
        matches!(
            self.peek_nth(n).map(|t| &t.node),
            Some(Token::Colon | Token::Question | Token::LParen | Token::Lt | Token::Semi | Token::Comma | Token::RBrace)
        )
    }

    fn skip_signature(&mut self) -> Result<(), LintError> {
        self.parse_type_params()?;
        self.skip_balanced(&Token::LParen, &Token::RParen)?;
        if self.eat(&Token::Colon) {
            self.parse_return_type()?;
        }
        Ok(())
    }
}

fn named(name: &str) -> TypeExpr {
    TypeExpr::Named { name: name.to_string(), args: Vec::new() }
}
