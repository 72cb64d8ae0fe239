/**
 * Binding Expression Parser
 *
 * Recursive-descent parser for binding expressions, event actions,
 * interpolations and the structural-directive micro-syntax.
 */
use super::ast::*;
use super::lexer::{Lexer, Token};
use crate::chars;
use crate::ml_parser::defaults::InterpolationConfig;
use thiserror::Error;

/// A recoverable failure to parse one expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parser Error: {message} {err_location} [{input}] in {location}")]
pub struct ParserError {
    pub message: String,
    pub input: String,
    pub err_location: String,
    pub location: String,
}

impl ParserError {
    fn new(message: impl Into<String>, input: &str, err_location: String, location: &str) -> Self {
        ParserError {
            message: message.into(),
            input: input.to_string(),
            err_location,
            location: location.to_string(),
        }
    }
}

pub type ParseResult<T> = std::result::Result<T, ParserError>;

/// The expression parsing service consumed by the binding parser.
pub trait ExpressionParser: Send + Sync {
    /// Parses an event handler: assignments and `;` chains are allowed, pipes are not.
    fn parse_action(&self, input: &str, location: &str, absolute_offset: usize) -> ParseResult<ASTWithSource>;

    /// Parses a property binding: pipes are allowed, assignments and chains are not.
    fn parse_binding(&self, input: &str, location: &str, absolute_offset: usize) -> ParseResult<ASTWithSource>;

    /// Parses text containing interpolation delimiters; `Ok(None)` when there are none.
    fn parse_interpolation(
        &self,
        input: &str,
        location: &str,
        absolute_offset: usize,
        config: &InterpolationConfig,
    ) -> ParseResult<Option<ASTWithSource>>;

    /// Parses a structural micro-syntax. With no `template_key` the first key
    /// is read from the input itself (`template="ngIf cond"`).
    fn parse_template_bindings(
        &self,
        template_key: Option<&TemplateBindingIdentifier>,
        input: &str,
        location: &str,
        absolute_value_offset: usize,
    ) -> ParseResult<Vec<TemplateBinding>>;
}

/// A split interpolation: `strings.len() == expressions.len() + 1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitInterpolation {
    pub strings: Vec<String>,
    /// Expression text and its byte offset within the input
    pub expressions: Vec<(String, usize)>,
}

/// Default implementation of `ExpressionParser`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Parser {
    lexer: Lexer,
}

impl Parser {
    pub fn new() -> Self {
        Parser { lexer: Lexer::new() }
    }

    fn parse(
        &self,
        input: &str,
        location: &str,
        absolute_offset: usize,
        action: bool,
    ) -> ParseResult<ASTWithSource> {
        let tokens = self.lexer.tokenize(input);
        let ast = ParseAst::new(input, location, tokens, action, 0).parse_chain()?;
        Ok(ASTWithSource::new(ast, input, location, absolute_offset))
    }

    fn check_no_interpolation(
        &self,
        input: &str,
        location: &str,
        config: &InterpolationConfig,
    ) -> ParseResult<()> {
        if let Some(start) = input.find(&config.start) {
            if input[start + config.start.len()..].contains(&config.end) {
                return Err(ParserError::new(
                    format!(
                        "Got interpolation ({}{}) where expression was expected",
                        config.start, config.end
                    ),
                    input,
                    format!("at column {} in", start),
                    location,
                ));
            }
        }
        Ok(())
    }

    /// Splits `input` on the interpolation delimiters. Delimiters inside quoted
    /// strings within an expression do not end it.
    pub fn split_interpolation(
        &self,
        input: &str,
        location: &str,
        config: &InterpolationConfig,
    ) -> ParseResult<Option<SplitInterpolation>> {
        let mut strings = Vec::new();
        let mut expressions = Vec::new();
        let mut pos = 0;

        while pos < input.len() {
            let start = match input[pos..].find(&config.start) {
                Some(offset) => pos + offset,
                None => break,
            };
            let expr_start = start + config.start.len();
            let expr_end = match find_interpolation_end(input, expr_start, &config.end) {
                Some(end) => end,
                None => break,
            };
            let text = &input[expr_start..expr_end];
            if text.trim().is_empty() {
                return Err(ParserError::new(
                    "Blank expressions are not allowed in interpolated strings",
                    input,
                    format!("at column {} in", start),
                    location,
                ));
            }
            strings.push(input[pos..start].to_string());
            expressions.push((text.to_string(), expr_start));
            pos = expr_end + config.end.len();
        }

        if expressions.is_empty() {
            return Ok(None);
        }
        strings.push(input[pos..].to_string());
        Ok(Some(SplitInterpolation { strings, expressions }))
    }
}

fn find_interpolation_end(input: &str, from: usize, end: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (offset, ch) in input[from..].char_indices() {
        let index = from + offset;
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if ch == chars::BACKSLASH {
                    escaped = true;
                } else if ch == q {
                    quote = None;
                }
            }
            None if chars::is_quote(ch) => quote = Some(ch),
            None if input[index..].starts_with(end) => return Some(index),
            None => {}
        }
    }
    None
}

impl ExpressionParser for Parser {
    fn parse_action(&self, input: &str, location: &str, absolute_offset: usize) -> ParseResult<ASTWithSource> {
        self.check_no_interpolation(input, location, &InterpolationConfig::default())?;
        self.parse(input, location, absolute_offset, true)
    }

    fn parse_binding(&self, input: &str, location: &str, absolute_offset: usize) -> ParseResult<ASTWithSource> {
        self.check_no_interpolation(input, location, &InterpolationConfig::default())?;
        self.parse(input, location, absolute_offset, false)
    }

    fn parse_interpolation(
        &self,
        input: &str,
        location: &str,
        absolute_offset: usize,
        config: &InterpolationConfig,
    ) -> ParseResult<Option<ASTWithSource>> {
        let split = match self.split_interpolation(input, location, config)? {
            Some(split) => split,
            None => return Ok(None),
        };

        let mut expressions = Vec::with_capacity(split.expressions.len());
        for (text, offset) in &split.expressions {
            let tokens = self.lexer.tokenize(text);
            let ast = ParseAst::new(text, location, tokens, false, *offset).parse_chain()?;
            expressions.push(ast);
        }
        let ast = AST::Interpolation(Interpolation {
            span: ParseSpan::new(0, input.len()),
            strings: split.strings,
            expressions,
        });
        Ok(Some(ASTWithSource::new(ast, input, location, absolute_offset)))
    }

    fn parse_template_bindings(
        &self,
        template_key: Option<&TemplateBindingIdentifier>,
        input: &str,
        location: &str,
        absolute_value_offset: usize,
    ) -> ParseResult<Vec<TemplateBinding>> {
        let tokens = self.lexer.tokenize(input);
        let mut parser = ParseAst::new(input, location, tokens, false, 0);
        parser.parse_template_bindings(template_key, absolute_value_offset)
    }
}

/// Recursive-descent parser over one token stream.
struct ParseAst<'a> {
    input: &'a str,
    location: &'a str,
    tokens: Vec<Token>,
    action: bool,
    /// Offset of `input` within the enclosing text, applied to spans
    offset: usize,
    index: usize,
}

impl<'a> ParseAst<'a> {
    fn new(input: &'a str, location: &'a str, tokens: Vec<Token>, action: bool, offset: usize) -> Self {
        ParseAst {
            input,
            location,
            tokens,
            action,
            offset,
            index: 0,
        }
    }

    fn peek(&self, ahead: usize) -> Option<&Token> {
        self.tokens.get(self.index + ahead)
    }

    fn next(&self) -> Option<&Token> {
        self.peek(0)
    }

    fn input_index(&self) -> usize {
        match self.next() {
            Some(token) => token.index,
            None => self.input.len(),
        }
    }

    fn span(&self, start: usize) -> ParseSpan {
        let end = match self.index.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.end,
            None => start,
        };
        ParseSpan::new(self.offset + start, self.offset + end.max(start))
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn error<T>(&self, message: impl Into<String>) -> ParseResult<T> {
        let err_location = match self.next() {
            Some(token) => format!("at column {} in", token.index + 1),
            None => "at the end of the expression".to_string(),
        };
        Err(ParserError::new(message, self.input, err_location, self.location))
    }

    fn consume_optional_character(&mut self, code: char) -> bool {
        if self.next().map_or(false, |t| t.is_character(code)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume_optional_operator(&mut self, op: &str) -> bool {
        if self.next().map_or(false, |t| t.is_operator(op)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_character(&mut self, code: char) -> ParseResult<()> {
        if self.consume_optional_character(code) {
            return Ok(());
        }
        self.error(format!("Missing expected {}", code))
    }

    fn expect_identifier_or_keyword(&mut self) -> ParseResult<String> {
        match self.next() {
            Some(token) if token.is_identifier() || token.is_keyword() => {
                let name = token.str_value.clone();
                self.advance();
                Ok(name)
            }
            Some(token) if token.is_error() => {
                let message = token.str_value.clone();
                self.error(message)
            }
            Some(token) => {
                let message = format!("Unexpected token {}, expected identifier or keyword", token);
                self.error(message)
            }
            None => self.error("Unexpected end of input, expected identifier or keyword"),
        }
    }

    fn parse_chain(&mut self) -> ParseResult<AST> {
        let start = self.input_index();
        let mut expressions = Vec::new();
        while self.index < self.tokens.len() {
            expressions.push(self.parse_pipe()?);
            if self.consume_optional_character(chars::SEMICOLON) {
                if !self.action {
                    return self.error("Bindings cannot contain chained expressions");
                }
                while self.consume_optional_character(chars::SEMICOLON) {}
            } else if let Some(token) = self.next() {
                let message = if token.is_error() {
                    token.str_value.clone()
                } else {
                    format!("Unexpected token '{}'", token)
                };
                return self.error(message);
            }
        }
        match expressions.len() {
            0 => Ok(AST::EmptyExpr(EmptyExpr {
                span: ParseSpan::new(self.offset, self.offset + self.input.len()),
            })),
            1 => Ok(expressions.remove(0)),
            _ => Ok(AST::Chain(Chain {
                span: self.span(start),
                expressions,
            })),
        }
    }

    fn parse_pipe(&mut self) -> ParseResult<AST> {
        let start = self.input_index();
        let mut result = self.parse_expression()?;
        if self.next().map_or(false, |t| t.is_operator("|")) {
            if self.action {
                return self.error("Cannot have a pipe in an action expression");
            }
            while self.consume_optional_operator("|") {
                let name = self.expect_identifier_or_keyword()?;
                let mut args = Vec::new();
                while self.consume_optional_character(chars::COLON) {
                    args.push(self.parse_expression()?);
                }
                result = AST::BindingPipe(BindingPipe {
                    span: self.span(start),
                    exp: Box::new(result),
                    name,
                    args,
                });
            }
        }
        Ok(result)
    }

    fn parse_expression(&mut self) -> ParseResult<AST> {
        self.parse_conditional()
    }

    fn parse_conditional(&mut self) -> ParseResult<AST> {
        let start = self.input_index();
        let result = self.parse_nullish_coalescing()?;
        if !self.consume_optional_operator("?") {
            return Ok(result);
        }
        let true_exp = self.parse_pipe()?;
        if !self.consume_optional_character(chars::COLON) {
            return self.error(format!(
                "Conditional expression {} requires all 3 expressions",
                &self.input[start.min(self.input.len())..]
            ));
        }
        let false_exp = self.parse_pipe()?;
        Ok(AST::Conditional(Conditional {
            span: self.span(start),
            condition: Box::new(result),
            true_exp: Box::new(true_exp),
            false_exp: Box::new(false_exp),
        }))
    }

    fn parse_binary_level(
        &mut self,
        operators: &[&str],
        next: fn(&mut Self) -> ParseResult<AST>,
    ) -> ParseResult<AST> {
        let start = self.input_index();
        let mut result = next(self)?;
        loop {
            let operation = match self.next() {
                Some(token) => operators.iter().find(|op| token.is_operator(op)).copied(),
                None => None,
            };
            let Some(operation) = operation else {
                return Ok(result);
            };
            self.advance();
            let right = next(self)?;
            result = AST::Binary(Binary {
                span: self.span(start),
                operation: operation.to_string(),
                left: Box::new(result),
                right: Box::new(right),
            });
        }
    }

    fn parse_nullish_coalescing(&mut self) -> ParseResult<AST> {
        self.parse_binary_level(&["??"], Self::parse_logical_or)
    }

    fn parse_logical_or(&mut self) -> ParseResult<AST> {
        self.parse_binary_level(&["||"], Self::parse_logical_and)
    }

    fn parse_logical_and(&mut self) -> ParseResult<AST> {
        self.parse_binary_level(&["&&"], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> ParseResult<AST> {
        self.parse_binary_level(&["==", "!=", "===", "!=="], Self::parse_relational)
    }

    fn parse_relational(&mut self) -> ParseResult<AST> {
        self.parse_binary_level(&["<", ">", "<=", ">="], Self::parse_additive)
    }

    fn parse_additive(&mut self) -> ParseResult<AST> {
        self.parse_binary_level(&["+", "-"], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<AST> {
        self.parse_binary_level(&["*", "/", "%"], Self::parse_prefix)
    }

    fn parse_prefix(&mut self) -> ParseResult<AST> {
        let start = self.input_index();
        if let Some(token) = self.next() {
            if token.is_operator("+") || token.is_operator("-") {
                let operator = token.str_value.clone();
                self.advance();
                let expr = self.parse_prefix()?;
                return Ok(AST::Unary(Unary {
                    span: self.span(start),
                    operator,
                    expr: Box::new(expr),
                }));
            }
            if token.is_operator("!") {
                self.advance();
                let expression = self.parse_prefix()?;
                return Ok(AST::PrefixNot(PrefixNot {
                    span: self.span(start),
                    expression: Box::new(expression),
                }));
            }
        }
        self.parse_call_chain()
    }

    fn parse_call_chain(&mut self) -> ParseResult<AST> {
        let start = self.input_index();
        let mut result = self.parse_primary()?;
        loop {
            if self.consume_optional_character(chars::PERIOD) {
                result = self.parse_access_member(result, start, false)?;
            } else if self.consume_optional_operator("?.") {
                if self.consume_optional_character(chars::LPAREN) {
                    let args = self.parse_call_arguments()?;
                    result = AST::SafeCall(Call {
                        span: self.span(start),
                        receiver: Box::new(result),
                        args,
                    });
                } else if self.consume_optional_character(chars::LBRACKET) {
                    let key = self.parse_pipe()?;
                    self.expect_character(chars::RBRACKET)?;
                    result = AST::SafeKeyedRead(KeyedRead {
                        span: self.span(start),
                        receiver: Box::new(result),
                        key: Box::new(key),
                    });
                } else {
                    result = self.parse_access_member(result, start, true)?;
                }
            } else if self.consume_optional_character(chars::LBRACKET) {
                let key = self.parse_pipe()?;
                self.expect_character(chars::RBRACKET)?;
                if self.consume_optional_operator("=") {
                    if !self.action {
                        return self.error("Bindings cannot contain assignments");
                    }
                    let value = self.parse_conditional()?;
                    result = AST::KeyedWrite(KeyedWrite {
                        span: self.span(start),
                        receiver: Box::new(result),
                        key: Box::new(key),
                        value: Box::new(value),
                    });
                } else {
                    result = AST::KeyedRead(KeyedRead {
                        span: self.span(start),
                        receiver: Box::new(result),
                        key: Box::new(key),
                    });
                }
            } else if self.consume_optional_character(chars::LPAREN) {
                let args = self.parse_call_arguments()?;
                result = AST::Call(Call {
                    span: self.span(start),
                    receiver: Box::new(result),
                    args,
                });
            } else if self.consume_optional_operator("!") {
                result = AST::NonNullAssert(PrefixNot {
                    span: self.span(start),
                    expression: Box::new(result),
                });
            } else {
                return Ok(result);
            }
        }
    }

    fn parse_primary(&mut self) -> ParseResult<AST> {
        let start = self.input_index();
        let Some(token) = self.next().cloned() else {
            return self.error(format!("Unexpected end of expression: {}", self.input));
        };

        if token.is_character(chars::LPAREN) {
            self.advance();
            let result = self.parse_pipe()?;
            self.expect_character(chars::RPAREN)?;
            return Ok(result);
        }
        if token.is_keyword() {
            let literal = match token.str_value.as_str() {
                "null" => Some(LiteralValue::Null),
                "undefined" => Some(LiteralValue::Undefined),
                "true" => Some(LiteralValue::Boolean(true)),
                "false" => Some(LiteralValue::Boolean(false)),
                _ => None,
            };
            if let Some(value) = literal {
                self.advance();
                return Ok(AST::LiteralPrimitive(LiteralPrimitive {
                    span: self.span(start),
                    value,
                }));
            }
            if token.str_value == "this" {
                self.advance();
                return Ok(AST::ThisReceiver(ImplicitReceiver { span: self.span(start) }));
            }
        }
        if token.is_character(chars::LBRACKET) {
            self.advance();
            let expressions = self.parse_expression_list(chars::RBRACKET)?;
            self.expect_character(chars::RBRACKET)?;
            return Ok(AST::LiteralArray(LiteralArray {
                span: self.span(start),
                expressions,
            }));
        }
        if token.is_character(chars::LBRACE) {
            return self.parse_literal_map();
        }
        if token.is_identifier() || token.is_keyword() {
            let receiver = AST::ImplicitReceiver(ImplicitReceiver {
                span: ParseSpan::new(self.offset + start, self.offset + start),
            });
            return self.parse_access_member(receiver, start, false);
        }
        if token.is_number() {
            self.advance();
            return Ok(AST::LiteralPrimitive(LiteralPrimitive {
                span: self.span(start),
                value: LiteralValue::Number(token.num_value),
            }));
        }
        if token.is_string() {
            self.advance();
            return Ok(AST::LiteralPrimitive(LiteralPrimitive {
                span: self.span(start),
                value: LiteralValue::String(token.str_value),
            }));
        }
        if token.is_error() {
            return self.error(token.str_value);
        }
        self.error(format!("Unexpected token {}", token))
    }

    fn parse_expression_list(&mut self, terminator: char) -> ParseResult<Vec<AST>> {
        let mut result = Vec::new();
        if !self.next().map_or(false, |t| t.is_character(terminator)) {
            loop {
                result.push(self.parse_pipe()?);
                if !self.consume_optional_character(chars::COMMA) {
                    break;
                }
            }
        }
        Ok(result)
    }

    fn parse_call_arguments(&mut self) -> ParseResult<Vec<AST>> {
        let args = self.parse_expression_list(chars::RPAREN)?;
        self.expect_character(chars::RPAREN)?;
        Ok(args)
    }

    fn parse_literal_map(&mut self) -> ParseResult<AST> {
        let start = self.input_index();
        self.expect_character(chars::LBRACE)?;
        let mut keys = Vec::new();
        let mut values = Vec::new();
        if !self.consume_optional_character(chars::RBRACE) {
            loop {
                let quoted = self.next().map_or(false, |t| t.is_string());
                let key = if quoted {
                    let key = self.next().map(|t| t.str_value.clone()).unwrap_or_default();
                    self.advance();
                    key
                } else {
                    self.expect_identifier_or_keyword()?
                };
                self.expect_character(chars::COLON)?;
                values.push(self.parse_pipe()?);
                keys.push(LiteralMapKey { key, quoted });
                if !self.consume_optional_character(chars::COMMA) {
                    break;
                }
            }
            self.expect_character(chars::RBRACE)?;
        }
        Ok(AST::LiteralMap(LiteralMap {
            span: self.span(start),
            keys,
            values,
        }))
    }

    fn parse_access_member(&mut self, receiver: AST, start: usize, safe: bool) -> ParseResult<AST> {
        let name = self.expect_identifier_or_keyword()?;
        if safe {
            if self.next().map_or(false, |t| t.is_operator("=")) {
                return self.error("The '?.' operator cannot be used in the assignment");
            }
            return Ok(AST::SafePropertyRead(PropertyRead {
                span: self.span(start),
                receiver: Box::new(receiver),
                name,
            }));
        }
        if self.consume_optional_operator("=") {
            if !self.action {
                return self.error("Bindings cannot contain assignments");
            }
            let value = self.parse_conditional()?;
            return Ok(AST::PropertyWrite(PropertyWrite {
                span: self.span(start),
                receiver: Box::new(receiver),
                name,
                value: Box::new(value),
            }));
        }
        Ok(AST::PropertyRead(PropertyRead {
            span: self.span(start),
            receiver: Box::new(receiver),
            name,
        }))
    }

    // Structural micro-syntax

    fn parse_template_bindings(
        &mut self,
        template_key: Option<&TemplateBindingIdentifier>,
        absolute_value_offset: usize,
    ) -> ParseResult<Vec<TemplateBinding>> {
        let mut bindings = Vec::new();
        let first_key = match template_key {
            Some(key) => key.clone(),
            None => self.expect_template_binding_key(absolute_value_offset)?,
        };
        self.parse_directive_keyword_bindings(&first_key, absolute_value_offset, &mut bindings)?;

        while self.index < self.tokens.len() {
            if let Some(binding) = self.parse_let_binding(absolute_value_offset)? {
                bindings.push(binding);
            } else {
                let mut key = self.expect_template_binding_key(absolute_value_offset)?;
                if let Some(binding) = self.parse_as_binding(&key, absolute_value_offset)? {
                    bindings.push(binding);
                } else {
                    key.source = format!("{}{}", first_key.source, capitalize(&key.source));
                    self.parse_directive_keyword_bindings(&key, absolute_value_offset, &mut bindings)?;
                }
            }
            self.consume_statement_terminator();
        }
        Ok(bindings)
    }

    fn parse_directive_keyword_bindings(
        &mut self,
        key: &TemplateBindingIdentifier,
        absolute_value_offset: usize,
        bindings: &mut Vec<TemplateBinding>,
    ) -> ParseResult<()> {
        self.consume_optional_character(chars::COLON);
        let value_start = self.input_index();
        let value = if self.at_binding_boundary() {
            None
        } else {
            let ast = self.parse_pipe()?;
            let source = self.input[value_start..self.input_index()].trim_end().to_string();
            Some(ASTWithSource::new(
                ast,
                source,
                self.location,
                absolute_value_offset + value_start,
            ))
        };
        let end = value
            .as_ref()
            .map(|v| v.absolute_offset + v.source.len())
            .unwrap_or(key.span.end);
        bindings.push(TemplateBinding::Expression {
            span: AbsoluteSourceSpan::new(key.span.start, end),
            key: key.clone(),
            value,
        });
        if let Some(binding) = self.parse_as_binding(key, absolute_value_offset)? {
            bindings.push(binding);
        }
        self.consume_statement_terminator();
        Ok(())
    }

    fn at_binding_boundary(&self) -> bool {
        match self.next() {
            None => true,
            Some(t) => {
                t.is_keyword_named("let")
                    || t.is_keyword_named("var")
                    || t.is_keyword_named("as")
                    || t.is_character(chars::HASH)
                    || t.is_character(chars::SEMICOLON)
                    || t.is_character(chars::COMMA)
            }
        }
    }

    /// `expr as alias`: declares `alias` reading `value`.
    fn parse_as_binding(
        &mut self,
        value: &TemplateBindingIdentifier,
        absolute_value_offset: usize,
    ) -> ParseResult<Option<TemplateBinding>> {
        if !self.next().map_or(false, |t| t.is_keyword_named("as")) {
            return Ok(None);
        }
        self.advance();
        let key = self.expect_template_binding_key(absolute_value_offset)?;
        self.consume_statement_terminator();
        Ok(Some(TemplateBinding::Variable {
            span: AbsoluteSourceSpan::new(value.span.start, key.span.end),
            key,
            value: Some(value.clone()),
        }))
    }

    /// `let x = y`, `var x = y` or `#x = y`; the value defaults to `$implicit`.
    fn parse_let_binding(&mut self, absolute_value_offset: usize) -> ParseResult<Option<TemplateBinding>> {
        let is_let = self.next().map_or(false, |t| {
            t.is_keyword_named("let") || t.is_keyword_named("var") || t.is_character(chars::HASH)
        });
        if !is_let {
            return Ok(None);
        }
        let start = absolute_value_offset + self.input_index();
        self.advance();
        let key = self.expect_template_binding_key(absolute_value_offset)?;
        let value = if self.consume_optional_operator("=") {
            Some(self.expect_template_binding_key(absolute_value_offset)?)
        } else {
            None
        };
        let end = value.as_ref().map(|v| v.span.end).unwrap_or(key.span.end);
        self.consume_statement_terminator();
        Ok(Some(TemplateBinding::Variable {
            span: AbsoluteSourceSpan::new(start, end),
            key,
            value,
        }))
    }

    /// A dash-joined key such as `ng-for-of`, or a quoted string.
    fn expect_template_binding_key(&mut self, absolute_value_offset: usize) -> ParseResult<TemplateBindingIdentifier> {
        let start = self.input_index();
        let mut result = String::new();
        loop {
            match self.next() {
                Some(token) if token.is_string() => {
                    result.push_str(&token.str_value);
                    self.advance();
                }
                _ => result.push_str(&self.expect_identifier_or_keyword()?),
            }
            if self.consume_optional_operator("-") {
                result.push('-');
            } else {
                break;
            }
        }
        let end = self.index.checked_sub(1).and_then(|i| self.tokens.get(i)).map_or(start, |t| t.end);
        Ok(TemplateBindingIdentifier {
            source: result,
            span: AbsoluteSourceSpan::new(absolute_value_offset + start, absolute_value_offset + end),
        })
    }

    fn consume_statement_terminator(&mut self) {
        if !self.consume_optional_character(chars::SEMICOLON) {
            self.consume_optional_character(chars::COMMA);
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
