/**
 * Binding Expression Lexer
 *
 * Tokenizes binding expressions into identifiers, keywords, literals and operators.
 */
use crate::chars;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
    Character,
    Identifier,
    Keyword,
    String,
    Operator,
    Number,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub index: usize,
    pub end: usize,
    pub token_type: TokenType,
    pub num_value: f64,
    pub str_value: String,
}

impl Token {
    fn new(index: usize, end: usize, token_type: TokenType, num_value: f64, str_value: String) -> Self {
        Token {
            index,
            end,
            token_type,
            num_value,
            str_value,
        }
    }

    pub fn is_character(&self, code: char) -> bool {
        self.token_type == TokenType::Character && self.str_value.starts_with(code)
    }

    pub fn is_identifier(&self) -> bool {
        self.token_type == TokenType::Identifier
    }

    pub fn is_keyword(&self) -> bool {
        self.token_type == TokenType::Keyword
    }

    pub fn is_keyword_named(&self, keyword: &str) -> bool {
        self.token_type == TokenType::Keyword && self.str_value == keyword
    }

    pub fn is_string(&self) -> bool {
        self.token_type == TokenType::String
    }

    pub fn is_number(&self) -> bool {
        self.token_type == TokenType::Number
    }

    pub fn is_operator(&self, operator: &str) -> bool {
        self.token_type == TokenType::Operator && self.str_value == operator
    }

    pub fn is_error(&self) -> bool {
        self.token_type == TokenType::Error
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.token_type {
            TokenType::Number => write!(f, "{}", self.num_value),
            _ => f.write_str(&self.str_value),
        }
    }
}

const KEYWORDS: &[&str] = &[
    "var", "let", "as", "null", "undefined", "true", "false", "if", "else", "this",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct Lexer;

impl Lexer {
    pub fn new() -> Self {
        Lexer
    }

    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut scanner = Scanner::new(text);
        let mut tokens = Vec::new();
        while let Some(token) = scanner.scan_token() {
            let is_error = token.is_error();
            tokens.push(token);
            if is_error {
                break;
            }
        }
        tokens
    }
}

struct Scanner<'a> {
    input: &'a str,
    index: usize,
    peek: char,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Scanner {
            input,
            index: 0,
            peek: input.chars().next().unwrap_or(chars::EOF),
        }
    }

    fn advance(&mut self) {
        self.index += self.peek.len_utf8();
        self.peek = self.input[self.index..].chars().next().unwrap_or(chars::EOF);
    }

    fn peek_at(&self, ahead: usize) -> char {
        self.input[self.index..].chars().nth(ahead).unwrap_or(chars::EOF)
    }

    fn scan_token(&mut self) -> Option<Token> {
        while self.index < self.input.len() && chars::is_whitespace(self.peek) {
            self.advance();
        }
        if self.index >= self.input.len() {
            return None;
        }

        let start = self.index;
        let ch = self.peek;
        if chars::is_identifier_start(ch) {
            return Some(self.scan_identifier());
        }
        if chars::is_digit(ch) {
            return Some(self.scan_number(start));
        }

        match ch {
            chars::PERIOD => {
                if chars::is_digit(self.peek_at(1)) {
                    return Some(self.scan_number(start));
                }
                Some(self.scan_character(start, ch))
            }
            chars::LPAREN
            | chars::RPAREN
            | chars::LBRACE
            | chars::RBRACE
            | chars::LBRACKET
            | chars::RBRACKET
            | chars::COMMA
            | chars::COLON
            | chars::SEMICOLON
            | chars::HASH => Some(self.scan_character(start, ch)),
            chars::SQ | chars::DQ => Some(self.scan_string(ch)),
            chars::PLUS | chars::MINUS | chars::STAR | chars::SLASH | chars::PERCENT => {
                self.advance();
                Some(self.operator(start, ch.to_string()))
            }
            chars::QUESTION => {
                self.advance();
                match self.peek {
                    chars::PERIOD => {
                        self.advance();
                        Some(self.operator(start, "?.".to_string()))
                    }
                    chars::QUESTION => {
                        self.advance();
                        Some(self.operator(start, "??".to_string()))
                    }
                    _ => Some(self.operator(start, "?".to_string())),
                }
            }
            chars::LT | chars::GT => Some(self.scan_complex_operator(start, ch, chars::EQ, None)),
            chars::BANG | chars::EQ => {
                Some(self.scan_complex_operator(start, ch, chars::EQ, Some(chars::EQ)))
            }
            chars::AMPERSAND => Some(self.scan_complex_operator(start, ch, chars::AMPERSAND, None)),
            chars::BAR => Some(self.scan_complex_operator(start, ch, chars::BAR, None)),
            _ => {
                self.advance();
                Some(self.error(start, format!("Unexpected character [{}]", ch)))
            }
        }
    }

    fn scan_character(&mut self, start: usize, ch: char) -> Token {
        self.advance();
        Token::new(start, self.index, TokenType::Character, ch as u32 as f64, ch.to_string())
    }

    fn operator(&self, start: usize, text: String) -> Token {
        Token::new(start, self.index, TokenType::Operator, 0.0, text)
    }

    fn error(&self, start: usize, message: String) -> Token {
        Token::new(
            start,
            self.index,
            TokenType::Error,
            0.0,
            format!("Lexer Error: {} at column {} in expression [{}]", message, start, self.input),
        )
    }

    /// Scans `one`, optionally followed by `two` and then `three`, e.g. `=`, `==`, `===`.
    fn scan_complex_operator(&mut self, start: usize, one: char, two: char, three: Option<char>) -> Token {
        self.advance();
        let mut text = one.to_string();
        if self.peek == two {
            self.advance();
            text.push(two);
            if let Some(three) = three {
                if self.peek == three {
                    self.advance();
                    text.push(three);
                }
            }
        }
        self.operator(start, text)
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.index;
        self.advance();
        while chars::is_identifier_part(self.peek) {
            self.advance();
        }
        let text = &self.input[start..self.index];
        let token_type = if KEYWORDS.contains(&text) {
            TokenType::Keyword
        } else {
            TokenType::Identifier
        };
        Token::new(start, self.index, token_type, 0.0, text.to_string())
    }

    fn scan_number(&mut self, start: usize) -> Token {
        let mut simple = self.index == start && self.peek != chars::PERIOD;
        self.advance();
        loop {
            if chars::is_digit(self.peek) || self.peek == '_' {
                // digits and numeric separators
            } else if self.peek == chars::PERIOD {
                simple = false;
            } else if self.peek == 'e' || self.peek == 'E' {
                self.advance();
                if self.peek == chars::PLUS || self.peek == chars::MINUS {
                    self.advance();
                }
                if !chars::is_digit(self.peek) {
                    return self.error(start, "Invalid exponent".to_string());
                }
                simple = false;
            } else {
                break;
            }
            self.advance();
        }
        let text: String = self.input[start..self.index].chars().filter(|c| *c != '_').collect();
        let value = if simple {
            text.parse::<i64>().map(|v| v as f64).ok()
        } else {
            text.parse::<f64>().ok()
        };
        match value {
            Some(value) => Token::new(start, self.index, TokenType::Number, value, String::new()),
            None => self.error(start, format!("Invalid number [{}]", text)),
        }
    }

    fn scan_string(&mut self, quote: char) -> Token {
        let start = self.index;
        self.advance();
        let mut buffer = String::new();
        loop {
            match self.peek {
                c if c == quote => break,
                chars::EOF if self.index >= self.input.len() => {
                    return self.error(start, "Unterminated quote".to_string());
                }
                chars::BACKSLASH => {
                    self.advance();
                    let escaped = match self.peek {
                        'n' => '\n',
                        'r' => '\r',
                        't' => '\t',
                        'f' => '\x0c',
                        'v' => '\x0b',
                        'u' => {
                            let hex: String = self.input[self.index + 1..].chars().take(4).collect();
                            match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                                Some(c) if hex.len() == 4 => {
                                    for _ in 0..4 {
                                        self.advance();
                                    }
                                    c
                                }
                                _ => {
                                    return self.error(start, format!("Invalid unicode escape [\\u{}]", hex));
                                }
                            }
                        }
                        other => other,
                    };
                    buffer.push(escaped);
                    self.advance();
                }
                other => {
                    buffer.push(other);
                    self.advance();
                }
            }
        }
        self.advance();
        Token::new(start, self.index, TokenType::String, 0.0, buffer)
    }
}
