//! Attribute name classification.
//!
//! A small recursive-descent scanner over the binding prefixes:
//!
//! ```text
//! name     := "data-"? (bracket | keyword | sigil | "template" | literal)
//! bracket  := "[(" target ")]" | "[" target "]" | "(" target ")"
//! keyword  := ("bindon-" | "bind-" | "on-" | "var-" | "ref-" | "let-") target
//! sigil    := ("#" | "*") target
//! ```

/// What a raw attribute name binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// `name="value"`, possibly interpolated
    Literal,
    /// `[name]` or `bind-name`
    Property,
    /// `(name)` or `on-name`
    Event,
    /// `[(name)]` or `bindon-name`
    TwoWay,
    /// `#name` or `ref-name`
    Reference,
    /// `let-name`, valid on templates only
    Variable,
    /// `var-name`: a variable on templates, a reference elsewhere
    Var,
    /// `*name`, or a literal `template` attribute with an empty name
    Template,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeName {
    pub kind: AttributeKind,
    /// Binding target with every prefix removed
    pub name: String,
}

impl AttributeName {
    pub fn parse(raw: &str) -> AttributeName {
        let mut scanner = Scanner { input: raw, pos: 0 };
        scanner.eat_keyword("data-");
        scanner.attribute().unwrap_or_else(|| AttributeName {
            kind: AttributeKind::Literal,
            name: raw.to_string(),
        })
    }

    pub fn is_bound(&self) -> bool {
        !matches!(self.kind, AttributeKind::Literal)
    }
}

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    /// Keywords are matched case-insensitively.
    fn eat_keyword(&mut self, keyword: &str) -> bool {
        match self.rest().get(..keyword.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(keyword) => {
                self.pos += keyword.len();
                true
            }
            _ => false,
        }
    }

    fn attribute(&mut self) -> Option<AttributeName> {
        if self.eat("[(") {
            return self.enclosed(")]", AttributeKind::TwoWay);
        }
        if self.eat("[") {
            return self.enclosed("]", AttributeKind::Property);
        }
        if self.eat("(") {
            return self.enclosed(")", AttributeKind::Event);
        }
        if self.eat("#") {
            return self.target(AttributeKind::Reference);
        }
        if self.eat("*") {
            return self.target(AttributeKind::Template);
        }
        const KEYWORDS: [(&str, AttributeKind); 6] = [
            ("bindon-", AttributeKind::TwoWay),
            ("bind-", AttributeKind::Property),
            ("on-", AttributeKind::Event),
            ("var-", AttributeKind::Var),
            ("ref-", AttributeKind::Reference),
            ("let-", AttributeKind::Variable),
        ];
        for (keyword, kind) in KEYWORDS {
            if self.eat_keyword(keyword) {
                return self.target(kind);
            }
        }
        if self.rest().eq_ignore_ascii_case("template") {
            return Some(AttributeName {
                kind: AttributeKind::Template,
                name: String::new(),
            });
        }
        let name = self.rest();
        if name.is_empty() {
            return None;
        }
        Some(AttributeName {
            kind: AttributeKind::Literal,
            name: name.to_string(),
        })
    }

    /// A target followed by `close` at the very end of the input.
    fn enclosed(&mut self, close: &str, kind: AttributeKind) -> Option<AttributeName> {
        let name = self.rest().strip_suffix(close)?;
        if name.is_empty() || name.contains(|c| matches!(c, '[' | ']' | '(' | ')')) {
            return None;
        }
        Some(AttributeName {
            kind,
            name: name.to_string(),
        })
    }

    fn target(&mut self, kind: AttributeKind) -> Option<AttributeName> {
        let name = self.rest();
        if name.is_empty() {
            return None;
        }
        Some(AttributeName {
            kind,
            name: name.to_string(),
        })
    }
}
