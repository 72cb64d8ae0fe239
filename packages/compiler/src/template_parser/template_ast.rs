//! Template AST
//!
//! The directive-resolved representation of one component's markup. Built
//! once by the template parser and consumed once by the instruction emitter.

use crate::expression_parser::ASTWithSource;
use crate::metadata::DirectiveDescriptor;
use crate::parse_util::ParseSourceSpan;
use crate::schema::SecurityContext;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum TemplateAst {
    Element(ElementAst),
    EmbeddedTemplate(EmbeddedTemplateAst),
    Text(TextAst),
    BoundText(BoundTextAst),
    NgContent(NgContentAst),
}

impl TemplateAst {
    pub fn source_span(&self) -> &ParseSourceSpan {
        match self {
            TemplateAst::Element(e) => &e.source_span,
            TemplateAst::EmbeddedTemplate(t) => &t.source_span,
            TemplateAst::Text(t) => &t.source_span,
            TemplateAst::BoundText(t) => &t.source_span,
            TemplateAst::NgContent(n) => &n.source_span,
        }
    }

    pub fn ng_content_index(&self) -> Option<usize> {
        match self {
            TemplateAst::Element(e) => e.ng_content_index,
            TemplateAst::EmbeddedTemplate(t) => t.ng_content_index,
            TemplateAst::Text(t) => t.ng_content_index,
            TemplateAst::BoundText(t) => t.ng_content_index,
            TemplateAst::NgContent(n) => n.ng_content_index,
        }
    }

    pub fn children(&self) -> &[TemplateAst] {
        match self {
            TemplateAst::Element(e) => &e.children,
            TemplateAst::EmbeddedTemplate(t) => &t.children,
            _ => &[],
        }
    }
}

/// A plain attribute literal. Attributes only appear in the `attrs` list of
/// elements and templates, never as child nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttrAst {
    pub name: String,
    pub value: String,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextAst {
    pub value: String,
    pub ng_content_index: Option<usize>,
    pub source_span: ParseSourceSpan,
}

/// Text holding at least one interpolation; `value.ast` is an `Interpolation`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundTextAst {
    pub value: ASTWithSource,
    pub ng_content_index: Option<usize>,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PropertyBindingType {
    /// A DOM property, `[title]`
    Property,
    /// `[attr.role]`
    Attribute,
    /// `[class.active]`, or the class map `[class]`
    Class,
    /// `[style.width.px]`, or the style map `[style]`
    Style,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundElementPropertyAst {
    /// Target name; empty for `[class]` and `[style]` map bindings
    pub name: String,
    pub kind: PropertyBindingType,
    pub security_context: SecurityContext,
    pub value: ASTWithSource,
    pub unit: Option<String>,
    pub source_span: ParseSourceSpan,
}

impl BoundElementPropertyAst {
    pub fn is_styling_map(&self) -> bool {
        matches!(self.kind, PropertyBindingType::Class | PropertyBindingType::Style) && self.name.is_empty()
    }

    /// `[attr.style]` and `[attr.class]`: plain attribute writes that bypass styling.
    pub fn is_styling_attribute(&self) -> bool {
        self.kind == PropertyBindingType::Attribute && (self.name == "style" || self.name == "class")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundEventAst {
    pub name: String,
    /// `window`, `document` or `body` for global listeners
    pub target: Option<String>,
    pub handler: ASTWithSource,
    pub source_span: ParseSourceSpan,
}

impl BoundEventAst {
    pub fn full_name(&self) -> String {
        match &self.target {
            Some(target) => format!("{}:{}", target, self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "target")]
pub enum ReferenceTarget {
    /// The native element
    Element,
    /// The `TemplateRef` of an embedded template
    TemplateRef,
    /// A directive instance on the same node
    Directive { type_name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceAst {
    pub name: String,
    pub value: ReferenceTarget,
    pub source_span: ParseSourceSpan,
}

/// A template variable: `name` reads context key `value`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableAst {
    pub name: String,
    pub value: String,
    pub source_span: ParseSourceSpan,
}

/// One directive input bound on a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundDirectivePropertyAst {
    /// Property on the directive class
    pub directive_name: String,
    /// Name the template binds it under
    pub template_name: String,
    pub value: ASTWithSource,
    /// Bound from a plain attribute rather than a property binding
    pub is_literal: bool,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectiveAst {
    pub directive: Arc<DirectiveDescriptor>,
    pub inputs: Vec<BoundDirectivePropertyAst>,
    pub host_properties: Vec<BoundElementPropertyAst>,
    pub host_events: Vec<BoundEventAst>,
    /// Reference names on the node resolved to this directive
    pub export_as_vars: Vec<String>,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementAst {
    pub name: String,
    pub attrs: Vec<AttrAst>,
    pub inputs: Vec<BoundElementPropertyAst>,
    pub outputs: Vec<BoundEventAst>,
    pub references: Vec<ReferenceAst>,
    /// Component first, then the other directives in declaration order
    pub directives: Vec<DirectiveAst>,
    pub children: Vec<TemplateAst>,
    pub ng_content_index: Option<usize>,
    pub source_span: ParseSourceSpan,
}

impl ElementAst {
    pub fn component(&self) -> Option<&DirectiveAst> {
        self.directives.iter().find(|d| d.directive.is_component)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddedTemplateAst {
    pub attrs: Vec<AttrAst>,
    pub outputs: Vec<BoundEventAst>,
    pub references: Vec<ReferenceAst>,
    pub variables: Vec<VariableAst>,
    pub directives: Vec<DirectiveAst>,
    pub children: Vec<TemplateAst>,
    pub ng_content_index: Option<usize>,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NgContentAst {
    /// Projection slot, numbered in document order across the template
    pub index: usize,
    pub ng_content_index: Option<usize>,
    pub source_span: ParseSourceSpan,
}
