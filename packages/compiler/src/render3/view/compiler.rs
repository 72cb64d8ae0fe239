//! Render3 View Compiler
//!
//! Emits the creation and update instruction lists of every template level.
//! Each level is one `TemplateDefinitionBuilder` with its own slot counter,
//! binding scope and pending buffers. Slots and pipe slots are handed out
//! during a single pre-order traversal; expressions are converted once the
//! level is complete so references declared further down are in scope.
//! Nested levels compile after their parent, sharing its constant pool.
//! A level reading locals of outer levels declares them again at the start
//! of its update list; listeners declare every local they read.

use super::api::R3ComponentMetadata;
use super::binding_scope::{context_name, BindingScope, LocalKind, ScopeEntry};
use super::expression_converter::ExpressionConverter;
use super::styling::{StylingBuilder, StylingKind};
use crate::constant_pool::ConstantPool;
use crate::expression_parser::{Interpolation, AST};
use crate::metadata::QueryPredicate;
use crate::ml_parser::is_ng_container;
use crate::output::output_ast::*;
use crate::parse_util::{ParseError, ParseSourceFile, ParseSourceSpan};
use crate::render3::r3_identifiers::{Arity, Opcode, MAX_FIXED_INTERPOLATION_ARITY};
use crate::template_parser::*;
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

const TEMPLATE_FN_SUFFIX: &str = "_Template";
const NG_TEMPLATE_TAG: &str = "ng-template";

/// Result of emitting one component template.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    pub program: TemplateProgram,
    pub errors: Vec<ParseError>,
}

#[instrument(skip_all, fields(component = meta.name.as_str()))]
pub fn compile_component_from_metadata(meta: &R3ComponentMetadata, nodes: &[TemplateAst]) -> CompiledTemplate {
    let mut pool = ConstantPool::new();
    let mut errors = Vec::new();
    let root = TemplateDefinitionBuilder::new(
        meta,
        &mut pool,
        &mut errors,
        0,
        meta.name.clone(),
        format!("{}{}", meta.name, TEMPLATE_FN_SUFFIX),
        BindingScope::root(),
    )
    .build(nodes, &[]);
    debug!(
        functions = root.functions().len(),
        constants = pool.len(),
        errors = errors.len(),
        "emitted component template"
    );
    CompiledTemplate {
        program: TemplateProgram {
            component: meta.name.clone(),
            root,
            constants: pool,
            ng_content_selectors: meta.ng_content_selectors.clone(),
        },
        errors,
    }
}

/// Implicit receiver of a converted expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Receiver {
    Context,
    /// Host bindings read from the directive instance
    Directive(u32),
}

impl Receiver {
    /// `None` reads through the component context local.
    fn expression(self) -> Option<Expression> {
        match self {
            Receiver::Context => None,
            Receiver::Directive(slot) => Some(Expression::Instruction {
                opcode: Opcode::LoadDirective,
                args: vec![Expression::number(slot as f64)],
            }),
        }
    }
}

/// An operand whose expression is converted once the level is complete.
enum PendingOperand<'a> {
    Ready(Operand),
    Value(&'a AST, Receiver),
    /// `[s0, e0, ..., sN]` as separate operands, or one array when variadic
    Interpolation(&'a Interpolation, Receiver, bool),
    Handler(&'a AST, Receiver),
}

struct PendingInstruction<'a> {
    opcode: Opcode,
    slot: Option<u32>,
    operands: Vec<PendingOperand<'a>>,
    span: Option<&'a ParseSourceSpan>,
}

impl<'a> PendingInstruction<'a> {
    fn new(opcode: Opcode, slot: Option<u32>, span: Option<&'a ParseSourceSpan>) -> Self {
        PendingInstruction {
            opcode,
            slot,
            operands: Vec::new(),
            span,
        }
    }

    fn ready(mut self, operand: Operand) -> Self {
        self.operands.push(PendingOperand::Ready(operand));
        self
    }

    fn with(mut self, operand: PendingOperand<'a>) -> Self {
        self.operands.push(operand);
        self
    }
}

struct PendingHost<'a> {
    directive_slot: u32,
    element_slot: u32,
    instructions: Vec<PendingInstruction<'a>>,
}

struct NestedTemplate<'a> {
    function_name: String,
    name_prefix: String,
    template: &'a EmbeddedTemplateAst,
}

struct TemplateDefinitionBuilder<'a, 'p> {
    meta: &'a R3ComponentMetadata,
    pool: &'p mut ConstantPool,
    errors: &'p mut Vec<ParseError>,
    level: usize,
    /// Prefix of the names of functions nested in this one
    name_prefix: String,
    function_name: String,
    context_name: String,
    scope: BindingScope,
    slot_count: u32,
    /// Binding slots claimed by instructions during traversal
    binding_slots: u32,
    /// Next binding slot for pipes and pure functions, from `binding_slots` on
    next_var: u32,
    pipe_slots: IndexMap<String, u32>,
    creation: Vec<PendingInstruction<'a>>,
    query_refreshes: Vec<Instruction>,
    variables: Vec<Instruction>,
    references: Vec<Instruction>,
    /// Outer locals read by this level's bindings
    captured_variables: Vec<Instruction>,
    captured_references: Vec<Instruction>,
    captured: HashSet<String>,
    update: Vec<PendingInstruction<'a>>,
    host: Vec<PendingHost<'a>>,
    nested: Vec<NestedTemplate<'a>>,
}

impl<'a, 'p> TemplateDefinitionBuilder<'a, 'p> {
    fn new(
        meta: &'a R3ComponentMetadata,
        pool: &'p mut ConstantPool,
        errors: &'p mut Vec<ParseError>,
        level: usize,
        name_prefix: String,
        function_name: String,
        scope: BindingScope,
    ) -> Self {
        let context_name = context_name(level);
        TemplateDefinitionBuilder {
            meta,
            pool,
            errors,
            level,
            name_prefix,
            function_name,
            context_name,
            scope,
            slot_count: 0,
            binding_slots: 0,
            next_var: 0,
            pipe_slots: IndexMap::new(),
            creation: Vec::new(),
            query_refreshes: Vec::new(),
            variables: Vec::new(),
            references: Vec::new(),
            captured_variables: Vec::new(),
            captured_references: Vec::new(),
            captured: HashSet::new(),
            update: Vec::new(),
            host: Vec::new(),
            nested: Vec::new(),
        }
    }

    fn build(mut self, nodes: &'a [TemplateAst], variables: &'a [VariableAst]) -> TemplateFunction {
        for variable in variables {
            self.declare_variable(variable);
        }
        if self.level == 0 {
            self.root_prelude();
        }
        for node in nodes {
            self.visit_node(node);
        }

        self.next_var = self.binding_slots;
        let bindings: Vec<Instruction> = std::mem::take(&mut self.update)
            .into_iter()
            .map(|pending| self.resolve(pending))
            .collect();
        let mut host = Vec::new();
        for pending in std::mem::take(&mut self.host) {
            let instructions = pending
                .instructions
                .into_iter()
                .map(|instruction| self.resolve(instruction))
                .collect();
            host.push(HostBindings {
                directive_slot: pending.directive_slot,
                element_slot: pending.element_slot,
                instructions,
            });
        }
        let creation: Vec<Instruction> = std::mem::take(&mut self.creation)
            .into_iter()
            .map(|pending| self.resolve(pending))
            .collect();

        let mut update = std::mem::take(&mut self.query_refreshes);
        update.append(&mut self.variables);
        update.append(&mut self.captured_variables);
        update.append(&mut self.references);
        update.append(&mut self.captured_references);
        update.extend(bindings);

        debug!(
            function = self.function_name.as_str(),
            level = self.level,
            decls = self.slot_count,
            vars = self.next_var,
            creation = creation.len(),
            update = update.len(),
            "emitted template level"
        );

        let postfix = std::mem::take(&mut self.nested)
            .into_iter()
            .map(|nested| self.compile_nested(nested))
            .collect();

        TemplateFunction {
            name: self.function_name,
            context: self.context_name,
            creation,
            update,
            host,
            postfix,
            decls: self.slot_count,
            vars: self.next_var,
        }
    }

    fn compile_nested(&mut self, nested: NestedTemplate<'a>) -> TemplateFunction {
        let scope = self.scope.nested();
        TemplateDefinitionBuilder::new(
            self.meta,
            &mut *self.pool,
            &mut *self.errors,
            self.level + 1,
            nested.name_prefix,
            nested.function_name,
            scope,
        )
        .build(&nested.template.children, &nested.template.variables)
    }

    /// `projectionDef` and the view queries of the compiled component.
    fn root_prelude(&mut self) {
        let meta = self.meta;
        if !meta.ng_content_selectors.is_empty() {
            let selectors = self.const_strings(meta.ng_content_selectors.iter().cloned());
            self.creation
                .push(PendingInstruction::new(Opcode::ProjectionDef, None, None).ready(selectors));
        }
        for query in &meta.view_queries {
            let slot = self.allocate_slot();
            let predicate = match &query.predicate {
                QueryPredicate::References(names) => self.const_strings(names.iter().cloned()),
                QueryPredicate::Type(type_name) => Operand::Type(type_name.clone()),
            };
            let read = query.read.clone().map_or(Operand::Null, Operand::Type);
            self.creation.push(
                PendingInstruction::new(Opcode::Query, Some(slot), None)
                    .ready(predicate)
                    .ready(Operand::Bool(query.descendants))
                    .ready(read),
            );
            self.query_refreshes.push(
                Instruction::at(Opcode::QueryRefresh, slot)
                    .with(Operand::Str(query.property_name.clone()))
                    .with(Operand::Bool(query.first)),
            );
        }
    }

    fn visit_node(&mut self, node: &'a TemplateAst) {
        match node {
            TemplateAst::Element(element) => self.visit_element(element),
            TemplateAst::EmbeddedTemplate(template) => self.visit_embedded_template(template),
            TemplateAst::Text(text) => {
                let slot = self.allocate_slot();
                self.creation.push(
                    PendingInstruction::new(Opcode::Text, Some(slot), Some(&text.source_span))
                        .ready(Operand::Str(text.value.clone())),
                );
            }
            TemplateAst::BoundText(text) => {
                let span = Some(&text.source_span);
                let slot = self.allocate_slot();
                self.creation
                    .push(PendingInstruction::new(Opcode::Text, Some(slot), span).ready(Operand::Null));
                self.allocate_pipes([&text.value.ast], &text.source_span);
                if let AST::Interpolation(interpolation) = &text.value.ast {
                    let count = interpolation.expressions.len();
                    if count > 0 {
                        let arity = Arity::for_count(count, MAX_FIXED_INTERPOLATION_ARITY);
                        self.update.push(
                            PendingInstruction::new(Opcode::TextInterpolate(arity), Some(slot), span).with(
                                PendingOperand::Interpolation(interpolation, Receiver::Context, arity.is_variadic()),
                            ),
                        );
                        self.binding_slots += count as u32;
                    }
                }
            }
            TemplateAst::NgContent(ng_content) => {
                let slot = self.allocate_slot();
                self.creation.push(
                    PendingInstruction::new(Opcode::Projection, Some(slot), Some(&ng_content.source_span))
                        .ready(Operand::Number(ng_content.index as f64)),
                );
            }
        }
    }

    fn visit_element(&mut self, element: &'a ElementAst) {
        let span = Some(&element.source_span);
        let slot = self.allocate_slot();
        let attrs = self.static_attributes(&element.attrs, &element.directives);
        let directive_types = self.directive_types(&element.directives);
        let is_container = is_ng_container(&element.name);
        let start = if is_container {
            PendingInstruction::new(Opcode::ElementContainerStart, Some(slot), span)
        } else {
            PendingInstruction::new(Opcode::ElementStart, Some(slot), span).ready(Operand::Str(element.name.clone()))
        };
        self.creation.push(start.ready(attrs).ready(directive_types));

        let directive_slots = self.allocate_directives(&element.directives, span);
        self.declare_references(&element.references, slot, &element.directives, &directive_slots);

        let mut binding_asts: Vec<&'a AST> = directive_input_asts(&element.directives);
        binding_asts.extend(element.inputs.iter().map(|input| &input.value.ast));
        binding_asts.extend(
            element
                .directives
                .iter()
                .flat_map(|d| d.host_properties.iter().map(|p| &p.value.ast)),
        );
        self.allocate_pipes(binding_asts, &element.source_span);

        for output in &element.outputs {
            self.listener(output, Receiver::Context);
        }
        self.host_listeners(&element.directives, &directive_slots);

        let mut styling = StylingBuilder::new();
        let mut plain_bindings = Vec::new();
        let mut styling_attributes = Vec::new();
        for input in &element.inputs {
            if styling.register(input) {
                continue;
            }
            if input.is_styling_attribute() {
                styling_attributes.push(input);
            } else {
                plain_bindings.push(input);
            }
        }
        if styling.has_bindings() {
            let class_names = self.const_strings_or_null(styling.class_names());
            let style_names = self.const_strings_or_null(styling.style_names());
            self.creation.push(
                PendingInstruction::new(Opcode::Styling, None, span)
                    .ready(class_names)
                    .ready(style_names),
            );
        }

        self.directive_inputs(slot, &element.directives, span);
        for binding in plain_bindings {
            self.push_update(bound_property(slot, binding, Receiver::Context));
        }
        let styling_update = styling_instructions(slot, &styling, Receiver::Context, span);
        self.binding_slots += styling.binding_count();
        self.update.extend(styling_update);
        for binding in styling_attributes {
            self.push_update(bound_property(slot, binding, Receiver::Context));
        }
        self.host_bindings(slot, &element.directives, &directive_slots);

        for child in &element.children {
            self.visit_node(child);
        }

        let end = if is_container {
            Opcode::ElementContainerEnd
        } else {
            Opcode::ElementEnd
        };
        self.creation.push(PendingInstruction::new(end, None, span));
    }

    fn visit_embedded_template(&mut self, template: &'a EmbeddedTemplateAst) {
        let span = Some(&template.source_span);
        let slot = self.allocate_slot();
        let tag = template_tag(template);
        let tag_name = tag.replace('-', "_");
        let (function_name, name_prefix) = if self.meta.emit_template_names {
            let prefix = format!("{}_{}_{}", self.name_prefix, tag_name, slot);
            (format!("{}{}", prefix, TEMPLATE_FN_SUFFIX), prefix)
        } else {
            let name = format!("{}_{}", self.function_name, slot);
            (name.clone(), name)
        };

        let attrs = self.static_attributes(&template.attrs, &template.directives);
        let directive_types = self.directive_types(&template.directives);
        self.creation.push(
            PendingInstruction::new(Opcode::Template, Some(slot), span)
                .ready(Operand::Template(function_name.clone()))
                .ready(Operand::Str(tag))
                .ready(attrs)
                .ready(directive_types),
        );

        let directive_slots = self.allocate_directives(&template.directives, span);
        self.declare_references(&template.references, slot, &template.directives, &directive_slots);
        let mut binding_asts = directive_input_asts(&template.directives);
        binding_asts.extend(
            template
                .directives
                .iter()
                .flat_map(|d| d.host_properties.iter().map(|p| &p.value.ast)),
        );
        self.allocate_pipes(binding_asts, &template.source_span);

        for output in &template.outputs {
            self.listener(output, Receiver::Context);
        }
        self.host_listeners(&template.directives, &directive_slots);
        self.directive_inputs(slot, &template.directives, span);
        self.host_bindings(slot, &template.directives, &directive_slots);

        self.nested.push(NestedTemplate {
            function_name,
            name_prefix,
            template,
        });
    }

    fn declare_variable(&mut self, variable: &'a VariableAst) {
        let local = format!("{}_v{}", variable.name, self.level);
        let kind = LocalKind::Variable {
            key: variable.value.clone(),
        };
        if let Err(msg) = self.scope.set(&variable.name, kind, local.clone()) {
            self.report(Some(&variable.source_span), msg);
            return;
        }
        let value = Expression::var(&self.context_name).prop(&variable.value);
        self.variables.push(
            Instruction::new(Opcode::Variable, None)
                .with(Operand::Str(local))
                .with(Operand::Expr(value)),
        );
    }

    /// One `localRef` slot per reference, read back at the start of the update list.
    fn declare_references(
        &mut self,
        references: &'a [ReferenceAst],
        node_slot: u32,
        directives: &[DirectiveAst],
        directive_slots: &[u32],
    ) {
        for reference in references {
            let slot = self.allocate_slot();
            let target = match &reference.value {
                ReferenceTarget::Directive { type_name } => directives
                    .iter()
                    .position(|d| &d.directive.type_name == type_name)
                    .and_then(|index| directive_slots.get(index).copied())
                    .unwrap_or(node_slot),
                ReferenceTarget::Element | ReferenceTarget::TemplateRef => node_slot,
            };
            self.creation.push(
                PendingInstruction::new(Opcode::LocalRef, Some(slot), Some(&reference.source_span))
                    .ready(Operand::Str(reference.name.clone()))
                    .ready(Operand::Slot(target)),
            );
            let local = format!("{}_r{}", reference.name, self.level);
            match self.scope.set(&reference.name, LocalKind::Reference { slot }, local.clone()) {
                Ok(()) => self
                    .references
                    .push(Instruction::at(Opcode::Reference, slot).with(Operand::Str(local))),
                Err(msg) => self.report(Some(&reference.source_span), msg),
            }
        }
    }

    /// The component slot first, then one slot per directive in match order.
    fn allocate_directives(&mut self, directives: &[DirectiveAst], span: Option<&'a ParseSourceSpan>) -> Vec<u32> {
        directives
            .iter()
            .map(|directive| {
                let slot = self.allocate_slot();
                let opcode = if directive.directive.is_component {
                    Opcode::Component
                } else {
                    Opcode::Directive
                };
                self.creation.push(
                    PendingInstruction::new(opcode, Some(slot), span)
                        .ready(Operand::Type(directive.directive.type_name.clone())),
                );
                slot
            })
            .collect()
    }

    /// A pipe gets a slot the first time its name is used at this level.
    fn allocate_pipes(&mut self, asts: impl IntoIterator<Item = &'a AST>, span: &'a ParseSourceSpan) {
        let mut names = Vec::new();
        for ast in asts {
            ast.walk(&mut |node| {
                if let AST::BindingPipe(pipe) = node {
                    names.push(pipe.name.clone());
                }
            });
        }
        for name in names {
            if self.pipe_slots.contains_key(&name) {
                continue;
            }
            let type_name = match self.meta.pipes.get(&name) {
                Some(pipe) => pipe.type_name.clone(),
                None => {
                    self.report(Some(span), format!("The pipe '{}' could not be found", name));
                    continue;
                }
            };
            let slot = self.allocate_slot();
            self.creation.push(
                PendingInstruction::new(Opcode::Pipe, Some(slot), Some(span))
                    .ready(Operand::Str(name.clone()))
                    .ready(Operand::Type(type_name)),
            );
            self.pipe_slots.insert(name, slot);
        }
    }

    fn listener(&mut self, event: &'a BoundEventAst, receiver: Receiver) {
        let mut instruction = PendingInstruction::new(Opcode::Listener, None, Some(&event.source_span))
            .ready(Operand::Str(event.name.clone()));
        if let Some(target) = &event.target {
            instruction = instruction.ready(Operand::Str(target.clone()));
        }
        self.creation
            .push(instruction.with(PendingOperand::Handler(&event.handler.ast, receiver)));
    }

    fn host_listeners(&mut self, directives: &'a [DirectiveAst], directive_slots: &[u32]) {
        for (directive, &slot) in directives.iter().zip(directive_slots) {
            for event in &directive.host_events {
                self.listener(event, Receiver::Directive(slot));
            }
        }
    }

    /// Directive inputs bind on the node under their template name, once per name.
    fn directive_inputs(&mut self, slot: u32, directives: &'a [DirectiveAst], span: Option<&'a ParseSourceSpan>) {
        let mut seen = HashSet::new();
        for input in directives.iter().flat_map(|d| &d.inputs) {
            if input.is_literal || !seen.insert(input.template_name.as_str()) {
                continue;
            }
            let binding = bound_value(
                slot,
                BindingFamily::Property,
                &input.template_name,
                &input.value.ast,
                Receiver::Context,
                span,
            );
            self.push_update(binding);
        }
    }

    fn host_bindings(&mut self, element_slot: u32, directives: &'a [DirectiveAst], directive_slots: &[u32]) {
        for (directive, &directive_slot) in directives.iter().zip(directive_slots) {
            if directive.host_properties.is_empty() {
                continue;
            }
            let receiver = Receiver::Directive(directive_slot);
            let span = Some(&directive.source_span);
            let mut styling = StylingBuilder::new();
            let mut instructions = Vec::new();
            for property in &directive.host_properties {
                if styling.register(property) {
                    continue;
                }
                if let Some((instruction, vars)) = bound_property(element_slot, property, receiver) {
                    instructions.push(instruction);
                    self.binding_slots += vars;
                }
            }
            instructions.extend(styling_instructions(element_slot, &styling, receiver, span));
            self.binding_slots += styling.binding_count();
            self.host.push(PendingHost {
                directive_slot,
                element_slot,
                instructions,
            });
        }
    }

    fn push_update(&mut self, binding: Option<(PendingInstruction<'a>, u32)>) {
        if let Some((instruction, vars)) = binding {
            self.update.push(instruction);
            self.binding_slots += vars;
        }
    }

    /// Static attributes of the node followed by its directives' host attributes.
    fn static_attributes(&mut self, attrs: &[AttrAst], directives: &[DirectiveAst]) -> Operand {
        let mut seen = HashSet::new();
        let mut values = Vec::new();
        let host_attributes = directives.iter().flat_map(|d| d.directive.host_attributes.iter());
        for (name, value) in attrs
            .iter()
            .map(|attr| (&attr.name, &attr.value))
            .chain(host_attributes)
        {
            if seen.insert(name.as_str()) {
                values.push(name.clone());
                values.push(value.clone());
            }
        }
        self.const_strings_or_null(values)
    }

    fn directive_types(&mut self, directives: &[DirectiveAst]) -> Operand {
        let types: Vec<Expression> = directives
            .iter()
            .filter(|d| !d.directive.is_component)
            .map(|d| Expression::External {
                name: d.directive.type_name.clone(),
            })
            .collect();
        if types.is_empty() {
            return Operand::Null;
        }
        Operand::Const(self.pool.get_const_literal(Expression::LiteralArray { entries: types }))
    }

    fn const_strings(&mut self, values: impl IntoIterator<Item = String>) -> Operand {
        let entries = values.into_iter().map(Expression::str).collect();
        Operand::Const(self.pool.get_const_literal(Expression::LiteralArray { entries }))
    }

    fn const_strings_or_null(&mut self, values: Vec<String>) -> Operand {
        if values.is_empty() {
            Operand::Null
        } else {
            self.const_strings(values)
        }
    }

    fn allocate_slot(&mut self) -> u32 {
        let slot = self.slot_count;
        self.slot_count += 1;
        slot
    }

    fn resolve(&mut self, pending: PendingInstruction<'a>) -> Instruction {
        let mut operands: SmallVec<[Operand; 4]> = SmallVec::new();
        for operand in pending.operands {
            match operand {
                PendingOperand::Ready(operand) => operands.push(operand),
                PendingOperand::Value(ast, receiver) => {
                    let (expr, captures) = self.convert(receiver, false, pending.span, |c| c.convert_binding(ast));
                    self.capture(captures);
                    operands.push(Operand::Expr(expr));
                }
                PendingOperand::Interpolation(interpolation, receiver, variadic) => {
                    let (parts, captures) =
                        self.convert(receiver, false, pending.span, |c| c.convert_interpolation(interpolation));
                    self.capture(captures);
                    if variadic {
                        operands.push(Operand::Expr(Expression::LiteralArray { entries: parts }));
                    } else {
                        operands.extend(parts.into_iter().map(|part| match part {
                            Expression::Literal {
                                value: Literal::Str(s),
                            } => Operand::Str(s),
                            other => Operand::Expr(other),
                        }));
                    }
                }
                PendingOperand::Handler(ast, receiver) => {
                    let (body, captures) = self.convert(receiver, true, pending.span, |c| c.convert_action(ast));
                    let level = self.level;
                    let mut statements: Vec<Statement> = captures
                        .into_iter()
                        .map(|entry| Statement::DeclareVar {
                            value: entry.value_at(level),
                            name: entry.name,
                        })
                        .collect();
                    statements.extend(body);
                    operands.push(Operand::Statements(statements));
                }
            }
        }
        Instruction {
            opcode: pending.opcode,
            slot: pending.slot,
            operands,
        }
    }

    fn convert<T>(
        &mut self,
        receiver: Receiver,
        in_listener: bool,
        span: Option<&ParseSourceSpan>,
        f: impl FnOnce(&mut ExpressionConverter<'_>) -> T,
    ) -> (T, Vec<ScopeEntry>) {
        let event_scope;
        let scope = if in_listener {
            event_scope = self.scope.with_event();
            &event_scope
        } else {
            &self.scope
        };
        let mut converter = ExpressionConverter::new(
            scope,
            receiver.expression(),
            &self.pipe_slots,
            &mut *self.pool,
            &mut self.next_var,
        );
        let result = f(&mut converter);
        let captures = converter.take_captures();
        let messages = converter.take_errors();
        for msg in messages {
            self.report(span, msg);
        }
        (result, captures)
    }

    /// Declares outer locals read by an update binding, once per level.
    fn capture(&mut self, entries: Vec<ScopeEntry>) {
        for entry in entries {
            if !self.captured.insert(entry.name.clone()) {
                continue;
            }
            match entry.kind {
                LocalKind::Reference { slot } => self.captured_references.push(
                    Instruction::at(Opcode::Reference, slot)
                        .with(Operand::Str(entry.name.clone()))
                        .with(Operand::Number((self.level - entry.level) as f64)),
                ),
                _ => self.captured_variables.push(
                    Instruction::new(Opcode::Variable, None)
                        .with(Operand::Str(entry.name.clone()))
                        .with(Operand::Expr(entry.value_at(self.level))),
                ),
            }
        }
    }

    fn report(&mut self, span: Option<&ParseSourceSpan>, msg: impl Into<String>) {
        let span = span
            .cloned()
            .unwrap_or_else(|| ParseSourceSpan::empty(Arc::new(ParseSourceFile::new("", self.meta.name.clone()))));
        self.errors.push(ParseError::new(span, msg));
    }
}

/// A structural wrapper shares its span with the element it wraps; it is
/// named after that element.
fn template_tag(template: &EmbeddedTemplateAst) -> String {
    match template.children.as_slice() {
        [TemplateAst::Element(element)] if element.source_span == template.source_span => element.name.clone(),
        _ => NG_TEMPLATE_TAG.to_string(),
    }
}

fn directive_input_asts(directives: &[DirectiveAst]) -> Vec<&AST> {
    directives
        .iter()
        .flat_map(|d| d.inputs.iter())
        .filter(|input| !input.is_literal)
        .map(|input| &input.value.ast)
        .collect()
}

#[derive(Debug, Clone, Copy)]
enum BindingFamily {
    Property,
    Attribute,
}

impl BindingFamily {
    fn plain(self) -> Opcode {
        match self {
            BindingFamily::Property => Opcode::Property,
            BindingFamily::Attribute => Opcode::Attribute,
        }
    }

    fn interpolated(self, arity: Arity) -> Opcode {
        match self {
            BindingFamily::Property => Opcode::PropertyInterpolate(arity),
            BindingFamily::Attribute => Opcode::AttributeInterpolate(arity),
        }
    }
}

/// `property`/`attribute` for an element-level binding, with the binding
/// slots it consumes. Styling bindings are handled by `StylingBuilder`.
fn bound_property<'a>(
    slot: u32,
    binding: &'a BoundElementPropertyAst,
    receiver: Receiver,
) -> Option<(PendingInstruction<'a>, u32)> {
    let family = match binding.kind {
        PropertyBindingType::Property => BindingFamily::Property,
        PropertyBindingType::Attribute => BindingFamily::Attribute,
        PropertyBindingType::Class | PropertyBindingType::Style => return None,
    };
    bound_value(
        slot,
        family,
        &binding.name,
        &binding.value.ast,
        receiver,
        Some(&binding.source_span),
    )
}

/// An interpolated value selects the `...InterpolateN` form by its number of
/// expressions; a value without any produces no instruction.
fn bound_value<'a>(
    slot: u32,
    family: BindingFamily,
    name: &str,
    ast: &'a AST,
    receiver: Receiver,
    span: Option<&'a ParseSourceSpan>,
) -> Option<(PendingInstruction<'a>, u32)> {
    let target = Operand::Str(name.to_string());
    if let AST::Interpolation(interpolation) = ast {
        let count = interpolation.expressions.len();
        if count == 0 {
            return None;
        }
        let arity = Arity::for_count(count, MAX_FIXED_INTERPOLATION_ARITY);
        let instruction = PendingInstruction::new(family.interpolated(arity), Some(slot), span)
            .ready(target)
            .with(PendingOperand::Interpolation(interpolation, receiver, arity.is_variadic()));
        return Some((instruction, count as u32));
    }
    let instruction = PendingInstruction::new(family.plain(), Some(slot), span)
        .ready(target)
        .with(PendingOperand::Value(ast, receiver));
    Some((instruction, 1))
}

/// `stylingMap`, then `styleProp`/`classProp` by name index, then `stylingApply`.
fn styling_instructions<'a>(
    slot: u32,
    styling: &StylingBuilder<'a>,
    receiver: Receiver,
    span: Option<&'a ParseSourceSpan>,
) -> Vec<PendingInstruction<'a>> {
    if !styling.has_bindings() {
        return Vec::new();
    }
    let mut instructions = Vec::new();
    if styling.has_map() {
        let map_operand = |binding: Option<&'a BoundElementPropertyAst>| match binding {
            Some(binding) => PendingOperand::Value(&binding.value.ast, receiver),
            None => PendingOperand::Ready(Operand::Null),
        };
        instructions.push(
            PendingInstruction::new(Opcode::StylingMap, Some(slot), span)
                .with(map_operand(styling.class_map()))
                .with(map_operand(styling.style_map())),
        );
    }
    for keyed in styling.keyed_bindings() {
        let opcode = match keyed.kind {
            StylingKind::Style => Opcode::StyleProp,
            StylingKind::Class => Opcode::ClassProp,
        };
        let mut instruction = PendingInstruction::new(opcode, Some(slot), Some(&keyed.binding.source_span))
            .ready(Operand::Number(keyed.index as f64))
            .with(PendingOperand::Value(&keyed.binding.value.ast, receiver));
        if let (StylingKind::Style, Some(unit)) = (keyed.kind, &keyed.binding.unit) {
            instruction = instruction.ready(Operand::Str(unit.clone()));
        }
        instructions.push(instruction);
    }
    instructions.push(PendingInstruction::new(Opcode::StylingApply, Some(slot), span));
    instructions
}
