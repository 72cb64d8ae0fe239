//! Program Printer
//!
//! Renders a compiled program as deterministic pseudo-code, one function per
//! template level:
//!
//! ```text
//! function App_Template(rf, ctx) {
//!   if (rf & 1) {
//!     elementStart(0, 'div');
//!     elementEnd();
//!   }
//!   if (rf & 2) {
//!     property(0, 'title', ctx.title);
//!   }
//! }
//! ```

use crate::constant_pool::ConstantPool;
use crate::output::output_ast::*;
use crate::render3::r3_identifiers::{Opcode, RenderFlags};
use once_cell::sync::Lazy;
use regex::Regex;

const INDENT_WITH: &str = "  ";

static LEGAL_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_$][0-9a-zA-Z_$]*$").expect("static regex"));

#[derive(Debug, Clone)]
struct EmittedLine {
    parts: Vec<String>,
    indent: usize,
}

impl EmittedLine {
    fn new(indent: usize) -> Self {
        EmittedLine {
            parts: Vec::new(),
            indent,
        }
    }
}

/// Line buffer with indentation tracking.
pub struct EmitterVisitorContext {
    lines: Vec<EmittedLine>,
    indent: usize,
}

impl EmitterVisitorContext {
    pub fn create_root() -> Self {
        EmitterVisitorContext {
            lines: vec![EmittedLine::new(0)],
            indent: 0,
        }
    }

    fn current_line(&mut self) -> &mut EmittedLine {
        if self.lines.is_empty() {
            self.lines.push(EmittedLine::new(self.indent));
        }
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }

    pub fn print(&mut self, part: &str) {
        if !part.is_empty() {
            self.current_line().parts.push(part.to_string());
        }
    }

    pub fn println(&mut self, last_part: &str) {
        self.print(last_part);
        self.lines.push(EmittedLine::new(self.indent));
    }

    pub fn line_is_empty(&self) -> bool {
        self.lines.last().map_or(true, |line| line.parts.is_empty())
    }

    pub fn inc_indent(&mut self) {
        self.indent += 1;
        if self.line_is_empty() {
            self.current_line().indent = self.indent;
        }
    }

    pub fn dec_indent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        if self.line_is_empty() {
            self.current_line().indent = self.indent;
        }
    }

    pub fn to_source(&self) -> String {
        let mut lines: Vec<String> = self
            .lines
            .iter()
            .map(|line| {
                if line.parts.is_empty() {
                    String::new()
                } else {
                    format!("{}{}", INDENT_WITH.repeat(line.indent), line.parts.join(""))
                }
            })
            .collect();
        while lines.last().map_or(false, String::is_empty) {
            lines.pop();
        }
        lines.join("\n")
    }
}

/// Quotes `input` as a single-quoted string literal.
pub fn escape_string(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len() + 2);
    escaped.push('\'');
    for c in input.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(c),
        }
    }
    escaped.push('\'');
    escaped
}

/// Map keys and property names print bare when they are legal identifiers.
pub fn escape_identifier(input: &str, always_quote: bool) -> String {
    if !always_quote && LEGAL_IDENTIFIER.is_match(input) {
        input.to_string()
    } else {
        escape_string(input)
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

pub fn print_program(program: &TemplateProgram) -> String {
    let mut ctx = EmitterVisitorContext::create_root();
    print_constants(&program.constants, &mut ctx);
    print_function(&program.root, &mut ctx);
    ctx.to_source()
}

fn print_constants(pool: &ConstantPool, ctx: &mut EmitterVisitorContext) {
    for entry in pool.entries() {
        ctx.print(&format!("const {} = ", entry.name));
        print_expression(&entry.value, ctx);
        ctx.println(";");
    }
}

fn print_function(function: &TemplateFunction, ctx: &mut EmitterVisitorContext) {
    ctx.println(&format!("function {}(rf, {}) {{", function.name, function.context));
    ctx.inc_indent();
    if !function.creation.is_empty() {
        ctx.println(&format!("if (rf & {}) {{", RenderFlags::CREATE.bits()));
        ctx.inc_indent();
        print_instructions(&function.creation, ctx);
        ctx.dec_indent();
        ctx.println("}");
    }
    if !function.update.is_empty() || !function.host.is_empty() {
        ctx.println(&format!("if (rf & {}) {{", RenderFlags::UPDATE.bits()));
        ctx.inc_indent();
        print_instructions(&function.update, ctx);
        for host in &function.host {
            ctx.println(&format!("hostBindings({}, {}) {{", host.directive_slot, host.element_slot));
            ctx.inc_indent();
            print_instructions(&host.instructions, ctx);
            ctx.dec_indent();
            ctx.println("}");
        }
        ctx.dec_indent();
        ctx.println("}");
    }
    ctx.dec_indent();
    ctx.println("}");
    for nested in &function.postfix {
        print_function(nested, ctx);
    }
}

fn print_instructions(instructions: &[Instruction], ctx: &mut EmitterVisitorContext) {
    for instruction in instructions {
        print_instruction(instruction, ctx);
    }
}

fn print_instruction(instruction: &Instruction, ctx: &mut EmitterVisitorContext) {
    match (instruction.opcode, instruction.operands.as_slice()) {
        // const item_v1 = ctx1.$implicit;
        (Opcode::Variable, [Operand::Str(name), value]) => {
            ctx.print(&format!("const {} = ", name));
            print_operand(value, ctx);
            ctx.println(";");
            return;
        }
        // const el_r0 = reference(2);
        (Opcode::Reference, [Operand::Str(name), rest @ ..]) => {
            ctx.print(&format!("const {} = reference(", name));
            print_arguments(instruction.slot, rest, ctx);
            ctx.println(");");
            return;
        }
        _ => {}
    }
    ctx.print(&instruction.opcode.name());
    ctx.print("(");
    print_arguments(instruction.slot, &instruction.operands, ctx);
    ctx.println(");");
}

fn print_arguments(slot: Option<u32>, operands: &[Operand], ctx: &mut EmitterVisitorContext) {
    let mut first = true;
    if let Some(slot) = slot {
        ctx.print(&slot.to_string());
        first = false;
    }
    for operand in operands {
        if !first {
            ctx.print(", ");
        }
        first = false;
        print_operand(operand, ctx);
    }
}

fn print_operand(operand: &Operand, ctx: &mut EmitterVisitorContext) {
    match operand {
        Operand::Null => ctx.print("null"),
        Operand::Bool(value) => ctx.print(if *value { "true" } else { "false" }),
        Operand::Number(value) => ctx.print(&format_number(*value)),
        Operand::Str(value) => ctx.print(&escape_string(value)),
        Operand::Slot(slot) => ctx.print(&slot.to_string()),
        Operand::Const(index) => ctx.print(&ConstantPool::name_of(*index)),
        Operand::Type(name) | Operand::Template(name) => ctx.print(name),
        Operand::Expr(expr) => print_expression(expr, ctx),
        Operand::Statements(statements) => print_block("function ($event)", statements, ctx),
    }
}

fn print_block(head: &str, statements: &[Statement], ctx: &mut EmitterVisitorContext) {
    ctx.println(&format!("{} {{", head));
    ctx.inc_indent();
    for statement in statements {
        print_statement(statement, ctx);
    }
    ctx.dec_indent();
    ctx.print("}");
}

fn print_statement(statement: &Statement, ctx: &mut EmitterVisitorContext) {
    match statement {
        Statement::Expression { expr } => print_expression(expr, ctx),
        Statement::Return { value } => {
            ctx.print("return ");
            print_expression(value, ctx);
        }
        Statement::DeclareVar { name, value } => {
            ctx.print(&format!("const {} = ", name));
            print_expression(value, ctx);
        }
    }
    ctx.println(";");
}

fn print_expression(expr: &Expression, ctx: &mut EmitterVisitorContext) {
    print_nested(expr, false, ctx);
}

/// Operators are parenthesized whenever they appear inside another expression.
fn print_nested(expr: &Expression, nested: bool, ctx: &mut EmitterVisitorContext) {
    match expr {
        Expression::Literal { value } => ctx.print(&match value {
            Literal::Null => "null".to_string(),
            Literal::Undefined => "undefined".to_string(),
            Literal::Bool(b) => b.to_string(),
            Literal::Number(n) => format_number(*n),
            Literal::Str(s) => escape_string(s),
        }),
        Expression::ReadVar { name } => ctx.print(name),
        Expression::ReadProp { receiver, name } => {
            print_nested(receiver, true, ctx);
            ctx.print(".");
            ctx.print(name);
        }
        Expression::ReadKey { receiver, index } => {
            print_nested(receiver, true, ctx);
            ctx.print("[");
            print_expression(index, ctx);
            ctx.print("]");
        }
        Expression::WriteVar { name, value } => {
            ctx.print(name);
            ctx.print(" = ");
            print_expression(value, ctx);
        }
        Expression::WriteProp { receiver, name, value } => {
            print_nested(receiver, true, ctx);
            ctx.print(&format!(".{} = ", name));
            print_expression(value, ctx);
        }
        Expression::WriteKey { receiver, index, value } => {
            print_nested(receiver, true, ctx);
            ctx.print("[");
            print_expression(index, ctx);
            ctx.print("] = ");
            print_expression(value, ctx);
        }
        Expression::Call { receiver, args } => {
            print_nested(receiver, true, ctx);
            print_call_arguments(args, ctx);
        }
        Expression::Instruction { opcode, args } => {
            ctx.print(&opcode.name());
            print_call_arguments(args, ctx);
        }
        Expression::Binary { operator, left, right } => {
            parenthesized(nested, ctx, |ctx| {
                print_nested(left, true, ctx);
                ctx.print(&format!(" {} ", operator));
                print_nested(right, true, ctx);
            });
        }
        Expression::Not { expr } => {
            ctx.print("!");
            print_nested(expr, true, ctx);
        }
        Expression::Unary { operator, expr } => {
            ctx.print(operator);
            print_nested(expr, true, ctx);
        }
        Expression::Conditional {
            condition,
            true_case,
            false_case,
        } => {
            parenthesized(nested, ctx, |ctx| {
                print_nested(condition, true, ctx);
                ctx.print(" ? ");
                print_nested(true_case, true, ctx);
                ctx.print(" : ");
                print_nested(false_case, true, ctx);
            });
        }
        Expression::LiteralArray { entries } => {
            ctx.print("[");
            for (i, entry) in entries.iter().enumerate() {
                if i > 0 {
                    ctx.print(", ");
                }
                print_expression(entry, ctx);
            }
            ctx.print("]");
        }
        Expression::LiteralMap { entries } => {
            ctx.print("{");
            for (i, entry) in entries.iter().enumerate() {
                if i > 0 {
                    ctx.print(", ");
                }
                ctx.print(&escape_identifier(&entry.key, entry.quoted));
                ctx.print(": ");
                print_expression(&entry.value, ctx);
            }
            ctx.print("}");
        }
        Expression::Const { index } => ctx.print(&ConstantPool::name_of(*index)),
        Expression::External { name } => ctx.print(name),
        Expression::Fn { params, body } => {
            let head = format!("function ({})", params.join(", "));
            parenthesized(nested, ctx, |ctx| print_block(&head, body, ctx));
        }
    }
}

fn print_call_arguments(args: &[Expression], ctx: &mut EmitterVisitorContext) {
    ctx.print("(");
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            ctx.print(", ");
        }
        print_expression(arg, ctx);
    }
    ctx.print(")");
}

fn parenthesized(nested: bool, ctx: &mut EmitterVisitorContext, body: impl FnOnce(&mut EmitterVisitorContext)) {
    if nested {
        ctx.print("(");
    }
    body(ctx);
    if nested {
        ctx.print(")");
    }
}
