#![allow(dead_code)]

//! View Compiler Test Utilities
//!
//! Runs the template parser and the view compiler back to back and offers
//! compact views of the emitted instruction lists.

use template_compiler::config::CompilerOptions;
use template_compiler::expression_parser::Parser;
use template_compiler::metadata::{DirectiveDescriptor, PipeDescriptor};
use template_compiler::output::{Instruction, Operand};
use template_compiler::render3::view::{compile_component_from_metadata, CompiledTemplate, R3ComponentMetadata};
use template_compiler::schema::DomElementSchemaRegistry;
use template_compiler::template_parser::TemplateParser;

pub const TEMPLATE_URL: &str = "app.html";

pub fn app_component() -> DirectiveDescriptor {
    DirectiveDescriptor::component("App", "app")
}

/// Compiles `template` as the template of `component`. Parse errors fail the test.
pub fn compile_component(
    component: &DirectiveDescriptor,
    template: &str,
    directives: &[DirectiveDescriptor],
    pipes: &[PipeDescriptor],
    options: &CompilerOptions,
) -> CompiledTemplate {
    let expr_parser = Parser::new();
    let schema = DomElementSchemaRegistry::new();
    let parsed = TemplateParser::new(options, &expr_parser, &schema).parse(template, TEMPLATE_URL, directives);
    assert!(
        parsed.errors.is_empty(),
        "Template parse errors:\n{}",
        parsed.errors.iter().map(|e| e.msg.clone()).collect::<Vec<_>>().join("\n")
    );
    let meta = R3ComponentMetadata::new(
        component,
        pipes,
        parsed.ng_content_selectors,
        options.emit_template_names,
    );
    compile_component_from_metadata(&meta, &parsed.template_ast)
}

/// Compiles `template` as the template of `App` with the default options.
pub fn compile(template: &str, directives: &[DirectiveDescriptor], pipes: &[PipeDescriptor]) -> CompiledTemplate {
    compile_component(&app_component(), template, directives, pipes, &CompilerOptions::default())
}

pub fn opcodes(instructions: &[Instruction]) -> Vec<String> {
    instructions.iter().map(|i| i.opcode.name()).collect()
}

/// Slots allocated by the creation list, in emission order.
pub fn allocated_slots(instructions: &[Instruction]) -> Vec<u32> {
    instructions
        .iter()
        .filter(|i| i.opcode.allocates_slot())
        .filter_map(|i| i.slot)
        .collect()
}

/// The first instruction named `name`.
pub fn find<'a>(instructions: &'a [Instruction], name: &str) -> &'a Instruction {
    instructions
        .iter()
        .find(|i| i.opcode.name() == name)
        .unwrap_or_else(|| panic!("no {} instruction in {:?}", name, opcodes(instructions)))
}

pub fn str_operand(value: &str) -> Operand {
    Operand::Str(value.to_string())
}
