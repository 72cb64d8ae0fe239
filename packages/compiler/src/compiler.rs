//! Compiler Main Module
//!
//! `TemplateCompiler` runs both passes for a component: the template parser
//! builds the Template AST, then the view compiler emits its instruction
//! program. Recoverable errors of both passes are reported together.

use crate::config::CompilerOptions;
use crate::error::{CompileError, MetadataError};
use crate::expression_parser::Parser;
use crate::metadata::{DirectiveDescriptor, MetadataBundle, PipeDescriptor};
use crate::output::TemplateProgram;
use crate::parse_util::ParseErrorLevel;
use crate::render3::view::{compile_component_from_metadata, R3ComponentMetadata};
use crate::schema::DomElementSchemaRegistry;
use crate::template_parser::TemplateParser;
use rayon::prelude::*;
use tracing::{debug, instrument, warn};

/// One component of a batch: its descriptor and template source.
#[derive(Debug, Clone)]
pub struct CompileRequest {
    pub component: DirectiveDescriptor,
    pub template: String,
    pub url: String,
}

impl CompileRequest {
    pub fn new(component: DirectiveDescriptor, template: impl Into<String>, url: impl Into<String>) -> Self {
        CompileRequest {
            component,
            template: template.into(),
            url: url.into(),
        }
    }
}

pub struct TemplateCompiler {
    options: CompilerOptions,
    expression_parser: Parser,
    schema: DomElementSchemaRegistry,
}

impl TemplateCompiler {
    pub fn new(options: CompilerOptions) -> Result<Self, CompileError> {
        options.validate()?;
        Ok(TemplateCompiler {
            options,
            expression_parser: Parser::new(),
            schema: DomElementSchemaRegistry::new(),
        })
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compiles one component template against the directives and pipes in
    /// scope. Invalid descriptors fail immediately; template errors are
    /// returned together once both passes have run.
    #[instrument(skip(self, component, template, directives, pipes), fields(component = component.type_name.as_str()))]
    pub fn compile_component(
        &self,
        component: &DirectiveDescriptor,
        template: &str,
        url: &str,
        directives: &[DirectiveDescriptor],
        pipes: &[PipeDescriptor],
    ) -> Result<TemplateProgram, CompileError> {
        component.validate()?;
        for directive in directives {
            directive.validate()?;
        }

        let parser = TemplateParser::new(&self.options, &self.expression_parser, &self.schema);
        let parsed = parser.parse(template, url, directives);
        let meta = R3ComponentMetadata::new(
            component,
            pipes,
            parsed.ng_content_selectors,
            self.options.emit_template_names,
        );
        let compiled = compile_component_from_metadata(&meta, &parsed.template_ast);

        let errors: Vec<_> = parsed
            .errors
            .into_iter()
            .chain(compiled.errors)
            .filter(|error| error.level == ParseErrorLevel::Error)
            .collect();
        if !errors.is_empty() {
            warn!(errors = errors.len(), "template compilation failed");
            return Err(CompileError::Template { errors });
        }
        debug!(
            decls = compiled.program.root.decls,
            vars = compiled.program.root.vars,
            "compiled component"
        );
        Ok(compiled.program)
    }

    /// Compiles independent components in parallel. Results are in request order.
    pub fn compile_all(
        &self,
        requests: &[CompileRequest],
        directives: &[DirectiveDescriptor],
        pipes: &[PipeDescriptor],
    ) -> Vec<Result<TemplateProgram, CompileError>> {
        debug!(components = requests.len(), "compiling batch");
        requests
            .par_iter()
            .map(|request| {
                self.compile_component(&request.component, &request.template, &request.url, directives, pipes)
            })
            .collect()
    }

    /// Resolves every descriptor of `bundle`, then compiles the component
    /// named `component_type` against the ones that resolved. Only a failure
    /// of the component itself aborts before its template is parsed.
    pub fn compile_from_bundle(
        &self,
        bundle: &MetadataBundle,
        component_type: &str,
        template: &str,
        url: &str,
    ) -> Result<TemplateProgram, CompileError> {
        let mut resolved = bundle.resolve_descriptors();
        if let Some(index) = resolved.failures.iter().position(|(name, _)| name == component_type) {
            let (_, error) = resolved.failures.swap_remove(index);
            return Err(error.into());
        }
        let component = resolved
            .directives
            .iter()
            .find(|d| d.is_component && d.type_name == component_type)
            .ok_or_else(|| MetadataError::UnresolvedSymbol {
                module: url.to_string(),
                name: component_type.to_string(),
            })?;
        self.compile_component(component, template, url, &resolved.directives, &resolved.pipes)
    }
}
