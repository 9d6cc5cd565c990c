use ld_ast::DecoratorConfig;
use ld_parser::parse_decorated;
use swc_common::{sync::Lrc, SourceMap};
use swc_ecma_ast as ast;
use swc_ecma_codegen::{text_writer::JsWriter, Emitter, Node};

use crate::{desugar_module, DecoratorError};

pub(crate) fn emit(module: &ast::Module) -> String {
    let cm: Lrc<SourceMap> = Default::default();
    let mut buf = Vec::new();
    {
        let writer = JsWriter::new(cm.clone(), "\n", &mut buf, None);
        let mut emitter = Emitter {
            cfg: swc_ecma_codegen::Config::default().with_target(ast::EsVersion::latest()),
            cm,
            comments: None,
            wr: writer,
        };
        module.emit_with(&mut emitter).unwrap();
    }
    String::from_utf8(buf).unwrap()
}

/// Remove all whitespace so assertions don't depend on codegen layout.
pub(crate) fn squash(code: &str) -> String {
    code.chars().filter(|c| !c.is_whitespace()).collect()
}

pub(crate) fn try_desugar_with(
    source: &str,
    config: &DecoratorConfig,
) -> Result<String, DecoratorError> {
    let parsed = parse_decorated(source, "input.ts").unwrap();
    let module = desugar_module(parsed.module, config)?;
    Ok(squash(&emit(&module)))
}

pub(crate) fn desugar(source: &str) -> String {
    try_desugar_with(source, &DecoratorConfig::default()).unwrap()
}

#[track_caller]
pub(crate) fn assert_contains(output: &str, snippet: &str) {
    let snippet = squash(snippet);
    assert!(
        output.contains(&snippet),
        "expected output to contain\n  {snippet}\nbut got\n  {output}"
    );
}

/// Byte offset of `snippet` in the squashed output.
#[track_caller]
pub(crate) fn position(output: &str, snippet: &str) -> usize {
    let snippet = squash(snippet);
    match output.find(&snippet) {
        Some(at) => at,
        None => panic!("expected output to contain\n  {snippet}\nbut got\n  {output}"),
    }
}
