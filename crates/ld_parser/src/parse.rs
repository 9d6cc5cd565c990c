use anyhow::Result;
use swc_common::{
    comments::SingleThreadedComments, errors::Handler, sync::Lrc, FileName, SourceMap,
};
use swc_ecma_ast::EsVersion;
use swc_ecma_parser::{EsSyntax, Syntax, TsSyntax};

/// Result of parsing a source file.
pub struct ParseResult {
    pub module: swc_ecma_ast::Module,
    pub comments: SingleThreadedComments,
    pub source_map: Lrc<SourceMap>,
}

/// Source dialect, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    TypeScript,
    Tsx,
    JavaScript,
    Jsx,
}

impl SourceKind {
    pub fn from_filename(filename: &str) -> Self {
        let ext = filename.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
        match ext {
            "tsx" => SourceKind::Tsx,
            "js" | "mjs" | "cjs" => SourceKind::JavaScript,
            "jsx" => SourceKind::Jsx,
            _ => SourceKind::TypeScript,
        }
    }

    pub fn syntax(self) -> Syntax {
        match self {
            SourceKind::TypeScript | SourceKind::Tsx => Syntax::Typescript(TsSyntax {
                tsx: self == SourceKind::Tsx,
                decorators: true,
                ..Default::default()
            }),
            SourceKind::JavaScript | SourceKind::Jsx => Syntax::Es(EsSyntax {
                jsx: self == SourceKind::Jsx,
                decorators: true,
                decorators_before_export: true,
                ..Default::default()
            }),
        }
    }
}

/// Parse a source string with legacy decorator syntax enabled.
///
/// The dialect follows the file extension (see [`SourceKind`]).
pub fn parse_decorated(source: &str, filename: &str) -> Result<ParseResult> {
    let source_map: Lrc<SourceMap> = Default::default();
    let source_file = source_map.new_source_file(
        Lrc::new(FileName::Custom(filename.to_string())),
        source.to_string(),
    );

    let comments = SingleThreadedComments::default();

    let handler = Handler::with_emitter_writer(Box::new(std::io::stderr()), Some(source_map.clone()));

    let syntax = SourceKind::from_filename(filename).syntax();

    let module = swc_ecma_parser::parse_file_as_module(
        &source_file,
        syntax,
        EsVersion::latest(),
        Some(&comments),
        &mut vec![],
    )
    .map_err(|e| {
        e.into_diagnostic(&handler).emit();
        anyhow::anyhow!("failed to parse {filename}")
    })?;

    Ok(ParseResult {
        module,
        comments,
        source_map,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_ecma_ast::{ClassMember, Decl, ModuleItem, ParamOrTsParamProp, Stmt};

    #[test]
    fn dialect_follows_extension() {
        assert_eq!(SourceKind::from_filename("a.ts"), SourceKind::TypeScript);
        assert_eq!(SourceKind::from_filename("a.tsx"), SourceKind::Tsx);
        assert_eq!(SourceKind::from_filename("exec.mjs"), SourceKind::JavaScript);
        assert_eq!(SourceKind::from_filename("dir.v2/a.jsx"), SourceKind::Jsx);
        assert_eq!(SourceKind::from_filename("noext"), SourceKind::TypeScript);
    }

    #[test]
    fn parses_member_and_parameter_decorators() {
        let src = "class Greeter {\n  @validate\n  greet(@required('name') name) {}\n}\n";
        let parsed = parse_decorated(src, "greeter.js").unwrap();
        let ModuleItem::Stmt(Stmt::Decl(Decl::Class(decl))) = &parsed.module.body[0] else {
            panic!("expected class declaration");
        };
        let ClassMember::Method(method) = &decl.class.body[0] else {
            panic!("expected method");
        };
        assert_eq!(method.function.decorators.len(), 1);
        assert_eq!(method.function.params[0].decorators.len(), 1);
    }

    #[test]
    fn parses_decorated_parameter_properties() {
        let src = "class A { constructor(@Inject(B) private b: B) {} }";
        let parsed = parse_decorated(src, "a.ts").unwrap();
        let ModuleItem::Stmt(Stmt::Decl(Decl::Class(decl))) = &parsed.module.body[0] else {
            panic!("expected class declaration");
        };
        let ClassMember::Constructor(ctor) = &decl.class.body[0] else {
            panic!("expected constructor");
        };
        let ParamOrTsParamProp::TsParamProp(prop) = &ctor.params[0] else {
            panic!("expected parameter property");
        };
        assert_eq!(prop.decorators.len(), 1);
    }

    #[test]
    fn reports_syntax_errors() {
        assert!(parse_decorated("class {", "broken.ts").is_err());
    }
}
