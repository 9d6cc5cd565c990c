use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ld_ast::DecoratorConfig;
use ld_desugar::{desugar_module, DecoratorError};
use ld_parser::{parse_decorated, ParseResult};
use swc_common::source_map::DefaultSourceMapGenConfig;
use swc_ecma_codegen::{text_writer::JsWriter, Emitter, Node};

mod logging;

#[derive(Parser)]
#[command(name = "ld", about = "Desugar legacy decorators into plain JavaScript")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse, desugar decorators, and emit the result.
    Desugar {
        /// Input .ts/.tsx/.js/.jsx file.
        input: PathBuf,
        /// Output file (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// JSON file with desugaring options.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Generate a source map.
        #[arg(long)]
        source_map: bool,
    },
    /// Parse and desugar the file, reporting any errors.
    Check {
        input: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Parse and dump the AST.
    Parse {
        input: PathBuf,
        /// Print JSON instead of the debug representation.
        #[arg(long)]
        ast: bool,
    },
}

fn main() -> Result<()> {
    logging::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Desugar {
            input,
            output,
            config,
            source_map,
        } => {
            let config = load_config(config.as_deref())?;
            let (parsed, filename) = parse_input(&input)?;
            let module = desugar(&parsed, &filename, &config)?;

            let mut buf = Vec::new();
            let mut srcmap_buf = if source_map { Some(vec![]) } else { None };
            {
                let writer = JsWriter::new(
                    parsed.source_map.clone(),
                    "\n",
                    &mut buf,
                    srcmap_buf.as_mut(),
                );
                let mut emitter = Emitter {
                    cfg: swc_ecma_codegen::Config::default()
                        .with_target(swc_ecma_ast::EsVersion::latest()),
                    cm: parsed.source_map.clone(),
                    comments: Some(&parsed.comments),
                    wr: writer,
                };
                module.emit_with(&mut emitter)?;
            }

            let output_str = String::from_utf8(buf)?;

            match &output {
                Some(path) => std::fs::write(path, &output_str)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => print!("{output_str}"),
            }

            if let Some(srcmap_data) = srcmap_buf {
                let srcmap =
                    parsed
                        .source_map
                        .build_source_map(&srcmap_data, None, DefaultSourceMapGenConfig);
                let mut srcmap_json = vec![];
                srcmap
                    .to_writer(&mut srcmap_json)
                    .context("failed to serialize source map")?;

                let map_path = match &output {
                    Some(path) => format!("{}.map", path.display()),
                    None => format!("{filename}.map"),
                };
                std::fs::write(&map_path, &srcmap_json)?;
                eprintln!("Source map written to {map_path}");
            }
        }
        Commands::Check { input, config } => {
            let config = load_config(config.as_deref())?;
            let (parsed, filename) = parse_input(&input)?;
            desugar(&parsed, &filename, &config)?;
            eprintln!("OK: {filename}");
        }
        Commands::Parse { input, ast } => {
            let (parsed, _) = parse_input(&input)?;

            if ast {
                let json = serde_json::to_string_pretty(&parsed.module)?;
                println!("{json}");
            } else {
                println!("{:#?}", parsed.module);
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<DecoratorConfig> {
    let Some(path) = path else {
        return Ok(DecoratorConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn parse_input(input: &Path) -> Result<(ParseResult, String)> {
    let source = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let filename = input.display().to_string();
    let parsed = parse_decorated(&source, &filename)?;
    Ok((parsed, filename))
}

fn desugar(
    parsed: &ParseResult,
    filename: &str,
    config: &DecoratorConfig,
) -> Result<swc_ecma_ast::Module> {
    tracing::debug!(file = filename, ?config, "desugaring");
    match desugar_module(parsed.module.clone(), config) {
        Ok(module) => Ok(module),
        Err(err) => bail!("{}", describe(&err, parsed, filename)),
    }
}

/// `file:line:col: message`
fn describe(err: &DecoratorError, parsed: &ParseResult, filename: &str) -> String {
    let span = err.span();
    if span.is_dummy() {
        return format!("{filename}: {err}");
    }
    let loc = parsed.source_map.lookup_char_pos(span.lo);
    format!("{filename}:{}:{}: {err}", loc.line, loc.col_display + 1)
}
