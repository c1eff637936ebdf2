use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use bumpalo::Bump;
use clap::Parser;
use jsx_eval::{
    Bindings, Context, EvaluateOptions, JsxNode, ParseOptions, RenderOptions, render_error,
};
use jsx_eval_core::api::{self, Error as CoreError};
use jsx_eval_core::values::{Component, ElementNode, PropertyMap};

/// jsx-eval - Evaluate ECMAScript and JSX in a sandbox
#[derive(Parser, Debug)]
#[command(name = "jsx-eval")]
#[command(about = "Evaluate a JSX document or an ECMAScript module", long_about = None)]
struct Args {
    /// Run the input as a module of statements instead of markup
    #[arg(long)]
    module: bool,

    /// Render the named export as a component (implies --module)
    #[arg(long, value_name = "NAME")]
    component: Option<String>,

    /// Log parse, evaluation and render timings
    #[arg(long)]
    debug: bool,

    /// Print the parsed AST (for debugging)
    #[arg(long)]
    debug_parse: bool,

    /// Input file (if not provided, reads from stdin)
    file: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
enum CliError {
    #[error("failed to read {name}")]
    #[diagnostic(code(jsx_eval::io))]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no export named '{0}'")]
    #[diagnostic(
        code(jsx_eval::component),
        help("--component names a function or class exported by the module")
    )]
    MissingComponent(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Eval(jsx_eval::Error),
}

fn main() -> ExitCode {
    let args = Args::parse();

    use tracing_subscriber::{EnvFilter, fmt};

    // RUST_LOG controls the log level; --debug lowers the default so timings show.
    let default_level = if args.debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let file_name = args
        .file
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<stdin>".to_string());

    match run(&args, &file_name) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Eval(err)) => {
            render_error(&err, &file_name);
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            ExitCode::FAILURE
        }
    }
}

fn read_input(args: &Args, file_name: &str) -> Result<String, CliError> {
    let io_error = |source| CliError::Io {
        name: file_name.to_string(),
        source,
    };
    match &args.file {
        Some(path) => std::fs::read_to_string(path).map_err(io_error),
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input).map_err(io_error)?;
            Ok(input)
        }
    }
}

fn run(args: &Args, file_name: &str) -> Result<(), CliError> {
    let input = read_input(args, file_name)?;
    let arena = Bump::new();
    let source: &str = arena.alloc_str(&input);

    let options = EvaluateOptions {
        debug: args.debug,
        ..Default::default()
    };
    let mut ctx = Context::new(options);
    let render_options = RenderOptions {
        source_file_name: file_name.to_string(),
        ..Default::default()
    };

    if args.module || args.component.is_some() {
        run_module(args, &arena, &mut ctx, source, &render_options)
    } else {
        run_jsx(args, &arena, &mut ctx, source, &render_options)
    }
}

fn run_jsx<'a>(
    args: &Args,
    arena: &'a Bump,
    ctx: &mut Context<'a>,
    source: &'a str,
    render_options: &RenderOptions<'a>,
) -> Result<(), CliError> {
    let parse_options = ParseOptions {
        force_expression: true,
        ..Default::default()
    };
    // Spans refer to the source as wrapped for parsing.
    let wrapped = format!("<>{}</>", source);
    let fail = |err: CoreError| CliError::Eval(jsx_eval::Error::new(err, wrapped.as_str()));

    let program = jsx_eval::parser::parse_with_options(arena, source, &parse_options)
        .map_err(|err| fail(err.into()))?;
    if args.debug_parse {
        println!("=== Parsed AST ===");
        println!("{:#?}", program);
        println!();
    }

    let thunks = api::evaluate_jsx(ctx, program).map_err(|err| fail(err.into()))?;
    let nodes = jsx_eval::render(&thunks, &Bindings::new(), ctx, render_options)
        .map_err(|err| fail(err.into()))?;
    println!("{}", jsx_eval::to_html(&nodes));
    Ok(())
}

fn run_module<'a>(
    args: &Args,
    arena: &'a Bump,
    ctx: &mut Context<'a>,
    source: &'a str,
    render_options: &RenderOptions<'a>,
) -> Result<(), CliError> {
    let fail = |err: CoreError| CliError::Eval(jsx_eval::Error::new(err, source));

    let program = jsx_eval::parser::parse(arena, source).map_err(|err| fail(err.into()))?;
    if args.debug_parse {
        println!("=== Parsed AST ===");
        println!("{:#?}", program);
        println!();
    }

    let completion = api::evaluate(ctx, program).map_err(|err| fail(err.into()))?;

    if let Some(name) = &args.component {
        let component = ctx
            .export(name)
            .cloned()
            .ok_or_else(|| CliError::MissingComponent(name.clone()))?;
        let element = JsxNode::Element(ElementNode {
            component: Component::Value(component),
            props: PropertyMap::new(),
            children: Vec::new(),
            position: None,
        });
        let nodes = jsx_eval::render_node(element, &Bindings::new(), ctx, render_options)
            .map_err(|err| fail(err.into()))?;
        println!("{}", jsx_eval::to_html(&nodes));
        return Ok(());
    }

    let mut exports: Vec<_> = ctx
        .exports()
        .iter()
        .map(|(name, value)| (name.to_string(), value.inspect()))
        .collect();
    exports.sort();
    for (name, value) in exports {
        println!("export {} = {}", name, value);
    }
    if !completion.is_undefined() {
        println!("{}", completion.inspect());
    }
    Ok(())
}
