use anyhow::{bail, Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use report::{AskOutput, ContextOutput, PanelsOutput};
use sidechat_document::DocumentTree;
use sidechat_highlight::{NullBackend, RecordingBackend};
use sidechat_session::{dispatch, ScriptedTransport, Session, SessionConfig, WidgetId};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

mod report;

#[derive(Parser)]
#[command(name = "sidechat")]
#[command(about = "Selection-anchored chat panels over text documents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Session config file (TOML); SIDECHAT_* env vars override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the surrounding context chosen for a selection
    Context(ContextArgs),

    /// Open panels for several selections and print the resulting highlight state
    Panels(PanelsArgs),

    /// Run one scripted question/answer round trip on a selection
    Ask(AskArgs),
}

#[derive(Args)]
struct ContextArgs {
    /// Outline document (markdown-like text)
    file: PathBuf,

    /// Text to select; the first occurrence is used
    #[arg(long, short = 's')]
    select: String,

    /// Word budget (overrides config)
    #[arg(long, short = 'b')]
    budget: Option<usize>,

    /// Ancestor levels to climb (overrides config)
    #[arg(long)]
    climb: Option<usize>,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct PanelsArgs {
    /// Outline document (markdown-like text)
    file: PathBuf,

    /// Open one panel per selection, in order
    #[arg(long = "select", short = 's', required = true)]
    selections: Vec<String>,

    /// Focus the panel at this index (0-based, in --select order)
    #[arg(long)]
    focus: Vec<usize>,

    /// Collapse the panel at this index
    #[arg(long)]
    collapse: Vec<usize>,

    /// Close the panel at this index
    #[arg(long)]
    close: Vec<usize>,

    /// Disable context highlights
    #[arg(long)]
    no_context: bool,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AskArgs {
    /// Outline document (markdown-like text)
    file: PathBuf,

    #[arg(long, short = 's')]
    select: String,

    /// Question to ask about the selection
    #[arg(long, short = 'p')]
    prompt: String,

    /// Scripted reply fragments (default: a short canned answer)
    #[arg(long)]
    reply: Vec<String>,

    /// Make the scripted transport fail with this message
    #[arg(long)]
    fail: Option<String>,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // Keep stdout clean for JSON consumers
    let json_output = match &cli.command {
        Commands::Context(args) => args.json,
        Commands::Panels(args) => args.json,
        Commands::Ask(args) => args.json,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Context(args) => run_context(args, config)?,
        Commands::Panels(args) => run_panels(args, config)?,
        Commands::Ask(args) => run_ask(args, config).await?,
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    match path {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => {
            let mut config = SessionConfig::default();
            config.apply_env();
            config.validate().context("Invalid SIDECHAT_* environment")?;
            Ok(config)
        }
    }
}

fn load_document(path: &Path) -> Result<DocumentTree> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let tree = DocumentTree::from_outline(&source);
    log::debug!(
        "Parsed {} into {} leaves",
        path.display(),
        tree.all_leaves().len()
    );
    Ok(tree)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_context(args: ContextArgs, mut config: SessionConfig) -> Result<()> {
    if let Some(budget) = args.budget {
        config.context_word_budget = budget;
    }
    if let Some(climb) = args.climb {
        config.max_climb_depth = climb;
    }
    let tree = load_document(&args.file)?;
    let selection = tree
        .find(&args.select)
        .with_context(|| format!("'{}' not found in {}", args.select, args.file.display()))?;

    let budget = config.context_word_budget;
    let session = Session::new(config, NullBackend).context("Invalid context settings")?;
    let out = ContextOutput {
        selection: args.select,
        budget,
        window: session.extract_context(&tree, &selection),
    };

    if args.json {
        print_json(&out)?;
    } else {
        print!("{}", report::render_context(&out));
    }
    Ok(())
}

fn panel_at(ids: &[WidgetId], index: usize) -> Result<WidgetId> {
    match ids.get(index) {
        Some(id) => Ok(*id),
        None => bail!("Panel index {index} out of range (opened {})", ids.len()),
    }
}

fn run_panels(args: PanelsArgs, mut config: SessionConfig) -> Result<()> {
    if args.no_context {
        config.show_context_highlights = false;
    }
    let tree = load_document(&args.file)?;
    let mut session = Session::new(config, RecordingBackend::new())?;

    let mut ids = Vec::with_capacity(args.selections.len());
    for needle in &args.selections {
        let selection = tree
            .find(needle)
            .with_context(|| format!("'{needle}' not found in {}", args.file.display()))?;
        ids.push(session.open_widget(&tree, selection)?);
    }

    for index in args.focus {
        session.focus(panel_at(&ids, index)?)?;
    }
    for index in args.collapse {
        session.collapse(panel_at(&ids, index)?)?;
    }
    for index in args.close {
        session.close(panel_at(&ids, index)?)?;
    }

    let out = PanelsOutput::capture(&session);
    if args.json {
        print_json(&out)?;
    } else {
        print!("{}", report::render_panels(&out));
    }
    Ok(())
}

async fn run_ask(args: AskArgs, config: SessionConfig) -> Result<()> {
    let tree = load_document(&args.file)?;
    let selection = tree
        .find(&args.select)
        .with_context(|| format!("'{}' not found in {}", args.select, args.file.display()))?;

    let mut session = Session::new(config, NullBackend)?;
    let id = session.open_widget(&tree, selection)?;
    let Some(request) = session.submit(id, &args.prompt)? else {
        bail!("Prompt is empty");
    };
    let system_context = request.system_context.clone();

    let fragments = if args.reply.is_empty() {
        canned_reply(&args.select, session.widget(id).map_or(0, |w| w.context.word_count))
    } else {
        args.reply
    };
    let mut transport = ScriptedTransport::new(fragments);
    if let Some(message) = args.fail {
        transport = transport.failing_with(message);
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    dispatch(Arc::new(transport), request, tx);
    session.await_reply(&mut rx, id).await;

    let widget = session
        .widget(id)
        .with_context(|| format!("{id} vanished during the reply"))?;
    let out = AskOutput {
        conversation_id: widget.conversation.id().to_string(),
        system_context,
        transcript: widget.conversation.transcript().to_vec(),
    };
    if args.json {
        print_json(&out)?;
    } else {
        print!("{}", report::render_transcript(&out));
    }
    Ok(())
}

fn canned_reply(selected: &str, context_words: usize) -> Vec<String> {
    format!("You asked about \"{selected}\", grounded on {context_words} words of context.")
        .split_inclusive(' ')
        .map(str::to_string)
        .collect()
}
