mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cardsync",
    about = "Sync structured task comments in source files with a kanban board",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .cardsync/ or .git/)
    #[arg(long, global = true, env = "CARDSYNC_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize cardsync in the current project
    Init,

    /// Emit a well-formed task comment block
    Snippet {
        /// Task title (no commas)
        title: String,

        /// Checklist item; repeat for more
        #[arg(long = "item", required = true)]
        items: Vec<String>,

        /// Tag the block [FINAL] so no remote task is ever created for it
        #[arg(long)]
        r#final: bool,

        /// Append to this file instead of printing to stdout
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Reconcile one file's task comments with the board (the on-save hook)
    Save { file: PathBuf },

    /// Pull remote changes back into source comments for all tracked files
    Sync,

    /// Watch for file changes; reconcile on save, pull on a timer
    Watch {
        /// Directory to watch (default: project root)
        dir: Option<PathBuf>,
    },

    /// Show the tracked tasks in the store
    Status,

    /// Inspect or validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: cmd::config::ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Watch { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Snippet {
            title,
            items,
            r#final,
            file,
        } => cmd::snippet::run(&title, &items, r#final, file.as_deref()),
        Commands::Save { file } => cmd::save::run(&root, &file, cli.json),
        Commands::Sync => cmd::sync::run(&root, cli.json),
        Commands::Watch { dir } => cmd::watch::run(&root, dir.as_deref()),
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
