//! Cloneline CLI: inspect and edit cloning strategy documents.
//!
//! Usage:
//!   cloneline validate <file>
//!   cloneline merge <incoming> <existing> [-o out]
//!   cloneline graft <parent> <child> --source <id> [-o out]
//!   cloneline extract <file> <id> [-o out]
//!   cloneline delete <file> <source> [-o out]
//!   cloneline map <file> --source <id> --input <id> <start> <end>
//!   cloneline strategy <save|load|list|delete> [--db path]

use clap::{Parser, Subcommand};
use cloneline::surgery::{delete_source_and_descendants, extract_subgraph, graft_graph, merge_graphs};
use cloneline::transform::range_in_parent;
use cloneline::{
    CloningGraph, EntityId, OpenStore, SequenceRange, SqliteStore, StrategyStore, MAX_ID,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cloneline",
    version,
    about = "Provenance graph engine for DNA cloning strategies"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a strategy document against every graph invariant
    Validate {
        /// Strategy document (JSON)
        file: PathBuf,
    },
    /// Merge one strategy into another, rebasing the incoming ids
    Merge {
        /// Strategy whose ids are shifted
        incoming: PathBuf,
        /// Strategy whose ids are kept
        existing: PathBuf,
        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Splice a strategy onto a placeholder source of another
    Graft {
        /// Strategy ending in exactly one sequence
        parent: PathBuf,
        /// Strategy holding the placeholder
        child: PathBuf,
        /// Placeholder source id in the child
        #[arg(long)]
        source: u64,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Extract the lineage of a sequence or source
    Extract {
        file: PathBuf,
        /// Sequence or source id
        id: u64,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete a source and everything downstream of it
    Delete {
        file: PathBuf,
        /// Source id
        source: u64,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Map a selection on a source's product onto one of its inputs
    Map {
        file: PathBuf,
        /// Assembly source id
        #[arg(long)]
        source: u64,
        /// Input sequence id
        #[arg(long)]
        input: u64,
        /// First selected position (0-based, inclusive)
        start: usize,
        /// Last selected position (0-based, inclusive)
        end: usize,
    },
    /// Manage strategies stored in the database
    Strategy {
        #[command(subcommand)]
        action: StrategyAction,
        /// Path to SQLite database file
        #[arg(long, global = true)]
        db: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum StrategyAction {
    /// Store a strategy document under a name
    Save {
        name: String,
        file: PathBuf,
    },
    /// Print or write a stored strategy
    Load {
        name: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List stored strategies
    List,
    /// Delete a stored strategy
    Delete {
        name: String,
    },
}

/// Get the default database path (~/.local/share/cloneline/cloneline.db)
fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("cloneline").join("cloneline.db")
}

fn entity_id(value: u64) -> Result<EntityId, String> {
    EntityId::new(value).ok_or_else(|| format!("ids lie in 1..={MAX_ID}"))
}

fn load(path: &Path) -> Result<CloningGraph, String> {
    CloningGraph::load_from_path(path).map_err(|e| format!("{}: {}", path.display(), e))
}

fn emit(graph: &CloningGraph, output: Option<&Path>) -> Result<(), String> {
    match output {
        Some(path) => graph
            .save_to_path(path)
            .map_err(|e| format!("{}: {}", path.display(), e)),
        None => {
            let text = graph.to_json_pretty().map_err(|e| e.to_string())?;
            println!("{}", text);
            Ok(())
        }
    }
}

fn cmd_validate(file: &Path) -> Result<(), String> {
    let graph = load(file)?;
    let order = graph.topological_sources().map_err(|e| e.to_string())?;
    println!(
        "ok: {} sources, {} sequences, {} primers, {} attachments",
        graph.source_count(),
        graph.sequence_count(),
        graph.primer_count(),
        graph.attachments().len()
    );
    let pending = graph.sources().filter(|s| s.is_pending()).count();
    if pending > 0 {
        println!("{} pending sources", pending);
    }
    let terminals: Vec<String> = graph.terminal_sequences().iter().map(ToString::to_string).collect();
    println!("terminal sequences: {}", terminals.join(", "));
    println!("{} steps in topological order", order.len());
    Ok(())
}

fn cmd_merge(incoming: &Path, existing: &Path, output: Option<&Path>) -> Result<(), String> {
    let outcome = merge_graphs(&load(incoming)?, &load(existing)?).map_err(|e| e.to_string())?;
    eprintln!("incoming ids shifted by {}", outcome.delta);
    emit(&outcome.graph, output)
}

fn cmd_graft(parent: &Path, child: &Path, source: u64, output: Option<&Path>) -> Result<(), String> {
    let outcome = graft_graph(&load(parent)?, &load(child)?, entity_id(source)?).map_err(|e| e.to_string())?;
    eprintln!("parent ids shifted by {}", outcome.delta);
    emit(&outcome.graph, output)
}

fn cmd_extract(file: &Path, id: u64, output: Option<&Path>) -> Result<(), String> {
    let graph = extract_subgraph(&load(file)?, entity_id(id)?).map_err(|e| e.to_string())?;
    emit(&graph, output)
}

fn cmd_delete(file: &Path, source: u64, output: Option<&Path>) -> Result<(), String> {
    let removal = delete_source_and_descendants(&load(file)?, entity_id(source)?).map_err(|e| e.to_string())?;
    eprintln!(
        "removed {} sources and {} sequences",
        removal.removed.sources.len(),
        removal.removed.sequences.len()
    );
    emit(&removal.graph, output)
}

fn cmd_map(file: &Path, source: u64, input: u64, start: usize, end: usize) -> Result<(), String> {
    let graph = load(file)?;
    let selection = SequenceRange::new(start, end);
    let mapped = range_in_parent(&graph, entity_id(source)?, selection, entity_id(input)?)
        .map_err(|e| e.to_string())?;
    match mapped {
        Some(range) => println!("{} -> {}", selection, range),
        None => println!("{} does not map onto sequence {}", selection, input),
    }
    Ok(())
}

fn cmd_strategy(action: StrategyAction, db: Option<PathBuf>) -> Result<(), String> {
    let db_path = db.unwrap_or_else(default_db_path);
    let store = SqliteStore::open(&db_path).map_err(|e| format!("Failed to open database: {}", e))?;

    match action {
        StrategyAction::Save { name, file } => {
            let graph = load(&file)?;
            store.save_strategy(&name, &graph).map_err(|e| e.to_string())?;
            println!("Saved strategy '{}' ({} entities)", name, graph.len());
        }
        StrategyAction::Load { name, output } => {
            let graph = store
                .load_strategy(&name)
                .map_err(|e| e.to_string())?
                .ok_or_else(|| format!("strategy '{}' not found", name))?;
            emit(&graph, output.as_deref())?;
        }
        StrategyAction::List => {
            let strategies = store.list_strategies().map_err(|e| e.to_string())?;
            if strategies.is_empty() {
                println!("No strategies stored.");
                return Ok(());
            }
            println!("{:<24}  {:>7}  {:>9}  {:>7}  {:<25}", "NAME", "SOURCES", "SEQUENCES", "PRIMERS", "SAVED");
            println!("{}", "-".repeat(80));
            for s in strategies {
                println!(
                    "{:<24}  {:>7}  {:>9}  {:>7}  {:<25}",
                    s.name,
                    s.sources,
                    s.sequences,
                    s.primers,
                    s.saved_at.to_rfc3339()
                );
            }
        }
        StrategyAction::Delete { name } => {
            if !store.delete_strategy(&name).map_err(|e| e.to_string())? {
                return Err(format!("strategy '{}' not found", name));
            }
            println!("Deleted strategy '{}'", name);
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Merge { incoming, existing, output } => cmd_merge(&incoming, &existing, output.as_deref()),
        Commands::Graft { parent, child, source, output } => {
            cmd_graft(&parent, &child, source, output.as_deref())
        }
        Commands::Extract { file, id, output } => cmd_extract(&file, id, output.as_deref()),
        Commands::Delete { file, source, output } => cmd_delete(&file, source, output.as_deref()),
        Commands::Map { file, source, input, start, end } => cmd_map(&file, source, input, start, end),
        Commands::Strategy { action, db } => cmd_strategy(action, db),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
