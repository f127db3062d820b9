//! CLI entry point for hetiq.
//!
//! Human-readable results go to stdout (or JSON with `--json`); logs go to
//! stderr.

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing_subscriber::{fmt, EnvFilter};

use hetiq_core::config::Settings;
use hetiq_docstore::{DocumentConfig, MongoStore};
use hetiq_graph::{GraphClient, GraphConfig};
use hetiq_query::compare::compare_engines;
use hetiq_query::{output, EngineHandle, EngineKind, JoinStats, Source};

#[derive(Parser)]
#[command(name = "hetiq")]
#[command(about = "Disease lookup and drug repurposing over the HetioNet knowledge graph")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: hetiq).
    #[arg(short, long, default_value = "hetiq", global = true)]
    config: String,

    /// Query an in-memory TSV snapshot instead of the live databases.
    #[arg(long, global = true)]
    offline: bool,

    /// Nodes TSV (id, name, kind). Overrides [snapshot] nodes.
    #[arg(long, global = true)]
    nodes: Option<PathBuf>,

    /// Edges TSV (source, metaedge, target). Overrides [snapshot] edges.
    #[arg(long, global = true)]
    edges: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Name, drugs, genes, and anatomy of a disease.
    Info {
        #[arg(long, value_enum, default_value_t = EngineKind::Graph)]
        engine: EngineKind,
        disease_id: String,
    },
    /// Compounds that could be repurposed to treat a disease.
    Repurpose {
        #[arg(long, value_enum, default_value_t = EngineKind::Graph)]
        engine: EngineKind,
        /// Also report the document engine's join statistics.
        #[arg(long)]
        stats: bool,
        disease_id: String,
    },
    /// Run repurposing on both engines and show where they differ.
    Compare { disease_id: String },
    /// Load the --nodes/--edges snapshot into the databases.
    Load {
        #[arg(long, value_enum, default_value_t = LoadTarget::Both)]
        into: LoadTarget,
        /// Append instead of replacing existing data.
        #[arg(long)]
        keep_existing: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LoadTarget {
    Neo4j,
    Mongo,
    Both,
}

impl std::fmt::Display for LoadTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Neo4j => f.write_str("neo4j"),
            Self::Mongo => f.write_str("mongo"),
            Self::Both => f.write_str("both"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let mut settings = Settings::load(&cli.config)?;
    if let Some(nodes) = &cli.nodes {
        settings.snapshot.nodes = Some(nodes.clone());
    }
    if let Some(edges) = &cli.edges {
        settings.snapshot.edges = Some(edges.clone());
    }

    match cli.command {
        Command::Load {
            into,
            keep_existing,
        } => load(&settings, into, keep_existing).await?,
        Command::Info { engine, disease_id } => {
            let source = open_source(cli.offline, settings)?;
            let handle = EngineHandle::open(engine, &source).await?;
            let info = handle.engine().disease_info(&disease_id).await;
            handle.close().await;
            let info = info?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{}", output::render_disease_info(info.as_ref()));
            }
        }
        Command::Repurpose {
            engine,
            stats,
            disease_id,
        } => {
            let source = open_source(cli.offline, settings)?;
            let handle = EngineHandle::open(engine, &source).await?;
            let result = repurpose(&handle, &disease_id, stats).await;
            handle.close().await;
            let (candidates, join) = result?;

            if cli.json {
                let body = json!({
                    "disease_id": disease_id,
                    "engine": engine,
                    "candidates": candidates,
                    "join": join,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("{}", output::render_candidates(&candidates));
                if let Some(stats) = &join {
                    println!("{}", output::render_join_stats(stats));
                }
            }
        }
        Command::Compare { disease_id } => {
            let source = open_source(cli.offline, settings)?;
            let graph = EngineHandle::open(EngineKind::Graph, &source).await?;
            let document = match EngineHandle::open(EngineKind::Document, &source).await {
                Ok(document) => document,
                Err(e) => {
                    graph.close().await;
                    return Err(e.into());
                }
            };
            let comparison = compare_engines(graph.engine(), document.engine(), &disease_id).await;
            graph.close().await;
            document.close().await;
            let comparison = comparison?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else {
                println!("{}", output::render_comparison(&comparison));
            }
        }
    }

    Ok(())
}

fn open_source(offline: bool, settings: Settings) -> hetiq_query::error::Result<Source> {
    if offline {
        Source::offline_from_settings(&settings)
    } else {
        Ok(Source::Live(settings))
    }
}

/// Candidates, plus join statistics when requested and the engine has any.
async fn repurpose(
    handle: &EngineHandle,
    disease_id: &str,
    with_stats: bool,
) -> hetiq_query::error::Result<(BTreeSet<String>, Option<JoinStats>)> {
    if with_stats {
        if let Some(outcome) = handle.repurposing_with_stats(disease_id).await? {
            return Ok((outcome.candidates, Some(outcome.stats)));
        }
    }
    let candidates = handle.engine().repurposing_candidates(disease_id).await?;
    Ok((candidates, None))
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn load(settings: &Settings, into: LoadTarget, keep_existing: bool) -> anyhow::Result<()> {
    let (Some(nodes), Some(edges)) = (&settings.snapshot.nodes, &settings.snapshot.edges) else {
        anyhow::bail!("--nodes and --edges are required for load");
    };
    let snapshot = hetiq_core::tsv::read_snapshot(nodes, edges)?;
    tracing::info!(
        target_store = %into,
        nodes = snapshot.nodes.len(),
        edges = snapshot.edges.len(),
        "Loading snapshot"
    );

    if into != LoadTarget::Mongo {
        let options = hetiq_graph::mutations::LoadOptions {
            clear_existing: !keep_existing,
            ..Default::default()
        };
        let client = GraphClient::connect(&GraphConfig::from(&settings.neo4j)).await?;
        let report = client.load_snapshot(&snapshot, &options).await;
        client.close();
        let report = report?;
        println!(
            "Neo4j: {} nodes, {} edges created ({} edges skipped)",
            report.nodes_created, report.edges_created, report.edges_skipped
        );
    }

    if into != LoadTarget::Neo4j {
        let options = hetiq_docstore::load::LoadOptions {
            clear_existing: !keep_existing,
            ..Default::default()
        };
        let store = MongoStore::connect(&DocumentConfig::from(&settings.mongo)).await?;
        let report = store.load_snapshot(&snapshot, &options).await;
        store.shutdown().await;
        let report = report?;
        println!(
            "MongoDB: {} nodes, {} edges inserted",
            report.nodes_inserted, report.edges_inserted
        );
    }

    Ok(())
}
