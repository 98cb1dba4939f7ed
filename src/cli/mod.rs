//! CLI command definitions and handlers

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use petgraph::graph::UnGraph;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use soc_centrality::config::{load_config, load_config_file, OutputFormat, SocConfig};
use soc_centrality::generators::{complete_graph, cycle_graph, path_graph, star_graph};
use soc_centrality::{most_central, ranked, second_order_centrality_with, Readout};

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// soc - second order centrality of small graphs
#[derive(Parser, Debug)]
#[command(name = "soc")]
#[command(
    version,
    about = "Second order centrality: standard deviation of random-walk return times",
    after_help = "\
Examples:
  soc star                         Hub + 10 leaves, reports node 0 as most central
  soc cycle 8 --readout diagonal   Return-time readout on an 8-cycle
  soc complete 5 --format json     JSON output for scripting
  soc path 20 --parallel --top 3   Parallel solves, three most central nodes"
)]
pub struct Cli {
    /// Config file (default: ./soc.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Size of the worker pool used by --parallel (1-64)
    #[arg(long, global = true, value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Which cell of the moment matrices to report
    #[arg(long, global = true, value_parser = ["first-row", "diagonal"])]
    pub readout: Option<String>,

    /// Solve per-node systems in parallel
    #[arg(long, global = true)]
    pub parallel: bool,

    /// Output format
    #[arg(long, short = 'f', global = true, value_parser = ["text", "json"])]
    pub format: Option<String>,

    /// Only report the N most central nodes
    #[arg(long, global = true)]
    pub top: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Star graph: hub node 0 joined to N leaves
    Star {
        #[arg(default_value = "10")]
        leaves: usize,
    },

    /// Cycle graph on N nodes
    Cycle { nodes: usize },

    /// Path graph on N nodes
    Path { nodes: usize },

    /// Complete graph on N nodes
    Complete { nodes: usize },
}

impl Commands {
    fn build(&self) -> (String, UnGraph<(), ()>) {
        match *self {
            Commands::Star { leaves } => (format!("star({})", leaves), star_graph(leaves)),
            Commands::Cycle { nodes } => (format!("cycle({})", nodes), cycle_graph(nodes)),
            Commands::Path { nodes } => (format!("path({})", nodes), path_graph(nodes)),
            Commands::Complete { nodes } => (format!("complete({})", nodes), complete_graph(nodes)),
        }
    }
}

#[derive(Debug, Serialize)]
struct NodeScore {
    node: usize,
    soc: f64,
}

#[derive(Debug, Serialize)]
struct Report {
    graph: String,
    nodes: usize,
    readout: Readout,
    scores: Vec<NodeScore>,
    most_central: Option<usize>,
}

/// Config file first, then command-line overrides.
fn resolve_config(cli: &Cli) -> Result<SocConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_file(path)?,
        None => load_config(Path::new(".")),
    };

    if let Some(readout) = &cli.readout {
        config.engine.readout = readout.parse()?;
    }
    if cli.parallel {
        config.engine.parallel = true;
    }
    if let Some(format) = &cli.format {
        config.output.format = match format.as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Text,
        };
    }
    if cli.top.is_some() {
        config.output.top = cli.top;
    }

    debug!("Effective config: {:?}", config);
    Ok(config)
}

pub fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;

    if let Some(workers) = cli.workers {
        rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build_global()
            .context("Failed to configure worker pool")?;
    }

    let (name, graph) = cli.command.build();
    let scores = second_order_centrality_with(&graph, &config.engine)
        .with_context(|| format!("Failed to compute second order centrality for {}", name))?;

    let limit = config.output.top.unwrap_or(scores.len());
    let report = Report {
        graph: name,
        nodes: scores.len(),
        readout: config.engine.readout,
        scores: ranked(&scores)
            .into_iter()
            .take(limit)
            .map(|(node, soc)| NodeScore {
                node: node.index(),
                soc,
            })
            .collect(),
        most_central: most_central(&scores).map(|(node, _)| node.index()),
    };

    match config.output.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => print_text(&report),
    }
    Ok(())
}

fn print_text(report: &Report) {
    println!(
        "Second order centrality of {} ({} nodes, readout {})",
        report.graph, report.nodes, report.readout
    );
    println!("{:>6}  {:>6}  {:>14}", "rank", "node", "soc");
    for (rank, score) in report.scores.iter().enumerate() {
        println!("{:>6}  {:>6}  {:>14.6}", rank + 1, score.node, score.soc);
    }
    if let Some(node) = report.most_central {
        println!("Most central node id: {}", node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_workers() {
        assert_eq!(parse_workers("8"), Ok(8));
        assert!(parse_workers("0").is_err());
        assert!(parse_workers("65").is_err());
        assert!(parse_workers("many").is_err());
    }

    #[test]
    fn test_star_defaults_to_ten_leaves() {
        let cli = Cli::parse_from(["soc", "star"]);
        let (name, graph) = cli.command.build();
        assert_eq!(name, "star(10)");
        assert_eq!(graph.node_count(), 11);
    }

    #[test]
    fn test_flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("soc.toml");
        std::fs::write(&path, "[engine]\nreadout = \"first-row\"\n[output]\ntop = 4\n").unwrap();

        let cli = Cli::parse_from([
            "soc",
            "cycle",
            "6",
            "--config",
            path.to_str().unwrap(),
            "--readout",
            "diagonal",
            "--format",
            "json",
        ]);
        let config = resolve_config(&cli).unwrap();

        assert_eq!(config.engine.readout, Readout::Diagonal);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.output.top, Some(4));
    }
}
