use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

use taskmap::canvas::CanvasController;
use taskmap::config::CanvasConfig;
use taskmap::domain::TaskGraph;
use taskmap::services::{ActionDispatcher, BoardAction};

// Surface the CLI assumes when no renderer is attached.
const SURFACE_WIDTH: f64 = 1400.0;
const SURFACE_HEIGHT: f64 = 900.0;

#[derive(Parser)]
#[command(name = "taskmap", about = "Headless editor core for visual task boards")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the nodes and edges of a board file
    Show {
        /// Path to the board JSON file
        board: PathBuf,
    },
    /// Apply a JSON array of actions to a board file and write it back
    Apply {
        /// Path to the board JSON file
        board: PathBuf,
        /// Path to a JSON array of actions
        actions: PathBuf,
    },
    /// Run the tree auto-layout over a board file and write it back
    Layout {
        /// Path to the board JSON file
        board: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Show { board } => {
            let graph = load_board(&board);
            for node in &graph.nodes {
                println!(
                    "node {} \"{}\" at ({}, {}) [{:?}]",
                    node.id, node.title, node.x, node.y, node.status
                );
            }
            for edge in &graph.edges {
                println!("edge {} {} -> {}", edge.id, edge.source_id, edge.target_id);
            }
        }
        Command::Apply { board, actions } => {
            let graph = load_board(&board);
            let data = std::fs::read_to_string(&actions)
                .with_context(|| format!("failed to read actions file {}", actions.display()))?;
            let actions: Vec<BoardAction> =
                serde_json::from_str(&data).context("failed to parse actions")?;

            let mut canvas =
                CanvasController::with_graph(CanvasConfig::default(), graph, SURFACE_WIDTH, SURFACE_HEIGHT);
            let outcomes = ActionDispatcher::apply_all(&mut canvas, actions)?;
            for outcome in outcomes {
                for id in outcome.created_nodes {
                    println!("created node {id}");
                }
                for id in outcome.created_edges {
                    println!("created edge {id}");
                }
            }
            save_board(&board, &canvas.graph)?;
        }
        Command::Layout { board } => {
            let graph = load_board(&board);
            let mut canvas =
                CanvasController::with_graph(CanvasConfig::default(), graph, SURFACE_WIDTH, SURFACE_HEIGHT);
            canvas.auto_layout();
            save_board(&board, &canvas.graph)?;
        }
    }
    Ok(())
}

fn load_board(path: &Path) -> TaskGraph {
    match std::fs::read_to_string(path) {
        Ok(data) => TaskGraph::from_json(&data),
        Err(err) => {
            warn!("could not read {}, starting from an empty board: {err}", path.display());
            TaskGraph::new()
        }
    }
}

fn save_board(path: &Path, graph: &TaskGraph) -> Result<()> {
    let json = graph.to_json()?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write board file {}", path.display()))?;
    Ok(())
}
