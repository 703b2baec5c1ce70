use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use gitfold_graph::{AsciiRenderer, GitWalker, GraphConfig, GraphModel};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gitfold")]
#[command(
    about = "Print a repository's commit graph with linear runs folded away",
    long_about = None
)]
struct Cli {
    /// Path to the repository
    #[arg(default_value = ".")]
    path: PathBuf,
    /// Number of commits to load
    #[arg(short, long, default_value = "200")]
    count: usize,
    /// Fold the linear run containing this commit (repeatable)
    #[arg(short, long = "fold", value_name = "HASH")]
    folds: Vec<String>,
    /// Fold every linear run
    #[arg(long, conflicts_with = "folds")]
    fold_all: bool,
    /// Draw long edges in full instead of as arrows
    #[arg(long)]
    show_long_edges: bool,
    /// Graph settings in TOML
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Width of the commit description column
    #[arg(long, default_value = "72")]
    width: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => GraphConfig::load(path)?,
        None => GraphConfig::default(),
    };

    let path = cli.path.to_str().context("Repository path is not valid UTF-8")?;
    let walker = GitWalker::new(Some(path))?;
    let commits = walker.load_commits(Some(cli.count))?;
    if commits.is_empty() {
        println!("No commits");
        return Ok(());
    }

    let mut model = GraphModel::from_commits(commits, &config)?;
    model.set_long_edge_visibility(cli.show_long_edges);

    for hash in &cli.folds {
        let Some(node) = find_commit(&model, hash)? else {
            bail!("Commit {} is not among the loaded commits", hash);
        };
        match model.toggle(node.into())? {
            Some(replace) => info!(hash = %hash, ?replace, "folded"),
            None => warn!(hash = %hash, "commit is not part of a foldable run"),
        }
    }
    if cli.fold_all {
        fold_all(&mut model)?;
    }

    let renderer = AsciiRenderer::new(cli.width);
    print!("{}", renderer.render(&mut model)?);
    Ok(())
}

/// Look a commit up by full hash or unique prefix
fn find_commit(model: &GraphModel, prefix: &str) -> Result<Option<gitfold_graph::NodeId>> {
    let graph = model.graph();
    if let Some(node) = graph.find(prefix) {
        return Ok(Some(node));
    }
    let mut matches = graph
        .visible_nodes()
        .iter()
        .copied()
        .filter(|node| graph.node(*node).hash.starts_with(prefix));
    let first = matches.next();
    if matches.next().is_some() {
        bail!("Hash prefix {} is ambiguous", prefix);
    }
    Ok(first)
}

/// Fold runs top to bottom; every fold shifts the rows below it
fn fold_all(model: &mut GraphModel) -> Result<()> {
    let mut row = 0;
    while row < model.row_count() {
        let node = model.graph().node_at(row)?;
        match model.relate_fragment(node.into()) {
            Some(fragment) if !fragment.is_collapsed() => {
                model.hide_fragment(&fragment)?;
            }
            _ => {}
        }
        row += 1;
    }
    Ok(())
}
