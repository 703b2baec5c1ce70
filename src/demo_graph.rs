use anyhow::{Context, Result};
use chrono::{Duration, TimeZone, Utc};
use gitfold_graph::{AsciiRenderer, CommitRecord, GraphConfig, GraphModel};
use tracing_subscriber::EnvFilter;

/// A feature branch forked off a long main line and merged back
fn synthetic_history() -> Result<Vec<CommitRecord>> {
    let start = Utc
        .with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
        .single()
        .context("Invalid start date")?;
    let mut commits = Vec::new();
    let mut push = |hash: &str, parents: &[&str], subject: &str| {
        let age = Duration::hours(commits.len() as i64);
        commits.push(CommitRecord::new(
            hash.to_string(),
            parents.iter().map(|p| p.to_string()).collect(),
            start - age,
            "demo".to_string(),
            subject.to_string(),
        ));
    };

    push("m000", &["c001", "f001"], "Merge branch 'feature'");
    push("f001", &["f002"], "feature: polish");
    for i in 1..8 {
        let parent = format!("c{:03}", i + 1);
        push(&format!("c{:03}", i), &[parent.as_str()], &format!("main work {}", i));
    }
    push("f002", &["f003"], "feature: wire up");
    push("f003", &["c008"], "feature: start");
    push("c008", &["c009"], "fork point");
    push("c009", &[], "initial commit");
    Ok(commits)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    println!("gitfold graph demo");
    println!("==================\n");

    let mut model = GraphModel::from_commits(synthetic_history()?, &GraphConfig::default())?;
    let renderer = AsciiRenderer::default();

    println!("Full history ({} rows):", model.row_count());
    print!("{}", renderer.render(&mut model)?);

    let seed = model.graph().find("c004").context("demo commit missing")?;
    let fragment = model
        .relate_fragment(seed.into())
        .context("main line should be foldable")?;
    let replace = model.hide_fragment(&fragment)?;

    println!(
        "\nFolded rows {}..{} into {} ({} rows):",
        replace.from,
        replace.to,
        replace.new_count,
        model.row_count()
    );
    print!("{}", renderer.render(&mut model)?);

    model.show_all()?;
    println!("\nExpanded again ({} rows):", model.row_count());
    print!("{}", renderer.render(&mut model)?);
    Ok(())
}
