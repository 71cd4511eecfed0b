mod cli;

use mkvsplit::{
    config,
    split::{self, SplitOptions},
    summary,
};

use anyhow::Result;
use clap::Parser;
use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "mkvsplit=debug,mkvsplit_core=debug".to_string()
        } else {
            "mkvsplit=info,mkvsplit_core=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config = config::load_config_or_default(cli.config.as_deref())?;
    let options = resolve_options(&cli, &config)?;

    if cli.scan {
        scan(&options, cli.json)
    } else {
        run(&options, cli.json)
    }
}

/// Merge CLI flags over the loaded config.
fn resolve_options(cli: &Cli, config: &config::Config) -> Result<SplitOptions> {
    let mut merged = config.split.clone();
    if let Some(prefix) = &cli.output_prefix {
        merged.output_prefix = prefix.clone();
    }
    if let Some(extension) = &cli.extension {
        merged.extension = extension.clone();
    }
    if let Some(chunk_size) = cli.chunk_size {
        merged.chunk_size = chunk_size;
    }
    config::validate_config(&config::Config { split: merged.clone() })?;

    let mut options = SplitOptions::from_config(&merged, cli.input.clone());
    options.dry_run = cli.dry_run;
    Ok(options)
}

fn run(options: &SplitOptions, json: bool) -> Result<()> {
    let created = split::run_split(options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&created)?);
    } else if !created.is_empty() {
        print!("{}", summary::render_summary(&created, options.dry_run));
    }

    Ok(())
}

fn scan(options: &SplitOptions, json: bool) -> Result<()> {
    let hits = split::run_scan(options.input.as_deref(), options.chunk_size)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    for hit in &hits {
        println!("Header #{} at offset {}", hit.index, hit.offset);
    }
    println!("{} EBML headers found", hits.len());

    Ok(())
}
