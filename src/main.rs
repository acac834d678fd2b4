use anyhow::{Context, Result};
use clap::Parser;

mod check;
mod cli;
mod config;
mod guess;
mod metadata;
mod organize;
mod util;

use cli::Args;
use organize::{Console, Organizer};

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = config::load_config(&args.config)?;
    tracing::debug!(
        path = %args.config.display(),
        shows = config.shows.len(),
        "loaded config"
    );

    if args.list {
        return cmd_list(&args, &config);
    }

    let options = args.run_options();
    let organizer = Organizer::new(&config, &options, Console::new(!args.json));
    let summary = organizer.run()?;
    if args.json {
        let json = serde_json::to_string_pretty(&summary).context("serialize run summary")?;
        println!("{json}");
    }
    Ok(())
}

fn cmd_list(args: &Args, config: &config::Config) -> Result<()> {
    let key = args.show.as_deref().unwrap_or_default();
    let show = organize::find_show(config, key)?;
    let dest = organize::show_dest_dir(config, show);
    let files = organize::list_organized(&dest)?;
    if args.json {
        let json = serde_json::to_string_pretty(&files).context("serialize file list")?;
        println!("{json}");
        return Ok(());
    }
    println!("{}", dest.display());
    for file in files {
        println!("    {}", file.display());
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}
