use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Log debug output
    #[arg(short, long, global = true, default_value = "false")]
    verbose: bool,

    /// The command to execute
    #[command(subcommand)]
    command: StaticSiteCommand,
}

#[derive(Parser)]
struct BuildArgs {
    /// The site directory (defaults to the current directory)
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// The path to the configuration file, relative to the site directory
    #[arg(short, long)]
    config_file: Option<PathBuf>,

    /// Keep generating the remaining pages when one fails
    #[arg(short, long, default_value = "false")]
    keep_going: bool,
}

#[derive(Parser)]
struct CleanArgs {
    /// The site directory (defaults to the current directory)
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Only list the pages that would be deleted
    #[arg(short = 'n', long, default_value = "false")]
    dry_run: bool,
}

#[derive(Subcommand)]
enum StaticSiteCommand {
    /// Remove generated pages and regenerate every markdown page
    Build(BuildArgs),

    /// Remove generated pages
    Clean(CleanArgs),
}

fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match args.command {
        StaticSiteCommand::Build(args) => {
            commands::build::run(&args)?;
        }
        StaticSiteCommand::Clean(args) => {
            commands::clean::run(&args)?;
        }
    }

    Ok(())
}
