use clap::Parser;
use filemover::cli::{OrganizeCommand, run_cli_with_config};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "filemover")]
#[command(version)]
#[command(about = "Move the files of a directory into Music, Pictures, Docs, ZipFiles and video folders")]
struct Args {
    #[arg(value_name = "SOURCE", help = "Directory whose entries are organized")]
    source: PathBuf,

    #[arg(value_name = "DESTINATION", help = "Root of the category folders")]
    destination: PathBuf,

    #[arg(long, help = "Show where every entry would go without moving anything")]
    dry_run: bool,

    #[arg(short, long, value_name = "PATH", help = "Configuration file (TOML)")]
    config: Option<PathBuf>,

    #[arg(
        short,
        long,
        conflicts_with = "dry_run",
        help = "Only report failures and the final summary line"
    )]
    quiet: bool,

    #[arg(long, help = "Disable colored output")]
    no_color: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    if args.no_color {
        colored::control::set_override(false);
    }

    let command = if args.dry_run {
        OrganizeCommand::DryRun
    } else {
        OrganizeCommand::Organize { quiet: args.quiet }
    };

    match run_cli_with_config(
        command,
        &args.source,
        &args.destination,
        args.config.as_deref(),
    ) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_conflicts_with_dry_run() {
        let result = Args::try_parse_from(["filemover", "in", "out", "--dry-run", "--quiet"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_quiet_alone_is_accepted() {
        let args = Args::try_parse_from(["filemover", "in", "out", "-q"])
            .expect("Failed to parse arguments");
        assert!(args.quiet);
        assert!(!args.dry_run);
    }
}
