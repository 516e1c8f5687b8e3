use crate::batch::{BatchOptions, render_hold_index, run_batch};
use crate::config::load_config;
use crate::ir::Route;
use crate::parser::{load_hold_map, load_routes};
use crate::validate::check_holds;
use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "rtr", version, about = "Climbing route topo renderer")]
pub struct Cli {
    /// Config JSON file (layout, theme, fonts, output options)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output (overridden by RUST_LOG)
    #[arg(short = 'v', long = "verbose", global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render one annotated PNG per route.
    Render(RenderArgs),
    /// Report hold ids used by routes but missing from the map, and expected
    /// wall ids with no coordinates.
    Check(CheckArgs),
    /// Mark every hold of the map on the photo, labelled with its id.
    Index(IndexArgs),
}

#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Hold coordinate map (JSON object id -> {x, y})
    #[arg(long)]
    pub holds: PathBuf,

    /// Route database
    #[arg(long)]
    pub routes: PathBuf,

    /// Base photograph of the wall
    #[arg(long)]
    pub image: PathBuf,

    /// Output directory, created if absent
    #[arg(short = 'o', long = "out", default_value = "generated_routes")]
    pub out: PathBuf,

    /// Only render the named route (repeatable)
    #[arg(long = "route")]
    pub routes_filter: Vec<String>,

    /// Also write `<image>.layout.json` with the computed layout
    #[arg(long, default_value_t = false)]
    pub dump_layout: bool,
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Hold coordinate map
    #[arg(long)]
    pub holds: PathBuf,

    /// Route database to check references against
    #[arg(long)]
    pub routes: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct IndexArgs {
    /// Hold coordinate map
    #[arg(long)]
    pub holds: PathBuf,

    /// Base photograph of the wall
    #[arg(long)]
    pub image: PathBuf,

    /// Output PNG path
    #[arg(short = 'o', long = "out")]
    pub out: PathBuf,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(cli.config.as_deref())?;

    match cli.cmd {
        Command::Render(args) => {
            let options = BatchOptions {
                holds: args.holds,
                routes: args.routes,
                image: args.image,
                out_dir: args.out,
                only: args.routes_filter,
                dump_layout: args.dump_layout,
            };
            let report = run_batch(&options, &config)?;
            for path in &report.written {
                println!("{}", path.display());
            }
            eprintln!(
                "rendered {} route(s), {} warning(s), {} failure(s)",
                report.written.len(),
                report.warnings.len(),
                report.failed.len()
            );
            if !report.is_success() {
                return Err(anyhow::anyhow!(
                    "{} route(s) failed to render",
                    report.failed.len()
                ));
            }
        }
        Command::Check(args) => {
            let holds = load_hold_map(&args.holds)?;
            let routes: Vec<Route> = match &args.routes {
                Some(path) => load_routes(path)?,
                None => Vec::new(),
            };
            let report = check_holds(&holds, &routes, &config.check);
            if args.json {
                let text = serde_json::to_string_pretty(&report)
                    .context("serialize hold report")?;
                println!("{text}");
            } else {
                if report.unresolved.is_empty() {
                    println!("all route holds are mapped");
                } else {
                    println!("unresolved hold references:");
                    for warning in &report.unresolved {
                        println!("  {warning}");
                    }
                }
                if report.unmapped.is_empty() {
                    println!("all expected holds have coordinates");
                } else {
                    println!("unmapped hold ids: {}", report.unmapped.join(", "));
                }
            }
        }
        Command::Index(args) => {
            render_hold_index(&args.holds, &args.image, &args.out, &config)?;
            println!("{}", args.out.display());
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn render_accepts_repeated_route_filters() {
        let cli = Cli::try_parse_from([
            "rtr", "render", "--holds", "h.json", "--routes", "r.json", "--image", "wall.png",
            "--route", "A", "--route", "B", "--dump-layout",
        ])
        .expect("parse");
        let Command::Render(args) = cli.cmd else {
            panic!("expected render");
        };
        assert_eq!(args.routes_filter, vec!["A", "B"]);
        assert!(args.dump_layout);
        assert_eq!(args.out, PathBuf::from("generated_routes"));
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["rtr", "check", "--holds", "h.json", "-c", "cfg.json"])
            .expect("parse");
        assert_eq!(cli.config, Some(PathBuf::from("cfg.json")));
    }
}
