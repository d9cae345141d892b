use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use sitepatch_cli::commands::{
    run_describe, run_patch, run_preview, run_slogan, MissingRoot, SiteContext, SiteOptions,
};

#[derive(Debug, Parser)]
#[command(name = "sitepatch", version, about = "Deterministic SEO fixer for static gallery sites")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rewrite titles, descriptions and thin bodies of pages failing the quality gate.
    Patch(SiteArgs),
    /// Add blurbs to category listing pages.
    Describe(SiteArgs),
    /// Add the site slogan to the root index page.
    Slogan(SiteArgs),
    /// Show what `patch` would produce for one page.
    Preview(PreviewArgs),
}

#[derive(Debug, Args)]
struct SiteArgs {
    /// Site root; detected from the current directory when omitted.
    #[arg(long)]
    root: Option<PathBuf>,
    #[arg(long)]
    brand: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    dry_run: bool,
    #[arg(long)]
    events: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct PreviewArgs {
    #[command(flatten)]
    site: SiteArgs,
    /// Page path, relative to the site root or absolute.
    #[arg(long)]
    page: PathBuf,
}

impl From<SiteArgs> for SiteOptions {
    fn from(args: SiteArgs) -> Self {
        Self {
            root: args.root,
            brand: args.brand,
            config: args.config,
            dry_run: args.dry_run,
            events: args.events,
        }
    }
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("sitepatch error: {err:#}");
            let code = if err.downcast_ref::<MissingRoot>().is_some() { 2 } else { 1 };
            std::process::exit(code);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Patch(args) => {
            run_patch(&SiteContext::resolve(args.into())?)?;
        }
        Command::Describe(args) => {
            run_describe(&SiteContext::resolve(args.into())?)?;
        }
        Command::Slogan(args) => {
            run_slogan(&SiteContext::resolve(args.into())?)?;
        }
        Command::Preview(args) => {
            run_preview(&SiteContext::resolve(args.site.into())?, &args.page)?;
        }
    }
    Ok(0)
}
