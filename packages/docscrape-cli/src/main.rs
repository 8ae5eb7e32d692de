use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use docscrape::{
    CrawlJob, Crawler, Credentials, FirecrawlClient, NoopCleaner, OpenAiCleaner, TextCleaner,
};

#[derive(Parser)]
#[command(
    name = "docscrape",
    version,
    about = "Extract documentation sites into local markdown"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl a documentation site into a local directory
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Root URL of the documentation site
    url: String,

    /// Output directory (defaults to <domain>-docs)
    output: Option<PathBuf>,

    /// Fetch only the given URL, skipping site discovery
    #[arg(long)]
    single: bool,

    /// Test mode: at most 10 pages, shallow discovery
    #[arg(long)]
    test: bool,

    /// Skip the raw HTML mirror
    #[arg(long)]
    no_html: bool,

    /// Clean fetched markdown through the text model
    #[arg(long)]
    clean: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args).await,
    }
}

async fn run(args: RunArgs) -> Result<()> {
    // Credentials are checked before any network activity.
    let credentials = Credentials::from_env(args.clean)?;

    let mut job = CrawlJob::new(&args.url).context("invalid root URL")?;
    if let Some(output) = args.output {
        job = job.with_output_dir(output);
    }
    if args.single {
        job = job.single_page();
    }
    job = job
        .with_test_mode(args.test)
        .with_keep_html(!args.no_html)
        .with_clean(args.clean);

    let api = FirecrawlClient::new(credentials.scrape_api_key.clone())?;
    let cleaner: Box<dyn TextCleaner> = if args.clean {
        match credentials.cleaner_api_key {
            Some(key) => Box::new(OpenAiCleaner::new(key)?),
            None => bail!("cleaning requested but no cleaner API key is set"),
        }
    } else {
        Box::new(NoopCleaner)
    };

    let output_dir = job.output_dir.clone();
    let crawler = Crawler::new(&api, cleaner.as_ref());
    let summary = crawler.run(&job).await.context("crawl failed")?;

    if summary.pages_written == 0 {
        bail!(
            "no pages could be fetched from {} ({} failed); see {}",
            args.url,
            summary.pages_failed,
            summary.manifest_path.display()
        );
    }

    println!(
        "Crawl complete: {} pages written, {} failed. Results in {}",
        summary.pages_written,
        summary.pages_failed,
        output_dir.display()
    );
    Ok(())
}
