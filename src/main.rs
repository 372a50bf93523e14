// owner-report: Render owner expense reports from JSON contexts

use clap::Parser;
use owner_report::{load_context, RenderConfig, ReportError, ReportWriter};
use std::path::PathBuf;

/// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Render owner expense reports to PDF")]
struct Args {
    /// Report context JSON file (repeat to render several reports concurrently)
    #[arg(short, long = "context", required = true)]
    contexts: Vec<PathBuf>,

    /// Directory the reports are written to
    #[arg(short, long, default_value = "temp_reports")]
    output_dir: PathBuf,

    /// Theme and page layout JSON file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ReportError> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };
    let writer = ReportWriter::with_config(&args.output_dir, config)?;

    // Parse every context up front so a bad file fails before any rendering starts
    let contexts = args
        .contexts
        .iter()
        .map(|path| load_context(path))
        .collect::<Result<Vec<_>, _>>()?;

    let handles: Vec<_> = contexts
        .into_iter()
        .map(|ctx| {
            let writer = writer.clone();
            let owner = ctx.owner.name.clone();
            let period = ctx.period.label();
            tokio::spawn(async move { (owner, period, writer.generate_report(ctx).await) })
        })
        .collect();

    let mut first_error = None;
    for handle in handles {
        let (owner, period, result) = handle.await.map_err(|e| ReportError::Task(e.to_string()))?;
        match result {
            Ok(path) => {
                println!("✓ Generated: {}", path.display());
                println!("  Owner: {}", owner);
                println!("  Period: {}", period);
            }
            Err(e) => {
                eprintln!("✗ Failed report for {} ({}): {}", owner, period, e);
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
