use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use exec_resolver::extract::{ExtractorChain, PageContent};
use exec_resolver::relevance::{is_leadership_candidate, score_page};
use exec_resolver::{
    format_for_output, merge, ExtractionRoute, ResolutionReport, ResolveRequest, Resolver,
    Settings,
};

#[derive(Parser)]
#[command(name = "exec_resolver", about = "Resolve a company's executive team from its website and filings")]
struct Cli {
    /// Settings file (default: ./exec_resolver.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve executives for one company
    Resolve {
        #[arg(long)]
        company: String,
        /// Company website or bare domain
        #[arg(short, long)]
        website: Option<String>,
        /// Filing or other trusted document URL (repeatable)
        #[arg(short, long = "document")]
        documents: Vec<String>,
        /// "US" or "global" keeps global leadership only
        #[arg(short, long)]
        location: Option<String>,
        /// blend, website or documents
        #[arg(short, long, default_value = "blend")]
        route: ExtractionRoute,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve every request in a JSON-lines file
    Batch {
        requests: PathBuf,
    },
    /// Run the site extractors over saved pages and merge the results
    Extract {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Score a page lead the way discovery does
    Score {
        #[arg(long)]
        url: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        snippet: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Resolve {
            company,
            website,
            documents,
            location,
            route,
            json,
        } => {
            let settings = Settings::load(cli.config.as_deref())?;
            let resolver = Resolver::from_settings(&settings)
                .context("Failed to set up collaborators")?;
            let request = ResolveRequest {
                company,
                website,
                documents,
                location,
                route,
            };
            let report = resolver.resolve(&request).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            Ok(())
        }
        Commands::Batch { requests } => {
            let settings = Settings::load(cli.config.as_deref())?;
            let resolver = Resolver::from_settings(&settings)
                .context("Failed to set up collaborators")?;
            run_batch(&resolver, &requests).await
        }
        Commands::Extract { files } => extract_files(&files),
        Commands::Score { url, title, snippet } => {
            println!("Score:     {}", score_page(&url, &title, &snippet));
            println!(
                "Candidate: {}",
                if is_leadership_candidate(&url, &title, &snippet) { "yes" } else { "no" }
            );
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn print_report(report: &ResolutionReport) {
    if report.profiles.is_empty() {
        println!("No executives found for {}.", report.company);
        return;
    }

    println!(
        "{:>3} | {:<28} | {:<24} | {:<6} | {:<13} | {:>3}",
        "#", "Name", "Role", "Conf", "Origin", "Src"
    );
    println!("{}", "-".repeat(92));
    for (i, p) in report.profiles.iter().enumerate() {
        let origin = if p.is_verified() {
            "verified"
        } else {
            match p.origin {
                exec_resolver::model::ProfileOrigin::Primary => "site",
                exec_resolver::model::ProfileOrigin::DocumentOnly => "document-only",
            }
        };
        println!(
            "{:>3} | {:<28} | {:<24} | {:<6} | {:<13} | {:>3}",
            i + 1,
            truncate(&p.display_name, 28),
            truncate(&p.role_label(), 24),
            format!("{:?}", p.confidence),
            origin,
            p.provenance.len()
        );
    }

    println!("\n--- Display order ---");
    for line in report.render() {
        println!("  {}", line);
    }
    println!("\n{} executives | {} events", report.profiles.len(), report.events.len());
}

async fn run_batch(resolver: &Resolver, path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let requests: Vec<ResolveRequest> = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).with_context(|| format!("Bad request on line {}", i + 1))
        })
        .collect::<Result<_>>()?;

    if requests.is_empty() {
        eprintln!("No requests in {}.", path.display());
        return Ok(());
    }

    let pb = ProgressBar::new(requests.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut found = 0;
    for request in &requests {
        pb.set_message(request.company.clone());
        let report = resolver.resolve(request).await;
        found += report.profiles.len();
        pb.suspend(|| serde_json::to_string(&report).map(|line| println!("{}", line)))?;
        pb.inc(1);
    }

    pb.finish_and_clear();
    eprintln!("Resolved {} companies, {} executives.", requests.len(), found);
    Ok(())
}

fn extract_files(files: &[PathBuf]) -> Result<()> {
    let chain = ExtractorChain::site_default();

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let pages: Vec<(PathBuf, String)> = files
        .iter()
        .map(|f| {
            std::fs::read_to_string(f)
                .map(|body| (f.clone(), body))
                .with_context(|| format!("Failed to read {}", f.display()))
        })
        .collect::<Result<_>>()?;

    let records: Vec<_> = pages
        .par_iter()
        .flat_map_iter(|(path, body)| {
            let page = PageContent::sniffed(&path.display().to_string(), body.as_str());
            let outcome = chain.run(&page);
            pb.inc(1);
            outcome.records
        })
        .collect();
    pb.finish_and_clear();

    let profiles = merge(&records, &[]);
    if profiles.is_empty() {
        println!("No executives found in {} files.", files.len());
        return Ok(());
    }
    for line in format_for_output(&profiles) {
        println!("{}", line);
    }
    println!("\n{} records -> {} executives", records.len(), profiles.len());
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
