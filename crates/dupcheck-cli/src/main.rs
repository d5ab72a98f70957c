//! CLI binary for dupcheck: find assets duplicated across independently built packages.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dupcheck_cli::analyze::{self, AnalyzeRequest, LoadPolicy, LoadedPackages};
use dupcheck_cli::inputs::collect_manifests;
use dupcheck_core::config::{DuplicatePolicy, DupcheckConfig, MalformedPolicy, ReportFormat};
use dupcheck_core::loader::BuildReportLoader;
use dupcheck_scan::classify::{Bucket, Classifier};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "dupcheck",
    about = "Detect assets duplicated across independently built packages"
)]
struct Cli {
    /// Project root directory holding .dupcheck/config.toml (defaults to current directory)
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ManifestArgs {
    /// Build report files, one per package
    manifests: Vec<PathBuf>,

    /// Also load every build report found under this directory
    #[arg(long)]
    dir: Option<PathBuf>,

    /// What to do with a manifest that cannot be parsed: abort, skip
    #[arg(long)]
    on_malformed: Option<String>,

    /// Fail when a manifest lists the same asset path twice with different dependencies
    #[arg(long)]
    strict_duplicates: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan manifests for cross-package duplicates and write a report
    Analyze {
        #[command(flatten)]
        inputs: ManifestArgs,

        /// Report output path (defaults to report.output from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report format: text, json
        #[arg(short, long)]
        format: Option<String>,

        /// Scan packages in parallel
        #[arg(long)]
        parallel: bool,
    },

    /// List assets that depend on a given asset path
    Dependents {
        /// Asset path to look up
        target: String,

        #[command(flatten)]
        inputs: ManifestArgs,
    },

    /// Group duplicated asset paths by the configured folder rules
    Classify {
        #[command(flatten)]
        inputs: ManifestArgs,
    },

    /// Show per-package asset and dependency counts
    Info {
        #[command(flatten)]
        inputs: ManifestArgs,
    },
}

fn get_project_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.project {
        Some(p) => Ok(p.clone()),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let project_root = get_project_root(&cli)?;
    let config = DupcheckConfig::load(&project_root)
        .with_context(|| format!("failed to load config from {}", project_root.display()))?;

    match cli.command {
        Commands::Analyze {
            inputs,
            output,
            format,
            parallel,
        } => cmd_analyze(&project_root, &config, &inputs, output, format.as_deref(), parallel),
        Commands::Dependents { target, inputs } => cmd_dependents(&config, &inputs, &target),
        Commands::Classify { inputs } => cmd_classify(&config, &inputs),
        Commands::Info { inputs } => cmd_info(&config, &inputs),
    }
}

fn parse_format(name: &str) -> Result<ReportFormat> {
    match name {
        "text" | "txt" => Ok(ReportFormat::Text),
        "json" => Ok(ReportFormat::Json),
        other => anyhow::bail!("unsupported report format: {} (expected text or json)", other),
    }
}

fn load_policy(config: &DupcheckConfig, inputs: &ManifestArgs) -> Result<LoadPolicy> {
    let on_malformed = match inputs.on_malformed.as_deref() {
        None => config.manifest.on_malformed,
        Some("abort") => MalformedPolicy::Abort,
        Some("skip") => MalformedPolicy::Skip,
        Some(other) => anyhow::bail!("unsupported --on-malformed value: {} (expected abort or skip)", other),
    };
    let on_duplicate_asset = if inputs.strict_duplicates {
        DuplicatePolicy::Error
    } else {
        config.manifest.on_duplicate_asset
    };
    Ok(LoadPolicy {
        on_malformed,
        on_duplicate_asset,
    })
}

fn manifest_paths(config: &DupcheckConfig, inputs: &ManifestArgs) -> Result<Vec<PathBuf>> {
    let paths = collect_manifests(
        &inputs.manifests,
        inputs.dir.as_deref(),
        &config.manifest.pattern,
    )?;
    if paths.is_empty() {
        anyhow::bail!(
            "No manifests given. Pass build report files or --dir <folder> containing {}",
            config.manifest.pattern
        );
    }
    Ok(paths)
}

fn loading_spinner() -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    spinner
}

/// Load packages for the read-only subcommands.
fn load_inputs(config: &DupcheckConfig, inputs: &ManifestArgs) -> Result<LoadedPackages> {
    let paths = manifest_paths(config, inputs)?;
    let policy = load_policy(config, inputs)?;

    let spinner = loading_spinner();
    let loaded = analyze::load_packages(&paths, &BuildReportLoader, policy, Some(&spinner));
    spinner.finish_and_clear();

    let loaded = loaded?;
    for skipped in &loaded.skipped {
        eprintln!("  Skipped malformed manifest: {}", skipped.display());
    }
    Ok(loaded)
}

fn cmd_analyze(
    project_root: &Path,
    config: &DupcheckConfig,
    inputs: &ManifestArgs,
    output: Option<PathBuf>,
    format: Option<&str>,
    parallel: bool,
) -> Result<()> {
    let manifest_paths = manifest_paths(config, inputs)?;
    let format = match format {
        Some(name) => parse_format(name)?,
        None => config.report.format,
    };
    let output_path = output.unwrap_or_else(|| project_root.join(&config.report.output));

    let request = AnalyzeRequest {
        manifest_paths,
        output_path: output_path.clone(),
        policy: load_policy(config, inputs)?,
        format,
        title: config.report.title.clone(),
        parallel: parallel || config.scan.parallel,
        cancel: None,
    };

    eprintln!("Checking {} manifest(s)...", request.manifest_paths.len());
    let spinner = loading_spinner();
    let outcome = analyze::analyze_with_progress(&request, Some(&spinner));
    spinner.finish_and_clear();
    let outcome = outcome?;

    eprintln!("\nDuplicate check complete!");
    eprintln!("  Packages: {}", outcome.manifests_used);
    for skipped in &outcome.skipped {
        eprintln!("  Skipped: {}", skipped.display());
    }
    eprintln!("  Duplicates: {}", outcome.finding_count);
    eprintln!("  Distinct paths: {}", outcome.summary.distinct_paths);
    for (pair, count) in &outcome.summary.by_package_pair {
        eprintln!("    {}: {}", pair, count);
    }
    eprintln!("  Written to: {}", output_path.display());

    Ok(())
}

fn cmd_dependents(config: &DupcheckConfig, inputs: &ManifestArgs, target: &str) -> Result<()> {
    let loaded = load_inputs(config, inputs)?;
    let found = dupcheck_scan::refs::dependents(&loaded.packages, target);

    if found.is_empty() {
        eprintln!("No assets depend on: {}", target);
        return Ok(());
    }

    for dep in &found {
        println!("{}: {}", dep.package, dep.asset);
    }
    eprintln!("\n{} asset(s) depend on {}", found.len(), target);
    Ok(())
}

fn cmd_classify(config: &DupcheckConfig, inputs: &ManifestArgs) -> Result<()> {
    let loaded = load_inputs(config, inputs)?;
    let findings = dupcheck_scan::scan::scan(&loaded.packages)?;
    let classifier = Classifier::from_config(&config.classify);

    if classifier.rules().is_empty() {
        eprintln!("No folder rules configured. Add [[classify.rules]] to .dupcheck/config.toml.");
    }

    // Distinct duplicated paths in scan order, grouped by bucket.
    let mut seen: HashSet<&str> = HashSet::new();
    let mut groups: BTreeMap<Bucket, Vec<&str>> = BTreeMap::new();
    let mut hidden = 0;
    for f in &findings {
        if !seen.insert(f.dependency_path.as_str()) {
            continue;
        }
        match classifier.classify(&f.dependency_path) {
            Bucket::Hidden => hidden += 1,
            bucket => groups.entry(bucket).or_default().push(&f.dependency_path),
        }
    }

    for (bucket, paths) in &groups {
        let label = match bucket {
            Bucket::Folder(name) => name.as_str(),
            _ => "(unclassified)",
        };
        println!("{} ({})", label, paths.len());
        for path in paths {
            println!("  {}", path);
        }
    }

    eprintln!(
        "\n{} duplicated path(s), {} hidden by folder rules",
        seen.len(),
        hidden
    );
    Ok(())
}

fn cmd_info(config: &DupcheckConfig, inputs: &ManifestArgs) -> Result<()> {
    let loaded = load_inputs(config, inputs)?;

    for package in &loaded.packages {
        println!(
            "{}: {} assets, {} dependency edges",
            package.id(),
            package.len(),
            package.dependency_edge_count()
        );
    }
    println!();
    println!("Packages: {}", loaded.packages.len());
    println!(
        "Assets: {}",
        loaded.packages.iter().map(|p| p.len()).sum::<usize>()
    );
    Ok(())
}
