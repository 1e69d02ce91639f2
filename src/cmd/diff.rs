//! Diff command implementation
//!
//! Handles the `bundle-stats-diff diff` command which compares the stats
//! files of two builds and writes the result as JSON for report renderers.

use anyhow::{Context, Result};
use clap::Args;
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{ConfigLoader, DiffOptions};
use crate::diff::{DiffOrchestrator, DiffRequest, FileDiffResults, OwnershipMap, RemoteManifests};
use crate::error::DiffError;
use crate::infra::{FileSystem, RealFileSystem};

/// Arguments of the `diff` command
#[derive(Debug, Clone, Default, Args)]
pub struct DiffArgs {
    /// Directory with the baseline build's stats files
    #[arg(value_name = "BASELINE_DIR")]
    pub baseline_dir: PathBuf,

    /// Directory with the candidate build's stats files
    #[arg(value_name = "CANDIDATE_DIR")]
    pub candidate_dir: PathBuf,

    /// Glob selecting stats files by relative path (repeatable, `!` negates)
    #[arg(long = "files", value_name = "GLOB")]
    pub files: Vec<String>,

    /// Glob selecting assets by name (repeatable, `!` negates)
    #[arg(long = "filter", value_name = "GLOB", allow_hyphen_values = true)]
    pub filter: Vec<String>,

    /// Bytes an asset may move before the change counts
    #[arg(long, value_name = "BYTES")]
    pub threshold: Option<u64>,

    /// JSON file mapping stats file names to owners
    #[arg(long, value_name = "FILE")]
    pub owners: Option<PathBuf>,

    /// Remote artifact manifest of the baseline build
    #[arg(long, value_name = "FILE", requires = "candidate_manifest")]
    pub baseline_manifest: Option<PathBuf>,

    /// Remote artifact manifest of the candidate build
    #[arg(long, value_name = "FILE", requires = "baseline_manifest")]
    pub candidate_manifest: Option<PathBuf>,

    /// Comparison tool address used for links
    #[arg(long, value_name = "URL")]
    pub host_url: Option<String>,

    /// Upper bound on worker threads
    #[arg(long, value_name = "N")]
    pub max_workers: Option<usize>,

    /// Diff one pair at a time on the main thread
    #[arg(long)]
    pub sequential: bool,

    /// Write JSON here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Suppress progress and summary output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Compare the stats files of two builds
///
/// Options come from `.bundle-diff.toml` in the working directory, with
/// command line flags taking precedence.
///
/// # Examples
///
/// ```no_run
/// use bundle_stats_diff::cmd::diff::{cmd_diff, DiffArgs};
///
/// cmd_diff(&DiffArgs {
///     baseline_dir: "main/stats".into(),
///     candidate_dir: "pr/stats".into(),
///     filter: vec!["!*.map".to_string()],
///     ..DiffArgs::default()
/// })?;
/// # Ok::<(), anyhow::Error>(())
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - `.bundle-diff.toml` or the owners file is invalid
/// - a directory or manifest cannot be read
/// - assets collide on their friendly names in some stats file (the JSON
///   for every other file is still written)
pub fn cmd_diff(args: &DiffArgs) -> Result<()> {
    let options = merge_options(ConfigLoader::load(Path::new("."))?, args)?;
    let request = build_request(args, options)?;

    let mut orchestrator = DiffOrchestrator::new();
    if !args.quiet && Term::stderr().is_term() {
        orchestrator = orchestrator.with_progress(progress_bar()?);
    }

    let results = orchestrator.diff(&request).with_context(|| {
        format!(
            "Failed to diff {} against {}",
            args.candidate_dir.display(),
            args.baseline_dir.display()
        )
    })?;

    let json = serde_json::to_string_pretty(&results).context("Failed to serialize results")?;
    match &args.output {
        Some(path) => fs::write(path, json + "\n")
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", json),
    }

    if !args.quiet {
        print_summary(&results);
    }

    if !results.failed_files.is_empty() {
        return Err(DiffError::RejectedFiles {
            names: results.failed_files.iter().map(|f| f.name.clone()).collect(),
        }
        .into());
    }

    Ok(())
}

/// Apply command line overrides on top of file options
fn merge_options(mut options: DiffOptions, args: &DiffArgs) -> Result<DiffOptions> {
    if !args.files.is_empty() {
        options.file_glob = args.files.clone();
    }
    if !args.filter.is_empty() {
        options.asset_filter = args.filter.clone();
    }
    if let Some(threshold) = args.threshold {
        options.threshold = threshold;
    }
    if let Some(max_workers) = args.max_workers {
        options.max_workers = max_workers;
    }
    if args.sequential {
        options.parallel = false;
    }
    if args.host_url.is_some() {
        options.host_url = args.host_url.clone();
    }

    options.validate()?;
    Ok(options)
}

fn build_request(args: &DiffArgs, options: DiffOptions) -> Result<DiffRequest> {
    let manifests = match (&args.baseline_manifest, &args.candidate_manifest) {
        (Some(baseline), Some(candidate)) => {
            let host_url = options
                .host_url
                .clone()
                .context("--host-url (or host-url in .bundle-diff.toml) is required with manifests")?;
            Some(RemoteManifests::new(
                baseline.clone(),
                candidate.clone(),
                host_url,
            ))
        }
        _ => None,
    };

    let mut request =
        DiffRequest::new(&args.baseline_dir, &args.candidate_dir).options(options);
    if let Some(manifests) = manifests {
        request = request.manifests(manifests);
    }
    if let Some(path) = &args.owners {
        request = request.owners(load_owners(&RealFileSystem, path)?);
    }
    Ok(request)
}

/// Read a `{"<stats file>": ["owner", ...]}` JSON object
fn load_owners<FS: FileSystem>(fs: &FS, path: &Path) -> Result<OwnershipMap> {
    let contents = fs
        .read_to_string(path)
        .with_context(|| format!("Failed to read owners file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse owners file {}", path.display()))
}

fn progress_bar() -> Result<ProgressBar> {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{spinner} diffing stats files [{bar:30}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    Ok(bar)
}

fn print_summary(results: &FileDiffResults) {
    eprintln!(
        "{} {} of {} compared files changed, {} new, {} removed",
        style("bundle-stats-diff:").bold(),
        style(results.changed_file_count()).yellow(),
        results.with_differences.len(),
        style(results.new_files.len()).green(),
        style(results.removed_files.len()).red()
    );
    for failed in &results.failed_files {
        eprintln!("  {} {}", style("rejected:").red().bold(), failed.name);
    }
}
