//! Whole-run diffing of two stats directories
//!
//! The coordinator discovers and pairs stats files, then hands every pair
//! that needs parsing to a bounded rayon pool. Each worker owns a contiguous
//! slice of pairs and walks it in small batches, so at most one pair's
//! documents per worker are resident at a time. Outcomes travel back over a
//! channel and only the coordinator touches the result buffers.
//!
//! A failing pair never stops its siblings: unreadable files are dropped and
//! ambiguous comparisons are reported in `failed_files`.

use super::assets::AssetDiffer;
use super::discover::discover_stats_files;
use super::manifest::RemoteManifests;
use super::pairing::{pair_files, FilePair, OwnershipMap, Sides};
use super::types::{
    DiffStats, FailedFile, FileDiffResult, FileDiffResults, PairOutcome, RemovedFile,
};
use crate::config::DiffOptions;
use crate::error::DiffError;
use crate::infra::{FileSystem, RealFileSystem};
use crate::stats::loader::StatsLoader;
use crate::stats::pattern::PatternFilter;
use crate::stats::types::{ExtraKeys, StatsDocument};
use indicatif::ProgressBar;
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Instant;

/// Inputs of a diff run
#[derive(Debug, Clone)]
pub struct DiffRequest {
    /// Directory holding the baseline build's stats files
    pub baseline_dir: PathBuf,
    /// Directory holding the candidate build's stats files
    pub candidate_dir: PathBuf,
    /// Thresholds, filters and worker settings
    pub options: DiffOptions,
    /// Remote uploads used to build comparison links
    pub manifests: Option<RemoteManifests>,
    /// Owners per stats file base name
    pub owners: Option<OwnershipMap>,
}

impl DiffRequest {
    /// Compare two directories with default options
    pub fn new(baseline_dir: impl Into<PathBuf>, candidate_dir: impl Into<PathBuf>) -> Self {
        Self {
            baseline_dir: baseline_dir.into(),
            candidate_dir: candidate_dir.into(),
            options: DiffOptions::default(),
            manifests: None,
            owners: None,
        }
    }

    /// Replace all options
    pub fn options(mut self, options: DiffOptions) -> Self {
        self.options = options;
        self
    }

    /// Only compare stats files whose relative path matches
    pub fn file_glob<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.file_glob = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Only compare assets whose friendly name matches
    pub fn asset_filter<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.asset_filter = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Diff pairs one after another on the calling thread
    pub fn sequential(mut self) -> Self {
        self.options.parallel = false;
        self
    }

    /// Attach comparison links from remote manifests
    pub fn manifests(mut self, manifests: RemoteManifests) -> Self {
        self.manifests = Some(manifests);
        self
    }

    /// Attach owners to each stats file
    pub fn owners(mut self, owners: OwnershipMap) -> Self {
        self.owners = Some(owners);
        self
    }
}

/// Runs a [`DiffRequest`]
///
/// # Examples
///
/// ```no_run
/// use bundle_stats_diff::diff::{DiffOrchestrator, DiffRequest};
///
/// let request = DiffRequest::new("baseline/", "candidate/").asset_filter(["!*.map"]);
/// let results = DiffOrchestrator::new().diff(&request)?;
/// println!("{} files changed", results.changed_file_count());
/// # Ok::<(), bundle_stats_diff::error::DiffError>(())
/// ```
pub struct DiffOrchestrator<FS: FileSystem = RealFileSystem> {
    fs: FS,
    progress: ProgressBar,
}

impl DiffOrchestrator<RealFileSystem> {
    /// Orchestrator reading from the real filesystem
    pub fn new() -> Self {
        Self::with_fs(RealFileSystem)
    }
}

impl Default for DiffOrchestrator<RealFileSystem> {
    fn default() -> Self {
        Self::new()
    }
}

impl<FS: FileSystem + Clone + Send + Sync> DiffOrchestrator<FS> {
    /// Orchestrator with a custom filesystem implementation
    ///
    /// Directory discovery always walks the real filesystem; stats files and
    /// manifests are read through `fs`.
    pub fn with_fs(fs: FS) -> Self {
        Self {
            fs,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report per-pair progress on `progress`
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Run a diff.
    ///
    /// Unreadable or malformed stats files are logged and left out of the
    /// result. Pairs whose assets collide on a friendly name are listed in
    /// [`FileDiffResults::failed_files`].
    ///
    /// # Errors
    ///
    /// Invalid patterns and unreadable directories or manifests abort the
    /// run.
    pub fn diff(&self, request: &DiffRequest) -> Result<FileDiffResults, DiffError> {
        let options = &request.options;
        let file_filter = (!options.file_glob.is_empty())
            .then(|| PatternFilter::for_paths(&options.file_glob))
            .transpose()?;
        let asset_filter = (!options.asset_filter.is_empty())
            .then(|| PatternFilter::for_names(&options.asset_filter))
            .transpose()?;
        let links = request
            .manifests
            .as_ref()
            .map(|m| m.comparison_links(&self.fs))
            .transpose()?;

        let baseline = discover_stats_files(&request.baseline_dir, file_filter.as_ref())?;
        let candidate = discover_stats_files(&request.candidate_dir, file_filter.as_ref())?;
        let pairs = pair_files(&baseline, &candidate, request.owners.as_ref());
        info!(
            "Paired {} stats files ({} baseline, {} candidate)",
            pairs.len(),
            baseline.len(),
            candidate.len()
        );

        let job = PairJob {
            loader: StatsLoader::with_fs(self.fs.clone()).extra_keys(ExtraKeys::Skip),
            differ: AssetDiffer::new()
                .with_threshold(options.threshold)
                .with_filter(asset_filter),
            concurrent_loads: options.parallel,
        };

        self.progress.set_length(pairs.len() as u64);
        let started = Instant::now();
        let outcomes = if options.parallel {
            self.run_parallel(&job, &pairs, options)?
        } else {
            self.run_sequential(&job, &pairs)
        };
        self.progress.finish_and_clear();
        info!(
            "Diffed {} pairs in {} ms",
            pairs.len(),
            started.elapsed().as_millis()
        );

        let mut results: FileDiffResults = outcomes.into_iter().collect();

        if let Some(links) = links {
            for result in &mut results.with_differences {
                result.comparison_tool_url = links.get(&result.name).cloned();
            }
        }

        Ok(results)
    }

    fn run_sequential(&self, job: &PairJob<FS>, pairs: &[FilePair]) -> Vec<PairOutcome> {
        pairs
            .iter()
            .map(|pair| {
                let outcome = job.run(pair);
                self.progress.inc(1);
                outcome
            })
            .collect()
    }

    fn run_parallel(
        &self,
        job: &PairJob<FS>,
        pairs: &[FilePair],
        options: &DiffOptions,
    ) -> Result<Vec<PairOutcome>, DiffError> {
        let mut slots: Vec<Option<PairOutcome>> = vec![None; pairs.len()];

        // Removed files need no parsing
        let mut pending: Vec<(usize, &FilePair)> = Vec::new();
        for (index, pair) in pairs.iter().enumerate() {
            match &pair.sides {
                Sides::BaselineOnly(path) => {
                    slots[index] = Some(removed(&pair.name, path));
                    self.progress.inc(1);
                }
                _ => pending.push((index, pair)),
            }
        }

        if pending.is_empty() {
            return Ok(slots.into_iter().flatten().collect());
        }

        let workers = worker_count(options.max_workers).min(pending.len());
        let slice_len = pending.len().div_ceil(workers);
        let batch_size = options.batch_size.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("diff-worker-{}", i))
            .build()?;
        debug!(
            "Diffing {} pairs on {} workers, {} per batch",
            pending.len(),
            workers,
            batch_size
        );

        let (tx, rx) = mpsc::channel::<(usize, PairOutcome)>();

        pool.in_place_scope(|scope| {
            for (worker, slice) in pending.chunks(slice_len).enumerate() {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    for (batch_no, batch) in slice.chunks(batch_size).enumerate() {
                        for (index, pair) in batch {
                            if tx.send((*index, job.run(pair))).is_err() {
                                return;
                            }
                        }
                        debug!("Worker {} finished batch {}", worker, batch_no);
                    }
                });
            }
            drop(tx);

            for (index, outcome) in rx {
                self.progress.inc(1);
                slots[index] = Some(outcome);
            }
        });

        Ok(slots.into_iter().flatten().collect())
    }
}

/// Shared, read-only state for diffing one pair
struct PairJob<FS: FileSystem> {
    loader: StatsLoader<FS>,
    differ: AssetDiffer,
    concurrent_loads: bool,
}

impl<FS: FileSystem + Sync> PairJob<FS> {
    /// Diff one pair. Errors stay attributed to the pair: bad input files
    /// are dropped, anything else rejects the pair.
    fn run(&self, pair: &FilePair) -> PairOutcome {
        match self.diff_pair(pair) {
            Ok(outcome) => outcome,
            Err(e) if e.is_pair_recoverable() => {
                let message = e.full_message();
                warn!("Skipping {}: {}", pair.name, message);
                PairOutcome::Failed {
                    name: pair.name.clone(),
                    message,
                }
            }
            Err(e) => {
                let message = e.full_message();
                error!("Rejecting {}: {}", pair.name, message);
                PairOutcome::Rejected(FailedFile {
                    name: pair.name.clone(),
                    error: message,
                })
            }
        }
    }

    fn diff_pair(&self, pair: &FilePair) -> Result<PairOutcome, DiffError> {
        match &pair.sides {
            Sides::Both {
                baseline,
                candidate,
            } => {
                debug!("Diffing {}", pair.name);
                let (baseline, candidate) = if self.concurrent_loads {
                    self.loader.load_pair(baseline, candidate)
                } else {
                    (self.loader.load(baseline), self.loader.load(candidate))
                };
                let diff_stats = self.differ.diff(&baseline?, &candidate?)?;
                Ok(PairOutcome::Changed(file_result(pair, diff_stats)))
            }
            Sides::CandidateOnly(candidate) => {
                debug!("Diffing new file {}", pair.name);
                let candidate = self.loader.load(candidate)?;
                let diff_stats = self.differ.diff(&StatsDocument::default(), &candidate)?;
                Ok(PairOutcome::Added(file_result(pair, diff_stats)))
            }
            Sides::BaselineOnly(baseline) => Ok(removed(&pair.name, baseline)),
        }
    }
}

fn file_result(pair: &FilePair, diff_stats: DiffStats) -> FileDiffResult {
    FileDiffResult {
        name: pair.name.clone(),
        diff_stats,
        owned_by: pair.owned_by.clone(),
        comparison_tool_url: None,
    }
}

fn removed(name: &str, baseline_path: &Path) -> PairOutcome {
    PairOutcome::Removed(RemovedFile {
        name: name.to_string(),
        baseline_path: baseline_path.to_path_buf(),
    })
}

/// Half the available cores, capped at `max_workers`, never zero
pub fn worker_count(max_workers: usize) -> usize {
    let cpus = std::thread::available_parallelism().map_or(1, |n| n.get());
    cpus.div_ceil(2).min(max_workers).max(1)
}
