//! `ddreduce` — command-line driver for the delta-debugging reducer.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use ddreduce::atoms::{AtomArray, AtomKind};
use ddreduce::builder::ConcatTestBuilder;
use ddreduce::cache::{self, CacheConfig, SharedCache};
use ddreduce::config::Configuration;
use ddreduce::dd::Dd;
use ddreduce::error::{ReductionError, Result};
use ddreduce::events::{EventSink, Logger, Statistics};
use ddreduce::iterator::{self, CombinedIterator, ComplementIterator, SubsetIterator};
use ddreduce::parallel_dd::ParallelDd;
use ddreduce::splitter::{self};
use ddreduce::tester::{self, SubprocessTester};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AtomArg {
    Line,
    Char,
    Both,
}

/// Shrink a failing input to a smaller one that still reproduces the same
/// failure, via delta debugging (ddmin/dd-star).
#[derive(Parser, Debug)]
#[command(name = "ddreduce", version)]
struct Cli {
    /// Path to the failing input file to reduce.
    #[arg(long)]
    input: PathBuf,

    /// Path to the interestingness test: exit 0 means the input still
    /// reproduces the failure.
    #[arg(long)]
    test: PathBuf,

    /// Outcome cache strategy.
    #[arg(long, default_value = "config-tuple")]
    cache: String,

    /// Partitioning strategy.
    #[arg(long, default_value = "zeller")]
    split: String,

    /// Initial granularity (number of subsets to start each atom pass at).
    #[arg(long, default_value_t = 2)]
    granularity: usize,

    /// Force a text encoding instead of autodetecting (UTF-8, else latin-1).
    #[arg(long)]
    encoding: Option<String>,

    /// Run ddmin once instead of to a dd-star fixed point.
    #[arg(long)]
    no_dd_star: bool,

    /// Run test dispatches concurrently.
    #[arg(short = 'p', long)]
    parallel: bool,

    /// Concurrent test dispatches when `--parallel` is set. Defaults to the
    /// available parallelism.
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Run the greedy merge over concurrently discovered FAILs instead of
    /// the classical first-FAIL-wins behavior. Only meaningful with
    /// `--parallel`.
    #[arg(long)]
    greedy: bool,

    /// Try complements before subsets within a cycle.
    #[arg(long)]
    complement_first: bool,

    /// Direction to walk subset indices.
    #[arg(long, default_value = "forward")]
    subset_iterator: String,

    /// Direction to walk complement indices.
    #[arg(long, default_value = "forward")]
    complement_iterator: String,

    /// Store `Fail` outcomes in the cache, not just `Pass`.
    #[arg(long)]
    cache_fail: bool,

    /// Never evict cache entries after a successful reduction.
    #[arg(long)]
    no_cache_evict_after_fail: bool,

    /// Stop after this many seconds, writing the best configuration found.
    #[arg(long)]
    limit_time: Option<u64>,

    /// Stop after this many executed tests, writing the best configuration
    /// found.
    #[arg(long)]
    limit_tests: Option<u64>,

    /// Where to write the minimized result. Defaults to overwriting
    /// `--input`.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Keep the per-dispatch scratch directories instead of removing them.
    #[arg(long)]
    no_cleanup: bool,

    /// Write run statistics as JSON to this path.
    #[arg(long)]
    statistics: Option<PathBuf>,

    /// Which atomic unit to reduce over. `both` runs a line pass followed
    /// by a char pass over its output.
    #[arg(long, value_enum, default_value_t = AtomArg::Line)]
    atom: AtomArg,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if err.is_clean_stop() {
                tracing::warn!(%err, "reduction stopped early");
                ExitCode::SUCCESS
            } else {
                tracing::error!(%err, "reduction failed");
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    tester::validate_executable(&cli.test).map_err(ReductionError::Configuration)?;
    if !splitter::NAMES.contains(&cli.split.as_str()) {
        return Err(ReductionError::Configuration(format!(
            "unknown --split strategy {:?}, expected one of {:?}",
            cli.split,
            splitter::NAMES
        )));
    }
    if !cache::NAMES.contains(&cli.cache.as_str()) {
        return Err(ReductionError::Configuration(format!(
            "unknown --cache strategy {:?}, expected one of {:?}",
            cli.cache,
            cache::NAMES
        )));
    }
    let subset_dir = iterator::direction_by_name(&cli.subset_iterator).ok_or_else(|| {
        ReductionError::Configuration(format!("unknown --subset-iterator {:?}", cli.subset_iterator))
    })?;
    let complement_dir = iterator::direction_by_name(&cli.complement_iterator).ok_or_else(|| {
        ReductionError::Configuration(format!(
            "unknown --complement-iterator {:?}",
            cli.complement_iterator
        ))
    })?;

    let raw = std::fs::read(&cli.input).map_err(|e| ReductionError::Exception {
        best: Configuration::empty(),
        source: e.into(),
    })?;
    let content = decode(&raw, cli.encoding.as_deref())?;

    let work_dir = scratch_dir();
    std::fs::create_dir_all(&work_dir).map_err(|e| ReductionError::Exception {
        best: Configuration::empty(),
        source: e.into(),
    })?;

    let stats = Arc::new(Statistics::new());
    let mut events = EventSink::new();
    events.subscribe(Arc::new(Logger));
    events.subscribe(stats.clone());

    let passes: &[AtomKind] = match cli.atom {
        AtomArg::Line => &[AtomKind::Line],
        AtomArg::Char => &[AtomKind::Char],
        AtomArg::Both => &[AtomKind::Line, AtomKind::Char],
    };

    let mut reduced = content;
    for (pass_index, &kind) in passes.iter().enumerate() {
        reduced = run_pass(
            &cli,
            &reduced,
            kind,
            pass_index,
            &work_dir,
            events.clone(),
            subset_dir,
            complement_dir,
        )?;
    }

    let out_path = cli.out.clone().unwrap_or_else(|| cli.input.clone());
    std::fs::write(&out_path, &reduced).map_err(|e| ReductionError::Exception {
        best: Configuration::empty(),
        source: e.into(),
    })?;

    if let Some(stats_path) = &cli.statistics {
        let json = stats.to_json().map_err(|e| ReductionError::Exception {
            best: Configuration::empty(),
            source: e.into(),
        })?;
        std::fs::write(stats_path, json).map_err(|e| ReductionError::Exception {
            best: Configuration::empty(),
            source: e.into(),
        })?;
    }

    if !cli.no_cleanup {
        let _ = std::fs::remove_dir_all(&work_dir);
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_pass(
    cli: &Cli,
    content: &str,
    kind: AtomKind,
    pass_index: usize,
    work_dir: &std::path::Path,
    events: EventSink,
    subset_dir: iterator::Direction,
    complement_dir: iterator::Direction,
) -> Result<String> {
    let atoms = AtomArray::by_kind(content, kind);
    if atoms.is_empty() {
        return Ok(content.to_string());
    }

    let builder: Arc<dyn ddreduce::builder::TestBuilder> = Arc::new(ConcatTestBuilder::new(atoms.clone()));
    let splitter = splitter::by_name(&cli.split).expect("validated above");
    let config_iterator = CombinedIterator::new(
        SubsetIterator::new(subset_dir),
        ComplementIterator::new(complement_dir),
        !cli.complement_first,
    );
    let cache_config = CacheConfig {
        cache_fail: cli.cache_fail,
        evict_after_fail: !cli.no_cache_evict_after_fail,
        measure_memory: false,
    };
    let id_prefix = vec![format!("a{pass_index}")];
    let stop = if cli.limit_time.is_some() || cli.limit_tests.is_some() {
        let mut predicate = ddreduce::stop::StopPredicate::new();
        if let Some(secs) = cli.limit_time {
            predicate = predicate.deadline(Duration::from_secs(secs));
        }
        if let Some(max) = cli.limit_tests {
            predicate = predicate.max_tests(max);
        }
        Some(predicate)
    } else {
        None
    };

    let full = Configuration::full(atoms.len());

    let result = if cli.parallel {
        let jobs = cli.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        let cache = Arc::new(SharedCache::new(
            cache::by_name(&cli.cache, cache_config).expect("validated above"),
        ));
        let tester: Arc<dyn ddreduce::tester::Tester> = Arc::new(
            SubprocessTester::new(&cli.test, work_dir).cleanup(!cli.no_cleanup),
        );
        let stop = stop.map(Arc::new);
        let mut reducer = ParallelDd::new(
            splitter,
            config_iterator,
            cache,
            builder.clone(),
            tester,
            id_prefix,
            !cli.no_dd_star,
            stop,
            events,
            jobs,
            cli.greedy,
        );
        let rt = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| ReductionError::Exception {
                best: Configuration::empty(),
                source: e.into(),
            })?;
        rt.block_on(reducer.reduce(full, cli.granularity))?
    } else {
        let cache = cache::by_name(&cli.cache, cache_config).expect("validated above");
        let tester: Box<dyn ddreduce::tester::Tester> = Box::new(
            SubprocessTester::new(&cli.test, work_dir).cleanup(!cli.no_cleanup),
        );
        let mut reducer = Dd::new(
            splitter,
            config_iterator,
            cache,
            builder.clone(),
            tester,
            id_prefix,
            !cli.no_dd_star,
            stop,
            events,
        );
        reducer.reduce(full, cli.granularity)?
    };

    Ok(builder.build(&result))
}

/// Detect UTF-8, fall back to a declared encoding, otherwise latin-1. This
/// is deliberately not full `chardet`-grade detection.
fn decode(raw: &[u8], declared: Option<&str>) -> Result<String> {
    if let Some(name) = declared {
        let encoding = encoding_rs::Encoding::for_label(name.as_bytes()).ok_or_else(|| {
            ReductionError::Configuration(format!("unknown --encoding {name:?}"))
        })?;
        let (text, _, had_errors) = encoding.decode(raw);
        if had_errors {
            return Err(ReductionError::Configuration(format!(
                "input is not valid {name}"
            )));
        }
        return Ok(text.into_owned());
    }
    match std::str::from_utf8(raw) {
        Ok(text) => Ok(text.to_string()),
        Err(_) => {
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(raw);
            Ok(text.into_owned())
        }
    }
}

fn scratch_dir() -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%dT%H%M%S%3f");
    std::env::temp_dir().join(format!("ddreduce-{timestamp}-{}", std::process::id()))
}
