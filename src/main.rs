use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pivrot::engine::{OrderEngine, DEFAULT_UPPER_BOUND};
use pivrot::lengths::{read_lengths, LengthSourceError, UntilError};
use pivrot::report::{ReportGenerator, Tee};
use pivrot::timing::TimingLog;

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pivrot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Err(err) = run() {
        eprintln!("error: {err}");
        for cause in err.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
        std::process::exit(1);
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "pivrot",
    about = "Tabulate the order and cycle structure of the pivot-rotation permutation."
)]
struct Cli {
    #[command(subcommand)]
    lengths: LengthSource,
    #[command(flatten)]
    options: TableOptions,
}

#[derive(Subcommand, Debug)]
enum LengthSource {
    /// Every base length in start..end.
    Range {
        #[arg(long, default_value_t = 1)]
        start: usize,
        #[arg(long)]
        end: usize,
    },
    /// Base lengths read from a file with one number per line.
    Primes {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(Args, Debug)]
struct TableOptions {
    /// Realized length is scale * base + offset.
    #[arg(long, global = true, default_value_t = 1)]
    scale: usize,
    #[arg(long, global = true, default_value_t = 0)]
    offset: usize,
    /// Re-apply the transform to confirm every computed order.
    #[arg(long, global = true)]
    verify: bool,
    /// Largest number of applications tried when verifying.
    #[arg(long, global = true, value_name = "N", default_value_t = DEFAULT_UPPER_BOUND)]
    upper_bound: usize,
    /// Append the duration of every transform step to this file.
    #[arg(long, global = true, value_name = "FILE")]
    timing_log: Option<PathBuf>,
    /// Also write the table to this file.
    #[arg(long, global = true, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let options = &cli.options;
    ensure!(options.upper_bound > 0, "upper bound must be greater than zero");

    let mut engine = OrderEngine::new().with_upper_bound(options.upper_bound);
    if let Some(path) = &options.timing_log {
        let log = TimingLog::open(path)
            .with_context(|| format!("failed to open timing log {}", path.display()))?;
        engine = engine.with_timing(log);
    }

    let (scale, offset) = (options.scale, options.offset);
    let report = ReportGenerator::new(&engine)
        .with_checked_length_transform(move |base| base.checked_mul(scale)?.checked_add(offset))
        .verify(options.verify);

    let source: Box<dyn Iterator<Item = Result<usize, LengthSourceError>>> = match &cli.lengths {
        LengthSource::Range { start, end } => {
            info!(start, end, verify = options.verify, "starting sweep");
            Box::new((*start..*end).map(Ok::<usize, LengthSourceError>))
        }
        LengthSource::Primes { file } => {
            info!(file = %file.display(), verify = options.verify, "starting sweep");
            Box::new(read_lengths(file)?)
        }
    };
    let mut lengths = UntilError::new(source);

    let output = match &options.output {
        Some(path) => Some(BufWriter::new(File::create(path).with_context(|| {
            format!("failed to create output file {}", path.display())
        })?)),
        None => None,
    };

    let rows = report
        .write_to(&mut lengths, Tee::new(io::stdout().lock(), output))
        .context("sweep aborted")?;
    if let LengthSource::Primes { file } = &cli.lengths {
        lengths
            .finish()
            .with_context(|| format!("failed to read lengths from {}", file.display()))?;
    }
    info!(rows, "sweep finished");

    if let Some(log) = engine.timing() {
        log.flush()
            .with_context(|| format!("failed to flush timing log {}", log.path().display()))?;
    }

    Ok(())
}
