//! `inkmatch` command-line tool.
//!
//! ```bash
//! inkmatch compare ref.png candidate.png --mode strict --ink-dir ./ink
//! inkmatch detect page.png --strategy filtered
//! inkmatch anchor capture page1.png --anchor 210,150,80,60 --mask 180,220,200,50 -o anchor.json
//! inkmatch anchor resolve page7.png --anchor-file anchor.json
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use inkmatch::config::{
    write_json, AnchorReport, CompareReport, InkmatchConfig, IoError, RegionReport,
};
use inkmatch::io::{self, DecodeError};
use inkmatch::{
    AnchorError, ComparisonMode, GrayImage, ImageError, PixelRect, RegionDetector, RegionStrategy,
    SignatureComparator, VisualAnchor,
};
use log::info;
#[cfg(not(feature = "tracing"))]
use log::LevelFilter;
use serde::Serialize;

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Io(#[from] IoError),
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error(transparent)]
    Anchor(#[from] AnchorError),
}

/// Handwritten signature comparison and page region tools.
#[derive(Parser, Debug)]
#[command(name = "inkmatch", version, about, long_about = None)]
struct Cli {
    /// JSON config overriding pipeline parameters.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace). Without it the level
    /// comes from INKMATCH_LOG, defaulting to warn.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit tracing spans as JSON lines on stderr.
    #[cfg(feature = "tracing")]
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score the similarity of two signature crops.
    Compare(CompareArgs),
    /// Find the signature bounding box on a page.
    Detect(DetectArgs),
    /// Capture or resolve a visual anchor.
    #[command(subcommand)]
    Anchor(AnchorCommand),
}

#[derive(Args, Debug)]
struct CompareArgs {
    first: PathBuf,
    second: PathBuf,

    /// Comparison mode (strict, lenient, super_lenient). Defaults to the
    /// config's mode.
    #[arg(short, long)]
    mode: Option<ComparisonMode>,

    /// Crop of the first image, `x,y,width,height`.
    #[arg(long, value_parser = parse_rect)]
    crop_first: Option<PixelRect>,

    /// Crop of the second image, `x,y,width,height`.
    #[arg(long, value_parser = parse_rect)]
    crop_second: Option<PixelRect>,

    /// Directory receiving the extracted ink masks as PNG.
    #[arg(long)]
    ink_dir: Option<PathBuf>,

    /// Write the JSON report here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    Page,
    SubRegion,
    Filtered,
}

impl From<StrategyArg> for RegionStrategy {
    fn from(s: StrategyArg) -> Self {
        match s {
            StrategyArg::Page => RegionStrategy::Page,
            StrategyArg::SubRegion => RegionStrategy::SubRegion,
            StrategyArg::Filtered => RegionStrategy::Filtered,
        }
    }
}

#[derive(Args, Debug)]
struct DetectArgs {
    page: PathBuf,

    #[arg(short, long, value_enum, default_value_t = StrategyArg::Page)]
    strategy: StrategyArg,

    /// Search rectangle for the sub-region strategies, `x,y,width,height`.
    #[arg(long, value_parser = parse_rect)]
    region: Option<PixelRect>,

    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum AnchorCommand {
    /// Record an anchor patch and the region it locates.
    Capture {
        page: PathBuf,
        /// Patch rectangle, `x,y,width,height`.
        #[arg(long, value_parser = parse_rect)]
        anchor: PixelRect,
        /// Region rectangle, `x,y,width,height`.
        #[arg(long, value_parser = parse_rect)]
        mask: PixelRect,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Relocate a captured region on another page.
    Resolve {
        page: PathBuf,
        /// Anchor JSON written by `anchor capture`.
        #[arg(long)]
        anchor_file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_rect(s: &str) -> Result<PixelRect, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, w, h] = parts.as_slice() else {
        return Err(format!("expected x,y,width,height, got `{s}`"));
    };
    let num = |v: &str| v.parse::<usize>().map_err(|e| format!("`{v}`: {e}"));
    Ok(PixelRect::new(num(*x)?, num(*y)?, num(*w)?, num(*h)?))
}

#[cfg(feature = "tracing")]
fn init_logging(cli: &Cli) {
    inkmatch::core::init_tracing(cli.log_json);
}

#[cfg(not(feature = "tracing"))]
fn init_logging(cli: &Cli) {
    let result = match cli.verbose {
        0 => inkmatch::core::init_from_env(LevelFilter::Warn),
        1 => inkmatch::core::init_with_level(LevelFilter::Info),
        2 => inkmatch::core::init_with_level(LevelFilter::Debug),
        _ => inkmatch::core::init_with_level(LevelFilter::Trace),
    };
    if let Err(err) = result {
        eprintln!("logger already installed: {err}");
    }
}

fn emit<T: Serialize>(value: &T, output: Option<&Path>) -> Result<(), CliError> {
    match output {
        Some(path) => {
            write_json(value, path)?;
            info!("wrote {}", path.display());
        }
        None => {
            let json = serde_json::to_string_pretty(value).map_err(IoError::from)?;
            println!("{json}");
        }
    }
    Ok(())
}

fn load_cropped(path: &Path, crop: Option<PixelRect>) -> Result<GrayImage, CliError> {
    let img = io::load_gray(path)?;
    match crop {
        Some(rect) => Ok(img.view().crop(&rect)?),
        None => Ok(img),
    }
}

fn run_compare(args: &CompareArgs, cfg: &InkmatchConfig) -> Result<(), CliError> {
    let a = load_cropped(&args.first, args.crop_first)?;
    let b = load_cropped(&args.second, args.crop_second)?;
    let mode = args.mode.unwrap_or(cfg.mode);

    let comparator = SignatureComparator::new(cfg.comparator.clone());
    let result = comparator.compare(&a.view(), &b.view(), mode);

    if let Some(dir) = &args.ink_dir {
        std::fs::create_dir_all(dir).map_err(IoError::from)?;
        let sides = [(&result.first, "first.png"), (&result.second, "second.png")];
        for (prepared, name) in sides {
            if let Some(p) = prepared {
                io::write_mask_png(&p.stroke.mask, dir.join(name))?;
            }
        }
    }

    let report = CompareReport::new(
        args.first.display().to_string(),
        args.second.display().to_string(),
        &result,
    );
    emit(&report, args.output.as_deref())
}

fn run_detect(args: &DetectArgs, cfg: &InkmatchConfig) -> Result<(), CliError> {
    let rgba = io::load_raster(&args.page)?;
    let page = io::raster_view(&rgba)?;
    let detection =
        RegionDetector::new(cfg.region.clone()).detect(&page, args.region, args.strategy.into());
    let report = RegionReport::new(args.page.display().to_string(), &detection);
    emit(&report, args.output.as_deref())
}

fn run_anchor(cmd: &AnchorCommand, cfg: &InkmatchConfig) -> Result<(), CliError> {
    match cmd {
        AnchorCommand::Capture {
            page,
            anchor,
            mask,
            output,
        } => {
            let img = io::load_gray(page)?;
            let captured = VisualAnchor::capture(&img.view(), *anchor, *mask)?;
            emit(&captured, output.as_deref())
        }
        AnchorCommand::Resolve {
            page,
            anchor_file,
            output,
        } => {
            let anchor: VisualAnchor = inkmatch::config::load_json(anchor_file)?;
            let img = io::load_gray(page)?;
            let resolution = anchor.resolve(&img.view(), &cfg.anchor);
            let report = AnchorReport {
                image: page.display().to_string(),
                resolution,
            };
            emit(&report, output.as_deref())
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let cfg = match &cli.config {
        Some(path) => InkmatchConfig::load_json(path)?,
        None => InkmatchConfig::default(),
    };
    match &cli.command {
        Command::Compare(args) => run_compare(args, &cfg),
        Command::Detect(args) => run_detect(args, &cfg),
        Command::Anchor(cmd) => run_anchor(cmd, &cfg),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
