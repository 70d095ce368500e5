use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "led2bin", version)]
struct Cli {
    /// Log conversion details to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert GIFs into packed `gifN.bin` streams.
    Convert(ConvertArgs),
    /// Print the timing extracted from a GIF as JSON.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input GIF files, converted in the given order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory for `gif1.bin`, `gif2.bin`, ...
    #[arg(long)]
    out: PathBuf,

    /// JSON configuration file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Matrix width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Matrix height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Channel order: rgb, grb or bgr (anything else means rgb).
    #[arg(long)]
    color_order: Option<String>,

    /// Minimum frame delay in milliseconds.
    #[arg(long)]
    min_delay: Option<u32>,

    /// Decode and pack every frame instead of repeating the first one.
    #[arg(long)]
    per_frame: bool,

    /// Resampling filter.
    #[arg(long, value_enum, default_value_t = FilterChoice::CatmullRom)]
    filter: FilterChoice,

    /// Convert inputs in parallel.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for `--parallel`.
    #[arg(long)]
    threads: Option<usize>,

    /// Pause between sequential conversions, in milliseconds.
    #[arg(long, default_value_t = 0)]
    pause_ms: u64,

    /// Refuse to replace existing output files.
    #[arg(long)]
    no_overwrite: bool,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input GIF file.
    input: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FilterChoice {
    Nearest,
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl From<FilterChoice> for led2bin::ResizeFilter {
    fn from(choice: FilterChoice) -> Self {
        match choice {
            FilterChoice::Nearest => Self::Nearest,
            FilterChoice::Triangle => Self::Triangle,
            FilterChoice::CatmullRom => Self::CatmullRom,
            FilterChoice::Lanczos3 => Self::Lanczos3,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Convert(args) => cmd_convert(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "led2bin=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &ConvertArgs) -> anyhow::Result<led2bin::ConvertConfig> {
    let mut cfg = match &args.config {
        Some(path) => led2bin::ConvertConfig::from_json_file(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => led2bin::ConvertConfig::default(),
    };
    if let Some(w) = args.width {
        cfg.matrix_width = w;
    }
    if let Some(h) = args.height {
        cfg.matrix_height = h;
    }
    if let Some(order) = &args.color_order {
        cfg.color_order = led2bin::ColorOrder::parse(order);
    }
    if let Some(ms) = args.min_delay {
        cfg.min_delay_ms = ms;
    }
    if args.per_frame {
        cfg.frame_mode = led2bin::FrameMode::PerFrame;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args)?;
    let rasterizer = led2bin::ImageRasterizer::new(args.filter.into());
    let opts = led2bin::BatchOptions {
        parallel: args.parallel,
        threads: args.threads,
        pause_ms: args.pause_ms,
    };

    let results = led2bin::convert_files_with(&args.inputs, &cfg, &rasterizer, &opts);
    for r in &results {
        print_result(r);
    }
    let summary = led2bin::BatchSummary::from_results(&results);
    println!(
        "conversion complete: {} succeeded, {} failed ({} bytes)",
        summary.succeeded, summary.failed, summary.total_bytes
    );

    led2bin::write_outputs(&results, &args.out, !args.no_overwrite)
        .with_context(|| format!("write outputs to '{}'", args.out.display()))?;

    if summary.succeeded == 0 {
        anyhow::bail!("no input could be converted");
    }
    Ok(())
}

fn print_result(r: &led2bin::ConversionResult) {
    match &r.outcome {
        led2bin::ConversionOutcome::Success {
            frame_count,
            effective_delay_ms,
            size_bytes,
            ..
        } => println!(
            "{}  from {} ({size_bytes} bytes, {effective_delay_ms}ms delay, {frame_count} frames)",
            r.output_name, r.source
        ),
        led2bin::ConversionOutcome::Failure { reason } => {
            println!("{}  from {} FAILED: {reason}", r.output_name, r.source)
        }
    }
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("read '{}'", args.input.display()))?;
    let timing = led2bin::parse_timing(&bytes);
    let json = serde_json::to_string_pretty(&timing).context("serialize timing")?;
    println!("{json}");
    Ok(())
}
