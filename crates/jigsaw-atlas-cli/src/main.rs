use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use image::{DynamicImage, ImageReader};
use jigsaw_atlas_core::config::{BottomEdge, PuzzleConfig};
use jigsaw_atlas_core::export::{manifest_filename, to_manifest};
use jigsaw_atlas_core::mask::DirMasks;
use jigsaw_atlas_core::model::GridSpec;
use jigsaw_atlas_core::source::tile_edge;
use jigsaw_atlas_core::{Puzzle, PuzzleBuilder, build_puzzle_images, plan_atlases};
use serde::Deserialize;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "jigsaw-atlas",
    about = "Cut an image into jigsaw pieces packed into texture atlases",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show a progress spinner (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Cut an image into pieces and write atlas PNGs plus the JSON manifest
    Build(BuildArgs),
    /// Geometry only (no image, no masks): generate a grid and export the manifest
    Layout(LayoutArgs),
    /// Print the atlas plan for a piece count
    Plan(PlanArgs),
}

#[derive(Args, Debug, Clone)]
struct PuzzleArgs {
    /// Piece size in pixels
    #[arg(short, long, default_value_t = 100, help_heading = "Puzzle")]
    size: u32,
    /// Padding around each piece inside an atlas
    #[arg(short, long, default_value_t = 2, help_heading = "Puzzle")]
    padding: u32,
    /// Candidate atlas sizes, ascending (comma separated)
    #[arg(long, value_delimiter = ',', default_value = "1024,2048,4096", help_heading = "Puzzle")]
    atlas_sizes: Vec<u32>,
    /// Mask edge over piece edge (tab overhang); atlas tiles are `size * ratio` px.
    /// `layout` and `plan` use the same tiles as `build`, pass 1.0 for bare cells
    #[arg(long, default_value_t = jigsaw_atlas_core::config::DEFAULT_MASK_RATIO, help_heading = "Puzzle")]
    mask_ratio: f32,
    /// Seed for tab generation (random when omitted)
    #[arg(long, help_heading = "Puzzle")]
    seed: Option<u64>,
    /// Reproduce the historical bottom row (random bottom tabs, no bottom classification)
    #[arg(long, default_value_t = false, help_heading = "Puzzle")]
    legacy_bottom_edge: bool,
    /// YAML config file path (overrides the options above)
    #[arg(long, help_heading = "Puzzle")]
    config: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, value_parser = ["json", "yaml"], help_heading = "Puzzle")]
    print_config: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct OutputArgs {
    /// Output directory
    #[arg(short, long, default_value = "output", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Base name of written files (defaults to the input file stem)
    #[arg(short, long, help_heading = "Input/Output")]
    name: Option<String>,
    /// Export atlas stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Dry run: compute everything but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct BuildArgs {
    /// Input image
    #[arg(short = 'f', long = "file", help_heading = "Input/Output")]
    input: PathBuf,
    /// Directory of piece masks named `{kind}_{top}_{right}_{bottom}_{left}.png`
    #[arg(long, default_value = "mask", help_heading = "Input/Output")]
    mask_dir: PathBuf,
    /// Draw red outlines around pieces (debug)
    #[arg(long, default_value_t = false, help_heading = "Export")]
    outlines: bool,
    #[command(flatten)]
    puzzle: PuzzleArgs,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug, Clone)]
struct LayoutArgs {
    /// Grid rows
    #[arg(long, help_heading = "Layout")]
    rows: u32,
    /// Grid columns
    #[arg(long, help_heading = "Layout")]
    columns: u32,
    /// Print the manifest to stdout instead of writing it
    #[arg(long, default_value_t = false, help_heading = "Export")]
    stdout: bool,
    #[command(flatten)]
    puzzle: PuzzleArgs,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug, Clone)]
struct PlanArgs {
    /// Number of pieces
    #[arg(long)]
    pieces: usize,
    #[command(flatten)]
    puzzle: PuzzleArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Build(args) => run_build(args, cli.progress && !cli.quiet),
        Commands::Layout(args) => run_layout(args),
        Commands::Plan(args) => run_plan(args),
    }
}

fn run_build(cli: &BuildArgs, show_progress: bool) -> anyhow::Result<()> {
    let mut cfg = puzzle_config(&cli.puzzle, cli.outlines)?;
    if print_config(&cli.puzzle, &cfg)? {
        return Ok(());
    }
    pin_seed(&mut cfg);

    let masks = DirMasks::new(&cli.mask_dir);
    masks
        .check()
        .with_context(|| "run from a folder containing the mask assets or pass --mask-dir")?;

    let image = load_image(&cli.input)
        .with_context(|| format!("read {}", cli.input.display()))?;
    info!(
        path = ?cli.input,
        width = image.width(),
        height = image.height(),
        "loaded input image"
    );
    let basename = base_name(&cli.output, Some(&cli.input));

    let bar = spinner(show_progress, "cutting pieces");
    let start = Instant::now();
    let out = build_puzzle_images(&image, &masks, &cfg)?;
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    info!(
        rows = out.source.rows,
        columns = out.source.columns,
        tile = out.source.tile_size,
        atlases = out.pages.len(),
        elapsed = %fmt_dur(start.elapsed()),
        "pieces packed"
    );

    if !cli.output.dry_run {
        fs::create_dir_all(&cli.output.out_dir)
            .with_context(|| format!("create out_dir {}", cli.output.out_dir.display()))?;
        let manifest = to_manifest(&out.puzzle, &basename);
        for (page, desc) in out.pages.iter().zip(&manifest.atlases) {
            let png_path = cli.output.out_dir.join(&desc.filename);
            page.rgba
                .save(&png_path)
                .with_context(|| format!("write {}", png_path.display()))?;
            info!(?png_path, id = page.layout.index, "wrote atlas");
        }
    }
    write_outputs(&out.puzzle, &basename, &cli.output)
}

fn run_layout(cli: &LayoutArgs) -> anyhow::Result<()> {
    let mut cfg = puzzle_config(&cli.puzzle, false)?;
    if print_config(&cli.puzzle, &cfg)? {
        return Ok(());
    }
    pin_seed(&mut cfg);
    let grid = GridSpec::new(
        cli.rows,
        cli.columns,
        tile_edge(cfg.piece_size, cfg.mask_ratio),
        cfg.padding,
    )?;
    let builder = PuzzleBuilder::new(cfg);
    let puzzle = builder.build(&grid)?;
    let basename = base_name(&cli.output, None);
    if cli.stdout {
        let manifest = to_manifest(&puzzle, &basename);
        println!("{}", serde_json::to_string_pretty(&manifest)?);
        return Ok(());
    }
    write_outputs(&puzzle, &basename, &cli.output)
}

fn run_plan(cli: &PlanArgs) -> anyhow::Result<()> {
    let cfg = puzzle_config(&cli.puzzle, false)?;
    if print_config(&cli.puzzle, &cfg)? {
        return Ok(());
    }
    let unit = tile_edge(cfg.piece_size, cfg.mask_ratio)
        .saturating_add(cfg.padding.saturating_mul(2));
    let plan = plan_atlases(cli.pieces, unit, &cfg.atlas_sizes)?;
    for (i, p) in plan.iter().enumerate() {
        println!("atlas {}: {}x{} holding {} pieces", i, p.size, p.size, p.pieces);
    }
    info!(pieces = cli.pieces, unit, atlases = plan.len(), "plan computed");
    Ok(())
}

/// Writes the manifest and optional stats for `puzzle`.
fn write_outputs(puzzle: &Puzzle, basename: &str, out: &OutputArgs) -> anyhow::Result<()> {
    let stats = puzzle.stats();
    info!(
        atlases = stats.num_atlases,
        pieces = stats.num_pieces,
        occupancy = %format!("{:.2}%", stats.occupancy * 100.0),
        "{}",
        stats.summary()
    );
    if out.dry_run {
        return Ok(());
    }
    fs::create_dir_all(&out.out_dir)
        .with_context(|| format!("create out_dir {}", out.out_dir.display()))?;

    let json_path = out.out_dir.join(manifest_filename(basename));
    let manifest = to_manifest(puzzle, basename);
    fs::write(&json_path, serde_json::to_string(&manifest)?)
        .with_context(|| format!("write {}", json_path.display()))?;
    info!(?json_path, atlases = manifest.atlases.len(), "manifest written");

    if let Some(stats_path) = &out.export_stats {
        fs::write(stats_path, serde_json::to_string_pretty(&stats)?)
            .with_context(|| format!("write {}", stats_path.display()))?;
        info!(?stats_path, "stats exported");
    }
    Ok(())
}

/// CLI values first, then the YAML file on top.
fn puzzle_config(args: &PuzzleArgs, outlines: bool) -> anyhow::Result<PuzzleConfig> {
    let mut cfg = PuzzleConfig::builder()
        .piece_size(args.size)
        .padding(args.padding)
        .atlas_sizes(args.atlas_sizes.clone())
        .mask_ratio(args.mask_ratio)
        .bottom_edge(if args.legacy_bottom_edge {
            BottomEdge::Legacy
        } else {
            BottomEdge::Flat
        })
        .seed(args.seed)
        .outlines(outlines)
        .build();
    if let Some(path) = &args.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse {}", path.display()))?;
        cfg = y.into_puzzle_config(cfg)?;
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Pins a random seed so the run can be reproduced from the log.
fn pin_seed(cfg: &mut PuzzleConfig) {
    if cfg.seed.is_none() {
        let seed = rand::random::<u64>();
        info!(seed, "generated seed");
        cfg.seed = Some(seed);
    }
}

/// Prints the merged config when requested; returns whether it did.
fn print_config(args: &PuzzleArgs, cfg: &PuzzleConfig) -> anyhow::Result<bool> {
    match args.print_config.as_deref() {
        Some("yaml") => println!("{}", serde_yaml::to_string(cfg)?),
        Some(_) => println!("{}", serde_json::to_string_pretty(cfg)?),
        None => return Ok(false),
    }
    Ok(true)
}

fn base_name(out: &OutputArgs, input: Option<&Path>) -> String {
    if let Some(n) = &out.name {
        return n.clone();
    }
    input
        .and_then(|p| p.file_stem())
        .and_then(|s| s.to_str())
        .unwrap_or("puzzle")
        .to_string()
}

fn spinner(show: bool, msg: &str) -> Option<indicatif::ProgressBar> {
    use indicatif::{ProgressBar, ProgressStyle};
    if !show {
        return None;
    }
    let b = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}]") {
        b.set_style(style);
    }
    b.set_message(msg.to_string());
    b.enable_steady_tick(Duration::from_millis(100));
    Some(b)
}

fn load_image(p: &Path) -> anyhow::Result<DynamicImage> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok(img)
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1000.0 {
        format!("{:.2}s", ms / 1000.0)
    } else {
        format!("{:.1}ms", ms)
    }
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    piece_size: Option<u32>,
    padding: Option<u32>,
    atlas_sizes: Option<Vec<u32>>,
    mask_ratio: Option<f32>,
    bottom_edge: Option<String>,
    seed: Option<u64>,
    outlines: Option<bool>,
}

impl YamlConfig {
    fn into_puzzle_config(self, mut cfg: PuzzleConfig) -> anyhow::Result<PuzzleConfig> {
        if let Some(v) = self.piece_size {
            cfg.piece_size = v;
        }
        if let Some(v) = self.padding {
            cfg.padding = v;
        }
        if let Some(v) = self.atlas_sizes {
            cfg.atlas_sizes = v;
        }
        if let Some(v) = self.mask_ratio {
            cfg.mask_ratio = v;
        }
        if let Some(v) = self.bottom_edge {
            cfg.bottom_edge = v
                .parse()
                .map_err(|_| anyhow::anyhow!("unknown bottom_edge: {}", v))?;
        }
        if let Some(v) = self.seed {
            cfg.seed = Some(v);
        }
        if let Some(v) = self.outlines {
            cfg.outlines = v;
        }
        Ok(cfg)
    }
}
