use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "segcanvas", version)]
struct Cli {
    /// Editor config JSON (defaults apply to missing fields).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the maximum tile side.
    #[arg(long, global = true)]
    max_tile: Option<u32>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print how an image would be edited (mode, tile grid) as JSON.
    Info(InfoArgs),
    /// Split an image into tiles and write each as a PNG.
    Tile(TileArgs),
    /// Import a label file onto an image and write a flattened preview PNG.
    Preview(PreviewArgs),
    /// Import a label file onto an image and write it back out as a grey-level TIFF.
    ExportLabels(ExportArgs),
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input image (PNG, JPEG, TIFF, ...).
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct TileArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory for `tile_<n>.png` files.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Input image.
    #[arg(long)]
    image: PathBuf,

    /// Grey-level label file to import.
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Frame or tile to render.
    #[arg(long, default_value_t = 0)]
    tile: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input image.
    #[arg(long)]
    image: PathBuf,

    /// Grey-level label file to import.
    #[arg(long)]
    labels: PathBuf,

    /// Output TIFF path.
    #[arg(long)]
    out: PathBuf,

    /// Write raw class ids instead of spreading them over the grey range.
    #[arg(long)]
    no_rescale: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => segcanvas::EditorConfig::from_path(path)?,
        None => segcanvas::EditorConfig::default(),
    };
    if let Some(max_tile) = cli.max_tile {
        config.max_tile = max_tile;
    }
    config.validate()?;

    match cli.cmd {
        Command::Info(args) => cmd_info(args, &config),
        Command::Tile(args) => cmd_tile(args, &config),
        Command::Preview(args) => cmd_preview(args, config),
        Command::ExportLabels(args) => cmd_export(args, config),
    }
}

fn read_bytes(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("read '{}'", path.display()))
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn write_png(path: &Path, pixels: &segcanvas::RgbaBuffer) -> anyhow::Result<()> {
    ensure_parent(path)?;
    image::save_buffer_with_format(
        path,
        pixels.as_slice(),
        pixels.width(),
        pixels.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}

fn load_session(
    image: &Path,
    labels: Option<&Path>,
    config: segcanvas::EditorConfig,
) -> anyhow::Result<segcanvas::EditingSession> {
    let mut session = segcanvas::EditingSession::new(config)?;
    session.load_bytes(&read_bytes(image)?)?;
    if let Some(labels) = labels {
        session.import_labels(&read_bytes(labels)?)?;
    }
    Ok(session)
}

fn cmd_info(args: InfoArgs, config: &segcanvas::EditorConfig) -> anyhow::Result<()> {
    let frames = segcanvas::decode_frames(&read_bytes(&args.in_path)?)?;
    let kind = segcanvas::classify_frames(&frames, config.max_tile)?;
    let grid = match (kind, frames.first()) {
        (segcanvas::SourceKind::Large, Some(f)) => {
            Some(segcanvas::compute_grid(f.width(), f.height(), config.max_tile)?)
        }
        _ => None,
    };
    let sizes: Vec<segcanvas::ImageSize> = frames.iter().map(|f| f.size()).collect();
    let report = serde_json::json!({
        "kind": kind,
        "frames": sizes,
        "grid": grid,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_tile(args: TileArgs, config: &segcanvas::EditorConfig) -> anyhow::Result<()> {
    let frames = segcanvas::decode_frames(&read_bytes(&args.in_path)?)?;
    let image = match frames.as_slice() {
        [one] => one,
        _ => anyhow::bail!("tiling needs a single-frame image, got {} frames", frames.len()),
    };
    let grid = segcanvas::compute_grid(image.width(), image.height(), config.max_tile)?;
    let tiles = segcanvas::split_image(image, &grid)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    for (i, tile) in tiles.iter().enumerate() {
        let path = args.out_dir.join(format!("tile_{i}.png"));
        write_png(&path, tile.pixels())?;
    }
    eprintln!(
        "wrote {} tile(s) ({}x{} grid) to {}",
        tiles.len(),
        grid.columns(),
        grid.rows(),
        args.out_dir.display()
    );
    Ok(())
}

fn cmd_preview(args: PreviewArgs, config: segcanvas::EditorConfig) -> anyhow::Result<()> {
    let mut session = load_session(&args.image, args.labels.as_deref(), config)?;
    session.switch_tile(args.tile)?;
    let frame = session.render_active()?;
    write_png(&args.out, &frame)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(args: ExportArgs, mut config: segcanvas::EditorConfig) -> anyhow::Result<()> {
    if args.no_rescale {
        config.rescale = false;
    }
    let session = load_session(&args.image, Some(&args.labels), config)?;
    let bytes = session.export_labels()?;
    ensure_parent(&args.out)?;
    std::fs::write(&args.out, bytes)
        .with_context(|| format!("write tiff '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
