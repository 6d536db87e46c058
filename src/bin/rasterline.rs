use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "rasterline", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an image with the raster, dots or texture effect.
    Still(StillArgs),
    /// Build a scanimation raster and barrier grid from a video or a frame list.
    Motion(MotionArgs),
    /// Inspect or edit saved presets.
    Preset(PresetArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Raster,
    Dots,
    Texture,
    None,
}

impl From<ModeArg> for rasterline::EffectMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Raster => Self::Raster,
            ModeArg::Dots => Self::Dots,
            ModeArg::Texture => Self::Texture,
            ModeArg::None => Self::None,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Png,
    Svg,
}

#[derive(Parser, Debug)]
struct StillArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output path.
    #[arg(long)]
    out: PathBuf,

    /// Parameter JSON. Overrides `--mode` presets entirely.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Start from the preset of this mode.
    #[arg(long, value_enum, default_value_t = ModeArg::Raster)]
    mode: ModeArg,

    /// Saved presets JSON merged over the built-in ones.
    #[arg(long)]
    presets: Option<PathBuf>,

    /// Output encoding. Defaults to the output extension, then to the parameters.
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Canvas long side as a percentage of 600 px.
    #[arg(long)]
    percent: Option<u32>,

    /// Grain seed.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct MotionArgs {
    /// Input video (requires the `media-ffmpeg` feature and `ffmpeg`/`ffprobe` on PATH).
    #[arg(long = "in", conflicts_with = "frames")]
    in_path: Option<PathBuf>,

    /// Frame images, in order.
    #[arg(long = "frame", num_args = 1..)]
    frames: Vec<PathBuf>,

    /// Motion parameter JSON.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Output PNG of the inked raster.
    #[arg(long)]
    out: PathBuf,

    /// Output for the barrier grid (`.svg` writes vectors, anything else PNG).
    #[arg(long)]
    overlay_out: Option<PathBuf>,

    /// Export scale for print.
    #[arg(long, default_value_t = 1)]
    scale: u32,

    /// Seek timeout in milliseconds.
    #[arg(long, default_value_t = 2000)]
    seek_timeout_ms: u64,
}

#[derive(Parser, Debug)]
struct PresetArgs {
    #[command(subcommand)]
    cmd: PresetCommand,
}

#[derive(Subcommand, Debug)]
enum PresetCommand {
    /// Print the effective preset of a mode as JSON.
    Show {
        /// Preset store.
        #[arg(long)]
        store: PathBuf,
        /// Effect mode.
        #[arg(long, value_enum)]
        mode: ModeArg,
    },
    /// Save a parameter JSON as the preset of its mode.
    Save {
        /// Preset store.
        #[arg(long)]
        store: PathBuf,
        /// Parameter JSON.
        #[arg(long)]
        params: PathBuf,
    },
    /// Drop the saved preset of a mode.
    Remove {
        /// Preset store.
        #[arg(long)]
        store: PathBuf,
        /// Effect mode.
        #[arg(long, value_enum)]
        mode: ModeArg,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Still(args) => cmd_still(args),
        Command::Motion(args) => cmd_motion(args),
        Command::Preset(args) => cmd_preset(args),
    }
}

fn cmd_still(args: StillArgs) -> anyhow::Result<()> {
    let mut params = match &args.params {
        Some(p) => rasterline::StillParams::from_path(p)?,
        None => {
            let store = match &args.presets {
                Some(p) => rasterline::PresetStore::from_path(p)?,
                None => rasterline::PresetStore::new(),
            };
            store.resolve(args.mode.into())?
        }
    };
    if let Some(pct) = args.percent {
        params.canvas_percent = pct;
    }
    let format = match args.format {
        Some(FormatArg::Png) => rasterline::OutputFormat::Png,
        Some(FormatArg::Svg) => rasterline::OutputFormat::Svg,
        None if has_extension(&args.out, "svg") => rasterline::OutputFormat::Svg,
        None if has_extension(&args.out, "png") => rasterline::OutputFormat::Png,
        None => params.effect.output_format,
    };

    let rng = match args.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    let mut sess = rasterline::StillSession::with_rng(params, rng)?;
    sess.set_source(rasterline::load_image(&args.in_path)?)?;

    let export = sess
        .export(format)?
        .context("no output produced for the input image")?;
    ensure_parent(&args.out)?;
    let written = match export {
        rasterline::StillExport::Png(bytes) => std::fs::write(&args.out, bytes),
        rasterline::StillExport::Svg(text) => std::fs::write(&args.out, text),
    };
    written.with_context(|| format!("write '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_motion(args: MotionArgs) -> anyhow::Result<()> {
    let params = match &args.params {
        Some(p) => rasterline::MotionParameters::from_path(p)?,
        None => rasterline::MotionParameters::default(),
    };
    let mut sess = rasterline::MotionSession::new(params)?;

    if let Some(video) = &args.in_path {
        let mut source = rasterline::FfmpegVideoSource::open(video)?;
        let opts = rasterline::ExtractOpts {
            seek_timeout: std::time::Duration::from_millis(args.seek_timeout_ms),
        };
        sess.load_frames(&mut source, opts)?;
    } else {
        let frames = args
            .frames
            .iter()
            .map(rasterline::load_image)
            .collect::<Result<Vec<_>, _>>()?;
        sess.set_frames(frames)?;
    }
    if sess.frames().is_empty() {
        anyhow::bail!("no frames: pass --in <video> or at least one --frame <image>");
    }

    sess.render()?;
    let layers = sess
        .export_layers(args.scale)?
        .context("composite produced no raster")?;

    ensure_parent(&args.out)?;
    std::fs::write(&args.out, rasterline::encode_png(&layers.raster)?)
        .with_context(|| format!("write '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());

    if let Some(overlay_out) = &args.overlay_out {
        ensure_parent(overlay_out)?;
        let written = if has_extension(overlay_out, "svg") {
            std::fs::write(overlay_out, sess.overlay_vector().to_svg_string())
        } else {
            std::fs::write(overlay_out, rasterline::encode_png(&layers.overlay)?)
        };
        written.with_context(|| format!("write '{}'", overlay_out.display()))?;
        eprintln!("wrote {}", overlay_out.display());
    }
    Ok(())
}

fn cmd_preset(args: PresetArgs) -> anyhow::Result<()> {
    match args.cmd {
        PresetCommand::Show { store, mode } => {
            let params = rasterline::PresetStore::from_path(&store)?.resolve(mode.into())?;
            println!("{}", serde_json::to_string_pretty(&params)?);
        }
        PresetCommand::Save { store, params } => {
            let mut presets = rasterline::PresetStore::from_path(&store)?;
            let params = rasterline::StillParams::from_path(&params)?;
            presets.save(&params)?;
            ensure_parent(&store)?;
            presets.save_to_path(&store)?;
            eprintln!(
                "saved {} preset to {}",
                params.effect.mode.as_str(),
                store.display()
            );
        }
        PresetCommand::Remove { store, mode } => {
            let mut presets = rasterline::PresetStore::from_path(&store)?;
            let mode: rasterline::EffectMode = mode.into();
            if presets.remove(mode) {
                presets.save_to_path(&store)?;
                eprintln!("removed {} preset from {}", mode.as_str(), store.display());
            } else {
                eprintln!("no saved {} preset in {}", mode.as_str(), store.display());
            }
        }
    }
    Ok(())
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
