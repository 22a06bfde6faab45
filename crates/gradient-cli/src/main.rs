use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use gradient_core::animation::{parse_easing, EasingType};
use gradient_core::export::code::{generate, CodeFormat};
use gradient_core::export::image::{render_image, ImageFormat};
use gradient_core::export::video::{VideoQuality, VideoSettings};
use gradient_core::harmony::{self, HarmonyScheme};
use gradient_core::palette::{extract_palette, load_image};
use gradient_core::share::{parse_share_url, share_url};
use gradient_core::systems::effects::NoiseQuality;
use gradient_core::systems::renderer::{RenderInputs, RendererConfig};
use gradient_core::systems::scheduler::TickScheduler;
use gradient_core::systems::view::CanvasView;
use gradient_core::{
    AnimationKind, AnimationSpec, CanvasSize, Color, ColorStops, Direction, DirectoryStore,
    Effects, GradientDescriptor, GradientKind, Studio,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one frame to a PNG or JPEG file
    Render {
        #[command(flatten)]
        gradient: GradientArgs,
        #[command(flatten)]
        output: OutputArgs,
        /// Seconds into the animation
        #[arg(long, default_value_t = 0.0)]
        time: f64,
        #[arg(value_name = "OUTPUT")]
        path: PathBuf,
    },
    /// Render the animation frame by frame
    Video {
        #[command(flatten)]
        gradient: GradientArgs,
        #[command(flatten)]
        output: OutputArgs,
        #[arg(long, default_value = "1080p", value_parser = parse_quality)]
        quality: VideoQuality,
        #[arg(long, default_value_t = 30)]
        fps: u32,
        /// Duration in seconds
        #[arg(long, default_value_t = 5.0)]
        duration: f64,
        /// Output MP4 path. Without the `video` feature frames are rendered and counted only.
        #[arg(value_name = "OUTPUT")]
        path: PathBuf,
    },
    /// Print a code snippet for the gradient
    Code {
        #[command(flatten)]
        gradient: GradientArgs,
        #[arg(long, default_value = "css", value_parser = parse_code_format)]
        format: CodeFormat,
    },
    /// Print a share link, or decode one with --decode
    Share {
        #[command(flatten)]
        gradient: GradientArgs,
        #[arg(long, default_value = "https://gradient.studio/")]
        base: String,
        /// Print the gradient encoded in this link as JSON
        #[arg(long)]
        decode: Option<String>,
    },
    /// Run the live animation loop for a while and report frame timings
    Play {
        #[command(flatten)]
        gradient: GradientArgs,
        #[command(flatten)]
        output: OutputArgs,
        #[arg(long, default_value_t = 60)]
        hz: u32,
        #[arg(long, default_value_t = 2.0)]
        seconds: f64,
    },
    /// Extract dominant colors from an image
    Palette {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
        #[arg(short, default_value_t = 5)]
        k: usize,
    },
    /// Derive a color scheme, or a random one with --random
    Harmony {
        /// Base color for the scheme
        #[arg(long, default_value = "#8b5cf6")]
        base: String,
        #[arg(long, default_value = "complementary", value_parser = parse_scheme)]
        scheme: HarmonyScheme,
        #[arg(long)]
        random: bool,
        /// Seed for --random
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Manage the saved gradient library
    Library {
        /// Directory holding persisted studio state
        #[arg(long, default_value = ".gradient-studio")]
        state_dir: PathBuf,
        #[command(subcommand)]
        action: LibraryAction,
    },
}

#[derive(Subcommand, Debug)]
enum LibraryAction {
    List,
    /// Save a gradient under a name
    Save {
        name: String,
        #[command(flatten)]
        gradient: GradientArgs,
    },
    Delete {
        id: String,
    },
    /// Write the library as JSON to stdout
    Export,
    /// Replace the library with a JSON file
    Import {
        path: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
struct GradientArgs {
    /// Comma separated hex colors
    #[arg(long, default_value = "#ec4899,#8b5cf6,#3b82f6")]
    colors: String,
    #[arg(long = "type", default_value = "linear")]
    kind: String,
    #[arg(long, default_value_t = 45.0)]
    angle: f32,
    #[arg(long, default_value = "rotate", value_parser = parse_animation)]
    animation: AnimationKind,
    #[arg(long, default_value_t = 1.0)]
    speed: f32,
    #[arg(long, default_value = "forward", value_parser = parse_direction)]
    direction: Direction,
    #[arg(long, default_value = "linear", value_parser = parse_easing_arg)]
    easing: EasingType,
    /// Take the gradient from a share link instead
    #[arg(long, conflicts_with = "descriptor")]
    link: Option<String>,
    /// Take the gradient from a JSON descriptor file instead
    #[arg(long)]
    descriptor: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct OutputArgs {
    /// Size preset (720p, 1080p, 1440p, 4k, square, story) or WIDTHxHEIGHT
    #[arg(long, default_value = "1080p", value_parser = parse_size)]
    size: CanvasSize,
    #[arg(long, default_value_t = 0.0)]
    blur: f32,
    #[arg(long, default_value_t = 0.0)]
    noise: f32,
    /// Share one noise sample across NxN pixel blocks
    #[arg(long, default_value_t = 1)]
    noise_stride: u32,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    reduced_motion: bool,
}

impl GradientArgs {
    fn descriptor(&self) -> Result<GradientDescriptor> {
        if let Some(link) = &self.link {
            return parse_share_url(link).ok_or_else(|| anyhow!("share link carries no gradient"));
        }
        if let Some(path) = &self.descriptor {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            return serde_json::from_str(&json)
                .with_context(|| format!("Invalid gradient descriptor in {}", path.display()));
        }
        let colors = self
            .colors
            .split(',')
            .map(|c| {
                Color::try_parse(c.trim()).ok_or_else(|| anyhow!("invalid color {c:?}"))
            })
            .collect::<Result<Vec<_>>>()?;
        let stops = ColorStops::new(colors)?;
        let kind = GradientKind::from_name(&self.kind, self.angle)
            .ok_or_else(|| anyhow!("unknown gradient type {:?}", self.kind))?;
        let animation = AnimationSpec::new(self.animation, self.speed, self.direction, self.easing);
        Ok(GradientDescriptor::new(kind, stops, animation))
    }
}

impl OutputArgs {
    fn inputs(&self, gradient: GradientDescriptor) -> RenderInputs {
        RenderInputs {
            gradient,
            effects: Effects::new(self.blur, self.noise),
            canvas_size: self.size,
            reduced_motion: self.reduced_motion,
        }
    }

    fn config(&self) -> RendererConfig {
        let noise_quality = match self.noise_stride {
            0 | 1 => NoiseQuality::Full,
            stride => NoiseQuality::Strided { stride },
        };
        RendererConfig {
            noise_quality,
            seed: self.seed,
            ..RendererConfig::default()
        }
    }
}

fn parse_animation(s: &str) -> Result<AnimationKind, String> {
    AnimationKind::parse(s).ok_or_else(|| format!("unknown animation {s:?}"))
}

fn parse_direction(s: &str) -> Result<Direction, String> {
    Direction::parse(s).ok_or_else(|| format!("unknown direction {s:?}"))
}

fn parse_easing_arg(s: &str) -> Result<EasingType, String> {
    Ok(parse_easing(s))
}

fn parse_scheme(s: &str) -> Result<HarmonyScheme, String> {
    HarmonyScheme::parse(s).ok_or_else(|| format!("unknown scheme {s:?}"))
}

fn parse_quality(s: &str) -> Result<VideoQuality, String> {
    VideoQuality::parse(s).ok_or_else(|| format!("unknown quality {s:?}"))
}

fn parse_code_format(s: &str) -> Result<CodeFormat, String> {
    CodeFormat::parse(s).ok_or_else(|| format!("unknown code format {s:?}"))
}

fn parse_size(s: &str) -> Result<CanvasSize, String> {
    if let Some(preset) = CanvasSize::preset(s) {
        return Ok(preset);
    }
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("expected a preset or WIDTHxHEIGHT, got {s:?}"))?;
    let width = w.parse::<u32>().map_err(|e| e.to_string())?;
    let height = h.parse::<u32>().map_err(|e| e.to_string())?;
    let size = CanvasSize::new(width, height);
    if size.is_empty() {
        return Err("canvas size must be non-zero".to_string());
    }
    Ok(size)
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogFormat {
    Pretty,
    Json,
}

fn init_logging(level: LogLevel, format: LogFormat) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.as_filter().into())
        .from_env_lossy();

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level, cli.log_format);

    if let Err(e) = run(cli.command) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Render {
            gradient,
            output,
            time,
            path,
        } => {
            let format = image_format_for(&path)?;
            let inputs = output.inputs(gradient.descriptor()?);
            let bytes = render_image(&inputs, time, output.config(), format)?;
            std::fs::write(&path, bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "image written");
        }
        Command::Video {
            gradient,
            mut output,
            quality,
            fps,
            duration,
            path,
        } => {
            output.size = quality.canvas_size();
            let inputs = output.inputs(gradient.descriptor()?);
            let settings = VideoSettings {
                fps,
                duration_secs: duration,
                quality,
            };
            export_video(&inputs, &settings, output.config(), &path)?;
        }
        Command::Code { gradient, format } => {
            println!("{}", generate(format, &gradient.descriptor()?));
        }
        Command::Share {
            gradient,
            base,
            decode,
        } => match decode {
            Some(link) => {
                let g = parse_share_url(&link)
                    .ok_or_else(|| anyhow!("share link carries no gradient"))?;
                println!("{}", serde_json::to_string_pretty(&g)?);
            }
            None => println!("{}", share_url(&base, &gradient.descriptor()?)?),
        },
        Command::Play {
            gradient,
            output,
            hz,
            seconds,
        } => play(output.inputs(gradient.descriptor()?), output.config(), hz, seconds)?,
        Command::Palette { image, k } => {
            let bytes = std::fs::read(&image)
                .with_context(|| format!("Failed to read {}", image.display()))?;
            let rgba = load_image(&bytes)?;
            let colors = extract_palette(rgba.as_raw(), k, &mut rand::thread_rng());
            for color in colors {
                println!("{color}");
            }
        }
        Command::Harmony {
            base,
            scheme,
            random,
            seed,
        } => {
            let colors = if random {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                let result = harmony::randomize(&[], &Default::default(), &mut rng);
                info!(scheme = %result.scheme, hue = result.hue, "random scheme");
                result.colors
            } else {
                let base = Color::try_parse(&base)
                    .ok_or_else(|| anyhow!("invalid base color {base:?}"))?;
                harmony::scheme_from_base(base, scheme)
            };
            for color in colors {
                println!("{color}");
            }
        }
        Command::Library { state_dir, action } => library(&state_dir, action)?,
    }
    Ok(())
}

fn image_format_for(path: &Path) -> Result<ImageFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    ImageFormat::from_extension(ext)
        .ok_or_else(|| anyhow!("unsupported image extension {ext:?} (use png, jpg or jpeg)"))
}

#[cfg(feature = "video")]
fn export_video(
    inputs: &RenderInputs,
    settings: &VideoSettings,
    config: RendererConfig,
    path: &Path,
) -> Result<()> {
    let frames = gradient_core::export::video::export_mp4(inputs, settings, config, path, |p| {
        tracing::debug!(progress = p, "exporting");
    })?;
    info!(frames, path = %path.display(), "video written");
    Ok(())
}

#[cfg(not(feature = "video"))]
fn export_video(
    inputs: &RenderInputs,
    settings: &VideoSettings,
    config: RendererConfig,
    path: &Path,
) -> Result<()> {
    warn!(path = %path.display(), "built without the `video` feature; rendering without encoding");
    let mut sink = gradient_core::video_wrapper::CountingEncoder::new();
    let frames = gradient_core::export::video::render_video(inputs, settings, config, &mut sink, |p| {
        tracing::debug!(progress = p, "rendering");
    })?;
    info!(frames, "frames rendered");
    Ok(())
}

fn play(inputs: RenderInputs, config: RendererConfig, hz: u32, seconds: f64) -> Result<()> {
    let mut scheduler = TickScheduler::new(hz);
    let mut view = CanvasView::new(inputs, config);
    view.mount(&mut scheduler);

    while let Some((due, now)) = scheduler.wait_for_frame() {
        if now >= seconds {
            view.unmount(&mut scheduler);
            break;
        }
        for request in due {
            if let Err(e) = view.on_frame(request, now, &mut scheduler) {
                warn!(error = %e, "frame failed");
            }
        }
    }

    let stats = view.renderer().stats();
    info!(
        frames = stats.frames,
        over_budget = stats.over_budget,
        average_ms = stats.average().as_secs_f64() * 1000.0,
        budget_ms = view.renderer().config().frame_budget.as_secs_f64() * 1000.0,
        "playback finished"
    );
    if stats.frames == 0 {
        bail!("no frames were drawn");
    }
    Ok(())
}

fn library(state_dir: &Path, action: LibraryAction) -> Result<()> {
    let store = DirectoryStore::new(state_dir)?;
    let mut studio = Studio::new(Arc::new(store));
    match action {
        LibraryAction::List => {
            for entry in studio.library() {
                println!(
                    "{}\t{}\t{}",
                    entry.id,
                    entry.name,
                    entry
                        .colors
                        .iter()
                        .map(Color::to_hex)
                        .collect::<Vec<_>>()
                        .join(",")
                );
            }
        }
        LibraryAction::Save { name, gradient } => {
            studio.set_gradient(gradient.descriptor()?);
            let entry = studio.save_to_library(&name)?;
            println!("{}", entry.id);
        }
        LibraryAction::Delete { id } => {
            studio.delete_from_library(&id)?;
        }
        LibraryAction::Export => println!("{}", studio.export_library()?),
        LibraryAction::Import { path } => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let count = studio.import_library(&json)?;
            info!(count, "library imported");
        }
    }
    Ok(())
}
