use std::{
    fs::File,
    io::{BufWriter, Read as _},
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "flowreel", version, about)]
struct Cli {
    /// Log at debug level (otherwise `RUST_LOG`, default warn).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline for one article and print the result as JSON.
    Generate(GenerateArgs),
    /// Render a saved diagram spec into a looping GIF.
    Render(RenderArgs),
    /// Render a single frame of a saved spec as a PNG.
    Frame(FrameArgs),
}

#[derive(Args, Debug)]
struct CanvasArgs {
    /// Canvas width in pixels.
    #[arg(long, default_value_t = 960)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 540)]
    height: u32,

    /// Font file for labels and captions (defaults to a system sans-serif face).
    #[arg(long)]
    font: Option<PathBuf>,

    /// Skip the system font lookup; without `--font` no text is drawn.
    #[arg(long)]
    no_system_fonts: bool,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Article text file (`-` reads stdin).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output namespace under every destination root.
    #[arg(long)]
    slug: String,

    /// Fallback title reported when generation fails.
    #[arg(long)]
    title: Option<String>,

    /// Destination root (repeatable). Defaults to `assets/images` and `public/assets/images`.
    #[arg(long = "dest")]
    destinations: Vec<PathBuf>,

    /// Directory for private staging files.
    #[arg(long)]
    staging: Option<PathBuf>,

    /// Playback rate.
    #[arg(long, default_value_t = 6)]
    fps: u32,

    #[command(flatten)]
    canvas: CanvasArgs,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Diagram spec JSON.
    #[arg(long)]
    spec: PathBuf,

    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,

    /// Playback rate.
    #[arg(long, default_value_t = 6)]
    fps: u32,

    /// Loop count; 0 loops forever.
    #[arg(long, default_value_t = 0)]
    loop_count: u16,

    #[command(flatten)]
    canvas: CanvasArgs,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Diagram spec JSON.
    #[arg(long)]
    spec: PathBuf,

    /// Frame `index` value to render.
    #[arg(long)]
    index: i64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    canvas: CanvasArgs,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Render(args) => cmd_render(args).map(|()| ExitCode::SUCCESS),
        Command::Frame(args) => cmd_frame(args).map(|()| ExitCode::SUCCESS),
    }
}

fn render_opts(args: &CanvasArgs) -> anyhow::Result<flowreel::RenderOpts> {
    Ok(flowreel::RenderOpts {
        canvas: flowreel::Canvas::new(args.width, args.height)?,
        font_path: args.font.clone(),
        system_fonts: !args.no_system_fonts,
        ..flowreel::RenderOpts::default()
    })
}

fn read_article(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("read article from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("read article '{}'", path.display()))
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<ExitCode> {
    let request = flowreel::ArticleRequest {
        text: read_article(&args.in_path)?,
        slug: args.slug,
        title: args.title,
    };

    let mut config = flowreel::PipelineConfig {
        fps: flowreel::Fps::new(args.fps)?,
        render: render_opts(&args.canvas)?,
        ..flowreel::PipelineConfig::default()
    };
    if !args.destinations.is_empty() {
        config.destinations = args.destinations;
    }
    if let Some(staging) = args.staging {
        config.staging_dir = staging;
    }

    // Request and credential problems are reported as results like any later failure.
    let service = match request
        .validate()
        .and_then(|_| flowreel::ServiceConfig::from_env())
    {
        Ok(service) => service,
        Err(e) => {
            tracing::warn!(error = %e, "pipeline failed");
            let result = flowreel::PipelineResult::failed(request.title.as_deref(), &e);
            return print_result(&result);
        }
    };
    let generator = flowreel::SpecGenerator::new(Arc::new(flowreel::OpenAiClient::new(&service)))
        .with_retry(service.retry);

    let orchestrator =
        flowreel::PipelineOrchestrator::new(generator, Arc::new(flowreel::LocalStore), config)?;
    print_result(&orchestrator.generate(&request))
}

fn print_result(result: &flowreel::PipelineResult) -> anyhow::Result<ExitCode> {
    println!(
        "{}",
        serde_json::to_string_pretty(result).context("serialize pipeline result")?
    );
    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let spec = flowreel::DiagramSpec::from_path(&args.spec)?;
    let opts = render_opts(&args.canvas)?;
    let sink_cfg = flowreel::SinkConfig {
        width: opts.canvas.width,
        height: opts.canvas.height,
        loop_count: args.loop_count,
        frame_delay_ms: flowreel::Fps::new(args.fps)?.frame_delay_ms(),
    };
    let matte = opts.palette.background.to_array();
    let mut renderer = flowreel::FrameRenderer::new(opts)?;

    ensure_parent_dir(&args.out)?;
    let file =
        File::create(&args.out).with_context(|| format!("create '{}'", args.out.display()))?;
    let mut encoder = flowreel::AnimationEncoder::new(BufWriter::new(file)).with_matte(matte);
    let frames = flowreel::render_sequence(&mut renderer, &spec, &mut encoder, sink_cfg)?;
    encoder.into_inner()?;

    eprintln!("wrote {} ({frames} frames)", args.out.display());
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let spec = flowreel::DiagramSpec::from_path(&args.spec)?;
    let frame = spec
        .playback_frames()
        .into_iter()
        .find(|f| f.index == args.index)
        .with_context(|| format!("spec has no frame with index {}", args.index))?;

    let mut renderer = flowreel::FrameRenderer::new(render_opts(&args.canvas)?)?;
    let raster = renderer.render_frame(&spec, &frame)?;

    ensure_parent_dir(&args.out)?;
    raster
        .to_rgba_image()?
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
