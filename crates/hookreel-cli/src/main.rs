mod ai;
mod production;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hookreel_core::{FontCandidates, HookreelConfig, HookreelError};
use hookreel_encode::{FfmpegEncoder, VideoArtifact};
use hookreel_render::{FontResolver, FrameComposer};

use crate::ai::{GeminiClient, VideoContent};
use crate::production::Production;

const DEFAULT_WATERMARK: &str = "Krishnaa Words";
const DEFAULT_OUTPUT: &str = "generated_short.mp4";

#[derive(Parser)]
#[command(
    name = "hookreel",
    version,
    about = "Hookreel: topic in, viral short out",
    long_about = "Generate a hook, image prompt, description, tags and a pinned-comment story \
                  for a topic, then turn a background image into a captioned, watermarked short."
)]
struct Cli {
    /// Config file (default: ./hookreel.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate on-screen text, image prompt, description and tags
    Ideas {
        /// What the short is about
        #[arg()]
        topic: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the pinned comment that reveals the full story
    Story {
        #[arg()]
        topic: String,

        /// The on-screen hook the story pays off
        #[arg(long)]
        caption: String,
    },

    /// Draw caption and watermark over a background and save a PNG
    Compose {
        /// Background image (JPEG or PNG)
        #[arg(long)]
        image: PathBuf,

        #[arg(long)]
        caption: String,

        #[arg(long, default_value = DEFAULT_WATERMARK)]
        watermark: String,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Compose a frame and encode it as a still video
    Video {
        #[arg(long)]
        image: PathBuf,

        #[arg(long)]
        caption: String,

        #[arg(long, default_value = DEFAULT_WATERMARK)]
        watermark: String,

        /// Video length in seconds (5-30)
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(5..=30))]
        duration: u32,

        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
    },

    /// Ideas, story and video for a topic in one go
    Run {
        #[arg()]
        topic: String,

        #[arg(long)]
        image: PathBuf,

        /// Use this caption instead of the generated hook
        #[arg(long)]
        caption: Option<String>,

        #[arg(long, default_value = DEFAULT_WATERMARK)]
        watermark: String,

        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(5..=30))]
        duration: u32,

        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
    },

    /// Display version, config and tool availability
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout is reserved for command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = run(cli);
    if let Err(err) = &result {
        let raw = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<HookreelError>())
            .and_then(HookreelError::raw_response);
        if let Some(raw) = raw {
            eprintln!("Raw model response:\n{}", raw);
        }
    }
    result
}

fn run(cli: Cli) -> Result<()> {
    let (config, config_path) = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Ideas { topic, json } => cmd_ideas(&config, &topic, json),
        Commands::Story { topic, caption } => cmd_story(&config, &topic, &caption),
        Commands::Compose {
            image,
            caption,
            watermark,
            output,
        } => cmd_compose(&config, &image, &caption, &watermark, &output),
        Commands::Video {
            image,
            caption,
            watermark,
            duration,
            output,
        } => cmd_video(&config, &image, &caption, &watermark, duration, &output),
        Commands::Run {
            topic,
            image,
            caption,
            watermark,
            duration,
            output,
        } => cmd_run(
            &config,
            &topic,
            &image,
            caption,
            &watermark,
            duration,
            &output,
        ),
        Commands::Info => cmd_info(&config, config_path.as_deref()),
    }
}

/// An explicit `--config` must exist; the default file is optional.
fn load_config(explicit: Option<&Path>) -> Result<(HookreelConfig, Option<PathBuf>)> {
    if let Some(path) = explicit {
        let config = HookreelConfig::load_from_file(path)
            .with_context(|| format!("failed to load config: {}", path.display()))?;
        return Ok((config, Some(path.to_path_buf())));
    }

    let default_path = PathBuf::from(HookreelConfig::DEFAULT_FILE);
    if default_path.is_file() {
        let config = HookreelConfig::load_from_file(&default_path)
            .with_context(|| format!("failed to load config: {}", default_path.display()))?;
        Ok((config, Some(default_path)))
    } else {
        Ok((HookreelConfig::default(), None))
    }
}

fn model_client(config: &HookreelConfig) -> Result<GeminiClient> {
    GeminiClient::from_config(&config.model).context("cannot reach the language model")
}

fn print_content(content: &VideoContent) {
    println!("On-screen text:\n{}\n", content.on_screen_text);
    println!("Image prompt:\n{}\n", content.image_prompt);
    println!("Description:\n{}\n", content.description);
    println!("Tags:\n{}", content.tags);
}

fn cmd_ideas(config: &HookreelConfig, topic: &str, json: bool) -> Result<()> {
    let client = model_client(config)?;
    let mut production = Production::new(topic);
    let content = production
        .generate_ideas(&client)
        .with_context(|| format!("failed to generate ideas for '{}'", topic))?;

    if json {
        println!("{}", serde_json::to_string_pretty(content)?);
    } else {
        print_content(content);
    }
    Ok(())
}

fn cmd_story(config: &HookreelConfig, topic: &str, caption: &str) -> Result<()> {
    let client = model_client(config)?;
    let mut production = Production::new(topic);
    production.set_caption(caption);
    let story = production
        .generate_story(&client)
        .with_context(|| format!("failed to generate the comment story for '{}'", topic))?;
    println!("{}", story);
    Ok(())
}

fn cmd_compose(
    config: &HookreelConfig,
    image: &Path,
    caption: &str,
    watermark: &str,
    output: &Path,
) -> Result<()> {
    let composer = FrameComposer::from_config(config)?;
    let composed = composer
        .compose_file(image, caption, watermark)
        .with_context(|| format!("failed to compose frame from {}", image.display()))?;
    composed
        .save_png(output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    let (w, h) = composed.dimensions();
    println!("Frame written: {} ({}x{})", output.display(), w, h);
    Ok(())
}

fn cmd_video(
    config: &HookreelConfig,
    image: &Path,
    caption: &str,
    watermark: &str,
    duration: u32,
    output: &Path,
) -> Result<()> {
    let start = Instant::now();
    let composer = FrameComposer::from_config(config)?;
    let encoder = FfmpegEncoder::new(config.encode.clone());

    // No topic needed: the caption is supplied directly.
    let mut production = Production::new(String::new());
    production.set_caption(caption);
    let artifact = production
        .create_video(
            &composer,
            &encoder,
            image,
            watermark,
            f64::from(duration),
            output,
        )
        .context("failed to create video")?;

    print_video(artifact, start);
    Ok(())
}

fn cmd_run(
    config: &HookreelConfig,
    topic: &str,
    image: &Path,
    caption: Option<String>,
    watermark: &str,
    duration: u32,
    output: &Path,
) -> Result<()> {
    let start = Instant::now();
    let client = model_client(config)?;
    let composer = FrameComposer::from_config(config)?;
    let encoder = FfmpegEncoder::new(config.encode.clone());

    let mut production = Production::new(topic);
    production
        .generate_ideas(&client)
        .with_context(|| format!("failed to generate ideas for '{}'", topic))?;
    if let Some(caption) = caption {
        production.set_caption(caption);
    }
    production
        .generate_story(&client)
        .context("failed to generate the comment story")?;
    production
        .create_video(
            &composer,
            &encoder,
            image,
            watermark,
            f64::from(duration),
            output,
        )
        .context("failed to create video")?;

    print_production(&production);
    if let Some(artifact) = production.video() {
        print_video(artifact, start);
    }
    Ok(())
}

fn print_production(production: &Production) {
    println!("Topic: {}\n", production.topic());
    if let Some(content) = production.content() {
        print_content(content);
    }
    if let Some(caption) = production.caption() {
        println!("\nCaption used:\n{}", caption);
    }
    if let Some(story) = production.story() {
        println!("\nPinned comment:\n{}\n", story);
    }
}

fn print_video(artifact: &VideoArtifact, start: Instant) {
    println!(
        "Video ready: {} ({}x{}, {}s) in {:.1}s",
        artifact.path.display(),
        artifact.width,
        artifact.height,
        artifact.duration_secs,
        start.elapsed().as_secs_f64()
    );
}

fn cmd_info(config: &HookreelConfig, config_path: Option<&Path>) -> Result<()> {
    let encoder = FfmpegEncoder::new(config.encode.clone());
    let resolver = FontResolver::new(config.fonts.search_dirs.clone());
    let describe_font = |candidates: &FontCandidates| {
        [&candidates.preferred, &candidates.fallback]
            .into_iter()
            .find_map(|path| resolver.locate(path))
            .map(|found| found.display().to_string())
            .unwrap_or_else(|| "NOT FOUND".to_string())
    };

    println!("hookreel {}", env!("CARGO_PKG_VERSION"));
    println!(
        "   Config:    {}",
        config_path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in defaults".to_string())
    );
    println!(
        "   Model:     {} ({})",
        config.model.model, config.model.base_url
    );
    println!(
        "   API key:   ${} {}",
        config.model.api_key_env,
        if std::env::var_os(&config.model.api_key_env).is_some() {
            "set"
        } else {
            "NOT SET"
        }
    );
    println!(
        "   FFmpeg:    {}",
        if encoder.is_available() {
            "available"
        } else {
            "NOT FOUND"
        }
    );
    println!("   Caption:   {}", describe_font(&config.fonts.caption));
    println!("   Watermark: {}", describe_font(&config.fonts.watermark));
    Ok(())
}
