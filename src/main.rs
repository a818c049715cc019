//! # Adhyatmik CLI
//!
//! Command-line interface for generating captioned images.
//!
//! ## Usage
//!
//! ```bash
//! # Full pipeline (needs GEMINI_API_KEY)
//! adhyatmik generate --caption "कर्म करो, फल की चिंता मत करो।" --aspect-ratio 3:4
//!
//! # Composite a caption onto an existing background, no network
//! adhyatmik compose --background bg.jpg --directive directive.json --out out.jpg
//!
//! # Start the HTTP server
//! adhyatmik serve --listen 0.0.0.0:8080
//!
//! # Show which font faces each style resolves to
//! adhyatmik fonts
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use adhyatmik::{
    AdhyatmikError, Compositor, Config, Generator, StatusBoard, Studio,
    model::{AspectRatio, CaptionRequest, CompositionResult, FontStyle, PlacementDirective},
    pipeline::decode_background,
    server::{self, AppState},
    services::GeminiBackend,
};

/// Adhyatmik - caption image generator
#[derive(Parser, Debug)]
#[command(name = "adhyatmik")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Gemini API key (overrides GEMINI_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Extra directory of font files
    #[arg(long, global = true, value_name = "DIR")]
    font_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a captioned image with the AI pipeline
    Generate {
        /// Caption text
        #[arg(long)]
        caption: String,

        /// Aspect ratio hint: 1:1, 9:16, 16:9 or 3:4
        #[arg(long, default_value = "3:4")]
        aspect_ratio: String,

        /// Output JPEG path
        #[arg(long, value_name = "FILE", default_value = CompositionResult::DOWNLOAD_NAME)]
        out: PathBuf,
    },

    /// Composite a caption onto a local background (no network)
    Compose {
        /// Background image file
        #[arg(long, value_name = "FILE")]
        background: PathBuf,

        /// Placement directive JSON file
        #[arg(long, value_name = "FILE")]
        directive: PathBuf,

        /// Replace the directive's text
        #[arg(long)]
        caption: Option<String>,

        /// Output JPEG path
        #[arg(long, value_name = "FILE", default_value = CompositionResult::DOWNLOAD_NAME)]
        out: PathBuf,
    },

    /// Run the HTTP server
    Serve {
        /// Address to listen on
        #[arg(long)]
        listen: Option<String>,
    },

    /// Print the font face resolved for each style
    Fonts,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AdhyatmikError> {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(key) = cli.api_key {
        config.backend.api_key = Some(key);
    }
    if let Some(dir) = cli.font_dir {
        config.engine.font_dir = Some(dir);
    }

    match cli.command {
        Commands::Generate {
            caption,
            aspect_ratio,
            out,
        } => {
            let request = CaptionRequest::new(caption, aspect_ratio.parse::<AspectRatio>()?);
            let generator = build_generator(&config)?;

            let board = StatusBoard::new();
            let mut updates = board.subscribe();
            let printer = tokio::spawn(async move {
                while updates.changed().await.is_ok() {
                    let status = updates.borrow_and_update().clone();
                    if status.busy {
                        println!("{}", status.message);
                    }
                }
            });

            let result = generator.generate(&request, &board).await;
            printer.abort();

            let image = result.map_err(|e| {
                eprintln!("{}", e.user_message());
                e
            })?;
            std::fs::write(&out, &image.bytes)?;
            println!(
                "Saved {}x{} image to {}",
                image.width,
                image.height,
                out.display()
            );
        }

        Commands::Compose {
            background,
            directive,
            caption,
            out,
        } => {
            let bytes = std::fs::read(&background)?;
            let json = std::fs::read_to_string(&directive)?;
            let mut directive: PlacementDirective = serde_json::from_str(&json).map_err(|e| {
                AdhyatmikError::Validation(format!("invalid directive {}: {}", directive.display(), e))
            })?;
            if let Some(text) = caption {
                directive.hindi_text = text;
            }

            let background = decode_background(bytes).await?;
            let compositor = Compositor::new(config.engine.clone());
            let image = compositor.compose(&background, &directive)?;
            std::fs::write(&out, &image.bytes)?;
            println!(
                "Saved {}x{} image to {}",
                image.width,
                image.height,
                out.display()
            );
        }

        Commands::Serve { listen } => {
            if let Some(addr) = listen {
                config.server.listen_addr = addr;
            }
            let studio = Arc::new(Studio::new(build_generator(&config)?));
            let state = Arc::new(AppState::new(config.server.clone(), studio));
            server::serve(state).await?;
        }

        Commands::Fonts => {
            let compositor = Compositor::new(config.engine.clone());
            println!("{} font faces loaded", compositor.fonts().face_count());
            for style in FontStyle::ALL {
                match compositor.fonts().describe(style) {
                    Some(face) => println!("  {:<16} {}", style.as_str(), face),
                    None => println!("  {:<16} (no face found)", style.as_str()),
                }
            }
        }
    }

    Ok(())
}

fn build_generator(config: &Config) -> Result<Generator, AdhyatmikError> {
    let backend = Arc::new(GeminiBackend::new(config.backend.clone())?);
    let compositor = Arc::new(Compositor::new(config.engine.clone()));
    Ok(Generator::new(backend, compositor).with_status_period(config.status_period))
}
