use clap::{Parser, Subcommand};
use std::path::PathBuf;

use fingerprint_access::decode;
use fingerprint_access::{
    AccessDirection, BiometricFile, ClientConfig, RecognitionClient, RecognitionSession,
    SubmitError,
};

#[derive(Parser)]
#[command(name = "fingerprint-access")]
#[command(about = "Submit fingerprint images for access recognition")]
struct Cli {
    /// Base URL of the access-control API
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode an image and report what the preview would show
    Preview {
        /// Path to the fingerprint image
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        /// Write the preview image to this file
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// List areas and models offered by the server
    Catalog,

    /// Submit a fingerprint for recognition
    Recognize {
        /// Path to the fingerprint image
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        /// Area id
        #[arg(long)]
        area: String,

        /// Segmentation model id (defaults to the first one listed)
        #[arg(long)]
        segmentation_model: Option<String>,

        /// Recognition model id (defaults to the first one listed)
        #[arg(long)]
        recognition_model: Option<String>,

        /// ENTRY or EXIT
        #[arg(long, default_value = "ENTRY")]
        direction: AccessDirection,
    },

    /// Open the desktop recognition screen
    #[cfg(feature = "gui")]
    Gui,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    fingerprint_access::logging::init(args.verbose);

    let config = ClientConfig::load(args.base_url.as_deref())?;

    match args.command {
        Command::Preview { image_path, out } => preview(image_path, out).await,
        Command::Catalog => catalog(config).await,
        Command::Recognize {
            image_path,
            area,
            segmentation_model,
            recognition_model,
            direction,
        } => {
            let client = RecognitionClient::new(config);
            let mut session = RecognitionSession::new();
            session.load_catalogs(&client).await?;

            session.select_area(&area);
            if let Some(id) = segmentation_model {
                session.select_segmentation_model(&id);
            }
            if let Some(id) = recognition_model {
                session.select_recognition_model(&id);
            }
            session.set_direction(direction);

            let file = BiometricFile::read(&image_path).await?;
            if let Some(job) = session.select_file(Some(file)) {
                session.complete_decode(job.run().await);
            }
            if let Some(e) = session.preview_error() {
                eprintln!("Preview unavailable: {}", e);
            }

            match session.submit(&client).await {
                Ok(report) => {
                    println!("{}", report);
                    Ok(())
                }
                Err(SubmitError::Transport(e)) => Err(anyhow::anyhow!(
                    "{}: {}",
                    fingerprint_access::pipeline::RECOGNITION_FAILED,
                    e
                )),
                Err(e) => Err(e.into()),
            }
        }
        #[cfg(feature = "gui")]
        Command::Gui => fingerprint_access::gui::run(config),
    }
}

async fn preview(image_path: PathBuf, out: Option<PathBuf>) -> anyhow::Result<()> {
    let file = BiometricFile::read(&image_path).await?;
    let decoded = decode::decode(&file.name, &file.bytes)?;

    match decoded.dimensions() {
        Some((w, h)) => println!("Decoded page 0: {}x{}", w, h),
        None => println!("Shown as-is ({})", decoded.preview.mime),
    }
    println!("Preview: {} bytes", decoded.preview.bytes.len());

    if let Some(out) = out {
        tokio::fs::write(&out, &decoded.preview.bytes).await?;
        println!("Preview written to {}", out.display());
    }
    Ok(())
}

async fn catalog(config: ClientConfig) -> anyhow::Result<()> {
    let client = RecognitionClient::new(config);
    let catalogs = fingerprint_access::Catalogs::load(&client).await?;

    println!("=== Areas ===");
    for area in &catalogs.areas {
        println!("  {}  {} (security level {})", area.id, area.name, area.security_level);
    }
    println!("\n=== Segmentation models ===");
    for model in &catalogs.segmentation_models {
        println!("  {}  {}", model.id, model.label());
    }
    println!("\n=== Recognition models ===");
    for model in &catalogs.recognition_models {
        println!("  {}  {}", model.id, model.label());
    }
    Ok(())
}
