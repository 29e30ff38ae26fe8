//! CLI for aiphoto - Gemini image operations on Vertex AI.

use aiphoto::{
    dispatch, AspectRatio, GeminiClient, GeneratedImage, ImageClient, Operation, SourceImage,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aiphoto")]
#[command(about = "Generate, edit, and restore photos with the Gemini image API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// GCP project ID (implies Vertex AI backend)
    #[arg(long, global = true)]
    project: Option<String>,

    /// GCP location for Vertex AI (default: global)
    #[arg(long, global = true)]
    location: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Text-to-image generation
    Generate(GenerateArgs),

    /// General mask-free image editing (add/remove/move objects, change backgrounds)
    Edit(EditArgs),

    /// Restore and enhance old or damaged photos
    Restore(RestoreArgs),

    /// Apply a new style to an image
    #[command(name = "style_transfer")]
    StyleTransfer(StyleTransferArgs),

    /// Combine elements from up to 3 input images and text
    Compose(ComposeArgs),

    /// Render text on an image
    #[command(name = "add_text")]
    AddText(AddTextArgs),

    /// Generate a detailed image from a sketch
    #[command(name = "sketch_to_image")]
    SketchToImage(SketchToImageArgs),

    /// Validate credentials and project configuration without calling the API
    Test,
}

#[derive(Args)]
struct GenerateArgs {
    /// OUTPUT_FILE path to save the generated image
    output_file: PathBuf,

    /// Text prompt for image generation
    #[arg(short, long)]
    prompt: String,

    /// Aspect ratio for output framing
    #[arg(long, value_enum)]
    aspect_ratio: Option<AspectRatioArg>,
}

#[derive(Args)]
struct EditArgs {
    /// INPUT_FILE path to the image to edit
    input_file: PathBuf,

    /// OUTPUT_FILE path to save the edited image
    output_file: PathBuf,

    /// Text prompt describing the edit (e.g., 'Remove the car')
    #[arg(short, long)]
    prompt: String,

    /// Aspect ratio for output framing
    #[arg(long, value_enum)]
    aspect_ratio: Option<AspectRatioArg>,
}

#[derive(Args)]
struct RestoreArgs {
    /// INPUT_FILE path to the old image to restore
    input_file: PathBuf,

    /// OUTPUT_FILE path to save the restored image
    output_file: PathBuf,

    /// Optional extra guidance for the restoration
    #[arg(short, long)]
    prompt: Option<String>,
}

#[derive(Args)]
struct StyleTransferArgs {
    /// INPUT_FILE path to the content image
    input_file: PathBuf,

    /// OUTPUT_FILE path to save the stylized image
    output_file: PathBuf,

    /// Prompt describing the desired style or how to use the reference
    #[arg(short, long)]
    prompt: String,

    /// Path to an image to use as style reference
    #[arg(long = "style_ref_image")]
    style_ref_image: Option<PathBuf>,
}

#[derive(Args)]
struct ComposeArgs {
    /// OUTPUT_FILE path to save the composed image
    output_file: PathBuf,

    /// Prompt describing how to combine the images
    #[arg(short, long)]
    prompt: String,

    /// Path to the first input image
    #[arg(long = "input_file1")]
    input_file1: PathBuf,

    /// Path to the second input image
    #[arg(long = "input_file2")]
    input_file2: PathBuf,

    /// Path to the third input image
    #[arg(long = "input_file3")]
    input_file3: Option<PathBuf>,
}

#[derive(Args)]
struct AddTextArgs {
    /// INPUT_FILE path to the image
    input_file: PathBuf,

    /// OUTPUT_FILE path to save the image with text
    output_file: PathBuf,

    /// Prompt describing the text and its placement
    #[arg(short, long)]
    prompt: String,
}

#[derive(Args)]
struct SketchToImageArgs {
    /// INPUT_FILE path to the sketch image
    input_file: PathBuf,

    /// OUTPUT_FILE path to save the generated image
    output_file: PathBuf,

    /// Optional prompt to guide generation
    #[arg(short, long)]
    prompt: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AspectRatioArg {
    #[value(name = "1:1")]
    Square,
    #[value(name = "16:9")]
    Landscape,
    #[value(name = "9:16")]
    Portrait,
    #[value(name = "4:3")]
    Standard,
    #[value(name = "3:4")]
    StandardPortrait,
    #[value(name = "21:9")]
    Ultrawide,
}

impl From<AspectRatioArg> for AspectRatio {
    fn from(arg: AspectRatioArg) -> Self {
        match arg {
            AspectRatioArg::Square => AspectRatio::Square,
            AspectRatioArg::Landscape => AspectRatio::Landscape,
            AspectRatioArg::Portrait => AspectRatio::Portrait,
            AspectRatioArg::Standard => AspectRatio::Standard,
            AspectRatioArg::StandardPortrait => AspectRatio::StandardPortrait,
            AspectRatioArg::Ultrawide => AspectRatio::Ultrawide,
        }
    }
}

/// One image operation, normalized from the parsed subcommand.
struct Invocation {
    operation: Operation,
    prompt: Option<String>,
    inputs: Vec<PathBuf>,
    style_ref: Option<PathBuf>,
    aspect_ratio: Option<AspectRatio>,
    output: PathBuf,
}

impl Invocation {
    fn from_command(command: Commands) -> Option<Self> {
        match command {
            Commands::Generate(args) => Some(Self {
                operation: Operation::Generate,
                prompt: Some(args.prompt),
                inputs: vec![],
                style_ref: None,
                aspect_ratio: args.aspect_ratio.map(Into::into),
                output: args.output_file,
            }),
            Commands::Edit(args) => Some(Self {
                operation: Operation::Edit,
                prompt: Some(args.prompt),
                inputs: vec![args.input_file],
                style_ref: None,
                aspect_ratio: args.aspect_ratio.map(Into::into),
                output: args.output_file,
            }),
            Commands::Restore(args) => Some(Self {
                operation: Operation::Restore,
                prompt: args.prompt,
                inputs: vec![args.input_file],
                style_ref: None,
                aspect_ratio: None,
                output: args.output_file,
            }),
            Commands::StyleTransfer(args) => Some(Self {
                operation: Operation::StyleTransfer,
                prompt: Some(args.prompt),
                inputs: vec![args.input_file],
                style_ref: args.style_ref_image,
                aspect_ratio: None,
                output: args.output_file,
            }),
            Commands::Compose(args) => {
                let mut inputs = vec![args.input_file1, args.input_file2];
                inputs.extend(args.input_file3);
                Some(Self {
                    operation: Operation::Compose,
                    prompt: Some(args.prompt),
                    inputs,
                    style_ref: None,
                    aspect_ratio: None,
                    output: args.output_file,
                })
            }
            Commands::AddText(args) => Some(Self {
                operation: Operation::AddText,
                prompt: Some(args.prompt),
                inputs: vec![args.input_file],
                style_ref: None,
                aspect_ratio: None,
                output: args.output_file,
            }),
            Commands::SketchToImage(args) => Some(Self {
                operation: Operation::SketchToImage,
                prompt: args.prompt,
                inputs: vec![args.input_file],
                style_ref: None,
                aspect_ratio: None,
                output: args.output_file,
            }),
            Commands::Test => None,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("aiphoto=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Usage errors exit 1 like every other failure; --help/--version exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            e.print()?;
            std::process::exit(1);
        }
        Err(e) => {
            e.print()?;
            return Ok(());
        }
    };

    match Invocation::from_command(cli.command) {
        Some(invocation) => run_operation(invocation, cli.project, cli.location, cli.json).await,
        None => run_test(cli.project, cli.location, cli.json),
    }
}

fn build_client(project: Option<String>, location: Option<String>) -> anyhow::Result<GeminiClient> {
    let mut builder = GeminiClient::builder();
    if let Some(project) = project {
        builder = builder.project(project);
    }
    if let Some(location) = location {
        builder = builder.location(location);
    }
    Ok(builder.build()?)
}

async fn run_operation(
    invocation: Invocation,
    project: Option<String>,
    location: Option<String>,
    json_output: bool,
) -> anyhow::Result<()> {
    // Validate files and arguments before resolving credentials.
    let inputs = invocation
        .inputs
        .iter()
        .map(SourceImage::load)
        .collect::<aiphoto::Result<Vec<_>>>()?;

    let style_ref = invocation
        .style_ref
        .as_deref()
        .map(SourceImage::load)
        .transpose()?;

    let request = invocation.operation.assemble(
        invocation.prompt.as_deref(),
        inputs,
        style_ref,
        invocation.aspect_ratio,
    )?;

    let client = build_client(project, location)?;
    let image = dispatch(&client, &request, &invocation.output).await?;

    print_result(&invocation, &image, &client, json_output)
}

fn print_result(
    invocation: &Invocation,
    image: &GeneratedImage,
    client: &GeminiClient,
    json_output: bool,
) -> anyhow::Result<()> {
    if json_output {
        let result = serde_json::json!({
            "operation": invocation.operation.name(),
            "success": true,
            "output": invocation.output.display().to_string(),
            "size_bytes": image.size(),
            "format": image.format.extension(),
            "model": image.metadata.model,
            "duration_ms": image.metadata.duration_ms,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "{}: wrote {} ({} bytes) via {}",
            invocation.operation,
            invocation.output.display(),
            image.size(),
            client.model()
        );
        if let Some(duration) = image.metadata.duration_ms {
            println!("Duration: {}ms", duration);
        }
    }
    Ok(())
}

fn run_test(
    project: Option<String>,
    location: Option<String>,
    json_output: bool,
) -> anyhow::Result<()> {
    let client = build_client(project, location)?;
    client.verify()?;

    if json_output {
        let result = serde_json::json!({
            "operation": "test",
            "success": true,
            "backend": client.backend().to_string(),
            "model": client.model(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Configuration OK: {}", client.backend());
        println!("Model: {}", client.model());
    }
    Ok(())
}
