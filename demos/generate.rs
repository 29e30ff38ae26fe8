//! Basic image generation example.
//!
//! Run with: `cargo run --example generate`
//!
//! Requires Vertex AI credentials (`GOOGLE_CLOUD_PROJECT` + gcloud auth)
//! or a `GOOGLE_API_KEY` environment variable.

use aiphoto::{dispatch, GeminiClient, Operation};

#[tokio::main]
async fn main() -> aiphoto::Result<()> {
    let client = GeminiClient::builder().build()?;

    let request = Operation::Generate.assemble(
        Some("A golden retriever puppy playing in snow"),
        vec![],
        None,
        None,
    )?;

    let image = dispatch(&client, &request, "output.png".as_ref()).await?;
    println!(
        "Generated image: {} bytes, format: {:?}",
        image.size(),
        image.format
    );

    Ok(())
}
