//! Photo restoration example - repairs an old photo without altering it.
//!
//! Run with: `cargo run --example restore -- <old_photo.jpg>`
//!
//! Requires Vertex AI credentials (`GOOGLE_CLOUD_PROJECT` + gcloud auth)
//! or a `GOOGLE_API_KEY` environment variable.

use aiphoto::{dispatch, GeminiClient, Operation, SourceImage};

#[tokio::main]
async fn main() -> aiphoto::Result<()> {
    let input_path = std::env::args()
        .nth(1)
        .expect("Usage: restore <old_photo.jpg>");

    let input = SourceImage::load(&input_path)?;

    let client = GeminiClient::builder().build()?;
    let request = Operation::Restore.assemble(None, vec![input], None, None)?;

    let image = dispatch(&client, &request, "restored.png".as_ref()).await?;
    println!("Restored image saved to restored.png ({} bytes)", image.size());

    Ok(())
}
