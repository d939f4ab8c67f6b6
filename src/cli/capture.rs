use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use dom_snapshot::SnapshotDocument;
use element_repository::ElementRepository;

use super::context::CliContext;
use super::output::print_structured;
use super::{parse_viewport, read_html};

#[derive(Args, Clone, Debug)]
pub struct CaptureArgs {
    /// HTML snapshot to capture from
    #[arg(long, value_name = "FILE")]
    pub html: PathBuf,

    /// Locator to capture
    #[arg(long)]
    pub locator: String,

    /// Rendering viewport, WIDTHxHEIGHT
    #[arg(long, default_value = "320x200", value_parser = parse_viewport)]
    pub viewport: (u32, u32),
}

pub async fn cmd_capture(args: CaptureArgs, ctx: &CliContext) -> Result<()> {
    let html = read_html(&args.html).await?;
    let (width, height) = args.viewport;
    let document = SnapshotDocument::new(html).with_viewport(width, height);

    let repository = ElementRepository::new(ctx.config().repository.clone());
    repository.capture(&args.locator, &document).await;
    let Some(bundle) = repository.get_bundle(&args.locator) else {
        bail!(
            "'{}' matched nothing in {}",
            args.locator,
            args.html.display()
        );
    };

    if print_structured(ctx.output(), bundle.as_ref())? {
        return Ok(());
    }

    println!("Locator:      {}", bundle.original_locator);
    println!("Captured at:  {}", bundle.captured_at.to_rfc3339());
    println!("Nearby text:  {:?}", bundle.nearby_text);
    match bundle.bounding_box {
        Some(b) => println!(
            "Bounding box: x={} y={} w={} h={}",
            b.x, b.y, b.width, b.height
        ),
        None => println!("Bounding box: none"),
    }
    match &bundle.snapshot_image {
        Some(image) => println!("Snapshot:     {} bytes PNG", image.len()),
        None => println!("Snapshot:     none"),
    }
    println!("Alternatives:");
    for alternative in &bundle.alternative_locators {
        println!("  - {}", alternative);
    }
    Ok(())
}
