use std::path::PathBuf;
use std::sync::Arc;

use action_locator::{AttemptVerdict, HealOutcome, HealReport, SelfHealer, SelfHealingResolver};
use anyhow::Result;
use clap::Args;
use dom_snapshot::SnapshotDocument;
use element_repository::ElementRepository;
use perceiver_visual::TemplateMatcher;
use serde::Serialize;
use tracing::warn;

use super::context::CliContext;
use super::output::print_structured;
use super::{parse_viewport, read_html};

#[derive(Args, Clone, Debug)]
pub struct HealArgs {
    /// HTML snapshot in which the locator still works
    #[arg(long, value_name = "FILE")]
    pub before: PathBuf,

    /// HTML snapshot after the page changed
    #[arg(long, value_name = "FILE")]
    pub after: PathBuf,

    /// Locator recorded against the first snapshot
    #[arg(long)]
    pub locator: String,

    /// Use template matching for the visual strategy
    #[arg(long)]
    pub vision: bool,

    /// Rendering viewport, WIDTHxHEIGHT
    #[arg(long, default_value = "320x200", value_parser = parse_viewport)]
    pub viewport: (u32, u32),
}

#[derive(Serialize)]
struct HealSummary {
    locator: String,
    captured: bool,
    alternatives: Vec<String>,
    nearby_text: Option<String>,
    healed: Option<String>,
    report: HealReport,
}

pub async fn cmd_heal(args: HealArgs, ctx: &CliContext) -> Result<()> {
    let before = read_html(&args.before).await?;
    let after = read_html(&args.after).await?;
    let (width, height) = args.viewport;
    let document = SnapshotDocument::new(before).with_viewport(width, height);
    let config = ctx.config();

    let repository = Arc::new(ElementRepository::new(config.repository.clone()));
    repository.capture(&args.locator, &document).await;
    let bundle = repository.get_bundle(&args.locator);
    if bundle.is_none() {
        warn!(
            "'{}' matched nothing in {}; healing without captured data",
            args.locator,
            args.before.display()
        );
    }

    document.replace_html(after);
    let mut resolver = SelfHealingResolver::new(repository.clone(), config.resolver.clone());
    if args.vision || config.enable_vision {
        resolver = resolver.with_vision(Arc::new(TemplateMatcher::default()));
    }
    let report = resolver.heal_report(&args.locator, &document).await;

    let summary = HealSummary {
        locator: args.locator.clone(),
        captured: bundle.is_some(),
        alternatives: bundle
            .as_ref()
            .map(|b| b.alternative_locators.clone())
            .unwrap_or_default(),
        nearby_text: bundle.as_ref().map(|b| b.nearby_text.clone()),
        healed: report.outcome.locator().map(str::to_string),
        report,
    };
    if print_structured(ctx.output(), &summary)? {
        return Ok(());
    }

    println!("Locator:  {}", summary.locator);
    if summary.captured {
        println!(
            "Captured: {} alternative(s), nearby text {:?}",
            summary.alternatives.len(),
            summary.nearby_text.as_deref().unwrap_or("")
        );
    } else {
        println!("Captured: nothing (locator did not match the first snapshot)");
    }
    println!();
    for attempt in &summary.report.attempts {
        let verdict = match &attempt.verdict {
            AttemptVerdict::Matched(locator) => format!("matched {}", locator),
            AttemptVerdict::Abstained => "abstained".to_string(),
            AttemptVerdict::Failed(reason) => format!("failed: {}", reason),
        };
        println!(
            "  {:<24} {:<40} {:>6.1}ms",
            attempt.strategy.name(),
            verdict,
            attempt.elapsed.as_secs_f64() * 1000.0
        );
    }
    println!();
    match &summary.report.outcome {
        HealOutcome::Healed { locator, strategy } => {
            println!("Healed:   {} (via {})", locator, strategy)
        }
        HealOutcome::Exhausted => println!("Healed:   no replacement found"),
    }
    Ok(())
}
