use action_locator::loosen::looser_candidates;
use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::context::CliContext;
use super::output::print_structured;

#[derive(Args, Clone, Debug)]
pub struct DeriveArgs {
    /// Broken locator to loosen
    #[arg(long)]
    pub locator: String,
}

#[derive(Serialize)]
struct Derived<'a> {
    locator: &'a str,
    candidates: Vec<String>,
}

pub fn cmd_derive(args: DeriveArgs, ctx: &CliContext) -> Result<()> {
    let derived = Derived {
        locator: &args.locator,
        candidates: looser_candidates(&args.locator),
    };
    if print_structured(ctx.output(), &derived)? {
        return Ok(());
    }

    if derived.candidates.is_empty() {
        println!("No looser variants for {}", derived.locator);
    }
    for (idx, candidate) in derived.candidates.iter().enumerate() {
        println!("{}. {}", idx + 1, candidate);
    }
    Ok(())
}
