use anyhow::Result;
use serde::Serialize;

use super::context::CliContext;
use super::output::print_structured;

#[derive(Serialize)]
struct BuildInfo {
    name: &'static str,
    version: &'static str,
    build_date: &'static str,
    git_hash: &'static str,
}

pub fn cmd_version(ctx: &CliContext) -> Result<()> {
    let info = BuildInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        build_date: env!("BUILD_DATE"),
        git_hash: env!("GIT_HASH"),
    };
    if print_structured(ctx.output(), &info)? {
        return Ok(());
    }

    println!("{} v{}", info.name, info.version);
    println!("Build date: {}", info.build_date);
    println!("Git hash:   {}", info.git_hash);
    Ok(())
}
