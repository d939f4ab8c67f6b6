use anyhow::Result;

pub fn cmd_metrics() -> Result<()> {
    let text = selfheal::metrics::render_metrics()?;
    print!("{}", text);
    Ok(())
}
