#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = bandprep::run().await {
        eprintln!("bandprep fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
