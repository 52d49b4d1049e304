#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = quizzeo_rust::run().await {
        eprintln!("quizzeo-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
