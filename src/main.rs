use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    visor_cli::run().await
}
