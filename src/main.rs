use elmah_io::app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::main().await
}
