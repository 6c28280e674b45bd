#[tokio::main]
async fn main() -> gembot::error::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("gembot=info,serenity=warn"),
    )
    .init();
    log::info!("Starting gembot Discord bot");

    match gembot::run().await {
        Ok(_) => {
            log::info!("Bot shut down successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Bot encountered an error: {}", e);
            Err(e)
        }
    }
}
