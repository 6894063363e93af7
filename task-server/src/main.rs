#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let config = task_server::config::Config::from_env()?;
    tracing::info!("Loaded configuration: {:?}", config);
    task_server::web::start_web_server(config).await
}
