use consultai::create_app_router;
use consultai::init::app_init;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("🚀 Starting ConsultAI...");
    let (config, state) = app_init().await?;
    log::info!("✅ Application state initialized");
    let app = create_app_router(state);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("");
    log::info!("🎉 Server started!");
    log::info!("📍 http://{}", addr);
    log::info!("🧭 Tasks: http://{}/api/tasks", addr);
    log::info!("❤️  Health: http://{}/health", addr);
    log::info!("");
    log::info!("🦙 Ollama: {}", config.ai.url);
    log::info!("💬 Chat model: {}", config.ai.chat_model);
    log::info!("📝 Report model: {}", config.ai.report_model);
    log::info!("🔊 Speech: {} ({})", config.tts.url, config.tts.language);
    log::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
