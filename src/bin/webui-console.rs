//! Console stand-in for a chat host.
//!
//! Reads `start`, `stop`, `status` and `quit` from stdin the way a chat
//! dispatcher would deliver operator commands. Configuration comes from
//! `WEBUI_*` environment variables.

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use webui_host::prelude::*;

/// Demo collaborator exposed through `/api/motd`
struct Motd(String);

async fn motd(Inject(motd): Inject<Motd>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "motd": motd.0 }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = WebUiConfig::from_config_service(&ConfigService::from_env())?;
    let factory = AxumServiceFactory::new().with_routes(Router::new().route("/api/motd", get(motd)));

    let plugin = WebUiPlugin::builder()
        .config(config)
        .collaborator("motd", Arc::new(Motd("The fish are biting today".to_string())))
        .factory(factory)
        .build()?;
    let commands = plugin.commands();

    println!("Commands: start | stop | status | quit");

    let signal = shutdown_signal();
    tokio::pin!(signal);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = &mut signal => break,
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                match line {
                    "" => continue,
                    "quit" | "exit" => break,
                    _ => {
                        let reply = commands.handle_text(line).await;
                        println!("[{}] {}", reply.kind, reply.message);
                    }
                }
            }
        }
    }

    if let Err(e) = plugin.terminate().await {
        tracing::warn!("Web UI teardown reported: {}", e);
    }
    tracing::info!("Console host stopped");
    Ok(())
}
