use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use live_bridge::{Config, LiveSession, LoopbackClient, SessionConfig, VideoMode};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "live-bridge", about = "Real-time duplex audio/video session bridge")]
struct Args {
    /// Config file to load (without extension), e.g. "config/live-bridge".
    #[arg(long)]
    config: Option<String>,

    /// Video capture source for this session.
    #[arg(long, value_enum)]
    video: Option<VideoMode>,

    /// System instruction sent to the endpoint at connect time.
    #[arg(long)]
    instruction: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let mut session_config = match &args.config {
        Some(path) => Config::load(path)?.into_session_config(),
        None => SessionConfig::default(),
    };
    if let Some(mode) = args.video {
        session_config.video_mode = mode;
    }
    if let Some(instruction) = &args.instruction {
        session_config.connect = live_bridge::live::ConnectConfig::new(instruction);
    }

    info!(
        session_id = %session_config.session_id,
        model = %session_config.model,
        "starting live-bridge"
    );

    // Loopback endpoint: echoes audio and acknowledges frames. Swap in a
    // real client implementation to talk to a remote service.
    let client = Arc::new(LoopbackClient);
    let mut session = LiveSession::new(session_config, client);

    let cancel = session.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, stopping session");
            cancel.cancel();
        }
    });

    let mut text_rx = session.text_deltas();
    tokio::spawn(async move {
        if let Some(rx) = text_rx.as_mut() {
            while let Some(delta) = rx.recv().await {
                println!("{}", delta.text);
            }
        }
    });

    let stats = session.run().await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}
