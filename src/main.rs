use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use smartcrop_chat::{
    create_router, AppState, CaptureState, Config, Language, Origin, ServiceSessionFactory,
    SessionFactory, SessionHandle, SessionSnapshot,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "smartcrop-chat", about = "Voice/text farming assistant sessions")]
struct Cli {
    /// Configuration file (extension optional)
    #[arg(long, default_value = "config/smartcrop-chat")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the session HTTP API
    Serve,
    /// Ask a single question and print the reply
    Ask {
        text: String,
        #[arg(long)]
        language: Option<Language>,
        #[arg(long)]
        farm_id: Option<u64>,
    },
    /// Interactive conversation on stdin (/voice, /stop, /reset, /quit)
    Chat {
        #[arg(long)]
        language: Option<Language>,
        #[arg(long)]
        farm_id: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = Arc::new(Config::load(&cli.config)?);

    info!("Loaded config: {}", cfg.service.name);
    info!("Agent endpoint: {} (timeout {}s)", cfg.agent.base_url, cfg.agent.timeout_secs);

    let factory = Arc::new(ServiceSessionFactory::new(Arc::clone(&cfg))?);

    match cli.command {
        Command::Serve => serve(&cfg, factory).await,
        Command::Ask {
            text,
            language,
            farm_id,
        } => {
            let session = factory.create(language, farm_id).await?;
            session.submit_text(text).await?;
            let snapshot = session.wait_for(|s| !s.awaiting_reply).await?;
            print_reply(&snapshot);
            Ok(())
        }
        Command::Chat { language, farm_id } => {
            let session = factory.create(language, farm_id).await?;
            chat(session).await
        }
    }
}

async fn serve(cfg: &Config, factory: Arc<ServiceSessionFactory>) -> Result<()> {
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let app = create_router(AppState::new(factory));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}

async fn chat(session: SessionHandle) -> Result<()> {
    if let Some(greeting) = session.snapshot().turns.first() {
        println!("agent> {}", greeting.text);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let result = match line.trim() {
            "/quit" => break,
            "/reset" => session.reset().await,
            "/voice" => session.start_capture().await,
            "/stop" => match session.release_capture().await {
                Ok(()) => {
                    let snapshot = session
                        .wait_for(|s| s.state == CaptureState::Idle && !s.awaiting_reply)
                        .await?;
                    print_reply(&snapshot);
                    Ok(())
                }
                Err(e) => Err(e),
            },
            text => match session.submit_text(text).await {
                Ok(()) => {
                    let snapshot = session.wait_for(|s| !s.awaiting_reply).await?;
                    print_reply(&snapshot);
                    Ok(())
                }
                Err(e) => Err(e),
            },
        };

        if let Err(e) = result {
            println!("! {}", e);
        }
        for notice in session.take_notices().await? {
            println!("! {}", notice.message);
        }
    }

    Ok(())
}

fn print_reply(snapshot: &SessionSnapshot) {
    if let Some(turn) = snapshot.turns.last().filter(|t| t.origin == Origin::Agent) {
        println!("agent> {}", turn.text);
        if let Some(audio) = &turn.audio_ref {
            println!("       (audio: {})", audio.as_str());
        }
    }
}
