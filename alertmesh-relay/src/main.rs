/**
 * ALERTMESH RELAY - Point d'entrée du noeud local
 *
 * RÔLE : charge la config (relay.yaml + .env + flags), capture l'offset local,
 * puis sert l'API HTTP jusqu'à Ctrl-C.
 */

use alertmesh_relay::{load_config, serve, AppState};
use anyhow::{Context, Result};
use clap::Parser;
use time::UtcOffset;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "alertmesh-relay", version, about = "AlertMesh local chat node")]
struct Args {
    /// Port HTTP (défaut: config, puis 3001)
    #[arg(long, env = "ALERTMESH_RELAY_PORT")]
    port: Option<u16>,

    /// Pseudo utilisé pour les messages envoyés via /send
    #[arg(long)]
    nick: Option<String>,

    /// Nom de la salle
    #[arg(long)]
    room: Option<String>,
}

fn main() -> Result<()> {
    // Charger les variables d'environnement depuis .env (si présent)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // l'offset local n'est lisible de façon fiable qu'avant le démarrage des threads
    let utc_offset = UtcOffset::current_local_offset().unwrap_or_else(|_| {
        warn!("[relay] offset local indisponible, horodatage en UTC");
        UtcOffset::UTC
    });

    let args = Args::parse();
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?
        .block_on(run(args, utc_offset))
}

async fn run(args: Args, utc_offset: UtcOffset) -> Result<()> {
    let mut cfg = load_config().await;
    if let Some(port) = args.port {
        cfg.port = port;
    }
    if let Some(nick) = args.nick {
        cfg.nickname = nick;
    }
    if let Some(room) = args.room {
        cfg.room = room;
    }

    let addr = format!("{}:{}", cfg.bind, cfg.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        "[relay] listening on http://{} (room {}, nick {})",
        listener.local_addr()?,
        cfg.room,
        cfg.nickname
    );

    let state = AppState::new(cfg, utc_offset);
    serve(listener, state, async {
        tokio::signal::ctrl_c().await.ok();
        info!("[relay] shutting down");
    })
    .await
    .context("relay server failed")
}
