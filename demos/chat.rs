//! Chat-room client.
//!
//! Demonstrates:
//! - Opening a client with deferred start
//! - Registering channel handlers (plain and typed)
//! - Sending before the connection is open (buffered, then flushed)
//! - Lifecycle observers for open, error and disconnect
//!
//! Expects a chat server that speaks `{"where", "data"}` envelopes and
//! URL-decodes incoming frames.
//!
//! Usage:
//!   cargo run --example chat -- --host 127.0.0.1 --port 9000 --nick ada
//!   cargo run --example chat -- --debug

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::json;
use socket_channels::{ChannelName, Client, ClientOptions, Result, TextCodec};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Types
// ============================================================================

/// Command-line arguments.
#[derive(Debug, Clone)]
struct Args {
    host: String,
    port: u16,
    nick: String,
    debug: bool,
}

impl Args {
    /// Parse command-line arguments.
    fn parse() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let value = |flag: &str| {
            args.iter()
                .position(|a| a == flag)
                .and_then(|i| args.get(i + 1))
                .cloned()
        };

        Self {
            host: value("--host").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: value("--port").and_then(|p| p.parse().ok()).unwrap_or(9000),
            nick: value("--nick").unwrap_or_else(|| "guest".to_string()),
            debug: args.iter().any(|a| a == "--debug"),
        }
    }
}

/// Entry of the server's room list.
#[derive(Debug, Deserialize)]
struct Room {
    #[serde(rename = "roomName")]
    room_name: String,
    #[serde(rename = "userList", default)]
    user_list: Vec<serde_json::Value>,
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    println!("=== Chat client ===\n");

    let options = ClientOptions::default()
        .with_auto_start(false)
        .with_debug_logging(args.debug)
        .with_outbound_codec(TextCodec::PercentEncoded);
    let client = Client::open(&args.host, args.port, options)?;

    client.set_open_event(|| println!("[Open] Connected"));
    client.set_error_event(|message| println!("[Error] {message}"));
    client.set_disconnect_event(|| println!("[Disconnect] Server went away"));

    client.on_typed("getRoomListResponse", |rooms: Vec<Room>| {
        println!("[Rooms] {} room(s)", rooms.len());
        for room in rooms {
            println!("        {} ({} users)", room.room_name, room.user_list.len());
        }
    })?;
    client.on("newRoomResponse", |data| println!("[Room] created: {data}"))?;
    client.on(ChannelName::SENTINEL, |_| println!("[Warn] Undecodable frame"))?;

    // Queued until the connection opens.
    client.send("setNickname", &json!({ "nickname": args.nick }))?;
    client.send("getRoomList", &json!({}))?;
    println!("[Buffered] {} message(s)", client.buffered_len());

    println!("[Connect] {}", client.url());
    client.start()?;

    println!("Press Ctrl+C to exit...");
    tokio::signal::ctrl_c().await?;

    if client.close().is_err() {
        println!("[Close] Already disconnected");
    }
    Ok(())
}

// ============================================================================
// Logging
// ============================================================================

/// Initialize tracing/logging.
fn init_logging(debug: bool) {
    let filter = if debug {
        "socket_channels=debug"
    } else {
        "socket_channels=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}
