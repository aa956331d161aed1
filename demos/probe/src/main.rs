//! illanet-probe: poke at an account service or a game server from the
//! command line.
//!
//! ```text
//! illanet-probe charlist --account ada --password secret
//! illanet-probe connect --host localhost --port 3012 --account ada --password secret
//! ```

mod world;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use illanet::prelude::*;
use illanet::session::store::keys;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::world::LoggingWorld;

#[derive(Parser, Debug)]
#[command(name = "illanet-probe")]
#[command(about = "Fetch character lists and talk to Illarion game servers")]
struct Cli {
    /// Log filter, used when RUST_LOG is not set.
    #[arg(long, default_value = illanet::logging::DEFAULT_FILTER)]
    log: String,

    #[command(subcommand)]
    command: Probe,
}

#[derive(Subcommand, Debug)]
enum Probe {
    /// Fetch and print the characters of an account.
    Charlist {
        #[arg(short, long)]
        account: String,

        #[arg(short, long)]
        password: String,

        /// Deployment whose characters to keep.
        #[arg(short, long, value_enum, default_value_t = ServerArg::Real)]
        server: ServerArg,

        /// Account service base URL, e.g. http://127.0.0.1:8080.
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Connect, log in, and log every message until the time runs out.
    Connect {
        #[arg(long, default_value = "localhost")]
        host: String,

        #[arg(long, default_value_t = 3012)]
        port: u16,

        #[arg(short, long)]
        account: String,

        #[arg(short, long)]
        password: String,

        /// Character to play; the account name is used if omitted.
        #[arg(short, long)]
        character: Option<String>,

        /// Protocol version to announce.
        #[arg(long)]
        client_version: Option<u8>,

        /// Character id of the local player, for movement messages.
        #[arg(long)]
        player_id: Option<u32>,

        /// Stop after this many seconds.
        #[arg(long, default_value_t = 30)]
        seconds: u64,

        /// JSON file with network settings.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ServerArg {
    Dev,
    Test,
    Real,
}

impl From<ServerArg> for Deployment {
    fn from(arg: ServerArg) -> Self {
        match arg {
            ServerArg::Dev => Deployment::DevServer,
            ServerArg::Test => Deployment::TestServer,
            ServerArg::Real => Deployment::RealServer,
        }
    }
}

/// Interval between keep-alive commands while connected.
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    illanet::logging::init(&cli.log);

    let result = match cli.command {
        Probe::Charlist {
            account,
            password,
            server,
            base_url,
        } => charlist(account, password, server.into(), base_url).await,
        Probe::Connect {
            host,
            port,
            account,
            password,
            character,
            client_version,
            player_id,
            seconds,
            config,
        } => {
            let config = match config {
                Some(path) => NetConfig::load(path),
                None => Ok(NetConfig::default()),
            };
            match config {
                Ok(config) => {
                    let target = Target {
                        host,
                        port,
                        character,
                        client_version,
                    };
                    connect(config, target, account, password, player_id.map(CharacterId), seconds).await
                }
                Err(e) => Err(e),
            }
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "probe failed");
            ExitCode::FAILURE
        }
    }
}

// ---------------------------------------------------------------------------
// charlist
// ---------------------------------------------------------------------------

async fn charlist(
    account: String,
    password: String,
    server: Deployment,
    base_url: Option<String>,
) -> Result<ExitCode, IllanetError> {
    let fetcher = match base_url {
        Some(url) => CharListFetcher::with_base_url(url, CharListFetcher::DEFAULT_TIMEOUT)?,
        None => CharListFetcher::new(Deployment::OFFICIAL_HOST)?,
    };

    let mut login = Login::new(server, std::env::temp_dir());
    login.set_login_data(account, password);
    let mut store = MemoryStore::new();

    let outcome = login
        .request_character_list(&fetcher)
        .await
        .unwrap_or_else(|_| CharListOutcome::Failed("request task ended".into()));
    let code = login.apply_charlist(outcome, &mut store);
    if code != 0 {
        warn!(code, "no character list");
        return Ok(ExitCode::from(u8::try_from(code).unwrap_or(u8::MAX)));
    }

    for c in login.characters() {
        println!("{}\t{}", c.name, c.status);
    }
    info!(count = login.characters().len(), %server, "character list loaded");
    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// connect
// ---------------------------------------------------------------------------

struct Target {
    host: String,
    port: u16,
    character: Option<String>,
    client_version: Option<u8>,
}

async fn connect(
    config: NetConfig,
    target: Target,
    account: String,
    password: String,
    player: Option<CharacterId>,
    seconds: u64,
) -> Result<ExitCode, IllanetError> {
    let mut store = MemoryStore::new();
    store.set(keys::SERVER_ADDRESS, Value::from(target.host));
    store.set(keys::SERVER_PORT, Value::from(target.port));
    store.set(keys::SERVER_ACCOUNT_LOGIN, Value::from(target.character.is_some()));
    if let Some(version) = target.client_version {
        store.set(keys::CLIENT_VERSION, Value::from(version));
    }

    let mut login = Login::new(Deployment::DevServer, std::env::temp_dir());
    login.set_server(Deployment::CustomServer);
    login.set_login_data(account, password);
    if let Some(character) = target.character {
        login.set_login_character(character);
    }

    let mut client = NetClient::new(config);
    client.try_login(&login, &store).await?;

    let mut world = LoggingWorld::new(player);
    let mut clock = client.update_clock();
    let deadline = Instant::now() + Duration::from_secs(seconds);
    let mut next_keepalive = Instant::now() + KEEPALIVE_INTERVAL;
    let mut lost = false;

    while Instant::now() < deadline && world.disconnect_reason.is_none() {
        clock.wait_for_tick().await;

        let summary = client.update(&mut world);
        if let Some(NetEvent::ConnectionLost(reason)) = summary.events.first() {
            warn!(%reason, "connection lost");
            lost = true;
            break;
        }

        if Instant::now() >= next_keepalive {
            client.send_command(&Command::KeepAlive).await?;
            next_keepalive += KEEPALIVE_INTERVAL;
        }
    }

    client.disconnect().await;
    info!(
        applied = world.applied,
        disconnect_reason = ?world.disconnect_reason,
        "probe finished"
    );
    Ok(if lost { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}
