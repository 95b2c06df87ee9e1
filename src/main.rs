use std::path::PathBuf;

use clap::Parser;
use dotenvy::dotenv;
use log::{error, info};
use sinnaybot::{
    config::{Config, Credentials},
    server::AuthServer,
};

#[derive(Parser, Debug)]
#[command(version, about = "replies in twitch chat with the song playing on spotify")]
struct Args {
    /// Path to the settings file. Written with defaults if it doesn't exist.
    #[arg(short, long, default_value = "sinnaybot.toml")]
    config: PathBuf,

    /// Address to serve the auth routes on, overriding the settings file.
    #[arg(short, long)]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::read_or_write_default_from(&args.config)?;

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            error!("{e}");
            error!("set SPOTIFY_CLIENT_ID, SPOTIFY_CLIENT_SECRET and the TWITCH_* variables (a .env file works too)");
            std::process::exit(1);
        }
    };

    let address = args
        .address
        .unwrap_or_else(|| config.server.address.clone());

    let server = AuthServer::new(config, credentials)?;
    let server_handle = server.launch(&address).await?;

    server_handle.await??;
    info!("server stopped");

    Ok(())
}
