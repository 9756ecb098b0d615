use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{self, Config};
use crate::domain::track::{Track, TrackId};
use crate::http::server::HttpServer;
use crate::playback::{PlaybackController, timer::ThreadScheduler};
use crate::player::MplayerProcess;
use crate::storage::PlaylistStore;
use crate::storage::db::i64_seconds_to_local_time;
use crate::stream_endpoint::StreamEndpoint;

#[derive(Parser)]
#[command(name = "remotedeck")]
#[command(version = "0.1")]
#[command(about = "Remote controlled music player")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show playlist status
    Status,
    /// Run http server controlling playback
    Serve,
    /// List tracks in the playlist
    List,
    /// Append a track to the playlist
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        artist: String,
        #[arg(long)]
        album: Option<String>,
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        duration_ms: u64,
        /// Provider reference used to resolve the stream
        #[arg(long)]
        store_id: String,
    },
    /// Remove a track from the playlist
    Remove {
        /// Track id as shown by "list"
        id: String,
    },
}

/// Entrypoint for CLI
pub fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    match cli.command {
        Commands::Status => {
            let store = open_store(&cfg)?;
            let summary = store.summary()?;

            println!(
                "Playlist \"{}\" was created {} and contains {} tracks",
                summary.name,
                i64_seconds_to_local_time(summary.created_at)?,
                summary.track_count
            );
            if let Some(last) = summary.last_added_at {
                println!("Last track added {}", i64_seconds_to_local_time(last)?);
            }
        }

        Commands::Serve => {
            println!("Starting HTTP server...");
            let controller = build_controller(&cfg)?;
            let http_server = HttpServer::new(controller, cfg.http);

            println!(
                "HTTP server running at http://{}:{}",
                http_server.config.bind_addr, http_server.config.port
            );
            http_server.run();
        }

        Commands::List => {
            let store = open_store(&cfg)?;

            for (position, track) in store.load_tracks()?.iter().enumerate() {
                let secs = track.duration().as_secs();
                println!(
                    "{:>3}. {} - {} [{}:{:02}]  ({})",
                    position + 1,
                    track.artist,
                    track.title,
                    secs / 60,
                    secs % 60,
                    track.id
                );
            }
        }

        Commands::Add {
            id,
            title,
            artist,
            album,
            duration_ms,
            store_id,
        } => {
            let mut store = open_store(&cfg)?;
            let track = Track {
                id: TrackId::new(id),
                title,
                artist,
                album,
                duration_millis: duration_ms,
                store_id,
            };

            if store.append_track(&track)? {
                println!("Added {} - {}", track.artist, track.title);
            } else {
                println!("Track {} is already in the playlist", track.id);
            }
        }

        Commands::Remove { id } => {
            let mut store = open_store(&cfg)?;
            let track_id = TrackId::new(id);

            if store.remove_track(&track_id)? {
                println!("Removed {track_id}");
            } else {
                println!("Track {track_id} is not in the playlist");
            }
        }
    }

    Ok(())
}

fn open_store(cfg: &config::Config) -> anyhow::Result<PlaylistStore> {
    PlaylistStore::new(&cfg.database, &cfg.playlist.name)
        .with_context(|| format!("Failed to open playlist '{}'", cfg.playlist.name))
}

fn build_controller(cfg: &config::Config) -> anyhow::Result<PlaybackController> {
    let controller = PlaybackController::new(
        Box::new(MplayerProcess::new(cfg.player.clone())),
        Box::new(StreamEndpoint::new(&cfg.stream)),
        Box::new(ThreadScheduler),
    );
    controller.attach_store(open_store(cfg)?)?;
    Ok(controller)
}
