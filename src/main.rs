use crate::cli::run;

pub mod cli;
mod config;
pub mod domain;
pub mod http;
pub mod playback;
mod player;
pub mod storage;
mod stream_endpoint;

fn main() -> anyhow::Result<()> {
    run()
}
