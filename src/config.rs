use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub version: u32,
    pub database: Database,
    pub playlist: PlaylistConfig,
    pub http: HttpConfig,
    pub stream: StreamConfig,
    #[serde(default)]
    pub player: PlayerConfig,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&contents).with_context(|| "Failed to parse config TOML")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub bind_addr: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Database {
    pub in_memory: bool,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlaylistConfig {
    /// playlist to load at start, created if missing
    pub name: String,
}

/// Streaming endpoint the player pulls audio from
#[derive(Debug, Deserialize, Clone)]
pub struct StreamConfig {
    pub base_url: String,
    #[serde(default)]
    pub device_id: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PlayerConfig {
    pub command: String,
    pub args: Vec<String>,
    /// send an extra `pause` after loading, mplayer on macOS starts paused
    pub unpause_after_load: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            command: "mplayer".to_string(),
            args: ["-slave", "-idle", "-quiet", "-really-quiet"]
                .map(String::from)
                .to_vec(),
            unpause_after_load: cfg!(target_os = "macos"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_config_toml() -> anyhow::Result<()> {
        let toml_str = r#"
version = 1

[database]
in_memory = true

[playlist]
name = "Party"

[http]
bind_addr = "127.0.0.1"
port = 8080

[stream]
base_url = "http://main-deck:8080"
device_id = "3a5f"

[player]
command = "/usr/local/bin/mplayer"
args = ["-slave", "-idle"]
unpause_after_load = true
"#;

        let cfg: Config = toml::from_str(toml_str)?;

        assert_eq!(cfg.version, 1);
        assert!(cfg.database.in_memory);
        assert_eq!(cfg.playlist.name, "Party");
        assert_eq!(cfg.stream.device_id, "3a5f");
        assert_eq!(cfg.player.command, "/usr/local/bin/mplayer");
        assert_eq!(cfg.player.args, vec!["-slave", "-idle"]);
        assert!(cfg.player.unpause_after_load);

        Ok(())
    }

    #[test]
    fn test_player_section_defaults() -> anyhow::Result<()> {
        let toml_str = r#"
version = 1

[database]
in_memory = false
path = "/tmp/remotedeck.db"

[playlist]
name = "Party"

[http]
bind_addr = "0.0.0.0"
port = 9000

[stream]
base_url = "http://main-deck:8080"
"#;

        let cfg: Config = toml::from_str(toml_str)?;

        assert!(!cfg.database.in_memory);
        assert_eq!(
            cfg.database.path,
            Some(PathBuf::from("/tmp/remotedeck.db"))
        );
        assert_eq!(cfg.stream.device_id, "");
        assert_eq!(cfg.player.command, "mplayer");
        assert!(cfg.player.args.contains(&"-slave".to_string()));

        Ok(())
    }

    #[test]
    fn test_load_missing_file_is_error() {
        assert!(Config::load(Path::new("/definitely/not/here.toml")).is_err());
    }
}
