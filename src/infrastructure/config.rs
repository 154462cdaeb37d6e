use std::path::Path;

use config::ConfigError;
use serde::Deserialize;

use crate::{infrastructure::cli::Cli, utils};

const CONFIG: &str = include_str!("../../.config/config.json5");

const CONFIG_FILES: [(&str, config::FileFormat); 5] = [
    ("config.json5", config::FileFormat::Json5),
    ("config.json", config::FileFormat::Json),
    ("config.yaml", config::FileFormat::Yaml),
    ("config.toml", config::FileFormat::Toml),
    ("config.ini", config::FileFormat::Ini),
];

/// What the receiver does with an inbound message it cannot decrypt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DecryptFailure {
    /// Log the event and keep the session running.
    #[default]
    Skip,
    /// End the session with an error.
    Abort,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub relay: String,
    #[serde(default)]
    pub peer: String,
    #[serde(default)]
    pub connect_timeout_secs: u64,
    #[serde(default)]
    pub decrypt_failure: DecryptFailure,
}

impl Config {
    /// Loads the compiled-in defaults, then any user config file, then the
    /// command line overrides.
    pub fn new(cli: &Cli) -> Result<Self, ConfigError> {
        Self::load(&utils::get_config_dir(), cli)
    }

    pub fn load(config_dir: &Path, cli: &Cli) -> Result<Self, ConfigError> {
        let default_config: Config = json5::from_str(CONFIG)
            .map_err(|e| ConfigError::Message(format!("Failed to load default config: {e}")))?;

        let mut builder = config::Config::builder()
            .set_default("relay", default_config.relay)?
            .set_default("peer", default_config.peer)?
            .set_default("connect_timeout_secs", default_config.connect_timeout_secs)?
            .set_default(
                "decrypt_failure",
                default_config.decrypt_failure.to_string(),
            )?;

        for (file, format) in &CONFIG_FILES {
            let path = config_dir.join(file);
            if path.exists() {
                log::info!("Loading configuration from {}", path.display());
            }
            builder = builder.add_source(config::File::from(path).format(*format).required(false));
        }

        builder = builder
            .set_override_option("relay", cli.relay.clone())?
            .set_override_option("peer", cli.peer.clone())?
            .set_override_option("connect_timeout_secs", cli.connect_timeout)?;

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;

        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.relay.trim().is_empty() {
            return Err(ConfigError::NotFound(String::from("relay")));
        }
        if self.peer.trim().is_empty() {
            return Err(ConfigError::NotFound(String::from("peer")));
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::Message(String::from(
                "connect_timeout_secs must be greater than zero",
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs, path::PathBuf, process};

    use pretty_assertions::assert_eq;

    use super::*;

    /// A fresh, empty config directory unique to one test.
    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("nostdm-config-{}-{name}", process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    #[test]
    fn test_defaults_without_config_file() -> Result<(), ConfigError> {
        let dir = scratch_dir("defaults");

        let cfg = Config::load(&dir, &Cli::default())?;

        assert_eq!(cfg.relay, "wss://relay.damus.io");
        assert_eq!(
            cfg.peer,
            "npub1c0qyae9ggdxmrs9gnpkrc5t0dzncfgypvmrx9rzygclzyld5q4nqe9ja8j"
        );
        assert_eq!(cfg.connect_timeout_secs, 10);
        assert_eq!(cfg.decrypt_failure, DecryptFailure::Skip);
        Ok(())
    }

    #[test]
    fn test_user_file_overrides_defaults() -> Result<(), ConfigError> {
        let dir = scratch_dir("user-file");
        fs::write(
            dir.join("config.toml"),
            "relay = \"wss://nos.lol\"\ndecrypt_failure = \"abort\"\n",
        )
        .expect("write config.toml");

        let cfg = Config::load(&dir, &Cli::default())?;

        assert_eq!(cfg.relay, "wss://nos.lol");
        assert_eq!(cfg.decrypt_failure, DecryptFailure::Abort);
        assert_eq!(cfg.connect_timeout_secs, 10);
        Ok(())
    }

    #[test]
    fn test_unknown_keys_in_user_file_are_ignored() -> Result<(), ConfigError> {
        let dir = scratch_dir("unknown-keys");
        fs::write(
            dir.join("config.json5"),
            "{ _data_dir: \"/elsewhere\", keybindings: {}, peer: \"npub1peer\" }",
        )
        .expect("write config.json5");

        let cfg = Config::load(&dir, &Cli::default())?;

        assert_eq!(cfg.peer, "npub1peer");
        assert_eq!(cfg.relay, "wss://relay.damus.io");
        Ok(())
    }

    #[test]
    fn test_cli_overrides_user_file() -> Result<(), ConfigError> {
        let dir = scratch_dir("cli");
        fs::write(dir.join("config.json5"), "{ relay: \"wss://nos.lol\" }")
            .expect("write config.json5");
        let cli = Cli {
            relay: Some(String::from("wss://relay.example.com")),
            peer: None,
            connect_timeout: Some(3),
        };

        let cfg = Config::load(&dir, &cli)?;

        assert_eq!(cfg.relay, "wss://relay.example.com");
        assert_eq!(cfg.connect_timeout_secs, 3);
        Ok(())
    }

    #[test]
    fn test_empty_peer_is_rejected() {
        let dir = scratch_dir("empty-peer");
        let cli = Cli {
            peer: Some(String::new()),
            ..Cli::default()
        };

        let err = Config::load(&dir, &cli).expect_err("empty peer must fail");

        assert!(format!("{err:?}").contains("peer"));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let dir = scratch_dir("zero-timeout");
        let cli = Cli {
            connect_timeout: Some(0),
            ..Cli::default()
        };

        assert!(Config::load(&dir, &cli).is_err());
    }

    #[test]
    fn test_decrypt_failure_display() {
        assert_eq!(DecryptFailure::Skip.to_string(), "skip");
        assert_eq!(DecryptFailure::Abort.to_string(), "abort");
    }
}
