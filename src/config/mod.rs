pub use stickerforge_core::config::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Locations searched, in order, when no config path is given.
pub const DEFAULT_PATHS: [&str; 3] = [
    "./stickerforge.toml",
    "~/.config/stickerforge/config.toml",
    "/etc/stickerforge/config.toml",
];

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;
    expand_paths(&mut config);

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    for path_str in DEFAULT_PATHS {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// `~` in configured paths refers to the user's home directory.
fn expand_paths(config: &mut Config) {
    let expand =
        |p: &Path| -> PathBuf { PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).as_ref()) };
    config.storage.state_dir = expand(&config.storage.state_dir);
    config.tools.ffmpeg_path = config.tools.ffmpeg_path.as_deref().map(expand);
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    for warning in config.validate()? {
        tracing::warn!("{}", warning);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_file_is_default() {
        let file = write_config("");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.storage.state_dir, PathBuf::from("./data"));
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.detection.cache_capacity, 1024);
        assert!(config.encoder.timeout_secs.is_none());
    }

    #[test]
    fn sections_override_defaults() {
        let file = write_config(
            r#"
[storage]
state_dir = "/var/lib/stickerforge"

[fetch]
timeout_secs = 5
user_agent = "bot/1.0"

[encoder]
timeout_secs = 120

[detection]
cache_capacity = 16
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(
            config.storage.scratch_dir(),
            PathBuf::from("/var/lib/stickerforge/tmp")
        );
        assert_eq!(config.fetch.user_agent, "bot/1.0");
        assert_eq!(config.encoder.timeout_secs, Some(120));
        assert_eq!(config.detection.cache_capacity, 16);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let file = write_config("[detection]\ncache_capacity = 0\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("cache_capacity"));
    }

    #[test]
    fn parse_errors_name_the_file() {
        let file = write_config("[storage\nstate_dir = 3");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn tilde_is_expanded() {
        if std::env::var_os("HOME").is_none() {
            return;
        }
        let file = write_config("[storage]\nstate_dir = \"~/stickers\"\n");
        let config = load_config(file.path()).unwrap();
        assert!(!config.storage.state_dir.starts_with("~"));
    }

    #[test]
    fn explicit_missing_path_errors() {
        assert!(load_config_or_default(Some(Path::new("/nope/stickerforge.toml"))).is_err());
    }
}
