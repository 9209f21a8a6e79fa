use std::path::{Path, PathBuf};

use super::types::{AppConfig, NotifierConfig, WebhookNotifierConfig};

/// Get the default sessionctl data directory: ~/.sessionctl
pub fn get_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".sessionctl"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.sessionctl/config.toml (highest)
    let data_dir = get_data_dir()?;
    let home_config = data_dir.join("config.toml");

    // Priority 2: ./config.toml (current directory)
    let local_config = Path::new("config.toml");

    let mut cfg = if home_config.exists() {
        load_from_path(&home_config)?
    } else if local_config.exists() {
        load_from_path(local_config)?
    } else {
        AppConfig::default()
    };

    // Relative default events path is moved under the data directory.
    if cfg.events_out.path == "./session.events.jsonl" {
        let events_dir = data_dir.join("events_out");
        std::fs::create_dir_all(&events_dir)?;
        cfg.events_out.path = events_dir
            .join("session.events.jsonl")
            .to_string_lossy()
            .to_string();
    }

    if cfg.logging.file
        && cfg
            .logging
            .directory
            .as_deref()
            .map(|s| s.trim().is_empty())
            .unwrap_or(true)
    {
        let logs_dir = data_dir.join("logs");
        std::fs::create_dir_all(&logs_dir)?;
        cfg.logging.directory = Some(logs_dir.to_string_lossy().to_string());
    }

    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("read config {}: {e}", path.display()))?;
    let cfg = toml::from_str::<AppConfig>(&s)
        .map_err(|e| anyhow::anyhow!("parse config {}: {e}", path.display()))?;
    Ok(cfg)
}

/// Environment variables win over any file.
pub fn apply_env_overrides(cfg: &mut AppConfig) {
    if let Some(v) = non_empty_env("SESSIONCTL_API_KEY") {
        cfg.credentials.key = Some(v);
    }
    if let Some(v) = non_empty_env("SESSIONCTL_API_SECRET") {
        cfg.credentials.secret = Some(v);
    }
    if let Some(url) = non_empty_env("SESSIONCTL_NOTIFIER_URL") {
        match cfg.notifier {
            NotifierConfig::Webhook(ref mut w) => w.url = url,
            NotifierConfig::Log => {
                cfg.notifier = NotifierConfig::Webhook(WebhookNotifierConfig {
                    url,
                    timeout_ms: 5_000,
                });
            }
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_path_reads_control_section() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[control]\nlive_wait_time_ms = 1000\n\n[credentials]\nkey = \"abc\""
        )
        .unwrap();

        let cfg = load_from_path(file.path()).unwrap();
        assert_eq!(cfg.control.live_wait_time_ms, 1000);
        assert_eq!(cfg.control.normal_wait_time_ms, 60_000);
        assert_eq!(cfg.credentials.key.as_deref(), Some("abc"));
    }

    #[test]
    fn test_load_from_path_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[control]\nlive_wait_time_ms = \"soon\"").unwrap();

        let err = load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("parse config"));
    }
}
