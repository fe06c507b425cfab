use std::{fs, path::Path, time::Duration};

use thiserror::Error;
use tracing::warn;
use url::Url;

pub const DEFAULT_SETTINGS_FILE: &str = "reels.toml";

const SETTING_KEYS: &[&str] = &[
    "market_data_url",
    "index_id",
    "segment_id",
    "market_data_type",
    "reels_list_url",
    "reel_upload_url",
    "page_size",
    "celebration_secs",
    "refresh_after_upload",
    "request_timeout_secs",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub market_data_url: String,
    pub index_id: i64,
    pub segment_id: i64,
    pub market_data_type: i64,
    pub reels_list_url: String,
    pub reel_upload_url: String,
    pub page_size: usize,
    pub celebration: Duration,
    pub refresh_after_upload: bool,
    pub request_timeout: Option<Duration>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            market_data_url: "http://finx.choiceindia.com/api/md/Data/MostActiveByIndex".into(),
            index_id: 26012,
            segment_id: 1,
            market_data_type: 1,
            reels_list_url:
                "http://ec2-13-233-164-59.ap-south-1.compute.amazonaws.com/reels-latest".into(),
            reel_upload_url:
                "http://ec2-13-233-164-59.ap-south-1.compute.amazonaws.com/feature-reel".into(),
            page_size: 5,
            celebration: Duration::from_secs(5),
            refresh_after_upload: false,
            request_timeout: None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("setting '{key}' is not a valid http(s) url: {message}")]
    InvalidUrl { key: &'static str, message: String },
}

impl ClientSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        for (key, raw) in [
            ("market_data_url", &self.market_data_url),
            ("reels_list_url", &self.reels_list_url),
            ("reel_upload_url", &self.reel_upload_url),
        ] {
            let parsed = Url::parse(raw).map_err(|err| SettingsError::InvalidUrl {
                key,
                message: err.to_string(),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(SettingsError::InvalidUrl {
                    key,
                    message: format!("unsupported scheme '{}'", parsed.scheme()),
                });
            }
        }
        Ok(())
    }

    /// Applies one `key = value` pair. Unknown keys and unparsable values are
    /// ignored so the previous layer's value survives.
    pub fn apply(&mut self, key: &str, value: &str) {
        let value = value.trim();
        let applied = match key {
            "market_data_url" => {
                self.market_data_url = value.to_string();
                true
            }
            "reels_list_url" => {
                self.reels_list_url = value.to_string();
                true
            }
            "reel_upload_url" => {
                self.reel_upload_url = value.to_string();
                true
            }
            "index_id" => assign_parsed(&mut self.index_id, value),
            "segment_id" => assign_parsed(&mut self.segment_id, value),
            "market_data_type" => assign_parsed(&mut self.market_data_type, value),
            "page_size" => match value.parse::<usize>() {
                Ok(size) if size > 0 => {
                    self.page_size = size;
                    true
                }
                _ => false,
            },
            "celebration_secs" => match value.parse::<u64>() {
                Ok(secs) => {
                    self.celebration = Duration::from_secs(secs);
                    true
                }
                Err(_) => false,
            },
            "refresh_after_upload" => assign_parsed(&mut self.refresh_after_upload, value),
            "request_timeout_secs" => match value.parse::<u64>() {
                Ok(0) => {
                    self.request_timeout = None;
                    true
                }
                Ok(secs) => {
                    self.request_timeout = Some(Duration::from_secs(secs));
                    true
                }
                Err(_) => false,
            },
            _ => return,
        };

        if !applied {
            warn!(key, value, "ignoring unparsable client setting");
        }
    }

    fn apply_toml(&mut self, raw: &str) {
        let table = match raw.parse::<toml::Table>() {
            Ok(table) => table,
            Err(err) => {
                warn!("ignoring malformed settings file: {err}");
                return;
            }
        };

        for (key, value) in &table {
            let value = match value {
                toml::Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            self.apply(key, &value);
        }
    }

    /// `REELS_<KEY>` is read first, then `APP__<KEY>` which wins when both are set.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for key in SETTING_KEYS {
            let upper = key.to_ascii_uppercase();
            if let Some(v) = lookup(&format!("REELS_{upper}")) {
                self.apply(key, &v);
            }
            if let Some(v) = lookup(&format!("APP__{upper}")) {
                self.apply(key, &v);
            }
        }
    }
}

fn assign_parsed<T: std::str::FromStr>(slot: &mut T, value: &str) -> bool {
    match value.parse::<T>() {
        Ok(parsed) => {
            *slot = parsed;
            true
        }
        Err(_) => false,
    }
}

pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(DEFAULT_SETTINGS_FILE))
}

pub fn load_settings_from(path: &Path) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        settings.apply_toml(&raw);
    }
    settings.apply_env(|name| std::env::var(name).ok());

    settings
}
