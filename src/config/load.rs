use crate::config::types::{
    Settings, TransferMode, default_image_formats, default_video_formats,
};
use anyhow::{Context, Result, bail};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

impl Settings {
    /// 從 dotenv 格式的檔案載入設定（不會修改行程的環境變數）
    pub fn load_from_dotenv(path: &Path) -> Result<Self> {
        let entries = read_env_file(path)?;
        Self::from_entries(&entries)
            .with_context(|| format!("Invalid settings in {}", path.display()))
    }

    /// Builds settings from already parsed `KEY=value` pairs with upper-case keys.
    pub fn from_entries(entries: &HashMap<String, String>) -> Result<Self> {
        let mut settings = Self::new(
            required_path(lookup(entries, "CAMERA_FOLDER"), "CAMERA_FOLDER")?,
            required_path(lookup(entries, "MAIN_PHOTOS_FOLDER"), "MAIN_PHOTOS_FOLDER")?,
            required_path(lookup(entries, "MAIN_VIDEOS_FOLDER"), "MAIN_VIDEOS_FOLDER")?,
        );

        settings.sqlite_database = lookup(entries, "SQLITE_DATABASE")
            .filter(|v| !v.eq_ignore_ascii_case("none"))
            .map(PathBuf::from);

        if let Some(value) = lookup(entries, "DRY_RUN") {
            settings.dry_run = parse_bool(value).context("DRY_RUN")?;
        }
        if let Some(value) = lookup(entries, "RECURSIVE") {
            settings.recursive = parse_bool(value).context("RECURSIVE")?;
        }
        if let Some(value) = lookup(entries, "TRANSFER_MODE") {
            settings.transfer_mode = TransferMode::parse(value)
                .with_context(|| format!("TRANSFER_MODE must be copy or move, got {value}"))?;
        }
        if let Some(value) = lookup(entries, "CAMERA_MODEL_SHORT_NAMES") {
            settings.camera_model_short_names = serde_json::from_str(value)
                .context("CAMERA_MODEL_SHORT_NAMES must be a JSON object")?;
        }

        settings.image_formats = match lookup(entries, "IMAGE_FORMATS") {
            Some(value) => parse_formats(value).context("IMAGE_FORMATS")?,
            None => default_image_formats(),
        };
        settings.video_formats = match lookup(entries, "VIDEO_FORMATS") {
            Some(value) => parse_formats(value).context("VIDEO_FORMATS")?,
            None => default_video_formats(),
        };

        Ok(settings)
    }
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let iter = dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;

    let mut entries = HashMap::new();
    for item in iter {
        let (key, value) =
            item.with_context(|| format!("Failed to parse settings from {}", path.display()))?;
        entries.insert(key.to_uppercase(), value);
    }
    Ok(entries)
}

fn lookup<'a>(entries: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    entries
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn required_path(value: Option<&str>, key: &str) -> Result<PathBuf> {
    match value {
        Some(v) => Ok(PathBuf::from(v)),
        None => bail!("Missing required setting {key}"),
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => bail!("not a boolean: {other}"),
    }
}

/// 接受 JSON 陣列或逗號分隔的清單，缺少的前導點會自動補上
fn parse_formats(value: &str) -> Result<HashSet<String>> {
    let raw: Vec<String> = if value.starts_with('[') {
        serde_json::from_str(value)?
    } else {
        value.split(',').map(str::to_string).collect()
    };

    Ok(raw
        .iter()
        .map(|ext| ext.trim())
        .filter(|ext| !ext.is_empty())
        .map(|ext| {
            if ext.starts_with('.') {
                ext.to_string()
            } else {
                format!(".{ext}")
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_entries() -> HashMap<String, String> {
        [
            ("CAMERA_FOLDER", "/camera"),
            ("MAIN_PHOTOS_FOLDER", "/photos"),
            ("MAIN_VIDEOS_FOLDER", "/videos"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_defaults_when_optional_keys_missing() {
        let settings = Settings::from_entries(&base_entries()).unwrap();
        assert!(!settings.dry_run);
        assert!(settings.recursive);
        assert_eq!(settings.transfer_mode, TransferMode::Copy);
        assert!(settings.sqlite_database.is_none());
        assert!(settings.camera_model_short_names.is_empty());
        assert_eq!(settings.image_formats, default_image_formats());
        assert_eq!(settings.video_formats, default_video_formats());
    }

    #[test]
    fn test_missing_required_key() {
        let mut entries = base_entries();
        entries.remove("MAIN_VIDEOS_FOLDER");
        let err = Settings::from_entries(&entries).unwrap_err();
        assert!(err.to_string().contains("MAIN_VIDEOS_FOLDER"));
    }

    #[test]
    fn test_parse_optional_keys() {
        let mut entries = base_entries();
        entries.insert("DRY_RUN".into(), "yes".into());
        entries.insert("SQLITE_DATABASE".into(), "/data/hashes.db".into());
        entries.insert("TRANSFER_MODE".into(), "Move".into());
        entries.insert("IMAGE_FORMATS".into(), "jpg, .NEF".into());
        entries.insert("VIDEO_FORMATS".into(), r#"[".mts"]"#.into());

        let settings = Settings::from_entries(&entries).unwrap();
        assert!(settings.dry_run);
        assert_eq!(settings.sqlite_database, Some(PathBuf::from("/data/hashes.db")));
        assert_eq!(settings.transfer_mode, TransferMode::Move);
        assert_eq!(
            settings.image_formats,
            HashSet::from([".jpg".to_string(), ".NEF".to_string()])
        );
        assert_eq!(settings.video_formats, HashSet::from([".mts".to_string()]));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut entries = base_entries();
        entries.insert("DRY_RUN".into(), "maybe".into());
        assert!(Settings::from_entries(&entries).is_err());

        let mut entries = base_entries();
        entries.insert("CAMERA_MODEL_SHORT_NAMES".into(), "S9700".into());
        assert!(Settings::from_entries(&entries).is_err());
    }
}
