use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

/// 影片容器中與拍攝相關的標籤
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoTags {
    pub creation_time: Option<NaiveDateTime>,
    pub model: Option<String>,
}

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct FormatInfo {
    tags: Option<HashMap<String, String>>,
}

#[derive(Deserialize)]
struct StreamInfo {
    codec_type: Option<String>,
    tags: Option<HashMap<String, String>>,
}

const MODEL_TAGS: [&str; 2] = ["com.apple.quicktime.model", "model"];

/// 使用 ffprobe 取得影片的建立時間與機型
pub fn get_video_tags(path: &Path) -> Result<VideoTags> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .with_context(|| format!("無法執行 ffprobe: {}", path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("ffprobe 執行失敗 {}: {stderr}", path.display());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_ffprobe_output(&stdout)
}

fn parse_ffprobe_output(json: &str) -> Result<VideoTags> {
    let probe: FfprobeOutput = serde_json::from_str(json).context("無法解析 ffprobe 輸出")?;

    let format_tags = probe.format.and_then(|f| f.tags).unwrap_or_default();
    // 容器沒有 creation_time 時，改用視訊串流的標籤
    let stream_tags = probe
        .streams
        .unwrap_or_default()
        .into_iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .and_then(|s| s.tags)
        .unwrap_or_default();

    let creation_time = format_tags
        .get("creation_time")
        .or_else(|| stream_tags.get("creation_time"))
        .and_then(|value| parse_creation_time(value));

    let model = MODEL_TAGS
        .iter()
        .find_map(|key| format_tags.get(*key))
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());

    Ok(VideoTags {
        creation_time,
        model,
    })
}

/// 解析 creation_time（例如 "2024-01-25T17:00:03.000000Z"）
fn parse_creation_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.naive_utc());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}
