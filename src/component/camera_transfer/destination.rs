use super::metadata_reader::CaptureMetadata;
use crate::config::{MediaKind, Settings};
use chrono::{Datelike, NaiveDateTime};
use std::path::PathBuf;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H%M%S";

/// 照片檔名：時間戳記，之後依序接上相機縮寫與拍攝序號（缺少的部分直接省略）
#[must_use]
pub fn photo_file_name(
    timestamp: &NaiveDateTime,
    short_model: Option<&str>,
    counter: Option<&str>,
    extension: &str,
) -> String {
    let mut name = timestamp.format(TIMESTAMP_FORMAT).to_string();
    for segment in [short_model, counter].into_iter().flatten() {
        if !segment.is_empty() {
            name.push('_');
            name.push_str(segment);
        }
    }
    with_extension(name, extension)
}

#[must_use]
pub fn video_file_name(timestamp: &NaiveDateTime, extension: &str) -> String {
    let name = format!("{}_video", timestamp.format(TIMESTAMP_FORMAT));
    with_extension(name, extension)
}

fn with_extension(name: String, extension: &str) -> String {
    if extension.is_empty() {
        name
    } else {
        format!("{name}.{extension}")
    }
}

/// `<root>/<YYYY>/<MM>/<file name>`, or `None` for files that are neither photo nor video.
#[must_use]
pub fn destination_path(
    kind: MediaKind,
    metadata: &CaptureMetadata,
    extension: &str,
    settings: &Settings,
) -> Option<PathBuf> {
    let (root, file_name) = match kind {
        MediaKind::Photo => {
            let short_model = metadata
                .model
                .as_deref()
                .and_then(|model| settings.short_model_name(model));
            (
                &settings.main_photos_folder,
                photo_file_name(
                    &metadata.timestamp,
                    short_model,
                    metadata.counter.as_deref(),
                    extension,
                ),
            )
        }
        MediaKind::Video => (
            &settings.main_videos_folder,
            video_file_name(&metadata.timestamp, extension),
        ),
        MediaKind::Unknown => return None,
    };

    Some(
        root.join(format!("{:04}", metadata.timestamp.year()))
            .join(format!("{:02}", metadata.timestamp.month()))
            .join(file_name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::camera_transfer::metadata_reader::MetadataSource;
    use chrono::NaiveDate;
    use std::path::Path;

    fn settings() -> Settings {
        let mut settings = Settings::new("/camera", "/photos", "/videos");
        settings
            .camera_model_short_names
            .insert("COOLPIX S9700".to_string(), "S9700".to_string());
        settings
    }

    fn metadata(model: Option<&str>, counter: Option<&str>) -> CaptureMetadata {
        CaptureMetadata {
            timestamp: NaiveDate::from_ymd_opt(2022, 7, 27)
                .unwrap()
                .and_hms_opt(11, 54, 9)
                .unwrap(),
            model: model.map(str::to_string),
            counter: counter.map(str::to_string),
            source: MetadataSource::Embedded,
        }
    }

    #[test]
    fn test_photo_with_model_and_counter() {
        let path = destination_path(
            MediaKind::Photo,
            &metadata(Some("COOLPIX S9700"), Some("6228")),
            "JPG",
            &settings(),
        )
        .unwrap();
        assert_eq!(
            path,
            Path::new("/photos/2022/07/2022-07-27T115409_S9700_6228.JPG")
        );
    }

    #[test]
    fn test_unknown_model_is_omitted() {
        let path = destination_path(
            MediaKind::Photo,
            &metadata(Some("EOS 5D"), Some("6228")),
            "jpg",
            &settings(),
        )
        .unwrap();
        assert_eq!(path, Path::new("/photos/2022/07/2022-07-27T115409_6228.jpg"));
    }

    #[test]
    fn test_photo_without_model_or_counter() {
        let path =
            destination_path(MediaKind::Photo, &metadata(None, None), "png", &settings()).unwrap();
        assert_eq!(path, Path::new("/photos/2022/07/2022-07-27T115409.png"));
    }

    #[test]
    fn test_video_ignores_model_and_counter() {
        let path = destination_path(
            MediaKind::Video,
            &metadata(Some("COOLPIX S9700"), Some("0001")),
            "mp4",
            &settings(),
        )
        .unwrap();
        assert_eq!(path, Path::new("/videos/2022/07/2022-07-27T115409_video.mp4"));
    }

    #[test]
    fn test_unknown_kind_has_no_destination() {
        assert!(destination_path(MediaKind::Unknown, &metadata(None, None), "txt", &settings()).is_none());
    }

    #[test]
    fn test_file_name_is_deterministic() {
        let ts = metadata(None, None).timestamp;
        assert_eq!(
            photo_file_name(&ts, Some("S9700"), Some("6228"), "JPG"),
            photo_file_name(&ts, Some("S9700"), Some("6228"), "JPG")
        );
        assert_eq!(photo_file_name(&ts, Some(""), Some("1"), "JPG"), "2022-07-27T115409_1.JPG");
    }
}
