pub mod file_type;
pub mod load;
pub mod types;

pub use file_type::MediaKind;
pub use types::{
    DEFAULT_IMAGE_FORMATS, DEFAULT_VIDEO_FORMATS, Settings, TransferMode, default_image_formats,
    default_video_formats,
};
