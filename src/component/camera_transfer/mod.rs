//! 相機檔案傳輸元件
//!
//! 將相機資料夾中的照片與影片依拍攝日期整理到 `<年>/<月>` 資料夾，
//! 以 BLAKE3 hash 去重並依拍攝資訊重新命名

mod destination;
mod main;
mod metadata_reader;
mod output_writer;

pub use destination::{destination_path, photo_file_name, video_file_name};
pub use main::{CameraTransfer, FileOutcome, TransferResult};
pub use metadata_reader::{
    CaptureMetadata, EmbeddedMetadata, EmbeddedMetadataReader, ExifMetadataReader,
    FfprobeMetadataReader, MetadataExtractor, MetadataSource, shot_counter,
};
pub use output_writer::{OsOutputFileWriter, OutputFileWriter};
