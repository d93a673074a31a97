use crate::error::TransferError;
use crate::tools::ensure_directory_exists;
use log::warn;
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

pub trait OutputFileWriter {
    /// 寫入目的地；目的地已存在時回傳 `NamingCollision` 且不覆寫
    fn write(&self, source: &mut dyn Read, destination: &Path) -> Result<(), TransferError>;
}

/// 寫入本機檔案系統
#[derive(Debug, Default)]
pub struct OsOutputFileWriter;

impl OutputFileWriter for OsOutputFileWriter {
    fn write(&self, source: &mut dyn Read, destination: &Path) -> Result<(), TransferError> {
        let write_error = |err: io::Error| TransferError::WriteError {
            path: destination.to_path_buf(),
            source: err,
        };

        if let Some(parent) = destination.parent() {
            ensure_directory_exists(parent).map_err(write_error)?;
        }

        // create_new 讓「檢查是否存在」與「建立」成為同一個動作
        let file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(destination)
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(TransferError::NamingCollision {
                    path: destination.to_path_buf(),
                });
            }
            Err(e) => return Err(write_error(e)),
        };

        let mut writer = BufWriter::new(file);
        let copied = io::copy(source, &mut writer)
            .and_then(|_| writer.flush())
            .and_then(|()| writer.get_ref().sync_all());

        match copied {
            Ok(()) => Ok(()),
            Err(e) => {
                drop(writer);
                if let Err(remove_err) = fs::remove_file(destination) {
                    warn!(
                        "無法刪除未寫完的檔案 {}: {remove_err}",
                        destination.display()
                    );
                }
                Err(write_error(e))
            }
        }
    }
}
