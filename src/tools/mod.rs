mod ffprobe_info;
mod file_hasher;
mod file_scanner;
mod hash_store;
mod path_validator;
mod sqlite_hash_store;

pub use ffprobe_info::{VideoTags, get_video_tags};
pub use file_hasher::{ContentHash, calculate_file_hash, hash_reader};
pub use file_scanner::{FileGetter, OsFileGetter, SourceFile};
pub use hash_store::{HashStore, MemoryHashStore, open_hash_store};
pub use path_validator::ensure_directory_exists;
pub use sqlite_hash_store::SqliteHashStore;
