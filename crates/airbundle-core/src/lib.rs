mod archive;
mod bundle;
mod transfer;

pub use archive::ArchiveType;
pub use bundle::{validate_bundle_id, ENTRY_FILE_NAME, MAX_ENTRY_SEARCH_DEPTH};
pub use transfer::{Extractor, Fetcher, InstallError};
