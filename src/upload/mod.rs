mod loader;
mod types;

pub use loader::{load_from_path, LoadError};
pub use types::{AssetOrigin, UploadedAsset};
