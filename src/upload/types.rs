use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const FALLBACK_MIME: &str = "application/octet-stream";

static NEXT_ASSET_ID: AtomicU64 = AtomicU64::new(1);

/// Where an image came from. Only drops are checked for an image MIME type;
/// the picker's filter is a hint to the user, not a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetOrigin {
    Picker,
    Drop,
}

/// An image selected by the user, held until it is submitted.
///
/// Clones share the file contents.
#[derive(Clone)]
pub struct UploadedAsset {
    id: u64,
    file_name: String,
    mime: String,
    bytes: Arc<[u8]>,
}

impl UploadedAsset {
    /// Wrap raw file bytes. When `mime` is `None` (or empty) the type is
    /// guessed from the file name.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>, mime: Option<&str>) -> Self {
        let file_name = file_name.into();
        let mime = match mime.map(str::trim).filter(|m| !m.is_empty()) {
            Some(mime) => mime.to_string(),
            None => mime_guess::from_path(&file_name)
                .first_raw()
                .unwrap_or(FALLBACK_MIME)
                .to_string(),
        };
        Self {
            id: NEXT_ASSET_ID.fetch_add(1, Ordering::Relaxed),
            file_name,
            mime,
            bytes: bytes.into(),
        }
    }

    /// Process-unique identity, distinct for every selection even when the
    /// same file is picked twice.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// `data:` URL of the file contents, encoded on each call.
    pub fn preview(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64.encode(&self.bytes))
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

impl std::fmt::Debug for UploadedAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedAsset")
            .field("id", &self.id)
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("size", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_is_a_data_url_of_the_bytes() {
        let asset = UploadedAsset::new("cat.png", vec![0x89, b'P', b'N', b'G'], None);
        assert_eq!(asset.mime(), "image/png");
        assert!(asset.preview().starts_with("data:image/png;base64,"));
        assert!(asset.preview().ends_with("iVBORw=="));
        assert!(asset.is_image());
    }

    #[test]
    fn declared_mime_wins_over_extension() {
        let asset = UploadedAsset::new("upload.bin", vec![1, 2, 3], Some("image/webp"));
        assert_eq!(asset.mime(), "image/webp");
        assert!(asset.is_image());
    }

    #[test]
    fn unknown_extension_is_not_an_image() {
        let asset = UploadedAsset::new("notes", b"hello".to_vec(), Some(""));
        assert_eq!(asset.mime(), "application/octet-stream");
        assert!(!asset.is_image());
        assert_eq!(asset.size(), 5);
    }

    #[test]
    fn every_selection_gets_a_new_id() {
        let first = UploadedAsset::new("a.png", vec![1], None);
        let second = UploadedAsset::new("a.png", vec![1], None);
        assert_ne!(first.id(), second.id());
        assert_eq!(first.clone().id(), first.id());
    }

    #[test]
    fn clones_share_file_contents() {
        let asset = UploadedAsset::new("big.png", vec![7; 4096], None);
        let copy = asset.clone();
        assert_eq!(copy.bytes().as_ptr(), asset.bytes().as_ptr());
    }

    #[test]
    fn debug_output_omits_payload() {
        let asset = UploadedAsset::new("a.jpg", vec![0; 1024], None);
        let rendered = format!("{:?}", asset);
        assert!(rendered.contains("size: 1024"));
        assert!(!rendered.contains("base64"));
    }
}
