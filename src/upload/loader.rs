use super::types::UploadedAsset;
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{0} has no file name")]
    NoFileName(String),
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Read a file chosen in the picker or dropped onto the window.
pub fn load_from_path(path: &Path) -> Result<UploadedAsset, LoadError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| LoadError::NoFileName(path.display().to_string()))?;

    let bytes = fs::read(path).map_err(|source| LoadError::Read {
        path: path.display().to_string(),
        source,
    })?;

    tracing::debug!(file = %file_name, size = bytes.len(), "Loaded image from disk");
    Ok(UploadedAsset::new(file_name, bytes, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_bytes_and_guesses_mime() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("portrait.jpg");
        let mut file = fs::File::create(&path).expect("create");
        file.write_all(&[0xFF, 0xD8, 0xFF]).expect("write");

        let asset = load_from_path(&path).expect("load");
        assert_eq!(asset.file_name(), "portrait.jpg");
        assert_eq!(asset.mime(), "image/jpeg");
        assert_eq!(asset.bytes(), &[0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_from_path(&dir.path().join("gone.png")).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }
}
