use std::path::PathBuf;

use color_eyre::eyre::Context;
use uuid::Uuid;

use crate::{state::Lookup, Result};

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub folder: PathBuf,
    pub max_content_length: usize,
    /// Lower-cased, without the leading dot.
    pub allowed_extensions: Vec<String>,
}

impl UploadConfig {
    pub(crate) fn from_lookup(lookup: Lookup) -> Result<Self> {
        let folder = lookup("UPLOAD_FOLDER").unwrap_or_else(|| "uploads".to_string());

        let max_content_length = match lookup("MAX_CONTENT_LENGTH") {
            Some(v) => v
                .parse()
                .wrap_err_with(|| format!("MAX_CONTENT_LENGTH should be a byte count, got {v}"))?,
            None => 16 * 1024 * 1024,
        };

        let allowed_extensions = lookup("ALLOWED_EXTENSIONS")
            .unwrap_or_else(|| "png,jpg,jpeg".to_string())
            .split(',')
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        Ok(Self {
            folder: PathBuf::from(folder),
            max_content_length,
            allowed_extensions,
        })
    }

    pub fn allowed_file(&self, filename: &str) -> bool {
        let Some((_, extension)) = filename.rsplit_once('.') else {
            return false;
        };
        let extension = extension.to_lowercase();

        self.allowed_extensions.iter().any(|e| *e == extension)
    }

    /// Writes the upload under a collision-free name and returns its path.
    #[tracing::instrument(err, skip(self, contents), fields(bytes = contents.len()))]
    pub async fn save(&self, filename: &str, contents: &[u8]) -> Result<PathBuf> {
        let path = self
            .folder
            .join(format!("{}_{}", Uuid::new_v4(), secure_filename(filename)));

        tokio::fs::write(&path, contents)
            .await
            .wrap_err_with(|| format!("Couldn't write upload to {}", path.display()))?;

        Ok(path)
    }
}

/// Reduces a client supplied file name to something safe to put on disk.
///
/// Non-ASCII characters are dropped, path separators and whitespace become
/// `_`, anything outside `[A-Za-z0-9_.-]` is removed, and leading or trailing
/// dots and underscores are trimmed.
pub fn secure_filename(filename: &str) -> String {
    let spaced: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> UploadConfig {
        UploadConfig {
            folder: std::env::temp_dir(),
            max_content_length: 1024,
            allowed_extensions: vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()],
        }
    }

    #[test]
    fn extensions_are_checked_case_insensitively() {
        let config = config();

        assert!(config.allowed_file("fridge.png"));
        assert!(config.allowed_file("FRIDGE.JPG"));
        assert!(config.allowed_file("my.fridge.jpeg"));
        assert!(!config.allowed_file("fridge.gif"));
        assert!(!config.allowed_file("fridge"));
        assert!(!config.allowed_file("png"));
        assert!(!config.allowed_file(""));
    }

    #[test]
    fn filenames_are_made_safe() {
        assert_eq!(secure_filename("My Fridge.png"), "My_Fridge.png");
        assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("C:\\photos\\tomato.jpg"), "C_photos_tomato.jpg");
        assert_eq!(secure_filename("café au lait.jpg"), "caf_au_lait.jpg");
        assert_eq!(secure_filename("  .hidden.png "), "hidden.png");
        assert_eq!(secure_filename("rm -rf $(x).png"), "rm_-rf_x.png");
    }

    #[tokio::test]
    async fn save_prefixes_a_uuid() {
        let config = config();

        let path = config.save("Salmon Steak.png", b"not really a png").await.unwrap();

        let name = path.file_name().unwrap().to_str().unwrap().to_string();
        let (prefix, rest) = name.split_once('_').unwrap();
        assert!(Uuid::parse_str(prefix).is_ok());
        assert_eq!(rest, "Salmon_Steak.png");
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"not really a png");

        tokio::fs::remove_file(path).await.unwrap();
    }
}
