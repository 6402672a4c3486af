use std::path::PathBuf;

use anyhow::Context as _;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use uuid::Uuid;

use crate::domain::repository::ImageStore;
use crate::error::ApiError;

const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpeg", "jpg", "gif", "webp"];
const RECIPES_DIR: &str = "recipes";

/// Split a `data:image/<ext>;base64,<payload>` URI into its extension and decoded bytes.
pub fn decode_data_uri(data_uri: &str) -> Result<(&str, Vec<u8>), ApiError> {
    let invalid = || ApiError::validation("image", "must be a base64 data:image URI");
    let rest = data_uri.trim().strip_prefix("data:image/").ok_or_else(invalid)?;
    let (ext, payload) = rest.split_once(";base64,").ok_or_else(invalid)?;
    if !ALLOWED_EXTENSIONS.contains(&ext) {
        return Err(ApiError::validation(
            "image",
            "supported formats are png, jpeg, jpg, gif and webp",
        ));
    }
    let bytes = STANDARD.decode(payload).map_err(|_| invalid())?;
    if bytes.is_empty() {
        return Err(invalid());
    }
    Ok((ext, bytes))
}

/// Stores images under `<root>/recipes/` and serves them below `<url_prefix>recipes/`.
#[derive(Clone, Debug)]
pub struct FsImageStore {
    pub root: PathBuf,
    pub url_prefix: String,
}

impl ImageStore for FsImageStore {
    async fn save(&self, data_uri: &str) -> Result<String, ApiError> {
        let (ext, bytes) = decode_data_uri(data_uri)?;
        let dir = self.root.join(RECIPES_DIR);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("create media dir {}", dir.display()))?;

        let file_name = format!("{}.{ext}", Uuid::new_v4());
        let path = dir.join(&file_name);
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("write image {}", path.display()))?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "image stored");
        Ok(format!("{}{RECIPES_DIR}/{file_name}", self.url_prefix))
    }

    async fn remove(&self, reference: &str) -> Result<(), ApiError> {
        let Some(file_name) = reference
            .strip_prefix(self.url_prefix.as_str())
            .and_then(|rest| rest.strip_prefix(RECIPES_DIR))
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.is_empty() && *name != ".." && !name.contains(['/', '\\']))
        else {
            tracing::debug!(reference, "image not managed by this store");
            return Ok(());
        };
        let path = self.root.join(RECIPES_DIR).join(file_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "image removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("remove image {}", path.display()))
                .into()),
        }
    }
}
