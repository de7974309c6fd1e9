//! HTTP handler for the upload-and-publish flow.
//!
//! A single request runs the whole pipeline: stream the multipart file field into a
//! scratch file, publish it to the configured image host, best-effort open the result
//! in the local browser, and answer with the public URL. Failure at any stage aborts
//! the remaining stages; the scratch file is removed on every exit path.

use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::instrument;
use url::Url;

use crate::AppState;
use crate::browser;
use crate::errors::{Error, Result};
use crate::scratch::ScratchFile;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Publicly reachable URL of the published asset
    pub url: Url,
    /// The caller-supplied display name the asset was published under
    pub name: String,
}

/// Accept a multipart upload (`filename` text field, `image` file field), publish it,
/// and return the public URL.
#[instrument(skip_all)]
pub async fn upload_image(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<UploadResponse>> {
    // The display name is plain metadata; it never becomes a filesystem path on its own.
    // Absent field means empty name, which is accepted and passed through as-is.
    let mut display_name = String::new();
    let mut scratch: Option<ScratchFile> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(|e| Error::MissingFile {
        message: format!("Failed to parse multipart data: {e}"),
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "filename" => {
                display_name = field.text().await.map_err(|e| Error::MissingFile {
                    message: format!("Failed to read filename field: {e}"),
                })?;
            }
            "image" => {
                let (guard, mut out) = ScratchFile::create(&state.config.scratch_dir, &display_name)
                    .await
                    .map_err(|source| Error::Storage {
                        operation: "create",
                        source,
                    })?;

                // Stream the field into the scratch file chunk by chunk; a failed or
                // oversized read drops the guard, which removes the partial file.
                while let Some(chunk) = field.chunk().await.map_err(|e| Error::MissingFile {
                    message: format!("Failed to read image field: {e}"),
                })? {
                    out.write_all(&chunk).await.map_err(|source| Error::Storage {
                        operation: "write",
                        source,
                    })?;
                }
                out.flush().await.map_err(|source| Error::Storage {
                    operation: "flush",
                    source,
                })?;
                drop(out);

                scratch = Some(guard);
            }
            other => {
                tracing::debug!(field = other, "Ignoring unknown multipart field");
            }
        }
    }

    let scratch = scratch.ok_or_else(|| Error::MissingFile {
        message: "Multipart form is missing the image file field".to_string(),
    })?;

    let url = state.host.publish(scratch.path(), &display_name).await?;

    if state.config.open_browser {
        browser::open_in_browser(&url);
    }

    tracing::info!(%url, name = %display_name, "Published upload");

    Ok(Json(UploadResponse {
        url,
        name: display_name,
    }))
    // `scratch` drops here and removes the file, success or failure upstream
}
