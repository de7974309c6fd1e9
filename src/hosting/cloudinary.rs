//! Cloudinary image host implementation
//!
//! Uploads go to `{api_base}/v1_1/{cloud_name}/image/upload` as a signed multipart
//! form. Requests are signed with SHA-256 over the sorted parameter string with the
//! API secret appended, per Cloudinary's authentication scheme.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use url::Url;

use crate::config::CloudinaryConfig;
use crate::hosting::{HostError, ImageHost, Result};

pub struct CloudinaryHost {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    api_base: Url,
    delivery_base: Url,
}

impl From<CloudinaryConfig> for CloudinaryHost {
    fn from(config: CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            cloud_name: config.cloud_name,
            api_key: config.api_key,
            api_secret: config.api_secret,
            api_base: config.api_base,
            delivery_base: config.delivery_base,
        }
    }
}

/// The subset of Cloudinary's upload response we care about.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<Url>,
}

impl CloudinaryHost {
    fn upload_endpoint(&self) -> String {
        format!(
            "{}/v1_1/{}/image/upload",
            self.api_base.as_str().trim_end_matches('/'),
            self.cloud_name
        )
    }

    /// Delivery URL for an asset, used when the upload response carries no URL.
    fn delivery_url(&self, name: &str) -> Result<Url> {
        let raw = format!(
            "{}/{}/image/upload/{}",
            self.delivery_base.as_str().trim_end_matches('/'),
            self.cloud_name,
            name
        );
        Url::parse(&raw).map_err(|e| HostError::InvalidResponse(format!("derived delivery URL is invalid: {e}")))
    }
}

/// Lowercase hex SHA-256 of the sorted parameter string with the secret appended.
fn signature(public_id: &str, timestamp: u64, api_secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("public_id={public_id}&timestamp={timestamp}{api_secret}"));
    hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
}

#[async_trait]
impl ImageHost for CloudinaryHost {
    async fn publish(&self, path: &Path, name: &str) -> Result<Url> {
        let data = tokio::fs::read(path).await.map_err(|source| HostError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let signature = signature(name, timestamp, &self.api_secret);

        let file_part = reqwest::multipart::Part::bytes(data).file_name(name.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("public_id", name.to_string())
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        tracing::debug!(%name, endpoint = %self.upload_endpoint(), "Uploading image to Cloudinary");

        let response = self
            .client
            .post(self.upload_endpoint())
            .multipart(form)
            .send()
            .await
            .map_err(|e| HostError::Api(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HostError::Api(format!("upload returned {status}: {body}")));
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| HostError::InvalidResponse(e.to_string()))?;

        match parsed.secure_url {
            Some(url) => Ok(url),
            None => self.delivery_url(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_host(api_base: &str) -> CloudinaryHost {
        CloudinaryHost::from(CloudinaryConfig {
            cloud_name: "testcloud".to_string(),
            api_key: "key".to_string(),
            api_secret: "topsecret".to_string(),
            api_base: Url::parse(api_base).unwrap(),
            delivery_base: Url::parse("https://res.cloudinary.com").unwrap(),
        })
    }

    async fn write_scratch(dir: &Path, bytes: &[u8]) -> std::path::PathBuf {
        let file_path = dir.join("upload");
        let mut file = tokio::fs::File::create(&file_path).await.unwrap();
        file.write_all(bytes).await.unwrap();
        file.flush().await.unwrap();
        file_path
    }

    #[test]
    fn test_signature_is_deterministic() {
        assert_eq!(
            signature("cat.png", 1_700_000_000, "topsecret"),
            "de093123f20833ebcc301e0146ac0923708e90112979d84527300c8a11e89cd8"
        );
    }

    #[tokio::test]
    async fn test_publish_returns_secure_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/testcloud/image/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "public_id": "cat.png",
                "secure_url": "https://hosting.example/cat.png"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file_path = write_scratch(dir.path(), b"\x89PNG....10").await;

        let host = test_host(&server.uri());
        let url = host.publish(&file_path, "cat.png").await.unwrap();

        assert_eq!(url.as_str(), "https://hosting.example/cat.png");
    }

    #[tokio::test]
    async fn test_publish_derives_url_when_response_has_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/testcloud/image/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "public_id": "cat.png"
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file_path = write_scratch(dir.path(), b"bytes").await;

        let host = test_host(&server.uri());
        let url = host.publish(&file_path, "cat.png").await.unwrap();

        assert_eq!(url.as_str(), "https://res.cloudinary.com/testcloud/image/upload/cat.png");
    }

    #[tokio::test]
    async fn test_publish_failure_leaves_scratch_file_alone() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/testcloud/image/upload"))
            .respond_with(ResponseTemplate::new(401).set_body_string("auth denied"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file_path = write_scratch(dir.path(), b"bytes").await;

        let host = test_host(&server.uri());
        let error = host.publish(&file_path, "cat.png").await.unwrap_err();

        match error {
            HostError::Api(message) => assert!(message.contains("401"), "unexpected message: {message}"),
            other => panic!("Expected Api error, got {other:?}"),
        }

        // publish never deletes or modifies the scratch file
        assert_eq!(tokio::fs::read(&file_path).await.unwrap(), b"bytes");
    }

    #[tokio::test]
    async fn test_publish_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let host = test_host("http://127.0.0.1:1");

        let error = host
            .publish(&dir.path().join("never-written"), "cat.png")
            .await
            .unwrap_err();

        assert!(matches!(error, HostError::Read { .. }));
    }
}
