//! Blob upload for images shared on the board.
//!
//! The blob server is content-addressed: a blob is PUT under its SHA-256
//! digest and the server answers with a descriptor holding the
//! retrievable URL.

use reqwest::Client;
use sha2::{Digest, Sha256};

/// Hex SHA-256 digest a blob is addressed by.
pub fn blob_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Upload a blob and return the URL it can be fetched from.
pub async fn upload_blob(server: &str, data: &[u8], mime_type: &str) -> anyhow::Result<String> {
    let digest = blob_digest(data);

    let client = Client::new();
    let response = client
        .put(format!("{}/upload/{}", server.trim_end_matches('/'), digest))
        .header("Content-Type", mime_type)
        .body(data.to_vec())
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("blob upload failed: {} - {}", status, body);
    }

    let descriptor: BlobDescriptor = response.json().await?;
    Ok(descriptor.url)
}

#[derive(serde::Deserialize)]
struct BlobDescriptor {
    url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_digest_known_value() {
        // sha256 of the empty input
        assert_eq!(
            blob_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_blob_digest_is_content_addressed() {
        assert_eq!(blob_digest(b"abc"), blob_digest(b"abc"));
        assert_ne!(blob_digest(b"abc"), blob_digest(b"abd"));
    }
}
