//! Content identity: stable, content-addressed document identifiers.
//!
//! Two uploads with byte-identical content always produce the same
//! [`ContentId`], regardless of how the transport labels them. The digest is
//! computed by streaming the bytes through SHA-256 in fixed-size chunks so
//! memory stays bounded on large documents; chunking never changes the
//! resulting digest.

use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::Result;
use crate::models::ContentId;

/// Chunk size used when streaming bytes into the hasher.
pub const HASH_CHUNK_SIZE: usize = 8192;

/// Compute the content identity of an in-memory document.
pub fn identify_bytes(data: &[u8]) -> ContentId {
    let mut hasher = Sha256::new();
    for chunk in data.chunks(HASH_CHUNK_SIZE) {
        hasher.update(chunk);
    }
    ContentId(format!("sha256:{}", hex::encode(hasher.finalize())))
}

/// Compute the content identity of a document read from an async byte
/// source, without buffering the whole document.
pub async fn identify_stream<R>(mut reader: R) -> Result<ContentId>
where
    R: AsyncRead + Unpin,
{
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; HASH_CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(ContentId(format!(
        "sha256:{}",
        hex::encode(hasher.finalize())
    )))
}
