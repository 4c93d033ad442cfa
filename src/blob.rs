//! Content-addressed blob storage. A blob's id is the sha1 of its raw
//! bytes; the object file under `.gitlet/objects/` holds those bytes
//! zlib-compressed. Blobs are written on demand and never deleted.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use sha1::{Digest, Sha1};

use crate::repo::Repository;

/// Returns the 40-char lowercase hex sha1 of the given bytes.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Stores the bytes as a blob object and returns their hash. Storing the
/// same content twice is a no-op.
pub fn put(repo: &Repository, bytes: &[u8]) -> Result<String> {
    let hash = hash_bytes(bytes);
    let blob_path = repo.objects_dir().join(&hash);
    if blob_path.exists() {
        return Ok(hash);
    }

    let f = fs::File::create(&blob_path).with_context(|| format!("Create blob object {hash}"))?;
    let mut encoder = ZlibEncoder::new(f, Compression::default());
    encoder.write_all(bytes).context("Compress blob content")?;
    encoder.finish().context("Flush blob object")?;

    Ok(hash)
}

/// Reads a stored blob's bytes back out.
pub fn read(repo: &Repository, hash: &str) -> Result<Vec<u8>> {
    let blob_path = repo.objects_dir().join(hash);
    let f = fs::File::open(&blob_path).with_context(|| format!("Open blob object {hash}"))?;

    let mut bytes = Vec::new();
    ZlibDecoder::new(f)
        .read_to_end(&mut bytes)
        .with_context(|| format!("Decompress blob object {hash}"))?;

    Ok(bytes)
}

/// Writes the blob's bytes to the given working-tree path, replacing
/// whatever is there.
pub fn restore(repo: &Repository, hash: &str, dest: &Path) -> Result<()> {
    let bytes = read(repo, hash)?;
    fs::write(dest, bytes).with_context(|| format!("Restore '{}' from blob {hash}", dest.display()))
}
