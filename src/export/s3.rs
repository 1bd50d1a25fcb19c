//! S3 destination for exported tables.

use anyhow::{Context, Result, anyhow};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Uploads an exported table to S3 under `exports/`, optionally
/// gzip-compressing it first.
#[tracing::instrument(skip(client), fields(bucket, path = %path.display(), gzip))]
pub async fn upload_table(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    path: &Path,
    gzip: bool,
) -> Result<()> {
    let contents = std::fs::read(path)
        .with_context(|| format!("reading export {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("export path {} has no file name", path.display()))?;

    let (body, key) = if gzip {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&contents)?;
        let compressed = encoder.finish()?;
        (compressed, format!("exports/{file_name}.gz"))
    } else {
        (contents, format!("exports/{file_name}"))
    };

    client
        .put_object()
        .bucket(bucket)
        .key(&key)
        .body(body.into())
        .send()
        .await?;

    info!(bucket, key, "Export uploaded");
    Ok(())
}
