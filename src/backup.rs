//! Workspace backups. A bundle is a zip holding a snapshot of the gradebook
//! database plus a manifest; a bare sqlite file is accepted on import as a
//! legacy backup. Nothing replaces the live database until the incoming copy
//! has been opened and its student rows read back.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::db::{self, Gateway, DB_FILE_NAME};

pub const BUNDLE_FORMAT_V1: &str = "gradebook-workspace-v1";
pub const LEGACY_SQLITE_FORMAT: &str = "legacy-sqlite3";

const MANIFEST_ENTRY: &str = "manifest.json";
const DB_ENTRY: &str = "db/gradebook.sqlite3";
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    format: String,
    #[serde(default)]
    app_version: String,
    #[serde(default)]
    exported_at: String,
    #[serde(default)]
    student_count: usize,
    #[serde(default)]
    db_sha256: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: &'static str,
    pub student_count: usize,
    pub db_sha256: String,
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub bundle_format_detected: &'static str,
    pub student_count: usize,
}

/// Writes a bundle of the database behind `gateway` to `out_path`.
pub fn export_workspace_bundle(
    gateway: &Gateway,
    out_path: &Path,
) -> anyhow::Result<ExportSummary> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let snapshot = sibling(out_path, "snapshot");
    remove_stale(&snapshot)?;
    let written = gateway
        .snapshot_to(&snapshot)
        .context("failed to snapshot database")
        .and_then(|_| write_bundle(gateway, &snapshot, out_path));
    let _ = std::fs::remove_file(&snapshot);
    written
}

fn write_bundle(
    gateway: &Gateway,
    snapshot: &Path,
    out_path: &Path,
) -> anyhow::Result<ExportSummary> {
    let student_count = gateway.select_all()?.len();
    let db_sha256 = sha256_file(snapshot)?;
    let manifest = Manifest {
        format: BUNDLE_FORMAT_V1.to_string(),
        app_version: env!("CARGO_PKG_VERSION").to_string(),
        exported_at: db::format_timestamp(&chrono::Local::now().naive_local()),
        student_count,
        db_sha256: Some(db_sha256.clone()),
    };

    let out_file = File::create(out_path)
        .with_context(|| format!("failed to create {}", out_path.display()))?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(MANIFEST_ENTRY, opts)?;
    serde_json::to_writer_pretty(&mut zip, &manifest).context("failed to write manifest")?;

    zip.start_file(DB_ENTRY, opts)?;
    let mut db_file = File::open(snapshot)
        .with_context(|| format!("failed to open snapshot {}", snapshot.display()))?;
    std::io::copy(&mut db_file, &mut zip).context("failed to write database entry")?;

    zip.finish().context("failed to finalize bundle")?;
    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT_V1,
        student_count,
        db_sha256,
    })
}

/// Restores a bundle or bare sqlite file into `workspace`. The incoming
/// database is staged next to the live one and must open as a gradebook
/// before it is renamed into place; on any failure the live file is kept.
/// The caller must have closed its connection to the workspace database.
pub fn import_workspace_bundle(
    in_path: &Path,
    workspace: &Path,
) -> anyhow::Result<ImportSummary> {
    std::fs::create_dir_all(workspace)
        .with_context(|| format!("failed to create workspace {}", workspace.display()))?;
    let staged = workspace.join(format!("{DB_FILE_NAME}.importing"));
    remove_stale(&staged)?;

    let checked = stage(in_path, &staged).and_then(|format| {
        let student_count = Gateway::open_existing(&staged)?.select_all()?.len();
        Ok(ImportSummary {
            bundle_format_detected: format,
            student_count,
        })
    });
    let summary = match checked {
        Ok(v) => v,
        Err(e) => {
            let _ = std::fs::remove_file(&staged);
            return Err(e);
        }
    };

    let live = workspace.join(DB_FILE_NAME);
    std::fs::rename(&staged, &live)
        .with_context(|| format!("failed to move imported database to {}", live.display()))?;
    Ok(summary)
}

/// Copies the incoming database to `staged` and names the format it came in.
fn stage(in_path: &Path, staged: &Path) -> anyhow::Result<&'static str> {
    if !has_zip_magic(in_path)? {
        std::fs::copy(in_path, staged)
            .with_context(|| format!("failed to copy {}", in_path.display()))?;
        return Ok(LEGACY_SQLITE_FORMAT);
    }

    let file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.display()))?;
    let mut archive = ZipArchive::new(file).context("invalid zip archive")?;

    let manifest: Manifest = {
        let entry = archive
            .by_name(MANIFEST_ENTRY)
            .context("bundle missing manifest.json")?;
        serde_json::from_reader(entry).context("manifest.json is invalid")?
    };
    if manifest.format != BUNDLE_FORMAT_V1 {
        return Err(anyhow!("unsupported bundle format: {}", manifest.format));
    }
    tracing::debug!(
        app_version = %manifest.app_version,
        exported_at = %manifest.exported_at,
        students = manifest.student_count,
        "bundle manifest read"
    );

    {
        let mut entry = archive
            .by_name(DB_ENTRY)
            .with_context(|| format!("bundle missing {DB_ENTRY}"))?;
        let mut out = File::create(staged)
            .with_context(|| format!("failed to create {}", staged.display()))?;
        std::io::copy(&mut entry, &mut out).context("failed to extract database entry")?;
        out.flush()?;
    }

    if let Some(expected) = manifest.db_sha256 {
        let actual = sha256_file(staged)?;
        if actual != expected {
            return Err(anyhow!(
                "database checksum mismatch: expected {expected}, got {actual}"
            ));
        }
    }
    Ok(BUNDLE_FORMAT_V1)
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

fn remove_stale(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("failed to remove stale {}", path.display()))?;
    }
    Ok(())
}

fn sha256_file(path: &Path) -> anyhow::Result<String> {
    let mut f = File::open(path)
        .with_context(|| format!("failed to open {} for hashing", path.display()))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut f, &mut hasher).context("failed to hash database")?;
    Ok(format!("{:x}", hasher.finalize()))
}

fn has_zip_magic(path: &Path) -> anyhow::Result<bool> {
    let mut f =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut sig = [0u8; 4];
    let read = f.read(&mut sig).context("failed to read file signature")?;
    Ok(read == sig.len() && sig == ZIP_MAGIC)
}
