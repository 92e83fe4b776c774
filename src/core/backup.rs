use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::utils::time::now;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use zip::ZipWriter;
use zip::write::FileOptions;

/// Where ledger backups go and how many are kept.
#[derive(Debug, Clone)]
pub struct BackupPolicy {
    pub folder: PathBuf,
    pub max_files: usize,
    pub compress: bool,
}

impl From<&Config> for BackupPolicy {
    fn from(cfg: &Config) -> Self {
        Self {
            folder: cfg.backup_path(),
            max_files: cfg.max_backup_files,
            compress: cfg.compress_backups,
        }
    }
}

/// Copy `src` into the backup folder as `<YYYY-MM-DD HH_MM_SS> <name>`,
/// optionally zipped, then delete the oldest backups over the limit.
/// Returns the path of the new backup.
pub fn backup_file(src: &Path, policy: &BackupPolicy) -> AppResult<PathBuf> {
    if !src.exists() {
        return Err(AppError::Backup(format!(
            "ledger not found: {}",
            src.display()
        )));
    }

    fs::create_dir_all(&policy.folder)?;

    let name = src
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| AppError::Backup(format!("not a file: {}", src.display())))?;
    let stamp = now().format("%Y-%m-%d %H_%M_%S").to_string();
    let dest = unused_backup_path(&policy.folder, &stamp, &name);

    fs::copy(src, &dest)?;

    let final_path = if policy.compress {
        let compressed = compress_backup(&dest)?;
        if let Err(e) = fs::remove_file(&dest) {
            warn!(path = %dest.display(), error = %e, "failed to remove uncompressed backup");
        }
        compressed
    } else {
        dest
    };

    info!(path = %final_path.display(), "ledger backup created");

    let removed = rotate_backups(&policy.folder, &name, policy.max_files)?;
    if removed > 0 {
        info!(removed, "old ledger backups deleted");
    }

    Ok(final_path)
}

/// `<stamp> <name>` in `folder`, or `<stamp>-NN <name>` when a backup from
/// the same second (plain or zipped) is already there.
fn unused_backup_path(folder: &Path, stamp: &str, name: &str) -> PathBuf {
    let taken = |p: &Path| p.exists() || p.with_extension("zip").exists();

    let first = folder.join(format!("{stamp} {name}"));
    if !taken(&first) {
        return first;
    }
    (1u32..)
        .map(|n| folder.join(format!("{stamp}-{n:02} {name}")))
        .find(|p| !taken(p))
        .unwrap_or(first)
}

/// Keep the `max_files` newest backups of `name`. The timestamp prefix makes
/// file names sort chronologically.
pub fn rotate_backups(folder: &Path, name: &str, max_files: usize) -> AppResult<usize> {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| name.to_string());

    let mut backups: Vec<PathBuf> = fs::read_dir(folder)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().contains(&stem))
                .unwrap_or(false)
        })
        .collect();

    backups.sort();
    backups.reverse();

    let mut removed = 0;
    for old in backups.into_iter().skip(max_files) {
        fs::remove_file(&old)?;
        removed += 1;
    }
    Ok(removed)
}

/// Compress a backup using .zip
fn compress_backup(path: &Path) -> AppResult<PathBuf> {
    let zip_path = path.with_extension("zip");
    let file = fs::File::create(&zip_path)?;
    let mut zip = ZipWriter::new(file);

    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let entry_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "ledger.xml".to_string());

    let mut f = fs::File::open(path)?;
    zip.start_file(entry_name, options)
        .map_err(std::io::Error::other)?;

    std::io::copy(&mut f, &mut zip)?;
    zip.finish().map_err(std::io::Error::other)?;

    Ok(zip_path)
}
