use std::fs::Metadata;

/// `(device, inode, size, mtime)` captured at load time.
///
/// Coarse but sufficient: it detects both replace-in-place and
/// rename-and-swap reloads. Normalized to one tuple type regardless of
/// the platform's `st_mtim`/`st_mtimespec` naming split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub dev: u64,
    pub ino: u64,
    pub size: u64,
    pub mtime: (i64, i64),
}

impl FileStamp {
    pub fn capture(metadata: &Metadata) -> FileStamp {
        capture_platform(metadata)
    }
}

#[cfg(unix)]
fn capture_platform(metadata: &Metadata) -> FileStamp {
    use std::os::unix::fs::MetadataExt;
    FileStamp {
        dev: metadata.dev(),
        ino: metadata.ino(),
        size: metadata.size(),
        mtime: (metadata.mtime(), metadata.mtime_nsec()),
    }
}

#[cfg(not(unix))]
fn capture_platform(metadata: &Metadata) -> FileStamp {
    // Reduced fidelity off unix: no stable device/inode, so rename-and-swap
    // reloads are only detected via size/mtime.
    let modified = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok());
    FileStamp {
        dev: 0,
        ino: 0,
        size: metadata.len(),
        mtime: modified
            .map(|d| (d.as_secs() as i64, d.subsec_nanos() as i64))
            .unwrap_or((0, 0)),
    }
}
