//! Incremental reads of growing log files

use std::collections::HashMap;
use std::fs::{self, File, Metadata};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    offset: u64,
    inode: u64,
}

#[cfg(unix)]
fn inode(meta: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    meta.ino()
}

#[cfg(not(unix))]
fn inode(_meta: &Metadata) -> u64 {
    0
}

/// Remembers how far each file has been read.
///
/// A cursor only advances past complete lines, so a line still being written
/// is returned on a later call once its newline lands.
#[derive(Debug, Default)]
pub(crate) struct LogTailer {
    cursors: HashMap<PathBuf, Cursor>,
}

impl LogTailer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Lines appended to `path` since the previous call.
    ///
    /// Starts over from the beginning after truncation or rotation.
    pub(crate) fn read_new_lines(&mut self, path: &Path) -> Vec<String> {
        let Ok(meta) = fs::metadata(path) else {
            return Vec::new();
        };
        let current_inode = inode(&meta);

        let mut start = match self.cursors.get(path) {
            Some(cursor) if cursor.inode == current_inode => cursor.offset,
            _ => 0,
        };
        if meta.len() < start {
            start = 0;
        }

        let Some(bytes) = read_from(path, start) else {
            return Vec::new();
        };
        let complete = bytes
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |pos| pos + 1);

        self.cursors.insert(
            path.to_path_buf(),
            Cursor {
                offset: start + complete as u64,
                inode: current_inode,
            },
        );

        String::from_utf8_lossy(&bytes[..complete])
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub(crate) fn reset(&mut self, path: &Path) {
        self.cursors.remove(path);
    }
}

fn read_from(path: &Path, offset: u64) -> Option<Vec<u8>> {
    let mut file = File::open(path).ok()?;
    file.seek(SeekFrom::Start(offset)).ok()?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).ok()?;
    Some(bytes)
}
