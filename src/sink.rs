use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Append-only log destination, opened once and held for the process
/// lifetime. Writes never truncate; restarting the monitor extends the
/// same file.
pub struct AppendSink {
    file: File,
    path: PathBuf,
}

impl AppendSink {
    pub fn open(path: &Path) -> io::Result<AppendSink> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(AppendSink {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&mut self, text: &str) -> io::Result<()> {
        self.file.write_all(text.as_bytes())
    }
}
