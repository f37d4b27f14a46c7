//! Newline-delimited text lists (URLs, probe URLs, payloads, results)

use anyhow::Context;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// A single UTF-8 list file, one item per line.
#[derive(Debug, Clone)]
pub struct LineStore {
    path: PathBuf,
}

impl LineStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read every non-blank line, trimmed.
    pub fn read(&self) -> anyhow::Result<Vec<String>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;

        Ok(content
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(|l| l.to_string())
            .collect())
    }

    /// Like [`LineStore::read`] but a missing or unreadable file is logged
    /// and treated as an empty list.
    pub fn read_or_empty(&self) -> Vec<String> {
        match self.read() {
            Ok(lines) => lines,
            Err(e) => {
                tracing::error!("Error reading {}: {:#}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Write `items`, truncating unless `append` is set.
    pub fn write<I, S>(&self, items: I, append: bool) -> anyhow::Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;

        let mut writer = BufWriter::new(file);
        let mut count = 0;
        for item in items {
            writeln!(writer, "{}", item.as_ref())?;
            count += 1;
        }
        writer.flush()?;

        Ok(count)
    }

    pub fn append<I, S>(&self, items: I) -> anyhow::Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.write(items, true)
    }

    /// Remove the file if present.
    pub fn reset(&self) -> anyhow::Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("removing {}", self.path.display()))?;
        }
        Ok(())
    }
}
