//! Durable per-side message counter.
//!
//! One decimal value in one file, one file per side (the two sides must
//! never share storage). A missing or unreadable file reads as 0: that
//! is the first-run default and the recovery default, never an error —
//! the window search or a manual reset re-establishes sync from there.

use crate::error::Result;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct CounterStore {
    path: PathBuf,
    value: u64,
}

impl CounterStore {
    /// Open the store at `path`, loading the persisted value.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let value = load(&path);
        Self { path, value }
    }

    pub fn current(&self) -> u64 {
        self.value
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `next` and make it current.
    ///
    /// The value is on disk before this returns (temp file + rename in
    /// the same directory), so a crash can never leave a consumed
    /// counter unrecorded while its side effect stands.
    pub fn commit(&mut self, next: u64) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        {
            let mut f = fs::File::create(&tmp)?;
            f.write_all(next.to_string().as_bytes())?;
            f.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        self.value = next;
        Ok(())
    }

    /// Advance by one. Called after every successful send.
    pub fn advance(&mut self) -> Result<()> {
        self.commit(self.value + 1)
    }

    /// Operator reset to 0. Affects this side only.
    pub fn reset(&mut self) -> Result<()> {
        self.commit(0)
    }
}

fn load(path: &Path) -> u64 {
    match fs::read_to_string(path) {
        Ok(s) => s.trim().parse().unwrap_or(0),
        Err(_) => 0,
    }
}
