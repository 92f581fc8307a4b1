//! JSON-lines persistence for generated folds.
//!
//! Folds for a given `k` live in `<dir>/<k>.json`, one [`KFoldIndices`] object
//! per line. Writes go to a sibling temp file that is renamed into place, so a
//! reader never observes a half-written fold file.

use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::constants::store::{DEFAULT_FOLD_DIR, FOLD_FILE_EXTENSION, TEMP_FILE_SUFFIX};
use crate::errors::FoldError;
use crate::kfold::{KFold, KFoldIndices};
use crate::splits::SplitSpec;

/// Directory-backed store of generated folds, keyed by fold count.
#[derive(Clone, Debug)]
pub struct FoldStore {
    dir: PathBuf,
}

impl Default for FoldStore {
    fn default() -> Self {
        Self::new(DEFAULT_FOLD_DIR)
    }
}

impl FoldStore {
    /// Store rooted at `dir`; the directory is created on first write.
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the fold file for `k` folds.
    pub fn path_for(&self, k: usize) -> PathBuf {
        self.dir.join(format!("{k}.{FOLD_FILE_EXTENSION}"))
    }

    /// Persist `folds` as the fold file for `k`, replacing any previous one.
    pub fn write(&self, k: usize, folds: &[KFoldIndices]) -> Result<PathBuf, FoldError> {
        if folds.len() != k {
            return Err(FoldError::FoldStore(format!(
                "expected {k} folds, got {}",
                folds.len()
            )));
        }
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(k);
        let tmp_path = path.with_extension(format!("{FOLD_FILE_EXTENSION}.{TEMP_FILE_SUFFIX}"));
        {
            let mut writer = BufWriter::new(fs::File::create(&tmp_path)?);
            for fold in folds {
                serde_json::to_writer(&mut writer, fold)?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp_path, &path)?;
        Ok(path)
    }

    /// Load the fold file for `k`, or `None` when it does not exist.
    ///
    /// Blank lines are skipped. Every other line must be a fold record, and
    /// the file must hold exactly `k` of them.
    pub fn read(&self, k: usize) -> Result<Option<Vec<KFoldIndices>>, FoldError> {
        let path = self.path_for(k);
        if !path.is_file() {
            return Ok(None);
        }
        let reader = BufReader::new(fs::File::open(&path)?);
        let mut folds = Vec::with_capacity(k);
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let fold: KFoldIndices = serde_json::from_str(&line).map_err(|err| {
                FoldError::FoldStore(format!(
                    "corrupt fold record at {}:{}: {err}",
                    path.display(),
                    line_no + 1
                ))
            })?;
            folds.push(fold);
        }
        if folds.len() != k {
            return Err(FoldError::FoldStore(format!(
                "{} holds {} folds, expected {k}",
                path.display(),
                folds.len()
            )));
        }
        Ok(Some(folds))
    }

    /// Read the folds for `splitter.k()`, generating and persisting them first
    /// if no fold file exists yet.
    ///
    /// A stored file is keyed by `k` alone. Reloaded folds must still
    /// partition `0..points.len()`, otherwise the file belongs to a different
    /// dataset and loading fails.
    pub fn load_or_generate<P, L, S>(
        &self,
        splitter: &S,
        points: &[P],
        labels: &[L],
        spec: &SplitSpec,
    ) -> Result<Vec<KFoldIndices>, FoldError>
    where
        S: KFold<P, L>,
    {
        let k = splitter.k();
        if let Some(folds) = self.read(k)? {
            info!(k, path = %self.path_for(k).display(), "reading folds");
            if points.len() != labels.len() {
                return Err(FoldError::LengthMismatch {
                    points: points.len(),
                    labels: labels.len(),
                });
            }
            for (idx, fold) in folds.iter().enumerate() {
                fold.ensure_partition(points.len()).map_err(|err| {
                    FoldError::FoldStore(format!(
                        "{} fold {} does not match the input: {err}",
                        self.path_for(k).display(),
                        idx + 1
                    ))
                })?;
            }
            return Ok(folds);
        }
        info!(k, path = %self.path_for(k).display(), "generating folds");
        let folds: Vec<KFoldIndices> = splitter.split(points, labels, spec)?.collect();
        self.write(k, &folds)?;
        Ok(folds)
    }
}
