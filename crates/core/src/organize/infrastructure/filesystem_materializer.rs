use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::avatar::domain::avatar_selector::AvatarCrop;
use crate::avatar::domain::avatar_writer::AvatarWriter;
use crate::organize::domain::group_organizer::Placement;
use crate::shared::constants::AVATAR_FILENAME;
use crate::shared::person::{BucketLabel, PersonId};

#[derive(Error, Debug)]
pub enum MaterializeError {
    #[error("output directory {path} is not empty; clean it or choose another")]
    OutputNotEmpty { path: PathBuf },
    #[error("failed to inspect output directory {path}: {source}")]
    Inspect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to clear output directory {path}: {source}")]
    Clean {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create bucket {path}: {source}")]
    CreateBucket {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Counts from one materialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterializeSummary {
    pub photos_copied: usize,
    pub avatars_written: usize,
    pub avatar_failures: usize,
}

/// Executes a copy plan under an output root, one directory per bucket.
///
/// Sources are only ever read. Avatar failures are logged and skipped; a
/// failed copy stops the run. Person numbers are not stable between runs, so
/// an output root that already has entries is refused unless cleaning.
pub struct FilesystemMaterializer {
    output_root: PathBuf,
    clean: bool,
    avatar_writer: Box<dyn AvatarWriter>,
}

impl FilesystemMaterializer {
    pub fn new(output_root: PathBuf, avatar_writer: Box<dyn AvatarWriter>) -> Self {
        Self {
            output_root,
            clean: false,
            avatar_writer,
        }
    }

    /// Remove the output root before writing.
    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    pub fn bucket_dir(&self, bucket: BucketLabel) -> PathBuf {
        self.output_root.join(bucket.to_string())
    }

    /// Fails when the output root holds anything and cleaning is off.
    pub fn check_output(&self) -> Result<(), MaterializeError> {
        if self.clean || !self.output_root.exists() {
            return Ok(());
        }
        let mut entries =
            fs::read_dir(&self.output_root).map_err(|source| MaterializeError::Inspect {
                path: self.output_root.clone(),
                source,
            })?;
        if entries.next().is_some() {
            return Err(MaterializeError::OutputNotEmpty {
                path: self.output_root.clone(),
            });
        }
        Ok(())
    }

    pub fn materialize(
        &self,
        placements: &[Placement],
        avatars: &BTreeMap<PersonId, AvatarCrop>,
    ) -> Result<MaterializeSummary, MaterializeError> {
        self.check_output()?;
        if self.clean && self.output_root.exists() {
            log::info!("Clearing {}", self.output_root.display());
            fs::remove_dir_all(&self.output_root).map_err(|source| MaterializeError::Clean {
                path: self.output_root.clone(),
                source,
            })?;
        }

        let mut summary = MaterializeSummary::default();
        let mut created: HashSet<BucketLabel> = HashSet::new();

        for placement in placements {
            let dir = self.bucket_dir(placement.bucket);
            if created.insert(placement.bucket) {
                ensure_dir(&dir)?;
            }
            let dest = dir.join(&placement.filename);
            fs::copy(&placement.source, &dest).map_err(|source| MaterializeError::Copy {
                from: placement.source.clone(),
                to: dest.clone(),
                source,
            })?;
            log::debug!("Copied {} -> {}", placement.source.display(), dest.display());
            summary.photos_copied += 1;
        }

        for (person, crop) in avatars {
            let bucket = BucketLabel::Person(*person);
            let dir = self.bucket_dir(bucket);
            if created.insert(bucket) {
                ensure_dir(&dir)?;
            }
            let dest = dir.join(AVATAR_FILENAME);
            match self.avatar_writer.write(crop, &dest) {
                Ok(()) => summary.avatars_written += 1,
                Err(e) => {
                    log::warn!("Could not write avatar for {person}: {e}");
                    summary.avatar_failures += 1;
                }
            }
        }

        Ok(summary)
    }
}

fn ensure_dir(path: &Path) -> Result<(), MaterializeError> {
    fs::create_dir_all(path).map_err(|source| MaterializeError::CreateBucket {
        path: path.to_path_buf(),
        source,
    })
}
