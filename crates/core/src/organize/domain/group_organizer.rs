use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::organize::domain::photo_assignment::PhotoAssignment;
use crate::shared::constants::AVATAR_FILENAME;
use crate::shared::person::BucketLabel;

/// One copy instruction: `source` goes to `<bucket>/<filename>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub source: PathBuf,
    pub bucket: BucketLabel,
    pub filename: String,
}

/// Turns a photo assignment into a copy plan with collision-free names.
pub struct GroupOrganizer {
    reserved: Vec<String>,
}

impl GroupOrganizer {
    pub fn new() -> Self {
        Self {
            reserved: vec![AVATAR_FILENAME.to_string()],
        }
    }

    /// Placements bucket by bucket, in each bucket's photo order.
    ///
    /// A name already taken in the bucket gets `_<n>` inserted before its
    /// extension, with `n` counting up from 1 until the name is free.
    pub fn plan(&self, assignment: &PhotoAssignment) -> Vec<Placement> {
        let mut taken: HashMap<BucketLabel, HashSet<String>> = HashMap::new();
        let mut placements = Vec::new();

        for (bucket, photos) in assignment.buckets() {
            let names = taken
                .entry(bucket)
                .or_insert_with(|| self.reserved.iter().cloned().collect());
            for photo in photos {
                let filename = free_name(photo, names);
                names.insert(filename.clone());
                placements.push(Placement {
                    source: photo.clone(),
                    bucket,
                    filename,
                });
            }
        }

        placements
    }
}

impl Default for GroupOrganizer {
    fn default() -> Self {
        Self::new()
    }
}

fn free_name(photo: &Path, taken: &HashSet<String>) -> String {
    let base = photo
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo".to_string());
    if !taken.contains(&base) {
        return base;
    }

    let (stem, extension) = split_extension(&base);
    let mut n = 1;
    loop {
        let candidate = format!("{stem}_{n}{extension}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// `("img", ".jpg")` for `img.jpg`; dotfiles and bare names have no extension.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name, ""),
    }
}
