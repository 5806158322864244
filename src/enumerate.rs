//! Frame discovery and cross-category alignment.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ReelConfig;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ReelError, ReelResult};

/// Naming scheme `{dir}/{prefix}_{index:03}.{extension}` for one source category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FramePattern {
    pub dir: PathBuf,
    pub prefix: String,
    pub extension: String,
}

impl FramePattern {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, ext: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            extension: ext.into(),
        }
    }

    pub fn file_name(&self, index: FrameIndex) -> String {
        format!("{}_{:03}.{}", self.prefix, index.0, self.extension)
    }

    pub fn path_for(&self, root: &Path, index: FrameIndex) -> PathBuf {
        root.join(&self.dir).join(self.file_name(index))
    }
}

/// How the three independently discovered file lists are paired into frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentPolicy {
    /// Keep only indices present in every category.
    #[default]
    ByIndex,
    /// Pair the n-th existing file of each category regardless of its index. A gap in one
    /// category shifts every later pairing.
    Positional,
    /// Any missing file aborts the run.
    Strict,
}

/// Existing files of one category, in increasing index order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryFiles {
    pub name: &'static str,
    pub entries: Vec<(FrameIndex, PathBuf)>,
}

impl CategoryFiles {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn indices(&self) -> BTreeSet<FrameIndex> {
        self.entries.iter().map(|(i, _)| *i).collect()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|(_, p)| p.as_path())
    }
}

/// Source paths composited into one output frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameTriple {
    /// Drives the output file name and the time label.
    pub index: FrameIndex,
    pub config: PathBuf,
    pub stress: PathBuf,
    pub temperature: PathBuf,
}

/// Result of discovery plus alignment.
#[derive(Clone, Debug, Default)]
pub struct Enumeration {
    pub config: CategoryFiles,
    pub stress: CategoryFiles,
    pub temperature: CategoryFiles,
    pub frames: Vec<FrameTriple>,
    /// Indices below `frame_count` missing from at least one category.
    pub skipped: Vec<FrameIndex>,
}

/// List the files of `pattern` that exist for indices `0..frame_count`.
pub fn discover(
    name: &'static str,
    root: &Path,
    pattern: &FramePattern,
    frame_count: u64,
) -> CategoryFiles {
    let mut entries = Vec::new();
    for i in 0..frame_count {
        let index = FrameIndex(i);
        let path = pattern.path_for(root, index);
        if path.is_file() {
            entries.push((index, path));
        } else {
            tracing::debug!(category = name, index = i, path = %path.display(), "frame file missing");
        }
    }
    CategoryFiles { name, entries }
}

/// Discover all three categories under `cfg.root` and align them per `cfg.input.alignment`.
pub fn enumerate_frames(cfg: &ReelConfig) -> ReelResult<Enumeration> {
    let root = cfg.root.as_path();
    let input = &cfg.input;
    let config = discover("config", root, &input.config, input.frame_count);
    let stress = discover("stress", root, &input.stress, input.frame_count);
    let temperature = discover("temperature", root, &input.temperature, input.frame_count);

    tracing::info!(
        config = config.len(),
        stress = stress.len(),
        temperature = temperature.len(),
        "discovered source frames"
    );

    let (frames, skipped) = align(
        [&config, &stress, &temperature],
        input.frame_count,
        input.alignment,
    )?;

    Ok(Enumeration {
        config,
        stress,
        temperature,
        frames,
        skipped,
    })
}

/// Pair `[config, stress, temperature]` file lists into frame triples.
pub fn align(
    categories: [&CategoryFiles; 3],
    frame_count: u64,
    policy: AlignmentPolicy,
) -> ReelResult<(Vec<FrameTriple>, Vec<FrameIndex>)> {
    let [config, stress, temperature] = categories;
    match policy {
        AlignmentPolicy::ByIndex | AlignmentPolicy::Strict => {
            let present: Vec<BTreeSet<FrameIndex>> =
                categories.iter().map(|c| c.indices()).collect();
            let mut frames = Vec::new();
            let mut skipped = Vec::new();
            for i in 0..frame_count {
                let index = FrameIndex(i);
                let missing = categories
                    .iter()
                    .zip(&present)
                    .find(|(_, set)| !set.contains(&index));
                if let Some((category, _)) = missing {
                    if policy == AlignmentPolicy::Strict {
                        return Err(ReelError::missing_frame(category.name, index));
                    }
                    skipped.push(index);
                    continue;
                }
                frames.push(FrameTriple {
                    index,
                    config: path_at(config, index)?,
                    stress: path_at(stress, index)?,
                    temperature: path_at(temperature, index)?,
                });
            }
            if !skipped.is_empty() {
                tracing::warn!(
                    skipped = skipped.len(),
                    first = skipped[0].0,
                    "skipping frame indices missing from at least one category"
                );
            }
            Ok((frames, skipped))
        }
        AlignmentPolicy::Positional => {
            let n = config.len().min(stress.len()).min(temperature.len());
            let longest = config.len().max(stress.len()).max(temperature.len());
            if n != longest || categories.iter().any(|c| !is_dense(c)) {
                tracing::warn!(
                    config = config.len(),
                    stress = stress.len(),
                    temperature = temperature.len(),
                    "positional alignment over lists with gaps; later frames may pair images \
                     from different time steps"
                );
            }
            let frames = config
                .paths()
                .zip(stress.paths())
                .zip(temperature.paths())
                .enumerate()
                .map(|(pos, ((c, s), t))| FrameTriple {
                    index: FrameIndex(pos as u64),
                    config: c.to_path_buf(),
                    stress: s.to_path_buf(),
                    temperature: t.to_path_buf(),
                })
                .collect();
            Ok((frames, missing_indices(categories, frame_count)))
        }
    }
}

/// Indices below `frame_count` absent from at least one category.
fn missing_indices(categories: [&CategoryFiles; 3], frame_count: u64) -> Vec<FrameIndex> {
    let present: Vec<BTreeSet<FrameIndex>> = categories.iter().map(|c| c.indices()).collect();
    (0..frame_count)
        .map(FrameIndex)
        .filter(|i| present.iter().any(|set| !set.contains(i)))
        .collect()
}

fn path_at(files: &CategoryFiles, index: FrameIndex) -> ReelResult<PathBuf> {
    files
        .entries
        .binary_search_by_key(&index, |(i, _)| *i)
        .map(|pos| files.entries[pos].1.clone())
        .map_err(|_| ReelError::missing_frame(files.name, index))
}

fn is_dense(files: &CategoryFiles) -> bool {
    files
        .entries
        .iter()
        .enumerate()
        .all(|(pos, (i, _))| i.0 == pos as u64)
}
