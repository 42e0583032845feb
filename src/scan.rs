//! Entry-point discovery over a compiled output directory.
//!
//! Walks the tree below a root directory, inspects every `.class` file and
//! collects the fully-qualified names of classes declaring
//! `public static void main(String[])`. A file that cannot be read or parsed
//! is simply not a match; only a root that exists and is not a directory is
//! reported as an error.

use anyhow::Result;
use ignore::WalkBuilder;
use memmap2::Mmap;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use thiserror::Error;

use crate::classfile;

pub const CLASS_FILE_SUFFIX: &str = ".class";

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("path {} exists but is not a directory", .0.display())]
    NotADirectory(PathBuf),
}

/// Finds all classes below `root` that declare a runnable entry point.
///
/// A missing root yields an empty set. Directories whose name starts with `.`
/// are pruned entirely, descendants included.
pub fn find_entry_point_classes(root: &Path) -> Result<BTreeSet<String>, ScanError> {
    if !root.exists() {
        return Ok(BTreeSet::new());
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let candidates = collect_class_files(root);
    let classes = candidates
        .par_iter()
        .filter_map(|path| match file_has_entry_point(path) {
            Ok(true) => derive_class_name(root, path),
            Ok(false) => None,
            Err(_) => None,
        })
        .collect();

    Ok(classes)
}

fn collect_class_files(root: &Path) -> Vec<PathBuf> {
    let (tx, rx) = mpsc::channel();

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .filter_entry(|entry| !is_pruned_directory(entry))
        .build_parallel();

    walker.run(|| {
        let tx = tx.clone();
        Box::new(move |entry| {
            if let Ok(entry) = entry {
                let path = entry.path();
                if path
                    .file_name()
                    .is_some_and(|n| n.to_string_lossy().ends_with(CLASS_FILE_SUFFIX))
                    && entry.file_type().is_some_and(|t| t.is_file())
                {
                    let _ = tx.send(path.to_path_buf());
                }
            }
            ignore::WalkState::Continue
        })
    });

    drop(tx);
    rx.iter().collect()
}

// The root itself is never pruned, even when its own name starts with ".".
fn is_pruned_directory(entry: &ignore::DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_some_and(|t| t.is_dir())
        && entry.file_name().to_string_lossy().starts_with('.')
}

fn file_has_entry_point(path: &Path) -> Result<bool> {
    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(classfile::has_main_method(&mmap[..])?)
}

fn derive_class_name(root: &Path, class_file: &Path) -> Option<String> {
    let relative = class_file.strip_prefix(root).ok()?;
    let raw = relative.to_string_lossy();
    let stem = raw.strip_suffix(CLASS_FILE_SUFFIX)?;
    Some(stem.replace(['/', '\\'], "."))
}
