//! Classpath-backed loading contexts.
//!
//! A [`ClasspathContext`] resolves classes and resources against an ordered
//! list of classpath entries, each either a directory of compiled classes or
//! a jar archive. Entry conversion is lenient: a path that cannot be resolved
//! is logged and omitted, so construction never fails and the worst case is a
//! context with zero entries.

use anyhow::{Context as _, Result};
use memmap2::Mmap;
use std::env;
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;
use url::Url;
use zip::ZipArchive;

use crate::context::{ContextId, LoadingContext, ResolvedClass};

pub const CLASSPATH_ENV: &str = "CLASSPATH";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ClasspathEntry {
    Directory(PathBuf),
    Archive(PathBuf),
}

pub struct ClasspathContext {
    id: ContextId,
    label: String,
    entries: Vec<ClasspathEntry>,
    parent: Option<Arc<dyn LoadingContext>>,
}

impl ClasspathContext {
    /// Builds a context from classpath entry paths. Entries that cannot be
    /// converted are warned about and dropped rather than failing the call.
    pub fn from_entries(
        label: impl Into<String>,
        entries: &[PathBuf],
        parent: Option<Arc<dyn LoadingContext>>,
    ) -> Self {
        let mut converted = Vec::with_capacity(entries.len());
        for entry in entries {
            match convert_entry(entry) {
                Ok(converted_entry) => converted.push(converted_entry),
                Err(err) => {
                    warn!(
                        "skipping unusable classpath entry {}: {err:#}",
                        entry.display()
                    );
                }
            }
        }

        Self {
            id: ContextId::next(),
            label: label.into(),
            entries: converted,
            parent,
        }
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn locate(&self, entry_path: &str) -> Option<String> {
        self.entries
            .iter()
            .find_map(|entry| locate_in_entry(entry, entry_path))
    }
}

impl LoadingContext for ClasspathContext {
    fn id(&self) -> ContextId {
        self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn parent(&self) -> Option<Arc<dyn LoadingContext>> {
        self.parent.clone()
    }

    fn resolve_class(&self, class_name: &str) -> Option<ResolvedClass> {
        let class_path = class_name_to_class_path(class_name);
        self.locate(&class_path).map(|location| ResolvedClass {
            class_name: class_name.to_string(),
            location,
        })
    }

    fn resource_locators(&self, resource: &str) -> Vec<String> {
        let mut locators: Vec<String> = self
            .entries
            .iter()
            .filter_map(|entry| locate_in_entry(entry, resource))
            .collect();
        if let Some(parent) = self.parent.as_ref() {
            locators.extend(parent.resource_locators(resource));
        }
        locators
    }
}

pub fn class_name_to_class_path(class_name: &str) -> String {
    format!("{}.class", class_name.replace('.', "/"))
}

pub fn split_path_list(raw: &str) -> Vec<PathBuf> {
    env::split_paths(raw)
        .filter(|p| !p.as_os_str().is_empty())
        .collect()
}

/// The process-default contexts, highest priority first: the `CLASSPATH`
/// environment variable, then the current working directory.
pub fn default_contexts() -> Vec<Arc<dyn LoadingContext>> {
    let mut contexts: Vec<Arc<dyn LoadingContext>> = Vec::new();

    if let Ok(raw) = env::var(CLASSPATH_ENV) {
        let entries = split_path_list(&raw);
        if !entries.is_empty() {
            contexts.push(Arc::new(ClasspathContext::from_entries(
                "env-classpath",
                &entries,
                None,
            )));
        }
    }

    if let Ok(cwd) = env::current_dir() {
        contexts.push(Arc::new(ClasspathContext::from_entries(
            "working-dir",
            &[cwd],
            None,
        )));
    }

    contexts
}

fn convert_entry(path: &Path) -> Result<ClasspathEntry> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("cannot resolve path: {}", path.display()))?;
    if canonical.is_dir() {
        Ok(ClasspathEntry::Directory(canonical))
    } else {
        Ok(ClasspathEntry::Archive(canonical))
    }
}

fn locate_in_entry(entry: &ClasspathEntry, entry_path: &str) -> Option<String> {
    match entry {
        ClasspathEntry::Directory(dir) => {
            let candidate = dir.join(entry_path);
            if candidate.is_file() {
                file_url(&candidate)
            } else {
                None
            }
        }
        ClasspathEntry::Archive(archive) => match archive_contains(archive, entry_path) {
            Ok(true) => archive_url(archive, entry_path),
            Ok(false) | Err(_) => None,
        },
    }
}

fn archive_contains(archive_path: &Path, entry_path: &str) -> Result<bool> {
    let file = File::open(archive_path)
        .with_context(|| format!("cannot open archive: {}", archive_path.display()))?;
    let mmap = unsafe {
        Mmap::map(&file).with_context(|| format!("mmap failed: {}", archive_path.display()))?
    };
    let mut archive = ZipArchive::new(Cursor::new(&mmap[..]))
        .with_context(|| format!("unreadable zip structure: {}", archive_path.display()))?;
    Ok(archive.by_name(entry_path).is_ok())
}

fn file_url(path: &Path) -> Option<String> {
    Url::from_file_path(path).ok().map(|url| url.to_string())
}

fn archive_url(archive_path: &Path, entry_path: &str) -> Option<String> {
    Url::from_file_path(archive_path)
        .ok()
        .map(|url| format!("jar:{url}!/{entry_path}"))
}
