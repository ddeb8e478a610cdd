//! Directory-backed template collection.

use super::Template;
use crate::image::io::load_masked_image;
use crate::trace::{trace_event, trace_span, trace_warn};
use std::collections::btree_map::{self, BTreeMap};
use std::fs;
use std::path::{Path, PathBuf};

/// File extension (case-insensitive) picked up by [`load_templates`].
pub const TEMPLATE_EXTENSION: &str = "png";

/// Templates keyed by label.
///
/// Iteration runs in ascending label order; the matcher resolves score ties in
/// favor of the template it meets first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TemplateCollection {
    templates: BTreeMap<String, Template>,
}

impl TemplateCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a template, returning the one it replaced under the same label.
    pub fn insert(&mut self, template: Template) -> Option<Template> {
        self.templates.insert(template.label().to_owned(), template)
    }

    /// Looks up a template by label.
    pub fn get(&self, label: &str) -> Option<&Template> {
        self.templates.get(label)
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns `true` when no template is loaded.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Labels in iteration order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Templates in iteration order.
    pub fn iter(&self) -> btree_map::Values<'_, String, Template> {
        self.templates.values()
    }
}

impl FromIterator<Template> for TemplateCollection {
    fn from_iter<I: IntoIterator<Item = Template>>(iter: I) -> Self {
        let mut collection = Self::new();
        for template in iter {
            collection.insert(template);
        }
        collection
    }
}

impl<'a> IntoIterator for &'a TemplateCollection {
    type Item = &'a Template;
    type IntoIter = btree_map::Values<'a, String, Template>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Loads every `.png` file directly inside `dir` as a template.
///
/// The label is the file stem. A missing or unreadable directory yields an
/// empty collection; files that fail to decode are skipped. Files are visited
/// in path order so a label collision always resolves the same way.
pub fn load_templates<P: AsRef<Path>>(dir: P) -> TemplateCollection {
    let dir = dir.as_ref();
    let _span = trace_span!("load_templates").entered();
    let mut collection = TemplateCollection::new();

    for path in image_files(dir, TEMPLATE_EXTENSION) {
        let Some(label) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let template = load_masked_image(&path)
            .and_then(|(img, mask)| Template::from_image(label, img, mask));
        match template {
            Ok(template) => {
                if collection.insert(template).is_some() {
                    trace_warn!("template_replaced", label = label);
                }
            }
            Err(err) => {
                trace_warn!(
                    "template_skipped",
                    label = label,
                    reason = err.to_string().as_str()
                );
            }
        }
    }

    trace_event!("templates_loaded", count = collection.len());
    collection
}

/// Lists regular files in `dir` whose extension matches `ext`, sorted by path.
///
/// Returns an empty list when the directory cannot be read.
pub(crate) fn image_files(dir: &Path, ext: &str) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            trace_warn!(
                "directory_unreadable",
                path = dir.display().to_string().as_str(),
                reason = err.to_string().as_str()
            );
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(ext))
        })
        .collect();
    files.sort();
    files
}
