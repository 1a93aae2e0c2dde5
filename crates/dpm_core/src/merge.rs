//! PDF concatenation built on `lopdf`.
//!
//! The merger rebuilds a single document from the pages of all inputs:
//! each source document's objects are renumbered past the running max id,
//! every page is re-parented under one surviving page tree node, and the
//! catalog is rebuilt to point at it. Page order equals input order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId};
use thiserror::Error;

/// Errors from merging PDFs.
#[derive(Error, Debug)]
pub enum MergeError {
    /// The input list was empty.
    #[error("Nothing to merge")]
    NoInputs,

    /// A source document could not be loaded.
    #[error("Failed to load {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    /// No page tree node was found in any input.
    #[error("No page tree found in the input documents")]
    MissingPages,

    /// No catalog was found in any input.
    #[error("No catalog found in the input documents")]
    MissingCatalog,

    /// Writing the merged document failed.
    #[error("Failed to save {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },
}

/// Result type for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;

/// A capability that concatenates PDF documents into one output file.
pub trait PdfMerger: Send + Sync {
    /// Concatenate `inputs` (in order) into a single PDF at `output`.
    ///
    /// The produced document contains all input pages in input order.
    /// Implementations must release any open file handles on all exit
    /// paths.
    fn merge(&self, inputs: &[PathBuf], output: &Path) -> MergeResult<()>;
}

/// Merger that rebuilds one document from the pages of all inputs.
pub struct LopdfMerger;

impl LopdfMerger {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LopdfMerger {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfMerger for LopdfMerger {
    fn merge(&self, inputs: &[PathBuf], output: &Path) -> MergeResult<()> {
        if inputs.is_empty() {
            return Err(MergeError::NoInputs);
        }

        let mut merged = Document::with_version("1.5");
        let mut max_id = 1u32;
        let mut pages_in_order: Vec<(ObjectId, Object)> = Vec::new();
        let mut carried_objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

        // Documents are loaded fully into memory; no handles stay open
        // past this loop.
        for path in inputs {
            let mut doc = Document::load(path).map_err(|e| MergeError::Load {
                path: path.clone(),
                source: e,
            })?;
            doc.renumber_objects_with(max_id);
            max_id = doc.max_id + 1;

            for (_, object_id) in doc.get_pages() {
                if let Ok(object) = doc.get_object(object_id) {
                    pages_in_order.push((object_id, object.to_owned()));
                }
            }
            carried_objects.extend(doc.objects);
        }

        // One catalog and one page tree node survive; pages are re-inserted
        // below with a fixed parent, outlines reference the source documents
        // and are dropped, everything else is carried over unchanged.
        let mut catalog: Option<(ObjectId, Dictionary)> = None;
        let mut page_tree: Option<(ObjectId, Dictionary)> = None;

        for (object_id, object) in carried_objects {
            match object_type(&object) {
                Some(b"Catalog") => {
                    if catalog.is_none() {
                        if let Ok(dict) = object.as_dict() {
                            catalog = Some((object_id, dict.clone()));
                        }
                    }
                }
                Some(b"Pages") => {
                    if let Ok(dict) = object.as_dict() {
                        match &mut page_tree {
                            // Keep inheritable attributes from every source
                            // tree that the first one did not define.
                            Some((_, existing)) => {
                                for (key, value) in dict.iter() {
                                    if !existing.has(key) {
                                        existing.set(key.clone(), value.clone());
                                    }
                                }
                            }
                            None => page_tree = Some((object_id, dict.clone())),
                        }
                    }
                }
                Some(b"Page") | Some(b"Outlines") | Some(b"Outline") => {}
                _ => {
                    merged.objects.insert(object_id, object);
                }
            }
        }

        let (pages_id, mut pages_dict) = page_tree.ok_or(MergeError::MissingPages)?;
        let (catalog_id, mut catalog_dict) = catalog.ok_or(MergeError::MissingCatalog)?;

        for (object_id, object) in &pages_in_order {
            if let Ok(dict) = object.as_dict() {
                let mut dict = dict.clone();
                dict.set("Parent", Object::Reference(pages_id));
                merged.objects.insert(*object_id, Object::Dictionary(dict));
            }
        }

        pages_dict.set("Count", pages_in_order.len() as i64);
        pages_dict.set(
            "Kids",
            pages_in_order
                .iter()
                .map(|(id, _)| Object::Reference(*id))
                .collect::<Vec<_>>(),
        );
        merged.objects.insert(pages_id, Object::Dictionary(pages_dict));

        catalog_dict.set("Pages", Object::Reference(pages_id));
        catalog_dict.remove(b"Outlines");
        merged
            .objects
            .insert(catalog_id, Object::Dictionary(catalog_dict));

        merged.trailer.set("Root", Object::Reference(catalog_id));
        merged.max_id = merged.objects.len() as u32;
        merged.renumber_objects();
        merged.compress();

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| MergeError::Save {
                    path: output.to_path_buf(),
                    source: e.into(),
                })?;
            }
        }

        merged.save(output).map_err(|e| MergeError::Save {
            path: output.to_path_buf(),
            source: e.into(),
        })?;

        tracing::debug!(
            "Merged {} document(s), {} page(s) into {}",
            inputs.len(),
            pages_in_order.len(),
            output.display()
        );
        Ok(())
    }
}

/// Read the `/Type` name of an object, if it is a dictionary carrying one.
fn object_type(object: &Object) -> Option<&[u8]> {
    object
        .as_dict()
        .ok()
        .and_then(|d| d.get(b"Type").ok())
        .and_then(|t| t.as_name().ok())
}
