//! Concatenation of per-page PDFs

use crate::error::{AssemblyError, Result};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Page attributes a page may inherit from its ancestors
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Outcome of a merge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Pages written to the output
    pub pages: usize,
    /// Input positions that contributed pages
    pub merged: Vec<usize>,
    /// Input positions that were missing or unreadable
    pub skipped: Vec<usize>,
}

/// Append every page of `inputs`, in order, into one document at `output`
///
/// An input that is missing, corrupt or empty is logged and skipped. The call
/// only fails when nothing could be merged or the output cannot be written.
#[instrument(skip(inputs), fields(inputs = inputs.len()))]
pub fn merge(inputs: &[PathBuf], output: &Path) -> Result<MergeReport> {
    let mut report = MergeReport::default();
    let mut next_id = 1;
    let mut pages: Vec<(ObjectId, Object)> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for (position, path) in inputs.iter().enumerate() {
        let mut doc = match Document::load(path) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                report.skipped.push(position);
                continue;
            }
        };

        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if page_ids.is_empty() {
            warn!("Skipping {}: no pages", path.display());
            report.skipped.push(position);
            continue;
        }
        for id in page_ids {
            inherit_attributes(&mut doc, id);
        }

        doc.renumber_objects_with(next_id);
        next_id = doc.max_id + 1;

        for (_, id) in doc.get_pages() {
            if let Ok(page) = doc.get_object(id) {
                pages.push((id, page.clone()));
            }
        }
        objects.extend(doc.objects);
        report.merged.push(position);
        debug!("Queued {}", path.display());
    }

    if pages.is_empty() {
        return Err(AssemblyError::NoPages.into());
    }

    let mut out = Document::with_version("1.5");
    out.max_id = next_id;
    let pages_id = out.new_object_id();
    let page_ids: HashSet<ObjectId> = pages.iter().map(|(id, _)| *id).collect();

    for (id, object) in objects {
        if page_ids.contains(&id) {
            continue;
        }
        match type_name(&object) {
            Some(b"Catalog") | Some(b"Pages") | Some(b"Outlines") | Some(b"Outline") => {}
            _ => {
                out.objects.insert(id, object);
            }
        }
    }

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for (id, object) in pages {
        if let Object::Dictionary(mut dict) = object {
            dict.set("Parent", pages_id);
            out.objects.insert(id, Object::Dictionary(dict));
            kids.push(id.into());
        }
    }

    report.pages = kids.len();
    let count = kids.len() as i64;
    out.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = out.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    out.trailer.set("Root", catalog_id);

    out.renumber_objects();
    out.compress();
    out.save(output)?;

    info!(
        "Merged {} page(s) from {} file(s) into {}",
        report.pages,
        report.merged.len(),
        output.display()
    );
    Ok(report)
}

fn type_name(object: &Object) -> Option<&[u8]> {
    let dict: &Dictionary = match object {
        Object::Dictionary(dict) => dict,
        Object::Stream(stream) => &stream.dict,
        _ => return None,
    };
    dict.get(b"Type").and_then(Object::as_name).ok()
}

/// Copy inherited attributes onto the page so it survives losing its parent
fn inherit_attributes(doc: &mut Document, page_id: ObjectId) {
    let mut found: Vec<(&[u8], Object)> = Vec::new();
    if let Ok(page) = doc.get_dictionary(page_id) {
        for key in INHERITABLE {
            if page.get(key).is_err() {
                if let Some(value) = find_inherited(doc, page, key) {
                    found.push((key, value));
                }
            }
        }
    }
    if found.is_empty() {
        return;
    }
    if let Ok(page) = doc.get_object_mut(page_id).and_then(Object::as_dict_mut) {
        for (key, value) in found {
            page.set(key.to_vec(), value);
        }
    }
}

fn find_inherited(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    // depth guard against reference cycles
    for _ in 0..64 {
        let node = doc.get_dictionary(parent?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}
