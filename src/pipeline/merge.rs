//! Merge: ordered concatenation of conversion artifacts into one PDF.
//!
//! Every artifact is loaded, its object ids shifted past the previous
//! document's range, and its page objects re-parented under a fresh page
//! tree. Input order is preserved exactly: the merged document's pages are
//! the first artifact's pages, then the second's, and so on.
//!
//! No content-aware merging happens here — bookmarks and outlines of the
//! inputs are dropped, only pages survive.

use crate::error::DocmergeError;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

fn merge_err(detail: impl std::fmt::Display) -> DocmergeError {
    DocmergeError::MergeFailed {
        detail: detail.to_string(),
    }
}

/// Concatenate `inputs` (in order) into a single in-memory document.
pub fn merge_documents(inputs: &[impl AsRef<Path>]) -> Result<Document, DocmergeError> {
    if inputs.is_empty() {
        return Err(merge_err("no input documents"));
    }

    let mut max_id: u32 = 1;
    // Pages in input order; object ids are renumbered monotonically so the
    // order also survives the id space.
    let mut all_pages: Vec<(ObjectId, Object)> = Vec::new();
    let mut all_objects: BTreeMap<ObjectId, Object> = BTreeMap::new();
    let mut merged = Document::with_version("1.5");

    for input in inputs {
        let path = input.as_ref();
        let mut doc = Document::load(path)
            .map_err(|e| merge_err(format!("failed to load '{}': {e}", path.display())))?;

        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if page_ids.is_empty() {
            return Err(merge_err(format!("'{}' has no pages", path.display())));
        }
        debug!(path = %path.display(), pages = page_ids.len(), "collected pages");

        for page_id in page_ids {
            let page = doc
                .get_object(page_id)
                .map_err(|e| merge_err(format!("bad page object in '{}': {e}", path.display())))?
                .clone();
            all_pages.push((page_id, page));
        }

        // Carry everything except the structural nodes we rebuild below.
        for (object_id, object) in doc.objects {
            match object.type_name().unwrap_or("") {
                "Catalog" | "Pages" | "Page" | "Outlines" | "Outline" => {}
                _ => {
                    all_objects.insert(object_id, object);
                }
            }
        }
    }

    merged.objects.extend(all_objects);
    // Extending `objects` does not advance `max_id`; move it past every
    // renumbered input so the fresh Pages/Catalog ids cannot collide with
    // a carried object.
    merged.max_id = max_id - 1;

    // Fresh page tree: every page re-parented under one Pages node.
    let pages_id = merged.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(all_pages.len());
    for (page_id, page) in all_pages {
        let mut dict = page
            .as_dict()
            .map_err(|e| merge_err(format!("page {page_id:?} is not a dictionary: {e}")))?
            .clone();
        dict.set("Parent", Object::Reference(pages_id));
        merged.objects.insert(page_id, Object::Dictionary(dict));
        kids.push(Object::Reference(page_id));
    }

    let page_count = kids.len() as i64;
    merged.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(page_count)),
        ])),
    );

    let catalog_id = merged.new_object_id();
    merged.objects.insert(
        catalog_id,
        Object::Dictionary(Dictionary::from_iter([
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ])),
    );
    merged.trailer.set("Root", Object::Reference(catalog_id));

    merged.max_id = merged.objects.len() as u32;
    merged.renumber_objects();
    merged.compress();

    info!(inputs = inputs.len(), pages = page_count, "merged documents");
    Ok(merged)
}

/// Concatenate `inputs` and write the result to `output`.
pub fn merge_to_file(
    inputs: &[impl AsRef<Path>],
    output: &Path,
) -> Result<(), DocmergeError> {
    let mut merged = merge_documents(inputs)?;
    let mut file =
        std::fs::File::create(output).map_err(|e| DocmergeError::OutputWriteFailed {
            path: output.to_path_buf(),
            source: e,
        })?;
    merged
        .save_to(&mut file)
        .map_err(|e| merge_err(format!("failed to save '{}': {e}", output.display())))?;
    Ok(())
}
