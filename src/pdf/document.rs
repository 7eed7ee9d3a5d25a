use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::error::PdfToolError;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Deepest page tree we follow when resolving inherited attributes.
const MAX_TREE_DEPTH: usize = 64;

pub const PDF_SUFFIX: &str = ".pdf";

/// A loaded source PDF. Cheap to share: pages handed out keep the parsed
/// document alive, so they can outlive the `PdfDocument` they came from.
pub struct PdfDocument {
    doc: Arc<Document>,
    name: String,
    page_ids: Vec<ObjectId>,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PdfToolError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(name, &bytes)
    }

    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self, PdfToolError> {
        let name = name.into();
        if bytes.is_empty() {
            return Err(PdfToolError::MissingOrEmptyInput(name));
        }

        let doc = Document::load_mem(bytes).map_err(|e| PdfToolError::InvalidPdf {
            name: name.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self::from_document(name, doc))
    }

    pub fn from_document(name: impl Into<String>, doc: Document) -> Self {
        // get_pages is keyed by page number, so the ids come out in page order
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        let name = name.into();
        debug!("Loaded {} with {} pages", name, page_ids.len());
        PdfDocument {
            doc: Arc::new(doc),
            name,
            page_ids,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted() || self.doc.trailer.has(b"Encrypt")
    }

    /// Page at a 0-based index.
    pub fn page_at(&self, index: usize) -> Option<PdfPage> {
        self.page_ids.get(index).map(|&id| PdfPage {
            source: Arc::clone(&self.doc),
            id,
        })
    }
}

/// Reference to one page inside a loaded document.
#[derive(Clone)]
pub struct PdfPage {
    source: Arc<Document>,
    id: ObjectId,
}

impl std::fmt::Debug for PdfPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfPage").field("id", &self.id).finish()
    }
}

/// Build a new PDF holding `pages` in the given order.
///
/// Pages may come from different source documents and may repeat; every
/// entry gets its own page object in the output. Each source document's
/// objects are imported once with renumbered ids, and whatever the new page
/// tree does not reach is pruned before saving.
pub fn write_pages(pages: &[PdfPage]) -> Result<Vec<u8>, PdfToolError> {
    if pages.is_empty() {
        return Err(PdfToolError::Serialize("no pages to write".into()));
    }

    let mut out = Document::with_version("1.7");
    let pages_id = out.new_object_id();

    let mut imported: Vec<(Arc<Document>, u32)> = Vec::new();
    let mut kids = Vec::with_capacity(pages.len());

    for page in pages {
        let known = imported
            .iter()
            .find(|(doc, _)| Arc::ptr_eq(doc, &page.source))
            .map(|(_, offset)| *offset);

        let offset = match known {
            Some(offset) => offset,
            None => {
                let offset = import_objects(&mut out, &page.source);
                imported.push((Arc::clone(&page.source), offset));
                offset
            }
        };

        let mut dict = flatten_page(&page.source, page.id)?;
        remap_dict_refs(&mut dict, offset);
        dict.set("Parent", Object::Reference(pages_id));
        kids.push(Object::Reference(out.add_object(dict)));
    }

    let count = kids.len() as i64;
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(count)),
    ]);
    out.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = out.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    out.trailer.set("Root", Object::Reference(catalog_id));

    out.prune_objects();
    out.compress();

    let mut buffer = Vec::new();
    out.save_to(&mut buffer)
        .map_err(|e| PdfToolError::Serialize(e.to_string()))?;

    debug!(
        "Wrote {} pages from {} source document(s), {} bytes",
        count,
        imported.len(),
        buffer.len()
    );

    Ok(buffer)
}

/// Copy every object of `source` into `out`, shifted past `out`'s current
/// ids. Returns the shift applied.
fn import_objects(out: &mut Document, source: &Document) -> u32 {
    let offset = out.max_id;
    let source_max = source
        .objects
        .keys()
        .map(|&(num, _)| num)
        .max()
        .unwrap_or(0)
        .max(source.max_id);

    for (&(num, generation), object) in &source.objects {
        out.objects
            .insert((num + offset, generation), remap_refs(object.clone(), offset));
    }
    out.max_id = offset + source_max;
    offset
}

/// The page dictionary with inherited attributes copied down, so the page
/// survives being re-parented.
fn flatten_page(source: &Document, page_id: ObjectId) -> Result<Dictionary, PdfToolError> {
    let mut page = source
        .get_dictionary(page_id)
        .map_err(|e| PdfToolError::Serialize(format!("page {:?}: {}", page_id, e)))?
        .clone();

    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(parent_id) = parent {
        if depth >= MAX_TREE_DEPTH {
            break;
        }
        depth += 1;

        let Ok(node) = source.get_dictionary(parent_id) else {
            break;
        };
        for key in INHERITABLE_KEYS {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key.to_vec(), value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    Ok(page)
}

fn remap_refs(obj: Object, offset: u32) -> Object {
    match obj {
        Object::Reference((num, generation)) => Object::Reference((num + offset, generation)),
        Object::Array(items) => Object::Array(
            items
                .into_iter()
                .map(|item| remap_refs(item, offset))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            remap_dict_refs(&mut dict, offset);
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            remap_dict_refs(&mut stream.dict, offset);
            Object::Stream(stream)
        }
        other => other,
    }
}

fn remap_dict_refs(dict: &mut Dictionary, offset: u32) {
    for (_, value) in dict.iter_mut() {
        *value = remap_refs(std::mem::replace(value, Object::Null), offset);
    }
}
