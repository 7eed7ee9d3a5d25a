//! In-memory PDFs for tests.

use lopdf::{
    Dictionary, Document, EncryptionState, EncryptionVersion, Object, Permissions, Stream,
    StringFormat,
};

use super::PdfDocument;

/// A PDF with `num_pages` pages. Page `n` carries a `/Label` entry of
/// `"{prefix}-{n}"` so tests can follow pages through merges and splits.
/// The MediaBox sits on the page tree root and is inherited by every page.
pub fn create_test_pdf(num_pages: u32, prefix: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut page_ids = Vec::new();
    for i in 0..num_pages {
        let content = format!("BT /F1 12 Tf 50 700 Td ({}-Page-{}) Tj ET", prefix, i + 1);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
            (
                "Label",
                Object::String(
                    format!("{}-{}", prefix, i + 1).into_bytes(),
                    StringFormat::Literal,
                ),
            ),
        ]);
        page_ids.push(doc.add_object(page));
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(num_pages as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
        ),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

pub fn load_test_pdf(name: &str, num_pages: u32, prefix: &str) -> PdfDocument {
    PdfDocument::from_bytes(name, &create_test_pdf(num_pages, prefix)).unwrap()
}

/// A document whose trailer declares encryption. Built without a save/load
/// round trip so the parser never tries to decrypt it.
pub fn encrypted_test_pdf(name: &str, num_pages: u32) -> PdfDocument {
    let mut doc = Document::load_mem(&create_test_pdf(num_pages, "E")).unwrap();
    let encrypt_id = doc.add_object(Dictionary::from_iter(vec![
        ("Filter", Object::Name(b"Standard".to_vec())),
        ("V", Object::Integer(2)),
        ("R", Object::Integer(3)),
    ]));
    doc.trailer.set("Encrypt", Object::Reference(encrypt_id));
    PdfDocument::from_document(name, doc)
}

/// Bytes of a really encrypted PDF (RC4, 128-bit key, empty user password),
/// so loading it goes through lopdf's decryption path.
pub fn encrypted_pdf_bytes(num_pages: u32) -> Vec<u8> {
    let mut doc = Document::load_mem(&create_test_pdf(num_pages, "E")).unwrap();
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(b"pdf-tool-test-id".to_vec(), StringFormat::Literal),
            Object::String(b"pdf-tool-test-id".to_vec(), StringFormat::Literal),
        ]),
    );

    let version = EncryptionVersion::V2 {
        document: &doc,
        owner_password: "owner",
        user_password: "",
        key_length: 128,
        permissions: Permissions::all(),
    };
    let state = EncryptionState::try_from(version).unwrap();
    doc.encrypt(&state).unwrap();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Page labels of a serialized PDF, in page order.
pub fn labels_of(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .into_values()
        .map(|id| match doc.get_dictionary(id).unwrap().get(b"Label") {
            Ok(Object::String(label, _)) => String::from_utf8_lossy(label).into_owned(),
            _ => String::new(),
        })
        .collect()
}
