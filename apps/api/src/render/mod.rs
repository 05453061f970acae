// Document rendering: block layout of the sanitized policy, then a WordprocessingML
// package written with `zip` and `quick-xml`. Rendering is CPU-only and small; it runs inline.

pub mod document;
pub mod docx;

use thiserror::Error;

pub use document::RenderedDocument;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("package write failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML write failed: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
