//! PDF text extraction.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which is CPU-bound
//! and not async-aware. [`extract_document`] moves the work onto tokio's
//! blocking pool so the HTTP service keeps answering status polls while a
//! large PDF is being read.
//!
//! Every failure (library not loadable, unreadable file, not a PDF, corrupt
//! xref, worker panic) comes back as an [`ExtractError`]; nothing here
//! propagates a raw error or panics into the caller.

use crate::error::ExtractError;
use pdfium_render::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Turns a PDF on disk into plain text.
///
/// Implementations are called from a blocking thread and may block freely.
pub trait TextExtractor: Send + Sync {
    /// Concatenate the text of every page, in document order.
    fn extract_text(&self, path: &Path) -> Result<String, ExtractError>;
}

/// [`TextExtractor`] backed by pdfium, loaded through `pdfium_auto`.
///
/// With no explicit library, `pdfium_auto` provides one: the copy bundled
/// into the binary, else a cached or freshly downloaded build. An explicit
/// path (from [`PdfiumExtractor::with_library_path`] or `PDFIUM_LIB_PATH`)
/// bypasses that and must point at the library file or its directory.
#[derive(Debug, Clone, Default)]
pub struct PdfiumExtractor {
    library_path: Option<PathBuf>,
}

impl PdfiumExtractor {
    pub fn new() -> Self {
        Self {
            library_path: std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from),
        }
    }

    pub fn with_library_path(path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: Some(path.into()),
        }
    }

    fn bind(&self) -> Result<Pdfium, ExtractError> {
        let bound = match &self.library_path {
            Some(path) if path.is_dir() => pdfium_auto::bind_pdfium_from_path(
                &Pdfium::pdfium_platform_library_name_at_path(path),
            ),
            Some(path) => pdfium_auto::bind_pdfium_from_path(path),
            None => pdfium_auto::bind_pdfium_silent(),
        };
        bound.map_err(|e| ExtractError::new(format!("no se pudo cargar la biblioteca pdfium: {e}")))
    }
}

impl TextExtractor for PdfiumExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractError> {
        check_pdf_magic(path)?;

        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| ExtractError::new(format!("{e:?}")))?;

        let pages = document.pages();
        info!("PDF loaded: {} pages from {}", pages.len(), path.display());

        let mut text = String::new();
        for (idx, page) in pages.iter().enumerate() {
            let page_text = page
                .text()
                .map_err(|e| ExtractError::new(format!("página {}: {e:?}", idx + 1)))?;
            text.push_str(&page_text.all());
        }

        debug!("Extracted {} chars from {}", text.len(), path.display());
        Ok(text)
    }
}

/// Reject files that do not start with `%PDF` before handing them to pdfium.
fn check_pdf_magic(path: &Path) -> Result<(), ExtractError> {
    let mut file = std::fs::File::open(path).map_err(|e| ExtractError::new(e.to_string()))?;
    let mut magic = [0u8; 4];
    file.read_exact(&mut magic)
        .map_err(|_| ExtractError::new("el archivo está vacío o truncado"))?;
    if &magic != b"%PDF" {
        return Err(ExtractError::new(format!(
            "el archivo no es un PDF válido (primeros bytes: {magic:?})"
        )));
    }
    Ok(())
}

/// Run `extractor` on `path` in the blocking pool.
pub async fn extract_document(
    extractor: Arc<dyn TextExtractor>,
    path: &Path,
) -> Result<String, ExtractError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || extractor.extract_text(&path))
        .await
        .map_err(|e| ExtractError::new(format!("la tarea de extracción falló: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn magic_check_rejects_non_pdf() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"PK\x03\x04 not a pdf").unwrap();
        let err = check_pdf_magic(f.path()).unwrap_err();
        assert!(err.to_string().starts_with("Error al leer el archivo PDF:"));
        assert!(err.to_string().contains("no es un PDF"));
    }

    #[test]
    fn magic_check_rejects_empty_file() {
        let f = tempfile::NamedTempFile::new().unwrap();
        assert!(check_pdf_magic(f.path()).is_err());
    }

    #[test]
    fn magic_check_accepts_pdf_header() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"%PDF-1.7\n").unwrap();
        assert!(check_pdf_magic(f.path()).is_ok());
    }

    #[test]
    fn missing_file_is_an_extract_error() {
        let err = PdfiumExtractor::default()
            .extract_text(Path::new("/definitely/not/here.pdf"))
            .unwrap_err();
        assert!(err.to_string().starts_with("Error al leer el archivo PDF:"));
    }

    #[test]
    fn unloadable_library_override_is_an_extract_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"%PDF-1.4\n").unwrap();

        let err = PdfiumExtractor::with_library_path("/definitely/not/here/libpdfium.so")
            .extract_text(f.path())
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Error al leer el archivo PDF:"), "got: {msg}");
        assert!(msg.contains("pdfium"), "got: {msg}");
    }

    struct Panicking;

    impl TextExtractor for Panicking {
        fn extract_text(&self, _path: &Path) -> Result<String, ExtractError> {
            panic!("boom")
        }
    }

    #[tokio::test]
    async fn worker_panic_becomes_error_value() {
        let err = extract_document(Arc::new(Panicking), Path::new("x.pdf"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("extracción"));
    }
}
