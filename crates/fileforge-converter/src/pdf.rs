//! PDF operations on the PDFium engine.
//!
//! PDFium is not async-safe: every public function here is blocking and is
//! called from `spawn_blocking` by the orchestrator. A fresh binding is made
//! per operation.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use pdfium_render::prelude::*;
use tracing::{debug, info, warn};

use crate::archive::ArchiveWriter;
use crate::error::ConversionError;
use crate::imaging;

/// Points per inch in PDF user space.
const POINTS_PER_INCH: f32 = 72.0;

/// Handle to the PDFium library location and render settings.
#[derive(Debug, Clone)]
pub struct PdfEngine {
    library_dir: Option<PathBuf>,
    render_dpi: u16,
}

/// One input for [`PdfEngine::images_to_pdf`].
#[derive(Debug)]
pub struct ImageInput<'a> {
    /// Name for diagnostics.
    pub name: &'a str,
    /// Encoded image bytes.
    pub data: &'a [u8],
}

impl PdfEngine {
    /// Create an engine that binds from `library_dir`, or the system library
    /// path when `None`.
    pub fn new(library_dir: Option<PathBuf>, render_dpi: u16) -> Self {
        Self {
            library_dir,
            render_dpi,
        }
    }

    /// Bind to the PDFium shared library.
    pub fn bind(&self) -> Result<Pdfium, ConversionError> {
        let bindings = match &self.library_dir {
            Some(dir) => Pdfium::bind_to_library(&Pdfium::pdfium_platform_library_name_at_path(dir))
                .or_else(|_| Pdfium::bind_to_system_library()),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| ConversionError::PdfEngine(format!("PDFium library unavailable: {e:?}")))?;
        Ok(Pdfium::new(bindings))
    }

    /// Whether the PDFium library can be bound.
    pub fn is_available(&self) -> bool {
        self.bind().is_ok()
    }

    /// Concatenate `inputs` in order into one document at `dest`.
    pub fn merge(&self, inputs: &[&Path], dest: &Path) -> Result<u16, ConversionError> {
        let pdfium = self.bind()?;
        let mut merged = pdfium.create_new_pdf().map_err(engine_error)?;

        for path in inputs {
            let source = load(&pdfium, path)?;
            merged.pages_mut().append(&source).map_err(engine_error)?;
        }

        let pages = merged.pages().len();
        merged.save_to_file(dest).map_err(engine_error)?;
        info!(documents = inputs.len(), pages = pages, "Merged PDFs");
        Ok(pages)
    }

    /// One single-page document per page, zipped as `page_<n>.pdf`.
    pub fn split(&self, input: &Path, dest: &Path) -> Result<u16, ConversionError> {
        let pdfium = self.bind()?;
        let source = load(&pdfium, input)?;
        let page_count = source.pages().len();

        let mut archive = ArchiveWriter::create(dest)?;
        for index in 0..page_count {
            let mut single = pdfium.create_new_pdf().map_err(engine_error)?;
            single
                .pages_mut()
                .copy_page_from_document(&source, index, 0)
                .map_err(engine_error)?;
            let bytes = single.save_to_bytes().map_err(engine_error)?;
            archive.add(&format!("page_{}.pdf", index + 1), &bytes)?;
        }
        archive.finish()?;

        debug!(pages = page_count, "Split PDF");
        Ok(page_count)
    }

    /// Copy every page into a new document and save it.
    ///
    /// The new document carries no security handler, so encryption and
    /// permission restrictions of the input are not written out. No
    /// pixel-level recompression is done.
    pub fn compress(&self, input: &Path, dest: &Path) -> Result<u16, ConversionError> {
        let pdfium = self.bind()?;
        let source = load(&pdfium, input)?;
        let mut rebuilt = pdfium.create_new_pdf().map_err(engine_error)?;
        rebuilt.pages_mut().append(&source).map_err(engine_error)?;

        let pages = rebuilt.pages().len();
        rebuilt.save_to_file(dest).map_err(engine_error)?;
        debug!(pages = pages, "Rewrote PDF without security handler");
        Ok(pages)
    }

    /// Render every page to RGB PNG at the configured DPI, zipped as
    /// `<base_name>_page_<n>.png`.
    pub fn render_pages(&self, input: &Path, base_name: &str, dest: &Path) -> Result<u16, ConversionError> {
        let pdfium = self.bind()?;
        let document = load(&pdfium, input)?;
        let render_config =
            PdfRenderConfig::new().scale_page_by_factor(f32::from(self.render_dpi) / POINTS_PER_INCH);

        let mut archive = ArchiveWriter::create(dest)?;
        let mut rendered = 0u16;
        for (index, page) in document.pages().iter().enumerate() {
            let bitmap = page
                .render_with_config(&render_config)
                .map_err(|e| ConversionError::PdfEngine(format!("page {}: {e:?}", index + 1)))?;
            let rgb = DynamicImage::ImageRgb8(bitmap.as_image().into_rgb8());
            let png = imaging::encode(&rgb, ImageFormat::Png, None)?;
            archive.add(&format!("{}_page_{}.png", base_name, index + 1), &png)?;
            rendered += 1;
        }
        archive.finish()?;

        debug!(pages = rendered, dpi = self.render_dpi, "Rendered PDF pages");
        Ok(rendered)
    }

    /// One page per decodable image, sized to the image's pixel dimensions.
    ///
    /// Undecodable inputs are skipped; zero usable images is an error.
    pub fn images_to_pdf(&self, images: &[ImageInput<'_>], dest: &Path) -> Result<u16, ConversionError> {
        let pdfium = self.bind()?;
        let mut document = pdfium.create_new_pdf().map_err(engine_error)?;

        for input in images {
            let img = match imaging::decode(input.data, input.name) {
                Ok(img) => img,
                Err(e) => {
                    warn!(file = %input.name, error = %e, "Skipping undecodable image");
                    continue;
                }
            };

            let width = PdfPoints::new(img.width() as f32);
            let height = PdfPoints::new(img.height() as f32);
            let mut page = document
                .pages_mut()
                .create_page_at_end(PdfPagePaperSize::new_custom(width, height))
                .map_err(engine_error)?;
            page.objects_mut()
                .create_image_object(PdfPoints::ZERO, PdfPoints::ZERO, &img, Some(width), Some(height))
                .map_err(engine_error)?;
        }

        let pages = document.pages().len();
        if pages == 0 {
            return Err(ConversionError::Undecodable {
                file_name: images
                    .iter()
                    .map(|i| i.name)
                    .collect::<Vec<_>>()
                    .join(", "),
                detail: "none of the uploaded files is a readable image".to_string(),
            });
        }

        document.save_to_file(dest).map_err(engine_error)?;
        Ok(pages)
    }
}

fn load<'a>(pdfium: &'a Pdfium, path: &Path) -> Result<PdfDocument<'a>, ConversionError> {
    pdfium
        .load_pdf_from_file(path, None)
        .map_err(|e| ConversionError::Undecodable {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            detail: format!("not a readable PDF ({e:?})"),
        })
}

fn engine_error(e: PdfiumError) -> ConversionError {
    ConversionError::PdfEngine(format!("{e:?}"))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs::File;
    use zip::ZipArchive;

    /// Engine bound from the system library, or `None` to skip the test.
    pub(crate) fn engine_or_skip() -> Option<PdfEngine> {
        let dir = std::env::var_os("PDFIUM_LIBRARY_DIR").map(PathBuf::from);
        let engine = PdfEngine::new(dir, 72);
        if engine.is_available() {
            Some(engine)
        } else {
            eprintln!("Skipping: PDFium library not available");
            None
        }
    }

    /// Write an `n`-page A4 document.
    pub(crate) fn write_blank_pdf(engine: &PdfEngine, path: &Path, pages: usize) {
        let pdfium = engine.bind().expect("bind");
        let mut doc = pdfium.create_new_pdf().expect("new pdf");
        for _ in 0..pages {
            doc.pages_mut()
                .create_page_at_end(PdfPagePaperSize::a4())
                .expect("page");
        }
        doc.save_to_file(path).expect("save");
    }

    fn page_count(engine: &PdfEngine, path: &Path) -> u16 {
        let pdfium = engine.bind().expect("bind");
        let doc = pdfium.load_pdf_from_file(path, None).expect("load");
        doc.pages().len()
    }

    #[test]
    fn test_split_produces_one_entry_per_page() {
        let Some(engine) = engine_or_skip() else { return };
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("three.pdf");
        write_blank_pdf(&engine, &input, 3);

        let dest = dir.path().join("split.zip");
        assert_eq!(engine.split(&input, &dest).expect("split"), 3);

        let mut archive = ZipArchive::new(File::open(&dest).expect("open")).expect("zip");
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        assert_eq!(names, vec!["page_1.pdf", "page_2.pdf", "page_3.pdf"]);

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).expect("entry");
            let page_path = dir.path().join(format!("entry_{i}.pdf"));
            let mut out = File::create(&page_path).expect("create");
            std::io::copy(&mut entry, &mut out).expect("copy");
            assert_eq!(page_count(&engine, &page_path), 1);
        }
    }

    #[test]
    fn test_merge_keeps_supplied_order_and_page_total() {
        let Some(engine) = engine_or_skip() else { return };
        let dir = tempfile::tempdir().expect("tempdir");
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        write_blank_pdf(&engine, &a, 2);
        write_blank_pdf(&engine, &b, 1);

        let dest = dir.path().join("merged.pdf");
        assert_eq!(engine.merge(&[&a, &b], &dest).expect("merge"), 3);
        assert_eq!(page_count(&engine, &dest), 3);
    }

    #[test]
    fn test_render_pages_names_entries() {
        let Some(engine) = engine_or_skip() else { return };
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("doc.pdf");
        write_blank_pdf(&engine, &input, 2);

        let dest = dir.path().join("images.zip");
        engine.render_pages(&input, "doc", &dest).expect("render");

        let mut archive = ZipArchive::new(File::open(&dest).expect("open")).expect("zip");
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        assert_eq!(names, vec!["doc_page_1.png", "doc_page_2.png"]);
        let mut png = Vec::new();
        std::io::Read::read_to_end(&mut archive.by_index(0).expect("entry"), &mut png).expect("read");
        assert_eq!(image::guess_format(&png).expect("format"), ImageFormat::Png);
    }

    #[test]
    fn test_images_to_pdf_skips_undecodable() {
        let Some(engine) = engine_or_skip() else { return };
        let dir = tempfile::tempdir().expect("tempdir");
        let mut png = Vec::new();
        DynamicImage::new_rgb8(40, 20)
            .write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)
            .expect("png");

        let inputs = [
            ImageInput { name: "a.png", data: &png },
            ImageInput { name: "junk.png", data: b"nope" },
        ];
        let dest = dir.path().join("images.pdf");
        assert_eq!(engine.images_to_pdf(&inputs, &dest).expect("pdf"), 1);

        let err = engine
            .images_to_pdf(&[ImageInput { name: "junk.png", data: b"nope" }], &dir.path().join("none.pdf"))
            .expect_err("must fail");
        assert!(matches!(err, ConversionError::Undecodable { .. }));
    }

    fn security_revision(engine: &PdfEngine, path: &Path) -> PdfSecurityHandlerRevision {
        let pdfium = engine.bind().expect("bind");
        let doc = pdfium.load_pdf_from_file(path, None).expect("load");
        doc.permissions().security_handler_revision().expect("revision")
    }

    #[test]
    fn test_compress_drops_permission_restrictions() {
        let Some(engine) = engine_or_skip() else { return };
        let input = Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata/restricted.pdf");
        assert!(matches!(
            security_revision(&engine, &input),
            PdfSecurityHandlerRevision::Revision2
        ));

        let dir = tempfile::tempdir().expect("tempdir");
        let dest = dir.path().join("compressed.pdf");
        assert_eq!(engine.compress(&input, &dest).expect("compress"), 1);

        assert!(matches!(
            security_revision(&engine, &dest),
            PdfSecurityHandlerRevision::Unprotected
        ));
        assert_eq!(page_count(&engine, &dest), 1);
    }

    #[test]
    fn test_garbage_input_is_undecodable() {
        let Some(engine) = engine_or_skip() else { return };
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("bad.pdf");
        std::fs::write(&input, b"not a pdf").expect("write");
        let err = engine.compress(&input, &dir.path().join("out.pdf")).expect_err("must fail");
        assert!(matches!(err, ConversionError::Undecodable { .. }));
    }
}
