//! The built-in tool list.

use super::{
    ImageTarget, MediaFormat, OfficeFormat, ToolCategory, ToolDescriptor, ToolOperation,
};

const IMAGE_INPUTS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

#[allow(clippy::too_many_arguments)]
const fn tool(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    category: ToolCategory,
    formats: (&'static str, &'static str),
    accepted_extensions: &'static [&'static str],
    popular: bool,
    operation: ToolOperation,
) -> ToolDescriptor {
    let color = match category {
        ToolCategory::Pdf => "#e74c3c",
        ToolCategory::Image => "#3498db",
        ToolCategory::Spreadsheet => "#27ae60",
        ToolCategory::Document => "#9b59b6",
        ToolCategory::Media => "#f39c12",
    };
    ToolDescriptor {
        id,
        name,
        description,
        category,
        source_format: formats.0,
        target_format: formats.1,
        accepted_extensions,
        icon,
        color,
        popular,
        operation,
    }
}

pub(super) fn builtin_tools() -> Vec<ToolDescriptor> {
    use ToolCategory::*;
    use ToolOperation as Op;

    vec![
        // PDF
        tool("pdf-to-word", "PDF → Word", "Convert PDF documents to editable Word files", "📄", Pdf,
            ("PDF", "DOCX"), &["pdf"], true, Op::Office(OfficeFormat::Docx)),
        tool("word-to-pdf", "Word → PDF", "Convert Word documents to PDF format", "📝", Pdf,
            ("DOCX", "PDF"), &["doc", "docx"], true, Op::Office(OfficeFormat::Pdf)),
        tool("ppt-to-pdf", "PPT → PDF", "Convert PowerPoint presentations to PDF", "📊", Pdf,
            ("PPTX", "PDF"), &["ppt", "pptx"], true, Op::Office(OfficeFormat::Pdf)),
        tool("pdf-to-ppt", "PDF → PPT", "Convert PDF slides to PowerPoint", "🖼️", Pdf,
            ("PDF", "PPTX"), &["pdf"], false,
            Op::Unavailable { reason: "PDF → PowerPoint conversion is not available yet" }),
        tool("pdf-merge", "Merge PDFs", "Combine multiple PDF files into one", "🔗", Pdf,
            ("PDF", "PDF"), &["pdf"], true, Op::PdfMerge),
        tool("pdf-split", "Split PDF", "Split a PDF into separate pages", "✂️", Pdf,
            ("PDF", "PDF"), &["pdf"], false, Op::PdfSplit),
        tool("pdf-compress", "Compress PDF", "Reduce PDF file size", "🗜️", Pdf,
            ("PDF", "PDF"), &["pdf"], true, Op::PdfCompress),
        tool("pdf-to-images", "PDF → Images", "Convert PDF pages to PNG images", "🖼️", Pdf,
            ("PDF", "PNG"), &["pdf"], false, Op::PdfToImages),
        tool("images-to-pdf", "Images → PDF", "Convert images to a single PDF", "📦", Pdf,
            ("Images", "PDF"), IMAGE_INPUTS, false, Op::ImagesToPdf),
        // Image
        tool("jpg-to-png", "JPG → PNG", "Convert JPEG images to PNG format", "🎨", Image,
            ("JPG", "PNG"), &["jpg", "jpeg"], true, Op::ImageConvert(ImageTarget::Png)),
        tool("png-to-jpg", "PNG → JPG", "Convert PNG images to JPEG format", "🖼️", Image,
            ("PNG", "JPG"), &["png"], true, Op::ImageConvert(ImageTarget::Jpeg)),
        tool("webp-to-png", "WebP → PNG", "Convert WebP images to PNG format", "🌐", Image,
            ("WEBP", "PNG"), &["webp"], false, Op::ImageConvert(ImageTarget::Png)),
        tool("png-to-webp", "PNG → WebP", "Convert PNG images to WebP format", "⚡", Image,
            ("PNG", "WEBP"), &["png"], false, Op::ImageConvert(ImageTarget::Webp)),
        tool("jpg-to-webp", "JPG → WebP", "Convert JPEG images to WebP format", "🚀", Image,
            ("JPG", "WEBP"), &["jpg", "jpeg"], false, Op::ImageConvert(ImageTarget::Webp)),
        tool("image-resize", "Resize Image", "Resize images to custom dimensions", "↔️", Image,
            ("Image", "Image"), IMAGE_INPUTS, true, Op::ImageResize),
        tool("image-compress", "Compress Image", "Reduce image file size without quality loss", "🗜️", Image,
            ("Image", "Image"), &["jpg", "jpeg", "png", "gif", "bmp"], true, Op::ImageCompress),
        tool("image-to-grayscale", "Image → Grayscale", "Convert colorful images to grayscale", "⚫", Image,
            ("Image", "Image"), &["jpg", "jpeg", "png", "bmp"], false, Op::ImageGrayscale),
        tool("gif-to-png", "GIF → PNG", "Convert GIF files to PNG format", "🎞️", Image,
            ("GIF", "PNG"), &["gif"], false, Op::ImageConvert(ImageTarget::Png)),
        tool("bmp-to-png", "BMP → PNG", "Convert BMP images to PNG format", "🖼️", Image,
            ("BMP", "PNG"), &["bmp"], false, Op::ImageConvert(ImageTarget::Png)),
        // Spreadsheet
        tool("csv-to-excel", "CSV → Excel", "Convert CSV files to Excel spreadsheets", "📊", Spreadsheet,
            ("CSV", "XLSX"), &["csv"], true, Op::Office(OfficeFormat::Xlsx)),
        tool("excel-to-csv", "Excel → CSV", "Convert Excel spreadsheets to CSV format", "📋", Spreadsheet,
            ("XLSX", "CSV"), &["xlsx", "xls"], true, Op::Office(OfficeFormat::Csv)),
        tool("csv-to-json", "CSV → JSON", "Convert CSV data to JSON format", "{}", Spreadsheet,
            ("CSV", "JSON"), &["csv"], true, Op::CsvToJson),
        tool("json-to-csv", "JSON → CSV", "Convert JSON data to CSV format", "📄", Spreadsheet,
            ("JSON", "CSV"), &["json"], false, Op::JsonToCsv),
        tool("excel-to-pdf", "Excel → PDF", "Convert Excel spreadsheets to PDF", "📃", Spreadsheet,
            ("XLSX", "PDF"), &["xlsx", "xls"], false, Op::Office(OfficeFormat::Pdf)),
        // Document
        tool("txt-to-pdf", "Text → PDF", "Convert plain text files to PDF", "📝", Document,
            ("TXT", "PDF"), &["txt"], true, Op::Office(OfficeFormat::Pdf)),
        tool("pdf-to-txt", "PDF → Text", "Extract text from PDF documents", "📝", Document,
            ("PDF", "TXT"), &["pdf"], true, Op::Office(OfficeFormat::Txt)),
        tool("html-to-pdf", "HTML → PDF", "Convert HTML files to PDF documents", "🌐", Document,
            ("HTML", "PDF"), &["html", "htm"], false, Op::Office(OfficeFormat::Pdf)),
        tool("md-to-html", "Markdown → HTML", "Convert Markdown to HTML", "📖", Document,
            ("MD", "HTML"), &["md", "markdown"], false, Op::MarkdownToHtml),
        tool("rtf-to-pdf", "RTF → PDF", "Convert RTF files to PDF format", "📄", Document,
            ("RTF", "PDF"), &["rtf"], false, Op::Office(OfficeFormat::Pdf)),
        // Media
        tool("video-to-audio", "Video → Audio", "Extract audio from video files (requires FFmpeg)", "🎵", Media,
            ("Video", "MP3"), &["mp4", "avi", "mov", "mkv", "webm", "flv"], true, Op::Media(MediaFormat::Mp3)),
        tool("mp4-to-mp3", "MP4 → MP3", "Extract MP3 audio from MP4 video (requires FFmpeg)", "🎶", Media,
            ("MP4", "MP3"), &["mp4"], true, Op::Media(MediaFormat::Mp3)),
        tool("mp3-to-wav", "MP3 → WAV", "Convert MP3 audio to WAV format (requires FFmpeg)", "🔊", Media,
            ("MP3", "WAV"), &["mp3"], false, Op::Media(MediaFormat::Wav)),
        tool("wav-to-mp3", "WAV → MP3", "Convert WAV audio to MP3 format (requires FFmpeg)", "🎸", Media,
            ("WAV", "MP3"), &["wav"], false, Op::Media(MediaFormat::Mp3)),
    ]
}
