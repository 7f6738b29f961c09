//! PDF 导出实现
//!
//! A4 单页，Helvetica 12pt：居中标题 + 每个字段一行。

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use printpdf::{BuiltinFont, Mm, PdfDocument};
use tracing::info;

use super::{document_file_name, document_lines, DocumentExporter, DOCUMENT_TITLE};
use crate::record::Record;
use crate::utils::PoError;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 10.0;
const LINE_HEIGHT: f32 = 10.0;
const FONT_SIZE: f32 = 12.0;

/// Helvetica 平均字宽约为字号的一半（1pt = 0.3528mm），用于估算标题居中位置
const AVG_CHAR_WIDTH_MM: f32 = FONT_SIZE * 0.5 * 0.3528;

/// 默认的 PDF 导出器
#[derive(Debug, Clone)]
pub struct PdfExporter {
    /// 输出目录
    pub output_dir: PathBuf,
}

impl PdfExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        PdfExporter {
            output_dir: output_dir.into(),
        }
    }

    /// 渲染为 PDF 字节流
    pub fn render(&self, record: &Record) -> Result<Vec<u8>, PoError> {
        let (doc, page, layer) = PdfDocument::new(
            DOCUMENT_TITLE,
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            "Layer 1",
        );
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| PoError::Document(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);

        let mut y = PAGE_HEIGHT - MARGIN - LINE_HEIGHT;
        let title_width = DOCUMENT_TITLE.chars().count() as f32 * AVG_CHAR_WIDTH_MM;
        layer.use_text(DOCUMENT_TITLE, FONT_SIZE, Mm((PAGE_WIDTH - title_width) / 2.0), Mm(y), &font);

        for line in document_lines(record) {
            y -= LINE_HEIGHT;
            layer.use_text(line, FONT_SIZE, Mm(MARGIN), Mm(y), &font);
        }

        let mut buffer = BufWriter::new(Vec::new());
        doc.save(&mut buffer)
            .map_err(|e| PoError::Document(e.to_string()))?;
        buffer
            .into_inner()
            .map_err(|e| PoError::IoError(e.into_error()))
    }
}

impl DocumentExporter for PdfExporter {
    fn export(&self, record: &Record) -> Result<PathBuf, PoError> {
        let bytes = self.render(record)?;

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(document_file_name(record));
        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&bytes)?;
        writer.flush()?;

        info!(path = %path.display(), po_number = %record.po_number, "导出 PDF");
        Ok(path)
    }
}
