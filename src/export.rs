/// 文档导出模块
///
/// 把单条采购单渲染为单页文档。导出器只依赖记录本身，不访问表格文件。
///
/// # 架构设计
///
/// - **DocumentExporter**: 导出接口
/// - **pdf**: 基于 printpdf 的默认实现
pub mod pdf;

use std::path::PathBuf;

use crate::record::Record;
use crate::schema;
use crate::utils::{single_line, PoError};

pub use pdf::PdfExporter;

/// 文档标题
pub const DOCUMENT_TITLE: &str = "Purchase Order";

/// 文档导出 trait
pub trait DocumentExporter {
    /// 导出一条记录，返回生成的文件路径
    ///
    /// 同一个 PO Number 重复导出会覆盖之前的文件。
    fn export(&self, record: &Record) -> Result<PathBuf, PoError>;
}

/// 导出文件名：`PO_<PO Number>.pdf`
///
/// PO Number 中的路径分隔符替换为 `_`，文件总是落在输出目录内。
pub fn document_file_name(record: &Record) -> String {
    let stem: String = record
        .po_number
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("PO_{}.pdf", stem)
}

/// 文档正文：每个字段一行 `列名: 值`（不包含附件字段）
pub fn document_lines(record: &Record) -> Vec<String> {
    record
        .fields()
        .into_iter()
        .filter(|(name, _)| *name != schema::ATTACHMENT)
        .map(|(name, value)| format!("{}: {}", name, single_line(&value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_file_name() {
        assert_eq!(document_file_name(&Record::new("1001", "Acme")), "PO_1001.pdf");
        assert_eq!(document_file_name(&Record::new(" PO-7 ", "Acme")), "PO_PO-7.pdf");
    }

    #[test]
    fn test_document_file_name_replaces_separators() {
        assert_eq!(document_file_name(&Record::new("PO/2024/001", "Acme")), "PO_PO_2024_001.pdf");
        assert_eq!(document_file_name(&Record::new(r"PO\2024", "Acme")), "PO_PO_2024.pdf");
        assert_eq!(document_file_name(&Record::new("../x", "Acme")), "PO_.._x.pdf");
    }

    #[test]
    fn test_document_lines_skip_attachment() {
        let record = Record {
            items_ordered: "bolts\nnuts".to_string(),
            attachment: "uploads/secret.pdf".to_string(),
            ..Record::new("PO1", "Acme")
        };

        let lines = document_lines(&record);
        assert_eq!(lines.len(), schema::COLUMNS.len() - 1);
        assert_eq!(lines[0], "PO Number: PO1");
        assert!(lines.contains(&"Items Ordered: bolts nuts".to_string()));
        assert!(lines.contains(&"Status: Pending".to_string()));
        assert!(lines.iter().all(|l| !l.contains("Attachment")));
    }
}
