//! 规范列定义与列修复
//!
//! 每次加载表格都会把原始数据修复为规范列：缺失的列补空值，
//! 多余的列直接丢弃，列顺序调整为规范顺序。

use crate::io::{Cell, RawSheet};

pub const PO_NUMBER: &str = "PO Number";
pub const DATE: &str = "Date";
pub const VENDOR_NAME: &str = "Vendor Name";
pub const ITEMS_ORDERED: &str = "Items Ordered";
pub const TOTAL_AMOUNT: &str = "Total Amount";
pub const STATUS: &str = "Status";
pub const EXPECTED_DELIVERY: &str = "Expected Delivery";
pub const PAYMENT_TERMS: &str = "Payment Terms";
pub const MODE_OF_PAYMENT: &str = "Mode of Payment";
pub const CONTACT_PERSON: &str = "Contact Person";
pub const REMARKS: &str = "Remarks";
pub const ATTACHMENT: &str = "Attachment";

/// 规范列（顺序即文件中的列顺序）
pub const COLUMNS: [&str; 12] = [
    PO_NUMBER,
    DATE,
    VENDOR_NAME,
    ITEMS_ORDERED,
    TOTAL_AMOUNT,
    STATUS,
    EXPECTED_DELIVERY,
    PAYMENT_TERMS,
    MODE_OF_PAYMENT,
    CONTACT_PERSON,
    REMARKS,
    ATTACHMENT,
];

/// 列修复报告
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaReport {
    /// 补上的规范列
    pub added: Vec<&'static str>,
    /// 丢弃的非规范列
    pub dropped: Vec<String>,
    /// 列存在但顺序不对
    pub reordered: bool,
}

impl SchemaReport {
    /// 是否发生了任何修复
    pub fn is_changed(&self) -> bool {
        !self.added.is_empty() || !self.dropped.is_empty() || self.reordered
    }
}

impl std::fmt::Display for SchemaReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.is_changed() {
            return write!(f, "列结构无变化");
        }
        let mut parts = Vec::new();
        if !self.added.is_empty() {
            parts.push(format!("补充列: {}", self.added.join(", ")));
        }
        if !self.dropped.is_empty() {
            parts.push(format!("丢弃列: {}", self.dropped.join(", ")));
        }
        if self.reordered {
            parts.push("调整列顺序".to_string());
        }
        write!(f, "{}", parts.join("; "))
    }
}

/// 生成只有表头的空表
pub fn empty_sheet() -> RawSheet {
    RawSheet {
        header: COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows: Vec::new(),
    }
}

/// 把原始表格修复为规范列
///
/// 同名列出现多次时取第一次出现的那一列。全空行会被跳过。
pub fn repair(sheet: &RawSheet) -> (RawSheet, SchemaReport) {
    let positions: Vec<Option<usize>> = COLUMNS
        .iter()
        .map(|column| sheet.header.iter().position(|h| h.trim() == *column))
        .collect();

    let added = COLUMNS
        .iter()
        .zip(&positions)
        .filter(|(_, pos)| pos.is_none())
        .map(|(column, _)| *column)
        .collect();

    let dropped = sheet
        .header
        .iter()
        .enumerate()
        .filter(|(i, _)| !positions.contains(&Some(*i)))
        .map(|(_, h)| h.clone())
        .collect();

    let present: Vec<usize> = positions.iter().flatten().copied().collect();
    let reordered = present.windows(2).any(|w| w[0] > w[1]);

    let rows = sheet
        .rows
        .iter()
        .filter(|row| !row.iter().all(Cell::is_empty))
        .map(|row| {
            positions
                .iter()
                .map(|pos| {
                    pos.and_then(|i| row.get(i).cloned())
                        .unwrap_or(Cell::Empty)
                })
                .collect()
        })
        .collect();

    let report = SchemaReport { added, dropped, reordered };
    (RawSheet { header: empty_sheet().header, rows }, report)
}
