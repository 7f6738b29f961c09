use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::io::Cell;
use crate::schema;
use crate::utils::{is_blank, PoError};

/// 采购单状态
///
/// 反序列化与表格、命令行一致：不区分大小写，空字符串为 Pending。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Status {
    /// 待处理（默认）
    #[default]
    Pending,
    /// 已批准
    Approved,
    /// 已交付
    Delivered,
}

impl Status {
    /// 获取状态名称（即表格中保存的文本）
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Approved => "Approved",
            Status::Delivered => "Delivered",
        }
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Status::Pending),
            "approved" => Ok(Status::Approved),
            "delivered" => Ok(Status::Delivered),
            other => Err(format!("未知状态 \"{}\"（可选: Pending, Approved, Delivered）", other)),
        }
    }
}

impl TryFrom<String> for Status {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_blank(&value) {
            return Ok(Status::default());
        }
        value.parse()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一条采购单记录
///
/// 序列化时使用规范列名作为键，所有字段都有默认值，
/// 因此只包含部分列名的 JSON 对象也是合法的记录。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    #[serde(rename = "PO Number")]
    pub po_number: String,
    /// ISO 日期字符串（不做类型校验）
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Vendor Name")]
    pub vendor_name: String,
    #[serde(rename = "Items Ordered")]
    pub items_ordered: String,
    #[serde(rename = "Total Amount")]
    pub total_amount: Decimal,
    #[serde(rename = "Status")]
    pub status: Status,
    #[serde(rename = "Expected Delivery")]
    pub expected_delivery: String,
    #[serde(rename = "Payment Terms")]
    pub payment_terms: String,
    #[serde(rename = "Mode of Payment")]
    pub mode_of_payment: String,
    #[serde(rename = "Contact Person")]
    pub contact_person: String,
    #[serde(rename = "Remarks")]
    pub remarks: String,
    /// 附件路径（上传目录中的文件）
    #[serde(rename = "Attachment")]
    pub attachment: String,
}

impl Record {
    /// 创建只有必填字段的记录，其余字段取默认值
    pub fn new(po_number: impl Into<String>, vendor_name: impl Into<String>) -> Self {
        Record {
            po_number: po_number.into(),
            vendor_name: vendor_name.into(),
            ..Default::default()
        }
    }

    /// 校验必填字段（PO Number 和 Vendor Name）
    pub fn validate(&self) -> Result<(), PoError> {
        let missing: Vec<&str> = [
            (schema::PO_NUMBER, &self.po_number),
            (schema::VENDOR_NAME, &self.vendor_name),
        ]
        .iter()
        .filter(|(_, value)| is_blank(value))
        .map(|(name, _)| *name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PoError::Validation(format!("必填字段为空: {}", missing.join(", "))))
        }
    }

    /// 解析 Date 字段
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_iso_date(&self.date)
    }

    /// 按规范列顺序返回 (列名, 显示值)
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            (schema::PO_NUMBER, self.po_number.clone()),
            (schema::DATE, self.date.clone()),
            (schema::VENDOR_NAME, self.vendor_name.clone()),
            (schema::ITEMS_ORDERED, self.items_ordered.clone()),
            (schema::TOTAL_AMOUNT, self.total_amount.to_string()),
            (schema::STATUS, self.status.to_string()),
            (schema::EXPECTED_DELIVERY, self.expected_delivery.clone()),
            (schema::PAYMENT_TERMS, self.payment_terms.clone()),
            (schema::MODE_OF_PAYMENT, self.mode_of_payment.clone()),
            (schema::CONTACT_PERSON, self.contact_person.clone()),
            (schema::REMARKS, self.remarks.clone()),
            (schema::ATTACHMENT, self.attachment.clone()),
        ]
    }

    /// 从规范列顺序的一行单元格构建记录
    ///
    /// # 参数
    /// * `row` - 行号（出错时用于定位）
    /// * `cells` - 已按规范列修复过的单元格
    pub fn from_cells(row: usize, cells: &[Cell]) -> Result<Self, PoError> {
        let text = |i: usize| cells.get(i).map(|c| c.to_string()).unwrap_or_default();

        Ok(Record {
            po_number: text(0),
            date: text(1),
            vendor_name: text(2),
            items_ordered: text(3),
            total_amount: parse_amount(row, cells.get(4).unwrap_or(&Cell::Empty))?,
            status: parse_status(row, &text(5))?,
            expected_delivery: text(6),
            payment_terms: text(7),
            mode_of_payment: text(8),
            contact_person: text(9),
            remarks: text(10),
            attachment: text(11),
        })
    }

    /// 转换为规范列顺序的一行单元格
    pub fn to_cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(self.po_number.as_str()),
            Cell::text(self.date.as_str()),
            Cell::text(self.vendor_name.as_str()),
            Cell::text(self.items_ordered.as_str()),
            amount_cell(self.total_amount),
            Cell::text(self.status.as_str()),
            Cell::text(self.expected_delivery.as_str()),
            Cell::text(self.payment_terms.as_str()),
            Cell::text(self.mode_of_payment.as_str()),
            Cell::text(self.contact_person.as_str()),
            Cell::text(self.remarks.as_str()),
            Cell::text(self.attachment.as_str()),
        ]
    }
}

/// 金额单元格：能被 f64 精确表示的写为数字，否则写为文本
fn amount_cell(amount: Decimal) -> Cell {
    match amount.to_f64() {
        Some(n) if Decimal::from_str(&n.to_string()).ok() == Some(amount) => Cell::Number(n),
        _ => Cell::Text(amount.to_string()),
    }
}

/// 解析 ISO 日期（允许带时间部分）
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let date_part = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// 解析金额：空单元格为 0
fn parse_amount(row: usize, cell: &Cell) -> Result<Decimal, PoError> {
    let invalid = |value: String| PoError::InvalidCell {
        row,
        column: schema::TOTAL_AMOUNT,
        value,
    };

    match cell {
        Cell::Empty => Ok(Decimal::ZERO),
        // 经过 f64 的最短十进制表示转换，避免 0.1 变成 0.1000000000000000055...
        Cell::Number(n) => Decimal::from_str(&n.to_string()).map_err(|_| invalid(n.to_string())),
        Cell::Text(s) if is_blank(s) => Ok(Decimal::ZERO),
        Cell::Text(s) => Decimal::from_str(s.trim()).map_err(|_| invalid(s.clone())),
    }
}

/// 解析状态：空单元格为 Pending
fn parse_status(row: usize, text: &str) -> Result<Status, PoError> {
    if is_blank(text) {
        return Ok(Status::default());
    }
    Status::from_str(text).map_err(|_| PoError::InvalidCell {
        row,
        column: schema::STATUS,
        value: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn full_record() -> Record {
        Record {
            po_number: "PO-1001".to_string(),
            date: "2024-03-01".to_string(),
            vendor_name: "Acme Supplies".to_string(),
            items_ordered: "10 x bolts".to_string(),
            total_amount: dec("250.75"),
            status: Status::Approved,
            expected_delivery: "2024-03-15".to_string(),
            payment_terms: "Net 30".to_string(),
            mode_of_payment: "Bank Transfer".to_string(),
            contact_person: "J. Doe".to_string(),
            remarks: String::new(),
            attachment: "uploads/quote.pdf".to_string(),
        }
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Pending".parse::<Status>().unwrap(), Status::Pending);
        assert_eq!(" approved ".parse::<Status>().unwrap(), Status::Approved);
        assert_eq!("DELIVERED".parse::<Status>().unwrap(), Status::Delivered);
        assert!("Cancelled".parse::<Status>().is_err());
        assert_eq!(Status::default(), Status::Pending);
    }

    #[test]
    fn test_validate_required_fields() {
        assert!(Record::new("PO1", "Acme").validate().is_ok());

        let err = Record::new("", "Acme").validate().unwrap_err();
        assert!(matches!(err, PoError::Validation(ref msg) if msg.contains("PO Number")));

        let err = Record::new("PO1", "   ").validate().unwrap_err();
        assert!(matches!(err, PoError::Validation(ref msg) if msg.contains("Vendor Name")));
    }

    #[test]
    fn test_cells_conversion() {
        let record = full_record();
        let cells = record.to_cells();

        assert_eq!(cells.len(), schema::COLUMNS.len());
        assert_eq!(cells[4], Cell::Number(250.75));
        assert_eq!(cells[5], Cell::Text("Approved".to_string()));
        assert_eq!(cells[10], Cell::Empty);

        let back = Record::from_cells(0, &cells).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_empty_cells_use_defaults() {
        let cells = vec![Cell::Empty; schema::COLUMNS.len()];
        let record = Record::from_cells(0, &cells).unwrap();

        assert_eq!(record, Record::default());
        assert_eq!(record.total_amount, Decimal::ZERO);
        assert_eq!(record.status, Status::Pending);
    }

    #[test]
    fn test_numeric_po_number_has_no_fraction() {
        let mut cells = vec![Cell::Empty; schema::COLUMNS.len()];
        cells[0] = Cell::Number(1001.0);
        let record = Record::from_cells(0, &cells).unwrap();
        assert_eq!(record.po_number, "1001");
    }

    #[test]
    fn test_amount_from_float_is_exact() {
        let mut cells = vec![Cell::Empty; schema::COLUMNS.len()];
        cells[4] = Cell::Number(0.1);
        let record = Record::from_cells(0, &cells).unwrap();
        assert_eq!(record.total_amount.to_string(), "0.1");
    }

    #[test]
    fn test_invalid_cells() {
        let mut cells = vec![Cell::Empty; schema::COLUMNS.len()];
        cells[4] = Cell::text("a lot");
        let err = Record::from_cells(3, &cells).unwrap_err();
        assert!(matches!(err, PoError::InvalidCell { row: 3, column: "Total Amount", .. }));

        let mut cells = vec![Cell::Empty; schema::COLUMNS.len()];
        cells[5] = Cell::text("Cancelled");
        let err = Record::from_cells(1, &cells).unwrap_err();
        assert!(matches!(err, PoError::InvalidCell { column: "Status", .. }));
    }

    #[test]
    fn test_json_uses_column_names() {
        let record: Record = serde_json::from_str(
            r#"{"PO Number": "PO1", "Vendor Name": "Acme", "Total Amount": 12.5}"#,
        )
        .unwrap();

        assert_eq!(record.po_number, "PO1");
        assert_eq!(record.vendor_name, "Acme");
        assert_eq!(record.total_amount, dec("12.5"));
        assert_eq!(record.status, Status::Pending);
        assert!(record.remarks.is_empty());

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("Expected Delivery").is_some());
    }

    #[test]
    fn test_fields_order() {
        let names: Vec<&str> = full_record().fields().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, schema::COLUMNS.to_vec());
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_iso_date("2024-03-01"), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(parse_iso_date("2024-03-01 00:00:00"), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(parse_iso_date("March 1st"), None);
        assert_eq!(parse_iso_date(""), None);
    }

    #[test]
    fn test_large_amount_kept_exact() {
        let record = Record {
            total_amount: dec("12345678901234.567"),
            ..Record::new("PO1", "Acme")
        };
        let cells = record.to_cells();
        assert_eq!(cells[4], Cell::Text("12345678901234.567".to_string()));

        let back = Record::from_cells(0, &cells).unwrap();
        assert_eq!(back.total_amount, dec("12345678901234.567"));
    }

    #[test]
    fn test_json_status_case_insensitive() {
        let record: Record =
            serde_json::from_str(r#"{"PO Number": "PO1", "Vendor Name": "Acme", "Status": "approved"}"#)
                .unwrap();
        assert_eq!(record.status, Status::Approved);

        let record: Record =
            serde_json::from_str(r#"{"PO Number": "PO1", "Vendor Name": "Acme", "Status": ""}"#).unwrap();
        assert_eq!(record.status, Status::Pending);

        let result: Result<Record, _> =
            serde_json::from_str(r#"{"PO Number": "PO1", "Vendor Name": "Acme", "Status": "Cancelled"}"#);
        assert!(result.is_err());

        // 序列化仍输出规范写法
        let json = serde_json::to_value(Status::Delivered).unwrap();
        assert_eq!(json, serde_json::json!("Delivered"));
    }
}
