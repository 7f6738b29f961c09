use chrono::NaiveDate;

use crate::record::Record;
use crate::utils::contains_ignore_case;

/// 记录过滤条件
///
/// 所有条件之间是"与"关系，未设置的条件不参与过滤。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// PO Number 子串（不区分大小写）
    pub po_number: Option<String>,
    /// Vendor Name 子串（不区分大小写）
    pub vendor_name: Option<String>,
    /// Date 精确匹配
    pub date: Option<NaiveDate>,
}

impl RecordFilter {
    /// 是否没有任何过滤条件
    pub fn is_empty(&self) -> bool {
        self.po_number.is_none() && self.vendor_name.is_none() && self.date.is_none()
    }

    /// 检查记录是否满足过滤条件
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(po) = &self.po_number {
            if !contains_ignore_case(&record.po_number, po) {
                return false;
            }
        }

        if let Some(vendor) = &self.vendor_name {
            if !contains_ignore_case(&record.vendor_name, vendor) {
                return false;
            }
        }

        // 日期无法解析的记录不会匹配日期条件
        if let Some(date) = self.date {
            if record.parsed_date() != Some(date) {
                return false;
            }
        }

        true
    }
}
