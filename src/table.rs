use serde::Serialize;

use crate::filter::RecordFilter;
use crate::io::RawSheet;
use crate::record::Record;
use crate::schema;
use crate::summary::StatusSummary;
use crate::utils::PoError;

/// 采购单表：按文件中的行顺序排列的全部记录
///
/// 行的身份就是它的位置索引，删除一行会让后面所有行的索引减一。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Table {
    records: Vec<Record>,
}

impl Table {
    pub fn new(records: Vec<Record>) -> Self {
        Table { records }
    }

    /// 从已修复为规范列的原始表格构建
    pub fn from_sheet(sheet: &RawSheet) -> Result<Self, PoError> {
        let records = sheet
            .rows
            .iter()
            .enumerate()
            .map(|(i, cells)| Record::from_cells(i, cells))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Table { records })
    }

    /// 转换为规范列的原始表格
    pub fn to_sheet(&self) -> RawSheet {
        let mut sheet = schema::empty_sheet();
        sheet.rows = self.records.iter().map(Record::to_cells).collect();
        sheet
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// 检查用户输入的位置索引（可能为负数）
    pub fn resolve_index(&self, index: i64) -> Result<usize, PoError> {
        usize::try_from(index)
            .ok()
            .filter(|i| *i < self.records.len())
            .ok_or(PoError::IndexOutOfRange {
                index,
                len: self.records.len(),
            })
    }

    /// 获取指定位置的记录，越界时返回错误
    pub fn record_at(&self, index: usize) -> Result<&Record, PoError> {
        self.records.get(index).ok_or(PoError::IndexOutOfRange {
            index: index as i64,
            len: self.records.len(),
        })
    }

    /// 过滤记录，保留原始位置索引
    pub fn filter<'a>(&'a self, filter: &'a RecordFilter) -> impl Iterator<Item = (usize, &'a Record)> + 'a {
        self.records
            .iter()
            .enumerate()
            .filter(move |(_, record)| filter.matches(record))
    }

    /// 按状态汇总
    pub fn summary(&self) -> Result<StatusSummary, PoError> {
        StatusSummary::from_records(&self.records)
    }

    pub(crate) fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub(crate) fn replace(&mut self, index: usize, record: Record) -> Result<Record, PoError> {
        let len = self.records.len();
        let slot = self.records.get_mut(index).ok_or(PoError::IndexOutOfRange {
            index: index as i64,
            len,
        })?;
        Ok(std::mem::replace(slot, record))
    }

    pub(crate) fn remove(&mut self, index: usize) -> Result<Record, PoError> {
        if index >= self.records.len() {
            return Err(PoError::IndexOutOfRange {
                index: index as i64,
                len: self.records.len(),
            });
        }
        Ok(self.records.remove(index))
    }
}
