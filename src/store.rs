//! 采购单记录存储
//!
//! 表格文件是唯一的数据源：每个操作开始时都重新读取整张表，
//! 每次修改后整表写回（原子替换），不在操作之间缓存任何状态。

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::io::{TableReader, TableWriter, XlsxTableReader, XlsxTableWriter};
use crate::record::Record;
use crate::schema::{self, SchemaReport};
use crate::table::Table;
use crate::utils::{create_backup, PoError};


/// 初始化结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// 文件不存在，已创建只有表头的空表
    Created,
    /// 列结构有偏差，已修复并写回
    Repaired(SchemaReport),
    /// 列结构已是规范列，未写文件
    Unchanged,
}

impl std::fmt::Display for InitOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InitOutcome::Created => write!(f, "已创建新的采购单表格"),
            InitOutcome::Repaired(report) => write!(f, "已修复表格列结构（{}）", report),
            InitOutcome::Unchanged => write!(f, "表格列结构正常"),
        }
    }
}

/// 记录存储
///
/// # 使用示例
///
/// ```rust,ignore
/// use po_manager::{Record, RecordStore};
///
/// let store = RecordStore::open("purchase_orders.xlsx")?;
/// store.add(Record::new("PO-1", "Acme"))?;
/// let table = store.get_all()?;
/// store.delete_at(0)?;
/// ```
pub struct RecordStore {
    /// 表格文件路径
    path: PathBuf,
    reader: Box<dyn TableReader>,
    writer: Box<dyn TableWriter>,
}

impl RecordStore {
    /// 使用默认的 XLSX 读写器创建存储（不访问文件）
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_io(path, Box::new(XlsxTableReader), Box::new(XlsxTableWriter))
    }

    /// 使用自定义读写器创建存储
    pub fn with_io(
        path: impl Into<PathBuf>,
        reader: Box<dyn TableReader>,
        writer: Box<dyn TableWriter>,
    ) -> Self {
        RecordStore {
            path: path.into(),
            reader,
            writer,
        }
    }

    /// 创建存储并执行一次初始化
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PoError> {
        let store = Self::new(path);
        store.initialize()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 初始化表格文件
    ///
    /// - 文件不存在：写入只有规范表头的空表
    /// - 文件存在：补齐缺失列、丢弃多余列、调整列顺序，有变化才写回
    ///
    /// 丢弃列之前会先创建带时间戳的备份文件。
    pub fn initialize(&self) -> Result<InitOutcome, PoError> {
        if !self.path.exists() {
            self.writer.write(&schema::empty_sheet(), &self.path)?;
            info!(path = %self.path.display(), "创建采购单表格");
            return Ok(InitOutcome::Created);
        }

        let raw = self.reader.read(&self.path)?;
        let (repaired, report) = schema::repair(&raw);
        if !report.is_changed() {
            debug!(path = %self.path.display(), "列结构无需修复");
            return Ok(InitOutcome::Unchanged);
        }

        // 先确认修复后的数据可以解析，避免把损坏的表写回
        Table::from_sheet(&repaired)?;

        if !report.dropped.is_empty() {
            let backup = create_backup(&self.path)?;
            warn!(
                dropped = ?report.dropped,
                backup = %backup.display(),
                "丢弃非规范列"
            );
        }

        self.writer.write(&repaired, &self.path)?;
        info!(path = %self.path.display(), report = %report, "修复表格列结构");
        Ok(InitOutcome::Repaired(report))
    }

    /// 读取整张表（按规范列修复，但不写回）
    pub fn get_all(&self) -> Result<Table, PoError> {
        let raw = self.reader.read(&self.path)?;
        let (repaired, _) = schema::repair(&raw);
        Table::from_sheet(&repaired)
    }

    /// 追加一条记录，返回它的位置索引
    ///
    /// 必填字段为空时直接拒绝，不读写文件。
    pub fn add(&self, record: Record) -> Result<usize, PoError> {
        record.validate()?;

        let mut table = self.get_all()?;
        table.push(record);
        self.save(&table)?;

        let index = table.len() - 1;
        info!(index, "添加采购单");
        Ok(index)
    }

    /// 替换指定位置的记录，返回被替换的旧记录
    pub fn update_at(&self, index: usize, record: Record) -> Result<Record, PoError> {
        let mut table = self.get_all()?;
        let old = table.replace(index, record)?;
        self.save(&table)?;

        info!(index, po_number = %old.po_number, "更新采购单");
        Ok(old)
    }

    /// 删除指定位置的记录，后面的记录索引依次前移，返回被删除的记录
    pub fn delete_at(&self, index: usize) -> Result<Record, PoError> {
        let mut table = self.get_all()?;
        let removed = table.remove(index)?;
        self.save(&table)?;

        info!(index, po_number = %removed.po_number, "删除采购单");
        Ok(removed)
    }

    /// 与 `update_at` 相同，但要求该位置的记录仍然是期望的 PO Number
    ///
    /// 用于防止在读取列表之后，其他会话删除了前面的行导致索引错位。
    pub fn update_at_matching(
        &self,
        index: usize,
        expected_po: &str,
        record: Record,
    ) -> Result<Record, PoError> {
        let mut table = self.get_all()?;
        Self::check_row(&table, index, expected_po)?;
        let old = table.replace(index, record)?;
        self.save(&table)?;

        info!(index, po_number = %old.po_number, "更新采购单");
        Ok(old)
    }

    /// 与 `delete_at` 相同，但要求该位置的记录仍然是期望的 PO Number
    pub fn delete_at_matching(&self, index: usize, expected_po: &str) -> Result<Record, PoError> {
        let mut table = self.get_all()?;
        Self::check_row(&table, index, expected_po)?;
        let removed = table.remove(index)?;
        self.save(&table)?;

        info!(index, po_number = %removed.po_number, "删除采购单");
        Ok(removed)
    }

    fn check_row(table: &Table, index: usize, expected_po: &str) -> Result<(), PoError> {
        let current = table.record_at(index)?;
        if current.po_number != expected_po {
            return Err(PoError::RowMismatch {
                index,
                expected: expected_po.to_string(),
                found: current.po_number.clone(),
            });
        }
        Ok(())
    }

    /// 整表写回
    fn save(&self, table: &Table) -> Result<(), PoError> {
        self.writer.write(&table.to_sheet(), &self.path)
    }
}
