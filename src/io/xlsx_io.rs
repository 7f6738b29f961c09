//! XLSX 文件 IO 实现
//!
//! 提供基于文件系统的默认表格读写实现：calamine 读取，rust_xlsxwriter 写入

use std::io::Write;
use std::path::Path;
use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook};
use tracing::debug;

use super::traits::{Cell, RawSheet, TableReader, TableWriter};
use crate::utils::PoError;

/// 默认的 XLSX 读取器（读取第一个工作表）
#[derive(Debug, Clone, Default)]
pub struct XlsxTableReader;

impl TableReader for XlsxTableReader {
    fn read(&self, path: &Path) -> Result<RawSheet, PoError> {
        let mut workbook: Xlsx<_> = open_workbook(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| PoError::MissingWorksheet(path.to_path_buf()))??;

        let mut rows = range.rows();
        let header = match rows.next() {
            Some(first) => first.iter().map(|data| cell_from_data(data).to_string()).collect(),
            None => Vec::new(),
        };
        let rows: Vec<Vec<Cell>> = rows
            .map(|row| row.iter().map(cell_from_data).collect())
            .collect();

        debug!(path = %path.display(), columns = header.len(), rows = rows.len(), "读取表格");
        Ok(RawSheet { header, rows })
    }
}

/// 默认的 XLSX 写入器
///
/// 整张表先序列化到内存，再写入同目录的临时文件并重命名覆盖目标文件，
/// 写入失败时原文件保持不变。
#[derive(Debug, Clone, Default)]
pub struct XlsxTableWriter;

impl TableWriter for XlsxTableWriter {
    fn write(&self, sheet: &RawSheet, path: &Path) -> Result<(), PoError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let bold = Format::new().set_bold();

        for (col, name) in sheet.header.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, name, &bold)?;
        }

        for (i, row) in sheet.rows.iter().enumerate() {
            let row_num = (i + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                match cell {
                    Cell::Empty => {}
                    Cell::Text(text) => {
                        worksheet.write_string(row_num, col as u16, text)?;
                    }
                    Cell::Number(n) => {
                        worksheet.write_number(row_num, col as u16, *n)?;
                    }
                }
            }
        }

        let bytes = workbook.save_to_buffer()?;
        write_atomic(path, &bytes)?;

        debug!(path = %path.display(), rows = sheet.rows.len(), bytes = bytes.len(), "写入表格");
        Ok(())
    }
}

/// 原子写入：临时文件 + 重命名
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PoError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // 确保父目录存在
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    // 临时文件默认仅所有者可读写，替换后沿用原文件的权限
    match std::fs::metadata(path) {
        Ok(metadata) => tmp.as_file().set_permissions(metadata.permissions())?,
        Err(_) => set_default_permissions(tmp.as_file())?,
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// 新建文件的权限（Unix 下为 0644）
#[cfg(unix)]
fn set_default_permissions(file: &std::fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_default_permissions(_file: &std::fs::File) -> std::io::Result<()> {
    Ok(())
}

/// calamine 单元格转换
fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        // 用户在表格软件里直接录入的日期，转回 ISO 字符串
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) if datetime.time() == chrono::NaiveTime::MIN => {
                Cell::Text(datetime.format("%Y-%m-%d").to_string())
            }
            Some(datetime) => Cell::Text(datetime.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::text(s.clone()),
        Data::Error(e) => Cell::Text(format!("#{:?}", e)),
    }
}
