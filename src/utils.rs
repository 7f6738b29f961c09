use thiserror::Error;
use std::path::{Path, PathBuf};

/// 自定义错误类型
#[derive(Error, Debug)]
pub enum PoError {
    #[error("校验失败: {0}")]
    Validation(String),

    #[error("行索引越界: {index}（当前共 {len} 行）")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("第 {index} 行已变化: 期望 PO Number \"{expected}\"，实际为 \"{found}\"")]
    RowMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("无效单元格（第 {row} 行, 列 \"{column}\"）: {value}")]
    InvalidCell {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("工作簿中没有工作表: {0}")]
    MissingWorksheet(PathBuf),

    #[error("不支持的附件类型: {0}")]
    UnsupportedAttachment(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("金额合计溢出（{0}）")]
    AmountOverflow(String),

    #[error("文档生成失败: {0}")]
    Document(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("读取表格失败: {0}")]
    SheetRead(#[from] calamine::XlsxError),

    #[error("写入表格失败: {0}")]
    SheetWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("邮件地址无效: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("邮件构建失败: {0}")]
    Mail(#[from] lettre::error::Error),

    #[error("邮件发送失败: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// 去除首尾空白后是否为空
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// 不区分大小写的子串匹配
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// 把多行文本压成一行（导出文档时每个字段只占一行）
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 创建文件备份
pub fn create_backup(file_path: &Path) -> Result<PathBuf, PoError> {
    if !file_path.exists() {
        return Err(PoError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "原文件不存在"
        )));
    }

    let timestamp = chrono::Local::now().format("%Y-%m-%d-%H-%M-%S");
    let backup_path = file_path.with_extension(format!("{}.bak", timestamp));

    std::fs::copy(file_path, &backup_path)
        .map_err(PoError::IoError)?;

    Ok(backup_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("   \t"));
        assert!(!is_blank(" PO-1 "));
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Acme Supplies", "acme"));
        assert!(contains_ignore_case("PO-2024-001", "po-2024"));
        assert!(!contains_ignore_case("Globex", "acme"));
        assert!(contains_ignore_case("anything", ""));
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("10 x bolts\n5 x nuts"), "10 x bolts 5 x nuts");
        assert_eq!(single_line("  plain  "), "plain");
    }

    #[test]
    fn test_create_backup() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("orders.xlsx");
        std::fs::write(&file, b"data").unwrap();

        let backup = create_backup(&file).unwrap();
        assert!(backup.exists());
        assert_eq!(std::fs::read(&backup).unwrap(), b"data");
    }

    #[test]
    fn test_create_backup_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = create_backup(&temp_dir.path().join("missing.xlsx"));
        assert!(matches!(result, Err(PoError::IoError(_))));
    }
}
