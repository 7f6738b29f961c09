//! IO 抽象层 - trait 定义
//!
//! 该模块定义了表格文件读写的抽象接口，支持依赖注入和测试 mock。
//! 遵循依赖倒置原则（DIP），面向接口编程。

use std::fmt;
use std::path::Path;
use crate::utils::PoError;

/// 单元格值
///
/// 表格中只会出现三种值：空、文本、数字。日期以 ISO 字符串保存为文本。
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// 从字符串创建单元格，空字符串视为空单元格
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }

    /// 检查是否为空（空白文本也算空）
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{}", s),
            // f64 的 Display 对整数值不输出 ".0"，所以 1001.0 显示为 "1001"
            Cell::Number(n) => write!(f, "{}", n),
        }
    }
}

/// 表格文件原始数据：表头 + 数据行
///
/// 不做任何列校验，列修复由 `schema` 模块负责。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    /// 第一行（列名）
    pub header: Vec<String>,
    /// 数据行，每行长度不一定等于表头长度
    pub rows: Vec<Vec<Cell>>,
}

/// 表格文件读取 trait
///
/// # 职责
/// - 从文件系统读取表格文件的第一个工作表
/// - 不负责列修复和类型转换，仅负责 IO
pub trait TableReader {
    /// 读取表格文件
    ///
    /// # 参数
    /// * `path` - 文件路径
    fn read(&self, path: &Path) -> Result<RawSheet, PoError>;
}

/// 表格文件写入 trait
///
/// # 职责
/// - 将整张表写入文件系统（整表覆盖）
pub trait TableWriter {
    /// 写入表格文件
    ///
    /// # 参数
    /// * `sheet` - 要写入的数据
    /// * `path` - 目标文件路径
    fn write(&self, sheet: &RawSheet, path: &Path) -> Result<(), PoError>;
}
