/// IO 抽象层模块
///
/// 该模块提供了表格文件读写的抽象接口，遵循依赖倒置原则。
/// 支持依赖注入、测试 mock 和替换 IO 实现（如内存 IO、CSV 等）。
///
/// # 架构设计
///
/// - **traits**: 定义 TableReader/TableWriter trait 接口以及原始数据类型
/// - **xlsx_io**: XLSX 文件的默认实现
///
/// # 使用示例
///
/// ```rust,ignore
/// use po_manager::io::{XlsxTableReader, TableReader};
///
/// let reader = XlsxTableReader;
/// let sheet = reader.read(Path::new("purchase_orders.xlsx"))?;
/// ```
pub mod traits;
pub mod xlsx_io;

// === 导出 trait 定义 ===
pub use traits::{Cell, RawSheet, TableReader, TableWriter};

// === 导出默认实现 ===
pub use xlsx_io::{XlsxTableReader, XlsxTableWriter};
