pub mod utils;
pub mod io;
pub mod schema;
pub mod record;
pub mod table;
pub mod filter;
pub mod summary;
pub mod store;
pub mod export;
pub mod notify;
pub mod attachment;
pub mod config;

// 重新导出主要结构
pub use record::{Record, Status};
pub use table::Table;
pub use filter::RecordFilter;
pub use summary::{StatusSummary, StatusTotal};
pub use store::{InitOutcome, RecordStore};
pub use export::{DocumentExporter, PdfExporter};
pub use notify::{Notifier, SmtpNotifier};
pub use config::MailConfig;
pub use utils::PoError;

// 常量定义
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx"];
