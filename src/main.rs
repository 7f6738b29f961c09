use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::{Path, PathBuf};

use po_manager::attachment::store_upload;
use po_manager::config::{defaults, env_vars};
use po_manager::notify::{DEFAULT_BODY, DEFAULT_SUBJECT};
use po_manager::{
    DocumentExporter, InitOutcome, MailConfig, Notifier, PdfExporter, Record, RecordFilter,
    RecordStore, SmtpNotifier, Status, Table, SUPPORTED_EXTENSIONS,
};

#[derive(Parser)]
#[command(name = "po_manager")]
#[command(about = "采购单管理：新增、浏览、编辑、删除、汇总、导出 PDF 和邮件发送")]
#[command(version)]
struct Cli {
    /// 采购单表格文件(.xlsx)
    #[arg(short, long, global = true, env = env_vars::TABLE_FILE, default_value = defaults::TABLE_FILE)]
    file: PathBuf,

    /// 附件上传目录
    #[arg(long, global = true, env = env_vars::UPLOAD_DIR, default_value = defaults::UPLOAD_DIR)]
    upload_dir: PathBuf,

    /// PDF 输出目录
    #[arg(long, global = true, env = env_vars::EXPORT_DIR, default_value = defaults::EXPORT_DIR)]
    out_dir: PathBuf,

    /// 静默模式(不输出操作结果提示)
    #[arg(long, global = true)]
    quiet: bool,

    /// 输出运行日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 初始化表格文件（不存在则创建，列结构有偏差则修复）
    Init,
    /// 浏览采购单（可过滤）
    List(ListArgs),
    /// 新增采购单
    Add(AddArgs),
    /// 编辑指定位置的采购单（未指定的字段保持原值）
    Update(UpdateArgs),
    /// 删除指定位置的采购单
    Delete(RowArgs),
    /// 按状态汇总金额
    Summary {
        /// 以JSON格式输出
        #[arg(long)]
        json: bool,
    },
    /// 导出为 PDF
    Export {
        /// 行索引
        #[arg(long, allow_negative_numbers = true)]
        index: i64,
    },
    /// 导出 PDF 并通过邮件发送
    Email(EmailArgs),
}

#[derive(Args)]
struct ListArgs {
    /// 按 PO Number 过滤(子串，不区分大小写)
    #[arg(long)]
    po: Option<String>,

    /// 按 Vendor Name 过滤(子串，不区分大小写)
    #[arg(long)]
    vendor: Option<String>,

    /// 按日期过滤(YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,

    /// 以JSON格式输出
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AddArgs {
    #[command(flatten)]
    fields: FieldArgs,

    /// 从JSON文件读取记录(键为列名)，命令行字段会覆盖JSON中的值
    #[arg(long)]
    from_json: Option<PathBuf>,

    /// 附件文件(pdf/png/jpg)，会先复制到上传目录
    #[arg(long)]
    attach: Option<PathBuf>,
}

#[derive(Args)]
struct UpdateArgs {
    #[command(flatten)]
    row: RowArgs,

    #[command(flatten)]
    fields: FieldArgs,

    /// 替换附件
    #[arg(long)]
    attach: Option<PathBuf>,
}

#[derive(Args)]
struct RowArgs {
    /// 行索引(见 list 输出)
    #[arg(long, allow_negative_numbers = true)]
    index: i64,

    /// 要求该行的 PO Number 等于此值，防止索引错位
    #[arg(long)]
    expect_po: Option<String>,
}

#[derive(Args)]
struct EmailArgs {
    /// 行索引
    #[arg(long, allow_negative_numbers = true)]
    index: i64,

    /// 收件人地址
    #[arg(long)]
    to: String,

    /// 邮件主题
    #[arg(long, default_value = DEFAULT_SUBJECT)]
    subject: String,

    /// 邮件正文
    #[arg(long, default_value = DEFAULT_BODY)]
    body: String,
}

/// 采购单字段
#[derive(Args, Default)]
struct FieldArgs {
    #[arg(long)]
    po: Option<String>,

    /// 日期(YYYY-MM-DD)，新增时默认今天
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,

    #[arg(long)]
    vendor: Option<String>,

    #[arg(long)]
    items: Option<String>,

    /// 总金额(不能为负)
    #[arg(long, value_parser = parse_amount)]
    amount: Option<Decimal>,

    /// Pending / Approved / Delivered
    #[arg(long, value_parser = parse_status)]
    status: Option<Status>,

    /// 预计交付日期(YYYY-MM-DD)，新增时默认今天
    #[arg(long, value_parser = parse_date)]
    expected_delivery: Option<NaiveDate>,

    #[arg(long)]
    payment_terms: Option<String>,

    #[arg(long)]
    mode_of_payment: Option<String>,

    #[arg(long)]
    contact: Option<String>,

    #[arg(long)]
    remarks: Option<String>,
}

impl FieldArgs {
    /// 把命令行指定的字段写入记录
    fn apply(&self, record: &mut Record) {
        if let Some(v) = &self.po {
            record.po_number = v.clone();
        }
        if let Some(v) = self.date {
            record.date = format_date(v);
        }
        if let Some(v) = &self.vendor {
            record.vendor_name = v.clone();
        }
        if let Some(v) = &self.items {
            record.items_ordered = v.clone();
        }
        if let Some(v) = self.amount {
            record.total_amount = v;
        }
        if let Some(v) = self.status {
            record.status = v;
        }
        if let Some(v) = self.expected_delivery {
            record.expected_delivery = format_date(v);
        }
        if let Some(v) = &self.payment_terms {
            record.payment_terms = v.clone();
        }
        if let Some(v) = &self.mode_of_payment {
            record.mode_of_payment = v.clone();
        }
        if let Some(v) = &self.contact {
            record.contact_person = v.clone();
        }
        if let Some(v) = &self.remarks {
            record.remarks = v.clone();
        }
    }
}

/// 列表 JSON 输出（带行索引）
#[derive(Serialize)]
struct ListedRecord<'a> {
    index: usize,
    #[serde(flatten)]
    record: &'a Record,
}

fn main() -> Result<()> {
    // .env 必须在解析参数之前加载，clap 的 env 默认值依赖它
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    validate_table_path(&cli.file)?;

    let store = RecordStore::new(&cli.file);
    let outcome = store
        .initialize()
        .with_context(|| format!("初始化表格失败: {:?}", cli.file))?;

    match &cli.command {
        Command::Init => handle_init(&cli, &store, &outcome),
        Command::List(args) => handle_list(&store, args),
        Command::Add(args) => handle_add(&cli, &store, args),
        Command::Update(args) => handle_update(&cli, &store, args),
        Command::Delete(args) => handle_delete(&cli, &store, args),
        Command::Summary { json } => handle_summary(&store, *json),
        Command::Export { index } => handle_export(&cli, &store, *index),
        Command::Email(args) => handle_email(&cli, &store, args),
    }
}

/// 初始化日志（RUST_LOG 优先）
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_directive = if verbose { "po_manager=info" } else { "po_manager=warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// 验证表格文件扩展名
fn validate_table_path(path: &Path) -> Result<()> {
    let extension = path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    if !SUPPORTED_EXTENSIONS.iter().any(|&ext| Some(ext) == extension.as_deref()) {
        bail!("表格文件必须是 .xlsx 文件: {:?}", path);
    }

    Ok(())
}

/// 处理初始化
fn handle_init(cli: &Cli, store: &RecordStore, outcome: &InitOutcome) -> Result<()> {
    if !cli.quiet {
        println!("{}: {:?}", outcome, store.path());
    }
    Ok(())
}

/// 处理列表
fn handle_list(store: &RecordStore, args: &ListArgs) -> Result<()> {
    let table = store.get_all().context("读取采购单失败")?;
    let filter = RecordFilter {
        po_number: args.po.clone(),
        vendor_name: args.vendor.clone(),
        date: args.date,
    };
    let rows: Vec<(usize, &Record)> = table.filter(&filter).collect();

    if args.json {
        let listed: Vec<ListedRecord> = rows
            .iter()
            .map(|(index, record)| ListedRecord { index: *index, record: *record })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listed)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("没有符合条件的采购单");
        return Ok(());
    }

    println!(
        "{:>5}  {:<14} {:<10} {:<24} {:>12}  {:<9}  {:<10}",
        "Index", "PO Number", "Date", "Vendor Name", "Total", "Status", "Expected"
    );
    for (index, record) in &rows {
        println!(
            "{:>5}  {:<14} {:<10} {:<24} {:>12}  {:<9}  {:<10}",
            index,
            truncate(&record.po_number, 14),
            truncate(&record.date, 10),
            truncate(&record.vendor_name, 24),
            record.total_amount.to_string(),
            record.status.as_str(),
            truncate(&record.expected_delivery, 10),
        );
    }

    if filter.is_empty() {
        println!("共 {} 条采购单", table.len());
    } else {
        println!("共 {} 条采购单，匹配 {} 条", table.len(), rows.len());
    }
    Ok(())
}

/// 处理新增
fn handle_add(cli: &Cli, store: &RecordStore, args: &AddArgs) -> Result<()> {
    let mut record = match &args.from_json {
        Some(path) => load_record_json(path)?,
        None => {
            let today = format_date(Local::now().date_naive());
            Record {
                date: today.clone(),
                expected_delivery: today,
                ..Default::default()
            }
        }
    };
    args.fields.apply(&mut record);

    // 先校验再保存附件，避免上传目录里留下无主文件
    record.validate()?;
    if let Some(source) = &args.attach {
        let stored = store_upload(&cli.upload_dir, source)
            .with_context(|| format!("保存附件失败: {:?}", source))?;
        record.attachment = stored.to_string_lossy().into_owned();
    }

    let index = store.add(record).context("新增采购单失败")?;
    if !cli.quiet {
        println!("✓ 采购单已添加（索引 {}）", index);
    }
    Ok(())
}

/// 处理编辑
fn handle_update(cli: &Cli, store: &RecordStore, args: &UpdateArgs) -> Result<()> {
    let table = store.get_all().context("读取采购单失败")?;
    let index = table.resolve_index(args.row.index)?;

    let mut record = table.record_at(index)?.clone();
    args.fields.apply(&mut record);
    if let Some(source) = &args.attach {
        let stored = store_upload(&cli.upload_dir, source)
            .with_context(|| format!("保存附件失败: {:?}", source))?;
        record.attachment = stored.to_string_lossy().into_owned();
    }

    match &args.row.expect_po {
        Some(expected) => store.update_at_matching(index, expected, record)?,
        None => store.update_at(index, record)?,
    };

    if !cli.quiet {
        println!("✓ 采购单已更新（索引 {}）", index);
    }
    Ok(())
}

/// 处理删除
fn handle_delete(cli: &Cli, store: &RecordStore, args: &RowArgs) -> Result<()> {
    let table = store.get_all().context("读取采购单失败")?;
    let index = table.resolve_index(args.index)?;

    let removed = match &args.expect_po {
        Some(expected) => store.delete_at_matching(index, expected)?,
        None => store.delete_at(index)?,
    };

    if !cli.quiet {
        println!("✓ 采购单已删除: {}（原索引 {}）", removed.po_number, index);
    }
    Ok(())
}

/// 处理汇总
fn handle_summary(store: &RecordStore, json: bool) -> Result<()> {
    let summary = store.get_all().context("读取采购单失败")?.summary()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if summary.is_empty() {
        println!("没有可汇总的数据");
    } else {
        print!("{}", summary);
    }
    Ok(())
}

/// 处理 PDF 导出
fn handle_export(cli: &Cli, store: &RecordStore, index: i64) -> Result<()> {
    let table = store.get_all().context("读取采购单失败")?;
    let path = export_row(cli, &table, index)?;

    if !cli.quiet {
        println!("✓ PDF 已保存: {:?}", path);
    }
    Ok(())
}

/// 处理邮件发送
fn handle_email(cli: &Cli, store: &RecordStore, args: &EmailArgs) -> Result<()> {
    let config = MailConfig::from_env().context("邮件配置不完整")?;

    let table = store.get_all().context("读取采购单失败")?;
    let path = export_row(cli, &table, args.index)?;

    let notifier = SmtpNotifier::new(config);
    notifier
        .send(&args.to, &args.subject, &args.body, &path)
        .with_context(|| format!("发送邮件失败（PDF 已保存: {:?}）", path))?;

    if !cli.quiet {
        println!("✓ 邮件已发送至 {}", args.to);
    }
    Ok(())
}

/// 导出指定行
fn export_row(cli: &Cli, table: &Table, index: i64) -> Result<PathBuf> {
    let index = table.resolve_index(index)?;
    let record = table.record_at(index)?;

    let exporter = PdfExporter::new(&cli.out_dir);
    exporter
        .export(record)
        .with_context(|| format!("导出 PDF 失败: {}", record.po_number))
}

/// 读取 JSON 记录文件
fn load_record_json(path: &Path) -> Result<Record> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("读取记录文件失败: {:?}", path))?;

    serde_json::from_str(&content)
        .with_context(|| format!("解析记录文件失败: {:?}", path))
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_date(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| format!("日期格式应为 YYYY-MM-DD: {}", e))
}

fn parse_amount(value: &str) -> std::result::Result<Decimal, String> {
    let amount: Decimal = value
        .trim()
        .parse()
        .map_err(|e| format!("无效金额: {}", e))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err("金额不能为负数".to_string());
    }
    Ok(amount)
}

fn parse_status(value: &str) -> std::result::Result<Status, String> {
    value.parse()
}

/// 截断过长的文本
fn truncate(text: &str, max_chars: usize) -> String {
    let text = text.replace('\n', " ");
    if text.chars().count() > max_chars {
        format!("{}…", text.chars().take(max_chars - 1).collect::<String>())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing() -> Record {
        Record {
            date: "2024-03-01".to_string(),
            items_ordered: "bolts".to_string(),
            total_amount: Decimal::from(100),
            status: Status::Pending,
            payment_terms: "Net 30".to_string(),
            remarks: "first batch".to_string(),
            attachment: "uploads/quote.pdf".to_string(),
            ..Record::new("PO-1", "Acme")
        }
    }

    #[test]
    fn test_apply_changes_only_given_fields() {
        let fields = FieldArgs {
            amount: Some(Decimal::from(250)),
            status: Some(Status::Approved),
            expected_delivery: NaiveDate::from_ymd_opt(2024, 4, 2),
            ..Default::default()
        };

        let mut record = existing();
        fields.apply(&mut record);

        let expected = Record {
            total_amount: Decimal::from(250),
            status: Status::Approved,
            expected_delivery: "2024-04-02".to_string(),
            ..existing()
        };
        assert_eq!(record, expected);
    }

    #[test]
    fn test_apply_nothing_keeps_record() {
        let mut record = existing();
        FieldArgs::default().apply(&mut record);
        assert_eq!(record, existing());
    }

    #[test]
    fn test_parse_amount() {
        assert!(parse_amount("-1").is_err());
        assert!(parse_amount("-0.01").is_err());
        assert!(parse_amount("abc").is_err());
        assert_eq!(parse_amount("0").unwrap(), Decimal::ZERO);
        assert_eq!(parse_amount("-0").unwrap(), Decimal::ZERO);
        assert_eq!(parse_amount(" 12.50 ").unwrap(), "12.5".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("approved").unwrap(), Status::Approved);
        assert_eq!(parse_status("Delivered").unwrap(), Status::Delivered);
        assert!(parse_status("Cancelled").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-03-01").unwrap(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!(parse_date("01/03/2024").is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
