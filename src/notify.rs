//! 邮件通知模块
//!
//! 把导出的文件作为附件发送给指定收件人。发送是同步的，
//! 失败直接返回给调用方，不重试也不排队。

use std::path::Path;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

use crate::config::MailConfig;
use crate::utils::PoError;

/// 默认邮件主题
pub const DEFAULT_SUBJECT: &str = "Your Purchase Order";
/// 默认邮件正文
pub const DEFAULT_BODY: &str = "Attached is your purchase order.";

/// 通知发送 trait
pub trait Notifier {
    /// 发送带附件的邮件
    ///
    /// # 参数
    /// * `recipient` - 收件人地址
    /// * `subject` - 邮件主题
    /// * `body` - 纯文本正文
    /// * `attachment` - 已存在的附件文件路径
    fn send(&self, recipient: &str, subject: &str, body: &str, attachment: &Path) -> Result<(), PoError>;
}

/// 基于 SMTP（STARTTLS）的通知器
#[derive(Debug, Clone)]
pub struct SmtpNotifier {
    config: MailConfig,
}

impl SmtpNotifier {
    pub fn new(config: MailConfig) -> Self {
        SmtpNotifier { config }
    }

    /// 构建邮件（不发送）
    pub fn build_message(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
        attachment: &Path,
    ) -> Result<Message, PoError> {
        let from: Mailbox = self.config.sender.parse()?;
        let to: Mailbox = recipient.trim().parse()?;

        let filename = attachment
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| PoError::UnsupportedAttachment(attachment.display().to_string()))?;
        let content = std::fs::read(attachment)?;
        let content_type = ContentType::parse(content_type_for(attachment))
            .map_err(|e| PoError::UnsupportedAttachment(e.to_string()))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(body.to_string()))
                    .singlepart(Attachment::new(filename).body(content, content_type)),
            )?;
        Ok(message)
    }
}

impl Notifier for SmtpNotifier {
    fn send(&self, recipient: &str, subject: &str, body: &str, attachment: &Path) -> Result<(), PoError> {
        let message = self.build_message(recipient, subject, body, attachment)?;

        let credentials = Credentials::new(self.config.username.clone(), self.config.password.clone());
        let mailer = SmtpTransport::starttls_relay(&self.config.smtp_host)?
            .port(self.config.smtp_port)
            .credentials(credentials)
            .build();

        mailer.send(&message)?;
        info!(recipient, attachment = %attachment.display(), "邮件已发送");
        Ok(())
    }
}

/// 按扩展名推断附件类型
fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
