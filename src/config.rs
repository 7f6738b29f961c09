//! 运行配置
//!
//! 邮件凭据只从进程环境读取（可由 `.env` 预先加载），不写在代码里。

use std::env;
use crate::utils::PoError;

/// 环境变量名
pub mod env_vars {
    pub const TABLE_FILE: &str = "PO_TABLE_FILE";
    pub const UPLOAD_DIR: &str = "PO_UPLOAD_DIR";
    pub const EXPORT_DIR: &str = "PO_EXPORT_DIR";
    pub const SMTP_HOST: &str = "PO_SMTP_HOST";
    pub const SMTP_PORT: &str = "PO_SMTP_PORT";
    pub const SMTP_USERNAME: &str = "PO_SMTP_USERNAME";
    pub const SMTP_PASSWORD: &str = "PO_SMTP_PASSWORD";
    /// 发件人地址，未设置时使用 SMTP 用户名
    pub const MAIL_FROM: &str = "PO_MAIL_FROM";
}

/// 默认值
pub mod defaults {
    pub const TABLE_FILE: &str = "purchase_orders.xlsx";
    pub const UPLOAD_DIR: &str = "uploads";
    pub const EXPORT_DIR: &str = ".";
    pub const SMTP_HOST: &str = "smtp.gmail.com";
    pub const SMTP_PORT: u16 = 587;
}

/// 邮件发送配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub sender: String,
}

impl MailConfig {
    /// 从进程环境读取
    pub fn from_env() -> Result<Self, PoError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源读取（便于测试，不必修改进程环境）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PoError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| PoError::Config(format!("缺少环境变量 {}", key)))
        };

        let smtp_port = match get(env_vars::SMTP_PORT) {
            Some(port) => port.trim().parse::<u16>().map_err(|_| {
                PoError::Config(format!("{} 不是有效端口: {}", env_vars::SMTP_PORT, port))
            })?,
            None => defaults::SMTP_PORT,
        };

        let username = required(env_vars::SMTP_USERNAME)?;
        let password = required(env_vars::SMTP_PASSWORD)?;
        let sender = get(env_vars::MAIL_FROM).unwrap_or_else(|| username.clone());

        Ok(MailConfig {
            smtp_host: get(env_vars::SMTP_HOST).unwrap_or_else(|| defaults::SMTP_HOST.to_string()),
            smtp_port,
            username,
            password,
            sender,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = MailConfig::from_lookup(lookup(&[
            (env_vars::SMTP_USERNAME, "orders@example.com"),
            (env_vars::SMTP_PASSWORD, "secret"),
        ]))
        .unwrap();

        assert_eq!(config.smtp_host, defaults::SMTP_HOST);
        assert_eq!(config.smtp_port, 587);
        assert_eq!(config.sender, "orders@example.com");
    }

    #[test]
    fn test_explicit_values() {
        let config = MailConfig::from_lookup(lookup(&[
            (env_vars::SMTP_HOST, "mail.example.org"),
            (env_vars::SMTP_PORT, "2525"),
            (env_vars::SMTP_USERNAME, "bot"),
            (env_vars::SMTP_PASSWORD, "pw"),
            (env_vars::MAIL_FROM, "Purchasing <purchasing@example.org>"),
        ]))
        .unwrap();

        assert_eq!(config.smtp_host, "mail.example.org");
        assert_eq!(config.smtp_port, 2525);
        assert_eq!(config.sender, "Purchasing <purchasing@example.org>");
    }

    #[test]
    fn test_missing_password() {
        let result = MailConfig::from_lookup(lookup(&[(env_vars::SMTP_USERNAME, "bot")]));
        assert!(matches!(result, Err(PoError::Config(ref msg)) if msg.contains("PO_SMTP_PASSWORD")));
    }

    #[test]
    fn test_invalid_port() {
        let result = MailConfig::from_lookup(lookup(&[
            (env_vars::SMTP_PORT, "smtp"),
            (env_vars::SMTP_USERNAME, "bot"),
            (env_vars::SMTP_PASSWORD, "pw"),
        ]));
        assert!(matches!(result, Err(PoError::Config(_))));
    }
}
