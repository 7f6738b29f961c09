use std::path::{Path, PathBuf};
use tracing::info;

use crate::utils::PoError;

/// 允许上传的附件扩展名
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg"];

/// 把用户文件保存到上传目录，返回保存后的路径
///
/// 文件以原文件名保存，同名文件直接覆盖。
pub fn store_upload(upload_dir: &Path, source: &Path) -> Result<PathBuf, PoError> {
    let file_name = source
        .file_name()
        .ok_or_else(|| PoError::UnsupportedAttachment(source.display().to_string()))?;

    let extension = source
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());
    if !ALLOWED_EXTENSIONS.iter().any(|&ext| Some(ext) == extension.as_deref()) {
        return Err(PoError::UnsupportedAttachment(format!(
            "{}（仅支持 {}）",
            source.display(),
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }

    std::fs::create_dir_all(upload_dir)?;
    let target = upload_dir.join(file_name);
    std::fs::copy(source, &target)?;

    info!(source = %source.display(), target = %target.display(), "保存附件");
    Ok(target)
}
