//! 成果物の書き出し
//!
//! 書き込み・コピーの失敗はすべて即座にエラーとして返す。

use crate::error::{GenerateError, Result};
use crate::generator::Artifacts;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 出力ディレクトリへそのままコピーする補助ファイル
pub const AUXILIARY_FILES: &[&str] = &[".env", "Dockerfile-caddy"];

/// 出力ディレクトリを削除する。存在しなければ何もしない
///
/// `protected` のいずれかと一致する、またはそれを含むディレクトリは削除せずエラーにする。
#[tracing::instrument(skip(output_dir, protected), fields(output_dir = %output_dir.display()))]
pub fn clean_output_dir(output_dir: &Path, protected: &[&Path]) -> Result<()> {
    if !output_dir.exists() {
        return Ok(());
    }

    let target = output_dir
        .canonicalize()
        .map_err(|e| GenerateError::io(output_dir, e))?;
    for path in protected {
        let Ok(path) = path.canonicalize() else {
            continue;
        };
        if path.starts_with(&target) {
            return Err(GenerateError::InvalidConfig(format!(
                "出力ディレクトリ {} は {} を含むため削除できません",
                target.display(),
                path.display()
            )));
        }
    }

    std::fs::remove_dir_all(&target).map_err(|e| GenerateError::io(&target, e))?;
    info!("Removed output directory");
    Ok(())
}

/// テキストを書き出す。親ディレクトリは必要に応じて作成
pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| GenerateError::io(parent, e))?;
    }
    std::fs::write(path, contents).map_err(|e| GenerateError::io(path, e))?;
    debug!(path = %path.display(), bytes = contents.len(), "File written");
    Ok(())
}

/// 5つの成果物を書き出し、書き出したパスを返す
#[tracing::instrument(skip(artifacts, output_dir), fields(output_dir = %output_dir.display()))]
pub fn write_artifacts(artifacts: &Artifacts, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(5);
    for (file_name, contents) in artifacts.files() {
        let path = output_dir.join(file_name);
        write_text(&path, contents)?;
        info!(path = %path.display(), "File written successfully");
        written.push(path);
    }
    Ok(written)
}

/// 補助ファイルをコピーする
///
/// コピー元が存在しないファイルは警告のみでスキップする。
#[tracing::instrument(skip(source_dir, output_dir), fields(source_dir = %source_dir.display(), output_dir = %output_dir.display()))]
pub fn copy_auxiliary_files(
    source_dir: &Path,
    output_dir: &Path,
    names: &[&str],
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir).map_err(|e| GenerateError::io(output_dir, e))?;

    let mut copied = Vec::new();
    for name in names {
        let from = source_dir.join(name);
        if !from.is_file() {
            warn!(file = %from.display(), "Auxiliary file not found, skipping");
            continue;
        }
        let to = output_dir.join(name);
        std::fs::copy(&from, &to).map_err(|e| GenerateError::io(&from, e))?;
        info!(from = %from.display(), to = %to.display(), "Copied auxiliary file");
        copied.push(to);
    }
    Ok(copied)
}
