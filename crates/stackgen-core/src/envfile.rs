//! .env ファイルの読み込み

use crate::error::{GenerateError, Result};
use std::path::Path;
use tracing::{debug, info};

/// `.env` の内容を `KEY=VALUE` の組として読み込む（ファイル内の順序を保持）
///
/// - 空行と `#` で始まる行はスキップ
/// - `export KEY=VALUE` 形式も受け付ける
/// - 値を囲むクォート（"value" や 'value'）は除去
#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub fn read_env_file(path: &Path) -> Result<Vec<(String, String)>> {
    let content = std::fs::read_to_string(path).map_err(|e| GenerateError::io(path, e))?;
    let vars = parse_env(&content);
    info!(variable_count = vars.len(), "Loaded variables from .env file");
    Ok(vars)
}

/// `.env` 形式の文字列をパース
pub fn parse_env(content: &str) -> Vec<(String, String)> {
    let mut vars = Vec::new();

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").unwrap_or(line);

        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            let value = strip_quotes(value.trim());
            debug!(key = %key, "Adding variable from .env file");
            vars.push((key.to_string(), value.to_string()));
        }
    }

    vars
}

fn strip_quotes(s: &str) -> &str {
    if s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')))
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}
