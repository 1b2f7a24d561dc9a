pub mod error;

pub use error::*;

use serde::Deserialize;
use serde_yaml::Mapping;
use std::path::{Path, PathBuf};
use tracing::debug;

/// マニフェストのファイル名候補（優先順）
pub const MANIFEST_CANDIDATES: &[&str] = &["manifest.yml", "manifest.yaml"];
/// 設定ファイルのファイル名候補（優先順）
pub const SETTINGS_CANDIDATES: &[&str] = &["stackgen.yml", "stackgen.yaml"];
/// プロジェクトローカルの設定ディレクトリ
pub const PROJECT_DIR: &str = ".stackgen";

/// マニフェストファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 明示指定（--manifest / STACKGEN_MANIFEST）
/// 2. カレントディレクトリ: manifest.yml, manifest.yaml
/// 3. ./.stackgen/ ディレクトリ内: 同様の順序
/// 4. ~/.config/stackgen/manifest.yml（グローバル設定）
pub fn find_manifest_file(explicit: Option<&Path>) -> Result<PathBuf> {
    let current_dir = std::env::current_dir()?;
    find_manifest_file_in(&current_dir, explicit)
}

/// 指定ディレクトリを起点にマニフェストファイルを探す
pub fn find_manifest_file_in(dir: &Path, explicit: Option<&Path>) -> Result<PathBuf> {
    // 1. 明示指定。存在しなければフォールバックせずエラー
    if let Some(path) = explicit {
        let path = if path.is_relative() {
            dir.join(path)
        } else {
            path.to_path_buf()
        };
        if path.is_file() {
            return Ok(path);
        }
        return Err(ConfigError::ExplicitManifestNotFound(path));
    }

    // 2. カレントディレクトリで検索
    if let Some(path) = first_existing(dir, MANIFEST_CANDIDATES) {
        return Ok(path);
    }

    // 3. ./.stackgen/ ディレクトリで検索
    let project_dir = dir.join(PROJECT_DIR);
    if project_dir.is_dir()
        && let Some(path) = first_existing(&project_dir, MANIFEST_CANDIDATES)
    {
        return Ok(path);
    }

    // 4. グローバル設定ファイル
    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("stackgen").join("manifest.yml");
        if global.is_file() {
            return Ok(global);
        }
    }

    Err(ConfigError::ManifestNotFound)
}

fn first_existing(dir: &Path, candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|name| dir.join(name))
        .find(|path| {
            debug!(checking = %path.display(), "Looking for file");
            path.is_file()
        })
}

/// 静的な生成設定（stackgen.yml）
///
/// ```yaml
/// admin_email: ops@example.com
/// network_name: proxy-network
/// proxy_image: caddy:2.8.4
/// groups:
///   1: Apps
///   2: Tools
/// ```
///
/// 未指定の項目は生成側の既定値が使われる。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub admin_email: Option<String>,
    #[serde(default)]
    pub network_name: Option<String>,
    #[serde(default)]
    pub proxy_image: Option<String>,
    /// グループID → グループ名
    #[serde(default)]
    pub groups: Mapping,
    #[serde(default)]
    pub required_keys: Option<Vec<String>>,
    #[serde(default)]
    pub optional_keys: Option<Vec<String>>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::SettingsParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// 設定ファイルを探す（stackgen.yml, stackgen.yaml, .stackgen/settings.yml）
pub fn find_settings_file(dir: &Path) -> Option<PathBuf> {
    first_existing(dir, SETTINGS_CANDIDATES).or_else(|| {
        let path = dir.join(PROJECT_DIR).join("settings.yml");
        path.is_file().then_some(path)
    })
}

/// 設定ファイルを読み込む。見つからなければ既定値
pub fn load_settings(dir: &Path) -> Result<Settings> {
    match find_settings_file(dir) {
        Some(path) => {
            debug!(path = %path.display(), "Loading settings");
            Settings::load(&path)
        }
        None => Ok(Settings::default()),
    }
}
