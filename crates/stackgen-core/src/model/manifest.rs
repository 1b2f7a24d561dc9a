//! マニフェスト（入力ドキュメント）

use crate::error::{GenerateError, Result};
use serde::{Deserialize, Deserializer};
use serde_yaml::{Mapping, Value};
use std::path::Path;
use tracing::{debug, info};

use super::group::GroupTable;

/// サービス・グループ・Caddy ベース設定をまとめた入力ドキュメント
///
/// `services` はスキーマフィルタを通すまで生のマッピングのまま保持する。
/// 宣言順はそのまま出力順になる。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Manifest {
    #[serde(default, deserialize_with = "null_as_empty")]
    services: Mapping,
    #[serde(default, deserialize_with = "null_as_empty")]
    groups: Mapping,
    /// Caddyfile のヘッダ直後にそのまま挿入されるブロック
    #[serde(default)]
    pub caddy_base_config: Option<String>,
}

impl Manifest {
    /// YAML文字列からパース。空ドキュメントはサービスなしとして扱う
    pub fn from_yaml_str(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        let value: Value = serde_yaml::from_str(content)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value)
    }

    /// ファイルから読み込む
    #[tracing::instrument(skip(path), fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Reading manifest");
        let content =
            std::fs::read_to_string(path).map_err(|e| GenerateError::io(path, e))?;
        let manifest =
            Self::from_yaml_str(&content).map_err(|e| GenerateError::ManifestParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        info!(
            services = manifest.service_count(),
            "Manifest loaded successfully"
        );
        Ok(manifest)
    }

    /// 生のサービスマッピング（宣言順）
    pub fn services(&self) -> &Mapping {
        &self.services
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    /// マニフェスト内のグループ表
    pub fn group_table(&self) -> GroupTable {
        GroupTable::from_mapping(&self.groups)
    }

    /// 空白のみのブロックは無視する
    pub fn caddy_base_config(&self) -> Option<&str> {
        self.caddy_base_config
            .as_deref()
            .filter(|block| !block.trim().is_empty())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Mapping, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Mapping>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GroupId;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::from_yaml_str(
            r#"
groups:
  1: Tools
services:
  web:
    image: nginx
  api:
    image: myorg/api
caddy_base_config: |
  :5000 {
      respond "ok"
  }
"#,
        )
        .unwrap();

        assert_eq!(manifest.service_count(), 2);
        let names: Vec<_> = manifest
            .services()
            .keys()
            .filter_map(|k| k.as_str())
            .collect();
        assert_eq!(names, vec!["web", "api"]);
        assert_eq!(
            manifest.group_table().resolve(Some(&GroupId::new("1"))),
            "Tools"
        );
        assert!(manifest.caddy_base_config().unwrap().contains(":5000"));
    }

    #[test]
    fn test_empty_document() {
        let manifest = Manifest::from_yaml_str("").unwrap();
        assert_eq!(manifest.service_count(), 0);
        assert!(manifest.services().is_empty());
        assert!(manifest.caddy_base_config().is_none());
    }

    #[test]
    fn test_null_services() {
        let manifest = Manifest::from_yaml_str("services:\n").unwrap();
        assert_eq!(manifest.service_count(), 0);
    }

    #[test]
    fn test_malformed_manifest() {
        assert!(Manifest::from_yaml_str("services: [unclosed").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = Manifest::load(&temp_dir.path().join("manifest.yml"));
        assert!(matches!(result, Err(GenerateError::IoError { .. })));
    }

    #[test]
    fn test_load_parse_error_reports_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("manifest.yml");
        std::fs::write(&path, "services: [unclosed").unwrap();

        match Manifest::load(&path) {
            Err(GenerateError::ManifestParse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("Expected ManifestParse error, got {:?}", other),
        }
    }
}
