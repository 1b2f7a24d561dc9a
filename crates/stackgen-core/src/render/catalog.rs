//! ダッシュボード用サービスカタログ homepage_services.yaml
//!
//! 出力はグループ名をキーにした単一キーマッピングの列。
//! グループは最初に現れた順に並ぶ。

use super::{hostname, single_entry};
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::model::{GroupTable, ServiceSpec};
use crate::schema::ValidService;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

/// ワイルドカード subdomain のリンク先
pub const WILDCARD_LINK_SUBDOMAIN: &str = "app";

/// カタログの1エントリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub href: String,
    pub container: String,
    #[serde(rename = "showStats")]
    pub show_stats: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// `{ グループ名: [ { 表示名: エントリ } ] }` の列
pub type CatalogDocument = Vec<Mapping>;

/// カタログのリンク先 URL
///
/// ホスト名の決め方は Caddyfile と同じだが、`*` は `app` に置き換える。
pub fn catalog_href(spec: &ServiceSpec, domain: &str) -> String {
    let subdomain = match spec.subdomain.as_deref().unwrap_or_default() {
        "*" => WILDCARD_LINK_SUBDOMAIN,
        other => other,
    };
    format!("http://{}", hostname(subdomain, domain))
}

pub fn catalog_entry(service: &ValidService, config: &GeneratorConfig) -> CatalogEntry {
    let spec = &service.spec;
    CatalogEntry {
        href: catalog_href(spec, &config.domain),
        container: service.name.clone(),
        show_stats: true,
        description: spec.description().map(str::to_string),
        icon: spec.icon().map(str::to_string),
    }
}

#[tracing::instrument(skip_all, fields(services = services.len()))]
pub fn render_catalog(
    services: &[ValidService],
    groups: &GroupTable,
    config: &GeneratorConfig,
) -> Result<CatalogDocument> {
    // グループ名 -> エントリ列（最初に現れた順）
    let mut buckets = Mapping::new();

    for service in services {
        let group = groups.resolve(service.spec.group.as_ref());
        let label = service.spec.title().unwrap_or(&service.name);
        let item = Value::Mapping(single_entry(label, &catalog_entry(service, config))?);

        match buckets.get_mut(group) {
            Some(Value::Sequence(entries)) => entries.push(item),
            _ => {
                buckets.insert(Value::from(group), Value::Sequence(vec![item]));
            }
        }
    }

    Ok(buckets
        .into_iter()
        .map(|(group, entries)| {
            let mut section = Mapping::new();
            section.insert(group, entries);
            section
        })
        .collect())
}

pub fn to_yaml(document: &CatalogDocument) -> Result<String> {
    Ok(serde_yaml::to_string(document)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceKeys;
    use crate::model::UNGROUPED;
    use crate::schema::filter_services;

    fn services(yaml: &str) -> Vec<ValidService> {
        filter_services(&serde_yaml::from_str(yaml).unwrap(), &ServiceKeys::default()).services
    }

    fn groups() -> GroupTable {
        let mut table = GroupTable::new();
        table.insert("1", "Tools");
        table.insert("2", "Data");
        table
    }

    fn config() -> GeneratorConfig {
        GeneratorConfig::new("example.com").unwrap()
    }

    fn keys(map: &Mapping) -> Vec<&str> {
        map.keys().filter_map(Value::as_str).collect()
    }

    fn group_names(doc: &CatalogDocument) -> Vec<&str> {
        doc.iter().flat_map(keys).collect()
    }

    #[test]
    fn test_wildcard_links_to_app() {
        let svc = services("front:\n  image: front\n  subdomain: \"*\"\n");
        assert_eq!(catalog_href(&svc[0].spec, "example.com"), "http://app.example.com");
    }

    #[test]
    fn test_href_without_subdomain_is_root() {
        let svc = services("worker:\n  image: worker\n");
        assert_eq!(catalog_href(&svc[0].spec, "example.com"), "http://example.com");
    }

    #[test]
    fn test_grouping_and_order() {
        let doc = render_catalog(
            &services(
                r#"
grafana:
  image: grafana
  subdomain: grafana
  group: 2
adminer:
  image: adminer
  group: 1
orphan:
  image: orphan
  group: 9
lonely:
  image: lonely
pgadmin:
  image: pgadmin
  group: 1
"#,
            ),
            &groups(),
            &config(),
        )
        .unwrap();

        assert_eq!(group_names(&doc), vec!["Data", "Tools", UNGROUPED]);
        let tools = doc[1].get("Tools").and_then(Value::as_sequence).unwrap();
        let names: Vec<_> = tools
            .iter()
            .filter_map(Value::as_mapping)
            .flat_map(keys)
            .collect();
        assert_eq!(names, vec!["adminer", "pgadmin"]);
        let ungrouped = doc[2].get(UNGROUPED).and_then(Value::as_sequence).unwrap();
        assert_eq!(ungrouped.len(), 2);
    }

    #[test]
    fn test_entry_fields() {
        let svc = services(
            r#"
api:
  image: api
  title: Public API
  description: REST backend
  icon: mdi-api
  subdomain: api
"#,
        );
        let doc = render_catalog(&svc, &groups(), &config()).unwrap();

        let section = doc[0].get(UNGROUPED).unwrap();
        assert!(section[0].get("Public API").is_some());
        assert_eq!(
            catalog_entry(&svc[0], &config()),
            CatalogEntry {
                href: "http://api.example.com".to_string(),
                container: "api".to_string(),
                show_stats: true,
                description: Some("REST backend".to_string()),
                icon: Some("mdi-api".to_string()),
            }
        );
    }

    #[test]
    fn test_yaml_layout() {
        let doc = render_catalog(
            &services("api:\n  image: api\n  group: 1\n"),
            &groups(),
            &config(),
        )
        .unwrap();
        assert_eq!(
            to_yaml(&doc).unwrap(),
            "- Tools:\n  - api:\n      href: http://example.com\n      container: api\n      showStats: true\n"
        );
    }
}
