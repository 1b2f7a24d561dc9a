//! メインの docker-compose.yml

use super::{insert_entry, single_entry};
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::model::Storage;
use crate::schema::ValidService;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

/// 再起動ポリシー
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
    No,
    #[default]
    Always,
    OnFailure,
    UnlessStopped,
}

/// compose のサービス定義
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposeService {
    pub container_name: String,
    pub image: String,
    pub restart: RestartPolicy,
    pub networks: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<Value>,
}

impl ComposeService {
    /// ボリュームを末尾に追加
    pub fn push_volume(&mut self, volume: impl Into<String>) {
        self.volumes
            .get_or_insert_with(Vec::new)
            .push(Value::String(volume.into()));
    }
}

/// トップレベルのボリューム宣言。外部でなければ `{}` になる
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VolumeDecl {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub external: bool,
}

/// トップレベルのネットワーク宣言
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkDecl {
    pub external: bool,
}

/// compose ドキュメント
///
/// 各マッピングは挿入順（マニフェストの宣言順）で出力される。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComposeDocument {
    pub services: Mapping,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Mapping>,
    pub networks: Mapping,
}

impl ComposeDocument {
    /// 共有ネットワークだけを宣言した空のドキュメント
    pub fn with_network(network_name: &str) -> Result<Self> {
        Ok(Self {
            services: Mapping::new(),
            volumes: None,
            networks: single_entry(network_name, &NetworkDecl { external: true })?,
        })
    }

    pub fn insert_service(&mut self, name: &str, service: &ComposeService) -> Result<()> {
        insert_entry(&mut self.services, name, service)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// ストレージ用ボリューム名
pub fn storage_volume_name(service_name: &str) -> String {
    format!("{}_data", service_name)
}

/// 1サービス分の compose 定義
pub fn compose_service(service: &ValidService, config: &GeneratorConfig) -> ComposeService {
    let spec = &service.spec;
    let mut item = ComposeService {
        container_name: service.name.clone(),
        image: spec.image.clone(),
        restart: RestartPolicy::Always,
        networks: vec![config.network_name.clone()],
        environment: spec.environment_refs(),
        volumes: spec.volumes.clone(),
        labels: spec.labels.clone(),
        ports: spec.ports.clone(),
        command: spec.command.clone(),
        depends_on: spec.depends_on.clone(),
    };

    if spec.storage.is_some() {
        item.push_volume(format!("{}:/data", storage_volume_name(&service.name)));
    }

    if config.mode.is_development()
        && let Some(dev_path) = spec.dev_path()
    {
        debug!(service = %service.name, dev_path = %dev_path, "Mounting dev_path in development mode");
        item.push_volume(format!("{}:/app", dev_path));
    }

    item
}

/// 検証済みサービスから compose ドキュメントを組み立てる
#[tracing::instrument(skip_all, fields(services = services.len()))]
pub fn render_compose(
    services: &[ValidService],
    config: &GeneratorConfig,
) -> Result<ComposeDocument> {
    let mut document = ComposeDocument::with_network(&config.network_name)?;
    let mut volumes = Mapping::new();

    for service in services {
        if let Some(storage) = &service.spec.storage {
            insert_entry(
                &mut volumes,
                &storage_volume_name(&service.name),
                &VolumeDecl {
                    external: matches!(storage, Storage::External(_)),
                },
            )?;
        }
        document.insert_service(&service.name, &compose_service(service, config))?;
    }

    document.volumes = Some(volumes);
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Mode, ServiceKeys};
    use crate::schema::filter_services;

    fn services(yaml: &str) -> Vec<ValidService> {
        filter_services(&serde_yaml::from_str(yaml).unwrap(), &ServiceKeys::default()).services
    }

    fn config() -> GeneratorConfig {
        GeneratorConfig::new("example.com").unwrap()
    }

    fn volume_decl(external: bool) -> Value {
        serde_yaml::to_value(VolumeDecl { external }).unwrap()
    }

    #[test]
    fn test_basic_service() {
        let svc = services("api:\n  image: myorg/api\n");
        let api = compose_service(&svc[0], &config());

        assert_eq!(api.container_name, "api");
        assert_eq!(api.image, "myorg/api");
        assert_eq!(api.restart, RestartPolicy::Always);
        assert_eq!(api.networks, vec!["proxy-network"]);
        assert!(api.environment.is_none());
        assert!(api.volumes.is_none());

        let doc = render_compose(&svc, &config()).unwrap();
        let api = doc.services.get("api").unwrap();
        assert_eq!(api["container_name"].as_str(), Some("api"));
        let network = doc.networks.get("proxy-network").unwrap();
        assert_eq!(network["external"].as_bool(), Some(true));
    }

    #[test]
    fn test_environment_is_referenced_not_inlined() {
        let svc = services("api:\n  image: api\n  environment: [SECRET_KEY]\n");
        assert_eq!(
            compose_service(&svc[0], &config()).environment,
            Some(vec!["SECRET_KEY=${SECRET_KEY}".to_string()])
        );
    }

    #[test]
    fn test_internal_storage() {
        let svc = services(
            "db:\n  image: postgres\n  volumes: [./init:/docker-entrypoint-initdb.d]\n  storage: internal\n",
        );
        let doc = render_compose(&svc, &config()).unwrap();

        let volumes = doc.volumes.as_ref().unwrap();
        assert_eq!(volumes.get("db_data"), Some(&volume_decl(false)));
        assert_eq!(
            compose_service(&svc[0], &config()).volumes,
            Some(vec![
                Value::String("./init:/docker-entrypoint-initdb.d".to_string()),
                Value::String("db_data:/data".to_string()),
            ])
        );
    }

    #[test]
    fn test_external_storage() {
        let doc = render_compose(
            &services("db:\n  image: postgres\n  storage: pg_volume\n"),
            &config(),
        )
        .unwrap();
        let volumes = doc.volumes.as_ref().unwrap();
        assert_eq!(volumes.get("db_data"), Some(&volume_decl(true)));
    }

    #[test]
    fn test_dev_path_only_in_development_mode() {
        let svc = services("web:\n  image: web\n  dev_path: ./web\n");

        let prod = compose_service(&svc[0], &config());
        assert!(prod.volumes.is_none());

        let dev = compose_service(&svc[0], &config().with_mode(Mode::Development));
        assert_eq!(
            dev.volumes,
            Some(vec![Value::String("./web:/app".to_string())])
        );
    }

    #[test]
    fn test_services_keep_declaration_order() {
        let doc = render_compose(
            &services("zeta:\n  image: z\nalpha:\n  image: a\n"),
            &config(),
        )
        .unwrap();
        let names: Vec<_> = doc.services.keys().filter_map(Value::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_yaml_layout() {
        let doc = render_compose(
            &services("db:\n  image: postgres\n  storage: internal\n"),
            &config(),
        )
        .unwrap();
        let yaml = doc.to_yaml().unwrap();

        assert_eq!(
            yaml,
            "services:\n  db:\n    container_name: db\n    image: postgres\n    restart: always\n    networks:\n    - proxy-network\n    volumes:\n    - db_data:/data\nvolumes:\n  db_data: {}\nnetworks:\n  proxy-network:\n    external: true\n"
        );
    }

    #[test]
    fn test_pass_through_fields() {
        let doc = render_compose(
            &services(
                r#"
api:
  image: api
  labels:
    traefik.enable: "false"
  ports: ["8080:80"]
  command: ["serve", "--port", "80"]
  depends_on: [db]
"#,
            ),
            &config(),
        )
        .unwrap();
        let yaml = doc.to_yaml().unwrap();
        assert!(yaml.contains("traefik.enable:"));
        assert!(yaml.contains("8080:80"));
        assert!(yaml.contains("- serve"));
        assert!(yaml.contains("depends_on:\n    - db"));
    }
}
