//! 開発用オーバーレイ docker-compose.dev.yml
//!
//! `dev_path` を持つサービスだけを、ローカルビルドに差し替えるための
//! 差分ドキュメントとして出力する。メインの compose に重ねて使う。

use super::insert_entry;
use crate::error::Result;
use crate::schema::ValidService;
use serde::Serialize;
use serde_yaml::Mapping;

/// 開発用 Dockerfile 名（dev_path 直下に置く）
pub const DEV_DOCKERFILE: &str = "Dockerfile-dev";

/// ビルド設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DevBuild {
    pub context: String,
    pub dockerfile: String,
}

/// オーバーレイのサービス定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DevService {
    pub container_name: String,
    pub build: DevBuild,
    pub volumes: Vec<String>,
    pub ports: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DevOverlayDocument {
    pub services: Mapping,
}

impl DevOverlayDocument {
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// dev_path を持つサービスのオーバーレイ定義
pub fn dev_service(service: &ValidService) -> Option<DevService> {
    let dev_path = service.spec.dev_path()?;
    let port = service.spec.port();

    Some(DevService {
        container_name: service.name.clone(),
        build: DevBuild {
            context: dev_path.to_string(),
            dockerfile: DEV_DOCKERFILE.to_string(),
        },
        volumes: vec![format!("{}:/app", dev_path)],
        ports: vec![format!("{}:{}", port, port)],
    })
}

#[tracing::instrument(skip_all, fields(services = services.len()))]
pub fn render_dev_overlay(services: &[ValidService]) -> Result<DevOverlayDocument> {
    let mut document = DevOverlayDocument::default();

    for service in services {
        if let Some(item) = dev_service(service) {
            insert_entry(&mut document.services, &service.name, &item)?;
        }
    }

    Ok(document)
}
