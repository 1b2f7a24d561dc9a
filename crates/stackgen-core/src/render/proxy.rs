//! プロキシ起動用 proxy.docker-compose.yml
//!
//! マニフェストに依存しない固定テンプレート。アプリケーションとは独立に
//! Caddy コンテナを起動・更新できるよう別ファイルにしている。

use super::compose::{ComposeDocument, ComposeService, RestartPolicy};
use crate::config::GeneratorConfig;
use crate::error::Result;
use serde_yaml::Value;

/// プロキシコンテナ名
pub const PROXY_CONTAINER: &str = "caddy";

const PROXY_VOLUMES: &[&str] = &[
    "/var/run/docker.sock:/var/run/docker.sock",
    "./Caddyfile:/etc/caddy/Caddyfile",
];

const PROXY_PORTS: &[&str] = &["80:80", "443:443", "443:443/udp", "5000:5000"];

fn strings(items: &[&str]) -> Vec<Value> {
    items.iter().map(|s| Value::String(s.to_string())).collect()
}

/// プロキシコンテナの定義
pub fn proxy_service(config: &GeneratorConfig) -> ComposeService {
    ComposeService {
        container_name: PROXY_CONTAINER.to_string(),
        image: config.proxy_image.clone(),
        restart: RestartPolicy::Always,
        networks: vec![config.network_name.clone()],
        environment: None,
        volumes: Some(strings(PROXY_VOLUMES)),
        labels: None,
        ports: Some(Value::Sequence(strings(PROXY_PORTS))),
        command: None,
        depends_on: None,
    }
}

pub fn render_proxy_runner(config: &GeneratorConfig) -> Result<ComposeDocument> {
    let mut document = ComposeDocument::with_network(&config.network_name)?;
    document.insert_service(PROXY_CONTAINER, &proxy_service(config))?;
    Ok(document)
}
