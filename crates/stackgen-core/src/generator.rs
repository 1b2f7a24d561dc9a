//! 生成パイプライン
//!
//! マニフェストを一度だけフィルタし、同じサービス一覧から
//! 5つの成果物を組み立てる。

use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::model::{GroupTable, Manifest};
use crate::render::{caddy, catalog, compose, dev, proxy};
use crate::schema::{FilterReport, ValidService, filter_services};
use tracing::info;

/// メインの compose ファイル名
pub const COMPOSE_FILE: &str = "docker-compose.yml";
/// 開発用オーバーレイのファイル名
pub const DEV_COMPOSE_FILE: &str = "docker-compose.dev.yml";
/// Caddy 設定ファイル名
pub const CADDYFILE: &str = "Caddyfile";
/// ダッシュボード用カタログのファイル名
pub const CATALOG_FILE: &str = "homepage_services.yaml";
/// プロキシ起動用 compose ファイル名
pub const PROXY_COMPOSE_FILE: &str = "proxy.docker-compose.yml";

/// 生成された5つの成果物
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub compose: String,
    pub dev_overlay: String,
    pub caddyfile: String,
    pub catalog: String,
    pub proxy_runner: String,
}

impl Artifacts {
    /// (ファイル名, 内容) の一覧。書き出し順
    pub fn files(&self) -> [(&'static str, &str); 5] {
        [
            (COMPOSE_FILE, self.compose.as_str()),
            (DEV_COMPOSE_FILE, self.dev_overlay.as_str()),
            (CADDYFILE, self.caddyfile.as_str()),
            (CATALOG_FILE, self.catalog.as_str()),
            (PROXY_COMPOSE_FILE, self.proxy_runner.as_str()),
        ]
    }
}

/// 1回の生成処理
pub struct Generator<'a> {
    config: &'a GeneratorConfig,
    manifest: &'a Manifest,
    groups: GroupTable,
    report: FilterReport,
}

impl<'a> Generator<'a> {
    /// サービスのフィルタはここで一度だけ行う
    ///
    /// グループ表は設定の静的な表にマニフェストの `groups` を重ねたもの。
    pub fn new(config: &'a GeneratorConfig, manifest: &'a Manifest) -> Self {
        let report = filter_services(manifest.services(), &config.service_keys);
        let mut groups = config.groups.clone();
        groups.extend(&manifest.group_table());
        Self {
            config,
            manifest,
            groups,
            report,
        }
    }

    pub fn report(&self) -> &FilterReport {
        &self.report
    }

    pub fn services(&self) -> &[ValidService] {
        &self.report.services
    }

    pub fn groups(&self) -> &GroupTable {
        &self.groups
    }

    pub fn compose(&self) -> Result<String> {
        compose::render_compose(self.services(), self.config)?.to_yaml()
    }

    pub fn dev_overlay(&self) -> Result<String> {
        dev::render_dev_overlay(self.services())?.to_yaml()
    }

    pub fn caddyfile(&self) -> Result<String> {
        caddy::render_caddyfile(
            self.services(),
            self.config,
            self.manifest.caddy_base_config(),
        )
    }

    pub fn catalog(&self) -> Result<String> {
        catalog::to_yaml(&catalog::render_catalog(
            self.services(),
            &self.groups,
            self.config,
        )?)
    }

    pub fn proxy_runner(&self) -> Result<String> {
        proxy::render_proxy_runner(self.config)?.to_yaml()
    }

    /// 全成果物をメモリ上で生成する。ファイルには書かない
    #[tracing::instrument(skip(self), fields(domain = %self.config.domain, mode = ?self.config.mode))]
    pub fn render(&self) -> Result<Artifacts> {
        let artifacts = Artifacts {
            compose: self.compose()?,
            dev_overlay: self.dev_overlay()?,
            caddyfile: self.caddyfile()?,
            catalog: self.catalog()?,
            proxy_runner: self.proxy_runner()?,
        };
        info!(
            services = self.services().len(),
            warnings = self.report.warnings.len(),
            "Artifacts rendered"
        );
        Ok(artifacts)
    }
}
