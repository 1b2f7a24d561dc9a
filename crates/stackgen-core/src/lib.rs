//! stackgen のコア
//!
//! 1つのサービスマニフェストから、互いに整合した以下の成果物を生成します。
//!
//! - `docker-compose.yml`: アプリケーションサービス
//! - `docker-compose.dev.yml`: ローカル開発用オーバーレイ
//! - `Caddyfile`: リバースプロキシ設定
//! - `homepage_services.yaml`: ダッシュボード用カタログ
//! - `proxy.docker-compose.yml`: プロキシコンテナ自体の起動定義

pub mod config;
pub mod envfile;
pub mod error;
pub mod generator;
pub mod model;
pub mod output;
pub mod render;
pub mod schema;

pub use config::{GeneratorConfig, Mode, ServiceKeys};
pub use error::{GenerateError, Result};
pub use generator::{Artifacts, Generator};
pub use model::{GroupId, GroupTable, Manifest, ServiceSpec, Storage};
pub use schema::{FilterReport, ServiceWarning, ValidService, filter_services};
