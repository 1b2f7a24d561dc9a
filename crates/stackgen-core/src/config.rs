//! 生成設定
//!
//! 起動時に一度だけ組み立て、各レンダラーへ参照で渡す。
//! レンダラーはプロセスの環境変数を直接読まない。

use crate::error::{GenerateError, Result};
use crate::model::GroupTable;

/// 共有ネットワーク名の既定値
pub const DEFAULT_NETWORK_NAME: &str = "proxy-network";
/// 管理者メールアドレスの既定値
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@localhost";
/// プロキシコンテナのイメージ
pub const DEFAULT_PROXY_IMAGE: &str = "caddy:2.8.4";

/// 実行モード
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Production,
    /// dev_path をメインの compose にもマウントする
    Development,
}

impl Mode {
    /// `development` 以外はすべて本番扱い
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("development") {
            Self::Development
        } else {
            Self::Production
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// サービス定義で許可されるキー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceKeys {
    pub required: Vec<String>,
    pub optional: Vec<String>,
}

impl Default for ServiceKeys {
    fn default() -> Self {
        Self {
            required: vec!["image".to_string()],
            optional: [
                "title",
                "description",
                "icon",
                "environment",
                "volumes",
                "labels",
                "subdomain",
                "internal_port",
                "ports",
                "command",
                "depends_on",
                "storage",
                "dev_path",
                "group",
                "auth",
                "env",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
        }
    }
}

impl ServiceKeys {
    /// 設定ファイル由来のキー一覧から作成。`image` は必須から外せない
    pub fn new(required: Vec<String>, optional: Vec<String>) -> Result<Self> {
        if !required.iter().any(|k| k == "image") {
            return Err(GenerateError::InvalidConfig(
                "required_keys には image を含めてください".to_string(),
            ));
        }
        Ok(Self { required, optional })
    }

    pub fn is_known(&self, key: &str) -> bool {
        self.required.iter().any(|k| k == key) || self.optional.iter().any(|k| k == key)
    }
}

/// 全レンダラー共通の設定
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub domain: String,
    pub network_name: String,
    pub admin_email: String,
    pub groups: GroupTable,
    pub service_keys: ServiceKeys,
    pub mode: Mode,
    /// Caddy の basic_auth に渡すハッシュ済みパスワード
    pub basic_auth: Option<String>,
    /// ACME DNS チャレンジ用の Cloudflare API トークン
    pub dns_api_token: Option<String>,
    pub proxy_image: String,
}

impl GeneratorConfig {
    /// ドメインは必須。空文字はエラー
    pub fn new(domain: impl Into<String>) -> Result<Self> {
        let domain = domain.into().trim().to_string();
        if domain.is_empty() {
            return Err(GenerateError::MissingDomain);
        }
        Ok(Self {
            domain,
            network_name: DEFAULT_NETWORK_NAME.to_string(),
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            groups: GroupTable::new(),
            service_keys: ServiceKeys::default(),
            mode: Mode::default(),
            basic_auth: None,
            dns_api_token: None,
            proxy_image: DEFAULT_PROXY_IMAGE.to_string(),
        })
    }

    /// `Option` のドメインから作成（環境変数由来の値向け）
    pub fn from_domain(domain: Option<String>) -> Result<Self> {
        Self::new(domain.ok_or(GenerateError::MissingDomain)?)
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_network_name(mut self, name: impl Into<String>) -> Self {
        self.network_name = name.into();
        self
    }

    pub fn with_admin_email(mut self, email: impl Into<String>) -> Self {
        self.admin_email = email.into();
        self
    }

    pub fn with_groups(mut self, groups: GroupTable) -> Self {
        self.groups = groups;
        self
    }

    pub fn with_service_keys(mut self, keys: ServiceKeys) -> Self {
        self.service_keys = keys;
        self
    }

    pub fn with_basic_auth(mut self, credential: Option<String>) -> Self {
        self.basic_auth = credential.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn with_dns_api_token(mut self, token: Option<String>) -> Self {
        self.dns_api_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_proxy_image(mut self, image: impl Into<String>) -> Self {
        self.proxy_image = image.into();
        self
    }
}
