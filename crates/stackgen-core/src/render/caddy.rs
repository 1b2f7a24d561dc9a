//! Caddyfile
//!
//! ヘッダ（グローバルオプション）、共有 basic 認証スニペット、
//! マニフェストのベースブロック、サービスごとのサイトブロックの順に並べる。
//! 各要素は独立したビルダー関数で組み立てる。

use super::hostname;
use crate::config::GeneratorConfig;
use crate::error::{GenerateError, Result};
use crate::schema::ValidService;
use std::borrow::Cow;
use tracing::debug;

/// 共有 basic 認証スニペット名
pub const AUTH_SNIPPET: &str = "auth";
/// basic 認証のユーザー名
pub const AUTH_USER: &str = "admin";

const INDENT: &str = "    ";

/// Caddyfile のトークンとして安全な形にする
///
/// 空白・ダブルクォート・波括弧を含む場合と `#` で始まる場合はクォートする。
pub fn quote(token: &str) -> Cow<'_, str> {
    let needs_quote = token.is_empty()
        || token.starts_with('#')
        || token
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '{' | '}'));
    if !needs_quote {
        return Cow::Borrowed(token);
    }
    let escaped = token.replace('\\', "\\\\").replace('"', "\\\"");
    Cow::Owned(format!("\"{}\"", escaped))
}

/// グローバルオプションブロック
pub fn global_options(admin_email: &str, dns_api_token: Option<&str>) -> String {
    let mut lines = vec![
        "{".to_string(),
        format!("{INDENT}email {}", quote(admin_email)),
        format!("{INDENT}log {{"),
        format!("{INDENT}{INDENT}output stdout"),
        format!("{INDENT}{INDENT}format console"),
        format!("{INDENT}}}"),
    ];
    if let Some(token) = dns_api_token {
        lines.push(format!("{INDENT}acme_dns cloudflare {}", quote(token)));
    }
    lines.push("}".to_string());
    lines.join("\n")
}

/// `import auth` で読み込まれる basic 認証スニペット
pub fn auth_snippet(credential: &str) -> String {
    [
        format!("({}) {{", AUTH_SNIPPET),
        format!("{INDENT}basic_auth {{"),
        format!("{INDENT}{INDENT}{} {}", AUTH_USER, quote(credential)),
        format!("{INDENT}}}"),
        "}".to_string(),
    ]
    .join("\n")
}

/// サービス1つ分のサイトブロック
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteBlock {
    pub host: String,
    pub upstream: String,
    pub basic_auth: bool,
}

impl SiteBlock {
    /// サービス定義からサイトブロックを作る。subdomain がなければ `None`
    pub fn for_service(service: &ValidService, domain: &str) -> Option<Self> {
        let subdomain = service.spec.subdomain.as_deref()?;
        Some(Self {
            host: hostname(subdomain, domain),
            upstream: format!("{}:{}", service.name, service.spec.port()),
            basic_auth: service.spec.requires_basic_auth(),
        })
    }

    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("{} {{", quote(&self.host)),
            format!("{INDENT}encode gzip"),
            format!("{INDENT}reverse_proxy {}", quote(&self.upstream)),
        ];
        if self.basic_auth {
            lines.push(format!("{INDENT}import {}", AUTH_SNIPPET));
        }
        lines.push("}".to_string());
        lines.join("\n")
    }
}

/// 検証済みサービスから Caddyfile を組み立てる
///
/// basic 認証を要求するサービスがあるのに認証情報がない場合はエラー。
#[tracing::instrument(skip_all, fields(services = services.len()))]
pub fn render_caddyfile(
    services: &[ValidService],
    config: &GeneratorConfig,
    base_config: Option<&str>,
) -> Result<String> {
    let mut blocks = vec![global_options(
        &config.admin_email,
        config.dns_api_token.as_deref(),
    )];

    if let Some(credential) = &config.basic_auth {
        blocks.push(auth_snippet(credential));
    }

    if let Some(base) = base_config {
        blocks.push(base.trim_end().to_string());
    }

    for service in services {
        let Some(site) = SiteBlock::for_service(service, &config.domain) else {
            continue;
        };
        if site.basic_auth && config.basic_auth.is_none() {
            return Err(GenerateError::MissingBasicAuth(service.name.clone()));
        }
        debug!(service = %service.name, host = %site.host, "Adding site block");
        blocks.push(site.render());
    }

    let mut caddyfile = blocks.join("\n\n");
    caddyfile.push('\n');
    Ok(caddyfile)
}
