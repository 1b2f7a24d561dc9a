pub mod generate;
pub mod validate;

use anyhow::Context as _;
use clap::Args;
use colored::Colorize;
use stackgen_config::Settings;
use stackgen_core::{FilterReport, GeneratorConfig, GroupTable, Manifest, Mode, ServiceKeys};
use std::path::{Path, PathBuf};

/// generate / validate 共通の引数
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// ベースドメイン（例: example.com）
    #[arg(long, env = "DOMAIN")]
    pub domain: Option<String>,

    /// 実行モード。development で dev_path をメインの compose にもマウント
    #[arg(long, env = "ENV")]
    pub mode: Option<String>,

    /// basic_auth 用のハッシュ済みパスワード
    #[arg(long, env = "BASIC_AUTH", hide_env_values = true)]
    pub basic_auth: Option<String>,

    /// ACME DNS チャレンジ用の Cloudflare API トークン
    #[arg(long, env = "CLOUDFLARE_API_TOKEN", hide_env_values = true)]
    pub dns_token: Option<String>,

    /// 出力ディレクトリ
    #[arg(short, long, env = "OUTPUT_DIR", default_value = "dist")]
    pub output: PathBuf,

    /// マニフェストファイル（省略時は自動検出）
    #[arg(short, long, env = "STACKGEN_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// 出力モード（予約済み、現在は未使用）
    #[arg(long, env = "OUTPUT_MODE", hide = true)]
    pub output_mode: Option<String>,
}

/// 1回の実行に必要な入力一式
pub struct Context {
    pub project_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub manifest: Manifest,
    pub config: GeneratorConfig,
}

impl Context {
    /// 設定・マニフェストを読み込む
    ///
    /// DOMAIN 未設定、マニフェスト不在、パース失敗はここでエラーになる。
    pub fn load(args: &GenerateArgs, project_dir: &Path) -> anyhow::Result<Self> {
        let settings = stackgen_config::load_settings(project_dir)?;
        let config = build_config(args, settings)?;

        if let Some(output_mode) = &args.output_mode {
            tracing::debug!(output_mode = %output_mode, "Output mode is accepted but not used");
        }

        let manifest_path =
            stackgen_config::find_manifest_file_in(project_dir, args.manifest.as_deref())?;
        let manifest = Manifest::load(&manifest_path)
            .with_context(|| format!("マニフェストを読み込めません: {}", manifest_path.display()))?;

        Ok(Self {
            project_dir: project_dir.to_path_buf(),
            manifest_path,
            manifest,
            config,
        })
    }

    pub fn output_dir(&self, args: &GenerateArgs) -> PathBuf {
        if args.output.is_absolute() {
            args.output.clone()
        } else {
            self.project_dir.join(&args.output)
        }
    }
}

/// 引数と設定ファイルから生成設定を組み立てる
pub fn build_config(args: &GenerateArgs, settings: Settings) -> anyhow::Result<GeneratorConfig> {
    let mode = args.mode.as_deref().map(Mode::parse).unwrap_or_default();

    let mut config = GeneratorConfig::from_domain(args.domain.clone())?
        .with_mode(mode)
        .with_basic_auth(args.basic_auth.clone())
        .with_dns_api_token(args.dns_token.clone())
        .with_groups(GroupTable::from_mapping(&settings.groups));

    if let Some(email) = settings.admin_email {
        config = config.with_admin_email(email);
    }
    if let Some(network) = settings.network_name {
        config = config.with_network_name(network);
    }
    if let Some(image) = settings.proxy_image {
        config = config.with_proxy_image(image);
    }
    if settings.required_keys.is_some() || settings.optional_keys.is_some() {
        let defaults = ServiceKeys::default();
        let keys = ServiceKeys::new(
            settings.required_keys.unwrap_or(defaults.required),
            settings.optional_keys.unwrap_or(defaults.optional),
        )?;
        config = config.with_service_keys(keys);
    }

    Ok(config)
}

/// フィルタで記録された警告を表示
pub fn print_warnings(report: &FilterReport) {
    if report.warnings.is_empty() {
        return;
    }
    println!();
    println!("{}", format!("⚠ 警告: {}件", report.warnings.len()).yellow().bold());
    for warning in &report.warnings {
        let marker = if warning.is_excluded() { "除外" } else { "注意" };
        println!("  [{}] {}", marker.yellow(), warning);
    }
}
