mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::GenerateArgs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stackgen")]
#[command(
    about = "1つのマニフェストから、compose・Caddy・ダッシュボード設定を生成する",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 成果物を生成して出力ディレクトリに書き出す
    Generate {
        #[command(flatten)]
        args: GenerateArgs,
        /// 生成前に出力ディレクトリを削除する
        #[arg(long)]
        clean: bool,
    },
    /// マニフェストを検証（ファイルは書き出さない）
    Validate {
        #[command(flatten)]
        args: GenerateArgs,
    },
    /// バージョン情報を表示
    Version,
}

fn main() {
    // ログはstderrに出力し、stdoutはサマリー表示に使う
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    load_dotenv(Path::new(".env"));

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Version => {
            println!("stackgen {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Generate { args, clean } => commands::generate::handle(&args, clean),
        Commands::Validate { args } => commands::validate::handle(&args),
    };

    if let Err(e) = result {
        eprintln!();
        eprintln!("{} {:#}", "✗ エラー:".red().bold(), e);
        std::process::exit(1);
    }
}

/// カレントディレクトリの `.env` を読み込み、未設定の環境変数だけを埋める
fn load_dotenv(path: &Path) {
    if !path.is_file() {
        return;
    }

    let vars = match stackgen_core::envfile::read_env_file(path) {
        Ok(vars) => vars,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read .env file");
            return;
        }
    };

    for (key, value) in vars {
        if std::env::var_os(&key).is_some() {
            continue;
        }
        // SAFETY: 引数パース前、単一スレッドで設定されるため安全
        unsafe {
            std::env::set_var(&key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_generate_args_from_env() {
        temp_env::with_vars(
            [
                ("DOMAIN", Some("example.com")),
                ("ENV", Some("development")),
                ("OUTPUT_DIR", Some("build")),
                ("BASIC_AUTH", None),
                ("STACKGEN_MANIFEST", None),
            ],
            || {
                let cli = Cli::try_parse_from(["stackgen", "generate"]).unwrap();
                match cli.command {
                    Commands::Generate { args, clean } => {
                        assert_eq!(args.domain.as_deref(), Some("example.com"));
                        assert_eq!(args.mode.as_deref(), Some("development"));
                        assert_eq!(args.output, Path::new("build"));
                        assert!(args.basic_auth.is_none());
                        assert!(!clean);
                    }
                    other => panic!("Expected Generate, got {:?}", other),
                }
            },
        );
    }

    #[test]
    #[serial]
    fn test_flags_override_env() {
        temp_env::with_vars(
            [("DOMAIN", Some("env.example.com")), ("OUTPUT_DIR", None)],
            || {
                let cli = Cli::try_parse_from([
                    "stackgen",
                    "generate",
                    "--domain",
                    "flag.example.com",
                    "--clean",
                ])
                .unwrap();
                match cli.command {
                    Commands::Generate { args, clean } => {
                        assert_eq!(args.domain.as_deref(), Some("flag.example.com"));
                        assert_eq!(args.output, Path::new("dist"));
                        assert!(clean);
                    }
                    other => panic!("Expected Generate, got {:?}", other),
                }
            },
        );
    }

    #[test]
    #[serial]
    fn test_load_dotenv_fills_only_unset() {
        let temp_dir = tempfile::tempdir().unwrap();
        let env_file = temp_dir.path().join(".env");
        std::fs::write(
            &env_file,
            "STACKGEN_TEST_PRESET=from-file\nSTACKGEN_TEST_UNSET=from-file\n",
        )
        .unwrap();

        temp_env::with_vars(
            [
                ("STACKGEN_TEST_PRESET", Some("from-env")),
                ("STACKGEN_TEST_UNSET", None),
            ],
            || {
                load_dotenv(&env_file);
                assert_eq!(
                    std::env::var("STACKGEN_TEST_PRESET").unwrap(),
                    "from-env"
                );
                assert_eq!(
                    std::env::var("STACKGEN_TEST_UNSET").unwrap(),
                    "from-file"
                );
            },
        );
    }
}
