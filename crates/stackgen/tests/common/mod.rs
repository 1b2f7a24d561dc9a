#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// テスト実行プロセスから漏れ込むと結果が変わる環境変数
const ISOLATED_VARS: &[&str] = &[
    "DOMAIN",
    "ENV",
    "BASIC_AUTH",
    "CLOUDFLARE_API_TOKEN",
    "OUTPUT_DIR",
    "STACKGEN_MANIFEST",
    "OUTPUT_MODE",
];

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn write_manifest(&self, content: &str) {
        self.write_file("manifest.yml", content);
    }

    pub fn write_file(&self, name: &str, content: &str) {
        let path = self.root.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    #[allow(dead_code)]
    pub fn output(&self, name: &str) -> String {
        fs::read_to_string(self.root.path().join("dist").join(name)).unwrap()
    }

    #[allow(dead_code)]
    pub fn output_exists(&self, name: &str) -> bool {
        self.root.path().join("dist").join(name).exists()
    }

    /// プロジェクトディレクトリで実行する stackgen コマンド
    ///
    /// グローバル設定（~/.config/stackgen）を参照しないよう XDG_CONFIG_HOME も差し替える。
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("stackgen").unwrap();
        cmd.current_dir(self.root.path())
            .env("XDG_CONFIG_HOME", self.root.path().join(".xdg"))
            .env("RUST_LOG", "warn");
        for var in ISOLATED_VARS {
            cmd.env_remove(var);
        }
        cmd
    }
}
