use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "マニフェストが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: manifest.yml, manifest.yaml\n\
        - ./.stackgen/ ディレクトリ\n\
        - ~/.config/stackgen/manifest.yml\n\
        または --manifest / STACKGEN_MANIFEST で直接指定できます"
    )]
    ManifestNotFound,

    #[error("指定されたマニフェストが存在しません: {0}")]
    ExplicitManifestNotFound(PathBuf),

    #[error("設定ファイルのパースエラー: {path}\n理由: {source}")]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
