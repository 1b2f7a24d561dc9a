use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("DOMAIN が設定されていません。環境変数 DOMAIN または --domain で指定してください")]
    MissingDomain,

    #[error("マニフェストのパースエラー: {path}\n理由: {message}")]
    ManifestParse { path: PathBuf, message: String },

    #[error("YAMLエラー: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO エラー: {path}\n理由: {message}")]
    IoError { path: PathBuf, message: String },

    #[error(
        "サービス '{0}' は basic 認証を要求していますが、認証情報が設定されていません\nヒント: 環境変数 BASIC_AUTH を設定してください"
    )]
    MissingBasicAuth(String),

    #[error("無効な設定: {0}")]
    InvalidConfig(String),
}

impl GenerateError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GenerateError>;
