//! スキーマフィルタ
//!
//! マニフェストのサービス定義を必須キー・任意キーで検査し、
//! 全レンダラーが共有する検証済みサービス一覧を作ります。
//! サービスを除外するのは必須キーが欠けている場合だけです。
//! ここでのエラーはすべて警告扱いで、処理は止めません。

use crate::config::ServiceKeys;
use crate::model::{IgnoredValue, ServiceSpec, scalar_key};
use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

/// 検証を通過したサービス
#[derive(Debug, Clone, PartialEq)]
pub struct ValidService {
    pub name: String,
    pub spec: ServiceSpec,
    /// 必須・任意のどちらにも含まれないキー
    pub unknown_keys: Vec<String>,
    /// 型が合わず未指定扱いにした値
    pub ignored_values: Vec<IgnoredValue>,
}

/// 1サービス分の検査結果
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCheck {
    Valid(ValidService),
    /// 必須キーが欠けている（マッピングでないエントリも含む）
    Incomplete { missing: Vec<String> },
}

/// 検査で記録される警告
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceWarning {
    #[error("Service definition incomplete: {service} (missing: {})", missing.join(", "))]
    Incomplete {
        service: String,
        missing: Vec<String>,
    },

    #[error("Service '{service}' has extra keys not being used: {}", keys.join(", "))]
    UnknownKeys { service: String, keys: Vec<String> },

    #[error("Service '{service}' has an unreadable {key} (expected {expected}), ignoring it")]
    IgnoredValue {
        service: String,
        key: &'static str,
        expected: &'static str,
    },
}

impl ServiceWarning {
    pub fn service(&self) -> &str {
        match self {
            Self::Incomplete { service, .. }
            | Self::UnknownKeys { service, .. }
            | Self::IgnoredValue { service, .. } => service,
        }
    }

    /// このサービスが出力から除外されたか
    pub fn is_excluded(&self) -> bool {
        matches!(self, Self::Incomplete { .. })
    }
}

/// フィルタ結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterReport {
    /// 宣言順の検証済みサービス
    pub services: Vec<ValidService>,
    pub warnings: Vec<ServiceWarning>,
}

impl FilterReport {
    pub fn excluded(&self) -> impl Iterator<Item = &str> {
        self.warnings
            .iter()
            .filter(|w| w.is_excluded())
            .map(ServiceWarning::service)
    }
}

/// 1サービスを検査
pub fn check_service(name: &str, value: &Value, keys: &ServiceKeys) -> ServiceCheck {
    let empty = Mapping::new();
    let entry = value.as_mapping().unwrap_or(&empty);
    let present: Vec<String> = entry.keys().filter_map(scalar_key).collect();

    let missing: Vec<String> = keys
        .required
        .iter()
        .filter(|key| !present.contains(key))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return ServiceCheck::Incomplete { missing };
    }

    let (spec, ignored_values) = ServiceSpec::from_mapping(entry);

    let unknown_keys = present
        .into_iter()
        .filter(|key| !keys.is_known(key))
        .collect();

    ServiceCheck::Valid(ValidService {
        name: name.to_string(),
        spec,
        unknown_keys,
        ignored_values,
    })
}

/// サービスマッピング全体をフィルタ
#[tracing::instrument(skip_all, fields(services = services.len()))]
pub fn filter_services(services: &Mapping, keys: &ServiceKeys) -> FilterReport {
    let mut report = FilterReport::default();

    for (key, value) in services {
        let name = scalar_key(key).unwrap_or_else(|| format!("{:?}", key));

        match check_service(&name, value, keys) {
            ServiceCheck::Incomplete { missing } => {
                warn!(service = %name, missing = ?missing, "Service definition incomplete");
                report.warnings.push(ServiceWarning::Incomplete {
                    service: name,
                    missing,
                });
            }
            ServiceCheck::Valid(service) => {
                if !service.unknown_keys.is_empty() {
                    warn!(service = %name, keys = ?service.unknown_keys, "Service has extra keys not being used");
                    report.warnings.push(ServiceWarning::UnknownKeys {
                        service: name.clone(),
                        keys: service.unknown_keys.clone(),
                    });
                }
                for ignored in &service.ignored_values {
                    warn!(service = %name, key = ignored.key, expected = ignored.expected, "Ignoring unreadable value");
                    report.warnings.push(ServiceWarning::IgnoredValue {
                        service: name.clone(),
                        key: ignored.key,
                        expected: ignored.expected,
                    });
                }
                debug!(service = %name, "Service accepted");
                report.services.push(service);
            }
        }
    }

    info!(
        accepted = report.services.len(),
        warnings = report.warnings.len(),
        "Schema filter complete"
    );
    report
}
