//! ダッシュボードのグループ定義

use serde_yaml::{Mapping, Value};
use std::collections::HashMap;

/// グループ解決に失敗したサービスの振り分け先
pub const UNGROUPED: &str = "Ungrouped";

/// グループID（YAML上は整数・文字列のどちらでもよい）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// スカラー値を文字列キーに変換
pub fn scalar_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// グループID → グループ名の対応表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupTable {
    names: HashMap<String, String>,
}

impl GroupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// YAMLマッピングから作成。スカラー以外のキー・値は無視する
    pub fn from_mapping(mapping: &Mapping) -> Self {
        let mut table = Self::new();
        table.extend_from_mapping(mapping);
        table
    }

    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.names.insert(id.into(), name.into());
    }

    /// 後から追加した定義が優先される
    pub fn extend_from_mapping(&mut self, mapping: &Mapping) {
        for (key, value) in mapping {
            if let (Some(id), Some(name)) = (scalar_key(key), scalar_key(value)) {
                self.names.insert(id, name);
            }
        }
    }

    pub fn extend(&mut self, other: &GroupTable) {
        for (id, name) in &other.names {
            self.names.insert(id.clone(), name.clone());
        }
    }

    /// グループ名を解決。未登録・未指定は [`UNGROUPED`]
    pub fn resolve(&self, id: Option<&GroupId>) -> &str {
        id.and_then(|id| self.names.get(id.as_str()))
            .map(String::as_str)
            .unwrap_or(UNGROUPED)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
