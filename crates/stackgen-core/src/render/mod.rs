//! 生成物レンダラー
//!
//! 検証済みサービス一覧から各成果物を組み立てます。
//! どのレンダラーも同じ [`GeneratorConfig`](crate::GeneratorConfig) と
//! サービス一覧を読み取り専用で受け取ります。

pub mod caddy;
pub mod catalog;
pub mod compose;
pub mod dev;
pub mod proxy;

use crate::error::Result;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

/// 値を YAML に変換してマッピングに追加する。マッピングは挿入順を保つ
pub fn insert_entry<T: Serialize>(map: &mut Mapping, key: &str, value: &T) -> Result<()> {
    map.insert(Value::from(key), serde_yaml::to_value(value)?);
    Ok(())
}

/// キーが1つだけのマッピング
pub fn single_entry<T: Serialize>(key: &str, value: &T) -> Result<Mapping> {
    let mut map = Mapping::new();
    insert_entry(&mut map, key, value)?;
    Ok(map)
}

/// サブドメインとドメインからホスト名を作る
///
/// 空文字とワイルドカード `*` はルートドメインになる。
pub fn hostname(subdomain: &str, domain: &str) -> String {
    if subdomain.is_empty() || subdomain == "*" {
        domain.to_string()
    } else {
        format!("{}.{}", subdomain, domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostname() {
        assert_eq!(hostname("api", "example.com"), "api.example.com");
        assert_eq!(hostname("", "example.com"), "example.com");
        assert_eq!(hostname("*", "example.com"), "example.com");
    }

    #[test]
    fn test_insert_entry_keeps_insertion_order() {
        let mut map = Mapping::new();
        insert_entry(&mut map, "zeta", &1).unwrap();
        insert_entry(&mut map, "alpha", &2).unwrap();
        insert_entry(&mut map, "zeta", &3).unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(serde_yaml::to_string(&map).unwrap(), "zeta: 3\nalpha: 2\n");
    }

    #[test]
    fn test_single_entry() {
        let map = single_entry("Tools", &vec!["a"]).unwrap();
        assert_eq!(serde_yaml::to_string(&map).unwrap(), "Tools:\n- a\n");
        assert_eq!(serde_yaml::to_string(&Mapping::new()).unwrap(), "{}\n");
    }
}
