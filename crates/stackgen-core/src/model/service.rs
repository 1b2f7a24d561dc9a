//! サービス定義
//!
//! マニフェストの値は型が合わなくてもサービスを除外しない。
//! 読めない値は [`IgnoredValue`] として記録し、未指定扱いにする。

use serde_yaml::{Mapping, Value};

use super::group::{GroupId, scalar_key};

/// `internal_port` 未指定時のポート
pub const DEFAULT_INTERNAL_PORT: u16 = 80;

/// マニフェスト上の1サービス
///
/// YAML形式：
/// ```yaml
/// services:
///   api:
///     image: myorg/api
///     subdomain: api
///     internal_port: 8000
///     environment: [DATABASE_URL]
///     storage: internal
///     group: 1
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceSpec {
    pub image: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    /// 変数名のみ。値は生成物に書き込まない
    pub environment: Option<Vec<String>>,
    pub volumes: Option<Vec<Value>>,
    pub labels: Option<Value>,
    pub ports: Option<Value>,
    pub command: Option<Value>,
    pub depends_on: Option<Value>,
    /// キーが存在すればリバースプロキシ公開対象。`null` はルートドメイン扱い
    pub subdomain: Option<String>,
    pub internal_port: Option<u16>,
    pub storage: Option<Storage>,
    pub dev_path: Option<String>,
    pub group: Option<GroupId>,
    pub auth: Option<AuthPolicy>,
}

/// 型が合わず無視された値
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredValue {
    pub key: &'static str,
    pub expected: &'static str,
}

/// 永続ボリュームの種類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    /// compose が管理するボリューム
    Internal,
    /// 事前に作成された外部ボリューム
    External(String),
}

impl Storage {
    /// YAML値から判定する。空文字・false・null・0 はストレージなし
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) if s == "internal" => Some(Self::Internal),
            Value::String(s) => Some(Self::External(s.clone())),
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            Value::Number(n) => Some(Self::External(n.to_string())),
            _ => Some(Self::External(String::new())),
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, Self::External(_))
    }
}

/// 認証ポリシー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// 共有の basic 認証スニペットを読み込む
    Basic,
    /// 未対応の値（何も付与しない）
    Unsupported,
}

impl AuthPolicy {
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("basic") {
            Self::Basic
        } else {
            Self::Unsupported
        }
    }
}

/// サービスエントリから値を読み出し、読めなかったキーを記録する
struct FieldReader<'a> {
    entry: &'a Mapping,
    ignored: Vec<IgnoredValue>,
}

impl<'a> FieldReader<'a> {
    /// `null` は未指定と同じ
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.entry.get(key).filter(|v| !v.is_null())
    }

    fn ignore(&mut self, key: &'static str, expected: &'static str) {
        self.ignored.push(IgnoredValue { key, expected });
    }

    /// スカラー値を文字列として読む（`title: 2048` は "2048"）
    fn string(&mut self, key: &'static str) -> Option<String> {
        let value = self.get(key)?;
        let s = scalar_key(value);
        if s.is_none() {
            self.ignore(key, "string");
        }
        s
    }

    fn string_list(&mut self, key: &'static str) -> Option<Vec<String>> {
        let value = self.get(key)?;
        let items = value
            .as_sequence()
            .and_then(|seq| seq.iter().map(scalar_key).collect::<Option<Vec<_>>>());
        if items.is_none() {
            self.ignore(key, "list of strings");
        }
        items
    }

    fn sequence(&mut self, key: &'static str) -> Option<Vec<Value>> {
        let value = self.get(key)?;
        let seq = value.as_sequence().cloned();
        if seq.is_none() {
            self.ignore(key, "list");
        }
        seq
    }

    fn raw(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }

    /// 整数または数字のみの文字列（`"8000"`）
    fn port(&mut self, key: &'static str) -> Option<u16> {
        let value = self.get(key)?;
        let port = match value {
            Value::Number(n) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
            Value::String(s) => s.trim().parse::<u16>().ok(),
            _ => None,
        };
        if port.is_none() {
            self.ignore(key, "port number");
        }
        port
    }

    /// キーがあれば `null` でも公開対象（ルートドメイン）
    fn subdomain(&mut self) -> Option<String> {
        match self.entry.get("subdomain")? {
            Value::Null => Some(String::new()),
            value => {
                let s = scalar_key(value);
                if s.is_none() {
                    self.ignore("subdomain", "string");
                }
                s
            }
        }
    }
}

impl ServiceSpec {
    /// サービスエントリから作成する。失敗しない
    ///
    /// 型が合わない値は未指定扱いにし、そのキーを返す。
    pub fn from_mapping(entry: &Mapping) -> (Self, Vec<IgnoredValue>) {
        let mut reader = FieldReader {
            entry,
            ignored: Vec::new(),
        };

        let spec = Self {
            image: reader.string("image").unwrap_or_default(),
            title: reader.string("title"),
            description: reader.string("description"),
            icon: reader.string("icon"),
            environment: reader.string_list("environment"),
            volumes: reader.sequence("volumes"),
            labels: reader.raw("labels"),
            ports: reader.raw("ports"),
            command: reader.raw("command"),
            depends_on: reader.raw("depends_on"),
            subdomain: reader.subdomain(),
            internal_port: reader.port("internal_port"),
            storage: entry.get("storage").and_then(Storage::from_value),
            dev_path: reader.string("dev_path"),
            group: reader.string("group").map(GroupId::new),
            auth: reader.string("auth").map(|s| AuthPolicy::parse(&s)),
        };

        (spec, reader.ignored)
    }

    /// 公開ポート（未指定・0 の場合は 80）
    pub fn port(&self) -> u16 {
        self.internal_port
            .filter(|p| *p != 0)
            .unwrap_or(DEFAULT_INTERNAL_PORT)
    }

    /// 空でない dev_path
    pub fn dev_path(&self) -> Option<&str> {
        self.dev_path.as_deref().filter(|p| !p.is_empty())
    }

    /// 空でない title
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref().filter(|i| !i.is_empty())
    }

    pub fn requires_basic_auth(&self) -> bool {
        self.auth == Some(AuthPolicy::Basic)
    }

    /// `NAME=${NAME}` 形式の環境変数参照に変換
    pub fn environment_refs(&self) -> Option<Vec<String>> {
        self.environment.as_ref().map(|names| {
            names
                .iter()
                .map(|name| format!("{}=${{{}}}", name, name))
                .collect()
        })
    }
}
