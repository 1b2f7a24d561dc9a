//! モデル定義
//!
//! マニフェストとサービス定義、グループ表を定義します。

mod group;
mod manifest;
mod service;

// Re-exports
pub use group::*;
pub use manifest::*;
pub use service::*;
