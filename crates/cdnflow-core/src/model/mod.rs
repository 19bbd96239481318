//! モデル定義
//!
//! cdnflowで使用される設定モデルを定義します。
//! 各モデルは機能ごとにモジュールに分離されています。

mod cloudfront;
mod kms;
mod stack;

// Re-exports
pub use cloudfront::*;
pub use kms::*;
pub use stack::*;
