//! cdnflow-core
//!
//! 静的サイト配信スタック（S3 + CloudFront + KMS）の設定モデルと、
//! KDL / JSON 設定ファイルのローダー、検証ロジックを提供します。

pub mod error;
pub mod loader;
pub mod model;
pub mod parser;
pub mod validate;

pub use error::{FlowError, IdentifierKind, Result};
pub use loader::{load_config, parse_json_string};
pub use model::*;
pub use parser::{DEFAULT_ENVIRONMENT, parse_kdl_string};
pub use validate::{
    is_valid_function_arn, is_valid_key_alias, is_valid_key_arn, normalize_alias, validate,
};
