use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("KDLパースエラー: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("JSONパースエラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error("環境が見つかりません: {0}")]
    EnvironmentNotFound(String),

    #[error("未対応の設定ファイル形式です: {0}\nヒント: .kdl または .json を使用してください")]
    UnsupportedFormat(PathBuf),

    #[error(
        "origin-access-control '{0}' に function の設定がありません\nヒント: origin-access-control ブロックに function ノードを追加してください"
    )]
    MissingFunctionConfig(String),

    #[error(
        "kms を使用するには origin-access-control の設定が必要です\nヒント: cloudfront ブロックに origin-access-control を追加してください"
    )]
    EncryptionWithoutAccessControl,

    #[error("kms の指定が曖昧です: {0} のうち1つだけを指定してください")]
    AmbiguousEncryption(String),

    #[error("無効な識別子 ({kind}): {value}")]
    InvalidIdentifier { kind: IdentifierKind, value: String },
}

impl FlowError {
    /// 外部リソースの識別子に起因するエラーか
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            FlowError::InvalidIdentifier {
                kind: IdentifierKind::KeyArn | IdentifierKind::KeyAlias | IdentifierKind::FunctionArn,
                ..
            }
        )
    }
}

/// 形式チェックの対象となる外部識別子の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    KeyArn,
    KeyAlias,
    FunctionArn,
    BucketName,
    FunctionName,
}

impl std::fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentifierKind::KeyArn => write!(f, "kms key arn"),
            IdentifierKind::KeyAlias => write!(f, "kms key alias"),
            IdentifierKind::FunctionArn => write!(f, "function arn"),
            IdentifierKind::BucketName => write!(f, "bucket name"),
            IdentifierKind::FunctionName => write!(f, "function name"),
        }
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;
