use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "設定ファイルが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: cdnflow.local.kdl, .cdnflow.local.kdl, cdnflow.kdl, .cdnflow.kdl, cdk.json\n\
        - ./.cdnflow/ ディレクトリ\n\
        - ~/.config/cdnflow/cdnflow.kdl\n\
        または CDNFLOW_CONFIG_PATH 環境変数で直接指定できます"
    )]
    ConfigFileNotFound,

    #[error("CDNFLOW_CONFIG_PATH が指すファイルが存在しません: {0}")]
    ConfigPathMissing(String),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
