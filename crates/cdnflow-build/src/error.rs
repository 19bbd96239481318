use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Function source directory not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("Command `{command}` failed in {} ({})", .dir.display(), exit_label(.code))]
    CommandFailed {
        command: String,
        dir: PathBuf,
        code: Option<i32>,
    },

    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Build artifact not found: {0}")]
    ArtifactMissing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            BuildError::SourceNotFound(path) => {
                format!(
                    "functionのソースディレクトリが見つかりません: {}\n\
                     \n\
                     解決方法:\n\
                     1. ディレクトリのパスを確認してください\n\
                     2. 設定ファイルで明示的にパスを指定してください:\n\
                        function \"name\" source-dir=\"path/to/function\"",
                    path.display()
                )
            }
            BuildError::CommandFailed { command, dir, .. } => {
                format!(
                    "ビルドに失敗しました: {} ({})\n\
                     \n\
                     package.json の scripts と依存関係を確認してください。",
                    command,
                    dir.display()
                )
            }
            BuildError::ArtifactMissing(path) => {
                format!(
                    "ビルド成果物が見つかりません: {}\n\
                     \n\
                     build スクリプトが index.js を出力しているか確認してください。",
                    path.display()
                )
            }
            _ => format!("{}", self),
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

pub type BuildResult<T> = std::result::Result<T, BuildError>;
