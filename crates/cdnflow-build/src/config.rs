use std::collections::BTreeMap;
use std::path::PathBuf;

/// 依存関係のインストールコマンド
pub const DEFAULT_INSTALL_COMMAND: &str = "yarn install";

/// ビルドコマンド
pub const DEFAULT_BUILD_COMMAND: &str = "yarn build";

/// ビルド前に削除する成果物の拡張子
pub const DEFAULT_ARTIFACT_SUFFIXES: [&str; 2] = [".js", ".d.ts"];

/// ビルド成果物のファイル名
pub const ARTIFACT_FILE: &str = "index.js";

/// ビルドパイプラインの設定
///
/// 作業ディレクトリやシェル、環境変数はすべてここで明示する。
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// ターゲットディレクトリの基準となるプロジェクトルート
    pub project_root: PathBuf,

    /// 依存関係のインストールコマンド
    pub install_command: String,

    /// ビルドコマンド
    pub build_command: String,

    /// コマンドを実行するシェル（`{shell} -c {command}`）
    pub shell: String,

    /// 継承した環境変数に上書きする値
    pub env: BTreeMap<String, String>,

    /// 削除対象の成果物の拡張子
    pub artifact_suffixes: Vec<String>,

    /// スピナーを表示するか
    pub show_progress: bool,
}

impl BuildConfig {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            install_command: DEFAULT_INSTALL_COMMAND.to_string(),
            build_command: DEFAULT_BUILD_COMMAND.to_string(),
            shell: "bash".to_string(),
            env: BTreeMap::new(),
            artifact_suffixes: DEFAULT_ARTIFACT_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            show_progress: false,
        }
    }

    /// シェルを指定
    ///
    /// 空文字列の場合は `bash` のまま。
    pub fn with_shell(mut self, shell: Option<String>) -> Self {
        if let Some(shell) = shell.filter(|s| !s.is_empty()) {
            self.shell = shell;
        }
        self
    }

    pub fn with_commands(
        mut self,
        install_command: impl Into<String>,
        build_command: impl Into<String>,
    ) -> Self {
        self.install_command = install_command.into();
        self.build_command = build_command.into();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BuildConfig::new("/project");
        assert_eq!(config.install_command, "yarn install");
        assert_eq!(config.build_command, "yarn build");
        assert_eq!(config.shell, "bash");
        assert_eq!(config.artifact_suffixes, vec![".js", ".d.ts"]);
    }

    #[test]
    fn test_with_shell_ignores_empty() {
        let config = BuildConfig::new("/project").with_shell(Some(String::new()));
        assert_eq!(config.shell, "bash");

        let config = BuildConfig::new("/project").with_shell(Some("/bin/zsh".to_string()));
        assert_eq!(config.shell, "/bin/zsh");
    }
}
