pub mod error;

pub use error::*;

use std::path::{Path, PathBuf};

/// 設定ファイルを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "CDNFLOW_CONFIG_PATH";

/// デプロイ環境を指定する環境変数
pub const ENVIRONMENT_ENV: &str = "CDNFLOW_ENV";

/// 検索する設定ファイル名（優先順）
const CANDIDATES: [&str; 5] = [
    "cdnflow.local.kdl",
    ".cdnflow.local.kdl",
    "cdnflow.kdl",
    ".cdnflow.kdl",
    "cdk.json",
];

/// カレントディレクトリを起点に設定ファイルを探す
pub fn find_config_file() -> Result<PathBuf> {
    let current_dir = std::env::current_dir()?;
    find_config_file_in(&current_dir)
}

/// 指定ディレクトリを起点に設定ファイルを探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 CDNFLOW_CONFIG_PATH (直接パス指定)
/// 2. 起点ディレクトリ: cdnflow.local.kdl, .cdnflow.local.kdl, cdnflow.kdl, .cdnflow.kdl, cdk.json
/// 3. ./.cdnflow/ ディレクトリ内: 同様の順序
/// 4. ~/.config/cdnflow/cdnflow.kdl (グローバル設定)
pub fn find_config_file_in(dir: &Path) -> Result<PathBuf> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(&config_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::ConfigPathMissing(config_path));
    }

    // 2. 起点ディレクトリで検索
    if let Some(path) = find_candidate(dir) {
        return Ok(path);
    }

    // 3. ./.cdnflow/ ディレクトリで検索
    let flow_dir = dir.join(".cdnflow");
    if flow_dir.is_dir()
        && let Some(path) = find_candidate(&flow_dir)
    {
        return Ok(path);
    }

    // 4. グローバル設定ファイル
    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("cdnflow").join("cdnflow.kdl");
        if global_config.exists() {
            tracing::debug!("Using global config: {}", global_config.display());
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

fn find_candidate(dir: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// CLI引数と環境変数からデプロイ環境を決定
///
/// CLI引数が優先される。どちらも未指定の場合は None（default環境）。
pub fn resolve_environment(cli_env: Option<&str>) -> Option<String> {
    cli_env
        .map(|e| e.to_string())
        .or_else(|| std::env::var(ENVIRONMENT_ENV).ok())
        .filter(|e| !e.is_empty())
}
