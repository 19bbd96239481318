pub mod plan;
pub mod rewrite;
pub mod synth;
pub mod validate;

use cdnflow_build::{BuildConfig, BuildPipeline};
use cdnflow_cloud::CloudError;
use cdnflow_core::Config;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// 読み込んだ設定と、その基準ディレクトリ
pub struct Project {
    pub config: Config,
    pub config_path: PathBuf,
    pub root: PathBuf,
}

/// 設定ファイルを検出して読み込む
pub fn load_project(config_path: Option<&Path>, env: Option<&str>) -> anyhow::Result<Project> {
    let config_path = match config_path {
        Some(path) => path.to_path_buf(),
        None => cdnflow_config::find_config_file()?,
    };
    let environment = cdnflow_config::resolve_environment(env);
    let config = cdnflow_core::load_config(&config_path, environment.as_deref())?;
    let root = project_root(&config_path);

    Ok(Project {
        config,
        config_path,
        root,
    })
}

/// 設定ファイルの置き場所からプロジェクトルートを決める
///
/// `.cdnflow/` 内の設定ファイルはその親ディレクトリを基準にする。
fn project_root(config_path: &Path) -> PathBuf {
    let parent = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    if parent.file_name().is_some_and(|n| n == ".cdnflow") {
        parent.parent().unwrap_or(parent).to_path_buf()
    } else {
        parent.to_path_buf()
    }
}

/// 読み込んだ設定ファイル情報を表示
pub fn print_config_source(project: &Project) {
    println!(
        "📄 設定ファイル: {}",
        project.config_path.display().to_string().cyan()
    );
    if let Some(env) = &project.config.environment {
        println!("🌐 環境: {}", env.cyan());
    }
}

pub fn pipeline(project: &Project, shell: Option<String>, show_progress: bool) -> BuildPipeline {
    let config = BuildConfig::new(&project.root)
        .with_shell(shell)
        .with_progress(show_progress);
    BuildPipeline::new(config)
}

/// 失敗したステップを表示して終了
pub fn report_failure(err: &CloudError) -> ! {
    eprintln!();
    eprintln!(
        "{} {}",
        "✗".red().bold(),
        format!("{} に失敗しました", err.step()).red().bold()
    );
    match err {
        CloudError::Build(build) => eprintln!("{}", build.user_message()),
        other => eprintln!("  {}", other),
    }
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_root() {
        assert_eq!(
            project_root(Path::new("/work/site/cdnflow.kdl")),
            PathBuf::from("/work/site")
        );
        assert_eq!(
            project_root(Path::new("/work/site/.cdnflow/cdnflow.kdl")),
            PathBuf::from("/work/site")
        );
        assert_eq!(project_root(Path::new("cdk.json")), PathBuf::from("."));
    }
}
