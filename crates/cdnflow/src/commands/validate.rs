use super::Project;
use cdnflow_cloud::resolve::{plan_function, resolve_access_control, resolve_encryption};
use cdnflow_cloud::{
    CloudError, ContextKeyLookup, FunctionPlan, FunctionSource, KeyRef, ResolvedEncryption,
};
use colored::Colorize;

pub fn handle(project: &Project) -> anyhow::Result<()> {
    println!("{}", "設定を検証中...".blue());
    super::print_config_source(project);

    let config = &project.config;
    let (encryption, function) = match check(project) {
        Ok(resolved) => resolved,
        Err(e) => super::report_failure(&e),
    };

    println!("{}", "✓ 設定ファイルは正常です！".green().bold());
    println!();
    println!("サマリー:");
    println!("  スタック: {}", config.stack_name.cyan());
    println!("  バケット: {}", config.bucket_name.cyan());

    let label = match encryption.key() {
        None => "S3管理キー (SSE-S3)".to_string(),
        Some(KeyRef::Owned { alias: Some(alias) }) => format!("新規KMSキー ({})", alias),
        Some(KeyRef::Owned { alias: None }) => "新規KMSキー".to_string(),
        Some(KeyRef::Referenced { arn, .. }) => format!("既存KMSキー ({})", arn),
    };
    println!("  暗号化: {}", label);

    let access = resolve_access_control(
        config.cloudfront.origin_access_control.as_ref(),
        encryption.is_key_managed(),
        &config.bucket_name,
    );
    match access {
        Some(access) => println!("  OAC: {}", access.name.cyan()),
        None => println!("  OAC: (なし、オリジンアクセスアイデンティティで読み取り)"),
    }

    match function {
        Some(FunctionPlan {
            name,
            source: FunctionSource::Build { source_dir },
        }) => println!(
            "  関数: {} (ビルド: {})",
            name.cyan(),
            project.root.join(source_dir).display()
        ),
        Some(FunctionPlan {
            name,
            source: FunctionSource::Reference { arn },
        }) => println!("  関数: {} (参照: {})", name.cyan(), arn),
        None => println!("  関数: (なし、index.html をウェブサイト設定で配信)"),
    }

    if !config.tags.is_empty() {
        println!("  タグ: {}個", config.tags.len());
        for tag in &config.tags {
            println!("    - {}={}", tag.name.cyan(), tag.value);
        }
    }

    Ok(())
}

/// 検証と、ビルドを伴わない解決までを行う
fn check(project: &Project) -> Result<(ResolvedEncryption, Option<FunctionPlan>), CloudError> {
    let config = &project.config;
    cdnflow_core::validate(config)?;
    let function = plan_function(config.function_config(), config.environment_prefix())?;
    let encryption = resolve_encryption(
        config.kms.as_ref(),
        &ContextKeyLookup::from_config(config),
    )?;
    Ok((encryption, function))
}
