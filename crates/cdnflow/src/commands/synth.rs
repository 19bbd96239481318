use super::Project;
use cdnflow_cloud::{ContextKeyLookup, DeploymentEngine, TemplateWriter, synthesize};
use colored::Colorize;
use std::path::Path;

pub async fn handle(
    project: &Project,
    out: &Path,
    shell: Option<String>,
    show_progress: bool,
) -> anyhow::Result<()> {
    println!("{}", "スタックを合成中...".blue());
    super::print_config_source(project);

    let builder = super::pipeline(project, shell, show_progress);
    let lookup = ContextKeyLookup::from_config(&project.config);
    let stack = match synthesize(&project.config, &builder, &lookup) {
        Ok(stack) => stack,
        Err(e) => super::report_failure(&e),
    };

    let out_dir = project.root.join(out);
    let engine = TemplateWriter::new(out_dir);
    let outcome = engine.deploy(&stack).await?;

    println!();
    println!("{}", "✓ テンプレートを書き出しました".green().bold());
    println!("  {}", outcome.location.cyan());
    println!("  {}", stack.plan().summary());
    println!();
    println!("{}: {}", "AccessURLOutput".bold(), outcome.access_url);

    Ok(())
}
