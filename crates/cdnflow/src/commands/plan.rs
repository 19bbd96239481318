use super::Project;
use cdnflow_cloud::{ActionType, ContextKeyLookup, synthesize};
use colored::Colorize;

pub fn handle(project: &Project, shell: Option<String>, json: bool) -> anyhow::Result<()> {
    let builder = super::pipeline(project, shell, !json);
    let lookup = ContextKeyLookup::from_config(&project.config);
    let stack = match synthesize(&project.config, &builder, &lookup) {
        Ok(stack) => stack,
        Err(e) => super::report_failure(&e),
    };
    let plan = stack.plan();

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("{} {}", "スタック:".bold(), stack.stack_name.cyan());
    println!();
    for action in &plan.actions {
        let marker = match action.action_type {
            ActionType::Create => "+".green(),
            ActionType::Reference => "=".blue(),
        };
        println!(
            "  {} {} ({}) {}",
            marker,
            action.id.bold(),
            action.resource_type,
            action.description.dimmed()
        );
    }
    println!();
    println!("{}", plan.summary());

    Ok(())
}
