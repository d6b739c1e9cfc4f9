use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

use crate::api::{MotionApi, Project, Workspace};
use crate::export::export_project;
use crate::import::{
    create_target_project, due_date_in_days, import_from_store, resolve_schedule, ImportPlan,
    MAX_DUE_DAYS, REQUEST_DELAY,
};
use crate::model::template::Priority;
use crate::store::{suggested_name, TemplateStore};

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Run,
    Help,
    Version,
}

/// Everything happens through prompts; the only flags are help and version.
pub fn parse_args(args: &[String]) -> Result<Command> {
    match args {
        [] => Ok(Command::Run),
        [flag] if flag == "-h" || flag == "--help" => Ok(Command::Help),
        [flag] if flag == "-V" || flag == "--version" => Ok(Command::Version),
        _ => bail!(
            "Unexpected arguments: {}\n\nRun `motion-templates --help` for usage.",
            args.join(" ")
        ),
    }
}

pub fn print_help() {
    println!("motion-templates — copy Motion projects into reusable task templates\n");
    println!("USAGE:");
    println!("  motion-templates          Start the interactive menu");
    println!("  motion-templates --help   Show this help");
    println!();
    println!("ENVIRONMENT:");
    println!("  MOTION_API_KEY   Motion API key (required)");
    println!("  RUST_LOG         Log filter for stderr output (default: warn)");
    println!();
    println!("CONFIG (optional): ~/.motion-templates/config.toml");
    println!("  api_url        = \"https://api.usemotion.com/v1\"");
    println!("  templates_dir  = \"templates\"");
}

/// Parse the "days from now" answer. Blank means no due date.
pub fn parse_days(input: &str) -> Result<Option<u32>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let days = trimmed
        .parse::<u32>()
        .map_err(|_| format!("'{trimmed}' is not a whole number of days"))?;
    if days > MAX_DUE_DAYS {
        return Err(format!("due date must be at most {MAX_DUE_DAYS} days out"));
    }
    Ok(Some(days))
}

const MENU: [&str; 3] = [
    "Pull task template from an existing project",
    "Create tasks from a template",
    "Exit",
];

/// Main menu loop. Flow errors are printed and the menu comes back; prompt
/// I/O errors end the session.
pub async fn run(api: &dyn MotionApi, store: &TemplateStore) -> Result<()> {
    let theme = ColorfulTheme::default();

    loop {
        println!();
        let choice = Select::with_theme(&theme)
            .with_prompt("Main menu")
            .items(&MENU)
            .default(0)
            .interact()?;

        let result = match choice {
            0 => pull_template(api, store, &theme).await,
            1 => create_from_template(api, store, &theme).await,
            _ => {
                println!("Exiting...");
                return Ok(());
            }
        };

        if let Err(e) = result {
            if e.downcast_ref::<dialoguer::Error>().is_some() {
                return Err(e);
            }
            eprintln!("Error: {e:#}");
        }
    }
}

async fn pick_workspace(api: &dyn MotionApi, theme: &ColorfulTheme) -> Result<Option<Workspace>> {
    let mut workspaces = api
        .list_workspaces()
        .await
        .context("Could not retrieve workspaces")?;
    if workspaces.is_empty() {
        println!("No workspaces found.");
        return Ok(None);
    }

    let labels: Vec<String> = workspaces
        .iter()
        .map(|w| format!("{} (ID: {})", w.name, w.id))
        .collect();
    let idx = Select::with_theme(theme)
        .with_prompt("Select a workspace")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(Some(workspaces.swap_remove(idx)))
}

async fn pick_project(
    api: &dyn MotionApi,
    workspace: &Workspace,
    theme: &ColorfulTheme,
) -> Result<Option<Project>> {
    let mut projects = api
        .list_projects(&workspace.id)
        .await
        .context("Could not retrieve projects")?;
    if projects.is_empty() {
        println!("No projects found in this workspace.");
        return Ok(None);
    }

    let labels: Vec<String> = projects
        .iter()
        .map(|p| format!("{} (ID: {})", p.name, p.id))
        .collect();
    let idx = Select::with_theme(theme)
        .with_prompt("Select a project")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(Some(projects.swap_remove(idx)))
}

async fn pull_template(
    api: &dyn MotionApi,
    store: &TemplateStore,
    theme: &ColorfulTheme,
) -> Result<()> {
    let Some(workspace) = pick_workspace(api, theme).await? else {
        return Ok(());
    };
    export_into_template(api, store, &workspace, theme).await
}

async fn export_into_template(
    api: &dyn MotionApi,
    store: &TemplateStore,
    workspace: &Workspace,
    theme: &ColorfulTheme,
) -> Result<()> {
    let Some(project) = pick_project(api, workspace, theme).await? else {
        return Ok(());
    };

    let name: String = Input::with_theme(theme)
        .with_prompt("Template name")
        .default(suggested_name(&workspace.name, &project.name, Utc::now()))
        .interact_text()?;

    let outcome = export_project(api, store, &project.id, &name).await?;
    println!(
        "Template with {} task(s) created at: {}",
        outcome.count,
        outcome.path.display()
    );
    Ok(())
}

async fn create_from_template(
    api: &dyn MotionApi,
    store: &TemplateStore,
    theme: &ColorfulTheme,
) -> Result<()> {
    let Some(workspace) = pick_workspace(api, theme).await? else {
        return Ok(());
    };

    let files = store.list()?;
    if files.is_empty() {
        println!("No template files found in {}.", store.dir().display());
        let create = Confirm::with_theme(theme)
            .with_prompt("Create a template from an existing project now?")
            .default(true)
            .interact()?;
        if create {
            export_into_template(api, store, &workspace, theme).await?;
        }
        return Ok(());
    }

    let idx = Select::with_theme(theme)
        .with_prompt("Select a template")
        .items(&files)
        .default(0)
        .interact()?;
    let template_name = &files[idx];
    // Fail on a bad file before prompting or creating a project.
    let records = store.load(template_name)?;
    println!("Loaded {} task(s) from {template_name}", records.len());

    let days: String = Input::with_theme(theme)
        .with_prompt("Due date in how many days? (blank for none)")
        .allow_empty(true)
        .validate_with(|input: &String| parse_days(input).map(|_| ()))
        .interact_text()?;
    let now = Utc::now();
    let due_date = parse_days(&days)
        .map_err(anyhow::Error::msg)?
        .map(|d| due_date_in_days(d, now).context("Due date is out of range"))
        .transpose()?;

    let project_id = choose_target_project(api, &workspace, due_date, theme).await?;

    let auto_schedule = Confirm::with_theme(theme)
        .with_prompt("Enable auto-scheduling?")
        .default(false)
        .interact()?;
    let picked = pick_schedule(api, theme).await?;

    let plan = ImportPlan {
        workspace_id: workspace.id.clone(),
        project_id,
        due_date,
        schedule: resolve_schedule(picked, auto_schedule),
    };

    let outcome = import_from_store(api, store, template_name, &plan, REQUEST_DELAY).await?;
    println!(
        "Task creation completed: {}/{} succeeded, {} failed.",
        outcome.created.len(),
        outcome.total,
        outcome.failures.len()
    );
    for failure in &outcome.failures {
        println!("  - {}: {}", failure.name, failure.error);
    }
    Ok(())
}

async fn choose_target_project(
    api: &dyn MotionApi,
    workspace: &Workspace,
    due_date: Option<DateTime<Utc>>,
    theme: &ColorfulTheme,
) -> Result<Option<String>> {
    let options = ["Existing project", "New project", "No project"];
    let choice = Select::with_theme(theme)
        .with_prompt("Where should the tasks go?")
        .items(&options)
        .default(0)
        .interact()?;

    match choice {
        0 => Ok(pick_project(api, workspace, theme).await?.map(|p| p.id)),
        1 => {
            let name: String = Input::with_theme(theme)
                .with_prompt("Name for the new project")
                .interact_text()?;
            let idx = Select::with_theme(theme)
                .with_prompt("Project priority")
                .items(&Priority::ALL)
                .default(2)
                .interact()?;

            let id =
                create_target_project(api, &workspace.id, &name, Priority::ALL[idx], due_date)
                    .await?;
            println!("Project '{}' created (ID: {id})", name.trim());
            Ok(Some(id))
        }
        _ => Ok(None),
    }
}

/// Offer the account's schedules. A failed lookup is not fatal.
async fn pick_schedule(api: &dyn MotionApi, theme: &ColorfulTheme) -> Result<Option<String>> {
    let schedules = match api.list_schedules().await {
        Ok(schedules) => schedules,
        Err(e) => {
            tracing::warn!(error = %e, "could not retrieve schedules");
            println!("Could not retrieve schedules, continuing without one.");
            return Ok(None);
        }
    };
    if schedules.is_empty() {
        return Ok(None);
    }

    let mut labels = vec!["None".to_string()];
    labels.extend(schedules.iter().map(|s| match &s.timezone {
        Some(tz) => format!("{} ({tz})", s.name),
        None => s.name.clone(),
    }));
    let idx = Select::with_theme(theme)
        .with_prompt("Schedule for all tasks")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(idx.checked_sub(1).map(|i| schedules[i].name.clone()))
}
