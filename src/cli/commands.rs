//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::StepReport;
use crate::application::{IoResultExt, Wizard};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{RoomType, Step};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Check { draft }) => cmd_check(cli, draft),
        Some(Commands::Tree { draft }) => cmd_tree(cli, draft),
        Some(Commands::Submit { draft, save }) => cmd_submit(cli, draft, *save),
        Some(Commands::Catalog) => cmd_catalog(cli),
        Some(Commands::Config { command }) => cmd_config(command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `onboard --help`".to_string(),
        )),
    }
}

/// Settings for a draft: the local config is looked up next to the draft.
fn settings_for(draft: Option<&Path>) -> CliResult<Settings> {
    let dir = draft.and_then(|p| p.parent()).filter(|d| !d.as_os_str().is_empty());
    Ok(Settings::load(dir)?)
}

fn load_wizard(cli: &Cli, container: &ServiceContainer, draft: &Path) -> CliResult<Wizard> {
    let flow = cli.flow.map(Into::into).unwrap_or(container.settings.flow);
    let wizard = container
        .onboarding_service()
        .load_draft(draft, flow, container.settings.catalog())?;
    Ok(wizard)
}

fn print_reports(reports: &[StepReport]) {
    for report in reports {
        if report.passed() {
            output::success(&report.step);
        } else {
            output::failure(&report.step);
            for issue in &report.issues {
                output::detail(&format!("  {}", issue));
            }
        }
    }
}

#[instrument(skip(cli))]
fn cmd_check(cli: &Cli, draft: &Path) -> CliResult<()> {
    let container = ServiceContainer::new(settings_for(Some(draft))?);
    let service = container.onboarding_service();
    let mut wizard = load_wizard(cli, &container, draft)?;

    let reports = service.replay(&mut wizard);
    print_reports(&reports);

    let remaining = wizard.field_issues();
    let blocked = reports.iter().any(|r| !r.passed());
    if blocked || !remaining.is_empty() {
        if !remaining.is_empty() {
            output::header("Field issues");
            for issue in &remaining {
                output::failure(issue);
            }
        }
        return Err(CliError::Incomplete(format!(
            "stopped at {} with {} open issue(s)",
            wizard.step(),
            remaining.len()
        )));
    }

    output::action("Ready", &format!("{} room(s) in total", wizard.tree().total_rooms()));
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_tree(cli: &Cli, draft: &Path) -> CliResult<()> {
    let container = ServiceContainer::new(settings_for(Some(draft))?);
    let wizard = load_wizard(cli, &container, draft)?;
    if let Some(bt) = wizard.business_type() {
        output::header(&format!("Business type: {}", bt));
    }
    output::info(&wizard.tree().to_termtree());
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_submit(cli: &Cli, draft: &Path, save: bool) -> CliResult<()> {
    let container = ServiceContainer::new(settings_for(Some(draft))?);
    let service = container.onboarding_service();
    let mut wizard = load_wizard(cli, &container, draft)?;

    let reports = service.replay(&mut wizard);
    if wizard.step() != Step::LAST || reports.iter().any(|r| !r.passed()) {
        print_reports(&reports);
        return Err(CliError::Incomplete(format!("stopped at {}", wizard.step())));
    }

    let records = service.submit(&mut wizard)?;
    let json = if container.settings.pretty {
        serde_json::to_string_pretty(&records)
    } else {
        serde_json::to_string(&records)
    }
    .map_err(|e| InfraError::Serialize {
        context: "submission echo".to_string(),
        source: e,
    })?;

    if save {
        let path = save_echo(&container, &records[..], &json)?;
        output::action("Saved", &path.display());
    } else {
        output::info(&json);
    }
    output::success(&format!("Submitted {} company(ies)", records.len()));
    Ok(())
}

fn save_echo(
    container: &ServiceContainer,
    records: &[crate::domain::CompanyRecord],
    json: &str,
) -> CliResult<PathBuf> {
    let dir = &container.settings.output_dir;
    container
        .fs
        .create_dir_all(dir)
        .with_path_context("create output dir", dir)?;
    let stem = records
        .first()
        .map(|r| r.id.clone())
        .unwrap_or_else(|| "submission".to_string());
    let path = dir.join(format!("{}.json", stem));
    container
        .fs
        .write(&path, json)
        .with_path_context("write submission", &path)?;
    debug!("saved echo to {}", path.display());
    Ok(path)
}

fn cmd_catalog(cli: &Cli) -> CliResult<()> {
    let settings = settings_for(None)?;
    let flow = cli.flow.map(Into::into).unwrap_or(settings.flow);

    output::header("Room types");
    for room_type in RoomType::ALL {
        output::detail(&format!("{:<10} capacity {}", room_type, room_type.capacity()));
    }
    if !flow.derives_capacity() {
        output::warning("capacity is editable in this flow; the table gives the default");
    }

    output::header("Amenities");
    for amenity in settings.catalog().names() {
        output::detail(amenity);
    }
    Ok(())
}

fn cmd_config(command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let cwd = std::env::current_dir().ok();
            let settings = Settings::load(cwd.as_deref())?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("Global", &path.display()),
                None => output::warning("no global config directory on this platform"),
            }
            if let Ok(cwd) = std::env::current_dir() {
                output::action("Local", &local_config_path(&cwd).display());
            }
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}
