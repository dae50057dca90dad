use anyhow::Result;
use clap::Args;
use colored::*;
use log::info;
use std::path::{Path, PathBuf};

use crate::api::RenderFormat;
use crate::cli::context::CommandContext;
use crate::cli::output::{format_size, print_hint, print_success, print_table};
use crate::state::{ParameterSession, ParameterState, PreviewState, Renderer, ReportWorkbench, paths};
use crate::ui::{self, prompt_parameter, with_spinner};

#[derive(Args)]
pub struct ParamsArgs {
    /// Report path (e.g., /Sales/Revenue)
    pub report: String,
}

#[derive(Args)]
pub struct RenderArgs {
    /// Report path (e.g., /Sales/Revenue)
    pub report: String,
    /// Export format (pdf, excel, word, csv, xml, image); defaults to the configured format
    #[arg(short, long)]
    pub format: Option<RenderFormat>,
    /// Parameter value as NAME=VALUE; multi-value parameters take comma separated values
    #[arg(short = 'p', long = "param", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,
    /// Output file or directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Prompt for every parameter
    #[arg(short, long)]
    pub interactive: bool,
}

#[derive(Args)]
pub struct PreviewArgs {
    /// Report path (e.g., /Sales/Revenue)
    pub report: String,
    /// Parameter value as NAME=VALUE
    #[arg(short = 'p', long = "param", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,
}

/// Split `NAME=VALUE`; the value may itself contain `=`
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing parameter name in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

pub async fn handle_params_command(args: ParamsArgs) -> Result<()> {
    info!("Executing params command for {}", args.report);
    let context = CommandContext::connect()?;
    let session = ParameterSession::new(context.api.clone());

    let state = with_spinner("Loading parameters...", session.select_report(&args.report)).await;
    let (parameters, values) = match &state {
        ParameterState::Ready { parameters, values, .. } => (parameters, values),
        ParameterState::Failed { error, .. } => anyhow::bail!(error.clone()),
        _ => anyhow::bail!("Parameters for '{}' did not load", args.report),
    };

    println!("📄 {}", args.report.bold());
    if parameters.is_empty() {
        print_hint("This report has no parameters.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = parameters
        .iter()
        .map(|p| {
            let mut flags = Vec::new();
            if p.is_required() {
                flags.push("required");
            }
            if p.multi_value {
                flags.push("multi");
            }
            if p.allow_blank {
                flags.push("blank ok");
            }
            vec![
                p.name.clone(),
                p.parameter_type.to_string(),
                flags.join(", "),
                values.get(&p.name).map(ToString::to_string).unwrap_or_default(),
                p.valid_values.join(", "),
                p.prompt.clone(),
            ]
        })
        .collect();
    print_table(&["Name", "Type", "Flags", "Default", "Valid values", "Prompt"], &rows);
    Ok(())
}

pub async fn handle_render_command(args: RenderArgs) -> Result<()> {
    info!("Executing render command for {}", args.report);
    let context = CommandContext::connect()?;
    let format = args.format.unwrap_or(context.config.settings.default_format);

    let session = ParameterSession::new(context.api.clone());
    let state = with_spinner("Loading parameters...", session.select_report(&args.report)).await;
    if let Some(error) = state.error() {
        anyhow::bail!(error.clone());
    }

    for (name, value) in &args.params {
        session.update_value(name, value).await?;
    }

    let missing = session.missing_required().await;
    if args.interactive || (!missing.is_empty() && ui::is_interactive()) {
        fill_interactively(&session, args.interactive).await?;
    }

    let snapshot = session.snapshot().await;
    let missing = snapshot.missing_required();
    if !missing.is_empty() {
        anyhow::bail!(crate::state::ConsoleError::Validation { missing });
    }
    let values = snapshot.values().cloned().unwrap_or_default();

    let (dir, file_name) = output_target(args.output.as_deref(), || context.config.download_dir());
    let renderer = Renderer::new(context.api.clone());
    let saved = with_spinner(
        format!("Rendering {} as {}...", args.report, format.label()),
        renderer.download(&args.report, &values, format, &dir, file_name.as_deref()),
    )
    .await?;

    let size = std::fs::metadata(&saved).map(|m| m.len() as usize).unwrap_or(0);
    print_success(&format!("Saved {} ({})", saved.display(), format_size(size)));
    Ok(())
}

/// Split `--output` into a directory and an optional file name
fn output_target(output: Option<&Path>, default_dir: impl FnOnce() -> PathBuf) -> (PathBuf, Option<String>) {
    match output {
        None => (default_dir(), None),
        Some(path) if path.is_dir() => (path.to_path_buf(), None),
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
            (dir, name)
        }
    }
}

/// Prompt for parameters; only missing required ones unless `all`
async fn fill_interactively(session: &ParameterSession, all: bool) -> Result<()> {
    let state = session.snapshot().await;
    let missing = state.missing_required();

    for param in state.parameters() {
        if !all && !missing.contains(&param.name) {
            continue;
        }
        loop {
            let current = session.snapshot().await.values().and_then(|v| v.get(&param.name).cloned());
            let raw = prompt_parameter(param, current.as_ref())?;
            match session.update_value(&param.name, &raw).await {
                Ok(()) => break,
                Err(e) => println!("{}", e.to_string().red()),
            }
        }
    }
    Ok(())
}

pub async fn handle_preview_command(args: PreviewArgs) -> Result<()> {
    info!("Executing preview command for {}", args.report);
    let context = CommandContext::connect()?;
    let workbench =
        ReportWorkbench::new(context.api.clone()).with_format(context.config.settings.default_format);

    let state = with_spinner("Loading parameters...", workbench.select_report(&args.report)).await;
    if let Some(error) = state.error() {
        anyhow::bail!(error.clone());
    }

    if !ui::is_interactive() {
        workbench.apply_parameters(&args.params).await?;
        let preview = workbench.ensure_preview().await?;
        if let Some(error) = preview.error {
            anyhow::bail!(error);
        }
        // Temporary preview files do not outlive the process
        if let Some(document) = preview.document {
            let saved = document.save_copy(&context.config.download_dir()).await?;
            print_success(&format!("Preview saved to {}", saved.display()));
        }
        return Ok(());
    }

    if let Some(preview) = workbench.apply_parameters(&args.params).await? {
        show_preview(&preview);
    }
    preview_loop(&workbench).await
}

async fn preview_loop(workbench: &ReportWorkbench) -> Result<()> {
    const ACTIONS: [&str; 5] = ["Edit parameter", "Reset parameters", "Refresh preview", "Download", "Done"];

    loop {
        let missing = workbench.parameters().await.missing_required();
        if !missing.is_empty() {
            println!("{} {}", "Missing:".yellow(), missing.join(", "));
        }

        let action = dialoguer::Select::new()
            .with_prompt("Preview")
            .items(&ACTIONS)
            .default(0)
            .interact()?;

        let outcome = match action {
            0 => edit_parameter(workbench).await,
            1 => workbench.reset_parameters().await.map_err(Into::into),
            2 => workbench.refresh_preview().await.map(Some).map_err(Into::into),
            3 => {
                download_from_workbench(workbench).await?;
                Ok(None)
            }
            _ => break,
        };

        match outcome {
            Ok(Some(preview)) => show_preview(&preview),
            Ok(None) => {}
            Err(e) => println!("{}", e.to_string().red()),
        }
    }

    workbench.deselect().await;
    print_hint("Preview discarded.");
    Ok(())
}

async fn edit_parameter(workbench: &ReportWorkbench) -> Result<Option<PreviewState>> {
    let state = workbench.parameters().await;
    let parameters = state.parameters();
    if parameters.is_empty() {
        print_hint("This report has no parameters.");
        return Ok(None);
    }

    let names: Vec<String> = parameters
        .iter()
        .map(|p| {
            let value = state
                .values()
                .and_then(|v| v.get(&p.name))
                .map(ToString::to_string)
                .unwrap_or_else(|| "-".to_string());
            format!("{} = {}", p.name, value)
        })
        .collect();
    let picked = dialoguer::Select::new()
        .with_prompt("Parameter")
        .items(&names)
        .interact()?;

    let param = &parameters[picked];
    let current = state.values().and_then(|v| v.get(&param.name));
    let raw = prompt_parameter(param, current)?;
    Ok(workbench.set_parameter(&param.name, &raw).await?)
}

async fn download_from_workbench(workbench: &ReportWorkbench) -> Result<()> {
    let config = crate::config::Config::load()?;
    let formats: Vec<&str> = RenderFormat::ALL.iter().map(|f| f.label()).collect();
    let current = workbench.format().await;
    let default_index = RenderFormat::ALL.iter().position(|f| *f == current).unwrap_or(0);

    let picked = dialoguer::Select::new()
        .with_prompt("Format")
        .items(&formats)
        .default(default_index)
        .interact()?;
    let format = RenderFormat::ALL[picked];
    workbench.set_format(format).await;

    match with_spinner("Rendering...", workbench.download(None, None, &config.download_dir())).await {
        Ok(saved) => print_success(&format!("Saved {}", saved.display())),
        Err(e) => println!("{}", e.to_string().red()),
    }
    Ok(())
}

fn show_preview(preview: &PreviewState) {
    if let Some(error) = &preview.error {
        println!("{} {}", "Preview failed:".red(), error);
    }
    if let Some(document) = &preview.document {
        println!(
            "🔍 Preview of {} ({}): {}",
            paths::item_name(document.report_path()).unwrap_or_default().bold(),
            format_size(document.size()),
            document.path().display().to_string().bright_cyan()
        );
    }
}
