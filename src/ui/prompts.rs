use anyhow::{Context, Result};
use dialoguer::{Input, MultiSelect, Select};
use is_terminal::IsTerminal;

use crate::api::{ParameterType, ReportParameter};
use crate::state::ParameterValue;

/// Whether prompts can be shown at all
pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

/// Arrow-key Yes/No selection
pub fn prompt_confirmation(prompt: &str, default_yes: bool) -> Result<bool> {
    let items = vec!["Yes", "No"];
    let default_index = if default_yes { 0 } else { 1 };

    let selection = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(default_index)
        .interact()?;

    Ok(selection == 0)
}

pub fn prompt_remove_confirmation(kind: &str, name: &str) -> Result<bool> {
    prompt_confirmation(&format!("Delete {} '{}'?", kind, name), false)
}

pub fn prompt_environment_selection(env_names: &[String], current_env: Option<&String>) -> Result<String> {
    let items: Vec<String> = env_names
        .iter()
        .map(|env| {
            if current_env == Some(env) {
                format!("{} (current)", env)
            } else {
                env.clone()
            }
        })
        .collect();

    let selection = Select::new()
        .with_prompt("Select environment")
        .items(&items)
        .interact()?;

    Ok(env_names[selection].clone())
}

/// Text input with an optional default
pub fn text_input(prompt: &str, default: Option<&str>) -> Result<String> {
    let mut input_prompt = Input::<String>::new().with_prompt(prompt);

    if let Some(default_val) = default {
        input_prompt = input_prompt.default(default_val.to_string());
    }

    Ok(input_prompt.interact_text()?)
}

/// Read a password without echoing it
pub fn prompt_password(username: &str) -> Result<String> {
    rpassword::prompt_password(format!("Password for {}: ", username)).context("Failed to read password")
}

/// Ask for one report parameter and return the raw answer.
///
/// Parameters with a valid-values list become a selection; booleans become a
/// Yes/No choice; everything else is free text prefilled with `current`.
pub fn prompt_parameter(param: &ReportParameter, current: Option<&ParameterValue>) -> Result<String> {
    let required = if param.is_required() { " *" } else { "" };
    let label = format!("{} ({}){}", param.display_prompt(), param.parameter_type, required);
    let current_text = current.map(ToString::to_string);

    if !param.valid_values.is_empty() {
        if param.multi_value {
            let selected: Vec<String> = current_text
                .as_deref()
                .map(|s| s.split(',').map(|v| v.trim().to_string()).collect())
                .unwrap_or_default();
            let defaults: Vec<bool> = param.valid_values.iter().map(|v| selected.contains(v)).collect();

            let picked = MultiSelect::new()
                .with_prompt(label)
                .items(&param.valid_values)
                .defaults(&defaults)
                .interact()?;
            let values: Vec<&str> = picked.iter().map(|&i| param.valid_values[i].as_str()).collect();
            return Ok(values.join(","));
        }

        let default_index = current_text
            .as_deref()
            .and_then(|c| param.valid_values.iter().position(|v| v == c))
            .unwrap_or(0);
        let picked = Select::new()
            .with_prompt(label)
            .items(&param.valid_values)
            .default(default_index)
            .interact()?;
        return Ok(param.valid_values[picked].clone());
    }

    if param.parameter_type == ParameterType::Boolean && !param.multi_value {
        let default_yes = matches!(current, Some(ParameterValue::Boolean(true)));
        return Ok(prompt_confirmation(&label, default_yes)?.to_string());
    }

    let hint = match (param.parameter_type, param.multi_value) {
        (_, true) => " [comma separated]",
        (ParameterType::DateTime, false) => " [YYYY-MM-DD]",
        _ => "",
    };
    let mut input = Input::<String>::new()
        .with_prompt(format!("{}{}", label, hint))
        .allow_empty(true);
    if let Some(current_text) = current_text {
        input = input.default(current_text);
    }
    Ok(input.interact_text()?)
}
