use log::{debug, info};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::error::ConsoleError;
use super::generation::RequestGeneration;
use super::values::{ParameterValue, ParameterValues, check_valid_values, coerce_for};
use crate::api::{ReportParameter, ReportServerApi};

/// Lifecycle of the parameter form for the selected report
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ParameterState {
    #[default]
    Idle,
    Loading {
        report_path: String,
    },
    Ready {
        report_path: String,
        parameters: Vec<ReportParameter>,
        values: ParameterValues,
    },
    Failed {
        report_path: String,
        error: ConsoleError,
    },
}

impl ParameterState {
    pub fn report_path(&self) -> Option<&str> {
        match self {
            ParameterState::Idle => None,
            ParameterState::Loading { report_path }
            | ParameterState::Ready { report_path, .. }
            | ParameterState::Failed { report_path, .. } => Some(report_path),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ParameterState::Ready { .. })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ParameterState::Loading { .. })
    }

    pub fn error(&self) -> Option<&ConsoleError> {
        match self {
            ParameterState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn parameters(&self) -> &[ReportParameter] {
        match self {
            ParameterState::Ready { parameters, .. } => parameters,
            _ => &[],
        }
    }

    pub fn values(&self) -> Option<&ParameterValues> {
        match self {
            ParameterState::Ready { values, .. } => Some(values),
            _ => None,
        }
    }

    /// Required parameters still missing a value; empty unless `Ready`
    pub fn missing_required(&self) -> Vec<String> {
        match self {
            ParameterState::Ready { parameters, values, .. } => values.missing_required(parameters),
            _ => Vec::new(),
        }
    }

    pub fn can_submit(&self) -> bool {
        self.is_ready() && self.missing_required().is_empty()
    }
}

/// Parameter schema and current values for one selected report
///
/// Values always belong to the report whose schema is loaded. Selecting a new
/// report throws the old values away before anything else happens.
pub struct ParameterSession {
    api: Arc<dyn ReportServerApi>,
    generation: RequestGeneration,
    state: RwLock<ParameterState>,
}

impl ParameterSession {
    pub fn new(api: Arc<dyn ReportServerApi>) -> Self {
        Self {
            api,
            generation: RequestGeneration::new(),
            state: RwLock::new(ParameterState::Idle),
        }
    }

    /// Load the parameter schema for `report_path` and seed values from defaults
    pub async fn select_report(&self, report_path: &str) -> ParameterState {
        info!("Loading parameters for report: {}", report_path);
        let ticket = {
            let mut state = self.state.write().await;
            *state = ParameterState::Loading {
                report_path: report_path.to_string(),
            };
            self.generation.issue()
        };

        let result = self.api.get_report_parameters(report_path).await;

        let mut state = self.state.write().await;
        if !self.generation.is_current(ticket) {
            debug!("Discarding stale parameter schema for '{}'", report_path);
            return state.clone();
        }

        *state = match result {
            Ok(parameters) => {
                let values = ParameterValues::defaults_for(&parameters);
                debug!(
                    "Loaded {} parameters for '{}' ({} defaults)",
                    parameters.len(),
                    report_path,
                    values.len()
                );
                ParameterState::Ready {
                    report_path: report_path.to_string(),
                    parameters,
                    values,
                }
            }
            Err(e) => ParameterState::Failed {
                report_path: report_path.to_string(),
                error: ConsoleError::load(format!("Failed to load parameters for '{}'", report_path), e),
            },
        };
        state.clone()
    }

    /// Forget the selection and supersede any schema request in flight
    pub async fn deselect(&self) {
        self.generation.invalidate();
        *self.state.write().await = ParameterState::Idle;
    }

    /// Coerce raw input to the parameter's type and store it.
    ///
    /// Blank input for a non-text parameter clears the value.
    pub async fn update_value(&self, name: &str, raw: &str) -> Result<(), ConsoleError> {
        let mut state = self.state.write().await;
        let (parameters, values) = ready_parts(&mut state)?;
        let param = find_parameter(parameters, name)?;

        match coerce_for(param, raw)? {
            Some(value) => {
                check_valid_values(param, &value)?;
                debug!("Parameter '{}' = {}", name, value);
                values.insert(name, value);
            }
            None => {
                values.remove(name);
            }
        }
        Ok(())
    }

    /// Store an already typed value
    pub async fn set_value(&self, name: &str, value: ParameterValue) -> Result<(), ConsoleError> {
        let mut state = self.state.write().await;
        let (parameters, values) = ready_parts(&mut state)?;
        let param = find_parameter(parameters, name)?;
        check_valid_values(param, &value)?;
        values.insert(name, value);
        Ok(())
    }

    pub async fn clear_value(&self, name: &str) -> Result<(), ConsoleError> {
        let mut state = self.state.write().await;
        let (parameters, values) = ready_parts(&mut state)?;
        find_parameter(parameters, name)?;
        values.remove(name);
        Ok(())
    }

    /// Restore every value to the report's declared defaults
    pub async fn reset(&self) -> Result<(), ConsoleError> {
        let mut state = self.state.write().await;
        let (parameters, values) = ready_parts(&mut state)?;
        *values = ParameterValues::defaults_for(parameters);
        Ok(())
    }

    pub async fn snapshot(&self) -> ParameterState {
        self.state.read().await.clone()
    }

    pub async fn missing_required(&self) -> Vec<String> {
        self.state.read().await.missing_required()
    }

    pub async fn can_submit(&self) -> bool {
        self.state.read().await.can_submit()
    }
}

fn ready_parts(state: &mut ParameterState) -> Result<(&[ReportParameter], &mut ParameterValues), ConsoleError> {
    match state {
        ParameterState::Ready { parameters, values, .. } => Ok((parameters.as_slice(), values)),
        ParameterState::Idle => Err(ConsoleError::NoSelection),
        _ => Err(ConsoleError::NotReady("Report parameters".to_string())),
    }
}

fn find_parameter<'a>(parameters: &'a [ReportParameter], name: &str) -> Result<&'a ReportParameter, ConsoleError> {
    parameters
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| ConsoleError::UnknownParameter(name.to_string()))
}
