//! Typed parameter values and their coercion from user input

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::error::ConsoleError;
use crate::api::{ParameterType, ReportParameter};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// A value for one report parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(NaiveDateTime),
    Multi(Vec<ParameterValue>),
}

impl ParameterValue {
    /// Empty values do not satisfy a required parameter
    pub fn is_empty(&self) -> bool {
        match self {
            ParameterValue::Text(s) => s.trim().is_empty(),
            ParameterValue::Multi(values) => values.iter().all(ParameterValue::is_empty),
            ParameterValue::Integer(_)
            | ParameterValue::Float(_)
            | ParameterValue::Boolean(_)
            | ParameterValue::DateTime(_) => false,
        }
    }

    /// JSON sent in the render request body
    pub fn to_wire(&self) -> Value {
        match self {
            ParameterValue::Text(s) => Value::String(s.clone()),
            ParameterValue::Integer(i) => Value::from(*i),
            ParameterValue::Float(f) => Value::from(*f),
            ParameterValue::Boolean(b) => Value::Bool(*b),
            ParameterValue::DateTime(_) => Value::String(self.to_string()),
            ParameterValue::Multi(values) => Value::Array(values.iter().map(ParameterValue::to_wire).collect()),
        }
    }

    /// Seed value from the parameter's declared default
    pub fn from_default(param: &ReportParameter) -> Option<ParameterValue> {
        let raw = param.default_value.as_ref()?;
        match coerce_for(param, raw) {
            Ok(value) => value,
            // Keep the server's default verbatim rather than dropping it
            Err(_) => Some(ParameterValue::Text(raw.clone())),
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Text(s) => f.write_str(s),
            ParameterValue::Integer(i) => write!(f, "{}", i),
            ParameterValue::Float(v) => write!(f, "{}", v),
            ParameterValue::Boolean(b) => write!(f, "{}", b),
            ParameterValue::DateTime(dt) => {
                if dt.time() == NaiveTime::MIN {
                    write!(f, "{}", dt.format(DATE_FORMAT))
                } else {
                    write!(f, "{}", dt.format(DATE_TIME_FORMATS[0]))
                }
            }
            ParameterValue::Multi(values) => {
                let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join(","))
            }
        }
    }
}

impl ParameterType {
    /// Convert raw input into this type.
    ///
    /// Blank input yields `None` for every type except `String`, where an empty
    /// string is a legitimate (if possibly insufficient) value.
    pub fn coerce(&self, raw: &str) -> Result<Option<ParameterValue>, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(match self {
                ParameterType::String => Some(ParameterValue::Text(raw.to_string())),
                _ => None,
            });
        }

        let value = match self {
            ParameterType::String => ParameterValue::Text(raw.to_string()),
            ParameterType::Integer => trimmed
                .parse::<i64>()
                .map(ParameterValue::Integer)
                .map_err(|_| "expected a whole number".to_string())?,
            ParameterType::Float => trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(ParameterValue::Float)
                .ok_or_else(|| "expected a number".to_string())?,
            ParameterType::Boolean => ParameterValue::Boolean(parse_bool(trimmed)?),
            ParameterType::DateTime => ParameterValue::DateTime(parse_date_time(trimmed)?),
        };
        Ok(Some(value))
    }
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        _ => Err("expected true or false".to_string()),
    }
}

fn parse_date_time(raw: &str) -> Result<NaiveDateTime, String> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_local());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| "expected a date (YYYY-MM-DD) or date-time (YYYY-MM-DDTHH:MM:SS)".to_string())
}

/// Coerce raw input for a specific parameter, splitting multi-value input on commas
pub fn coerce_for(param: &ReportParameter, raw: &str) -> Result<Option<ParameterValue>, ConsoleError> {
    let coercion_error = |reason: String| ConsoleError::Coercion {
        parameter: param.name.clone(),
        value: raw.to_string(),
        reason,
    };

    if !param.multi_value {
        return param.parameter_type.coerce(raw).map_err(coercion_error);
    }

    let mut items = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if let Some(value) = param.parameter_type.coerce(part).map_err(coercion_error)? {
            items.push(value);
        }
    }

    if items.is_empty() {
        Ok(None)
    } else {
        Ok(Some(ParameterValue::Multi(items)))
    }
}

/// Check a value against the parameter's valid values list, if it has one
pub fn check_valid_values(param: &ReportParameter, value: &ParameterValue) -> Result<(), ConsoleError> {
    if param.valid_values.is_empty() {
        return Ok(());
    }

    let candidates: Vec<&ParameterValue> = match value {
        ParameterValue::Multi(values) => values.iter().collect(),
        single => vec![single],
    };

    // Valid values use the server's spelling ("True", "2024-01-01T00:00:00");
    // entries that don't coerce are compared as text
    let allowed = |candidate: &ParameterValue| {
        param.valid_values.iter().any(|v| match param.parameter_type.coerce(v) {
            Ok(Some(typed)) => &typed == candidate,
            _ => *v == candidate.to_string(),
        })
    };

    for candidate in candidates {
        if !allowed(candidate) {
            let shown = candidate.to_string();
            return Err(ConsoleError::Coercion {
                parameter: param.name.clone(),
                value: shown,
                reason: format!("must be one of: {}", param.valid_values.join(", ")),
            });
        }
    }
    Ok(())
}

/// Parameter values for exactly one report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterValues(BTreeMap<String, ParameterValue>);

impl ParameterValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values seeded from every declared default
    pub fn defaults_for(parameters: &[ReportParameter]) -> Self {
        let values = parameters
            .iter()
            .filter_map(|p| ParameterValue::from_default(p).map(|v| (p.name.clone(), v)))
            .collect();
        Self(values)
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ParameterValue) {
        self.0.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<ParameterValue> {
        self.0.remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParameterValue)> {
        self.0.iter()
    }

    /// Required parameters whose value is missing or empty, in declaration order
    pub fn missing_required(&self, parameters: &[ReportParameter]) -> Vec<String> {
        parameters
            .iter()
            .filter(|p| p.is_required())
            .filter(|p| self.0.get(&p.name).map(ParameterValue::is_empty).unwrap_or(true))
            .map(|p| p.name.clone())
            .collect()
    }

    pub fn to_wire(&self) -> BTreeMap<String, Value> {
        self.0.iter().map(|(k, v)| (k.clone(), v.to_wire())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn param(name: &str, parameter_type: ParameterType, nullable: bool) -> ReportParameter {
        ReportParameter {
            name: name.to_string(),
            parameter_type,
            nullable,
            allow_blank: false,
            multi_value: false,
            valid_values: Vec::new(),
            default_value: None,
            prompt: String::new(),
        }
    }

    #[test]
    fn test_coerce_each_type() {
        assert_eq!(
            ParameterType::Integer.coerce(" 42 ").unwrap(),
            Some(ParameterValue::Integer(42))
        );
        assert_eq!(
            ParameterType::Float.coerce("3.5").unwrap(),
            Some(ParameterValue::Float(3.5))
        );
        assert_eq!(
            ParameterType::Boolean.coerce("Yes").unwrap(),
            Some(ParameterValue::Boolean(true))
        );
        assert_eq!(
            ParameterType::String.coerce("West").unwrap(),
            Some(ParameterValue::Text("West".into()))
        );

        let date = ParameterType::DateTime.coerce("2024-03-31").unwrap().unwrap();
        assert_eq!(date.to_string(), "2024-03-31");
        let date_time = ParameterType::DateTime.coerce("2024-03-31T08:30:00").unwrap().unwrap();
        assert_eq!(date_time.to_string(), "2024-03-31T08:30:00");
    }

    #[test]
    fn test_coerce_rejects_garbage() {
        assert!(ParameterType::Integer.coerce("4.2").is_err());
        assert!(ParameterType::Float.coerce("NaN").is_err());
        assert!(ParameterType::Boolean.coerce("maybe").is_err());
        assert!(ParameterType::DateTime.coerce("31/03/2024").is_err());
    }

    #[test]
    fn test_blank_input() {
        assert_eq!(ParameterType::Integer.coerce("  ").unwrap(), None);
        assert_eq!(
            ParameterType::String.coerce("").unwrap(),
            Some(ParameterValue::Text(String::new()))
        );
    }

    #[test]
    fn test_emptiness_rule() {
        assert!(ParameterValue::Text("   ".into()).is_empty());
        assert!(!ParameterValue::Text("x".into()).is_empty());
        assert!(ParameterValue::Multi(vec![]).is_empty());
        assert!(ParameterValue::Multi(vec![ParameterValue::Text(" ".into())]).is_empty());
        assert!(!ParameterValue::Boolean(false).is_empty());
        assert!(!ParameterValue::Integer(0).is_empty());
    }

    #[test]
    fn test_multi_value_coercion() {
        let mut regions = param("Regions", ParameterType::Integer, true);
        regions.multi_value = true;

        let value = coerce_for(&regions, "1, 2,,3").unwrap().unwrap();
        assert_eq!(
            value,
            ParameterValue::Multi(vec![
                ParameterValue::Integer(1),
                ParameterValue::Integer(2),
                ParameterValue::Integer(3)
            ])
        );
        assert_eq!(value.to_wire(), json!([1, 2, 3]));
        assert_eq!(coerce_for(&regions, " , ").unwrap(), None);
        assert!(matches!(
            coerce_for(&regions, "1,x"),
            Err(ConsoleError::Coercion { .. })
        ));
    }

    #[test]
    fn test_valid_values() {
        let mut region = param("Region", ParameterType::String, false);
        region.valid_values = vec!["East".into(), "West".into()];

        assert!(check_valid_values(&region, &ParameterValue::Text("West".into())).is_ok());
        assert!(check_valid_values(&region, &ParameterValue::Text("North".into())).is_err());
    }

    #[test]
    fn test_defaults_fall_back_to_text() {
        let mut year = param("Year", ParameterType::Integer, false);
        year.default_value = Some("2024".into());
        let mut odd = param("Start", ParameterType::DateTime, true);
        odd.default_value = Some("=Today()".into());
        let none = param("Region", ParameterType::String, false);

        let values = ParameterValues::defaults_for(&[year, odd, none]);
        assert_eq!(values.get("Year"), Some(&ParameterValue::Integer(2024)));
        assert_eq!(values.get("Start"), Some(&ParameterValue::Text("=Today()".into())));
        assert_eq!(values.get("Region"), None);
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_missing_required() {
        let params = vec![
            param("Year", ParameterType::Integer, false),
            param("Region", ParameterType::String, false),
            param("Note", ParameterType::String, true),
        ];
        let mut values = ParameterValues::new();
        values.insert("Region", ParameterValue::Text("  ".into()));
        assert_eq!(values.missing_required(&params), vec!["Year", "Region"]);

        values.insert("Year", ParameterValue::Integer(2024));
        values.insert("Region", ParameterValue::Text("West".into()));
        assert!(values.missing_required(&params).is_empty());
    }

    #[test]
    fn test_wire_format() {
        let mut values = ParameterValues::new();
        values.insert("Year", ParameterValue::Integer(2024));
        values.insert("Active", ParameterValue::Boolean(true));
        values.insert("Region", ParameterValue::Text("West".into()));

        let wire = serde_json::to_value(values.to_wire()).unwrap();
        assert_eq!(wire, json!({"Active": true, "Region": "West", "Year": 2024}));
    }
}
