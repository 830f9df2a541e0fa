use crate::error::{CalcFieldError, CalcFieldResult};
use crate::types::ReportDefinition;
use std::path::Path;

/// Parse a report definition file (YAML)
pub fn parse_report(path: &Path) -> CalcFieldResult<ReportDefinition> {
    let content = std::fs::read_to_string(path)?;
    parse_report_str(&content).map_err(|e| match e {
        CalcFieldError::Parse(msg) => {
            CalcFieldError::Parse(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

/// Parse a report definition from YAML text
pub fn parse_report_str(content: &str) -> CalcFieldResult<ReportDefinition> {
    // An empty document is a report with nothing in it
    if content.trim().is_empty() {
        return Ok(ReportDefinition::default());
    }

    let report: ReportDefinition = serde_yaml::from_str(content)?;

    if let Some(field) = report.fields.iter().find(|f| f.id.trim().is_empty()) {
        return Err(CalcFieldError::Parse(format!(
            "Field '{}' has an empty id",
            field.name
        )));
    }

    Ok(report)
}
