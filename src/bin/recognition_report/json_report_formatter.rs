use std::fs;
use std::path::Path;

use sign_hmm::RecognitionReport;

/// Writes `report` as pretty JSON, creating parent directories as needed.
pub fn write_report(path: &Path, report: &RecognitionReport) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            format!(
                "Failed to create report directory '{}': {err}",
                parent.display()
            )
        })?;
    }

    let mut body = serde_json::to_string_pretty(report)
        .map_err(|err| format!("Failed to serialize recognition report: {err}"))?;
    body.push('\n');
    fs::write(path, body)
        .map_err(|err| format!("Failed to write report '{}': {err}", path.display()))
}
