//! Extraction collaborator boundary.
//!
//! The ALEAPP tool owns extraction: it turns raw evidence into a report
//! directory containing the timeline record store (`_Timeline/tl.db`), the
//! device-metadata document, and the full HTML report. This module invokes it
//! as a subprocess and resolves the paths it produces; extraction failure is
//! fatal to the session because nothing downstream can run without a store.

use std::path::{Path, PathBuf};
use std::process::Command;

use shlex::Shlex;
use tracing::{info, warn};

use crate::{TimelineError, TimelineResult};

/// Placeholder markup when the collaborator produced no device-metadata
/// document.
pub const DEVICE_INFO_PLACEHOLDER: &str = "<p>Device info not available.</p>";

/// Evidence input kinds the collaborator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Fs,
    Zip,
    Tar,
    Gz,
}

impl InputKind {
    /// Detect the input kind from the evidence path. Directories are
    /// filesystem inputs; anything else is classified by extension, and an
    /// unsupported extension is a recoverable input error.
    pub fn detect(path: &Path) -> TimelineResult<Self> {
        if path.is_dir() {
            return Ok(InputKind::Fs);
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "zip" => Ok(InputKind::Zip),
            "tar" => Ok(InputKind::Tar),
            "gz" | "tgz" => Ok(InputKind::Gz),
            other => Err(TimelineError::Message(format!(
                "unsupported input type or archive extension: '.{other}'"
            ))),
        }
    }

    /// Flag value the collaborator expects for this kind.
    pub fn flag(self) -> &'static str {
        match self {
            InputKind::Fs => "fs",
            InputKind::Zip => "zip",
            InputKind::Tar => "tar",
            InputKind::Gz => "gz",
        }
    }
}

/// Configuration for the extraction collaborator.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Directory containing the ALEAPP tool (`aleapp.py`).
    pub tool_dir: PathBuf,
    /// Optional command template overriding the default invocation.
    /// Placeholders: `{input}`, `{output}`, `{type}`.
    pub template: Option<String>,
}

impl ExtractorConfig {
    pub fn new(tool_dir: impl Into<PathBuf>) -> Self {
        ExtractorConfig { tool_dir: tool_dir.into(), template: None }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    fn build_command(
        &self,
        kind: InputKind,
        input: &Path,
        output: &Path,
    ) -> TimelineResult<Command> {
        if let Some(template) = &self.template {
            let mut parts: Vec<String> = Shlex::new(template).collect();
            if parts.is_empty() {
                return Err(TimelineError::Message("empty extractor command template".into()));
            }
            let input_str = input.to_string_lossy();
            let output_str = output.to_string_lossy();
            for part in &mut parts {
                *part = part
                    .replace("{input}", &input_str)
                    .replace("{output}", &output_str)
                    .replace("{type}", kind.flag());
            }
            let mut cmd = Command::new(&parts[0]);
            for part in &parts[1..] {
                cmd.arg(part);
            }
            return Ok(cmd);
        }

        if !self.tool_dir.is_dir() {
            return Err(TimelineError::Message(format!(
                "the extractor directory {} does not exist",
                self.tool_dir.display()
            )));
        }
        let mut cmd = Command::new("python");
        cmd.arg("aleapp.py")
            .arg("-t")
            .arg(kind.flag())
            .arg("-o")
            .arg(output)
            .arg("-i")
            .arg(input)
            // aleapp.py resolves its module paths relative to its own folder
            .current_dir(&self.tool_dir);
        Ok(cmd)
    }
}

/// Run the collaborator over one evidence input and return the report
/// location it announces on stdout.
pub fn run_extraction(
    cfg: &ExtractorConfig,
    input: &Path,
    output: &Path,
) -> TimelineResult<PathBuf> {
    let kind = InputKind::detect(input)?;
    info!(kind = kind.flag(), input = %input.display(), "running extraction collaborator");

    let mut cmd = cfg.build_command(kind, input, output)?;
    let out = cmd
        .output()
        .map_err(|e| TimelineError::Message(format!("failed to spawn extractor: {e}")))?;

    let stdout = String::from_utf8_lossy(&out.stdout);
    if !out.status.success() {
        return Err(TimelineError::Message(format!(
            "extractor failed: status={} stdout={} stderr={}",
            out.status,
            stdout.trim(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    report_location_from_stdout(&stdout).ok_or_else(|| {
        TimelineError::Message("report location not found in extractor output".into())
    })
}

/// Find the `Report location:` line the collaborator prints.
pub fn report_location_from_stdout(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .find_map(|line| line.split_once("Report location:"))
        .map(|(_, rest)| PathBuf::from(rest.trim()))
        .filter(|path| !path.as_os_str().is_empty())
}

/// Log the files the collaborator generated.
pub fn list_report_files(report_location: &Path) {
    match std::fs::read_dir(report_location) {
        Ok(entries) => {
            for entry in entries.flatten() {
                info!(file = %entry.file_name().to_string_lossy(), "generated report file");
            }
        }
        Err(e) => warn!(path = %report_location.display(), %e, "report directory not readable"),
    }
}

/// Device-metadata markup for embedding, or the documented placeholder when
/// the document is absent. The content is never parsed or validated.
pub fn device_info_html(report_location: &Path) -> String {
    let path = report_location.join("Script Logs").join("DeviceInfo.html");
    match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(_) => {
            warn!(path = %path.display(), "device info document not found");
            DEVICE_INFO_PLACEHOLDER.to_string()
        }
    }
}

/// The record store inside a report directory.
pub fn timeline_db_path(report_location: &Path) -> PathBuf {
    report_location.join("_Timeline").join("tl.db")
}

/// The collaborator's full report entry point.
pub fn report_index_path(report_location: &Path) -> PathBuf {
    report_location.join("index.html")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_kind_detection() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(InputKind::detect(dir.path()).unwrap(), InputKind::Fs);
        assert_eq!(InputKind::detect(Path::new("dump.zip")).unwrap(), InputKind::Zip);
        assert_eq!(InputKind::detect(Path::new("dump.TAR")).unwrap(), InputKind::Tar);
        assert_eq!(InputKind::detect(Path::new("dump.tar.gz")).unwrap(), InputKind::Gz);
        assert_eq!(InputKind::detect(Path::new("dump.tgz")).unwrap(), InputKind::Gz);

        let err = InputKind::detect(Path::new("dump.rar")).unwrap_err();
        assert!(err.to_string().contains(".rar"));
        assert!(InputKind::detect(Path::new("dump")).is_err());
    }

    #[test]
    fn report_location_is_parsed_from_stdout() {
        let stdout = "processing...\nReport location: /tmp/Output/ALEAPP_Reports_2024\ndone\n";
        assert_eq!(
            report_location_from_stdout(stdout),
            Some(PathBuf::from("/tmp/Output/ALEAPP_Reports_2024"))
        );

        assert_eq!(report_location_from_stdout("no location here"), None);
        assert_eq!(report_location_from_stdout("Report location:   \n"), None);
    }

    #[test]
    fn device_info_falls_back_to_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(device_info_html(dir.path()), DEVICE_INFO_PLACEHOLDER);

        let logs = dir.path().join("Script Logs");
        std::fs::create_dir_all(&logs).unwrap();
        std::fs::write(logs.join("DeviceInfo.html"), "<table>serial</table>").unwrap();
        assert_eq!(device_info_html(dir.path()), "<table>serial</table>");
    }

    #[test]
    fn template_substitutes_placeholders() {
        let cfg = ExtractorConfig::new("unused").with_template("extractor -t {type} -i {input} -o {output}");
        let cmd = cfg
            .build_command(InputKind::Zip, Path::new("/evidence/dump.zip"), Path::new("/out"))
            .unwrap();
        let args: Vec<String> =
            cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(cmd.get_program().to_string_lossy(), "extractor");
        assert_eq!(args, ["-t", "zip", "-i", "/evidence/dump.zip", "-o", "/out"]);
    }

    #[test]
    fn default_invocation_requires_tool_dir() {
        let cfg = ExtractorConfig::new("/definitely/absent/ALEAPP");
        let err = cfg
            .build_command(InputKind::Zip, Path::new("dump.zip"), Path::new("/out"))
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn report_paths_follow_collaborator_layout() {
        let report = Path::new("/out/ALEAPP_Reports");
        assert_eq!(timeline_db_path(report), Path::new("/out/ALEAPP_Reports/_Timeline/tl.db"));
        assert_eq!(report_index_path(report), Path::new("/out/ALEAPP_Reports/index.html"));
    }
}
