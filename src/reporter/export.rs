use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tabled::settings::object::Rows;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};
use tera::{Context as TeraContext, Tera};

use crate::models::{Artifact, Finding, OutputFormat, ScanSummary};

/// Serialized form of json and yaml artifacts.
#[derive(Debug, Serialize, Deserialize)]
pub struct ArtifactDocument {
    pub scan_time: String,
    pub summary: ScanSummary,
    pub findings: Vec<Finding>,
}

impl ArtifactDocument {
    fn new(findings: &[Finding]) -> Self {
        Self {
            scan_time: Utc::now().to_rfc3339(),
            summary: ScanSummary::from_findings(findings),
            findings: findings.to_vec(),
        }
    }
}

pub struct JsonExporter;

impl JsonExporter {
    pub fn render(findings: &[Finding]) -> Result<String> {
        Ok(serde_json::to_string_pretty(&ArtifactDocument::new(findings))?)
    }

    pub fn load(content: &str) -> Result<Vec<Finding>> {
        let data: ArtifactDocument = serde_json::from_str(content)?;
        Ok(data.findings)
    }
}

pub struct YamlExporter;

impl YamlExporter {
    pub fn render(findings: &[Finding]) -> Result<String> {
        Ok(serde_yaml::to_string(&ArtifactDocument::new(findings))?)
    }

    pub fn load(content: &str) -> Result<Vec<Finding>> {
        let data: ArtifactDocument = serde_yaml::from_str(content)?;
        Ok(data.findings)
    }
}

pub struct TableExporter;

#[derive(Tabled)]
struct TableRow {
    #[tabled(rename = "Endpoint")]
    endpoint: String,
    #[tabled(rename = "Test")]
    test: String,
    #[tabled(rename = "Statuses")]
    statuses: String,
    #[tabled(rename = "Result")]
    result: String,
}

impl TableExporter {
    pub fn render(findings: &[Finding]) -> String {
        let rows: Vec<TableRow> = findings
            .iter()
            .map(|f| TableRow {
                endpoint: f.endpoint(),
                test: f.test_name.clone(),
                statuses: f
                    .responses
                    .iter()
                    .map(|r| {
                        if r.is_error() {
                            format!("{}: ERR", r.label)
                        } else {
                            format!("{}: {}", r.label, r.status)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(", "),
                result: if f.vulnerable { "VULNERABLE" } else { "OK" }.to_string(),
            })
            .collect();

        let summary = ScanSummary::from_findings(findings);
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()))
            .to_string();

        format!(
            "{}\n{} tests, {} vulnerable, {} with errors\n",
            table, summary.total, summary.vulnerable, summary.errored
        )
    }
}

pub struct HtmlExporter;

impl HtmlExporter {
    pub fn render(findings: &[Finding]) -> Result<String> {
        let mut tera = Tera::default();
        tera.add_raw_template("report.html", TEMPLATE)?;

        let summary = ScanSummary::from_findings(findings);

        let mut context = TeraContext::new();
        context.insert("scan_time", &Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string());
        context.insert("summary", &summary);

        let rows: Vec<HtmlRow> = findings
            .iter()
            .map(|f| HtmlRow {
                endpoint: f.endpoint(),
                url: f.url.clone(),
                test_name: f.test_name.clone(),
                description: f.description.clone(),
                statuses: f
                    .responses
                    .iter()
                    .map(|r| format!("{} {}", r.label, r.status))
                    .collect::<Vec<_>>()
                    .join(" / "),
                class: if f.vulnerable { "vulnerable" } else { "ok" }.to_string(),
            })
            .collect();
        context.insert("rows", &rows);

        Ok(tera.render("report.html", &context)?)
    }
}

pub fn render(format: OutputFormat, findings: &[Finding]) -> Result<String> {
    match format {
        OutputFormat::Json => JsonExporter::render(findings),
        OutputFormat::Yaml => YamlExporter::render(findings),
        OutputFormat::Html => HtmlExporter::render(findings),
        OutputFormat::Table => Ok(TableExporter::render(findings)),
    }
}

/// Writes the artifact, refusing to replace an existing file.
pub fn write_artifact(artifact: &Artifact, findings: &[Finding]) -> Result<()> {
    let content = render(artifact.format, findings)?;

    if let Some(parent) = artifact.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&artifact.path)
        .with_context(|| format!("Failed to create {}", artifact.path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to {}", artifact.path.display()))?;

    Ok(())
}

pub fn load_artifact(path: &Path) -> Result<Vec<Finding>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    match OutputFormat::from_path(path) {
        Some(OutputFormat::Json) => JsonExporter::load(&content),
        Some(OutputFormat::Yaml) => YamlExporter::load(&content),
        _ => bail!(
            "{} is not a json or yaml artifact and cannot be read back",
            path.display()
        ),
    }
}

#[derive(Serialize)]
struct HtmlRow {
    endpoint: String,
    url: String,
    test_name: String,
    description: String,
    statuses: String,
    class: String,
}

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>ackscan Report</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #0d1117; color: #c9d1d9; line-height: 1.6; }
        .container { max-width: 1200px; margin: 0 auto; padding: 2rem; }
        h1 { color: #58a6ff; margin-bottom: 0.5rem; }
        .subtitle { color: #8b949e; margin-bottom: 2rem; }
        .summary { display: grid; grid-template-columns: repeat(auto-fit, minmax(150px, 1fr)); gap: 1rem; margin-bottom: 2rem; }
        .stat { background: #161b22; border: 1px solid #30363d; border-radius: 6px; padding: 1rem; text-align: center; }
        .stat-value { font-size: 2rem; font-weight: bold; }
        .stat-label { color: #8b949e; font-size: 0.875rem; }
        .vulnerable .stat-value { color: #f85149; }
        .errored .stat-value { color: #d29922; }
        table { width: 100%; border-collapse: collapse; background: #161b22; border: 1px solid #30363d; }
        th, td { padding: 0.75rem 1rem; text-align: left; border-bottom: 1px solid #30363d; }
        th { background: #21262d; font-weight: 600; }
        .badge { padding: 0.25rem 0.5rem; border-radius: 4px; font-size: 0.75rem; font-weight: 600; }
        .badge.vulnerable { background: #f8514933; color: #f85149; }
        .badge.ok { background: #3fb95033; color: #3fb950; }
        .details { font-size: 0.875rem; color: #8b949e; }
    </style>
</head>
<body>
    <div class="container">
        <h1>ackscan Report</h1>
        <p class="subtitle">Generated: {{ scan_time }}</p>

        <div class="summary">
            <div class="stat">
                <div class="stat-value">{{ summary.total }}</div>
                <div class="stat-label">Tests</div>
            </div>
            <div class="stat vulnerable">
                <div class="stat-value">{{ summary.vulnerable }}</div>
                <div class="stat-label">Vulnerable</div>
            </div>
            <div class="stat errored">
                <div class="stat-value">{{ summary.errored }}</div>
                <div class="stat-label">Errors</div>
            </div>
        </div>

        <table>
            <thead>
                <tr><th>Endpoint</th><th>Test</th><th>Responses</th><th>Result</th></tr>
            </thead>
            <tbody>
                {% for row in rows %}
                <tr>
                    <td>{{ row.endpoint }}<div class="details">{{ row.url }}<br>{{ row.description }}</div></td>
                    <td>{{ row.test_name }}</td>
                    <td>{{ row.statuses }}</td>
                    <td><span class="badge {{ row.class }}">{{ row.class }}</span></td>
                </tr>
                {% endfor %}
            </tbody>
        </table>
    </div>
</body>
</html>"#;
