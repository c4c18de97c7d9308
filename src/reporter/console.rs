use colored::Colorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::outcome::{Outcome, Tone};
use crate::scanner::ApiSpec;

pub struct ConsoleReporter;

#[derive(Tabled)]
struct OperationRow {
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Path params")]
    params: String,
    #[tabled(rename = "Body example")]
    body: String,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn print_outcome(&self, outcome: &Outcome) {
        println!();
        for (tone, line) in outcome.lines() {
            let styled = match tone {
                Tone::Success => line.green(),
                Tone::Warning => line.yellow(),
                Tone::Failure => line.red().bold(),
            };
            println!("{}", styled);
        }
    }

    pub fn print_spec(&self, spec: &ApiSpec) {
        println!(
            "\n{} {}",
            spec.title.as_deref().unwrap_or("API specification").bold(),
            spec.base_url.as_deref().unwrap_or("(no server url)").cyan()
        );

        let rows: Vec<OperationRow> = spec
            .endpoints
            .iter()
            .map(|e| OperationRow {
                method: e.method.to_string(),
                path: e.path.clone(),
                params: e
                    .path_params
                    .iter()
                    .map(|p| p.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                body: if e.request_body_example.is_some() { "yes" } else { "-" }.to_string(),
            })
            .collect();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{}", table);
        println!("{} operations", spec.endpoints.len());
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}
