mod console;
mod export;
mod outcome;

pub use console::ConsoleReporter;
pub use export::{
    ArtifactDocument, HtmlExporter, JsonExporter, TableExporter, YamlExporter, load_artifact,
    render, write_artifact,
};
pub use outcome::{Outcome, Tone, exit_codes};
