use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};
use rustyline::DefaultEditor;
use selfies::{ConstraintPreset, ConstraintRegistry, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

const CONSTRAINTS_COMMAND: &str = ":constraints";

fn main() -> rustyline::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut registry = ConstraintRegistry::new();
    let mut rl = DefaultEditor::new()?;
    while let Ok(line) = rl.readline("SELFIES: ") {
        rl.add_history_entry(&line)?;
        match evaluate(&mut registry, line.trim()) {
            Ok(output) => println!("{output}"),
            Err(diagnostic) => render_error(*diagnostic),
        }
    }

    Ok(())
}

fn evaluate(registry: &mut ConstraintRegistry, line: &str) -> Result<String> {
    if let Some(name) = line.strip_prefix(CONSTRAINTS_COMMAND) {
        let preset: ConstraintPreset = name.trim().parse()?;
        registry.set_active(Some(preset.constraints()));
        info!(%preset, "switched bond constraints");
        return Ok(format!("Using the {preset} bond constraints"));
    }

    registry.decode(line)
}

fn render_error(diagnostic: impl Into<Box<dyn Diagnostic + 'static>>) {
    let mut buf = String::new();
    let rendered = GraphicalReportHandler::new_themed(GraphicalTheme::unicode())
        .render_report(&mut buf, diagnostic.into().as_ref());
    match rendered {
        Ok(()) => eprintln!("{buf}"),
        Err(_) => eprintln!("failed to render a decoding error"),
    }
}
