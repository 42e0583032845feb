use anyhow::Result;
use clap::Parser;
use entrypoint_finder::classpath::{ClasspathContext, split_path_list};
use entrypoint_finder::cli::{Cli, Commands, OutputFormat};
use entrypoint_finder::context::LoadingContext;
use entrypoint_finder::resolve::{resolve_class_by_name, resource_locators_by_name};
use entrypoint_finder::scan::find_entry_point_classes;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            root,
            format,
            output,
        } => {
            let report = run_scan(&root)?;
            write_output(&render_scan(&report, format)?, output.as_deref())?;
        }
        Commands::Resolve {
            class_name,
            classpath,
            format,
        } => {
            let report = run_resolve(&class_name, &classpath);
            write_output(&render_resolve(&report, format)?, None)?;
        }
        Commands::Resources {
            name,
            classpath,
            format,
        } => {
            let report = run_resources(&name, &classpath);
            write_output(&render_resources(&report, format)?, None)?;
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug, Serialize)]
struct ScanReport {
    root: String,
    classes: Vec<String>,
    duration_ms: u64,
}

#[derive(Debug, Serialize)]
struct ResolveReport {
    class_name: String,
    resolved: bool,
    context: Option<String>,
    location: Option<String>,
    duration_ms: u64,
}

#[derive(Debug, Serialize)]
struct ResourcesReport {
    name: String,
    locators: Vec<String>,
    duration_ms: u64,
}

fn run_scan(root: &Path) -> Result<ScanReport> {
    let start = Instant::now();
    let classes = find_entry_point_classes(root)?;
    Ok(ScanReport {
        root: root.to_string_lossy().to_string(),
        classes: classes.into_iter().collect(),
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

fn run_resolve(class_name: &str, classpath: &[String]) -> ResolveReport {
    let start = Instant::now();
    let extras = extra_contexts(classpath);

    match resolve_class_by_name(class_name, &extras) {
        Some((context, resolved)) => ResolveReport {
            class_name: resolved.class_name,
            resolved: true,
            context: Some(context.label().to_string()),
            location: Some(resolved.location),
            duration_ms: start.elapsed().as_millis() as u64,
        },
        None => ResolveReport {
            class_name: class_name.to_string(),
            resolved: false,
            context: None,
            location: None,
            duration_ms: start.elapsed().as_millis() as u64,
        },
    }
}

fn run_resources(name: &str, classpath: &[String]) -> ResourcesReport {
    let start = Instant::now();
    let extras = extra_contexts(classpath);
    let locators = resource_locators_by_name(name, &extras);

    ResourcesReport {
        name: name.to_string(),
        locators: locators.into_iter().collect(),
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

/// One extra context per `--classpath` flag, entries split on the platform
/// path-list separator.
fn extra_contexts(classpath: &[String]) -> Vec<Arc<dyn LoadingContext>> {
    classpath
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let entries = split_path_list(raw);
            Arc::new(ClasspathContext::from_entries(
                format!("classpath[{i}]"),
                &entries,
                None,
            )) as Arc<dyn LoadingContext>
        })
        .collect()
}

fn render_scan(report: &ScanReport, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
        OutputFormat::Text => {
            let mut out = String::new();
            out.push_str(&format!("root: {}\n", report.root));
            out.push_str(&format!("duration_ms: {}\n", report.duration_ms));
            for class in &report.classes {
                out.push_str(&format!("- {class}\n"));
            }
            out
        }
    })
}

fn render_resolve(report: &ResolveReport, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
        OutputFormat::Text => {
            let mut out = String::new();
            out.push_str(&format!("class_name: {}\n", report.class_name));
            out.push_str(&format!("resolved: {}\n", report.resolved));
            if let Some(context) = &report.context {
                out.push_str(&format!("context: {context}\n"));
            }
            if let Some(location) = &report.location {
                out.push_str(&format!("location: {location}\n"));
            }
            out
        }
    })
}

fn render_resources(report: &ResourcesReport, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
        OutputFormat::Text => {
            let mut out = String::new();
            out.push_str(&format!("name: {}\n", report.name));
            for locator in &report.locators {
                out.push_str(&format!("- {locator}\n"));
            }
            out
        }
    })
}

fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    if let Some(path) = output {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
    } else {
        print!("{content}");
        if !content.ends_with('\n') {
            println!();
        }
    }

    Ok(())
}
