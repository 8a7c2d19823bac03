use clap::{Parser, Subcommand};
use keiro::prelude::*;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Inspect, validate and dry-run Keiro workflow documents
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a workflow document and list every issue found
    Validate {
        /// Path to the workflow JSON file
        workflow_path: String,
    },
    /// Print the step tree of a workflow document
    Outline {
        /// Path to the workflow JSON file
        workflow_path: String,
    },
    /// Run a workflow with a dry-run executor and print the trace
    Run {
        /// Path to the workflow JSON file
        workflow_path: String,

        /// Optional path to a trigger payload JSON file
        #[arg(short, long)]
        trigger: Option<String>,

        /// Refuse to iterate over more than this many items in one for_each step
        #[arg(long)]
        max_iterations: Option<usize>,

        /// Keep running after a step fails
        #[arg(long)]
        continue_on_error: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Validate { workflow_path } => run_validate(&workflow_path),
        Command::Outline { workflow_path } => {
            let definition = load_definition(&workflow_path);
            println!("{}", TraceFormatter::format_outline(&definition));
        }
        Command::Run {
            workflow_path,
            trigger,
            max_iterations,
            continue_on_error,
        } => run_workflow(&workflow_path, trigger, max_iterations, continue_on_error),
    }
}

fn load_definition(path: &str) -> WorkflowDefinition {
    WorkflowDefinition::from_file(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load workflow: {}", e)))
}

fn run_validate(workflow_path: &str) {
    let definition = load_definition(workflow_path);
    let report = validate(&definition);

    println!("--- Validation ---");
    println!("Steps: {}", definition.len());
    if report.is_valid() {
        println!("No issues found.");
        return;
    }
    for issue in &report.issues {
        println!("  {}", issue);
    }
    exit_with_error(&format!("{} issue(s) found", report.issues.len()));
}

fn run_workflow(
    workflow_path: &str,
    trigger_path: Option<String>,
    max_iterations: Option<usize>,
    continue_on_error: bool,
) {
    let total_start = Instant::now();
    let definition = load_definition(workflow_path);

    let trigger = match trigger_path {
        Some(path) => TriggerPayload::from_file(&path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load trigger payload: {}", e))),
        None => {
            println!("No trigger payload provided, using the sample payload.");
            TriggerPayload::sample()
        }
    };

    let mut builder = Runner::builder(DryRunExecutor).continue_on_error(continue_on_error);
    if let Some(limit) = max_iterations {
        builder = builder.max_iterations(limit);
    }
    let runner = builder.build();

    let report = runner
        .run(&definition, trigger.0)
        .unwrap_or_else(|e| exit_with_error(&format!("Run failed: {}", e)));

    println!("\n--- Trace ---");
    println!("{}", TraceFormatter::format_trace(&report.trace));

    if !report.unresolved.is_empty() {
        println!("\n--- Unresolved Placeholders ---");
        for miss in &report.unresolved {
            println!("  '{}' ({}): {}", miss.step_name, miss.step_id, miss.placeholder);
        }
    }
    if !report.failures.is_empty() {
        println!("\n--- Failures ---");
        for failure in &report.failures {
            println!("  '{}' ({}): {}", failure.step_name, failure.step_id, failure.error);
        }
    }

    println!(
        "\nExecuted {} step(s) in {:.2?}",
        report.steps_executed,
        total_start.elapsed()
    );
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
