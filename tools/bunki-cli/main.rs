use bunki::ast::DisplayExpression;
use bunki::prelude::*;
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::time::Instant;

/// Compile and evaluate pipeline If-block conditions
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile an If-block configuration and print its grouping tree
    Check {
        /// Path to the If-block configuration JSON file
        config_path: String,
        /// Data-source snapshot whose declared types enable save-time checks
        #[arg(short, long)]
        catalog: Option<String>,
        /// Write the compiled block to this path
        #[arg(short, long)]
        save: Option<String>,
    },
    /// Evaluate an If-block configuration against a data-source snapshot
    Eval {
        /// Path to the If-block configuration JSON file
        config_path: String,
        /// Optional snapshot JSON file; the built-in mock source is used otherwise
        snapshot_path: Option<String>,
        #[arg(long, value_enum, default_value_t = StrategyCli::Eager)]
        strategy: StrategyCli,
        /// Print the `{ ok, value | error, detail }` outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a flow document and optionally follow one If block
    Flow {
        /// Path to the flow JSON file
        flow_path: String,
        /// Optional snapshot JSON file; the built-in mock source is used otherwise
        #[arg(short, long)]
        snapshot: Option<String>,
        /// Evaluate this If node and print the node it branches to
        #[arg(short, long)]
        node: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyCli {
    Eager,
    ShortCircuit,
}

impl From<StrategyCli> for EvaluationStrategy {
    fn from(strategy: StrategyCli) -> Self {
        match strategy {
            StrategyCli::Eager => EvaluationStrategy::Eager,
            StrategyCli::ShortCircuit => EvaluationStrategy::ShortCircuit,
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Check {
            config_path,
            catalog,
            save,
        } => run_check(&config_path, catalog.as_deref(), save.as_deref()),
        Command::Eval {
            config_path,
            snapshot_path,
            strategy,
            json,
        } => run_eval(&config_path, snapshot_path.as_deref(), strategy.into(), json),
        Command::Flow {
            flow_path,
            snapshot,
            node,
        } => run_flow(&flow_path, snapshot.as_deref(), node.as_deref()),
    }
}

fn load_config(path: &str) -> IfBlockConfig {
    let json = fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read config '{}': {}", path, e)));
    IfBlockConfig::from_json(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse config JSON: {}", e)))
}

fn load_snapshot(path: Option<&str>) -> DataSourceSnapshot {
    match path {
        Some(path) => DataSourceSnapshot::from_file(path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to load snapshot from '{}': {}", path, e))
        }),
        None => {
            println!("No snapshot file provided. Using the built-in mock data source.");
            DataSourceSnapshot::sample()
        }
    }
}

fn run_check(config_path: &str, catalog_path: Option<&str>, save_path: Option<&str>) {
    let config = load_config(config_path);
    let mut builder = Compiler::builder(config);
    if let Some(path) = catalog_path {
        builder = builder.with_catalog(load_snapshot(Some(path)).catalog());
    }

    let compile_start = Instant::now();
    let compiled = builder
        .build()
        .compile()
        .unwrap_or_else(|e| exit_with_error(&format!("[{:?}] {}", e.kind(), e)));
    let compile_duration = compile_start.elapsed();

    println!(
        "Compiled {} condition(s) in {:?}",
        compiled.conditions.len(),
        compile_duration
    );
    match &compiled.expression {
        Some(expr) => {
            println!("Grouping: {}", expr);
            println!("{}", DisplayExpression { expr });
        }
        None => println!("No conditions configured; the block is always true."),
    }

    if let Some(path) = save_path {
        compiled
            .save(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to save artifact: {}", e)));
        println!("Saved compiled block to {}", path);
    }
}

fn run_eval(
    config_path: &str,
    snapshot_path: Option<&str>,
    strategy: EvaluationStrategy,
    json: bool,
) {
    let config = load_config(config_path);
    let env = load_snapshot(snapshot_path).into_environment();

    if json {
        let outcome = Evaluator::from_config(&config)
            .map(|evaluator| evaluator.with_strategy(strategy).outcome(&env))
            .unwrap_or_else(|e| EvaluationOutcome::failure(&e));
        let rendered = serde_json::to_string_pretty(&outcome)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to render outcome: {}", e)));
        println!("{}", rendered);
        return;
    }

    let evaluator = Evaluator::from_config(&config)
        .unwrap_or_else(|e| exit_with_error(&format!("[{:?}] {}", e.kind(), e)))
        .with_strategy(strategy);

    let eval_start = Instant::now();
    let result = evaluator
        .eval(&env)
        .unwrap_or_else(|e| exit_with_error(&format!("[{:?}] {}", e.kind(), e)));
    let eval_duration = eval_start.elapsed();

    println!("\nEvaluation Finished!");
    println!("  -> Result: {}", result.value);
    println!("  -> Reason: {}", result.reason);
    if let Some(trace) = &result.trace {
        println!("  -> Leaves evaluated: {}", trace.evaluated_leaves());
    }
    println!("  -> Took: {:?}", eval_duration);
}

fn run_flow(flow_path: &str, snapshot_path: Option<&str>, node: Option<&str>) {
    let json = fs::read_to_string(flow_path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read flow '{}': {}", flow_path, e)));
    let flow = Flow::from_json(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse flow: {}", e)));
    let snapshot = load_snapshot(snapshot_path);

    let issues = flow.validate_against(&snapshot);
    if issues.is_empty() {
        println!("Flow '{}' is valid ({} nodes, {} edges)", flow.name, flow.nodes.len(), flow.edges.len());
    } else {
        println!("Flow '{}' has {} issue(s):", flow.name, issues.len());
        for issue in &issues {
            println!("  - {}", issue);
        }
    }

    if let Some(node_id) = node {
        let env = flow.environment(&snapshot);
        match flow.next_node(node_id, &env) {
            Ok(Some(target)) => println!("  -> '{}' branches to '{}'", node_id, target),
            Ok(None) => println!("  -> '{}' takes an unconnected branch", node_id),
            Err(e) => exit_with_error(&e.to_string()),
        }
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
