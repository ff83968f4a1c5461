use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use extproxy::model::config::AppConfig;
use extproxy::shapes::{self, Shape, ShapeContext};
use extproxy::{ExtensionPoint, ExtensionRegistry};

#[derive(Debug, Parser)]
#[command(name = "extproxy", version, about = "Inspect and realize declared extensions")]
struct Cli {
    /// Config file to use instead of the per-user one.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Extension declarations; overrides `general.registry_path`.
    #[arg(long, global = true)]
    registry: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List declared extensions without building them.
    List,
    /// Build the named shape extensions, or all of them.
    Realize {
        #[arg(required_unless_present = "all")]
        ids: Vec<String>,
        #[arg(long)]
        all: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    // Initialize logging to file (never stdout)
    let log_dir = directories::ProjectDirs::from("", "", "extproxy")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(std::env::temp_dir);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "extproxy.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_filter));
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .init();

    tracing::info!("extproxy starting");

    let registry_path = cli.registry.unwrap_or_else(|| config.registry_path());
    let registry = ExtensionRegistry::load(&registry_path)?
        .with_default_attribute(config.extensions.default_attribute.clone());

    let context = ShapeContext {
        scale: config.extensions.scale,
        ..ShapeContext::default()
    };
    let point = registry.point::<dyn Shape, ShapeContext>(
        shapes::POINT,
        Arc::new(shapes::builtin_factory()),
        context,
    );

    match cli.command {
        Command::List => {
            list(&registry, &point);
            Ok(ExitCode::SUCCESS)
        }
        Command::Realize { ids, all } => {
            if realize(&point, &ids, all) {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

fn list(registry: &ExtensionRegistry, point: &ExtensionPoint<dyn Shape, ShapeContext>) {
    for decl in registry.declarations() {
        let status = match point.get(&decl.id) {
            Some(proxy) if proxy.is_realized() => "realized",
            Some(_) => "deferred",
            None => "not a shape",
        };
        println!("{:<24} {:<12} [{status}]", decl.id, decl.point);
    }

    println!(
        "{} declared, {} points, {} shapes",
        registry.len(),
        registry.point_names().len(),
        point.len()
    );
}

/// Realizes the selected extensions, returning whether all of them succeeded.
fn realize(point: &ExtensionPoint<dyn Shape, ShapeContext>, ids: &[String], all: bool) -> bool {
    let selected: Vec<&str> = if all {
        point.iter().map(|(id, _)| id.as_str()).collect()
    } else {
        ids.iter().map(String::as_str).collect()
    };

    let mut failed = false;
    for id in selected {
        let Some(proxy) = point.get(id) else {
            failed = true;
            eprintln!("{id}: no shape extension declared with this id");
            continue;
        };

        match proxy.get_realized() {
            Ok(shape) => println!("{id}: {}", shape.describe()),
            Err(err) => {
                failed = true;
                eprintln!("{id}: {:#}", anyhow::Error::new(err));
            }
        }
    }

    !failed
}
