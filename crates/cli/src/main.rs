use std::collections::HashSet;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use advisor_core::RecommendationName;
use advisor_engine::{Recommendation, RecommendationEngine};
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

mod fixture;

use fixture::Fixture;

#[derive(Parser, Debug)]
#[command(name = "advisorctl", version, about = "Store recommendation advisor")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json }

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate recommendations against a recorded snapshot
    Analyze {
        /// Fixture JSON: sampled keys, carried info and scripted replies
        #[arg(long = "fixture")]
        fixture: PathBuf,
        /// Skip a recommendation by name (repeatable)
        #[arg(long = "exclude")]
        exclude: Vec<String>,
    },
    /// List every recommendation kind in registration order
    Catalogue,
}

fn init_tracing() {
    let env = std::env::var("ADVISOR_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}

fn init_metrics() {
    if let Ok(addr) = std::env::var("ADVISOR_METRICS_ADDR") {
        if let Ok(sock) = addr.parse::<std::net::SocketAddr>() {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            match builder.with_http_listener(sock).install() {
                Ok(_) => info!(addr = %addr, "Prometheus metrics exporter listening"),
                Err(e) => warn!(error = %e, "failed to install metrics exporter"),
            }
        } else {
            warn!(addr = %addr, "invalid ADVISOR_METRICS_ADDR; expected host:port");
        }
    }
}

/// Known names only; unknown ones are reported and dropped.
fn parse_exclude(raw: &[String]) -> HashSet<RecommendationName> {
    raw.iter()
        .filter_map(|s| match RecommendationName::from_str(s) {
            Ok(n) => Some(n),
            Err(e) => {
                warn!(error = %e, "ignoring exclude entry");
                None
            }
        })
        .collect()
}

fn print_human(found: &[Recommendation]) {
    if found.is_empty() {
        println!("no recommendations");
        return;
    }
    for r in found {
        match r.keys() {
            [] => println!("{} • {}", r.name, r.name.title()),
            keys => println!("{} • {} • {}", r.name, r.name.title(), keys.join(", ")),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    init_metrics();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { fixture, exclude } => {
            let t0 = Instant::now();
            let fx = Fixture::load(&fixture)?;
            let thresholds = fx.thresholds.clone().unwrap_or_default().with_overrides(|var| std::env::var(var).ok())?;
            let input = fx.input().excluding(parse_exclude(&exclude));
            info!(fixture = %fixture.display(), keys = input.keys.len(), "analyze invoked");

            let found = RecommendationEngine::with_thresholds(thresholds).evaluate(&input).await;
            match cli.output {
                Output::Human => print_human(&found),
                Output::Json => println!("{}", serde_json::to_string_pretty(&found)?),
            }
            info!(found = found.len(), took_ms = %t0.elapsed().as_millis(), "analyze done");
        }
        Commands::Catalogue => match cli.output {
            Output::Human => {
                for n in RecommendationName::ALL {
                    println!("{} • {:?} • {}", n, n.family(), n.title());
                }
            }
            Output::Json => {
                let rows: Vec<serde_json::Value> = RecommendationName::ALL
                    .iter()
                    .map(|n| serde_json::json!({ "name": n, "family": format!("{:?}", n.family()), "title": n.title() }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            }
        },
    }
    Ok(())
}
