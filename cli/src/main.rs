//! Relgraph CLI — runs shortest paths and PageRank over a catalog dump
//!
//! The catalog is a JSON file of named tables. Results can be printed only,
//! or materialized with `--out` and written back with `--save`.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::{ContentArrangement, Table as ComfyTable};
use relgraph::{
    Catalog, ConvergencePolicy, EngineConfig, GraphAnalytics, GraphDescription, PageRankConfig, Table, Value,
    DEFAULT_VERTEX_ID,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "relgraph", version, about = "Set-oriented graph analytics over table dumps")]
struct Cli {
    /// Catalog file (JSON dump of named tables)
    #[arg(long, default_value = "catalog.json", global = true, env = "RELGRAPH_CATALOG")]
    catalog: PathBuf,

    /// Engine configuration file (YAML)
    #[arg(long, global = true, env = "RELGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Write materialized results back to the catalog file
    #[arg(long, global = true)]
    save: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Args)]
struct GraphArgs {
    /// Vertex table name
    #[arg(long, default_value = "vertex")]
    vertex_table: String,

    /// Vertex id column
    #[arg(long, default_value = DEFAULT_VERTEX_ID)]
    vertex_id: String,

    /// Edge table name
    #[arg(long, default_value = "edge")]
    edge_table: String,

    /// Edge columns, e.g. "src=from,dest=to,weight=cost"
    #[arg(long, default_value = "")]
    edge_args: String,
}

impl GraphArgs {
    fn describe(&self) -> Result<GraphDescription> {
        Ok(GraphDescription::new(
            &self.vertex_table,
            &self.vertex_id,
            &self.edge_table,
            &self.edge_args,
        )?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Single-source shortest paths (Bellman-Ford)
    Sssp {
        #[command(flatten)]
        graph: GraphArgs,

        /// Source vertex id
        #[arg(long)]
        source: i64,

        /// Materialize the result under this name
        #[arg(long)]
        out: Option<String>,
    },
    /// Shortest path to a vertex, read from a stored SSSP result
    Path {
        /// SSSP result table
        #[arg(long)]
        result: String,

        /// Destination vertex id
        #[arg(long)]
        dest: i64,
    },
    /// PageRank
    Pagerank {
        #[command(flatten)]
        graph: GraphArgs,

        #[arg(long, default_value_t = 0.85)]
        damping: f64,

        #[arg(long, default_value_t = 100)]
        max_iter: usize,

        #[arg(long, default_value_t = 1e-5)]
        threshold: f64,

        /// Stop as soon as the largest rank change drops below the threshold
        #[arg(long)]
        early_stop: bool,

        /// Comma-separated personalization vertices
        #[arg(long, value_delimiter = ',')]
        personalization: Vec<i64>,

        /// Materialize the result under this name
        #[arg(long)]
        out: Option<String>,
    },
    /// List catalog tables
    Tables,
    /// Print a stored table
    Show {
        /// Table name
        name: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let catalog = Catalog::load(&cli.catalog)
        .with_context(|| format!("failed to load catalog {}", cli.catalog.display()))?;
    let config = match &cli.config {
        Some(path) => EngineConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let analytics = GraphAnalytics::with_config(&catalog, config);

    let materialized = match cli.command {
        Commands::Sssp { graph, source, out } => {
            let graph = graph.describe()?;
            let output = match &out {
                Some(name) => analytics.run_sssp_into(&graph, source, name)?,
                None => analytics.run_sssp(&graph, source)?,
            };
            print_table(&output.result, &cli.format)?;
            out.is_some()
        }
        Commands::Path { result, dest } => {
            let path = analytics.get_path(&result, dest)?;
            match cli.format {
                OutputFormat::Json => {
                    let cost = if path.path.is_empty() {
                        serde_json::Value::Null
                    } else {
                        serde_json::json!(path.cost)
                    };
                    let doc = serde_json::json!({
                        "source": path.source,
                        "target": path.target,
                        "path": path.path,
                        "cost": cost,
                    });
                    println!("{}", serde_json::to_string_pretty(&doc)?);
                }
                _ if path.path.is_empty() => println!("Vertex {} is unreachable from {}", dest, path.source),
                _ => {
                    let hops: Vec<String> = path.path.iter().map(ToString::to_string).collect();
                    println!("{}", hops.join(" -> "));
                    println!("cost: {}", path.cost);
                }
            }
            false
        }
        Commands::Pagerank {
            graph,
            damping,
            max_iter,
            threshold,
            early_stop,
            personalization,
            out,
        } => {
            let graph = graph.describe()?;
            let config = PageRankConfig {
                damping_factor: damping,
                iterations: max_iter,
                tolerance: threshold,
                convergence: if early_stop {
                    ConvergencePolicy::Tolerance
                } else {
                    ConvergencePolicy::FixedIterations
                },
                personalization: (!personalization.is_empty()).then_some(personalization),
            };
            let output = match &out {
                Some(name) => analytics.run_pagerank_into(&graph, &config, name)?,
                None => analytics.run_pagerank(&graph, &config)?,
            };
            print_table(&output.result, &cli.format)?;
            if matches!(cli.format, OutputFormat::Table) {
                println!(
                    "{} iteration(s), converged: {}, last delta: {:e}",
                    output.iterations, output.converged, output.last_delta
                );
            }
            out.is_some()
        }
        Commands::Tables => {
            for name in catalog.table_names() {
                println!("{}", name);
            }
            false
        }
        Commands::Show { name } => {
            print_table(&*catalog.get(&name)?, &cli.format)?;
            false
        }
    };

    if cli.save && materialized {
        catalog.save(&cli.catalog)?;
    }
    Ok(())
}

fn print_table(table: &Table, format: &OutputFormat) -> Result<()> {
    let columns: Vec<&str> = table.column_names().collect();

    match format {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = (0..table.num_rows())
                .map(|idx| {
                    let record: serde_json::Map<String, serde_json::Value> = columns
                        .iter()
                        .zip(table.row(idx))
                        .map(|(name, value)| (name.to_string(), to_json_value(&value)))
                        .collect();
                    serde_json::Value::Object(record)
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Csv => {
            println!("{}", columns.join(","));
            for idx in 0..table.num_rows() {
                let cells: Vec<String> = table.row(idx).iter().map(format_csv_value).collect();
                println!("{}", cells.join(","));
            }
        }
        OutputFormat::Table => {
            if columns.is_empty() {
                println!("(no results)");
                return Ok(());
            }

            let mut out = ComfyTable::new();
            out.set_content_arrangement(ContentArrangement::Dynamic);
            out.set_header(columns.clone());
            for idx in 0..table.num_rows() {
                let cells: Vec<String> = table.row(idx).iter().map(ToString::to_string).collect();
                out.add_row(cells);
            }

            println!("{}", out);
            println!("{} row(s)", table.num_rows());
        }
    }

    Ok(())
}

fn to_json_value(v: &Value) -> serde_json::Value {
    match v {
        Value::Int(i) => serde_json::json!(i),
        Value::Float(f) => serde_json::json!(f),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Null => serde_json::Value::Null,
    }
}

fn format_csv_value(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Text(s) if s.contains(',') || s.contains('"') || s.contains('\n') => {
            format!("\"{}\"", s.replace('"', "\"\""))
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_quoting() {
        assert_eq!(format_csv_value(&Value::Null), "");
        assert_eq!(format_csv_value(&Value::Int(4)), "4");
        assert_eq!(format_csv_value(&Value::Text("a,b".to_string())), "\"a,b\"");
    }

    #[test]
    fn test_cli_parses_pagerank_flags() {
        let cli = Cli::try_parse_from([
            "relgraph",
            "--catalog",
            "g.json",
            "pagerank",
            "--damping",
            "0.5",
            "--personalization",
            "1,2",
            "--early-stop",
        ])
        .unwrap();

        match cli.command {
            Commands::Pagerank {
                damping,
                personalization,
                early_stop,
                max_iter,
                ..
            } => {
                assert_eq!(damping, 0.5);
                assert_eq!(personalization, vec![1, 2]);
                assert!(early_stop);
                assert_eq!(max_iter, 100);
            }
            _ => panic!("expected pagerank command"),
        }
    }

    #[test]
    fn test_sssp_round_trip_through_catalog_file() {
        let catalog = Catalog::new();
        catalog
            .create_table("vertex", Table::new().with_column("id", vec![1i64, 2]).unwrap())
            .unwrap();
        catalog
            .create_table(
                "edge",
                Table::new()
                    .with_column("src", vec![1i64])
                    .unwrap()
                    .with_column("dest", vec![2i64])
                    .unwrap()
                    .with_column("weight", vec![0.5])
                    .unwrap(),
            )
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        catalog.save(&path).unwrap();

        let cli = Cli::try_parse_from([
            "relgraph",
            "--catalog",
            path.to_str().unwrap(),
            "--save",
            "--format",
            "csv",
            "sssp",
            "--source",
            "1",
            "--out",
            "paths",
        ])
        .unwrap();
        run(cli).unwrap();

        let reloaded = Catalog::load(&path).unwrap();
        assert!(reloaded.contains("paths"));
        assert!(reloaded.contains("paths_summary"));
        let analytics = GraphAnalytics::new(&reloaded);
        assert_eq!(analytics.get_path("paths", 2).unwrap().path, vec![1, 2]);
    }
}
