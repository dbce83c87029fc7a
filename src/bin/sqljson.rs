//! sqljson - compile JSON column lookups from the command line.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::Value as JsonValue;
use sqljson::ast::compile_json_path;
use sqljson::prelude::*;
use sqljson::{Config, ConfigSource};

#[derive(Parser, Debug)]
#[command(name = "sqljson")]
#[command(author, version, about = "Compile JSON column lookups to SQL")]
struct Cli {
    /// Configuration file (default: <config dir>/sqljson/config.toml)
    #[arg(short, long, global = true, env = "SQLJSON_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a filter key such as `value__owner__name__icontains`
    Compile {
        /// field[__key...][__lookup]
        key: String,

        /// Right-hand side as JSON (`'"text"'`, `1`, `'["a","b"]'`)
        rhs: String,

        /// Target dialect (postgresql, mysql, mariadb, oracle, sqlite)
        #[arg(short, long)]
        dialect: Option<String>,

        /// Check the key against a table of the configured schema
        #[arg(short, long)]
        table: Option<String>,

        /// The MySQL server is MariaDB
        #[arg(long)]
        mariadb: bool,

        /// Use Oracle LIKEC instead of LIKE TRANSLATE
        #[arg(long)]
        likec: bool,

        /// Print format-style `%s` SQL instead of driver placeholders
        #[arg(long)]
        raw: bool,
    },

    /// Show a key path on every dialect
    Paths {
        /// Keys and array indices, outermost first
        #[arg(required = true)]
        segments: Vec<String>,
    },

    /// Show the storage type and check constraint of a JSON column
    Column {
        #[arg(default_value = "value")]
        name: String,

        #[arg(short, long)]
        dialect: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let (config, source) = Config::load(cli.config.as_deref())?;
    tracing::debug!(source = %source.label(), "configuration loaded");

    match cli.command {
        Command::Compile {
            key,
            rhs,
            dialect,
            table,
            mariadb,
            likec,
            raw,
        } => {
            let mut config = config;
            if let Some(dialect) = dialect {
                config.set_dialect(&dialect)?;
            }
            config.mariadb |= mariadb;
            if likec {
                config.like_variant = LikeVariant::Likec;
            }
            compile(&config, &source, &key, &rhs, table.as_deref(), raw)
        }
        Command::Paths { segments } => paths(&segments),
        Command::Column { name, dialect } => {
            let dialects = match dialect {
                Some(d) => vec![parse_dialect(&d)?],
                None => Dialect::ALL.to_vec(),
            };
            column(&name, &dialects);
            Ok(())
        }
    }
}

fn parse_dialect(name: &str) -> Result<Dialect> {
    Ok(name.parse::<Dialect>()?)
}

fn compile(
    config: &Config,
    source: &ConfigSource,
    key: &str,
    rhs: &str,
    table: Option<&str>,
    raw: bool,
) -> Result<()> {
    let rhs: JsonValue = serde_json::from_str(rhs)
        .with_context(|| format!("right-hand side {} is not valid JSON", rhs))?;

    let lookup = match table {
        Some(table) => {
            if config.schema.tables.is_empty() {
                bail!("--table needs a schema, none found in {}", source.label());
            }
            config.schema.parse_lookup(table, key, rhs)?
        }
        None => parse_lookup(key, rhs)?,
    };

    let conn = config.connection();
    let fragment = lookup
        .compile(&conn)
        .with_context(|| format!("cannot compile '{}' for {}", key, conn.dialect))?;

    let sql = if raw {
        fragment.sql.clone()
    } else {
        fragment.render(conn.dialect)
    };
    println!("{}", sql.bold());
    for (i, param) in fragment.params.iter().enumerate() {
        println!("  {} {}", placeholder(conn.dialect, i).cyan(), param);
    }
    Ok(())
}

/// Driver placeholder of the `index`-th parameter (0-based).
fn placeholder(dialect: Dialect, index: usize) -> String {
    match dialect {
        Dialect::Postgres => format!("${}", index + 1),
        Dialect::Oracle => format!(":arg{}", index),
        Dialect::MySql | Dialect::Sqlite => format!("?{}", index + 1),
    }
}

fn paths(segments: &[String]) -> Result<()> {
    let segments: Vec<PathSegment> = segments.iter().map(|s| PathSegment::parse(s)).collect();
    let expr = segments
        .iter()
        .cloned()
        .fold(Expr::col("value"), |expr, segment| expr.key(segment));

    println!("{} {}", "path:".dimmed(), compile_json_path(&segments).green());
    for dialect in Dialect::ALL {
        let fragment = expr.compile(&Connection::new(dialect))?;
        let params: Vec<String> = fragment.params.iter().map(ToString::to_string).collect();
        println!(
            "{:>10}  {}  {}",
            dialect.to_string().yellow(),
            fragment.render(dialect),
            params.join(", ").cyan()
        );
    }
    Ok(())
}

fn column(name: &str, dialects: &[Dialect]) {
    let field = JsonField::new(name);
    for dialect in dialects {
        let constraint = field
            .check_constraint(*dialect)
            .map(|c| format!("CHECK ({})", c))
            .unwrap_or_default();
        println!(
            "{:>10}  {} {} {}",
            dialect.to_string().yellow(),
            name,
            field.db_type(*dialect).bold(),
            constraint
        );
    }
}
