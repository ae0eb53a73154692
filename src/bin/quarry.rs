//! quarry — offline front end for the Quarry query compiler
//!
//! # Usage
//!
//! ```bash
//! # Compile a JSON-encoded AST
//! quarry compile query.json --dialect mysql
//!
//! # Check an identifier
//! quarry escape user_name
//!
//! # Preview how a value is sent to the database
//! echo '"2023-01-01T12:00:00Z"' | quarry marshal - --type dateTime
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use quarry::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quarry")]
#[command(version)]
#[command(about = "Compile typed query ASTs into parameterized SQL", long_about = None)]
#[command(after_help = "EXAMPLES:
    quarry compile select.json
    quarry --dialect sqlite compile - < insert.json
    quarry marshal value.json --type bigInt --dialect sqlite")]
struct Cli {
    /// Config file (defaults to <config dir>/quarry/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Target dialect, overriding the config file
    #[arg(short, long, global = true, env = "QUARRY_DIALECT")]
    dialect: Option<Dialect>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a JSON-encoded query AST (`-` reads stdin)
    Compile {
        input: String,
    },
    /// Validate and quote an identifier
    Escape {
        identifier: String,
    },
    /// Convert a JSON value for a field type (`-` reads stdin)
    Marshal {
        input: String,

        /// Field type: string, boolean, int, float, decimal, bigInt, dateTime, json, blob
        #[arg(short = 't', long = "type")]
        field_type: ScalarType,

        /// The field holds an array of the type
        #[arg(long)]
        array: bool,

        /// Treat the input as a database value and convert it back
        #[arg(long)]
        from_db: bool,
    },
    /// List supported dialects
    Dialects,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = QuarryConfig::load(cli.config.as_deref()).context("failed to load config")?;
    if let Some(dialect) = cli.dialect {
        config.dialect = dialect;
    }
    init_logging(&config, cli.verbose);

    match &cli.command {
        Commands::Compile { input } => compile(&config, input, cli.format),
        Commands::Escape { identifier } => escape(&config, identifier, cli.format),
        Commands::Marshal {
            input,
            field_type,
            array,
            from_db,
        } => {
            let field = FieldType {
                scalar: *field_type,
                is_array: *array,
            };
            marshal(&config, input, field, *from_db, cli.format)
        }
        Commands::Dialects => {
            show_dialects();
            Ok(())
        }
    }
}

fn init_logging(config: &QuarryConfig, verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("quarry=debug")
        } else {
            EnvFilter::new(&config.log_filter)
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(Path::new(input))
            .with_context(|| format!("failed to read {}", input))
    }
}

fn compile(config: &QuarryConfig, input: &str, format: OutputFormat) -> Result<()> {
    let query: Query = serde_json::from_str(&read_input(input)?).context("invalid query AST")?;
    let generator = config.generator()?;
    let compiled = generator
        .translate_query(&query)
        .with_context(|| format!("cannot compile {} for {}", query.kind(), config.dialect))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&compiled)?),
        OutputFormat::Text => {
            println!("{}", compiled.text.white());
            if !compiled.parameters.is_empty() {
                println!();
                println!("{}", "Parameters:".cyan());
                let style = generator.placeholder_style();
                for (i, value) in compiled.parameters.iter().enumerate() {
                    println!(
                        "  {} {} = {}",
                        format!("#{}", i + 1).dimmed(),
                        style.placeholder(i + 1),
                        value.to_string().yellow()
                    );
                }
            }
        }
    }
    Ok(())
}

fn escape(config: &QuarryConfig, identifier: &str, format: OutputFormat) -> Result<()> {
    let escaped = config.generator()?.escape_identifier(identifier)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "escaped": escaped })),
        OutputFormat::Text => println!("{}", escaped.green()),
    }
    Ok(())
}

/// Input is plain JSON, read the way a driver would hand it back, so strings
/// become timestamps, big integers or bytes according to the field type.
fn marshal(
    config: &QuarryConfig,
    input: &str,
    field: FieldType,
    from_db: bool,
    format: OutputFormat,
) -> Result<()> {
    let generator = config.generator()?;
    let app_value = generator.from_database(&parse_value(&read_input(input)?)?, field)?;
    let result = if from_db {
        app_value
    } else {
        generator.to_database(&app_value, field)?
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => println!(
            "{} {}",
            format!("{}:", result.kind()).dimmed(),
            result.to_string().green()
        ),
    }
    Ok(())
}

/// A bare integer is read exactly, since `serde_json` turns numbers past
/// `u64` into floats.
fn parse_value(text: &str) -> Result<Value> {
    if let Ok(n) = text.trim().parse::<i128>() {
        return Ok(i64::try_from(n).map_or(Value::BigInt(n), Value::Int));
    }
    let json: serde_json::Value = serde_json::from_str(text).context("invalid JSON value")?;
    Ok(json_to_value(json))
}

fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(u) = n.as_u64() {
                Value::BigInt(i128::from(u))
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::Array(items.into_iter().map(json_to_value).collect())
        }
        object @ serde_json::Value::Object(_) => Value::Json(object),
    }
}

fn show_dialects() {
    println!("{}", "Dialects:".cyan().bold());
    for dialect in Dialect::ALL {
        let generator = dialect.generator();
        let quote = generator.identifiers().quote_char();
        println!(
            "  {:<10} placeholders {:<4} identifiers {}",
            dialect.to_string().yellow(),
            generator.placeholder_style().placeholder(1),
            format!("{quote}name{quote}").white()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_keeps_wide_integers() {
        assert_eq!(
            parse_value("123456789012345678901\n").unwrap(),
            Value::BigInt(123456789012345678901)
        );
        assert_eq!(parse_value("42").unwrap(), Value::Int(42));
        assert_eq!(parse_value("\"42\"").unwrap(), Value::from("42"));
        assert_eq!(
            parse_value("[1, 2]").unwrap(),
            Value::Array(vec![Value::Int(1), Value::Int(2)])
        );
        assert!(parse_value("{oops").is_err());
    }
}
