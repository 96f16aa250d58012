use std::path::PathBuf;

use sqlsnap::{Dialect, Operation};

pub const DEFAULT_CONFIG: &str = "sqlsnap.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Delete,
    Insert,
    Both,
    Check,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Generate(GenerateArgs),
    Check(CheckArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Sql,
    Json,
}

#[derive(Debug, Clone)]
pub struct GenerateArgs {
    pub operation: Operation,
    pub config: PathBuf,
    pub database: Option<String>,
    pub dialect: Option<Dialect>,
    pub strict: bool,
    pub deny_unfiltered: bool,
    pub concurrency: Option<usize>,
    pub format: OutputFormat,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct CheckArgs {
    pub config: PathBuf,
    pub strict: bool,
    pub files: Vec<PathBuf>,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    let rest = it.map(|s| s.as_str());
    match first.as_str() {
        "-h" | "--help" => Ok(Command::Help(HelpTopic::Root)),
        "delete" => parse_generate(Operation::Delete, rest),
        "insert" => parse_generate(Operation::Insert, rest),
        "both" => parse_generate(Operation::Both, rest),
        "check" => parse_check(rest),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

fn parse_generate<'a>(
    operation: Operation,
    mut it: impl Iterator<Item = &'a str>,
) -> anyhow::Result<Command> {
    let mut config = PathBuf::from(DEFAULT_CONFIG);
    let mut database: Option<String> = None;
    let mut dialect: Option<Dialect> = None;
    let mut strict = false;
    let mut deny_unfiltered = false;
    let mut concurrency: Option<usize> = None;
    let mut format = OutputFormat::default();
    let mut files: Vec<PathBuf> = Vec::new();

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => {
                return Ok(Command::Help(match operation {
                    Operation::Delete => HelpTopic::Delete,
                    Operation::Insert => HelpTopic::Insert,
                    Operation::Both => HelpTopic::Both,
                }));
            }
            "--config" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--config requires a value");
                };
                config = PathBuf::from(v);
            }
            _ if token.starts_with("--config=") => {
                config = PathBuf::from(token.trim_start_matches("--config="));
            }
            "--database" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--database requires a value");
                };
                database = Some(v.to_string());
            }
            _ if token.starts_with("--database=") => {
                database = Some(token.trim_start_matches("--database=").to_string());
            }
            "--dialect" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--dialect requires a value");
                };
                dialect = Some(parse_dialect(v)?);
            }
            _ if token.starts_with("--dialect=") => {
                dialect = Some(parse_dialect(token.trim_start_matches("--dialect="))?);
            }
            "--concurrency" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--concurrency requires a value");
                };
                concurrency = Some(parse_concurrency(v)?);
            }
            _ if token.starts_with("--concurrency=") => {
                concurrency = Some(parse_concurrency(
                    token.trim_start_matches("--concurrency="),
                )?);
            }
            "--format" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--format requires a value");
                };
                format = parse_format(v)?;
            }
            _ if token.starts_with("--format=") => {
                format = parse_format(token.trim_start_matches("--format="))?;
            }
            "--strict" => strict = true,
            "--deny-unfiltered" => deny_unfiltered = true,
            other if other.starts_with('-') && other != "-" => {
                anyhow::bail!("unknown argument: {other}")
            }
            other => files.push(PathBuf::from(other)),
        }
    }

    Ok(Command::Generate(GenerateArgs {
        operation,
        config,
        database,
        dialect,
        strict,
        deny_unfiltered,
        concurrency,
        format,
        files,
    }))
}

fn parse_check<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut config = PathBuf::from(DEFAULT_CONFIG);
    let mut strict = false;
    let mut files: Vec<PathBuf> = Vec::new();

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Check)),
            "--config" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--config requires a value");
                };
                config = PathBuf::from(v);
            }
            _ if token.starts_with("--config=") => {
                config = PathBuf::from(token.trim_start_matches("--config="));
            }
            "--strict" => strict = true,
            other if other.starts_with('-') && other != "-" => {
                anyhow::bail!("unknown argument: {other}")
            }
            other => files.push(PathBuf::from(other)),
        }
    }

    Ok(Command::Check(CheckArgs {
        config,
        strict,
        files,
    }))
}

fn parse_dialect(v: &str) -> anyhow::Result<Dialect> {
    v.parse::<Dialect>()
        .map_err(|_| anyhow::anyhow!("invalid --dialect value: {v} (expected postgres or oracle)"))
}

fn parse_concurrency(v: &str) -> anyhow::Result<usize> {
    match v.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => anyhow::bail!("invalid --concurrency value: {v}"),
    }
}

fn parse_format(v: &str) -> anyhow::Result<OutputFormat> {
    match v {
        "sql" => Ok(OutputFormat::Sql),
        "json" => Ok(OutputFormat::Json),
        _ => anyhow::bail!("invalid --format value: {v} (expected sql or json)"),
    }
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
sqlsnap - derive DELETE and INSERT statements from SELECT queries

USAGE:
  sqlsnap <COMMAND> [OPTIONS] [FILES...]

COMMANDS:
  delete        Rewrite each SELECT as a DELETE (no database needed)
  insert        Snapshot the rows each SELECT returns as INSERTs
  both          DELETEs followed by INSERTs
  check         Validate SELECTs without generating anything

Queries are read one per non-blank line from FILES, or from stdin.
Set SQLSNAP_LOG (e.g. `debug`) to see log output on stderr.

Run `sqlsnap <command> --help` for more."
            );
        }
        HelpTopic::Delete | HelpTopic::Insert | HelpTopic::Both => {
            let name = match topic {
                HelpTopic::Delete => "delete",
                HelpTopic::Insert => "insert",
                _ => "both",
            };
            println!(
                "\
USAGE:
  sqlsnap {name} [OPTIONS] [FILES...]

OPTIONS:
  --config <FILE>         Config file path (default: sqlsnap.toml)
  --database <URL>        Override database.url (falls back to DATABASE_URL)
  --dialect <NAME>        INSERT literal dialect: postgres (default) or oracle
  --strict                Also reject `;` and `--` in queries
  --deny-unfiltered       Fail on a SELECT without WHERE
  --concurrency <N>       Run up to N SELECTs at once
  --format <FMT>          Output format: sql (default) or json
  -h, --help              Print help"
            );
        }
        HelpTopic::Check => {
            println!(
                "\
USAGE:
  sqlsnap check [OPTIONS] [FILES...]

Validates every query and prints its target table. Exits non-zero if any
query is rejected. No database connection is made.

OPTIONS:
  --config <FILE>         Config file path (default: sqlsnap.toml)
  --strict                Also reject `;` and `--` in queries
  -h, --help              Print help"
            );
        }
    }
}
