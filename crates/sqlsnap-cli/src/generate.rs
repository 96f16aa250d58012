use sqlsnap::{
    DEFAULT_POOL_SIZE, DangerousDmlPolicy, GenerateResponse, GeneratorConfig, Operation,
    StatementGenerator, Strictness, create_pool_with_config,
    generate_delete_statements_with_config,
};

use crate::cli::{GenerateArgs, OutputFormat};
use crate::config::ProjectConfig;
use crate::queries::read_queries;

pub async fn run(args: GenerateArgs) -> anyhow::Result<()> {
    let project = ProjectConfig::load_optional(&args.config)?;
    if let Some(project) = &project {
        tracing::debug!(config = %project.config_path.display(), "loaded config file");
    }

    let config = resolve_config(&args, project.as_ref());
    let queries = read_queries(&args.files)?;

    let response = if args.operation.includes_insert() {
        let database_url = resolve_database_url(&args, project.as_ref())?;
        let pool_size = project
            .as_ref()
            .and_then(|p| p.file.pool_size())
            .unwrap_or(DEFAULT_POOL_SIZE);
        let pool = create_pool_with_config(&database_url, pool_size)?;
        let generator = StatementGenerator::from_pool(pool).with_config(config);
        generator.generate(args.operation, &queries).await?
    } else {
        GenerateResponse {
            delete_queries: generate_delete_statements_with_config(&config, &queries)?,
            insert_queries: Vec::new(),
        }
    };

    write_response(&response, args.format)
}

/// File values first, then command-line overrides.
fn resolve_config(args: &GenerateArgs, project: Option<&ProjectConfig>) -> GeneratorConfig {
    let mut config = project
        .map(|p| p.file.generator.to_generator_config())
        .unwrap_or_default();

    if let Some(dialect) = args.dialect {
        config = config.dialect(dialect);
    }
    if args.strict {
        config = config.strictness(Strictness::Hardened);
    }
    if args.deny_unfiltered {
        config = config.delete_without_where(DangerousDmlPolicy::Error);
    }
    if let Some(n) = args.concurrency {
        config = config.max_concurrency(n);
    }
    config
}

/// `--database`, then `database.url`, then `DATABASE_URL` (including `.env`).
fn resolve_database_url(
    args: &GenerateArgs,
    project: Option<&ProjectConfig>,
) -> anyhow::Result<String> {
    if let Some(url) = &args.database {
        return Ok(url.clone());
    }
    if let Some(url) = project.and_then(|p| p.file.database_url()) {
        return Ok(url.to_string());
    }
    dotenvy::var("DATABASE_URL").map_err(|_| {
        anyhow::anyhow!(
            "`sqlsnap {}` needs a database; pass --database, set database.url in {}, or set DATABASE_URL",
            args.operation,
            args.config.display()
        )
    })
}

fn write_response(response: &GenerateResponse, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Sql => print!("{}", response.to_sql_script()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(response)?),
    }
    Ok(())
}
