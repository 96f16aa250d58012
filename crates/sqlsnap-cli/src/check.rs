use sqlsnap::{QueryValidator, Strictness};

use crate::cli::CheckArgs;
use crate::config::ProjectConfig;
use crate::queries::read_queries;

pub fn run(args: CheckArgs) -> anyhow::Result<()> {
    let project = ProjectConfig::load_optional(&args.config)?;

    let strictness = if args.strict {
        Strictness::Hardened
    } else {
        project
            .as_ref()
            .and_then(|p| p.file.generator.strictness)
            .unwrap_or_default()
    };

    let queries = read_queries(&args.files)?;
    let validator = QueryValidator::new(strictness);

    let mut rejected = 0usize;
    for (idx, query) in queries.iter().enumerate() {
        match validator.extract_table_name(query) {
            Ok(table) => println!("ok    #{:<4} {table}", idx + 1),
            Err(e) => {
                rejected += 1;
                println!("error #{:<4} {e}", idx + 1);
            }
        }
    }

    if rejected > 0 {
        anyhow::bail!("{rejected} of {} queries rejected", queries.len());
    }
    Ok(())
}
