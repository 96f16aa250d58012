use std::io::Read;
use std::path::PathBuf;

/// Split `content` into one query per non-blank line.
///
/// Only line endings are stripped; surrounding whitespace stays so the
/// validator sees the query as written.
pub fn split_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}

/// Queries from `files` in order, or from stdin when none are given
/// (or the only file is `-`).
pub fn read_queries(files: &[PathBuf]) -> anyhow::Result<Vec<String>> {
    let from_stdin = files.is_empty() || (files.len() == 1 && files[0].as_os_str() == "-");

    let queries = if from_stdin {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| anyhow::anyhow!("failed to read stdin: {e}"))?;
        split_lines(&buf)
    } else {
        let mut queries = Vec::new();
        for file in files {
            let content = std::fs::read_to_string(file)
                .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", file.display()))?;
            queries.extend(split_lines(&content));
        }
        queries
    };

    if queries.is_empty() {
        anyhow::bail!("no queries provided (pass files or pipe SELECTs to stdin)");
    }
    Ok(queries)
}
