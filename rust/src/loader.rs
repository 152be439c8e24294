//! Readers for the flat task-data and precedence-diagram files.
//!
//! Task data: one task per line, `id time metabolic_cost`, whitespace separated.
//! Precedence: `predecessor -> successor` lines; anything without `->` is ignored.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::catalog::{CatalogError, TaskCatalog};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Line {line}: {source}")]
    Catalog {
        line: usize,
        #[source]
        source: CatalogError,
    },
}

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_number(line: usize, field: &str, raw: Option<&str>) -> Result<f64, LoadError> {
    let raw = raw.ok_or_else(|| LoadError::Parse {
        line,
        message: format!("missing {}", field),
    })?;
    raw.parse().map_err(|_| LoadError::Parse {
        line,
        message: format!("invalid {} {:?}", field, raw),
    })
}

/// Parse task data. Blank lines and `#` comments are skipped; extra columns are ignored.
pub fn parse_task_data(text: &str) -> Result<TaskCatalog, LoadError> {
    let mut catalog = TaskCatalog::new();
    for (number, raw) in text.lines().enumerate() {
        let line = number + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut fields = trimmed.split_whitespace();
        let Some(task) = fields.next() else {
            continue;
        };
        let time = parse_number(line, "processing time", fields.next())?;
        let cost = parse_number(line, "metabolic cost", fields.next())?;
        catalog
            .insert(task, time, cost)
            .map_err(|source| LoadError::Catalog { line, source })?;
    }
    Ok(catalog)
}

/// Parse a precedence diagram into (predecessor, successor) pairs, in file order.
pub fn parse_precedence(text: &str) -> Result<Vec<(String, String)>, LoadError> {
    let mut precedence = Vec::new();
    for (number, raw) in text.lines().enumerate() {
        let Some((before, after)) = raw.split_once("->") else {
            continue;
        };
        let (before, after) = (before.trim(), after.trim());
        if before.is_empty() || after.is_empty() {
            return Err(LoadError::Parse {
                line: number + 1,
                message: format!("incomplete precedence {:?}", raw.trim()),
            });
        }
        precedence.push((before.to_string(), after.to_string()));
    }
    Ok(precedence)
}

pub fn read_task_data(path: impl AsRef<Path>) -> Result<TaskCatalog, LoadError> {
    parse_task_data(&read(path.as_ref())?)
}

pub fn read_precedence(path: impl AsRef<Path>) -> Result<Vec<(String, String)>, LoadError> {
    parse_precedence(&read(path.as_ref())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_data() {
        let text = "# id time cost\n1 12.5 3\n\n2   7 1.25 extra\n3\t4\t0\n";
        let catalog = parse_task_data(text).unwrap();

        let names: Vec<&str> = catalog.names().collect();
        assert_eq!(names, vec!["1", "2", "3"]);
        assert_eq!(catalog.metrics("1"), Some((12.5, 3.0)));
        assert_eq!(catalog.metrics("2"), Some((7.0, 1.25)));
        assert_eq!(catalog.metrics("3"), Some((4.0, 0.0)));
    }

    #[test]
    fn test_parse_task_data_reports_line() {
        let err = parse_task_data("a 1 1\nb 2\n").unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 2, .. }));
        assert_eq!(err.to_string(), "Line 2: missing metabolic cost");

        let err = parse_task_data("a x 1\n").unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 1, .. }));

        let err = parse_task_data("a 1 1\na 2 2\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::Catalog {
                line: 2,
                source: CatalogError::DuplicateTask(_)
            }
        ));
    }

    #[test]
    fn test_parse_precedence() {
        let text = "digraph line\n1 -> 2\n 2->3 \nnot an edge\n1 -> 4\n";
        let precedence = parse_precedence(text).unwrap();
        assert_eq!(
            precedence,
            vec![
                ("1".to_string(), "2".to_string()),
                ("2".to_string(), "3".to_string()),
                ("1".to_string(), "4".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_precedence_rejects_dangling_arrow() {
        let err = parse_precedence("1 -> 2\n3 ->\n").unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_task_data("/nonexistent/ergoline/tasks.txt").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_read_files_round_trip_through_allocation() {
        let dir = std::env::temp_dir().join(format!("ergoline-loader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let data = dir.join("tasks.txt");
        let diagram = dir.join("precedence.txt");
        std::fs::write(&data, "A 5 1\nB 3 1\nC 4 1\n").unwrap();
        std::fs::write(&diagram, "A -> B\n").unwrap();

        let catalog = read_task_data(&data).unwrap();
        let precedence = read_precedence(&diagram).unwrap();
        let config = crate::BalancingConfig::from_averages(&catalog, 2, 0.0).unwrap();
        let balance = crate::balance_by_time(&catalog, &precedence, &config).unwrap();

        // average cycle time is 6: A alone, the last workstation takes the rest
        assert_eq!(balance[&1].tasks, vec!["A".to_string()]);
        assert_eq!(balance[&2].tasks, vec!["C".to_string(), "B".to_string()]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
