//! Competitor pool loading from JSON.
//!
//! The file is an array of records:
//!
//! ```json
//! [{ "id": 1503014, "name": "Carlsen, Magnus", "rating": 2837 }]
//! ```
//!
//! `elo` is accepted in place of `rating`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use qualsim_core::domain::{Competitor, CompetitorPool, PoolError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse competitor JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid pool: {0}")]
    Pool(#[from] PoolError),
}

#[derive(Debug, Deserialize)]
struct CompetitorRecord {
    id: u64,
    #[serde(default)]
    name: Option<String>,
    #[serde(alias = "elo")]
    rating: f64,
}

/// Parse a pool from a JSON string.
pub fn pool_from_json(content: &str) -> Result<CompetitorPool, LoadError> {
    let records: Vec<CompetitorRecord> = serde_json::from_str(content)?;
    let competitors = records
        .into_iter()
        .map(|r| {
            let name = r.name.unwrap_or_else(|| format!("#{}", r.id));
            Competitor::new(r.id, name, r.rating)
        })
        .collect();
    Ok(CompetitorPool::new(competitors)?)
}

/// Load a pool from a JSON file.
pub fn load_pool(path: &Path) -> Result<CompetitorPool, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    pool_from_json(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qualsim_core::domain::CompetitorId;

    #[test]
    fn parses_rating_and_elo_fields() {
        let pool = pool_from_json(
            r#"[
                {"id": 1, "name": "A", "rating": 2800},
                {"id": 2, "elo": 2750.5}
            ]"#,
        )
        .unwrap();
        assert_eq!(pool.len(), 2);
        let b = pool.get(CompetitorId(2)).unwrap();
        assert_eq!(b.rating, 2750.5);
        assert_eq!(b.name, "#2");
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = pool_from_json(r#"[{"id": 1, "rating": 2800}, {"id": 1, "rating": 2700}]"#)
            .unwrap_err();
        assert!(matches!(err, LoadError::Pool(PoolError::DuplicateId(CompetitorId(1)))));
    }

    #[test]
    fn empty_pool_is_rejected() {
        assert!(matches!(pool_from_json("[]"), Err(LoadError::Pool(PoolError::Empty))));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(pool_from_json("{"), Err(LoadError::Parse(_))));
    }
}
