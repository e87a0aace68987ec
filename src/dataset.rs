use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::scoring::{Entity, PrecomputedEntry, Schema};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse JSON in {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to parse YAML in {path}: {message}")]
    Yaml { path: PathBuf, message: String },
}

/// Entity files are either a bare array or wrapped in an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum EntityFile {
    List(Vec<Entity>),
    Wrapped {
        #[serde(alias = "items", alias = "localities", alias = "places")]
        entities: Vec<Entity>,
    },
}

/// Rankings files carry the list under `all_rankings` (or `rankings`).
#[derive(Deserialize)]
#[serde(untagged)]
enum RankingsFile {
    List(Vec<PrecomputedEntry>),
    Wrapped {
        #[serde(alias = "rankings")]
        all_rankings: Vec<PrecomputedEntry>,
    },
}

fn read(path: &Path) -> Result<String, DatasetError> {
    fs::read_to_string(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_json<T: for<'de> Deserialize<'de>>(path: &Path, content: &str) -> Result<T, DatasetError> {
    serde_json::from_str(content).map_err(|source| DatasetError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load entity records from a JSON file.
pub fn load_entities(path: &Path) -> Result<Vec<Entity>, DatasetError> {
    let content = read(path)?;
    let file: EntityFile = parse_json(path, &content)?;
    Ok(match file {
        EntityFile::List(entities) | EntityFile::Wrapped { entities } => entities,
    })
}

/// Load a precomputed rankings file.
pub fn load_rankings(path: &Path) -> Result<Vec<PrecomputedEntry>, DatasetError> {
    let content = read(path)?;
    let file: RankingsFile = parse_json(path, &content)?;
    Ok(match file {
        RankingsFile::List(entries) | RankingsFile::Wrapped { all_rankings: entries } => entries,
    })
}

/// Load a standalone schema file: JSON when the extension is `.json`, YAML otherwise.
pub fn load_schema(path: &Path) -> Result<Schema, DatasetError> {
    let content = read(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        parse_json(path, &content)
    } else {
        serde_saphyr::from_str(&content).map_err(|e| DatasetError::Yaml {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_entity_array() {
        let file = write_temp(
            ".json",
            r#"[{"id": "a", "name": "A", "data": {"time": 12}}, {"id": "b", "name": "B"}]"#,
        );
        let entities = load_entities(file.path()).unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].metric("time"), Some(12.0));
    }

    #[test]
    fn test_load_wrapped_entities() {
        let file = write_temp(".json", r#"{"localities": [{"id": "a", "name": "A"}]}"#);
        let entities = load_entities(file.path()).unwrap();
        assert_eq!(entities[0].id, "a");
    }

    #[test]
    fn test_load_rankings_wrapped() {
        let file = write_temp(
            ".json",
            r#"{
                "methodology": "objective",
                "category_weights": {"accessibility": 1.0},
                "all_rankings": [{"name": "Pattom", "overall_score": 6.1, "breakdown": {"accessibility": 6.1}}]
            }"#,
        );
        let entries = load_rankings(file.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].subscore("accessibility"), 6.1);
    }

    #[test]
    fn test_missing_file() {
        let err = load_entities(Path::new("/nonexistent/placerank/data.json")).unwrap_err();
        assert!(matches!(err, DatasetError::Read { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let file = write_temp(".json", "{not json");
        let err = load_entities(file.path()).unwrap_err();
        assert!(matches!(err, DatasetError::Json { .. }));
    }

    #[test]
    fn test_load_schema_json_and_yaml() {
        let json = write_temp(
            ".json",
            r#"{"categories": {"localities": {"scoringCategories": [
                {"id": "access", "name": "Access", "weight": 1,
                 "metrics": [{"id": "time", "name": "Time", "min": 0, "max": 60, "invertScale": true, "weight": 1}]}
            ]}}}"#,
        );
        let schema = load_schema(json.path()).unwrap();
        assert!(schema.domain("localities").is_some());

        let yaml = write_temp(
            ".yaml",
            r#"
domains:
  cafes:
    scoring_categories:
      - id: overall
        name: Overall
        weight: 1
        metrics:
          - { id: rating, name: Rating, min: 0, max: 5, weight: 1 }
"#,
        );
        let schema = load_schema(yaml.path()).unwrap();
        assert!(schema.domain("cafes").is_some());
    }
}
