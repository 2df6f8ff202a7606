//! Reads the people file.

use std::fs;
use std::io;
use std::path::Path;

use log::{debug, info};

use crate::error::{ReportError, Result};
use crate::model::Person;

/// Default name of the people file, looked up in the working directory.
pub const DEFAULT_INPUT_FILE: &str = "pessoas.json";

/// Loads every person from the JSON array stored at `path`.
///
/// A missing file is not an error and yields an empty list. Anything else that
/// prevents reading the file, or content that is not a JSON array of person
/// records, is returned as an error.
pub fn load_people(path: impl AsRef<Path>) -> Result<Vec<Person>> {
    let path = path.as_ref();
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            info!("No people file at {}; nothing to report", path.display());
            return Ok(Vec::new());
        }
        Err(err) => return Err(ReportError::io(path, err)),
    };

    let people: Vec<Person> = serde_json::from_str(&data).map_err(|source| ReportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Loaded {} people from {}", people.len(), path.display());
    Ok(people)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_no_people() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let people = load_people(dir.path().join(DEFAULT_INPUT_FILE)).expect("load people");
        assert!(people.is_empty());
    }

    #[test]
    fn reads_people_in_file_order() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(DEFAULT_INPUT_FILE);
        fs::write(
            &path,
            r#"[
                {"IdPessoa": 2, "Nome": "Bia", "Sobrenome": "Lima", "Salario": 10.0,
                 "Profissao": {"Nome": "Chef"}, "Empregado": false},
                {"IdPessoa": 1, "Nome": "Caio", "Sobrenome": "Reis", "Salario": 20.5,
                 "Profissao": {"Nome": "Piloto"}, "Empregado": true}
            ]"#,
        )
        .expect("write people file");

        let people = load_people(&path).expect("load people");
        let ids: Vec<_> = people.iter().map(|person| person.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn empty_array_yields_no_people() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(DEFAULT_INPUT_FILE);
        fs::write(&path, "[]").expect("write people file");
        assert!(load_people(&path).expect("load people").is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(DEFAULT_INPUT_FILE);
        fs::write(&path, r#"[{"IdPessoa": "#).expect("write people file");

        let err = load_people(&path).unwrap_err();
        assert!(matches!(err, ReportError::Json { .. }), "got {err}");
    }
}
