//! Person records as they appear in the people file.
//!
//! The JSON field names follow the data file produced by the registration
//! system (`IdPessoa`, `Nome`, ...), so the serde attributes map them onto
//! regular Rust field names.

use serde::{Deserialize, Serialize};

use crate::format;

/// A profession referenced by a person record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profession {
    /// Display name of the profession.
    #[serde(rename = "Nome", default)]
    pub name: String,
}

impl Profession {
    /// Creates a profession with the given display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One row of the report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Numeric identifier, rendered as a zero-padded code.
    #[serde(rename = "IdPessoa")]
    pub id: u32,
    /// First name.
    #[serde(rename = "Nome", default)]
    pub first_name: String,
    /// Last name.
    #[serde(rename = "Sobrenome", default)]
    pub last_name: String,
    /// Salary in the report currency.
    #[serde(rename = "Salario", default)]
    pub salary: f64,
    #[serde(rename = "Profissao", default)]
    pub profession: Option<Profession>,
    /// Whether the person is currently employed.
    #[serde(rename = "Empregado", default)]
    pub employed: bool,
}

impl Person {
    /// Creates a person with the given identifier and names.
    pub fn new(id: u32, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            salary: 0.0,
            profession: None,
            employed: false,
        }
    }

    /// Sets the salary and returns the updated record.
    pub fn with_salary(mut self, salary: f64) -> Self {
        self.salary = salary;
        self
    }

    /// Sets the profession and returns the updated record.
    pub fn with_profession(mut self, profession: impl Into<String>) -> Self {
        self.profession = Some(Profession::new(profession));
        self
    }

    /// Sets the employment flag and returns the updated record.
    pub fn with_employed(mut self, employed: bool) -> Self {
        self.employed = employed;
        self
    }

    /// Returns the zero-padded code shown in the first column.
    pub fn code(&self) -> String {
        format::person_code(self.id)
    }

    /// Returns `"first last"`.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Returns the profession name, or an empty string when none is recorded.
    pub fn profession_name(&self) -> &str {
        self.profession
            .as_ref()
            .map(|profession| profession.name.as_str())
            .unwrap_or_default()
    }
}
