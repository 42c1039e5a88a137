use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Raw employee data as handed over by a record source.
///
/// Every field is an untyped JSON value. `None` means the key was absent from
/// the source record, `Some(Value::Null)` means it was present but null; the
/// schema enforcer relies on that distinction. Keys outside this set are
/// dropped on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default, deserialize_with = "keep_null", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<Value>,
    #[serde(default, deserialize_with = "keep_null", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<Value>,
    #[serde(default, deserialize_with = "keep_null", skip_serializing_if = "Option::is_none")]
    pub phone: Option<Value>,
    #[serde(default, deserialize_with = "keep_null", skip_serializing_if = "Option::is_none")]
    pub email: Option<Value>,
    #[serde(default, deserialize_with = "keep_null", skip_serializing_if = "Option::is_none")]
    pub gender: Option<Value>,
    #[serde(default, deserialize_with = "keep_null", skip_serializing_if = "Option::is_none")]
    pub age: Option<Value>,
    #[serde(default, deserialize_with = "keep_null", skip_serializing_if = "Option::is_none")]
    pub job_title: Option<Value>,
    #[serde(default, deserialize_with = "keep_null", skip_serializing_if = "Option::is_none")]
    pub years_of_experience: Option<Value>,
    #[serde(default, deserialize_with = "keep_null", skip_serializing_if = "Option::is_none")]
    pub salary: Option<Value>,
    #[serde(default, deserialize_with = "keep_null", skip_serializing_if = "Option::is_none")]
    pub department: Option<Value>,
    #[serde(default, deserialize_with = "keep_null", skip_serializing_if = "Option::is_none")]
    pub hire_date: Option<Value>,
    #[serde(default, deserialize_with = "keep_null", skip_serializing_if = "Option::is_none")]
    pub designation: Option<Value>,
}

// serde maps `null` to `None` for Option fields; keep it as `Some(Null)` so a
// present-but-null key stays distinguishable from an absent one.
fn keep_null<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl RawRecord {
    /// Value stored for an input column; `None` for absent keys and derived columns
    pub fn get(&self, column: Column) -> Option<&Value> {
        self.slot(column).and_then(|slot| slot.as_ref())
    }

    /// Replace the value of an input column. Derived columns are ignored.
    pub fn set(&mut self, column: Column, value: Value) {
        if let Some(slot) = self.slot_mut(column) {
            *slot = Some(value);
        }
    }

    pub fn has(&self, column: Column) -> bool {
        self.get(column).is_some()
    }

    fn slot(&self, column: Column) -> Option<&Option<Value>> {
        match column {
            Column::FirstName => Some(&self.first_name),
            Column::LastName => Some(&self.last_name),
            Column::Phone => Some(&self.phone),
            Column::Email => Some(&self.email),
            Column::Gender => Some(&self.gender),
            Column::Age => Some(&self.age),
            Column::JobTitle => Some(&self.job_title),
            Column::YearsOfExperience => Some(&self.years_of_experience),
            Column::Salary => Some(&self.salary),
            Column::Department => Some(&self.department),
            Column::HireDate => Some(&self.hire_date),
            Column::Designation => Some(&self.designation),
            Column::FullName => None,
        }
    }

    fn slot_mut(&mut self, column: Column) -> Option<&mut Option<Value>> {
        match column {
            Column::FirstName => Some(&mut self.first_name),
            Column::LastName => Some(&mut self.last_name),
            Column::Phone => Some(&mut self.phone),
            Column::Email => Some(&mut self.email),
            Column::Gender => Some(&mut self.gender),
            Column::Age => Some(&mut self.age),
            Column::JobTitle => Some(&mut self.job_title),
            Column::YearsOfExperience => Some(&mut self.years_of_experience),
            Column::Salary => Some(&mut self.salary),
            Column::Department => Some(&mut self.department),
            Column::HireDate => Some(&mut self.hire_date),
            Column::Designation => Some(&mut self.designation),
            Column::FullName => None,
        }
    }
}

/// Semantic type a column is coerced to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Float,
    Date,
}

/// Every column either schema variant can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    FirstName,
    LastName,
    Phone,
    Email,
    Gender,
    Age,
    JobTitle,
    YearsOfExperience,
    Salary,
    Department,
    HireDate,
    Designation,
    FullName,
}

impl Column {
    /// Canonical column name used in every output format
    pub fn name(&self) -> &'static str {
        match self {
            Column::FirstName => "first_name",
            Column::LastName => "last_name",
            Column::Phone => "phone",
            Column::Email => "email",
            Column::Gender => "gender",
            Column::Age => "age",
            Column::JobTitle => "job_title",
            Column::YearsOfExperience => "years_of_experience",
            Column::Salary => "salary",
            Column::Department => "department",
            Column::HireDate => "hire_date",
            Column::Designation => "designation",
            Column::FullName => "Full Name",
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Age => ColumnKind::Integer,
            Column::Salary | Column::YearsOfExperience => ColumnKind::Float,
            Column::HireDate => ColumnKind::Date,
            _ => ColumnKind::Text,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.kind(), ColumnKind::Integer | ColumnKind::Float)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

const MANUAL_INPUT_COLUMNS: [Column; 10] = [
    Column::FirstName,
    Column::LastName,
    Column::Phone,
    Column::Email,
    Column::Gender,
    Column::Age,
    Column::Salary,
    Column::Department,
    Column::HireDate,
    Column::Designation,
];

const MANUAL_OUTPUT_COLUMNS: [Column; 11] = [
    Column::FirstName,
    Column::LastName,
    Column::Phone,
    Column::Email,
    Column::Gender,
    Column::Age,
    Column::Salary,
    Column::Department,
    Column::HireDate,
    Column::Designation,
    Column::FullName,
];

const BUCKETED_INPUT_COLUMNS: [Column; 11] = [
    Column::FirstName,
    Column::LastName,
    Column::Phone,
    Column::Email,
    Column::Gender,
    Column::Age,
    Column::JobTitle,
    Column::YearsOfExperience,
    Column::Salary,
    Column::Department,
    Column::HireDate,
];

const BUCKETED_OUTPUT_COLUMNS: [Column; 13] = [
    Column::FirstName,
    Column::LastName,
    Column::Phone,
    Column::Email,
    Column::Gender,
    Column::Age,
    Column::JobTitle,
    Column::YearsOfExperience,
    Column::Salary,
    Column::Department,
    Column::HireDate,
    Column::FullName,
    Column::Designation,
];

/// The two recognized column sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVariant {
    /// Designation supplied by the source
    #[default]
    Manual,
    /// Designation derived from years of experience
    ExperienceBucketed,
}

impl SchemaVariant {
    /// Columns expected on incoming records, in output order
    pub fn input_columns(&self) -> &'static [Column] {
        match self {
            SchemaVariant::Manual => &MANUAL_INPUT_COLUMNS,
            SchemaVariant::ExperienceBucketed => &BUCKETED_INPUT_COLUMNS,
        }
    }

    /// Columns of the canonical table, derived ones included
    pub fn output_columns(&self) -> &'static [Column] {
        match self {
            SchemaVariant::Manual => &MANUAL_OUTPUT_COLUMNS,
            SchemaVariant::ExperienceBucketed => &BUCKETED_OUTPUT_COLUMNS,
        }
    }

    pub fn derives_designation(&self) -> bool {
        matches!(self, SchemaVariant::ExperienceBucketed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVariant::Manual => "manual",
            SchemaVariant::ExperienceBucketed => "experience_bucketed",
        }
    }
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "manual" | "a" => Ok(SchemaVariant::Manual),
            "experience_bucketed" | "experience" | "bucketed" | "b" => {
                Ok(SchemaVariant::ExperienceBucketed)
            }
            other => Err(format!(
                "unknown schema variant '{}' (expected 'manual' or 'experience_bucketed')",
                other
            )),
        }
    }
}
