use std::{fmt::Display, str::FromStr};

use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::expenses::{ExpenseCategory, ExpenseSummary};

#[derive(Debug, thiserror::Error)]
#[error("Invalid gender '{0}'. Accepted values: 'feminino', 'masculino', 'f', 'm'")]
pub struct GenderParseError(String);

/// Category label attached to every record, taken from the source list a
/// profile was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Feminino,
    Masculino,
}

impl Gender {
    pub fn slug(&self) -> &'static str {
        match self {
            Gender::Feminino => "feminino",
            Gender::Masculino => "masculino",
        }
    }
}

impl FromStr for Gender {
    type Err = GenderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "feminino" | "f" => Ok(Gender::Feminino),
            "masculino" | "m" => Ok(Gender::Masculino),
            _ => Err(GenderParseError(s.to_string())),
        }
    }
}

impl Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonalInfo {
    /// Legal name; empty when the profile does not list one.
    pub name: String,
    pub birth_date: Option<NaiveDate>,
}

/// Plenary and committee attendance. Absence counts already include the
/// excused absences, which are also exposed on their own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Attendance {
    pub plenary_present: Option<u32>,
    pub plenary_absent: Option<u32>,
    pub plenary_excused: Option<u32>,
    pub committee_present: Option<u32>,
    pub committee_absent: Option<u32>,
    pub committee_excused: Option<u32>,
}

impl Attendance {
    pub fn is_empty(&self) -> bool {
        *self == Attendance::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegislatorRecord {
    pub gender: Gender,
    pub personal: PersonalInfo,
    pub quota_expenses: ExpenseSummary,
    pub office_expenses: ExpenseSummary,
    pub gross_salary: f64,
    pub attendance: Attendance,
}

/// Number of keys in a serialized record.
pub const RECORD_FIELD_COUNT: usize = 3 + 2 * (1 + 12) + 6 + 1;

impl Serialize for LegislatorRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let birth_date = self
            .personal
            .birth_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        let mut map = serializer.serialize_map(Some(RECORD_FIELD_COUNT))?;
        map.serialize_entry("genero", &self.gender)?;
        map.serialize_entry("nome", &self.personal.name)?;
        map.serialize_entry("data_nascimento", &birth_date)?;
        self.quota_expenses
            .serialize_entries(&mut map, ExpenseCategory::Quota.key_suffix())?;
        self.office_expenses
            .serialize_entries(&mut map, ExpenseCategory::Office.key_suffix())?;

        let a = &self.attendance;
        map.serialize_entry("presenca_plenario", &a.plenary_present)?;
        map.serialize_entry("ausencia_plenario", &a.plenary_absent)?;
        map.serialize_entry("ausencia_justificada_plenario", &a.plenary_excused)?;
        map.serialize_entry("presenca_comissao", &a.committee_present)?;
        map.serialize_entry("ausencia_comissao", &a.committee_absent)?;
        map.serialize_entry("ausencia_justificada_comissao", &a.committee_excused)?;
        map.serialize_entry("salario_bruto", &self.gross_salary)?;
        map.end()
    }
}

fn fmt_count(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

impl Display for LegislatorRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = if self.personal.name.is_empty() {
            "[name not found]"
        } else {
            self.personal.name.as_str()
        };
        writeln!(f, "┌─ {} ({})", name, self.gender)?;
        if let Some(date) = self.personal.birth_date {
            writeln!(f, "│  Born: {}", date)?;
        }
        writeln!(f, "│  Gross salary: R$ {:.2}", self.gross_salary)?;
        writeln!(
            f,
            "│  {}: R$ {:.2}",
            ExpenseCategory::Quota,
            self.quota_expenses.total
        )?;
        writeln!(
            f,
            "│  {}: R$ {:.2}",
            ExpenseCategory::Office,
            self.office_expenses.total
        )?;
        if self.attendance.is_empty() {
            write!(f, "└─ No attendance recorded")
        } else {
            let a = &self.attendance;
            writeln!(
                f,
                "│  Plenary: {} present, {} absent ({} excused)",
                fmt_count(a.plenary_present),
                fmt_count(a.plenary_absent),
                fmt_count(a.plenary_excused)
            )?;
            write!(
                f,
                "└─ Committees: {} present, {} absent ({} excused)",
                fmt_count(a.committee_present),
                fmt_count(a.committee_absent),
                fmt_count(a.committee_excused)
            )
        }
    }
}
