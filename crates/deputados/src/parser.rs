use chrono::NaiveDate;

use crate::expenses::{ExpenseCategory, ExpenseSummary, scan_entries};
use crate::normalize::{NumberFormatError, parse_brl_number, parse_leading_count, strip_currency};
use crate::query::{DocumentQuery, ProfileDocument, Query};
use crate::types::{Attendance, Gender, LegislatorRecord, PersonalInfo};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Missing required section: {0}")]
    MissingSection(Query),
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Expected 0 or 6 attendance values, found {0}")]
    AttendanceLayout(usize),
    #[error("Invalid gross salary: {0}")]
    Salary(#[from] NumberFormatError),
}

const BIRTH_DATE_LABEL: &str = "Data de Nascimento:";
const NAME_LABEL: &str = "Nome Civil:";
const BIRTH_DATE_FORMAT: &str = "%d/%m/%Y";

/// Position of the gross salary among the benefit links.
const SALARY_LINK_INDEX: usize = 1;

const ATTENDANCE_VALUES: usize = 6;

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn section<D: DocumentQuery + ?Sized>(
    document: &D,
    query: Query,
) -> Result<Vec<String>, ParseError> {
    document
        .texts(query)
        .ok_or(ParseError::MissingSection(query))
}

/// Parses a full profile page.
pub fn parse_profile(html: &str, gender: Gender) -> Result<LegislatorRecord, ParseError> {
    let document = ProfileDocument::parse(html);
    parse_profile_document(&document, gender)
}

pub fn parse_profile_document<D: DocumentQuery + ?Sized>(
    document: &D,
    gender: Gender,
) -> Result<LegislatorRecord, ParseError> {
    let personal = extract_personal_info(document)?;
    let quota_expenses = extract_expenses(document, ExpenseCategory::Quota)?;
    let office_expenses = extract_expenses(document, ExpenseCategory::Office)?;
    let gross_salary = extract_salary(document)?;
    let attendance = extract_attendance(document)?;

    Ok(LegislatorRecord {
        gender,
        personal,
        quota_expenses,
        office_expenses,
        gross_salary,
        attendance,
    })
}

/// Reads the legal name and birth date from the personal info list.
///
/// The list itself is required. Inside it both fields are optional, and a
/// birth date that does not parse is reported as missing.
pub fn extract_personal_info<D: DocumentQuery + ?Sized>(
    document: &D,
) -> Result<PersonalInfo, ParseError> {
    let mut info = PersonalInfo::default();

    for entry in section(document, Query::PersonalInfo)? {
        let text = normalize_whitespace(&entry);

        if let Some(date) = text.strip_prefix(BIRTH_DATE_LABEL) {
            let date = date.trim();
            info.birth_date = NaiveDate::parse_from_str(date, BIRTH_DATE_FORMAT)
                .inspect_err(|e| log::warn!("Invalid birth date '{}': {}", date, e))
                .ok();
        } else if let Some(name) = text.strip_prefix(NAME_LABEL) {
            info.name = name.trim().to_string();
        }
    }

    if info.name.is_empty() {
        log::debug!("No legal name in {}", Query::PersonalInfo);
    }

    Ok(info)
}

pub fn extract_expenses<D: DocumentQuery + ?Sized>(
    document: &D,
    category: ExpenseCategory,
) -> Result<ExpenseSummary, ParseError> {
    let cells = section(document, category.query())?;
    Ok(ExpenseSummary::from_entries(scan_entries(&cells)))
}

pub fn extract_salary<D: DocumentQuery + ?Sized>(document: &D) -> Result<f64, ParseError> {
    let links = section(document, Query::Benefits)?;
    let link = links.get(SALARY_LINK_INDEX).ok_or_else(|| {
        ParseError::MissingField(format!(
            "gross salary (benefit link #{}, found {})",
            SALARY_LINK_INDEX + 1,
            links.len()
        ))
    })?;

    Ok(parse_brl_number(strip_currency(link)?)?)
}

/// Reads the six attendance counts.
///
/// A page without any attendance values (e.g. no term on record) gives an
/// empty [`Attendance`]. Any count other than zero or six is a layout error.
pub fn extract_attendance<D: DocumentQuery + ?Sized>(
    document: &D,
) -> Result<Attendance, ParseError> {
    let texts = document.texts(Query::Attendance).unwrap_or_default();

    if texts.is_empty() {
        return Ok(Attendance::default());
    }
    if texts.len() != ATTENDANCE_VALUES {
        return Err(ParseError::AttendanceLayout(texts.len()));
    }

    let counts: Vec<Option<u32>> = texts
        .iter()
        .map(|text| {
            parse_leading_count(text)
                .inspect_err(|e| log::warn!("Skipping attendance value: {}", e))
                .ok()
        })
        .collect();

    let sum = |a: Option<u32>, b: Option<u32>| a?.checked_add(b?);

    Ok(Attendance {
        plenary_present: counts[0],
        plenary_absent: sum(counts[1], counts[2]),
        plenary_excused: counts[2],
        committee_present: counts[3],
        committee_absent: sum(counts[4], counts[5]),
        committee_excused: counts[5],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    /// In-memory page, section by section.
    #[derive(Default)]
    struct FakeDocument(HashMap<Query, Vec<String>>);

    impl FakeDocument {
        fn with(mut self, query: Query, texts: &[&str]) -> Self {
            self.0
                .insert(query, texts.iter().map(|t| t.to_string()).collect());
            self
        }
    }

    impl DocumentQuery for FakeDocument {
        fn texts(&self, query: Query) -> Option<Vec<String>> {
            self.0.get(&query).cloned()
        }
    }

    fn attendance_html(values: &[&str]) -> String {
        let items: String = values
            .iter()
            .map(|v| format!(r#"<dd class="list-table__definition-description">{v}</dd>"#))
            .collect();
        format!("<dl>{items}</dl>")
    }

    const MINIMAL_PROFILE: &str = r#"
        <ul class="informacoes-deputado">
            <li><span>Nome Civil:</span> JOÃO PEREIRA</li>
            <li><span>Data de Nascimento:</span> 01/12/1975</li>
        </ul>
        <table id="gastomensalcotaparlamentar"><tbody></tbody></table>
        <table id="gastomensalverbagabinete"><tbody></tbody></table>
        <section id="recursos-section">
            <a class="beneficio__info">Pessoal de gabinete 10 pessoas</a>
            <a class="beneficio__info">Salário mensal bruto R$ 33.763,00</a>
        </section>
    "#;

    #[test]
    fn test_parse_profile_from_fixture() {
        let html = fs::read_to_string("fixtures/profile_deputada.html")
            .expect("Failed to read fixture");

        let record = parse_profile(&html, Gender::Feminino).expect("Failed to parse profile");

        assert_eq!(record.gender, Gender::Feminino);
        assert_eq!(record.personal.name, "MARIA APARECIDA DOS SANTOS");
        assert_eq!(
            record.personal.birth_date,
            NaiveDate::from_ymd_opt(1980, 3, 15)
        );

        assert_eq!(record.quota_expenses.months[0], Some(12345.67));
        assert_eq!(record.quota_expenses.months[1], Some(0.0));
        assert_eq!(record.quota_expenses.months[2], Some(1234.56));
        assert!(record.quota_expenses.months[3..].iter().all(Option::is_none));
        assert_eq!(record.quota_expenses.total, 12345.67 + 0.0 + 1234.56);

        assert_eq!(record.office_expenses.months[0], Some(98765.43));
        assert_eq!(record.office_expenses.months[1], None);
        assert_eq!(record.office_expenses.total, 98765.43 + 110000.0);

        assert_eq!(record.gross_salary, 33763.0);

        let a = record.attendance;
        assert_eq!(a.plenary_present, Some(90));
        assert_eq!(a.plenary_absent, Some(8));
        assert_eq!(a.plenary_excused, Some(3));
        assert_eq!(a.committee_present, Some(25));
        assert_eq!(a.committee_absent, Some(4));
        assert_eq!(a.committee_excused, Some(1));

        println!("Record: {}", record);
    }

    #[test]
    fn test_parse_profile_is_deterministic() {
        let html = fs::read_to_string("fixtures/profile_deputada.html")
            .expect("Failed to read fixture");

        let first = parse_profile(&html, Gender::Feminino).expect("Failed to parse");
        let second = parse_profile(&html, Gender::Feminino).expect("Failed to parse");

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).expect("Failed to serialize"),
            serde_json::to_string(&second).expect("Failed to serialize")
        );
    }

    #[test]
    fn test_parse_minimal_profile() {
        let record = parse_profile(MINIMAL_PROFILE, Gender::Masculino).expect("Failed to parse");

        assert_eq!(record.personal.name, "JOÃO PEREIRA");
        assert_eq!(
            record.personal.birth_date,
            NaiveDate::from_ymd_opt(1975, 12, 1)
        );
        assert_eq!(record.quota_expenses.total, 0.0);
        assert!(record.quota_expenses.months.iter().all(Option::is_none));
        assert_eq!(record.office_expenses.total, 0.0);
        assert!(record.attendance.is_empty());

        let json = serde_json::to_value(&record).expect("Failed to serialize");
        assert_eq!(json["genero"], "masculino");
        assert!(json["presenca_plenario"].is_null());
        assert!(json["gasto_jan_par"].is_null());
    }

    #[test]
    fn test_birth_date_conversion() {
        let doc = FakeDocument::default().with(
            Query::PersonalInfo,
            &["Data de Nascimento: 15/03/1980"],
        );

        let info = extract_personal_info(&doc).expect("Failed to extract");

        assert_eq!(
            info.birth_date.map(|d| d.to_string()),
            Some("1980-03-15".to_string())
        );
        assert_eq!(info.name, "");
    }

    #[test]
    fn test_personal_info_tolerates_missing_and_malformed_fields() {
        let doc = FakeDocument::default().with(
            Query::PersonalInfo,
            &["Partido: XYZ", "Data de Nascimento: 31/02/1980"],
        );

        let info = extract_personal_info(&doc).expect("Failed to extract");

        assert_eq!(info.birth_date, None);
        assert_eq!(info.name, "");
    }

    #[test]
    fn test_personal_info_requires_list() {
        let err = extract_personal_info(&FakeDocument::default())
            .expect_err("Missing list should fail");
        assert!(matches!(err, ParseError::MissingSection(Query::PersonalInfo)));
    }

    #[test]
    fn test_missing_expense_table_is_an_error() {
        let html = MINIMAL_PROFILE.replace("gastomensalverbagabinete", "outra-tabela");

        let err = parse_profile(&html, Gender::Feminino).expect_err("Should fail");
        assert!(matches!(
            err,
            ParseError::MissingSection(Query::OfficeExpenses)
        ));
    }

    #[test]
    fn test_missing_resources_section_is_an_error() {
        let html = MINIMAL_PROFILE.replace("recursos-section", "outra-secao");

        let err = parse_profile(&html, Gender::Feminino).expect_err("Should fail");
        assert!(matches!(err, ParseError::MissingSection(Query::Benefits)));
    }

    #[test]
    fn test_salary_requires_second_link() {
        let doc = FakeDocument::default().with(Query::Benefits, &["Pessoal de gabinete"]);

        let err = extract_salary(&doc).expect_err("Should fail");
        assert!(matches!(err, ParseError::MissingField(_)));
    }

    #[test]
    fn test_salary_requires_currency_marker() {
        let doc = FakeDocument::default().with(Query::Benefits, &["Pessoal", "33.763,00"]);

        let err = extract_salary(&doc).expect_err("Should fail");
        assert!(matches!(
            err,
            ParseError::Salary(NumberFormatError::MissingCurrency(_))
        ));
    }

    #[test]
    fn test_attendance_absent() {
        let doc = ProfileDocument::parse("<div>Sem mandato</div>");

        let attendance = extract_attendance(&doc).expect("Failed to extract");

        assert!(attendance.is_empty());
        assert_eq!(attendance.plenary_present, None);
        assert_eq!(attendance.committee_excused, None);
    }

    #[test]
    fn test_attendance_totals() {
        let html = attendance_html(&[
            "90 dias", "5 dias", "3 dias", "20 reuniões", "2 reuniões", "1 reunião",
        ]);
        let doc = ProfileDocument::parse(&html);

        let a = extract_attendance(&doc).expect("Failed to extract");

        assert_eq!(a.plenary_present, Some(90));
        assert_eq!(a.plenary_absent, Some(8));
        assert_eq!(a.plenary_excused, Some(3));
        assert_eq!(a.committee_present, Some(20));
        assert_eq!(a.committee_absent, Some(3));
        assert_eq!(a.committee_excused, Some(1));
    }

    #[test]
    fn test_attendance_partial_list_is_an_error() {
        let html = attendance_html(&["90 dias", "5 dias", "3 dias"]);
        let doc = ProfileDocument::parse(&html);

        let err = extract_attendance(&doc).expect_err("Should fail");
        assert!(matches!(err, ParseError::AttendanceLayout(3)));
    }

    #[test]
    fn test_attendance_unparseable_value_only_fails_that_field() {
        let doc = FakeDocument::default().with(
            Query::Attendance,
            &["90 dias", "-", "3 dias", "20 reuniões", "2 reuniões", "1 reunião"],
        );

        let a = extract_attendance(&doc).expect("Failed to extract");

        assert_eq!(a.plenary_present, Some(90));
        assert_eq!(a.plenary_absent, None);
        assert_eq!(a.plenary_excused, Some(3));
        assert_eq!(a.committee_absent, Some(3));
    }
}
