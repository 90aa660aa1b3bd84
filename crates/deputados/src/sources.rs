use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::Gender;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to read source list {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A profile page to fetch, with the category of the list it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSource {
    pub url: String,
    pub gender: Gender,
}

/// Returns the URL of a source list line, i.e. the text between its first
/// pair of double quotes.
pub fn parse_source_line(line: &str) -> Option<&str> {
    let mut fields = line.split('"');
    fields.next()?;
    let url = fields.next()?.trim();
    // An unterminated quote leaves no closing field behind.
    fields.next()?;

    (!url.is_empty()).then_some(url)
}

pub fn parse_sources(content: &str, gender: Gender) -> Vec<ProfileSource> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(i, line)| match parse_source_line(line) {
            Some(url) => Some(ProfileSource {
                url: url.to_string(),
                gender,
            }),
            None => {
                log::warn!("Skipping line {} without a quoted URL: {}", i + 1, line);
                None
            }
        })
        .collect()
}

pub fn load_sources(
    path: impl AsRef<Path>,
    gender: Gender,
) -> Result<Vec<ProfileSource>, SourceError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let sources = parse_sources(&content, gender);
    log::info!(
        "Loaded {} {} source(s) from {}",
        sources.len(),
        gender,
        path.display()
    );
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source_line() {
        assert_eq!(
            parse_source_line(
                r#"<a href="https://www.camara.leg.br/deputados/204554">Abilio Brunini</a>"#
            ),
            Some("https://www.camara.leg.br/deputados/204554")
        );
        assert_eq!(
            parse_source_line(r#"- "https://www.camara.leg.br/deputados/1" "x""#),
            Some("https://www.camara.leg.br/deputados/1")
        );
    }

    #[test]
    fn test_parse_source_line_without_url() {
        assert_eq!(parse_source_line("no quotes here"), None);
        assert_eq!(parse_source_line(r#"empty "" quotes"#), None);
        assert_eq!(parse_source_line(r#"unterminated "https://x"#), None);
    }

    #[test]
    fn test_parse_sources_skips_bad_lines() {
        let content = r#"
<a href="https://www.camara.leg.br/deputados/1">A</a>
garbage

<a href="https://www.camara.leg.br/deputados/2">B</a>
"#;

        let sources = parse_sources(content, Gender::Masculino);

        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].url, "https://www.camara.leg.br/deputados/1");
        assert_eq!(sources[1].url, "https://www.camara.leg.br/deputados/2");
        assert!(sources.iter().all(|s| s.gender == Gender::Masculino));
    }

    #[test]
    fn test_load_sources_missing_file() {
        let err = load_sources("fixtures/does-not-exist.txt", Gender::Feminino)
            .expect_err("Missing file should fail");
        assert!(matches!(err, SourceError::Read { .. }));
    }

    #[test]
    fn test_load_sources_from_fixture() {
        let sources = load_sources("fixtures/female_deputies.txt", Gender::Feminino)
            .expect("Failed to load fixture");

        assert_eq!(sources.len(), 3);
        assert!(sources.iter().all(|s| s.gender == Gender::Feminino));
        assert!(sources[0].url.starts_with("https://www.camara.leg.br/deputados/"));
    }
}
