use crate::scraper::CrawlReport;
use crate::types::Gender;

pub const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub concurrency: usize,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl CrawlOptions {
    pub fn validate(self) -> Result<Self, String> {
        if self.concurrency == 0 {
            return Err("Concurrency must be greater than 0".to_string());
        }
        Ok(self)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct CrawlStats {
    pub feminino: usize,
    pub masculino: usize,
    pub failed: usize,
    pub total: usize,
}

impl CrawlStats {
    pub fn from_report(report: &CrawlReport) -> CrawlStats {
        let count = |gender: Gender| {
            report
                .records
                .iter()
                .filter(|r| r.gender == gender)
                .count()
        };

        CrawlStats {
            feminino: count(Gender::Feminino),
            masculino: count(Gender::Masculino),
            failed: report.failures.len(),
            total: report.records.len() + report.failures.len(),
        }
    }
}

impl std::fmt::Display for CrawlStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\nStatistics:")?;
        writeln!(f, "  Feminino records:  {}", self.feminino)?;
        writeln!(f, "  Masculino records: {}", self.masculino)?;
        writeln!(f, "  Failed profiles:   {}", self.failed)?;
        writeln!(f, "  Total:             {}", self.total)
    }
}
