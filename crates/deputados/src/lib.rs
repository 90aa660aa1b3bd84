mod parser;
pub mod expenses;
pub mod feed;
pub mod normalize;
pub mod query;
pub mod scraper;
pub mod sources;
pub mod types;
pub mod utils;

pub use parser::{
    ParseError, extract_attendance, extract_expenses, extract_personal_info, extract_salary,
    parse_profile, parse_profile_document,
};
pub use scraper::{ScraperError, WebScraper};
