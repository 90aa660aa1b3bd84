//! Named structural lookups over a profile page.
//!
//! Extractors never spell out CSS themselves: they ask a [`DocumentQuery`] for
//! a [`Query`], and the [`Layout`] table decides which selectors answer it. A
//! change in the site markup only touches [`CAMARA_LAYOUT`].

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    /// Entries of the personal info list (name, birth date, ...).
    PersonalInfo,
    /// Cells of the monthly parliamentary quota table.
    QuotaExpenses,
    /// Cells of the monthly office budget table.
    OfficeExpenses,
    /// Benefit links of the resources section; the second one is the salary.
    Benefits,
    /// Attendance counts, plenary first, committees second.
    Attendance,
}

impl Query {
    pub const ALL: [Query; 5] = [
        Query::PersonalInfo,
        Query::QuotaExpenses,
        Query::OfficeExpenses,
        Query::Benefits,
        Query::Attendance,
    ];
}

impl Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Query::PersonalInfo => write!(f, "personal info list"),
            Query::QuotaExpenses => write!(f, "parliamentary quota table"),
            Query::OfficeExpenses => write!(f, "office budget table"),
            Query::Benefits => write!(f, "resources section"),
            Query::Attendance => write!(f, "attendance list"),
        }
    }
}

/// CSS signature of a query. `scope` is the enclosing section, searched once
/// (first match wins); `items` is matched inside it, or across the whole
/// document when there is no scope.
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub scope: Option<&'static str>,
    pub items: &'static str,
}

pub const CAMARA_LAYOUT: &[(Query, Signature)] = &[
    (
        Query::PersonalInfo,
        Signature {
            scope: Some("ul.informacoes-deputado"),
            items: "li",
        },
    ),
    (
        Query::QuotaExpenses,
        Signature {
            scope: Some("table#gastomensalcotaparlamentar"),
            items: "td",
        },
    ),
    (
        Query::OfficeExpenses,
        Signature {
            scope: Some("table#gastomensalverbagabinete"),
            items: "td",
        },
    ),
    (
        Query::Benefits,
        Signature {
            scope: Some("section#recursos-section"),
            items: "a.beneficio__info",
        },
    ),
    (
        Query::Attendance,
        Signature {
            scope: None,
            items: "dd.list-table__definition-description",
        },
    ),
];

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Invalid selector '{selector}' for {query}: {reason}")]
    InvalidSelector {
        query: Query,
        selector: &'static str,
        reason: String,
    },
    #[error("No selector mapped for {0}")]
    Unmapped(Query),
}

#[derive(Debug)]
struct Lookup {
    scope: Option<Selector>,
    items: Selector,
}

/// Compiled form of a layout table.
#[derive(Debug)]
pub struct Layout {
    lookups: HashMap<Query, Lookup>,
}

static CAMARA: LazyLock<Layout> =
    LazyLock::new(|| Layout::compile(CAMARA_LAYOUT).expect("invalid layout: camara"));

fn compile_selector(query: Query, selector: &'static str) -> Result<Selector, LayoutError> {
    Selector::parse(selector).map_err(|e| LayoutError::InvalidSelector {
        query,
        selector,
        reason: e.to_string(),
    })
}

impl Layout {
    pub fn compile(table: &[(Query, Signature)]) -> Result<Self, LayoutError> {
        let mut lookups = HashMap::new();
        for (query, signature) in table {
            let scope = signature
                .scope
                .map(|s| compile_selector(*query, s))
                .transpose()?;
            let items = compile_selector(*query, signature.items)?;
            lookups.insert(*query, Lookup { scope, items });
        }

        if let Some(missing) = Query::ALL.iter().find(|q| !lookups.contains_key(q)) {
            return Err(LayoutError::Unmapped(*missing));
        }

        Ok(Self { lookups })
    }

    /// Layout of the camara.leg.br deputy profile page.
    pub fn camara() -> &'static Layout {
        &CAMARA
    }
}

/// Read access to the sections of a profile page.
pub trait DocumentQuery {
    /// Text of every item answering `query`, in document order. `None` means
    /// the enclosing section itself is absent, which is different from a
    /// section with no items.
    fn texts(&self, query: Query) -> Option<Vec<String>>;
}

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

/// A parsed profile page bound to the layout used to read it.
pub struct ProfileDocument<'a> {
    html: Html,
    layout: &'a Layout,
}

impl ProfileDocument<'static> {
    pub fn parse(html: &str) -> Self {
        Self::with_layout(html, Layout::camara())
    }
}

impl<'a> ProfileDocument<'a> {
    pub fn with_layout(html: &str, layout: &'a Layout) -> Self {
        Self {
            html: Html::parse_document(html),
            layout,
        }
    }
}

impl DocumentQuery for ProfileDocument<'_> {
    fn texts(&self, query: Query) -> Option<Vec<String>> {
        let lookup = self.layout.lookups.get(&query)?;

        match &lookup.scope {
            Some(scope) => {
                let section = self.html.select(scope).next()?;
                Some(section.select(&lookup.items).map(elem_text).collect())
            }
            None => Some(self.html.select(&lookup.items).map(elem_text).collect()),
        }
    }
}
