use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dates;
use crate::error::Result;

/// A professional contact, one row of `connections.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    #[serde(alias = "First Name")]
    pub first_name: String,
    #[serde(alias = "Last Name")]
    pub last_name: String,
    #[serde(default, alias = "URL")]
    pub url: String,
    #[serde(default, alias = "Email Address")]
    pub email_address: String,
    #[serde(default, alias = "Company")]
    pub company: String,
    #[serde(default, alias = "Position")]
    pub position: String,
    #[serde(alias = "Connected On")]
    pub connected_on: String,
}

/// A place lived in. A blank `end_date` means the stay is ongoing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub state: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

impl Location {
    /// Stable identifier derived from city and state, unaffected by how the
    /// label is capitalised or padded.
    pub fn key(&self) -> Uuid {
        let name = format!(
            "{}|{}",
            self.city.trim().to_lowercase(),
            self.state.trim().to_lowercase()
        );
        Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
    }

    pub fn label(&self) -> String {
        format!("{}, {}", self.city, self.state)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmploymentMilestone {
    pub company: String,
    pub position: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

/// Count of records falling in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    /// Canonical `YYYY-MM` key.
    pub month: String,
    pub year: i32,
    pub month_number: u32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionStats {
    pub total_contacts: usize,
    pub avg_monthly: f64,
    pub peak_month: String,
    pub peak_count: usize,
    pub activity_percentage: u32,
}

impl ConnectionStats {
    pub fn empty() -> Self {
        Self {
            total_contacts: 0,
            avg_monthly: 0.0,
            peak_month: String::new(),
            peak_count: 0,
            activity_percentage: 0,
        }
    }
}

/// Inclusive date range a category label stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Active filters for one query. Every criterion is optional. A blank
/// category counts as absent; the text query is matched as typed and only
/// the empty string disables it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub category: Option<String>,
    pub query: Option<String>,
}

impl FilterCriteria {
    pub fn category(&self) -> Option<&str> {
        non_blank(self.category.as_deref())
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref().filter(|query| !query.is_empty())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Field selector plus direction. `field: None` keeps input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec<F> {
    pub field: Option<F>,
    pub direction: SortDirection,
}

impl<F> Default for SortSpec<F> {
    fn default() -> Self {
        Self {
            field: None,
            direction: SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionField {
    FirstName,
    LastName,
    Company,
    Position,
    EmailAddress,
    ConnectedOn,
}

/// One page of an ordered record list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: usize,
}

impl<T> Page<T> {
    /// 1-based `(first, last)` positions shown on this page, or `None` when
    /// the page is empty.
    pub fn shown_range(&self) -> Option<(usize, usize)> {
        if self.items.is_empty() {
            return None;
        }
        let first = (self.page_number - 1) * self.page_size + 1;
        Some((first, first + self.items.len() - 1))
    }
}

/// Ordering key extracted from a record field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey<'a> {
    Text(&'a str),
    Date(NaiveDate),
}

/// Records carrying the calendar date used for bucketing and range filters.
pub trait Timestamped {
    const DATE_FIELD: &'static str;

    fn raw_date(&self) -> &str;

    fn date(&self) -> Result<NaiveDate> {
        dates::parse_date(Self::DATE_FIELD, self.raw_date())
    }
}

/// Records matched by the free-text search.
pub trait Searchable {
    fn text_fields(&self) -> Vec<&str>;
}

pub trait Sortable {
    type Field: Copy + PartialEq;

    fn sort_key(&self, field: Self::Field) -> Result<SortKey<'_>>;
}

impl Timestamped for Connection {
    const DATE_FIELD: &'static str = "connected_on";

    fn raw_date(&self) -> &str {
        &self.connected_on
    }
}

impl Searchable for Connection {
    fn text_fields(&self) -> Vec<&str> {
        vec![
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.company.as_str(),
            self.position.as_str(),
            self.email_address.as_str(),
        ]
    }
}

impl Sortable for Connection {
    type Field = ConnectionField;

    fn sort_key(&self, field: ConnectionField) -> Result<SortKey<'_>> {
        Ok(match field {
            ConnectionField::FirstName => SortKey::Text(&self.first_name),
            ConnectionField::LastName => SortKey::Text(&self.last_name),
            ConnectionField::Company => SortKey::Text(&self.company),
            ConnectionField::Position => SortKey::Text(&self.position),
            ConnectionField::EmailAddress => SortKey::Text(&self.email_address),
            ConnectionField::ConnectedOn => SortKey::Date(self.date()?),
        })
    }
}

impl Timestamped for Location {
    const DATE_FIELD: &'static str = "start_date";

    fn raw_date(&self) -> &str {
        &self.start_date
    }
}

impl Searchable for Location {
    fn text_fields(&self) -> Vec<&str> {
        vec![self.city.as_str(), self.state.as_str()]
    }
}

impl Timestamped for EmploymentMilestone {
    const DATE_FIELD: &'static str = "start_date";

    fn raw_date(&self) -> &str {
        &self.start_date
    }
}

impl Searchable for EmploymentMilestone {
    fn text_fields(&self) -> Vec<&str> {
        vec![
            self.company.as_str(),
            self.position.as_str(),
            self.city.as_str(),
            self.state.as_str(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(city: &str, state: &str) -> Location {
        Location {
            city: city.to_string(),
            state: state.to_string(),
            start_date: "2020-01-01".to_string(),
            end_date: String::new(),
            lat: None,
            lng: None,
        }
    }

    #[test]
    fn location_key_ignores_case_and_padding() {
        assert_eq!(location("Austin", "TX").key(), location(" austin ", "tx").key());
        assert_ne!(location("Portland", "OR").key(), location("Portland", "ME").key());
    }

    #[test]
    fn blank_category_is_absent_but_query_is_kept_as_typed() {
        let criteria = FilterCriteria {
            category: Some("  ".to_string()),
            query: Some(" ada ".to_string()),
            ..FilterCriteria::default()
        };
        assert_eq!(criteria.category(), None);
        assert_eq!(criteria.query(), Some(" ada "));

        let criteria = FilterCriteria {
            query: Some(String::new()),
            ..FilterCriteria::default()
        };
        assert_eq!(criteria.query(), None);
    }

    #[test]
    fn shown_range_tracks_page_position() {
        let page = Page {
            items: vec![1, 2, 3],
            page_number: 2,
            total_pages: 2,
            total_items: 23,
            page_size: 20,
        };
        assert_eq!(page.shown_range(), Some((21, 23)));

        let empty: Page<u8> = Page {
            items: Vec::new(),
            page_number: 1,
            total_pages: 1,
            total_items: 0,
            page_size: 20,
        };
        assert_eq!(empty.shown_range(), None);
    }
}
