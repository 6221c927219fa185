use chrono::NaiveDate;
use serde::Serialize;

use crate::dates;
use crate::error::Result;
use crate::models::{EmploymentMilestone, Location, Timestamped};
use crate::query::in_date_range;

const DAYS_PER_MONTH: f64 = 30.44;
const NOT_AVAILABLE: &str = "N/A";

/// A lived location with its resolved stay length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stay {
    pub location: Location,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
    /// Days from `start` to `end`, or to today for an ongoing stay.
    pub days: i64,
    pub duration: String,
}

impl Stay {
    pub fn is_current(&self) -> bool {
        self.end.is_none()
    }
}

/// Summary cards shown under the places table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceSummary {
    pub total_locations: usize,
    pub current_location: String,
    pub longest_stay: String,
}

/// One employment row with its rendered end date and duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneEntry {
    pub milestone: EmploymentMilestone,
    pub end_label: String,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub city: String,
    pub state: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

/// Records whose start date lies in `[start, end]`, oldest first.
pub fn in_range<T: Timestamped + Clone>(
    records: &[T],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<T>> {
    let mut dated = Vec::new();
    for record in records {
        let date = record.date()?;
        if in_date_range(date, start, end) {
            dated.push((date, record.clone()));
        }
    }
    dated.sort_by_key(|(date, _)| *date);
    Ok(dated.into_iter().map(|(_, record)| record).collect())
}

pub fn milestones_in_range(
    milestones: &[EmploymentMilestone],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<EmploymentMilestone>> {
    in_range(milestones, start, end)
}

/// Locations in range with their stay lengths. Ongoing stays are measured up
/// to `today`.
pub fn stays_in_range(
    locations: &[Location],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<Vec<Stay>> {
    in_range(locations, start, end)?
        .into_iter()
        .map(|location| -> Result<Stay> {
            let stay_start = location.date()?;
            let stay_end = dates::parse_optional_date("end_date", &location.end_date)?;
            let until = stay_end.unwrap_or(today);
            Ok(Stay {
                days: (until - stay_start).num_days(),
                duration: format_duration(stay_start, until),
                start: stay_start,
                end: stay_end,
                location,
            })
        })
        .collect()
}

/// Location count, the first ongoing stay, and the city lived in longest.
/// Ties on length keep the earlier stay.
pub fn place_summary(stays: &[Stay]) -> PlaceSummary {
    let current_location = stays
        .iter()
        .find(|stay| stay.is_current())
        .map_or_else(|| NOT_AVAILABLE.to_string(), |stay| stay.location.city.clone());

    let mut longest: Option<&Stay> = None;
    for stay in stays {
        if longest.map_or(true, |best| stay.days > best.days) {
            longest = Some(stay);
        }
    }

    PlaceSummary {
        total_locations: stays.len(),
        current_location,
        longest_stay: longest.map_or_else(|| NOT_AVAILABLE.to_string(), |stay| stay.location.city.clone()),
    }
}

/// Employment duration in whole months, or "Ongoing" without an end date.
pub fn milestone_duration(milestone: &EmploymentMilestone) -> Result<String> {
    let start = milestone.date()?;
    match dates::parse_optional_date("end_date", &milestone.end_date)? {
        Some(end) => Ok(format!("{} months", months_between(start, end))),
        None => Ok("Ongoing".to_string()),
    }
}

pub fn milestone_entries(milestones: &[EmploymentMilestone]) -> Result<Vec<MilestoneEntry>> {
    milestones
        .iter()
        .map(|milestone| -> Result<MilestoneEntry> {
            let end_label = match dates::parse_optional_date("end_date", &milestone.end_date)? {
                Some(end) => end.format("%b %Y").to_string(),
                None => "Present".to_string(),
            };
            Ok(MilestoneEntry {
                duration: milestone_duration(milestone)?,
                end_label,
                milestone: milestone.clone(),
            })
        })
        .collect()
}

/// Locations that carry both coordinates.
pub fn map_points(locations: &[Location]) -> Vec<MapPoint> {
    locations
        .iter()
        .filter_map(|location| {
            let (lat, lng) = (location.lat?, location.lng?);
            Some(MapPoint {
                city: location.city.clone(),
                state: location.state.clone(),
                start_date: location.start_date.clone(),
                end_date: Some(location.end_date.clone()).filter(|end| !end.trim().is_empty()),
                lat,
                lng,
            })
        })
        .collect()
}

/// Human stay length, e.g. "2 years 3 months", using 30.44-day months.
pub fn format_duration(start: NaiveDate, end: NaiveDate) -> String {
    let months = months_between(start, end);
    let (years, months) = (months / 12, months % 12);

    match (years, months) {
        (0, months) => plural(months, "month"),
        (years, 0) => plural(years, "year"),
        (years, months) => format!("{} {}", plural(years, "year"), plural(months, "month")),
    }
}

/// Whole 30.44-day months from `start` to `end`; never negative.
fn months_between(start: NaiveDate, end: NaiveDate) -> i64 {
    let days = (end - start).num_days() as f64;
    ((days / DAYS_PER_MONTH).round() as i64).max(0)
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn milestone(company: &str, start_date: &str) -> EmploymentMilestone {
        EmploymentMilestone {
            company: company.to_string(),
            position: "Analyst".to_string(),
            city: "Austin".to_string(),
            state: "TX".to_string(),
            start_date: start_date.to_string(),
            end_date: String::new(),
        }
    }

    fn location(city: &str, start: &str, end: &str, coords: Option<(f64, f64)>) -> Location {
        Location {
            city: city.to_string(),
            state: "CO".to_string(),
            start_date: start.to_string(),
            end_date: end.to_string(),
            lat: coords.map(|c| c.0),
            lng: coords.map(|c| c.1),
        }
    }

    #[test]
    fn milestones_filter_by_start_and_sort_oldest_first() {
        let milestones = vec![
            milestone("Later", "2022-05-01"),
            milestone("Earliest", "2015-09-01"),
            milestone("Middle", "2019-01-15"),
        ];
        let all = milestones_in_range(&milestones, None, None).unwrap();
        let order: Vec<&str> = all.iter().map(|m| m.company.as_str()).collect();
        assert_eq!(order, vec!["Earliest", "Middle", "Later"]);

        let window = milestones_in_range(&milestones, Some(ymd(2016, 1, 1)), Some(ymd(2019, 1, 15))).unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].company, "Middle");
    }

    #[test]
    fn stays_use_today_for_ongoing_locations() {
        let locations = vec![
            location("Denver", "2021-01-01", "", None),
            location("Boulder", "2018-01-01", "2020-12-31", None),
        ];
        let stays = stays_in_range(&locations, None, None, ymd(2023, 1, 1)).unwrap();
        assert_eq!(stays[0].location.city, "Boulder");
        assert_eq!(stays[0].duration, "3 years");
        assert_eq!(stays[1].location.city, "Denver");
        assert_eq!(stays[1].end, None);
        assert_eq!(stays[1].duration, "2 years");
    }

    #[test]
    fn duration_labels() {
        assert_eq!(format_duration(ymd(2020, 1, 1), ymd(2020, 2, 1)), "1 month");
        assert_eq!(format_duration(ymd(2020, 1, 1), ymd(2020, 1, 3)), "0 months");
        assert_eq!(format_duration(ymd(2020, 1, 1), ymd(2021, 3, 1)), "1 year 2 months");
        assert_eq!(format_duration(ymd(2018, 1, 1), ymd(2021, 1, 1)), "3 years");
    }

    #[test]
    fn reversed_range_reads_as_zero() {
        assert_eq!(format_duration(ymd(2021, 3, 1), ymd(2020, 1, 1)), "0 months");
        let mut backwards = milestone("Typo Inc", "2021-06-01");
        backwards.end_date = "2021-01-01".to_string();
        assert_eq!(milestone_duration(&backwards).unwrap(), "0 months");
    }

    #[test]
    fn milestone_durations_count_months_or_report_ongoing() {
        let mut ended = milestone("Acme", "2019-02-01");
        ended.end_date = "2020-12-15".to_string();
        assert_eq!(milestone_duration(&ended).unwrap(), "22 months");

        let ongoing = milestone("NASA", "2022-07-18");
        assert_eq!(milestone_duration(&ongoing).unwrap(), "Ongoing");

        let entries = milestone_entries(&[ended, ongoing]).unwrap();
        assert_eq!(entries[0].end_label, "Dec 2020");
        assert_eq!(entries[0].duration, "22 months");
        assert_eq!(entries[1].end_label, "Present");
        assert_eq!(entries[1].duration, "Ongoing");
    }

    #[test]
    fn place_summary_of_nothing_is_not_available() {
        assert_eq!(
            place_summary(&[]),
            PlaceSummary {
                total_locations: 0,
                current_location: "N/A".to_string(),
                longest_stay: "N/A".to_string(),
            }
        );
    }

    #[test]
    fn place_summary_without_current_location() {
        let locations = vec![
            location("Boulder", "2018-01-01", "2020-12-31", None),
            location("Austin", "2021-01-01", "2021-06-30", None),
        ];
        let stays = stays_in_range(&locations, None, None, ymd(2024, 1, 1)).unwrap();
        let summary = place_summary(&stays);
        assert_eq!(summary.total_locations, 2);
        assert_eq!(summary.current_location, "N/A");
        assert_eq!(summary.longest_stay, "Boulder");
    }

    #[test]
    fn ongoing_stay_can_be_the_longest() {
        let locations = vec![
            location("Boulder", "2018-01-01", "2019-12-31", None),
            location("Denver", "2020-01-01", "", None),
        ];
        let stays = stays_in_range(&locations, None, None, ymd(2025, 1, 1)).unwrap();
        let summary = place_summary(&stays);
        assert_eq!(summary.current_location, "Denver");
        assert_eq!(summary.longest_stay, "Denver");
    }

    #[test]
    fn map_points_need_both_coordinates() {
        let locations = vec![
            location("Denver", "2021-01-01", "", Some((39.74, -104.99))),
            location("Nowhere", "2020-01-01", "2020-06-01", None),
            location("Boulder", "2018-01-01", "2020-12-31", Some((40.01, -105.27))),
        ];
        let points = map_points(&locations);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].city, "Denver");
        assert_eq!(points[0].end_date, None);
        assert_eq!(points[1].end_date.as_deref(), Some("2020-12-31"));
    }
}
