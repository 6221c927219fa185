use std::fmt::Write;

use crate::aggregate;
use crate::error::Result;
use crate::models::{Connection, ConnectionStats, FilterCriteria, MonthBucket, Page, Timestamped};

const BAR_WIDTH: usize = 40;

/// Chart heading reflecting the active filters. Date bounds take precedence
/// over the location.
pub fn chart_title(criteria: &FilterCriteria) -> String {
    let month = |date: chrono::NaiveDate| date.format("%b %Y").to_string();

    let scope = match (criteria.start, criteria.end) {
        (Some(start), Some(end)) => format!("{} - {}", month(start), month(end)),
        (Some(start), None) => format!("From {}", month(start)),
        (None, Some(end)) => format!("Until {}", month(end)),
        (None, None) => match criteria.category() {
            Some(location) => location.to_string(),
            None => "5 Years".to_string(),
        },
    };
    format!("Contacts Added by Month ({scope})")
}

/// "Showing X to Y of Z results" and "Page N of M".
pub fn page_summary<T>(page: &Page<T>) -> (String, String) {
    let showing = match page.shown_range() {
        Some((first, last)) => format!("Showing {first} to {last} of {} results", page.total_items),
        None => "No results".to_string(),
    };
    (showing, format!("Page {} of {}", page.page_number, page.total_pages))
}

pub fn stats_lines(stats: &ConnectionStats) -> Vec<String> {
    vec![
        format!("Total Contacts: {}", stats.total_contacts),
        format!("Avg / Month: {}", stats.avg_monthly),
        format!("Peak Month: {} ({} connections)", stats.peak_month, stats.peak_count),
        format!("High-Activity Months: {}%", stats.activity_percentage),
    ]
}

pub fn chart_lines(buckets: &[MonthBucket]) -> Vec<String> {
    let max = buckets.iter().map(|bucket| bucket.count).max().unwrap_or(0);
    buckets
        .iter()
        .map(|bucket| {
            let width = if max == 0 { 0 } else { bucket.count * BAR_WIDTH / max };
            format!(
                "{} {:>5} {}",
                aggregate::short_month_label(bucket),
                bucket.count,
                "#".repeat(width.max(1))
            )
        })
        .collect()
}

pub fn build_report(
    criteria: &FilterCriteria,
    total_contacts: usize,
    stats: &ConnectionStats,
    buckets: &[MonthBucket],
    page: &Page<Connection>,
) -> Result<String> {
    let mut output = String::new();

    let _ = writeln!(output, "# View Chronicle");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Connections Dashboard");
    for line in stats_lines(stats) {
        let _ = writeln!(output, "- {line}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## {}", chart_title(criteria));
    if buckets.is_empty() {
        let _ = writeln!(output, "No connections in this window.");
    } else {
        let _ = writeln!(output, "```");
        for line in chart_lines(buckets) {
            let _ = writeln!(output, "{line}");
        }
        let _ = writeln!(output, "```");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Contacts");
    let _ = writeln!(
        output,
        "Showing {} of {} contacts",
        page.total_items, total_contacts
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "| Name | Company | Position | Email | Connected On | LinkedIn |");
    let _ = writeln!(output, "|------|---------|----------|-------|--------------|----------|");
    for contact in &page.items {
        let _ = writeln!(
            output,
            "| {} {} | {} | {} | {} | {} | {} |",
            contact.first_name,
            contact.last_name,
            contact.company,
            contact.position,
            contact.email_address,
            contact.date()?.format("%b %-d, %Y"),
            contact.url
        );
    }

    let (showing, page_line) = page_summary(page);
    let _ = writeln!(output);
    let _ = writeln!(output, "{showing}. {page_line}.");

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::paginate;
    use chrono::NaiveDate;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn contact(first_name: &str, connected_on: &str) -> Connection {
        Connection {
            first_name: first_name.to_string(),
            last_name: "Tester".to_string(),
            url: "https://example.com/in/tester".to_string(),
            email_address: String::new(),
            company: "Acme".to_string(),
            position: "Engineer".to_string(),
            connected_on: connected_on.to_string(),
        }
    }

    #[test]
    fn chart_title_follows_filters() {
        let mut criteria = FilterCriteria::default();
        assert_eq!(chart_title(&criteria), "Contacts Added by Month (5 Years)");

        criteria.category = Some("Denver".to_string());
        assert_eq!(chart_title(&criteria), "Contacts Added by Month (Denver)");

        criteria.start = Some(ymd(2021, 1, 1));
        assert_eq!(chart_title(&criteria), "Contacts Added by Month (From Jan 2021)");

        criteria.end = Some(ymd(2021, 3, 31));
        assert_eq!(
            chart_title(&criteria),
            "Contacts Added by Month (Jan 2021 - Mar 2021)"
        );

        criteria.start = None;
        assert_eq!(chart_title(&criteria), "Contacts Added by Month (Until Mar 2021)");
    }

    #[test]
    fn page_summary_handles_empty_pages() {
        let page = paginate::<Connection>(&[], 1, 20);
        let (showing, page_line) = page_summary(&page);
        assert_eq!(showing, "No results");
        assert_eq!(page_line, "Page 1 of 1");
    }

    #[test]
    fn chart_bars_scale_to_peak() {
        let buckets = vec![
            MonthBucket {
                month: "2021-01".to_string(),
                year: 2021,
                month_number: 1,
                count: 4,
            },
            MonthBucket {
                month: "2021-02".to_string(),
                year: 2021,
                month_number: 2,
                count: 1,
            },
        ];
        let lines = chart_lines(&buckets);
        assert!(lines[0].starts_with("01-21"));
        assert!(lines[0].ends_with(&"#".repeat(BAR_WIDTH)));
        assert!(lines[1].ends_with(&format!(" {}", "#".repeat(BAR_WIDTH / 4))));
    }

    #[test]
    fn report_contains_dashboard_sections() {
        let contacts = vec![
            contact("Ada", "2021-01-15"),
            contact("Bob", "2021-01-20"),
            contact("Cy", "2021-03-01"),
        ];
        let (buckets, stats) = aggregate::connection_stats(&contacts).unwrap();
        let page = paginate(&contacts, 1, 20);

        let report = build_report(&FilterCriteria::default(), 3, &stats, &buckets, &page).unwrap();

        assert!(report.contains("- Avg / Month: 1.5"));
        assert!(report.contains("- Peak Month: 2021-01 (2 connections)"));
        assert!(report.contains("- High-Activity Months: 100%"));
        assert!(report.contains("## Contacts Added by Month (5 Years)"));
        assert!(report.contains("| Ada Tester | Acme | Engineer |  | Jan 15, 2021 |"));
        assert!(report.contains("Showing 1 to 3 of 3 results. Page 1 of 1."));
    }
}
