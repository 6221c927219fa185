use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

mod aggregate;
mod dates;
mod error;
mod loader;
mod models;
mod query;
mod report;
mod timeline;

use loader::DataFiles;
use models::{Connection, ConnectionField, FilterCriteria, SortDirection, SortSpec};
use query::LocationIndex;

#[derive(Parser)]
#[command(name = "view-chronicle")]
#[command(about = "Personal dashboard over contacts, places lived and employment history", long_about = None)]
struct Cli {
    /// Directory holding connections.csv, locations.csv and employment_milestones.csv
    #[arg(long, global = true, env = "CHRONICLE_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FilterArgs {
    /// Earliest connection date, inclusive
    #[arg(long, value_parser = parse_cli_date)]
    start: Option<NaiveDate>,
    /// Latest connection date, inclusive
    #[arg(long, value_parser = parse_cli_date)]
    end: Option<NaiveDate>,
    /// City (or location key) whose stay bounds the connection dates
    #[arg(long)]
    location: Option<String>,
    /// Case-insensitive search over name, company, position and email
    #[arg(long)]
    query: Option<String>,
}

impl FilterArgs {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            start: self.start,
            end: self.end,
            category: self.location.clone(),
            query: self.query.clone(),
        }
    }
}

#[derive(Args)]
struct TableArgs {
    #[arg(long, value_enum, default_value_t = ConnectionField::ConnectedOn)]
    sort: ConnectionField,
    #[arg(long, value_enum, default_value_t = SortDirection::Desc)]
    direction: SortDirection,
    /// Keep file order instead of sorting
    #[arg(long)]
    unsorted: bool,
    #[arg(long, default_value_t = 1)]
    page: usize,
    #[arg(long, default_value_t = 20)]
    page_size: usize,
}

impl TableArgs {
    fn sort_spec(&self) -> SortSpec<ConnectionField> {
        SortSpec {
            field: (!self.unsorted).then_some(self.sort),
            direction: self.direction,
        }
    }
}

#[derive(Args)]
struct RangeArgs {
    #[arg(long, value_parser = parse_cli_date)]
    start: Option<NaiveDate>,
    #[arg(long, value_parser = parse_cli_date)]
    end: Option<NaiveDate>,
    #[arg(long)]
    query: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connection statistics and the monthly series
    Stats {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// One page of the contacts table
    Contacts {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        table: TableArgs,
    },
    /// Write a markdown dashboard report
    Report {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        table: TableArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Employment milestones, oldest first
    Timeline {
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Places lived, with stay lengths and map coordinates
    Places {
        #[command(flatten)]
        range: RangeArgs,
    },
}

fn parse_cli_date(raw: &str) -> Result<NaiveDate, String> {
    dates::parse_date("date", raw).map_err(|err| err.to_string())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// All connections plus the subset passing `criteria`.
fn filtered_connections(
    files: &DataFiles,
    criteria: &FilterCriteria,
    today: NaiveDate,
) -> anyhow::Result<(Vec<Connection>, Vec<Connection>)> {
    let connections = files.load_connections()?;
    let locations = match criteria.category() {
        Some(_) => files.load_locations()?,
        None => Vec::new(),
    };
    let index = LocationIndex::new(&locations, today).context("invalid locations file")?;
    let filtered = query::apply_filters(&connections, criteria, &index)?;
    Ok((connections, filtered))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let files = DataFiles::in_dir(&cli.data_dir);
    let today = Utc::now().date_naive();

    match cli.command {
        Commands::Stats { filters } => {
            let criteria = filters.criteria();
            let (_, filtered) = filtered_connections(&files, &criteria, today)?;
            let (buckets, stats) = aggregate::connection_stats(&filtered)?;

            if cli.json {
                let body = json!({ "stats": stats, "monthly": buckets });
                println!("{}", serde_json::to_string_pretty(&body)?);
                return Ok(());
            }

            for line in report::stats_lines(&stats) {
                println!("{line}");
            }
            println!();
            println!("{}", report::chart_title(&criteria));
            if buckets.is_empty() {
                println!("No connections in this window.");
            }
            for line in report::chart_lines(&buckets) {
                println!("{line}");
            }
        }
        Commands::Contacts { filters, table } => {
            let criteria = filters.criteria();
            let (all, filtered) = filtered_connections(&files, &criteria, today)?;
            let sorted = query::sort_records(&filtered, &table.sort_spec())?;
            let page = query::paginate(&sorted, table.page, table.page_size);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&page)?);
                return Ok(());
            }

            println!("Showing {} of {} contacts", filtered.len(), all.len());
            for contact in &page.items {
                println!(
                    "- {} {} ({}, {}) <{}> connected {}",
                    contact.first_name,
                    contact.last_name,
                    contact.position,
                    contact.company,
                    contact.email_address,
                    contact.connected_on
                );
            }
            let (showing, page_line) = report::page_summary(&page);
            println!("{showing}. {page_line}.");
        }
        Commands::Report {
            filters,
            table,
            out,
        } => {
            let criteria = filters.criteria();
            let (all, filtered) = filtered_connections(&files, &criteria, today)?;
            let (buckets, stats) = aggregate::connection_stats(&filtered)?;
            let sorted = query::sort_records(&filtered, &table.sort_spec())?;
            let page = query::paginate(&sorted, table.page, table.page_size);

            let report = report::build_report(&criteria, all.len(), &stats, &buckets, &page)?;
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Timeline { range } => {
            let milestones = files.load_milestones()?;
            let criteria = FilterCriteria {
                query: range.query,
                ..FilterCriteria::default()
            };
            let matching = query::apply_filters(&milestones, &criteria, &LocationIndex::new(&[], today)?)?;
            let milestones = timeline::milestones_in_range(&matching, range.start, range.end)?;
            let entries = timeline::milestone_entries(&milestones)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(());
            }

            if entries.is_empty() {
                println!("No milestones found for this window.");
            }
            for entry in &entries {
                let milestone = &entry.milestone;
                println!(
                    "- {} to {} ({}): {} at {} ({}, {})",
                    milestone.start_date,
                    entry.end_label,
                    entry.duration,
                    milestone.position,
                    milestone.company,
                    milestone.city,
                    milestone.state
                );
            }
        }
        Commands::Places { range } => {
            let locations = files.load_locations()?;
            let criteria = FilterCriteria {
                query: range.query,
                ..FilterCriteria::default()
            };
            let matching = query::apply_filters(&locations, &criteria, &LocationIndex::new(&[], today)?)?;
            let stays = timeline::stays_in_range(&matching, range.start, range.end, today)?;
            let in_window: Vec<_> = stays.iter().map(|stay| stay.location.clone()).collect();
            let points = timeline::map_points(&in_window);
            let summary = timeline::place_summary(&stays);

            if cli.json {
                let body = json!({ "stays": stays, "summary": summary, "map_points": points });
                println!("{}", serde_json::to_string_pretty(&body)?);
                return Ok(());
            }

            if stays.is_empty() {
                println!("No locations found for this window.");
            }
            for stay in &stays {
                let until = stay
                    .end
                    .map_or_else(|| "Present".to_string(), |end| end.format("%b %-d, %Y").to_string());
                println!(
                    "- {} [{}]: {} to {} ({})",
                    stay.location.label(),
                    stay.location.key(),
                    stay.start.format("%b %-d, %Y"),
                    until,
                    stay.duration
                );
            }
            println!();
            println!("Total Locations: {}", summary.total_locations);
            println!("Current Location: {}", summary.current_location);
            println!("Longest Stay: {}", summary.longest_stay);
            println!("{} of {} places have map coordinates.", points.len(), stays.len());
        }
    }

    Ok(())
}
