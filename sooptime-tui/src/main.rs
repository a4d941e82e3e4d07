//! Terminal map of recreation forest reservation openings.

mod app;
mod input;
mod ui;

use std::{
    convert::Infallible,
    fs::File,
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration as StdDuration,
};

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use sooptime_core::{
    model::{FilterState, MonthFilter, today_in_schedule_tz},
    plugin::SourceRegistry,
    ports::DatasetLocation,
    render::{EMPTY_PASS_MESSAGE, load_failed_message, to_geojson},
    service::SooptimeService,
    timestamp::parse_reference_date,
};
use sooptime_source_file as file_source;
use sooptime_source_http as http_source;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::input::Action;

#[derive(Debug, Parser)]
#[command(version, about = "Map of recreation forest reservation openings")]
struct Args {
    /// Schedule dataset: a path or an http(s) URL.
    #[arg(long, default_value = "data_2025_map.csv")]
    schedule: DatasetLocation,

    /// Coordinates dataset: a path or an http(s) URL.
    #[arg(long, default_value = "facilities.csv")]
    coords: DatasetLocation,

    /// Initial reference date (YYYY-MM-DD), defaults to today in Asia/Seoul.
    #[arg(short = 'd', long = "date", value_parser = parse_reference_date)]
    date: Option<NaiveDate>,

    /// Start with the today-only filter enabled.
    #[arg(long)]
    today_only: bool,

    /// Initial month, 1-12, read from the leading digits; 0 or anything else
    /// shows all months.
    #[arg(short, long, default_value = "0", value_parser = parse_month)]
    month: MonthFilter,

    /// Write the current pass as GeoJSON to this path and exit.
    #[arg(long)]
    geojson: Option<PathBuf>,

    /// Log file; the filter is read from RUST_LOG.
    #[arg(long, default_value = "sooptime.log")]
    log_file: PathBuf,
}

impl Args {
    fn filter(&self) -> FilterState {
        FilterState {
            month: self.month,
            today_only: self.today_only,
            reference: self.date.unwrap_or_else(today_in_schedule_tz),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    // HTTP + service setup
    let client = Client::builder().user_agent("sooptime/0.1").build()?;

    let plugins = vec![http_source::plugin(client), file_source::plugin()];
    let registry = Arc::new(SourceRegistry::new(plugins));
    let service = Arc::new(SooptimeService::new(registry));

    let filter = args.filter();
    info!(?filter, schedule = %args.schedule, coords = %args.coords, "Starting sooptime");

    if let Some(path) = &args.geojson {
        if let Some(notice) = export_geojson(&service, &args, filter, path).await? {
            report(notice);
        }
        return Ok(());
    }

    // App state
    let app = App::new(service, args.schedule, args.coords, filter);

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    app.is_loading = true;
    terminal.draw(|frame| ui::draw(frame, &app))?;

    let loaded = app
        .service
        .load_datasets(&app.schedule_location, &app.coords_location)
        .await;

    app.is_loading = false;
    match loaded {
        Ok(datasets) => app.datasets_loaded(datasets),
        Err(err) => {
            warn!(%err, "Failed to load datasets");
            app.load_failed(&err);
        }
    }

    loop {
        // Draw current UI
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            match input::handle_key_event(key, &mut app) {
                Action::Quit => break,
                Action::None => {}
            }
        }
    }

    Ok(())
}

/// Write the pass for `filter` to `path`, returning the advisory to show
/// when there was nothing to export.
async fn export_geojson(
    service: &SooptimeService,
    args: &Args,
    filter: FilterState,
    path: &Path,
) -> Result<Option<&'static str>> {
    let datasets = service
        .load_datasets(&args.schedule, &args.coords)
        .await
        .map_err(|err| anyhow!(load_failed_message(&err)))?;
    let pass = service.render(&datasets, &filter);

    tokio::fs::write(path, to_geojson(&pass)?).await?;
    info!(path = %path.display(), features = pass.len(), "Wrote GeoJSON");

    if pass.is_empty() {
        warn!(skipped = ?pass.skipped, "{EMPTY_PASS_MESSAGE}");
        return Ok(Some(EMPTY_PASS_MESSAGE));
    }
    Ok(None)
}

#[expect(
    clippy::print_stderr,
    reason = "export mode has no screen, so advisories go to stderr"
)]
fn report(notice: &str) {
    eprintln!("{notice}");
}

fn init_logging(path: &Path) -> Result<()> {
    let log_file = File::create(path)?;
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_target(true)
        .init();
    Ok(())
}

fn parse_month(raw: &str) -> Result<MonthFilter, Infallible> {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits = unsigned
        .find(|character: char| !character.is_ascii_digit())
        .map_or(unsigned, |end| unsigned.get(..end).unwrap_or_default());
    Ok(digits
        .parse::<u32>()
        .map_or(MonthFilter::All, MonthFilter::from_index))
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use sooptime_core::render::LOAD_FAILED_MESSAGE;

    use super::*;

    #[test]
    fn month_argument_is_lenient() {
        assert_eq!(parse_month("3"), Ok(MonthFilter::Month(3)));
        assert_eq!(parse_month("0"), Ok(MonthFilter::All));
        assert_eq!(parse_month("13"), Ok(MonthFilter::All));
        assert_eq!(parse_month("march"), Ok(MonthFilter::All));
    }

    #[test]
    fn month_argument_reads_leading_digits() {
        assert_eq!(parse_month("3abc"), Ok(MonthFilter::Month(3)));
        assert_eq!(parse_month(" 12월"), Ok(MonthFilter::Month(12)));
        assert_eq!(parse_month("+7"), Ok(MonthFilter::Month(7)));
        assert_eq!(parse_month("-3"), Ok(MonthFilter::All));
        assert_eq!(parse_month("13th"), Ok(MonthFilter::All));
    }

    #[test]
    fn arguments_build_the_initial_filter() {
        let args = Args::parse_from([
            "sooptime",
            "--schedule",
            "https://example.com/schedule.csv",
            "-d",
            "2025-06-15",
            "--today-only",
            "-m",
            "6",
        ]);

        assert_eq!(args.schedule.kind(), sooptime_core::SourceKind::Http);
        assert_eq!(args.coords, DatasetLocation::parse("facilities.csv"));

        let filter = args.filter();
        assert_eq!(filter.month, MonthFilter::Month(6));
        assert!(filter.today_only);
        assert_eq!(filter.reference, NaiveDate::from_ymd_opt(2025, 6, 15).expect("date"));
    }

    #[test]
    fn invalid_date_is_rejected() {
        assert!(Args::try_parse_from(["sooptime", "-d", "2025-13-01"]).is_err());
    }

    fn file_service() -> SooptimeService {
        SooptimeService::new(Arc::new(SourceRegistry::new(vec![file_source::plugin()])))
    }

    fn export_args(dir: &Path) -> Args {
        Args::parse_from([
            OsStr::new("sooptime"),
            OsStr::new("--schedule"),
            dir.join("schedule.csv").as_os_str(),
            OsStr::new("--coords"),
            dir.join("coords.csv").as_os_str(),
        ])
    }

    #[tokio::test]
    async fn export_reports_load_failures_with_the_user_message() {
        let dir = tempfile::tempdir().expect("temp dir");
        let args = export_args(dir.path());
        let out = dir.path().join("out.geojson");

        let err = export_geojson(&file_service(), &args, args.filter(), &out)
            .await
            .expect_err("coordinates file is missing");

        assert!(
            err.to_string().starts_with(LOAD_FAILED_MESSAGE),
            "unexpected message: {err}"
        );
        assert!(!out.exists(), "nothing is written on failure");
    }

    #[tokio::test]
    async fn export_of_an_empty_pass_returns_the_advisory() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("schedule.csv"), "휴양림명,1월 일반예약 오픈일시(복수)\n")
            .expect("write schedule");
        std::fs::write(dir.path().join("coords.csv"), "휴양림명,위도,경도\n").expect("write coords");
        let args = export_args(dir.path());
        let out = dir.path().join("out.geojson");

        let notice = export_geojson(&file_service(), &args, args.filter(), &out)
            .await
            .expect("header-only datasets load");

        assert_eq!(notice, Some(EMPTY_PASS_MESSAGE));
        let written = std::fs::read_to_string(&out).expect("geojson written");
        assert!(written.contains("\"FeatureCollection\""), "{written}");
    }
}
