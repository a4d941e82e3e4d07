use std::sync::Arc;

use sooptime_core::{
    model::{ClassifiedRecord, DATE_FORMAT, FilterState, MonthFilter, RenderPass},
    ports::{DatasetLocation, PortError},
    render::{EMPTY_PASS_MESSAGE, load_failed_message},
    service::{Datasets, SooptimeService},
    timestamp::parse_reference_date,
};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Overview,
    Detail,
    DateInput,
}

pub(crate) struct App {
    pub service: Arc<SooptimeService>,
    pub schedule_location: DatasetLocation,
    pub coords_location: DatasetLocation,

    pub screen: Screen,
    pub filter: FilterState,
    pub datasets: Option<Datasets>,
    pub pass: RenderPass,
    pub list_index: usize,

    pub date_input: String,

    pub is_loading: bool,
    pub load_error: Option<String>,
    pub error_message: Option<String>,
}

impl App {
    pub(crate) fn new(
        service: Arc<SooptimeService>,
        schedule_location: DatasetLocation,
        coords_location: DatasetLocation,
        filter: FilterState,
    ) -> Self {
        Self {
            service,
            schedule_location,
            coords_location,
            screen: Screen::Overview,
            filter,
            datasets: None,
            pass: RenderPass::default(),
            list_index: 0,
            date_input: String::new(),
            is_loading: false,
            load_error: None,
            error_message: None,
        }
    }

    pub(crate) fn datasets_loaded(&mut self, datasets: Datasets) {
        self.datasets = Some(datasets);
        self.load_error = None;
        self.rerender();
    }

    pub(crate) fn load_failed(&mut self, err: &PortError) {
        self.datasets = None;
        self.load_error = Some(load_failed_message(err));
        self.rerender();
    }

    /// Rebuild the whole pass from the loaded datasets and current filters.
    pub(crate) fn rerender(&mut self) {
        self.pass = match &self.datasets {
            Some(datasets) => self.service.render(datasets, &self.filter),
            None => RenderPass::default(),
        };
        if self.list_index >= self.pass.len() {
            self.list_index = self.pass.len().saturating_sub(1);
        }
        if self.pass.is_empty() && self.screen == Screen::Detail {
            self.screen = Screen::Overview;
        }
    }

    pub(crate) fn next_month(&mut self) {
        self.filter.month = self.filter.month.next();
        self.rerender();
    }

    pub(crate) fn previous_month(&mut self) {
        self.filter.month = self.filter.month.previous();
        self.rerender();
    }

    pub(crate) fn all_months(&mut self) {
        self.filter.month = MonthFilter::All;
        self.rerender();
    }

    pub(crate) fn toggle_today_only(&mut self) {
        self.filter.today_only = !self.filter.today_only;
        self.rerender();
    }

    pub(crate) fn begin_date_input(&mut self) {
        self.date_input = self.filter.reference.format(DATE_FORMAT).to_string();
        self.error_message = None;
        self.screen = Screen::DateInput;
    }

    pub(crate) fn cancel_date_input(&mut self) {
        self.date_input.clear();
        self.screen = Screen::Overview;
    }

    pub(crate) fn apply_date_input(&mut self) {
        match parse_reference_date(&self.date_input) {
            Ok(reference) => {
                self.filter.reference = reference;
                self.error_message = None;
                self.date_input.clear();
                self.screen = Screen::Overview;
                self.rerender();
            }
            Err(err) => {
                self.error_message = Some(format!("Invalid date (YYYY-MM-DD): {err}"));
                warn!(input = %self.date_input, %err, "Ignoring reference date");
            }
        }
    }

    pub(crate) fn open_detail(&mut self) {
        if self.selected_record().is_some() {
            self.screen = Screen::Detail;
        }
    }

    pub(crate) fn selected_record(&self) -> Option<&ClassifiedRecord> {
        self.pass.records.get(self.list_index)
    }

    /// Message replacing the map contents, if any.
    pub(crate) fn notice(&self) -> Option<&str> {
        if let Some(err) = &self.load_error {
            return Some(err);
        }
        if !self.is_loading && self.datasets.is_some() && self.pass.is_empty() {
            return Some(EMPTY_PASS_MESSAGE);
        }
        None
    }
}
