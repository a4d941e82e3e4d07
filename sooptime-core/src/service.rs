//! High-level service facade: dataset loading and render passes.

use std::sync::Arc;

use tracing::{debug, info};

use crate::classify::classify_entry;
use crate::join::{CoordinateLookup, join_schedules};
use crate::model::{FilterState, RawRow, RenderPass};
use crate::plugin::SourceRegistry;
use crate::ports::{DatasetLocation, PortError};
use crate::select::select_entry;

/// Both datasets, loaded and ready for render passes.
///
/// Read-only after construction.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    /// Schedule rows in file order.
    pub schedules: Vec<RawRow>,
    /// Coordinate lookup built from the coordinates dataset.
    pub coordinates: CoordinateLookup,
}

impl Datasets {
    /// Index the coordinates dataset and keep the schedule rows as they are.
    #[must_use]
    pub fn new(schedules: Vec<RawRow>, coordinate_rows: &[RawRow]) -> Self {
        Self {
            schedules,
            coordinates: CoordinateLookup::build(coordinate_rows),
        }
    }
}

/// Public entry point for loading datasets and classifying facilities.
pub struct SooptimeService {
    registry: Arc<SourceRegistry>,
}

impl SooptimeService {
    /// Create a new service bound to the provided registry.
    #[must_use]
    pub fn new(registry: Arc<SourceRegistry>) -> Self {
        Self { registry }
    }

    /// Load one dataset through the source registered for its location.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if no source handles the location or loading fails.
    pub async fn load_dataset(&self, location: &DatasetLocation) -> Result<Vec<RawRow>, PortError> {
        let plugin = self.registry.resolve(location)?;
        debug!(source = %plugin.meta.name, kind = %plugin.meta.kind, %location, "Loading dataset");
        plugin.dataset_port.load(location).await
    }

    /// Load the schedule and coordinates datasets concurrently.
    ///
    /// Both loads must succeed; the first failure is returned and no partial
    /// result is kept.
    ///
    /// # Errors
    ///
    /// Returns the [`PortError`] of whichever load failed.
    pub async fn load_datasets(
        &self,
        schedule: &DatasetLocation,
        coordinates: &DatasetLocation,
    ) -> Result<Datasets, PortError> {
        let (schedule_rows, coordinate_rows) = futures::try_join!(
            self.load_dataset(schedule),
            self.load_dataset(coordinates)
        )?;

        let datasets = Datasets::new(schedule_rows, &coordinate_rows);
        info!(
            schedules = datasets.schedules.len(),
            coordinate_rows = coordinate_rows.len(),
            facilities = datasets.coordinates.len(),
            "Datasets loaded"
        );
        Ok(datasets)
    }

    /// Run a render pass over loaded datasets.
    #[must_use]
    pub fn render(&self, datasets: &Datasets, filter: &FilterState) -> RenderPass {
        render_pass(datasets, filter)
    }
}

/// Join, select, and classify every schedule row under `filter`.
///
/// Pure and deterministic: the same datasets and filter always produce the
/// same pass. Records keep schedule row order.
#[must_use]
pub fn render_pass(datasets: &Datasets, filter: &FilterState) -> RenderPass {
    let (joined, skipped) = join_schedules(&datasets.schedules, &datasets.coordinates);
    let mut pass = RenderPass {
        records: Vec::with_capacity(joined.len()),
        skipped,
    };

    for row in &joined {
        match select_entry(row, filter.month).and_then(|entry| classify_entry(entry, filter)) {
            Ok(record) => pass.records.push(record),
            Err(reason) => pass.skipped.record(reason),
        }
    }

    debug!(
        shown = pass.len(),
        skipped = ?pass.skipped,
        month = filter.month.index(),
        today_only = filter.today_only,
        reference = %filter.reference,
        "Render pass finished"
    );
    pass
}
