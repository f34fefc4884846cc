use crate::core::io::property_file::PropertyTable;
use crate::core::models::criteria::FilterCriteria;
use crate::engine::config::TableConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::scan::is_submittable;
use std::time::{Duration, Instant};
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct CountResult {
    pub ligands: u64,
    pub library_size: usize,
    pub scan_time: Duration,
}

impl CountResult {
    /// Whether a docking job over the matching ligands may be submitted.
    pub fn is_submittable(&self) -> bool {
        is_submittable(self.ligands)
    }
}

#[instrument(skip_all, name = "count_workflow")]
pub fn run(
    table: &TableConfig,
    criteria: &FilterCriteria,
    reporter: &ProgressReporter,
) -> Result<CountResult, EngineError> {
    let store = PropertyTable::read_from_path(&table.path, table.num_ligands, reporter)?;

    reporter.report(Progress::PhaseStart { name: "Scanning" });
    let start = Instant::now();
    let ligands = store.scan(criteria);
    let scan_time = start.elapsed();
    reporter.report(Progress::PhaseFinish);

    info!(
        "{} of {} ligands match the criteria ({} ms)",
        ligands,
        store.len(),
        scan_time.as_millis()
    );
    Ok(CountResult {
        ligands,
        library_size: store.len(),
        scan_time,
    })
}
