use crate::cli::CountArgs;
use crate::config::{CliOverrides, build_config};
use crate::error::Result;
use crate::ui::{CliProgressHandler, UiEvent};
use ligfilter::core::models::criteria::{DOCKING_DOMAIN, FilterCriteria};
use ligfilter::engine::progress::ProgressReporter;
use ligfilter::workflows;
use tokio::sync::mpsc;
use tracing::info;

pub fn criteria_from_args(args: &CountArgs) -> Result<FilterCriteria> {
    let mut criteria = if args.strict {
        DOCKING_DOMAIN
    } else {
        FilterCriteria::unbounded()
    };
    for (property, spec) in args.ranges.given() {
        let (lb, ub) = spec.resolve(criteria.bounds(property));
        criteria.set_bounds(property, lb, ub)?;
    }
    if args.strict {
        criteria.check_within(&DOCKING_DOMAIN)?;
    }
    Ok(criteria)
}

pub async fn run(args: CountArgs, ui_sender: mpsc::Sender<UiEvent>) -> Result<()> {
    let criteria = criteria_from_args(&args)?;
    let app = build_config(&args.config, &CliOverrides::default())?;

    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Invoking the count workflow...");
    let result = tokio::task::block_in_place(|| {
        workflows::count::run(&app.service.table, &criteria, &reporter)
    })?;

    println!("{}", result.ligands);
    if !result.is_submittable() {
        println!("No ligand matches these criteria; a docking job cannot be submitted.");
    }
    Ok(())
}
