use crate::cli::PackArgs;
use crate::error::Result;
use ligfilter::core::io::csv_import;
use ligfilter::core::io::property_file::PropertyTable;
use ligfilter::engine::store::LigandStore;
use tracing::info;

pub async fn run(args: PackArgs) -> Result<()> {
    info!("Reading ligand properties from {:?}", &args.input);
    let records = csv_import::read_records_from_path(&args.input)?;
    let store = LigandStore::from_records(records);

    info!("Writing {} ligands to {:?}", store.len(), &args.output);
    tokio::task::block_in_place(|| PropertyTable::write_to_path(&store, &args.output))?;

    println!(
        "Packed {} ligands into {}. Serve it with --num-ligands {}.",
        store.len(),
        args.output.display(),
        store.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ligfilter::engine::progress::ProgressReporter;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn packed_csv_loads_as_a_property_table() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("ligands.csv");
        let output = dir.path().join("16_prop.bin.gz");
        fs::write(
            &input,
            "id,mwt,lgp,ads,pds,hbd,hba,psa,chg,nrb\n\
             ZINC1,250.5,1.5,-3.0,-20.0,1,4,60,0,3\n\
             ZINC2,410.0,3.2,2.0,-45.5,2,6,90,-1,7\n",
        )
        .unwrap();

        run(PackArgs {
            input,
            output: output.clone(),
        })
        .await
        .unwrap();

        let store = PropertyTable::read_from_path(&output, 2, &ProgressReporter::new()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.record(1).unwrap().chg, -1);
    }
}
