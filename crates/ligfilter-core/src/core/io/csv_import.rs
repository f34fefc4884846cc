use crate::core::models::property::{LigandRecord, Property};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsvImportError {
    #[error("CSV parsing error for '{path}': {source}", path = path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("CSV header of '{path}' is missing property column '{column}'", path = path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
}

/// Reads ligand records from CSV with a header row naming the nine property keys.
///
/// Columns may appear in any order and extra columns (identifiers, SMILES) are ignored.
pub fn read_records(reader: impl Read, origin: &Path) -> Result<Vec<LigandRecord>, CsvImportError> {
    let csv_error = |e: csv::Error| CsvImportError::Csv {
        path: origin.to_path_buf(),
        source: e,
    };

    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = reader.headers().map_err(csv_error)?.clone();
    for property in Property::ALL {
        if !headers.iter().any(|h| h == property.key()) {
            return Err(CsvImportError::MissingColumn {
                path: origin.to_path_buf(),
                column: property.key(),
            });
        }
    }

    reader
        .deserialize::<LigandRecord>()
        .map(|row| row.map_err(csv_error))
        .collect()
}

pub fn read_records_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<LigandRecord>, CsvImportError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| CsvImportError::Csv {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    read_records(std::io::BufReader::new(file), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn read_records_accepts_any_column_order_and_extra_columns() {
        let data = "\
id,nrb,chg,psa,hba,hbd,pds,ads,lgp,mwt
ZINC01,4,0,60,3,1,-10.5,2.25,1.5,250.5
ZINC02,7,-1,95,6,2,-30,1,-0.5,410
";
        let records = read_records(data.as_bytes(), Path::new("inline.csv")).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            LigandRecord {
                mwt: 250.5,
                lgp: 1.5,
                ads: 2.25,
                pds: -10.5,
                hbd: 1,
                hba: 3,
                psa: 60,
                chg: 0,
                nrb: 4,
            }
        );
        assert_eq!(records[1].chg, -1);
    }

    #[test]
    fn read_records_reports_missing_property_column() {
        let data = "mwt,lgp,ads,pds,hbd,hba,psa,chg\n1,2,3,4,5,6,7,8\n";
        let result = read_records(data.as_bytes(), Path::new("short.csv"));
        assert!(matches!(
            result,
            Err(CsvImportError::MissingColumn { column: "nrb", .. })
        ));
    }

    #[test]
    fn read_records_rejects_fractional_integer_property() {
        let data = "mwt,lgp,ads,pds,hbd,hba,psa,chg,nrb\n300,1,0,-5,1.5,2,40,0,3\n";
        let result = read_records(data.as_bytes(), Path::new("bad.csv"));
        assert!(matches!(result, Err(CsvImportError::Csv { .. })));
    }

    #[test]
    fn read_records_from_path_reads_a_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("props.csv");
        fs::write(&path, "mwt,lgp,ads,pds,hbd,hba,psa,chg,nrb\n300,1,0,-5,1,2,40,0,3\n").unwrap();

        let records = read_records_from_path(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].psa, 40);
    }

    #[test]
    fn read_records_from_path_fails_for_missing_file() {
        let dir = tempdir().unwrap();
        let result = read_records_from_path(dir.path().join("none.csv"));
        assert!(matches!(result, Err(CsvImportError::Csv { .. })));
    }
}
