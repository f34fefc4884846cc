use crate::core::models::property::{LigandRecord, RECORD_SIZE};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::store::{LigandStore, LigandStoreBuilder};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

const PROGRESS_STRIDE: usize = 1 << 20;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Cannot open property table '{path}': {source}", path = path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Property table is not a valid gzip stream: {source}")]
    Decompression {
        #[source]
        source: io::Error,
    },

    #[error(
        "Property table is truncated: expected {expected_records} records, found only {records_read} complete records"
    )]
    Truncated {
        expected_records: usize,
        records_read: usize,
    },

    #[error(
        "Property table size mismatch: expected {expected_bytes} bytes, decompressed {actual_bytes} bytes"
    )]
    SizeMismatch {
        expected_bytes: u64,
        actual_bytes: u64,
    },

    #[error("Failed to write property table: {0}")]
    Write(#[from] io::Error),
}

/// The gzip-compressed, fixed-width ligand property table.
///
/// Decompressed, the table is exactly `RECORD_SIZE * N` bytes: one little-endian record per
/// ligand, in ordinal order, with no header or trailer.
pub struct PropertyTable;

impl PropertyTable {
    /// Decodes exactly `expected_records` records from a gzip stream.
    ///
    /// # Errors
    ///
    /// Fails without returning a partial store when the stream is not gzip, ends before
    /// `expected_records` records, or carries any bytes beyond them.
    pub fn read_from(
        reader: impl Read,
        expected_records: usize,
        reporter: &ProgressReporter,
    ) -> Result<LigandStore, LoadError> {
        let mut decoder = BufReader::new(GzDecoder::new(reader));
        let mut builder = LigandStoreBuilder::with_capacity(expected_records);
        let mut buf = [0u8; RECORD_SIZE];

        reporter.report(Progress::PhaseStart {
            name: "Decoding ligand properties",
        });
        reporter.report(Progress::TaskStart {
            total: expected_records as u64,
        });

        for ordinal in 0..expected_records {
            if let Err(e) = decoder.read_exact(&mut buf) {
                return Err(match e.kind() {
                    io::ErrorKind::UnexpectedEof => LoadError::Truncated {
                        expected_records,
                        records_read: ordinal,
                    },
                    _ => LoadError::Decompression { source: e },
                });
            }
            builder.push(LigandRecord::decode(&buf));

            if (ordinal + 1) % PROGRESS_STRIDE == 0 {
                reporter.report(Progress::TaskIncrement {
                    amount: PROGRESS_STRIDE as u64,
                });
            }
        }
        reporter.report(Progress::TaskIncrement {
            amount: (expected_records % PROGRESS_STRIDE) as u64,
        });

        let trailing = io::copy(&mut decoder, &mut io::sink())
            .map_err(|e| LoadError::Decompression { source: e })?;
        if trailing > 0 {
            let expected_bytes = (expected_records * RECORD_SIZE) as u64;
            return Err(LoadError::SizeMismatch {
                expected_bytes,
                actual_bytes: expected_bytes + trailing,
            });
        }

        reporter.report(Progress::TaskFinish);
        reporter.report(Progress::PhaseFinish);
        Ok(builder.finish())
    }

    pub fn read_from_path<P: AsRef<Path>>(
        path: P,
        expected_records: usize,
        reporter: &ProgressReporter,
    ) -> Result<LigandStore, LoadError> {
        let path = path.as_ref();
        info!("Parsing {}", path.display());
        let start = Instant::now();

        let file = File::open(path).map_err(|e| LoadError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        let store = Self::read_from(file, expected_records, reporter)?;

        info!(
            "Parsed {} ligands within {} milliseconds",
            store.len(),
            start.elapsed().as_millis()
        );
        Ok(store)
    }

    /// Encodes every record of `store` in ordinal order and gzip-compresses the result.
    pub fn write_to(store: &LigandStore, writer: impl Write) -> Result<(), LoadError> {
        let mut encoder = GzEncoder::new(writer, Compression::default());
        for record in store.records() {
            encoder.write_all(&record.encode())?;
        }
        encoder.finish()?.flush()?;
        debug!("Encoded {} ligand records", store.len());
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(store: &LigandStore, path: P) -> Result<(), LoadError> {
        let file = File::create(path)?;
        Self::write_to(store, BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::criteria::FilterCriteria;
    use crate::core::models::property::Property;
    use std::fs;
    use tempfile::tempdir;

    fn records() -> Vec<LigandRecord> {
        (0..5)
            .map(|i| LigandRecord {
                mwt: 100.0 * (i + 1) as f32,
                lgp: i as f32 - 2.0,
                ads: 0.5,
                pds: -3.25,
                hbd: i as i16,
                hba: 2 * i as i16,
                psa: 40 + i as i16,
                chg: 0,
                nrb: 3,
            })
            .collect()
    }

    fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    fn raw_table(records: &[LigandRecord]) -> Vec<u8> {
        records.iter().flat_map(|r| r.encode()).collect()
    }

    #[test]
    fn read_from_decodes_every_record_in_order() {
        let data = gzip(&raw_table(&records()));
        let store = PropertyTable::read_from(&data[..], 5, &ProgressReporter::new()).unwrap();

        assert_eq!(store.len(), 5);
        assert_eq!(store.records().collect::<Vec<_>>(), records());
    }

    #[test]
    fn read_from_rejects_truncated_table() {
        let mut raw = raw_table(&records());
        raw.truncate(RECORD_SIZE * 3 + 10);
        let data = gzip(&raw);

        let result = PropertyTable::read_from(&data[..], 5, &ProgressReporter::new());
        assert!(matches!(
            result,
            Err(LoadError::Truncated {
                expected_records: 5,
                records_read: 3
            })
        ));
    }

    #[test]
    fn read_from_rejects_trailing_bytes() {
        let mut raw = raw_table(&records());
        raw.extend_from_slice(&[0u8; 7]);
        let data = gzip(&raw);

        let result = PropertyTable::read_from(&data[..], 5, &ProgressReporter::new());
        assert!(matches!(
            result,
            Err(LoadError::SizeMismatch {
                expected_bytes: 130,
                actual_bytes: 137
            })
        ));
    }

    #[test]
    fn read_from_rejects_fewer_expected_records_than_present() {
        let data = gzip(&raw_table(&records()));
        let result = PropertyTable::read_from(&data[..], 4, &ProgressReporter::new());
        assert!(matches!(result, Err(LoadError::SizeMismatch { .. })));
    }

    #[test]
    fn read_from_rejects_data_that_is_not_gzip() {
        let raw = raw_table(&records());
        let result = PropertyTable::read_from(&raw[..], 5, &ProgressReporter::new());
        assert!(matches!(result, Err(LoadError::Decompression { .. })));
    }

    #[test]
    fn read_from_path_fails_for_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.bin.gz");
        let result = PropertyTable::read_from_path(&path, 1, &ProgressReporter::new());
        assert!(matches!(result, Err(LoadError::Open { .. })));
    }

    #[test]
    fn written_table_loads_back_with_identical_scan_results() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("16_prop.bin.gz");
        let original = LigandStore::from_records(records());

        PropertyTable::write_to_path(&original, &path).unwrap();
        let loaded = PropertyTable::read_from_path(&path, 5, &ProgressReporter::new()).unwrap();

        let criteria = FilterCriteria::unbounded()
            .with_bounds(Property::MolecularWeight, 200.0, 400.0)
            .unwrap();
        assert_eq!(loaded.scan(&criteria), original.scan(&criteria));
        assert_eq!(loaded.scan(&criteria), 3);
        assert!(fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn read_from_reports_progress_through_the_reporter() {
        use std::sync::Mutex;

        let data = gzip(&raw_table(&records()));
        let totals = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::TaskStart { total } | Progress::TaskIncrement { amount: total } = event
            {
                totals.lock().unwrap().push(total);
            }
        }));

        PropertyTable::read_from(&data[..], 5, &reporter).unwrap();
        drop(reporter);
        assert_eq!(totals.into_inner().unwrap(), vec![5, 5]);
    }
}
