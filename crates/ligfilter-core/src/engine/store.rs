use super::scan;
use crate::core::models::criteria::FilterCriteria;
use crate::core::models::property::LigandRecord;

/// Columnar, immutable store of ligand properties.
///
/// Each property lives in its own natively typed column and every column has the same
/// length, so ordinal `i` addresses the same ligand in all nine of them. The store is built
/// exactly once through [`LigandStoreBuilder`] and offers no mutation afterwards. It is
/// deliberately neither `Clone` nor serializable: a full library occupies several hundred
/// megabytes and must stay inside the single process that loaded it.
#[derive(Debug, Default)]
pub struct LigandStore {
    pub(crate) mwt: Vec<f32>,
    pub(crate) lgp: Vec<f32>,
    pub(crate) ads: Vec<f32>,
    pub(crate) pds: Vec<f32>,
    pub(crate) hbd: Vec<i16>,
    pub(crate) hba: Vec<i16>,
    pub(crate) psa: Vec<i16>,
    pub(crate) chg: Vec<i16>,
    pub(crate) nrb: Vec<i16>,
}

impl LigandStore {
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = LigandRecord>,
    {
        let records = records.into_iter();
        let mut builder = LigandStoreBuilder::with_capacity(records.size_hint().0);
        for record in records {
            builder.push(record);
        }
        builder.finish()
    }

    pub fn len(&self) -> usize {
        self.mwt.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mwt.is_empty()
    }

    pub fn record(&self, ordinal: usize) -> Option<LigandRecord> {
        if ordinal >= self.len() {
            return None;
        }
        Some(LigandRecord {
            mwt: self.mwt[ordinal],
            lgp: self.lgp[ordinal],
            ads: self.ads[ordinal],
            pds: self.pds[ordinal],
            hbd: self.hbd[ordinal],
            hba: self.hba[ordinal],
            psa: self.psa[ordinal],
            chg: self.chg[ordinal],
            nrb: self.nrb[ordinal],
        })
    }

    pub fn records(&self) -> impl Iterator<Item = LigandRecord> + '_ {
        (0..self.len()).filter_map(move |i| self.record(i))
    }

    /// Counts the ligands satisfying every range of `criteria`.
    pub fn scan(&self, criteria: &FilterCriteria) -> u64 {
        scan::count_matches(self, criteria)
    }
}

/// Accumulates records column by column; the only writer a [`LigandStore`] ever has.
#[derive(Debug, Default)]
pub struct LigandStoreBuilder {
    store: LigandStore,
}

impl LigandStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: LigandStore {
                mwt: Vec::with_capacity(capacity),
                lgp: Vec::with_capacity(capacity),
                ads: Vec::with_capacity(capacity),
                pds: Vec::with_capacity(capacity),
                hbd: Vec::with_capacity(capacity),
                hba: Vec::with_capacity(capacity),
                psa: Vec::with_capacity(capacity),
                chg: Vec::with_capacity(capacity),
                nrb: Vec::with_capacity(capacity),
            },
        }
    }

    #[inline]
    pub fn push(&mut self, record: LigandRecord) {
        let s = &mut self.store;
        s.mwt.push(record.mwt);
        s.lgp.push(record.lgp);
        s.ads.push(record.ads);
        s.pds.push(record.pds);
        s.hbd.push(record.hbd);
        s.hba.push(record.hba);
        s.psa.push(record.psa);
        s.chg.push(record.chg);
        s.nrb.push(record.nrb);
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Seals the columns. Excess capacity is released since the store never grows again.
    pub fn finish(self) -> LigandStore {
        let mut store = self.store;
        store.mwt.shrink_to_fit();
        store.lgp.shrink_to_fit();
        store.ads.shrink_to_fit();
        store.pds.shrink_to_fit();
        store.hbd.shrink_to_fit();
        store.hba.shrink_to_fit();
        store.psa.shrink_to_fit();
        store.chg.shrink_to_fit();
        store.nrb.shrink_to_fit();
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(mwt: f32, hbd: i16) -> LigandRecord {
        LigandRecord {
            mwt,
            hbd,
            ..LigandRecord::default()
        }
    }

    #[test]
    fn from_records_keeps_columns_aligned_by_ordinal() {
        let store = LigandStore::from_records(vec![record(100.0, 1), record(200.0, 2)]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.record(0), Some(record(100.0, 1)));
        assert_eq!(store.record(1), Some(record(200.0, 2)));
        assert_eq!(store.record(2), None);
        for column_len in [
            store.lgp.len(),
            store.ads.len(),
            store.pds.len(),
            store.hba.len(),
            store.psa.len(),
            store.chg.len(),
            store.nrb.len(),
        ] {
            assert_eq!(column_len, 2);
        }
    }

    #[test]
    fn empty_store_reports_empty() {
        let store = LigandStoreBuilder::new().finish();
        assert!(store.is_empty());
        assert_eq!(store.scan(&FilterCriteria::unbounded()), 0);
    }

    #[test]
    fn records_iterates_in_ordinal_order() {
        let input = vec![record(3.0, 3), record(1.0, 1), record(2.0, 2)];
        let store = LigandStore::from_records(input.clone());
        assert_eq!(store.records().collect::<Vec<_>>(), input);
    }

    #[test]
    fn builder_tracks_length_while_pushing() {
        let mut builder = LigandStoreBuilder::with_capacity(4);
        assert!(builder.is_empty());
        builder.push(record(1.0, 0));
        builder.push(record(2.0, 0));
        assert_eq!(builder.len(), 2);
        assert_eq!(builder.finish().len(), 2);
    }
}
