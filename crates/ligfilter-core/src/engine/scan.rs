use super::store::LigandStore;
use crate::core::models::criteria::FilterCriteria;

/// A docking job may only be submitted when at least this many ligands pass the filter.
pub const MIN_SUBMITTABLE_LIGANDS: u64 = 1;

pub fn is_submittable(ligands: u64) -> bool {
    ligands >= MIN_SUBMITTABLE_LIGANDS
}

/// Counts ligands whose nine properties all fall inside the inclusive ranges of `criteria`.
///
/// One linear pass over every ordinal. Each record short-circuits on its first failing
/// range; the evaluation order only affects speed, never the count. Columns are re-sliced
/// to a common length up front so the loop indexes plain typed slices. Float columns are
/// widened to `f64` and compared against the exact requested bounds.
#[allow(clippy::needless_range_loop)]
pub fn count_matches(store: &LigandStore, criteria: &FilterCriteria) -> u64 {
    let n = store.len();
    let mwt = &store.mwt[..n];
    let lgp = &store.lgp[..n];
    let ads = &store.ads[..n];
    let pds = &store.pds[..n];
    let hbd = &store.hbd[..n];
    let hba = &store.hba[..n];
    let psa = &store.psa[..n];
    let chg = &store.chg[..n];
    let nrb = &store.nrb[..n];

    let mut ligands = 0u64;
    for i in 0..n {
        if criteria.mwt.contains(f64::from(mwt[i]))
            && criteria.lgp.contains(f64::from(lgp[i]))
            && criteria.ads.contains(f64::from(ads[i]))
            && criteria.pds.contains(f64::from(pds[i]))
            && criteria.hbd.contains(hbd[i])
            && criteria.hba.contains(hba[i])
            && criteria.psa.contains(psa[i])
            && criteria.chg.contains(chg[i])
            && criteria.nrb.contains(nrb[i])
        {
            ligands += 1;
        }
    }
    ligands
}
