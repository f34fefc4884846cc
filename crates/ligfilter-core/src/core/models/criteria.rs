use super::property::{LigandRecord, Property};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// An inclusive `[lb, ub]` range over one property.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds<T> {
    pub lb: T,
    pub ub: T,
}

impl<T> Bounds<T> {
    pub const fn new(lb: T, ub: T) -> Self {
        Self { lb, ub }
    }
}

impl<T: PartialOrd + Copy> Bounds<T> {
    #[inline(always)]
    pub fn contains(&self, value: T) -> bool {
        self.lb <= value && value <= self.ub
    }

    /// A range is empty when no value can satisfy it, i.e. `lb > ub`.
    pub fn is_empty(&self) -> bool {
        !(self.lb <= self.ub)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundSide {
    Lower,
    Upper,
}

impl fmt::Display for BoundSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundSide::Lower => f.write_str("lb"),
            BoundSide::Upper => f.write_str("ub"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CriteriaError {
    #[error("{property}_{side} must be within [{min}, {max}] (got {value})")]
    OutOfDomain {
        property: Property,
        side: BoundSide,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{property}_{side} must be an integer (got {value})")]
    NotAnInteger {
        property: Property,
        side: BoundSide,
        value: f64,
    },

    #[error("{property}_{side} is not a valid bound")]
    NotFinite { property: Property, side: BoundSide },

    #[error("{property}_lb must not be greater than {property}_ub ({lb} > {ub})")]
    InvertedRange { property: Property, lb: f64, ub: f64 },
}

impl CriteriaError {
    /// The flat request field (e.g. `mwt_lb`) the error refers to.
    pub fn field(&self) -> String {
        match self {
            CriteriaError::OutOfDomain { property, side, .. }
            | CriteriaError::NotAnInteger { property, side, .. }
            | CriteriaError::NotFinite { property, side } => format!("{}_{}", property, side),
            CriteriaError::InvertedRange { property, .. } => format!("{}_lb", property),
        }
    }
}

/// Nine inclusive property ranges; a ligand matches when every property lies in its range.
///
/// Float bounds are kept in `f64` and stored `f32` values are widened before comparison, so a
/// decimal bound such as `390.1` is never rounded onto a neighbouring record value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub mwt: Bounds<f64>,
    pub lgp: Bounds<f64>,
    pub ads: Bounds<f64>,
    pub pds: Bounds<f64>,
    pub hbd: Bounds<i16>,
    pub hba: Bounds<i16>,
    pub psa: Bounds<i16>,
    pub chg: Bounds<i16>,
    pub nrb: Bounds<i16>,
}

/// The value domain of the docking library, as accepted by the query frontend.
pub type PropertyDomain = FilterCriteria;

pub const DOCKING_DOMAIN: PropertyDomain = FilterCriteria {
    mwt: Bounds::new(55.0, 567.0),
    lgp: Bounds::new(-6.0, 12.0),
    ads: Bounds::new(-57.0, 29.0),
    pds: Bounds::new(-543.0, 1.0),
    hbd: Bounds::new(0, 20),
    hba: Bounds::new(0, 18),
    psa: Bounds::new(0, 317),
    chg: Bounds::new(-5, 5),
    nrb: Bounds::new(0, 35),
};

impl Default for FilterCriteria {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl FilterCriteria {
    /// Criteria that accept every property value, infinities included.
    ///
    /// JSON cannot carry infinite bounds, so these criteria are for in-process scans only.
    pub fn unbounded() -> Self {
        let float = Bounds::new(f64::NEG_INFINITY, f64::INFINITY);
        let integer = Bounds::new(i16::MIN, i16::MAX);
        Self {
            mwt: float,
            lgp: float,
            ads: float,
            pds: float,
            hbd: integer,
            hba: integer,
            psa: integer,
            chg: integer,
            nrb: integer,
        }
    }

    /// Criteria spanning exactly the docking library domain.
    pub fn docking_domain() -> Self {
        DOCKING_DOMAIN
    }

    pub fn matches(&self, record: &LigandRecord) -> bool {
        self.mwt.contains(f64::from(record.mwt))
            && self.lgp.contains(f64::from(record.lgp))
            && self.ads.contains(f64::from(record.ads))
            && self.pds.contains(f64::from(record.pds))
            && self.hbd.contains(record.hbd)
            && self.hba.contains(record.hba)
            && self.psa.contains(record.psa)
            && self.chg.contains(record.chg)
            && self.nrb.contains(record.nrb)
    }

    /// True when every float bound is finite, i.e. the criteria can be encoded as JSON.
    pub fn is_finite(&self) -> bool {
        [self.mwt, self.lgp, self.ads, self.pds]
            .iter()
            .all(|b| b.lb.is_finite() && b.ub.is_finite())
    }

    /// Returns `(lb, ub)` of one property widened to `f64`.
    pub fn bounds(&self, property: Property) -> (f64, f64) {
        fn widen<T: Into<f64> + Copy>(b: &Bounds<T>) -> (f64, f64) {
            (b.lb.into(), b.ub.into())
        }
        match property {
            Property::MolecularWeight => widen(&self.mwt),
            Property::LogP => widen(&self.lgp),
            Property::ApolarDesolvation => widen(&self.ads),
            Property::PolarDesolvation => widen(&self.pds),
            Property::HydrogenBondDonors => widen(&self.hbd),
            Property::HydrogenBondAcceptors => widen(&self.hba),
            Property::PolarSurfaceArea => widen(&self.psa),
            Property::NetCharge => widen(&self.chg),
            Property::RotatableBonds => widen(&self.nrb),
        }
    }

    /// Replaces the range of one property.
    ///
    /// Float properties accept any bound but NaN, infinities included. Integer properties
    /// reject non-finite, fractional or out-of-`i16` values. No ordering check is made
    /// between `lb` and `ub`; an inverted range simply matches nothing.
    pub fn set_bounds(&mut self, property: Property, lb: f64, ub: f64) -> Result<(), CriteriaError> {
        match property {
            Property::MolecularWeight => self.mwt = float_bounds(property, lb, ub)?,
            Property::LogP => self.lgp = float_bounds(property, lb, ub)?,
            Property::ApolarDesolvation => self.ads = float_bounds(property, lb, ub)?,
            Property::PolarDesolvation => self.pds = float_bounds(property, lb, ub)?,
            Property::HydrogenBondDonors => self.hbd = integer_bounds(property, lb, ub)?,
            Property::HydrogenBondAcceptors => self.hba = integer_bounds(property, lb, ub)?,
            Property::PolarSurfaceArea => self.psa = integer_bounds(property, lb, ub)?,
            Property::NetCharge => self.chg = integer_bounds(property, lb, ub)?,
            Property::RotatableBonds => self.nrb = integer_bounds(property, lb, ub)?,
        }
        Ok(())
    }

    pub fn with_bounds(mut self, property: Property, lb: f64, ub: f64) -> Result<Self, CriteriaError> {
        self.set_bounds(property, lb, ub)?;
        Ok(self)
    }

    /// Checks that every bound lies inside `domain` and that no range is inverted.
    ///
    /// This is the admission check applied at the request boundary; the scan itself never
    /// calls it and treats any criteria it receives as valid.
    pub fn check_within(&self, domain: &PropertyDomain) -> Result<(), CriteriaError> {
        for property in Property::ALL {
            let (lb, ub) = self.bounds(property);
            let (min, max) = domain.bounds(property);
            for (side, value) in [(BoundSide::Lower, lb), (BoundSide::Upper, ub)] {
                if !(min <= value && value <= max) {
                    return Err(CriteriaError::OutOfDomain {
                        property,
                        side,
                        value,
                        min,
                        max,
                    });
                }
            }
            if lb > ub {
                return Err(CriteriaError::InvertedRange { property, lb, ub });
            }
        }
        Ok(())
    }
}

fn float_bounds(property: Property, lb: f64, ub: f64) -> Result<Bounds<f64>, CriteriaError> {
    Ok(Bounds::new(
        not_nan(property, BoundSide::Lower, lb)?,
        not_nan(property, BoundSide::Upper, ub)?,
    ))
}

fn integer_bounds(property: Property, lb: f64, ub: f64) -> Result<Bounds<i16>, CriteriaError> {
    Ok(Bounds::new(
        to_i16(property, BoundSide::Lower, lb)?,
        to_i16(property, BoundSide::Upper, ub)?,
    ))
}

fn not_nan(property: Property, side: BoundSide, value: f64) -> Result<f64, CriteriaError> {
    if !value.is_nan() {
        Ok(value)
    } else {
        Err(CriteriaError::NotFinite { property, side })
    }
}

fn to_i16(property: Property, side: BoundSide, value: f64) -> Result<i16, CriteriaError> {
    if !value.is_finite() {
        return Err(CriteriaError::NotFinite { property, side });
    }
    if value.fract() != 0.0 {
        return Err(CriteriaError::NotAnInteger {
            property,
            side,
            value,
        });
    }
    if value < i16::MIN as f64 || value > i16::MAX as f64 {
        return Err(CriteriaError::OutOfDomain {
            property,
            side,
            value,
            min: i16::MIN as f64,
            max: i16::MAX as f64,
        });
    }
    Ok(value as i16)
}
