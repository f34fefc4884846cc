use phf::{Map, phf_map};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Size in bytes of one encoded ligand record.
pub const RECORD_SIZE: usize = 26;

/// Number of ligands in the standard docking library property table.
pub const DEFAULT_NUM_LIGANDS: usize = 23_129_083;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Float,
    Integer,
}

/// One of the nine per-ligand properties stored in the property table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    MolecularWeight,
    LogP,
    ApolarDesolvation,
    PolarDesolvation,
    HydrogenBondDonors,
    HydrogenBondAcceptors,
    PolarSurfaceArea,
    NetCharge,
    RotatableBonds,
}

static PROPERTY_KEYS: Map<&'static str, Property> = phf_map! {
    "mwt" => Property::MolecularWeight,
    "lgp" => Property::LogP,
    "ads" => Property::ApolarDesolvation,
    "pds" => Property::PolarDesolvation,
    "hbd" => Property::HydrogenBondDonors,
    "hba" => Property::HydrogenBondAcceptors,
    "psa" => Property::PolarSurfaceArea,
    "chg" => Property::NetCharge,
    "nrb" => Property::RotatableBonds,
};

impl Property {
    /// All properties in record order.
    pub const ALL: [Property; 9] = [
        Property::MolecularWeight,
        Property::LogP,
        Property::ApolarDesolvation,
        Property::PolarDesolvation,
        Property::HydrogenBondDonors,
        Property::HydrogenBondAcceptors,
        Property::PolarSurfaceArea,
        Property::NetCharge,
        Property::RotatableBonds,
    ];

    /// The three-letter key used in files, configuration and query messages.
    pub fn key(self) -> &'static str {
        match self {
            Property::MolecularWeight => "mwt",
            Property::LogP => "lgp",
            Property::ApolarDesolvation => "ads",
            Property::PolarDesolvation => "pds",
            Property::HydrogenBondDonors => "hbd",
            Property::HydrogenBondAcceptors => "hba",
            Property::PolarSurfaceArea => "psa",
            Property::NetCharge => "chg",
            Property::RotatableBonds => "nrb",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        PROPERTY_KEYS.get(key).copied()
    }

    /// Byte offset of this property inside an encoded record.
    pub fn offset(self) -> usize {
        match self {
            Property::MolecularWeight => 0,
            Property::LogP => 4,
            Property::ApolarDesolvation => 8,
            Property::PolarDesolvation => 12,
            Property::HydrogenBondDonors => 16,
            Property::HydrogenBondAcceptors => 18,
            Property::PolarSurfaceArea => 20,
            Property::NetCharge => 22,
            Property::RotatableBonds => 24,
        }
    }

    pub fn kind(self) -> PropertyKind {
        match self {
            Property::MolecularWeight
            | Property::LogP
            | Property::ApolarDesolvation
            | Property::PolarDesolvation => PropertyKind::Float,
            _ => PropertyKind::Integer,
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The nine properties of a single ligand, as stored at one ordinal of the table.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LigandRecord {
    pub mwt: f32,
    pub lgp: f32,
    pub ads: f32,
    pub pds: f32,
    pub hbd: i16,
    pub hba: i16,
    pub psa: i16,
    pub chg: i16,
    pub nrb: i16,
}

#[inline]
fn read_f32(bytes: &[u8; RECORD_SIZE], at: usize) -> f32 {
    f32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[inline]
fn read_i16(bytes: &[u8; RECORD_SIZE], at: usize) -> i16 {
    i16::from_le_bytes([bytes[at], bytes[at + 1]])
}

impl LigandRecord {
    /// Decodes one little-endian record.
    pub fn decode(bytes: &[u8; RECORD_SIZE]) -> Self {
        Self {
            mwt: read_f32(bytes, Property::MolecularWeight.offset()),
            lgp: read_f32(bytes, Property::LogP.offset()),
            ads: read_f32(bytes, Property::ApolarDesolvation.offset()),
            pds: read_f32(bytes, Property::PolarDesolvation.offset()),
            hbd: read_i16(bytes, Property::HydrogenBondDonors.offset()),
            hba: read_i16(bytes, Property::HydrogenBondAcceptors.offset()),
            psa: read_i16(bytes, Property::PolarSurfaceArea.offset()),
            chg: read_i16(bytes, Property::NetCharge.offset()),
            nrb: read_i16(bytes, Property::RotatableBonds.offset()),
        }
    }

    /// Encodes the record into its 26-byte little-endian form.
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        let floats = [
            (Property::MolecularWeight, self.mwt),
            (Property::LogP, self.lgp),
            (Property::ApolarDesolvation, self.ads),
            (Property::PolarDesolvation, self.pds),
        ];
        for (property, value) in floats {
            let at = property.offset();
            out[at..at + 4].copy_from_slice(&value.to_le_bytes());
        }
        let integers = [
            (Property::HydrogenBondDonors, self.hbd),
            (Property::HydrogenBondAcceptors, self.hba),
            (Property::PolarSurfaceArea, self.psa),
            (Property::NetCharge, self.chg),
            (Property::RotatableBonds, self.nrb),
        ];
        for (property, value) in integers {
            let at = property.offset();
            out[at..at + 2].copy_from_slice(&value.to_le_bytes());
        }
        out
    }

    /// Returns the value of `property` widened to `f64`.
    pub fn value(&self, property: Property) -> f64 {
        match property {
            Property::MolecularWeight => self.mwt as f64,
            Property::LogP => self.lgp as f64,
            Property::ApolarDesolvation => self.ads as f64,
            Property::PolarDesolvation => self.pds as f64,
            Property::HydrogenBondDonors => self.hbd as f64,
            Property::HydrogenBondAcceptors => self.hba as f64,
            Property::PolarSurfaceArea => self.psa as f64,
            Property::NetCharge => self.chg as f64,
            Property::RotatableBonds => self.nrb as f64,
        }
    }
}
