//! Parsed compound records and the compact structure payload.
//!
//! Turning a raw catalog record into atoms, bonds and a structural key is the
//! job of an external chemistry toolkit; the pipeline only sees the
//! [`RecordParser`] contract. [`JsonLinesParser`] implements it for records
//! that were already parsed upstream and serialized one per line:
//!
//! ```text
//! {"structural_key":"XLYOFNOQVPJJNP-UHFFFAOYSA-N","candidate_id":962,
//!  "atoms":[{"x":0.0,"y":0.0,"element":"O"}],"bonds":[]}
//! ```
//!
//! The stored value is a [`StructurePayload`]: short field names, coordinates
//! rounded to four decimal places.

use molcanon_index::CompoundId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decimal places kept for stored 2D coordinates.
const COORD_SCALE: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub x: f64,
    pub y: f64,
    pub element: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bond {
    pub from: usize,
    pub to: usize,
    pub order: u8,
}

/// Output of the chemistry parser for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRecord {
    /// `None` (or blank) when no key could be derived.
    #[serde(default)]
    pub structural_key: Option<String>,
    pub candidate_id: CompoundId,
    #[serde(default)]
    pub atoms: Vec<Atom>,
    #[serde(default)]
    pub bonds: Vec<Bond>,
}

impl ParsedRecord {
    pub fn new(structural_key: impl Into<String>, candidate_id: impl Into<CompoundId>) -> Self {
        Self {
            structural_key: Some(structural_key.into()),
            candidate_id: candidate_id.into(),
            atoms: Vec::new(),
            bonds: Vec::new(),
        }
    }

    pub fn with_atom(mut self, element: impl Into<String>, x: f64, y: f64) -> Self {
        self.atoms.push(Atom {
            x,
            y,
            element: element.into(),
        });
        self
    }

    pub fn with_bond(mut self, from: usize, to: usize, order: u8) -> Self {
        self.bonds.push(Bond { from, to, order });
        self
    }

    /// The structural key, trimmed, if one is present and non-blank.
    pub fn key(&self) -> Option<&str> {
        self.structural_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Why a record could not be turned into a storable structure.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("unparseable record: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("bond {bond} references atom {atom}, but the record has {atom_count} atoms")]
    BondOutOfRange {
        bond: usize,
        atom: usize,
        atom_count: usize,
    },

    #[error("atom {atom} has a non-finite coordinate")]
    NonFiniteCoordinate { atom: usize },
}

/// Collaborator contract: raw record text to [`ParsedRecord`].
pub trait RecordParser: Send {
    fn parse(&self, raw: &str) -> Result<ParsedRecord, RecordError>;
}

/// Parses one JSON object per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesParser;

impl RecordParser for JsonLinesParser {
    fn parse(&self, raw: &str) -> Result<ParsedRecord, RecordError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadAtom {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "e")]
    pub element: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadBond {
    #[serde(rename = "f")]
    pub from: usize,
    #[serde(rename = "t")]
    pub to: usize,
    #[serde(rename = "o")]
    pub order: u8,
}

/// Value stored per structural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructurePayload {
    #[serde(rename = "a")]
    pub atoms: Vec<PayloadAtom>,
    #[serde(rename = "b")]
    pub bonds: Vec<PayloadBond>,
}

impl StructurePayload {
    /// Extract the payload of `record`, validating bond endpoints and
    /// coordinates.
    pub fn from_record(record: &ParsedRecord) -> Result<Self, RecordError> {
        let atoms = record
            .atoms
            .iter()
            .enumerate()
            .map(|(i, atom)| {
                if !(atom.x.is_finite() && atom.y.is_finite()) {
                    return Err(RecordError::NonFiniteCoordinate { atom: i });
                }
                Ok(PayloadAtom {
                    x: round_coord(atom.x),
                    y: round_coord(atom.y),
                    element: atom.element.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let atom_count = atoms.len();
        let bonds = record
            .bonds
            .iter()
            .enumerate()
            .map(|(i, bond)| {
                for atom in [bond.from, bond.to] {
                    if atom >= atom_count {
                        return Err(RecordError::BondOutOfRange {
                            bond: i,
                            atom,
                            atom_count,
                        });
                    }
                }
                Ok(PayloadBond {
                    from: bond.from,
                    to: bond.to,
                    order: bond.order,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { atoms, bonds })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, RecordError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RecordError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

fn round_coord(v: f64) -> f64 {
    (v * COORD_SCALE).round() / COORD_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_line() {
        let line = r#"{"structural_key":"XLYOFNOQVPJJNP-UHFFFAOYSA-N","candidate_id":962,
            "atoms":[{"x":0.0,"y":0.0,"element":"O"}],"bonds":[]}"#;
        let record = JsonLinesParser.parse(line).unwrap();
        assert_eq!(record.key(), Some("XLYOFNOQVPJJNP-UHFFFAOYSA-N"));
        assert_eq!(record.candidate_id, CompoundId::new(962));
        assert_eq!(record.atoms.len(), 1);
    }

    #[test]
    fn missing_or_blank_key() {
        let record = JsonLinesParser.parse(r#"{"candidate_id":1}"#).unwrap();
        assert_eq!(record.key(), None);
        let record = JsonLinesParser
            .parse(r#"{"structural_key":"  ","candidate_id":1}"#)
            .unwrap();
        assert_eq!(record.key(), None);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            JsonLinesParser.parse("not json"),
            Err(RecordError::Parse(_))
        ));
        assert!(JsonLinesParser
            .parse(r#"{"structural_key":"K","candidate_id":-4}"#)
            .is_err());
    }

    #[test]
    fn payload_rounds_coordinates_and_uses_short_names() {
        let record = ParsedRecord::new("K", 1u32)
            .with_atom("C", 1.234_567, -0.000_04)
            .with_atom("O", 2.0, 0.5)
            .with_bond(0, 1, 2);
        let payload = StructurePayload::from_record(&record).unwrap();
        assert_eq!(payload.atoms[0].x, 1.2346);
        assert_eq!(payload.atoms[0].y, 0.0);

        let json: serde_json::Value =
            serde_json::from_slice(&payload.to_bytes().unwrap()).unwrap();
        assert_eq!(json["a"][1]["e"], "O");
        assert_eq!(json["b"][0]["f"], 0);
        assert_eq!(json["b"][0]["t"], 1);
        assert_eq!(json["b"][0]["o"], 2);
    }

    #[test]
    fn dangling_bond_is_rejected() {
        let record = ParsedRecord::new("K", 1u32)
            .with_atom("C", 0.0, 0.0)
            .with_bond(0, 3, 1);
        assert!(matches!(
            StructurePayload::from_record(&record),
            Err(RecordError::BondOutOfRange { atom: 3, atom_count: 1, .. })
        ));
    }

    #[test]
    fn non_finite_coordinate_is_rejected() {
        let record = ParsedRecord::new("K", 1u32).with_atom("C", f64::INFINITY, 0.0);
        assert!(matches!(
            StructurePayload::from_record(&record),
            Err(RecordError::NonFiniteCoordinate { atom: 0 })
        ));
    }
}
