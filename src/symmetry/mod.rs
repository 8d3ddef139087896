pub mod operators;

use crate::error::ContactError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use operators::Operator;

// ============================================================================
// SYMMETRY SETTINGS (raw user input)
// ============================================================================

/// Symmetry family as chosen by the user, before the order is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SymmetryKind {
    Cyclic,
    DihedralX,
    DihedralY,
    Tetrahedral,
    Octahedral,
    Icosahedral,
}

impl FromStr for SymmetryKind {
    type Err = ContactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "cyclic" => Ok(Self::Cyclic),
            "d" | "dx" | "dihedral" | "dihedral-x" => Ok(Self::DihedralX),
            "dy" | "dihedral-y" => Ok(Self::DihedralY),
            "t" | "tetrahedral" => Ok(Self::Tetrahedral),
            "o" | "octahedral" => Ok(Self::Octahedral),
            "i" | "icosahedral" => Ok(Self::Icosahedral),
            _ => Err(ContactError::UnknownSymmetry(s.to_string())),
        }
    }
}

/// Symmetry parameters of a run: family, order and (for T and I) orientation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymmetrySettings {
    pub kind: SymmetryKind,
    /// Multiplicity for cyclic and dihedral groups. Ignored otherwise.
    #[serde(default)]
    pub order: Option<i64>,
    pub orientation: Option<String>,
}

// ============================================================================
// VALIDATED GROUP
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TetrahedralOrientation {
    /// Two-fold axes along x, y and z.
    TwoTwoTwo,
    /// Three-fold axis along z.
    Z3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcosahedralOrientation {
    TwoTwoTwo,
    TwoTwoTwoR,
    N25,
    N25R,
    TwoN3,
    TwoN3R,
    TwoN5,
    TwoN5R,
}

impl IcosahedralOrientation {
    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "222" => Self::TwoTwoTwo,
            "222r" => Self::TwoTwoTwoR,
            "n25" => Self::N25,
            "n25r" => Self::N25R,
            "2n3" => Self::TwoN3,
            "2n3r" => Self::TwoN3R,
            "2n5" => Self::TwoN5,
            "2n5r" => Self::TwoN5R,
            _ => return None,
        })
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::TwoTwoTwo => "222",
            Self::TwoTwoTwoR => "222r",
            Self::N25 => "n25",
            Self::N25R => "n25r",
            Self::TwoN3 => "2n3",
            Self::TwoN3R => "2n3r",
            Self::TwoN5 => "2n5",
            Self::TwoN5R => "2n5r",
        }
    }
}

/// A point group with a valid order, ready to be written into a viewer script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymmetryGroup {
    Cyclic(u32),
    DihedralX(u32),
    DihedralY(u32),
    Tetrahedral(TetrahedralOrientation),
    Octahedral,
    Icosahedral(IcosahedralOrientation),
}

impl SymmetryGroup {
    /// Checks the raw settings. Every violated constraint is reported.
    pub fn resolve(settings: &SymmetrySettings) -> Result<Self, Vec<String>> {
        let orientation = settings
            .orientation
            .as_deref()
            .map(|o| o.trim().to_ascii_lowercase());

        let order = || -> Result<u32, Vec<String>> {
            let Some(n) = settings.order else {
                return Err(vec![format!(
                    "symmetry order is required for {:?} symmetry",
                    settings.kind
                )]);
            };
            if n <= 0 {
                return Err(vec![format!(
                    "symmetry order must be a positive integer (got {})",
                    n
                )]);
            }
            u32::try_from(n).map_err(|_| vec![format!("symmetry order {} is too large", n)])
        };

        match settings.kind {
            SymmetryKind::Cyclic => Ok(Self::Cyclic(order()?)),
            SymmetryKind::DihedralX => Ok(Self::DihedralX(order()?)),
            SymmetryKind::DihedralY => Ok(Self::DihedralY(order()?)),
            SymmetryKind::Octahedral => Ok(Self::Octahedral),
            SymmetryKind::Tetrahedral => match orientation.as_deref() {
                None | Some("222") => Ok(Self::Tetrahedral(TetrahedralOrientation::TwoTwoTwo)),
                Some("z3") => Ok(Self::Tetrahedral(TetrahedralOrientation::Z3)),
                Some(other) => Err(vec![format!(
                    "tetrahedral orientation must be '222' or 'z3' (got '{}')",
                    other
                )]),
            },
            SymmetryKind::Icosahedral => {
                let o = orientation.as_deref().unwrap_or("222");
                IcosahedralOrientation::parse(o)
                    .map(Self::Icosahedral)
                    .ok_or_else(|| vec![format!("unknown icosahedral orientation '{}'", o)])
            }
        }
    }

    /// Number of copies in the full assembly, identity included.
    pub fn copies(&self) -> usize {
        match self {
            Self::Cyclic(n) => *n as usize,
            Self::DihedralX(n) | Self::DihedralY(n) => 2 * *n as usize,
            Self::Tetrahedral(_) => 12,
            Self::Octahedral => 24,
            Self::Icosahedral(_) => 60,
        }
    }

    /// Rotation operators, identity first, when this crate knows the
    /// orientation convention of the group.
    pub fn operators(&self) -> Option<Vec<Operator>> {
        operators::for_group(self)
    }
}

/// The viewer's spelling of the group (`C4`, `D7,y`, `T,222`, `I,n25r`).
impl fmt::Display for SymmetryGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cyclic(n) => write!(f, "C{}", n),
            Self::DihedralX(n) => write!(f, "D{}", n),
            Self::DihedralY(n) => write!(f, "D{},y", n),
            Self::Tetrahedral(TetrahedralOrientation::TwoTwoTwo) => write!(f, "T,222"),
            Self::Tetrahedral(TetrahedralOrientation::Z3) => write!(f, "T,z3"),
            Self::Octahedral => write!(f, "O"),
            Self::Icosahedral(o) => write!(f, "I,{}", o.as_str()),
        }
    }
}

impl FromStr for SymmetryGroup {
    type Err = ContactError;

    /// Accepts the same spellings [`Display`](fmt::Display) produces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ContactError::UnknownSymmetry(s.to_string());
        let trimmed = s.trim();
        let (head, orientation) = match trimmed.split_once(',') {
            Some((h, o)) => (h.trim(), Some(o.trim().to_string())),
            None => (trimmed, None),
        };
        let mut chars = head.chars();
        let letter = chars.next().ok_or_else(unknown)?;
        let digits = chars.as_str();

        let (kind, order) = match letter.to_ascii_uppercase() {
            'C' => (SymmetryKind::Cyclic, digits),
            'D' if orientation.as_deref() == Some("y") => (SymmetryKind::DihedralY, digits),
            'D' => (SymmetryKind::DihedralX, digits),
            'T' if digits.is_empty() => (SymmetryKind::Tetrahedral, ""),
            'O' if digits.is_empty() => (SymmetryKind::Octahedral, ""),
            'I' if digits.is_empty() => (SymmetryKind::Icosahedral, ""),
            _ => return Err(unknown()),
        };
        let order = match kind {
            SymmetryKind::Cyclic | SymmetryKind::DihedralX | SymmetryKind::DihedralY => {
                Some(order.parse::<i64>().map_err(|_| unknown())?)
            }
            _ => None,
        };
        let orientation = match kind {
            SymmetryKind::Tetrahedral | SymmetryKind::Icosahedral => orientation,
            _ => None,
        };

        Self::resolve(&SymmetrySettings {
            kind,
            order,
            orientation,
        })
        .map_err(ContactError::Config)
    }
}
