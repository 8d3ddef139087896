use std::cmp::Ordering;
use std::fmt;

// ============================================================================
// ATOM IDENTITY
// ============================================================================

/// One side of a contact: the full address of an atom in a (possibly symmetric) assembly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomSite {
    /// Model or unit-cell id, e.g. `#1` or `#2.3`.
    pub model_id: String,
    /// Group label the chain belongs to, e.g. `chainA` or `h1`.
    pub prot_id: String,
    pub chain_id: String,
    /// Residue name in title case (`Arg`, `Glu`).
    pub aa_name: String,
    pub aa_number: u32,
    pub atom_id: String,
}

impl AtomSite {
    /// The model-independent part of the address. Two sides that agree on this
    /// refer to the same atom of the asymmetric unit.
    pub fn identity(&self) -> (&str, &str, u32, &str) {
        (&self.prot_id, &self.chain_id, self.aa_number, &self.atom_id)
    }
}

impl fmt::Display for AtomSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{} {} {} {}",
            self.model_id, self.prot_id, self.chain_id, self.aa_name, self.aa_number, self.atom_id
        )
    }
}

// ============================================================================
// CONTACT RECORD
// ============================================================================

/// One observed atom-atom contact or clash.
///
/// `overlap` is the van der Waals overlap in Å (negative means a favorable
/// contact, positive a clash); `distance` is the atom-atom distance in Å.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactRecord {
    pub first: AtomSite,
    pub second: AtomSite,
    pub overlap: f64,
    pub distance: f64,
}

impl ContactRecord {
    /// Builds a record with its two sides already in canonical order.
    pub fn new(a: AtomSite, b: AtomSite, overlap: f64, distance: f64) -> Self {
        let (first, second) = canonical_sides(a, b);
        Self {
            first,
            second,
            overlap,
            distance,
        }
    }

    /// The same contact seen from the other atom.
    pub fn swapped(&self) -> Self {
        Self {
            first: self.second.clone(),
            second: self.first.clone(),
            overlap: self.overlap,
            distance: self.distance,
        }
    }

    /// True when `other`, read with its sides swapped, addresses the same atoms
    /// as `self` (model ids are ignored).
    pub fn is_mirror_of(&self, other: &ContactRecord) -> bool {
        self.first.identity() == other.second.identity()
            && self.second.identity() == other.first.identity()
    }

    /// Row order of the deduplicated output; the store sorts the same way.
    pub fn canonical_cmp(&self, other: &ContactRecord) -> Ordering {
        sort_key(self)
            .cmp(&sort_key(other))
            .then_with(|| self.overlap.total_cmp(&other.overlap))
            .then_with(|| self.distance.total_cmp(&other.distance))
    }
}

type SideKey<'a> = (&'a str, &'a str, u32, &'a str);
type SortKey<'a> = (&'a str, &'a str, SideKey<'a>, SideKey<'a>);

fn sort_key(r: &ContactRecord) -> SortKey<'_> {
    (
        r.first.model_id.as_str(),
        r.second.model_id.as_str(),
        r.first.identity(),
        r.second.identity(),
    )
}

/// Orders the two sides of an undirected contact.
///
/// Within one model the side with the smaller group label comes first;
/// across models the side with the smaller model id comes first. Ties keep
/// the input order.
pub fn canonical_sides(a: AtomSite, b: AtomSite) -> (AtomSite, AtomSite) {
    let swap = if a.model_id == b.model_id {
        a.prot_id > b.prot_id
    } else {
        a.model_id > b.model_id
    };
    if swap {
        (b, a)
    } else {
        (a, b)
    }
}

/// `ARG`, `arg` and `aRg` all become `Arg`.
pub fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(model: &str, prot: &str, chain: &str, number: u32, atom: &str) -> AtomSite {
        AtomSite {
            model_id: model.into(),
            prot_id: prot.into(),
            chain_id: chain.into(),
            aa_name: "Gly".into(),
            aa_number: number,
            atom_id: atom.into(),
        }
    }

    #[test]
    fn same_model_orders_by_group_label() {
        let r = ContactRecord::new(
            site("#1", "h2", "C", 10, "CA"),
            site("#1", "h1", "A", 20, "N"),
            -0.2,
            3.1,
        );
        assert_eq!(r.first.prot_id, "h1");
        assert_eq!(r.second.prot_id, "h2");
    }

    #[test]
    fn different_models_order_by_model_id() {
        let r = ContactRecord::new(
            site("#2.3", "h1", "A", 10, "CA"),
            site("#2.1", "h2", "C", 20, "N"),
            -0.2,
            3.1,
        );
        assert_eq!(r.first.model_id, "#2.1");
        assert_eq!(r.first.prot_id, "h2");
    }

    #[test]
    fn both_viewer_directions_collapse_to_one_record() {
        let a = site("#1", "h1", "A", 5, "OG");
        let b = site("#1", "h2", "B", 7, "NZ");
        let r1 = ContactRecord::new(a.clone(), b.clone(), 0.1, 2.9);
        let r2 = ContactRecord::new(b, a, 0.1, 2.9);
        assert_eq!(r1, r2);
    }

    #[test]
    fn mirror_ignores_model_ids() {
        let r = ContactRecord::new(
            site("#2.1", "h1", "A", 5, "OG"),
            site("#2.2", "h1", "B", 7, "NZ"),
            0.1,
            2.9,
        );
        let m = ContactRecord::new(
            site("#2.1", "h1", "B", 7, "NZ"),
            site("#2.3", "h1", "A", 5, "OG"),
            0.1,
            2.9,
        );
        assert!(r.is_mirror_of(&m));
        assert!(m.is_mirror_of(&r));
    }

    #[test]
    fn title_cases_residue_names() {
        assert_eq!(title_case("ARG"), "Arg");
        assert_eq!(title_case("gLU"), "Glu");
        assert_eq!(title_case(""), "");
    }
}
