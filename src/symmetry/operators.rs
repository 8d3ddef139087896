use super::{IcosahedralOrientation, SymmetryGroup, TetrahedralOrientation};
use nalgebra::{Matrix3, Rotation3, Unit, Vector3};
use std::f64::consts::PI;

/// Two rotations closer than this (Frobenius norm) are the same element.
const SAME_ELEMENT_TOL: f64 = 1e-6;

/// A rigid symmetry operation `x' = R x + t`.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
}

impl Operator {
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Re-centers a rotation about the origin so that it rotates about `center`.
    pub fn about(rotation: Matrix3<f64>, center: &Vector3<f64>) -> Self {
        Self {
            rotation,
            translation: center - rotation * center,
        }
    }

    pub fn apply(&self, p: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * p + self.translation
    }

    pub fn is_identity(&self) -> bool {
        (self.rotation - Matrix3::identity()).norm() < SAME_ELEMENT_TOL
            && self.translation.norm() < SAME_ELEMENT_TOL
    }

    /// The 12 numbers of the 3x4 matrix `[R | t]`, row by row.
    #[rustfmt::skip]
    pub fn row_major_3x4(&self) -> [f64; 12] {
        let r = &self.rotation;
        let t = &self.translation;
        [
            r[(0, 0)], r[(0, 1)], r[(0, 2)], t.x,
            r[(1, 0)], r[(1, 1)], r[(1, 2)], t.y,
            r[(2, 0)], r[(2, 1)], r[(2, 2)], t.z,
        ]
    }
}

fn rotation(axis: Vector3<f64>, angle: f64) -> Matrix3<f64> {
    Rotation3::from_axis_angle(&Unit::new_normalize(axis), angle).into_inner()
}

/// Closes a set of generators under multiplication. Identity comes first.
fn closure(generators: &[Matrix3<f64>]) -> Vec<Matrix3<f64>> {
    let mut group = vec![Matrix3::identity()];
    let mut i = 0;
    while i < group.len() {
        for g in generators {
            let candidate = g * group[i];
            if !group
                .iter()
                .any(|m| (m - candidate).norm() < SAME_ELEMENT_TOL)
            {
                group.push(candidate);
            }
        }
        i += 1;
    }
    group
}

fn cyclic(n: u32) -> Vec<Matrix3<f64>> {
    (0..n)
        .map(|k| rotation(Vector3::z(), 2.0 * PI * k as f64 / n as f64))
        .collect()
}

fn dihedral(n: u32, flip_axis: Vector3<f64>) -> Vec<Matrix3<f64>> {
    let flip = rotation(flip_axis, PI);
    let base = cyclic(n);
    let flipped: Vec<_> = base.iter().map(|c| c * flip).collect();
    base.into_iter().chain(flipped).collect()
}

/// Rotations about the origin for the groups whose orientation is known here.
pub fn rotations(group: &SymmetryGroup) -> Option<Vec<Matrix3<f64>>> {
    let golden = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let mats = match group {
        SymmetryGroup::Cyclic(n) => cyclic(*n),
        SymmetryGroup::DihedralX(n) => dihedral(*n, Vector3::x()),
        SymmetryGroup::DihedralY(n) => dihedral(*n, Vector3::y()),
        SymmetryGroup::Tetrahedral(TetrahedralOrientation::TwoTwoTwo) => closure(&[
            rotation(Vector3::z(), PI),
            rotation(Vector3::x(), PI),
            rotation(Vector3::new(1.0, 1.0, 1.0), 2.0 * PI / 3.0),
        ]),
        SymmetryGroup::Octahedral => closure(&[
            rotation(Vector3::z(), PI / 2.0),
            rotation(Vector3::x(), PI / 2.0),
        ]),
        SymmetryGroup::Icosahedral(o @ (IcosahedralOrientation::TwoTwoTwo
        | IcosahedralOrientation::TwoTwoTwoR)) => {
            let base = closure(&[
                rotation(Vector3::z(), PI),
                rotation(Vector3::new(0.0, 1.0, golden), 2.0 * PI / 5.0),
                rotation(Vector3::new(1.0, 1.0, 1.0), 2.0 * PI / 3.0),
            ]);
            if *o == IcosahedralOrientation::TwoTwoTwoR {
                // 222r is 222 turned 90 degrees about z.
                let q = rotation(Vector3::z(), PI / 2.0);
                base.iter().map(|m| q * m * q.transpose()).collect()
            } else {
                base
            }
        }
        _ => return None,
    };
    Some(mats)
}

pub fn for_group(group: &SymmetryGroup) -> Option<Vec<Operator>> {
    for_group_about(group, &Vector3::zeros())
}

/// Operators of `group` rotating about `center`.
pub fn for_group_about(group: &SymmetryGroup, center: &Vector3<f64>) -> Option<Vec<Operator>> {
    rotations(group).map(|mats| {
        mats.into_iter()
            .map(|r| Operator::about(r, center))
            .collect()
    })
}
