//! Bond angle and coordination analysis over `Poscar`.

use std::f64::consts::PI;

use anyhow::{
    bail,
    Context,
};
use itertools::Itertools;

use crate::types::{
    Result,
    vec3_sub,
    vec3_scale,
    vec3_dot,
    vec3_cross,
    vec3_norm,
};
use crate::vasp_parsers::poscar::{
    CoordMode,
    Poscar,
    POSITION_SNAP_TOL,
};
use crate::extensions::{
    get_centered_around,
    get_neighbors,
};


/// Angle formed at the middle ion of `(a, center, b)`, in radians unless
/// `degrees` is set.
///
/// Computed from unit vectors in cartesian space as asin(|cross|), with the
/// sign of the dot product recovering obtuse angles; this keeps precision for
/// small angles where acos would lose it.
pub fn bond_angle(poscar: &Poscar, indices: (usize, usize, usize), degrees: bool) -> Result<f64> {
    let mut p = poscar.clone();
    p.to_cartesian()?;

    let center = p.ions.get(indices.1)
        .context(format!("No ion at index {}", indices.1))?
        .position;
    let p = get_centered_around(&p, &center, CoordMode::Cartesian)?;

    let pos_a = p.ions.get(indices.0)
        .context(format!("No ion at index {}", indices.0))?
        .position;
    let pos_b = p.ions.get(indices.2)
        .context(format!("No ion at index {}", indices.2))?
        .position;

    let mut ra = vec3_sub(&pos_a, &center);
    let mut rb = vec3_sub(&pos_b, &center);
    let (na, nb) = (vec3_norm(&ra), vec3_norm(&rb));
    if na <= POSITION_SNAP_TOL || nb <= POSITION_SNAP_TOL {
        bail!("Bond angle is undefined for coincident ions {:?}", indices);
    }
    ra = vec3_scale(&ra, 1.0 / na);
    rb = vec3_scale(&rb, 1.0 / nb);

    let mag = vec3_norm(&vec3_cross(&ra, &rb)).min(1.0);
    let mut theta = mag.asin();
    if vec3_dot(&ra, &rb) < 0.0 {
        theta = PI - theta;
    }
    if degrees {
        theta *= 180.0 / PI;
    }
    Ok(theta)
}


/// All angles of the form a-center-b found by a periodic neighbor search
/// around every ion of the center species.
///
/// For each center, unordered neighbor pairs are enumerated in selection
/// order and kept when the first member matches `species_a` and the second
/// matches `species_b`.
pub fn all_bond_angles(
    poscar: &Poscar,
    chain: (&str, &str, &str),
    max_bondlength: f64,
    degrees: bool,
) -> Result<Vec<f64>> {
    let (species_a, species_center, species_b) =
        (chain.0.trim(), chain.1.trim(), chain.2.trim());
    for sp in [species_a, species_center, species_b] {
        if !poscar.species.contains_key(sp) {
            bail!("Could not find species {} in structure {:?}", sp, poscar.comment);
        }
    }

    let centers: Vec<usize> = poscar.ions.iter()
        .filter(|(_, ion)| ion.species == species_center)
        .map(|(i, _)| i)
        .collect();

    let mut angles = vec![];
    for i in centers {
        let neighbors = get_neighbors(poscar, i, max_bondlength, CoordMode::Cartesian, true)?;
        if neighbors.len() < 2 {
            continue;
        }
        let entries: Vec<_> = neighbors.iter().collect();
        for (&(jj, ion_a), &(kk, ion_b)) in entries.iter().tuple_combinations() {
            if ion_a.species != species_a || ion_b.species != species_b {
                continue;
            }
            angles.push(bond_angle(poscar, (jj, i, kk), degrees)?);
        }
    }
    Ok(angles)
}


/// Number of periodic neighbors within `max_bondlength` for each requested
/// ion, optionally restricted to a species subset.
pub fn coordination_number(
    poscar: &Poscar,
    indices: &[usize],
    max_bondlength: f64,
    species_filter: Option<&[String]>,
) -> Result<Vec<usize>> {
    let mut p = poscar.clone();
    p.to_cartesian()?;

    let mut counts = Vec::with_capacity(indices.len());
    for &i in indices {
        let neighbors = get_neighbors(&p, i, max_bondlength, CoordMode::Cartesian, true)?;
        let n = match species_filter {
            None => neighbors.len(),
            Some(filter) => neighbors.iter()
                .filter(|(_, ion)| filter.iter().any(|sp| sp == &ion.species))
                .count(),
        };
        counts.push(n);
    }
    Ok(counts)
}


/// Coordination number of every ion belonging to one species.
pub fn all_species_coordination_number(
    poscar: &Poscar,
    species: &str,
    max_bondlength: f64,
    species_filter: Option<&[String]>,
) -> Result<Vec<usize>> {
    let indices: Vec<usize> = poscar.ions.iter()
        .filter(|(_, ion)| ion.species == species)
        .map(|(i, _)| i)
        .collect();
    coordination_number(poscar, &indices, max_bondlength, species_filter)
}


#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use indexmap::IndexMap;
    use crate::vasp_parsers::poscar::{Ion, Ions};

    fn cell(blocks: &[(&str, &[[f64; 3]])]) -> Poscar {
        let mut species = IndexMap::new();
        let mut ions = Ions::new();
        let mut index = 0;
        for (sp, positions) in blocks {
            species.insert(sp.to_string(), positions.len());
            for p in positions.iter() {
                ions.push(index, Ion {
                    position: *p,
                    species: sp.to_string(),
                    selective_dynamics: [true; 3],
                    velocity: [0.0; 3],
                }).unwrap();
                index += 1;
            }
        }
        Poscar {
            comment: "analysis cell".to_string(),
            scale: [1.0; 3],
            lattice: [[10.0, 0.0, 0.0], [0.0, 10.0, 0.0], [0.0, 0.0, 10.0]],
            species,
            selective_dynamics: false,
            mode: CoordMode::Direct,
            ions,
            lattice_velocity: None,
            mdextra: None,
        }
    }

    #[test]
    fn test_bond_angle_colinear() {
        // Outer ions exactly opposite across the center.
        let p = cell(&[("O", &[[0.4, 0.5, 0.5], [0.6, 0.5, 0.5]][..]),
                       ("Si", &[[0.5, 0.5, 0.5]][..])]);
        let theta = bond_angle(&p, (0, 2, 1), false).unwrap();
        assert_abs_diff_eq!(theta, PI, epsilon = 1e-10);
        let theta = bond_angle(&p, (0, 2, 1), true).unwrap();
        assert_abs_diff_eq!(theta, 180.0, epsilon = 1e-8);
    }

    #[test]
    fn test_bond_angle_right_angle_label_order() {
        let p = cell(&[("O", &[[0.6, 0.5, 0.5], [0.5, 0.6, 0.5]][..]),
                       ("Si", &[[0.5, 0.5, 0.5]][..])]);
        let ab = bond_angle(&p, (0, 2, 1), true).unwrap();
        let ba = bond_angle(&p, (1, 2, 0), true).unwrap();
        assert_abs_diff_eq!(ab, 90.0, epsilon = 1e-8);
        assert_abs_diff_eq!(ab, ba, epsilon = 1e-12);
    }

    #[test]
    fn test_bond_angle_across_boundary() {
        // The triplet spans the cell edge; re-centering must heal it.
        let p = cell(&[("O", &[[0.95, 0.5, 0.5], [0.05, 0.5, 0.5]][..]),
                       ("Si", &[[0.0, 0.5, 0.5]][..])]);
        let theta = bond_angle(&p, (0, 2, 1), true).unwrap();
        assert_abs_diff_eq!(theta, 180.0, epsilon = 1e-8);
    }

    #[test]
    fn test_bond_angle_coincident_errors() {
        let p = cell(&[("O", &[[0.5, 0.5, 0.5], [0.6, 0.5, 0.5]][..]),
                       ("Si", &[[0.5, 0.5, 0.5]][..])]);
        assert!(bond_angle(&p, (0, 2, 1), false).is_err());
    }

    #[test]
    fn test_all_bond_angles_water_like() {
        // One center with two hydrogens at 90 degrees.
        let p = cell(&[("H", &[[0.6, 0.5, 0.5], [0.5, 0.6, 0.5]][..]),
                       ("O", &[[0.5, 0.5, 0.5]][..])]);
        let angles = all_bond_angles(&p, ("H", "O", "H"), 1.5, true).unwrap();
        assert_eq!(angles.len(), 1);
        assert_abs_diff_eq!(angles[0], 90.0, epsilon = 1e-8);

        // Unknown species fails fast.
        assert!(all_bond_angles(&p, ("H", "N", "H"), 1.5, true).is_err());

        // Species pair matching is order-sensitive.
        let none = all_bond_angles(&p, ("O", "O", "H"), 1.5, true).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_coordination_number() {
        // Center with 4 oxygens 1 A away, 2 hydrogens 2 A away.
        let p = cell(&[
            ("O",  &[[0.6, 0.5, 0.5], [0.4, 0.5, 0.5], [0.5, 0.6, 0.5], [0.5, 0.4, 0.5]][..]),
            ("H",  &[[0.5, 0.5, 0.7], [0.5, 0.5, 0.3]][..]),
            ("Si", &[[0.5, 0.5, 0.5]][..]),
        ]);
        let counts = coordination_number(&p, &[6], 1.5, None).unwrap();
        assert_eq!(counts, vec![4]);
        let counts = coordination_number(&p, &[6], 2.5, None).unwrap();
        assert_eq!(counts, vec![6]);
        let filter = vec!["O".to_string()];
        let counts = coordination_number(&p, &[6], 2.5, Some(&filter)).unwrap();
        assert_eq!(counts, vec![4]);

        let all = all_species_coordination_number(&p, "Si", 1.5, None).unwrap();
        assert_eq!(all, vec![4]);
    }
}
