//! Spatial queries and structure editing over `Poscar`.
//!
//! Periodic queries work by re-centering: the cell is re-expressed so the
//! point of interest sits at the direct-space origin, everything is wrapped
//! back into [0,1), and the nearest periodic image of each ion is picked by a
//! {0,+1,-1} shift per axis. This avoids generating all 27 images explicitly.

use std::collections::HashSet;

use anyhow::{
    bail,
    Context,
};
use clap::ValueEnum;
use log::warn;

use crate::types::{
    Result,
    Vec3,
    mat33_transpose,
    mat33_inv,
    mat33_dot_vec3,
    vec3_add,
    vec3_sub,
    vec3_scale,
    vec3_dot,
    vec3_norm,
};
use crate::vasp_parsers::poscar::{
    CoordMode,
    Ion,
    Ions,
    Poscar,
    POSITION_SNAP_TOL,
};


/// Translate every ion in a selection by a fixed offset.
/// The offset shares the units of the selection's source structure.
pub fn translate(ions: &Ions, r: &Vec3<f64>) -> Ions {
    let mut ret = ions.clone();
    for (_, ion) in ret.iter_mut() {
        ion.position = vec3_add(&ion.position, r);
    }
    ret
}


/// Return a copy of the structure where every ion has been shifted to the
/// periodic image closest to `point`.
///
/// `point` is interpreted in `mode` and converted to direct internally. Any
/// fractional difference beyond 0.5 on an axis pulls the ion one lattice unit
/// toward the point on that axis.
pub fn get_centered_around(poscar: &Poscar, point: &Vec3<f64>, mode: CoordMode) -> Result<Poscar> {
    let mut cp = poscar.clone();
    let converted = cp.is_cartesian();
    cp.to_direct()?;

    let point = match mode {
        CoordMode::Direct => *point,
        CoordMode::Cartesian => {
            let ainv = mat33_inv(&mat33_transpose(&poscar.lattice))?;
            mat33_dot_vec3(&ainv, point)
        },
    };

    cp.constrain()?;
    for (_, ion) in cp.ions.iter_mut() {
        for k in 0 .. 3 {
            let c = ion.position[k] - point[k];
            if c.abs() > 0.5 {
                ion.position[k] -= c.signum();
            }
        }
    }

    if converted {
        cp.to_cartesian()?;
    }
    Ok(cp)
}


/// Select every ion within a sphere around an arbitrary point.
///
/// Distances are measured in `mode`'s coordinate space; a direct-mode radius
/// is distorted by the lattice shape. The returned positions are expressed in
/// the source structure's own mode so the selection can be written back.
pub fn get_select_sphere(
    poscar: &Poscar,
    center: &Vec3<f64>,
    radius: f64,
    mode: CoordMode,
    periodic: bool,
) -> Result<Ions> {
    let mut cp = poscar.clone();
    let converted = cp.mode != mode;
    if converted {
        cp.toggle_mode()?;
    }

    if periodic {
        cp = get_centered_around(&cp, center, mode)?;
    }

    let mut selection = Ions::new();
    for (i, ion) in cp.ions.iter() {
        let d = vec3_norm(&vec3_sub(&ion.position, center));
        if d <= radius {
            selection.push(i, ion.clone())?;
        }
    }

    if converted {
        restore_mode(&mut selection, poscar)?;
    }
    Ok(selection)
}


/// Select every ion within a sphere around the ion at `index`, excluding that
/// ion itself. Exclusion is by originating index, so a different ion sharing
/// the same position is still reported.
pub fn get_neighbors(
    poscar: &Poscar,
    index: usize,
    radius: f64,
    mode: CoordMode,
    periodic: bool,
) -> Result<Ions> {
    let mut cp = poscar.clone();
    let converted = cp.mode != mode;
    if converted {
        cp.toggle_mode()?;
    }

    let center = cp.ions.get(index)
        .context(format!("No ion at index {}", index))?
        .position;
    let mut selection = get_select_sphere(&cp, &center, radius, mode, periodic)?;
    selection.retain(|i, _| i != index);

    if converted {
        restore_mode(&mut selection, poscar)?;
    }
    Ok(selection)
}


/// Select ions whose coordinates lie inside the literal [lo, hi] range on
/// each constrained axis. No periodic images are considered.
pub fn get_select_box(
    poscar: &Poscar,
    ranges: &[Option<[f64; 2]>; 3],
    mode: CoordMode,
) -> Result<Ions> {
    let mut cp = poscar.clone();
    if cp.mode != mode {
        cp.toggle_mode()?;
    }

    let mut selection = Ions::new();
    for (i, ion) in cp.ions.iter() {
        let inside = ranges.iter()
            .zip(ion.position.iter())
            .all(|(range, x)| match range {
                None => true,
                Some([lo, hi]) => lo <= x && x <= hi,
            });
        if inside {
            // Clone from the source so positions stay in its mode.
            let original = poscar.ions.get(i)
                .context(format!("No ion at index {}", i))?;
            selection.push(i, original.clone())?;
        }
    }
    Ok(selection)
}


/// Walk outward from a starting ion, admitting any ion within `jump_distance`
/// (cartesian) of an already-admitted one, breadth first.
///
/// Expansion from a node stops once its jump depth reaches `extent`. With
/// `hydrogen_termination`, an admitted hydrogen becomes a leaf; the start ion
/// always expands even when it is hydrogen. Neighbors are examined in
/// ascending master-list index order, so the result is deterministic.
pub fn get_select_chain(
    poscar: &Poscar,
    start_index: usize,
    jump_distance: f64,
    extent: usize,
    species_blacklist: &[String],
    index_blacklist: &[usize],
    hydrogen_termination: bool,
) -> Result<Ions> {
    let blacklist: Vec<String> = species_blacklist.iter()
        .map(|s| s.to_ascii_lowercase())
        .collect();
    let jump_distance2 = jump_distance * jump_distance;

    let start_ion = poscar.ions.get(start_index)
        .context(format!("No ion at index {}", start_index))?
        .clone();
    let mut selection = Ions::from_pairs(vec![(start_index, start_ion)])?;
    let mut jumps = vec![0usize];

    let mut cursor = 0usize;
    while cursor < selection.len() {
        let Some((i, ion)) = selection.nth(cursor) else { break; };
        let jump = jumps[cursor];
        let is_hydrogen = ion.species.eq_ignore_ascii_case("H");
        let position = ion.position;

        if jump >= extent {
            cursor += 1;
            continue;
        }
        if hydrogen_termination && cursor != 0 && is_hydrogen {
            cursor += 1;
            continue;
        }

        let mut centered = get_centered_around(poscar, &position, poscar.mode)?;
        centered.to_cartesian()?;
        let focus = centered.ions.get(i)
            .context(format!("No ion at index {}", i))?
            .position;

        let mut admitted = vec![];
        for (j, other) in centered.ions.iter() {
            if selection.contains_index(j) || admitted.contains(&j) {
                continue;
            }
            if blacklist.contains(&other.species.to_ascii_lowercase()) {
                continue;
            }
            if index_blacklist.contains(&j) {
                continue;
            }
            let d = vec3_sub(&other.position, &focus);
            if vec3_dot(&d, &d) > jump_distance2 {
                continue;
            }
            admitted.push(j);
        }

        for j in admitted {
            let ion = poscar.ions.get(j)
                .context(format!("No ion at index {}", j))?
                .clone();
            selection.push(j, ion)?;
            jumps.push(jump + 1);
        }
        cursor += 1;
    }

    Ok(selection)
}


/// Stretch each lattice vector along its own direction by `depth` (Å,
/// divided by that axis's scale factor) without moving any ion's cartesian
/// position. The original mode is restored afterward.
pub fn add_vacuum(poscar: &mut Poscar, depth: &Vec3<f64>) -> Result<()> {
    let converted = poscar.is_direct();
    poscar.to_cartesian()?;

    for k in 0 .. 3 {
        let norm = vec3_norm(&poscar.lattice[k]);
        if norm <= POSITION_SNAP_TOL {
            bail!("Lattice vector {} has zero length, cannot add vacuum along it", k + 1);
        }
        let stretch = 1.0 + depth[k] / poscar.scale[k] / norm;
        poscar.lattice[k] = vec3_scale(&poscar.lattice[k], stretch);
    }

    if converted {
        poscar.to_direct()?;
    }
    Ok(())
}


/// What happens to ions outside the painted box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnselectedPolicy {
    /// Leave existing flags untouched.
    Preserve,
    /// Force fully free (T T T).
    Free,
    /// Force fully fixed (F F F).
    Fixed,
}


/// Paint selective dynamics flags on every ion inside the box, applying the
/// unselected policy everywhere else. Enables selective dynamics on the
/// structure as a side effect. Returns the number of ions painted.
pub fn set_dynamics_box(
    poscar: &mut Poscar,
    ranges: &[Option<[f64; 2]>; 3],
    flags: [bool; 3],
    mode: CoordMode,
    unselected: UnselectedPolicy,
) -> Result<usize> {
    let selection = get_select_box(poscar, ranges, mode)?;

    for (i, ion) in poscar.ions.iter_mut() {
        if selection.contains_index(i) {
            ion.selective_dynamics = flags;
        } else {
            match unselected {
                UnselectedPolicy::Preserve => {},
                UnselectedPolicy::Free     => ion.selective_dynamics = [true; 3],
                UnselectedPolicy::Fixed    => ion.selective_dynamics = [false; 3],
            }
        }
    }
    poscar.selective_dynamics = true;
    Ok(selection.len())
}


/// How a boundary-crossing ion is placed in interpolated frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BoundaryResolver {
    /// Hold the first anchor's position until the final frame.
    First,
    /// Hold the second anchor's position from frame 1 onward.
    Last,
}


/// How disagreeing selective dynamics flags are resolved between anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DynamicsResolver {
    First,
    Last,
    Free,
    Fixed,
}


/// Linearly interpolate `images` intermediate frames between two structures.
///
/// Returns `images + 2` independent snapshots; frame 0 and the last frame
/// reproduce the anchors verbatim. An ion whose coordinate changes sign on
/// any axis between the anchors is treated as crossing a cell boundary and
/// placed by the boundary resolver instead of the naive interpolation; if no
/// resolver was chosen a warning is issued and `First` is used.
pub fn interpolate(
    poscar1: &Poscar,
    poscar2: &Poscar,
    images: usize,
    boundary_resolver: Option<BoundaryResolver>,
    dynamics_resolver: Option<DynamicsResolver>,
    selective_dynamics: bool,
) -> Result<Vec<Poscar>> {
    let mut p2 = poscar2.clone();
    if p2.mode != poscar1.mode {
        p2.toggle_mode()?;
    }

    if poscar1.ions.len() != p2.ions.len() {
        bail!("Number of ions do not match: {} vs {}",
              poscar1.ions.len(), p2.ions.len());
    }

    let mut crossers: HashSet<usize> = HashSet::new();
    for ((i, a), (_, b)) in poscar1.ions.iter().zip(p2.ions.iter()) {
        let crossed = a.position.iter()
            .zip(b.position.iter())
            .any(|(x, y)| x * y < 0.0);
        if crossed {
            warn!("Ion {} crossed a cell boundary between anchors", i);
            crossers.insert(i);
        }
    }

    let boundary_resolver = match boundary_resolver {
        Some(r) => r,
        None => {
            if !crossers.is_empty() {
                warn!("No boundary resolver chosen, falling back to \"first\"");
            }
            BoundaryResolver::First
        },
    };

    let nframes = images + 2;
    let mut frames = Vec::with_capacity(nframes);
    let mut dynamics_warned = false;

    for f in 0 .. nframes {
        let mut frame = poscar1.clone();
        frame.selective_dynamics = selective_dynamics;

        let mut ions = Ions::new();
        for ((j, a), (_, b)) in poscar1.ions.iter().zip(p2.ions.iter()) {
            let position = if crossers.contains(&j) {
                match boundary_resolver {
                    BoundaryResolver::First => {
                        if f < nframes - 1 { a.position } else { b.position }
                    },
                    BoundaryResolver::Last => {
                        if f == 0 { a.position } else { b.position }
                    },
                }
            } else if f == 0 {
                a.position
            } else if f == nframes - 1 {
                b.position
            } else {
                let t = f as f64 / (images + 1) as f64;
                vec3_add(&a.position, &vec3_scale(&vec3_sub(&b.position, &a.position), t))
            };

            let flags = if !selective_dynamics || a.selective_dynamics == b.selective_dynamics {
                a.selective_dynamics
            } else {
                let resolver = dynamics_resolver.unwrap_or(DynamicsResolver::Free);
                if !dynamics_warned {
                    dynamics_warned = true;
                    warn!("Ion {} selective dynamics disagreed, resolving with {:?}", j, resolver);
                }
                match resolver {
                    DynamicsResolver::First => a.selective_dynamics,
                    DynamicsResolver::Last  => b.selective_dynamics,
                    DynamicsResolver::Free  => [true; 3],
                    DynamicsResolver::Fixed => [false; 3],
                }
            };

            ions.push(j, Ion {
                position,
                species: a.species.clone(),
                selective_dynamics: flags,
                velocity: [0.0; 3],
            })?;
        }
        frame.ions = ions;
        frames.push(frame);
    }

    Ok(frames)
}


// Selections computed in a temporary mode are handed back in the source
// structure's own mode so they remain valid for edit_ions.
fn restore_mode(selection: &mut Ions, source: &Poscar) -> Result<()> {
    let a = mat33_transpose(&source.lattice);
    let transform = match source.mode {
        CoordMode::Direct    => mat33_inv(&a)?,
        CoordMode::Cartesian => a,
    };
    for (_, ion) in selection.iter_mut() {
        ion.apply_transformation(&transform, POSITION_SNAP_TOL);
    }
    Ok(())
}
