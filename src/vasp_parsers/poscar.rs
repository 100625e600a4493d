use std::{
    collections::HashSet,
    fmt,
    fs,
    path::Path,
    str::FromStr,
};

use anyhow::{
    bail,
    Context,
};
use clap::ValueEnum;
use indexmap::IndexMap;
use regex::Regex;

use crate::types::{
    Result,
    Mat33,
    MatX3,
    Vec3,
    mat33_transpose,
    mat33_inv,
    mat33_dot_vec3,
};


/// Positions with |component| at or below this threshold are snapped to zero
/// after a coordinate transformation. True values below it are lost, which is
/// accepted to clean up noise from direct <-> cartesian round trips.
pub const POSITION_SNAP_TOL: f64 = 1e-8;


/// Position mode of a POSCAR. The single source of truth for how every ion's
/// coordinates must be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CoordMode {
    Direct,
    Cartesian,
}

impl FromStr for CoordMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('d')             => Ok(CoordMode::Direct),
            Some('c') | Some('k') => Ok(CoordMode::Cartesian),
            _ => bail!("Unknown position mode: {:?}", s),
        }
    }
}

impl fmt::Display for CoordMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordMode::Direct    => write!(f, "Direct"),
            CoordMode::Cartesian => write!(f, "Cartesian"),
        }
    }
}


/// An atom or ion contained within a POSCAR.
///
/// Carries no position mode of its own; the units of `position` only make
/// sense in the context of the owning structure's mode.
#[derive(Debug, Clone, PartialEq)]
pub struct Ion {
    pub position:           Vec3<f64>,
    pub species:            String,
    pub selective_dynamics: [bool; 3],
    pub velocity:           Vec3<f64>,
}

impl Default for Ion {
    fn default() -> Self {
        Self {
            position:           [0.0; 3],
            species:            "H".to_string(),
            selective_dynamics: [true; 3],
            velocity:           [0.0; 3],
        }
    }
}

impl Ion {
    /// Transform the position by a 3x3 matrix, snapping any resulting
    /// component with |x| <= tol to exactly zero.
    ///
    /// This is the only legal way to move an ion between coordinate frames.
    pub fn apply_transformation(&mut self, transform: &Mat33<f64>, tol: f64) {
        let mut r = mat33_dot_vec3(transform, &self.position);
        for x in r.iter_mut() {
            if x.abs() <= tol {
                *x = 0.0;
            }
        }
        self.position = r;
    }

    /// Convert a slice of selective dynamics tags ("T"/"F") to booleans.
    ///
    /// Errors on wrong length or any character other than 'T' or 'F'.
    pub fn flags_from_chars(tags: &[impl AsRef<str>]) -> Result<[bool; 3]> {
        if tags.len() != 3 {
            bail!("Bad selective dynamics length on ion: expected 3 flags, got {}", tags.len());
        }
        let mut flags = [false; 3];
        for (f, t) in flags.iter_mut().zip(tags.iter()) {
            *f = match t.as_ref() {
                "T" => true,
                "F" => false,
                c   => bail!("Bad selective dynamics character on ion: {:?}", c),
            };
        }
        Ok(flags)
    }
}


/// An ordered selection of ions, each paired with its index into the master
/// ion list of the POSCAR it was derived from.
///
/// The pairing is stored as one sequence so an ion can never lose its index;
/// indices are unique within one selection. A POSCAR's own master list is an
/// `Ions` with contiguous indices 0..N-1 in species-block order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ions {
    entries: Vec<(usize, Ion)>,
}

impl Ions {
    pub fn new() -> Self {
        Self { entries: vec![] }
    }

    pub fn from_pairs(entries: Vec<(usize, Ion)>) -> Result<Self> {
        let mut seen = HashSet::new();
        for (i, _) in entries.iter() {
            if !seen.insert(*i) {
                bail!("Duplicate ion index {} in selection", i);
            }
        }
        Ok(Self { entries })
    }

    pub fn push(&mut self, index: usize, ion: Ion) -> Result<()> {
        if self.contains_index(index) {
            bail!("Duplicate ion index {} in selection", index);
        }
        self.entries.push((index, ion));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_index(&self, index: usize) -> bool {
        self.entries.iter().any(|(i, _)| *i == index)
    }

    /// Look up an ion by its index in the source POSCAR.
    pub fn get(&self, index: usize) -> Option<&Ion> {
        self.entries.iter().find(|(i, _)| *i == index).map(|(_, ion)| ion)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Ion> {
        self.entries.iter_mut().find(|(i, _)| *i == index).map(|(_, ion)| ion)
    }

    /// The entry at a given position in the selection order.
    pub fn nth(&self, n: usize) -> Option<(usize, &Ion)> {
        self.entries.get(n).map(|(i, ion)| (*i, ion))
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Ion)> {
        self.entries.iter().map(|(i, ion)| (*i, ion))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut Ion)> {
        self.entries.iter_mut().map(|(i, ion)| (*i, ion))
    }

    pub fn indices(&self) -> Vec<usize> {
        self.entries.iter().map(|(i, _)| *i).collect()
    }

    pub fn retain(&mut self, mut pred: impl FnMut(usize, &Ion) -> bool) {
        self.entries.retain(|(i, ion)| pred(*i, ion));
    }
}

impl IntoIterator for Ions {
    type Item = (usize, Ion);
    type IntoIter = std::vec::IntoIter<(usize, Ion)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}


/// A parsed POSCAR structure file.
///
/// Lattice vectors are stored as rows of `lattice`. `species` maps each
/// species label to its ion count, in file order; the master ion list is
/// blocked by species in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct Poscar {
    pub comment:            String,
    pub scale:              Vec3<f64>,
    pub lattice:            Mat33<f64>,
    pub species:            IndexMap<String, usize>,
    pub selective_dynamics: bool,
    pub mode:               CoordMode,
    pub ions:               Ions,
    /// Lattice velocities from an MD run. Not populated by the reader.
    pub lattice_velocity:   Option<MatX3<f64>>,
    /// Trailing MD extra block. Not populated by the reader.
    pub mdextra:            Option<String>,
}

impl Poscar {
    pub fn from_file(path: &(impl AsRef<Path> + ?Sized)) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .context(format!("Failed to read POSCAR file {:?}", path.as_ref()))?;
        Self::from_txt(&content)
            .context(format!("Failed to parse POSCAR file {:?}", path.as_ref()))
    }

    pub fn from_txt(content: &str) -> Result<Self> {
        const EOF: &str = "POSCAR ended early, expected";
        let mut lines = content.lines();

        let comment = lines.next().context(format!("{} comment line", EOF))?
            .trim_end().to_string();

        // One scale factor applies to all three axes, three apply per-axis.
        let scale_tokens = lines.next().context(format!("{} scaling factors", EOF))?
            .split_whitespace()
            .map(|t| t.parse::<f64>().context(format!("Invalid scaling factor {:?}", t)))
            .collect::<Result<Vec<f64>>>()?;
        let scale: Vec3<f64> = match scale_tokens.len() {
            1 => [scale_tokens[0]; 3],
            3 => [scale_tokens[0], scale_tokens[1], scale_tokens[2]],
            n => bail!("Wrong number of scaling factors supplied in POSCAR: {}", n),
        };

        let mut lattice = [[0.0f64; 3]; 3];
        for (i, row) in lattice.iter_mut().enumerate() {
            let line = lines.next().context(format!("{} lattice vector", EOF))?;
            let v = line.split_whitespace()
                .map(|t| t.parse::<f64>()
                     .context(format!("Invalid lattice component {:?} on vector {}", t, i + 1)))
                .collect::<Result<Vec<f64>>>()?;
            if v.len() != 3 {
                bail!("Lattice vector {} has {} components, expected 3", i + 1, v.len());
            }
            row.copy_from_slice(&v);
        }

        // The species line is optional; present iff purely alphabetic.
        let mut line = lines.next().context(format!("{} ion counts", EOF))?;
        let mut species_names: Vec<String> = vec![];
        let is_species_line = !line.trim().is_empty()
            && line.chars().filter(|c| !c.is_whitespace()).all(|c| c.is_alphabetic());
        if is_species_line {
            species_names = line.split_whitespace().map(capitalize).collect();
            line = lines.next().context(format!("{} ion counts", EOF))?;
        }

        let counts = line.split_whitespace()
            .map(|t| t.parse::<usize>().context(format!("Invalid ion count {:?}", t)))
            .collect::<Result<Vec<usize>>>()?;
        if species_names.is_empty() {
            // Placeholder labels for files without a species line.
            species_names = (0 .. counts.len()).map(|i| format!("H{}", i + 1)).collect();
        } else if species_names.len() != counts.len() {
            bail!("Mismatch between species and ion counts: {} species, {} counts",
                  species_names.len(), counts.len());
        }
        let species: IndexMap<String, usize> = species_names.iter()
            .cloned()
            .zip(counts.iter().cloned())
            .collect();

        let mut line = lines.next().context(format!("{} position mode", EOF))?;
        let mut selective_dynamics = false;
        if matches!(line.trim_start().chars().next(), Some('s') | Some('S')) {
            selective_dynamics = true;
            line = lines.next().context(format!("{} position mode", EOF))?;
        }

        let mode = line.trim().parse::<CoordMode>()?;

        let mut ions = Ions::new();
        let mut index = 0usize;
        for (sp, count) in species.iter() {
            for _ in 0 .. *count {
                let line = lines.next().context(format!("{} ion position", EOF))?;
                let tokens = line.split_whitespace().collect::<Vec<&str>>();
                if tokens.len() < 3 {
                    bail!("Ion {} has {} coordinates, expected 3", index + 1, tokens.len());
                }
                let mut position = [0.0f64; 3];
                for (x, t) in position.iter_mut().zip(tokens.iter()) {
                    *x = t.parse::<f64>()
                        .context(format!("Invalid coordinate {:?} on ion {}", t, index + 1))?;
                }
                let flags = if selective_dynamics {
                    Ion::flags_from_chars(&tokens[3 .. tokens.len().min(6)])
                        .context(format!("Bad selective dynamics flags on ion {}", index + 1))?
                } else {
                    [true; 3]
                };
                ions.push(index, Ion {
                    position,
                    species: sp.clone(),
                    selective_dynamics: flags,
                    velocity: [0.0; 3],
                })?;
                index += 1;
            }
        }

        // Lattice/ion velocities and the MD extra block are not read.
        Ok(Self {
            comment,
            scale,
            lattice,
            species,
            selective_dynamics,
            mode,
            ions,
            lattice_velocity: None,
            mdextra: None,
        })
    }

    /// Write the POSCAR to a file, creating parent directories as needed.
    /// The full text is assembled before any byte reaches the disk.
    pub fn to_file(&self, path: &(impl AsRef<Path> + ?Sized)) -> Result<()> {
        let content = self.to_string();
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .context(format!("Failed to create directory {:?}", parent))?;
            }
        }
        fs::write(path.as_ref(), content)
            .context(format!("Failed to write POSCAR file {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn is_direct(&self) -> bool {
        self.mode == CoordMode::Direct
    }

    pub fn is_cartesian(&self) -> bool {
        self.mode == CoordMode::Cartesian
    }

    /// Switch the position mode, converting every ion position.
    pub fn toggle_mode(&mut self) -> Result<()> {
        match self.mode {
            CoordMode::Direct    => self.to_cartesian(),
            CoordMode::Cartesian => self.to_direct(),
        }
    }

    /// Convert all ion positions to fractions of the lattice vectors.
    /// No-op when already direct.
    pub fn to_direct(&mut self) -> Result<()> {
        if self.is_direct() {
            return Ok(());
        }
        let ainv = mat33_inv(&mat33_transpose(&self.lattice))?;
        for (_, ion) in self.ions.iter_mut() {
            ion.apply_transformation(&ainv, POSITION_SNAP_TOL);
        }
        self.mode = CoordMode::Direct;
        Ok(())
    }

    /// Convert all ion positions to cartesian lengths.
    /// No-op when already cartesian.
    pub fn to_cartesian(&mut self) -> Result<()> {
        if self.is_cartesian() {
            return Ok(());
        }
        let a = mat33_transpose(&self.lattice);
        for (_, ion) in self.ions.iter_mut() {
            ion.apply_transformation(&a, POSITION_SNAP_TOL);
        }
        self.mode = CoordMode::Cartesian;
        Ok(())
    }

    /// Wrap every ion back into the primary cell, keeping only the fractional
    /// part of each direct coordinate. The original mode is restored.
    pub fn constrain(&mut self) -> Result<()> {
        let converted = self.is_cartesian();
        if converted {
            self.to_direct()?;
        }
        for (_, ion) in self.ions.iter_mut() {
            for x in ion.position.iter_mut() {
                *x -= x.floor();
            }
        }
        if converted {
            self.to_cartesian()?;
        }
        Ok(())
    }

    /// Recount the species populations from the ion list and physically
    /// reorder the ions into contiguous species blocks.
    ///
    /// Species keep their first-seen order and are re-capitalized; the master
    /// list indices are reassigned to 0..N-1 afterward.
    pub fn reconcile_ions(&mut self) {
        let mut species: IndexMap<String, usize> = IndexMap::new();
        for (_, ion) in self.ions.iter_mut() {
            let sp = capitalize(&ion.species);
            *species.entry(sp.clone()).or_insert(0) += 1;
            ion.species = sp;
        }

        let mut blocked = Ions::new();
        let mut index = 0usize;
        for sp in species.keys() {
            for (_, ion) in self.ions.iter().filter(|(_, ion)| &ion.species == sp) {
                // Indices are unique by construction here.
                let _ = blocked.push(index, ion.clone());
                index += 1;
            }
        }

        self.species = species;
        self.ions = blocked;
    }

    /// Overwrite matching master-list ions from a selection, by index.
    /// The selection's positions must be in this POSCAR's mode.
    pub fn edit_ions(&mut self, selection: &Ions) -> Result<()> {
        for (i, ion) in selection.iter() {
            let slot = self.ions.get_mut(i)
                .context(format!("Selection index {} not present in POSCAR", i))?;
            *slot = ion.clone();
        }
        self.reconcile_ions();
        Ok(())
    }

    /// Remove the master-list ions named by a selection's indices.
    pub fn remove_ions(&mut self, selection: &Ions) -> Result<()> {
        for i in selection.indices() {
            if !self.ions.contains_index(i) {
                bail!("Selection index {} not present in POSCAR", i);
            }
        }
        let doomed: HashSet<usize> = selection.indices().into_iter().collect();
        self.ions.retain(|i, _| !doomed.contains(&i));
        self.reconcile_ions();
        Ok(())
    }
}

impl fmt::Display for Poscar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.comment)?;

        // Three equal scale factors collapse to the legacy single-value form.
        let s = &self.scale;
        if (s[1] - s[0]).abs() <= POSITION_SNAP_TOL && (s[2] - s[0]).abs() <= POSITION_SNAP_TOL {
            writeln!(f, "  {:>11.8}", s[0])?;
        } else {
            writeln!(f, "  {:>11.8}  {:>11.8}  {:>11.8}", s[0], s[1], s[2])?;
        }

        for v in self.lattice.iter() {
            writeln!(f, "    {:>11.8}  {:>11.8}  {:>11.8}", v[0], v[1], v[2])?;
        }

        // Skip the species line when every label is an auto-generated
        // placeholder from a file that had none.
        let placeholder = Regex::new(r"^H[0-9]+$").unwrap();
        if !self.species.keys().all(|sp| placeholder.is_match(sp)) {
            let names = self.species.keys()
                .map(|sp| format!("{:>6}", sp))
                .collect::<Vec<String>>()
                .join(" ");
            writeln!(f, "{}", names)?;
        }
        let counts = self.species.values()
            .map(|c| format!("{:>6}", c))
            .collect::<Vec<String>>()
            .join(" ");
        writeln!(f, "{}", counts)?;

        if self.selective_dynamics {
            writeln!(f, "Selective dynamics")?;
        }
        writeln!(f, "{}", self.mode)?;

        for (_, ion) in self.ions.iter() {
            let p = &ion.position;
            write!(f, "{:>11.8}  {:>11.8}  {:>11.8}", p[0], p[1], p[2])?;
            if self.selective_dynamics {
                let d = &ion.selective_dynamics;
                write!(f, " {} {} {}",
                       if d[0] { "T" } else { "F" },
                       if d[1] { "T" } else { "F" },
                       if d[2] { "T" } else { "F" })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}


fn capitalize(s: impl AsRef<str>) -> String {
    let lower = s.as_ref().to_ascii_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(c) => c.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    pub const SAMPLE: &str = "\
Cubic BN test
   1.0
    3.57000000  0.00000000  0.00000000
    0.00000000  3.57000000  0.00000000
    0.00000000  0.00000000  3.57000000
   B   N
   1   1
Selective dynamics
Direct
 0.00000000  0.00000000  0.00000000 T T T
 0.25000000  0.25000000  0.25000000 F F T
";

    #[test]
    fn test_parse_sample() {
        let p = Poscar::from_txt(SAMPLE).unwrap();
        assert_eq!(p.comment, "Cubic BN test");
        assert_eq!(p.scale, [1.0; 3]);
        assert_eq!(p.lattice[0], [3.57, 0.0, 0.0]);
        assert_eq!(p.species.get_index(0), Some((&"B".to_string(), &1)));
        assert_eq!(p.species.get_index(1), Some((&"N".to_string(), &1)));
        assert!(p.selective_dynamics);
        assert_eq!(p.mode, CoordMode::Direct);
        assert_eq!(p.ions.len(), 2);
        let (i, ion) = p.ions.nth(1).unwrap();
        assert_eq!(i, 1);
        assert_eq!(ion.species, "N");
        assert_eq!(ion.selective_dynamics, [false, false, true]);
        assert_eq!(ion.position, [0.25, 0.25, 0.25]);
    }

    #[test]
    fn test_parse_no_species_line() {
        let txt = "\
No symbols
1.0
  2.0 0.0 0.0
  0.0 2.0 0.0
  0.0 0.0 2.0
  1 2
Direct
 0.0 0.0 0.0
 0.5 0.5 0.5
 0.5 0.0 0.5
";
        let p = Poscar::from_txt(txt).unwrap();
        assert_eq!(p.species.get_index(0), Some((&"H1".to_string(), &1)));
        assert_eq!(p.species.get_index(1), Some((&"H2".to_string(), &2)));
        // Placeholder labels must not be written back out.
        assert!(!p.to_string().contains("H1"));
    }

    #[test]
    fn test_parse_failures() {
        // Two scale factors are neither the 1- nor 3-value form.
        let bad_scale = "c\n1.0 2.0\n1 0 0\n0 1 0\n0 0 1\n1\nDirect\n0 0 0\n";
        assert!(Poscar::from_txt(bad_scale).is_err());

        // Mode line must start with c, k or d.
        let bad_mode = "c\n1.0\n1 0 0\n0 1 0\n0 0 1\nSi\n1\nFoo\n0 0 0\n";
        assert!(Poscar::from_txt(bad_mode).is_err());

        // Species/count mismatch.
        let mismatch = "c\n1.0\n1 0 0\n0 1 0\n0 0 1\nSi O\n1\nDirect\n0 0 0\n";
        assert!(Poscar::from_txt(mismatch).is_err());

        // Invalid selective dynamics character.
        let bad_flag = "c\n1.0\n1 0 0\n0 1 0\n0 0 1\nSi\n1\nS\nDirect\n0 0 0 T X T\n";
        assert!(Poscar::from_txt(bad_flag).is_err());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Direct".parse::<CoordMode>().unwrap(), CoordMode::Direct);
        assert_eq!("d".parse::<CoordMode>().unwrap(), CoordMode::Direct);
        assert_eq!("Cartesian".parse::<CoordMode>().unwrap(), CoordMode::Cartesian);
        assert_eq!("K".parse::<CoordMode>().unwrap(), CoordMode::Cartesian);
        assert!("Foo".parse::<CoordMode>().is_err());
        assert!("".parse::<CoordMode>().is_err());
    }

    #[test]
    fn test_flags_from_chars() {
        assert_eq!(Ion::flags_from_chars(&["T", "F", "T"]).unwrap(), [true, false, true]);
        assert!(Ion::flags_from_chars(&["T", "F"]).is_err());
        assert!(Ion::flags_from_chars(&["T", "F", "x"]).is_err());
    }

    #[test]
    fn test_roundtrip_stable() {
        let p = Poscar::from_txt(SAMPLE).unwrap();
        let once = p.to_string();
        let twice = Poscar::from_txt(&once).unwrap().to_string();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_mode_conversion_idempotent() {
        let mut p = Poscar::from_txt(SAMPLE).unwrap();
        p.to_direct().unwrap();
        let before = p.clone();
        p.to_direct().unwrap();
        assert_eq!(p, before);

        p.to_cartesian().unwrap();
        let (_, ion) = p.ions.nth(1).unwrap();
        assert_abs_diff_eq!(ion.position[0], 0.25 * 3.57, epsilon = 1e-10);
        let cart = p.clone();
        p.to_cartesian().unwrap();
        assert_eq!(p, cart);
    }

    #[test]
    fn test_toggle_twice_recovers() {
        let mut p = Poscar::from_txt(SAMPLE).unwrap();
        let orig = p.clone();
        p.toggle_mode().unwrap();
        p.toggle_mode().unwrap();
        assert_eq!(p.mode, orig.mode);
        for ((_, a), (_, b)) in p.ions.iter().zip(orig.ions.iter()) {
            for (x, y) in a.position.iter().zip(b.position.iter()) {
                assert_abs_diff_eq!(x, y, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn test_constrain() {
        let mut p = Poscar::from_txt(SAMPLE).unwrap();
        p.ions.get_mut(0).unwrap().position = [1.25, -0.25, 0.5];
        p.constrain().unwrap();
        let ion = p.ions.get(0).unwrap();
        assert_abs_diff_eq!(ion.position[0], 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(ion.position[1], 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(ion.position[2], 0.50, epsilon = 1e-12);
        assert_eq!(p.mode, CoordMode::Direct);
    }

    #[test]
    fn test_reconcile_reorders_and_recounts() {
        let mut p = Poscar::from_txt(SAMPLE).unwrap();
        // Relabel the nitrogen as boron, lowercase on purpose.
        p.ions.get_mut(1).unwrap().species = "b".to_string();
        p.reconcile_ions();
        assert_eq!(p.species.get("B"), Some(&2));
        assert_eq!(p.species.len(), 1);
        assert_eq!(p.species.values().sum::<usize>(), p.ions.len());
        assert_eq!(p.ions.indices(), vec![0, 1]);
    }

    #[test]
    fn test_remove_ions() {
        let mut p = Poscar::from_txt(SAMPLE).unwrap();
        let doomed = Ions::from_pairs(vec![(0, p.ions.get(0).unwrap().clone())]).unwrap();
        p.remove_ions(&doomed).unwrap();
        assert_eq!(p.ions.len(), 1);
        assert_eq!(p.species.get("N"), Some(&1));
        assert_eq!(p.species.get("B"), None);
        assert_eq!(p.species.values().sum::<usize>(), p.ions.len());
    }

    #[test]
    fn test_ions_pairing_enforced() {
        let mut ions = Ions::new();
        ions.push(3, Ion::default()).unwrap();
        assert!(ions.push(3, Ion::default()).is_err());
        assert!(Ions::from_pairs(vec![
            (0, Ion::default()),
            (0, Ion::default()),
        ]).is_err());
    }
}
