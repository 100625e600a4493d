use std::path::PathBuf;

use anyhow::bail;
use clap::Args;
use log::info;

use crate::{
    types::Result,
    cli::OptProcess,
    vasp_parsers::poscar::Poscar,
    analyze::all_bond_angles,
};


#[derive(Debug, Args)]
/// Measure every A-B-C bond angle in a structure.
pub struct Angles {
    /// Input POSCAR file
    input: PathBuf,

    /// Species chain with the vertex in the middle, e.g. "H-O-H"
    chain: String,

    /// Maximum length of a bond in Angstroms
    max_bondlength: f64,

    #[arg(short, long)]
    /// Report angles in degrees instead of radians
    degrees: bool,
}


impl OptProcess for Angles {
    fn process(&self) -> Result<()> {
        let species: Vec<&str> = self.chain.split('-').collect();
        let [a, b, c] = species[..] else {
            bail!("Expected a chain of three species like \"H-O-H\", got {:?}", self.chain);
        };

        info!("Measuring {}-{}-{} angles in {:?} with bonds up to {} A",
              a, b, c, self.input, self.max_bondlength);

        let poscar = Poscar::from_file(&self.input)?;
        let angles = all_bond_angles(&poscar, (a, b, c), self.max_bondlength, self.degrees)?;
        let unit = if self.degrees { "deg" } else { "rad" };

        for angle in &angles {
            println!("{:>12.6} {}", angle, unit);
        }
        if angles.is_empty() {
            info!("No {}-{}-{} angles found", a, b, c);
        } else {
            let mean = angles.iter().sum::<f64>() / angles.len() as f64;
            info!("Found {} angles, mean {:.6} {}", angles.len(), mean, unit);
        }
        Ok(())
    }
}
