use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use log::info;

use crate::{
    types::{
        Result,
        vec3_norm,
        vec3_sub,
    },
    cli::OptProcess,
    vasp_parsers::poscar::{
        CoordMode,
        Poscar,
    },
    extensions::{
        get_centered_around,
        get_neighbors,
    },
};


#[derive(Debug, Args)]
/// List the ions within a radius of a chosen ion.
pub struct Neighbors {
    /// Input POSCAR file
    input: PathBuf,

    /// Index of the central ion. Starts from 1
    index: usize,

    /// Search radius in Angstroms
    radius: f64,

    #[arg(long)]
    /// Ignore periodic images and search the literal cell contents only
    no_periodic: bool,
}


impl OptProcess for Neighbors {
    fn process(&self) -> Result<()> {
        info!("Searching {:?} for neighbors of ion {} within {} A",
              self.input, self.index, self.radius);

        let poscar = Poscar::from_file(&self.input)?;

        // Distances are physical, so do everything in cartesian.
        let mut cart = poscar.clone();
        cart.to_cartesian()?;

        let index = self.index.checked_sub(1)
            .context("Ion indices are counted from 1")?;
        let selection = get_neighbors(
            &cart, index, self.radius,
            CoordMode::Cartesian, !self.no_periodic)?;

        let center = cart.ions.get(index)
            .context(format!("No ion at index {}", self.index))?
            .position;
        let centered = if self.no_periodic {
            cart.clone()
        } else {
            get_centered_around(&cart, &center, CoordMode::Cartesian)?
        };

        println!("{:>6} {:>6} {:>10}", "index", "ion", "dist/A");
        for (i, _) in selection.iter() {
            let ion = centered.ions.get(i)
                .context(format!("No ion at index {}", i + 1))?;
            let d = vec3_norm(&vec3_sub(&ion.position, &center));
            println!("{:>6} {:>6} {:>10.4}", i + 1, ion.species, d);
        }
        info!("Found {} neighbors", selection.len());
        Ok(())
    }
}
