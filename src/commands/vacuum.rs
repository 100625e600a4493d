use std::path::PathBuf;

use clap::Args;
use log::info;

use crate::{
    types::Result,
    cli::OptProcess,
    vasp_parsers::poscar::Poscar,
    extensions::add_vacuum,
    commands::default_output,
};


#[derive(Debug, Args)]
/// Add vacuum layers to a POSCAR along its lattice vectors.
pub struct Vacuum {
    /// Input POSCAR file
    input: PathBuf,

    #[arg(num_args = 3, required = true, value_names = ["A", "B", "C"])]
    /// Vacuum depth in Angstroms along the a, b and c lattice vectors
    depth: Vec<f64>,

    #[arg(short, long)]
    /// Output file [default: "<stem>_vacuum<suffix>"]
    output: Option<PathBuf>,

    #[arg(long)]
    /// Parse and edit but do not write anything to disk
    no_write: bool,
}


impl OptProcess for Vacuum {
    fn process(&self) -> Result<()> {
        let depth = [self.depth[0], self.depth[1], self.depth[2]];
        info!("Adding vacuum depth {:?} A to {:?}", depth, self.input);

        let mut poscar = Poscar::from_file(&self.input)?;
        add_vacuum(&mut poscar, &depth)?;

        if self.no_write {
            info!("No changes written");
            return Ok(());
        }

        let output = default_output(&self.input, self.output.as_ref(), "vacuum");
        poscar.to_file(&output)?;
        info!("Changes written to {:?}", output);
        Ok(())
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct Cli {
        #[command(flatten)]
        vacuum: Vacuum,
    }

    #[test]
    fn test_depth_is_required() {
        assert!(Cli::try_parse_from(["vacuum", "POSCAR"]).is_err());
        assert!(Cli::try_parse_from(["vacuum", "POSCAR", "0", "5"]).is_err());

        let cli = Cli::try_parse_from(["vacuum", "POSCAR", "0", "0", "5"]).unwrap();
        assert_eq!(cli.vacuum.depth, vec![0.0, 0.0, 5.0]);
    }
}
