use std::path::PathBuf;

use clap::Args;
use log::info;

use crate::{
    types::Result,
    cli::OptProcess,
    vasp_parsers::poscar::{
        CoordMode,
        Poscar,
    },
    commands::default_output,
};


#[derive(Debug, Args)]
/// Convert a POSCAR between direct and cartesian coordinates.
pub struct Convert {
    /// Input POSCAR file
    input: PathBuf,

    #[arg(short, long, value_enum)]
    /// Convert to the given mode; toggles the current mode when omitted
    mode: Option<CoordMode>,

    #[arg(short, long)]
    /// Output file [default: "<stem>_convert<suffix>"]
    output: Option<PathBuf>,

    #[arg(long)]
    /// Parse and convert but do not write anything to disk
    no_write: bool,
}


impl OptProcess for Convert {
    fn process(&self) -> Result<()> {
        info!("Converting ion position mode of {:?}", self.input);

        let mut poscar = Poscar::from_file(&self.input)?;
        match self.mode {
            None                       => poscar.toggle_mode()?,
            Some(CoordMode::Cartesian) => poscar.to_cartesian()?,
            Some(CoordMode::Direct)    => poscar.to_direct()?,
        }

        if self.no_write {
            info!("No changes written");
            return Ok(());
        }

        let output = default_output(&self.input, self.output.as_ref(), "convert");
        poscar.to_file(&output)?;
        info!("Changes written to {:?}", output);
        Ok(())
    }
}
