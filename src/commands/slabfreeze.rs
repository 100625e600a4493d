use std::path::PathBuf;

use clap::Args;
use log::info;

use crate::{
    types::Result,
    cli::OptProcess,
    vasp_parsers::poscar::{
        CoordMode,
        Ion,
        Poscar,
    },
    extensions::{
        set_dynamics_box,
        UnselectedPolicy,
    },
    commands::default_output,
};


#[derive(Debug, Args)]
/// Freeze or free ions inside a box by painting selective dynamics flags.
pub struct Slabfreeze {
    /// Input POSCAR file
    input: PathBuf,

    #[arg(short, long, num_args = 2, value_names = ["LO", "HI"], allow_negative_numbers = true)]
    /// Range of the box along the first axis; unbounded when omitted
    x: Option<Vec<f64>>,

    #[arg(short, long, num_args = 2, value_names = ["LO", "HI"], allow_negative_numbers = true)]
    /// Range of the box along the second axis; unbounded when omitted
    y: Option<Vec<f64>>,

    #[arg(short, long, num_args = 2, value_names = ["LO", "HI"], allow_negative_numbers = true)]
    /// Range of the box along the third axis; unbounded when omitted
    z: Option<Vec<f64>>,

    #[arg(short, long, num_args = 3, default_values = ["T", "T", "T"],
          value_names = ["A", "B", "C"])]
    /// Selective dynamics flags painted on ions inside the box, "T" or "F"
    dynamics: Vec<String>,

    #[arg(short, long, value_enum)]
    /// Coordinate mode the ranges are given in [default: the file's own mode]
    mode: Option<CoordMode>,

    #[arg(short, long, value_enum, default_value = "free")]
    /// What happens to ions outside the box
    unselected: UnselectedPolicy,

    #[arg(short, long)]
    /// Output file [default: "<stem>_frozen<suffix>"]
    output: Option<PathBuf>,

    #[arg(long)]
    /// Parse and edit but do not write anything to disk
    no_write: bool,
}


impl OptProcess for Slabfreeze {
    fn process(&self) -> Result<()> {
        let mut poscar = Poscar::from_file(&self.input)?;

        let range = |r: &Option<Vec<f64>>| r.as_ref().map(|v| [v[0], v[1]]);
        let ranges = [range(&self.x), range(&self.y), range(&self.z)];
        let flags  = Ion::flags_from_chars(&self.dynamics)?;
        let mode   = self.mode.unwrap_or(poscar.mode);

        let painted = set_dynamics_box(&mut poscar, &ranges, flags, mode, self.unselected)?;
        info!("Painted dynamics flags of {} of {} ions", painted, poscar.ions.len());

        if self.no_write {
            info!("No changes written");
            return Ok(());
        }

        let output = default_output(&self.input, self.output.as_ref(), "frozen");
        poscar.to_file(&output)?;
        info!("Changes written to {:?}", output);
        Ok(())
    }
}
