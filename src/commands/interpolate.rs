use std::path::PathBuf;

use clap::Args;
use log::info;

use crate::{
    types::Result,
    cli::OptProcess,
    vasp_parsers::poscar::Poscar,
    extensions::{
        self,
        BoundaryResolver,
        DynamicsResolver,
    },
};


#[derive(Debug, Args)]
/// Linearly interpolate images between two POSCARs for an NEB run.
pub struct Interpolate {
    /// First anchor POSCAR
    file1: PathBuf,

    /// Second anchor POSCAR
    file2: PathBuf,

    #[arg(short, long, default_value_t = 1)]
    /// Number of intermediate images to generate
    images: usize,

    #[arg(short, long)]
    /// Write selective dynamics flags in the generated frames
    selective_dynamics: bool,

    #[arg(short, long, value_enum)]
    /// Placement of ions that cross a cell boundary between the anchors
    /// [default: first, with a warning]
    boundary: Option<BoundaryResolver>,

    #[arg(short, long, value_enum)]
    /// Resolution of selective dynamics flags that differ between the anchors
    /// [default: free, with a warning]
    dynamics: Option<DynamicsResolver>,

    #[arg(short, long, default_value = ".")]
    /// Directory where the numbered image folders are created
    outdir: PathBuf,

    #[arg(long)]
    /// Generate the frames but do not write anything to disk
    no_write: bool,
}


impl OptProcess for Interpolate {
    fn process(&self) -> Result<()> {
        info!("Interpolating {} images between {:?} and {:?}",
              self.images, self.file1, self.file2);

        let poscar1 = Poscar::from_file(&self.file1)?;
        let poscar2 = Poscar::from_file(&self.file2)?;

        let frames = extensions::interpolate(
            &poscar1, &poscar2, self.images,
            self.boundary, self.dynamics,
            self.selective_dynamics)?;

        if self.no_write {
            info!("No changes written");
            return Ok(());
        }

        for (f, frame) in frames.iter().enumerate() {
            let path = self.outdir.join(format!("{:02}", f)).join("POSCAR");
            frame.to_file(&path)?;
            info!("Frame written to {:?}", path);
        }
        Ok(())
    }
}
