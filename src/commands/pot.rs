use std::path::PathBuf;

use anyhow::bail;
use clap::Args;
use log::info;

use crate::{
    types::Result,
    cli::OptProcess,
    settings::Settings,
    vasp_parsers::{
        poscar::Poscar,
        potcar::Potcar,
    },
};


#[derive(Debug, Args)]
/// Build a POTCAR from a POSCAR's species or an explicit potential list.
pub struct Pot {
    /// Source POSCAR for the potential list, or the literal "none" to use
    /// --potentials alone
    input: String,

    #[arg(short, long, num_args = 1..)]
    /// Potential names to use instead of the POSCAR species; useful when a
    /// potential differs from the plain element name (e.g. "Li_sv")
    potentials: Vec<String>,

    #[arg(short, long)]
    /// Directory of per-element POTCAR folders [default: settings.toml
    /// entry, then "./potcar"]
    directory: Option<PathBuf>,

    #[arg(short, long, default_value = "POTCAR")]
    /// Output file
    output: PathBuf,

    #[arg(long)]
    /// Resolve the potentials but do not write anything to disk
    no_write: bool,
}


impl OptProcess for Pot {
    fn process(&self) -> Result<()> {
        let directory = match &self.directory {
            Some(d) => d.clone(),
            None => Settings::from_default_file()?
                .potcar
                .map(|p| p.directory)
                .unwrap_or_else(|| PathBuf::from("./potcar")),
        };

        let species = if self.input.eq_ignore_ascii_case("none") {
            if self.potentials.is_empty() {
                bail!("Since the POSCAR is \"none\", a potentials list must be provided");
            }
            self.potentials.clone()
        } else {
            let poscar = Poscar::from_file(&self.input)?;
            if self.potentials.is_empty() {
                poscar.species.keys().cloned().collect()
            } else {
                self.potentials.clone()
            }
        };

        info!("Resolving potentials {:?} from {:?}", species, directory);
        let potcar = Potcar::new(species, directory)?;

        if self.no_write {
            // Still resolve everything so missing potentials fail loudly.
            potcar.generate_string()?;
            info!("No changes written");
            return Ok(());
        }

        potcar.to_file(&self.output)?;
        info!("Changes written to {:?}", self.output);
        Ok(())
    }
}
