use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use anyhow::{
    bail,
    Context,
};
use log::debug;

use crate::types::Result;
use crate::vasp_parsers::poscar::Poscar;


/// A pseudopotential set resolved against a directory of per-element POTCAR
/// folders. Only concatenates file contents; never inspects them.
#[derive(Debug, Clone)]
pub struct Potcar {
    pub potentials: Vec<String>,
    pub directory:  PathBuf,
}

impl Potcar {
    pub fn new(potentials: Vec<String>, directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        if !directory.exists() {
            bail!("Provided potcar directory {:?} does not exist", directory);
        }
        if potentials.is_empty() {
            bail!("No potentials supplied for POTCAR generation");
        }
        Ok(Self { potentials, directory })
    }

    /// Take the potential list from a POSCAR's species, in species order.
    pub fn from_poscar(poscar: &Poscar, directory: impl Into<PathBuf>) -> Result<Self> {
        Self::new(poscar.species.keys().cloned().collect(), directory)
    }

    /// The directory the per-species POTCAR folders are looked up in.
    ///
    /// When the configured directory is not itself a functional folder
    /// (`gga`/`lda`), one is picked automatically: GGA for multi-species
    /// sets, LDA for a single species.
    fn functional_dir(&self) -> PathBuf {
        let name = self.directory.file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if name == "gga" || name == "lda" {
            self.directory.clone()
        } else if self.potentials.len() > 1 {
            self.directory.join("GGA")
        } else {
            self.directory.join("LDA")
        }
    }

    /// Concatenate `<dir>/<species>/POTCAR` contents in potential order.
    pub fn generate_string(&self) -> Result<String> {
        let base = self.functional_dir();
        debug!("Resolving potentials from {:?}", base);

        let mut contents = String::new();
        for sp in self.potentials.iter() {
            let path = base.join(sp).join("POTCAR");
            let single = fs::read_to_string(&path)
                .context(format!("Failed to read potential for {:?} at {:?}", sp, path))?;
            contents.push_str(&single);
        }
        Ok(contents)
    }

    /// Write the concatenated POTCAR, creating parent directories as needed.
    /// All potentials are resolved before the output file is touched.
    pub fn to_file(&self, path: &(impl AsRef<Path> + ?Sized)) -> Result<()> {
        let contents = self.generate_string()?;
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .context(format!("Failed to create directory {:?}", parent))?;
            }
        }
        fs::write(path.as_ref(), contents)
            .context(format!("Failed to write POTCAR file {:?}", path.as_ref()))?;
        Ok(())
    }
}
