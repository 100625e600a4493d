pub mod types;
pub mod settings;
pub mod vasp_parsers;
pub mod extensions;
pub mod analyze;
pub mod commands;
pub mod cli;

pub use types::Result;

pub use cli::OptProcess;

pub use vasp_parsers::poscar::{
    CoordMode,
    Ion,
    Ions,
    Poscar,
};

pub use vasp_parsers::potcar::Potcar;

pub use settings::{
    Settings,
    FunctionalPath,
};
