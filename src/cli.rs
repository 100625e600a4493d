use std::sync::OnceLock;
use clap::{
    Parser,
    builder::styling::{
        AnsiColor,
        Effects,
        Styles,
    },
};
use enum_dispatch::enum_dispatch;

use crate::{
    types::Result,
    commands::{
        convert::Convert,
        vacuum::Vacuum,
        pot::Pot,
        slabfreeze::Slabfreeze,
        interpolate::Interpolate,
        neighbors::Neighbors,
        angles::Angles,
    },
};


pub fn get_style() -> Styles {
    static INSTANCE: OnceLock<Styles> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        Styles::styled()
            .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
            .usage(AnsiColor::Green.on_default()   | Effects::BOLD)
            .literal(AnsiColor::Green.on_default() | Effects::BOLD)
            .placeholder(AnsiColor::BrightBlue.on_default())
            .error(AnsiColor::BrightRed.on_default())
            .valid(AnsiColor::BrightYellow.on_default())
    }).to_owned()
}


#[enum_dispatch]
pub trait OptProcess {
    fn process(&self) -> Result<()>;
}


#[enum_dispatch(OptProcess)]
#[derive(Debug, Parser)]
#[command(name = "vapack",
            about = "A command-line toolkit for preparing and editing VASP input files.",
            version,
            styles = get_style()
            )]
enum Opt {
    Convert,

    Vacuum,

    Pot,

    Slabfreeze,

    Interpolate,

    Neighbors,

    Angles,
}


pub fn run() -> Result<()> {
    Opt::parse().process()
}
