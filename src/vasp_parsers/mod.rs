pub mod poscar;
pub mod potcar;
