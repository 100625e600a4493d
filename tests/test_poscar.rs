use std::fs;

use tempdir::TempDir;

use vapack::Result;
use vapack::{
    CoordMode,
    Poscar,
};


const SLAB: &str = "\
Rutile slab
1.0
   4.60000000   0.00000000   0.00000000
   0.00000000   4.60000000   0.00000000
   0.00000000   0.00000000  12.00000000
  Ti    O
   2    4
Selective Dynamics
Direct
   0.00000000   0.00000000   0.10000000 F F F
   0.50000000   0.50000000   0.30000000 T T T
   0.30000000   0.30000000   0.10000000 F F F
   0.70000000   0.70000000   0.10000000 F F F
   0.20000000   0.80000000   0.30000000 T T T
   0.80000000   0.20000000   0.30000000 T T T
";


#[test]
fn test_read_write_roundtrip() -> Result<()> {
    let dir = TempDir::new("vapack_poscar")?;
    let input = dir.path().join("POSCAR");
    fs::write(&input, SLAB)?;

    let poscar = Poscar::from_file(&input)?;
    assert_eq!(poscar.comment, "Rutile slab");
    assert_eq!(poscar.mode, CoordMode::Direct);
    assert!(poscar.selective_dynamics);
    assert_eq!(poscar.species.get("Ti"), Some(&2));
    assert_eq!(poscar.species.get("O"),  Some(&4));
    assert_eq!(poscar.ions.len(), 6);
    assert_eq!(poscar.ions.get(0).unwrap().selective_dynamics, [false; 3]);
    assert_eq!(poscar.ions.get(1).unwrap().selective_dynamics, [true; 3]);

    let output = dir.path().join("sub").join("POSCAR_out");
    poscar.to_file(&output)?;
    let reread = Poscar::from_file(&output)?;

    assert_eq!(reread.comment, poscar.comment);
    assert_eq!(reread.lattice, poscar.lattice);
    assert_eq!(reread.species, poscar.species);
    for ((i, a), (j, b)) in poscar.ions.iter().zip(reread.ions.iter()) {
        assert_eq!(i, j);
        assert_eq!(a.species, b.species);
        assert_eq!(a.selective_dynamics, b.selective_dynamics);
        for (x, y) in a.position.iter().zip(b.position.iter()) {
            assert!((x - y).abs() < 1e-8);
        }
    }
    Ok(())
}


#[test]
fn test_mode_conversion_survives_disk() -> Result<()> {
    let dir = TempDir::new("vapack_poscar")?;
    let input = dir.path().join("POSCAR");
    fs::write(&input, SLAB)?;

    let mut poscar = Poscar::from_file(&input)?;
    poscar.to_cartesian()?;
    let cart = dir.path().join("POSCAR_cart");
    poscar.to_file(&cart)?;

    let mut reread = Poscar::from_file(&cart)?;
    assert_eq!(reread.mode, CoordMode::Cartesian);
    let p = reread.ions.get(1).unwrap().position;
    assert!((p[0] - 2.3).abs() < 1e-6);
    assert!((p[2] - 3.6).abs() < 1e-6);

    reread.to_direct()?;
    let p = reread.ions.get(1).unwrap().position;
    assert!((p[0] - 0.5).abs() < 1e-8);
    assert!((p[2] - 0.3).abs() < 1e-8);
    Ok(())
}


#[test]
fn test_read_truncated_fails() -> Result<()> {
    let dir = TempDir::new("vapack_poscar")?;
    let input = dir.path().join("POSCAR");
    let truncated: String = SLAB.lines().take(5).collect::<Vec<_>>().join("\n");
    fs::write(&input, truncated)?;

    assert!(Poscar::from_file(&input).is_err());
    Ok(())
}


#[test]
fn test_read_missing_file_fails() {
    assert!(Poscar::from_file("definitely_not_here/POSCAR").is_err());
}
