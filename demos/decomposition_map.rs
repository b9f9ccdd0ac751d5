//! Print which rank owns each cell of a small 2D grid, for both pencils.
//!
//! cargo run --example decomposition_map -- 4 12 8
//! (number of processes, then global sizes in x and y; one process per CPU by default)

use pencil_decomp::parallel::{Comm, RayonComm, UniverseComm};
use pencil_decomp::{DecompError, DecompOptions, Decomposition, Direction, Pencil};

fn main() -> Result<(), DecompError> {
    env_logger::init();
    let args: Vec<usize> = std::env::args().skip(1).filter_map(|a| a.parse().ok()).collect();
    let nprocs = match args.first() {
        Some(&n) => n,
        None => UniverseComm::Rayon(RayonComm::local()).size(),
    };
    let glsizes = [
        args.get(1).copied().unwrap_or(nprocs.max(12)),
        args.get(2).copied().unwrap_or(nprocs.max(8)),
    ];

    let decomps = RayonComm::world(nprocs)
        .iter()
        .map(|comm| Decomposition::from_comm(comm, &DecompOptions::new(2)))
        .collect::<Result<Vec<_>, _>>()?;

    for &pencil in Pencil::valid(2) {
        let mut owners = vec![0; glsizes[0] * glsizes[1]];
        for d in &decomps {
            let shape = d.pencil_shape(pencil, &glsizes)?;
            for j in shape.range(Direction::Y) {
                for i in shape.range(Direction::X) {
                    owners[j * glsizes[0] + i] = d.comm_rank();
                }
            }
        }
        println!("{pencil} pencil ({} x {} on {nprocs} ranks)", glsizes[0], glsizes[1]);
        for j in (0..glsizes[1]).rev() {
            let row: Vec<String> = (0..glsizes[0])
                .map(|i| format!("{:>3}", owners[j * glsizes[0] + i]))
                .collect();
            println!("{}", row.join(""));
        }
        println!();
    }
    Ok(())
}
