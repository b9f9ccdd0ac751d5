// rayon-based in-process ranks

use super::Comm;

/// One of `size` virtual ranks living in the current process.
///
/// All ranks share the global rayon pool; a transpose over their buffers runs as a
/// single in-process exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RayonComm {
    rank: usize,
    size: usize,
}

impl RayonComm {
    pub fn new(rank: usize, size: usize) -> Self {
        RayonComm { rank, size }
    }

    /// Rank 0 of one virtual rank per available CPU.
    pub fn local() -> Self {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_cpus::get())
            .build_global()
            .ok();
        RayonComm::new(0, num_cpus::get())
    }

    /// Every rank of a `size`-rank world.
    pub fn world(size: usize) -> Vec<Self> {
        (0..size).map(|rank| RayonComm::new(rank, size)).collect()
    }
}

impl Comm for RayonComm {
    fn rank(&self) -> usize { self.rank }
    fn size(&self) -> usize { self.size }
}
