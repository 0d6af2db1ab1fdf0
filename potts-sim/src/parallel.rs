use std::iter::Sum;

use rand_xoshiro::Xoshiro256StarStar;
use rayon::prelude::*;

use crate::geometry::Partition;

/// Dispatch a per-partition closure over lattice partitions, optionally in
/// parallel, and sum what the closures return.
///
/// Partition `k` is paired with `rngs[k]`, so every worker owns its generator.
/// The call returns only after every partition is done, which is the sweep
/// barrier.
///
/// When `sequential` is true, partitions are processed in order on the current
/// thread (no rayon overhead, and reproducible for a fixed seed).
pub fn par_over_partitions<T>(
    partitions: &[Partition],
    rngs: &mut [Xoshiro256StarStar],
    sequential: bool,
    body: impl Fn(&Partition, &mut Xoshiro256StarStar) -> T + Send + Sync,
) -> T
where
    T: Send + Sum,
{
    debug_assert_eq!(partitions.len(), rngs.len());
    if sequential {
        partitions
            .iter()
            .zip(rngs.iter_mut())
            .map(|(p, rng)| body(p, rng))
            .sum()
    } else {
        partitions
            .par_iter()
            .zip(rngs.par_iter_mut())
            .map(|(p, rng)| body(p, rng))
            .sum()
    }
}
