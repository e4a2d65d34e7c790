//! Equal-block spatial decomposition of a box.

use strand_core::{
    Axis, DomainDecomposition, GhostTarget, GhostTargets, GridGeometry, SubdomainId, Vec3,
};

/// Splits the domain into `blocks[0] × blocks[1] × blocks[2]` equal boxes.
///
/// Subdomain ids are assigned x-fastest. Along periodic axes, ghost
/// targets include periodic images (possibly of the owner itself), so a
/// single block still sees chain neighbours across the wrap.
#[derive(Clone, Debug)]
pub struct BlockDecomposition {
    prob_lo: Vec3,
    prob_hi: Vec3,
    extent: Vec3,
    periodic: [bool; 3],
    blocks: [usize; 3],
    block_len: Vec3,
}

impl BlockDecomposition {
    /// Decompose `geometry` into `blocks` per axis. Returns `None` if any
    /// block count is zero.
    pub fn new(geometry: &GridGeometry, blocks: [usize; 3]) -> Option<Self> {
        if blocks.iter().any(|&b| b == 0) {
            return None;
        }
        let extent = geometry.extent();
        let block_len = extent / Vec3::new(blocks[0] as f64, blocks[1] as f64, blocks[2] as f64);
        Some(Self {
            prob_lo: geometry.prob_lo(),
            prob_hi: geometry.prob_hi(),
            extent,
            periodic: geometry.periodic(),
            blocks,
            block_len,
        })
    }

    /// The whole domain as one subdomain.
    pub fn single(geometry: &GridGeometry) -> Self {
        Self {
            prob_lo: geometry.prob_lo(),
            prob_hi: geometry.prob_hi(),
            extent: geometry.extent(),
            periodic: geometry.periodic(),
            blocks: [1, 1, 1],
            block_len: geometry.extent(),
        }
    }

    /// Blocks per axis.
    pub fn blocks(&self) -> [usize; 3] {
        self.blocks
    }

    /// Block coordinates of subdomain `id`.
    pub fn block_of(&self, id: SubdomainId) -> [usize; 3] {
        let i = id.index();
        let [bx, by, _] = self.blocks;
        [i % bx, (i / bx) % by, i / (bx * by)]
    }

    fn id_of(&self, b: [usize; 3]) -> SubdomainId {
        let [bx, by, _] = self.blocks;
        SubdomainId((b[0] + bx * (b[1] + by * b[2])) as u32)
    }

    /// Lower and upper corner of subdomain `id`.
    pub fn region(&self, id: SubdomainId) -> (Vec3, Vec3) {
        let b = self.block_of(id);
        let lo = self.prob_lo
            + Vec3::new(b[0] as f64, b[1] as f64, b[2] as f64) * self.block_len;
        (lo, lo + self.block_len)
    }

    /// Range of block indices along `axis` whose slab, grown by `cutoff`,
    /// contains coordinate `x`.
    fn block_range(&self, axis: Axis, x: f64, cutoff: f64) -> Option<(usize, usize)> {
        let d = axis.index();
        let rel = x - self.prob_lo[d];
        let len = self.block_len[d];
        let last = self.blocks[d] as i64 - 1;
        let lo = ((rel - cutoff) / len).floor() as i64;
        let hi = ((rel + cutoff) / len).floor() as i64;
        if hi < 0 || lo > last {
            return None;
        }
        Some((lo.max(0) as usize, hi.min(last) as usize))
    }
}

impl DomainDecomposition for BlockDecomposition {
    fn subdomain_count(&self) -> usize {
        self.blocks.iter().product()
    }

    fn owner_of(&self, position: Vec3) -> Option<SubdomainId> {
        let mut b = [0usize; 3];
        for axis in Axis::ALL {
            let d = axis.index();
            let (lo, hi) = (self.prob_lo[d], self.prob_hi[d]);
            if !(position[d] >= lo && position[d] < hi) {
                return None;
            }
            let rel = position[d] - lo;
            b[d] = ((rel / self.block_len[d]).floor() as usize).min(self.blocks[d] - 1);
        }
        Some(self.id_of(b))
    }

    fn ghost_targets(&self, position: Vec3, cutoff: f64) -> GhostTargets {
        let mut out = GhostTargets::new();
        let Some(owner) = self.owner_of(position) else {
            return out;
        };

        let images = |d: usize| -> &'static [f64] {
            if self.periodic[d] {
                &[-1.0, 0.0, 1.0]
            } else {
                &[0.0]
            }
        };

        for &sz in images(2) {
            for &sy in images(1) {
                for &sx in images(0) {
                    let shift = Vec3::new(sx, sy, sz) * self.extent;
                    let q = position + shift;
                    let (Some(rx), Some(ry), Some(rz)) = (
                        self.block_range(Axis::X, q.x, cutoff),
                        self.block_range(Axis::Y, q.y, cutoff),
                        self.block_range(Axis::Z, q.z, cutoff),
                    ) else {
                        continue;
                    };
                    let unshifted = shift == Vec3::ZERO;
                    for bz in rz.0..=rz.1 {
                        for by in ry.0..=ry.1 {
                            for bx in rx.0..=rx.1 {
                                let subdomain = self.id_of([bx, by, bz]);
                                if unshifted && subdomain == owner {
                                    continue;
                                }
                                out.push(GhostTarget { subdomain, shift });
                            }
                        }
                    }
                }
            }
        }
        out
    }

    fn max_ghost_cutoff(&self) -> f64 {
        Axis::ALL
            .iter()
            .map(|a| {
                let d = a.index();
                let half_period = if self.periodic[d] {
                    0.5 * self.extent[d]
                } else {
                    f64::INFINITY
                };
                self.block_len[d].min(half_period)
            })
            .fold(f64::INFINITY, f64::min)
    }
}
