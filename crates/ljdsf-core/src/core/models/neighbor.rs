use super::particles::ParticleStore;
use kiddo::{KdTree, SquaredEuclidean};
use std::collections::HashMap;

/// Bit position of the 2-bit special-bond code packed into each neighbor entry.
pub const SBBITS: u32 = 30;
/// Mask that strips the special-bond code from a neighbor entry.
pub const NEIGHMASK: u32 = 0x3FFF_FFFF;

/// Packs a neighbor index with its special-bond level (0 = none, 1..=3 = 1-2/1-3/1-4).
#[inline]
pub fn encode_neighbor(index: usize, special: u8) -> u32 {
    debug_assert!(index as u32 <= NEIGHMASK && special <= 3);
    (index as u32 & NEIGHMASK) | ((special as u32) << SBBITS)
}

#[inline]
pub fn special_bits(entry: u32) -> usize {
    (entry >> SBBITS & 3) as usize
}

#[inline]
pub fn neighbor_index(entry: u32) -> usize {
    (entry & NEIGHMASK) as usize
}

/// Scale factors applied to bonded neighbors, indexed by special-bond level.
///
/// Index 0 is the non-bonded case and is always 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecialFactors {
    pub lj: [f64; 4],
    pub coul: [f64; 4],
}

impl Default for SpecialFactors {
    fn default() -> Self {
        Self {
            lj: [1.0, 0.0, 0.0, 0.0],
            coul: [1.0, 0.0, 0.0, 0.0],
        }
    }
}

impl SpecialFactors {
    pub fn new(lj: [f64; 3], coul: [f64; 3]) -> Self {
        Self {
            lj: [1.0, lj[0], lj[1], lj[2]],
            coul: [1.0, coul[0], coul[1], coul[2]],
        }
    }

    /// A level whose factors are both zero contributes nothing and can be left out of lists.
    pub fn excludes(&self, level: usize) -> bool {
        level > 0 && self.lj[level] == 0.0 && self.coul[level] == 0.0
    }
}

/// Bonded-topology relations between particle pairs, keyed by the unordered index pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecialPairs {
    levels: HashMap<(usize, usize), u8>,
}

impl SpecialPairs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `i` and `j` are separated by `level` bonds (1, 2 or 3).
    /// A closer relation always wins over a farther one.
    pub fn insert(&mut self, i: usize, j: usize, level: u8) {
        let key = (i.min(j), i.max(j));
        let entry = self.levels.entry(key).or_insert(level);
        *entry = (*entry).min(level);
    }

    pub fn level(&self, i: usize, j: usize) -> u8 {
        self.levels
            .get(&(i.min(j), i.max(j)))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Half neighbor list in compressed-row form: each unordered pair appears once, in the list
/// of its lower-indexed owned particle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NeighborList {
    ilist: Vec<usize>,
    offsets: Vec<usize>,
    entries: Vec<u32>,
}

impl NeighborList {
    pub fn new() -> Self {
        Self {
            offsets: vec![0],
            ..Self::default()
        }
    }

    /// Appends the neighbor entries of owned particle `i`.
    pub fn push(&mut self, i: usize, entries: impl IntoIterator<Item = u32>) {
        if self.offsets.is_empty() {
            self.offsets.push(0);
        }
        self.ilist.push(i);
        self.entries.extend(entries);
        self.offsets.push(self.entries.len());
    }

    /// Number of particles with a list.
    pub fn inum(&self) -> usize {
        self.ilist.len()
    }

    pub fn num_pairs(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[u32])> + '_ {
        self.ilist
            .iter()
            .enumerate()
            .map(|(k, &i)| (i, &self.entries[self.offsets[k]..self.offsets[k + 1]]))
    }

    /// Builds a half list over all owned and ghost particles within `cutoff` of each owned one.
    ///
    /// Pairs whose special level is fully excluded by `factors` are left out.
    pub fn build_half<P: ParticleStore>(
        particles: &P,
        cutoff: f64,
        special: &SpecialPairs,
        factors: &SpecialFactors,
    ) -> Self {
        let mut list = Self::new();
        if particles.is_empty() {
            return list;
        }

        let points: Vec<[f64; 3]> = (0..particles.len())
            .map(|k| {
                let p = particles.position(k);
                [p.x, p.y, p.z]
            })
            .collect();
        let kdtree: KdTree<f64, 3> = (&points).into();
        let cutoff_sq = cutoff * cutoff;

        for i in 0..particles.nlocal() {
            let mut neighbors: Vec<u32> = kdtree
                .within::<SquaredEuclidean>(&points[i], cutoff_sq)
                .into_iter()
                .map(|nn| nn.item as usize)
                .filter(|&j| j > i)
                .filter_map(|j| {
                    let level = special.level(i, j);
                    (!factors.excludes(level as usize)).then(|| encode_neighbor(j, level))
                })
                .collect();
            neighbors.sort_unstable_by_key(|&entry| neighbor_index(entry));
            list.push(i, neighbors);
        }
        list
    }
}
