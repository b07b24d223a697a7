/// The distributed reduction substrate the pair style relies on.
///
/// Only two collective operations are needed: summing per-type particle counts for tail
/// corrections, and distributing a restart record read by the root rank.
pub trait Communicator {
    /// Rank of this process shard. Rank 0 is the root.
    fn rank(&self) -> usize;

    /// Replaces every element of `values` with its sum over all shards.
    fn all_reduce_sum(&self, values: &mut [f64]);

    /// Replaces `bytes` on every non-root shard with the root's content.
    fn broadcast_bytes(&self, root: usize, bytes: &mut Vec<u8>);

    fn is_root(&self) -> bool {
        self.rank() == 0
    }
}

/// A communicator for a run that is not distributed. Every collective is the identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SingleProcess;

impl Communicator for SingleProcess {
    fn rank(&self) -> usize {
        0
    }

    fn all_reduce_sum(&self, _values: &mut [f64]) {}

    fn broadcast_bytes(&self, _root: usize, _bytes: &mut Vec<u8>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_process_is_root_and_collectives_are_identity() {
        let comm = SingleProcess;
        assert!(comm.is_root());

        let mut values = vec![1.0, 2.5];
        comm.all_reduce_sum(&mut values);
        assert_eq!(values, vec![1.0, 2.5]);

        let mut bytes = vec![7u8, 8];
        comm.broadcast_bytes(0, &mut bytes);
        assert_eq!(bytes, vec![7, 8]);
    }
}
