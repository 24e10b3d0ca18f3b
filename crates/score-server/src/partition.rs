//! Batch-partitioning (spec.md §5): splits a package-name list into
//! `num_partitions` stable buckets so an offline batch run can be sharded
//! across workers without a central coordinator.
//!
//! Deliberately minimal — spec.md's Non-goals exclude a full
//! batch-scheduling tool; this is just the pure assignment function a
//! batch runner would call once per name.

use sha2::{Digest, Sha256};

/// Which of `num_partitions` buckets `name` belongs to: `sha256(name) mod
/// num_partitions`. Stable across runs and process restarts since it only
/// depends on the name and the partition count.
#[must_use]
pub fn partition_of(name: &str, num_partitions: u32) -> u32 {
    assert!(num_partitions > 0, "num_partitions must be positive");

    let digest = Sha256::digest(name.as_bytes());
    // Fold the digest down to a u64 before reducing mod num_partitions;
    // using only the first 8 bytes is enough entropy for even bucketing.
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    let value = u64::from_be_bytes(bytes);

    (value % u64::from(num_partitions)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_same_partition_count_is_stable() {
        let a = partition_of("requests", 16);
        let b = partition_of("requests", 16);
        assert_eq!(a, b);
    }

    #[test]
    fn partition_is_within_bounds() {
        for name in ["requests", "numpy", "left-pad", "@types/node", "conda-forge/numpy"] {
            let partition = partition_of(name, 8);
            assert!(partition < 8);
        }
    }

    #[test]
    fn different_names_can_land_in_different_partitions() {
        let partitions: std::collections::HashSet<u32> =
            (0..50).map(|i| partition_of(&format!("package-{i}"), 4)).collect();
        assert!(partitions.len() > 1);
    }

    #[test]
    #[should_panic(expected = "num_partitions must be positive")]
    fn zero_partitions_panics() {
        partition_of("requests", 0);
    }
}
