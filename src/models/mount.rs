use serde::{Deserialize, Serialize};

use crate::models::nfs::NfsStats;

/// One device entry from /proc/[pid]/mountstats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mount {
    pub device:  String,   // "server:/export" or "/dev/sda1"
    pub mount:   String,   // "/mnt/nfs"
    pub fs_type: String,   // "nfs4", "ext4", …
    /// Filesystem-specific statistics, present only when the device line
    /// carried a statvers marker.
    pub stats:   Option<MountStats>,
}

impl Mount {
    /// True when NFS client statistics are attached to this mount.
    pub fn is_nfs(&self) -> bool {
        matches!(self.stats, Some(MountStats::Nfs(_)))
    }
}

/// Detailed statistics for one kind of mount.
///
/// Only NFS v3/v4 mounts expose a statistics block today; match on the
/// variant to get at the concrete shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum MountStats {
    Nfs(NfsStats),
}
