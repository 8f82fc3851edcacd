use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Client statistics for one NFS v3/v4 mount, one full `statvers` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NfsStats {
    /// Statistics format version from the device line ("1.0" or "1.1").
    pub stat_version: String,
    /// How long the mount has been up (kernel reports whole seconds).
    pub age:          Duration,
    pub bytes:        NfsBytesStats,
    pub events:       NfsEventsStats,
    /// Per-RPC-operation counters, in report order, not deduplicated.
    pub operations:   Vec<NfsOperationStats>,
    pub transport:    NfsTransportStats,
}

impl NfsStats {
    /// First per-operation entry with the given name ("READ", "GETATTR", …).
    pub fn operation(&self, name: &str) -> Option<&NfsOperationStats> {
        self.operations.iter().find(|op| op.operation == name)
    }
}

/// Byte counters from the `bytes:` line, in line order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NfsBytesStats {
    /// Bytes read via read().
    pub read:         u64,
    /// Bytes written via write().
    pub write:        u64,
    /// Bytes read via read() in O_DIRECT mode.
    pub direct_read:  u64,
    /// Bytes written via write() in O_DIRECT mode.
    pub direct_write: u64,
    /// Total bytes read from the server.
    pub read_total:   u64,
    /// Total bytes written to the server.
    pub write_total:  u64,
    /// Pages read via mmap()'d files.
    pub read_pages:   u64,
    /// Pages written via mmap()'d files.
    pub write_pages:  u64,
}

/// Event counters from the `events:` line, in line order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NfsEventsStats {
    pub inode_revalidate:     u64,   // cached inode attrs re-validated
    pub dnode_revalidate:     u64,   // cached dentries re-validated
    pub data_invalidate:      u64,   // inode caches cleared
    pub attribute_invalidate: u64,   // cached inode attrs invalidated
    pub vfs_open:             u64,
    pub vfs_lookup:           u64,
    pub vfs_access:           u64,
    pub vfs_update_page:      u64,
    pub vfs_read_page:        u64,
    pub vfs_read_pages:       u64,
    pub vfs_write_page:       u64,
    pub vfs_write_pages:      u64,
    pub vfs_getdents:         u64,
    pub vfs_setattr:          u64,
    pub vfs_flush:            u64,
    pub vfs_fsync:            u64,
    pub vfs_lock:             u64,
    pub vfs_file_release:     u64,
    pub congestion_wait:      u64,   // possibly unused by the kernel
    pub truncation:           u64,
    pub write_extension:      u64,
    pub silly_rename:         u64,   // file removed while still open
    pub short_read:           u64,   // server returned less data than asked
    pub short_write:          u64,   // server wrote less data than asked
    pub jukebox_delay:        u64,   // EJUKEBOX responses (offline storage)
    pub pnfs_read:            u64,   // NFS v4.1+ pNFS reads
    pub pnfs_write:           u64,   // NFS v4.1+ pNFS writes
}

/// Counters for one RPC operation, one `per-op` block line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NfsOperationStats {
    /// Operation name with the trailing colon stripped ("READ", "WRITE", …).
    pub operation:      String,
    pub requests:       u64,
    /// Actual RPC transmissions (> requests when retransmitting).
    pub transmissions:  u64,
    pub major_timeouts: u64,
    /// Bytes sent, RPC headers included.
    pub bytes_sent:     u64,
    /// Bytes received, RPC headers included.
    pub bytes_received: u64,
    /// Total time requests spent queued before transmission.
    pub cumulative_queue_time:          Duration,
    /// Total time from transmission to reply.
    pub cumulative_total_response_time: Duration,
    /// Total time from enqueue to completion.
    pub cumulative_total_request_time:  Duration,
}

impl NfsOperationStats {
    /// Average round-trip time per issued request; None when no requests
    /// have been made.
    pub fn avg_response_time(&self) -> Option<Duration> {
        if self.requests == 0 { return None; }
        // Divide in u128; the counter is a full u64 and must not be
        // narrowed for Duration's Div<u32>.
        let nanos = self.cumulative_total_response_time.as_nanos() / u128::from(self.requests);
        Some(Duration::from_nanos(nanos as u64))
    }
}

/// RPC transport counters from the `xprt:` line.
///
/// The last three fields only exist with statvers 1.1 and stay zero for
/// 1.0 mounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NfsTransportStats {
    /// Local port used for the mount.
    pub port:    u64,
    /// Connections established from scratch.
    pub bind:    u64,
    /// TCP connections made to the server.
    pub connect: u64,
    /// Time spent waiting for connections, in jiffies. The kernel reports
    /// this in its internal tick unit and the raw value is kept as-is;
    /// converting it would need the remote HZ, which the file does not carry.
    pub connect_idle_time: u64,
    /// Time since the mount last saw RPC traffic (whole seconds).
    pub idle_time: Duration,
    pub sends:    u64,
    pub receives: u64,
    /// Responses carrying a transaction ID unknown to this client.
    pub bad_transaction_ids: u64,
    /// Running sum of (sends - receives), sampled per request.
    pub cumulative_active_requests: u64,
    /// Running sum of the backlog queue size, sampled per request.
    pub cumulative_backlog: u64,

    // statvers 1.1 only
    /// Most RPC slots ever in use at once.
    pub maximum_rpc_slots_used: u64,
    /// Running sum of the sending queue size, sampled per request.
    pub cumulative_sending_queue: u64,
    /// Running sum of the pending queue size, sampled per request.
    pub cumulative_pending_queue: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avg_response_time_handles_requests_beyond_u32() {
        // Counters are full u64s; a request count past u32::MAX must
        // divide correctly rather than narrow (and panic on a zeroed
        // divisor).
        let op = NfsOperationStats {
            operation: "READ".to_string(),
            requests: 1u64 << 32,
            cumulative_total_response_time: Duration::from_millis((1u64 << 32) * 2),
            ..Default::default()
        };
        assert_eq!(op.avg_response_time(), Some(Duration::from_millis(2)));
    }

    #[test]
    fn avg_response_time_none_without_requests() {
        assert_eq!(NfsOperationStats::default().avg_response_time(), None);
    }
}
