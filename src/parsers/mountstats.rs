use std::io::BufRead;

use tracing::debug;

use crate::error::{ParseError, Result};
use crate::models::mount::{Mount, MountStats};
use crate::parsers::nfs;

/// Token count of a minimal "device … fstype …" line; anything longer
/// carries an inline statvers marker.
const DEVICE_ENTRY_LEN: usize = 8;

const STAT_VERSION_PREFIX: &str = "statvers=";

/// The only fstypes with a decodable statistics block.
const NFS3_TYPE: &str = "nfs";
const NFS4_TYPE: &str = "nfs4";

/// Anchor words a well-formed device line must carry at fixed positions:
/// `device <dev> mounted on <mount> with fstype <type>`.
const DEVICE_LINE_ANCHORS: &[(usize, &str)] = &[
    (0, "device"),
    (2, "mounted"),
    (3, "on"),
    (5, "with"),
    (6, "fstype"),
];

/// Decode a full mountstats stream into its device entries, in input order.
///
/// Statistics blocks are attached to their entry when the device line has a
/// statvers marker. Any malformed line aborts the parse; no partial list is
/// returned.
pub fn parse_mountstats<R: BufRead>(reader: R) -> Result<Vec<Mount>> {
    let mut lines = reader.lines();
    let mut mounts = Vec::new();

    while let Some(line) = lines.next() {
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();

        // Only device lines start a record here; statistics lines are
        // consumed by the NFS block parser below, anything else is noise.
        if tokens.first().copied() != Some("device") {
            continue;
        }

        let mut mount = parse_device_line(&tokens)?;

        if tokens.len() > DEVICE_ENTRY_LEN {
            // Extra tokens mean a statistics block follows, and only
            // NFS v3/v4 blocks are decodable. Anything else claiming to
            // carry stats is a format violation, not a skippable entry.
            if mount.fs_type != NFS3_TYPE && mount.fs_type != NFS4_TYPE {
                return Err(ParseError::UnsupportedFsType(mount.fs_type));
            }

            let stat_version = tokens[DEVICE_ENTRY_LEN]
                .strip_prefix(STAT_VERSION_PREFIX)
                .unwrap_or(tokens[DEVICE_ENTRY_LEN]);

            let stats = nfs::parse_nfs_stats(&mut lines, stat_version)?;
            mount.stats = Some(MountStats::Nfs(stats));
        }

        debug!(device = %mount.device, fs_type = %mount.fs_type, "parsed mount entry");
        mounts.push(mount);
    }

    Ok(mounts)
}

/// Extract device, mount point, and fstype from one whitespace-split
/// device line, after checking every anchor word.
fn parse_device_line(tokens: &[&str]) -> Result<Mount> {
    if tokens.len() < DEVICE_ENTRY_LEN {
        return Err(invalid_device_entry(tokens));
    }

    for &(i, anchor) in DEVICE_LINE_ANCHORS {
        if tokens[i] != anchor {
            return Err(invalid_device_entry(tokens));
        }
    }

    Ok(Mount {
        device:  tokens[1].to_string(),
        mount:   tokens[4].to_string(),
        fs_type: tokens[7].to_string(),
        stats:   None,
    })
}

fn invalid_device_entry(tokens: &[&str]) -> ParseError {
    ParseError::InvalidDeviceEntry(tokens.iter().map(|t| t.to_string()).collect())
}
