//! Decoding of the NFS statistics block that follows a `statvers` device
//! line: age, byte counters, event counters, transport counters, and the
//! trailing per-operation section.
//!
//! Field meanings follow the kernel's RPC iostats format; the reference
//! write-up is Chris Siebenmann's NFS mountstats index:
//! https://utcc.utoronto.ca/~cks/space/blog/linux/NFSMountstatsIndex

use std::io::{BufRead, Lines};
use std::time::Duration;

use tracing::trace;

use crate::error::{ParseError, Result};
use crate::models::nfs::{
    NfsBytesStats, NfsEventsStats, NfsOperationStats, NfsStats, NfsTransportStats,
};

const FIELD_BYTES_LEN: usize = 8;
const FIELD_EVENTS_LEN: usize = 27;

const STAT_VERSION_10: &str = "1.0";
const STAT_VERSION_11: &str = "1.1";

// statvers 1.1 appended three queue counters to the xprt line.
const FIELD_TRANSPORT_10_LEN: usize = 10;
const FIELD_TRANSPORT_11_LEN: usize = 13;

/// Per-op lines are `<name>:` plus eight numeric fields.
const FIELD_PER_OP_LEN: usize = 9;

/// Consume one NFS statistics block from the shared line cursor.
///
/// Stops at the blank line ending the block (the per-op section consumes
/// it) so the caller can pick up the next device entry. Unrecognized field
/// keywords are skipped; newer kernels keep adding lines here.
pub(crate) fn parse_nfs_stats<R: BufRead>(
    lines: &mut Lines<R>,
    stat_version: &str,
) -> Result<NfsStats> {
    let mut stats = NfsStats {
        stat_version: stat_version.to_string(),
        age:          Duration::ZERO,
        bytes:        NfsBytesStats::default(),
        events:       NfsEventsStats::default(),
        operations:   Vec::new(),
        transport:    NfsTransportStats::default(),
    };

    for line in lines.by_ref() {
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();

        // A blank line ends the block even when no per-op section was
        // seen; degenerate but legal.
        if tokens.is_empty() {
            break;
        }
        if tokens.len() < 2 {
            return Err(ParseError::TruncatedStatsLine(owned(&tokens)));
        }

        trace!(field = tokens[0], "NFS stats line");

        match tokens[0] {
            "age:" => {
                // Age is reported in whole seconds.
                stats.age = Duration::from_secs(parse_u64(tokens[1])?);
            }
            "bytes:" => {
                stats.bytes = parse_bytes_stats(&tokens[1..])?;
            }
            "events:" => {
                stats.events = parse_events_stats(&tokens[1..])?;
            }
            "xprt:" => {
                // tokens[1] names the transport protocol; counters start
                // at tokens[2].
                if tokens.len() < 3 {
                    return Err(ParseError::TruncatedTransportLine(owned(&tokens)));
                }
                stats.transport = parse_transport_stats(&tokens[2..], stat_version)?;
            }
            // "per-op statistics" header: the rest of the block is the
            // per-operation section, handled by its own loop below.
            "per-op" => break,
            // opts:, caps:, sec:, nfsv4:, and whatever future kernels add.
            _ => {}
        }
    }

    // Always runs; with no per-op section it sees the next blank line (or
    // EOF) immediately and yields an empty list.
    stats.operations = parse_operation_stats(lines)?;

    Ok(stats)
}

/// Decode the per-operation section: one line per RPC operation, ended by
/// a blank line or EOF.
fn parse_operation_stats<R: BufRead>(lines: &mut Lines<R>) -> Result<Vec<NfsOperationStats>> {
    let mut ops = Vec::new();

    for line in lines.by_ref() {
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();

        // Blank line: the next device entry follows.
        if tokens.is_empty() {
            break;
        }
        if tokens.len() != FIELD_PER_OP_LEN {
            return Err(ParseError::InvalidOperationStats(owned(&tokens)));
        }

        let ns = parse_u64_fields(&tokens[1..])?;

        ops.push(NfsOperationStats {
            operation:      tokens[0].strip_suffix(':').unwrap_or(tokens[0]).to_string(),
            requests:       ns[0],
            transmissions:  ns[1],
            major_timeouts: ns[2],
            bytes_sent:     ns[3],
            bytes_received: ns[4],
            // The kernel reports the three cumulative times in milliseconds.
            cumulative_queue_time:          Duration::from_millis(ns[5]),
            cumulative_total_response_time: Duration::from_millis(ns[6]),
            cumulative_total_request_time:  Duration::from_millis(ns[7]),
        });
    }

    Ok(ops)
}

/// Decode the eight fields of a `bytes:` line, positionally.
fn parse_bytes_stats(tokens: &[&str]) -> Result<NfsBytesStats> {
    if tokens.len() != FIELD_BYTES_LEN {
        return Err(ParseError::InvalidBytesStats(owned(tokens)));
    }

    let ns = parse_u64_fields(tokens)?;

    Ok(NfsBytesStats {
        read:         ns[0],
        write:        ns[1],
        direct_read:  ns[2],
        direct_write: ns[3],
        read_total:   ns[4],
        write_total:  ns[5],
        read_pages:   ns[6],
        write_pages:  ns[7],
    })
}

/// Decode the 27 fields of an `events:` line, positionally.
fn parse_events_stats(tokens: &[&str]) -> Result<NfsEventsStats> {
    if tokens.len() != FIELD_EVENTS_LEN {
        return Err(ParseError::InvalidEventsStats(owned(tokens)));
    }

    let ns = parse_u64_fields(tokens)?;

    Ok(NfsEventsStats {
        inode_revalidate:     ns[0],
        dnode_revalidate:     ns[1],
        data_invalidate:      ns[2],
        attribute_invalidate: ns[3],
        vfs_open:             ns[4],
        vfs_lookup:           ns[5],
        vfs_access:           ns[6],
        vfs_update_page:      ns[7],
        vfs_read_page:        ns[8],
        vfs_read_pages:       ns[9],
        vfs_write_page:       ns[10],
        vfs_write_pages:      ns[11],
        vfs_getdents:         ns[12],
        vfs_setattr:          ns[13],
        vfs_flush:            ns[14],
        vfs_fsync:            ns[15],
        vfs_lock:             ns[16],
        vfs_file_release:     ns[17],
        congestion_wait:      ns[18],
        truncation:           ns[19],
        write_extension:      ns[20],
        silly_rename:         ns[21],
        short_read:           ns[22],
        short_write:          ns[23],
        jukebox_delay:        ns[24],
        pnfs_read:            ns[25],
        pnfs_write:           ns[26],
    })
}

/// Decode the counters of an `xprt:` line. The expected field count comes
/// from the statvers on the device line; 1.0 mounts lack the last three
/// fields, which stay zero.
fn parse_transport_stats(tokens: &[&str], stat_version: &str) -> Result<NfsTransportStats> {
    let expected = match stat_version {
        STAT_VERSION_10 => FIELD_TRANSPORT_10_LEN,
        STAT_VERSION_11 => FIELD_TRANSPORT_11_LEN,
        other => return Err(ParseError::UnsupportedStatVersion(other.to_string())),
    };
    if tokens.len() != expected {
        return Err(ParseError::InvalidTransportStats {
            version: stat_version.to_string(),
            tokens:  owned(tokens),
        });
    }

    let mut ns = parse_u64_fields(tokens)?;
    ns.resize(FIELD_TRANSPORT_11_LEN, 0);

    Ok(NfsTransportStats {
        port:    ns[0],
        bind:    ns[1],
        connect: ns[2],
        // Jiffies; kept raw, see the field docs.
        connect_idle_time: ns[3],
        idle_time: Duration::from_secs(ns[4]),
        sends:    ns[5],
        receives: ns[6],
        bad_transaction_ids:        ns[7],
        cumulative_active_requests: ns[8],
        cumulative_backlog:         ns[9],
        maximum_rpc_slots_used:     ns[10],
        cumulative_sending_queue:   ns[11],
        cumulative_pending_queue:   ns[12],
    })
}

fn parse_u64(token: &str) -> Result<u64> {
    token.parse().map_err(|source| ParseError::InvalidInteger {
        token: token.to_string(),
        source,
    })
}

fn parse_u64_fields(tokens: &[&str]) -> Result<Vec<u64>> {
    tokens.iter().map(|t| parse_u64(t)).collect()
}

fn owned(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(line: &str) -> Vec<&str> {
        line.split_whitespace().collect()
    }

    #[test]
    fn bytes_stats_decode_positionally() {
        let tokens = split("1 2 3 4 5 6 7 8");
        let b = parse_bytes_stats(&tokens).unwrap();
        assert_eq!(b.read, 1);
        assert_eq!(b.write, 2);
        assert_eq!(b.direct_read, 3);
        assert_eq!(b.direct_write, 4);
        assert_eq!(b.read_total, 5);
        assert_eq!(b.write_total, 6);
        assert_eq!(b.read_pages, 7);
        assert_eq!(b.write_pages, 8);
    }

    #[test]
    fn bytes_stats_reject_wrong_field_count() {
        for line in ["1 2 3 4 5 6 7", "1 2 3 4 5 6 7 8 9"] {
            let tokens = split(line);
            assert!(matches!(
                parse_bytes_stats(&tokens),
                Err(ParseError::InvalidBytesStats(_))
            ));
        }
    }

    #[test]
    fn bytes_stats_reject_non_numeric_field() {
        let tokens = split("1 2 3 four 5 6 7 8");
        match parse_bytes_stats(&tokens) {
            Err(ParseError::InvalidInteger { token, .. }) => assert_eq!(token, "four"),
            other => panic!("expected InvalidInteger, got {other:?}"),
        }
    }

    #[test]
    fn events_stats_decode_all_27_fields() {
        let line: Vec<String> = (1..=27).map(|n| n.to_string()).collect();
        let tokens: Vec<&str> = line.iter().map(String::as_str).collect();
        let e = parse_events_stats(&tokens).unwrap();
        assert_eq!(e.inode_revalidate, 1);
        assert_eq!(e.attribute_invalidate, 4);
        assert_eq!(e.vfs_getdents, 13);
        assert_eq!(e.congestion_wait, 19);
        assert_eq!(e.jukebox_delay, 25);
        assert_eq!(e.pnfs_write, 27);
    }

    #[test]
    fn events_stats_reject_wrong_field_count() {
        let line: Vec<String> = (1..=26).map(|n| n.to_string()).collect();
        let tokens: Vec<&str> = line.iter().map(String::as_str).collect();
        assert!(matches!(
            parse_events_stats(&tokens),
            Err(ParseError::InvalidEventsStats(_))
        ));
    }

    #[test]
    fn transport_stats_v10_zero_fill_and_durations() {
        let tokens = split("831 0 1 100 59 6428 6428 0 12154 24");
        let t = parse_transport_stats(&tokens, "1.0").unwrap();
        assert_eq!(t.port, 831);
        // Jiffies field stays a raw counter while idle_time becomes a
        // duration; that asymmetry is part of the format.
        assert_eq!(t.connect_idle_time, 100);
        assert_eq!(t.idle_time, Duration::from_secs(59));
        assert_eq!(t.cumulative_backlog, 24);
        assert_eq!(t.maximum_rpc_slots_used, 0);
        assert_eq!(t.cumulative_sending_queue, 0);
        assert_eq!(t.cumulative_pending_queue, 0);
    }

    #[test]
    fn transport_stats_v11_requires_13_fields() {
        let thirteen = split("832 0 1 0 11 6428 6428 0 12154 0 24 26 5726");
        let t = parse_transport_stats(&thirteen, "1.1").unwrap();
        assert_eq!(t.maximum_rpc_slots_used, 24);
        assert_eq!(t.cumulative_sending_queue, 26);
        assert_eq!(t.cumulative_pending_queue, 5726);

        let ten = split("832 0 1 0 11 6428 6428 0 12154 0");
        assert!(matches!(
            parse_transport_stats(&ten, "1.1"),
            Err(ParseError::InvalidTransportStats { .. })
        ));
    }

    #[test]
    fn transport_stats_v10_rejects_13_fields() {
        let thirteen = split("832 0 1 0 11 6428 6428 0 12154 0 24 26 5726");
        assert!(matches!(
            parse_transport_stats(&thirteen, "1.0"),
            Err(ParseError::InvalidTransportStats { .. })
        ));
    }

    #[test]
    fn transport_stats_reject_unknown_version() {
        let tokens = split("832 0 1 0 11 6428 6428 0 12154 0");
        match parse_transport_stats(&tokens, "2.0") {
            Err(ParseError::UnsupportedStatVersion(v)) => assert_eq!(v, "2.0"),
            other => panic!("expected UnsupportedStatVersion, got {other:?}"),
        }
    }

    #[test]
    fn per_op_line_decodes_name_counters_and_millis() {
        let input = "READ: 1 2 3 4 5 6 7 8\n\n";
        let mut lines = input.as_bytes().lines();
        let ops = parse_operation_stats(&mut lines).unwrap();
        assert_eq!(ops.len(), 1);
        let op = &ops[0];
        assert_eq!(op.operation, "READ");
        assert_eq!(op.requests, 1);
        assert_eq!(op.transmissions, 2);
        assert_eq!(op.major_timeouts, 3);
        assert_eq!(op.bytes_sent, 4);
        assert_eq!(op.bytes_received, 5);
        assert_eq!(op.cumulative_queue_time, Duration::from_millis(6));
        assert_eq!(op.cumulative_total_response_time, Duration::from_millis(7));
        assert_eq!(op.cumulative_total_request_time, Duration::from_millis(8));
    }

    #[test]
    fn per_op_block_keeps_report_order_and_duplicates() {
        let input = "\
            GETATTR: 1 1 0 80 120 0 1 1\n\
            READ: 9 9 0 720 9000 1 40 41\n\
            READ: 2 2 0 160 2000 0 9 9\n\
            \n";
        let mut lines = input.as_bytes().lines();
        let ops = parse_operation_stats(&mut lines).unwrap();
        let names: Vec<&str> = ops.iter().map(|o| o.operation.as_str()).collect();
        assert_eq!(names, ["GETATTR", "READ", "READ"]);
    }

    #[test]
    fn per_op_block_ends_at_eof_without_blank_line() {
        let input = "WRITE: 0 0 0 0 0 0 0 0";
        let mut lines = input.as_bytes().lines();
        let ops = parse_operation_stats(&mut lines).unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].operation, "WRITE");
    }

    #[test]
    fn per_op_line_with_wrong_field_count_is_an_error() {
        let input = "READ: 1 2 3 4 5 6 7\n";
        let mut lines = input.as_bytes().lines();
        assert!(matches!(
            parse_operation_stats(&mut lines),
            Err(ParseError::InvalidOperationStats(_))
        ));
    }

    #[test]
    fn stats_block_without_per_op_section_is_legal() {
        let input = "age: 5\n\n";
        let mut lines = input.as_bytes().lines();
        let stats = parse_nfs_stats(&mut lines, "1.1").unwrap();
        assert_eq!(stats.age, Duration::from_secs(5));
        assert!(stats.operations.is_empty());
    }

    #[test]
    fn stats_block_ignores_unknown_field_keywords() {
        let input = "\
            opts: rw,vers=4.1,rsize=1048576\n\
            caps: caps=0xfff7,wtmult=512\n\
            age: 120\n\
            \n";
        let mut lines = input.as_bytes().lines();
        let stats = parse_nfs_stats(&mut lines, "1.1").unwrap();
        assert_eq!(stats.age, Duration::from_secs(120));
    }

    #[test]
    fn non_numeric_age_value_is_an_error() {
        let input = "age: soon\n";
        let mut lines = input.as_bytes().lines();
        match parse_nfs_stats(&mut lines, "1.1") {
            Err(ParseError::InvalidInteger { token, .. }) => assert_eq!(token, "soon"),
            other => panic!("expected InvalidInteger, got {other:?}"),
        }
    }

    #[test]
    fn single_token_stats_line_is_an_error() {
        let input = "age:\n";
        let mut lines = input.as_bytes().lines();
        assert!(matches!(
            parse_nfs_stats(&mut lines, "1.1"),
            Err(ParseError::TruncatedStatsLine(_))
        ));
    }

    #[test]
    fn xprt_line_without_counters_is_an_error() {
        let input = "xprt: tcp\n";
        let mut lines = input.as_bytes().lines();
        assert!(matches!(
            parse_nfs_stats(&mut lines, "1.1"),
            Err(ParseError::TruncatedTransportLine(_))
        ));
    }
}
