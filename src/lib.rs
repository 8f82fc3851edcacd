//! Decoder for the Linux `/proc/[pid]/mountstats` text format.
//!
//! Turns the kernel's whitespace-delimited mount report into a typed list
//! of [`Mount`] records, with full decoding of the NFS v3/v4 client
//! statistics block (byte counters, event counters, RPC transport counters,
//! and per-operation counters) when a mount carries one.
//!
//! The crate never opens `/proc` itself; hand it any [`std::io::BufRead`]
//! and it makes one forward-only pass:
//!
//! ```
//! use mountstats::{parse_mountstats, MountStats};
//!
//! let report = "device fs.example.org:/vol mounted on /mnt/vol with fstype nfs4 statvers=1.1\n\
//!               age: 120\n\n";
//!
//! let mounts = parse_mountstats(report.as_bytes())?;
//! assert_eq!(mounts[0].mount, "/mnt/vol");
//! if let Some(MountStats::Nfs(nfs)) = &mounts[0].stats {
//!     assert_eq!(nfs.age.as_secs(), 120);
//! }
//! # Ok::<(), mountstats::ParseError>(())
//! ```
//!
//! Parsing is all-or-nothing: any malformed line fails the whole call with
//! a [`ParseError`] describing the offending tokens.

pub mod error;
pub mod models;
pub mod parsers;

pub use error::{ParseError, Result};
pub use models::mount::{Mount, MountStats};
pub use models::nfs::{
    NfsBytesStats, NfsEventsStats, NfsOperationStats, NfsStats, NfsTransportStats,
};
pub use parsers::mountstats::parse_mountstats;
