//! Derivation of the hashed node field.
//!
//! The node value is a 48-bit fingerprint of the generating machine and process, computed
//! once per process lifetime. Identity signals are gathered on a best-effort basis and fed
//! into a SHA-256 digest; an enumeration that fails simply contributes nothing. The
//! multicast bit of the resulting value is forced on, so a derived node can never collide
//! with a burned-in hardware address.

use std::collections::BTreeSet;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::sync::OnceLock;
use std::{env, process};

use sha2::{Digest, Sha256};

/// The multicast bit marking the node value as derived rather than hardware-assigned.
const MULTICAST_BIT: u64 = 1 << 40;

/// Returns the node value of the running process, deriving it on first use.
pub(crate) fn node_id() -> u64 {
    static NODE: OnceLock<u64> = OnceLock::new();
    *NODE.get_or_init(derive)
}

/// Hashes the gathered identity signals into a 48-bit node value.
fn derive() -> u64 {
    let mut digest = Sha256::new();
    for address in local_addresses() {
        digest.update(address.as_bytes());
    }
    digest.update(env::consts::FAMILY.as_bytes());
    digest.update(env::consts::OS.as_bytes());
    digest.update(env::consts::ARCH.as_bytes());
    digest.update(process_marker().as_bytes());

    let hash = digest.finalize();
    let mut node = 0u64;
    for (i, e) in hash.iter().take(6).enumerate() {
        node |= (*e as u64) << (i * 8);
    }
    node | MULTICAST_BIT
}

/// Collects host names and local interface addresses on a best-effort basis; signals that
/// cannot be gathered are skipped rather than reported.
fn local_addresses() -> BTreeSet<String> {
    let mut addresses = BTreeSet::new();

    for key in ["HOSTNAME", "COMPUTERNAME"] {
        if let Ok(name) = env::var(key) {
            addresses.insert(name);
        }
    }

    let v4 = SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0));
    if let Some(ip) = outbound_local_ip(v4, "198.51.100.1:9") {
        addresses.insert(ip);
    }
    let v6 = SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0));
    if let Some(ip) = outbound_local_ip(v6, "[2001:db8::1]:9") {
        addresses.insert(ip);
    }

    addresses
}

/// Reads the local endpoint the OS routing table picks for `target`; connecting a UDP
/// socket sends no datagram.
fn outbound_local_ip(bind: SocketAddr, target: &str) -> Option<String> {
    let socket = UdpSocket::bind(bind).ok()?;
    socket.connect(target).ok()?;
    Some(socket.local_addr().ok()?.ip().to_string())
}

/// Combines the process identifier with the load address of a process-local static,
/// separating processes that observe a recycled PID.
fn process_marker() -> String {
    static ANCHOR: u8 = 0;
    format!("{:x}{:x}", process::id(), &ANCHOR as *const u8 as usize)
}
