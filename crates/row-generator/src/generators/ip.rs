//! IPv4 address generator.

use rand::Rng;
use std::net::Ipv4Addr;

/// Generate a random unicast IPv4 address.
///
/// The first octet is kept in `1..=223` so the result is never `0.x.x.x`,
/// multicast or reserved.
pub fn generate_ipv4<R: Rng>(rng: &mut R) -> Ipv4Addr {
    Ipv4Addr::new(
        rng.random_range(1..=223),
        rng.random(),
        rng.random(),
        rng.random(),
    )
}
