//! Magic packet construction and transmission.
//!
//! Wake-On-Lan is fire-and-forget UDP: success means the datagram was handed
//! to the transport layer, not that the target machine woke up.

use anyhow::Context;
use tokio::net::UdpSocket;
use tracing::debug;

use wol_common::addr::MacAddress;

const MAC_REPEATS: usize = 16;

/// Magic packet size: 6 bytes of sync followed by the MAC repeated 16 times.
pub const MAGIC_PACKET_LEN: usize = 6 + 6 * MAC_REPEATS;

/// Builds the 102-byte magic packet for `mac`.
pub fn magic_packet(mac: MacAddress) -> [u8; MAGIC_PACKET_LEN] {
    let mut payload = [0xFFu8; MAGIC_PACKET_LEN];
    let octets = mac.octets();
    for group in payload[6..].chunks_exact_mut(6) {
        group.copy_from_slice(&octets);
    }
    payload
}

/// Sends a single magic packet for `mac` to `ip:port` from an ephemeral
/// broadcast-enabled UDP socket. No reply is expected or awaited.
pub async fn wake(mac: MacAddress, ip: &str, port: u16) -> anyhow::Result<()> {
    let socket = UdpSocket::bind(("0.0.0.0", 0))
        .await
        .context("binding wake socket")?;
    socket.set_broadcast(true).context("enabling broadcast")?;

    let payload = magic_packet(mac);
    socket
        .send_to(&payload, (ip, port))
        .await
        .with_context(|| format!("sending wake packet to {ip}:{port}"))?;

    debug!("sent magic packet for {mac} to {ip}:{port}");
    Ok(())
}
