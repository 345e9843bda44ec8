use wol_common::addr::MacAddress;
use wol_common::error::WolError;
use wol_core::registry::Store;
use wol_core::wake;

/// Wakes a machine given explicit arguments.
pub async fn by_mac(mac: MacAddress, ip: &str, port: u16) -> anyhow::Result<()> {
    println!("wake: {mac}, {ip}, {port}");
    wake::wake(mac, ip, port).await
}

/// Wakes a machine from its saved record. An unknown name is an error here,
/// unlike inside the store API.
pub async fn by_name(store: &Store, name: &str) -> anyhow::Result<()> {
    let record = store
        .get_name_record(name)?
        .ok_or_else(|| WolError::NameNotFound(name.to_string()))?;

    by_mac(record.mac, &record.ip, record.port).await
}
