use wol_common::addr::MacAddress;
use wol_core::registry::Store;

pub fn save(store: &Store, name: &str, mac: MacAddress, ip: &str, port: u16) -> anyhow::Result<()> {
    store.save_name(name, mac, ip, port)?;
    println!("Name {name} saved");
    Ok(())
}

pub fn delete(store: &Store, name: &str) -> anyhow::Result<()> {
    store.delete_name(name)?;
    println!("Name {name} deleted");
    Ok(())
}

/// Prints every saved definition, one `name - MAC, ip, port` line each.
pub fn list(store: &Store) -> anyhow::Result<()> {
    for (name, record) in store.get_names()? {
        println!("{name} - {}, {}, {}", record.mac, record.ip, record.port);
    }
    Ok(())
}

/// Prints saved names only, for piping into other tooling.
pub fn names(store: &Store) -> anyhow::Result<()> {
    for name in store.get_names()?.keys() {
        println!("{name}");
    }
    Ok(())
}
