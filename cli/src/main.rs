mod commands;
mod terminal;

use commands::{Command, CommandLine, manage, wake};
use wol_common::config::StoreConfig;
use wol_core::registry::Store;

#[tokio::main]
async fn main() {
    terminal::logging::init();

    let command = match CommandLine::parse_args().into_command() {
        Ok(command) => command,
        Err(err) => fail(&err),
    };

    let store = Store::new(StoreConfig::from_env());

    let result = match command {
        Command::Wake { mac, ip, port } => wake::by_mac(mac, &ip, port).await,
        Command::WakeByName { name } => wake::by_name(&store, &name).await,
        Command::Save { name, mac, ip, port } => manage::save(&store, &name, mac, &ip, port),
        Command::Delete { name } => manage::delete(&store, &name),
        Command::List => manage::list(&store),
        Command::Names => manage::names(&store),
    };

    if let Err(err) = result {
        fail(&err);
    }
}

/// Reports an error as a single line on stderr and exits with status 1.
fn fail(err: &anyhow::Error) -> ! {
    eprintln!("{err:#}");
    std::process::exit(1);
}
