pub mod manage;
pub mod wake;

use anyhow::{bail, ensure};
use clap::Parser;

use wol_common::addr::{self, MacAddress};
use wol_common::config::{DEFAULT_IP, DEFAULT_PORT};

/// Raw argument surface.
///
/// The management switches are mutually exclusive; the remaining combination
/// rules (a name cannot take `-a`/`-p`, `--delete` takes no positional, and
/// so on) are enforced in [`CommandLine::into_command`] so their messages go
/// through the normal single-line error path.
#[derive(Parser, Debug)]
#[command(name = "wol", version, about = "Send Wake-On-Lan packet to a given machine")]
pub struct CommandLine {
    /// MAC address or saved name of the machine to wake.
    /// MAC address must be in XX:XX:XX:XX:XX:XX format
    #[arg(value_name = "MAC or NAME")]
    pub mac_or_name: Option<String>,

    /// Broadcast IPv4 address. This is NOT the IP address of the machine
    #[arg(short = 'a', value_name = "IPADDR", value_parser = parse_ip_arg)]
    pub ipaddr: Option<String>,

    /// Wake-On-Lan port
    #[arg(short = 'p', value_name = "PORT", value_parser = parse_port_arg)]
    pub port: Option<u16>,

    /// Save wake arguments as NAME
    #[arg(long, short = 's', value_name = "NAME", group = "manage")]
    pub save: Option<String>,

    /// Delete saved NAME
    #[arg(long, short = 'd', value_name = "NAME", group = "manage")]
    pub delete: Option<String>,

    /// List saved definitions
    #[arg(long, short = 'l', group = "manage")]
    pub list: bool,

    /// List saved names
    #[arg(long, short = 'n', group = "manage")]
    pub names: bool,
}

/// One fully resolved invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Wake { mac: MacAddress, ip: String, port: u16 },
    WakeByName { name: String },
    Save { name: String, mac: MacAddress, ip: String, port: u16 },
    Delete { name: String },
    List,
    Names,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Resolves the raw arguments into a single command, applying the wake
    /// defaults where the invocation carries a MAC directly.
    pub fn into_command(self) -> anyhow::Result<Command> {
        if let Some(name) = self.save {
            let Some(mac) = self.mac_or_name.as_deref().and_then(as_mac) else {
                bail!("Must specify MAC address to save");
            };
            return Ok(Command::Save {
                name,
                mac,
                ip: self.ipaddr.unwrap_or_else(|| DEFAULT_IP.to_string()),
                port: self.port.unwrap_or(DEFAULT_PORT),
            });
        }

        if let Some(name) = self.delete {
            ensure!(self.mac_or_name.is_none(), "parameter MAC or NAME: not allowed with --delete/-d");
            ensure!(self.ipaddr.is_none(), "argument -a: not allowed with --delete/-d");
            ensure!(self.port.is_none(), "argument -p: not allowed with --delete/-d");
            return Ok(Command::Delete { name });
        }

        if self.list || self.names {
            let switch = if self.list { "--list/-l" } else { "--names/-n" };
            ensure!(self.mac_or_name.is_none(), "parameter MAC or NAME: not allowed with {switch}");
            ensure!(self.ipaddr.is_none(), "argument -a: not allowed with {switch}");
            ensure!(self.port.is_none(), "argument -p: not allowed with {switch}");
            return Ok(if self.list { Command::List } else { Command::Names });
        }

        let Some(target) = self.mac_or_name else {
            bail!("MAC or name is required");
        };

        match as_mac(&target) {
            Some(mac) => Ok(Command::Wake {
                mac,
                ip: self.ipaddr.unwrap_or_else(|| DEFAULT_IP.to_string()),
                port: self.port.unwrap_or(DEFAULT_PORT),
            }),
            None => {
                ensure!(self.ipaddr.is_none(), "Cannot specify broadcast address with name");
                ensure!(self.port.is_none(), "Cannot specify port with name");
                Ok(Command::WakeByName { name: target })
            }
        }
    }
}

/// A positional that parses as a MAC is a MAC; anything else is a name.
fn as_mac(text: &str) -> Option<MacAddress> {
    text.parse().ok()
}

fn parse_ip_arg(text: &str) -> Result<String, String> {
    if addr::is_valid_ipv4(text) {
        Ok(text.to_string())
    } else {
        Err(format!("invalid IPv4 address {text}"))
    }
}

fn parse_port_arg(text: &str) -> Result<u16, String> {
    text.parse::<i64>()
        .ok()
        .filter(|&value| addr::is_valid_port(value))
        .map(|value| value as u16)
        .ok_or_else(|| format!("invalid port {text}"))
}
