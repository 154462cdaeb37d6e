use clap::Parser;

use crate::utils::version;

#[derive(Parser, Debug, Default, Clone)]
#[command(author, version = version(), about)]
pub struct Cli {
    #[arg(
        short,
        long,
        value_name = "URL",
        help = "Relay to publish to and read from (overrides config)"
    )]
    pub relay: Option<String>,

    #[arg(
        short,
        long,
        value_name = "KEY",
        help = "Recipient public key as npub, nprofile or hex (overrides config)"
    )]
    pub peer: Option<String>,

    #[arg(
        long,
        value_name = "SECS",
        help = "Seconds to wait for the relay connection (overrides config)"
    )]
    pub connect_timeout: Option<u64>,
}
