#[macro_use]
extern crate structopt_derive;

use std::process;

use log::{error, info};
use structopt::StructOpt;

use latency_probe::ServerConfig;

#[derive(StructOpt, Debug)]
#[structopt(name = "serv", about = "Server that answers latency probes with its clock")]
struct Args {
    #[structopt(short = "a", long = "address", help = "Server address `ip:port` to bind to",
                default_value = "0.0.0.0:51051")]
    address: String,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        ServerConfig {
            address: args.address,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = ServerConfig::from(Args::from_args());
    info!("Address: {}", config.address);

    if let Err(e) = latency_probe::serve(&config) {
        error!("{}", e);
        process::exit(1);
    }
}
