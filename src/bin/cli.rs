#[macro_use]
extern crate structopt_derive;

use std::io;
use std::process;
use std::time::Duration;

use log::{error, info};
use structopt::StructOpt;

use latency_probe::BenchmarkConfig;

#[derive(StructOpt, Debug)]
#[structopt(name = "cli", about = "Measures request latency against a probe server")]
struct Args {
    #[structopt(short = "b", long = "base_id", help = "Base value for request ID's",
                default_value = "1")]
    base_id: u32,

    #[structopt(short = "n", long = "num_queries",
                help = "Number of queries to make against backend", default_value = "5000")]
    num_queries: u32,

    #[structopt(short = "a", long = "backend",
                help = "Connection string `ip:port` for backend server",
                default_value = "localhost:51051")]
    backend: String,

    #[structopt(short = "s", long = "sleep_us",
                help = "Ask the server to sleep this many microseconds per query (0 = plain echo)",
                default_value = "0")]
    sleep_us: u64,
}

impl From<Args> for BenchmarkConfig {
    fn from(args: Args) -> Self {
        BenchmarkConfig {
            backend: args.backend,
            base_id: args.base_id,
            num_queries: args.num_queries,
            sleep: if args.sleep_us == 0 {
                None
            } else {
                Some(Duration::from_micros(args.sleep_us))
            },
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = BenchmarkConfig::from(Args::from_args());
    info!(
        "Backend: {}, base id: {}, queries: {}, sleep: {:?}",
        config.backend, config.base_id, config.num_queries, config.sleep
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = latency_probe::run(&config, &mut out) {
        error!("{}", e);
        process::exit(1);
    }
}
