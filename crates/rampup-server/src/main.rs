// SPDX-License-Identifier: Apache-2.0

//! Binary entry point for the rampup server.

use clap::Parser;

/// AI-assisted GitHub issue complexity analysis server.
#[derive(Parser)]
#[command(name = "rampup-server", version, about)]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    rampup_server::logging::init_logging();
    rampup_server::run(&args.host, args.port).await
}
