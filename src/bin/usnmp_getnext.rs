//! usnmp-getnext: GET-NEXT from an SNMPv1 agent.

use clap::Parser;
use std::process::ExitCode;
use usnmp::cli::args::{LogArgs, ManagerArgs, parse_oid};
use usnmp::cli::print_varbinds;
use usnmp::{Client, Error, Oid, VarBind};

/// Print the successor of each OID.
#[derive(Debug, Parser)]
#[command(name = "usnmp-getnext", version, about)]
struct Args {
    #[command(flatten)]
    manager: ManagerArgs,

    #[command(flatten)]
    log: LogArgs,

    /// Community string.
    #[arg(short = 'c', long = "community", default_value = "public")]
    community: String,

    /// OIDs in B./E./P. notation (e.g. B.1.1.0).
    #[arg(required = true, value_name = "OID", value_parser = parse_oid)]
    oids: Vec<Oid>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    args.log.init_tracing("warn");

    match run_getnext(&args).await {
        Ok(result) => {
            print_varbinds(&result);
            ExitCode::SUCCESS
        }
        Err(Error::Snmp { status, index }) => {
            println!("ErrorStatus:{}, ErrorIndex:{}", status, index);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_getnext(args: &Args) -> usnmp::Result<Vec<VarBind>> {
    let client = Client::builder(args.manager.target.as_str())
        .port(args.manager.port)
        .community(&args.community)
        .request_id(args.manager.request_id)
        .timeout(args.manager.timeout_duration())
        .connect()
        .await?;
    client.get_next(&args.oids).await
}
