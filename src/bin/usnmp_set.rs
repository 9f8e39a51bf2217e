//! usnmp-set: SET values on an SNMPv1 agent.

use clap::Parser;
use std::process::ExitCode;
use usnmp::cli::args::{LogArgs, ManagerArgs, parse_varbinds};
use usnmp::cli::print_varbinds;
use usnmp::{Client, Error, VarBind};

/// Set one or more values on an SNMPv1 agent.
///
/// Type letters:
///   O = OBJECT IDENTIFIER
///   S = OCTET STRING
///   X = OCTET STRING from dash-separated hex (0a-ff-01)
///   I = INTEGER
///   T = TimeTicks
///   C = Counter
///   G = Gauge
///   A = IpAddress
#[derive(Debug, Parser)]
#[command(name = "usnmp-set", version, about, verbatim_doc_comment)]
struct Args {
    #[command(flatten)]
    manager: ManagerArgs,

    #[command(flatten)]
    log: LogArgs,

    /// Community string.
    #[arg(short = 'c', long = "community", default_value = "private")]
    community: String,

    /// OID TYPE VALUE triplets.
    #[arg(required = true, value_name = "OID TYPE VALUE", num_args = 3..)]
    varbinds: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    args.log.init_tracing("warn");

    let varbinds = match parse_varbinds(&args.varbinds) {
        Ok(vbs) => vbs,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run_set(&args, &varbinds).await {
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

async fn run_set(args: &Args, varbinds: &[VarBind]) -> usnmp::Result<Vec<VarBind>> {
    let client = Client::builder(args.manager.target.as_str())
        .port(args.manager.port)
        .community(&args.community)
        .request_id(args.manager.request_id)
        .timeout(args.manager.timeout_duration())
        .connect()
        .await?;
    client.set(varbinds).await
}
