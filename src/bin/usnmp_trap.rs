//! usnmp-trap: send an SNMPv1 trap.

use clap::Parser;
use std::net::Ipv4Addr;
use std::process::ExitCode;
use usnmp::cli::args::{LogArgs, parse_oid, parse_varbinds};
use usnmp::transport::TRAP_PORT;
use usnmp::{Client, GenericTrap, Oid, VarBindList};

/// Send a trap to a manager.
///
/// Generic trap codes:
///   0 = coldStart
///   1 = warmStart
///   2 = linkDown
///   3 = linkUp
///   4 = authenticationFailure
///   5 = egpNeighborLoss
///   6 = enterpriseSpecific
#[derive(Debug, Parser)]
#[command(name = "usnmp-trap", version, about, verbatim_doc_comment)]
struct Args {
    #[command(flatten)]
    log: LogArgs,

    /// Manager host.
    #[arg(value_name = "TARGET")]
    target: String,

    /// Enterprise OID (e.g. P.38644.30).
    #[arg(value_name = "ENTERPRISE-OID", value_parser = parse_oid)]
    enterprise: Oid,

    /// Generic trap code.
    #[arg(value_name = "GEN", value_parser = parse_generic)]
    generic: GenericTrap,

    /// Specific trap code.
    #[arg(value_name = "SPECIFIC")]
    specific: i32,

    /// Optional OID TYPE VALUE triplets.
    #[arg(value_name = "OID TYPE VALUE")]
    varbinds: Vec<String>,

    /// Agent address carried in the trap.
    #[arg(short = 'a', long = "agent-addr", default_value = "0.0.0.0")]
    agent_addr: Ipv4Addr,

    /// Community string.
    #[arg(short = 'c', long = "community", default_value = "public")]
    community: String,

    /// Manager port.
    #[arg(short = 'p', long = "port", default_value_t = TRAP_PORT)]
    port: u16,
}

fn parse_generic(s: &str) -> Result<GenericTrap, String> {
    s.parse::<i32>()
        .ok()
        .and_then(GenericTrap::from_i32)
        .ok_or_else(|| format!("invalid generic trap code: {s}"))
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

    if let Err(e) = run_trap(&args, &varbinds).await {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run_trap(args: &Args, varbinds: &[usnmp::VarBind]) -> usnmp::Result<()> {
    let mut list = VarBindList::new();
    for vb in varbinds {
        list.push(vb)?;
    }
    let client = Client::builder(args.target.as_str())
        .port(args.port)
        .community(&args.community)
        .connect()
        .await?;
    client
        .send_trap(
            &args.enterprise,
            args.agent_addr,
            args.generic,
            args.specific,
            0,
            (!list.is_empty()).then_some(&list),
        )
        .await
}
