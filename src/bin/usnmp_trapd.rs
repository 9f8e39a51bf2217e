//! usnmp-trapd: print received SNMPv1 traps.

use clap::Parser;
use std::net::{Ipv4Addr, SocketAddr};
use std::process::ExitCode;
use usnmp::cli::args::LogArgs;
use usnmp::format::hex;
use usnmp::message::{Trap, parse_trap};
use usnmp::transport::{TRAP_PORT, Transport};
use usnmp::UdpTransport;

/// Listen for traps and print each one.
#[derive(Debug, Parser)]
#[command(name = "usnmp-trapd", version, about)]
struct Args {
    #[command(flatten)]
    log: LogArgs,

    /// Port to listen on.
    #[arg(short = 'p', long = "port", default_value_t = TRAP_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    args.log.init_tracing("warn");

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, args.port));
    let transport = match UdpTransport::bind(addr).await {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    loop {
        tokio::select! {
            received = transport.recv_from() => match received {
                Ok((data, source)) => match parse_trap(&data) {
                    Ok(trap) => print_trap(&trap, source),
                    Err(e) => eprintln!("{}: {}", source, e),
                },
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            },
            _ = tokio::signal::ctrl_c() => return ExitCode::SUCCESS,
        }
    }
}

fn print_trap(trap: &Trap, source: SocketAddr) {
    let community = if hex::is_printable(&trap.community) {
        String::from_utf8_lossy(&trap.community).into_owned()
    } else {
        hex::encode_dashed(&trap.community)
    };
    let pdu = &trap.pdu;
    let generic = match pdu.generic() {
        Some(g) => g.to_string(),
        None => pdu.generic_trap.to_string(),
    };
    println!("Trap from {}", source);
    println!("  Community: {}", community);
    println!("  Enterprise: {}", pdu.enterprise);
    println!("  AgentAddr: {}", pdu.agent_addr);
    println!("  Generic: {} ({})", generic, pdu.generic_trap);
    println!("  Specific: {}", pdu.specific_trap);
    println!("  TimeStamp: {}", pdu.time_stamp);
    for vb in pdu.varbinds.iter() {
        match vb {
            Ok(vb) => println!("  {}", vb),
            Err(e) => {
                println!("  <{}>", e);
                break;
            }
        }
    }
}
