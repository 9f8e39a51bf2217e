//! usnmpd: SNMPv1 agent daemon.

use clap::Parser;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;
use usnmp::cli::args::{LogArgs, parse_oid};
use usnmp::transport::SNMP_PORT;
use usnmp::{Agent, Oid};

/// Serve a MIB dump file over SNMPv1.
#[derive(Debug, Parser)]
#[command(name = "usnmpd", version, about)]
struct Args {
    #[command(flatten)]
    log: LogArgs,

    /// Enterprise OID sent in traps (e.g. P.38644.30).
    #[arg(value_name = "ENTERPRISE-OID", value_parser = parse_oid)]
    enterprise: Oid,

    /// UDP port to listen on.
    #[arg(short = 'p', long = "port", default_value_t = SNMP_PORT)]
    port: u16,

    /// Community table file.
    #[arg(short = 'c', long = "config", default_value = "usnmpd.cfg")]
    config: PathBuf,

    /// MIB dump file.
    #[arg(short = 'f', long = "file", default_value = "usnmpd.dat")]
    dump: PathBuf,

    /// Accept any community.
    #[arg(long = "no-auth")]
    no_auth: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    args.log.init_tracing("info");

    let bind = SocketAddr::from((Ipv4Addr::UNSPECIFIED, args.port));
    let agent = match Agent::builder()
        .bind(bind.to_string())
        .enterprise(args.enterprise.clone())
        .dump_file(&args.dump)
        .config_file(&args.config)
        .authenticate(!args.no_auth)
        .build()
        .await
    {
        Ok(agent) => agent,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let cancel = agent.cancel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    match agent.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
