//! SNMPv1 agent.
//!
//! Serves a [`MibStore`] over UDP. Every request goes through
//! [`engine::process`](crate::engine::process) with the store locked, so
//! requests are answered one at a time.
//!
//! Optional file integration:
//!
//! - a MIB dump file (see [`mib::dump`](crate::mib::dump)) loaded at build,
//!   re-read on every reload tick, and rewritten after each successful SET
//! - a community table file (see [`config`](crate::config)) re-read on every
//!   reload tick; it also lists the trap destinations
//!
//! A coldStart trap is sent when [`Agent::run`] starts and an
//! authenticationFailure trap whenever a community is rejected.
//!
//! # Example
//!
//! ```rust,no_run
//! use usnmp::agent::Agent;
//! use usnmp::oid;
//!
//! # async fn example() -> usnmp::Result<()> {
//! let agent = Agent::builder()
//!     .bind("0.0.0.0:161")
//!     .enterprise(oid!(P, 38644, 30))
//!     .dump_file("usnmpd.dat")
//!     .config_file("usnmpd.cfg")
//!     .build()
//!     .await?;
//!
//! agent.run().await
//! # }
//! ```

mod persist;
mod request;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::config::CommunityTable;
use crate::error::{Error, Result};
use crate::mib::MibStore;
use crate::mib::uptime::Uptime;
use crate::oid::Oid;
use crate::pdu::GenericTrap;
use crate::transport::{TRAP_PORT, Transport, UdpTransport};

/// Default interval between reloads of the dump and community files.
pub const DEFAULT_RELOAD_INTERVAL: Duration = Duration::from_secs(1);

/// Builder for [`Agent`].
pub struct AgentBuilder {
    bind_addr: String,
    enterprise: Oid,
    agent_addr: Option<Ipv4Addr>,
    mib: MibStore,
    dump_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
    communities: Option<CommunityTable>,
    authenticate: bool,
    reload_interval: Duration,
    trap_port: u16,
    cancel: Option<CancellationToken>,
}

impl AgentBuilder {
    /// Create a builder with default settings.
    ///
    /// Defaults:
    /// - Bind address: `0.0.0.0:161`
    /// - Enterprise: `P`
    /// - Communities: `public` read-only, `private` read-write, no trap destinations
    /// - Reload interval: 1 second
    pub fn new() -> Self {
        Self {
            bind_addr: "0.0.0.0:161".to_string(),
            enterprise: Oid::from_slice(crate::oid::Root::Private, &[]),
            agent_addr: None,
            mib: MibStore::new(),
            dump_file: None,
            config_file: None,
            communities: None,
            authenticate: true,
            reload_interval: DEFAULT_RELOAD_INTERVAL,
            trap_port: TRAP_PORT,
            cancel: None,
        }
    }

    /// Set the UDP bind address.
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Enterprise OID put on every trap.
    pub fn enterprise(mut self, oid: Oid) -> Self {
        self.enterprise = oid;
        self
    }

    /// Agent address put on every trap.
    ///
    /// Defaults to the bound IPv4 address, or `0.0.0.0` when bound to a
    /// wildcard.
    pub fn agent_addr(mut self, addr: Ipv4Addr) -> Self {
        self.agent_addr = Some(addr);
        self
    }

    /// Initial MIB contents.
    ///
    /// Entries from the dump file, if any, are applied on top.
    pub fn mib(mut self, mib: MibStore) -> Self {
        self.mib = mib;
        self
    }

    /// MIB dump file to load, reload and persist SETs to.
    pub fn dump_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.dump_file = Some(path.into());
        self
    }

    /// Community table file, re-read on every reload tick.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Fixed community table. Ignored when a config file is set.
    pub fn communities(mut self, table: CommunityTable) -> Self {
        self.communities = Some(table);
        self
    }

    /// Accept every community when `false`.
    pub fn authenticate(mut self, enabled: bool) -> Self {
        self.authenticate = enabled;
        self
    }

    /// Interval between file reloads (default: 1 second).
    pub fn reload_interval(mut self, interval: Duration) -> Self {
        self.reload_interval = interval;
        self
    }

    /// Destination port for traps (default: 162).
    pub fn trap_port(mut self, port: u16) -> Self {
        self.trap_port = port;
        self
    }

    /// Set a cancellation token for graceful shutdown.
    ///
    /// If not set, the agent creates its own token accessible via `Agent::cancel()`.
    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Bind the socket, load the files and attach accessors.
    pub async fn build(self) -> Result<Agent> {
        let bind_addr: SocketAddr = self
            .bind_addr
            .parse()
            .map_err(|_| Error::Config(format!("invalid bind address: {}", self.bind_addr)))?;
        if self.reload_interval.is_zero() {
            return Err(Error::Config("reload interval must be non-zero".into()));
        }

        let communities = match &self.config_file {
            Some(path) => CommunityTable::load(path).await?,
            None => self
                .communities
                .unwrap_or_else(CommunityTable::with_defaults),
        };

        let mut mib = self.mib;
        if let Some(path) = &self.dump_file {
            let text = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
            let applied = crate::mib::dump::apply_text(&mut mib, &text);
            tracing::info!(target: "usnmp::agent", { path = %path.display(), entries = applied }, "MIB loaded");
        }

        let uptime = Uptime::new();
        let dirty = Arc::new(AtomicBool::new(false));
        persist::attach_accessors(&mut mib, uptime, &dirty);

        let transport = UdpTransport::bind(bind_addr).await?;
        let local_addr = transport.local_addr();
        let agent_addr = self.agent_addr.unwrap_or(match local_addr.ip() {
            IpAddr::V4(v4) => v4,
            IpAddr::V6(_) => Ipv4Addr::UNSPECIFIED,
        });
        tracing::info!(target: "usnmp::agent", { snmp.local_addr = %local_addr, enterprise = %self.enterprise }, "agent bound");

        Ok(Agent {
            inner: Arc::new(AgentInner {
                transport,
                enterprise: self.enterprise,
                agent_addr,
                mib: Mutex::new(mib),
                communities: RwLock::new(communities),
                dump_file: self.dump_file,
                config_file: self.config_file,
                authenticate: self.authenticate,
                reload_interval: self.reload_interval,
                trap_port: self.trap_port,
                uptime,
                dirty,
                cancel: self.cancel.unwrap_or_default(),
            }),
        })
    }
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Inner state shared across agent clones.
pub(crate) struct AgentInner {
    pub(crate) transport: UdpTransport,
    pub(crate) enterprise: Oid,
    pub(crate) agent_addr: Ipv4Addr,
    pub(crate) mib: Mutex<MibStore>,
    pub(crate) communities: RwLock<CommunityTable>,
    pub(crate) dump_file: Option<PathBuf>,
    pub(crate) config_file: Option<PathBuf>,
    pub(crate) authenticate: bool,
    pub(crate) reload_interval: Duration,
    pub(crate) trap_port: u16,
    pub(crate) uptime: Uptime,
    /// Set by the persist accessor when a SET changed a writable entry.
    pub(crate) dirty: Arc<AtomicBool>,
    pub(crate) cancel: CancellationToken,
}

/// SNMPv1 agent.
///
/// Cloning is cheap; clones share the socket and the store.
#[derive(Clone)]
pub struct Agent {
    pub(crate) inner: Arc<AgentInner>,
}

impl Agent {
    /// Create a builder for configuring the agent.
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    /// Get the local address the agent is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.inner.transport.local_addr()
    }

    /// Get the cancellation token for this agent.
    ///
    /// Call `token.cancel()` to initiate graceful shutdown.
    pub fn cancel(&self) -> CancellationToken {
        self.inner.cancel.clone()
    }

    /// Centiseconds since the agent was built.
    pub fn uptime(&self) -> u32 {
        self.inner.uptime.ticks()
    }

    /// Lock the MIB store.
    ///
    /// Requests wait while the guard is held; do not hold it across an await.
    pub fn mib(&self) -> MutexGuard<'_, MibStore> {
        self.inner.mib.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run the agent until the cancellation token is triggered.
    #[instrument(skip(self), err, fields(snmp.local_addr = %self.local_addr()))]
    pub async fn run(&self) -> Result<()> {
        tracing::info!(target: "usnmp::agent", "cold start");
        self.send_trap(GenericTrap::ColdStart).await;

        let mut reload = tokio::time::interval(self.inner.reload_interval);
        reload.set_missed_tick_behavior(MissedTickBehavior::Delay);
        reload.tick().await;

        loop {
            tokio::select! {
                result = self.inner.transport.recv_from() => {
                    match result {
                        Ok((data, source)) => self.handle_request(&data, source).await,
                        Err(e) => {
                            tracing::warn!(target: "usnmp::agent", { error = %e }, "receive failed");
                        }
                    }
                }
                _ = reload.tick() => {
                    self.reload().await;
                }
                _ = self.inner.cancel.cancelled() => {
                    tracing::info!(target: "usnmp::agent", "agent shutdown requested");
                    return Ok(());
                }
            }
        }
    }

    /// Send a trap with no varbinds to every configured destination.
    pub async fn send_trap(&self, generic: GenericTrap) {
        let destinations = self
            .inner
            .communities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .trap_destinations();
        if destinations.is_empty() {
            return;
        }

        let pdu = match crate::pdu::build_trap(
            &self.inner.enterprise,
            self.inner.agent_addr,
            generic,
            0,
            self.uptime(),
            None,
        ) {
            Ok(pdu) => pdu,
            Err(e) => {
                tracing::warn!(target: "usnmp::agent", { error = %e, trap = %generic }, "failed to build trap");
                return;
            }
        };

        for (dest, community) in destinations {
            let dest = SocketAddr::new(dest.ip(), self.inner.trap_port);
            let sent = match crate::message::wrap(&community, &pdu) {
                Ok(message) => self.inner.transport.send_to(&message, dest).await,
                Err(e) => Err(e),
            };
            match sent {
                Ok(()) => {
                    tracing::debug!(target: "usnmp::agent", { snmp.target = %dest, trap = %generic }, "trap sent");
                }
                Err(e) => {
                    tracing::warn!(target: "usnmp::agent", { snmp.target = %dest, error = %e }, "failed to send trap");
                }
            }
        }
    }
}
