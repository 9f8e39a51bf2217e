//! File reload and SET persistence.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::Agent;
use crate::config::CommunityTable;
use crate::error::ErrorStatus;
use crate::mib::uptime::Uptime;
use crate::mib::{Accessor, MibEntry, MibStore, dump};
use crate::oid;
use crate::value::Value;

/// Set-accessor that flags the store for saving.
#[derive(Debug, Clone)]
pub(crate) struct MarkDirty {
    dirty: Arc<AtomicBool>,
}

impl Accessor for MarkDirty {
    fn set(&self, _entry: &MibEntry, _value: &Value) -> Result<(), ErrorStatus> {
        self.dirty.store(true, Ordering::Release);
        Ok(())
    }
}

/// Attach the uptime accessor to `B.1.3.0` and [`MarkDirty`] to every
/// writable entry that has no accessor yet.
pub(crate) fn attach_accessors(mib: &mut MibStore, uptime: Uptime, dirty: &Arc<AtomicBool>) {
    mib.attach_accessor(&oid!(B, 1, 3, 0), Arc::new(uptime));
    let mark = Arc::new(MarkDirty {
        dirty: Arc::clone(dirty),
    });
    for entry in mib.iter_mut() {
        if entry.is_writable() && !entry.has_accessor() {
            entry.set_accessor(mark.clone());
        }
    }
}

impl Agent {
    /// Re-read the dump and community files.
    pub(crate) async fn reload(&self) {
        if let Some(path) = &self.inner.dump_file {
            match tokio::fs::read_to_string(path).await {
                Ok(text) => {
                    let mut mib = self.mib();
                    dump::apply_text(&mut mib, &text);
                    attach_accessors(&mut mib, self.inner.uptime, &self.inner.dirty);
                }
                Err(e) => {
                    tracing::warn!(target: "usnmp::agent", { path = %path.display(), error = %e }, "MIB reload failed");
                }
            }
        }

        if let Some(path) = &self.inner.config_file {
            match CommunityTable::load(path).await {
                Ok(table) => {
                    *self
                        .inner
                        .communities
                        .write()
                        .unwrap_or_else(std::sync::PoisonError::into_inner) = table;
                }
                Err(e) => {
                    tracing::warn!(target: "usnmp::agent", { error = %e }, "community table reload failed, keeping previous");
                }
            }
        }
    }

    /// Write the store to the dump file if a SET changed it.
    pub(crate) async fn save_if_dirty(&self) {
        if !self.inner.dirty.swap(false, Ordering::AcqRel) {
            return;
        }
        let Some(path) = &self.inner.dump_file else {
            return;
        };
        let text = dump::to_text(&self.mib());
        if let Err(e) = tokio::fs::write(path, text).await {
            tracing::warn!(target: "usnmp::agent", { path = %path.display(), error = %e }, "failed to save MIB");
        } else {
            tracing::debug!(target: "usnmp::agent", { path = %path.display() }, "MIB saved");
        }
    }
}
