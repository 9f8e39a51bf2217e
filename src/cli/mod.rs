//! Shared pieces of the command-line tools.

pub mod args;

use crate::varbind::VarBind;

/// Print varbinds one per line.
pub fn print_varbinds(varbinds: &[VarBind]) {
    for vb in varbinds {
        println!("{vb}");
    }
}
