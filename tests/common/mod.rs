//! Shared test infrastructure for usnmp.

// Not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod fixtures;

pub use fixtures::{
    COMMUNITY_RO, COMMUNITY_RW, request, scenario_mib, sys_contact, sys_descr, sys_name,
    sys_uptime, system_mib,
};
