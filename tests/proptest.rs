//! Property-based tests for usnmp.
//!
//! OID codec round-trips, MIB store ordering, and decoder robustness
//! against arbitrary bytes.

mod common;

use proptest::prelude::*;
use usnmp::engine::{self, AllowAll};
use usnmp::message::Envelope;
use usnmp::mib::{Access, MibEntry, MibStore};
use usnmp::oid::{MAX_ARCS, Oid, Root};
use usnmp::{Value, VarBindList};

// =============================================================================
// Strategies
// =============================================================================

fn arb_root() -> impl Strategy<Value = Root> {
    prop_oneof![Just(Root::Mgmt), Just(Root::Experimental), Just(Root::Private)]
}

/// Any OID within the element limit.
fn arb_oid() -> impl Strategy<Value = Oid> {
    (arb_root(), prop::collection::vec(any::<u32>(), 0..=MAX_ARCS))
        .prop_map(|(root, arcs)| Oid::from_slice(root, &arcs))
}

/// Short OIDs with small arcs, so stores have shared prefixes.
fn arb_dense_oid() -> impl Strategy<Value = Oid> {
    (arb_root(), prop::collection::vec(0u32..4, 0..=5))
        .prop_map(|(root, arcs)| Oid::from_slice(root, &arcs))
}

// =============================================================================
// OID codec
// =============================================================================

proptest! {
    #[test]
    fn oid_ber_round_trip(oid in arb_oid()) {
        let ber = oid.to_ber().unwrap();
        prop_assert_eq!(Oid::from_ber(&ber).unwrap(), oid);
    }

    #[test]
    fn oid_text_round_trip(oid in arb_oid()) {
        prop_assert_eq!(Oid::parse(&oid.to_string()).unwrap(), oid.clone());
        prop_assert_eq!(Oid::parse(&oid.to_dotted()).unwrap(), oid);
    }

    #[test]
    fn oid_order_matches_arc_order(a in arb_dense_oid(), b in arb_dense_oid()) {
        if a.root() == b.root() {
            prop_assert_eq!(a.cmp(&b), a.arcs().cmp(b.arcs()));
        }
    }

    #[test]
    fn oid_from_ber_never_panics(data in prop::collection::vec(any::<u8>(), 0..40)) {
        let _ = Oid::from_ber(&data);
    }
}

// =============================================================================
// MIB store ordering
// =============================================================================

proptest! {
    #[test]
    fn mib_successor_follows_order(oids in prop::collection::btree_set(arb_dense_oid(), 1..40)) {
        // Insert in reverse so the store has to do the ordering.
        let mut mib = MibStore::new();
        for oid in oids.iter().rev() {
            mib.insert(MibEntry::new(oid.clone(), Value::Integer(0), Access::ReadOnly)).unwrap();
        }

        let sorted: Vec<&Oid> = oids.iter().collect();
        for pair in sorted.windows(2) {
            let next = mib.get_next(pair[0]).map(|e| e.oid().clone());
            prop_assert_eq!(next.as_ref(), Some(pair[1]));
        }
        let last = sorted[sorted.len() - 1];
        prop_assert!(mib.get_next(last).is_none());

        let walked: Vec<&Oid> = mib.iter().map(|e| e.oid()).collect();
        prop_assert_eq!(walked, sorted);
    }

    #[test]
    fn mib_rejects_duplicates(oid in arb_dense_oid()) {
        let mut mib = MibStore::new();
        mib.insert(MibEntry::new(oid.clone(), Value::Integer(1), Access::ReadOnly)).unwrap();
        prop_assert!(mib.insert(MibEntry::new(oid.clone(), Value::Integer(2), Access::ReadOnly)).is_err());
        prop_assert_eq!(mib.get(&oid).unwrap().value(), &Value::Integer(1));
    }
}

// =============================================================================
// Decoder robustness
// =============================================================================

proptest! {
    #[test]
    fn envelope_decode_never_panics(data in prop::collection::vec(any::<u8>(), 0..200)) {
        let _ = Envelope::decode(&data);
    }

    #[test]
    fn engine_never_panics(data in prop::collection::vec(any::<u8>(), 0..200)) {
        let mut mib = common::system_mib();
        let _ = engine::process(&data, &mut mib, &AllowAll);
    }

    #[test]
    fn varbind_iterator_never_panics(data in prop::collection::vec(any::<u8>(), 0..120)) {
        if let Ok(list) = VarBindList::from_ber(&data) {
            for vb in list.iter() {
                if vb.is_err() {
                    break;
                }
            }
        }
    }

    #[test]
    fn engine_never_panics_on_truncated_request(cut in 0usize..64) {
        let msg = common::request(
            usnmp::PduType::GetRequest,
            9,
            "public",
            &[(common::sys_descr(), Value::Null), (common::sys_name(), Value::Null)],
        );
        let cut = cut.min(msg.len());
        let mut mib = common::system_mib();
        let truncated = &msg[..msg.len() - cut];
        let result = engine::process(truncated, &mut mib, &AllowAll);
        if cut > 0 {
            prop_assert!(result.is_err());
        }
    }
}
