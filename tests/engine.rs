//! Request engine scenarios through the public API.

mod common;

use common::{COMMUNITY_RO, COMMUNITY_RW, request, scenario_mib, system_mib};
use usnmp::ber::{TlvWriter, canonicalize_integer, tag};
use usnmp::engine::{self, Communities};
use usnmp::message::{Envelope, parse_response, parse_trap, wrap};
use usnmp::pdu::build_trap;
use usnmp::{Error, ErrorStatus, GenericTrap, PduType, Value, oid};

fn auth() -> Communities {
    Communities::default()
}

#[test]
fn test_get_hit_returns_current_value() {
    let mut mib = system_mib();
    let msg = request(
        PduType::GetRequest,
        10,
        COMMUNITY_RO,
        &[(oid!(B, 1, 5, 0), Value::Null), (oid!(B, 1, 7, 0), Value::Null)],
    );

    let reply = engine::process(&msg, &mut mib, &auth()).unwrap();
    let resp = parse_response(&reply.message).unwrap();
    assert_eq!(resp.error_status, ErrorStatus::NoError);

    let vbs = resp.varbinds.to_vec().unwrap();
    assert_eq!(vbs.len(), 2);
    assert_eq!(vbs[0].oid, oid!(B, 1, 5, 0));
    assert_eq!(vbs[0].value, Value::from("gw"));
    assert_eq!(vbs[1].value, Value::Integer(72));
}

#[test]
fn test_get_miss_reports_position() {
    let mut mib = system_mib();
    let msg = request(
        PduType::GetRequest,
        11,
        COMMUNITY_RO,
        &[
            (oid!(B, 1, 1, 0), Value::Null),
            (oid!(B, 1, 5, 0), Value::Null),
            (oid!(B, 1, 99, 0), Value::Null),
        ],
    );

    let reply = engine::process(&msg, &mut mib, &auth()).unwrap();
    assert!(reply.is_error());
    assert_eq!(reply.error_status, ErrorStatus::NoSuchName);
    assert_eq!(reply.error_index, 3);

    let resp = parse_response(&reply.message).unwrap();
    assert_eq!(resp.request_id, 11);
    assert_eq!(resp.error_index, 3);
    // The request varbinds come back unchanged.
    let vbs = resp.varbinds.to_vec().unwrap();
    assert_eq!(vbs[2].oid, oid!(B, 1, 99, 0));
    assert_eq!(vbs[2].value, Value::Null);
}

#[test]
fn test_getnext_walk() {
    let mut mib = scenario_mib();
    let mut current = oid!(B, 1);
    let mut seen = Vec::new();
    let mut request_id = 100;

    loop {
        let msg = request(
            PduType::GetNextRequest,
            request_id,
            COMMUNITY_RO,
            &[(current.clone(), Value::Null)],
        );
        request_id += 1;
        let reply = engine::process(&msg, &mut mib, &auth()).unwrap();
        if reply.is_error() {
            assert_eq!(reply.error_status, ErrorStatus::NoSuchName);
            assert_eq!(reply.error_index, 1);
            break;
        }
        let vb = parse_response(&reply.message)
            .unwrap()
            .varbinds
            .iter()
            .next()
            .unwrap()
            .unwrap();
        seen.push(vb.oid.clone());
        current = vb.oid;
    }

    assert_eq!(
        seen,
        vec![oid!(B, 1, 1), oid!(B, 1, 2), oid!(B, 1, 3, 0), oid!(B, 2, 1)]
    );
}

#[test]
fn test_set_read_only_leaves_store_unchanged() {
    let mut mib = scenario_mib();
    let msg = request(
        PduType::SetRequest,
        20,
        COMMUNITY_RW,
        &[(oid!(B, 1, 1), Value::from("changed"))],
    );

    let reply = engine::process(&msg, &mut mib, &auth()).unwrap();
    assert_eq!(reply.error_status, ErrorStatus::ReadOnly);
    assert_eq!(reply.error_index, 1);
    assert_eq!(mib.get(&oid!(B, 1, 1)).unwrap().value(), &Value::from("first"));
}

#[test]
fn test_set_type_mismatch_leaves_store_unchanged() {
    let mut mib = scenario_mib();
    let msg = request(
        PduType::SetRequest,
        21,
        COMMUNITY_RW,
        &[(oid!(B, 1, 3, 0), Value::from("42"))],
    );

    let reply = engine::process(&msg, &mut mib, &auth()).unwrap();
    assert_eq!(reply.error_status, ErrorStatus::BadValue);
    assert_eq!(reply.error_index, 1);
    assert_eq!(mib.get(&oid!(B, 1, 3, 0)).unwrap().value(), &Value::Integer(5));
}

#[test]
fn test_request_id_round_trip() {
    let mut mib = system_mib();
    for request_id in [0, 1, 127, 128, 65_535, -1, i32::MAX, i32::MIN] {
        let msg = request(
            PduType::GetRequest,
            request_id,
            COMMUNITY_RO,
            &[(oid!(B, 1, 1, 0), Value::Null)],
        );
        let reply = engine::process(&msg, &mut mib, &auth()).unwrap();
        assert_eq!(parse_response(&reply.message).unwrap().request_id, request_id);
    }
}

#[test]
fn test_set_then_get() {
    let mut mib = scenario_mib();
    let set = request(
        PduType::SetRequest,
        30,
        COMMUNITY_RW,
        &[(oid!(B, 1, 3, 0), Value::Integer(42))],
    );
    let reply = engine::process(&set, &mut mib, &auth()).unwrap();
    let vbs = parse_response(&reply.message).unwrap().varbinds.to_vec().unwrap();
    assert_eq!(vbs[0].oid, oid!(B, 1, 3, 0));
    assert_eq!(vbs[0].value, Value::Integer(42));

    let get = request(
        PduType::GetRequest,
        31,
        COMMUNITY_RO,
        &[(oid!(B, 1, 3, 0), Value::Null)],
    );
    let reply = engine::process(&get, &mut mib, &auth()).unwrap();
    let vbs = parse_response(&reply.message).unwrap().varbinds.to_vec().unwrap();
    assert_eq!(vbs[0].value, Value::Integer(42));
}

#[test]
fn test_set_with_read_community_is_rejected() {
    let mut mib = scenario_mib();
    let set = request(
        PduType::SetRequest,
        32,
        COMMUNITY_RO,
        &[(oid!(B, 1, 3, 0), Value::Integer(42))],
    );
    let err = engine::process(&set, &mut mib, &auth()).unwrap_err();
    assert!(matches!(err, Error::InvalidCommunity { .. }));
    assert_eq!(mib.get(&oid!(B, 1, 3, 0)).unwrap().value(), &Value::Integer(5));
}

#[test]
fn test_cold_start_trap_envelope() {
    let pdu = build_trap(
        &oid!(P, 38644, 30),
        "10.0.0.1".parse().unwrap(),
        GenericTrap::ColdStart,
        0,
        0,
        None,
    )
    .unwrap();
    let msg = wrap(b"public", &pdu).unwrap();

    let env = Envelope::decode(&msg).unwrap();
    assert_eq!(env.community, b"public");
    assert_eq!(env.pdu_type, PduType::Trap);
    assert_eq!(env.pdu.tag, tag::TRAP);

    let trap = parse_trap(&msg).unwrap();
    assert_eq!(trap.pdu.generic(), Some(GenericTrap::ColdStart));
    assert_eq!(trap.pdu.specific_trap, 0);
    assert_eq!(trap.pdu.enterprise, oid!(P, 38644, 30));
    assert!(trap.pdu.varbinds.is_empty());
    assert_eq!(trap.pdu.varbinds.as_bytes(), [0x30, 0x00]);
}

#[test]
fn test_integer_canonical_encoding() {
    let mut w = TlvWriter::new(32);
    w.put_integer(0).unwrap();
    w.put_integer(-1).unwrap();
    w.put_integer(128).unwrap();
    assert_eq!(
        w.as_slice(),
        [0x02, 0x01, 0x00, 0x02, 0x01, 0xFF, 0x02, 0x02, 0x00, 0x80]
    );

    assert_eq!(canonicalize_integer(tag::INTEGER, &[0x00, 0x00, 0x00, 0x80]), [0x00, 0x80]);
    assert_eq!(canonicalize_integer(tag::INTEGER, &[0xFF, 0xFF, 0xFF, 0xFF]), [0xFF]);
}
