//! Unit tests for HMN row classification

use super::*;
use crate::test_utils::{app_config, row};

fn classify(source: &str) -> RowClass {
    classify_row(&row(source, "x3000", "u19", ""), &app_config()).expect("classifiable row")
}

#[test]
fn test_router_bmc_rows() {
    assert_eq!(
        classify("sw-hsn01"),
        RowClass::RouterBmc(Location { u_number: 19, side: Side::Unspecified })
    );
    assert!(matches!(classify("Columbia"), RowClass::RouterBmc(_)), "matching is case-insensitive");
    assert!(
        matches!(classify("columbia-2"), RowClass::Node(NodeClass::Unknown)),
        "columbia must match exactly"
    );
}

#[test]
fn test_router_bmc_side() {
    let config = app_config();
    let left = classify_row(&row("sw-hsn01", "x3000", "u22", "L"), &config).expect("classifiable");
    assert_eq!(left, RowClass::RouterBmc(Location { u_number: 22, side: Side::Left }));

    let suffix = classify_row(&row("sw-hsn02", "x3000", "U22R", ""), &config).expect("classifiable");
    assert_eq!(
        suffix,
        RowClass::RouterBmc(Location { u_number: 22, side: Side::Right }),
        "a trailing R on the location selects the right BMC"
    );
}

#[test]
fn test_pdu_rows() {
    assert_eq!(classify("x3000p0"), RowClass::Pdu { controller: 0 });
    assert_eq!(classify("pdu1"), RowClass::Pdu { controller: 1 });
    assert_eq!(classify("rack-pdu2"), RowClass::Pdu { controller: 2 }, "pdu may appear mid-name");
    assert_eq!(classify("a-x3000p3"), RowClass::Pdu { controller: 3 });
}

#[test]
fn test_door_and_switch_rows() {
    assert_eq!(classify("x3000door-Motiv"), RowClass::Door);
    for source in ["sw-leaf-bmc-001", "sw-25g01", "sw-40g02", "sw-agg01", "sw-smn01", "sw-leaf-002"] {
        assert_eq!(classify(source), RowClass::MgmtSwitch, "{source} is a management switch");
    }
}

#[test]
fn test_rule_precedence() {
    assert_eq!(
        classify("sw-hsn-door"),
        RowClass::RouterBmc(Location { u_number: 19, side: Side::Unspecified }),
        "router rule is tried before the door rule"
    );
    assert_eq!(classify("pdu-door"), RowClass::Door, "pdu without a number is not a PDU");
}

#[test]
fn test_management_nodes() {
    assert_eq!(
        classify("mn01"),
        RowClass::Node(NodeClass::Management { role: ManagementRole::Master, number: 1 })
    );
    assert_eq!(
        classify("wn12"),
        RowClass::Node(NodeClass::Management { role: ManagementRole::Worker, number: 12 })
    );
    assert_eq!(
        classify("SN03"),
        RowClass::Node(NodeClass::Management { role: ManagementRole::Storage, number: 3 })
    );
    assert_eq!(ManagementRole::Worker.alias(2), "ncn-w002");
    assert_eq!(ManagementRole::Storage.sub_role(), "Storage");
}

#[test]
fn test_compute_nodes() {
    assert_eq!(classify("nid000001"), RowClass::Node(NodeClass::Compute { nid: 1 }));
    assert_eq!(classify("cn-17"), RowClass::Node(NodeClass::Compute { nid: 17 }));
    assert_eq!(classify("cn3"), RowClass::Node(NodeClass::Compute { nid: 3 }));
}

#[test]
fn test_compute_node_without_trailing_nid_is_fatal() {
    let err = classify_row(&row("cn01a", "x3000", "u19", ""), &app_config()).expect_err("no trailing digits");
    assert!(matches!(err, TopologyError::MalformedField { field: "NID", .. }));
}

#[test]
fn test_application_nodes() {
    assert_eq!(
        classify("uan01"),
        RowClass::Node(NodeClass::Application { sub_role: Some("UAN".to_string()) })
    );
    assert_eq!(
        classify("gateway01"),
        RowClass::Node(NodeClass::Application { sub_role: Some("Gateway".to_string()) }),
        "site prefixes are matched"
    );
    assert_eq!(
        classify("lnet01"),
        RowClass::Node(NodeClass::Application { sub_role: Some("LNETRouter".to_string()) }),
        "lnet is tried before ln"
    );
    assert_eq!(
        classify("visualization02"),
        RowClass::Node(NodeClass::Application { sub_role: Some("Visualization".to_string()) })
    );
}

#[test]
fn test_cmc_and_unknown_nodes() {
    assert_eq!(classify("SubRack-001-CMC"), RowClass::Node(NodeClass::System));
    assert_eq!(classify("mystery-box"), RowClass::Node(NodeClass::Unknown));
}

#[test]
fn test_parse_location_malformed() {
    let err = parse_location(&row("nid000001", "x3000", "top shelf", "")).expect_err("no U-number");
    assert_eq!(
        err.to_string(),
        "Malformed location \"top shelf\" in HMN row nid000001"
    );
}

#[test]
fn test_parse_rack() {
    let r = row("nid000001", "x3000", "u19", "");
    assert_eq!(parse_rack("rack", "X3000", &r).expect("cabinet"), 3000);
    assert_eq!(parse_rack("rack", "x03000", &r).expect("padded cabinet"), 3000);
    assert!(parse_rack("rack", "rack-1", &r).is_err());
}

#[test]
fn test_parse_number() {
    let r = row("nid000001", "x3000", "u19", "");
    assert_eq!(parse_number("port", "j37", &r).expect("port"), 37);
    assert_eq!(parse_number("port", "37", &r).expect("port"), 37);
    assert!(parse_number("port", "j", &r).is_err());
}
