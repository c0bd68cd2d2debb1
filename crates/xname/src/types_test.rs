//! Unit tests for the xname grammar

use super::*;

#[test]
fn test_get_type() {
    let cases = [
        ("s0", XnameType::System),
        ("d0", XnameType::CDU),
        ("d0w1", XnameType::CDUMgmtSwitch),
        ("x3000", XnameType::Cabinet),
        ("x3000b0", XnameType::CabinetBMC),
        ("x3000m0", XnameType::CabinetPDUController),
        ("x3000m0p0", XnameType::CabinetPDU),
        ("x3000m0p0j12", XnameType::CabinetPDUOutlet),
        ("x1000c7", XnameType::Chassis),
        ("x1000c7b0", XnameType::ChassisBMC),
        ("x1000c7t0", XnameType::CMMRectifier),
        ("x1000c7s3", XnameType::ComputeModule),
        ("x1000c7s3b1", XnameType::NodeBMC),
        ("x1000c7s3b1i0", XnameType::NodeBMCNic),
        ("x1000c7s3e0", XnameType::NodeEnclosure),
        ("x1000c7s3b1n1", XnameType::Node),
        ("x1000c7s3b1n1i0", XnameType::NodeNic),
        ("x1000c7s3b1n1h0", XnameType::NodeHsnNic),
        ("x1000c7s3b1n1p0", XnameType::Processor),
        ("x1000c7s3b1n1d4", XnameType::Memory),
        ("x1000c7r2", XnameType::RouterModule),
        ("x1000c7r2b0", XnameType::RouterBMC),
        ("x1000c7r2e0", XnameType::HSNBoard),
        ("x1000c7r2j16", XnameType::HSNConnector),
        ("x3000c0w22", XnameType::MgmtSwitch),
        ("x3000c0w22j37", XnameType::MgmtSwitchConnector),
        ("x3000c0h33", XnameType::MgmtHLSwitchEnclosure),
        ("x3000c0h33s1", XnameType::MgmtHLSwitch),
    ];
    for (xname, expected) in cases {
        assert_eq!(get_type(xname), expected, "type of {xname}");
        assert!(is_valid(xname), "{xname} should be valid");
    }
}

#[test]
fn test_invalid_xnames() {
    for xname in ["", "s1", "x", "x3000c", "x3000q0", "x3000c0s17b0n0 ", "ncn-m001", "X3000", "3000"] {
        assert_eq!(get_type(xname), XnameType::Invalid, "{xname:?} should be invalid");
        assert!(!is_valid(xname));
    }
}

#[test]
fn test_every_template_prefix_is_a_template() {
    for kind in XnameType::all() {
        let mut current = kind;
        while let Some(parent) = current.parent_type() {
            assert_ne!(parent, XnameType::Invalid, "parent of {current}");
            current = parent;
        }
        assert_eq!(current, XnameType::System, "{kind} should descend from the system root");
    }
}

#[test]
fn test_normalize() {
    assert_eq!(normalize("x3000c0s017b0n0"), "x3000c0s17b0n0");
    assert_eq!(normalize("X03000C00S01B0N0"), "x3000c0s1b0n0");
    assert_eq!(normalize("x3000c0w022"), "x3000c0w22");
    assert_eq!(normalize("x0"), "x0");
    assert_eq!(normalize("x00"), "x0");
}

#[test]
fn test_normalize_is_idempotent_and_preserves_type() {
    let inputs = [
        "x3000",
        "x03000",
        "x3000c00",
        "x3000c0s007b0n0",
        "x1000c7s3b1n1",
        "x3000c0h033s01",
        "d00w01",
        "x3000m00",
    ];
    for input in inputs {
        let once = normalize(input);
        assert_eq!(normalize(&once), once, "normalize should be idempotent for {input}");
        assert!(is_valid(&once), "normalized {input} should be valid");
        assert_eq!(get_type(&once), get_type(input), "normalize changed type of {input}");
    }
}

#[test]
fn test_parent() {
    assert_eq!(parent("x3000c0s17b0n0").expect("node parent"), "x3000c0s17b0");
    assert_eq!(parent("x3000c0h33s1").expect("switch parent"), "x3000c0h33");
    assert_eq!(parent("x3000").expect("cabinet parent"), "s0");
    assert_eq!(parent("d1").expect("cdu parent"), "s0");
    assert_eq!(parent("d1w2").expect("cdu switch parent"), "d1");
    assert_eq!(parent("s0"), Err(XnameError::NoParent("s0".to_string())));
    assert_eq!(parent("bogus"), Err(XnameError::Invalid("bogus".to_string())));
}

#[test]
fn test_parent_type_matches_parent() {
    for xname in ["x3000c0s17b0n0", "x3000m0p0j1", "x1000c7r2b0", "x3000c0w22j37", "d0w1"] {
        let parent_xname = parent(xname).expect("has parent");
        assert_eq!(Some(get_type(&parent_xname)), get_type(xname).parent_type());
    }
}

#[test]
fn test_ordinals() {
    assert_eq!(ordinals("x3000c0s17b0n0").expect("node"), vec![3000, 0, 17, 0, 0]);
    assert_eq!(ordinals("s0").expect("system"), Vec::<u32>::new());
    assert!(matches!(
        ordinals("x99999999999c0"),
        Err(XnameError::OrdinalOutOfRange { .. })
    ));
}

#[test]
fn test_ordinals_of_type() {
    let err = ordinals_of_type("x3000c0w22", XnameType::MgmtHLSwitch).expect_err("wrong type");
    assert_eq!(
        err.to_string(),
        "xname x3000c0w22 is a MgmtSwitch, expected a MgmtHLSwitch"
    );
}

#[test]
fn test_sort_cabinet_xnames() {
    let mut xnames = vec!["x9000", "x111", "x0", "x3000", "x100", "x5001", "x10", "x110"];
    sort_xnames(&mut xnames);
    assert_eq!(
        xnames,
        vec!["x0", "x10", "x100", "x110", "x111", "x3000", "x5001", "x9000"]
    );
}

#[test]
fn test_compare_descends_into_children() {
    assert_eq!(compare("x3000c0s2b0n0", "x3000c0s10b0n0"), Ordering::Less);
    assert_eq!(compare("x3000c0s2", "x3000c0s2b0"), Ordering::Less);
    assert_eq!(compare("x3000", "x3000"), Ordering::Equal);
}

#[test]
fn test_type_from_str() {
    assert_eq!("node".parse::<XnameType>(), Ok(XnameType::Node));
    assert_eq!("MgmtHLSwitch".parse::<XnameType>(), Ok(XnameType::MgmtHLSwitch));
    assert!("Toaster".parse::<XnameType>().is_err());
}
