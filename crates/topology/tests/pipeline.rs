//! End-to-end generation from site inputs to SLS state

use ipam::{build_networks, csm_layouts, LayoutOptions, Ncn, NetworkInputs};
use sls::{
    assign_switch_aliases, ApplicationNodeConfig, CabinetDetailFile, HardwareType, HmnRow, ManagementSwitch,
    ManagementSwitchBrand, ManagementSwitchType,
};
use topology::{cabinet_hardware, SlsState, TopologyEngine, TopologyInputs, TopologyOptions};

const CABINETS: &str = r"
cabinets:
  - type: river
    total_number: 1
    starting_id: 3000
  - type: hill
    total_number: 1
    starting_id: 9000
  - type: mountain
    total_number: 1
    starting_id: 1000
";

const HMN: &str = r#"[
  {"Source": "mn01", "SourceRack": "x3000", "SourceLocation": "u01", "DestinationRack": "x3000", "DestinationLocation": "u14", "DestinationPort": "j1"},
  {"Source": "wn01", "SourceRack": "x3000", "SourceLocation": "u03", "DestinationRack": "x3000", "DestinationLocation": "u14", "DestinationPort": "j2"},
  {"Source": "sn01", "SourceRack": "x3000", "SourceLocation": "u05", "DestinationRack": "x3000", "DestinationLocation": "u14", "DestinationPort": "j3"},
  {"Source": "uan01", "SourceRack": "x3000", "SourceLocation": "u26", "DestinationRack": "x3000", "DestinationLocation": "u14", "DestinationPort": "j4"},
  {"Source": "x3000door-Motiv", "SourceRack": "x3000"},
  {"Source": "sw-smn01", "SourceRack": "x3000", "SourceLocation": "u14"},
  {"Source": "x3000p0", "SourceRack": "x3000", "SourceLocation": "p0"}
]"#;

fn switches() -> Vec<ManagementSwitch> {
    let mut switches = vec![
        ManagementSwitch::new("x3000c0w14", ManagementSwitchType::LeafBMC, ManagementSwitchBrand::Dell, "S3048-ON"),
        ManagementSwitch::new("x3000c0h33s1", ManagementSwitchType::Spine, ManagementSwitchBrand::Aruba, "8325"),
    ];
    assign_switch_aliases(&mut switches);
    switches
}

#[test]
fn test_generate_sls_state() {
    let mut cabinets = CabinetDetailFile::from_yaml(CABINETS).expect("cabinet yaml");
    cabinets.populate_ids();
    cabinets.validate().expect("no duplicate cabinets");
    let rows: Vec<HmnRow> = serde_json::from_str(HMN).expect("hmn json");
    let switches = switches();
    let config = ApplicationNodeConfig::default();

    let mut engine = TopologyEngine::new(
        TopologyInputs {
            cabinets: &cabinets.cabinets,
            switches: &switches,
            application_nodes: &config,
        },
        TopologyOptions::default(),
    );
    let hardware = engine.build_inventory(&rows).expect("hardware");
    let ncns = Ncn::from_inventory(&hardware);
    assert_eq!(
        ncns.iter().map(|n| n.alias.as_str()).collect::<Vec<_>>(),
        vec!["ncn-m001", "ncn-s001", "ncn-w001"]
    );

    let layouts = csm_layouts(LayoutOptions::default()).expect("layouts");
    let networks = build_networks(
        &layouts,
        NetworkInputs {
            cabinets: &cabinets.cabinets,
            switches: &switches,
            ncns: &ncns,
        },
    )
    .expect("networks");

    let mut state = SlsState::new(hardware, networks);
    state
        .add_hardware(cabinet_hardware(&cabinets.cabinets, &state.networks).expect("cabinet records"))
        .expect("cabinets are new xnames");

    assert_eq!(state.cabinet_xnames(), vec!["x1000", "x3000", "x9000"]);
    assert_eq!(state.hardware.of_type(HardwareType::MgmtSwitchConnector).count(), 4);
    assert!(state.hardware.contains("x3000m0"));
    assert!(state.hardware.contains("x3000c0s26b0n0"));
    assert!(state.hardware.contains("x1000c7s7b1n1"));

    let bootstrap = state.networks["NMN"]
        .lookup_subnet("bootstrap_dhcp")
        .expect("bootstrap subnet");
    assert_eq!(
        bootstrap
            .lookup_reservation("ncn-m001")
            .expect("ncn reserved")
            .ip_address
            .to_string(),
        "10.252.0.4"
    );
    let hardware_subnet = state.networks["HMN"]
        .lookup_subnet("network_hardware")
        .expect("switch subnet");
    assert_eq!(hardware_subnet.ip_reservations[0].name, "sw-spine-001");

    let json = serde_json::to_value(&state).expect("serializable");
    assert_eq!(json["Hardware"]["x3000c0s1b0n0"]["ExtraProperties"]["NID"], 100_001);
    assert_eq!(json["Networks"]["HMN_MTN"]["Subnets"][0]["Name"], "cabinet_1000");
}
