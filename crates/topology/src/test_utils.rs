//! Fixtures shared by the topology unit tests

use sls::{
    ApplicationNodeConfig, CabinetDetail, CabinetGroupDetail, ChassisCount, HmnRow, ManagementSwitch,
    ManagementSwitchBrand, ManagementSwitchType,
};

/// HMN row without a parent or uplink.
pub fn row(source: &str, rack: &str, location: &str, sub_location: &str) -> HmnRow {
    HmnRow {
        source: source.to_string(),
        source_rack: rack.to_string(),
        source_location: location.to_string(),
        source_sub_location: sub_location.to_string(),
        ..Default::default()
    }
}

/// HMN row cabled to port `port` of the leaf-bmc switch at `u14` in `x3000`.
pub fn cabled_row(source: &str, location: &str, port: &str) -> HmnRow {
    HmnRow {
        destination_rack: "x3000".to_string(),
        destination_location: "u14".to_string(),
        destination_port: port.to_string(),
        ..row(source, "x3000", location, "")
    }
}

/// Row of a node in a dense enclosure whose controller row is `parent`.
pub fn child_row(source: &str, parent: &str) -> HmnRow {
    HmnRow {
        source_parent: parent.to_string(),
        ..row(source, "x3000", "", "")
    }
}

/// Built-in prefixes plus site `gateway` and `visualization` prefixes.
pub fn app_config() -> ApplicationNodeConfig {
    let mut config = ApplicationNodeConfig {
        prefixes: vec!["gateway".to_string(), "visualization".to_string()],
        ..Default::default()
    };
    config
        .prefix_hsm_subroles
        .insert("gateway".to_string(), "Gateway".to_string());
    config
        .prefix_hsm_subroles
        .insert("visualization".to_string(), "Visualization".to_string());
    config
        .aliases
        .insert("x3000c0s26b0n0".to_string(), vec!["uan01".to_string()]);
    config
}

pub fn leaf_bmc(xname: &str, brand: ManagementSwitchBrand) -> ManagementSwitch {
    ManagementSwitch::new(xname, ManagementSwitchType::LeafBMC, brand, "S3048-ON")
}

pub fn spine(xname: &str) -> ManagementSwitch {
    ManagementSwitch::new(xname, ManagementSwitchType::Spine, ManagementSwitchBrand::Aruba, "8325")
}

/// Cabinet group with consecutive ids.
pub fn group(kind: &str, count: usize, start: u32) -> CabinetGroupDetail {
    let mut group = CabinetGroupDetail::new(kind, count, start);
    group.populate_ids();
    group
}

/// Cabinet group with explicit per-cabinet details.
pub fn group_with_details(kind: &str, details: Vec<CabinetDetail>) -> CabinetGroupDetail {
    let mut group = CabinetGroupDetail::new(kind, 0, 0);
    group.cabinet_details = details;
    group.populate_ids();
    group
}

pub fn liquid_cooled(id: u32, model: &str, liquid: u32, air: u32) -> CabinetDetail {
    CabinetDetail {
        model: Some(model.to_string()),
        chassis_count: Some(ChassisCount {
            liquid_cooled: liquid,
            air_cooled: air,
        }),
        ..CabinetDetail::new(id)
    }
}
