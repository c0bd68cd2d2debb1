//! Typed xname components
//!
//! One struct per commonly constructed xname type. Each struct formats to its
//! xname (`Cabinet { cabinet: 3000 }` → `x3000`), parses back from it, knows
//! its parent, and offers constructors for its children.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::XnameError;
use crate::types::{ordinals_of_type, XnameType, SYSTEM_XNAME};

/// The system root, `s0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct System;

impl System {
    pub const TYPE: XnameType = XnameType::System;

    #[must_use]
    pub fn cabinet(self, cabinet: u32) -> Cabinet {
        Cabinet { cabinet }
    }

    #[must_use]
    pub fn cdu(self, cdu: u32) -> CDU {
        CDU { cdu }
    }
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(SYSTEM_XNAME)
    }
}

impl FromStr for System {
    type Err = XnameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ordinals_of_type(s, XnameType::System).map(|_| System)
    }
}

macro_rules! xname_component {
    (
        $(#[$meta:meta])*
        $name:ident: $kind:ident,
        parent: $parent:ident { $($pfield:ident),* },
        fields: { $($field:ident = $letter:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name {
            $(
                #[doc = concat!("Ordinal following `", $letter, "`")]
                pub $field: u32,
            )+
        }

        impl $name {
            /// Xname type of this component.
            pub const TYPE: XnameType = XnameType::$kind;

            /// Structural parent of this component.
            #[must_use]
            pub fn parent(&self) -> $parent {
                $parent { $($pfield: self.$pfield),* }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                $( write!(f, concat!($letter, "{}"), self.$field)?; )+
                Ok(())
            }
        }

        impl FromStr for $name {
            type Err = XnameError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let mut ordinals = ordinals_of_type(s, XnameType::$kind)?.into_iter();
                $(
                    let $field = ordinals
                        .next()
                        .ok_or_else(|| XnameError::Invalid(s.to_string()))?;
                )+
                Ok(Self { $($field),+ })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

xname_component! {
    /// Cabinet, `xX`.
    Cabinet: Cabinet,
    parent: System {},
    fields: { cabinet = "x" }
}

xname_component! {
    /// Cabinet PDU controller, `xXmM`.
    CabinetPDUController: CabinetPDUController,
    parent: Cabinet { cabinet },
    fields: { cabinet = "x", cabinet_pdu_controller = "m" }
}

xname_component! {
    /// Chassis, `xXcC`.
    Chassis: Chassis,
    parent: Cabinet { cabinet },
    fields: { cabinet = "x", chassis = "c" }
}

xname_component! {
    /// Chassis management module BMC, `xXcCbB`.
    ChassisBMC: ChassisBMC,
    parent: Chassis { cabinet, chassis },
    fields: { cabinet = "x", chassis = "c", chassis_bmc = "b" }
}

xname_component! {
    /// Compute blade or river rack slot, `xXcCsS`.
    ComputeModule: ComputeModule,
    parent: Chassis { cabinet, chassis },
    fields: { cabinet = "x", chassis = "c", compute_module = "s" }
}

xname_component! {
    /// Node controller, `xXcCsSbB`.
    NodeBMC: NodeBMC,
    parent: ComputeModule { cabinet, chassis, compute_module },
    fields: { cabinet = "x", chassis = "c", compute_module = "s", node_bmc = "b" }
}

xname_component! {
    /// Node, `xXcCsSbBnN`.
    Node: Node,
    parent: NodeBMC { cabinet, chassis, compute_module, node_bmc },
    fields: { cabinet = "x", chassis = "c", compute_module = "s", node_bmc = "b", node = "n" }
}

xname_component! {
    /// HSN router module, `xXcCrR`.
    RouterModule: RouterModule,
    parent: Chassis { cabinet, chassis },
    fields: { cabinet = "x", chassis = "c", router_module = "r" }
}

xname_component! {
    /// HSN router controller, `xXcCrRbB`.
    RouterBMC: RouterBMC,
    parent: RouterModule { cabinet, chassis, router_module },
    fields: { cabinet = "x", chassis = "c", router_module = "r", router_bmc = "b" }
}

xname_component! {
    /// Management (leaf-bmc) switch, `xXcCwW`.
    MgmtSwitch: MgmtSwitch,
    parent: Chassis { cabinet, chassis },
    fields: { cabinet = "x", chassis = "c", slot = "w" }
}

xname_component! {
    /// Management switch port, `xXcCwWjJ`.
    MgmtSwitchConnector: MgmtSwitchConnector,
    parent: MgmtSwitch { cabinet, chassis, slot },
    fields: { cabinet = "x", chassis = "c", slot = "w", switch_port = "j" }
}

xname_component! {
    /// High-level switch enclosure, `xXcChH`.
    MgmtHLSwitchEnclosure: MgmtHLSwitchEnclosure,
    parent: Chassis { cabinet, chassis },
    fields: { cabinet = "x", chassis = "c", slot = "h" }
}

xname_component! {
    /// High-level (spine, leaf, aggregation) switch, `xXcChHsS`.
    MgmtHLSwitch: MgmtHLSwitch,
    parent: MgmtHLSwitchEnclosure { cabinet, chassis, slot },
    fields: { cabinet = "x", chassis = "c", slot = "h", space = "s" }
}

xname_component! {
    /// Coolant distribution unit, `dD`.
    CDU: CDU,
    parent: System {},
    fields: { cdu = "d" }
}

xname_component! {
    /// CDU management switch, `dDwW`.
    CDUMgmtSwitch: CDUMgmtSwitch,
    parent: CDU { cdu },
    fields: { cdu = "d", slot = "w" }
}

impl Cabinet {
    #[must_use]
    pub fn chassis(&self, chassis: u32) -> Chassis {
        Chassis { cabinet: self.cabinet, chassis }
    }

    #[must_use]
    pub fn pdu_controller(&self, cabinet_pdu_controller: u32) -> CabinetPDUController {
        CabinetPDUController {
            cabinet: self.cabinet,
            cabinet_pdu_controller,
        }
    }
}

impl Chassis {
    #[must_use]
    pub fn chassis_bmc(&self, chassis_bmc: u32) -> ChassisBMC {
        ChassisBMC {
            cabinet: self.cabinet,
            chassis: self.chassis,
            chassis_bmc,
        }
    }

    #[must_use]
    pub fn compute_module(&self, compute_module: u32) -> ComputeModule {
        ComputeModule {
            cabinet: self.cabinet,
            chassis: self.chassis,
            compute_module,
        }
    }

    #[must_use]
    pub fn router_module(&self, router_module: u32) -> RouterModule {
        RouterModule {
            cabinet: self.cabinet,
            chassis: self.chassis,
            router_module,
        }
    }

    #[must_use]
    pub fn mgmt_switch(&self, slot: u32) -> MgmtSwitch {
        MgmtSwitch {
            cabinet: self.cabinet,
            chassis: self.chassis,
            slot,
        }
    }

    #[must_use]
    pub fn mgmt_hl_switch_enclosure(&self, slot: u32) -> MgmtHLSwitchEnclosure {
        MgmtHLSwitchEnclosure {
            cabinet: self.cabinet,
            chassis: self.chassis,
            slot,
        }
    }
}

impl ComputeModule {
    #[must_use]
    pub fn node_bmc(&self, node_bmc: u32) -> NodeBMC {
        NodeBMC {
            cabinet: self.cabinet,
            chassis: self.chassis,
            compute_module: self.compute_module,
            node_bmc,
        }
    }
}

impl NodeBMC {
    #[must_use]
    pub fn node(&self, node: u32) -> Node {
        Node {
            cabinet: self.cabinet,
            chassis: self.chassis,
            compute_module: self.compute_module,
            node_bmc: self.node_bmc,
            node,
        }
    }
}

impl RouterModule {
    #[must_use]
    pub fn router_bmc(&self, router_bmc: u32) -> RouterBMC {
        RouterBMC {
            cabinet: self.cabinet,
            chassis: self.chassis,
            router_module: self.router_module,
            router_bmc,
        }
    }
}

impl MgmtSwitch {
    #[must_use]
    pub fn connector(&self, switch_port: u32) -> MgmtSwitchConnector {
        MgmtSwitchConnector {
            cabinet: self.cabinet,
            chassis: self.chassis,
            slot: self.slot,
            switch_port,
        }
    }
}

impl MgmtHLSwitchEnclosure {
    #[must_use]
    pub fn switch(&self, space: u32) -> MgmtHLSwitch {
        MgmtHLSwitch {
            cabinet: self.cabinet,
            chassis: self.chassis,
            slot: self.slot,
            space,
        }
    }
}

impl CDU {
    #[must_use]
    pub fn mgmt_switch(&self, slot: u32) -> CDUMgmtSwitch {
        CDUMgmtSwitch { cdu: self.cdu, slot }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_round_trip() {
        let node = Node {
            cabinet: 3000,
            chassis: 0,
            compute_module: 17,
            node_bmc: 0,
            node: 0,
        };
        assert_eq!(node.to_string(), "x3000c0s17b0n0");

        let parsed: Node = "x3000c0s17b0n0".parse().expect("valid node xname");
        assert_eq!(parsed, node);
    }

    #[test]
    fn test_every_component_round_trips() {
        let cabinet = System.cabinet(3000);
        let chassis = cabinet.chassis(1);
        let cases: Vec<(String, XnameType)> = vec![
            (cabinet.to_string(), Cabinet::TYPE),
            (cabinet.pdu_controller(2).to_string(), CabinetPDUController::TYPE),
            (chassis.to_string(), Chassis::TYPE),
            (chassis.chassis_bmc(0).to_string(), ChassisBMC::TYPE),
            (chassis.compute_module(7).to_string(), ComputeModule::TYPE),
            (chassis.compute_module(7).node_bmc(1).to_string(), NodeBMC::TYPE),
            (chassis.router_module(33).router_bmc(0).to_string(), RouterBMC::TYPE),
            (chassis.mgmt_switch(38).connector(12).to_string(), MgmtSwitchConnector::TYPE),
            (chassis.mgmt_hl_switch_enclosure(42).switch(1).to_string(), MgmtHLSwitch::TYPE),
            (System.cdu(0).mgmt_switch(1).to_string(), CDUMgmtSwitch::TYPE),
        ];
        for (xname, expected) in cases {
            assert_eq!(crate::get_type(&xname), expected, "type of {xname}");
        }

        let connector: MgmtSwitchConnector = "x3000c0w38j12".parse().expect("connector");
        assert_eq!(connector.switch_port, 12);
        assert_eq!(connector.parent().to_string(), "x3000c0w38");
    }

    #[test]
    fn test_parent_chain() {
        let node: Node = "x1000c7s3b1n0".parse().expect("valid node xname");
        assert_eq!(node.parent().to_string(), "x1000c7s3b1");
        assert_eq!(node.parent().parent().to_string(), "x1000c7s3");
        assert_eq!(node.parent().parent().parent().to_string(), "x1000c7");
        assert_eq!(node.parent().parent().parent().parent().to_string(), "x1000");
        assert_eq!(node.parent().parent().parent().parent().parent().to_string(), "s0");
    }

    #[test]
    fn test_parse_wrong_type() {
        let err = "x3000c0s17b0".parse::<Node>().expect_err("NodeBMC is not a Node");
        assert_eq!(
            err,
            XnameError::WrongType {
                xname: "x3000c0s17b0".to_string(),
                expected: XnameType::Node,
                actual: XnameType::NodeBMC,
            }
        );
        assert!(err.to_string().contains("x3000c0s17b0"));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            "x3000c0s17b0n0z".parse::<Node>(),
            Err(XnameError::Invalid(_))
        ));
    }

    #[test]
    fn test_serde_as_string() {
        let switch: MgmtHLSwitch = serde_json::from_str("\"x3000c0h33s1\"").expect("deserialize");
        assert_eq!(switch.slot, 33);
        assert_eq!(serde_json::to_string(&switch).expect("serialize"), "\"x3000c0h33s1\"");
    }
}
