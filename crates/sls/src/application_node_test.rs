//! Unit tests for the application node config

use super::*;

fn parse(yaml: &str) -> ApplicationNodeConfig {
    ApplicationNodeConfig::from_yaml(yaml).expect("valid application node yaml")
}

#[test]
fn test_defaults_resolve_subroles() {
    let config = ApplicationNodeConfig::default();
    assert_eq!(config.resolve_subrole("uan01"), Some("UAN"));
    assert_eq!(config.resolve_subrole("Login02"), Some("UAN"));
    assert_eq!(config.resolve_subrole("lnet01"), Some("LNETRouter"), "lnet must win over ln");
    assert_eq!(config.resolve_subrole("ln03"), Some("UAN"));
    assert_eq!(config.resolve_subrole("gn01"), Some("Gateway"));
    assert_eq!(config.resolve_subrole("vn01"), Some("Visualization"));
    assert_eq!(config.resolve_subrole("pdu0"), None);
}

#[test]
fn test_site_prefixes_take_precedence() {
    let config = parse(
        r#"
prefixes: [lnetx, gateway]
prefix_hsm_subroles:
  lnetx: Custom
  gateway: Gateway
"#,
    );
    config.validate().expect("valid config");
    assert_eq!(config.match_prefix("lnetx01"), Some("lnetx"));
    assert_eq!(config.resolve_subrole("lnetx01"), Some("Custom"));
    assert_eq!(config.resolve_subrole("lnet01"), Some("LNETRouter"));
    assert_eq!(config.resolve_subrole("gateway01"), Some("Gateway"));
}

#[test]
fn test_normalize() {
    let mut config = parse(
        r#"
prefixes: [GW, Special]
prefix_hsm_subroles:
  GW: Gateway
  Special: UAN
aliases:
  X3000C0S026B0N0: [uan01]
"#,
    );
    config.normalize().expect("no collisions");
    assert_eq!(config.prefixes, vec!["gw", "special"]);
    assert_eq!(config.prefix_hsm_subroles.get("gw").map(String::as_str), Some("Gateway"));
    assert_eq!(config.aliases_for("x3000c0s26b0n0"), ["uan01".to_string()]);
    assert!(config.aliases_for("x3000c0s27b0n0").is_empty());
}

#[test]
fn test_normalize_collision_leaves_config_untouched() {
    let mut config = parse(
        r#"
prefixes: [gw]
prefix_hsm_subroles:
  gw: Gateway
aliases:
  x3000c0s26b0n0: [uan01]
  x3000c0s026b0n0: [uan02]
"#,
    );
    let before = config.clone();
    let err = config.normalize().expect_err("alias keys collide");
    assert!(matches!(err, SlsError::NormalizationCollision { field: "aliases", .. }));
    assert_eq!(config, before, "failed normalize must not partially apply");
}

#[test]
fn test_normalize_rejects_duplicate_prefix() {
    let mut config = parse("prefixes: [GN, gn]\n");
    assert!(matches!(config.normalize(), Err(SlsError::DuplicatePrefix(p)) if p == "gn"));
}

#[test]
fn test_validate_rejects_non_node_alias_key() {
    let config = parse("aliases:\n  x3000c0s26b0: [uan01]\n");
    let err = config.validate().expect_err("NodeBMC key");
    assert_eq!(
        err.to_string(),
        "Alias xname x3000c0s26b0 is a NodeBMC, only Node xnames may have aliases"
    );

    let config = ApplicationNodeConfig {
        aliases: BTreeMap::from([("uan01".to_string(), vec!["uan01".to_string()])]),
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(SlsError::InvalidAliasXname { xname }) if xname == "uan01"
    ));
}

#[test]
fn test_validate_rejects_shared_alias() {
    let config = parse(
        r#"
aliases:
  x3000c0s26b0n0: [uan01]
  x3000c0s27b0n0: [uan01]
"#,
    );
    let err = config.validate().expect_err("alias used twice");
    let SlsError::DuplicateAlias { alias, first, second } = err else {
        panic!("expected DuplicateAlias");
    };
    assert_eq!(alias, "uan01");
    let mut pair = [first, second];
    pair.sort();
    assert_eq!(pair, ["x3000c0s26b0n0".to_string(), "x3000c0s27b0n0".to_string()]);
}

#[test]
fn test_validate_rejects_placeholder_subroles() {
    let config = parse(
        r#"
prefixes: [zz, aa]
prefix_hsm_subroles:
  zz: "~~FIXME~~"
  aa: "~~FIXME~~"
"#,
    );
    let err = config.validate().expect_err("placeholders left");
    assert_eq!(
        err.to_string(),
        "Application node prefixes with unresolved subrole placeholder: aa, zz"
    );
}

#[test]
fn test_validate_rejects_missing_subrole() {
    let config = parse("prefixes: [special]\n");
    assert!(matches!(config.validate(), Err(SlsError::MissingSubrole(p)) if p == "special"));

    let config = parse("prefixes: [uan]\n");
    config.validate().expect("built-in prefix carries its own subrole");
}
