use crate::{
    config::{CapturedVariable, CollectMode, ConfigError, RegisterPair, SortedCollectConfig},
    value::TextMode,
};

const FULL_CONFIG: &str = r#"
input_registers = 4
output_registers = 5
registers_to_keep = [0]
text_mode = "ci"

[[group_registers]]
output = 1
input = 1

[[aggregates]]
kind = "SUM"
output = 2
input = 2

[[aggregates]]
kind = "max"
output = 3
input = 3

[collect]
output = 4
mode = { kind = "variables", variables = [{ name = "doc", input = 3 }] }
"#;

#[test]
fn toml_config_parses_every_section() {
    let config = SortedCollectConfig::from_toml_str(FULL_CONFIG).expect("config should parse");

    assert_eq!(config.input_registers(), 4);
    assert_eq!(config.output_registers(), 5);
    assert_eq!(config.registers_to_keep(), &[0]);
    assert_eq!(
        config.group_registers(),
        &[RegisterPair {
            output: 1,
            input: 1
        }]
    );
    assert_eq!(config.aggregate_types().collect::<Vec<_>>(), vec!["SUM", "max"]);
    assert_eq!(
        config.collect().map(|target| &target.mode),
        Some(&CollectMode::Variables {
            variables: vec![CapturedVariable {
                name: "doc".to_string(),
                input: 3,
            }],
        })
    );
    assert_eq!(config.context().text_mode(), TextMode::Ci);
    assert!(!config.context().debug());
    assert!(!config.is_count());
}

#[test]
fn toml_count_mode_parses_unit_variant() {
    let config = SortedCollectConfig::from_toml_str(
        r#"
        input_registers = 1
        output_registers = 2
        group_registers = [{ output = 0, input = 0 }]
        collect = { output = 1, mode = { kind = "count" } }
        "#,
    )
    .expect("count config should parse");

    assert!(config.is_count());
    assert_eq!(config.writable_registers().collect::<Vec<_>>(), vec![0, 1]);
}

#[test]
fn toml_unknown_field_is_parse_error() {
    let err = SortedCollectConfig::from_toml_str(
        r"
        input_registers = 1
        output_registers = 1
        surprise = true
        ",
    )
    .expect_err("unknown fields must be rejected");

    assert!(matches!(err, ConfigError::Parse(_)), "{err:?}");
}

#[test]
fn validate_rejects_output_register_out_of_range() {
    let err = SortedCollectConfig::new(2, 2)
        .with_group(2, 0)
        .validate()
        .expect_err("output register must be in range");

    assert_eq!(
        err,
        ConfigError::RegisterOutOfRange {
            role: "output",
            register: 2,
            limit: 2,
        }
    );
}

#[test]
fn validate_rejects_input_register_out_of_range() {
    let err = SortedCollectConfig::new(1, 3)
        .with_group(0, 0)
        .with_collect(1, CollectMode::Expression { input: 4 })
        .validate()
        .expect_err("expression register must be in range");

    assert_eq!(
        err,
        ConfigError::RegisterOutOfRange {
            role: "expression",
            register: 4,
            limit: 1,
        }
    );
}

#[test]
fn validate_rejects_duplicate_output_register() {
    let err = SortedCollectConfig::new(2, 2)
        .with_group(0, 0)
        .with_aggregate("SUM", 0, 1)
        .validate()
        .expect_err("duplicate outputs must be rejected");

    assert_eq!(err, ConfigError::DuplicateOutputRegister { register: 0 });
}

#[test]
fn validate_rejects_kept_register_that_is_written() {
    let err = SortedCollectConfig::new(2, 2)
        .with_group(0, 0)
        .with_registers_to_keep([0])
        .validate()
        .expect_err("kept registers must not be written");

    assert_eq!(err, ConfigError::KeptRegisterOverwritten { register: 0 });
}

#[test]
fn validate_rejects_config_without_outputs() {
    let err = SortedCollectConfig::new(1, 1)
        .validate()
        .expect_err("a config must write at least one register");

    assert_eq!(err, ConfigError::NoOutputRegisters);
}

#[test]
fn validate_rejects_blank_aggregate_kind_and_duplicate_variables() {
    let blank = SortedCollectConfig::new(1, 2)
        .with_group(0, 0)
        .with_aggregate("  ", 1, 0)
        .validate()
        .expect_err("blank kinds must be rejected");
    assert_eq!(blank, ConfigError::EmptyAggregateKind { index: 0 });

    let variables = vec![
        CapturedVariable {
            name: "a".to_string(),
            input: 0,
        },
        CapturedVariable {
            name: "a".to_string(),
            input: 0,
        },
    ];
    let duplicate = SortedCollectConfig::new(1, 2)
        .with_group(0, 0)
        .with_collect(1, CollectMode::Variables { variables })
        .validate()
        .expect_err("duplicate variables must be rejected");
    assert_eq!(
        duplicate,
        ConfigError::DuplicateVariable {
            name: "a".to_string()
        }
    );
}

#[test]
fn writable_registers_follow_group_aggregate_collect_order() {
    let config = SortedCollectConfig::new(3, 6)
        .with_group(4, 0)
        .with_group(1, 1)
        .with_aggregate("SUM", 5, 2)
        .with_count(0);

    config.validate().expect("config should validate");
    assert_eq!(
        config.writable_registers().collect::<Vec<_>>(),
        vec![4, 1, 5, 0]
    );
}
