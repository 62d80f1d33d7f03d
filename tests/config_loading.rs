use birr_fx::prelude::*;
use rust_decimal_macros::dec;
use std::path::PathBuf;

fn temp_file(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("birr-fx-{}-{}", std::process::id(), name));
    std::fs::write(&path, content).expect("write temp config");
    path
}

#[test]
fn test_parse_full_config() {
    let json = r#"{
        "rates": [
            {"code": "KES", "display_name": "Shilling", "rate": 1},
            {"code": "USD", "display_name": "Dollar", "rate": 129.5}
        ],
        "display_precision": 3,
        "default_from": "USD",
        "default_to": "KES"
    }"#;
    let config: FxConfig = json.parse().unwrap();
    assert_eq!(config.rates.base_code().as_str(), "KES");
    assert_eq!(config.display_precision, 3);
    assert_eq!(config.get_default_from(), "USD");

    let converter = CurrencyConverter::from_config(&config);
    let conversion = converter.convert(2, "USD", "KES").unwrap();
    assert_eq!(conversion.result, dec!(259));
}

#[test]
fn test_empty_object_uses_sample_rates() {
    let config: FxConfig = "{}".parse().unwrap();
    assert_eq!(config.rates, RateTable::sample());
    assert_eq!(config.display_precision, 2);
    assert_eq!(config.get_default_from(), "ETB");
    assert_eq!(config.get_default_to(), "USD");
}

#[test]
fn test_unknown_default_code_is_rejected() {
    let res = r#"{"default_to": "JPY"}"#.parse::<FxConfig>();
    assert!(matches!(res, Err(FxError::UnknownCurrency { code }) if code == "JPY"));
}

#[test]
fn test_malformed_json_is_configuration_error() {
    let res = "{ not json".parse::<FxConfig>();
    assert!(matches!(res, Err(FxError::Configuration(_))));
}

#[test]
fn test_try_from_json_file() {
    let path = temp_file("config.json", r#"{"default_from": "EUR", "default_to": "GBP"}"#);
    let config = FxConfig::try_from_json(&path).unwrap();
    assert_eq!(config.get_default_from(), "EUR");
    std::fs::remove_file(path).ok();

    let missing = FxConfig::try_from_json("/no/such/birr-fx/config.json");
    assert!(matches!(missing, Err(FxError::Configuration(msg)) if msg.contains("Failed to read")));
}

#[test]
fn test_from_env_var() {
    let unset = FxConfig::from_env_var("BIRR_FX_TEST_VAR_THAT_IS_NEVER_SET");
    assert!(matches!(unset, Err(FxError::Configuration(msg)) if msg.contains("not set")));

    let path = temp_file("env.json", r#"{"display_precision": 4}"#);
    let var = "BIRR_FX_TEST_CONFIG_PATH";
    // SAFETY: the variable name is unique to this test.
    unsafe { std::env::set_var(var, &path) };
    let config = FxConfig::from_env_var(var).unwrap();
    assert_eq!(config.display_precision, 4);
    std::fs::remove_file(path).ok();
}

#[test]
fn test_builder_and_fluent_helpers() {
    let table = RateTable::builder()
        .rate("ETB", "Birr", 1)
        .rate_with_symbol("USD", "Dollar", "55.5", "$")
        .build()
        .unwrap();

    let config = FxConfig::builder()
        .rates(table.clone())
        .display_precision(4)
        .default_from("USD")
        .build()
        .unwrap();
    assert_eq!(config.get_default_to(), "USD");

    let config = FxConfig::new(table)
        .with_defaults("USD", "ETB")
        .unwrap()
        .with_display_precision(0)
        .unwrap();
    assert_eq!(config.default_to.as_deref(), Some("ETB"));
    assert!(FxConfig::default().with_display_precision(99).is_err());
}
