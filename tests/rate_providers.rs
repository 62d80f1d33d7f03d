#![cfg(feature = "async")]

use birr_fx::pricing::JsonFileRateProvider;
use birr_fx::prelude::*;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_config_from_static_provider() {
    let provider = StaticRateProvider::sample();
    let config = FxConfig::from_provider(&provider).await.unwrap();
    assert_eq!(config.rates, RateTable::sample());
    assert_eq!(config.get_default_to(), "USD");
}

#[tokio::test]
async fn test_json_file_provider() {
    let path = std::env::temp_dir().join(format!("birr-fx-{}-rates.json", std::process::id()));
    std::fs::write(
        &path,
        r#"[{"code": "ETB", "rate": 1}, {"code": "JPY", "display_name": "Yen", "rate": 0.37}]"#,
    )
    .unwrap();

    let table = JsonFileRateProvider::new(&path).get_rates().await.unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(table.rate_of("JPY").unwrap(), dec!(0.37));
    let converter = CurrencyConverter::new(table);
    assert_eq!(converter.convert(100, "JPY", "ETB").unwrap().result, dec!(37));
}

#[tokio::test]
async fn test_json_file_provider_rejects_invalid_table() {
    let path = std::env::temp_dir().join(format!("birr-fx-{}-bad-rates.json", std::process::id()));
    std::fs::write(&path, r#"[{"code": "ETB", "rate": 1}, {"code": "ETB", "rate": 2}]"#).unwrap();

    let res = JsonFileRateProvider::new(&path).get_rates().await;
    std::fs::remove_file(&path).ok();

    assert!(matches!(res, Err(FxError::Configuration(msg)) if msg.contains("more than once")));
}
