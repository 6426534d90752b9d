use kwb_wiki::models::DataProperty;
use kwb_wiki::{Config, Error, derive_base, resolve_keys};

fn properties() -> Vec<DataProperty> {
    serde_json::from_str(
        r#"
    [
      {"odata.type":"Cbs.OData.Dimension","Key":"WijkenEnBuurten","Title":"Wijken en buurten"},
      {"odata.type":"Cbs.OData.Topic","Key":"Codering_3","Title":"Codering","Decimals":0},
      {"odata.type":"Cbs.OData.TopicGroup","Key":"Bevolking","Title":"Bevolking"},
      {"odata.type":"Cbs.OData.Topic","Key":"AantalInwoners_5","Title":"Aantal inwoners","Unit":"aantal","Decimals":0,"Description":"Het aantal inwoners op 1 januari."},
      {"odata.type":"Cbs.OData.Topic","Key":"Mannen_6","Title":"Mannen","Unit":"aantal","Decimals":0},
      {"odata.type":"Cbs.OData.Topic","Key":"Bevolkingsdichtheid","Title":"Bevolkingsdichtheid","Unit":"aantal inwoners per km²","Decimals":0,"Position":7},
      {"odata.type":"Cbs.OData.Topic","Key":"AantalInwoners_44","Title":"Aantal inwoners (oud)","Unit":"aantal","Decimals":0}
    ]"#,
    )
    .unwrap()
}

fn config(stats: &[&str]) -> Config {
    Config {
        required_stats: stats.iter().map(|s| s.to_string()).collect(),
        ..Config::default()
    }
}

#[test]
fn derive_base_examples() {
    assert_eq!(derive_base("AantalInwoners_5"), "AantalInwoners");
    assert_eq!(derive_base("Bevolkingsdichtheid"), "Bevolkingsdichtheid");
}

#[test]
fn resolves_suffixed_and_plain_keys() {
    let resolved = resolve_keys(
        &properties(),
        &config(&["AantalInwoners", "Mannen", "Bevolkingsdichtheid"]),
    )
    .unwrap();

    assert_eq!(resolved.key_map.len(), 3);
    assert_eq!(resolved.key_map["AantalInwoners"], "AantalInwoners_5");
    assert_eq!(resolved.key_map["Mannen"], "Mannen_6");
    assert_eq!(resolved.key_map["Bevolkingsdichtheid"], "Bevolkingsdichtheid");
    // insertion order follows the metadata, not the configuration
    let order: Vec<&str> = resolved.key_map.keys().map(String::as_str).collect();
    assert_eq!(order, vec!["AantalInwoners", "Mannen", "Bevolkingsdichtheid"]);
}

#[test]
fn duplicate_base_name_keeps_first_and_reports_conflict() {
    let resolved = resolve_keys(&properties(), &config(&["AantalInwoners"])).unwrap();
    assert_eq!(resolved.key_map["AantalInwoners"], "AantalInwoners_5");
    assert_eq!(resolved.conflicts.len(), 1);
    assert_eq!(resolved.conflicts[0].ignored, "AantalInwoners_44");
}

#[test]
fn metadata_covers_topics_only() {
    let resolved = resolve_keys(&properties(), &config(&["Mannen"])).unwrap();
    assert!(resolved.metadata.contains_key("Codering_3"));
    assert!(resolved.metadata.contains_key("AantalInwoners_44"));
    assert!(!resolved.metadata.contains_key("WijkenEnBuurten"));
    assert!(!resolved.metadata.contains_key("Bevolking"));

    let inwoners = &resolved.metadata["AantalInwoners_5"];
    assert_eq!(inwoners.unit.as_deref(), Some("aantal"));
    assert_eq!(inwoners.decimals, Some(0));
    assert_eq!(
        inwoners.description.as_deref(),
        Some("Het aantal inwoners op 1 januari.")
    );
}

#[test]
fn unresolved_names_are_listed_in_config_order() {
    let err = resolve_keys(
        &properties(),
        &config(&["Woningvoorraad", "Mannen", "Vrouwen"]),
    )
    .unwrap_err();
    match err {
        Error::UnresolvedStatistics(missing) => {
            assert_eq!(missing, vec!["Woningvoorraad".to_string(), "Vrouwen".to_string()])
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn required_full_keys_are_the_map_values() {
    let resolved = resolve_keys(&properties(), &config(&["AantalInwoners", "Mannen"])).unwrap();
    let keys: Vec<String> = resolved.required_full_keys().into_iter().collect();
    assert_eq!(keys, vec!["AantalInwoners_5".to_string(), "Mannen_6".to_string()]);
}
