use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("kwb-wiki").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("kwb-wiki"))
        .stdout(predicate::str::contains("--overwrite-stripped"));
}

#[test]
fn cli_requires_year() {
    let mut cmd = Command::cargo_bin("kwb-wiki").unwrap();
    cmd.assert().failure();
}

#[test]
fn cli_rejects_unreadable_config() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("kwb-wiki").unwrap();
    cmd.args(["2023", "--root"])
        .arg(dir.path())
        .arg("--config")
        .arg(dir.path().join("missing.json"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("missing.json"));
}

#[test]
fn cli_fails_on_unresolved_statistics_with_local_sources() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("2023").join("cbs_data");
    std::fs::create_dir_all(&data_dir).unwrap();
    std::fs::write(data_dir.join("TableInfos.json"), "[]").unwrap();
    std::fs::write(data_dir.join("TypedDataSet.json"), "[]").unwrap();
    std::fs::write(
        data_dir.join("DataProperties.json"),
        r#"[{"odata.type":"Cbs.OData.Topic","Key":"Mannen_6"}]"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("kwb-wiki").unwrap();
    cmd.args(["2023", "--root"]).arg(dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("AantalInwoners"));
}

#[test]
fn cli_generates_documents_from_local_sources() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("2023").join("cbs_data");
    std::fs::create_dir_all(&data_dir).unwrap();
    std::fs::write(data_dir.join("TableInfos.json"), "[]").unwrap();
    std::fs::write(
        data_dir.join("TypedDataSet.json"),
        r#"[{"Codering_3":"GM0014    ","SoortRegio_2":"Gemeente  ","Mannen_6":118677}]"#,
    )
    .unwrap();
    std::fs::write(
        data_dir.join("DataProperties.json"),
        r#"[{"odata.type":"Cbs.OData.Topic","Key":"Mannen_6","Title":"Mannen"}]"#,
    )
    .unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{"required_stats":["Mannen"]}"#).unwrap();

    let mut cmd = Command::cargo_bin("kwb-wiki").unwrap();
    cmd.args(["2023", "--root"])
        .arg(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("--templates")
        .arg(concat!(env!("CARGO_MANIFEST_DIR"), "/templates"));
    cmd.assert().success();

    let out = dir.path().join("2023").join("wiki_output");
    let module = std::fs::read_to_string(
        out.join("Module_CBS_Kerncijfers_Wijken_en_Buurten_Data_2023.lua"),
    )
    .unwrap();
    assert!(module.contains("[\"GM0014\"]"));
    assert!(module.contains("[\"Mannen_6\"] = 118677,"));
    assert!(data_dir.join("stripped_filtered_data_2023.json").exists());
    assert!(data_dir.join("key_map.json").exists());
}
