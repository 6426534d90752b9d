use kwb_wiki::template::{Placeholders, TemplateStore, render, token};
use kwb_wiki::Error;
use std::fs;

#[test]
fn repeated_placeholder_gets_identical_text() {
    let p = Placeholders::new().with("YEAR", 2023);
    assert_eq!(
        render("p.year = %%YEAR%% -- %%YEAR%%", &p),
        "p.year = 2023 -- 2023"
    );
}

#[test]
fn template_without_placeholders_is_unchanged() {
    let p = Placeholders::new().with("YEAR", 2023);
    let tpl = "local p = {}\nreturn p\n";
    assert_eq!(render(tpl, &p), tpl);
}

#[test]
fn unknown_placeholders_stay_verbatim() {
    let p = Placeholders::new().with("YEAR", 2023);
    assert_eq!(
        render("%%YEAR%% %%DATASET_ID%%", &p),
        "2023 %%DATASET_ID%%"
    );
}

#[test]
fn replacement_text_is_not_rescanned() {
    let p = Placeholders::new()
        .with("A", token("B"))
        .with("B", "b");
    assert_eq!(render("%%A%%|%%B%%", &p), "%%B%%|b");

    // same result regardless of which name sorts first
    let p = Placeholders::new()
        .with("B", token("A"))
        .with("A", "a");
    assert_eq!(render("%%A%%|%%B%%", &p), "a|%%A%%");
}

#[test]
fn store_applies_templates_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("t.lua"), "-- %%DATASET_ID%%\n%%DATA_ENTRIES%%\n").unwrap();
    let store = TemplateStore::new(dir.path());
    let p = Placeholders::new()
        .with("DATASET_ID", "85984NED")
        .with("DATA_ENTRIES", "  [\"GM0001\"] = {\n  },");
    assert_eq!(
        store.apply("t.lua", &p).unwrap(),
        "-- 85984NED\n  [\"GM0001\"] = {\n  },\n"
    );
}

#[test]
fn missing_template_is_reported_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let store = TemplateStore::new(dir.path());
    match store.apply("module_data.lua", &Placeholders::new()) {
        Err(Error::TemplateUnavailable { name, .. }) => assert_eq!(name, "module_data.lua"),
        other => panic!("expected TemplateUnavailable, got {other:?}"),
    }
}
