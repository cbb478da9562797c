use std::fs;
use std::path::{Path, PathBuf};

use datamod::{
    ContentRegistry, DatamodError, JsonContentRegistry, LoadingState, PackageRecord, Pipeline,
    PipelineConfig, RunOutcome, Settings,
};
use semver::Version;
use tempfile::TempDir;

/// Records every call and delegates counting to the JSON registry
#[derive(Default)]
struct RecordingRegistry {
    inner: JsonContentRegistry,
    calls: Vec<(String, PathBuf, String)>,
}

impl ContentRegistry for RecordingRegistry {
    fn load_items_from_file(&mut self, path: &Path, owner: &str) -> usize {
        self.calls.push(("items".into(), path.to_path_buf(), owner.into()));
        self.inner.load_items_from_file(path, owner)
    }

    fn load_recipes_from_file(&mut self, path: &Path, owner: &str) -> usize {
        self.calls.push(("recipes".into(), path.to_path_buf(), owner.into()));
        self.inner.load_recipes_from_file(path, owner)
    }

    fn load_asset_bundle_from_file(&mut self, path: &Path, owner: &str) -> usize {
        self.calls.push(("assets".into(), path.to_path_buf(), owner.into()));
        self.inner.load_asset_bundle_from_file(path, owner)
    }
}

fn write_package(root: &Path, dir: &str, declaration: &str) -> PathBuf {
    let path = root.join(dir);
    fs::create_dir_all(&path).unwrap();
    fs::write(path.join("datamod.json"), declaration).unwrap();
    path
}

fn host(version: &str) -> PipelineConfig {
    PipelineConfig::new(datamod::parse_version(version).unwrap())
}

fn completed(outcome: RunOutcome) -> datamod::PipelineReport {
    match outcome {
        RunOutcome::Completed(report) => report,
        other => panic!("expected a completed run, got {:?}", other),
    }
}

#[test]
fn single_package_loads_its_items() {
    let tmp = TempDir::new().unwrap();
    let pack = write_package(
        tmp.path(),
        "PackA",
        r#"{"ModName": "PackA", "ItemFiles": ["items.json"]}"#,
    );
    fs::write(
        pack.join("items.json"),
        r#"[{"ID": 1, "Title": "A"}, {"ID": 2, "Title": "B"}, {"ID": 3, "Title": "C"}]"#,
    )
    .unwrap();

    let mut pipeline = Pipeline::new(host("1.0"));
    pipeline.add_search_root(tmp.path()).unwrap();

    let mut registry = RecordingRegistry::default();
    let report = completed(pipeline.run(&mut registry).unwrap());

    let accepted = pipeline.accepted().unwrap();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted["PackA"].state(), LoadingState::Loaded);
    assert_eq!(report.content.items, 3);
    assert_eq!(registry.inner.items().len(), 3);

    assert_eq!(registry.calls.len(), 1);
    let (kind, path, owner) = &registry.calls[0];
    assert_eq!(kind, "items");
    assert!(path.ends_with("PackA/items.json"));
    assert_eq!(owner, "PackA");
}

#[test]
fn colliding_names_are_all_rejected() {
    let tmp = TempDir::new().unwrap();
    write_package(tmp.path(), "X", r#"{"ModName": "Shared", "Version": "1"}"#);
    write_package(tmp.path(), "Y", r#"{"ModName": "Shared", "Version": "2"}"#);

    let mut pipeline = Pipeline::new(host("1.0"));
    pipeline.add_search_root(tmp.path()).unwrap();

    let report = completed(pipeline.run(&mut JsonContentRegistry::new()).unwrap());

    assert!(pipeline.accepted().unwrap().is_empty());
    assert_eq!(report.rejected.len(), 2);
    for rejected in &report.rejected {
        assert_eq!(rejected.mod_name, "Shared");
        assert_eq!(rejected.state, LoadingState::ErrorDuplicateName);
    }
}

#[test]
fn too_new_minimum_version_is_never_accepted() {
    let tmp = TempDir::new().unwrap();
    write_package(
        tmp.path(),
        "Future",
        r#"{"ModName": "Future", "MinimumLavenderVersion": "2.0"}"#,
    );
    write_package(tmp.path(), "Today", r#"{"ModName": "Today"}"#);

    let mut pipeline = Pipeline::new(host("1.5.2"));
    pipeline.add_search_root(tmp.path()).unwrap();
    let report = completed(pipeline.run(&mut JsonContentRegistry::new()).unwrap());

    let accepted = pipeline.accepted().unwrap();
    assert!(!accepted.contains_key("Future"));
    assert!(accepted.contains_key("Today"));
    assert_eq!(report.rejected[0].state, LoadingState::ErrorIncompatibleVersion);
}

#[test]
fn second_run_changes_nothing() {
    let tmp = TempDir::new().unwrap();
    write_package(tmp.path(), "A", r#"{"ModName": "A"}"#);

    let mut pipeline = Pipeline::new(host("1.0"));
    pipeline.add_search_root(tmp.path()).unwrap();

    let mut registry = RecordingRegistry::default();
    completed(pipeline.run(&mut registry).unwrap());
    let before: Vec<_> = pipeline.accepted().unwrap().keys().cloned().collect();

    // a package appearing later is not picked up
    write_package(tmp.path(), "B", r#"{"ModName": "B"}"#);
    assert!(matches!(
        pipeline.run(&mut registry).unwrap(),
        RunOutcome::AlreadyProcessed
    ));
    let after: Vec<_> = pipeline.accepted().unwrap().keys().cloned().collect();
    assert_eq!(before, after);
}

#[test]
fn overlapping_search_roots_find_each_package_once() {
    let tmp = TempDir::new().unwrap();
    write_package(tmp.path(), "A", r#"{"ModName": "A"}"#);

    let mut pipeline = Pipeline::new(host("1.0"));
    pipeline.add_search_root(tmp.path()).unwrap();
    pipeline.add_search_root(tmp.path().join(".")).unwrap();
    pipeline.add_search_root(tmp.path().join("A").join("..")).unwrap();
    assert_eq!(pipeline.registrar().search_roots().len(), 1);

    let report = completed(pipeline.run(&mut JsonContentRegistry::new()).unwrap());
    assert_eq!(report.candidates, 1);
    assert_eq!(report.accepted, vec!["A"]);
}

#[test]
fn same_package_added_directly_and_by_search_collapses() {
    let tmp = TempDir::new().unwrap();
    let dir = write_package(tmp.path(), "A", r#"{"ModName": "A"}"#);

    let mut pipeline = Pipeline::new(host("1.0"));
    let direct = datamod::declaration::load_record(&dir, "datamod.json").unwrap();
    assert!(pipeline.add_candidate(direct.clone()).unwrap());
    assert!(!pipeline.add_candidate(direct).unwrap());
    pipeline.add_search_root(tmp.path()).unwrap();

    let report = completed(pipeline.run(&mut JsonContentRegistry::new()).unwrap());
    assert_eq!(report.candidates, 1);
    assert_eq!(report.accepted, vec!["A"]);
}

#[test]
fn hand_built_candidates_are_normalized_and_validated() {
    let tmp = TempDir::new().unwrap();
    write_package(tmp.path(), "A", r#"{"ModName": "A"}"#);

    let mut pipeline = Pipeline::new(host("1.0"));
    pipeline.add_search_root(tmp.path()).unwrap();

    let named = datamod::declaration::Declaration {
        mod_name: "A".to_string(),
        ..Default::default()
    };
    let dotted = tmp.path().join("A").join("..").join("A");
    assert!(pipeline
        .add_candidate(PackageRecord::new(named, dotted, "datamod.json"))
        .unwrap());

    let nameless = PackageRecord::new(Default::default(), tmp.path().join("Z"), "datamod.json");
    assert!(!pipeline.add_candidate(nameless).unwrap());

    let report = completed(pipeline.run(&mut JsonContentRegistry::new()).unwrap());
    assert_eq!(report.accepted, vec!["A"]);
    assert!(report.rejected.is_empty());
}

#[test]
fn gather_hook_can_add_search_roots() {
    let base = TempDir::new().unwrap();
    let extra = TempDir::new().unwrap();
    write_package(base.path(), "A", r#"{"ModName": "A"}"#);
    write_package(extra.path(), "B", r#"{"ModName": "B"}"#);

    let mut pipeline = Pipeline::new(host("1.0"));
    pipeline.add_search_root(base.path()).unwrap();

    let extra_root = extra.path().to_path_buf();
    pipeline
        .on_gather("extra-root", move |registrar| {
            registrar.add_search_root(&extra_root)?;
            Ok(())
        })
        .unwrap();

    let report = completed(pipeline.run(&mut JsonContentRegistry::new()).unwrap());
    assert_eq!(report.accepted, vec!["A", "B"]);
}

#[test]
fn filtered_search_before_run() {
    let tmp = TempDir::new().unwrap();
    write_package(tmp.path(), "A", r#"{"ModName": "Keep"}"#);
    write_package(tmp.path(), "B", r#"{"ModName": "Skip"}"#);

    let mut pipeline = Pipeline::new(host("1.0"));
    let only_keep = |r: &PackageRecord| r.mod_name() == "Keep";
    pipeline
        .search_directory(tmp.path(), "datamod.json", Some(&only_keep))
        .unwrap();

    let report = completed(pipeline.run(&mut JsonContentRegistry::new()).unwrap());
    assert_eq!(report.accepted, vec!["Keep"]);
}

#[test]
fn missing_content_files_do_not_block_loading() {
    let tmp = TempDir::new().unwrap();
    let pack = write_package(
        tmp.path(),
        "Pack",
        r#"{
            "ModName": "Pack",
            "ItemFiles": ["gone.json"],
            "RecipeFiles": ["recipes.json"],
            "LvAssetBundles": ["assets.json"]
        }"#,
    );
    fs::write(pack.join("recipes.json"), r#"[{"ID": 7}]"#).unwrap();
    fs::write(
        pack.join("assets.json"),
        r#"[{"ID": 1, "AssetType": "Image", "Data": {"ResPath": "img.png"}}]"#,
    )
    .unwrap();

    let mut pipeline = Pipeline::new(host("1.0"));
    pipeline.add_search_root(tmp.path()).unwrap();
    let mut registry = RecordingRegistry::default();
    let report = completed(pipeline.run(&mut registry).unwrap());

    assert_eq!(report.content.items, 0);
    assert_eq!(report.content.recipes, 1);
    assert_eq!(report.content.assets, 1);
    assert_eq!(report.content.asset_bundle_files, 1);
    assert_eq!(pipeline.accepted().unwrap()["Pack"].state(), LoadingState::Loaded);
    assert!(registry.calls.iter().all(|c| c.0 != "items"));
}

#[test]
fn settings_drive_the_pipeline() {
    let tmp = TempDir::new().unwrap();
    let mods = tmp.path().join("mods");
    write_package(&mods, "A", r#"{"ModName": "A", "MaximumLavenderVersion": "0.9"}"#);

    let settings_path = tmp.path().join("settings.json");
    fs::write(
        &settings_path,
        serde_json::json!({
            "host_version": "1.0",
            "search_roots": [mods],
        })
        .to_string(),
    )
    .unwrap();

    let settings = Settings::load(&settings_path).unwrap();
    let mut pipeline = Pipeline::from_settings(&settings).unwrap();
    assert_eq!(pipeline.config().host_version, Version::new(1, 0, 0));

    let report = completed(pipeline.run(&mut JsonContentRegistry::new()).unwrap());
    assert!(report.accepted.is_empty());
    assert_eq!(report.rejected[0].state, LoadingState::ErrorIncompatibleVersion);
}

#[test]
fn misuse_after_completion_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let mut pipeline = Pipeline::new(host("1.0"));
    completed(pipeline.run(&mut JsonContentRegistry::new()).unwrap());

    let err = pipeline.add_search_root(tmp.path()).unwrap_err();
    assert!(matches!(err, DatamodError::InvalidState(_)));
    assert!(err.is_invalid_usage());
}
