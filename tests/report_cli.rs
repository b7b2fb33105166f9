mod support;

use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;

use support::TestStore;

fn planviz_cmd(store: &TestStore) -> Command {
    let mut cmd = support::planviz_cmd();
    cmd.env("PLANVIZ_DATA_DIR", store.path());
    cmd
}

#[test]
fn report_renders_svg_for_stored_project() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new();
    let project = support::fixture_project();
    let id = project.id.to_string();
    store.save_project(&project);

    let output = planviz_cmd(&store)
        .args(["report", &id, "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&output)?;
    assert_eq!(value["command"].as_str(), Some("report"));
    assert_eq!(value["data"]["format"].as_str(), Some("svg"));
    assert_eq!(value["data"]["total"].as_u64(), Some(1));

    let path = store.reports_dir().join(format!("project_{id}.svg"));
    assert_eq!(
        value["data"]["reports"][0]["path"].as_str(),
        Some(path.to_str().expect("utf8 path"))
    );

    let svg = std::fs::read_to_string(&path)?;
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Project: Fixture Sprint"));
    assert!(svg.contains("Gantt Chart - Tasks Timeline (with dependencies)"));
    assert!(svg.contains("Mail Timeline"));
    assert!(svg.contains("Task Status Distribution"));
    assert!(svg.contains("Task Dependencies"));

    Ok(())
}

#[test]
fn report_all_over_empty_store_warns() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new();

    let output = planviz_cmd(&store)
        .args(["report", "--all", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&output)?;
    assert_eq!(value["data"]["total"].as_u64(), Some(0));
    assert_eq!(value["warnings"][0].as_str(), Some("no projects found"));

    planviz_cmd(&store)
        .args(["report", "--all"])
        .assert()
        .success()
        .stdout(contains("no projects found"));

    Ok(())
}

#[test]
fn report_all_renders_every_project() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new();
    let first = support::fixture_project();
    let mut second = support::fixture_project();
    second.id = uuid::Uuid::new_v4();
    second.title = "Second Sprint".to_string();
    store.save_project(&first);
    store.save_project(&second);

    let output = planviz_cmd(&store)
        .args(["report", "--all", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&output)?;
    assert_eq!(value["data"]["total"].as_u64(), Some(2));

    for id in [first.id, second.id] {
        assert!(store
            .reports_dir()
            .join(format!("project_{id}.svg"))
            .exists());
    }

    Ok(())
}

#[test]
fn report_plan_format_writes_render_plan() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new();
    let project = support::fixture_project();
    let id = project.id.to_string();
    store.save_project(&project);

    planviz_cmd(&store)
        .args(["report", &id, "--format", "plan"])
        .assert()
        .success();

    let path = store.reports_dir().join(format!("project_{id}.json"));
    let plan: Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(plan["title"].as_str(), Some("Project: Fixture Sprint"));
    let panels = plan["panels"].as_array().expect("panels array");
    assert_eq!(panels.len(), 4);
    assert_eq!(
        panels[0]["title"].as_str(),
        Some("Gantt Chart - Tasks Timeline (with dependencies)")
    );

    Ok(())
}

#[test]
fn report_out_overrides_target_path() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new();
    let project = support::fixture_project();
    let id = project.id.to_string();
    store.save_project(&project);

    let out = store.path().join("custom").join("plan.svg");
    planviz_cmd(&store)
        .args(["report", &id, "--out"])
        .arg(&out)
        .assert()
        .success();

    assert!(out.exists());
    assert!(!store
        .reports_dir()
        .join(format!("project_{id}.svg"))
        .exists());

    Ok(())
}

#[test]
fn report_respects_config_output_directory() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new();
    let project = support::fixture_project();
    let id = project.id.to_string();
    store.save_project(&project);
    store.write_config("[output]\ndirectory = \"rendered\"\n");

    planviz_cmd(&store)
        .args(["report", &id])
        .assert()
        .success();

    assert!(store
        .path()
        .join("rendered")
        .join(format!("project_{id}.svg"))
        .exists());

    Ok(())
}

#[test]
fn report_with_invalid_config_is_a_user_error() {
    let store = TestStore::new();
    let project = support::fixture_project();
    let id = project.id.to_string();
    store.save_project(&project);
    store.write_config("[report]\nlabel_inside_fraction = 0.0\n");

    planviz_cmd(&store)
        .args(["report", &id])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Invalid configuration"));
}

#[test]
fn report_with_malformed_config_is_a_user_error() {
    let store = TestStore::new();
    let project = support::fixture_project();
    let id = project.id.to_string();
    store.save_project(&project);
    store.write_config("not [ valid toml\n");

    planviz_cmd(&store)
        .args(["report", &id])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Invalid configuration"));
}

#[test]
fn report_rejects_unknown_format() {
    let store = TestStore::new();

    planviz_cmd(&store)
        .args(["report", "--all", "--format", "png"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("invalid format"));
}

#[test]
fn report_requires_id_or_all() {
    let store = TestStore::new();

    planviz_cmd(&store)
        .arg("report")
        .assert()
        .failure()
        .code(2)
        .stderr(contains("pass a project id or --all"));

    planviz_cmd(&store)
        .args([
            "report",
            "00000000-0000-0000-0000-000000000000",
            "--all",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("not both"));
}

#[test]
fn report_unknown_project_fails() {
    let store = TestStore::new();

    planviz_cmd(&store)
        .args(["report", "00000000-0000-0000-0000-000000000000"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Project not found"));
}
