//! End-to-end tests for the cradle CLI

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

/// Config with no providers, so free-text runs never touch the network
const OFFLINE_CONFIG: &str = "providers: []\n";

fn cradle(cwd: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_cradle"));
    command
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .env_remove("CRADLE_MODE")
        .env_remove("CRADLE_TIMEOUT_SECS")
        .env_remove("CRADLE_TEMPLATE_DIR")
        .env_remove("OPENAI_API_KEY");
    command
}

fn run(command: &mut Command) -> Output {
    command.output().expect("failed to run cradle")
}

#[test]
fn demos_lists_the_catalog() {
    let dir = tempdir().unwrap();
    let output = run(cradle(dir.path()).arg("demos"));
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for key in ["Todo API", "Notes API", "Calculator API"] {
        assert!(stdout.contains(key), "missing {key} in:\n{stdout}");
    }
    assert!(stdout.contains("list_todos"));
}

#[test]
fn generate_todo_demo_writes_project_and_archive() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("todo");
    let archive = dir.path().join("todo.zip");

    let output = run(cradle(dir.path()).args([
        "generate",
        "--demo",
        "Todo API",
        "--output-dir",
        out.to_str().unwrap(),
        "--archive",
        archive.to_str().unwrap(),
    ]));
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    for file in [
        "openapi.yaml",
        "backend/main.py",
        "backend/requirements.txt",
        "client_demo.py",
        "README.md",
    ] {
        assert!(out.join(file).is_file(), "{file} was not written");
    }
    assert!(archive.is_file());

    let document: serde_yaml::Value =
        serde_yaml::from_str(&fs::read_to_string(out.join("openapi.yaml")).unwrap()).unwrap();
    assert_eq!(document["paths"].as_mapping().unwrap().len(), 1);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"message\":\"Called GET /todos\""));
    assert!(stdout.contains("\"status\":\"ok\""));
}

#[test]
fn generate_default_output_dir_uses_api_name() {
    let dir = tempdir().unwrap();
    let output = run(cradle(dir.path()).args([
        "generate",
        "--demo",
        "notes api",
        "--server-template",
        "rust_axum",
        "--client-template",
        "curl",
        "--archive",
    ]));
    assert!(output.status.success());

    let project = dir.path().join("Notes_API");
    assert!(project.join("backend/src/main.rs").is_file());
    assert!(project.join("client_demo.sh").is_file());
    assert!(dir.path().join("Notes_API_cradle.zip").is_file());
}

#[test]
fn empty_prompt_is_rejected() {
    let dir = tempdir().unwrap();
    let output = run(cradle(dir.path()).args(["generate", "--prompt", ""]));
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Please enter a requirement to generate a custom API."));
    assert!(!dir.path().join("Custom_API").exists());
}

#[test]
fn unknown_demo_is_rejected() {
    let dir = tempdir().unwrap();
    let output = run(cradle(dir.path()).args(["generate", "--demo", "Weather API"]));
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Available demos"));
}

#[test]
fn prompt_without_providers_follows_mode() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("offline.yaml"), OFFLINE_CONFIG).unwrap();

    let strict = run(cradle(dir.path()).args([
        "generate",
        "--prompt",
        "manage tasks",
        "--config",
        "offline.yaml",
        "--mode",
        "strict",
    ]));
    assert!(!strict.status.success());
    assert!(!dir.path().join("Custom_API").exists());

    let fallback = run(cradle(dir.path()).args([
        "generate",
        "--prompt",
        "manage tasks",
        "--config",
        "offline.yaml",
    ]));
    assert!(
        fallback.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&fallback.stderr)
    );
    assert!(String::from_utf8_lossy(&fallback.stderr).contains("Note:"));
    let client = fs::read_to_string(dir.path().join("Custom_API/client_demo.py")).unwrap();
    assert!(client.contains("requests.get(BASE_URL + \"/items\")"));
    assert!(client.contains("requests.post(BASE_URL + \"/items\")"));
}

#[test]
fn server_template_must_be_a_server() {
    let dir = tempdir().unwrap();
    let output = run(cradle(dir.path()).args([
        "generate",
        "--demo",
        "Todo API",
        "--server-template",
        "curl",
    ]));
    assert!(!output.status.success());
}

#[test]
fn init_config_writes_defaults_once() {
    let dir = tempdir().unwrap();
    let output = run(cradle(dir.path()).arg("init-config"));
    assert!(output.status.success());

    let written = fs::read_to_string(dir.path().join("cradle.yaml")).unwrap();
    let config: serde_yaml::Value = serde_yaml::from_str(&written).unwrap();
    assert_eq!(config["mode"], "fallback");
    assert_eq!(config["server_template"], "python_fastapi");
    assert!(!written.contains("sk-"));

    let again = run(cradle(dir.path()).arg("init-config"));
    assert!(!again.status.success());
    let forced = run(cradle(dir.path()).args(["init-config", "--force"]));
    assert!(forced.status.success());
}
