use std::path::Path;
use std::process::{Command, Output};

fn hookreel(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hookreel"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("GEMINI_API_KEY")
        .output()
        .expect("failed to run hookreel")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    let output = hookreel(dir.path(), &["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["ideas", "story", "compose", "video", "run", "info"] {
        assert!(text.contains(command), "missing {command} in:\n{text}");
    }
}

#[test]
fn info_reports_defaults_on_stdout_only() {
    let dir = tempfile::tempdir().unwrap();
    let output = hookreel(dir.path(), &["info"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains(env!("CARGO_PKG_VERSION")));
    assert!(text.contains("built-in defaults"));
    assert!(text.contains("$GEMINI_API_KEY NOT SET"));
}

#[test]
fn info_picks_up_config_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("hookreel.toml"),
        "[model]\nmodel = \"gemini-custom\"\n",
    )
    .unwrap();
    let output = hookreel(dir.path(), &["info"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("hookreel.toml"));
    assert!(text.contains("gemini-custom"));
}

#[test]
fn explicit_missing_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = hookreel(dir.path(), &["--config", "nope.toml", "info"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("nope.toml"));
}

#[test]
fn duration_outside_range_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    for duration in ["4", "31"] {
        let output = hookreel(
            dir.path(),
            &[
                "video",
                "--image",
                "bg.jpg",
                "--caption",
                "Hook",
                "--duration",
                duration,
            ],
        );
        assert_eq!(output.status.code(), Some(2), "duration {duration}");
        assert!(stderr(&output).contains("--duration"));
    }
}

#[test]
fn compose_with_missing_image_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = hookreel(
        dir.path(),
        &[
            "compose",
            "--image",
            "missing.jpg",
            "--caption",
            "Hook",
            "--output",
            "frame.png",
        ],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("decode"));
    assert!(!dir.path().join("frame.png").exists());
}

#[test]
fn ideas_without_api_key_names_the_variable() {
    let dir = tempfile::tempdir().unwrap();
    let output = hookreel(dir.path(), &["ideas", "Tesla"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("GEMINI_API_KEY"));
}

fn gemini_reply(text: &str) -> String {
    serde_json::json!({
        "candidates": [{"content": {"parts": [{"text": text}]}}]
    })
    .to_string()
}

fn write_model_config(dir: &Path, base_url: &str) {
    std::fs::write(
        dir.join("hookreel.toml"),
        format!(
            "[model]\nbase_url = \"{}\"\nmodel = \"gemini-test\"\napi_key_env = \"HOOKREEL_TEST_KEY\"\n",
            base_url
        ),
    )
    .unwrap();
}

#[test]
fn ideas_json_against_mock_model() {
    let mut server = mockito::Server::new();
    let ideas = "```json\n{\"on_screen_text\": \"It moved\\nRead the comment\", \
                 \"image_prompt\": \"statue\", \"description\": \"#a #b #c\", \
                 \"tags\": [\"x\", \"y\"]}\n```";
    let _m = server
        .mock("POST", "/v1beta/models/gemini-test:generateContent")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(gemini_reply(ideas))
        .create();

    let dir = tempfile::tempdir().unwrap();
    write_model_config(dir.path(), &server.url());

    let output = Command::new(env!("CARGO_BIN_EXE_hookreel"))
        .args(["ideas", "Moving statue", "--json"])
        .current_dir(dir.path())
        .env("HOOKREEL_TEST_KEY", "k")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["on_screen_text"], "It moved\nRead the comment");
    assert_eq!(value["tags"], "x, y");
}

#[test]
fn unparseable_ideas_print_raw_response() {
    let mut server = mockito::Server::new();
    let _m = server
        .mock("POST", mockito::Matcher::Any)
        .with_status(200)
        .with_body(gemini_reply("I cannot help with that."))
        .create();

    let dir = tempfile::tempdir().unwrap();
    write_model_config(dir.path(), &server.url());

    let output = Command::new(env!("CARGO_BIN_EXE_hookreel"))
        .args(["ideas", "anything"])
        .current_dir(dir.path())
        .env("HOOKREEL_TEST_KEY", "k")
        .output()
        .unwrap();
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("Raw model response"));
    assert!(err.contains("I cannot help with that."));
    assert!(stdout(&output).is_empty());
}
