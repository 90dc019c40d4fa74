use assert_cmd::Command;
use mockito::Matcher;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::{contains, is_empty};
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const ENV_VARS: [&str; 17] = [
    "MC_API",
    "MC_MODEL",
    "MC_REASONING_EFFORT",
    "MC_TIMEOUT",
    "MC_SYSTEM",
    "MC_LOG",
    "MC_DEFAULT_MODE",
    "OPENAI_API_KEY",
    "OPENAI_BASE_URL",
    "TENANT_ID",
    "CLIENT_ID",
    "CLIENT_SECRET",
    "GRAPH_API_BASE",
    "GRAPH_AUTHORITY",
    "GRAPH_USER_ID",
    "GRAPH_SCOPE",
    "XDG_CONFIG_HOME",
];

fn mailchat_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mailchat"));
    for key in ENV_VARS {
        cmd.env_remove(key);
    }
    cmd.env("MC_SETTINGS", home.path().join("settings.json"))
        .env("MC_CONFIG", home.path().join("config.toml"));
    cmd
}

fn write_config(home: &TempDir, raw: &str) {
    fs::write(home.path().join("config.toml"), raw).expect("write config");
}

fn parse_stdout_json(output: &[u8]) -> Value {
    let text = String::from_utf8(output.to_vec()).expect("stdout should be utf-8");
    serde_json::from_str(text.trim()).expect("stdout should contain valid JSON")
}

fn read_json(path: &Path) -> Value {
    let raw = fs::read_to_string(path).expect("read json file");
    serde_json::from_str(&raw).expect("file should contain valid JSON")
}

fn responses_body(text: &str) -> String {
    json!({
        "id": "resp_1",
        "model": "o3",
        "output": [{
            "type": "message",
            "role": "assistant",
            "content": [{"type": "output_text", "text": text}]
        }],
        "usage": {"input_tokens": 12, "output_tokens": 3, "total_tokens": 15}
    })
    .to_string()
}

#[test]
fn dry_run_succeeds_without_api_key() {
    let home = TempDir::new().expect("tempdir");
    let assert = mailchat_cmd(&home)
        .args(["ask", "--dry-run", "How many unread emails?"])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["dry_run"], true);
    assert_eq!(body["api"], "responses");
    assert_eq!(body["model"], "o3");
    assert_eq!(body["endpoint"], "https://api.openai.com/v1/responses");
    assert_eq!(body["output"], "text");
    assert_eq!(body["tools"], json!([]));
    assert_eq!(body["request"]["input"][0]["content"], "How many unread emails?");
    assert!(body["request"].get("tools").is_none());
}

#[test]
fn dry_run_offers_tools_when_graph_is_configured() {
    let home = TempDir::new().expect("tempdir");
    let assert = mailchat_cmd(&home)
        .env("TENANT_ID", "t")
        .env("CLIENT_ID", "c")
        .env("CLIENT_SECRET", "s")
        .args(["ask", "--dry-run", "--api", "chat", "--json", "List drafts"])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["api"], "chat");
    assert_eq!(body["output"], "json");
    assert_eq!(body["tools"].as_array().map(Vec::len), Some(10));
    assert_eq!(body["request"]["tools"][0]["type"], "function");
    assert_eq!(body["request"]["tools"][0]["function"]["name"], "listEmails");
}

#[test]
fn no_tools_flag_skips_mailbox_functions() {
    let home = TempDir::new().expect("tempdir");
    let assert = mailchat_cmd(&home)
        .env("TENANT_ID", "t")
        .env("CLIENT_ID", "c")
        .env("CLIENT_SECRET", "s")
        .args(["ask", "--dry-run", "--no-tools", "hi"])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["tools"], json!([]));
}

#[test]
fn prompt_argument_wins_over_stdin() {
    let home = TempDir::new().expect("tempdir");
    let assert = mailchat_cmd(&home)
        .args(["ask", "--dry-run", "from argument"])
        .write_stdin("from stdin")
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["request"]["input"][0]["content"], "from argument");
}

#[test]
fn prompt_is_read_from_stdin() {
    let home = TempDir::new().expect("tempdir");
    let assert = mailchat_cmd(&home)
        .args(["ask", "--dry-run"])
        .write_stdin("Summarise my calendar\n")
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["request"]["input"][0]["content"], "Summarise my calendar\n");
}

#[test]
fn missing_prompt_fails() {
    let home = TempDir::new().expect("tempdir");
    mailchat_cmd(&home)
        .args(["ask", "--dry-run"])
        .write_stdin("   ")
        .assert()
        .failure()
        .stdout(is_empty())
        .stderr(contains("No prompt provided"));
}

#[test]
fn flags_beat_env_beat_profile() {
    let home = TempDir::new().expect("tempdir");
    write_config(
        &home,
        "[profiles.work]\napi = \"chat\"\nmodel = \"gpt-4o\"\nsystem = \"You are terse.\"\ntimeout = 30\n",
    );

    let assert = mailchat_cmd(&home)
        .env("MC_MODEL", "gpt-4.1")
        .args(["ask", "--profile", "work", "--dry-run", "--timeout", "5", "hi"])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["api"], "chat");
    assert_eq!(body["model"], "gpt-4.1");
    assert_eq!(body["timeout_secs"], 5);
    assert_eq!(body["request"]["messages"][0]["role"], "system");
    assert_eq!(body["request"]["messages"][0]["content"], "You are terse.");
    assert_eq!(body["request"]["messages"][1]["content"], "hi");
}

#[test]
fn unknown_profile_fails() {
    let home = TempDir::new().expect("tempdir");
    write_config(&home, "[profiles.work]\nmodel = \"o3\"\n");

    mailchat_cmd(&home)
        .args(["ask", "--profile", "home", "--dry-run", "hi"])
        .assert()
        .failure()
        .stderr(contains("Profile 'home' not found"));
}

#[test]
fn invalid_env_api_fails() {
    let home = TempDir::new().expect("tempdir");
    mailchat_cmd(&home)
        .env("MC_API", "soap")
        .args(["ask", "--dry-run", "hi"])
        .assert()
        .failure()
        .stderr(contains("Invalid MC_API 'soap'. Supported values: responses, chat."));
}

#[test]
fn dry_run_save_writes_request() {
    let home = TempDir::new().expect("tempdir");
    let out = home.path().join("nested").join("request.json");
    mailchat_cmd(&home)
        .args(["ask", "--dry-run", "--save"])
        .arg(&out)
        .arg("hi")
        .assert()
        .success();

    let saved = read_json(&out);
    assert_eq!(saved["dry_run"], true);
    assert_eq!(saved["request"]["model"], "o3");
}

#[test]
fn live_ask_without_api_key_fails() {
    let home = TempDir::new().expect("tempdir");
    mailchat_cmd(&home)
        .args(["ask", "hi"])
        .assert()
        .failure()
        .stderr(contains("OPENAI_API_KEY is not set"));
}

#[test]
fn live_ask_renders_reply_and_saves_raw_response() {
    let home = TempDir::new().expect("tempdir");
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/responses")
        .match_header("authorization", "Bearer sk-secret-value")
        .match_body(Matcher::PartialJson(json!({"model": "o3"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(responses_body("You have 3 unread emails."))
        .create();

    let out = home.path().join("reply.json");
    mailchat_cmd(&home)
        .env("OPENAI_API_KEY", "sk-secret-value")
        .env("OPENAI_BASE_URL", server.url())
        .args(["-v", "ask", "--save"])
        .arg(&out)
        .arg("How many unread?")
        .assert()
        .success()
        .stdout(contains("Assistant: You have 3 unread emails."))
        .stderr(contains("api_key_present=true").and(contains("sk-secret-value").not()));

    mock.assert();
    let saved = read_json(&out);
    assert_eq!(saved["id"], "resp_1");
}

#[test]
fn live_ask_json_prints_raw_response() {
    let home = TempDir::new().expect("tempdir");
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/responses")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(responses_body("ok"))
        .create();

    let assert = mailchat_cmd(&home)
        .env("OPENAI_API_KEY", "sk-test")
        .env("OPENAI_BASE_URL", server.url())
        .args(["-q", "ask", "--json", "ping"])
        .assert()
        .success()
        .stderr(is_empty());

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["output"][0]["content"][0]["text"], "ok");
}

#[test]
fn live_ask_reports_api_errors() {
    let home = TempDir::new().expect("tempdir");
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/responses")
        .with_status(429)
        .with_body("slow down")
        .create();

    mailchat_cmd(&home)
        .env("OPENAI_API_KEY", "sk-test")
        .env("OPENAI_BASE_URL", server.url())
        .args(["ask", "ping"])
        .assert()
        .failure()
        .stderr(contains("responses API error 429").and(contains("slow down")));
}

#[test]
fn verbose_mode_flag_renders_usage_panel() {
    let home = TempDir::new().expect("tempdir");
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/responses")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(responses_body("Done."))
        .create();

    mailchat_cmd(&home)
        .env("OPENAI_API_KEY", "sk-test")
        .env("OPENAI_BASE_URL", server.url())
        .args(["ask", "--mode", "verbose", "ping"])
        .assert()
        .success()
        .stdout(
            contains("Response [VERBOSE]")
                .and(contains("Usage Statistics"))
                .and(contains("Done.")),
        );
}

#[test]
fn chat_repl_exits_on_quit() {
    let home = TempDir::new().expect("tempdir");
    mailchat_cmd(&home)
        .env("OPENAI_API_KEY", "sk-test")
        .env("OPENAI_BASE_URL", "http://127.0.0.1:9")
        .args(["chat", "--no-color"])
        .write_stdin("/d\nquit\n")
        .assert()
        .success()
        .stdout(contains("Type 'exit' to quit.").and(contains("Switched to debug mode")));
}

#[test]
fn tools_list_names_every_function() {
    let home = TempDir::new().expect("tempdir");
    mailchat_cmd(&home)
        .args(["tools", "list"])
        .assert()
        .success()
        .stdout(
            contains("listEmails")
                .and(contains("sendDraft"))
                .and(contains("createForwardingRule")),
        );
}

#[test]
fn tools_list_json_is_a_declaration_array() {
    let home = TempDir::new().expect("tempdir");
    let assert = mailchat_cmd(&home)
        .args(["tools", "list", "--json"])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    let tools = body.as_array().expect("array");
    assert_eq!(tools.len(), 10);
    assert_eq!(tools[0]["name"], "listEmails");
}

#[test]
fn tools_call_dry_run_plans_request() {
    let home = TempDir::new().expect("tempdir");
    let assert = mailchat_cmd(&home)
        .args([
            "tools",
            "call",
            "listEmails",
            "--args",
            r#"{"top": 3}"#,
            "--user",
            "me@example.com",
            "--dry-run",
        ])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["function"], "listEmails");
    assert_eq!(body["request"]["method"], "GET");
    assert_eq!(
        body["request"]["url"],
        "https://graph.microsoft.com/v1.0/users/me@example.com/messages"
    );
    assert_eq!(body["request"]["query"]["$top"], "3");
}

#[test]
fn tools_call_rejects_unknown_function() {
    let home = TempDir::new().expect("tempdir");
    mailchat_cmd(&home)
        .args(["tools", "call", "deleteEverything", "--dry-run"])
        .assert()
        .failure()
        .stderr(contains("Unknown function 'deleteEverything'"));
}

#[test]
fn tools_call_rejects_bad_args() {
    let home = TempDir::new().expect("tempdir");
    mailchat_cmd(&home)
        .args(["tools", "call", "listEmails", "--args", "{oops", "--dry-run"])
        .assert()
        .failure()
        .stderr(contains("Invalid --args JSON"));
}

#[test]
fn config_check_validates_profiles() {
    let home = TempDir::new().expect("tempdir");
    write_config(&home, "[profiles.work]\napi = \"chat\"\n");
    mailchat_cmd(&home)
        .args(["config", "check"])
        .assert()
        .success()
        .stdout(contains("config OK"));

    write_config(&home, "[profiles.work]\napi = \"soap\"\n");
    mailchat_cmd(&home)
        .args(["config", "check", "--profile", "work"])
        .assert()
        .failure()
        .stderr(contains("Invalid profile api 'soap' in profile 'work'"));
}

#[test]
fn config_mode_persists_default_mode() {
    let home = TempDir::new().expect("tempdir");
    mailchat_cmd(&home)
        .args(["config", "mode", "debug"])
        .assert()
        .success()
        .stdout(contains("default mode set to debug"));

    let settings = read_json(&home.path().join("settings.json"));
    assert_eq!(settings["display"]["default_mode"], "debug");

    let assert = mailchat_cmd(&home).args(["config", "show"]).assert().success();
    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body["settings"]["display"]["default_mode"], "debug");
}

#[test]
fn config_init_refuses_to_overwrite_without_force() {
    let home = TempDir::new().expect("tempdir");
    mailchat_cmd(&home)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(contains("settings written"));

    mailchat_cmd(&home)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(contains("already exists"));

    mailchat_cmd(&home)
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn version_includes_build_metadata() {
    let home = TempDir::new().expect("tempdir");
    mailchat_cmd(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(contains("mailchat").and(contains("commit:")).and(contains("built:")));
}

#[test]
fn completion_generates_script() {
    let home = TempDir::new().expect("tempdir");
    mailchat_cmd(&home)
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(contains("mailchat"));
}

#[test]
fn verbose_and_quiet_conflict() {
    let home = TempDir::new().expect("tempdir");
    mailchat_cmd(&home)
        .args(["-v", "-q", "tools", "list"])
        .assert()
        .failure();
}
