use mailchat::chat::{ChatError, ChatSession, MAX_TOOL_ROUNDS, Shortcut};
use mailchat::display::ResponseFormatter;
use mailchat::display::interactive::KeyAction;
use mailchat::display::progress::ProgressDisplay;
use mailchat::display::DisplayMode;
use mailchat::graph::{GraphClient, GraphSettings};
use mailchat::llm::{Item, LlmClient, LlmError, TurnOptions};
use mailchat::settings::Settings;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::{Value, json};

fn plain_formatter() -> ResponseFormatter {
    let mut settings = Settings::default();
    settings.display.enable_colors = false;
    ResponseFormatter::new(settings, None)
}

fn graph_for(server: &ServerGuard) -> GraphClient {
    GraphClient::new(GraphSettings {
        authority: server.url(),
        tenant_id: "tenant-1".to_string(),
        client_id: "client-1".to_string(),
        client_secret: "secret-1".to_string(),
        scope: "https://graph.microsoft.com/.default".to_string(),
        api_base: format!("{}/v1.0", server.url()),
        default_user: Some("me@example.com".to_string()),
    })
}

fn session(server: &ServerGuard, graph: Option<GraphClient>) -> ChatSession {
    ChatSession::new(
        LlmClient::new(server.url(), "test-key"),
        graph,
        TurnOptions::default(),
        Some("You manage my mailbox."),
        plain_formatter(),
    )
    .with_progress(ProgressDisplay::new(true))
}

fn function_call_response() -> Value {
    json!({
        "id": "resp_1",
        "object": "response",
        "model": "o3",
        "output": [{
            "type": "function_call",
            "id": "fc_1",
            "call_id": "call_1",
            "name": "listEmails",
            "arguments": "{\"top\": 1}"
        }]
    })
}

fn final_response(text: &str) -> Value {
    json!({
        "id": "resp_2",
        "object": "response",
        "model": "o3",
        "output": [{
            "type": "message",
            "role": "assistant",
            "content": [{"type": "output_text", "text": text}]
        }],
        "text": {"format": {"type": "text"}},
        "usage": {"input_tokens": 50, "output_tokens": 10, "total_tokens": 60}
    })
}

async fn mock_graph_inbox(server: &mut ServerGuard, hits: usize) -> (mockito::Mock, mockito::Mock) {
    let token = server
        .mock("POST", "/tenant-1/oauth2/v2.0/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"access_token": "token-abc"}).to_string())
        .expect(hits)
        .create_async()
        .await;
    let inbox = server
        .mock("GET", "/v1.0/users/me@example.com/messages")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"value": [{
                "id": "m1",
                "subject": "Budget",
                "from": {"emailAddress": {"address": "boss@example.com"}},
                "receivedDateTime": "2024-05-01T10:00:00Z",
                "bodyPreview": "Please review"
            }]})
            .to_string(),
        )
        .expect(hits)
        .create_async()
        .await;
    (token, inbox)
}

#[tokio::test]
async fn function_call_round_trip() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("POST", "/responses")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::Regex(
            r#"\{"role":"user","content":"Any mail today\?"\}\],"text""#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(function_call_response().to_string())
        .create_async()
        .await;
    let second = server
        .mock("POST", "/responses")
        .match_body(Matcher::Regex(
            r#""type":"function_call_output","call_id":"call_1""#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(final_response("One email from boss@example.com about the budget.").to_string())
        .create_async()
        .await;
    let (token, inbox) = mock_graph_inbox(&mut server, 1).await;

    let graph = graph_for(&server);
    let mut chat = session(&server, Some(graph));
    let mut out = Vec::new();
    let turn = chat
        .send_turn("Any mail today?", &mut out)
        .await
        .expect("turn succeeds");

    first.assert_async().await;
    second.assert_async().await;
    token.assert_async().await;
    inbox.assert_async().await;

    assert_eq!(
        turn.text.as_deref(),
        Some("One email from boss@example.com about the budget.")
    );
    let printed = String::from_utf8(out).expect("utf-8");
    assert!(printed.contains("[tool] listEmails"));
    assert!(printed.contains("Assistant: One email from boss@example.com about the budget."));

    let items = chat.conversation().items();
    assert_eq!(items.len(), 5);
    assert!(matches!(&items[0], Item::Developer(_)));
    assert!(matches!(&items[2], Item::Assistant { tool_calls, .. } if tool_calls.len() == 1));
    match &items[3] {
        Item::ToolOutput { call_id, output } => {
            assert_eq!(call_id, "call_1");
            assert!(output.contains("Budget"));
        }
        other => panic!("unexpected item {other:?}"),
    }
    assert_eq!(
        items[4],
        Item::Assistant {
            content: "One email from boss@example.com about the budget.".to_string(),
            tool_calls: Vec::new(),
        }
    );
}

#[tokio::test]
async fn tool_rounds_are_bounded() {
    let mut server = Server::new_async().await;
    let responses = server
        .mock("POST", "/responses")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(function_call_response().to_string())
        .expect(MAX_TOOL_ROUNDS + 1)
        .create_async()
        .await;
    let (_token, inbox) = mock_graph_inbox(&mut server, MAX_TOOL_ROUNDS).await;

    let graph = graph_for(&server);
    let mut chat = session(&server, Some(graph));
    let mut out = Vec::new();
    chat.send_turn("Loop forever", &mut out)
        .await
        .expect("turn ends");

    responses.assert_async().await;
    inbox.assert_async().await;
    let printed = String::from_utf8(out).expect("utf-8");
    assert!(printed.contains("No response content available."));
}

#[tokio::test]
async fn api_error_rolls_back_the_turn() {
    let mut server = Server::new_async().await;
    let _failure = server
        .mock("POST", "/responses")
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;

    let mut chat = session(&server, None);
    let before = chat.conversation().len();
    let mut out = Vec::new();
    let err = chat
        .send_turn("hello", &mut out)
        .await
        .expect_err("api error");

    match err {
        ChatError::Llm(LlmError::Api { status, body, .. }) => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(chat.conversation().len(), before);
    assert!(chat.last_response().is_none());
}

#[tokio::test]
async fn no_tools_are_sent_without_graph() {
    let mut server = Server::new_async().await;
    let plain = server
        .mock("POST", "/responses")
        .match_body(Matcher::PartialJson(json!({"model": "o3", "store": true})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(final_response("Hi!").to_string())
        .create_async()
        .await;

    let mut chat = session(&server, None);
    assert!(chat.tools().is_empty());
    let mut out = Vec::new();
    chat.send_turn("hello", &mut out).await.expect("turn succeeds");
    plain.assert_async().await;
}

#[tokio::test]
async fn shortcuts_rerender_last_response() {
    let mut server = Server::new_async().await;
    let _reply = server
        .mock("POST", "/responses")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(final_response("Inbox is empty.").to_string())
        .create_async()
        .await;

    let mut chat = session(&server, None);
    let mut out = Vec::new();
    chat.send_turn("status?", &mut out).await.expect("turn succeeds");

    let mut shortcut_out = Vec::new();
    let action = chat
        .handle_shortcut("v", &mut shortcut_out)
        .expect("shortcut handled");
    assert_eq!(action, Shortcut::Applied(KeyAction::ModeChanged(DisplayMode::Verbose)));
    assert_eq!(chat.formatter().mode(), DisplayMode::Verbose);

    let printed = String::from_utf8(shortcut_out).expect("utf-8");
    assert!(printed.contains("Switched to verbose mode"));
    assert!(printed.contains("Response [VERBOSE]"));
    assert!(printed.contains("Inbox is empty."));
}

#[tokio::test]
async fn repl_handles_shortcuts_and_exit() {
    let server = Server::new_async().await;
    let mut chat = session(&server, None);
    let input = "\n/d\n/zz\nquit\nnever sent\n";
    let mut out = Vec::new();
    chat.run_repl(input.as_bytes(), &mut out)
        .await
        .expect("repl ends");

    let printed = String::from_utf8(out).expect("utf-8");
    assert!(printed.starts_with("Type 'exit' to quit.\nYou: "));
    assert!(printed.contains("Switched to debug mode"));
    assert!(printed.contains("Unknown shortcut '/zz'"));
    assert_eq!(chat.conversation().len(), 1);
}

#[tokio::test]
async fn repl_reports_api_errors_and_continues() {
    let mut server = Server::new_async().await;
    let _failure = server
        .mock("POST", "/responses")
        .with_status(401)
        .with_body("bad key")
        .expect(2)
        .create_async()
        .await;

    let mut chat = session(&server, None);
    let mut out = Vec::new();
    chat.run_repl("first\nsecond\n".as_bytes(), &mut out)
        .await
        .expect("repl ends at eof");

    let printed = String::from_utf8(out).expect("utf-8");
    assert_eq!(printed.matches("Error: responses API error 401").count(), 2);
}
