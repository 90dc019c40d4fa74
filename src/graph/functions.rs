use serde_json::{Value, json};

use crate::graph::GraphError;
use crate::graph::request::{GraphRequest, Method, Outcome};
use crate::llm::tools::{ToolDefinition, ToolFunction, ToolParam, ToolParamType};

const DEFAULT_TOP: u64 = 10;
const DEFAULT_TIME_ZONE: &str = "Eastern Standard Time";
const FORWARDING_RULE_NAME: &str = "GPT Forwarding Rule";
/// Characters legal inside a path segment that ids commonly carry.
const PATH_LITERALS: [(&str, &str); 2] = [("%40", "@"), ("%3D", "=")];

/// The mailbox operations the model may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxFunction {
    ListEmails,
    SendEmail,
    CreateDraft,
    SendDraft,
    ListDrafts,
    ListCalendarEvents,
    CreateCalendarEvent,
    GetMailboxSettings,
    UpdateMailboxSettings,
    CreateForwardingRule,
}

impl MailboxFunction {
    pub const ALL: [MailboxFunction; 10] = [
        Self::ListEmails,
        Self::SendEmail,
        Self::CreateDraft,
        Self::SendDraft,
        Self::ListDrafts,
        Self::ListCalendarEvents,
        Self::CreateCalendarEvent,
        Self::GetMailboxSettings,
        Self::UpdateMailboxSettings,
        Self::CreateForwardingRule,
    ];

    /// Tool name as the model sees it.
    pub fn name(self) -> &'static str {
        match self {
            Self::ListEmails => "listEmails",
            Self::SendEmail => "sendEmail",
            Self::CreateDraft => "createDraft",
            Self::SendDraft => "sendDraft",
            Self::ListDrafts => "listDrafts",
            Self::ListCalendarEvents => "listCalendarEvents",
            Self::CreateCalendarEvent => "createCalendarEvent",
            Self::GetMailboxSettings => "getMailboxSettings",
            Self::UpdateMailboxSettings => "updateMailboxSettings",
            Self::CreateForwardingRule => "createForwardingRule",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|function| function.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::ListEmails => {
                "List recent emails from a user's Outlook mailbox using Microsoft Graph API."
            }
            Self::SendEmail => "Send an email from the user's mailbox.",
            Self::CreateDraft => "Create a draft email in the user's mailbox without sending it.",
            Self::SendDraft => "Send a previously created draft by its message id.",
            Self::ListDrafts => "List the draft messages in the user's mailbox.",
            Self::ListCalendarEvents => "List upcoming events from the user's calendar.",
            Self::CreateCalendarEvent => "Create a calendar event, optionally inviting attendees.",
            Self::GetMailboxSettings => {
                "Read mailbox settings such as time zone and automatic replies."
            }
            Self::UpdateMailboxSettings => {
                "Update the mailbox time zone and automatic reply settings."
            }
            Self::CreateForwardingRule => {
                "Create an inbox rule that forwards matching messages to other addresses."
            }
        }
    }

    /// Function-calling declaration for this operation.
    pub fn definition(self) -> ToolDefinition {
        let user = ToolParam::string(
            "userId",
            "The email address of the user whose mailbox will be accessed.",
        )
        .optional();
        let top = ToolParam::new(
            "top",
            ToolParamType::Integer,
            false,
            Some("The number of items to retrieve.".to_string()),
        )
        .with_default(json!(DEFAULT_TOP));
        let body_type = ToolParam::string("bodyType", "Body content type: Text or HTML.")
            .with_default(json!("Text"));
        let time_zone = ToolParam::string("timeZone", "Windows or IANA time zone name.")
            .with_default(json!(DEFAULT_TIME_ZONE));

        let function = ToolFunction::new(self.name(), self.description()).with_param(user);
        let function = match self {
            Self::ListEmails | Self::ListCalendarEvents => function.with_param(top),
            Self::ListDrafts | Self::GetMailboxSettings => function,
            Self::SendEmail => function
                .with_param(ToolParam::string_list("to", "Recipient email addresses."))
                .with_param(ToolParam::string("subject", "Subject line."))
                .with_param(ToolParam::string("body", "Message body."))
                .with_param(body_type)
                .with_param(
                    ToolParam::new(
                        "saveToSentItems",
                        ToolParamType::Boolean,
                        false,
                        Some("Keep a copy in Sent Items.".to_string()),
                    )
                    .with_default(json!(true)),
                ),
            Self::CreateDraft => function
                .with_param(ToolParam::string_list("to", "Recipient email addresses."))
                .with_param(ToolParam::string("subject", "Subject line."))
                .with_param(ToolParam::string("body", "Message body."))
                .with_param(body_type),
            Self::SendDraft => function.with_param(ToolParam::string(
                "messageId",
                "Id of the draft message to send.",
            )),
            Self::CreateCalendarEvent => function
                .with_param(ToolParam::string("subject", "Event title."))
                .with_param(ToolParam::string(
                    "startDateTime",
                    "Start, ISO 8601 without offset, e.g. 2025-09-12T13:00:00.",
                ))
                .with_param(ToolParam::string("endDateTime", "End, ISO 8601 without offset."))
                .with_param(time_zone)
                .with_param(ToolParam::string("body", "Event description.").optional())
                .with_param(ToolParam::string_list("attendees", "Attendee email addresses.").optional()),
            Self::UpdateMailboxSettings => function
                .with_param(time_zone)
                .with_param(
                    ToolParam::string(
                        "autoReplyStatus",
                        "Automatic replies: disabled, alwaysEnabled or scheduled.",
                    )
                    .with_default(json!("disabled")),
                )
                .with_param(
                    ToolParam::string("autoReplyMessage", "External automatic reply text.")
                        .optional(),
                ),
            Self::CreateForwardingRule => function
                .with_param(ToolParam::string_list("forwardTo", "Addresses to forward to."))
                .with_param(
                    ToolParam::string_list(
                        "senderContains",
                        "Only forward messages whose sender contains one of these strings.",
                    )
                    .optional(),
                ),
        };
        ToolDefinition::from_function(function)
    }

    /// Translates call arguments into a Graph request.
    ///
    /// `userId` in `args` wins over `default_user`.
    pub fn plan(self, args: &Value, default_user: Option<&str>) -> Result<GraphRequest, GraphError> {
        let args = Args {
            function: self.name(),
            value: args,
        };
        let user = args
            .opt_str("userId")
            .or(default_user)
            .map(str::trim)
            .filter(|user| !user.is_empty())
            .ok_or(GraphError::NoMailbox)?;
        let base = format!("users/{}", args.path_segment("userId", user)?);

        let request = match self {
            Self::ListEmails => GraphRequest::new(
                Method::Get,
                format!("{base}/messages"),
                "get emails",
                Outcome::Messages { key: "emails" },
            )
            .with_query("$top", args.top()?)
            .with_query("$select", "id,subject,from,receivedDateTime,bodyPreview")
            .with_query("$orderby", "receivedDateTime desc"),
            Self::SendEmail => GraphRequest::new(
                Method::Post,
                format!("{base}/sendMail"),
                "send email",
                Outcome::Sent,
            )
            .with_body(json!({
                "message": message_body(&args)?,
                "saveToSentItems": args.opt_bool("saveToSentItems")?.unwrap_or(true),
            })),
            Self::CreateDraft => GraphRequest::new(
                Method::Post,
                format!("{base}/messages"),
                "create draft",
                Outcome::Created {
                    id_key: "draftId",
                    message: "Draft created successfully",
                },
            )
            .with_body(message_body(&args)?),
            Self::SendDraft => {
                let message_id = args.required_str("messageId")?;
                let message_id = args.path_segment("messageId", message_id)?;
                GraphRequest::new(
                    Method::Post,
                    format!("{base}/messages/{message_id}/send"),
                    "send draft",
                    Outcome::Sent,
                )
            }
            Self::ListDrafts => GraphRequest::new(
                Method::Get,
                format!("{base}/mailFolders/drafts/messages"),
                "get drafts",
                Outcome::Messages { key: "drafts" },
            ),
            Self::ListCalendarEvents => GraphRequest::new(
                Method::Get,
                format!("{base}/events"),
                "get calendar events",
                Outcome::Collection { key: "events" },
            )
            .with_query("$top", args.top()?)
            .with_query("$select", "subject,start,end,location")
            .with_query("$orderby", "start/dateTime asc"),
            Self::CreateCalendarEvent => {
                let time_zone = args.opt_str("timeZone").unwrap_or(DEFAULT_TIME_ZONE);
                let attendees: Vec<Value> = args
                    .address_list("attendees", false)?
                    .into_iter()
                    .map(|address| json!({ "emailAddress": { "address": address }, "type": "required" }))
                    .collect();
                GraphRequest::new(
                    Method::Post,
                    format!("{base}/events"),
                    "create calendar event",
                    Outcome::Json,
                )
                .with_body(json!({
                    "subject": args.required_str("subject")?,
                    "start": { "dateTime": args.required_str("startDateTime")?, "timeZone": time_zone },
                    "end": { "dateTime": args.required_str("endDateTime")?, "timeZone": time_zone },
                    "body": { "contentType": "Text", "content": args.opt_str("body").unwrap_or_default() },
                    "attendees": attendees,
                }))
            }
            Self::GetMailboxSettings => GraphRequest::new(
                Method::Get,
                format!("{base}/mailboxSettings"),
                "get mailbox settings",
                Outcome::Wrapped { key: "settings" },
            ),
            Self::UpdateMailboxSettings => GraphRequest::new(
                Method::Patch,
                format!("{base}/mailboxSettings"),
                "update mailbox settings",
                Outcome::Json,
            )
            .with_body(json!({
                "timeZone": args.opt_str("timeZone").unwrap_or(DEFAULT_TIME_ZONE),
                "automaticRepliesSetting": {
                    "status": args.opt_str("autoReplyStatus").unwrap_or("disabled"),
                    "externalReplyMessage": args.opt_str("autoReplyMessage").unwrap_or_default(),
                },
            })),
            Self::CreateForwardingRule => {
                let forward_to = recipients(args.address_list("forwardTo", true)?);
                let sender_contains = args.address_list("senderContains", false)?;
                GraphRequest::new(
                    Method::Post,
                    format!("{base}/mailFolders/inbox/messageRules"),
                    "create forwarding rule",
                    Outcome::Created {
                        id_key: "ruleId",
                        message: "Forwarding rule created successfully",
                    },
                )
                .with_body(json!({
                    "displayName": FORWARDING_RULE_NAME,
                    "sequence": 1,
                    "isEnabled": true,
                    "conditions": { "senderContains": sender_contains },
                    "actions": { "forwardTo": forward_to },
                }))
            }
        };
        Ok(request)
    }
}

/// Tool declarations for every mailbox function.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    MailboxFunction::ALL
        .into_iter()
        .map(MailboxFunction::definition)
        .collect()
}

/// `{"error": ...}` result for a name outside the catalogue.
pub fn not_implemented(name: &str) -> Value {
    json!({ "error": format!("Function '{name}' is not implemented.") })
}

fn message_body(args: &Args<'_>) -> Result<Value, GraphError> {
    Ok(json!({
        "subject": args.required_str("subject")?,
        "body": {
            "contentType": args.opt_str("bodyType").unwrap_or("Text"),
            "content": args.required_str("body")?,
        },
        "toRecipients": recipients(args.address_list("to", true)?),
    }))
}

fn recipients(addresses: Vec<String>) -> Vec<Value> {
    addresses
        .into_iter()
        .map(|address| json!({ "emailAddress": { "address": address } }))
        .collect()
}

struct Args<'a> {
    function: &'static str,
    value: &'a Value,
}

impl<'a> Args<'a> {
    fn opt_str(&self, key: &str) -> Option<&'a str> {
        self.value.get(key).and_then(Value::as_str)
    }

    fn required_str(&self, key: &'static str) -> Result<&'a str, GraphError> {
        self.opt_str(key)
            .filter(|value| !value.trim().is_empty())
            .ok_or(GraphError::MissingArgument {
                function: self.function,
                argument: key,
            })
    }

    fn opt_bool(&self, key: &'static str) -> Result<Option<bool>, GraphError> {
        match self.value.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(flag)) => Ok(Some(*flag)),
            Some(Value::String(raw)) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(self.invalid(key, format!("expected a boolean, got '{raw}'"))),
            },
            Some(other) => Err(self.invalid(key, format!("expected a boolean, got {other}"))),
        }
    }

    /// `top` as a positive integer; numeric strings are accepted.
    fn top(&self) -> Result<u64, GraphError> {
        let top = match self.value.get("top") {
            None | Some(Value::Null) => return Ok(DEFAULT_TOP),
            Some(Value::Number(number)) => number.as_u64(),
            Some(Value::String(raw)) => raw.trim().parse::<u64>().ok(),
            Some(_) => None,
        };
        top.filter(|top| *top > 0)
            .ok_or_else(|| self.invalid("top", "expected a positive integer".to_string()))
    }

    /// Accepts a single address string or an array of address strings.
    fn address_list(&self, key: &'static str, required: bool) -> Result<Vec<String>, GraphError> {
        let addresses: Vec<String> = match self.value.get(key) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::String(address)) => vec![address.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| self.invalid(key, "expected strings".to_string()))
                })
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(self.invalid(key, "expected a string or a list".to_string())),
        };
        let addresses: Vec<String> = addresses
            .into_iter()
            .map(|address| address.trim().to_string())
            .filter(|address| !address.is_empty())
            .collect();
        if required && addresses.is_empty() {
            return Err(GraphError::MissingArgument {
                function: self.function,
                argument: key,
            });
        }
        Ok(addresses)
    }

    /// `value` as one escaped path segment, so ids cannot reach other endpoints.
    fn path_segment(&self, key: &'static str, value: &str) -> Result<String, GraphError> {
        let value = value.trim();
        if matches!(value, "" | "." | "..") {
            return Err(self.invalid(key, format!("'{value}' is not a valid id")));
        }
        let mut segment = urlencoding::encode(value).into_owned();
        for (escaped, literal) in PATH_LITERALS {
            segment = segment.replace(escaped, literal);
        }
        Ok(segment)
    }

    fn invalid(&self, argument: &'static str, reason: String) -> GraphError {
        GraphError::InvalidArgument {
            function: self.function,
            argument,
            reason,
        }
    }
}
