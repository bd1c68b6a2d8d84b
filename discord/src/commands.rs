//! Slash-command definitions and interaction responses.

use serde_json::{json, Value};

use peerlink_types::VerifiedIdentity;

pub const VERIFY: &str = "verify";
pub const WHOIS: &str = "whois";
pub const MYINFO: &str = "myinfo";

const OPTION_STRING: u8 = 3;
const OPTION_USER: u8 = 6;

const RESPONSE_PONG: u8 = 1;
const RESPONSE_MESSAGE: u8 = 4;
const RESPONSE_DEFERRED_MESSAGE: u8 = 5;

/// Message visible only to the invoker.
const FLAG_EPHEMERAL: u32 = 1 << 6;

/// Discord's "green".
const EMBED_COLOR: u32 = 0x2ecc71;

/// Bulk-overwrite body for command registration.
pub fn definitions() -> Value {
    json!([
        {
            "name": VERIFY,
            "description": "Verify your School 21 account",
            "options": [{
                "type": OPTION_STRING,
                "name": "login",
                "description": "Your School 21 login (nickname)",
                "required": true
            }]
        },
        {
            "name": WHOIS,
            "description": "Check who a Discord user is on School 21",
            "options": [{
                "type": OPTION_USER,
                "name": "member",
                "description": "The Discord member to check",
                "required": true
            }]
        },
        {
            "name": MYINFO,
            "description": "Show your School 21 verification info"
        }
    ])
}

pub fn pong() -> Value {
    json!({ "type": RESPONSE_PONG })
}

pub fn deferred_ephemeral() -> Value {
    json!({ "type": RESPONSE_DEFERRED_MESSAGE, "data": { "flags": FLAG_EPHEMERAL } })
}

pub fn ephemeral_message(content: &str) -> Value {
    json!({
        "type": RESPONSE_MESSAGE,
        "data": { "content": content, "flags": FLAG_EPHEMERAL }
    })
}

pub fn whois_message(display_name: &str, identity: Option<&VerifiedIdentity>) -> String {
    match identity {
        Some(identity) => {
            let mut message = format!(
                "**{display_name}** is verified as **{}**",
                identity.external_login
            );
            if let Some(group) = identity.group_label.as_deref().filter(|g| !g.is_empty()) {
                message.push_str(&format!(" (Coalition: {group})"));
            }
            message
        }
        None => format!("**{display_name}** is not verified."),
    }
}

pub const NOT_VERIFIED_MSG: &str =
    "You are not verified yet. Use `/verify` to link your School 21 account.";

/// Ephemeral embed describing the invoker's own link.
pub fn myinfo_embed(identity: &VerifiedIdentity) -> Value {
    let mut fields = vec![json!({
        "name": "Login",
        "value": identity.external_login.as_str(),
        "inline": false
    })];
    if let Some(group) = identity.group_label.as_deref().filter(|g| !g.is_empty()) {
        fields.push(json!({ "name": "Coalition", "value": group, "inline": false }));
    }
    fields.push(json!({
        "name": "Verified at",
        "value": format!("<t:{}:F>", identity.verified_at.as_secs()),
        "inline": false
    }));

    json!({
        "type": RESPONSE_MESSAGE,
        "data": {
            "flags": FLAG_EPHEMERAL,
            "embeds": [{
                "title": "Your School 21 Info",
                "color": EMBED_COLOR,
                "fields": fields
            }]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use peerlink_types::{ExternalLogin, PlatformUserId, Timestamp};

    fn identity(group: Option<&str>) -> VerifiedIdentity {
        VerifiedIdentity {
            platform_user_id: PlatformUserId::new(42),
            external_login: ExternalLogin::parse("jdoe").unwrap(),
            group_label: group.map(str::to_string),
            verified_at: Timestamp::new(1_700_000_000),
        }
    }

    #[test]
    fn three_commands_are_defined() {
        let defs = definitions();
        let names: Vec<_> = defs
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["verify", "whois", "myinfo"]);
        assert_eq!(defs[0]["options"][0]["required"], true);
    }

    #[test]
    fn whois_mentions_coalition_only_when_known() {
        assert_eq!(
            whois_message("John", Some(&identity(Some("Dragon squad")))),
            "**John** is verified as **jdoe** (Coalition: Dragon squad)"
        );
        assert_eq!(
            whois_message("John", Some(&identity(None))),
            "**John** is verified as **jdoe**"
        );
        assert_eq!(whois_message("John", None), "**John** is not verified.");
    }

    #[test]
    fn myinfo_embed_lists_fields() {
        let embed = myinfo_embed(&identity(Some("Phoenix")));
        let fields = embed["data"]["embeds"][0]["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[2]["value"], "<t:1700000000:F>");
        assert_eq!(embed["data"]["flags"], 64);

        let embed = myinfo_embed(&identity(None));
        assert_eq!(embed["data"]["embeds"][0]["fields"].as_array().unwrap().len(), 2);
    }
}
