use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw email fields as supplied by the mailbox export. Nothing here is
/// normalized; see [`crate::features::extract_features`].
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailRecord {
    #[serde(default)]
    pub message_id: String,
    #[serde(default)]
    pub from_address: Option<String>,
    #[serde(default)]
    pub sender_address: Option<String>,
    #[serde(default)]
    pub reply_to_address: Option<String>,
    #[serde(default)]
    pub from_domain: Option<String>,
    #[serde(default)]
    pub message_id_header: Option<String>,
    #[serde(default)]
    pub list_id: Option<String>,
    #[serde(default)]
    pub unsubscribe_link: Option<String>,
    #[serde(default)]
    pub precedence: Option<String>,
    #[serde(default)]
    pub auto_submitted: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body_text: Option<String>,
}

/// Case-insensitive header lookup utility function
pub fn get_header_case_insensitive<'a>(
    headers: &'a HashMap<String, String>,
    header_name: &str,
) -> Option<&'a String> {
    let header_lower = header_name.to_lowercase();
    headers
        .iter()
        .find(|(k, _)| k.to_lowercase() == header_lower)
        .map(|(_, v)| v)
}

impl EmailRecord {
    /// Build a record from a parsed header map. The Message-ID header doubles
    /// as the record identifier when none is given.
    pub fn from_headers(
        message_id: Option<&str>,
        headers: &HashMap<String, String>,
        body: Option<&str>,
    ) -> Self {
        let header = |name: &str| get_header_case_insensitive(headers, name).cloned();
        let message_id_header = header("Message-ID");

        Self {
            message_id: message_id
                .map(str::to_string)
                .or_else(|| message_id_header.clone())
                .unwrap_or_default(),
            from_address: header("From"),
            sender_address: header("Sender"),
            reply_to_address: header("Reply-To"),
            from_domain: None,
            message_id_header,
            list_id: header("List-Id"),
            unsubscribe_link: header("List-Unsubscribe"),
            precedence: header("Precedence"),
            auto_submitted: header("Auto-Submitted"),
            subject: header("Subject"),
            body_text: body.map(str::to_string),
        }
    }

    /// Parse an RFC 5322 message: header block, blank line, body. Folded
    /// continuation lines are joined onto the previous header with a space.
    pub fn from_raw_message(raw: &str) -> Self {
        let (header_block, body) = split_message(raw);
        let headers = parse_headers(header_block);
        let body = if body.is_empty() { None } else { Some(body) };
        Self::from_headers(None, &headers, body)
    }
}

fn split_message(raw: &str) -> (&str, &str) {
    for sep in ["\r\n\r\n", "\n\n"] {
        if let Some(idx) = raw.find(sep) {
            return (&raw[..idx], &raw[idx + sep.len()..]);
        }
    }
    (raw, "")
}

fn parse_headers(block: &str) -> HashMap<String, String> {
    let mut headers: HashMap<String, String> = HashMap::new();
    let mut current: Option<String> = None;

    for line in block.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(value) = current.as_ref().and_then(|name| headers.get_mut(name)) {
                value.push(' ');
                value.push_str(line.trim());
            }
            continue;
        }

        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_string();
            // First occurrence wins, as for Received-style repeats
            headers
                .entry(name.clone())
                .or_insert_with(|| value.trim().to_string());
            current = Some(name);
        } else {
            current = None;
        }
    }

    headers
}
