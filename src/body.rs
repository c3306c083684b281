//! Selecting the HTML body of a message.
//!
//! Notifications reach a handler either as raw RFC 822 messages or as the JSON payload
//! tree of a mail provider's REST API, where part bodies are base64url encoded. Both
//! paths end in the HTML text the extractor consumes.

use crate::error::{Error, Result};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use mailparse::{parse_mail, MailParseError, ParsedMail};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// base64url that accepts bodies with or without trailing padding.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Extracts the preferred body text from a raw RFC 822 message.
///
/// The first `text/html` part (depth-first) wins, then the first `text/plain` part,
/// then the top-level body.
///
/// # Errors
///
/// Returns [`Error::ParseEmail`] if the message cannot be parsed and
/// [`Error::ExtractBody`] if the selected part cannot be decoded.
pub fn html_body_from_mime(raw: &[u8]) -> Result<String> {
    let parsed = parse_mail(raw).map_err(|source| Error::ParseEmail { source })?;
    select_body(&parsed).map_err(|source| Error::ExtractBody { source })
}

fn select_body(parsed: &ParsedMail<'_>) -> std::result::Result<String, MailParseError> {
    for mimetype in ["text/html", "text/plain"] {
        if let Some(part) = find_part(parsed, mimetype) {
            return part.get_body();
        }
    }

    debug!(mimetype = %parsed.ctype.mimetype, "No text part found, using top-level body");
    parsed.get_body()
}

fn find_part<'a, 'b>(parsed: &'b ParsedMail<'a>, mimetype: &str) -> Option<&'b ParsedMail<'a>> {
    if parsed.subparts.is_empty() {
        return parsed
            .ctype
            .mimetype
            .eq_ignore_ascii_case(mimetype)
            .then_some(parsed);
    }

    parsed
        .subparts
        .iter()
        .find_map(|part| find_part(part, mimetype))
}

/// Decodes a base64url body (padding optional) into UTF-8 text.
///
/// # Errors
///
/// Returns [`Error::DecodeBody`] on invalid base64 or non-UTF-8 content.
pub fn decode_base64url(data: &str) -> Result<String> {
    let bytes = URL_SAFE_LENIENT
        .decode(data.trim())
        .map_err(|e| Error::DecodeBody {
            message: e.to_string(),
        })?;

    String::from_utf8(bytes).map_err(|e| Error::DecodeBody {
        message: e.to_string(),
    })
}

/// Body of one payload part as returned by the provider API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPartBody {
    /// Inline content, base64url encoded.
    #[serde(default)]
    pub data: Option<String>,
    /// Handle for content that must be fetched separately (attachments).
    #[serde(default)]
    pub attachment_id: Option<String>,
    /// Size of the decoded content in bytes.
    #[serde(default)]
    pub size: u64,
}

/// One node of a message payload tree as returned by the provider API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMessagePart {
    /// MIME type of this part.
    #[serde(default)]
    pub mime_type: String,
    /// File name for attachment parts, empty otherwise.
    #[serde(default)]
    pub filename: String,
    /// Part body.
    #[serde(default)]
    pub body: ApiPartBody,
    /// Child parts of a multipart node.
    #[serde(default)]
    pub parts: Vec<ApiMessagePart>,
}

/// Reference to an attachment that has to be downloaded by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentRef<'a> {
    /// File name as sent.
    pub filename: &'a str,
    /// Provider handle for the attachment content.
    pub attachment_id: &'a str,
}

impl ApiMessagePart {
    /// Returns the decoded HTML body of this payload.
    ///
    /// Multipart payloads yield their first `text/html` part with inline data, searched
    /// depth-first; single-part payloads yield their own body. `None` if a multipart
    /// payload has no HTML part or a single-part payload has no data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecodeBody`] if the selected body is not valid base64url UTF-8.
    pub fn html_body(&self) -> Result<Option<String>> {
        let data = if self.parts.is_empty() {
            self.body.data.as_deref()
        } else {
            self.find_inline("text/html")
        };

        data.map(decode_base64url).transpose()
    }

    /// Lists attachments whose file name ends with `.{extension}` (case-insensitive).
    #[must_use]
    pub fn attachments_with_extension(&self, extension: &str) -> Vec<AttachmentRef<'_>> {
        let suffix = format!(".{}", extension.to_ascii_lowercase());
        let mut found = Vec::new();
        self.collect_attachments(&suffix, &mut found);
        found
    }

    fn find_inline(&self, mimetype: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| {
            if part.mime_type.eq_ignore_ascii_case(mimetype) {
                part.body.data.as_deref()
            } else {
                part.find_inline(mimetype)
            }
        })
    }

    fn collect_attachments<'a>(&'a self, suffix: &str, found: &mut Vec<AttachmentRef<'a>>) {
        if let Some(attachment_id) = self.body.attachment_id.as_deref() {
            if self.filename.to_ascii_lowercase().ends_with(suffix) {
                found.push(AttachmentRef {
                    filename: &self.filename,
                    attachment_id,
                });
            }
        }
        for part in &self.parts {
            part.collect_attachments(suffix, found);
        }
    }
}
