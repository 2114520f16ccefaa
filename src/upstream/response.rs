//! Inline image handling in generation responses.
//!
//! Generation responses carry images as base64 `inlineData` parts:
//!
//! ```json
//! {"candidates": [{"content": {"parts": [
//!     {"text": "Here you go"},
//!     {"inlineData": {"mimeType": "image/jpeg", "data": "<base64>"}}
//! ]}}]}
//! ```
//!
//! Only the first inline part of the first candidate is ever touched.

use crate::constants::OUTPUT_MIME_TYPE;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;

/// Decoded first inline image of a response.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    /// Index within `candidates[0].content.parts`.
    pub part_index: usize,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// What a rewrite changed.
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteSummary {
    pub part_index: usize,
    pub original_mime_type: Option<String>,
    pub input_bytes: usize,
    pub output_bytes: usize,
}

fn parts(response: &Value) -> Option<&Vec<Value>> {
    response
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()
}

fn parts_mut(response: &mut Value) -> Option<&mut Vec<Value>> {
    response
        .get_mut("candidates")?
        .get_mut(0)?
        .get_mut("content")?
        .get_mut("parts")?
        .as_array_mut()
}

/// Find and decode the first inline image.
///
/// Returns `None` when there is no inline part, or when its data is not
/// valid base64 (logged, the response is left alone).
pub fn extract_inline_image(response: &Value) -> Option<InlineImage> {
    let (part_index, inline) = parts(response)?
        .iter()
        .enumerate()
        .find_map(|(i, part)| part.get("inlineData").map(|inline| (i, inline)))?;

    let data = match inline.get("data").and_then(Value::as_str) {
        Some(data) => data,
        None => {
            tracing::warn!(part_index, "Inline image part has no string data");
            return None;
        }
    };

    match STANDARD.decode(data) {
        Ok(bytes) => Some(InlineImage {
            part_index,
            mime_type: inline
                .get("mimeType")
                .and_then(Value::as_str)
                .map(str::to_string),
            bytes,
        }),
        Err(e) => {
            tracing::warn!(part_index, error = %e, "Inline image data is not valid base64");
            None
        }
    }
}

/// Replace the data of the inline part at `part_index` with a PNG.
///
/// Returns `false` if the part no longer exists.
pub fn replace_inline_image(response: &mut Value, part_index: usize, png: &[u8]) -> bool {
    let inline = match parts_mut(response)
        .and_then(|parts| parts.get_mut(part_index))
        .and_then(|part| part.get_mut("inlineData"))
        .and_then(Value::as_object_mut)
    {
        Some(inline) => inline,
        None => return false,
    };

    inline.insert("data".to_string(), Value::String(STANDARD.encode(png)));
    inline.insert(
        "mimeType".to_string(),
        Value::String(OUTPUT_MIME_TYPE.to_string()),
    );
    true
}

/// Run the first inline image through `transform` and write the result back.
pub fn rewrite_inline_image<F>(response: &mut Value, transform: F) -> Option<RewriteSummary>
where
    F: FnOnce(&[u8]) -> Vec<u8>,
{
    let image = extract_inline_image(response)?;
    let output = transform(&image.bytes);

    if !replace_inline_image(response, image.part_index, &output) {
        return None;
    }

    Some(RewriteSummary {
        part_index: image.part_index,
        original_mime_type: image.mime_type,
        input_bytes: image.bytes.len(),
        output_bytes: output.len(),
    })
}
