//! Best-effort JSON extraction from model output.
//!
//! Vision responses are free text that frequently arrives wrapped in a
//! markdown code fence. This is the single place that knows how to peel
//! the fence off; call sites parse the result into their own shapes and
//! decide how to degrade when parsing fails.

/// Parse the first JSON document in `text`, stripping a surrounding
/// markdown fence (```` ```json ```` preferred over a plain ```` ``` ````)
/// if present. An unterminated fence swallows the rest of the text.
pub fn extract_json(text: &str) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::from_str(fence_body(text).trim())
}

/// The content between the first fence pair, or the whole text when no
/// fence is present.
fn fence_body(text: &str) -> &str {
    for marker in ["```json", "```"] {
        if let Some(start) = text.find(marker) {
            let body = &text[start + marker.len()..];
            return match body.find("```") {
                Some(end) => &body[..end],
                None => body,
            };
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_json_parses() {
        let v = extract_json(r#"{"a": 1}"#).unwrap();
        assert_eq!(v["a"], 1);
    }

    #[test]
    fn json_fence_is_stripped() {
        let text = "Here you go:\n```json\n{\"style\": \"modern\"}\n```\nDone.";
        let v = extract_json(text).unwrap();
        assert_eq!(v["style"], "modern");
    }

    #[test]
    fn plain_fence_is_stripped() {
        let v = extract_json("```\n{\"x\": 2}\n```").unwrap();
        assert_eq!(v["x"], 2);
    }

    #[test]
    fn unterminated_fence_takes_rest_of_text() {
        let v = extract_json("```json\n{\"ok\": true}").unwrap();
        assert_eq!(v["ok"], true);
    }

    #[test]
    fn non_json_is_an_error() {
        assert!(extract_json("I could not find a good spot.").is_err());
        assert!(extract_json("```json\nnot json\n```").is_err());
    }
}
