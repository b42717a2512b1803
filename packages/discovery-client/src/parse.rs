//! Salvage parsing for task-runner result payloads.
//!
//! The agent is instructed to emit a JSON object with a `products` array, but
//! real runs put that object in different envelope fields (`result`, `output`,
//! `data`, `response`), sometimes as a JSON string, and sometimes as loosely
//! formatted text. These parsers recover a [`SearchResult`] from whatever
//! actually came back.

use serde_json::Value;

use crate::types::{Metrics, Product, SearchResult};

/// Envelope fields the runner is known to put its payload in.
const PAYLOAD_FIELDS: &[&str] = &["result", "output", "data", "response"];

/// Extra fields probed when falling back to plain-text parsing.
const TEXT_FIELDS: &[&str] = &["content", "message"];

/// Extract a structured result from a raw task-detail payload.
///
/// Returns `None` when no products and no summary text could be recovered.
pub fn parse_search_result(raw: &Value) -> Option<SearchResult> {
    // Preferred path: a JSON object (possibly serialized as a string) with a
    // `products` array, under one of the known envelope fields.
    for field in PAYLOAD_FIELDS {
        let Some(payload) = raw.get(field) else {
            continue;
        };
        let candidate = match payload {
            Value::String(s) => serde_json::from_str::<Value>(s).ok(),
            Value::Object(_) => Some(payload.clone()),
            _ => None,
        };
        if let Some(candidate) = candidate {
            if candidate.get("products").is_some() {
                if let Ok(result) = serde_json::from_value::<SearchResult>(candidate) {
                    return Some(result);
                }
            }
        }
    }

    // Fallback: parse the first text field that looks like a result writeup.
    let text = extract_text(raw)?;
    let result = parse_text_result(text);
    if result.products.is_empty() && result.summary.as_deref().unwrap_or("").is_empty() {
        None
    } else {
        Some(result)
    }
}

fn extract_text(raw: &Value) -> Option<&str> {
    if let Value::String(s) = raw {
        return Some(s);
    }
    PAYLOAD_FIELDS
        .iter()
        .chain(TEXT_FIELDS)
        .find_map(|field| raw.get(field).and_then(Value::as_str))
}

/// Parse a loosely formatted text result.
///
/// Expected shape: free-form summary lines, a `Products Found:` heading, then
/// one product per line as `Name - Description (Category)`, followed by
/// closing notes ("All products are ...", "The search was ...").
pub fn parse_text_result(text: &str) -> SearchResult {
    #[derive(PartialEq)]
    enum Section {
        Summary,
        Products,
        Note,
    }

    let mut section = Section::Summary;
    let mut summary_lines = Vec::new();
    let mut note_lines = Vec::new();
    let mut products = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.contains("Products Found:") {
            section = Section::Products;
            continue;
        }
        if line.starts_with("All products are") || line.starts_with("The search was") {
            section = Section::Note;
        }

        match section {
            Section::Summary => summary_lines.push(line),
            Section::Note => note_lines.push(line),
            Section::Products => {
                if let Some(product) = parse_product_line(line) {
                    products.push(product);
                }
            }
        }
    }

    let total_found = products.len() as u64;
    SearchResult {
        products,
        summary: Some(summary_lines.join(" ")).filter(|s| !s.is_empty()),
        note: Some(note_lines.join(" ")).filter(|s| !s.is_empty()),
        total_found: Some(total_found),
    }
}

/// Parse a `Name - Description (Category)` product line.
fn parse_product_line(line: &str) -> Option<Product> {
    let (name, rest) = line.split_once(" - ")?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    // Category is the trailing parenthesized group, when present.
    let rest = rest.trim();
    let (description, category) = match rest.rfind('(') {
        Some(open) if rest.ends_with(')') => {
            let category = rest[open + 1..rest.len() - 1].trim();
            (rest[..open].trim(), category)
        }
        _ => (rest, "Other"),
    };

    Some(Product {
        name: name.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        url: None,
        post_url: None,
        metrics: Metrics::default(),
        id: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_inline_json_object() {
        let raw = json!({
            "result": {
                "products": [{"name": "Sketchy", "description": "AI sketching", "category": "Design"}],
                "summary": "Found one product",
                "total_found": 1
            }
        });
        let result = parse_search_result(&raw).unwrap();
        assert_eq!(result.products.len(), 1);
        assert_eq!(result.products[0].name, "Sketchy");
        assert_eq!(result.total_found, Some(1));
    }

    #[test]
    fn parses_json_serialized_as_string() {
        let inner = r#"{"products":[{"name":"VoiceKit","category":"Audio Generation"}]}"#;
        let raw = json!({ "output": inner });
        let result = parse_search_result(&raw).unwrap();
        assert_eq!(result.products.len(), 1);
        assert_eq!(result.products[0].name, "VoiceKit");
    }

    #[test]
    fn later_envelope_field_used_when_earlier_has_no_products() {
        let raw = json!({
            "result": "plain status text with no product section",
            "data": { "products": [{"name": "Draftly"}] }
        });
        let result = parse_search_result(&raw).unwrap();
        assert_eq!(result.products[0].name, "Draftly");
    }

    #[test]
    fn parses_text_format_with_sections() {
        let text = "\
Search completed across two instances.

Products Found:
Draftly - Email drafting assistant (Productivity)
PixelForge - Generates game sprites (Image Generation)

All products are early-stage launches from June 2025.";
        let result = parse_text_result(text);
        assert_eq!(result.products.len(), 2);
        assert_eq!(result.products[0].name, "Draftly");
        assert_eq!(result.products[0].category, "Productivity");
        assert_eq!(result.products[1].category, "Image Generation");
        assert_eq!(
            result.summary.as_deref(),
            Some("Search completed across two instances.")
        );
        assert!(result
            .note
            .as_deref()
            .unwrap()
            .starts_with("All products are"));
        assert_eq!(result.total_found, Some(2));
    }

    #[test]
    fn product_line_without_category_defaults_to_other() {
        let product = parse_product_line("Notate - Meeting notes tool").unwrap();
        assert_eq!(product.category, "Other");
        assert_eq!(product.description, "Meeting notes tool");
    }

    #[test]
    fn unusable_payload_yields_none() {
        let raw = json!({ "status": "finished" });
        assert!(parse_search_result(&raw).is_none());
    }
}
