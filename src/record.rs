use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// Placeholder the in-page query uses for an element that is not on the page.
pub const MISSING: &str = "N/A";

/// One scraped page: either everything the listing query returned, or why it failed.
///
/// Decoding is lenient: any object with an `error` key is a failure, and a field whose JSON
/// type does not fit is dropped rather than rejecting the whole record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawListingRecord {
    Failed { url: String, error: String },
    Listing(Listing),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Listing {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")] pub listing_number: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")] pub price: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")] pub address: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")] pub bedrooms: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")] pub bathrooms: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")] pub square_feet: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")] pub description: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")] pub age: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")] pub listing_style: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")] pub lot_size: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")] pub taxes: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")] pub fees: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")] pub mls: Option<Scalar>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")] pub kind: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")] pub subtype: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")] pub features: Option<Vec<Feature>>,
    #[serde(skip_serializing_if = "Option::is_none")] pub images: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(Number),
    Flag(bool),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub label: String,
    pub value: String,
}

impl RawListingRecord {
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        RawListingRecord::Failed { url: url.into(), error: error.into() }
    }

    pub fn url(&self) -> &str {
        match self {
            RawListingRecord::Failed { url, .. } => url,
            RawListingRecord::Listing(listing) => &listing.url,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RawListingRecord::Failed { .. })
    }

    /// Build a record from a JSON object. `url` falls back to an empty string when absent.
    pub fn from_map(mut map: Map<String, Value>) -> Self {
        let url = match map.remove("url") {
            Some(Value::String(s)) => s,
            _ => String::new(),
        };
        if let Some(err) = map.remove("error") {
            let error = match err {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            return RawListingRecord::Failed { url, error };
        }

        let mut scalar = |key: &str| map.remove(key).and_then(scalar_from);
        let listing = Listing {
            listing_number: scalar("listing_number"),
            price: scalar("price"),
            address: scalar("address"),
            bedrooms: scalar("bedrooms"),
            bathrooms: scalar("bathrooms"),
            square_feet: scalar("square_feet"),
            description: scalar("description"),
            age: scalar("age"),
            listing_style: scalar("listing_style"),
            lot_size: scalar("lot_size"),
            taxes: scalar("taxes"),
            fees: scalar("fees"),
            mls: scalar("mls"),
            kind: scalar("type"),
            subtype: scalar("subtype"),
            features: map.remove("features").and_then(features_from),
            images: map.remove("images").and_then(images_from),
            url,
        };
        RawListingRecord::Listing(listing)
    }
}

impl<'de> Deserialize<'de> for RawListingRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Ok(RawListingRecord::from_map(map))
    }
}

impl Scalar {
    /// Empty text, zero and `false` count as "nothing scraped".
    pub fn is_blank(&self) -> bool {
        match self {
            Scalar::Text(s) => s.is_empty(),
            Scalar::Number(n) => n.as_f64() == Some(0.0),
            Scalar::Flag(b) => !b,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Flag(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self { Scalar::Text(s.to_string()) }
}

/// One JSON object per line, in batch order.
pub fn to_jsonl(records: &[RawListingRecord]) -> serde_json::Result<String> {
    let mut out = String::new();
    for r in records {
        out.push_str(&serde_json::to_string(r)?);
        out.push('\n');
    }
    Ok(out)
}

/// Blank lines are skipped. A line that is not a JSON object becomes a failed record
/// naming the line, so the row count still matches what was fed in.
pub fn from_jsonl(text: &str) -> Vec<RawListingRecord> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => RawListingRecord::from_map(map),
            Ok(other) => RawListingRecord::failed("", format!("line {}: expected an object, got `{}`", i + 1, other)),
            Err(e) => RawListingRecord::failed("", format!("line {}: {}", i + 1, e)),
        })
        .collect()
}

fn scalar_from(v: Value) -> Option<Scalar> {
    match v {
        Value::String(s) => Some(Scalar::Text(s)),
        Value::Number(n) => Some(Scalar::Number(n)),
        Value::Bool(b) => Some(Scalar::Flag(b)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

// Entries without both halves as strings are skipped, same as the in-page query does.
fn features_from(v: Value) -> Option<Vec<Feature>> {
    let Value::Array(items) = v else { return None };
    let out = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<Feature>(item).ok())
        .collect();
    Some(out)
}

fn images_from(v: Value) -> Option<Vec<String>> {
    let Value::Array(items) = v else { return None };
    let out = items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect();
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_key_wins_over_listing_fields() {
        let rec: RawListingRecord = serde_json::from_value(json!({
            "url": "https://x/1",
            "error": "Shadow host not found",
            "price": "$1"
        }))
        .unwrap();
        assert_eq!(rec, RawListingRecord::failed("https://x/1", "Shadow host not found"));
    }

    #[test]
    fn listing_fields_decode() {
        let rec: RawListingRecord = serde_json::from_value(json!({
            "url": "https://x/2",
            "price": "$450,000",
            "bedrooms": 3,
            "type": "House",
            "features": [{"label": "Pool", "value": "Yes"}],
            "images": ["https://a/1.jpg"]
        }))
        .unwrap();
        let RawListingRecord::Listing(l) = rec else { panic!("expected listing") };
        assert_eq!(l.url, "https://x/2");
        assert_eq!(l.price, Some(Scalar::from("$450,000")));
        assert_eq!(l.bedrooms.as_ref().map(|b| b.to_string()), Some("3".to_string()));
        assert_eq!(l.kind, Some(Scalar::from("House")));
        assert_eq!(l.features.unwrap().len(), 1);
        assert_eq!(l.images, Some(vec!["https://a/1.jpg".to_string()]));
        assert!(l.mls.is_none());
    }

    #[test]
    fn wrong_typed_fields_are_dropped_not_fatal() {
        let rec: RawListingRecord = serde_json::from_value(json!({
            "url": "https://x/3",
            "price": {"amount": 1},
            "features": "Pool: Yes",
            "images": ["https://a/1.jpg", 7, null],
            "description": "  Nice  "
        }))
        .unwrap();
        let RawListingRecord::Listing(l) = rec else { panic!("expected listing") };
        assert!(l.price.is_none());
        assert!(l.features.is_none());
        assert_eq!(l.images, Some(vec!["https://a/1.jpg".to_string()]));
        assert_eq!(l.description, Some(Scalar::from("  Nice  ")));
    }

    #[test]
    fn incomplete_feature_pairs_are_skipped() {
        let rec = RawListingRecord::from_map(
            json!({"url": "u", "features": [{"label": "Lot"}, null, {"label": "Pool", "value": "Yes"}]})
                .as_object()
                .cloned()
                .unwrap(),
        );
        let RawListingRecord::Listing(l) = rec else { panic!("expected listing") };
        assert_eq!(l.features, Some(vec![Feature { label: "Pool".into(), value: "Yes".into() }]));
    }

    #[test]
    fn non_string_error_is_rendered() {
        let rec: RawListingRecord = serde_json::from_value(json!({"url": "u", "error": 500})).unwrap();
        assert_eq!(rec, RawListingRecord::failed("u", "500"));
    }

    #[test]
    fn jsonl_keeps_order_and_flags_bad_lines() {
        let text = "{\"url\": \"a\", \"price\": \"$1\"}\n\n[1]\nnot json\n{\"url\": \"b\", \"error\": \"boom\"}\n";
        let recs = from_jsonl(text);
        assert_eq!(recs.len(), 4);
        assert_eq!(recs[0].url(), "a");
        assert!(!recs[0].is_failed());
        assert!(matches!(&recs[1], RawListingRecord::Failed { error, .. } if error.starts_with("line 3: expected an object")));
        assert!(matches!(&recs[2], RawListingRecord::Failed { error, .. } if error.starts_with("line 4: ")));
        assert_eq!(recs[3], RawListingRecord::failed("b", "boom"));
    }

    #[test]
    fn jsonl_written_then_read_is_unchanged() {
        let recs = vec![
            RawListingRecord::Listing(Listing { url: "a".into(), bedrooms: Some(Scalar::from("3")), ..Default::default() }),
            RawListingRecord::failed("b", "Navigation failed: x"),
        ];
        let text = to_jsonl(&recs).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert_eq!(from_jsonl(&text), recs);
    }

    #[test]
    fn null_error_is_an_empty_failure() {
        let recs = from_jsonl("{\"url\":\"u\",\"error\":null,\"price\":\"$1\"}");
        assert_eq!(recs, vec![RawListingRecord::failed("u", "")]);
    }

    #[test]
    fn blank_scalars() {
        assert!(Scalar::from("").is_blank());
        assert!(!Scalar::from(" ").is_blank());
        assert!(Scalar::Number(Number::from(0)).is_blank());
        assert!(!Scalar::Number(Number::from(2)).is_blank());
        assert!(Scalar::Flag(false).is_blank());
    }

    #[test]
    fn serializes_back_to_the_flat_shape() {
        let rec = RawListingRecord::Listing(Listing {
            url: "u".into(),
            kind: Some(Scalar::from("House")),
            ..Default::default()
        });
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v, json!({"url": "u", "type": "House"}));
        let failed = serde_json::to_value(RawListingRecord::failed("u", "boom")).unwrap();
        assert_eq!(failed, json!({"url": "u", "error": "boom"}));
    }
}
