use super::schema::{CellRule, Schema, SourceValue};
use crate::record::{Feature, RawListingRecord, Scalar};

/// One cell per schema column, then `url` and `error`. Never shorter than the header.
pub type NormalizedRow = Vec<String>;

/// Rows in input order, every row as wide as `columns`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<NormalizedRow>,
}

impl Table {
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    #[cfg(test)]
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }
}

/// Maps raw records onto the column layout of a [`Schema`].
pub struct Normalizer {
    schema: Schema,
}

impl Normalizer {
    pub fn new(schema: Schema) -> Self {
        Normalizer { schema }
    }

    pub fn normalize(&self, records: &[RawListingRecord]) -> Table {
        Table {
            columns: self.schema.columns(),
            rows: records.iter().map(|r| self.row(r)).collect(),
        }
    }

    /// Mapped cells, then `url` and `error`. A failed record keeps only those two.
    pub fn row(&self, record: &RawListingRecord) -> NormalizedRow {
        let (listing, error) = match record {
            RawListingRecord::Failed { error, .. } => (None, error.as_str()),
            RawListingRecord::Listing(l) => (Some(l), ""),
        };
        let mut cells: NormalizedRow = self
            .schema
            .fields
            .iter()
            .map(|f| match listing {
                Some(l) => cell(&f.rule, f.source.lookup(l)),
                None => String::new(),
            })
            .collect();
        cells.push(record.url().to_string());
        cells.push(error.to_string());
        cells
    }
}

fn cell(rule: &CellRule, value: Option<SourceValue<'_>>) -> String {
    let Some(value) = value.filter(|v| !v.is_blank()) else { return String::new() };
    match (rule, value) {
        (CellRule::Text, SourceValue::Scalar(s)) => text(s),
        (CellRule::Features, SourceValue::Features(f)) => join_features(f),
        (CellRule::Gallery, SourceValue::Images(images)) => images.join(", "),
        (CellRule::Choice(set), SourceValue::Scalar(s)) => {
            s.as_text().and_then(|t| set.resolve(t)).unwrap_or_default().to_string()
        }
        // shape does not fit the column
        _ => String::new(),
    }
}

fn text(s: &Scalar) -> String {
    match s {
        Scalar::Text(t) => t.trim().to_string(),
        Scalar::Flag(true) => "True".to_string(),
        Scalar::Flag(false) => "False".to_string(),
        Scalar::Number(n) => n.to_string(),
    }
}

fn join_features(features: &[Feature]) -> String {
    features
        .iter()
        .map(|f| format!("{}: {}", f.label, f.value))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Number;

    use crate::record::Listing;

    fn listing(url: &str) -> Listing {
        Listing { url: url.to_string(), ..Default::default() }
    }

    fn normalizer() -> Normalizer { Normalizer::new(Schema::acf()) }

    fn one(record: RawListingRecord) -> Table { normalizer().normalize(&[record]) }

    #[test]
    fn features_are_joined_with_labels() {
        let t = one(RawListingRecord::Listing(Listing {
            features: Some(vec![
                Feature { label: "Lot".into(), value: "0.25 acres".into() },
                Feature { label: "Pool".into(), value: "Yes".into() },
            ]),
            ..listing("u")
        }));
        assert_eq!(t.cell(0, "features_&_amenities"), Some("Lot: 0.25 acres; Pool: Yes"));
    }

    #[test]
    fn gallery_is_comma_joined() {
        let t = one(RawListingRecord::Listing(Listing {
            images: Some(vec!["https://a/1.jpg".into(), "https://a/2.jpg".into()]),
            ..listing("u")
        }));
        assert_eq!(t.cell(0, "gallery"), Some("https://a/1.jpg, https://a/2.jpg"));
    }

    #[test]
    fn empty_lists_are_blank() {
        let t = one(RawListingRecord::Listing(Listing {
            images: Some(vec![]),
            features: Some(vec![]),
            ..listing("u")
        }));
        assert_eq!(t.cell(0, "gallery"), Some(""));
        assert_eq!(t.cell(0, "features_&_amenities"), Some(""));
    }

    #[test]
    fn type_and_subtype_only_keep_known_values() {
        let rows = normalizer().normalize(&[
            RawListingRecord::Listing(Listing {
                kind: Some(Scalar::from("Condo/Townhouse")),
                subtype: Some(Scalar::from("Manufactured with Land")),
                ..listing("a")
            }),
            RawListingRecord::Listing(Listing {
                kind: Some(Scalar::from("Mobile Home")),
                subtype: Some(Scalar::from("townhouse")),
                ..listing("b")
            }),
        ]);
        assert_eq!(rows.cell(0, "type"), Some("Condo/Townhouse"));
        assert_eq!(rows.cell(0, "subtype"), Some("Manufactured with Land"));
        assert_eq!(rows.cell(1, "type"), Some(""));
        assert_eq!(rows.cell(1, "subtype"), Some(""));
    }

    #[test]
    fn failed_record_only_fills_url_and_error() {
        let t = one(RawListingRecord::failed("https://x/9", "Navigation failed: boom"));
        let row = &t.rows[0];
        assert_eq!(row.len(), 18);
        assert!(row[..16].iter().all(String::is_empty));
        assert_eq!(t.cell(0, "url"), Some("https://x/9"));
        assert_eq!(t.cell(0, "error"), Some("Navigation failed: boom"));
    }

    #[test]
    fn missing_fields_are_blank_and_placeholder_passes_through() {
        let t = one(RawListingRecord::Listing(Listing {
            price: Some(Scalar::from("$450,000")),
            bathrooms: Some(Scalar::from("N/A")),
            ..listing("u")
        }));
        assert_eq!(t.cell(0, "listing_price"), Some("$450,000"));
        assert_eq!(t.cell(0, "bathrooms"), Some("N/A"));
        assert_eq!(t.cell(0, "taxes"), Some(""));
        assert_eq!(t.cell(0, "error"), Some(""));
    }

    #[test]
    fn text_is_trimmed_and_numbers_rendered() {
        let t = one(RawListingRecord::Listing(Listing {
            description: Some(Scalar::from("  Bright and airy.\n")),
            bedrooms: Some(Scalar::Number(Number::from(3))),
            age: Some(Scalar::Number(Number::from(0))),
            ..listing("u")
        }));
        assert_eq!(t.cell(0, "description"), Some("Bright and airy."));
        assert_eq!(t.cell(0, "bedrooms"), Some("3"));
        assert_eq!(t.cell(0, "age"), Some(""));
    }

    #[test]
    fn null_error_leaves_an_empty_error_cell() {
        let t = normalizer().normalize(&crate::record::from_jsonl("{\"url\":\"u\",\"error\":null}"));
        assert_eq!(t.cell(0, "url"), Some("u"));
        assert_eq!(t.cell(0, "error"), Some(""));
        assert_eq!(t.cell(0, "listing_price"), Some(""));
    }

    #[test]
    fn booleans_render_capitalized() {
        let t = one(RawListingRecord::Listing(Listing {
            bedrooms: Some(Scalar::Flag(true)),
            taxes: Some(Scalar::Flag(false)),
            ..listing("u")
        }));
        assert_eq!(t.cell(0, "bedrooms"), Some("True"));
        assert_eq!(t.cell(0, "taxes"), Some(""));
    }

    #[test]
    fn rows_follow_input_order() {
        let t = normalizer().normalize(&[
            RawListingRecord::Listing(listing("first")),
            RawListingRecord::failed("second", "x"),
            RawListingRecord::Listing(listing("third")),
        ]);
        let urls: Vec<_> = (0..3).filter_map(|i| t.cell(i, "url")).collect();
        assert_eq!(urls, vec!["first", "second", "third"]);
    }

    #[test]
    fn empty_batch_has_no_rows() {
        let t = normalizer().normalize(&[]);
        assert!(t.is_empty());
        assert_eq!(t.columns.len(), 18);
    }
}
