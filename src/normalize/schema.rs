use crate::record::{Feature, Listing, Scalar};

pub const TYPE_CHOICES: &[&str] = &["House", "Condo/Townhouse", "Land Only"];

pub const SUBTYPE_CHOICES: &[&str] = &[
    "House/Single Family",
    "Apartment/Condo",
    "Townhouse",
    "1/2 Duplex",
    "Manufactured with Land",
];

/// Columns appended after the mapped fields on every row.
pub const URL_COLUMN: &str = "url";
pub const ERROR_COLUMN: &str = "error";

/// Where a column's value comes from in a scraped listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceField {
    Price,
    Address,
    Description,
    Bedrooms,
    Bathrooms,
    SquareFeet,
    Age,
    ListingStyle,
    LotSize,
    Taxes,
    Fees,
    Features,
    Mls,
    Type,
    Subtype,
    Images,
}

/// A borrowed source value, before any column rule is applied.
#[derive(Clone, Copy, Debug)]
pub enum SourceValue<'a> {
    Scalar(&'a Scalar),
    Features(&'a [Feature]),
    Images(&'a [String]),
}

impl SourceField {
    pub fn lookup(self, l: &Listing) -> Option<SourceValue<'_>> {
        let scalar = match self {
            SourceField::Features => return l.features.as_deref().map(SourceValue::Features),
            SourceField::Images => return l.images.as_deref().map(SourceValue::Images),
            SourceField::Price => &l.price,
            SourceField::Address => &l.address,
            SourceField::Description => &l.description,
            SourceField::Bedrooms => &l.bedrooms,
            SourceField::Bathrooms => &l.bathrooms,
            SourceField::SquareFeet => &l.square_feet,
            SourceField::Age => &l.age,
            SourceField::ListingStyle => &l.listing_style,
            SourceField::LotSize => &l.lot_size,
            SourceField::Taxes => &l.taxes,
            SourceField::Fees => &l.fees,
            SourceField::Mls => &l.mls,
            SourceField::Type => &l.kind,
            SourceField::Subtype => &l.subtype,
        };
        scalar.as_ref().map(SourceValue::Scalar)
    }
}

impl SourceValue<'_> {
    pub fn is_blank(&self) -> bool {
        match self {
            SourceValue::Scalar(s) => s.is_blank(),
            SourceValue::Features(f) => f.is_empty(),
            SourceValue::Images(i) => i.is_empty(),
        }
    }
}

/// Allow-list for an enumerated column. Matching is exact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChoiceSet(pub &'static [&'static str]);

impl ChoiceSet {
    pub fn resolve(&self, value: &str) -> Option<&'static str> {
        self.0.iter().copied().find(|c| *c == value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellRule {
    /// Trimmed text; numbers and booleans are written as-is.
    Text,
    /// `label: value` pairs joined with "; ".
    Features,
    Choice(ChoiceSet),
    /// Image URLs joined with ", ".
    Gallery,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldMapping {
    pub column: &'static str,
    pub source: SourceField,
    pub rule: CellRule,
}

/// Output columns in order, and how each one is filled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    pub fields: Vec<FieldMapping>,
}

impl Schema {
    /// The ACF field layout the exported table is imported into.
    pub fn acf() -> Self {
        use CellRule::*;
        use SourceField as F;
        let field = |column, source, rule| FieldMapping { column, source, rule };
        Schema {
            fields: vec![
                field("listing_price", F::Price, Text),
                field("listing_address", F::Address, Text),
                field("description", F::Description, Text),
                field("bedrooms", F::Bedrooms, Text),
                field("bathrooms", F::Bathrooms, Text),
                field("size", F::SquareFeet, Text),
                field("age", F::Age, Text),
                field("listing_style", F::ListingStyle, Text),
                field("lot_size", F::LotSize, Text),
                field("taxes", F::Taxes, Text),
                field("fees", F::Fees, Text),
                field("features_&_amenities", F::Features, Features),
                field("mls", F::Mls, Text),
                field("type", F::Type, Choice(ChoiceSet(TYPE_CHOICES))),
                field("subtype", F::Subtype, Choice(ChoiceSet(SUBTYPE_CHOICES))),
                field("gallery", F::Images, Gallery),
            ],
        }
    }

    pub fn columns(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|f| f.column)
            .chain([URL_COLUMN, ERROR_COLUMN])
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acf_header_order() {
        assert_eq!(
            Schema::acf().columns().join(","),
            "listing_price,listing_address,description,bedrooms,bathrooms,size,age,listing_style,\
             lot_size,taxes,fees,features_&_amenities,mls,type,subtype,gallery,url,error"
        );
    }

    #[test]
    fn choice_sets_match_exactly() {
        let types = ChoiceSet(TYPE_CHOICES);
        assert_eq!(types.resolve("Condo/Townhouse"), Some("Condo/Townhouse"));
        assert_eq!(types.resolve("Mobile Home"), None);
        assert_eq!(types.resolve("house"), None);
        assert_eq!(ChoiceSet(SUBTYPE_CHOICES).resolve("1/2 Duplex"), Some("1/2 Duplex"));
    }

    #[test]
    fn lookup_reads_the_mapped_field() {
        let l = Listing {
            square_feet: Some(Scalar::from("1,800")),
            images: Some(vec![]),
            ..Default::default()
        };
        assert!(matches!(SourceField::SquareFeet.lookup(&l), Some(SourceValue::Scalar(s)) if s.to_string() == "1,800"));
        assert!(SourceField::Images.lookup(&l).unwrap().is_blank());
        assert!(SourceField::Taxes.lookup(&l).is_none());
    }
}
