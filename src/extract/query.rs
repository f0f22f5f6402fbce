// In-page side of the extractor. Only the JSON shape these functions return is relied on;
// the selectors are specific to the IDX widget the listings are embedded with.
use std::sync::LazyLock;

use serde_json::json;

use crate::record::MISSING;

/// Plain text fields: output key and the selector inside the shadow root.
pub const TEXT_FIELDS: &[(&str, &str)] = &[
    ("listing_number", ".listing-number p"),
    ("price", ".list-price span:last-of-type"),
    ("bedrooms", ".bedrooms p"),
    ("bathrooms", ".bathrooms p"),
    ("square_feet", ".square-feet p"),
    ("description", ".listing-description p"),
];

/// Street line and city line, joined with ", ".
pub const ADDRESS_LINES: [&str; 2] = [".listing-address-1", ".listing-address-2"];

pub const FEATURE_ROW: &str = ".feature-body .ui-grid-container";
pub const FEATURE_LABEL: &str = ".feature-label p";
pub const FEATURE_VALUE: &str = ".feature-value p";

pub const GALLERY_IMAGE: &str = ".listing-photo-carousel img";
/// Inline placeholders the carousel uses before lazy images load.
pub const INLINE_IMAGE_PREFIX: &str = "data:image/";

/// `this` is the host element; true when it has an open shadow root.
pub const SHADOW_ROOT_PROBE: &str = "function() { return this.shadowRoot !== null; }";

const LISTING_QUERY_TEMPLATE: &str = r#"function() {
  const q = __QUERY__;
  const root = this.shadowRoot;
  if (!root) { throw new Error('ShadowRoot not found'); }
  const text = (scope, sel) => { const el = scope.querySelector(sel); return el ? el.innerText : null; };

  const out = {};
  for (const [key, sel] of q.text) { out[key] = text(root, sel) || q.missing; }
  out.address = (text(root, q.address[0]) || '') + ', ' + (text(root, q.address[1]) || q.missing);

  out.features = [];
  for (const row of root.querySelectorAll(q.features.row)) {
    const label = (text(row, q.features.label) || '').trim();
    const value = (text(row, q.features.value) || '').trim();
    if (label && value) { out.features.push({ label, value }); }
  }

  out.images = Array.from(root.querySelectorAll(q.images.selector), img => img.src)
    .filter(src => src && !src.startsWith(q.images.skip_prefix));
  return out;
}"#;

static LISTING_QUERY: LazyLock<String> = LazyLock::new(|| {
    let query = json!({
        "missing": MISSING,
        "text": TEXT_FIELDS,
        "address": ADDRESS_LINES,
        "features": { "row": FEATURE_ROW, "label": FEATURE_LABEL, "value": FEATURE_VALUE },
        "images": { "selector": GALLERY_IMAGE, "skip_prefix": INLINE_IMAGE_PREFIX },
    });
    LISTING_QUERY_TEMPLATE.replace("__QUERY__", &query.to_string())
});

/// Function called with `this` bound to the shadow host; returns the listing fields.
pub fn listing_query() -> &'static str {
    LISTING_QUERY.as_str()
}
