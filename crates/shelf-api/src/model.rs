// ── Catalog wire model ──
//
// Items are opaque records: only `id` is interpreted, every other field is
// carried through verbatim (and in source order) for the presentation layer.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a catalog item.
///
/// Catalog backends disagree on whether ids are numbers or strings;
/// both round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// A single catalog entry as returned by the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,

    /// Every field other than `id`, untouched.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CatalogItem {
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_owned(), value.into());
        self
    }

    /// Look up a string-valued field.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.text("name")
    }

    pub fn href(&self) -> Option<&str> {
        self.text("href")
    }

    pub fn image_src(&self) -> Option<&str> {
        self.text("imageSrc")
    }

    pub fn image_alt(&self) -> Option<&str> {
        self.text("imageAlt")
    }

    /// Price as display text. Backends send either `"48R"` or `48.0`.
    pub fn price(&self) -> Option<String> {
        match self.fields.get("price")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_and_string_ids_deserialize() {
        let items: Vec<CatalogItem> =
            serde_json::from_value(json!([{ "id": 1 }, { "id": "sku-2" }])).unwrap();
        assert_eq!(items[0].id, ItemId::Number(1));
        assert_eq!(items[1].id, ItemId::Text("sku-2".into()));
        assert_eq!(items[1].id.to_string(), "sku-2");
    }

    #[test]
    fn unknown_fields_are_preserved_in_order() {
        let item: CatalogItem = serde_json::from_value(json!({
            "id": 7,
            "name": "Brass Scissors",
            "zeta": true,
            "alpha": { "nested": [1, 2] },
        }))
        .unwrap();

        let keys: Vec<&str> = item.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, ["name", "zeta", "alpha"]);
        assert_eq!(item.fields["alpha"], json!({ "nested": [1, 2] }));
        assert_eq!(item.name(), Some("Brass Scissors"));
    }

    #[test]
    fn price_accepts_text_or_number() {
        let text = CatalogItem::new(1_i64).with("price", "48R");
        let number = CatalogItem::new(2_i64).with("price", 35.5);
        let missing = CatalogItem::new(3_i64);

        assert_eq!(text.price().as_deref(), Some("48R"));
        assert_eq!(number.price().as_deref(), Some("35.5"));
        assert_eq!(missing.price(), None);
    }

    #[test]
    fn missing_id_is_rejected() {
        let result: Result<CatalogItem, _> = serde_json::from_value(json!({ "name": "x" }));
        assert!(result.is_err());
    }
}
