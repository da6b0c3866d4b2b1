//! Domain types that sit on top of the raw entities: the typed column
//! schema, remap tables, form cells and the in-memory value index.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::db::entities::{attribute_value, column_definition, item};
use crate::db::enums::ColumnKind;
use crate::error::ListError;

/// Serialises `i64` ids as strings so JavaScript consumers keep full
/// precision. Deserialisation accepts either form.
mod id_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(id: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(n),
            Raw::Text(s) => s.trim().parse().map_err(de::Error::custom),
        }
    }
}

/// The type of a custom column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Int { min: i64, max: i64 },
    /// Implicit bounds 0 to 5.
    Stars,
}

impl ColumnType {
    pub const DEFAULT_INT_MIN: i64 = i32::MIN as i64;
    pub const DEFAULT_INT_MAX: i64 = i32::MAX as i64;
    pub const STARS_MAX: f64 = 5.0;

    /// Builds an `Int` type, defaulting missing bounds to the 32-bit range.
    pub fn int(min: Option<i64>, max: Option<i64>) -> Result<Self, ListError> {
        let column_type = ColumnType::Int {
            min: min.unwrap_or(Self::DEFAULT_INT_MIN),
            max: max.unwrap_or(Self::DEFAULT_INT_MAX),
        };
        column_type.check()?;
        Ok(column_type)
    }

    /// Rejects an `Int` whose minimum is above its maximum. Such a column
    /// could never hold a value.
    pub fn check(&self) -> Result<(), ListError> {
        match *self {
            ColumnType::Int { min, max } if min > max => Err(ListError::InvalidInput(format!(
                "minimum {min} is greater than maximum {max}"
            ))),
            _ => Ok(()),
        }
    }

    /// Resolves a caller-supplied type spec into one of the three variants.
    pub fn from_spec(spec: &ColumnTypeSpec) -> Result<Self, ListError> {
        let kind: ColumnKind = spec.kind.parse().map_err(ListError::InvalidInput)?;
        match kind {
            ColumnKind::String => Ok(ColumnType::String),
            ColumnKind::Int => Self::int(spec.min, spec.max),
            ColumnKind::Stars => Ok(ColumnType::Stars),
        }
    }

    /// Rebuilds the type from its stored columns. Rows written before bounds
    /// were mandatory fall back to the default range.
    pub fn from_stored(kind: ColumnKind, min: Option<i64>, max: Option<i64>) -> Self {
        match kind {
            ColumnKind::String => ColumnType::String,
            ColumnKind::Int => ColumnType::Int {
                min: min.unwrap_or(Self::DEFAULT_INT_MIN),
                max: max.unwrap_or(Self::DEFAULT_INT_MAX),
            },
            ColumnKind::Stars => ColumnType::Stars,
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnType::String => ColumnKind::String,
            ColumnType::Int { .. } => ColumnKind::Int,
            ColumnType::Stars => ColumnKind::Stars,
        }
    }

    /// Bounds as persisted in `min_value` / `max_value`.
    pub fn stored_bounds(&self) -> (Option<i64>, Option<i64>) {
        match self {
            ColumnType::Int { min, max } => (Some(*min), Some(*max)),
            ColumnType::String | ColumnType::Stars => (None, None),
        }
    }
}

/// Untyped column type as it arrives from a form or API payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColumnTypeSpec {
    pub kind: String,
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub max: Option<i64>,
}

impl ColumnTypeSpec {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn with_bounds(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }
}

/// Maps a source-list column id to the matching destination-list column id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemapPair {
    #[serde(with = "id_string")]
    pub from_id: i64,
    #[serde(with = "id_string")]
    pub to_id: i64,
}

/// Ordered remap pairs produced by a column import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemapTable(Vec<RemapPair>);

impl RemapTable {
    pub fn push(&mut self, from_id: i64, to_id: i64) {
        self.0.push(RemapPair { from_id, to_id });
    }

    /// Destination id for a source column, if it was reconciled.
    pub fn lookup(&self, from_id: i64) -> Option<i64> {
        self.0
            .iter()
            .find(|pair| pair.from_id == from_id)
            .map(|pair| pair.to_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<RemapPair> for RemapTable {
    fn from_iter<I: IntoIterator<Item = RemapPair>>(iter: I) -> Self {
        RemapTable(iter.into_iter().collect())
    }
}

/// Addresses one cell of an item form: either a stored value row, or a
/// column the item has no value for yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "id", rename_all = "lowercase")]
pub enum CellRef {
    Existing(#[serde(with = "id_string")] i64),
    Pending(#[serde(with = "id_string")] i64),
}

/// One column of an item as shown in an edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemCell {
    pub definition: column_definition::Model,
    pub cell: CellRef,
    pub value: Option<String>,
}

/// Result of moving or copying an item into another list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovedItem {
    pub item: item::Model,
    /// Source column ids whose values had no remap entry and were not copied.
    pub dropped_definitions: Vec<i64>,
}

/// Values of a list keyed by `(item_id, definition_id)`.
#[derive(Debug, Clone, Default)]
pub struct AttributeIndex {
    cells: HashMap<(i64, i64), String>,
}

impl AttributeIndex {
    pub fn insert(&mut self, value: attribute_value::Model) {
        self.cells
            .insert((value.item_id, value.definition_id), value.value);
    }

    pub fn get(&self, item_id: i64, definition_id: i64) -> Option<&str> {
        self.cells
            .get(&(item_id, definition_id))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FromIterator<attribute_value::Model> for AttributeIndex {
    fn from_iter<I: IntoIterator<Item = attribute_value::Model>>(iter: I) -> Self {
        let mut index = AttributeIndex::default();
        for value in iter {
            index.insert(value);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_defaults_to_32_bit_range() {
        let ty = ColumnType::int(None, None).unwrap();
        assert_eq!(
            ty,
            ColumnType::Int {
                min: i32::MIN as i64,
                max: i32::MAX as i64
            }
        );
    }

    #[test]
    fn int_rejects_inverted_bounds() {
        let err = ColumnType::int(Some(10), Some(1)).unwrap_err();
        assert!(matches!(err, ListError::InvalidInput(_)));
        assert!(ColumnType::Int { min: 10, max: 1 }.check().is_err());
        assert!(ColumnType::Int { min: 3, max: 3 }.check().is_ok());
        assert!(ColumnType::Stars.check().is_ok());
    }

    #[test]
    fn spec_resolves_to_variant() {
        let spec = ColumnTypeSpec::new("int").with_bounds(Some(0), Some(100));
        assert_eq!(
            ColumnType::from_spec(&spec).unwrap(),
            ColumnType::Int { min: 0, max: 100 }
        );
        assert_eq!(
            ColumnType::from_spec(&ColumnTypeSpec::new("Stars")).unwrap(),
            ColumnType::Stars
        );
        assert!(matches!(
            ColumnType::from_spec(&ColumnTypeSpec::new("color")),
            Err(ListError::InvalidInput(_))
        ));
    }

    #[test]
    fn stored_round_trip_keeps_bounds() {
        let ty = ColumnType::Int { min: -5, max: 5 };
        let (min, max) = ty.stored_bounds();
        assert_eq!(ColumnType::from_stored(ty.kind(), min, max), ty);
        assert_eq!(
            ColumnType::from_stored(ColumnKind::Stars, None, None),
            ColumnType::Stars
        );
    }

    #[test]
    fn remap_pair_ids_serialise_as_strings() {
        let mut table = RemapTable::default();
        table.push(9_007_199_254_740_993, 2);
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"[{"fromId":"9007199254740993","toId":"2"}]"#);

        let back: RemapTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back.lookup(9_007_199_254_740_993), Some(2));
        assert_eq!(back.lookup(2), None);
    }

    #[test]
    fn cell_ref_accepts_numeric_ids() {
        let cell: CellRef = serde_json::from_str(r#"{"state":"pending","id":42}"#).unwrap();
        assert_eq!(cell, CellRef::Pending(42));
        assert_eq!(
            serde_json::to_string(&CellRef::Existing(7)).unwrap(),
            r#"{"state":"existing","id":"7"}"#
        );
    }

    #[test]
    fn attribute_index_is_keyed_by_item_and_column() {
        let index: AttributeIndex = [
            attribute_value::Model { id: 1, item_id: 10, definition_id: 2, value: "PC".into() },
            attribute_value::Model { id: 2, item_id: 10, definition_id: 1, value: "85".into() },
            attribute_value::Model { id: 3, item_id: 11, definition_id: 1, value: "70".into() },
        ]
        .into_iter()
        .collect();

        assert_eq!(index.len(), 3);
        assert_eq!(index.get(10, 2), Some("PC"));
        assert_eq!(index.get(10, 1), Some("85"));
        assert_eq!(index.get(11, 2), None);
    }
}
