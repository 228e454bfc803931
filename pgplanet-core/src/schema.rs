//! The compiled-in export schema and attribute tuples built against it.

use crate::AttributeList;

/// One exportable tag and the column it becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportColumn {
    /// Tag key, also used as the column name.
    pub name: &'static str,
    /// SQL column type.
    pub sql_type: &'static str,
    /// Whether a closed shape carrying this tag should become a polygon.
    pub polygon: bool,
}

const fn column(name: &'static str, polygon: bool) -> ExportColumn {
    ExportColumn {
        name,
        sql_type: "text",
        polygon,
    }
}

/// Exported columns in output order.
pub static EXPORT_COLUMNS: [ExportColumn; 12] = [
    column("name", false),
    column("place", false),
    column("landuse", true),
    column("leisure", true),
    column("natural", true),
    column("man_made", false),
    column("waterway", false),
    column("highway", false),
    column("railway", false),
    column("amenity", true),
    column("tourism", false),
    column("learning", false),
];

/// Normalise a tag key into a column-compatible name.
///
/// Colons and spaces become underscores.
///
/// # Examples
/// ```
/// use pgplanet_core::schema::normalise_tag_key;
///
/// assert_eq!(normalise_tag_key("addr:street name"), "addr_street_name");
/// ```
#[must_use]
pub fn normalise_tag_key(key: &str) -> String {
    key.replace([':', ' '], "_")
}

/// Schema-ordered `(column, value)` pairs exported for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeTuple {
    columns: Vec<(&'static ExportColumn, String)>,
    polygon: bool,
}

impl AttributeTuple {
    /// Scan the export schema against a record's tags.
    ///
    /// Every schema entry present in `tags` contributes one pair, in schema
    /// order. The polygon flag is the OR of the matched entries' flags.
    ///
    /// # Examples
    /// ```
    /// use pgplanet_core::{AttributeList, schema::AttributeTuple};
    ///
    /// let mut tags = AttributeList::default();
    /// tags.push("landuse", "forest");
    /// tags.push("name", "Wald");
    /// tags.push("source", "survey");
    ///
    /// let tuple = AttributeTuple::from_tags(&tags);
    /// let names: Vec<&str> = tuple.columns().map(|(column, _)| column.name).collect();
    /// assert_eq!(names, vec!["name", "landuse"]);
    /// assert!(tuple.polygon());
    /// ```
    #[must_use]
    pub fn from_tags(tags: &AttributeList) -> Self {
        let mut tuple = Self::default();
        for column in &EXPORT_COLUMNS {
            if let Some(value) = tags.get(column.name) {
                tuple.columns.push((column, value.to_owned()));
                tuple.polygon |= column.polygon;
            }
        }
        tuple
    }

    /// Whether no schema entry matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Whether any matched entry is polygon-capable.
    #[must_use]
    pub const fn polygon(&self) -> bool {
        self.polygon
    }

    /// Matched columns and their values in schema order.
    pub fn columns(&self) -> impl Iterator<Item = (&'static ExportColumn, &str)> + '_ {
        self.columns
            .iter()
            .map(|(column, value)| (*column, value.as_str()))
    }

    /// Unambiguous serialization used as the shape dedup key.
    ///
    /// Each pair is length-prefixed so no choice of values can make two
    /// different tuples serialize identically.
    #[must_use]
    pub fn canonical_text(&self) -> String {
        let mut text = String::new();
        for (column, value) in &self.columns {
            text.push_str(column.name);
            text.push(':');
            text.push_str(&value.len().to_string());
            text.push(':');
            text.push_str(value);
            text.push(';');
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tags(pairs: &[(&str, &str)]) -> AttributeList {
        let mut list = AttributeList::default();
        for (name, value) in pairs {
            list.push(*name, *value);
        }
        list
    }

    #[rstest]
    #[case("name", "name")]
    #[case("addr:city", "addr_city")]
    #[case("old name:en", "old_name_en")]
    fn normalises_keys(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalise_tag_key(raw), expected);
    }

    #[rstest]
    fn tuple_follows_schema_order_not_tag_order() {
        let tuple = AttributeTuple::from_tags(&tags(&[
            ("tourism", "museum"),
            ("highway", "footway"),
            ("name", "Altes Museum"),
        ]));
        let pairs: Vec<(&str, &str)> = tuple
            .columns()
            .map(|(column, value)| (column.name, value))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("name", "Altes Museum"),
                ("highway", "footway"),
                ("tourism", "museum"),
            ]
        );
        assert!(!tuple.polygon(), "none of the matched tags are areas");
    }

    #[rstest]
    fn unexported_tags_produce_empty_tuple() {
        let tuple = AttributeTuple::from_tags(&tags(&[("created_by", "JOSM")]));
        assert!(tuple.is_empty());
        assert_eq!(tuple.canonical_text(), "");
    }

    #[rstest]
    fn canonical_text_distinguishes_columns() {
        let by_name = AttributeTuple::from_tags(&tags(&[("name", "A")]));
        let by_place = AttributeTuple::from_tags(&tags(&[("place", "A")]));
        assert_ne!(by_name.canonical_text(), by_place.canonical_text());
    }

    #[rstest]
    fn canonical_text_is_length_prefixed() {
        let tuple = AttributeTuple::from_tags(&tags(&[("name", "a;b"), ("amenity", "cafe")]));
        assert_eq!(tuple.canonical_text(), "name:3:a;b;amenity:4:cafe;");
    }
}
