use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Entity category label
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityLabel {
    Person,
    Norp,
    Facility,
    Organization,
    Gpe,
    Location,
    Product,
    Event,
    WorkOfArt,
    Law,
    Language,
    Date,
    Time,
    Percent,
    Money,
    Quantity,
    Ordinal,
    Cardinal,
    Misc,
    /// Any label outside the built-in vocabulary, kept verbatim.
    Other(String),
}

impl EntityLabel {
    pub fn as_str(&self) -> &str {
        match self {
            EntityLabel::Person => "PERSON",
            EntityLabel::Norp => "NORP",
            EntityLabel::Facility => "FAC",
            EntityLabel::Organization => "ORG",
            EntityLabel::Gpe => "GPE",
            EntityLabel::Location => "LOC",
            EntityLabel::Product => "PRODUCT",
            EntityLabel::Event => "EVENT",
            EntityLabel::WorkOfArt => "WORK_OF_ART",
            EntityLabel::Law => "LAW",
            EntityLabel::Language => "LANGUAGE",
            EntityLabel::Date => "DATE",
            EntityLabel::Time => "TIME",
            EntityLabel::Percent => "PERCENT",
            EntityLabel::Money => "MONEY",
            EntityLabel::Quantity => "QUANTITY",
            EntityLabel::Ordinal => "ORDINAL",
            EntityLabel::Cardinal => "CARDINAL",
            EntityLabel::Misc => "MISC",
            EntityLabel::Other(label) => label,
        }
    }

    /// Background colour used when highlighting this label.
    pub fn color(&self) -> &'static str {
        match self {
            EntityLabel::Person => "#aa9cfc",
            EntityLabel::Norp => "#c887fb",
            EntityLabel::Facility => "#9cc9cc",
            EntityLabel::Organization => "#7aecec",
            EntityLabel::Gpe => "#feca74",
            EntityLabel::Location => "#ff9561",
            EntityLabel::Product => "#bfeeb7",
            EntityLabel::Event => "#ffeb80",
            EntityLabel::WorkOfArt => "#f0d0ff",
            EntityLabel::Law | EntityLabel::Language => "#ff8197",
            EntityLabel::Date | EntityLabel::Time => "#bfe1d9",
            EntityLabel::Percent
            | EntityLabel::Money
            | EntityLabel::Quantity
            | EntityLabel::Ordinal
            | EntityLabel::Cardinal => "#e4e7d2",
            EntityLabel::Misc | EntityLabel::Other(_) => "#ddd",
        }
    }
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact, case-sensitive code lookup. Unknown codes are kept verbatim as `Other`.
impl From<&str> for EntityLabel {
    fn from(s: &str) -> Self {
        match s {
            "PERSON" => EntityLabel::Person,
            "NORP" => EntityLabel::Norp,
            "FAC" => EntityLabel::Facility,
            "ORG" => EntityLabel::Organization,
            "GPE" => EntityLabel::Gpe,
            "LOC" => EntityLabel::Location,
            "PRODUCT" => EntityLabel::Product,
            "EVENT" => EntityLabel::Event,
            "WORK_OF_ART" => EntityLabel::WorkOfArt,
            "LAW" => EntityLabel::Law,
            "LANGUAGE" => EntityLabel::Language,
            "DATE" => EntityLabel::Date,
            "TIME" => EntityLabel::Time,
            "PERCENT" => EntityLabel::Percent,
            "MONEY" => EntityLabel::Money,
            "QUANTITY" => EntityLabel::Quantity,
            "ORDINAL" => EntityLabel::Ordinal,
            "CARDINAL" => EntityLabel::Cardinal,
            "MISC" => EntityLabel::Misc,
            other => EntityLabel::Other(other.to_string()),
        }
    }
}

impl Serialize for EntityLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntityLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(EntityLabel::from(label.as_str()))
    }
}

/// Pipeline stage that produced a span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntitySource {
    Ruler,
    Model,
}

/// A recognized entity: its text, label and byte range `[start, end)` in the processed text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub text: String,
    pub label: EntityLabel,
    pub start: usize,
    pub end: usize,
    pub source: EntitySource,
}

impl EntitySpan {
    /// Build a span over `text[start..end]`.
    pub fn new(
        text: &str,
        start: usize,
        end: usize,
        label: EntityLabel,
        source: EntitySource,
    ) -> Self {
        EntitySpan {
            text: text[start..end].to_string(),
            label,
            start,
            end,
            source,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn overlaps(&self, other: &EntitySpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn as_pair(&self) -> (String, String) {
        (self.text.clone(), self.label.to_string())
    }
}

/// Processed text with its entities ordered by start offset. Entities never overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doc {
    pub text: String,
    pub ents: Vec<EntitySpan>,
}

impl Doc {
    pub fn new(text: &str, mut ents: Vec<EntitySpan>) -> Self {
        ents.sort_by_key(|e| (e.start, e.end));
        Doc {
            text: text.to_string(),
            ents,
        }
    }

    pub fn has_entities(&self) -> bool {
        !self.ents.is_empty()
    }

    /// (entity text, label) pairs in document order.
    pub fn entity_pairs(&self) -> Vec<(String, String)> {
        self.ents.iter().map(EntitySpan::as_pair).collect()
    }

    pub fn get_entities_by_label(&self, label: &EntityLabel) -> Vec<&EntitySpan> {
        self.ents.iter().filter(|e| &e.label == label).collect()
    }
}
