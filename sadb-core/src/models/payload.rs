use serde_json::{Map, Value, json};

///
/// Anything that can be stored in an annotation database renders itself to a JSON string.
///
pub trait JsonRender {
    fn json_string(&self) -> String;
}

/// Allele frequency observed in a population. `None` marks a frequency the source did not report.
#[derive(Debug, Clone, PartialEq)]
pub struct AlleleFrequency {
    pub frequency: Option<f64>,
}

/// Ancestral allele reported for a coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestralAllele {
    pub allele: String,
}

/// Second most frequent allele at a coordinate, chosen by arbitration over frequency items.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalMinorAllele {
    pub allele: String,
    pub frequency: f64,
}

/// Free-form source fields, e.g. from a custom annotation file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CustomAnnotation {
    pub fields: Map<String, Value>,
}

impl CustomAnnotation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }
}

///
/// Source-specific value carried by an [`AnnotationItem`](super::AnnotationItem).
///
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    AlleleFrequency(AlleleFrequency),
    AncestralAllele(AncestralAllele),
    GlobalMinorAllele(GlobalMinorAllele),
    Custom(CustomAnnotation),
    /// Pre-rendered JSON, e.g. read back from an intermediate file.
    Raw(String),
}

/// Groups payloads by the rule used to pick one value per coordinate in positional stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFamily {
    Frequency,
    Consensus,
    Other,
}

impl Payload {
    pub fn family(&self) -> PayloadFamily {
        match self {
            Payload::AlleleFrequency(_) => PayloadFamily::Frequency,
            Payload::AncestralAllele(_) => PayloadFamily::Consensus,
            Payload::GlobalMinorAllele(_) | Payload::Custom(_) | Payload::Raw(_) => {
                PayloadFamily::Other
            }
        }
    }
}

impl JsonRender for AlleleFrequency {
    fn json_string(&self) -> String {
        match self.frequency {
            Some(frequency) => json!(frequency).to_string(),
            None => Value::Null.to_string(),
        }
    }
}

impl JsonRender for AncestralAllele {
    fn json_string(&self) -> String {
        Value::String(self.allele.clone()).to_string()
    }
}

impl JsonRender for GlobalMinorAllele {
    fn json_string(&self) -> String {
        json!({
            "globalMinorAllele": self.allele,
            "globalMinorAlleleFrequency": self.frequency,
        })
        .to_string()
    }
}

impl JsonRender for CustomAnnotation {
    fn json_string(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }
}

impl JsonRender for Payload {
    fn json_string(&self) -> String {
        match self {
            Payload::AlleleFrequency(p) => p.json_string(),
            Payload::AncestralAllele(p) => p.json_string(),
            Payload::GlobalMinorAllele(p) => p.json_string(),
            Payload::Custom(p) => p.json_string(),
            Payload::Raw(json) => json.clone(),
        }
    }
}

impl JsonRender for String {
    fn json_string(&self) -> String {
        self.clone()
    }
}
