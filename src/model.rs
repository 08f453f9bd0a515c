use serde::{Deserialize, Serialize};

/// Attribution for one source: normalized importance and normalized
/// position-weighted word count, both in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScorePair {
    pub importance: f64,
    pub position_weighted_word_count: f64,
}

impl ScorePair {
    pub fn new(importance: f64, position_weighted_word_count: f64) -> Self {
        Self {
            importance,
            position_weighted_word_count,
        }
    }
}

impl From<(f64, f64)> for ScorePair {
    fn from((importance, position_weighted_word_count): (f64, f64)) -> Self {
        Self::new(importance, position_weighted_word_count)
    }
}

/// Percentage change of a [`ScorePair`] after an edit. Either component can
/// be `f64::INFINITY` when the old value was zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DeltaPair {
    #[serde(with = "lossless_f64")]
    pub importance_delta_pct: f64,
    #[serde(with = "lossless_f64")]
    pub word_count_delta_pct: f64,
}

impl DeltaPair {
    pub fn new(importance_delta_pct: f64, word_count_delta_pct: f64) -> Self {
        Self {
            importance_delta_pct,
            word_count_delta_pct,
        }
    }
}

impl From<(f64, f64)> for DeltaPair {
    fn from((importance_delta_pct, word_count_delta_pct): (f64, f64)) -> Self {
        Self::new(importance_delta_pct, word_count_delta_pct)
    }
}

/// A row that contributes one chosen delta to an aggregate.
pub trait DeltaRow {
    fn deltas(&self) -> &[DeltaPair];
    fn chosen_index(&self) -> Option<i64>;

    fn batch_id(&self) -> Option<usize> {
        None
    }
}

impl<R: DeltaRow> DeltaRow for &R {
    fn deltas(&self) -> &[DeltaPair] {
        (**self).deltas()
    }

    fn chosen_index(&self) -> Option<i64> {
        (**self).chosen_index()
    }

    fn batch_id(&self) -> Option<usize> {
        (**self).batch_id()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<usize>,
    pub deltas: Vec<DeltaPair>,
    #[serde(default)]
    pub chosen_index: Option<i64>,
}

impl DeltaRow for ExperimentRow {
    fn deltas(&self) -> &[DeltaPair] {
        &self.deltas
    }

    fn chosen_index(&self) -> Option<i64> {
        self.chosen_index
    }

    fn batch_id(&self) -> Option<usize> {
        self.batch_id
    }
}

/// Scores of one experiment row before and after its chosen source was edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<usize>,
    pub scores_before: Vec<ScorePair>,
    pub scores_after: Vec<ScorePair>,
    #[serde(default)]
    pub chosen_index: Option<i64>,
}

/// One response together with the sources it was generated from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub response: String,
    pub sources: Vec<String>,
}

/// Serde codec for `f64` that keeps non-finite values.
///
/// JSON has no literal for infinity or NaN, so those are written as the
/// strings `"Infinity"`, `"-Infinity"` and `"NaN"`. Finite values stay numbers.
pub mod lossless_f64 {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_sign_positive() {
            serializer.serialize_str("Infinity")
        } else {
            serializer.serialize_str("-Infinity")
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Encoded {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Encoded::deserialize(deserializer)? {
            Encoded::Number(value) => Ok(value),
            Encoded::Text(text) => parse_non_finite(&text)
                .ok_or_else(|| D::Error::custom(format!("invalid float literal: {text}"))),
        }
    }

    fn parse_non_finite(text: &str) -> Option<f64> {
        match text.trim().to_ascii_lowercase().as_str() {
            "infinity" | "+infinity" | "inf" | "+inf" => Some(f64::INFINITY),
            "-infinity" | "-inf" => Some(f64::NEG_INFINITY),
            "nan" => Some(f64::NAN),
            _ => None,
        }
    }
}
