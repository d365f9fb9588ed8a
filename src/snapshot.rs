use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::Offset;

/// Everything the editor exports. Every key is always written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSnapshot {
    pub top_labels: Vec<String>,
    pub values: Vec<f64>,
    pub level_labels: Vec<Vec<String>>,
    pub top_label_offsets: Vec<Offset>,
    pub level_label_offsets: Vec<Vec<Offset>>,
}

/// An imported configuration. Absent (or `null`) keys leave the current state alone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialSnapshot {
    #[serde(default)]
    pub top_labels: Option<Vec<String>>,
    #[serde(default)]
    pub values: Option<Vec<f64>>,
    #[serde(default)]
    pub level_labels: Option<Vec<Vec<String>>>,
    #[serde(default)]
    pub top_label_offsets: Option<Vec<Offset>>,
    #[serde(default)]
    pub level_label_offsets: Option<Vec<Vec<Offset>>>,
}

impl PartialSnapshot {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

impl From<ConfigSnapshot> for PartialSnapshot {
    fn from(full: ConfigSnapshot) -> Self {
        Self {
            top_labels: Some(full.top_labels),
            values: Some(full.values),
            level_labels: Some(full.level_labels),
            top_label_offsets: Some(full.top_label_offsets),
            level_label_offsets: Some(full.level_label_offsets),
        }
    }
}

impl ConfigSnapshot {
    /// Pretty-printed JSON, two-space indent.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Ladder, LadderState};

    #[test]
    fn export_writes_all_five_keys() {
        let json = LadderState::default().snapshot().to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "topLabels",
            "values",
            "levelLabels",
            "topLabelOffsets",
            "levelLabelOffsets",
        ] {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert!(json.contains("\n  \"topLabels\""));
    }

    #[test]
    fn values_only_import_leaves_other_fields() {
        let mut ladder = Ladder::default();
        let before = ladder.state().clone();

        let snapshot = PartialSnapshot::from_json(r#"{"values":[1,2,3,4,5]}"#).unwrap();
        ladder.replace_all(snapshot);

        let after = ladder.state();
        assert_eq!(*after.values, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(after.top_labels, before.top_labels);
        assert_eq!(after.level_labels, before.level_labels);
        assert_eq!(after.top_label_offsets, before.top_label_offsets);
        assert_eq!(after.level_label_offsets, before.level_label_offsets);
    }

    #[test]
    fn null_keys_count_as_absent() {
        let snapshot = PartialSnapshot::from_json(r#"{"topLabels":null}"#).unwrap();
        assert_eq!(snapshot, PartialSnapshot::default());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(PartialSnapshot::from_json("{ not json").is_err());
        assert!(PartialSnapshot::from_json(r#"{"values":"high"}"#).is_err());
    }

    #[test]
    fn export_then_import_is_identity() {
        let mut source = Ladder::default();
        source.set_axis_value(2, 4.7).unwrap();
        source.set_axis_label(0, "Craft & <Code>").unwrap();
        source
            .set_level_label_offset(3, 1, Offset::new(-7.25, 2.5))
            .unwrap();

        let json = source.state().snapshot().to_json_pretty().unwrap();
        let mut target = Ladder::default();
        target.replace_all(PartialSnapshot::from_json(&json).unwrap());

        assert_eq!(target.state(), source.state());
        assert_eq!(target.state().snapshot().to_json_pretty().unwrap(), json);
    }

    #[test]
    fn imported_values_are_normalized() {
        let mut ladder = Ladder::default();
        ladder.replace_all(PartialSnapshot::from_json(r#"{"values":[0, 9, 2.46]}"#).unwrap());
        assert_eq!(*ladder.state().values, vec![1.0, 5.0, 2.5]);
    }
}
