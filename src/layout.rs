use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::geometry::Region;
use crate::types::idtype;

idtype!(ColumnId);

/// Operator-supplied description of the answer columns on a sheet. Each
/// column is scored independently against the same scanned image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetLayout {
    pub columns: Vec<ColumnTemplate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnTemplate {
    pub id: ColumnId,
    pub region: Region,
    pub num_rows: i32,
    pub confidence_threshold: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_sheet_layout() {
        let json = r#"{
            "columns": [
                {
                    "id": "col-1",
                    "region": { "x": 12.0, "y": 34.5, "w": 120.0, "h": 600.0 },
                    "numRows": 20,
                    "confidenceThreshold": 0.25
                },
                {
                    "id": "col-2",
                    "region": { "x": 150.0, "y": 34.5, "w": 120.0, "h": 600.0 },
                    "numRows": 15,
                    "confidenceThreshold": 0.3
                }
            ]
        }"#;

        let layout: SheetLayout = serde_json::from_str(json).unwrap();
        assert_eq!(layout.columns.len(), 2);
        assert_eq!(layout.columns[0].id, ColumnId::from("col-1".to_string()));
        assert_eq!(layout.columns[0].num_rows, 20);
        assert_eq!(layout.columns[1].region.x, 150.0);
        assert_eq!(layout.columns[1].confidence_threshold, 0.3);
    }

    #[test]
    fn rejects_a_layout_with_missing_fields() {
        let json = r#"{ "columns": [ { "id": "col-1" } ] }"#;
        assert!(serde_json::from_str::<SheetLayout>(json).is_err());
    }
}
