//! Response Assembly

use std::collections::HashMap;

use feature_engine::{FeatureVector, RawRecord};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::InferenceError;

/// Request keys that carry the observation date
const DATE_KEYS: [&str; 2] = ["Date", "date"];

/// A request record, as the client sent it, with the forecast attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictedRecord {
    /// The client's fields, keys and values untouched apart from the date
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    /// Forecast sales; `None` for rows that were not scored (closed stores)
    pub prediction: Option<f64>,
}

/// Undo the log1p target transform applied during training
pub fn inverse_target(raw: f64) -> f64 {
    raw.exp_m1()
}

/// Join raw model outputs onto the request objects by row index.
///
/// `sources[i]` is the JSON object `records[i]` was parsed from. The date is
/// rewritten as `YYYY-MM-DD`; every other field is echoed as received.
pub fn assemble(
    sources: Vec<Map<String, Value>>,
    records: &[RawRecord],
    features: &[FeatureVector],
    raw_predictions: Vec<f64>,
) -> Result<Vec<PredictedRecord>, InferenceError> {
    if features.len() != raw_predictions.len() {
        return Err(InferenceError::PredictionCountMismatch {
            features: features.len(),
            predictions: raw_predictions.len(),
        });
    }
    if sources.len() != records.len() {
        return Err(InferenceError::RecordCountMismatch {
            sources: sources.len(),
            records: records.len(),
        });
    }

    let by_row: HashMap<usize, f64> = features
        .iter()
        .zip(raw_predictions)
        .map(|(f, raw)| (f.row, inverse_target(raw)))
        .collect();

    Ok(sources
        .into_iter()
        .zip(records)
        .enumerate()
        .map(|(row, (mut fields, record))| {
            fields.remove("prediction");
            let date = record.date.format("%Y-%m-%d").to_string();
            for key in DATE_KEYS {
                if let Some(value) = fields.get_mut(key) {
                    *value = Value::String(date.clone());
                }
            }
            PredictedRecord {
                fields,
                prediction: by_row.get(&row).copied(),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::FEATURE_DIMENSION;
    use serde_json::json;

    fn source(store: i64) -> Map<String, Value> {
        let Value::Object(map) = json!({
            "Store": store,
            "DayOfWeek": 5,
            "Date": "2015-07-31T00:00:00",
            "Open": 1,
            "Promo": 1,
            "StateHoliday": "0",
            "SchoolHoliday": 1,
            "StoreType": "a",
            "Assortment": "a",
            "Promo2": 0,
            "PromoInterval": 0
        }) else {
            unreachable!()
        };
        map
    }

    fn parsed(sources: &[Map<String, Value>]) -> Vec<RawRecord> {
        sources
            .iter()
            .map(|s| serde_json::from_value(Value::Object(s.clone())).unwrap())
            .collect()
    }

    fn features(row: usize) -> FeatureVector {
        FeatureVector {
            row,
            values: [0.0; FEATURE_DIMENSION],
        }
    }

    #[test]
    fn test_inverse_target() {
        assert_eq!(inverse_target(0.0), 0.0);
        assert!((inverse_target(5000f64.ln_1p()) - 5000.0).abs() < 1e-6);
    }

    #[test]
    fn test_join_by_row_index() {
        let sources = vec![source(1), source(2), source(3)];
        let records = parsed(&sources);
        let feats = vec![features(0), features(2)];
        let raw = vec![0.0, 10f64.ln_1p()];

        let joined = assemble(sources, &records, &feats, raw).unwrap();
        assert_eq!(joined.len(), 3);
        assert_eq!(joined[0].prediction, Some(0.0));
        assert_eq!(joined[1].prediction, None);
        assert!((joined[2].prediction.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(joined[2].fields["Store"], json!(3));
    }

    #[test]
    fn test_count_mismatch_is_an_error() {
        let sources = vec![source(1)];
        let records = parsed(&sources);
        let err = assemble(sources, &records, &[features(0)], vec![]).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::PredictionCountMismatch {
                features: 1,
                predictions: 0
            }
        ));

        let records = parsed(&[source(1)]);
        let err = assemble(vec![], &records, &[], vec![]).unwrap_err();
        assert!(matches!(err, InferenceError::RecordCountMismatch { .. }));
    }

    #[test]
    fn test_serialized_shape() {
        let sources = vec![source(7)];
        let records = parsed(&sources);
        let joined = assemble(sources, &records, &[features(0)], vec![0.0]).unwrap();
        let value = serde_json::to_value(&joined).unwrap();

        assert_eq!(value[0]["Store"], json!(7));
        assert_eq!(value[0]["Date"], json!("2015-07-31"));
        assert_eq!(value[0]["PromoInterval"], json!(0));
        assert_eq!(value[0]["prediction"], json!(0.0));
        assert!(value[0].get("CompetitionDistance").is_none());
    }

    #[test]
    fn test_snake_case_record_echoed_as_sent() {
        let input = json!({
            "store": 1,
            "day_of_week": 5,
            "date": "2015-07-31T00:00:00.000Z",
            "open": 1,
            "promo": 1,
            "state_holiday": 0,
            "school_holiday": 1,
            "store_type": "a",
            "assortment": "a",
            "competition_distance": 1270,
            "promo2": 0,
            "promo_interval": 0,
            "Id": 12
        });
        let Value::Object(map) = input.clone() else {
            unreachable!()
        };
        let records = parsed(&[map.clone()]);
        let joined = assemble(vec![map], &records, &[features(0)], vec![0.0]).unwrap();
        let mut out = serde_json::to_value(&joined).unwrap();
        let mut out = out[0].take();

        assert_eq!(out["date"], json!("2015-07-31"));
        assert_eq!(out["prediction"], json!(0.0));
        assert!(out.get("Store").is_none());
        assert!(out.get("CompetitionOpenSinceMonth").is_none());

        let object = out.as_object_mut().unwrap();
        object.remove("prediction");
        object.insert("date".to_string(), input["date"].clone());
        assert_eq!(out, input);
    }

    #[test]
    fn test_unscored_row_serializes_null_prediction() {
        let sources = vec![source(7)];
        let records = parsed(&sources);
        let joined = assemble(sources, &records, &[], vec![]).unwrap();
        let value = serde_json::to_value(&joined).unwrap();
        assert_eq!(value[0]["prediction"], json!(null));
    }

    #[test]
    fn test_client_prediction_field_is_replaced() {
        let mut with_prediction = source(1);
        with_prediction.insert("prediction".to_string(), json!("stale"));
        let records = parsed(&[with_prediction.clone()]);
        let joined = assemble(vec![with_prediction], &records, &[], vec![]).unwrap();
        let value = serde_json::to_value(&joined).unwrap();
        assert_eq!(value[0]["prediction"], json!(null));
    }
}
