//! Group-merge: collapsing reduction records that share an (area, date) key
//! into one row carrying the union of their bands.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::types::{MergedRecord, ReductionRecord};

/// Groups records by (area, date) and folds each group's band maps into one
/// [`MergedRecord`]. Within a group the fold follows encounter order, and a
/// band defined by two records keeps the later record's value. Output is
/// sorted by (area, date).
pub fn merge_records(records: Vec<ReductionRecord>) -> Vec<MergedRecord> {
    let mut groups: BTreeMap<(String, NaiveDate), MergedRecord> = BTreeMap::new();

    for record in records {
        let merged = groups
            .entry((record.area.clone(), record.date))
            .or_insert_with(|| MergedRecord {
                area: record.area.clone(),
                date: record.date,
                bands: BTreeMap::new(),
            });
        // Last write wins on duplicate band names.
        merged.bands.extend(record.bands);
    }

    groups.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(area: &str, date: &str, bands: &[(&str, f64)]) -> ReductionRecord {
        ReductionRecord {
            area: area.to_string(),
            date: date.parse().unwrap(),
            bands: bands
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect(),
        }
    }

    #[test]
    fn test_multi_dataset_records_merge_into_one_row() {
        let merged = merge_records(vec![
            record("Park A", "2020-06-01", &[("D_t", 10.0)]),
            record("Park A", "2020-06-01", &[("E_p", 5.0)]),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].area, "Park A");
        assert_eq!(merged[0].date.to_string(), "2020-06-01");
        assert_eq!(merged[0].bands.get("D_t"), Some(&10.0));
        assert_eq!(merged[0].bands.get("E_p"), Some(&5.0));
    }

    #[test]
    fn test_every_record_lands_in_exactly_one_group() {
        let merged = merge_records(vec![
            record("Park A", "2020-06-01", &[("D_t", 1.0)]),
            record("Park A", "2020-06-02", &[("D_t", 2.0)]),
            record("Park B", "2020-06-01", &[("D_t", 3.0)]),
        ]);

        assert_eq!(merged.len(), 3);
        let total_bands: usize = merged.iter().map(|m| m.bands.len()).sum();
        assert_eq!(total_bands, 3);
    }

    #[test]
    fn test_duplicate_band_keeps_later_value() {
        let merged = merge_records(vec![
            record("Park A", "2020-06-01", &[("X", 1.0)]),
            record("Park A", "2020-06-01", &[("X", 2.0)]),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].bands.get("X"), Some(&2.0));
    }

    #[test]
    fn test_absent_bands_stay_absent() {
        let merged = merge_records(vec![
            record("Park A", "2020-06-01", &[("D_t", 10.0)]),
            record("Park A", "2020-06-01", &[]),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].bands.len(), 1);
        assert!(!merged[0].bands.contains_key("Y"));
    }

    #[test]
    fn test_output_is_sorted_by_area_then_date() {
        let merged = merge_records(vec![
            record("Park B", "2020-06-01", &[("D_t", 1.0)]),
            record("Park A", "2020-06-02", &[("D_t", 2.0)]),
            record("Park A", "2020-06-01", &[("D_t", 3.0)]),
        ]);

        let keys: Vec<(String, String)> = merged
            .iter()
            .map(|m| (m.area.clone(), m.date.to_string()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Park A".to_string(), "2020-06-01".to_string()),
                ("Park A".to_string(), "2020-06-02".to_string()),
                ("Park B".to_string(), "2020-06-01".to_string()),
            ]
        );
    }

    #[test]
    fn test_merge_is_deterministic() {
        let records = vec![
            record("Park A", "2020-06-01", &[("D_t", 10.0)]),
            record("Park B", "2020-06-01", &[("E_p", 5.0)]),
            record("Park A", "2020-06-01", &[("E_p", 7.0)]),
        ];

        assert_eq!(merge_records(records.clone()), merge_records(records));
    }
}
