use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use rent_pricing::workflows::pricing::{
    CarryForwardRecord, CarryForwardRepository, RepositoryError,
};
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// One JSON carry-forward record per property, stored as `<dir>/<property>.json`.
#[derive(Debug, Clone)]
pub(crate) struct JsonFileCarryForwardRepository {
    dir: PathBuf,
}

impl JsonFileCarryForwardRepository {
    pub(crate) fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Bytes outside `[A-Za-z0-9_-]` are percent-encoded.
    fn path_for(&self, property_id: &str) -> PathBuf {
        let mut file_stem = String::with_capacity(property_id.len());
        for byte in property_id.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
                file_stem.push(char::from(byte));
            } else {
                file_stem.push_str(&format!("%{byte:02X}"));
            }
        }
        self.dir.join(format!("{file_stem}.json"))
    }
}

impl CarryForwardRepository for JsonFileCarryForwardRepository {
    fn load(&self, property_id: &str) -> Result<Option<CarryForwardRecord>, RepositoryError> {
        let path = self.path_for(property_id);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(RepositoryError::Unavailable(format!(
                    "{}: {err}",
                    path.display()
                )))
            }
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| RepositoryError::Serialization(format!("{}: {err}", path.display())))
    }

    fn save(&self, property_id: &str, record: CarryForwardRecord) -> Result<(), RepositoryError> {
        let unavailable = |err: std::io::Error| RepositoryError::Unavailable(err.to_string());
        std::fs::create_dir_all(&self.dir).map_err(unavailable)?;

        let path = self.path_for(property_id);
        let staging = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(&record)
            .map_err(|err| RepositoryError::Serialization(err.to_string()))?;
        std::fs::write(&staging, body).map_err(unavailable)?;
        std::fs::rename(&staging, &path).map_err(unavailable)?;

        debug!(path = %path.display(), units = record.units.len(), "carry-forward record saved");
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "rent-pricing-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn record(rent: f64) -> CarryForwardRecord {
        let mut fp_baselines = BTreeMap::new();
        fp_baselines.insert("A1".to_string(), rent);
        CarryForwardRecord {
            fp_baselines,
            units: BTreeMap::new(),
            at: Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn json_repository_returns_none_before_first_save() {
        let repository = JsonFileCarryForwardRepository::new(scratch_dir("empty"));

        assert!(repository.load("oak").expect("load").is_none());
    }

    #[test]
    fn json_repository_overwrites_record_per_property() {
        let dir = scratch_dir("roundtrip");
        let repository = JsonFileCarryForwardRepository::new(&dir);

        repository.save("oak", record(1400.0)).expect("first save");
        repository.save("oak", record(1425.0)).expect("second save");

        let stored = repository.load("oak").expect("load").expect("record");
        assert_eq!(stored.fp_baselines["A1"], 1425.0);
        assert!(dir.join("oak.json").exists());
        assert!(!dir.join("oak.json.tmp").exists());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn json_repository_reports_corrupt_records() {
        let dir = scratch_dir("corrupt");
        std::fs::create_dir_all(&dir).expect("dir");
        std::fs::write(dir.join("oak.json"), b"{not json").expect("write");
        let repository = JsonFileCarryForwardRepository::new(&dir);

        let error = repository.load("oak").expect_err("corrupt record");

        assert!(matches!(error, RepositoryError::Serialization(_)));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn property_ids_are_encoded_into_file_names() {
        let repository = JsonFileCarryForwardRepository::new("/tmp/cf");

        assert_eq!(
            repository.path_for("../oak park"),
            PathBuf::from("/tmp/cf/%2E%2E%2Foak%20park.json")
        );
        assert_eq!(repository.path_for("oak_park-2"), PathBuf::from("/tmp/cf/oak_park-2.json"));
    }

    #[test]
    fn distinct_property_ids_keep_separate_records() {
        let dir = scratch_dir("collide");
        let repository = JsonFileCarryForwardRepository::new(&dir);

        assert_ne!(repository.path_for("a/b"), repository.path_for("a_b"));
        assert_ne!(repository.path_for("a%2Fb"), repository.path_for("a/b"));

        repository.save("a/b", record(1400.0)).expect("save a/b");
        repository.save("a_b", record(1500.0)).expect("save a_b");

        let slashed = repository.load("a/b").expect("load").expect("record");
        let underscored = repository.load("a_b").expect("load").expect("record");
        assert_eq!(slashed.fp_baselines["A1"], 1400.0);
        assert_eq!(underscored.fp_baselines["A1"], 1500.0);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn parse_date_rejects_other_formats() {
        assert_eq!(parse_date(" 2025-06-02 "), Ok(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()));
        assert!(parse_date("06/02/2025").is_err());
    }
}
