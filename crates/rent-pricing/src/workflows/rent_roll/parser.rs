use super::columns::{ColumnIndex, RentRollColumn};
use super::RentRollError;
use crate::workflows::pricing::domain::{UnitState, UnitStatus};
use chrono::{DateTime, NaiveDate};
use std::collections::BTreeMap;
use std::io::Read;
use tracing::debug;

#[derive(Debug, Default)]
pub(crate) struct ParsedRentRoll {
    pub(crate) units: Vec<UnitState>,
    pub(crate) bedrooms: BTreeMap<String, u32>,
    pub(crate) skipped_rows: usize,
}

pub(crate) fn parse_rent_roll<R: Read>(reader: R) -> Result<ParsedRentRoll, RentRollError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let columns = ColumnIndex::from_headers(&headers)?;
    let mut parsed = ParsedRentRoll::default();

    for (line, record) in csv_reader.records().enumerate() {
        let record = record?;
        let unit_id = columns.get(&record, RentRollColumn::UnitId);
        let floorplan = columns.get(&record, RentRollColumn::Floorplan);
        let (Some(unit_id), Some(floorplan)) = (unit_id, floorplan) else {
            debug!(row = line + 2, "skipping rent roll row without unit or floorplan");
            parsed.skipped_rows += 1;
            continue;
        };

        let current_rent = columns
            .get(&record, RentRollColumn::CurrentRent)
            .and_then(parse_money)
            .unwrap_or(0.0);
        let status = if columns.has(RentRollColumn::Status) {
            columns
                .get(&record, RentRollColumn::Status)
                .map(parse_status)
                .unwrap_or(UnitStatus::Other)
        } else if current_rent > 0.0 {
            UnitStatus::Occupied
        } else {
            UnitStatus::Vacant
        };

        if let Some(bedrooms) = columns
            .get(&record, RentRollColumn::Bedrooms)
            .and_then(parse_count)
            .and_then(|count| u32::try_from(count).ok())
        {
            parsed
                .bedrooms
                .entry(floorplan.to_string())
                .or_insert(bedrooms);
        }

        parsed.units.push(UnitState {
            unit_id: unit_id.to_string(),
            floorplan_code: floorplan.to_string(),
            status,
            current_rent,
            lease_end_date: columns
                .get(&record, RentRollColumn::LeaseEnd)
                .and_then(parse_date),
            prelease_start_date: columns
                .get(&record, RentRollColumn::PreleaseStart)
                .and_then(parse_date),
            vacant_days: columns
                .get(&record, RentRollColumn::VacantDays)
                .and_then(parse_count)
                .unwrap_or(0),
            move_in_date: columns
                .get(&record, RentRollColumn::MoveIn)
                .and_then(parse_date),
            amenity_adj: columns
                .get(&record, RentRollColumn::AmenityAdj)
                .and_then(parse_money)
                .unwrap_or(0.0),
        });
    }

    Ok(parsed)
}

pub(crate) fn parse_status(raw: &str) -> UnitStatus {
    let value = raw.trim().to_ascii_lowercase();
    let unleased = value.contains("unrented") || value.contains("unleased");
    let leased = !unleased
        && (value.contains("leased") || value.contains("rented") || value.contains("pre"));

    if value.contains("notice") || value.contains("ntv") {
        if leased {
            UnitStatus::OnNoticeLeased
        } else {
            UnitStatus::OnNotice
        }
    } else if value.contains("vacant") {
        if leased {
            UnitStatus::VacantLeased
        } else {
            UnitStatus::Vacant
        }
    } else if value.contains("model") {
        UnitStatus::Model
    } else if value.contains("down") || value.contains("offline") || value.contains("admin") {
        UnitStatus::Down
    } else if value.contains("occupied") || value == "current" || value == "leased" {
        UnitStatus::Occupied
    } else {
        UnitStatus::Other
    }
}

/// Dollar amount tolerant of `$`, thousands separators and accounting negatives.
pub(crate) fn parse_money(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let negative = trimmed.starts_with('(') && trimmed.ends_with(')');
    let digits: String = trimmed
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '(' | ')' | ' '))
        .collect();
    let value = digits.parse::<f64>().ok().filter(|value| value.is_finite())?;
    Some(if negative { -value } else { value })
}

pub(crate) fn parse_count(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| {
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(|value| value.round() as i64)
        })
}

pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc().date());
    }

    ["%Y-%m-%d", "%m/%d/%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}
