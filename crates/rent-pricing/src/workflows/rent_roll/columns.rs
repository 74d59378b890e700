use super::normalizer::normalize_header;
use super::RentRollError;
use csv::StringRecord;
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum RentRollColumn {
    UnitId,
    Floorplan,
    Status,
    CurrentRent,
    LeaseEnd,
    PreleaseStart,
    MoveIn,
    VacantDays,
    Bedrooms,
    AmenityAdj,
}

impl RentRollColumn {
    const fn label(self) -> &'static str {
        match self {
            Self::UnitId => "unit id",
            Self::Floorplan => "floorplan",
            Self::Status => "status",
            Self::CurrentRent => "rent",
            Self::LeaseEnd => "lease end",
            Self::PreleaseStart => "prelease start",
            Self::MoveIn => "move-in",
            Self::VacantDays => "days vacant",
            Self::Bedrooms => "bedrooms",
            Self::AmenityAdj => "amenity adjustment",
        }
    }
}

static COLUMN_ALIASES: OnceLock<HashMap<String, RentRollColumn>> = OnceLock::new();

fn column_aliases() -> &'static HashMap<String, RentRollColumn> {
    COLUMN_ALIASES.get_or_init(|| {
        use RentRollColumn::*;
        const ALIASES: &[(&str, RentRollColumn)] = &[
            ("Unit", UnitId),
            ("Unit ID", UnitId),
            ("Unit Id", UnitId),
            ("Unit Number", UnitId),
            ("Unit #", UnitId),
            ("Apt", UnitId),
            ("Floorplan", Floorplan),
            ("Floor Plan", Floorplan),
            ("Floorplan Code", Floorplan),
            ("Unit Type", Floorplan),
            ("Plan", Floorplan),
            ("Status", Status),
            ("Unit Status", Status),
            ("Occupancy Status", Status),
            ("Rent", CurrentRent),
            ("Current Rent", CurrentRent),
            ("Market Rent", CurrentRent),
            ("Lease Rent", CurrentRent),
            ("Lease End", LeaseEnd),
            ("Lease End Date", LeaseEnd),
            ("Lease To", LeaseEnd),
            ("Lease Expiration", LeaseEnd),
            ("Prelease Start", PreleaseStart),
            ("Pre-Lease Start", PreleaseStart),
            ("Preleased Date", PreleaseStart),
            ("Move In", MoveIn),
            ("Move-In", MoveIn),
            ("Move In Date", MoveIn),
            ("Days Vacant", VacantDays),
            ("Vacant Days", VacantDays),
            ("Bedrooms", Bedrooms),
            ("Beds", Bedrooms),
            ("BR", Bedrooms),
            ("Amenity", AmenityAdj),
            ("Amenity Adj", AmenityAdj),
            ("Amenity Adjustment", AmenityAdj),
            ("Amenities", AmenityAdj),
        ];

        ALIASES
            .iter()
            .map(|(alias, column)| (normalize_header(alias), *column))
            .collect()
    })
}

pub(crate) fn column_for(header: &str) -> Option<RentRollColumn> {
    column_aliases().get(&normalize_header(header)).copied()
}

/// Positions of recognized columns; the first matching header wins.
#[derive(Debug)]
pub(crate) struct ColumnIndex {
    positions: HashMap<RentRollColumn, usize>,
}

impl ColumnIndex {
    pub(crate) fn from_headers(headers: &StringRecord) -> Result<Self, RentRollError> {
        let mut positions = HashMap::new();
        for (index, header) in headers.iter().enumerate() {
            if let Some(column) = column_for(header) {
                positions.entry(column).or_insert(index);
            }
        }

        for required in [RentRollColumn::UnitId, RentRollColumn::Floorplan] {
            if !positions.contains_key(&required) {
                return Err(RentRollError::MissingColumn(required.label()));
            }
        }

        Ok(Self { positions })
    }

    /// Trimmed, non-empty cell for `column`.
    pub(crate) fn get<'r>(&self, record: &'r StringRecord, column: RentRollColumn) -> Option<&'r str> {
        self.positions
            .get(&column)
            .and_then(|index| record.get(*index))
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub(crate) fn has(&self, column: RentRollColumn) -> bool {
        self.positions.contains_key(&column)
    }
}

#[cfg(test)]
pub(crate) fn lookup_for_tests(header: &str) -> Option<RentRollColumn> {
    column_for(header)
}
