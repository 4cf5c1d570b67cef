// src/signal.rs
//! Cellular signal decoding

use serde::Serialize;
use std::fmt;

/// Legacy GSM ASU value meaning "not known or not detectable"
/// 0..=31 are valid GSM ASU readings; 99 and anything else mean unknown
const GSM_ASU_RANGE: std::ops::RangeInclusive<i32> = 0..=31;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RadioTechnology {
    Nr,
    Lte,
    Wcdma,
    Gsm,
}

impl RadioTechnology {
    pub fn label(&self) -> &'static str {
        match self {
            RadioTechnology::Nr => "5G NR",
            RadioTechnology::Lte => "LTE",
            RadioTechnology::Wcdma => "WCDMA",
            RadioTechnology::Gsm => "GSM",
        }
    }

    pub fn generation(&self) -> &'static str {
        match self {
            RadioTechnology::Nr => "5G",
            RadioTechnology::Lte => "4G",
            RadioTechnology::Wcdma => "3G",
            RadioTechnology::Gsm => "2G",
        }
    }

    fn band(&self) -> Option<&'static str> {
        match self {
            RadioTechnology::Nr => Some("5G band"),
            RadioTechnology::Lte => Some("LTE band"),
            RadioTechnology::Wcdma | RadioTechnology::Gsm => None,
        }
    }
}

impl fmt::Display for RadioTechnology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One per-cell strength entry as reported by the telephony service.
/// `technology` is `None` for cell kinds this tool does not classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSignal {
    pub technology: Option<RadioTechnology>,
    pub dbm: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellSignalReport {
    Cells(Vec<CellSignal>),
    /// Older stacks only expose a GSM ASU reading
    LegacyGsm { asu: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellLocation {
    Gsm { cid: i32, lac: i32 },
    Other,
}

/// Events pushed by the telephony subsystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalEvent {
    Strength(CellSignalReport),
    CellLocation(CellLocation),
}

/// Decoded signal strength, `None` where unknown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignalFields {
    pub dbm: Option<i32>,
    pub technology: Option<RadioTechnology>,
    pub generation: Option<&'static str>,
    pub band: Option<&'static str>,
}

impl SignalFields {
    /// Decode a report, preferring NR, then LTE, WCDMA and GSM
    pub fn from_report(report: &CellSignalReport) -> Self {
        match report {
            CellSignalReport::Cells(cells) => {
                let preferred = [
                    RadioTechnology::Nr,
                    RadioTechnology::Lte,
                    RadioTechnology::Wcdma,
                    RadioTechnology::Gsm,
                ]
                .into_iter()
                .find_map(|tech| cells.iter().find(|c| c.technology == Some(tech)));

                match preferred {
                    Some(cell) => {
                        let tech = cell.technology;
                        Self {
                            dbm: cell.dbm,
                            technology: tech,
                            generation: tech.map(|t| t.generation()),
                            band: tech.and_then(|t| t.band()),
                        }
                    }
                    None => Self {
                        dbm: cells.first().and_then(|c| c.dbm),
                        ..Default::default()
                    },
                }
            }
            CellSignalReport::LegacyGsm { asu } => Self {
                dbm: GSM_ASU_RANGE.contains(asu).then(|| -113 + 2 * asu),
                technology: Some(RadioTechnology::Gsm),
                generation: Some("2G/3G"),
                band: None,
            },
        }
    }

    /// Bars from 0 (unknown) to 4
    pub fn level(&self) -> u8 {
        match self.dbm {
            None => 0,
            Some(dbm) if dbm >= -70 => 4,
            Some(dbm) if dbm >= -85 => 3,
            Some(dbm) if dbm >= -100 => 2,
            Some(_) => 1,
        }
    }
}

/// Serving cell id and location area code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CellIdentity {
    pub cell_id: Option<i32>,
    pub lac: Option<i32>,
}

impl From<CellLocation> for CellIdentity {
    fn from(location: CellLocation) -> Self {
        match location {
            CellLocation::Gsm { cid, lac } => Self {
                cell_id: Some(cid),
                lac: Some(lac),
            },
            CellLocation::Other => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(technology: Option<RadioTechnology>, dbm: i32) -> CellSignal {
        CellSignal {
            technology,
            dbm: Some(dbm),
        }
    }

    #[test]
    fn test_nr_preferred_over_lte() {
        let report = CellSignalReport::Cells(vec![
            cell(Some(RadioTechnology::Lte), -90),
            cell(Some(RadioTechnology::Nr), -80),
        ]);
        let fields = SignalFields::from_report(&report);
        assert_eq!(fields.dbm, Some(-80));
        assert_eq!(fields.technology, Some(RadioTechnology::Nr));
        assert_eq!(fields.generation, Some("5G"));
        assert_eq!(fields.band, Some("5G band"));
    }

    #[test]
    fn test_wcdma_has_no_band() {
        let report = CellSignalReport::Cells(vec![
            cell(Some(RadioTechnology::Gsm), -95),
            cell(Some(RadioTechnology::Wcdma), -101),
        ]);
        let fields = SignalFields::from_report(&report);
        assert_eq!(fields.technology, Some(RadioTechnology::Wcdma));
        assert_eq!(fields.generation, Some("3G"));
        assert_eq!(fields.band, None);
    }

    #[test]
    fn test_unclassified_falls_back_to_first_entry() {
        let report = CellSignalReport::Cells(vec![cell(None, -77)]);
        let fields = SignalFields::from_report(&report);
        assert_eq!(fields.dbm, Some(-77));
        assert_eq!(fields.technology, None);

        let empty = SignalFields::from_report(&CellSignalReport::Cells(Vec::new()));
        assert_eq!(empty, SignalFields::default());
    }

    #[test]
    fn test_legacy_gsm_asu() {
        let fields = SignalFields::from_report(&CellSignalReport::LegacyGsm { asu: 20 });
        assert_eq!(fields.dbm, Some(-73));
        assert_eq!(fields.generation, Some("2G/3G"));

        let unknown = SignalFields::from_report(&CellSignalReport::LegacyGsm { asu: 99 });
        assert_eq!(unknown.dbm, None);
    }

    #[test]
    fn test_out_of_range_asu_is_unknown() {
        for asu in [i32::MAX, i32::MIN, -1, 32] {
            let fields = SignalFields::from_report(&CellSignalReport::LegacyGsm { asu });
            assert_eq!(fields.dbm, None, "asu {}", asu);
            assert_eq!(fields.level(), 0);
        }
        let edge = SignalFields::from_report(&CellSignalReport::LegacyGsm { asu: 31 });
        assert_eq!(edge.dbm, Some(-51));
    }

    #[test]
    fn test_levels() {
        let at = |dbm| SignalFields {
            dbm,
            ..Default::default()
        };
        assert_eq!(at(None).level(), 0);
        assert_eq!(at(Some(-65)).level(), 4);
        assert_eq!(at(Some(-85)).level(), 3);
        assert_eq!(at(Some(-100)).level(), 2);
        assert_eq!(at(Some(-110)).level(), 1);
    }

    #[test]
    fn test_cell_identity() {
        let gsm: CellIdentity = CellLocation::Gsm { cid: 4242, lac: 17 }.into();
        assert_eq!(gsm.cell_id, Some(4242));
        assert_eq!(gsm.lac, Some(17));
        assert_eq!(CellIdentity::from(CellLocation::Other), CellIdentity::default());
    }
}
