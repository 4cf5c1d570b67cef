// src/gps/registry.rs
//! Satellite merge table keyed by (PRN, constellation)

use super::data::{Constellation, SatelliteRecord};
use crate::trim::TrimPolicy;

/// Satellites in first-sighted order. A repeat sighting replaces the stored
/// record in place, so position only changes when older entries are trimmed.
#[derive(Debug, Clone, Default)]
pub struct SatelliteRegistry {
    records: Vec<SatelliteRecord>,
}

impl SatelliteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a batch of sightings. Callers hold the registry lock for the
    /// whole batch so readers never see it half applied.
    pub fn merge<I>(&mut self, batch: I)
    where
        I: IntoIterator<Item = SatelliteRecord>,
    {
        for record in batch {
            match self.records.iter_mut().find(|r| r.same_satellite(&record)) {
                Some(existing) => *existing = record,
                None => self.records.push(record),
            }
        }
    }

    /// Drop the oldest entries once the registry outgrows `policy.cap`
    pub fn trim(&mut self, policy: &TrimPolicy) -> usize {
        policy.apply(&mut self.records)
    }

    pub fn get(&self, prn: &str, constellation: Constellation) -> Option<&SatelliteRecord> {
        self.records
            .iter()
            .find(|r| r.prn == prn && r.constellation == constellation)
    }

    pub fn position(&self, prn: &str, constellation: Constellation) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.prn == prn && r.constellation == constellation)
    }

    pub fn records(&self) -> &[SatelliteRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gps::{data::FieldValue, nmea::parse_sentence, SentenceUpdate};

    const JANITOR: TrimPolicy = TrimPolicy::new(100, 80);

    fn sat(prn: u32, constellation: Constellation, snr: &str) -> SatelliteRecord {
        SatelliteRecord {
            prn: format!("{:02}", prn),
            elevation: FieldValue::Value("10".to_string()),
            azimuth: FieldValue::Value("200".to_string()),
            snr: FieldValue::from_field(snr),
            constellation,
        }
    }

    fn merge_sentences(registry: &mut SatelliteRegistry, lines: &[&str]) {
        for line in lines {
            for update in parse_sentence(line) {
                if let SentenceUpdate::Satellites(batch) = update {
                    registry.merge(batch);
                }
            }
        }
    }

    #[test]
    fn test_merge_appends_in_sighting_order() {
        let mut registry = SatelliteRegistry::new();
        registry.merge(vec![sat(3, Constellation::Gps, "40"), sat(1, Constellation::Gps, "41")]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.position("03", Constellation::Gps), Some(0));
        assert_eq!(registry.position("01", Constellation::Gps), Some(1));
    }

    #[test]
    fn test_resighting_replaces_in_place() {
        let mut registry = SatelliteRegistry::new();
        registry.merge(vec![
            sat(1, Constellation::Gps, "40"),
            sat(2, Constellation::Gps, "41"),
            sat(3, Constellation::Gps, "42"),
        ]);
        registry.merge(vec![sat(2, Constellation::Gps, "")]);

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.position("02", Constellation::Gps), Some(1));
        assert_eq!(registry.get("02", Constellation::Gps).unwrap().snr, FieldValue::Unknown);
    }

    #[test]
    fn test_same_prn_different_constellation_is_distinct() {
        let mut registry = SatelliteRegistry::new();
        registry.merge(vec![sat(5, Constellation::Gps, "40"), sat(5, Constellation::BeiDou, "30")]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_full_gsv_group_no_duplicates_no_drops() {
        let group = [
            "$GPGSV,3,1,11,01,40,083,46,02,17,308,41,12,07,344,39,14,22,228,45*75",
            "$GPGSV,3,2,11,15,12,101,,17,33,055,38,19,71,283,44,22,08,151,*70",
            "$GPGSV,3,3,11,24,43,201,33,25,05,012,,32,55,133,47*4A",
        ];
        let mut registry = SatelliteRegistry::new();
        merge_sentences(&mut registry, &group);
        assert_eq!(registry.len(), 11);

        // Replaying the group is idempotent
        merge_sentences(&mut registry, &group);
        assert_eq!(registry.len(), 11);
    }

    #[test]
    fn test_trim_keeps_most_recent() {
        let mut registry = SatelliteRegistry::new();
        registry.merge((0..101).map(|prn| sat(prn, Constellation::Gps, "30")));
        assert_eq!(registry.len(), 101);

        let removed = registry.trim(&JANITOR);
        assert_eq!(removed, 21);
        assert_eq!(registry.len(), 80);
        assert_eq!(registry.records()[0].prn, "21");
        assert_eq!(registry.records()[79].prn, "100");
    }

    #[test]
    fn test_trim_at_cap_is_noop() {
        let mut registry = SatelliteRegistry::new();
        registry.merge((0..100).map(|prn| sat(prn, Constellation::Glonass, "30")));
        assert_eq!(registry.trim(&JANITOR), 0);
        assert_eq!(registry.len(), 100);
    }
}
