//! Dwell-time (loitering) detection for restricted zones.
//!
//! Each subject is either absent or present, stamped with the time of its
//! first restricted entry. While present, every update re-checks the dwell
//! time against the threshold of the zone it is reported in now, so moving
//! between restricted zones does not restart the clock. Alerts are
//! deduplicated by exact message text, and the dedup set survives `exit`: a
//! subject that leaves and comes back to the same zone will not be flagged
//! again.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use super::{AlertEvent, AnomalyKind};
use crate::clock::{elapsed_since, Clock, SystemClock};
use crate::utils::warn_once;
use crate::{AnomalyLedger, ZoneTable};

/// Anomaly type recorded in the ledger for loitering.
pub const LOITERING_ANOMALY_TYPE: &str = "loitering";

/// A subject's presence in a restricted zone.
#[derive(Debug, Clone, PartialEq)]
pub struct ZonePresence {
    pub subject_id: String,
    /// Restricted zone where the dwell started.
    pub zone_name: String,
    pub entry_time: f64,
}

/// Loitering detector.
pub struct LoiteringDetector<C: Clock = SystemClock> {
    zones: ZoneTable,
    clock: C,
    presence: HashMap<String, ZonePresence>,
    alerted_messages: HashSet<String>,
    ledger: AnomalyLedger,
}

impl LoiteringDetector<SystemClock> {
    /// Create a detector on the wall clock.
    pub fn new(zones: ZoneTable) -> Self {
        Self::with_clock(zones, SystemClock)
    }
}

impl<C: Clock> LoiteringDetector<C> {
    /// Create a detector with an explicit time source.
    pub fn with_clock(zones: ZoneTable, clock: C) -> Self {
        Self {
            zones,
            clock,
            presence: HashMap::new(),
            alerted_messages: HashSet::new(),
            ledger: AnomalyLedger::new(),
        }
    }

    /// Report that `subject_id` was observed in `zone_name`.
    ///
    /// Unknown and unrestricted zones are ignored. The first sighting records
    /// the entry time; later sightings, in this or any other restricted zone,
    /// flag loitering once the time since entry exceeds the threshold of the
    /// zone reported now. Only `exit` clears the entry.
    ///
    /// # Returns
    /// The alert, if one fired on this call
    pub fn update(&mut self, subject_id: &str, zone_name: &str) -> Option<AlertEvent> {
        let Some(zone) = self.zones.restricted(zone_name).copied() else {
            if self.zones.get(zone_name).is_none() {
                warn_once(&format!("zone '{}' is not configured, treating as unrestricted", zone_name));
            }
            return None;
        };

        let now = self.clock.now();
        match self.presence.get(subject_id) {
            Some(entry) => {
                // Dwell runs from the first restricted entry, checked against the current zone
                let elapsed = elapsed_since(entry.entry_time, now);
                if elapsed > zone.time_threshold {
                    self.flag(subject_id, zone_name)
                } else {
                    None
                }
            }
            None => {
                debug!(subject = subject_id, zone = zone_name, "subject entered restricted zone");
                self.presence.insert(
                    subject_id.to_string(),
                    ZonePresence {
                        subject_id: subject_id.to_string(),
                        zone_name: zone_name.to_string(),
                        entry_time: now,
                    },
                );
                None
            }
        }
    }

    /// Flag `subject_id` as loitering in `zone_name`.
    ///
    /// Records the anomaly and returns the alert unless a byte-identical
    /// message was already emitted, in which case nothing happens. Also a
    /// no-op when the subject has no entry or the zone is not restricted.
    pub fn flag(&mut self, subject_id: &str, zone_name: &str) -> Option<AlertEvent> {
        let zone = self.zones.restricted(zone_name).copied()?;
        let entry_time = self.presence.get(subject_id)?.entry_time;

        let message = format!(
            "Loitering detected: {} in {} for more than {} seconds.",
            subject_id, zone_name, zone.time_threshold
        );
        if self.alerted_messages.contains(&message) {
            return None;
        }

        let now = self.clock.now();
        let duration = elapsed_since(entry_time, now);
        info!(subject = subject_id, zone = zone_name, duration, "loitering detected");

        self.ledger.record(
            subject_id,
            now,
            duration,
            Some(LOITERING_ANOMALY_TYPE),
            Some(zone_name),
        );
        self.alerted_messages.insert(message.clone());

        Some(AlertEvent {
            message,
            kind: AnomalyKind::Loitering,
            subject_id: subject_id.to_string(),
            timestamp: now,
        })
    }

    /// Report that `subject_id` left. Already-alerted messages stay suppressed.
    pub fn exit(&mut self, subject_id: &str) {
        if let Some(entry) = self.presence.remove(subject_id) {
            debug!(subject = subject_id, zone = %entry.zone_name, "subject left restricted zone");
        }
    }

    pub fn is_present(&self, subject_id: &str) -> bool {
        self.presence.contains_key(subject_id)
    }

    pub fn presence(&self, subject_id: &str) -> Option<&ZonePresence> {
        self.presence.get(subject_id)
    }

    /// Seconds `subject_id` has been in its current zone.
    pub fn dwell_time(&self, subject_id: &str) -> Option<f64> {
        self.presence
            .get(subject_id)
            .map(|entry| elapsed_since(entry.entry_time, self.clock.now()))
    }

    /// Number of subjects currently present in a restricted zone.
    pub fn active_count(&self) -> usize {
        self.presence.len()
    }

    pub fn zones(&self) -> &ZoneTable {
        &self.zones
    }

    pub fn ledger(&self) -> &AnomalyLedger {
        &self.ledger
    }
}
