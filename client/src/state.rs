//! Client-side application state.
//!
//! One explicit container replaces ambient globals: reads go through query
//! methods, writes through update methods, and every clone sees the same
//! snapshot.

use std::sync::{Arc, RwLock};

use crate::models::{Address, Prescription, Status};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BannerKind {
    Pending,
    Success,
    Error,
}

/// Transaction status surfaced to the user while an operation runs.
#[derive(Clone, Debug)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub verified: usize,
    pub dispensed: usize,
    pub rejected: usize,
}

/// Query over the cached list: case-insensitive substring search on patient
/// and medication, plus an optional status filter.
#[derive(Clone, Debug, Default)]
pub struct Filter {
    pub search: String,
    pub status: Option<Status>,
}

#[derive(Clone, Default)]
pub struct AppState {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    prescriptions: Vec<Prescription>,
    account: Option<Address>,
    banner: Option<Banner>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_prescriptions(&self, list: Vec<Prescription>) {
        self.inner.write().unwrap().prescriptions = list;
    }

    pub fn prescriptions(&self) -> Vec<Prescription> {
        self.inner.read().unwrap().prescriptions.clone()
    }

    pub fn counts(&self) -> StatusCounts {
        let inner = self.inner.read().unwrap();
        let mut counts = StatusCounts {
            total: inner.prescriptions.len(),
            ..StatusCounts::default()
        };

        for p in &inner.prescriptions {
            match p.status {
                Status::Pending => counts.pending += 1,
                Status::Verified => counts.verified += 1,
                Status::Dispensed => counts.dispensed += 1,
                Status::Rejected => counts.rejected += 1,
            }
        }

        counts
    }

    pub fn filtered(&self, filter: &Filter) -> Vec<Prescription> {
        let needle = filter.search.to_lowercase();
        self.inner
            .read()
            .unwrap()
            .prescriptions
            .iter()
            .filter(|p| {
                let matches_search = needle.is_empty()
                    || p.patient.to_lowercase().contains(&needle)
                    || p.medication.to_lowercase().contains(&needle);
                let matches_status = filter.status.is_none_or(|s| p.status == s);
                matches_search && matches_status
            })
            .cloned()
            .collect()
    }

    pub fn set_account(&self, account: Option<Address>) {
        self.inner.write().unwrap().account = account;
    }

    pub fn account(&self) -> Option<Address> {
        self.inner.read().unwrap().account.clone()
    }

    pub fn set_banner(&self, kind: BannerKind, message: impl Into<String>) {
        self.inner.write().unwrap().banner = Some(Banner {
            kind,
            message: message.into(),
        });
    }

    pub fn clear_banner(&self) {
        self.inner.write().unwrap().banner = None;
    }

    pub fn banner(&self) -> Option<Banner> {
        self.inner.read().unwrap().banner.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prescription(id: &str, patient: &str, medication: &str, status: Status) -> Prescription {
        Prescription {
            id: id.to_string(),
            sealed: "FHE-aGVsbG8=".to_string(),
            timestamp: 1_700_000_000,
            patient: patient.to_string(),
            doctor: Address::new("0xabc0000000000000000000000000000000000001"),
            medication: medication.to_string(),
            dosage: "1x daily".to_string(),
            status,
            version: 1,
        }
    }

    fn seeded() -> AppState {
        let state = AppState::new();
        state.set_prescriptions(vec![
            prescription("1-a", "Jane Doe", "Amoxicillin", Status::Pending),
            prescription("2-b", "John Smith", "Ibuprofen", Status::Verified),
            prescription("3-c", "Janet Jones", "Amoxicillin", Status::Dispensed),
        ]);
        state
    }

    #[test]
    fn counts_by_status() {
        let counts = seeded().counts();

        assert_eq!(counts.total, 3);
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.verified, 1);
        assert_eq!(counts.dispensed, 1);
        assert_eq!(counts.rejected, 0);
    }

    #[test]
    fn filter_by_search_is_case_insensitive() {
        let state = seeded();

        let hits = state.filtered(&Filter {
            search: "jane".to_string(),
            status: None,
        });
        let ids: Vec<&str> = hits.iter().map(|p| p.id.as_str()).collect();

        assert_eq!(ids, vec!["1-a", "3-c"]);
    }

    #[test]
    fn filter_matches_medication_too() {
        let state = seeded();

        let hits = state.filtered(&Filter {
            search: "amoxicillin".to_string(),
            status: Some(Status::Dispensed),
        });

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "3-c");
    }

    #[test]
    fn empty_filter_returns_everything() {
        assert_eq!(seeded().filtered(&Filter::default()).len(), 3);
    }

    #[test]
    fn banner_set_and_clear() {
        let state = AppState::new();
        assert!(state.banner().is_none());

        state.set_banner(BannerKind::Pending, "Encrypting prescription data...");
        let banner = state.banner().unwrap();
        assert_eq!(banner.kind, BannerKind::Pending);

        state.clear_banner();
        assert!(state.banner().is_none());
    }

    #[test]
    fn account_update_is_shared_across_clones() {
        let state = AppState::new();
        let clone = state.clone();

        state.set_account(Some(Address::new("0xAbC")));
        assert_eq!(clone.account(), Some(Address::new("0xabc")));
    }
}
