//! Ambient user state: current mode, mood, energy and the completion streak.
//!
//! State is written to a JSON file after every change and read once at
//! startup. A missing or unreadable file starts from defaults.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use ob_domain::{Energy, Mode, Mood};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::events::{DomainEvent, EventBus};

/// Consecutive days with at least one completed task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub days: u32,
    pub last_completed: Option<NaiveDate>,
}

impl Streak {
    /// Count a completion on `day`. Same-day completions do not extend the
    /// streak; a skipped day restarts it.
    pub fn record(&mut self, day: NaiveDate) {
        self.days = match self.last_completed {
            Some(last) if last == day => self.days,
            Some(last) if last.succ_opt() == Some(day) => self.days + 1,
            Some(last) if last > day => return,
            _ => 1,
        };
        self.last_completed = Some(day);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AmbientState {
    pub mode: Mode,
    pub mood: Option<Mood>,
    pub energy: Energy,
    pub streak: Streak,
}

impl Default for AmbientState {
    fn default() -> Self {
        Self {
            mode: Mode::Build,
            mood: None,
            energy: Energy::default(),
            streak: Streak::default(),
        }
    }
}

pub struct AmbientStore {
    path: PathBuf,
    low_energy_threshold: u8,
    bus: EventBus,
    tx: watch::Sender<AmbientState>,
}

impl AmbientStore {
    /// Hydrate from `path`, falling back to defaults.
    pub fn load(path: impl Into<PathBuf>, low_energy_threshold: u8, bus: EventBus) -> Self {
        let path = path.into();
        let state = read_state(&path);
        let (tx, _) = watch::channel(state);
        Self {
            path,
            low_energy_threshold,
            bus,
            tx,
        }
    }

    pub fn state(&self) -> AmbientState {
        self.tx.borrow().clone()
    }

    /// Receives the latest state after every change.
    pub fn subscribe(&self) -> watch::Receiver<AmbientState> {
        self.tx.subscribe()
    }

    pub fn set_mode(&self, mode: Mode) {
        let from = self.state().mode;
        if from == mode {
            return;
        }
        self.update(|s| s.mode = mode);
        self.bus.publish(DomainEvent::ModeChanged { from, to: mode });
    }

    pub fn set_mood(&self, mood: Mood) {
        if self.state().mood == Some(mood) {
            return;
        }
        self.update(|s| s.mood = Some(mood));
        self.bus.publish(DomainEvent::MoodChanged { mood });
    }

    /// `EnergyLow` is published when energy drops below the threshold, not on
    /// every low reading.
    pub fn set_energy(&self, energy: Energy) {
        let before = self.state().energy;
        if before == energy {
            return;
        }
        self.update(|s| s.energy = energy);
        let threshold = self.low_energy_threshold;
        if energy.is_below(threshold) && !before.is_below(threshold) {
            self.bus.publish(DomainEvent::EnergyLow { energy });
        }
    }

    pub fn record_completion(&self, day: NaiveDate) {
        self.update(|s| s.streak.record(day));
    }

    /// Extend the streak whenever a task is completed.
    pub fn track_completions(
        self: Arc<Self>,
        mut rx: broadcast::Receiver<DomainEvent>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(DomainEvent::TaskCompleted { .. }) => {
                        self.record_completion(Local::now().date_naive());
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "streak tracker lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    fn update(&self, f: impl FnOnce(&mut AmbientState)) {
        self.tx.send_modify(f);
        self.persist();
    }

    fn persist(&self) {
        let state = self.state();
        let json = match serde_json::to_string_pretty(&state) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize ambient state");
                return;
            }
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = std::fs::write(&self.path, json) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to persist ambient state");
        }
    }
}

fn read_state(path: &Path) -> AmbientState {
    let data = match std::fs::read_to_string(path) {
        Ok(d) => d,
        Err(_) => return AmbientState::default(),
    };
    match serde_json::from_str(&data) {
        Ok(state) => {
            tracing::info!(path = %path.display(), "loaded ambient state");
            state
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ambient state unreadable, using defaults");
            AmbientState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn streak_counts_consecutive_days() {
        let mut s = Streak::default();
        s.record(day(1));
        s.record(day(1));
        s.record(day(2));
        s.record(day(3));
        assert_eq!(s.days, 3);
        s.record(day(5));
        assert_eq!(s.days, 1);
        assert_eq!(s.last_completed, Some(day(5)));
    }

    #[test]
    fn state_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ambient.json");
        let store = AmbientStore::load(&path, 30, EventBus::default());
        store.set_mode(Mode::Flow);
        store.set_mood(Mood::Calm);
        store.set_energy(Energy::new(72).unwrap());
        store.record_completion(day(9));

        let reloaded = AmbientStore::load(&path, 30, EventBus::default());
        let s = reloaded.state();
        assert_eq!(s.mode, Mode::Flow);
        assert_eq!(s.mood, Some(Mood::Calm));
        assert_eq!(s.energy.value(), 72);
        assert_eq!(s.streak.days, 1);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ambient.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = AmbientStore::load(&path, 30, EventBus::default());
        assert_eq!(store.state(), AmbientState::default());
    }

    #[tokio::test]
    async fn changes_publish_events_and_notify_watchers() {
        let dir = tempfile::tempdir().unwrap();
        let bus = EventBus::default();
        let mut events = bus.subscribe();
        let store = AmbientStore::load(dir.path().join("a.json"), 30, bus);
        let mut watcher = store.subscribe();

        store.set_mode(Mode::Restore);
        watcher.changed().await.unwrap();
        assert_eq!(watcher.borrow().mode, Mode::Restore);
        assert_eq!(
            events.recv().await.unwrap(),
            DomainEvent::ModeChanged {
                from: Mode::Build,
                to: Mode::Restore
            }
        );

        store.set_energy(Energy::new(20).unwrap());
        store.set_energy(Energy::new(10).unwrap());
        assert_eq!(
            events.recv().await.unwrap(),
            DomainEvent::EnergyLow {
                energy: Energy::new(20).unwrap()
            }
        );
        assert!(events.try_recv().is_err());
    }
}
