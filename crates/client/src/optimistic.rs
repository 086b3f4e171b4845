//! Optimistic task and reflection cache.
//!
//! Every write mutates the local list as soon as it is issued and returns a
//! future that performs the network call. Each entity tracks its own write
//! state: while a write is in flight the entity is `Pending` with the
//! generation of that write and a snapshot of the value it replaced.
//!
//! When a write settles:
//! - if its generation is no longer the entity's current one, a newer write
//!   was issued meanwhile and the settlement is dropped;
//! - on success the server copy replaces the local value;
//! - on failure only that entity is rolled back to its snapshot (or removed,
//!   if the write created it).

use std::future::Future;
use std::sync::Arc;

use ob_domain::error::{Error, Result};
use ob_domain::{NewReflection, NewTask, Reflection, Task, TaskPatch, TaskStatus};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::backend::TaskBackend;
use crate::events::{DomainEvent, EventBus};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Entries
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone)]
enum WriteState<T> {
    Clean,
    Pending {
        generation: u64,
        /// `None` when the pending write created the entity.
        snapshot: Option<T>,
    },
}

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    write: WriteState<T>,
}

impl<T> Entry<T> {
    fn clean(value: T) -> Self {
        Self {
            value,
            write: WriteState::Clean,
        }
    }

    fn is_pending(&self) -> bool {
        matches!(self.write, WriteState::Pending { .. })
    }

    fn is_current(&self, generation: u64) -> bool {
        matches!(self.write, WriteState::Pending { generation: g, .. } if g == generation)
    }
}

trait Keyed {
    fn key(&self) -> Uuid;
}

impl Keyed for Task {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for Reflection {
    fn key(&self) -> Uuid {
        self.id
    }
}

/// Apply a settled write to `entries`. Returns `false` when the settlement
/// was stale and ignored.
fn settle_entry<T: Keyed + Clone>(
    entries: &mut Vec<Entry<T>>,
    id: Uuid,
    generation: u64,
    result: &Result<T>,
) -> bool {
    let Some(pos) = entries.iter().position(|e| e.value.key() == id) else {
        return false;
    };
    if !entries[pos].is_current(generation) {
        // A create confirmed under a newer update: roll back to the server
        // copy instead of removing the entity.
        if let (
            Ok(server),
            WriteState::Pending {
                snapshot: snapshot @ None,
                ..
            },
        ) = (result, &mut entries[pos].write)
        {
            *snapshot = Some(server.clone());
        }
        return false;
    }
    match result {
        Ok(server) => entries[pos] = Entry::clean(server.clone()),
        Err(_) => match std::mem::replace(&mut entries[pos].write, WriteState::Clean) {
            WriteState::Pending {
                snapshot: Some(snapshot),
                ..
            } => entries[pos].value = snapshot,
            _ => {
                entries.remove(pos);
            }
        },
    }
    true
}

/// Replace `local` with the server list, keeping entities that still have a
/// write in flight. In-flight creates the server has not seen stay on top.
fn merge<T: Keyed>(local: Vec<Entry<T>>, server: Vec<T>) -> Vec<Entry<T>> {
    let mut pending: Vec<Entry<T>> = local.into_iter().filter(Entry::is_pending).collect();
    let mut merged = Vec::with_capacity(server.len() + pending.len());
    for value in server {
        match pending.iter().position(|e| e.value.key() == value.key()) {
            Some(i) => merged.push(pending.remove(i)),
            None => merged.push(Entry::clean(value)),
        }
    }
    for (i, entry) in pending.into_iter().enumerate() {
        merged.insert(i, entry);
    }
    merged
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Default)]
struct Inner {
    tasks: Vec<Entry<Task>>,
    reflections: Vec<Entry<Reflection>>,
    generation: u64,
}

impl Inner {
    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

pub struct OptimisticStore {
    backend: Arc<dyn TaskBackend>,
    bus: EventBus,
    inner: Mutex<Inner>,
}

impl OptimisticStore {
    pub fn new(backend: Arc<dyn TaskBackend>, bus: EventBus) -> Arc<Self> {
        Arc::new(Self {
            backend,
            bus,
            inner: Mutex::new(Inner::default()),
        })
    }

    /// Tasks in display order, newest first.
    pub fn tasks(&self) -> Vec<Task> {
        self.inner.lock().tasks.iter().map(|e| e.value.clone()).collect()
    }

    pub fn task(&self, id: Uuid) -> Option<Task> {
        self.inner
            .lock()
            .tasks
            .iter()
            .find(|e| e.value.id == id)
            .map(|e| e.value.clone())
    }

    pub fn reflections(&self) -> Vec<Reflection> {
        self.inner
            .lock()
            .reflections
            .iter()
            .map(|e| e.value.clone())
            .collect()
    }

    /// Whether the task or reflection has a write in flight.
    pub fn is_pending(&self, id: Uuid) -> bool {
        let inner = self.inner.lock();
        inner
            .tasks
            .iter()
            .find(|e| e.value.id == id)
            .map(Entry::is_pending)
            .or_else(|| {
                inner
                    .reflections
                    .iter()
                    .find(|e| e.value.id == id)
                    .map(Entry::is_pending)
            })
            .unwrap_or(false)
    }

    /// Load tasks and reflections from the backend.
    pub async fn refresh(&self) -> Result<()> {
        let tasks = self.backend.list_tasks().await?;
        let reflections = self.backend.list_reflections().await?;
        tracing::debug!(
            tasks = tasks.len(),
            reflections = reflections.len(),
            "refreshed client state"
        );
        self.with_tasks(|inner| {
            inner.tasks = merge(std::mem::take(&mut inner.tasks), tasks);
            inner.reflections = merge(std::mem::take(&mut inner.reflections), reflections);
        });
        Ok(())
    }

    /// Insert the task locally, then create it on the backend. The task id is
    /// generated here so the server copy can replace the local one.
    pub fn add_task(
        self: &Arc<Self>,
        mut input: NewTask,
    ) -> impl Future<Output = Result<Task>> + Send + 'static {
        let id = *input.id.get_or_insert_with(Uuid::new_v4);
        // Owner is filled in by the server copy.
        let local = Task::new(String::new(), input.clone());
        let generation = self.with_tasks(|inner| {
            let generation = inner.next_generation();
            inner.tasks.insert(
                0,
                Entry {
                    value: local,
                    write: WriteState::Pending {
                        generation,
                        snapshot: None,
                    },
                },
            );
            generation
        });

        let this = Arc::clone(self);
        async move {
            let result = this.backend.create_task(&input).await;
            this.settle_task(id, generation, result, "create")
        }
    }

    pub fn update_task_status(
        self: &Arc<Self>,
        id: Uuid,
        status: TaskStatus,
    ) -> impl Future<Output = Result<Task>> + Send + 'static {
        self.update_task(id, TaskPatch::status(status))
    }

    pub fn update_task(
        self: &Arc<Self>,
        id: Uuid,
        patch: TaskPatch,
    ) -> impl Future<Output = Result<Task>> + Send + 'static {
        let prepared = self.with_tasks(|inner| {
            let generation = inner.next_generation();
            let entry = inner.tasks.iter_mut().find(|e| e.value.id == id)?;
            let was_done = entry.value.status.is_done();
            // An unconfirmed create stays unconfirmed: if this write fails,
            // the task goes away rather than being restored.
            let snapshot = match entry.write {
                WriteState::Pending { snapshot: None, .. } => None,
                _ => Some(entry.value.clone()),
            };
            entry.value.apply(&patch);
            let completed = !was_done && entry.value.status.is_done();
            entry.write = WriteState::Pending {
                generation,
                snapshot,
            };
            Some((generation, completed))
        });
        if let Some((_, true)) = prepared {
            self.bus.publish(DomainEvent::TaskCompleted { task_id: id });
        }

        let this = Arc::clone(self);
        async move {
            let Some((generation, _)) = prepared else {
                return Err(Error::NotFound(format!("task {id}")));
            };
            let result = this.backend.update_task(id, &patch).await;
            this.settle_task(id, generation, result, "update")
        }
    }

    /// Flip one subtask's done flag locally and send the whole checklist.
    pub fn toggle_subtask(
        self: &Arc<Self>,
        id: Uuid,
        subtask_id: Uuid,
    ) -> impl Future<Output = Result<Task>> + Send + 'static {
        let subtasks = self
            .task(id)
            .and_then(|mut t| t.toggle_subtask(subtask_id).then_some(t.subtasks));
        let write = subtasks.map(|subtasks| {
            self.update_task(
                id,
                TaskPatch {
                    subtasks: Some(subtasks),
                    ..Default::default()
                },
            )
        });
        async move {
            match write {
                Some(write) => write.await,
                None => Err(Error::NotFound(format!("subtask {subtask_id} of task {id}"))),
            }
        }
    }

    /// Append the reflection locally, then create it on the backend.
    /// `ReflectionLogged` is published once the backend confirms.
    pub fn add_reflection(
        self: &Arc<Self>,
        mut input: NewReflection,
    ) -> impl Future<Output = Result<Reflection>> + Send + 'static {
        let id = *input.id.get_or_insert_with(Uuid::new_v4);
        let local = Reflection::new(String::new(), input.clone());
        let generation = {
            let mut inner = self.inner.lock();
            let generation = inner.next_generation();
            inner.reflections.insert(
                0,
                Entry {
                    value: local,
                    write: WriteState::Pending {
                        generation,
                        snapshot: None,
                    },
                },
            );
            generation
        };

        let this = Arc::clone(self);
        async move {
            let result = this.backend.create_reflection(&input).await;
            let current = settle_entry(
                &mut this.inner.lock().reflections,
                id,
                generation,
                &result,
            );
            match result {
                Ok(ref r) if current => {
                    this.bus.publish(DomainEvent::ReflectionLogged {
                        reflection_id: r.id,
                        mood: r.mood,
                    });
                }
                Err(ref e) if current => {
                    tracing::warn!(reflection_id = %id, error = %e, "reflection write failed, rolled back");
                }
                _ => {}
            }
            result
        }
    }

    fn settle_task(
        &self,
        id: Uuid,
        generation: u64,
        result: Result<Task>,
        op: &'static str,
    ) -> Result<Task> {
        let current = self.with_tasks(|inner| settle_entry(&mut inner.tasks, id, generation, &result));
        match result {
            Err(ref e) if current => {
                tracing::warn!(task_id = %id, op, error = %e, "task write failed, rolled back");
            }
            _ if !current => {
                tracing::debug!(task_id = %id, op, generation, "stale task write settled, ignored");
            }
            _ => {}
        }
        result
    }

    /// Run `f` under the lock and publish list emptied/filled transitions.
    fn with_tasks<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let (out, was_empty, is_empty) = {
            let mut inner = self.inner.lock();
            let was_empty = inner.tasks.is_empty();
            let out = f(&mut inner);
            let is_empty = inner.tasks.is_empty();
            (out, was_empty, is_empty)
        };
        match (was_empty, is_empty) {
            (false, true) => self.bus.publish(DomainEvent::TaskListEmptied),
            (true, false) => self.bus.publish(DomainEvent::TaskListFilled),
            _ => {}
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(title: &str) -> Task {
        Task::new("u1", NewTask::titled(title))
    }

    #[test]
    fn stale_settlement_is_ignored() {
        let t = task("X");
        let mut entries = vec![Entry {
            value: t.clone(),
            write: WriteState::Pending {
                generation: 2,
                snapshot: Some(t.clone()),
            },
        }];
        let mut server = t.clone();
        server.title = "from gen 1".into();
        assert!(!settle_entry(&mut entries, t.id, 1, &Ok(server)));
        assert_eq!(entries[0].value.title, "X");
        assert!(entries[0].is_pending());
    }

    #[test]
    fn failed_create_removes_entry() {
        let t = task("X");
        let mut entries = vec![Entry {
            value: t.clone(),
            write: WriteState::Pending {
                generation: 1,
                snapshot: None,
            },
        }];
        assert!(settle_entry(
            &mut entries,
            t.id,
            1,
            &Err(Error::Http("down".into()))
        ));
        assert!(entries.is_empty());
    }

    #[test]
    fn failed_update_of_unconfirmed_create_removes_entry() {
        let t = task("X");
        // The update superseded the create but inherited its missing snapshot.
        let mut entries = vec![Entry {
            value: t.clone(),
            write: WriteState::Pending {
                generation: 2,
                snapshot: None,
            },
        }];
        assert!(!settle_entry(
            &mut entries,
            t.id,
            1,
            &Err(Error::Http("down".into()))
        ));
        assert_eq!(entries.len(), 1);
        assert!(settle_entry(
            &mut entries,
            t.id,
            2,
            &Err(Error::NotFound("task".into()))
        ));
        assert!(entries.is_empty());
    }

    #[test]
    fn confirmed_create_under_newer_update_becomes_the_rollback_point() {
        let t = task("X");
        let mut entries = vec![Entry {
            value: t.clone(),
            write: WriteState::Pending {
                generation: 2,
                snapshot: None,
            },
        }];
        let mut server = t.clone();
        server.title = "X (server)".into();
        assert!(!settle_entry(&mut entries, t.id, 1, &Ok(server)));
        assert!(settle_entry(
            &mut entries,
            t.id,
            2,
            &Err(Error::Http("down".into()))
        ));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].value.title, "X (server)");
        assert!(!entries[0].is_pending());
    }

    #[test]
    fn merge_keeps_pending_and_takes_server_copies() {
        let clean = task("clean");
        let in_flight = task("in flight");
        let local = vec![
            Entry {
                value: in_flight.clone(),
                write: WriteState::Pending {
                    generation: 1,
                    snapshot: None,
                },
            },
            Entry::clean(clean.clone()),
        ];
        let mut server_clean = clean.clone();
        server_clean.title = "clean (server)".into();

        let merged = merge(local, vec![server_clean]);
        let titles: Vec<_> = merged.iter().map(|e| e.value.title.as_str()).collect();
        assert_eq!(titles, vec!["in flight", "clean (server)"]);
        assert!(merged[0].is_pending());
    }
}
