use async_trait::async_trait;
use ob_domain::error::Result;
use ob_domain::{Energy, FocusSession, Mode, NewReflection, NewTask, Reflection, Task, TaskPatch};
use ob_messaging::{ContextualMessageRequest, ContextualMessageResponse};
use uuid::Uuid;

/// The network seam of the client. [`crate::ApiClient`] talks to the Orbit
/// HTTP API; tests substitute scripted fakes.
#[async_trait]
pub trait TaskBackend: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>>;

    async fn create_task(&self, input: &NewTask) -> Result<Task>;

    async fn update_task(&self, id: Uuid, patch: &TaskPatch) -> Result<Task>;

    /// Every reflection of the user, newest first.
    async fn list_reflections(&self) -> Result<Vec<Reflection>>;

    async fn create_reflection(&self, input: &NewReflection) -> Result<Reflection>;

    /// Open a focus session in `mode`. The server closes any open one.
    async fn start_session(
        &self,
        mode: Mode,
        energy: Option<Energy>,
        task_id: Option<Uuid>,
    ) -> Result<FocusSession>;

    /// Close the open session, if any.
    async fn end_session(&self, energy: Option<Energy>) -> Result<Option<FocusSession>>;

    async fn contextual_message(
        &self,
        req: &ContextualMessageRequest,
    ) -> Result<ContextualMessageResponse>;
}
