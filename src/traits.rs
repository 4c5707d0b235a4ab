use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Error;
use crate::task::{ListQuery, Page, Task, TaskRequest};

/// A source of tasks: usually a [`Client`](crate::client::Client) to the task API, or a
/// [`MemoryTaskSource`](crate::mock_source::MemoryTaskSource) for offline use and tests
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Returns a page of tasks, optionally filtered by completion and priority
    async fn list(&self, query: &ListQuery) -> Result<Page<Task>, Error>;
    /// Returns a page of the tasks scheduled for today (as decided by the source)
    async fn list_today(&self, page: u32, size: u32) -> Result<Page<Task>, Error>;

    /// Create a task. The request is validated before anything is sent
    async fn create(&self, request: &TaskRequest) -> Result<Task, Error>;
    /// Replace the editable fields of a task. The request is validated before anything is sent
    async fn update(&self, id: &str, request: &TaskRequest) -> Result<Task, Error>;
    /// Delete a task, and every future occurrence of it
    async fn delete(&self, id: &str) -> Result<(), Error>;

    async fn set_completed(&self, id: &str, completed: bool) -> Result<Task, Error>;
    /// Hide a recurring task on a single date, and return the updated task
    async fn exclude_date(&self, id: &str, date: NaiveDate) -> Result<Task, Error>;
}
