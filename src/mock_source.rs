//! An in-memory [`TaskSource`], that emulates the task API
//!
//! It is useful to run an [`Agenda`](crate::agenda::Agenda) offline, and in tests.
//! Failures can be injected with a [`MockBehaviour`].

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Local, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::Error;
use crate::mock_behaviour::{MockBehaviour, Operation};
use crate::task::{ListQuery, Page, Task, TaskRequest};
use crate::traits::TaskSource;


fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}


/// A task source that keeps its tasks in memory
#[derive(Debug)]
pub struct MemoryTaskSource {
    today: NaiveDate,
    tasks: Mutex<Vec<Task>>,
    mock_behaviour: Mutex<MockBehaviour>,
    /// Every write action that reached this source, e.g. `delete 42`
    history: Mutex<Vec<String>>,
}

impl MemoryTaskSource {
    pub fn new() -> Self {
        Self::with_tasks(Vec::new())
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            today: Local::now().date_naive(),
            tasks: Mutex::new(tasks),
            mock_behaviour: Mutex::new(MockBehaviour::new()),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Change the date that [`TaskSource::list_today`] considers to be today
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn set_mock_behaviour(&self, behaviour: MockBehaviour) {
        *lock(&self.mock_behaviour) = behaviour;
    }

    /// A copy of the current tasks
    pub fn tasks(&self) -> Vec<Task> {
        lock(&self.tasks).clone()
    }

    /// The write actions that have been applied so far
    pub fn history(&self) -> Vec<String> {
        lock(&self.history).clone()
    }

    fn record(&self, action: String) {
        lock(&self.history).push(action);
    }

    /// Apply `f` to the task `id`, and return a copy of the modified task
    fn modify<F: FnOnce(&mut Task)>(&self, id: &str, f: F) -> Result<Task, Error> {
        let mut tasks = lock(&self.tasks);
        match tasks.iter_mut().find(|t| t.id() == id) {
            None => Err(Error::NotFound(id.to_string())),
            Some(task) => {
                f(task);
                task.set_updated_at(Utc::now().to_rfc3339());
                Ok(task.clone())
            }
        }
    }
}

impl Default for MemoryTaskSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskSource for MemoryTaskSource {
    async fn list(&self, query: &ListQuery) -> Result<Page<Task>, Error> {
        lock(&self.mock_behaviour).check(Operation::List)?;
        let matching: Vec<Task> = lock(&self.tasks).iter()
            .filter(|t| query.matches(t))
            .cloned()
            .collect();
        Ok(Page::slice(&matching, query.page, query.size))
    }

    async fn list_today(&self, page: u32, size: u32) -> Result<Page<Task>, Error> {
        lock(&self.mock_behaviour).check(Operation::List)?;
        let matching: Vec<Task> = lock(&self.tasks).iter()
            .filter(|t| t.task_date() == Some(self.today))
            .cloned()
            .collect();
        Ok(Page::slice(&matching, page, size))
    }

    async fn create(&self, request: &TaskRequest) -> Result<Task, Error> {
        request.validate()?;
        lock(&self.mock_behaviour).check(Operation::Create)?;

        let now = Utc::now().to_rfc3339();
        let task = Task::new_with_parameters(
            Uuid::new_v4().to_hyphenated().to_string(),
            request.title.trim().to_string(),
            request.description.clone(),
            request.task_date,
            false,
            request.priority.unwrap_or_default(),
            request.repeat_days.clone(),
            Default::default(),
            Some(now.clone()),
            Some(now),
        );
        lock(&self.tasks).push(task.clone());
        self.record(format!("create {}", task.id()));
        Ok(task)
    }

    async fn update(&self, id: &str, request: &TaskRequest) -> Result<Task, Error> {
        request.validate()?;
        lock(&self.mock_behaviour).check(Operation::Update)?;
        let task = self.modify(id, |t| t.apply(request))?;
        self.record(format!("update {}", id));
        Ok(task)
    }

    async fn delete(&self, id: &str) -> Result<(), Error> {
        lock(&self.mock_behaviour).check(Operation::Delete)?;
        self.record(format!("delete {}", id));
        let mut tasks = lock(&self.tasks);
        match tasks.iter().position(|t| t.id() == id) {
            None => Err(Error::NotFound(id.to_string())),
            Some(index) => {
                tasks.remove(index);
                Ok(())
            }
        }
    }

    async fn set_completed(&self, id: &str, completed: bool) -> Result<Task, Error> {
        lock(&self.mock_behaviour).check(Operation::SetCompleted)?;
        let task = self.modify(id, |t| t.set_completed(completed))?;
        self.record(format!("complete {} {}", id, completed));
        Ok(task)
    }

    async fn exclude_date(&self, id: &str, date: NaiveDate) -> Result<Task, Error> {
        lock(&self.mock_behaviour).check(Operation::ExcludeDate)?;
        let task = self.modify(id, |t| t.exclude(date))?;
        self.record(format!("exclude {} {}", id, date));
        Ok(task)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{DayOfWeek, Priority};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn crud() {
        let source = MemoryTaskSource::new().with_today(date("2024-06-10"));

        let a = source.create(&TaskRequest::new("Dentist").on(date("2024-06-10")).with_priority(Priority::High)).await.unwrap();
        let b = source.create(&TaskRequest::new("Gym").repeating(vec![DayOfWeek::Monday])).await.unwrap();
        assert!(source.create(&TaskRequest::new(" ")).await.is_err());
        assert_eq!(source.tasks().len(), 2);

        let today = source.list_today(0, 20).await.unwrap();
        assert_eq!(today.content.len(), 1);
        assert_eq!(today.content[0].id(), a.id());

        let high = source.list(&ListQuery { priority: Some(Priority::High), ..ListQuery::default() }).await.unwrap();
        assert_eq!(high.total_elements, 1);

        let b2 = source.exclude_date(b.id(), date("2024-06-17")).await.unwrap();
        assert!(b2.is_excluded_on(date("2024-06-17")));

        let a2 = source.set_completed(a.id(), true).await.unwrap();
        assert!(a2.completed());
        let done = source.list(&ListQuery { completed: Some(true), ..ListQuery::default() }).await.unwrap();
        assert_eq!(done.content.len(), 1);

        let a3 = source.update(a.id(), &TaskRequest::new("Dentist (moved)").on(date("2024-06-11"))).await.unwrap();
        assert_eq!(a3.title(), "Dentist (moved)");
        assert_eq!(a3.priority(), Priority::Medium);
        assert!(a3.completed());

        source.delete(a.id()).await.unwrap();
        assert!(matches!(source.delete(a.id()).await, Err(Error::NotFound(_))));
        assert_eq!(source.tasks().len(), 1);
    }

    #[tokio::test]
    async fn injected_failures() {
        let source = MemoryTaskSource::new();
        source.set_mock_behaviour(MockBehaviour::new().script(Operation::Create, 0, 1));

        assert!(source.create(&TaskRequest::new("a")).await.is_err());
        assert!(source.create(&TaskRequest::new("a")).await.is_ok());
        assert_eq!(source.history().len(), 1);
    }

    #[tokio::test]
    async fn pages_past_the_end_are_empty() {
        let source = MemoryTaskSource::new();
        source.create(&TaskRequest::new("a")).await.unwrap();

        let page = source.list(&ListQuery { page: u32::MAX, ..ListQuery::default() }).await.unwrap();
        assert!(page.content.is_empty());
        assert_eq!(page.total_elements, 1);
        assert!(page.last);

        let page = source.list_today(u32::MAX, u32::MAX).await.unwrap();
        assert!(page.content.is_empty());
    }
}
