//! A day-by-day view over the tasks of a [`TaskSource`]
//!
//! An `Agenda` holds everything a task-list screen needs: the calendar strip, the selected day, a local copy of
//! every task, and the last user-facing error message. Rendering is left to the caller.
//!
//! The local copy is replaced as a whole after every creation, update or deletion. Only completion toggles and
//! date exclusions patch a single task in place, once the source has confirmed them.

use chrono::NaiveDate;

use crate::calendar::{CalendarDay, DayStrip};
use crate::error::Error;
use crate::recurrence;
use crate::task::{ListQuery, Task, TaskRequest};
use crate::traits::TaskSource;

const LOAD_FAILED: &str = "Could not load tasks";
const CREATE_FAILED: &str = "Could not create the task";
const UPDATE_FAILED: &str = "Could not update the task";
const DELETE_FAILED: &str = "Could not delete the task";
const EXCLUDE_FAILED: &str = "Could not exclude this date";
const SESSION_ENDED: &str = "Your session has expired, please log in again";

/// What to remove when deleting a task
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteScope {
    /// The task itself, with every occurrence of it
    Everything,
    /// Only the occurrence on the selected day (the task is excluded on this date)
    SelectedDate,
}


pub struct Agenda<T: TaskSource> {
    source: T,
    days: DayStrip,
    tasks: Vec<Task>,

    loading: bool,
    last_error: Option<&'static str>,
}

impl<T: TaskSource> Agenda<T> {
    /// Create an agenda whose calendar strip starts today. Tasks are not loaded yet, see [`Self::load`]
    pub fn new(source: T) -> Self {
        Self::with_days(source, DayStrip::today())
    }

    /// Create an agenda whose calendar strip starts on `today`
    pub fn starting(source: T, today: NaiveDate) -> Self {
        Self::with_days(source, DayStrip::starting(today))
    }

    fn with_days(source: T, days: DayStrip) -> Self {
        Self {
            source, days,
            tasks: Vec::new(),
            loading: false,
            last_error: None,
        }
    }

    pub fn source(&self) -> &T                  { &self.source }
    pub fn tasks(&self) -> &[Task]              { &self.tasks }
    pub fn days(&self) -> &DayStrip             { &self.days }
    pub fn days_mut(&mut self) -> &mut DayStrip { &mut self.days }
    pub fn selected_day(&self) -> &CalendarDay  { self.days.selected() }
    pub fn is_loading(&self) -> bool            { self.loading }
    /// The message to display after the last failed action, if any
    pub fn last_error(&self) -> Option<&'static str> { self.last_error }

    /// Fetch every task again, replacing the local copy
    pub async fn load(&mut self) -> Result<(), Error> {
        self.loading = true;
        self.last_error = None;

        let result = self.source.list(&ListQuery::default()).await;
        self.loading = false;

        match result {
            Ok(page) => {
                log::debug!("Loaded {} tasks ({} on the server)", page.content.len(), page.total_elements);
                if page.last == false {
                    log::warn!("Only the first {} tasks of {} are shown", page.content.len(), page.total_elements);
                }
                self.tasks = page.content;
                Ok(())
            },
            Err(err) => Err(self.fail(LOAD_FAILED, err)),
        }
    }

    /// Select the day whose tasks are displayed. Returns `false` if this date is not part of the calendar strip
    pub fn select_day(&mut self, date: NaiveDate) -> bool {
        self.days.select(date)
    }

    /// The tasks to display for the selected day
    pub fn visible_tasks(&self) -> Vec<&Task> {
        recurrence::visible_on(&self.tasks, self.days.selected().date()).collect()
    }

    /// How many tasks are displayed on a given day of the strip
    pub fn count_for(&self, day: &CalendarDay) -> usize {
        recurrence::count_for_day(&self.tasks, day.date())
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    /// A blank request, scheduled on the selected day
    pub fn draft(&self) -> TaskRequest {
        TaskRequest::for_day(self.days.selected().date())
    }

    /// Create a task (when `editing` is `None`) or update the task `editing`, then reload everything.
    ///
    /// Invalid requests are rejected before anything is sent.
    pub async fn save(&mut self, editing: Option<&str>, request: &TaskRequest) -> Result<(), Error> {
        request.validate()?;

        self.loading = true;
        let result = match editing {
            None => self.source.create(request).await.map_err(|err| (CREATE_FAILED, err)),
            Some(id) => self.source.update(id, request).await.map_err(|err| (UPDATE_FAILED, err)),
        };
        self.loading = false;

        match result {
            Ok(_) => self.load().await,
            Err((message, err)) => Err(self.fail(message, err)),
        }
    }

    /// Flip the completion status of a task
    pub async fn toggle_complete(&mut self, id: &str) -> Result<(), Error> {
        let completed = match self.task(id) {
            None => return Err(Error::NotFound(id.to_string())),
            Some(task) => task.completed(),
        };

        let result = self.source.set_completed(id, completed == false).await;
        match result {
            Ok(updated) => {
                self.replace(updated);
                Ok(())
            },
            Err(err) => Err(self.fail(UPDATE_FAILED, err)),
        }
    }

    /// Whether deleting this task requires to choose a [`DeleteScope`]
    pub fn needs_scope_choice(task: &Task) -> bool {
        task.is_recurring()
    }

    /// Delete a task, or only its occurrence on the selected day.
    ///
    /// The caller is expected to have asked for a confirmation (or a scope, for recurring tasks) beforehand.
    pub async fn delete(&mut self, id: &str, scope: DeleteScope) -> Result<(), Error> {
        match scope {
            DeleteScope::Everything => {
                let result = self.source.delete(id).await;
                match result {
                    Ok(()) => self.load().await,
                    Err(err) => Err(self.fail(DELETE_FAILED, err)),
                }
            },
            DeleteScope::SelectedDate => {
                let date = self.days.selected().date();
                let result = self.source.exclude_date(id, date).await;
                match result {
                    Ok(updated) => {
                        self.replace(updated);
                        Ok(())
                    },
                    Err(err) => Err(self.fail(EXCLUDE_FAILED, err)),
                }
            },
        }
    }

    /// Replace the local copy of a task with its server-confirmed version
    fn replace(&mut self, updated: Task) {
        match self.tasks.iter_mut().find(|t| t.id() == updated.id()) {
            Some(slot) => *slot = updated,
            None => log::debug!("Task {} is not displayed, ignoring its update", updated.id()),
        }
    }

    fn fail(&mut self, message: &'static str, err: Error) -> Error {
        log::warn!("{}: {}", message, err);
        self.last_error = Some(if err.is_session_ended() { SESSION_ENDED } else { message });
        err
    }
}
