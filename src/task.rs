//! To-do tasks, as exchanged with the task API

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Deserializer, Serialize};
use chrono::{Datelike, NaiveDate};

use crate::config::{DEFAULT_PAGE_SIZE, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN};
use crate::error::Error;


#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}


/// A weekday a task can recur on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// Indexed by "days since Sunday" (0 = Sunday .. 6 = Saturday).
/// Every weekday lookup in this crate goes through this table.
const DAYS_FROM_SUNDAY: [DayOfWeek; 7] = [
    DayOfWeek::Sunday,
    DayOfWeek::Monday,
    DayOfWeek::Tuesday,
    DayOfWeek::Wednesday,
    DayOfWeek::Thursday,
    DayOfWeek::Friday,
    DayOfWeek::Saturday,
];

impl DayOfWeek {
    /// `0` is Sunday, `6` is Saturday. Returns `None` for any other index
    pub fn from_sunday_index(index: usize) -> Option<Self> {
        DAYS_FROM_SUNDAY.get(index).copied()
    }

    /// The weekday a calendar date falls on
    pub fn of(date: NaiveDate) -> Self {
        DAYS_FROM_SUNDAY[date.weekday().num_days_from_sunday() as usize]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "MONDAY",
            DayOfWeek::Tuesday => "TUESDAY",
            DayOfWeek::Wednesday => "WEDNESDAY",
            DayOfWeek::Thursday => "THURSDAY",
            DayOfWeek::Friday => "FRIDAY",
            DayOfWeek::Saturday => "SATURDAY",
            DayOfWeek::Sunday => "SUNDAY",
        }
    }

    /// A human-readable name, e.g. `Monday`
    pub fn display_name(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl Display for DayOfWeek {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}


/// A to-do task, as known by the server
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque, server-assigned identifier
    id: String,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    /// The single date this task is scheduled on, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    task_date: Option<NaiveDate>,
    #[serde(default)]
    completed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    priority: Priority,
    /// The weekdays this task recurs on
    #[serde(default, deserialize_with = "null_as_default")]
    repeat_days: BTreeSet<DayOfWeek>,
    /// Dates on which this task is hidden, even though it would otherwise be visible
    #[serde(default, deserialize_with = "null_as_default")]
    excluded_dates: BTreeSet<NaiveDate>,

    /// Server timestamps. They are not interpreted by this crate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
}

impl Task {
    /// Create a task instance. This does not create anything on the server
    pub fn new_with_parameters(id: String, title: String, description: Option<String>,
                               task_date: Option<NaiveDate>, completed: bool, priority: Priority,
                               repeat_days: BTreeSet<DayOfWeek>, excluded_dates: BTreeSet<NaiveDate>,
                               created_at: Option<String>, updated_at: Option<String>,
                            ) -> Self
    {
        Self {
            id, title, description, task_date, completed, priority,
            repeat_days, excluded_dates, created_at, updated_at,
        }
    }

    pub fn id(&self) -> &str                { &self.id          }
    pub fn title(&self) -> &str             { &self.title       }
    pub fn completed(&self) -> bool         { self.completed    }
    pub fn priority(&self) -> Priority      { self.priority     }
    pub fn task_date(&self) -> Option<NaiveDate>            { self.task_date }
    pub fn description(&self) -> Option<&str>               { self.description.as_deref() }
    pub fn repeat_days(&self) -> &BTreeSet<DayOfWeek>       { &self.repeat_days }
    pub fn excluded_dates(&self) -> &BTreeSet<NaiveDate>    { &self.excluded_dates }
    pub fn created_at(&self) -> Option<&str>                { self.created_at.as_deref() }
    pub fn updated_at(&self) -> Option<&str>                { self.updated_at.as_deref() }

    /// Whether this task repeats on some weekdays
    pub fn is_recurring(&self) -> bool {
        self.repeat_days.is_empty() == false
    }

    pub fn is_excluded_on(&self, date: NaiveDate) -> bool {
        self.excluded_dates.contains(&date)
    }

    /// Whether this task should be displayed on a given day. See [`crate::recurrence::is_visible`]
    pub fn is_visible_on(&self, date: NaiveDate) -> bool {
        crate::recurrence::is_visible(self, date)
    }

    pub(crate) fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    pub(crate) fn exclude(&mut self, date: NaiveDate) {
        self.excluded_dates.insert(date);
    }

    /// Apply the editable fields of a request (used when a server-side update is emulated)
    pub(crate) fn apply(&mut self, request: &TaskRequest) {
        self.title = request.title.clone();
        self.description = request.description.clone();
        self.task_date = request.task_date;
        self.priority = request.priority.unwrap_or_default();
        self.repeat_days = request.repeat_days.clone();
    }

    pub(crate) fn set_updated_at(&mut self, timestamp: String) {
        self.updated_at = Some(timestamp);
    }
}


/// The body of a "create" or "update" request
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub repeat_days: BTreeSet<DayOfWeek>,
}

impl TaskRequest {
    pub fn new<S: ToString>(title: S) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    /// A request for a task on a given day, with a medium priority
    pub fn for_day(date: NaiveDate) -> Self {
        Self {
            priority: Some(Priority::Medium),
            task_date: Some(date),
            ..Self::default()
        }
    }

    pub fn with_description<S: ToString>(mut self, description: S) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.task_date = Some(date);
        self
    }

    pub fn repeating<I: IntoIterator<Item = DayOfWeek>>(mut self, days: I) -> Self {
        self.repeat_days = days.into_iter().collect();
        self
    }

    /// Add the day if it is not selected yet, remove it otherwise
    pub fn toggle_repeat_day(&mut self, day: DayOfWeek) {
        if self.repeat_days.remove(&day) == false {
            self.repeat_days.insert(day);
        }
    }

    /// Check this request can be sent to the server
    pub fn validate(&self) -> Result<(), Error> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(Error::Validation("a task must have a title".to_string()));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(Error::Validation(format!("a task title cannot exceed {} characters", MAX_TITLE_LEN)));
        }
        if let Some(description) = &self.description {
            if description.chars().count() > MAX_DESCRIPTION_LEN {
                return Err(Error::Validation(format!("a task description cannot exceed {} characters", MAX_DESCRIPTION_LEN)));
            }
        }
        Ok(())
    }
}

/// Pre-fill a request to edit an existing task
impl From<&Task> for TaskRequest {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            priority: Some(task.priority),
            task_date: task.task_date,
            repeat_days: task.repeat_days.clone(),
        }
    }
}


/// A page of results, as returned by list endpoints
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub number: u32,
    pub size: u32,
    pub first: bool,
    pub last: bool,
}

impl<T: Clone> Page<T> {
    /// Slice a full collection into the page `number` of `size` items
    pub fn slice(all: &[T], number: u32, size: u32) -> Self {
        let total_elements = all.len() as u64;
        let total_pages = if size == 0 { 0 } else { ((total_elements + size as u64 - 1) / size as u64) as u32 };
        let start = (number as usize).saturating_mul(size as usize).min(all.len());
        let end = start.saturating_add(size as usize).min(all.len());

        Self {
            content: all[start..end].to_vec(),
            total_elements,
            total_pages,
            number,
            size,
            first: number == 0,
            last: number.saturating_add(1) >= total_pages,
        }
    }
}


/// Filters and paging for [`TaskSource::list`](crate::traits::TaskSource::list)
#[derive(Clone, Debug, PartialEq)]
pub struct ListQuery {
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub page: u32,
    pub size: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self { completed: None, priority: None, page: 0, size: DEFAULT_PAGE_SIZE }
    }
}

impl ListQuery {
    pub(crate) fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("size", self.size.to_string()),
        ];
        if let Some(completed) = self.completed {
            params.push(("completed", completed.to_string()));
        }
        if let Some(priority) = self.priority {
            params.push(("priority", priority.as_str().to_string()));
        }
        params
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.completed.map_or(true, |c| task.completed == c)
            && self.priority.map_or(true, |p| task.priority == p)
    }
}


/// `null` is treated like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let opt = Option::<T>::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}


#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn weekday_table() {
        assert_eq!(DayOfWeek::from_sunday_index(0), Some(DayOfWeek::Sunday));
        assert_eq!(DayOfWeek::from_sunday_index(1), Some(DayOfWeek::Monday));
        assert_eq!(DayOfWeek::from_sunday_index(6), Some(DayOfWeek::Saturday));
        assert_eq!(DayOfWeek::from_sunday_index(7), None);

        assert_eq!(DayOfWeek::of(date("2024-06-09")), DayOfWeek::Sunday);
        assert_eq!(DayOfWeek::of(date("2024-06-10")), DayOfWeek::Monday);
        assert_eq!(DayOfWeek::of(date("2024-06-15")), DayOfWeek::Saturday);
    }

    #[test]
    fn deserialize_server_task() {
        let json = r#"{
            "id": "665f1c2e9b1e8a3d4c2b1a00",
            "title": "Gym",
            "taskDate": null,
            "completed": false,
            "priority": "HIGH",
            "repeatDays": ["MONDAY", "THURSDAY", "MONDAY"],
            "excludedDates": ["2024-06-17"],
            "createdAt": "2024-06-01T10:00:00Z",
            "updatedAt": "2024-06-02T10:00:00Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id(), "665f1c2e9b1e8a3d4c2b1a00");
        assert_eq!(task.priority(), Priority::High);
        assert_eq!(task.task_date(), None);
        assert_eq!(task.repeat_days().len(), 2);
        assert!(task.is_recurring());
        assert!(task.is_excluded_on(date("2024-06-17")));
        assert_eq!(task.created_at(), Some("2024-06-01T10:00:00Z"));
    }

    #[test]
    fn deserialize_sparse_task() {
        let json = r#"{"id": "1", "title": "Call mum", "repeatDays": null, "excludedDates": null, "priority": null}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.repeat_days().is_empty());
        assert!(task.excluded_dates().is_empty());
        assert_eq!(task.priority(), Priority::Medium);
        assert_eq!(task.completed(), false);
        assert_eq!(task.description(), None);
    }

    #[test]
    fn request_body() {
        let request = TaskRequest::new("Water the plants")
            .with_priority(Priority::Low)
            .on(date("2024-06-10"));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({
            "title": "Water the plants",
            "priority": "LOW",
            "taskDate": "2024-06-10",
        }));

        let request = TaskRequest::new("Gym").repeating(vec![DayOfWeek::Thursday, DayOfWeek::Monday]);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["repeatDays"], serde_json::json!(["MONDAY", "THURSDAY"]));
    }

    #[test]
    fn validation() {
        assert!(TaskRequest::new("").validate().is_err());
        assert!(TaskRequest::new("   ").validate().is_err());
        assert!(TaskRequest::new("x".repeat(MAX_TITLE_LEN + 1)).validate().is_err());
        assert!(TaskRequest::new("ok").with_description("d".repeat(MAX_DESCRIPTION_LEN + 1)).validate().is_err());
        assert!(TaskRequest::new("ok").validate().is_ok());
    }

    #[test]
    fn toggle_repeat_day() {
        let mut request = TaskRequest::new("Gym");
        request.toggle_repeat_day(DayOfWeek::Friday);
        request.toggle_repeat_day(DayOfWeek::Monday);
        assert_eq!(request.repeat_days.len(), 2);
        request.toggle_repeat_day(DayOfWeek::Friday);
        assert_eq!(request.repeat_days.iter().copied().collect::<Vec<_>>(), vec![DayOfWeek::Monday]);
    }

    #[test]
    fn page_slicing() {
        let all: Vec<u32> = (0..45).collect();
        let page = Page::slice(&all, 0, 20);
        assert_eq!(page.content.len(), 20);
        assert_eq!(page.total_pages, 3);
        assert!(page.first);
        assert!(page.last == false);

        let page = Page::slice(&all, 2, 20);
        assert_eq!(page.content, (40..45).collect::<Vec<_>>());
        assert!(page.last);

        let page = Page::slice(&all, 5, 20);
        assert!(page.content.is_empty());

        let page = Page::slice(&all, u32::MAX, 20);
        assert!(page.content.is_empty());
        assert!(page.last);
        assert!(page.first == false);
    }

    #[test]
    fn query_params() {
        let query = ListQuery { completed: Some(false), priority: Some(Priority::High), ..ListQuery::default() };
        assert_eq!(query.to_params(), vec![
            ("page", "0".to_string()),
            ("size", "20".to_string()),
            ("completed", "false".to_string()),
            ("priority", "HIGH".to_string()),
        ]);
    }
}
