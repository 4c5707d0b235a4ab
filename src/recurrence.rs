//! Decides on which calendar days a task shows up
//!
//! A task is visible on a day when
//! 1. the day is not one of its excluded dates (this is always checked first), and
//! 2. either the day is its scheduled date, or the weekday of the day is one of its recurrence days.
//!
//! Counting and filtering both go through [`visible_on`], so that the per-day counters
//! of a calendar strip always agree with the list displayed for that day.

use chrono::NaiveDate;

use crate::task::{DayOfWeek, Task};

/// Whether `task` should be displayed on `day`
pub fn is_visible(task: &Task, day: NaiveDate) -> bool {
    if task.is_excluded_on(day) {
        return false;
    }

    if task.task_date() == Some(day) {
        return true;
    }

    if task.is_recurring() {
        return task.repeat_days().contains(&DayOfWeek::of(day));
    }

    false
}

/// The tasks of `tasks` that are visible on `day`, in their original order
pub fn visible_on<'a>(tasks: &'a [Task], day: NaiveDate) -> impl Iterator<Item = &'a Task> + 'a {
    tasks.iter().filter(move |task| is_visible(task, day))
}

/// How many tasks of `tasks` are visible on `day`
pub fn count_for_day(tasks: &[Task], day: NaiveDate) -> usize {
    visible_on(tasks, day).count()
}
