//! Some utility functions

use crate::agenda::Agenda;
use crate::calendar::CalendarDay;
use crate::task::Task;
use crate::traits::TaskSource;

/// A debug utility that pretty-prints the calendar strip, with the number of tasks of each day
pub fn print_day_strip<T: TaskSource>(agenda: &Agenda<T>) {
    let selected = agenda.selected_day().date();
    for day in agenda.days().visible_days() {
        let marker = if day.date() == selected { ">" } else { " " };
        println!("{} {}", marker, format_day(day, agenda.count_for(day)));
    }
}

/// A debug utility that pretty-prints the tasks of the selected day
pub fn print_selected_day<T: TaskSource>(agenda: &Agenda<T>) {
    let day = agenda.selected_day();
    println!("---- {} ({}) ----", day.label(), day.iso());
    let tasks = agenda.visible_tasks();
    if tasks.is_empty() {
        println!("    (nothing planned)");
    }
    for task in tasks {
        print_task(task);
    }
}

pub fn print_task(task: &Task) {
    let completion = if task.completed() { "✓" } else { " " };
    let recurrence = if task.is_recurring() { "↻" } else { " " };
    println!("    {}{} [{}] {}\t{}", completion, recurrence, task.priority(), task.title(), task.id());
}

fn format_day(day: &CalendarDay, count: usize) -> String {
    format!("{:<9} {:>2} {}\t{} task(s)", day.label(), day.day_number(), day.month_short(), count)
}
