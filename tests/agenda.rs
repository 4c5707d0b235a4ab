//! Scenarios on an agenda: what is displayed on which day, and what reaches the task source.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskify::agenda::{Agenda, DeleteScope};
use taskify::client::Client;
use taskify::credentials::{MemoryTokenStore, TokenStore};
use taskify::mock_behaviour::MockBehaviour;
use taskify::mock_source::MemoryTaskSource;
use taskify::task::{DayOfWeek, Priority, TaskRequest};
use taskify::Error;


fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// An agenda starting on Monday 2024-06-10, with:
/// * a dentist appointment on Wednesday 2024-06-12
/// * a gym session every Monday and Thursday
/// * an undated task
async fn populated_agenda() -> Agenda<MemoryTaskSource> {
    let mut agenda = Agenda::starting(MemoryTaskSource::new(), date("2024-06-10"));

    agenda.save(None, &TaskRequest::new("Dentist").on(date("2024-06-12")).with_priority(Priority::High)).await.unwrap();
    agenda.save(None, &TaskRequest::new("Gym").repeating(vec![DayOfWeek::Monday, DayOfWeek::Thursday])).await.unwrap();
    agenda.save(None, &TaskRequest::new("Someday, maybe")).await.unwrap();
    agenda
}

fn id_of<T: taskify::traits::TaskSource>(agenda: &Agenda<T>, title: &str) -> String {
    agenda.tasks().iter().find(|t| t.title() == title).unwrap().id().to_string()
}


#[tokio::test]
async fn counts_match_the_displayed_tasks() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut agenda = populated_agenda().await;
    assert_eq!(agenda.tasks().len(), 3);

    let expected_counts = [1, 0, 1, 1, 0, 0, 0, 1, 0, 0, 1, 0, 0, 0];
    let counts: Vec<usize> = agenda.days().days().iter().map(|d| agenda.count_for(d)).collect();
    assert_eq!(counts, expected_counts);

    let dates: Vec<NaiveDate> = agenda.days().days().iter().map(|d| d.date()).collect();
    for day in dates {
        assert!(agenda.select_day(day));
        let count = agenda.count_for(agenda.selected_day());
        assert_eq!(agenda.visible_tasks().len(), count, "on {}", day);
    }

    // The undated task never shows up
    assert!(agenda.days().days().iter().all(|d| {
        agenda.tasks().iter().filter(|t| t.title() == "Someday, maybe").all(|t| t.is_visible_on(d.date()) == false)
    }));
}

#[tokio::test]
async fn excluding_a_single_occurrence() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut agenda = populated_agenda().await;
    let gym = id_of(&agenda, "Gym");

    assert!(agenda.select_day(date("2024-06-17")));
    assert!(Agenda::<MemoryTaskSource>::needs_scope_choice(agenda.task(&gym).unwrap()));
    agenda.delete(&gym, DeleteScope::SelectedDate).await.unwrap();

    assert!(agenda.visible_tasks().is_empty());
    assert_eq!(agenda.count_for(agenda.selected_day()), 0);
    // Other Mondays are untouched
    assert!(agenda.select_day(date("2024-06-10")));
    assert_eq!(agenda.visible_tasks()[0].id(), gym);

    assert_eq!(agenda.source().history().last().unwrap(), &format!("exclude {} 2024-06-17", gym));
    // The task was patched in place, and still exists on the source
    assert_eq!(agenda.tasks().len(), 3);
    assert_eq!(agenda.source().tasks().len(), 3);
}

#[tokio::test]
async fn deleting_a_single_task_sends_a_single_delete() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut agenda = populated_agenda().await;
    let dentist = id_of(&agenda, "Dentist");
    assert!(Agenda::<MemoryTaskSource>::needs_scope_choice(agenda.task(&dentist).unwrap()) == false);

    agenda.delete(&dentist, DeleteScope::Everything).await.unwrap();

    let deletes: Vec<String> = agenda.source().history().into_iter().filter(|a| a.starts_with("delete")).collect();
    assert_eq!(deletes, vec![format!("delete {}", dentist)]);
    assert_eq!(agenda.tasks().len(), 2);
    assert!(agenda.task(&dentist).is_none());
    assert_eq!(agenda.last_error(), None);
}

#[tokio::test]
async fn toggling_completion() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut agenda = populated_agenda().await;
    let dentist = id_of(&agenda, "Dentist");

    agenda.toggle_complete(&dentist).await.unwrap();
    assert!(agenda.task(&dentist).unwrap().completed());
    agenda.toggle_complete(&dentist).await.unwrap();
    assert!(agenda.task(&dentist).unwrap().completed() == false);

    assert!(matches!(agenda.toggle_complete("unknown").await, Err(Error::NotFound(_))));

    agenda.source().set_mock_behaviour(MockBehaviour::fail_now(1));
    assert!(agenda.toggle_complete(&dentist).await.is_err());
    assert_eq!(agenda.last_error(), Some("Could not update the task"));
    assert!(agenda.task(&dentist).unwrap().completed() == false);
}

#[tokio::test]
async fn editing_a_task() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut agenda = populated_agenda().await;
    let dentist = id_of(&agenda, "Dentist");

    let mut request = TaskRequest::from(agenda.task(&dentist).unwrap());
    assert_eq!(request.priority, Some(Priority::High));
    request.task_date = Some(date("2024-06-13"));
    agenda.save(Some(&dentist), &request).await.unwrap();

    assert!(agenda.select_day(date("2024-06-13")));
    let titles: Vec<&str> = agenda.visible_tasks().iter().map(|t| t.title()).collect();
    assert_eq!(titles, vec!["Dentist", "Gym"]);
}

#[tokio::test]
async fn validation_errors_reach_nobody() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut agenda = populated_agenda().await;
    let before = agenda.source().history().len();

    let draft = agenda.draft();
    assert!(matches!(agenda.save(None, &draft).await, Err(Error::Validation(_))));
    assert_eq!(agenda.source().history().len(), before);
    assert_eq!(agenda.last_error(), None);
}

#[tokio::test]
async fn the_strip_spans_two_weeks() {
    let agenda = Agenda::starting(MemoryTaskSource::new(), date("2024-06-10"));
    let days = agenda.days().days();
    assert_eq!(days.len(), 14);
    assert_eq!(days[13].date(), date("2024-06-10") + Duration::days(13));
    assert!(agenda.selected_day().is_today());
}

#[tokio::test]
async fn an_ended_session_is_reported() {
    let _ = env_logger::builder().is_test(true).try_init();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid refresh token"})))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = Arc::new(MemoryTokenStore::with_tokens("expired", "r1"));
    let client = Client::new(format!("{}/api", server.uri()), tokens.clone()).unwrap();
    let mut agenda = Agenda::starting(client, date("2024-06-10"));

    let err = agenda.load().await.unwrap_err();
    assert!(err.is_session_ended());
    assert_eq!(agenda.last_error(), Some("Your session has expired, please log in again"));
    assert!(agenda.is_loading() == false);
    assert!(tokens.is_authenticated() == false);
}
