//! The task endpoints

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Method;

use super::Client;
use crate::credentials::TokenStore;
use crate::error::Error;
use crate::task::{ListQuery, Page, Task, TaskRequest};
use crate::traits::TaskSource;

#[async_trait]
impl<S: TokenStore> TaskSource for Client<S> {
    async fn list(&self, query: &ListQuery) -> Result<Page<Task>, Error> {
        let request = self.request(Method::GET, &["tasks"])
            .with_query(query.to_params());
        let page: Page<Task> = self.send_json(request).await?;
        log::debug!("Got {} tasks (page {}/{})", page.content.len(), page.number + 1, page.total_pages);
        Ok(page)
    }

    async fn list_today(&self, page: u32, size: u32) -> Result<Page<Task>, Error> {
        let request = self.request(Method::GET, &["tasks", "today"])
            .with_query(vec![("page", page.to_string()), ("size", size.to_string())]);
        self.send_json(request).await
    }

    async fn create(&self, request: &TaskRequest) -> Result<Task, Error> {
        request.validate()?;
        let req = self.request(Method::POST, &["tasks"])
            .with_json(request)?;
        let task: Task = self.send_json(req).await?;
        log::info!("Created task {}", task.id());
        Ok(task)
    }

    async fn update(&self, id: &str, request: &TaskRequest) -> Result<Task, Error> {
        request.validate()?;
        let req = self.request(Method::PUT, &["tasks", id])
            .with_json(request)?;
        self.send_json(req).await
    }

    async fn delete(&self, id: &str) -> Result<(), Error> {
        let req = self.request(Method::DELETE, &["tasks", id]);
        self.send(req).await?;
        log::info!("Deleted task {}", id);
        Ok(())
    }

    async fn set_completed(&self, id: &str, completed: bool) -> Result<Task, Error> {
        let req = self.request(Method::PUT, &["tasks", id, "complete"])
            .with_query(vec![("completed", completed.to_string())]);
        self.send_json(req).await
    }

    async fn exclude_date(&self, id: &str, date: NaiveDate) -> Result<Task, Error> {
        let req = self.request(Method::PUT, &["tasks", id, "exclude"])
            .with_query(vec![("date", date.format("%Y-%m-%d").to_string())]);
        self.send_json(req).await
    }
}
