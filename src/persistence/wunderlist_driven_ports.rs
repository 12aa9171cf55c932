//! HTTP adapter for the Wunderlist REST API (v1)

use crate::app_env::WunderlistConfig;
use crate::domain;
use crate::domain::DrivenPortError;
use crate::domain::lists::{Folder, List, ListOverview, ListWithTasks, Note, Subtask, Task};
use crate::domain::owner::OwnerLogin;
use crate::external_connections::ExternalConnectivity;
use anyhow::{Context, anyhow};
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// Talks to Wunderlist on behalf of an owner, identified by their access token
pub struct WunderlistClient {
    api_url: String,
    oauth_url: String,
    client_id: String,
    client_secret: String,
}

impl WunderlistClient {
    pub fn new(config: &WunderlistConfig) -> Self {
        WunderlistClient {
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            oauth_url: config.oauth_url.trim_end_matches('/').to_owned(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }

    /// Where to send an owner so they can authorize this application
    pub fn authorize_url(&self, redirect_uri: &str, state: &str) -> Result<Url, url::ParseError> {
        Url::parse_with_params(
            &format!("{}/authorize", self.oauth_url),
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("state", state),
            ],
        )
    }

    async fn get<T: DeserializeOwned>(
        &self,
        http_client: &ClientWithMiddleware,
        path: &str,
        query: &[(&str, &str)],
        access_token: &str,
    ) -> Result<T, DrivenPortError> {
        debug!("Fetching {path} from Wunderlist");
        let response = http_client
            .get(format!("{}{path}", self.api_url))
            .header("X-Access-Token", access_token)
            .header("X-Client-ID", &self.client_id)
            .query(query)
            .send()
            .await
            .with_context(|| format!("requesting {path} from Wunderlist"))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(DrivenPortError::DoesNotExist);
        }

        let body = response
            .error_for_status()
            .with_context(|| format!("Wunderlist rejected request for {path}"))?
            .json::<T>()
            .await
            .with_context(|| format!("reading Wunderlist response for {path}"))?;

        Ok(body)
    }
}

#[derive(Deserialize)]
struct WireList {
    id: u64,
    created_at: String,
    title: String,
    #[serde(rename = "type")]
    list_type: String,
}

impl From<WireList> for List {
    fn from(value: WireList) -> Self {
        List {
            id: value.id,
            created_at: value.created_at,
            title: value.title,
            list_type: value.list_type,
        }
    }
}

#[derive(Deserialize)]
struct WireFolder {
    id: u64,
    title: String,
    #[serde(default)]
    list_ids: Vec<u64>,
    #[serde(rename = "type")]
    folder_type: String,
}

impl From<WireFolder> for Folder {
    fn from(value: WireFolder) -> Self {
        Folder {
            id: value.id,
            title: value.title,
            list_ids: value.list_ids,
            folder_type: value.folder_type,
        }
    }
}

#[derive(Deserialize)]
struct WireTask {
    id: u64,
    created_at: String,
    #[serde(default)]
    due_date: Option<String>,
    list_id: u64,
    #[serde(default)]
    starred: bool,
    title: String,
    #[serde(default)]
    completed: bool,
}

impl From<WireTask> for Task {
    fn from(value: WireTask) -> Self {
        Task {
            id: value.id,
            created_at: value.created_at,
            due_date: value.due_date,
            list_id: value.list_id,
            starred: value.starred,
            title: value.title,
            completed: value.completed,
            subtasks: None,
            note: None,
        }
    }
}

#[derive(Deserialize)]
struct WireSubtask {
    id: u64,
    created_at: String,
    task_id: u64,
    title: String,
    #[serde(default)]
    completed: bool,
}

impl From<WireSubtask> for Subtask {
    fn from(value: WireSubtask) -> Self {
        Subtask {
            id: value.id,
            created_at: value.created_at,
            task_id: value.task_id,
            title: value.title,
            completed: value.completed,
        }
    }
}

#[derive(Deserialize)]
struct WireNote {
    id: u64,
    #[serde(default)]
    content: String,
    task_id: u64,
}

impl From<WireNote> for Note {
    fn from(value: WireNote) -> Self {
        Note {
            id: value.id,
            content: value.content,
            task_id: value.task_id,
        }
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct WireUser {
    id: u64,
    name: String,
}

fn convert_all<W, D: From<W>>(wire: Vec<W>) -> Vec<D> {
    wire.into_iter().map(D::from).collect()
}

impl domain::lists::driven_ports::ListSource for WunderlistClient {
    async fn fetch_lists(
        &self,
        access_token: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<ListOverview, DrivenPortError> {
        let http_client = ext_cxn.http_client();
        let (lists, folders) = futures::try_join!(
            self.get::<Vec<WireList>>(http_client, "/lists", &[], access_token),
            self.get::<Vec<WireFolder>>(http_client, "/folders", &[], access_token),
        )?;

        Ok(ListOverview {
            lists: convert_all(lists),
            folders: convert_all(folders),
        })
    }

    async fn fetch_list(
        &self,
        list_id: &str,
        access_token: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<List, DrivenPortError> {
        let list: WireList = self
            .get(ext_cxn.http_client(), &format!("/lists/{list_id}"), &[], access_token)
            .await?;

        Ok(list.into())
    }

    async fn fetch_tasks_with_items(
        &self,
        list_id: &str,
        access_token: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<ListWithTasks, DrivenPortError> {
        let http_client = ext_cxn.http_client();
        let list_path = format!("/lists/{list_id}");
        let by_list = [("list_id", list_id)];

        let (list, tasks, subtasks, notes) = futures::try_join!(
            self.get::<WireList>(http_client, &list_path, &[], access_token),
            self.get::<Vec<WireTask>>(http_client, "/tasks", &by_list, access_token),
            self.get::<Vec<WireSubtask>>(http_client, "/subtasks", &by_list, access_token),
            self.get::<Vec<WireNote>>(http_client, "/notes", &by_list, access_token),
        )?;

        let mut tasks: Vec<Task> = convert_all(tasks);
        domain::lists::merge_task_items(&mut tasks, convert_all(subtasks), convert_all(notes));

        Ok(ListWithTasks {
            list: list.into(),
            tasks,
        })
    }

    async fn fetch_task_with_info(
        &self,
        task_id: &str,
        access_token: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Task, DrivenPortError> {
        let http_client = ext_cxn.http_client();
        let task_path = format!("/tasks/{task_id}");
        let by_task = [("task_id", task_id)];

        let (task, subtasks, notes) = futures::try_join!(
            self.get::<WireTask>(http_client, &task_path, &[], access_token),
            self.get::<Vec<WireSubtask>>(http_client, "/subtasks", &by_task, access_token),
            self.get::<Vec<WireNote>>(http_client, "/notes", &by_task, access_token),
        )?;

        let mut tasks = vec![Task::from(task)];
        domain::lists::merge_task_items(&mut tasks, convert_all(subtasks), convert_all(notes));

        tasks
            .pop()
            .ok_or_else(|| DrivenPortError::CommsFailure(anyhow!("task vanished while merging")))
    }
}

impl domain::owner::driven_ports::TokenExchange for WunderlistClient {
    async fn exchange_code(
        &self,
        code: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<OwnerLogin, anyhow::Error> {
        let http_client = ext_cxn.http_client();
        let token: TokenResponse = http_client
            .post(format!("{}/access_token", self.oauth_url))
            .json(&TokenRequest {
                client_id: &self.client_id,
                client_secret: &self.client_secret,
                code,
            })
            .send()
            .await
            .context("requesting Wunderlist access token")?
            .error_for_status()
            .context("Wunderlist refused the authorization code")?
            .json()
            .await
            .context("reading Wunderlist access token")?;

        let user: WireUser = self
            .get(http_client, "/user", &[], &token.access_token)
            .await
            .context("fetching the authorized Wunderlist user")?;

        Ok(OwnerLogin {
            wid: user.id.to_string(),
            access_token: token.access_token,
            name: user.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculoos::prelude::*;

    fn client() -> WunderlistClient {
        WunderlistClient::new(&WunderlistConfig {
            client_id: "my client".to_owned(),
            client_secret: "shh".to_owned(),
            api_url: "https://a.wunderlist.com/api/v1/".to_owned(),
            oauth_url: "https://www.wunderlist.com/oauth".to_owned(),
            callback_url: "https://publists.example.com/callback".to_owned(),
        })
    }

    #[test]
    fn authorize_url_carries_client_redirect_and_state() {
        let url = client()
            .authorize_url("https://publists.example.com/callback", "s3cret")
            .expect("authorize url should parse");

        assert_eq!("www.wunderlist.com", url.host_str().unwrap_or_default());
        assert_eq!("/oauth/authorize", url.path());
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_that!(params).contains(("client_id".to_owned(), "my client".to_owned()));
        assert_that!(params).contains((
            "redirect_uri".to_owned(),
            "https://publists.example.com/callback".to_owned(),
        ));
        assert_that!(params).contains(("state".to_owned(), "s3cret".to_owned()));
    }

    #[test]
    fn trailing_slash_is_trimmed_from_api_url() {
        assert_eq!("https://a.wunderlist.com/api/v1", client().api_url);
    }

    #[test]
    fn parses_upstream_task_payload() {
        let raw = r#"{
            "id": 409233670,
            "assignee_id": 123,
            "created_at": "2013-08-30T08:36:13.273Z",
            "created_by_id": 6234958,
            "due_date": "2013-09-05",
            "list_id": 12345,
            "revision": 1,
            "starred": true,
            "title": "Hello"
        }"#;

        let task = Task::from(serde_json::from_str::<WireTask>(raw).expect("task should parse"));
        assert_that!(task).matches(|task| {
            task.id == 409233670
                && task.list_id == 12345
                && task.starred
                && !task.completed
                && task.due_date.as_deref() == Some("2013-09-05")
                && task.subtasks.is_none()
        });
    }

    #[test]
    fn parses_list_type_field() {
        let raw = r#"{"id": 83526310, "created_at": "2013-08-30T08:29:46.203Z",
            "title": "Read Later", "type": "list", "revision": 10}"#;

        let list = List::from(serde_json::from_str::<WireList>(raw).expect("list should parse"));
        assert_eq!("list", list.list_type);
        assert_eq!("Read Later", list.title);
    }
}
