use crate::domain;
use serde::Serialize;
use utoipa::ToSchema;

/// DTO for one of an owner's upstream lists
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize, Debug, PartialEq, Eq))]
pub struct List {
    #[schema(example = 83526310)]
    pub id: u64,
    #[schema(example = "2013-08-30T08:29:46.203Z")]
    pub created_at: String,
    #[schema(example = "Read Later")]
    pub title: String,
    #[serde(rename = "type")]
    #[schema(example = "list")]
    pub list_type: String,
}

impl From<domain::lists::List> for List {
    fn from(value: domain::lists::List) -> Self {
        List {
            id: value.id,
            created_at: value.created_at,
            title: value.title,
            list_type: value.list_type,
        }
    }
}

/// DTO for a folder grouping several lists
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize, Debug))]
pub struct Folder {
    #[schema(example = 83526310)]
    pub id: u64,
    #[schema(example = "Work")]
    pub title: String,
    pub list_ids: Vec<u64>,
    #[serde(rename = "type")]
    #[schema(example = "folder")]
    pub folder_type: String,
}

impl From<domain::lists::Folder> for Folder {
    fn from(value: domain::lists::Folder) -> Self {
        Folder {
            id: value.id,
            title: value.title,
            list_ids: value.list_ids,
            folder_type: value.folder_type,
        }
    }
}

/// DTO for a task, with its subtasks and note when they were fetched
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize, Debug))]
pub struct Task {
    #[schema(example = 409233670)]
    pub id: u64,
    #[schema(example = "2013-08-30T08:36:13.273Z")]
    pub created_at: String,
    #[schema(example = "2013-09-05")]
    pub due_date: Option<String>,
    #[schema(example = 83526310)]
    pub list_id: u64,
    pub starred: bool,
    #[schema(example = "Buy milk")]
    pub title: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtasks: Option<Vec<Subtask>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl From<domain::lists::Task> for Task {
    fn from(value: domain::lists::Task) -> Self {
        Task {
            id: value.id,
            created_at: value.created_at,
            due_date: value.due_date,
            list_id: value.list_id,
            starred: value.starred,
            title: value.title,
            completed: value.completed,
            subtasks: value
                .subtasks
                .map(|subtasks| subtasks.into_iter().map(Subtask::from).collect()),
            note: value.note,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize, Debug))]
pub struct Subtask {
    #[schema(example = 5)]
    pub id: u64,
    pub created_at: String,
    pub task_id: u64,
    #[schema(example = "Check the fridge first")]
    pub title: String,
    pub completed: bool,
}

impl From<domain::lists::Subtask> for Subtask {
    fn from(value: domain::lists::Subtask) -> Self {
        Subtask {
            id: value.id,
            created_at: value.created_at,
            task_id: value.task_id,
            title: value.title,
            completed: value.completed,
        }
    }
}

/// Converts a whole collection of domain values into their DTOs
pub fn convert_all<D, T: From<D>>(values: Vec<D>) -> Vec<T> {
    values.into_iter().map(T::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_type_serializes_as_type() {
        let json = serde_json::to_value(List {
            id: 1,
            created_at: "2013-08-30T08:29:46.203Z".to_owned(),
            title: "Read Later".to_owned(),
            list_type: "list".to_owned(),
        })
        .expect("list should serialize");

        assert_eq!(Some("list"), json["type"].as_str());
        assert!(json.get("list_type").is_none());
    }

    #[test]
    fn task_without_items_omits_them() {
        let domain_task = domain::lists::Task {
            id: 1,
            created_at: String::new(),
            due_date: None,
            list_id: 2,
            starred: false,
            title: "Plain".to_owned(),
            completed: false,
            subtasks: None,
            note: None,
        };

        let json = serde_json::to_value(Task::from(domain_task)).expect("task should serialize");
        assert!(json.get("subtasks").is_none());
        assert!(json.get("note").is_none());
    }
}
