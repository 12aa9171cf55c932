//! Lists, folders and tasks as they come from upstream. Nothing in here is stored locally.

use crate::domain::DrivenPortError;

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct List {
    pub id: u64,
    pub created_at: String,
    pub title: String,
    pub list_type: String,
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Folder {
    pub id: u64,
    pub title: String,
    pub list_ids: Vec<u64>,
    pub folder_type: String,
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Task {
    pub id: u64,
    pub created_at: String,
    pub due_date: Option<String>,
    pub list_id: u64,
    pub starred: bool,
    pub title: String,
    pub completed: bool,
    /// Filled in from a separate upstream call when tasks are fetched with their items
    pub subtasks: Option<Vec<Subtask>>,
    pub note: Option<String>,
}

impl Task {
    /// True if this task lives on the list with the given (string form) id
    pub fn belongs_to(&self, list_id: &str) -> bool {
        self.list_id.to_string() == list_id
    }
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Subtask {
    pub id: u64,
    pub created_at: String,
    pub task_id: u64,
    pub title: String,
    pub completed: bool,
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Note {
    pub id: u64,
    pub content: String,
    pub task_id: u64,
}

/// Every list and folder an owner has
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct ListOverview {
    pub lists: Vec<List>,
    pub folders: Vec<Folder>,
}

/// A list together with its tasks, each carrying its subtasks and note
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct ListWithTasks {
    pub list: List,
    pub tasks: Vec<Task>,
}

/// Percentage of the given subtasks which are completed.
///
/// An empty slice has no meaningful percentage and yields `NaN`.
pub fn subtask_percentage(subtasks: &[Subtask]) -> f64 {
    let completed = subtasks.iter().filter(|subtask| subtask.completed).count();

    completed as f64 / subtasks.len() as f64 * 100.0
}

/// Attaches subtasks and notes to the tasks they belong to
pub fn merge_task_items(tasks: &mut [Task], subtasks: Vec<Subtask>, notes: Vec<Note>) {
    for task in tasks.iter_mut() {
        task.subtasks = Some(Vec::new());
    }

    for subtask in subtasks {
        let owner = tasks.iter_mut().find(|task| task.id == subtask.task_id);
        if let Some(Task {
            subtasks: Some(task_subtasks),
            ..
        }) = owner
        {
            task_subtasks.push(subtask);
        }
    }

    for note in notes {
        if note.content.is_empty() {
            continue;
        }
        if let Some(task) = tasks.iter_mut().find(|task| task.id == note.task_id) {
            task.note = Some(note.content);
        }
    }
}

pub mod driven_ports {
    use super::*;
    use crate::external_connections::ExternalConnectivity;

    /// Read access to an owner's lists and tasks upstream. Every call is made on behalf of
    /// the owner whose access token is passed in.
    pub trait ListSource: Sync {
        async fn fetch_lists(
            &self,
            access_token: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<ListOverview, DrivenPortError>;

        async fn fetch_list(
            &self,
            list_id: &str,
            access_token: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<List, DrivenPortError>;

        async fn fetch_tasks_with_items(
            &self,
            list_id: &str,
            access_token: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<ListWithTasks, DrivenPortError>;

        async fn fetch_task_with_info(
            &self,
            task_id: &str,
            access_token: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Task, DrivenPortError>;
    }
}
