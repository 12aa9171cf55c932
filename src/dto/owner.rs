use crate::domain;
use crate::dto::lists::{Folder, List, Task, convert_all};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// DTO for the settings screen: every list the owner has and which ones are public
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct OwnerLists {
    pub lists: Vec<List>,
    #[schema(example = json!({"83526310": true}))]
    pub public_lists: HashMap<String, bool>,
    pub folders: Vec<Folder>,
}

impl From<domain::owner::OwnerSettings> for OwnerLists {
    fn from(value: domain::owner::OwnerSettings) -> Self {
        OwnerLists {
            lists: convert_all(value.lists),
            public_lists: value.public_lists,
            folders: convert_all(value.folders),
        }
    }
}

/// DTO replacing an owner's entire public list map
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct UpdatePublicLists {
    #[validate(custom = "list_ids_are_numeric")]
    #[schema(example = json!({"83526310": true, "83526311": false}))]
    pub public_lists: HashMap<String, bool>,
}

fn list_ids_are_numeric(public_lists: &HashMap<String, bool>) -> Result<(), ValidationError> {
    let all_numeric = public_lists
        .keys()
        .all(|list_id| !list_id.is_empty() && list_id.bytes().all(|byte| byte.is_ascii_digit()));

    if all_numeric {
        Ok(())
    } else {
        Err(ValidationError::new("list_id_not_numeric"))
    }
}

/// DTO for an owner's public lists
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct PublicListing {
    pub lists: Vec<List>,
    #[schema(example = "Jane Doe")]
    pub name: String,
}

impl From<domain::public::PublicListing> for PublicListing {
    fn from(value: domain::public::PublicListing) -> Self {
        PublicListing {
            lists: convert_all(value.lists),
            name: value.name,
        }
    }
}

/// DTO for a public list and its tasks
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct ListTasks {
    pub list: List,
    pub tasks: Vec<Task>,
}

impl From<domain::lists::ListWithTasks> for ListTasks {
    fn from(value: domain::lists::ListWithTasks) -> Self {
        ListTasks {
            list: value.list.into(),
            tasks: convert_all(value.tasks),
        }
    }
}

/// DTO for a single public task
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct TaskInfo {
    pub task: Task,
}

#[cfg(test)]
mod tests {
    use super::*;

    mod update_public_lists {
        use super::*;

        #[test]
        fn numeric_list_ids_pass() {
            let update = UpdatePublicLists {
                public_lists: HashMap::from([
                    ("83526310".to_owned(), true),
                    ("1".to_owned(), false),
                ]),
            };

            assert!(update.validate().is_ok());
        }

        #[test]
        fn empty_map_passes() {
            let update = UpdatePublicLists {
                public_lists: HashMap::new(),
            };

            assert!(update.validate().is_ok());
        }

        #[test]
        fn non_numeric_list_id_gets_rejected() {
            let update = UpdatePublicLists {
                public_lists: HashMap::from([("$where".to_owned(), true)]),
            };

            let validation_result = update.validate();
            assert!(validation_result.is_err());
            let validation_errors = validation_result.unwrap_err();
            assert!(validation_errors.field_errors().contains_key("public_lists"));
        }
    }
}
