//! Anonymous read access to an owner's lists.
//!
//! Every operation re-reads the owner's record so a list made private is hidden on the very
//! next request.

use crate::domain::DrivenPortError;
use crate::domain::lists::driven_ports::ListSource;
use crate::domain::lists::{List, ListWithTasks, Task};
use crate::domain::owner::Owner;
use crate::domain::owner::driven_ports::OwnerReader;
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use thiserror::Error;

/// An owner's name together with only their public lists
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct PublicListing {
    pub name: String,
    pub lists: Vec<List>,
}

/// A single public task along with the list it sits on
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct TaskDetail {
    pub owner_name: String,
    pub list: List,
    pub task: Task,
}

#[derive(Debug, Error)]
pub enum BrowseError {
    /// Covers unknown owners, private lists, and anything upstream can't find. Visitors
    /// can't tell these apart.
    #[error("list not found or not public")]
    NotFoundOrPrivate,
    #[error(transparent)]
    PortError(#[from] anyhow::Error),
}

impl BrowseError {
    fn from_upstream(err: DrivenPortError, action: &'static str) -> Self {
        match err {
            DrivenPortError::DoesNotExist => Self::NotFoundOrPrivate,
            DrivenPortError::CommsFailure(cause) => Self::PortError(cause.context(action)),
        }
    }
}

#[cfg(test)]
impl Clone for BrowseError {
    fn clone(&self) -> Self {
        match self {
            Self::NotFoundOrPrivate => Self::NotFoundOrPrivate,
            Self::PortError(err) => Self::PortError(anyhow::anyhow!(format!("{err:#}"))),
        }
    }
}

pub mod driving_ports {
    use super::*;

    pub trait PublicBrowsePort: Sync {
        async fn public_lists(
            &self,
            wid: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            owner_read: &impl OwnerReader,
            list_source: &impl ListSource,
        ) -> Result<PublicListing, BrowseError>;
        async fn tasks(
            &self,
            wid: &str,
            list_id: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            owner_read: &impl OwnerReader,
            list_source: &impl ListSource,
        ) -> Result<(String, ListWithTasks), BrowseError>;
        async fn task_info(
            &self,
            wid: &str,
            list_id: &str,
            task_id: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            owner_read: &impl OwnerReader,
            list_source: &impl ListSource,
        ) -> Result<Task, BrowseError>;
        async fn task_detail(
            &self,
            wid: &str,
            list_id: &str,
            task_id: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            owner_read: &impl OwnerReader,
            list_source: &impl ListSource,
        ) -> Result<TaskDetail, BrowseError>;
    }
}

pub struct PublicBrowseService {}

impl PublicBrowseService {
    async fn owner(
        &self,
        wid: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        owner_read: &impl OwnerReader,
    ) -> Result<Owner, BrowseError> {
        owner_read
            .owner_by_wid(wid, ext_cxn)
            .await
            .context("looking up list owner")?
            .ok_or(BrowseError::NotFoundOrPrivate)
    }

    /// Looks up the owner and fails unless `list_id` is one of their public lists
    async fn owner_of_public_list(
        &self,
        wid: &str,
        list_id: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        owner_read: &impl OwnerReader,
    ) -> Result<Owner, BrowseError> {
        let owner = self.owner(wid, ext_cxn, owner_read).await?;
        if owner.is_list_public(list_id) {
            Ok(owner)
        } else {
            Err(BrowseError::NotFoundOrPrivate)
        }
    }

    async fn public_task(
        &self,
        owner: &Owner,
        list_id: &str,
        task_id: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        list_source: &impl ListSource,
    ) -> Result<Task, BrowseError> {
        let task = list_source
            .fetch_task_with_info(task_id, &owner.access_token, ext_cxn)
            .await
            .map_err(|err| BrowseError::from_upstream(err, "fetching public task"))?;

        // The list check above only covers the list in the URL, not the one the task is on
        if task.belongs_to(list_id) {
            Ok(task)
        } else {
            Err(BrowseError::NotFoundOrPrivate)
        }
    }
}

impl driving_ports::PublicBrowsePort for PublicBrowseService {
    async fn public_lists(
        &self,
        wid: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        owner_read: &impl OwnerReader,
        list_source: &impl ListSource,
    ) -> Result<PublicListing, BrowseError> {
        let owner = self.owner(wid, &mut *ext_cxn, owner_read).await?;
        let overview = list_source
            .fetch_lists(&owner.access_token, &mut *ext_cxn)
            .await
            .map_err(|err| BrowseError::from_upstream(err, "fetching lists for public listing"))?;

        let lists = overview
            .lists
            .into_iter()
            .filter(|list| owner.is_list_public(&list.id.to_string()))
            .collect();

        Ok(PublicListing {
            name: owner.name,
            lists,
        })
    }

    async fn tasks(
        &self,
        wid: &str,
        list_id: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        owner_read: &impl OwnerReader,
        list_source: &impl ListSource,
    ) -> Result<(String, ListWithTasks), BrowseError> {
        let owner = self
            .owner_of_public_list(wid, list_id, &mut *ext_cxn, owner_read)
            .await?;
        let list_with_tasks = list_source
            .fetch_tasks_with_items(list_id, &owner.access_token, &mut *ext_cxn)
            .await
            .map_err(|err| BrowseError::from_upstream(err, "fetching tasks of public list"))?;

        Ok((owner.name, list_with_tasks))
    }

    async fn task_info(
        &self,
        wid: &str,
        list_id: &str,
        task_id: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        owner_read: &impl OwnerReader,
        list_source: &impl ListSource,
    ) -> Result<Task, BrowseError> {
        let owner = self
            .owner_of_public_list(wid, list_id, &mut *ext_cxn, owner_read)
            .await?;

        self.public_task(&owner, list_id, task_id, &mut *ext_cxn, list_source)
            .await
    }

    async fn task_detail(
        &self,
        wid: &str,
        list_id: &str,
        task_id: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        owner_read: &impl OwnerReader,
        list_source: &impl ListSource,
    ) -> Result<TaskDetail, BrowseError> {
        let owner = self
            .owner_of_public_list(wid, list_id, &mut *ext_cxn, owner_read)
            .await?;
        let list = list_source
            .fetch_list(list_id, &owner.access_token, &mut *ext_cxn)
            .await
            .map_err(|err| BrowseError::from_upstream(err, "fetching public list"))?;
        let task = self
            .public_task(&owner, list_id, task_id, &mut *ext_cxn, list_source)
            .await?;

        Ok(TaskDetail {
            owner_name: owner.name,
            list,
            task,
        })
    }
}
