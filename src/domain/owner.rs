use crate::domain::lists::driven_ports::ListSource;
use crate::domain::lists::{Folder, List};
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use derive_more::Display;
use std::collections::HashMap;
use tracing::{error, info};

/// Map from upstream list id to whether that list is visible to anonymous visitors
pub type PublicLists = HashMap<String, bool>;

/// Someone who linked their Wunderlist account and decides which of their lists are public
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Owner {
    pub wid: String,
    pub access_token: String,
    pub name: String,
    pub public_lists: PublicLists,
}

impl Owner {
    /// Lists missing from the map are private
    pub fn is_list_public(&self, list_id: &str) -> bool {
        self.public_lists.get(list_id).copied().unwrap_or(false)
    }
}

/// What a successful upstream authorization tells us about an owner
#[derive(PartialEq, Eq, Debug, Clone, Display)]
#[display("{name} ({wid})")]
pub struct OwnerLogin {
    pub wid: String,
    pub access_token: String,
    pub name: String,
}

/// Everything the settings screen needs
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct OwnerSettings {
    pub lists: Vec<List>,
    pub folders: Vec<Folder>,
    pub public_lists: PublicLists,
}

pub mod driven_ports {
    use super::*;

    pub trait OwnerReader: Sync {
        async fn owner_by_wid(
            &self,
            wid: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Owner>, anyhow::Error>;
    }

    pub trait OwnerWriter: Sync {
        /// Creates the owner on first login, otherwise refreshes their token and name.
        /// The public list map of an existing owner is left alone.
        async fn upsert_login(
            &self,
            login: &OwnerLogin,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Owner, anyhow::Error>;

        /// Replaces the whole public list map. Returns [None] if the owner doesn't exist.
        async fn update_public_lists(
            &self,
            wid: &str,
            public_lists: &PublicLists,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Owner>, anyhow::Error>;
    }

    /// Trades an OAuth authorization code for an access token and the profile it belongs to
    pub trait TokenExchange: Sync {
        async fn exchange_code(
            &self,
            code: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<OwnerLogin, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum OwnerError {
        #[error("the owner does not exist")]
        OwnerDoesNotExist,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    #[cfg(test)]
    impl Clone for OwnerError {
        fn clone(&self) -> Self {
            match self {
                Self::OwnerDoesNotExist => Self::OwnerDoesNotExist,
                Self::PortError(err) => Self::PortError(anyhow::anyhow!(format!("{err:#}"))),
            }
        }
    }

    pub trait OwnerPort: Sync {
        async fn login(
            &self,
            code: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            exchange: &impl driven_ports::TokenExchange,
            owner_write: &impl driven_ports::OwnerWriter,
        ) -> Result<Owner, anyhow::Error>;
        async fn login_locally(
            &self,
            local_login: &OwnerLogin,
            ext_cxn: &mut impl ExternalConnectivity,
            owner_write: &impl driven_ports::OwnerWriter,
        ) -> Result<Owner, anyhow::Error>;
        async fn settings(
            &self,
            wid: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            owner_read: &impl driven_ports::OwnerReader,
            list_source: &impl ListSource,
        ) -> Result<OwnerSettings, OwnerError>;
        async fn update_public_lists(
            &self,
            wid: &str,
            public_lists: &PublicLists,
            ext_cxn: &mut impl ExternalConnectivity,
            owner_write: &impl driven_ports::OwnerWriter,
        ) -> Result<Owner, OwnerError>;
    }
}

pub struct OwnerService {}

impl driving_ports::OwnerPort for OwnerService {
    async fn login(
        &self,
        code: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        exchange: &impl driven_ports::TokenExchange,
        owner_write: &impl driven_ports::OwnerWriter,
    ) -> Result<Owner, anyhow::Error> {
        let login = exchange
            .exchange_code(code, &mut *ext_cxn)
            .await
            .context("exchanging authorization code")?;
        info!("Authorized owner {login}");

        owner_write
            .upsert_login(&login, &mut *ext_cxn)
            .await
            .context("saving owner after login")
    }

    async fn login_locally(
        &self,
        local_login: &OwnerLogin,
        ext_cxn: &mut impl ExternalConnectivity,
        owner_write: &impl driven_ports::OwnerWriter,
    ) -> Result<Owner, anyhow::Error> {
        info!("Logging in local owner {local_login}");
        owner_write
            .upsert_login(local_login, &mut *ext_cxn)
            .await
            .context("saving local owner")
    }

    async fn settings(
        &self,
        wid: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        owner_read: &impl driven_ports::OwnerReader,
        list_source: &impl ListSource,
    ) -> Result<OwnerSettings, driving_ports::OwnerError> {
        let owner = owner_read
            .owner_by_wid(wid, &mut *ext_cxn)
            .await
            .context("looking up owner for settings")?
            .ok_or(driving_ports::OwnerError::OwnerDoesNotExist)?;

        let overview = list_source
            .fetch_lists(&owner.access_token, &mut *ext_cxn)
            .await
            .context("fetching owner's lists")?;

        Ok(OwnerSettings {
            lists: overview.lists,
            folders: overview.folders,
            public_lists: owner.public_lists,
        })
    }

    async fn update_public_lists(
        &self,
        wid: &str,
        public_lists: &PublicLists,
        ext_cxn: &mut impl ExternalConnectivity,
        owner_write: &impl driven_ports::OwnerWriter,
    ) -> Result<Owner, driving_ports::OwnerError> {
        let updated = owner_write
            .update_public_lists(wid, public_lists, &mut *ext_cxn)
            .await
            .context("updating public lists")?;

        match updated {
            Some(owner) => Ok(owner),
            None => {
                error!("Owner {wid} disappeared before their settings could be saved");
                Err(driving_ports::OwnerError::OwnerDoesNotExist)
            }
        }
    }
}
