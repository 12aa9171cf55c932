use crate::domain;
use crate::domain::owner::{Owner, OwnerLogin, PublicLists};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use sqlx::types::Json;
use sqlx::{FromRow, query_as};

/// Reads and writes owners in the `publist_owner` table
pub struct DbOwnerStore {}

#[derive(FromRow)]
struct OwnerRow {
    wid: String,
    access_token: String,
    name: String,
    public_lists: Json<PublicLists>,
}

impl From<OwnerRow> for Owner {
    fn from(value: OwnerRow) -> Self {
        Owner {
            wid: value.wid,
            access_token: value.access_token,
            name: value.name,
            public_lists: value.public_lists.0,
        }
    }
}

impl domain::owner::driven_ports::OwnerReader for DbOwnerStore {
    async fn owner_by_wid(
        &self,
        wid: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Owner>, Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let owner = query_as::<_, OwnerRow>(
            "SELECT wid, access_token, name, public_lists FROM publist_owner WHERE wid = $1",
        )
        .bind(wid)
        .fetch_optional(cxn_handle.borrow_connection())
        .await
        .context("Fetching an owner by wid")?;

        Ok(owner.map(Owner::from))
    }
}

impl domain::owner::driven_ports::OwnerWriter for DbOwnerStore {
    async fn upsert_login(
        &self,
        login: &OwnerLogin,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Owner, Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let owner = query_as::<_, OwnerRow>(
            "INSERT INTO publist_owner (wid, access_token, name) VALUES ($1, $2, $3) \
             ON CONFLICT (wid) DO UPDATE SET access_token = EXCLUDED.access_token, name = EXCLUDED.name \
             RETURNING wid, access_token, name, public_lists",
        )
        .bind(&login.wid)
        .bind(&login.access_token)
        .bind(&login.name)
        .fetch_one(cxn_handle.borrow_connection())
        .await
        .context("Upserting owner on login")?;

        Ok(owner.into())
    }

    async fn update_public_lists(
        &self,
        wid: &str,
        public_lists: &PublicLists,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Owner>, Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let owner = query_as::<_, OwnerRow>(
            "UPDATE publist_owner SET public_lists = $2 WHERE wid = $1 \
             RETURNING wid, access_token, name, public_lists",
        )
        .bind(wid)
        .bind(Json(public_lists))
        .fetch_optional(cxn_handle.borrow_connection())
        .await
        .context("Replacing an owner's public lists")?;

        Ok(owner.map(Owner::from))
    }
}
