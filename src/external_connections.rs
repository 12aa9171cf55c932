use sqlx::PgConnection;

/// Something that can lend out a live database connection
pub trait ConnectionHandle: Send {
    fn borrow_connection(&mut self) -> &mut PgConnection;
}

/// Provides access to the systems outside this service (the owner database and
/// the upstream HTTP API) so driven adapters don't have to own their own clients
pub trait ExternalConnectivity: Send + Sync {
    type DbHandle<'cxn_borrow>: ConnectionHandle
    where
        Self: 'cxn_borrow;

    /// Acquires a database connection for the duration of the returned handle
    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error>;

    /// HTTP client with tracing middleware attached, shared by every outbound request
    fn http_client(&self) -> &reqwest_middleware::ClientWithMiddleware;
}
