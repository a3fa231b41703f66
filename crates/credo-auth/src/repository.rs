use super::*;
use credo_core::ID;
use credo_core::Unique;
use std::sync::Arc;
use tokio_postgres::Client;

/// Sessions table name.
pub const SESSIONS: &str = "credo_sessions";

pub type PgErr = tokio_postgres::Error;

/// Store trait for session bookkeeping, keyed by session id.
/// Abstracts SQL from domain modules; owned by the composition root.
#[allow(async_fn_in_trait)]
pub trait SessionStore {
    async fn insert(&self, session: &Session) -> Result<(), PgErr>;
    async fn lookup(&self, session: ID<Session>) -> Result<Option<Session>, PgErr>;
    async fn rotate(&self, session: &Session) -> Result<(), PgErr>;
    async fn revoke(&self, session: ID<Session>) -> Result<(), PgErr>;
}

/// Session table DDL, applied once at connection time.
pub fn creates() -> &'static str {
    const_format::concatcp!(
        "CREATE TABLE IF NOT EXISTS ",
        SESSIONS,
        " (
            id          UUID PRIMARY KEY,
            user_id     UUID NOT NULL,
            token_hash  BYTEA NOT NULL,
            expires_at  BIGINT NOT NULL,
            revoked     BOOLEAN DEFAULT FALSE
        );
        CREATE INDEX IF NOT EXISTS idx_credo_sessions_user ON ",
        SESSIONS,
        " (user_id);
        CREATE INDEX IF NOT EXISTS idx_credo_sessions_expires ON ",
        SESSIONS,
        " (expires_at) WHERE NOT revoked;"
    )
}

/// Establishes a session-store connection.
///
/// Connects to PostgreSQL using the `DB_URL` environment variable and
/// applies the session DDL. Returns an `Arc<Client>` suitable for sharing
/// across async tasks.
///
/// # Panics
///
/// Panics if `DB_URL` is not set or if connection fails.
pub async fn db() -> Arc<Client> {
    log::info!("connecting to session store");
    let tls = tokio_postgres::tls::NoTls;
    let ref url = std::env::var("DB_URL").expect("DB_URL must be set");
    let (client, connection) = tokio_postgres::connect(url, tls)
        .await
        .expect("database connection failed");
    tokio::spawn(connection);
    client
        .batch_execute(creates())
        .await
        .expect("session table creation failed");
    Arc::new(client)
}

impl SessionStore for Arc<Client> {
    async fn insert(&self, session: &Session) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                SESSIONS,
                " (id, user_id, token_hash, expires_at) VALUES ($1, $2, $3, $4)"
            ),
            &[
                &session.id().inner(),
                &session.user().inner(),
                &session.hash(),
                &session.expires_at(),
            ],
        )
        .await
        .map(|_| ())
    }

    async fn lookup(&self, session: ID<Session>) -> Result<Option<Session>, PgErr> {
        self.query_opt(
            const_format::concatcp!(
                "SELECT id, user_id, token_hash, expires_at, revoked FROM ",
                SESSIONS,
                " WHERE id = $1"
            ),
            &[&session.inner()],
        )
        .await
        .map(|opt| {
            opt.map(|row| {
                Session::hydrate(
                    ID::from(row.get::<_, uuid::Uuid>(0)),
                    ID::from(row.get::<_, uuid::Uuid>(1)),
                    row.get::<_, Vec<u8>>(2),
                    row.get::<_, i64>(3),
                    row.get::<_, bool>(4),
                )
            })
        })
    }

    async fn rotate(&self, session: &Session) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!(
                "UPDATE ",
                SESSIONS,
                " SET token_hash = $2, expires_at = $3 WHERE id = $1"
            ),
            &[
                &session.id().inner(),
                &session.hash(),
                &session.expires_at(),
            ],
        )
        .await
        .map(|_| ())
    }

    async fn revoke(&self, session: ID<Session>) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!("UPDATE ", SESSIONS, " SET revoked = TRUE WHERE id = $1"),
            &[&session.inner()],
        )
        .await
        .map(|_| ())
    }
}
