//! Populates the star schema from the staging tables
//!
//! Five set-based `INSERT ... SELECT` statements, dimensions first and the
//! fact table last. Nothing enforces the fact-to-dimension references; the
//! order only keeps the dimensions complete by the time the fact rows land.

use tracing::info;

use super::runner::{StageReport, Statement, StatementRunner};
use crate::config::{UserDedup, WarehouseConfig};
use crate::warehouse::schema::{
    ARTISTS_DIM, SONGPLAYS_FACT, SONGS_DIM, STAGING_EVENTS, STAGING_SONGS, TIME_DIM, USERS_DIM,
};
use crate::warehouse::{Warehouse, WarehouseResult, WarehouseSchema};

/// Event page value that marks a song play
pub const NEXT_SONG_PAGE: &str = "NextSong";

/// SQL expression converting an epoch-milliseconds column to a timestamp
///
/// Whole seconds only: the millisecond remainder is dropped by integer division.
pub fn epoch_millis_to_timestamp(column: &str) -> String {
    format!("TIMESTAMP 'epoch' + {} / 1000 * INTERVAL '1 second'", column)
}

/// Insert into `users_dim`
pub fn users_insert(dedup: UserDedup) -> Statement {
    let columns = WarehouseSchema::users_dim().insert_columns();

    let select = match dedup {
        UserDedup::Latest => format!(
            "SELECT {columns}\n\
             FROM (\n    \
                 SELECT {columns},\n        \
                     ROW_NUMBER() OVER (\n            \
                         PARTITION BY user_id\n            \
                         ORDER BY ts DESC NULLS LAST, item_in_session DESC NULLS LAST\n        \
                     ) AS recency\n    \
                 FROM {source}\n    \
                 WHERE user_id IS NOT NULL\n\
             ) AS ranked_users\n\
             WHERE recency = 1;",
            columns = columns,
            source = STAGING_EVENTS,
        ),
        UserDedup::WholeRow => format!(
            "SELECT DISTINCT {columns}\n\
             FROM {source}\n\
             WHERE user_id IS NOT NULL;",
            columns = columns,
            source = STAGING_EVENTS,
        ),
    };

    Statement::new(
        format!("insert {}", USERS_DIM),
        format!("INSERT INTO {} ({})\n{}", USERS_DIM, columns, select),
    )
}

/// Insert into `songs_dim`
pub fn songs_insert() -> Statement {
    let columns = WarehouseSchema::songs_dim().insert_columns();
    let sql = format!(
        "INSERT INTO {target} ({columns})\n\
         SELECT DISTINCT song_id, title, artist_id, year, duration\n\
         FROM {source}\n\
         WHERE song_id IS NOT NULL;",
        target = SONGS_DIM,
        columns = columns,
        source = STAGING_SONGS,
    );
    Statement::new(format!("insert {}", SONGS_DIM), sql)
}

/// Insert into `artists_dim`
pub fn artists_insert() -> Statement {
    let columns = WarehouseSchema::artists_dim().insert_columns();
    let sql = format!(
        "INSERT INTO {target} ({columns})\n\
         SELECT DISTINCT artist_id, artist_name, artist_location, artist_latitude, artist_longitude\n\
         FROM {source}\n\
         WHERE artist_id IS NOT NULL;",
        target = ARTISTS_DIM,
        columns = columns,
        source = STAGING_SONGS,
    );
    Statement::new(format!("insert {}", ARTISTS_DIM), sql)
}

/// Insert into `time_dim`, one row per distinct event second
pub fn time_insert() -> Statement {
    let columns = WarehouseSchema::time_dim().insert_columns();
    let sql = format!(
        "INSERT INTO {target} ({columns})\n\
         SELECT start_time,\n    \
             EXTRACT(HOUR FROM start_time) AS hour,\n    \
             EXTRACT(DAY FROM start_time) AS day,\n    \
             EXTRACT(WEEK FROM start_time) AS week,\n    \
             EXTRACT(MONTH FROM start_time) AS month,\n    \
             EXTRACT(YEAR FROM start_time) AS year,\n    \
             EXTRACT(DOW FROM start_time) AS weekday\n\
         FROM (\n    \
             SELECT DISTINCT {start_time} AS start_time\n    \
             FROM {source}\n    \
             WHERE ts IS NOT NULL\n\
         ) AS event_times;",
        target = TIME_DIM,
        columns = columns,
        start_time = epoch_millis_to_timestamp("ts"),
        source = STAGING_EVENTS,
    );
    Statement::new(format!("insert {}", TIME_DIM), sql)
}

/// Insert into `songplays_fact`
///
/// Only song-play events are kept. Song and artist ids are resolved by exact
/// match on title, artist name and duration; plays without a match are kept
/// with null references.
pub fn songplays_insert() -> Statement {
    let columns = WarehouseSchema::songplays_fact().insert_columns();
    let sql = format!(
        "INSERT INTO {target} ({columns})\n\
         SELECT {start_time} AS start_time,\n    \
             se.user_id,\n    \
             se.level,\n    \
             ss.song_id,\n    \
             ss.artist_id,\n    \
             se.session_id,\n    \
             se.location,\n    \
             se.user_agent\n\
         FROM {events} se\n\
         LEFT JOIN {songs} ss\n    \
             ON se.song = ss.title\n    \
             AND se.artist = ss.artist_name\n    \
             AND se.page = '{page}'\n    \
             AND se.length = ss.duration\n\
         WHERE se.page = '{page}';",
        target = SONGPLAYS_FACT,
        columns = columns,
        start_time = epoch_millis_to_timestamp("se.ts"),
        events = STAGING_EVENTS,
        songs = STAGING_SONGS,
        page = NEXT_SONG_PAGE,
    );
    Statement::new(format!("insert {}", SONGPLAYS_FACT), sql)
}

/// All transform statements in execution order
pub fn transform_statements(dedup: UserDedup) -> Vec<Statement> {
    vec![
        users_insert(dedup),
        songs_insert(),
        artists_insert(),
        time_insert(),
        songplays_insert(),
    ]
}

pub struct Transformer<'a> {
    runner: StatementRunner<'a>,
    user_dedup: UserDedup,
}

impl<'a> Transformer<'a> {
    pub fn new(warehouse: &'a dyn Warehouse, config: &WarehouseConfig) -> Self {
        Self {
            runner: StatementRunner::new(warehouse, config.pipeline.commit_mode),
            user_dedup: config.pipeline.user_dedup,
        }
    }

    /// Run the five inserts, stopping at the first failure
    pub async fn transform(&self) -> WarehouseResult<StageReport> {
        info!("Transforming staging data into the star schema");
        let report = self
            .runner
            .run("transform", &transform_statements(self.user_dedup))
            .await?;
        for outcome in &report.statements {
            info!(
                "{}: {} rows in {} ms",
                outcome.label, outcome.rows_affected, outcome.elapsed_ms
            );
        }

        Ok(report)
    }
}
