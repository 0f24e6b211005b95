//! Star schema catalogue
//!
//! The seven warehouse tables, in the order they are dropped and created.
//! Foreign keys between the fact and dimension tables are a naming
//! convention only; no `REFERENCES` clauses are emitted.

use crate::models::{ColumnDef, ColumnType, TableDef, TableRole};

pub const STAGING_EVENTS: &str = "staging_events";
pub const STAGING_SONGS: &str = "staging_songs";
pub const SONGPLAYS_FACT: &str = "songplays_fact";
pub const USERS_DIM: &str = "users_dim";
pub const SONGS_DIM: &str = "songs_dim";
pub const ARTISTS_DIM: &str = "artists_dim";
pub const TIME_DIM: &str = "time_dim";

/// Table names in drop/create order
pub const TABLE_NAMES: [&str; 7] = [
    STAGING_EVENTS,
    STAGING_SONGS,
    SONGPLAYS_FACT,
    USERS_DIM,
    SONGS_DIM,
    ARTISTS_DIM,
    TIME_DIM,
];

/// Warehouse schema helper
pub struct WarehouseSchema;

impl WarehouseSchema {
    /// All tables in drop/create order
    pub fn tables() -> Vec<TableDef> {
        vec![
            Self::staging_events(),
            Self::staging_songs(),
            Self::songplays_fact(),
            Self::users_dim(),
            Self::songs_dim(),
            Self::artists_dim(),
            Self::time_dim(),
        ]
    }

    /// Raw mirror of the JSON event logs
    pub fn staging_events() -> TableDef {
        TableDef::new(
            STAGING_EVENTS,
            TableRole::Staging,
            vec![
                ColumnDef::new("artist", ColumnType::Varchar(255)),
                ColumnDef::new("auth", ColumnType::Varchar(15)),
                ColumnDef::new("first_name", ColumnType::Varchar(50)),
                ColumnDef::new("gender", ColumnType::Varchar(13)),
                ColumnDef::new("item_in_session", ColumnType::Integer),
                ColumnDef::new("last_name", ColumnType::Varchar(50)),
                ColumnDef::new("length", ColumnType::Real),
                ColumnDef::new("level", ColumnType::Varchar(10)),
                ColumnDef::new("location", ColumnType::Text),
                ColumnDef::new("method", ColumnType::Varchar(10)),
                ColumnDef::new("page", ColumnType::Varchar(20)),
                ColumnDef::new("registration", ColumnType::Double),
                ColumnDef::new("session_id", ColumnType::Integer),
                ColumnDef::new("song", ColumnType::Text),
                ColumnDef::new("status", ColumnType::Integer),
                // epoch milliseconds
                ColumnDef::new("ts", ColumnType::BigInt),
                ColumnDef::new("user_agent", ColumnType::Text),
                ColumnDef::new("user_id", ColumnType::Integer),
            ],
        )
    }

    /// Raw mirror of the JSON song metadata
    pub fn staging_songs() -> TableDef {
        TableDef::new(
            STAGING_SONGS,
            TableRole::Staging,
            vec![
                ColumnDef::new("num_songs", ColumnType::Integer),
                ColumnDef::new("artist_id", ColumnType::Text),
                ColumnDef::new("artist_latitude", ColumnType::Double),
                ColumnDef::new("artist_longitude", ColumnType::Double),
                ColumnDef::new("artist_location", ColumnType::VarcharMax),
                ColumnDef::new("artist_name", ColumnType::VarcharMax),
                ColumnDef::new("song_id", ColumnType::Text),
                ColumnDef::new("title", ColumnType::Varchar(255)),
                ColumnDef::new("duration", ColumnType::Real),
                ColumnDef::new("year", ColumnType::Integer),
            ],
        )
    }

    pub fn songplays_fact() -> TableDef {
        TableDef::new(
            SONGPLAYS_FACT,
            TableRole::Fact,
            vec![
                ColumnDef::new("songplay_id", ColumnType::BigInt)
                    .identity()
                    .primary_key(),
                ColumnDef::new("start_time", ColumnType::Timestamp).sort_key(),
                ColumnDef::new("user_id", ColumnType::Integer),
                ColumnDef::new("level", ColumnType::Varchar(10)),
                ColumnDef::new("song_id", ColumnType::Text).dist_key(),
                ColumnDef::new("artist_id", ColumnType::Text),
                ColumnDef::new("session_id", ColumnType::Integer),
                ColumnDef::new("location", ColumnType::Text),
                ColumnDef::new("user_agent", ColumnType::Text),
            ],
        )
    }

    pub fn users_dim() -> TableDef {
        TableDef::new(
            USERS_DIM,
            TableRole::Dimension,
            vec![
                ColumnDef::new("user_id", ColumnType::Integer)
                    .primary_key()
                    .sort_key(),
                ColumnDef::new("first_name", ColumnType::Varchar(50)),
                ColumnDef::new("last_name", ColumnType::Varchar(50)),
                ColumnDef::new("gender", ColumnType::Varchar(13)),
                ColumnDef::new("level", ColumnType::Varchar(10)),
            ],
        )
    }

    pub fn songs_dim() -> TableDef {
        TableDef::new(
            SONGS_DIM,
            TableRole::Dimension,
            vec![
                ColumnDef::new("song_id", ColumnType::Text)
                    .primary_key()
                    .dist_key()
                    .sort_key(),
                ColumnDef::new("title", ColumnType::Varchar(255)),
                ColumnDef::new("artist_id", ColumnType::Text),
                ColumnDef::new("year", ColumnType::Integer),
                ColumnDef::new("duration", ColumnType::Real),
            ],
        )
    }

    pub fn artists_dim() -> TableDef {
        TableDef::new(
            ARTISTS_DIM,
            TableRole::Dimension,
            vec![
                ColumnDef::new("artist_id", ColumnType::Text)
                    .primary_key()
                    .sort_key(),
                ColumnDef::new("name", ColumnType::VarcharMax),
                ColumnDef::new("location", ColumnType::VarcharMax),
                ColumnDef::new("latitude", ColumnType::Double),
                ColumnDef::new("longitude", ColumnType::Double),
            ],
        )
    }

    pub fn time_dim() -> TableDef {
        TableDef::new(
            TIME_DIM,
            TableRole::Dimension,
            vec![
                ColumnDef::new("start_time", ColumnType::Timestamp)
                    .primary_key()
                    .sort_key(),
                ColumnDef::new("hour", ColumnType::Integer),
                ColumnDef::new("day", ColumnType::Integer),
                ColumnDef::new("week", ColumnType::Integer),
                ColumnDef::new("month", ColumnType::Integer),
                ColumnDef::new("year", ColumnType::Integer),
                ColumnDef::new("weekday", ColumnType::Integer),
            ],
        )
    }
}
