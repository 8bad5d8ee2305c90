//! `SQLite` adapter for the anonymised aggregate tables.

use std::{
    fmt,
    path::Path,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use rusqlite::{Connection, OpenFlags, Row, params, params_from_iter, types::Value};

use super::{
    ActivityCorrelation, ActivityRating, AggregateStore, GLOBAL_DESTINATION, ProfileQuery,
    SegmentTopList, StoreError, TrendingActivity,
};

const SIMILAR_PROFILES_SQL: &str = "SELECT profile_hash FROM anonymous_user_profiles \
     WHERE profile_hash = ?1 OR (travel_style = ?2 AND budget_level = ?3 AND pace = ?4) \
     LIMIT ?5";

const RATING_COLUMNS: &str = "profile_hash, activity_id, activity_name, activity_category, \
     destination, average_rating, rating_count, popularity_score, price_level";

const TRENDING_SQL: &str = "SELECT activity_id, activity_name, activity_category, destination, \
     trend_score, growth_rate, popularity_rank, seasonality \
     FROM anonymous_trending_activities WHERE destination = ?1 \
     ORDER BY trend_score DESC, popularity_rank ASC LIMIT ?2";

const CORRELATIONS_SQL: &str = "SELECT activity_id_1, activity_id_2, destination, \
     correlation_score, co_occurrence_count FROM anonymous_activity_correlations \
     WHERE (activity_id_1 = ?1 OR activity_id_2 = ?1) AND destination = ?2 \
     ORDER BY correlation_score DESC LIMIT ?3";

/// Read-only aggregate store backed by a `SQLite` database.
///
/// Queries run on the blocking thread pool, so the store must be used from
/// inside a Tokio runtime.
#[derive(Clone)]
pub struct SqliteAggregateStore {
    connection: Arc<Mutex<Connection>>,
    path: String,
}

impl fmt::Debug for SqliteAggregateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteAggregateStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteAggregateStore {
    /// Open the database at `path` read-only.
    ///
    /// # Errors
    /// Returns [`StoreError::OpenDatabase`] when `SQLite` cannot open the
    /// file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let connection = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|source| StoreError::OpenDatabase {
                path: path.display().to_string(),
                source,
            })?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
            path: path.display().to_string(),
        })
    }

    async fn run<T, F>(&self, operation: &'static str, query: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let connection = Arc::clone(&self.connection);
        tokio::task::spawn_blocking(move || {
            let guard = connection.lock().map_err(|_| StoreError::Unavailable {
                reason: format!("connection lock poisoned during {operation}"),
            })?;
            query(&guard)
        })
        .await
        .map_err(|err| StoreError::Unavailable {
            reason: format!("{operation} task failed: {err}"),
        })?
    }
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn query_error(operation: &'static str) -> impl Fn(rusqlite::Error) -> StoreError {
    move |source| StoreError::Query { operation, source }
}

fn rating_from_row(row: &Row<'_>) -> rusqlite::Result<ActivityRating> {
    Ok(ActivityRating {
        profile_hash: row.get(0)?,
        activity_id: row.get(1)?,
        activity_name: row.get(2)?,
        activity_category: row.get(3)?,
        destination: row.get(4)?,
        average_rating: row.get(5)?,
        rating_count: row.get(6)?,
        popularity_score: row.get(7)?,
        price_level: row.get(8)?,
    })
}

#[async_trait]
impl AggregateStore for SqliteAggregateStore {
    async fn similar_profiles(
        &self,
        query: &ProfileQuery,
        limit: usize,
    ) -> Result<Vec<String>, StoreError> {
        let query = query.clone();
        self.run("similar_profiles", move |conn| {
            let err = query_error("similar_profiles");
            let mut stmt = conn.prepare_cached(SIMILAR_PROFILES_SQL).map_err(&err)?;
            let rows = stmt
                .query_map(
                    params![
                        query.profile_hash,
                        query.travel_style,
                        query.budget_level,
                        query.pace,
                        sql_limit(limit)
                    ],
                    |row| row.get(0),
                )
                .map_err(&err)?;
            rows.collect::<rusqlite::Result<Vec<String>>>().map_err(&err)
        })
        .await
    }

    async fn ratings_by_profiles(
        &self,
        profile_hashes: &[String],
        destination: &str,
        limit: usize,
    ) -> Result<Vec<ActivityRating>, StoreError> {
        if profile_hashes.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {RATING_COLUMNS} FROM anonymous_activity_ratings \
             WHERE destination = ? AND profile_hash IN ({}) \
             ORDER BY average_rating DESC, popularity_score DESC LIMIT ?",
            placeholders(profile_hashes.len())
        );
        let mut values = Vec::with_capacity(profile_hashes.len() + 2);
        values.push(Value::Text(destination.to_owned()));
        values.extend(profile_hashes.iter().cloned().map(Value::Text));
        values.push(Value::Integer(sql_limit(limit)));
        self.run("ratings_by_profiles", move |conn| {
            let err = query_error("ratings_by_profiles");
            let mut stmt = conn.prepare(&sql).map_err(&err)?;
            let rows = stmt
                .query_map(params_from_iter(values), rating_from_row)
                .map_err(&err)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(&err)
        })
        .await
    }

    async fn activity_rating(
        &self,
        activity_id: &str,
        destination: &str,
    ) -> Result<Option<ActivityRating>, StoreError> {
        let sql = format!(
            "SELECT {RATING_COLUMNS} FROM anonymous_activity_ratings \
             WHERE activity_id = ?1 AND destination = ?2 LIMIT 1"
        );
        let (activity_id, destination) = (activity_id.to_owned(), destination.to_owned());
        self.run("activity_rating", move |conn| {
            let err = query_error("activity_rating");
            let mut stmt = conn.prepare_cached(&sql).map_err(&err)?;
            let mut rows = stmt
                .query_map(params![activity_id, destination], rating_from_row)
                .map_err(&err)?;
            rows.next().transpose().map_err(&err)
        })
        .await
    }

    async fn trending(
        &self,
        destination: &str,
        limit: usize,
    ) -> Result<Vec<TrendingActivity>, StoreError> {
        let destination = destination.to_owned();
        self.run("trending", move |conn| {
            let err = query_error("trending");
            let mut stmt = conn.prepare_cached(TRENDING_SQL).map_err(&err)?;
            let rows = stmt
                .query_map(params![destination, sql_limit(limit)], |row| {
                    Ok(TrendingActivity {
                        activity_id: row.get(0)?,
                        activity_name: row.get(1)?,
                        activity_category: row.get(2)?,
                        destination: row.get(3)?,
                        trend_score: row.get(4)?,
                        growth_rate: row.get::<_, Option<f64>>(5)?.unwrap_or_default(),
                        popularity_rank: row.get(6)?,
                        seasonality: row.get(7)?,
                    })
                })
                .map_err(&err)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(&err)
        })
        .await
    }

    async fn segment_lists(
        &self,
        segments: &[String],
        destination: &str,
    ) -> Result<Vec<SegmentTopList>, StoreError> {
        if segments.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT segment_name, destination, top_activities FROM anonymous_user_segments \
             WHERE segment_name IN ({}) AND destination IN (?, ?)",
            placeholders(segments.len())
        );
        let mut values: Vec<Value> = segments.iter().cloned().map(Value::Text).collect();
        values.push(Value::Text(destination.to_owned()));
        values.push(Value::Text(GLOBAL_DESTINATION.to_owned()));
        self.run("segment_lists", move |conn| {
            let err = query_error("segment_lists");
            let mut stmt = conn.prepare(&sql).map_err(&err)?;
            let raw = stmt
                .query_map(params_from_iter(values), |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })
                .map_err(&err)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(&err)?;
            raw.into_iter()
                .map(|(segment_name, destination, top_activities)| {
                    let top_activities = serde_json::from_str(&top_activities).map_err(|source| {
                        StoreError::Decode {
                            column: "anonymous_user_segments.top_activities",
                            source,
                        }
                    })?;
                    Ok(SegmentTopList {
                        segment_name,
                        destination,
                        top_activities,
                    })
                })
                .collect()
        })
        .await
    }

    async fn correlations(
        &self,
        activity_id: &str,
        destination: &str,
        limit: usize,
    ) -> Result<Vec<ActivityCorrelation>, StoreError> {
        let (activity_id, destination) = (activity_id.to_owned(), destination.to_owned());
        self.run("correlations", move |conn| {
            let err = query_error("correlations");
            let mut stmt = conn.prepare_cached(CORRELATIONS_SQL).map_err(&err)?;
            let rows = stmt
                .query_map(params![activity_id, destination, sql_limit(limit)], |row| {
                    Ok(ActivityCorrelation {
                        activity_id_1: row.get(0)?,
                        activity_id_2: row.get(1)?,
                        destination: row.get(2)?,
                        correlation_score: row.get(3)?,
                        co_occurrence_count: row.get(4)?,
                    })
                })
                .map_err(&err)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(&err)
        })
        .await
    }
}
