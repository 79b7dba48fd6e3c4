use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use crate::db::{DbPool, with_retry};
use crate::models::{MetricPeriod, PeriodCounts, QuestionRank, ReactionKind};
use crate::schema::{answers, question_ranks, question_reactions, questions};

/// Hearts received by each question since `since`
fn hearts_since(conn: &mut SqliteConnection, since: DateTime<Utc>) -> QueryResult<HashMap<i32, i64>> {
    let rows: Vec<(i32, i64)> = question_reactions::table
        .filter(question_reactions::reaction.eq(ReactionKind::Heart.as_str()))
        .filter(question_reactions::created_at.ge(since.naive_utc()))
        .group_by(question_reactions::question_id)
        .select((question_reactions::question_id, count_star()))
        .load(conn)?;
    Ok(rows.into_iter().collect())
}

/// Answers posted under each question since `since`
fn answers_since(conn: &mut SqliteConnection, since: DateTime<Utc>) -> QueryResult<HashMap<i32, i64>> {
    let rows: Vec<(i32, i64)> = answers::table
        .filter(answers::created_at.ge(since.naive_utc()))
        .group_by(answers::question_id)
        .select((answers::question_id, count_star()))
        .load(conn)?;
    Ok(rows.into_iter().collect())
}

/// Computes the rank row of every question as of `now`
pub fn compute_question_ranks(conn: &mut SqliteConnection, now: DateTime<Utc>) -> QueryResult<Vec<QuestionRank>> {
    let question_ids: Vec<i32> = questions::table.select(questions::id).load(conn)?;

    let mut ranks: HashMap<i32, QuestionRank> = question_ids
        .into_iter()
        .map(|question_id| (question_id, QuestionRank { question_id, ..Default::default() }))
        .collect();

    for period in MetricPeriod::ALL {
        let since = period.window_start(now);
        let hearts = hearts_since(conn, since)?;
        let answers = answers_since(conn, since)?;

        for (question_id, rank) in ranks.iter_mut() {
            let counts = PeriodCounts {
                heart_count: hearts.get(question_id).copied().unwrap_or(0) as i32,
                answer_count: answers.get(question_id).copied().unwrap_or(0) as i32,
            };
            rank.set_counts(period, counts);
        }
    }

    let mut ranks: Vec<QuestionRank> = ranks.into_values().collect();
    ranks.sort_by_key(|r| r.question_id);
    Ok(ranks)
}

/// Recomputes the rank aggregates of every question
///
/// The table is rebuilt in a single transaction, so readers see either the
/// previous ranks or the new ones.
///
/// ### Returns
///
/// The number of rank rows written
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - Any of the queries fails
#[instrument(skip(pool))]
pub async fn refresh_question_ranks(pool: &DbPool) -> Result<usize> {
    debug!("Refreshing question ranks");

    let mut conn = pool.get()?;
    let now = Utc::now();

    let written = with_retry(&mut conn, |conn| {
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let ranks = compute_question_ranks(conn, now)?;
            diesel::delete(question_ranks::table).execute(conn)?;
            for rank in &ranks {
                diesel::insert_into(question_ranks::table).values(rank).execute(conn)?;
            }
            Ok(ranks.len())
        })
    })
    .await?;

    info!("Refreshed ranks of {} questions", written);
    Ok(written)
}

/// Spawns a task refreshing the ranks every `every`, starting immediately
pub fn spawn_rank_refresh(pool: Arc<DbPool>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            if let Err(e) = refresh_question_ranks(&pool).await {
                error!("Failed to refresh question ranks: {:#}", e);
            }
        }
    })
}
