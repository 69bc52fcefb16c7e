use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::{
    Granularity, Report, ResultEngine, Stats, TransactionQuery, report,
    statistics::{aggregate, bucket_bounds, local_midnight_utc},
};

use super::{Engine, require_owner};

impl Engine {
    /// Income/expense series of `owner_id` up to today in `tz`.
    pub async fn fetch_stats(
        &self,
        owner_id: &str,
        granularity: Granularity,
        tz: Tz,
    ) -> ResultEngine<Stats> {
        self.fetch_stats_at(owner_id, granularity, tz, Utc::now())
            .await
    }

    /// Same as [`Engine::fetch_stats`] with an explicit current instant.
    pub async fn fetch_stats_at(
        &self,
        owner_id: &str,
        granularity: Granularity,
        tz: Tz,
        now: DateTime<Utc>,
    ) -> ResultEngine<Stats> {
        require_owner(owner_id)?;
        let today = now.with_timezone(&tz).date_naive();
        let (starts, end) = bucket_bounds(granularity, today, None)?;
        // The year range starts at the oldest transaction, whatever its date.
        let from = match granularity {
            Granularity::Year => None,
            Granularity::Week | Granularity::Month => {
                starts.first().map(|start| local_midnight_utc(&tz, *start))
            }
        };
        let to = local_midnight_utc(&tz, end);

        let transactions = self
            .store
            .query_transactions(&TransactionQuery::owner(owner_id).range(from, Some(to)))
            .await?;
        let buckets = aggregate(granularity, &transactions, &tz, today)?;
        tracing::debug!(
            "{owner_id}: {} transactions in {} {granularity:?} buckets",
            transactions.len(),
            buckets.len()
        );

        Ok(Stats {
            granularity,
            buckets,
            transactions,
        })
    }

    /// Report of the transactions of `owner_id` dated in `[from, to)`.
    pub async fn report(
        &self,
        owner_id: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> ResultEngine<Report> {
        require_owner(owner_id)?;
        let wallets = self.store.wallets_for_owner(owner_id).await?;
        // Everything after `from`, so balances can be walked back from today.
        let transactions = self
            .store
            .query_transactions(&TransactionQuery::owner(owner_id).range(from, None))
            .await?;
        let categories = self.categories(owner_id, false).await?;
        report::build(&wallets, &transactions, &categories, to)
    }
}
