use async_trait::async_trait;
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseConnection, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
    prelude::*,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use crate::{
    Category, EngineError, ResultEngine, Transaction, Wallet, categories, transactions,
    util::{version_from_db, version_to_db},
    wallets,
};

use super::{
    CategoryStore, LedgerStore, SortOrder, TransactionQuery, TransactionStore, WalletStore, Write,
    WriteBatch,
};

/// Store backed by a sea-orm connection.
///
/// The schema is created by the `migration` crate. A [`WriteBatch`] runs
/// inside one database transaction, rolled back on the first failing write.
#[derive(Clone, Debug)]
pub struct DatabaseStore {
    database: DatabaseConnection,
}

impl DatabaseStore {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.database
    }
}

async fn stored_wallet_version<C: ConnectionTrait>(conn: &C, id: Uuid) -> ResultEngine<Option<i64>> {
    let model = wallets::Entity::find_by_id(id.to_string()).one(conn).await?;
    Ok(model.map(|m| m.version))
}

async fn put_wallet_checked<C: ConnectionTrait>(conn: &C, wallet: &Wallet) -> ResultEngine<()> {
    let expected = version_to_db(wallet.version)?;
    let mut next = wallet.clone();
    next.version += 1;
    let mut active = wallets::ActiveModel::try_from(&next)?;

    if wallet.version == 0 {
        if stored_wallet_version(conn, wallet.id).await?.is_some() {
            return Err(EngineError::Conflict(format!(
                "wallet {} already exists",
                wallet.id
            )));
        }
        active.insert(conn).await?;
        return Ok(());
    }

    active.id = ActiveValue::NotSet;
    let result = wallets::Entity::update_many()
        .set(active)
        .filter(wallets::Column::Id.eq(wallet.id.to_string()))
        .filter(wallets::Column::Version.eq(expected))
        .exec(conn)
        .await?;
    if result.rows_affected == 0 {
        return Err(EngineError::Conflict(format!(
            "wallet {} changed since version {}",
            wallet.id, wallet.version
        )));
    }
    Ok(())
}

async fn put_transaction<C: ConnectionTrait>(conn: &C, tx: &Transaction) -> ResultEngine<()> {
    transactions::Entity::insert(transactions::ActiveModel::from(tx))
        .on_conflict(
            OnConflict::column(transactions::Column::Id)
                .update_columns([
                    transactions::Column::OwnerId,
                    transactions::Column::Kind,
                    transactions::Column::AmountMinor,
                    transactions::Column::WalletId,
                    transactions::Column::CategoryId,
                    transactions::Column::Date,
                    transactions::Column::Description,
                    transactions::Column::Image,
                ])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

async fn apply_write<C: ConnectionTrait>(conn: &C, write: Write) -> ResultEngine<()> {
    match write {
        Write::PutWallet(wallet) => put_wallet_checked(conn, &wallet).await?,
        Write::DeleteWallet(id) => {
            wallets::Entity::delete_by_id(id.to_string())
                .exec(conn)
                .await?;
        }
        Write::PutTransaction(tx) => put_transaction(conn, &tx).await?,
        Write::DeleteTransaction(id) => {
            transactions::Entity::delete_by_id(id.to_string())
                .exec(conn)
                .await?;
        }
    }
    Ok(())
}

#[async_trait]
impl WalletStore for DatabaseStore {
    async fn wallet(&self, id: Uuid) -> ResultEngine<Option<Wallet>> {
        wallets::Entity::find_by_id(id.to_string())
            .one(&self.database)
            .await?
            .map(Wallet::try_from)
            .transpose()
    }

    async fn upsert_wallet(&self, wallet: &Wallet) -> ResultEngine<Uuid> {
        let db_tx = self.database.begin().await?;
        let mut next = wallet.clone();
        match stored_wallet_version(&db_tx, wallet.id).await? {
            Some(version) => {
                next.version = version_from_db(version)? + 1;
                wallets::ActiveModel::try_from(&next)?.update(&db_tx).await?;
            }
            None => {
                next.version = 1;
                wallets::ActiveModel::try_from(&next)?.insert(&db_tx).await?;
            }
        }
        db_tx.commit().await?;
        Ok(wallet.id)
    }

    async fn delete_wallet(&self, id: Uuid) -> ResultEngine<()> {
        wallets::Entity::delete_by_id(id.to_string())
            .exec(&self.database)
            .await?;
        Ok(())
    }

    async fn wallets_for_owner(&self, owner_id: &str) -> ResultEngine<Vec<Wallet>> {
        wallets::Entity::find()
            .filter(wallets::Column::OwnerId.eq(owner_id))
            .order_by_asc(wallets::Column::CreatedAt)
            .order_by_asc(wallets::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Wallet::try_from)
            .collect()
    }
}

#[async_trait]
impl TransactionStore for DatabaseStore {
    async fn transaction(&self, id: Uuid) -> ResultEngine<Option<Transaction>> {
        transactions::Entity::find_by_id(id.to_string())
            .one(&self.database)
            .await?
            .map(Transaction::try_from)
            .transpose()
    }

    async fn upsert_transaction(&self, tx: &Transaction) -> ResultEngine<Uuid> {
        put_transaction(&self.database, tx).await?;
        Ok(tx.id)
    }

    async fn delete_transaction(&self, id: Uuid) -> ResultEngine<()> {
        transactions::Entity::delete_by_id(id.to_string())
            .exec(&self.database)
            .await?;
        Ok(())
    }

    async fn query_transactions(&self, query: &TransactionQuery) -> ResultEngine<Vec<Transaction>> {
        let mut select = transactions::Entity::find()
            .filter(transactions::Column::OwnerId.eq(query.owner_id.as_str()));
        if let Some(wallet_id) = query.wallet_id {
            select = select.filter(transactions::Column::WalletId.eq(wallet_id.to_string()));
        }
        if let Some(category_id) = query.category_id {
            select = select.filter(transactions::Column::CategoryId.eq(category_id.to_string()));
        }
        if let Some(kind) = query.kind {
            // Older rows may carry a capitalized kind.
            select = select.filter(Expr::cust("LOWER(kind)").eq(kind.as_str()));
        }
        if let Some(from) = query.from {
            select = select.filter(transactions::Column::Date.gte(from));
        }
        if let Some(to) = query.to {
            select = select.filter(transactions::Column::Date.lt(to));
        }
        select = match query.order {
            SortOrder::NewestFirst => select
                .order_by_desc(transactions::Column::Date)
                .order_by_desc(transactions::Column::Id),
            SortOrder::OldestFirst => select
                .order_by_asc(transactions::Column::Date)
                .order_by_asc(transactions::Column::Id),
        };
        if let Some(limit) = query.limit {
            select = select.limit(limit);
        }

        select
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    async fn category_in_use(&self, category_id: Uuid) -> ResultEngine<bool> {
        let found = transactions::Entity::find()
            .filter(transactions::Column::CategoryId.eq(category_id.to_string()))
            .one(&self.database)
            .await?;
        Ok(found.is_some())
    }
}

#[async_trait]
impl CategoryStore for DatabaseStore {
    async fn category(&self, id: Uuid) -> ResultEngine<Option<Category>> {
        categories::Entity::find_by_id(id.to_string())
            .one(&self.database)
            .await?
            .map(Category::try_from)
            .transpose()
    }

    async fn upsert_category(&self, category: &Category) -> ResultEngine<Uuid> {
        categories::Entity::insert(categories::ActiveModel::from(category))
            .on_conflict(
                OnConflict::column(categories::Column::Id)
                    .update_columns([
                        categories::Column::Label,
                        categories::Column::Icon,
                        categories::Column::BgColor,
                        categories::Column::Kind,
                        categories::Column::OwnerId,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.database)
            .await?;
        Ok(category.id)
    }

    async fn delete_category(&self, id: Uuid) -> ResultEngine<()> {
        categories::Entity::delete_by_id(id.to_string())
            .exec(&self.database)
            .await?;
        Ok(())
    }

    async fn categories_for_owner(&self, owner_id: Option<&str>) -> ResultEngine<Vec<Category>> {
        let select = match owner_id {
            Some(owner_id) => {
                categories::Entity::find().filter(categories::Column::OwnerId.eq(owner_id))
            }
            None => categories::Entity::find().filter(categories::Column::OwnerId.is_null()),
        };
        select
            .order_by_asc(categories::Column::Label)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::try_from)
            .collect()
    }
}

#[async_trait]
impl LedgerStore for DatabaseStore {
    async fn commit(&self, batch: WriteBatch) -> ResultEngine<()> {
        let db_tx = self.database.begin().await?;
        for write in batch {
            // Dropping `db_tx` on error rolls the whole batch back.
            apply_write(&db_tx, write).await?;
        }
        db_tx.commit().await?;
        Ok(())
    }
}
