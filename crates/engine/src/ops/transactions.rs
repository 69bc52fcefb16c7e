use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Transaction, TransactionCmd, TransactionQuery, WriteBatch, ledger,
    util::normalize_optional_text,
};

use super::{
    Engine, TRANSACTION_IMAGES, require_owner, retry_on_conflict, warn_if_rejected,
};

/// Validated transaction built from a command, before any store is read.
fn draft(cmd: &TransactionCmd, image: Option<String>) -> ResultEngine<Transaction> {
    require_owner(&cmd.owner_id)?;
    let mut tx = Transaction::new(
        cmd.owner_id.clone(),
        cmd.kind,
        cmd.amount,
        cmd.wallet_id,
        cmd.date,
    )?;
    tx.category_id = cmd.category_id;
    tx.description = normalize_optional_text(cmd.description.as_deref());
    tx.image = image;
    Ok(tx)
}

/// Optional fields an update carries over from the stored record when unset.
#[derive(Clone, Copy, Debug)]
struct KeptFields {
    category: bool,
    description: bool,
}

impl Engine {
    /// Records a transaction and books it on its wallet.
    ///
    /// The image, if any, is uploaded first; a failed upload leaves every
    /// store untouched. An expense larger than the wallet balance is rejected
    /// with [`EngineError::InsufficientBalance`].
    pub async fn create_transaction(&self, cmd: TransactionCmd) -> ResultEngine<Transaction> {
        // Validate before uploading anything.
        draft(&cmd, None)?;
        let image = self
            .resolve_image(cmd.image.as_ref(), TRANSACTION_IMAGES)
            .await?;
        let tx = draft(&cmd, image)?;
        if let Some(category_id) = tx.category_id {
            self.visible_category(category_id, &tx.owner_id).await?;
        }

        retry_on_conflict!(self, "create transaction", self.try_create_transaction(&tx).await)
            .inspect_err(|err| warn_if_rejected("create transaction", err))?;

        tracing::info!(
            "transaction {} created: {} {} on wallet {}",
            tx.id,
            tx.kind,
            tx.amount,
            tx.wallet_id
        );
        Ok(tx)
    }

    async fn try_create_transaction(&self, tx: &Transaction) -> ResultEngine<()> {
        let wallet = self.owned_wallet(tx.wallet_id, &tx.owner_id).await?;
        let next = ledger::apply_new(&wallet, tx.amount, tx.kind)?;

        let mut batch = WriteBatch::new();
        batch.put_transaction(tx.clone()).put_wallet(next);
        self.store.commit(batch).await
    }

    /// Replaces the fields of transaction `id` with the ones of `cmd`.
    ///
    /// When kind, amount or wallet change, the old effect is reverted and the
    /// new one applied; both wallets are committed together with the record.
    /// Category, description and image left unset in `cmd` keep their stored
    /// values unless the command clears them.
    pub async fn update_transaction(
        &self,
        id: Uuid,
        cmd: TransactionCmd,
    ) -> ResultEngine<Transaction> {
        draft(&cmd, None)?;
        let image = self
            .resolve_image(cmd.image.as_ref(), TRANSACTION_IMAGES)
            .await?;
        let mut tx = draft(&cmd, image)?;
        tx.id = id;
        if let Some(category_id) = tx.category_id {
            self.visible_category(category_id, &tx.owner_id).await?;
        }

        let keep = KeptFields {
            category: !cmd.clear_category,
            description: !cmd.clear_description,
        };
        let updated = retry_on_conflict!(
            self,
            "update transaction",
            self.try_update_transaction(&tx, keep).await
        )
        .inspect_err(|err| warn_if_rejected("update transaction", err))?;

        tracing::info!("transaction {id} updated");
        Ok(updated)
    }

    async fn try_update_transaction(
        &self,
        draft: &Transaction,
        keep: KeptFields,
    ) -> ResultEngine<Transaction> {
        let prior = self.owned_transaction(draft.id, &draft.owner_id).await?;
        let mut next = draft.clone();
        if next.image.is_none() {
            next.image.clone_from(&prior.image);
        }
        if keep.category && next.category_id.is_none() {
            next.category_id = prior.category_id;
        }
        if keep.description && next.description.is_none() {
            next.description.clone_from(&prior.description);
        }

        let mut batch = WriteBatch::new();
        batch.put_transaction(next.clone());

        if !prior.ledger_changed(next.kind, next.amount, next.wallet_id) {
            self.store.commit(batch).await?;
            return Ok(next);
        }

        let old_wallet = self.owned_wallet(prior.wallet_id, &prior.owner_id).await?;
        let reverted = ledger::revert(&old_wallet, prior.amount, prior.kind)?;

        if prior.wallet_id == next.wallet_id {
            let applied = ledger::apply_new(&reverted, next.amount, next.kind)?;
            ledger::ensure_non_negative(&applied)?;
            batch.put_wallet(applied);
        } else {
            let new_wallet = self.owned_wallet(next.wallet_id, &next.owner_id).await?;
            let applied = ledger::apply_new(&new_wallet, next.amount, next.kind)?;
            ledger::ensure_non_negative(&reverted)?;
            batch.put_wallet(reverted).put_wallet(applied);
        }

        self.store.commit(batch).await?;
        Ok(next)
    }

    /// Deletes a transaction of `wallet_id` and reverts its effect.
    ///
    /// Deleting an income whose money was already spent is rejected.
    pub async fn delete_transaction(
        &self,
        id: Uuid,
        wallet_id: Uuid,
        owner_id: &str,
    ) -> ResultEngine<()> {
        require_owner(owner_id)?;
        retry_on_conflict!(
            self,
            "delete transaction",
            self.try_delete_transaction(id, wallet_id, owner_id).await
        )
        .inspect_err(|err| warn_if_rejected("delete transaction", err))?;

        tracing::info!("transaction {id} deleted from wallet {wallet_id}");
        Ok(())
    }

    async fn try_delete_transaction(
        &self,
        id: Uuid,
        wallet_id: Uuid,
        owner_id: &str,
    ) -> ResultEngine<()> {
        let tx = self.owned_transaction(id, owner_id).await?;
        if tx.wallet_id != wallet_id {
            return Err(EngineError::Validation(format!(
                "transaction {id} does not belong to wallet {wallet_id}"
            )));
        }
        let wallet = self.owned_wallet(wallet_id, owner_id).await?;
        let next = ledger::delete(&wallet, tx.amount, tx.kind)?;

        let mut batch = WriteBatch::new();
        batch.put_wallet(next).delete_transaction(id);
        self.store.commit(batch).await
    }

    pub async fn transaction(&self, id: Uuid, owner_id: &str) -> ResultEngine<Transaction> {
        self.owned_transaction(id, owner_id).await
    }

    pub async fn transactions(&self, query: &TransactionQuery) -> ResultEngine<Vec<Transaction>> {
        require_owner(&query.owner_id)?;
        self.store.query_transactions(query).await
    }
}
