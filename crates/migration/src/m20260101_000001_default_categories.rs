//! Global categories every user starts with.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Label,
    Icon,
    BgColor,
    Kind,
    OwnerId,
}

/// `(id, label, icon, bg_color, kind)`
const DEFAULTS: [(&str, &str, &str, &str, &str); 14] = [
    ("fe86f220-fa57-5c6e-8099-ddba9b394b9d", "Groceries", "ShoppingCart", "#4B5563", "expense"),
    ("491ae803-4880-5da5-b7f7-68114583718a", "Rent", "House", "#075985", "expense"),
    ("369103ee-3b0e-5965-80c2-ad41697bac12", "Utilities", "Lightbulb", "#ca8a04", "expense"),
    ("ac742c64-9323-58f1-baf8-cb94330e24c4", "Transportation", "Car", "#b45309", "expense"),
    ("17d27958-7a81-5112-a63e-192517998aab", "Entertainment", "FilmStrip", "#0f766e", "expense"),
    ("9caa2218-9db3-5f47-b671-0849b7cce872", "Dining", "ForkKnife", "#be185d", "expense"),
    ("5a23bb64-9df1-5c09-89c1-470fe9f11028", "Health", "Heart", "#e11d48", "expense"),
    ("35907c6e-6460-50c2-b9dd-41fbe9a6808e", "Insurance", "ShieldCheck", "#404040", "expense"),
    ("a53a3d71-1971-5bae-88f8-96f9f733cc79", "Savings", "PiggyBank", "#065F46", "expense"),
    ("406e838b-6892-507c-a107-a5b927f998ae", "Clothing", "TShirt", "#7c3aed", "expense"),
    ("519661f7-ec38-5034-95cd-7d043cdb3c28", "Personal", "User", "#a21caf", "expense"),
    ("13358dad-9a83-5658-abb5-848a0b424c91", "Others", "DotsThreeOutline", "#525252", "expense"),
    ("b2fc23e8-0369-5330-b5bd-90195f6e2301", "Paycheck", "PiggyBank", "#a21caf", "income"),
    ("89f79b58-3b47-5881-b6f3-f5400685e27d", "Gifts", "Gift", "#7c3aed", "income"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert()
            .into_table(Categories::Table)
            .columns([
                Categories::Id,
                Categories::Label,
                Categories::Icon,
                Categories::BgColor,
                Categories::Kind,
                Categories::OwnerId,
            ])
            .on_conflict(OnConflict::column(Categories::Id).do_nothing().to_owned())
            .to_owned();
        for (id, label, icon, bg_color, kind) in DEFAULTS {
            insert.values_panic([
                id.into(),
                label.into(),
                icon.into(),
                bg_color.into(),
                kind.into(),
                Option::<String>::None.into(),
            ]);
        }
        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let ids = DEFAULTS.map(|(id, ..)| id);
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Categories::Table)
                    .and_where(Expr::col(Categories::Id).is_in(ids))
                    .and_where(Expr::col(Categories::OwnerId).is_null())
                    .to_owned(),
            )
            .await
    }
}
