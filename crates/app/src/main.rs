use std::{error::Error, io, sync::Arc};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::Parser;
use engine::{
    Category, CategoryCmd, DatabaseStore, Engine, HttpImageUploader, Report, Response, Service,
    Transaction, TransactionCmd, TransactionQuery, Wallet, WalletCmd,
    statistics::local_midnight_utc,
};
use migration::{Migrator, MigratorTrait};
use serde::Serialize;

use cli::{CategoryArgs, CategoryCommand, Command, TxArgs, TxCommand, WalletCommand};

mod cli;
mod settings;

type AppResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = cli::Cli::parse();
    let settings = settings::Settings::new(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "walletly={level},engine={level}",
            level = settings.app.level
        ))
        .with_writer(io::stderr)
        .init();

    let tz = parse_timezone(&settings.app.timezone)?;
    let database = sea_orm::Database::connect(settings.database.url()).await?;
    Migrator::up(&database, None).await?;
    tracing::debug!("database {:?} ready", settings.database);

    let mut builder = Engine::builder()
        .store(Arc::new(DatabaseStore::new(database)))
        .options(settings.engine);
    if let Some(upload) = &settings.upload {
        builder = builder.uploader(Arc::new(HttpImageUploader::new(
            &upload.url,
            upload.preset.clone(),
        )));
    }
    let service = Service::new(builder.build()?);

    run(&service, &cli.user, tz, cli.command).await
}

fn parse_timezone(name: &str) -> AppResult<Tz> {
    name.parse::<Tz>()
        .map_err(|err| format!("invalid timezone {name}: {err}").into())
}

/// Unwraps a successful [`Response`], turning a failed one into an error.
fn answer<T>(response: Response<T>) -> AppResult<T> {
    if !response.success {
        return Err(response.msg.into());
    }
    tracing::info!("{}", response.msg);
    response.data.ok_or_else(|| "response without data".into())
}

async fn run(service: &Service, user: &str, tz: Tz, command: Command) -> AppResult<()> {
    match command {
        Command::Wallet(wallet) => match wallet.command {
            WalletCommand::Create(args) => {
                let mut cmd = WalletCmd::create(user, args.name, args.amount);
                if let Some(image) = args.image.as_deref() {
                    cmd = cmd.image(cli::image_source(image));
                }
                print_wallet(&answer(service.create_or_update_wallet(cmd).await)?);
            }
            WalletCommand::Rename(args) => {
                let mut cmd = WalletCmd::update(args.id, user, args.name);
                if let Some(image) = args.image.as_deref() {
                    cmd = cmd.image(cli::image_source(image));
                }
                print_wallet(&answer(service.create_or_update_wallet(cmd).await)?);
            }
            WalletCommand::List => {
                for wallet in service.engine().wallets(user).await? {
                    print_wallet(&wallet);
                }
            }
            WalletCommand::Delete { id } => {
                let removed = answer(service.delete_wallet(id, user).await)?;
                println!("wallet {id} deleted with {removed} transactions");
            }
        },
        Command::Tx(tx) => match tx.command {
            TxCommand::Add(args) => {
                let date = args
                    .date
                    .map_or_else(Utc::now, |day| local_midnight_utc(&tz, day));
                let cmd = transaction_cmd(user, date, args);
                print_transaction(&answer(service.create_transaction(cmd).await)?, tz);
            }
            TxCommand::Edit {
                id,
                args,
                clear_category,
                clear_description,
            } => {
                let date = match args.date {
                    Some(day) => local_midnight_utc(&tz, day),
                    None => service.engine().transaction(id, user).await?.date,
                };
                let mut cmd = transaction_cmd(user, date, args);
                if clear_category {
                    cmd = cmd.clear_category();
                }
                if clear_description {
                    cmd = cmd.clear_description();
                }
                print_transaction(&answer(service.update_transaction(id, cmd).await)?, tz);
            }
            TxCommand::Rm { id, wallet } => {
                answer(service.delete_transaction(id, wallet, user).await)?;
                println!("transaction {id} deleted");
            }
            TxCommand::List(args) => {
                let mut query = TransactionQuery::owner(user).limit(args.limit);
                if let Some(wallet) = args.wallet {
                    query = query.wallet(wallet);
                }
                if let Some(kind) = args.kind {
                    query = query.kind(kind);
                }
                for tx in service.engine().transactions(&query).await? {
                    print_transaction(&tx, tz);
                }
            }
        },
        Command::Category(category) => match category.command {
            CategoryCommand::Add(args) => {
                let cmd = category_cmd(user, args);
                print_category(&answer(service.create_or_update_category(cmd).await)?);
            }
            CategoryCommand::Edit { id, args } => {
                let cmd = category_cmd(user, args).id(id);
                print_category(&answer(service.create_or_update_category(cmd).await)?);
            }
            CategoryCommand::Rm { id, global } => {
                let owner = (!global).then_some(user);
                answer(service.delete_category(id, owner).await)?;
                println!("category {id} deleted");
            }
            CategoryCommand::List { owned } => {
                for category in service.engine().categories(user, owned).await? {
                    print_category(&category);
                }
            }
        },
        Command::Stats(args) => {
            let tz = match args.timezone.as_deref() {
                Some(name) => parse_timezone(name)?,
                None => tz,
            };
            let stats = answer(service.fetch_stats(user, args.granularity, tz).await)?;
            for bucket in &stats.buckets {
                println!(
                    "{:<8} +{:>12} -{:>12}",
                    bucket.label, bucket.income, bucket.expense
                );
            }
        }
        Command::Report(args) => {
            let from = args.from.map(|day| local_midnight_utc(&tz, day));
            let to = args.to.map(|day| local_midnight_utc(&tz, day));
            let report = answer(service.report(user, from, to).await)?;
            match args.out {
                Some(path) => {
                    write_report(csv::Writer::from_path(&path)?, &report, tz)?;
                    println!("{} rows written to {}", report.rows.len(), path.display());
                }
                None => write_report(csv::Writer::from_writer(io::stdout()), &report, tz)?,
            }
        }
    }
    Ok(())
}

fn transaction_cmd(user: &str, date: DateTime<Utc>, args: TxArgs) -> TransactionCmd {
    let mut cmd = TransactionCmd::new(user, args.wallet, args.kind, args.amount, date);
    if let Some(category) = args.category {
        cmd = cmd.category(category);
    }
    if let Some(description) = args.description {
        cmd = cmd.description(description);
    }
    if let Some(image) = args.image.as_deref() {
        cmd = cmd.image(cli::image_source(image));
    }
    cmd
}

fn category_cmd(user: &str, args: CategoryArgs) -> CategoryCmd {
    let owner = (!args.global).then(|| user.to_string());
    CategoryCmd::new(owner, args.label, args.icon, args.color, args.kind)
}

fn print_wallet(wallet: &Wallet) {
    println!("{}", wallet_line(wallet));
}

fn wallet_line(wallet: &Wallet) -> String {
    let opened = wallet
        .opening_amount()
        .map_or_else(|| "?".to_string(), |amount| amount.to_string());
    format!(
        "{}  {:<20} {:>12}  (opened {opened}, +{} / -{})",
        wallet.id,
        wallet.name,
        wallet.amount.to_string(),
        wallet.total_income,
        wallet.total_expenses
    )
}

fn print_transaction(tx: &Transaction, tz: Tz) {
    println!(
        "{}  {}  {:<7} {:>12}  {}",
        tx.id,
        tx.date.with_timezone(&tz).format("%Y-%m-%d %H:%M"),
        tx.kind,
        tx.amount,
        tx.description.as_deref().unwrap_or_default()
    );
}

fn print_category(category: &Category) {
    let scope = if category.is_global() { "global" } else { "own" };
    println!(
        "{}  {:<16} {:<7} {:<6} {} {}",
        category.id, category.label, category.kind, scope, category.icon, category.bg_color
    );
}

#[derive(Serialize)]
struct CsvRow<'a> {
    date: String,
    wallet: &'a str,
    category: &'a str,
    kind: &'static str,
    amount: String,
    before: String,
    after: String,
    description: &'a str,
}

fn write_report<W: io::Write>(
    mut writer: csv::Writer<W>,
    report: &Report,
    tz: Tz,
) -> AppResult<()> {
    for row in &report.rows {
        writer.serialize(CsvRow {
            date: row
                .transaction
                .date
                .with_timezone(&tz)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
            wallet: &row.wallet_name,
            category: &row.category_label,
            kind: row.transaction.kind.as_str(),
            amount: row.transaction.amount.to_string(),
            before: row.before.to_string(),
            after: row.after.to_string(),
            description: row.transaction.description.as_deref().unwrap_or_default(),
        })?;
    }
    writer.flush()?;
    Ok(())
}
