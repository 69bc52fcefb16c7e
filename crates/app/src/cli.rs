use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use engine::{Granularity, ImageSource, Money, TransactionKind};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "walletly", version)]
#[command(about = "Wallets, incomes and expenses kept in balance")]
pub struct Cli {
    /// Optional config file path (TOML).
    #[arg(long)]
    pub config: Option<String>,

    /// Owner of the records (also read from `WALLETLY_USER`).
    #[arg(long, env = "WALLETLY_USER")]
    pub user: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Wallet(Wallet),
    Tx(Tx),
    Category(Category),
    /// Income and expense per day, month or year.
    Stats(StatsArgs),
    /// Every transaction with the wallet balance before and after it.
    Report(ReportArgs),
}

#[derive(Args, Debug)]
pub struct Wallet {
    #[command(subcommand)]
    pub command: WalletCommand,
}

#[derive(Subcommand, Debug)]
pub enum WalletCommand {
    Create(WalletCreateArgs),
    Rename(WalletRenameArgs),
    List,
    /// Delete a wallet and all of its transactions.
    Delete {
        id: Uuid,
    },
}

#[derive(Args, Debug)]
pub struct WalletCreateArgs {
    pub name: String,
    /// Opening balance, e.g. `120.50`.
    #[arg(long, default_value = "0")]
    pub amount: Money,
    /// Image URL or local file to upload.
    #[arg(long)]
    pub image: Option<String>,
}

#[derive(Args, Debug)]
pub struct WalletRenameArgs {
    pub id: Uuid,
    pub name: String,
    #[arg(long)]
    pub image: Option<String>,
}

#[derive(Args, Debug)]
pub struct Tx {
    #[command(subcommand)]
    pub command: TxCommand,
}

#[derive(Subcommand, Debug)]
pub enum TxCommand {
    Add(TxArgs),
    /// Omitted category, description and image keep their stored values.
    Edit {
        id: Uuid,
        #[command(flatten)]
        args: TxArgs,
        #[arg(long, conflicts_with = "category")]
        clear_category: bool,
        #[arg(long, conflicts_with = "description")]
        clear_description: bool,
    },
    Rm {
        id: Uuid,
        #[arg(long)]
        wallet: Uuid,
    },
    List(TxListArgs),
}

#[derive(Args, Debug)]
pub struct TxArgs {
    #[arg(long)]
    pub wallet: Uuid,
    /// `income` or `expense`.
    #[arg(long)]
    pub kind: TransactionKind,
    #[arg(long)]
    pub amount: Money,
    /// Local date (`YYYY-MM-DD`), today when omitted.
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub category: Option<Uuid>,
    #[arg(long)]
    pub description: Option<String>,
    /// Image URL or local file to upload.
    #[arg(long)]
    pub image: Option<String>,
}

#[derive(Args, Debug)]
pub struct TxListArgs {
    #[arg(long)]
    pub wallet: Option<Uuid>,
    #[arg(long)]
    pub kind: Option<TransactionKind>,
    #[arg(long, default_value_t = 50)]
    pub limit: u64,
}

#[derive(Args, Debug)]
pub struct Category {
    #[command(subcommand)]
    pub command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    Add(CategoryArgs),
    Edit {
        id: Uuid,
        #[command(flatten)]
        args: CategoryArgs,
    },
    Rm {
        id: Uuid,
        /// The category is a global one.
        #[arg(long)]
        global: bool,
    },
    List {
        /// Hide global categories.
        #[arg(long)]
        owned: bool,
    },
}

#[derive(Args, Debug)]
pub struct CategoryArgs {
    pub label: String,
    #[arg(long)]
    pub icon: String,
    #[arg(long)]
    pub color: String,
    #[arg(long)]
    pub kind: TransactionKind,
    /// Visible to every user instead of only the current one.
    #[arg(long)]
    pub global: bool,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// `week`, `month` or `year`.
    pub granularity: Granularity,
    /// IANA timezone, defaults to `app.timezone`.
    #[arg(long)]
    pub timezone: Option<String>,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// First local day included.
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// First local day excluded.
    #[arg(long)]
    pub to: Option<NaiveDate>,
    /// CSV output file, stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// `http(s)://` values are stored as they are, anything else is a file.
pub fn image_source(raw: &str) -> ImageSource {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        ImageSource::Url(raw.to_string())
    } else {
        ImageSource::File(PathBuf::from(raw))
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_a_transaction() {
        let wallet = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "walletly",
            "--user",
            "alice",
            "tx",
            "add",
            "--wallet",
            &wallet.to_string(),
            "--kind",
            "Expense",
            "--amount",
            "12,50",
            "--date",
            "2026-10-16",
        ])
        .unwrap();

        let Command::Tx(Tx {
            command: TxCommand::Add(args),
        }) = cli.command
        else {
            panic!("expected tx add");
        };
        assert_eq!(args.wallet, wallet);
        assert_eq!(args.kind, TransactionKind::Expense);
        assert_eq!(args.amount, Money::new(12_50));
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2026, 10, 16));
    }

    #[test]
    fn edit_can_clear_the_description() {
        let id = Uuid::new_v4();
        let wallet = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "walletly",
            "--user",
            "alice",
            "tx",
            "edit",
            &id.to_string(),
            "--wallet",
            &wallet.to_string(),
            "--kind",
            "expense",
            "--amount",
            "2",
            "--clear-description",
        ])
        .unwrap();

        let Command::Tx(Tx {
            command:
                TxCommand::Edit {
                    args,
                    clear_category,
                    clear_description,
                    ..
                },
        }) = cli.command
        else {
            panic!("expected tx edit");
        };
        assert!(clear_description);
        assert!(!clear_category);
        assert!(args.description.is_none());
    }

    #[test]
    fn parses_stats_granularity() {
        let cli = Cli::try_parse_from(["walletly", "--user", "alice", "stats", "monthly"]).unwrap();
        let Command::Stats(args) = cli.command else {
            panic!("expected stats");
        };
        assert_eq!(args.granularity, Granularity::Month);
    }

    #[test]
    fn tells_urls_from_files() {
        assert_eq!(
            image_source("https://img.test/a.png"),
            ImageSource::Url("https://img.test/a.png".to_string())
        );
        assert_eq!(
            image_source("receipts/a.png"),
            ImageSource::File(PathBuf::from("receipts/a.png"))
        );
    }
}
