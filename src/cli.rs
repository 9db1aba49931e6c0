use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::backend::EscrowClient;
use crate::config::BackendConfig;
use crate::fees::{reconcile, FeeQuote, FeeSchedule};
use crate::money::{format_amount, Currency, Principal, PLACEHOLDER};
use crate::records::{Deal, DisplayTotal, Milestone, Proposal, Transaction};
use crate::report::{read_amounts, write_quotes};

#[derive(Parser)]
#[command(name = "mountescrow-fees")]
#[command(about = "Escrow fee quoting and deal totals for Mountescrow")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Quote the escrow fee for a principal amount
    Quote {
        /// Principal amount (e.g. 2000, 1,500,000.50, ₦3000000)
        amount: String,
        /// Display currency (NGN, USD, GBP, EUR)
        #[arg(long, default_value = "NGN")]
        currency: Currency,
        /// Print the quote as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the fee schedule
    Schedule {
        /// Display currency (NGN, USD, GBP, EUR)
        #[arg(long, default_value = "NGN")]
        currency: Currency,
        /// Print the schedule as JSON
        #[arg(long)]
        json: bool,
    },
    /// Quote every amount in a CSV file
    Batch {
        /// CSV file with an `amount` column (or amounts in the first column)
        #[arg(long)]
        input: PathBuf,
        /// Output file path (JSON); a CSV twin is written next to it
        #[arg(long, default_value = "quotes.json")]
        out: PathBuf,
    },
    /// Show deals from the escrow backend with their display totals
    Deal {
        /// Deal ids (every visible deal when omitted)
        ids: Vec<String>,
        /// Compare each persisted escrow fee with the current schedule
        #[arg(long)]
        reconcile: bool,
        /// Display currency (NGN, USD, GBP, EUR)
        #[arg(long, default_value = "NGN")]
        currency: Currency,
        #[command(flatten)]
        backend: BackendArgs,
    },
    /// Show proposals from the escrow backend with their display totals
    Proposal {
        /// Proposal id (every visible proposal when omitted)
        id: Option<String>,
        /// Display currency (NGN, USD, GBP, EUR)
        #[arg(long, default_value = "NGN")]
        currency: Currency,
        #[command(flatten)]
        backend: BackendArgs,
    },
    /// List wallet transactions from the escrow backend
    Transactions {
        /// Display currency (NGN, USD, GBP, EUR)
        #[arg(long, default_value = "NGN")]
        currency: Currency,
        #[command(flatten)]
        backend: BackendArgs,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct BackendArgs {
    /// JSON file with backend settings (flags override it)
    #[arg(long)]
    pub backend_config: Option<PathBuf>,
    /// Escrow backend base URL
    #[arg(long, env = "MOUNTESCROW_BACKEND_URL")]
    pub backend_url: Option<String>,
    /// Session cookie forwarded to the backend
    #[arg(long, env = "MOUNTESCROW_SESSION_COOKIE", hide_env_values = true)]
    pub session_cookie: Option<String>,
    /// CSRF token forwarded to the backend
    #[arg(long, env = "MOUNTESCROW_CSRF_TOKEN", hide_env_values = true)]
    pub csrf_token: Option<String>,
    /// Request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl BackendArgs {
    pub fn resolve(self) -> Result<BackendConfig> {
        let mut config = match &self.backend_config {
            Some(path) => BackendConfig::from_file(path)?,
            None => BackendConfig::default(),
        };
        if let Some(url) = self.backend_url {
            config.base_url = url;
        }
        if self.session_cookie.is_some() {
            config.session_cookie = self.session_cookie;
        }
        if self.csrf_token.is_some() {
            config.csrf_token = self.csrf_token;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = secs;
        }
        Ok(config)
    }

    fn client(self) -> Result<EscrowClient> {
        let config = self.resolve()?;
        EscrowClient::new(config).context("Failed to create escrow backend client")
    }
}

fn percent(p: Decimal) -> String {
    format!("{}%", p.normalize())
}

fn amount_or_placeholder(amount: Option<Decimal>, currency: Currency) -> String {
    amount
        .map(|a| format_amount(a, currency))
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn print_quote(quote: &FeeQuote, currency: Currency) {
    let b = quote.breakdown;
    if let Some(reason) = quote.coercion {
        println!(
            "Warning: input {:?} treated as 0 ({reason})",
            quote.input.as_deref().unwrap_or_default()
        );
    }
    println!("Principal:        {}", format_amount(b.principal, currency));
    println!("Tier:             {}", quote.tier + 1);
    println!(
        "Buyer fee:        {} ({})",
        format_amount(b.buyer_fee, currency),
        percent(b.buyer_fee_percent)
    );
    println!(
        "Seller fee:       {} ({})",
        format_amount(b.seller_fee, currency),
        percent(b.seller_fee_percent)
    );
    println!(
        "Total fee:        {} ({})",
        format_amount(b.total_fee, currency),
        percent(b.total_fee_percent)
    );
    println!("Buyer pays:       {}", format_amount(b.buyer_pays(), currency));
    println!("Seller receives:  {}", format_amount(b.seller_receives(), currency));
}

fn print_schedule(schedule: &FeeSchedule, currency: Currency) {
    println!("{:<4} {:<28} {:>8} {:>8} {:>8}", "Tier", "Principal", "Buyer", "Seller", "Total");
    for (i, (lower, tier)) in schedule.bands().enumerate() {
        let range = match (tier.upper_bound, lower) {
            (Some(upper), _) => format!("<= {}", format_amount(upper, currency)),
            (None, Some(lower)) => format!("> {}", format_amount(lower, currency)),
            (None, None) => "any".to_string(),
        };
        println!(
            "{:<4} {:<28} {:>8} {:>8} {:>8}",
            i + 1,
            range,
            percent(tier.buyer_fee_percent),
            percent(tier.seller_fee_percent),
            percent(tier.total_fee_percent)
        );
    }
}

fn print_milestones(milestones: &[Milestone], currency: Currency) {
    if milestones.is_empty() {
        return;
    }
    let now = Utc::now();
    println!("  Milestones:");
    for (i, milestone) in milestones.iter().enumerate() {
        let countdown = milestone
            .auto_approval_countdown(now)
            .map(|c| format!("  auto-approval: {c}"))
            .unwrap_or_default();
        println!(
            "    {}. {}  {}  [{}]{}",
            i + 1,
            milestone.title.as_deref().unwrap_or("Untitled"),
            amount_or_placeholder(milestone.amount, currency),
            milestone.status.as_deref().unwrap_or("unknown"),
            countdown
        );
    }
}

fn print_deal(deal: &Deal, currency: Currency, with_reconcile: bool) {
    println!(
        "Deal {}  {}  [{}]",
        deal.id,
        deal.title.as_deref().unwrap_or("Untitled"),
        deal.status.as_deref().unwrap_or("unknown")
    );
    println!("  Amount:      {}", amount_or_placeholder(deal.total_amount, currency));
    println!("  Escrow fee:  {}", amount_or_placeholder(deal.escrow_fee, currency));
    println!("  Total:       {}", deal.formatted_total(currency));

    if with_reconcile {
        match (deal.total_amount, deal.escrow_fee) {
            (Some(amount), Some(fee)) => match Principal::new(amount) {
                Ok(principal) => {
                    let r = reconcile(FeeSchedule::standard(), principal, fee);
                    println!(
                        "  Schedule:    {:?} (quoted total {}, difference {})",
                        r.matched,
                        format_amount(r.quoted.total_fee, currency),
                        format_amount(r.difference, currency)
                    );
                }
                Err(err) => println!("  Schedule:    not checked ({err})"),
            },
            _ => println!("  Schedule:    not checked (amount or fee missing)"),
        }
    }

    print_milestones(&deal.milestones, currency);
}

fn print_proposal(proposal: &Proposal, currency: Currency) {
    println!(
        "Proposal {}  {}  [{}]",
        proposal.id,
        proposal.project_title.as_deref().unwrap_or("Untitled"),
        proposal.status.as_deref().unwrap_or("unknown")
    );
    println!("  Amount:      {}", amount_or_placeholder(proposal.total_amount, currency));
    println!("  Escrow fee:  {}", amount_or_placeholder(proposal.escrow_fee, currency));
    println!("  Total:       {}", proposal.formatted_total(currency));
    print_milestones(&proposal.milestones, currency);
}

fn print_transactions(transactions: &[Transaction], currency: Currency) {
    println!(
        "{:<24} {:<12} {:<12} {:>20} {}",
        "Date", "Type", "Status", "Total", "Description"
    );
    for tx in transactions {
        println!(
            "{:<24} {:<12} {:<12} {:>20} {}",
            tx.created_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            tx.kind.as_deref().unwrap_or(PLACEHOLDER),
            tx.status.as_deref().unwrap_or(PLACEHOLDER),
            tx.formatted_total(currency),
            tx.description.as_deref().unwrap_or("")
        );
    }
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Quote {
                amount,
                currency,
                json,
            } => {
                let quote = FeeSchedule::standard().quote_str(&amount);
                if json {
                    println!("{}", serde_json::to_string_pretty(&quote)?);
                } else {
                    print_quote(&quote, currency);
                }
                Ok(())
            }
            Commands::Schedule { currency, json } => {
                let schedule = FeeSchedule::standard();
                if json {
                    println!("{}", serde_json::to_string_pretty(schedule)?);
                } else {
                    print_schedule(schedule, currency);
                }
                Ok(())
            }
            Commands::Batch { input, out } => {
                let amounts = read_amounts(&input)?;
                if amounts.is_empty() {
                    anyhow::bail!("No amounts found in {}", input.display());
                }

                let quotes = FeeSchedule::standard().quote_many(&amounts);
                let coerced = quotes.iter().filter(|q| q.was_coerced()).count();

                let csv_path = write_quotes(&quotes, &out)?;
                println!(
                    "Quoted {} amounts ({} coerced to 0). Results written to {} and {}",
                    quotes.len(),
                    coerced,
                    out.display(),
                    csv_path.display()
                );
                Ok(())
            }
            Commands::Deal {
                ids,
                reconcile,
                currency,
                backend,
            } => {
                let client = backend.client()?;
                let deals = if ids.is_empty() {
                    client.deals().await
                } else {
                    client.fetch_deals(&ids).await
                }
                .context("Failed to fetch deals")?;
                if deals.is_empty() {
                    println!("No deals");
                }
                for deal in &deals {
                    print_deal(deal, currency, reconcile);
                }
                Ok(())
            }
            Commands::Proposal {
                id,
                currency,
                backend,
            } => {
                let client = backend.client()?;
                let proposals = match id {
                    Some(id) => vec![client
                        .proposal(&id)
                        .await
                        .with_context(|| format!("Failed to fetch proposal {id}"))?],
                    None => client
                        .proposals()
                        .await
                        .context("Failed to fetch proposals")?,
                };
                if proposals.is_empty() {
                    println!("No proposals");
                }
                for proposal in &proposals {
                    print_proposal(proposal, currency);
                }
                Ok(())
            }
            Commands::Transactions { currency, backend } => {
                let client = backend.client()?;
                let transactions = client
                    .transactions()
                    .await
                    .context("Failed to fetch transactions")?;
                if transactions.is_empty() {
                    println!("No transactions");
                } else {
                    print_transactions(&transactions, currency);
                }
                Ok(())
            }
        }
    }
}
