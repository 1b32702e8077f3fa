use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use erms_quotation::{
    config::{self, AppConfig},
    db::{self, DbPool},
    entities::{party, quotation_form, salesman},
    events::{self, EventSender},
    repositories::FormFilter,
    services::{
        parties::{NewParty, PartyService},
        quotations::{FormPatch, NewQuotationForm, QuotationService},
        salesmen::{NewSalesman, SalesmanService},
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize().await?;

    let outcome = match cli.command {
        Commands::Migrate(command) => handle_migrate_command(&context, command).await,
        Commands::Status => handle_status(&context, cli.json).await,
        Commands::Salesman(command) => handle_salesman_command(&context, command, cli.json).await,
        Commands::Party(command) => handle_party_command(&context, command, cli.json).await,
        Commands::Quotation(command) => {
            handle_quotation_command(&context, command, cli.json).await
        }
    };

    context.shutdown().await;
    outcome
}

#[derive(Parser)]
#[command(name = "erms-quotation", about = "ERMS quotation numbering and form management", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    Migrate(MigrateCommands),
    /// Show build information and check the database connection
    Status,
    #[command(subcommand)]
    Salesman(SalesmanCommands),
    #[command(subcommand)]
    Party(PartyCommands),
    #[command(subcommand)]
    Quotation(QuotationCommands),
}

#[derive(Subcommand)]
enum MigrateCommands {
    /// Apply every pending migration
    Up,
    /// Roll back every applied migration
    Down,
}

#[derive(Subcommand)]
enum SalesmanCommands {
    Add(SalesmanAddArgs),
    Get(IdArgs),
    List,
}

#[derive(Args)]
struct SalesmanAddArgs {
    #[arg(long, help = "First name; its first three letters prefix every quotation number")]
    first_name: String,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    mobile_number: Option<String>,
}

#[derive(Subcommand)]
enum PartyCommands {
    Add(PartyAddArgs),
    Get(IdArgs),
    List(PartyListArgs),
}

#[derive(Args)]
struct PartyAddArgs {
    #[arg(long, help = "Salesman who owns the party")]
    salesman_id: i64,
    #[arg(long)]
    customer_name: String,
    #[arg(long)]
    mobile_number: Option<String>,
    #[arg(long)]
    billing_address: Option<String>,
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    pincode: Option<i64>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    shipping_address: Option<String>,
    #[arg(long)]
    shipping_state: Option<String>,
    #[arg(long)]
    shipping_pincode: Option<i64>,
    #[arg(long)]
    shipping_city: Option<String>,
    #[arg(long, help = "GST identification number")]
    gst_in: Option<String>,
}

#[derive(Args)]
struct PartyListArgs {
    #[arg(long, help = "Only parties owned by this salesman")]
    salesman_id: Option<i64>,
}

#[derive(Subcommand)]
enum QuotationCommands {
    /// Issue a new quotation with a freshly allocated number
    Create(QuotationCreateArgs),
    Get(IdArgs),
    List(QuotationListArgs),
    /// Overwrite only the fields that are passed
    Update(QuotationUpdateArgs),
    Delete(IdArgs),
}

#[derive(Args)]
struct IdArgs {
    id: i64,
}

#[derive(Args)]
struct FormFields {
    #[arg(long, help = "Quotation date (YYYY-MM-DD)")]
    quotation_date: Option<NaiveDate>,
    #[arg(long)]
    payment_terms: Option<String>,
    #[arg(long, help = "Due date (YYYY-MM-DD)")]
    due_date: Option<NaiveDate>,
    #[arg(long, help = "Customer purchase order number")]
    po_no: Option<String>,
    #[arg(long, help = "Export under letter of undertaking (true/false)")]
    lut: Option<bool>,
}

#[derive(Args)]
struct QuotationCreateArgs {
    #[arg(long)]
    salesman_id: i64,
    #[arg(long)]
    party_id: i64,
    #[command(flatten)]
    fields: FormFields,
}

#[derive(Args)]
struct QuotationListArgs {
    #[arg(long)]
    salesman_id: Option<i64>,
    #[arg(long)]
    party_id: Option<i64>,
    #[arg(long, help = "Substring of the quotation number")]
    number: Option<String>,
    #[arg(long, help = "Earliest quotation date (inclusive)")]
    from: Option<NaiveDate>,
    #[arg(long, help = "Latest quotation date (inclusive)")]
    to: Option<NaiveDate>,
}

#[derive(Args)]
struct QuotationUpdateArgs {
    id: i64,
    #[arg(long, help = "Replace the quotation number")]
    quotation_number: Option<String>,
    #[command(flatten)]
    fields: FormFields,
}

struct CliContext {
    config: AppConfig,
    db: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    event_task: JoinHandle<()>,
}

impl CliContext {
    async fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load application config")?;
        config::init_tracing(config.log_level(), config.log_json);

        let db_pool = db::establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to database")?;
        if config.auto_migrate {
            db::run_migrations(&db_pool).await.map_err(|e| {
                error!("Failed running migrations: {}", e);
                anyhow!(e)
            })?;
        }

        let (event_sender, event_rx) = EventSender::channel(64);
        let event_task = tokio::spawn(events::process_events(event_rx));

        Ok(Self {
            config,
            db: Arc::new(db_pool),
            event_sender: Some(Arc::new(event_sender)),
            event_task,
        })
    }

    fn salesman_service(&self) -> SalesmanService {
        SalesmanService::new(self.db.clone(), self.event_sender.clone())
    }

    fn party_service(&self) -> PartyService {
        PartyService::new(self.db.clone(), self.event_sender.clone())
    }

    fn quotation_service(&self) -> QuotationService {
        QuotationService::new(self.db.clone(), self.event_sender.clone())
    }

    /// Drops the last event sender, waits for queued events to be logged and
    /// closes the pool.
    async fn shutdown(mut self) {
        self.event_sender.take();
        let _ = self.event_task.await;

        match Arc::try_unwrap(self.db) {
            Ok(pool) => {
                if let Err(e) = db::close_pool(pool).await {
                    warn!(error = %e, "Failed to close database pool");
                }
            }
            Err(_) => warn!("Database pool still shared at shutdown; leaving it to drop"),
        }
    }
}

async fn handle_migrate_command(context: &CliContext, command: MigrateCommands) -> Result<()> {
    match command {
        MigrateCommands::Up => {
            db::run_migrations(&context.db)
                .await
                .context("failed to apply migrations")?;
            println!("Migrations applied");
        }
        MigrateCommands::Down => {
            if context.config.is_production() {
                return Err(anyhow!("refusing to roll back migrations in production"));
            }
            db::rollback_migrations(&context.db)
                .await
                .context("failed to roll back migrations")?;
            println!("Migrations rolled back");
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct StatusReport {
    version: &'static str,
    git_hash: &'static str,
    build_time: &'static str,
    environment: String,
    database: &'static str,
}

async fn handle_status(context: &CliContext, json: bool) -> Result<()> {
    let database = match db::check_connection(&context.db).await {
        Ok(()) => "ok",
        Err(_) => "unreachable",
    };
    let report = StatusReport {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: env!("GIT_HASH"),
        build_time: env!("BUILD_TIME"),
        environment: context.config.environment.clone(),
        database,
    };

    if json {
        print_json(&report)?;
    } else {
        println!(
            "erms-quotation {} ({} built {})",
            report.version, report.git_hash, report.build_time
        );
        println!("environment: {}", report.environment);
        println!("database: {}", report.database);
    }
    Ok(())
}

async fn handle_salesman_command(
    context: &CliContext,
    command: SalesmanCommands,
    json: bool,
) -> Result<()> {
    let service = context.salesman_service();
    match command {
        SalesmanCommands::Add(args) => {
            let created = service
                .create_salesman(NewSalesman {
                    first_name: args.first_name,
                    last_name: args.last_name,
                    email: args.email,
                    mobile_number: args.mobile_number,
                })
                .await
                .context("failed to create salesman")?;
            if json {
                print_json(&created)?;
            } else {
                render_salesman(&created);
            }
        }
        SalesmanCommands::Get(args) => {
            let found = service
                .get_salesman(args.id)
                .await
                .context("failed to load salesman")?
                .ok_or_else(|| anyhow!("salesman {} not found", args.id))?;
            if json {
                print_json(&found)?;
            } else {
                render_salesman(&found);
            }
        }
        SalesmanCommands::List => {
            let all = service
                .list_salesmen()
                .await
                .context("failed to list salesmen")?;
            if json {
                print_json(&all)?;
            } else {
                println!("Salesmen: {}", all.len());
                all.iter().for_each(render_salesman);
            }
        }
    }
    Ok(())
}

async fn handle_party_command(context: &CliContext, command: PartyCommands, json: bool) -> Result<()> {
    let service = context.party_service();
    match command {
        PartyCommands::Add(args) => {
            let input = NewParty {
                customer_name: args.customer_name,
                mobile_number: args.mobile_number,
                billing_address: args.billing_address,
                state: args.state,
                pincode: args.pincode,
                city: args.city,
                shipping_address: args.shipping_address,
                shipping_state: args.shipping_state,
                shipping_pincode: args.shipping_pincode,
                shipping_city: args.shipping_city,
                gst_in: args.gst_in,
            };
            let created = service
                .create_party(args.salesman_id, input)
                .await
                .context("failed to create party")?;
            if json {
                print_json(&created)?;
            } else {
                render_party(&created);
            }
        }
        PartyCommands::Get(args) => {
            let found = service
                .get_party(args.id)
                .await
                .context("failed to load party")?
                .ok_or_else(|| anyhow!("party {} not found", args.id))?;
            if json {
                print_json(&found)?;
            } else {
                render_party(&found);
            }
        }
        PartyCommands::List(args) => {
            let all = match args.salesman_id {
                Some(salesman_id) => service.list_parties_for_salesman(salesman_id).await,
                None => service.list_parties().await,
            }
            .context("failed to list parties")?;
            if json {
                print_json(&all)?;
            } else {
                println!("Parties: {}", all.len());
                all.iter().for_each(render_party);
            }
        }
    }
    Ok(())
}

async fn handle_quotation_command(
    context: &CliContext,
    command: QuotationCommands,
    json: bool,
) -> Result<()> {
    let service = context.quotation_service();
    match command {
        QuotationCommands::Create(args) => {
            let input = NewQuotationForm {
                quotation_date: args.fields.quotation_date,
                payment_terms: args.fields.payment_terms,
                due_date: args.fields.due_date,
                po_no: args.fields.po_no,
                lut: args.fields.lut,
            };
            let created = service
                .create_form(args.salesman_id, args.party_id, input)
                .await
                .context("failed to create quotation")?;
            info!(quotation_number = %created.quotation_number, "Issued quotation");
            if json {
                print_json(&created)?;
            } else {
                render_form(&created);
            }
        }
        QuotationCommands::Get(args) => {
            let found = service
                .get_form(args.id)
                .await
                .context("failed to load quotation")?
                .ok_or_else(|| anyhow!("quotation {} not found", args.id))?;
            if json {
                print_json(&found)?;
            } else {
                render_form(&found);
            }
        }
        QuotationCommands::List(args) => {
            let filter = FormFilter {
                salesman_id: args.salesman_id,
                party_id: args.party_id,
                number_contains: args.number,
                from_date: args.from,
                to_date: args.to,
            };
            let forms = service
                .search_forms(filter)
                .await
                .context("failed to list quotations")?;
            if json {
                print_json(&forms)?;
            } else {
                println!("Quotations: {}", forms.len());
                forms.iter().for_each(render_form);
            }
        }
        QuotationCommands::Update(args) => {
            let patch = FormPatch {
                quotation_number: args.quotation_number,
                quotation_date: args.fields.quotation_date,
                payment_terms: args.fields.payment_terms,
                due_date: args.fields.due_date,
                po_no: args.fields.po_no,
                lut: args.fields.lut,
            };
            let updated = service
                .update_form(args.id, patch)
                .await
                .context("failed to update quotation")?;
            if json {
                print_json(&updated)?;
            } else {
                render_form(&updated);
            }
        }
        QuotationCommands::Delete(args) => {
            service
                .delete_form(args.id)
                .await
                .context("failed to delete quotation")?;
            println!("Quotation {} deleted", args.id);
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_salesman(salesman: &salesman::Model) {
    println!(
        "- Salesman {} • {} • {}",
        salesman.id,
        salesman.display_name(),
        salesman.email.as_deref().unwrap_or("no email")
    );
}

fn render_party(party: &party::Model) {
    println!(
        "- Party {} • {} • salesman {} • {}",
        party.id,
        party.customer_name,
        party.salesman_id,
        party.city.as_deref().unwrap_or("-")
    );
}

fn render_form(form: &quotation_form::Model) {
    let date = form
        .quotation_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "undated".to_string());
    println!(
        "- Quotation {} • {} • {} • party {} • PO {}",
        form.id,
        form.quotation_number,
        date,
        form.party_id,
        form.po_no.as_deref().unwrap_or("-")
    );
}
