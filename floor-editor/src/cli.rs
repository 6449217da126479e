//! `floor` command line
//!
//! Layout commands work on the JSON layout file only. Everything else talks
//! to the POS and writes confirmed table changes back to the file.

use crate::core::Config;
use crate::editor::{Editor, TableCreationConfig};
use crate::services::{MenuService, TableStateService};
use crate::session::FloorSession;
use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use onslip_client::OnslipApi;
use rust_decimal::Decimal;
use shared::canvas::{CanvasState, export_file_name};
use shared::layout::distribute_chair_positions;
use shared::models::{ChairId, DEFAULT_CAPACITY, DEFAULT_HEIGHT, DEFAULT_WIDTH, TableId};
use shared::state::{DEFAULT_TABLE_STATES, Direction};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "floor", version, about = "Restaurant floor plans on Onslip 360")]
pub struct Cli {
    /// Environment file to load instead of `.env`
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Layout file
    #[arg(long, short, global = true, env = "FLOOR_LAYOUT", default_value = "floor-plan.json")]
    pub layout: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Edit the layout file
    Layout(LayoutArgs),
    /// Manage the table state vocabulary
    States(StatesArgs),
    /// Change or delete a table
    Table(TableArgs),
    /// Seat and list chairs
    Chairs(ChairsArgs),
    /// Browse the menu and order for a chair
    Menu(MenuArgs),
    /// Settle chairs on one tab
    Pay {
        #[arg(required = true)]
        chair_ids: Vec<ChairId>,
    },
}

#[derive(Args, Debug)]
pub struct LayoutArgs {
    #[command(subcommand)]
    pub command: LayoutCommand,
}

#[derive(Subcommand, Debug)]
pub enum LayoutCommand {
    /// Create an empty layout file
    New {
        #[arg(long)]
        force: bool,
    },
    /// Add tables in a grid
    Add {
        #[arg(long, default_value_t = 1)]
        count: usize,
        #[arg(long, default_value_t = DEFAULT_WIDTH)]
        width: f64,
        #[arg(long, default_value_t = DEFAULT_HEIGHT)]
        height: f64,
        #[arg(long, default_value_t = DEFAULT_CAPACITY)]
        capacity: u32,
        #[arg(long, default_value_t = 1)]
        min_capacity: u32,
    },
    /// Print the tables
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Print a table's seat slots
    Seats { table: TableId },
    /// Write a timestamped copy of the layout
    Export {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct StatesArgs {
    #[command(subcommand)]
    pub command: StatesCommand,
}

#[derive(Subcommand, Debug)]
pub enum StatesCommand {
    /// Install a vocabulary, the default one when no names are given
    Install { names: Vec<String> },
    /// Print the installed vocabulary
    List,
}

#[derive(Args, Debug)]
pub struct TableArgs {
    #[command(subcommand)]
    pub command: TableCommand,
}

#[derive(Subcommand, Debug)]
pub enum TableCommand {
    /// Advance a table's state
    State {
        table: TableId,
        #[arg(long)]
        previous: bool,
    },
    /// Re-read a table's state from the POS
    Refresh { table: TableId },
    /// Delete a table and its order
    Delete { table: TableId },
}

#[derive(Args, Debug)]
pub struct ChairsArgs {
    #[command(subcommand)]
    pub command: ChairsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ChairsCommand {
    List { table: TableId },
    Add {
        table: TableId,
        position: u32,
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct MenuArgs {
    #[command(subcommand)]
    pub command: MenuCommand,
}

#[derive(Subcommand, Debug)]
pub enum MenuCommand {
    /// Print the products
    List,
    /// Put a product on a chair's tab
    Order {
        chair: ChairId,
        product: i64,
        #[arg(long, default_value = "1")]
        quantity: Decimal,
    },
}

/// Executes parsed commands against one layout file
pub struct Runner {
    layout: PathBuf,
    config: Config,
    api: Option<Arc<dyn OnslipApi>>,
}

impl Runner {
    pub fn new(layout: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            layout: layout.into(),
            config,
            api: None,
        }
    }

    /// Use `api` instead of connecting from the configuration
    pub fn with_api(mut self, api: Arc<dyn OnslipApi>) -> Self {
        self.api = Some(api);
        self
    }

    fn api(&mut self) -> anyhow::Result<Arc<dyn OnslipApi>> {
        if let Some(api) = &self.api {
            return Ok(api.clone());
        }
        if !self.config.has_credentials() {
            bail!("ONSLIP_REALM, ONSLIP_KEY_ID and ONSLIP_KEY must be set");
        }
        let client = self
            .config
            .client_config()
            .build_http_client()
            .context("Failed to create POS client")?;
        let api: Arc<dyn OnslipApi> = Arc::new(client);
        self.api = Some(api.clone());
        Ok(api)
    }

    fn load_editor(&self) -> anyhow::Result<Editor> {
        let canvas = CanvasState::read_from_path(&self.layout)
            .with_context(|| format!("Failed to read layout {}", self.layout.display()))?;
        let mut editor = Editor::with_name_prefix(self.config.table_name_prefix.clone());
        editor.import(canvas);
        Ok(editor)
    }

    fn save_editor(&self, editor: &Editor) -> anyhow::Result<()> {
        editor
            .export()
            .write_to_path(&self.layout)
            .with_context(|| format!("Failed to write layout {}", self.layout.display()))
    }

    fn session(&mut self) -> anyhow::Result<FloorSession> {
        let editor = self.load_editor()?;
        Ok(FloorSession::new(editor, self.api()?))
    }

    pub async fn run(&mut self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Layout(args) => self.edit_layout(args.command),
            Command::States(args) => self.states(args.command).await,
            Command::Table(args) => self.table(args.command).await,
            Command::Chairs(args) => self.chairs(args.command).await,
            Command::Menu(args) => self.menu(args.command).await,
            Command::Pay { chair_ids } => {
                let menu = MenuService::new(self.api()?);
                let outcome = menu.combine_and_pay(&chair_ids).await?;
                println!(
                    "Paid on tab {} as \"{}\" ({} merged)",
                    outcome.primary_tab_id,
                    outcome.name,
                    outcome.merged_tab_ids.len()
                );
                Ok(())
            }
        }
    }

    fn edit_layout(&mut self, command: LayoutCommand) -> anyhow::Result<()> {
        match command {
            LayoutCommand::New { force } => {
                if self.layout.exists() && !force {
                    bail!("{} already exists, use --force to overwrite", self.layout.display());
                }
                self.save_editor(&Editor::with_name_prefix(self.config.table_name_prefix.clone()))?;
                println!("Created {}", self.layout.display());
            }
            LayoutCommand::Add {
                count,
                width,
                height,
                capacity,
                min_capacity,
            } => {
                let mut editor = self.load_editor()?;
                let ids = editor.add_tables(&TableCreationConfig {
                    width,
                    height,
                    max_capacity: capacity,
                    min_capacity,
                    count,
                })?;
                self.save_editor(&editor)?;
                println!("Added {} table(s): {:?}", ids.len(), ids);
            }
            LayoutCommand::Show { json } => {
                let editor = self.load_editor()?;
                if json {
                    println!("{}", serde_json::to_string_pretty(editor.tables())?);
                } else {
                    print_tables(&editor);
                }
            }
            LayoutCommand::Seats { table } => {
                let editor = self.load_editor()?;
                let table = editor
                    .table(table)
                    .with_context(|| format!("Table {} not found", table))?;
                let distribution = distribute_chair_positions(table.width, table.height);
                println!("{}: {} slot(s)", table.name, distribution.total());
                for slot in distribution.slots() {
                    let marker = if table.available_positions.contains(&slot.index) { "*" } else { " " };
                    println!("{} {:>3}  {}[{}]", marker, slot.index, slot.zone, slot.offset);
                }
            }
            LayoutCommand::Export { dir } => {
                let editor = self.load_editor()?;
                let path = dir.join(export_file_name(chrono::Utc::now()));
                editor.export().write_to_path(&path)?;
                println!("Exported to {}", path.display());
            }
        }
        Ok(())
    }

    async fn states(&mut self, command: StatesCommand) -> anyhow::Result<()> {
        let service = TableStateService::new(self.api()?);
        let sequence = match command {
            StatesCommand::Install { names } => {
                let names = if names.is_empty() {
                    DEFAULT_TABLE_STATES.iter().map(|s| s.to_string()).collect()
                } else {
                    names
                };
                service.install_states(&names).await?
            }
            StatesCommand::List => service.fetch_states().await?,
        };
        for state in sequence.states() {
            println!("{}", state);
        }
        Ok(())
    }

    async fn table(&mut self, command: TableCommand) -> anyhow::Result<()> {
        let mut session = self.session()?;
        match command {
            TableCommand::State { table, previous } => {
                let direction = if previous { Direction::Previous } else { Direction::Next };
                let state = session.change_table_state(table, direction).await?;
                println!("{}: {}", table, describe_state(state.as_ref()));
            }
            TableCommand::Refresh { table } => {
                let state = session.refresh_table_state(table).await?;
                println!("{}: {}", table, describe_state(state.as_ref()));
            }
            TableCommand::Delete { table } => {
                session.delete_table(table).await?;
                println!("Deleted table {}", table);
            }
        }
        self.save_editor(session.editor())
    }

    async fn chairs(&mut self, command: ChairsCommand) -> anyhow::Result<()> {
        let session = self.session()?;
        match command {
            ChairsCommand::List { table } => {
                for chair in session.table_chairs(table).await? {
                    let paid = if chair.is_paid() { " (paid)" } else { "" };
                    println!("{:>6}  #{:<3} {}{}", chair.chair_id, chair.position, chair.display_name(), paid);
                }
            }
            ChairsCommand::Add { table, position, name } => {
                let chair = session.create_chair(table, name.as_deref(), position).await?;
                println!("Seated {} as chair {}", chair.display_name(), chair.chair_id);
            }
        }
        Ok(())
    }

    async fn menu(&mut self, command: MenuCommand) -> anyhow::Result<()> {
        let menu = MenuService::new(self.api()?);
        match command {
            MenuCommand::List => {
                for entry in menu.list_products().await? {
                    let price = entry.product.price.map(|p| format!("{:.2}", p)).unwrap_or_default();
                    println!("{:>6}  {:<30} {:<16} {:>10}", entry.product.id, entry.product.name, entry.group_name, price);
                }
            }
            MenuCommand::Order {
                chair,
                product,
                quantity,
            } => {
                let tab = menu.add_product_to_chair(chair, product, quantity).await?;
                println!("Chair {} now has {} item(s)", chair, tab.items.len());
            }
        }
        Ok(())
    }
}

fn describe_state(state: Option<&shared::state::TableState>) -> String {
    state.map(|s| s.to_string()).unwrap_or_else(|| "no state".into())
}

fn print_tables(editor: &Editor) {
    if editor.tables().is_empty() {
        println!("No tables");
        return;
    }
    for table in editor.tables() {
        let order = table.order_id.map(|id| id.to_string()).unwrap_or_else(|| "-".into());
        println!(
            "{:>4}  {:<8} seats {}-{}  at ({:.0}, {:.0})  {}x{}  order {}  {}{}",
            table.id,
            table.name,
            table.effective_min_capacity(),
            table.capacity,
            table.x,
            table.y,
            table.width,
            table.height,
            order,
            describe_state(table.current_state.as_ref()),
            if table.locked { "  [locked]" } else { "" },
        );
    }
}
