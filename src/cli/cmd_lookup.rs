// Lookup commands: banks, bank, ifsc
use super::utils::{self, GlobalArgs};
use anyhow::Result;
use clap::Args;
use rbi_ifsc::BranchRecord;
use rbi_ifsc::record::Field;

#[derive(Args)]
#[command(
    about = "List bank names known to the index",
    help_template = crate::clap_help!(
        examples: "  {bin} banks\n  \
                   {bin} banks --json"
    )
)]
pub struct BanksCommand {
    /// Print a JSON array instead of one name per line
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
#[command(
    about = "Show all branches of a bank",
    help_template = crate::clap_help!(
        examples: "  {bin} bank \"State Bank of India\"\n  \
                   {bin} bank \"state bank of india\" --json"
    )
)]
pub struct BankCommand {
    /// Bank name as listed by `banks` (case-insensitive)
    pub name: String,

    /// Print JSON records instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
#[command(
    about = "Show the branch for an IFSC code",
    help_template = crate::clap_help!(
        examples: "  {bin} ifsc SBIN0000001\n  \
                   {bin} ifsc sbin0000001 --json"
    )
)]
pub struct IfscCommand {
    /// 11-character IFSC code
    pub code: String,

    /// Print the JSON record
    #[arg(long)]
    pub json: bool,
}

pub fn run_banks(cmd: BanksCommand, global: &GlobalArgs) -> Result<()> {
    let service = global.service()?;
    let banks = utils::runtime()?.block_on(service.list_banks())?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&banks)?);
    } else {
        for bank in &banks {
            println!("{}", bank);
        }
    }
    Ok(())
}

pub fn run_bank(cmd: BankCommand, global: &GlobalArgs) -> Result<()> {
    let service = global.service()?;
    let rows = utils::runtime()?.block_on(service.rows_for_bank(&cmd.name))?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{:<11}  {:<30}  {:<20}  STATE", "IFSC", "BRANCH", "CITY");
    for row in &rows {
        println!(
            "{:<11}  {:<30}  {:<20}  {}",
            row.ifsc,
            truncate(&row.branch, 30),
            truncate(&row.city1, 20),
            row.state
        );
    }
    eprintln!("\n{} branches", rows.len());
    Ok(())
}

pub fn run_ifsc(cmd: IfscCommand, global: &GlobalArgs) -> Result<()> {
    let service = global.service()?;
    let row = utils::runtime()?.block_on(service.row_for_ifsc(&cmd.code))?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&row)?);
    } else {
        print_record(&row);
    }
    Ok(())
}

fn print_record(row: &BranchRecord) {
    for field in Field::ALL {
        println!("{:<9} {}", field.name(), row.get(field));
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
