use crate::{
    chart,
    command::{Command, Outcome, RecordPatch},
    data::{normalize_amount, parse_date, Category, Error, ExpenseRecord, Position},
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::{io::Write, path::PathBuf, str::FromStr};

/// Personal expense tracker: add, view, edit or delete your daily expenses,
/// and see where the money went.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub(crate) struct Args {
    /// CSV file holding the expenses. Created on first write.
    #[arg(short, long, env = "EXPENSES_FILE", default_value = "expenses.csv")]
    pub file: PathBuf,

    /// More logging on stderr (-v for info, -vv for debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub action: Action,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Action {
    /// Add an expense at the end of the list
    Add {
        /// Defaults to today
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Food, Transport, Shopping, Bills, Entertainment or Other
        #[arg(short, long, value_parser = Category::parse_known)]
        category: Category,
        #[arg(short, long, value_parser = parse_amount)]
        amount: Decimal,
        #[arg(short = 'm', long, default_value = "")]
        description: String,
    },
    /// Show every expense with its position
    List,
    /// Show a single expense
    Show { position: Position },
    /// Change some fields of the expense at a position
    Edit {
        position: Position,
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(short, long, value_parser = Category::parse_known)]
        category: Option<Category>,
        #[arg(short, long, value_parser = parse_amount)]
        amount: Option<Decimal>,
        #[arg(short = 'm', long)]
        description: Option<String>,
    },
    /// Delete the expense at a position; later expenses move down by one
    Delete { position: Position },
    /// Spending by category as a bar chart
    Summary {
        /// Also draw the chart into this SVG file
        #[arg(long)]
        svg: Option<PathBuf>,
    },
}

fn parse_amount(text: &str) -> Result<Decimal, Error> {
    let amount =
        Decimal::from_str(text.trim()).map_err(|_| Error::InvalidAmount(text.to_owned()))?;
    normalize_amount(amount)
}

impl Action {
    pub fn into_command(self) -> Result<Command, Error> {
        let command = match self {
            Action::Add {
                date,
                category,
                amount,
                description,
            } => Command::Add(ExpenseRecord::new(
                date.unwrap_or_else(|| chrono::Local::now().date_naive()),
                category,
                amount,
                description,
            )?),
            Action::List => Command::List,
            Action::Show { position } => Command::Show { position },
            Action::Edit {
                position,
                date,
                category,
                amount,
                description,
            } => Command::Update {
                position,
                patch: RecordPatch {
                    date,
                    category,
                    amount,
                    description,
                },
            },
            Action::Delete { position } => Command::Delete { position },
            Action::Summary { .. } => Command::Summary,
        };
        Ok(command)
    }

    pub fn svg_path(&self) -> Option<&PathBuf> {
        match self {
            Action::Summary { svg } => svg.as_ref(),
            _ => None,
        }
    }
}

/// Prints the result of a command for a human.
pub(crate) fn render<W: Write>(out: &mut W, outcome: &Outcome) -> std::io::Result<()> {
    match outcome {
        Outcome::Added { position } => writeln!(out, "Expense added as #{position}."),
        Outcome::Updated { position, record } => {
            writeln!(out, "Expense #{position} updated.")?;
            render_record(out, *position, record)
        }
        Outcome::Deleted { position, record } => {
            writeln!(out, "Expense #{position} deleted.")?;
            render_record(out, *position, record)
        }
        Outcome::Shown { position, record } => render_record(out, *position, record),
        Outcome::Listed(records) if records.is_empty() => {
            writeln!(out, "No expenses yet. Add some with `add`.")
        }
        Outcome::Listed(records) => render_table(out, records),
        Outcome::Summarized { totals, .. } if totals.is_empty() => {
            writeln!(out, "Add some expenses to see charts.")
        }
        Outcome::Summarized { totals, total } => {
            writeln!(out, "Expenses by category")?;
            write!(out, "{}", chart::text_chart(totals, *total))
        }
    }
}

fn render_record<W: Write>(
    out: &mut W,
    position: Position,
    record: &ExpenseRecord,
) -> std::io::Result<()> {
    writeln!(out, "Position:    {position}")?;
    writeln!(out, "Date:        {}", record.date)?;
    if record.category.is_listed() {
        writeln!(out, "Category:    {}", record.category)?;
    } else {
        writeln!(out, "Category:    {} (not a listed category)", record.category)?;
    }
    writeln!(out, "Amount:      {:.2}", record.amount)?;
    writeln!(out, "Description: {}", record.description)
}

fn render_table<W: Write>(out: &mut W, records: &[ExpenseRecord]) -> std::io::Result<()> {
    let rows = records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            [
                i.to_string(),
                r.date.to_string(),
                r.category.to_string(),
                format!("{:.2}", r.amount),
                r.description.clone(),
            ]
        })
        .collect::<Vec<_>>();
    let header = ["#", "Date", "Category", "Amount", "Description"];
    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    let line = |cells: [&str; 5]| {
        format!(
            "{:>w0$}  {:<w1$}  {:<w2$}  {:>w3$}  {}",
            cells[0],
            cells[1],
            cells[2],
            cells[3],
            cells[4],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
            w3 = widths[3],
        )
    };
    writeln!(out, "{}", line(header).trim_end())?;
    for row in &rows {
        writeln!(out, "{}", line(row.each_ref().map(String::as_str)).trim_end())?;
    }
    Ok(())
}
