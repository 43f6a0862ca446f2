use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use billify::config::{
    config_dir, load_config, load_customers, load_products, load_state, save_state,
    resolve_output_dir, PaymentStatus, Product, CONFIG_TEMPLATE, CUSTOMERS_TEMPLATE,
    PRODUCTS_TEMPLATE,
};
use billify::error::{BillingError, Result};
use billify::invoice::{
    amount_to_words, compute_invoice_totals, configured_rasterizer, decimal_to_words,
    format_decimal, generate_invoice, get_invoice_path, line_name, next_invoice_number,
    quote_items, regenerate_invoice, GenerateOptions, InvoiceTotals, LineItem, ProductLookup,
};
use billify::money::Money;
use billify::pdf::{export_snapshot, PageFormat};

#[derive(Parser)]
#[command(name = "billify")]
#[command(version, about = "Small-business billing: GST invoices with paginated PDF export", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.billify or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with template files
    Init,

    /// Generate a new invoice and export it as PDF
    Generate {
        /// Customer identifier from customers.toml
        #[arg(short, long)]
        customer: String,

        /// Line items as "product:quantity" or "product:quantity@price" (can be repeated)
        #[arg(short, long, value_name = "PRODUCT:QTY[@PRICE]")]
        item: Vec<String>,

        /// Invoice date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,

        /// Custom output file path (default: output_dir/invoice-<number>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Open generated PDF with system default viewer
        #[arg(long)]
        open: bool,
    },

    /// Compute totals for draft line items without saving an invoice
    Quote {
        /// Line items as "product:quantity" or "product:quantity@price" (can be repeated)
        #[arg(short, long, value_name = "PRODUCT:QTY[@PRICE]")]
        item: Vec<String>,
    },

    /// List configured customers
    Customers,

    /// List available products
    Products,

    /// Show invoice status and next number
    Status,

    /// List generated invoices
    List {
        /// Number of invoices to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show the line items and totals of an invoice
    Show {
        /// Invoice number or index from 'list' (e.g., 1 or INV-2026-0001)
        invoice: String,
    },

    /// Edit an existing invoice's line items
    Edit {
        /// Invoice number or index from 'list' (e.g., 1 or INV-2026-0001)
        invoice: String,

        /// New line items (replaces existing items)
        #[arg(short, long, value_name = "PRODUCT:QTY[@PRICE]")]
        item: Vec<String>,
    },

    /// Open an invoice PDF
    Open {
        /// Invoice number or index from 'list' (e.g., 1 or INV-2026-0001)
        invoice: String,
    },

    /// Regenerate an invoice PDF from stored data
    Regenerate {
        /// Invoice number or index from 'list' (e.g., 1 or INV-2026-0001)
        invoice: String,

        /// Open regenerated PDF with system default viewer
        #[arg(long)]
        open: bool,
    },

    /// Mark an invoice as paid
    MarkPaid {
        /// Invoice number or index from 'list' (e.g., 1 or INV-2026-0001)
        invoice: String,

        /// Payment date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Mark an invoice as unpaid
    MarkUnpaid {
        /// Invoice number or index from 'list' (e.g., 1 or INV-2026-0001)
        invoice: String,
    },

    /// Delete an invoice and its PDF
    Delete {
        /// Invoice number or index from 'list' (e.g., 1 or INV-2026-0001)
        invoice: String,
    },

    /// Print an amount in words (Indian numbering)
    Words {
        /// Amount in rupees, e.g. 1234.50
        #[arg(allow_hyphen_values = true)]
        amount: Decimal,
    },

    /// Split a tall invoice snapshot (PNG/JPEG) into a paginated PDF
    Paginate {
        /// Snapshot image to paginate
        snapshot: PathBuf,

        /// Output PDF path (default: snapshot path with .pdf extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Page format
        #[arg(short, long, value_enum, default_value_t = PageFormat::A4)]
        page: PageFormat,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Commands that need no config directory
    match cli.command {
        Commands::Words { amount } => return cmd_words(amount),
        Commands::Paginate {
            ref snapshot,
            ref output,
            page,
        } => return cmd_paginate(snapshot, output.clone(), page),
        _ => {}
    }

    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Generate {
            customer,
            item,
            date,
            output,
            open,
        } => cmd_generate(&cfg_dir, &customer, &item, date, output, open),
        Commands::Quote { item } => cmd_quote(&cfg_dir, &item),
        Commands::Customers => cmd_customers(&cfg_dir),
        Commands::Products => cmd_products(&cfg_dir),
        Commands::Status => cmd_status(&cfg_dir),
        Commands::List { limit } => cmd_invoices(&cfg_dir, limit),
        Commands::Show { invoice } => cmd_show(&cfg_dir, &invoice),
        Commands::Edit { invoice, item } => cmd_edit(&cfg_dir, &invoice, &item),
        Commands::Open { invoice } => cmd_open(&cfg_dir, &invoice),
        Commands::Regenerate { invoice, open } => cmd_regenerate(&cfg_dir, &invoice, open),
        Commands::MarkPaid { invoice, date } => cmd_mark_paid(&cfg_dir, &invoice, date),
        Commands::MarkUnpaid { invoice } => cmd_mark_unpaid(&cfg_dir, &invoice),
        Commands::Delete { invoice } => cmd_delete(&cfg_dir, &invoice),
        Commands::Words { .. } | Commands::Paginate { .. } => Ok(()),
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(BillingError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    // Create directories
    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("output"))?;

    // Write template files
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    fs::write(cfg_dir.join("customers.toml"), CUSTOMERS_TEMPLATE)?;
    fs::write(cfg_dir.join("products.toml"), PRODUCTS_TEMPLATE)?;

    println!("Initialized billify config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your organization details:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!(
        "  2. Add your customers:              $EDITOR {}/customers.toml",
        cfg_dir.display()
    );
    println!(
        "  3. Configure products and tax:      $EDITOR {}/products.toml",
        cfg_dir.display()
    );
    println!();
    println!("Then generate your first invoice:");
    println!("  billify generate --customer <customer-id> --item <product>:<quantity>");

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct CustomerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "GSTIN")]
    gstno: String,
    #[tabled(rename = "EMAIL")]
    email: String,
}

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "PRICE")]
    price: String,
    #[tabled(rename = "TAX")]
    tax_rate: String,
    #[tabled(rename = "HSN")]
    hsn_code: String,
}

#[derive(Tabled)]
struct InvoiceRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "DUE")]
    due: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "CUSTOMER")]
    customer: String,
}

#[derive(Tabled)]
struct LineRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "ITEM")]
    item: String,
    #[tabled(rename = "RATE")]
    rate: String,
    #[tabled(rename = "QTY")]
    quantity: String,
    #[tabled(rename = "TAXABLE")]
    taxable: String,
    #[tabled(rename = "TAX")]
    tax: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

fn format_money(value: Money, currency_symbol: &str) -> String {
    format!("{}{}", currency_symbol, value)
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| BillingError::InvalidDate(value.to_string()))
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Append summary rows under a rounded table. The first `label_columns`
/// columns are merged into one label cell and the next column holds the
/// value; any remaining columns are closed off.
fn add_financial_footer(table: &str, label_columns: usize, rows: &[(&str, String)]) -> String {
    let lines: Vec<&str> = table.lines().collect();
    if lines.len() < 4 || label_columns == 0 {
        return table.to_string();
    }

    // Parse the top border to discover column widths
    let top = lines[0];
    let Some(inner) = top.strip_prefix('╭').and_then(|s| s.strip_suffix('╮')) else {
        return table.to_string();
    };

    let widths: Vec<usize> = inner.split('┬').map(|p| p.chars().count()).collect();
    if widths.len() <= label_columns {
        return table.to_string();
    }

    let label_widths = &widths[..label_columns];
    let value_width = widths[label_columns];
    let trailing = &widths[label_columns + 1..];
    let left_width = label_widths.iter().sum::<usize>() + label_columns - 1;

    let dashes = |ws: &[usize]| -> String {
        ws.iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("┴")
    };

    // Strip the original bottom border and start building
    let mut out = lines[..lines.len() - 1].join("\n");
    out.push('\n');

    // First separator: merge label columns, keep the value, close the rest
    out.push_str(&format!("├{}┼{}", dashes(label_widths), "─".repeat(value_width)));
    if trailing.is_empty() {
        out.push_str("┤\n");
    } else {
        out.push_str(&format!("┼{}╯\n", dashes(trailing)));
    }

    // Summary rows with separators between them
    for (idx, (label, value)) in rows.iter().enumerate() {
        out.push_str(&format!(
            "│ {:>left$} │ {:>value$} │\n",
            label,
            value,
            left = left_width - 2,
            value = value_width - 2
        ));
        if idx < rows.len() - 1 {
            out.push_str(&format!(
                "├{}┼{}┤\n",
                "─".repeat(left_width),
                "─".repeat(value_width)
            ));
        }
    }

    // Bottom border
    out.push_str(&format!(
        "╰{}┴{}╯",
        "─".repeat(left_width),
        "─".repeat(value_width)
    ));

    out
}

/// Print the line items table with taxable / tax / total summary
fn print_line_items<C: ProductLookup + ?Sized>(
    items: &[LineItem],
    totals: &InvoiceTotals,
    catalog: &C,
    currency_symbol: &str,
) -> Result<()> {
    let rows: Vec<LineRow> = items
        .iter()
        .zip(&totals.lines)
        .enumerate()
        .map(|(idx, (item, line))| LineRow {
            index: idx + 1,
            item: line_name(item, catalog.get_product(&item.product_id)),
            rate: format_money(Money::from_decimal(item.unit_price), currency_symbol),
            quantity: format_decimal(item.quantity),
            taxable: format_money(line.taxable_amount, currency_symbol),
            tax: format!(
                "{} ({}%)",
                format_money(line.tax_amount, currency_symbol),
                format_decimal(line.tax_rate)
            ),
            amount: format_money(line.line_total, currency_symbol),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    let table = add_financial_footer(
        &table,
        6,
        &[
            ("TAXABLE", format_money(totals.taxable_amount, currency_symbol)),
            ("TAX", format_money(totals.tax_amount, currency_symbol)),
            ("TOTAL", format_money(totals.total, currency_symbol)),
        ],
    );
    println!("{table}");

    for idx in totals.missing_products() {
        println!(
            "Warning: line {} references missing product '{}' (taxed at 0%)",
            idx + 1,
            items[idx].product_id
        );
    }

    println!("In words: {}", amount_to_words(totals.total)?);
    Ok(())
}

/// List configured customers
fn cmd_customers(cfg_dir: &Path) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BillingError::ConfigNotFound(cfg_dir.to_path_buf()));
    }

    let customers = load_customers(cfg_dir)?;

    if customers.is_empty() {
        println!("No customers configured.");
        println!("Add customers to: {}/customers.toml", cfg_dir.display());
        return Ok(());
    }

    let mut sorted: Vec<_> = customers.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);

    let rows: Vec<CustomerRow> = sorted
        .iter()
        .map(|(id, customer)| CustomerRow {
            id: id.to_string(),
            name: customer.name.clone(),
            gstno: customer.gstno.clone().unwrap_or_else(|| "-".to_string()),
            email: customer.email.clone(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// List available products
fn cmd_products(cfg_dir: &Path) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BillingError::ConfigNotFound(cfg_dir.to_path_buf()));
    }

    let config = load_config(cfg_dir)?;
    let products = load_products(cfg_dir)?;

    if products.is_empty() {
        println!("No products configured.");
        println!("Add products to: {}/products.toml", cfg_dir.display());
        return Ok(());
    }

    let mut sorted: Vec<(&String, &Product)> = products.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);

    let rows: Vec<ProductRow> = sorted
        .iter()
        .map(|(id, product)| ProductRow {
            id: id.to_string(),
            name: product.name.clone(),
            price: format!(
                "{}/{}",
                format_money(Money::from_decimal(product.price), &config.invoice.currency_symbol),
                product.unit
            ),
            tax_rate: format!("{}%", format_decimal(product.tax_rate)),
            hsn_code: product.hsn_code.clone().unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// Show invoice status
fn cmd_status(cfg_dir: &Path) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BillingError::ConfigNotFound(cfg_dir.to_path_buf()));
    }

    let config = load_config(cfg_dir)?;
    let customers = load_customers(cfg_dir)?;
    let products = load_products(cfg_dir)?;
    let state = load_state(cfg_dir)?;

    let current_year = today().year() as u32;
    let (next_number, _) = next_invoice_number(&config, &state, current_year);

    println!("Invoice Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!("Organization:     {}", config.organization.name);
    println!("Customers:        {}", customers.len());
    println!("Products:         {}", products.len());
    println!(
        "Output directory: {}",
        resolve_output_dir(&config.pdf.output_dir, cfg_dir).display()
    );
    println!("Next invoice:     {}", next_number);

    if !state.history.is_empty() {
        println!();
        println!("Recent invoices:");
        for entry in state.history.iter().rev().take(5) {
            println!(
                "  {} - {} - {}",
                entry.number,
                entry.customer,
                format_money(entry.total_amount, &config.invoice.currency_symbol)
            );
        }
    }

    Ok(())
}

/// List generated invoices with PAID / UNPAID / OVERDUE status
fn cmd_invoices(cfg_dir: &Path, limit: Option<usize>) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BillingError::ConfigNotFound(cfg_dir.to_path_buf()));
    }

    let config = load_config(cfg_dir)?;
    let state = load_state(cfg_dir)?;
    let symbol = &config.invoice.currency_symbol;

    if state.history.is_empty() {
        println!("No invoices generated yet.");
        return Ok(());
    }

    let invoices: Vec<_> = state.history.iter().rev().enumerate().collect();
    let invoices = match limit {
        Some(n) => &invoices[..n.min(invoices.len())],
        None => &invoices[..],
    };

    let today = today();
    let rows: Vec<InvoiceRow> = invoices
        .iter()
        .map(|(idx, entry)| InvoiceRow {
            index: idx + 1,
            number: entry.number.clone(),
            date: entry.inv_date.to_string(),
            due: entry.due_date.to_string(),
            total: format_money(entry.total_amount, symbol),
            status: entry.status(today).to_string(),
            customer: entry.customer.clone(),
        })
        .collect();

    // Summary covers only the rows shown
    let shown_total: Money = invoices.iter().map(|(_, e)| e.total_amount).sum();
    let shown_outstanding: Money = invoices.iter().map(|(_, e)| e.outstanding()).sum();
    let shown_paid = shown_total - shown_outstanding;

    let table = Table::new(rows).with(Style::rounded()).to_string();
    let table = add_financial_footer(
        &table,
        4,
        &[
            ("TOTAL", format_money(shown_total, symbol)),
            ("(-) PAID", format_money(shown_paid, symbol)),
            ("(=) OUTSTANDING", format_money(shown_outstanding, symbol)),
        ],
    );

    println!("{table}");
    println!();
    println!("Total: {} invoices", state.history.len());

    let overdue = state
        .history
        .iter()
        .filter(|e| e.status(today) == PaymentStatus::Overdue)
        .count();
    if overdue > 0 {
        println!("Overdue: {overdue}");
    }

    println!("Use index number with show/open/edit/regenerate/mark-paid (e.g., 'billify show 1')");

    Ok(())
}

/// Resolve an invoice reference to the actual invoice number.
/// Accepts either an index (1-based) from 'list' or the full invoice number.
fn resolve_invoice_number(cfg_dir: &Path, reference: &str) -> Result<String> {
    let state = load_state(cfg_dir)?;

    // Try to parse as an index first
    if let Ok(idx) = reference.parse::<usize>() {
        if idx == 0 {
            return Err(BillingError::InvalidInvoiceIndex(reference.to_string()));
        }
        // Invoices are displayed in reverse order (newest first), 1-indexed
        let invoices: Vec<_> = state.history.iter().rev().collect();
        if idx > invoices.len() {
            return Err(BillingError::InvalidInvoiceIndex(reference.to_string()));
        }
        return Ok(invoices[idx - 1].number.clone());
    }

    // Otherwise, treat as invoice number - verify it exists
    if state.history.iter().any(|e| e.number == reference) {
        Ok(reference.to_string())
    } else {
        Err(BillingError::InvoiceNotFound(reference.to_string()))
    }
}

/// Generate a new invoice
fn cmd_generate(
    cfg_dir: &Path,
    customer_id: &str,
    items_input: &[String],
    date: Option<String>,
    output: Option<PathBuf>,
    open: bool,
) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BillingError::ConfigNotFound(cfg_dir.to_path_buf()));
    }

    if items_input.is_empty() {
        return Err(BillingError::NoItems);
    }

    let options = GenerateOptions {
        inv_date: date.as_deref().map(parse_date).transpose()?,
        output,
    };

    let config = load_config(cfg_dir)?;
    let rasterizer = configured_rasterizer(cfg_dir)?;
    let issued = generate_invoice(cfg_dir, customer_id, items_input, options, &rasterizer)?;

    // Print summary
    println!("Generated {}", issued.record.number);
    println!("  Customer: {}", issued.record.customer);
    println!(
        "  Total:    {}",
        format_money(issued.totals.total, &config.invoice.currency_symbol)
    );
    println!("  In words: {}", issued.total_in_words);
    println!("  Pages:    {}", issued.document.page_count());
    println!("  Saved:    {}", issued.pdf_path.display());

    if open {
        open_path(&issued.pdf_path)?;
    }
    Ok(())
}

/// Price draft items without saving
fn cmd_quote(cfg_dir: &Path, items_input: &[String]) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BillingError::ConfigNotFound(cfg_dir.to_path_buf()));
    }

    let config = load_config(cfg_dir)?;
    let catalog = load_products(cfg_dir)?;
    let quote = quote_items(&catalog, items_input)?;

    print_line_items(
        &quote.items,
        &quote.totals,
        &catalog,
        &config.invoice.currency_symbol,
    )
}

/// Show an invoice's lines and recomputed totals
fn cmd_show(cfg_dir: &Path, invoice_ref: &str) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BillingError::ConfigNotFound(cfg_dir.to_path_buf()));
    }

    let invoice_number = resolve_invoice_number(cfg_dir, invoice_ref)?;
    let config = load_config(cfg_dir)?;
    let customers = load_customers(cfg_dir)?;
    let catalog = load_products(cfg_dir)?;
    let state = load_state(cfg_dir)?;
    let symbol = &config.invoice.currency_symbol;

    let entry = state
        .history
        .iter()
        .find(|e| e.number == invoice_number)
        .ok_or_else(|| BillingError::InvoiceNotFound(invoice_number.clone()))?;

    let customer_name = customers
        .get(&entry.customer)
        .map(|c| format!("{} ({})", c.name, entry.customer))
        .unwrap_or_else(|| entry.customer.clone());

    println!("Invoice {}", entry.number);
    println!("  Customer: {}", customer_name);
    println!("  Date:     {}", entry.inv_date);
    println!("  Due:      {}", entry.due_date);
    match entry.paid_date {
        Some(paid) if entry.is_paid => println!("  Status:   PAID on {}", paid),
        _ => println!("  Status:   {}", entry.status(today())),
    }

    let totals = compute_invoice_totals(&entry.items, &catalog);
    print_line_items(&entry.items, &totals, &catalog, symbol)?;

    if totals.total != entry.total_amount {
        println!(
            "Note: stored total {} differs from recomputed {}; run 'billify regenerate {}'",
            format_money(entry.total_amount, symbol),
            format_money(totals.total, symbol),
            entry.number
        );
    }

    Ok(())
}

/// Edit an existing invoice
fn cmd_edit(cfg_dir: &Path, invoice_ref: &str, items: &[String]) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BillingError::ConfigNotFound(cfg_dir.to_path_buf()));
    }

    if items.is_empty() {
        return Err(BillingError::NoItems);
    }

    let invoice_number = resolve_invoice_number(cfg_dir, invoice_ref)?;
    let config = load_config(cfg_dir)?;
    let rasterizer = configured_rasterizer(cfg_dir)?;
    let issued = regenerate_invoice(cfg_dir, &invoice_number, Some(items), &rasterizer)?;

    println!("Updated {}", invoice_number);
    println!("  Items:  {}", items.join(", "));
    println!(
        "  Total:  {}",
        format_money(issued.record.total_amount, &config.invoice.currency_symbol)
    );
    println!("  Saved:  {}", issued.pdf_path.display());

    Ok(())
}

/// Open an invoice PDF
fn cmd_open(cfg_dir: &Path, invoice_ref: &str) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BillingError::ConfigNotFound(cfg_dir.to_path_buf()));
    }

    let invoice_number = resolve_invoice_number(cfg_dir, invoice_ref)?;
    let pdf_path = get_invoice_path(cfg_dir, &invoice_number)?;

    open_path(&pdf_path)?;

    println!("Opened {}", pdf_path.display());
    Ok(())
}

fn open_path(pdf_path: &Path) -> Result<()> {
    // Open with system default viewer
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(pdf_path)
            .spawn()
            .map_err(BillingError::Io)?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(pdf_path)
            .spawn()
            .map_err(BillingError::Io)?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", pdf_path.to_str().unwrap_or("")])
            .spawn()
            .map_err(BillingError::Io)?;
    }
    Ok(())
}

/// Regenerate an invoice PDF
fn cmd_regenerate(cfg_dir: &Path, invoice_ref: &str, open: bool) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BillingError::ConfigNotFound(cfg_dir.to_path_buf()));
    }

    let invoice_number = resolve_invoice_number(cfg_dir, invoice_ref)?;
    let rasterizer = configured_rasterizer(cfg_dir)?;
    let issued = regenerate_invoice(cfg_dir, &invoice_number, None, &rasterizer)?;

    for idx in issued.totals.missing_products() {
        println!(
            "Warning: line {} references missing product '{}' (taxed at 0%)",
            idx + 1,
            issued.record.items[idx].product_id
        );
    }

    println!("Regenerated {}", invoice_number);
    println!("  Pages: {}", issued.document.page_count());
    println!("  Saved: {}", issued.pdf_path.display());

    if open {
        open_path(&issued.pdf_path)?;
    }

    Ok(())
}

/// Mark an invoice as paid
fn cmd_mark_paid(cfg_dir: &Path, invoice_ref: &str, date: Option<String>) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BillingError::ConfigNotFound(cfg_dir.to_path_buf()));
    }

    let invoice_number = resolve_invoice_number(cfg_dir, invoice_ref)?;
    let paid_date = match date {
        Some(s) => parse_date(&s)?,
        None => today(),
    };

    let mut state = load_state(cfg_dir)?;
    let entry = state
        .history
        .iter_mut()
        .find(|e| e.number == invoice_number)
        .ok_or_else(|| BillingError::InvoiceNotFound(invoice_number.clone()))?;

    entry.is_paid = true;
    entry.paid_date = Some(paid_date);
    save_state(cfg_dir, &state)?;

    println!("Marked {} as paid ({})", invoice_number, paid_date);
    Ok(())
}

/// Mark an invoice as unpaid
fn cmd_mark_unpaid(cfg_dir: &Path, invoice_ref: &str) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BillingError::ConfigNotFound(cfg_dir.to_path_buf()));
    }

    let invoice_number = resolve_invoice_number(cfg_dir, invoice_ref)?;
    let mut state = load_state(cfg_dir)?;
    let entry = state
        .history
        .iter_mut()
        .find(|e| e.number == invoice_number)
        .ok_or_else(|| BillingError::InvoiceNotFound(invoice_number.clone()))?;

    entry.is_paid = false;
    entry.paid_date = None;
    save_state(cfg_dir, &state)?;

    println!("Marked {} as unpaid", invoice_number);
    Ok(())
}

/// Delete an invoice record and its PDF
fn cmd_delete(cfg_dir: &Path, invoice_ref: &str) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BillingError::ConfigNotFound(cfg_dir.to_path_buf()));
    }

    let invoice_number = resolve_invoice_number(cfg_dir, invoice_ref)?;
    match get_invoice_path(cfg_dir, &invoice_number) {
        Ok(pdf_path) => std::fs::remove_file(&pdf_path)?,
        Err(BillingError::InvoiceFileNotFound(_)) => {}
        Err(e) => return Err(e),
    }

    let mut state = load_state(cfg_dir)?;
    state.history.retain(|e| e.number != invoice_number);
    save_state(cfg_dir, &state)?;

    println!("Deleted {}", invoice_number);
    Ok(())
}

/// Print an amount in words
fn cmd_words(amount: Decimal) -> Result<()> {
    let words = decimal_to_words(amount)?;
    println!("{words}");
    Ok(())
}

/// Paginate a snapshot image into a PDF
fn cmd_paginate(snapshot: &Path, output: Option<PathBuf>, page: PageFormat) -> Result<()> {
    let output = output.unwrap_or_else(|| snapshot.with_extension("pdf"));
    let document = export_snapshot(snapshot, page.size(), &output)?;

    println!(
        "Paginated {} ({}x{} px) into {} page(s)",
        snapshot.display(),
        document.source_width_px,
        document.source_height_px,
        document.page_count()
    );
    for page in &document.pages {
        println!(
            "  Page {}: {} px band, {:.2}in x {:.2}in",
            page.band.index + 1,
            page.band.height_px,
            page.width_in,
            page.height_in
        );
    }
    println!("  Saved: {}", output.display());
    Ok(())
}
