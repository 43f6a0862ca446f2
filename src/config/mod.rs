mod customer;
mod organization;
mod product;
pub mod state;

pub use customer::Customer;
pub use organization::{Config, InvoiceSettings, Organization, PdfSettings};
pub use product::Product;
pub use state::{Counter, InvoiceRecord, PaymentStatus, State};

use crate::error::{BillingError, Result};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (XDG config dir, or ~/.billify/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "billify") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| {
        BillingError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".billify"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve the configured output directory. Relative paths are taken
/// relative to the config directory.
pub fn resolve_output_dir(output_dir: &str, cfg_dir: &Path) -> PathBuf {
    let expanded = expand_path(output_dir);
    if expanded.is_absolute() {
        expanded
    } else {
        cfg_dir.join(expanded)
    }
}

fn load_toml<T: DeserializeOwned>(path: PathBuf) -> Result<T> {
    if !path.exists() {
        return Err(BillingError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| BillingError::ConfigParse { path, source: e })
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    load_toml(config_dir.join("config.toml"))
}

/// Load customers.toml as a HashMap
pub fn load_customers(config_dir: &Path) -> Result<HashMap<String, Customer>> {
    load_toml(config_dir.join("customers.toml"))
}

/// Load products.toml as a HashMap, rejecting negative prices and tax rates
/// outside 0-100
pub fn load_products(config_dir: &Path) -> Result<HashMap<String, Product>> {
    let products: HashMap<String, Product> = load_toml(config_dir.join("products.toml"))?;
    for (id, product) in &products {
        product.validate(id)?;
    }
    Ok(products)
}

/// Load state.toml (creates default if missing)
pub fn load_state(config_dir: &Path) -> Result<State> {
    let path = config_dir.join("state.toml");
    if !path.exists() {
        return Ok(State::default());
    }
    load_toml(path)
}

/// Save state.toml
pub fn save_state(config_dir: &Path, state: &State) -> Result<()> {
    let path = config_dir.join("state.toml");
    let content = toml::to_string_pretty(state).map_err(|e| {
        BillingError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })?;
    fs::write(path, content)?;
    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[organization]
name = "Your Business Name"
gstno = "29ABCDE1234F1Z5"          # optional
address = "12 MG Road"
city = "Bengaluru"
state = "Karnataka"
zip = "560001"
country = "India"
email = "billing@yourbusiness.in"
# phone = "+91-98450-00000"        # optional
# bank_name = "State Bank of India"
# account_no = "00000012345678"
# ifsc = "SBIN0000813"
# bank_branch = "MG Road"

[invoice]
number_format = "INV-{year}-{seq:04}"  # e.g., INV-2026-0001
currency_symbol = "₹"
due_days = 30

[pdf]
output_dir = "output"   # relative to this directory, or absolute / ~/...
page = "a4"             # a4, letter or legal
ppi = 144               # snapshot resolution
"#;

/// Template content for customers.toml
pub const CUSTOMERS_TEMPLATE: &str = r#"# Define your customers here. The table name (e.g., [acme]) is used
# as the customer identifier in the generate command.
#
# Example:
#   billify generate --customer acme --item web-design:1

[example-customer]
name = "Example Traders Pvt. Ltd."
gstno = "27AAACE1234K1Z2"              # optional
email = "accounts@example.in"
phone = "+91-22-5555-0100"             # optional
billing_address = "45 Nariman Point, Mumbai 400021"
# shipping_address = "Plot 7, MIDC, Pune 411018"   # optional, defaults to billing address
"#;

/// Template content for products.toml
pub const PRODUCTS_TEMPLATE: &str = r#"# Define your products here. The table name (e.g., [consulting]) is used
# as the product identifier in the generate command. tax_rate is a
# percentage between 0 and 100.
#
# Example:
#   billify generate --customer acme --item consulting:8 --item hosting:1

[consulting]
name = "Technical Consulting"
price = 2500.00
tax_rate = 18
unit = "hour"
hsn_code = "998311"

[web-design]
name = "Website Design"
price = 15000.00
tax_rate = 18
unit = "project"
hsn_code = "998314"

[brochure]
name = "Printed Brochure"
price = 45.50
tax_rate = 12
unit = "piece"
hsn_code = "4911"
"#;
