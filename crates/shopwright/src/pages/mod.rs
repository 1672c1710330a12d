//! Page objects for each storefront view.
//!
//! Every page object composes a [`BasePage`](crate::base_page::BasePage)
//! and a fixed set of [`ElementRef`](crate::element::ElementRef)s built at
//! construction. Nothing is cached between calls.

pub mod cart;
pub mod checkout;
pub mod checkout_complete;
pub mod checkout_overview;
pub mod inventory;
pub mod login;

pub use cart::CartPage;
pub use checkout::CheckoutPage;
pub use checkout_complete::CheckoutCompletePage;
pub use checkout_overview::CheckoutOverviewPage;
pub use inventory::{InventoryPage, SortOption};
pub use login::LoginPage;

use regex::Regex;

/// Pattern every money label must contain, e.g. `Tax: $3.20`
pub const MONEY_PATTERN: &str = r"\$(\d+)\.(\d{2})\b";

/// Extract the first `$<n>.<dd>` amount of `label`, in cents
#[must_use]
pub fn parse_money(label: &str) -> Option<u64> {
    let regex = Regex::new(MONEY_PATTERN).ok()?;
    let caps = regex.captures(label)?;
    let dollars: u64 = caps[1].parse().ok()?;
    let cents: u64 = caps[2].parse().ok()?;
    dollars.checked_mul(100)?.checked_add(cents)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("Item total: $39.98"), Some(3998));
        assert_eq!(parse_money("Tax: $3.20"), Some(320));
        assert_eq!(parse_money("$0.00"), Some(0));
        assert_eq!(parse_money("Total: 43.18"), None);
        assert_eq!(parse_money("Total: $43.1"), None);
    }
}
