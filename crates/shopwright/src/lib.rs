//! Shopwright: page objects and a scenario suite for the Swag Labs demo shop
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ SuiteRunner  │───►│ Scenario     │───►│ PageManager  │───►│ PageDriver   │
//! │ (workers,    │    │ Fixture      │    │ (six page    │    │ Chromium or  │
//! │  retries)    │    │ (per session)│    │  objects)    │    │ MockPage     │
//! └──────────────┘    └──────────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! Page objects never own the page: every one of them holds the same
//! [`SharedPage`] and re-resolves its locators on each call. Assertions live
//! in [`scenarios`], not in the page objects.

#![warn(missing_docs)]

pub mod base_page;
pub mod browser;
pub mod config;
pub mod driver;
pub mod element;
pub mod fixture;
pub mod harness;
pub mod locator;
pub mod mock;
pub mod page_manager;
pub mod pages;
pub mod result;
pub mod scenarios;
pub mod screenshot;
pub mod test_data;
pub mod wait;

pub use base_page::{BasePage, PageObject};
pub use browser::BrowserSettings;
#[cfg(feature = "browser")]
pub use browser::{ChromiumBrowser, ChromiumPage};
pub use config::{BrowserKind, SuiteConfig};
pub use driver::{DeviceDescriptor, PageDriver, SharedPage};
pub use element::ElementRef;
#[cfg(feature = "browser")]
pub use fixture::ChromiumSessionFactory;
pub use fixture::{
    MockSessionFactory, ScenarioContext, ScenarioFixture, ScenarioFn, ScenarioOutcome,
    SessionFactory, StepTracker,
};
pub use harness::{SuiteReport, SuiteRunner};
pub use locator::{Locator, Selector};
pub use mock::MockPage;
pub use page_manager::PageManager;
pub use pages::{
    parse_money, CartPage, CheckoutCompletePage, CheckoutOverviewPage, CheckoutPage,
    InventoryPage, LoginPage, SortOption,
};
pub use result::{ShopError, ShopResult};
pub use scenarios::Scenario;
pub use test_data::{CheckoutInfo, Timeouts, User};
pub use wait::{LoadState, WaitOptions};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::base_page::*;
    pub use super::config::*;
    pub use super::driver::*;
    pub use super::fixture::*;
    pub use super::harness::*;
    pub use super::locator::*;
    pub use super::page_manager::*;
    pub use super::pages::*;
    pub use super::result::*;
    pub use super::test_data::*;
}
