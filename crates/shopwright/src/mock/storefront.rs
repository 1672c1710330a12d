//! Behavioural model of the demo shop.
//!
//! The model keeps application state (session, cart, sort order, form
//! fields, banner errors) and renders the current route into a fresh
//! [`Document`] after every interaction. Markup mirrors the live site's
//! ids, classes and `data-test` attributes.

use super::dom::{Document, Element};
use crate::result::{ShopError, ShopResult};
use crate::test_data::{User, DEFAULT_PASSWORD};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Document title of every view
pub const PAGE_TITLE: &str = "Swag Labs";

/// How long the inventory stays hidden for the performance-glitch user
pub const GLITCH_DELAY: Duration = Duration::from_secs(3);

/// Sales tax, percent
pub const TAX_PERCENT: u64 = 8;

/// A product in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    /// Display name
    pub name: &'static str,
    /// Slug used in `data-test` ids
    pub slug: &'static str,
    /// Price in cents
    pub price_cents: u64,
    /// Image path
    pub image: &'static str,
    /// Description
    pub description: &'static str,
}

/// The six products of the shop, in catalog order
pub const CATALOG: [Product; 6] = [
    Product {
        name: "Sauce Labs Backpack",
        slug: "sauce-labs-backpack",
        price_cents: 2999,
        image: "/static/media/sauce-backpack-1200x1500.jpg",
        description: "carry.allTheThings() with the sleek, streamlined Sly Pack.",
    },
    Product {
        name: "Sauce Labs Bike Light",
        slug: "sauce-labs-bike-light",
        price_cents: 999,
        image: "/static/media/bike-light-1200x1500.jpg",
        description: "A red light isn't the desired state in testing but it sure helps when riding your bike at night.",
    },
    Product {
        name: "Sauce Labs Bolt T-Shirt",
        slug: "sauce-labs-bolt-t-shirt",
        price_cents: 1599,
        image: "/static/media/bolt-shirt-1200x1500.jpg",
        description: "Get your testing superhero on with the Sauce Labs bolt T-shirt.",
    },
    Product {
        name: "Sauce Labs Fleece Jacket",
        slug: "sauce-labs-fleece-jacket",
        price_cents: 4999,
        image: "/static/media/sauce-pullover-1200x1500.jpg",
        description: "It's not every day that you come across a midweight quarter-zip fleece jacket.",
    },
    Product {
        name: "Sauce Labs Onesie",
        slug: "sauce-labs-onesie",
        price_cents: 799,
        image: "/static/media/red-onesie-1200x1500.jpg",
        description: "Rib snap infant onesie for the junior automation engineer in development.",
    },
    Product {
        name: "Test.allTheThings() T-Shirt (Red)",
        slug: "test.allthethings()-t-shirt-(red)",
        price_cents: 1599,
        image: "/static/media/red-tatt-1200x1500.jpg",
        description: "This classic Sauce Labs t-shirt is perfect to wear when cozying up to your keyboard.",
    },
];

const BROKEN_IMAGE: &str = "/static/media/sl-404.jpg";

/// Format cents as `<dollars>.<cents>`
#[must_use]
pub fn format_cents(cents: u64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

/// Tax on a subtotal, rounded half up to the cent
#[must_use]
pub const fn tax_cents(subtotal_cents: u64) -> u64 {
    (subtotal_cents * TAX_PERCENT + 50) / 100
}

/// Views of the shop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `/`
    Login,
    /// `/inventory.html`
    Inventory,
    /// `/cart.html`
    Cart,
    /// `/checkout-step-one.html`
    CheckoutInfo,
    /// `/checkout-step-two.html`
    CheckoutOverview,
    /// `/checkout-complete.html`
    CheckoutComplete,
}

impl Route {
    /// URL path of the view
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/",
            Self::Inventory => "/inventory.html",
            Self::Cart => "/cart.html",
            Self::CheckoutInfo => "/checkout-step-one.html",
            Self::CheckoutOverview => "/checkout-step-two.html",
            Self::CheckoutComplete => "/checkout-complete.html",
        }
    }

    /// Route for a URL path
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "" | "/" | "/index.html" => Some(Self::Login),
            "/inventory.html" => Some(Self::Inventory),
            "/cart.html" => Some(Self::Cart),
            "/checkout-step-one.html" => Some(Self::CheckoutInfo),
            "/checkout-step-two.html" => Some(Self::CheckoutOverview),
            "/checkout-complete.html" => Some(Self::CheckoutComplete),
            _ => None,
        }
    }
}

/// Sort orders offered by the inventory dropdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Sort {
    #[default]
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
}

impl Sort {
    fn from_value(value: &str) -> Option<Self> {
        match value {
            "az" => Some(Self::NameAsc),
            "za" => Some(Self::NameDesc),
            "lohi" => Some(Self::PriceAsc),
            "hilo" => Some(Self::PriceDesc),
            _ => None,
        }
    }

    const fn value(self) -> &'static str {
        match self {
            Self::NameAsc => "az",
            Self::NameDesc => "za",
            Self::PriceAsc => "lohi",
            Self::PriceDesc => "hilo",
        }
    }
}

#[derive(Debug, Clone, Default)]
struct LoginForm {
    username: String,
    password: String,
}

#[derive(Debug, Clone, Default)]
struct CustomerForm {
    first_name: String,
    last_name: String,
    postal_code: String,
}

/// The shop model
#[derive(Debug, Clone)]
pub struct Storefront {
    base_url: String,
    route: Route,
    session: Option<User>,
    cart: Vec<usize>,
    sort: Sort,
    menu_open: bool,
    login_form: LoginForm,
    customer: CustomerForm,
    error: Option<String>,
    reveal_at: Option<Instant>,
}

impl Storefront {
    /// A logged-out shop on the login view
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            route: Route::Login,
            session: None,
            cart: Vec::new(),
            sort: Sort::default(),
            menu_open: false,
            login_form: LoginForm::default(),
            customer: CustomerForm::default(),
            error: None,
            reveal_at: None,
        }
    }

    /// Current absolute URL
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, self.route.path())
    }

    /// Current view
    #[must_use]
    pub const fn route(&self) -> Route {
        self.route
    }

    /// Logged-in persona
    #[must_use]
    pub const fn session(&self) -> Option<User> {
        self.session
    }

    /// Products in the cart, in the order they were added
    #[must_use]
    pub fn cart(&self) -> Vec<&'static Product> {
        self.cart.iter().map(|&i| &CATALOG[i]).collect()
    }

    fn path_of<'a>(&self, url: &'a str) -> &'a str {
        let rest = match url.strip_prefix(self.base_url.as_str()) {
            Some(rest) => rest,
            None => match url.split_once("://") {
                Some((_, after_scheme)) => after_scheme
                    .find('/')
                    .map_or("", |i| &after_scheme[i..]),
                None => url,
            },
        };
        rest.split(['?', '#']).next().unwrap_or_default()
    }

    /// Load a URL as if typed in the address bar
    pub fn navigate(&mut self, url: &str) -> ShopResult<()> {
        let path = self.path_of(url);
        let route = Route::from_path(path).ok_or_else(|| ShopError::Navigation {
            url: url.to_string(),
            message: "404 Not Found".to_string(),
        })?;
        if route != Route::Login && self.session.is_none() {
            debug!(path, "unauthenticated visit redirected to login");
            self.enter(Route::Login);
            self.error = Some(format!(
                "Epic sadface: You can only access '{}' when you are logged in.",
                route.path()
            ));
            return Ok(());
        }
        self.enter(route);
        Ok(())
    }

    fn enter(&mut self, route: Route) {
        self.route = route;
        self.menu_open = false;
        self.error = None;
        match route {
            Route::Login => self.login_form = LoginForm::default(),
            Route::CheckoutInfo => self.customer = CustomerForm::default(),
            Route::Inventory if self.session == Some(User::PERFORMANCE_GLITCH) => {
                self.reveal_at = Some(Instant::now() + GLITCH_DELAY);
            }
            _ => {}
        }
    }

    fn is_problem_user(&self) -> bool {
        self.session == Some(User::PROBLEM)
    }

    /// Handle a click on `target`
    pub fn click(&mut self, target: &Element) {
        let key = control_key(target);
        debug!(key, route = ?self.route, "storefront click");
        match key {
            "login-button" => self.submit_login(),
            "react-burger-menu-btn" => self.menu_open = true,
            "react-burger-cross-btn" => self.menu_open = false,
            "inventory_sidebar_link" => self.enter(Route::Inventory),
            "reset_sidebar_link" => {
                self.cart.clear();
                self.menu_open = false;
            }
            "logout_sidebar_link" => {
                self.session = None;
                self.cart.clear();
                self.sort = Sort::default();
                self.reveal_at = None;
                self.enter(Route::Login);
            }
            "shopping-cart-link" => self.enter(Route::Cart),
            "continue-shopping" | "back-to-products" => self.enter(Route::Inventory),
            "checkout" => self.enter(Route::CheckoutInfo),
            "continue" => self.submit_customer(),
            "cancel" => match self.route {
                Route::CheckoutInfo => self.enter(Route::Cart),
                _ => self.enter(Route::Inventory),
            },
            "finish" => {
                self.cart.clear();
                self.enter(Route::CheckoutComplete);
            }
            "error-button" => self.error = None,
            other => {
                if let Some(slug) = other.strip_prefix("add-to-cart-") {
                    if let Some(i) = catalog_index(slug) {
                        if !self.cart.contains(&i) {
                            self.cart.push(i);
                        }
                    }
                } else if let Some(slug) = other.strip_prefix("remove-") {
                    if let Some(i) = catalog_index(slug) {
                        self.cart.retain(|&c| c != i);
                    }
                }
            }
        }
    }

    /// Handle typing `value` into `target`
    pub fn fill(&mut self, target: &Element, value: &str) {
        let value = value.to_string();
        match control_key(target) {
            "username" | "user-name" => self.login_form.username = value,
            "password" => self.login_form.password = value,
            "firstName" | "first-name" => self.customer.first_name = value,
            "lastName" | "last-name" if self.is_problem_user() => {
                self.customer.first_name = value;
            }
            "lastName" | "last-name" => self.customer.last_name = value,
            "postalCode" | "postal-code" => self.customer.postal_code = value,
            other => debug!(key = other, "fill on unmodelled control ignored"),
        }
    }

    /// Handle choosing `value` in the `<select>` `target`
    pub fn select(&mut self, target: &Element, value: &str) {
        if control_key(target) == "product_sort_container" {
            if let Some(sort) = Sort::from_value(value) {
                self.sort = sort;
            }
        }
    }

    fn submit_login(&mut self) {
        let LoginForm { username, password } = &self.login_form;
        let outcome = if username.is_empty() {
            Err("Epic sadface: Username is required")
        } else if password.is_empty() {
            Err("Epic sadface: Password is required")
        } else {
            match User::personas()
                .into_iter()
                .find(|u| u.username == username && password == DEFAULT_PASSWORD)
            {
                Some(user) if user == User::LOCKED_OUT => {
                    Err("Epic sadface: Sorry, this user has been locked out.")
                }
                Some(user) => Ok(user),
                None => Err(
                    "Epic sadface: Username and password do not match any user in this service",
                ),
            }
        };
        match outcome {
            Ok(user) => {
                debug!(user = user.username, "storefront login");
                self.session = Some(user);
                self.enter(Route::Inventory);
            }
            Err(message) => self.error = Some(message.to_string()),
        }
    }

    fn submit_customer(&mut self) {
        let c = &self.customer;
        let missing = if c.first_name.is_empty() {
            Some("Error: First Name is required")
        } else if c.last_name.is_empty() {
            Some("Error: Last Name is required")
        } else if c.postal_code.is_empty() {
            Some("Error: Postal Code is required")
        } else {
            None
        };
        match missing {
            Some(message) => self.error = Some(message.to_string()),
            None => self.enter(Route::CheckoutOverview),
        }
    }

    fn sorted_catalog(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..CATALOG.len()).collect();
        match self.sort {
            Sort::NameAsc => order.sort_by_key(|&i| CATALOG[i].name),
            Sort::NameDesc => order.sort_by(|&a, &b| CATALOG[b].name.cmp(CATALOG[a].name)),
            Sort::PriceAsc => order.sort_by_key(|&i| CATALOG[i].price_cents),
            Sort::PriceDesc => order.sort_by(|&a, &b| CATALOG[b].price_cents.cmp(&CATALOG[a].price_cents)),
        }
        order
    }

    /// Render the current view
    #[must_use]
    pub fn render(&self) -> Document {
        let body = match self.route {
            Route::Login => return Document::new(PAGE_TITLE, vec![self.render_login()]),
            Route::Inventory => self.render_inventory(),
            Route::Cart => self.render_cart(),
            Route::CheckoutInfo => self.render_checkout_info(),
            Route::CheckoutOverview => self.render_overview(),
            Route::CheckoutComplete => render_complete(),
        };
        let mut wrapper = Element::new("div")
            .id("page_wrapper")
            .class("page_wrapper")
            .children([self.render_header(), body]);
        if self.route == Route::Inventory {
            if let Some(at) = self.reveal_at {
                wrapper = wrapper.hidden_until(at);
            }
        }
        Document::new(PAGE_TITLE, vec![wrapper])
    }

    fn render_error(&self) -> Option<Element> {
        self.error.as_ref().map(|message| {
            Element::new("div").class("error-message-container").class("error").child(
                Element::new("h3").data_test("error").text(message.clone()).child(
                    Element::new("button")
                        .class("error-button")
                        .data_test("error-button"),
                ),
            )
        })
    }

    fn render_login(&self) -> Element {
        let mut form = Element::new("form").children([
            text_input("user-name", "username", &self.login_form.username),
            text_input("password", "password", &self.login_form.password).attr("type", "password"),
        ]);
        if let Some(error) = self.render_error() {
            form = form.child(error);
        }
        form = form.child(
            Element::new("input")
                .attr("type", "submit")
                .id("login-button")
                .data_test("login-button")
                .class("submit-button")
                .value("Login"),
        );
        Element::new("div")
            .class("login_container")
            .children([Element::new("div").class("login_logo").text(PAGE_TITLE), form])
    }

    fn render_header(&self) -> Element {
        let mut menu = Element::new("div").class("bm-menu-wrap").child(
            Element::new("nav").class("bm-item-list").children([
                sidebar_link("inventory_sidebar_link", "All Items"),
                sidebar_link("about_sidebar_link", "About"),
                sidebar_link("logout_sidebar_link", "Logout"),
                sidebar_link("reset_sidebar_link", "Reset App State"),
            ]),
        );
        if !self.menu_open {
            menu = menu.hidden();
        }
        let mut cart_link = Element::new("a")
            .class("shopping_cart_link")
            .data_test("shopping-cart-link");
        if !self.cart.is_empty() {
            cart_link = cart_link.child(
                Element::new("span")
                    .class("shopping_cart_badge")
                    .data_test("shopping-cart-badge")
                    .text(self.cart.len().to_string()),
            );
        }
        Element::new("div").id("header_container").class("header_container").children([
            Element::new("button").id("react-burger-menu-btn").text("Open Menu"),
            menu,
            Element::new("div").class("app_logo").text(PAGE_TITLE),
            Element::new("div").id("shopping_cart_container").child(cart_link),
        ])
    }

    fn render_inventory(&self) -> Element {
        let broken = self.is_problem_user();
        let items = self.sorted_catalog().into_iter().map(|i| {
            let product = &CATALOG[i];
            let in_cart = self.cart.contains(&i);
            let (src, width, height) = if broken {
                (BROKEN_IMAGE, 0, 0)
            } else {
                (product.image, 1200, 1500)
            };
            let button = if in_cart {
                cart_button("remove", product.slug, "Remove")
            } else {
                cart_button("add-to-cart", product.slug, "Add to cart")
            };
            Element::new("div").class("inventory_item").data_test("inventory-item").children([
                Element::new("div").class("inventory_item_img").child(
                    Element::new("a").child(
                        Element::new("img")
                            .class("inventory_item_img")
                            .attr("alt", product.name)
                            .attr("src", src)
                            .property("complete", true)
                            .property("naturalWidth", width)
                            .property("naturalHeight", height),
                    ),
                ),
                Element::new("div").class("inventory_item_description").children([
                    Element::new("div").class("inventory_item_label").children([
                        product_name(product),
                        Element::new("div").class("inventory_item_desc").text(product.description),
                    ]),
                    Element::new("div")
                        .class("pricebar")
                        .children([product_price(product), button]),
                ]),
            ])
        });

        let sort = Element::new("select")
            .class("product_sort_container")
            .data_test("product_sort_container")
            .value(self.sort.value())
            .children(
                [
                    ("az", "Name (A to Z)"),
                    ("za", "Name (Z to A)"),
                    ("lohi", "Price (low to high)"),
                    ("hilo", "Price (high to low)"),
                ]
                .map(|(value, label)| Element::new("option").attr("value", value).text(label)),
            );

        Element::new("div")
            .id("inventory_container")
            .class("inventory_container")
            .children([
                Element::new("div")
                    .class("header_secondary_container")
                    .children([Element::new("span").class("title").text("Products"), sort]),
                Element::new("div").class("inventory_list").children(items),
            ])
    }

    fn cart_rows(&self, removable: bool) -> Vec<Element> {
        self.cart
            .iter()
            .map(|&i| {
                let product = &CATALOG[i];
                let mut pricebar = Element::new("div")
                    .class("item_pricebar")
                    .child(product_price(product));
                if removable {
                    pricebar = pricebar.child(cart_button("remove", product.slug, "Remove"));
                }
                Element::new("div").class("cart_item").children([
                    Element::new("div").class("cart_quantity").text("1"),
                    Element::new("div").class("cart_item_label").children([
                        product_name(product),
                        Element::new("div").class("inventory_item_desc").text(product.description),
                        pricebar,
                    ]),
                ])
            })
            .collect()
    }

    fn render_cart(&self) -> Element {
        Element::new("div")
            .id("cart_contents_container")
            .class("cart_contents_container")
            .children([
                Element::new("div").class("cart_list").children(self.cart_rows(true)),
                Element::new("div").class("cart_footer").children([
                    action_button("continue-shopping", "Continue Shopping"),
                    action_button("checkout", "Checkout"),
                ]),
            ])
    }

    fn render_checkout_info(&self) -> Element {
        let c = &self.customer;
        let mut form = Element::new("form").children([
            text_input("first-name", "firstName", &c.first_name),
            text_input("last-name", "lastName", &c.last_name),
            text_input("postal-code", "postalCode", &c.postal_code),
        ]);
        if let Some(error) = self.render_error() {
            form = form.child(error);
        }
        form = form.child(
            Element::new("div").class("checkout_buttons").children([
                action_button("cancel", "Cancel"),
                Element::new("input")
                    .attr("type", "submit")
                    .id("continue")
                    .data_test("continue")
                    .value("Continue"),
            ]),
        );
        Element::new("div")
            .id("checkout_info_container")
            .class("checkout_info_container")
            .child(form)
    }

    fn render_overview(&self) -> Element {
        let subtotal: u64 = self.cart.iter().map(|&i| CATALOG[i].price_cents).sum();
        let tax = tax_cents(subtotal);
        Element::new("div")
            .id("checkout_summary_container")
            .class("checkout_summary_container")
            .children([
                Element::new("div").class("cart_list").children(self.cart_rows(false)),
                Element::new("div").class("summary_info").children([
                    Element::new("div")
                        .class("summary_subtotal_label")
                        .text(format!("Item total: ${}", format_cents(subtotal))),
                    Element::new("div")
                        .class("summary_tax_label")
                        .text(format!("Tax: ${}", format_cents(tax))),
                    Element::new("div")
                        .class("summary_total_label")
                        .text(format!("Total: ${}", format_cents(subtotal + tax))),
                    Element::new("div").class("cart_footer").children([
                        action_button("cancel", "Cancel"),
                        action_button("finish", "Finish"),
                    ]),
                ]),
            ])
    }
}

fn render_complete() -> Element {
    Element::new("div")
        .id("checkout_complete_container")
        .class("checkout_complete_container")
        .children([
            Element::new("h2")
                .class("complete-header")
                .text("Thank you for your order!"),
            Element::new("div").class("complete-text").text(
                "Your order has been dispatched, and will arrive just as fast as the pony can get there!",
            ),
            action_button("back-to-products", "Back Home"),
        ])
}

/// Identify a control: `data-test`, then `id`, then its first class
fn control_key(el: &Element) -> &str {
    el.attributes
        .get("data-test")
        .or_else(|| el.attributes.get("id"))
        .map(String::as_str)
        .or_else(|| {
            el.attributes
                .get("class")
                .and_then(|c| c.split_whitespace().next())
        })
        .unwrap_or_default()
}

fn catalog_index(slug: &str) -> Option<usize> {
    CATALOG.iter().position(|p| p.slug == slug)
}

fn text_input(id: &str, data_test: &str, value: &str) -> Element {
    Element::new("input")
        .class("input_error")
        .class("form_input")
        .id(id)
        .data_test(data_test)
        .attr("type", "text")
        .value(value)
}

fn action_button(id: &str, label: &str) -> Element {
    Element::new("button")
        .class("btn")
        .id(id)
        .data_test(id)
        .text(label)
}

fn cart_button(action: &str, slug: &str, label: &str) -> Element {
    let key = format!("{action}-{slug}");
    Element::new("button")
        .class("btn")
        .class("btn_inventory")
        .id(&key)
        .data_test(&key)
        .text(label)
}

fn sidebar_link(id: &str, label: &str) -> Element {
    Element::new("a").id(id).class("bm-item").class("menu-item").text(label)
}

fn product_name(product: &Product) -> Element {
    Element::new("a").child(
        Element::new("div")
            .class("inventory_item_name")
            .data_test("inventory-item-name")
            .text(product.name),
    )
}

fn product_price(product: &Product) -> Element {
    Element::new("div")
        .class("inventory_item_price")
        .data_test("inventory-item-price")
        .text(format!("${}", format_cents(product.price_cents)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::Locator;

    const BASE: &str = "https://shop.test";

    fn control(doc: &Document, css: &str) -> Element {
        let path = doc
            .first(&Locator::new(css))
            .unwrap()
            .unwrap_or_else(|| panic!("{css} not rendered"));
        doc.get(&path).unwrap().clone()
    }

    fn text(doc: &Document, css: &str) -> String {
        control(doc, css).text_content().unwrap_or_default()
    }

    fn logged_in(user: User) -> Storefront {
        let mut shop = Storefront::new(BASE);
        let doc = shop.render();
        shop.fill(&control(&doc, "#user-name"), user.username);
        shop.fill(&control(&doc, "#password"), user.password);
        shop.click(&control(&doc, "#login-button"));
        shop
    }

    mod money_tests {
        use super::*;

        #[test]
        fn test_format_cents() {
            assert_eq!(format_cents(2999), "29.99");
            assert_eq!(format_cents(5), "0.05");
            assert_eq!(format_cents(0), "0.00");
        }

        #[test]
        fn test_tax_rounds_to_cent() {
            // 39.98 * 8% = 3.1984
            assert_eq!(tax_cents(3998), 320);
            // 29.99 * 8% = 2.3992
            assert_eq!(tax_cents(2999), 240);
        }
    }

    mod login_tests {
        use super::*;

        #[test]
        fn test_standard_login_lands_on_inventory() {
            let shop = logged_in(User::STANDARD);
            assert_eq!(shop.route(), Route::Inventory);
            assert_eq!(shop.url(), "https://shop.test/inventory.html");
            assert_eq!(shop.session(), Some(User::STANDARD));
        }

        #[test]
        fn test_locked_out_user_sees_error() {
            let shop = logged_in(User::LOCKED_OUT);
            assert_eq!(shop.route(), Route::Login);
            let doc = shop.render();
            assert_eq!(
                text(&doc, "[data-test=\"error\"]"),
                "Epic sadface: Sorry, this user has been locked out."
            );
        }

        #[test]
        fn test_missing_fields_checked_in_order() {
            let mut shop = Storefront::new(BASE);
            let doc = shop.render();
            shop.click(&control(&doc, "#login-button"));
            assert!(text(&shop.render(), "[data-test=\"error\"]").contains("Username is required"));

            shop.fill(&control(&doc, "#user-name"), "standard_user");
            shop.click(&control(&doc, "#login-button"));
            assert!(text(&shop.render(), "[data-test=\"error\"]").contains("Password is required"));
        }

        #[test]
        fn test_unknown_user_rejected() {
            let mut shop = Storefront::new(BASE);
            let doc = shop.render();
            shop.fill(&control(&doc, "#user-name"), "invalid_user");
            shop.fill(&control(&doc, "#password"), "invalid_password");
            shop.click(&control(&doc, "#login-button"));
            assert!(text(&shop.render(), "[data-test=\"error\"]")
                .contains("Username and password do not match"));
        }

        #[test]
        fn test_deep_link_requires_session() {
            let mut shop = Storefront::new(BASE);
            shop.navigate("https://shop.test/cart.html").unwrap();
            assert_eq!(shop.route(), Route::Login);
            assert!(text(&shop.render(), "[data-test=\"error\"]").contains("'/cart.html'"));
        }

        #[test]
        fn test_unknown_path_is_navigation_error() {
            let mut shop = Storefront::new(BASE);
            let err = shop.navigate("https://shop.test/nope.html").unwrap_err();
            assert!(matches!(err, ShopError::Navigation { .. }));
        }
    }

    mod inventory_tests {
        use super::*;

        #[test]
        fn test_badge_tracks_cart() {
            let mut shop = logged_in(User::STANDARD);
            assert!(shop
                .render()
                .first(&Locator::new(".shopping_cart_badge"))
                .unwrap()
                .is_none());
            let doc = shop.render();
            shop.click(&control(&doc, "[data-test=\"add-to-cart-sauce-labs-onesie\"]"));
            shop.click(&control(&doc, "[data-test=\"add-to-cart-sauce-labs-backpack\"]"));
            assert_eq!(text(&shop.render(), ".shopping_cart_badge"), "2");
            assert_eq!(shop.cart()[0].name, "Sauce Labs Onesie");
        }

        #[test]
        fn test_sort_orders() {
            let mut shop = logged_in(User::STANDARD);
            let select = control(&shop.render(), "[data-test=\"product_sort_container\"]");

            shop.select(&select, "hilo");
            assert_eq!(text(&shop.render(), ".inventory_item_name"), "Sauce Labs Fleece Jacket");
            shop.select(&select, "lohi");
            assert_eq!(text(&shop.render(), ".inventory_item_name"), "Sauce Labs Onesie");
            shop.select(&select, "za");
            assert_eq!(
                text(&shop.render(), ".inventory_item_name"),
                "Test.allTheThings() T-Shirt (Red)"
            );
            shop.select(&select, "az");
            assert_eq!(text(&shop.render(), ".inventory_item_name"), "Sauce Labs Backpack");
        }

        #[test]
        fn test_problem_user_images_are_broken() {
            let shop = logged_in(User::PROBLEM);
            let img = control(&shop.render(), ".inventory_item_img img");
            assert_eq!(img.properties["naturalWidth"], 0);
            assert_eq!(img.attributes["src"], BROKEN_IMAGE);
        }

        #[tokio::test(start_paused = true)]
        async fn test_glitch_user_inventory_revealed_late() {
            let shop = logged_in(User::PERFORMANCE_GLITCH);
            let doc = shop.render();
            let path = doc.first(&Locator::new("#inventory_container")).unwrap().unwrap();
            assert!(!doc.is_visible(&path, Instant::now()));
            tokio::time::advance(GLITCH_DELAY).await;
            assert!(doc.is_visible(&path, Instant::now()));
        }
    }

    mod checkout_tests {
        use super::*;

        fn at_checkout(user: User) -> Storefront {
            let mut shop = logged_in(user);
            let doc = shop.render();
            shop.click(&control(&doc, "[data-test=\"add-to-cart-sauce-labs-backpack\"]"));
            shop.click(&control(&doc, "[data-test=\"add-to-cart-sauce-labs-bike-light\"]"));
            shop.click(&control(&doc, ".shopping_cart_link"));
            shop.click(&control(&shop.render(), "[data-test=\"checkout\"]"));
            shop
        }

        fn submit(shop: &mut Storefront, first: &str, last: &str, postal: &str) {
            let doc = shop.render();
            shop.fill(&control(&doc, "[data-test=\"firstName\"]"), first);
            shop.fill(&control(&doc, "[data-test=\"lastName\"]"), last);
            shop.fill(&control(&doc, "[data-test=\"postalCode\"]"), postal);
            shop.click(&control(&doc, "[data-test=\"continue\"]"));
        }

        #[test]
        fn test_summary_totals() {
            let mut shop = at_checkout(User::STANDARD);
            submit(&mut shop, "John", "Doe", "12345");
            assert_eq!(shop.route(), Route::CheckoutOverview);
            let doc = shop.render();
            assert_eq!(text(&doc, ".summary_subtotal_label"), "Item total: $39.98");
            assert_eq!(text(&doc, ".summary_tax_label"), "Tax: $3.20");
            assert_eq!(text(&doc, ".summary_total_label"), "Total: $43.18");

            shop.click(&control(&doc, "[data-test=\"finish\"]"));
            assert_eq!(shop.route(), Route::CheckoutComplete);
            assert!(shop.cart().is_empty());
        }

        #[test]
        fn test_validation_messages() {
            for (first, last, postal, expected) in [
                ("", "Doe", "12345", "Error: First Name is required"),
                ("John", "", "12345", "Error: Last Name is required"),
                ("John", "Doe", "", "Error: Postal Code is required"),
            ] {
                let mut shop = at_checkout(User::STANDARD);
                submit(&mut shop, first, last, postal);
                assert_eq!(shop.route(), Route::CheckoutInfo);
                assert_eq!(text(&shop.render(), "[data-test=\"error\"]"), expected);
            }
        }

        #[test]
        fn test_problem_user_stalls_on_last_name() {
            let mut shop = at_checkout(User::PROBLEM);
            submit(&mut shop, "John", "Doe", "12345");
            assert_eq!(shop.route(), Route::CheckoutInfo);
            let doc = shop.render();
            assert_eq!(control(&doc, "[data-test=\"firstName\"]").value.as_deref(), Some("Doe"));
            assert!(text(&doc, "[data-test=\"error\"]").contains("Last Name is required"));
        }

        #[test]
        fn test_cancel_targets() {
            let mut shop = at_checkout(User::STANDARD);
            shop.click(&control(&shop.render(), "[data-test=\"cancel\"]"));
            assert_eq!(shop.route(), Route::Cart);

            shop.click(&control(&shop.render(), "[data-test=\"checkout\"]"));
            submit(&mut shop, "John", "Doe", "12345");
            shop.click(&control(&shop.render(), "[data-test=\"cancel\"]"));
            assert_eq!(shop.route(), Route::Inventory);
        }
    }
}
