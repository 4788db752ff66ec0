//! Plain-text rendering of pages, the cart and notices for the terminal.

use std::fmt::Write;

use bookstore_core::cart::Cart;
use bookstore_core::models::{Book, Order, SpendingReport, User};
use bookstore_core::routes::Route;
use bookstore_core::session::SessionState;
use bookstore_core::types::DATE_FORMAT;

use crate::notice::{Notice, NoticeLevel};
use crate::theme::Theme;
use crate::views::orders::NO_ORDERS;
use crate::views::{
    AdminPage, BookDetailPage, BookFormPage, CatalogPage, ListingPage, OrdersPage, Page,
};

/// Currency suffix for prices.
const CURRENCY: &str = "\u{20b4}";

pub fn price(amount: f64) -> String {
    format!("{amount:.2}{CURRENCY}")
}

/// One status line: route, who is logged in, cart size, theme.
pub fn status_line(route: &Route, session: &SessionState, cart: &Cart, theme: Theme) -> String {
    let who = match session.user() {
        Some(user) if user.is_admin => format!("{} (admin)", user.display_name()),
        Some(user) => user.display_name(),
        None => "guest".to_string(),
    };
    format!(
        "[{route}] {who} | cart: {} item(s), {} | theme: {theme}",
        cart.len(),
        price(cart.total_amount())
    )
}

pub fn notice(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Success => "ok",
        NoticeLevel::Error => "error",
        NoticeLevel::Info => "info",
    };
    format!("({tag}) {}", notice.message)
}

pub fn page(page: &Page) -> String {
    match page {
        Page::Catalog(p) => catalog(p),
        Page::BookDetail(p) => book_detail(p),
        Page::Listing(p) => listing(p),
        Page::Orders(p) => orders_page(p),
        Page::Admin(p) => admin(p),
        Page::BookForm(p) => book_form(p),
        Page::Message(message) => format!("{message}\n"),
        Page::Redirect(route) => format!("Redirecting to {route}\n"),
    }
}

pub fn cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Your cart is empty.\n".to_string();
    }
    let mut out = String::from("Cart\n");
    for line in cart.lines() {
        let _ = writeln!(
            out,
            "  #{:<4} {} by {}  {} x {} = {}",
            line.book_id,
            line.name,
            line.author,
            price(line.unit_price),
            line.quantity,
            price(line.subtotal())
        );
    }
    let _ = writeln!(out, "Total: {}", price(cart.total_amount()));
    out
}

pub fn orders(orders: &[Order]) -> String {
    if orders.is_empty() {
        return format!("{NO_ORDERS}\n");
    }
    let mut out = String::new();
    for order in orders {
        let _ = writeln!(out, "Order: {}", order.order_id);
        let _ = writeln!(out, "  Date: {}", order.order_date.format(DATE_FORMAT));
        if let Some(total) = order.total_amount {
            let _ = writeln!(out, "  Total amount: {}", price(total));
        }
        if order.order_items.is_empty() {
            let _ = writeln!(out, "  There are no books.");
        }
        for item in &order.order_items {
            match &item.book {
                Some(book) => {
                    let _ = writeln!(
                        out,
                        "  - {} ({}) {} x {}",
                        book.title,
                        book.author_name(),
                        price(book.price),
                        item.quantity
                    );
                }
                None => {
                    let _ = writeln!(out, "  - (unknown book) x {}", item.quantity);
                }
            }
        }
    }
    out
}

pub fn spending(report: &SpendingReport) -> String {
    format!(
        "User {} spent {} in the selected period\n",
        report.user_id,
        price(report.total_spent)
    )
}

pub fn user_row(user: &User) -> String {
    format!(
        "#{:<4} {:<24} {:<28} {:<14} {}{}",
        user.user_id,
        user.display_name(),
        user.email.as_deref().unwrap_or("-"),
        user.phone.as_deref().unwrap_or("-"),
        user.address.as_deref().unwrap_or("-"),
        if user.is_admin { "  [admin]" } else { "" }
    )
}

// ---- pages ----

fn catalog(page: &CatalogPage) -> String {
    let mut out = String::from("Books\n");
    let q = &page.query;
    if !q.search.is_empty() || q.min_price.is_some() || q.max_price.is_some() {
        let bound = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
        let _ = writeln!(
            out,
            "  search: '{}'  price: {} .. {}",
            q.search,
            bound(q.min_price),
            bound(q.max_price)
        );
    }
    if page.entries.is_empty() {
        out.push_str("  No books match.\n");
    }
    for entry in &page.entries {
        let mark = if entry.in_cart { "[x]" } else { "[ ]" };
        let _ = writeln!(out, "  {mark} {}", book_summary(&entry.book));
    }
    out
}

fn book_detail(page: &BookDetailPage) -> String {
    let book = &page.book;
    let mut out = String::new();
    let _ = writeln!(out, "{}", book.title);
    let _ = writeln!(out, "  Author: {}", book.author_name());
    let _ = writeln!(out, "  Genre: {}", book.genre_name());
    let _ = writeln!(out, "  Publisher: {}", book.publisher_name());
    if let Some(date) = book.publication_date {
        let _ = writeln!(out, "  Published: {}", date.format(DATE_FORMAT));
    }
    let _ = writeln!(out, "  Price: {}", price(book.price));
    if let Some(cover) = book.cover_ref() {
        let _ = writeln!(out, "  Cover: {cover}");
    }
    let _ = writeln!(
        out,
        "  {}",
        if page.in_cart { "In your cart" } else { "Not in your cart" }
    );
    out
}

fn listing(page: &ListingPage) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}: {}", page.kind.heading(), page.name);
    for (label, value) in &page.details {
        let _ = writeln!(out, "  {label}: {value}");
    }
    if page.books.is_empty() {
        let _ = writeln!(out, "  {}", page.kind.empty_message());
    }
    for book in &page.books {
        let _ = writeln!(out, "  {}", book_summary(book));
    }
    out
}

fn orders_page(page: &OrdersPage) -> String {
    let mut out = String::from("My orders\n");
    if let Some(owner) = &page.owner {
        let _ = writeln!(
            out,
            "  {} / {}",
            owner.display_name(),
            owner.address.as_deref().unwrap_or("-")
        );
    }
    out.push_str(&orders(&page.orders));
    out
}

fn admin(page: &AdminPage) -> String {
    let mut out = String::from("Users\n");
    if page.users.is_empty() {
        out.push_str("  No users.\n");
    }
    for user in &page.users {
        let _ = writeln!(out, "  {}", user_row(user));
    }
    out
}

fn book_form(page: &BookFormPage) -> String {
    let mut out = String::new();
    match page.book_id {
        Some(id) => {
            let _ = writeln!(out, "Edit book #{id}");
            let _ = writeln!(out, "  title: {}", page.form.title);
            let _ = writeln!(out, "  price: {}", page.form.price);
        }
        None => {
            let _ = writeln!(out, "Add book");
        }
    }
    let _ = writeln!(out, "  Genres:");
    for g in &page.genres {
        let _ = writeln!(out, "    {} {}", g.genre_id, g.genre_name);
    }
    let _ = writeln!(out, "  Authors:");
    for a in &page.authors {
        let _ = writeln!(out, "    {} {}", a.author_id, a.full_name());
    }
    let _ = writeln!(out, "  Publishers:");
    for p in &page.publishers {
        let _ = writeln!(out, "    {} {}", p.publisher_id, p.publisher_name);
    }
    out
}

fn book_summary(book: &Book) -> String {
    format!(
        "#{:<4} {} by {}  {}  [{} / {}]",
        book.book_id,
        book.title,
        book.author_name(),
        price(book.price),
        book.genre_name(),
        book.publisher_name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{book, user};
    use crate::views::{CatalogEntry, ListingKind};
    use bookstore_core::catalog::CatalogQuery;

    #[test]
    fn price_has_two_decimals() {
        assert_eq!(price(130.0), "130.00\u{20b4}");
        assert_eq!(price(0.5), "0.50\u{20b4}");
    }

    #[test]
    fn cart_lists_lines_and_total() {
        let mut c = Cart::new();
        c.add(&book(1, "A", 50.0));
        c.add(&book(2, "B", 30.0));
        c.update_quantity(1, 2).unwrap();

        let text = cart(&c);
        assert!(text.contains("A by Ivan Franko"));
        assert!(text.contains("= 100.00"));
        assert!(text.ends_with("Total: 130.00\u{20b4}\n"));
        assert_eq!(cart(&Cart::new()), "Your cart is empty.\n");
    }

    #[test]
    fn catalog_marks_cart_membership() {
        let p = Page::Catalog(CatalogPage {
            query: CatalogQuery::default(),
            entries: vec![
                CatalogEntry { book: book(1, "A", 1.0), in_cart: true },
                CatalogEntry { book: book(2, "B", 2.0), in_cart: false },
            ],
        });
        let text = page(&p);
        assert!(text.contains("[x] #1"));
        assert!(text.contains("[ ] #2"));
    }

    #[test]
    fn empty_listing_shows_message() {
        let p = Page::Listing(ListingPage {
            kind: ListingKind::Category,
            name: "Horror".into(),
            details: Vec::new(),
            books: Vec::new(),
        });
        assert_eq!(page(&p), "Genre: Horror\n  No products found in this genre.\n");
    }

    #[test]
    fn status_line_names_user_and_theme() {
        let session = SessionState::Authenticated(user(2, true));
        let line = status_line(&Route::Admin, &session, &Cart::new(), Theme::Dark);
        assert_eq!(
            line,
            "[/admin] Alan Turing (admin) | cart: 0 item(s), 0.00\u{20b4} | theme: dark"
        );
    }

    #[test]
    fn empty_orders_message() {
        assert_eq!(orders(&[]), "You don't have any orders yet.\n");
    }
}
