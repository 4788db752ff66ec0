//! Executes terminal commands against a [`Storefront`].

use crate::app::Storefront;
use crate::commands::{self, AdminCommand, BookCommand, Command, Input};
use crate::render;
use crate::views::Page;

/// What the terminal should do after a command.
#[derive(Debug, Default, PartialEq)]
pub struct Outcome {
    /// Text to print, if any.
    pub output: Option<String>,
    pub quit: bool,
}

impl Outcome {
    fn text(text: impl Into<String>) -> Self {
        Self {
            output: Some(text.into()),
            quit: false,
        }
    }

    fn page(page: Option<Page>) -> Self {
        Self {
            output: page.as_ref().map(render::page),
            quit: false,
        }
    }
}

/// Parse and run one input line. Parse errors become notices; help text
/// is returned as output.
pub async fn run_line(app: &Storefront, line: &str) -> Outcome {
    match commands::parse_line(line) {
        Ok(Input::Blank) => Outcome::default(),
        Ok(Input::Help(text)) => Outcome::text(text),
        Ok(Input::Run(command)) => execute(app, command).await,
        Err(e) => {
            app.notices().error(e.user_message());
            Outcome::default()
        }
    }
}

/// Run one command. Failures are reported through notices; nothing here
/// ends the session except `quit`.
pub async fn execute(app: &Storefront, command: Command) -> Outcome {
    match command {
        Command::Go { path } => Outcome::page(app.navigate(&path.join(" ")).await),
        Command::Show => Outcome::page(app.reload().await),
        Command::Search { term } => {
            app.set_search(&term.join(" ")).await;
            Outcome::page(app.navigate("/").await)
        }
        Command::Price { min, max } => {
            if app.set_price_range(&min, &max).await {
                Outcome::page(app.navigate("/").await)
            } else {
                Outcome::default()
            }
        }
        Command::Sort { by } => {
            app.set_sort(by.into()).await;
            Outcome::page(app.navigate("/").await)
        }
        Command::Add { book_id } => {
            app.add_to_cart(book_id).await;
            Outcome::text(render::cart(&app.cart_snapshot().await))
        }
        Command::Remove { book_id } => {
            app.remove_from_cart(book_id).await;
            Outcome::text(render::cart(&app.cart_snapshot().await))
        }
        Command::Qty { book_id, quantity } => {
            app.set_quantity(book_id, quantity).await;
            Outcome::text(render::cart(&app.cart_snapshot().await))
        }
        Command::Cart => Outcome::text(render::cart(&app.cart_snapshot().await)),
        Command::Checkout => {
            app.checkout().await;
            Outcome::text(render::cart(&app.cart_snapshot().await))
        }
        Command::Login {
            email,
            password,
            remember,
        } => {
            app.login(&email, &password, remember).await;
            Outcome::page(app.reload().await)
        }
        Command::Logout => {
            app.logout().await;
            Outcome::page(app.reload().await)
        }
        register @ Command::Register { .. } => {
            if let Some(form) = register.registration() {
                app.register(&form).await;
            }
            Outcome::default()
        }
        Command::Theme { theme } => {
            let theme = app.set_theme(theme).await;
            Outcome::text(format!("Theme: {theme}"))
        }
        Command::Admin(admin) => execute_admin(app, admin).await,
        Command::Book(BookCommand::Add { fields }) => {
            match app.submit_book(None, &fields).await {
                Some(book) => Outcome::page(app.navigate(&format!("/book/{}", book.book_id)).await),
                None => Outcome::default(),
            }
        }
        Command::Book(BookCommand::Edit { book_id, fields }) => {
            match app.submit_book(Some(book_id), &fields).await {
                Some(book) => Outcome::page(app.navigate(&format!("/book/{}", book.book_id)).await),
                None => Outcome::default(),
            }
        }
        Command::Quit => Outcome {
            output: None,
            quit: true,
        },
    }
}

async fn execute_admin(app: &Storefront, command: AdminCommand) -> Outcome {
    match command {
        AdminCommand::Users => Outcome::page(app.navigate("/admin").await),
        AdminCommand::Orders { user_id } => match app.admin_user_orders(user_id).await {
            Some(orders) => Outcome::text(render::orders(&orders)),
            None => Outcome::default(),
        },
        AdminCommand::Spending {
            user_id,
            start,
            end,
        } => match app.admin_spending(user_id, &start, &end).await {
            Some(report) => Outcome::text(render::spending(&report)),
            None => Outcome::default(),
        },
        AdminCommand::DeleteUser { user_id } => {
            app.admin_delete_user(user_id).await;
            Outcome::page(app.navigate("/admin").await)
        }
        add @ AdminCommand::AddUser { .. } => {
            if let Some(user) = add.new_user() {
                app.admin_add_user(&user).await;
            }
            Outcome::page(app.navigate("/admin").await)
        }
        AdminCommand::UpdateUser {
            user_id,
            field,
            value,
        } => match app.admin_update_user(user_id, &field, &value).await {
            Some(user) => Outcome::text(render::user_row(&user)),
            None => Outcome::default(),
        },
        AdminCommand::DeleteBook { book_id } => {
            app.delete_book(book_id).await;
            Outcome::default()
        }
    }
}
