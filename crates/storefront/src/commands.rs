//! Terminal command line definitions.
//!
//! Each input line is split shell-style (double or single quotes group
//! words) and parsed by clap as one [`Command`]; clap also renders usage
//! errors and the `help` output.

use bookstore_core::catalog::SortCriterion;
use bookstore_core::error::CoreError;
use bookstore_core::models::{NewUser, RegistrationForm};
use bookstore_core::types::DbId;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand, ValueEnum};

use crate::theme::Theme;

/// What one input line asks for.
#[derive(Debug)]
pub enum Input {
    Blank,
    Run(Command),
    /// Help text rendered by clap.
    Help(String),
}

#[derive(Parser)]
#[command(
    name = "bookstore",
    about = "Bookstore storefront commands",
    no_binary_name = true,
    disable_version_flag = true
)]
struct CommandLine {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Open a page (/, /book/1, /category/Drama, /orders, /admin, ...)
    Go {
        #[arg(required = true, value_name = "PATH")]
        path: Vec<String>,
    },

    /// Re-render the current page
    Show,

    /// Filter the listing by title, author or genre (no term clears)
    Search {
        #[arg(value_name = "TERM")]
        term: Vec<String>,
    },

    /// Set the price range, '-' for no bound
    Price {
        #[arg(allow_hyphen_values = true)]
        min: String,
        #[arg(allow_hyphen_values = true)]
        max: String,
    },

    /// Sort the listing
    Sort {
        #[arg(value_enum)]
        by: SortArg,
    },

    /// Put a book in the cart
    Add { book_id: DbId },

    /// Take a book out of the cart
    Remove { book_id: DbId },

    /// Change the quantity of a cart line
    Qty {
        book_id: DbId,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Show the cart
    Cart,

    /// Place an order for everything in the cart
    Checkout,

    /// Log in
    Login {
        email: String,
        password: String,
        /// Stay logged in across restarts
        #[arg(long)]
        remember: bool,
    },

    /// Log out
    Logout,

    /// Create an account
    Register {
        first_name: String,
        last_name: String,
        email: String,
        phone: String,
        address: String,
        password: String,
        confirm_password: String,
    },

    /// Switch the color theme (toggles when none is given)
    Theme {
        #[arg(value_enum)]
        theme: Option<Theme>,
    },

    /// User and catalog administration
    #[command(subcommand)]
    Admin(AdminCommand),

    /// Add or edit a book
    #[command(subcommand)]
    Book(BookCommand),

    /// Leave the storefront
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Clone, Subcommand)]
pub enum AdminCommand {
    /// List all users
    Users,

    /// Orders placed by a user
    Orders { user_id: DbId },

    /// Total spent by a user between two YYYY-MM-DD dates
    Spending {
        user_id: DbId,
        start: String,
        end: String,
    },

    /// Create a user
    AddUser {
        first_name: String,
        last_name: String,
        email: String,
        password: String,
        phone: Option<String>,
        address: Option<String>,
    },

    /// Change one field of a user (first_name, last_name, email, phone, address)
    UpdateUser {
        user_id: DbId,
        field: String,
        value: String,
    },

    /// Delete a user
    DeleteUser { user_id: DbId },

    /// Delete a book
    DeleteBook { book_id: DbId },
}

/// Book form fields are `key=value` pairs. Keys: title price date genre_id
/// genre author_id author_first author_last author_birthdate publisher_id
/// publisher publisher_address publisher_phone publisher_email cover=<file>.
#[derive(Debug, Clone, Subcommand)]
pub enum BookCommand {
    /// Create a book from key=value fields
    Add {
        #[arg(value_name = "KEY=VALUE", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,
    },

    /// Update a book from key=value fields
    Edit {
        book_id: DbId,
        #[arg(value_name = "KEY=VALUE", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    None,
    Title,
    Price,
}

impl From<SortArg> for SortCriterion {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::None => SortCriterion::None,
            SortArg::Title => SortCriterion::Title,
            SortArg::Price => SortCriterion::Price,
        }
    }
}

impl AdminCommand {
    /// The user record an `add-user` command describes.
    pub fn new_user(&self) -> Option<NewUser> {
        match self {
            AdminCommand::AddUser {
                first_name,
                last_name,
                email,
                password,
                phone,
                address,
            } => Some(NewUser {
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                email: email.clone(),
                password: password.clone(),
                phone: phone.clone().unwrap_or_default(),
                address: address.clone().unwrap_or_default(),
            }),
            _ => None,
        }
    }
}

impl Command {
    /// The form a `register` command describes.
    pub fn registration(&self) -> Option<RegistrationForm> {
        match self {
            Command::Register {
                first_name,
                last_name,
                email,
                phone,
                address,
                password,
                confirm_password,
            } => Some(RegistrationForm {
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                email: email.clone(),
                phone: phone.clone(),
                address: address.clone(),
                password: password.clone(),
                confirm_password: confirm_password.clone(),
            }),
            _ => None,
        }
    }
}

/// Parse one input line.
pub fn parse_line(line: &str) -> Result<Input, CoreError> {
    let tokens = shlex::split(line)
        .ok_or_else(|| CoreError::Validation("Unterminated quote".to_string()))?;
    if tokens.is_empty() {
        return Ok(Input::Blank);
    }

    match CommandLine::try_parse_from(tokens) {
        Ok(parsed) => Ok(Input::Run(parsed.command)),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Ok(Input::Help(e.to_string()))
        }
        Err(e) => Err(CoreError::Validation(e.to_string().trim_end().to_string())),
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}
