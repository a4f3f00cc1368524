//! Command-line front end.
//!
//! [`App::run`] executes one [`Command`] and writes what the user sees to the
//! given writer. A failure comes back as a [`CliError`]: its `Display` is the
//! line to print and [`CliError::exit_code`] is the process status.
//!
//! | Status | Meaning |
//! |---|---|
//! | 0 | success |
//! | 1 | booking or reset refused by the backend |
//! | 2 | not signed in |
//! | 3 | invalid input, nothing was sent |
//! | 4 | any other failure (backend unreachable, sign-in refused, storage) |

use crate::auth::{AuthError, Authenticator, SignInForm, SignUpForm};
use crate::error::ValidationError;
use crate::render::render_view;
use crate::seats::SeatCount;
use crate::sync::{MountError, SeatApi, SeatMapAction, SeatMapView, SyncOptions, ViewError};
use clap::{Parser, Subcommand};
use railseat_client::ApiError;
use railseat_runtime::StoreError;
use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast::error::RecvError;

/// Commands accepted while watching the seat map.
pub const WATCH_HELP: &str = "Commands: book <1-7>, reset, refresh, logout, quit";

/// Parsed command line.
#[derive(Parser, Debug)]
#[command(
    name = "railseat",
    author,
    version,
    about = "Book seats on the demo train from the terminal",
    long_about = None
)]
pub struct Cli {
    /// Backend base URL (overrides RAILSEAT_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// One thing the user asked for.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create an account and sign in
    Signup {
        /// Given name
        #[arg(long)]
        first_name: String,
        /// Family name
        #[arg(long)]
        last_name: String,
        /// Account email
        #[arg(long)]
        email: String,
        /// Account password
        #[arg(long, env = "RAILSEAT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign in to an existing account
    Signin {
        /// Account email
        #[arg(long)]
        email: String,
        /// Account password
        #[arg(long, env = "RAILSEAT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the seat map once
    Seats,
    /// Book seats (1 to 7)
    Book {
        /// Number of seats
        count: u32,
    },
    /// Release every booking
    Reset,
    /// Keep the seat map on screen and accept commands until `quit` or Ctrl-C
    Watch,
}

/// A command that did not succeed.
#[derive(Debug, Error)]
pub enum CliError {
    /// Sign-up, sign-in, or logout failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Input rejected before anything was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No session, or the view could not start.
    #[error(transparent)]
    Mount(#[from] MountError),

    /// Booking or reset failed.
    #[error(transparent)]
    View(#[from] ViewError),

    /// The view stopped or an outcome never arrived.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The HTTP client could not be built.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The first fetch failed, so there is no map to show.
    #[error("{0}")]
    SeatsUnavailable(String),

    /// Writing to the terminal or reading commands failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit status for this failure.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::View(ViewError::Booking(_) | ViewError::Reset(_)) => 1,
            Self::Mount(MountError::AuthRequired) => 2,
            Self::Validation(_) | Self::Auth(AuthError::Validation(_)) => 3,
            _ => 4,
        }
    }

    /// Whether the message was already written as part of the seat map.
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::View(ViewError::Booking(_) | ViewError::Reset(_)))
    }
}

/// A line typed while watching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchCommand {
    Book(SeatCount),
    Reset,
    Refresh,
    Logout,
    Quit,
}

impl FromStr for WatchCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default().to_ascii_lowercase();
        match command.as_str() {
            "book" => {
                let count = words
                    .next()
                    .and_then(|word| word.parse::<u32>().ok())
                    .ok_or_else(|| "Usage: book <1-7>".to_string())?;
                SeatCount::new(count)
                    .map(Self::Book)
                    .map_err(|error| error.to_string())
            },
            "reset" => Ok(Self::Reset),
            "refresh" => Ok(Self::Refresh),
            "logout" => Ok(Self::Logout),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(format!("Unknown command `{other}`. {WATCH_HELP}")),
        }
    }
}

/// Runs CLI commands against a backend.
pub struct App {
    auth: Authenticator,
    api: Arc<dyn SeatApi>,
    options: SyncOptions,
}

impl App {
    /// Create an app.
    #[must_use]
    pub fn new(auth: Authenticator, api: Arc<dyn SeatApi>, options: SyncOptions) -> Self {
        Self { auth, api, options }
    }

    /// Execute one command.
    ///
    /// [`Command::Watch`] reads further commands from standard input.
    ///
    /// # Errors
    ///
    /// Returns [`CliError`] describing the failure; see the module docs for
    /// the exit status of each kind.
    pub async fn run<W: Write>(&self, command: Command, out: &mut W) -> Result<(), CliError> {
        match command {
            Command::Signup {
                first_name,
                last_name,
                email,
                password,
            } => {
                let outcome = self
                    .auth
                    .sign_up(&SignUpForm {
                        first_name,
                        last_name,
                        email,
                        password,
                    })
                    .await?;
                if !outcome.message.is_empty() {
                    writeln!(out, "{}", outcome.message)?;
                }
                writeln!(out, "Signed up. Run `railseat seats` to see the train.")?;
            },
            Command::Signin { email, password } => {
                self.auth.sign_in(&SignInForm { email, password }).await?;
                writeln!(out, "Signed in.")?;
            },
            Command::Logout => {
                self.auth.logout()?;
                writeln!(out, "Logged out.")?;
            },
            Command::Seats => {
                let view = self.mount().await?;
                let result = show(&view, out).await;
                view.teardown().await;
                result?;
            },
            Command::Book { count } => {
                let count = SeatCount::new(count)?;
                let view = self.mount().await?;
                let result = book(&view, count, out).await;
                view.teardown().await;
                result?;
            },
            Command::Reset => {
                let view = self.mount().await?;
                let result = reset(&view, out).await;
                view.teardown().await;
                result?;
            },
            Command::Watch => {
                let stdin = tokio::io::BufReader::new(tokio::io::stdin());
                self.watch(stdin, out).await?;
            },
        }
        Ok(())
    }

    /// Show the seat map, redraw on every refresh, and apply typed commands.
    ///
    /// Stops on `quit`, `logout`, or Ctrl-C. When `input` ends the map keeps
    /// refreshing until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns [`CliError`] if the view cannot be mounted, the terminal cannot
    /// be written, or an outcome never arrives. Refused bookings and resets
    /// are shown on the map and do not end the loop.
    pub async fn watch<R, W>(&self, input: R, out: &mut W) -> Result<(), CliError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let view = self.mount().await?;
        let result = self.watch_view(&view, input, out).await;
        view.teardown().await;
        result
    }

    async fn watch_view<R, W>(
        &self,
        view: &SeatMapView,
        input: R,
        out: &mut W,
    ) -> Result<(), CliError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut actions = view.subscribe();
        let mut lines = input.lines();
        let mut input_open = true;
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        view.loaded().await?;
        redraw(view, out).await?;

        loop {
            tokio::select! {
                _ = &mut ctrl_c => break,
                line = lines.next_line(), if input_open => {
                    let Some(line) = line? else {
                        tracing::debug!("Command input closed");
                        input_open = false;
                        continue;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match line.parse::<WatchCommand>() {
                        Ok(WatchCommand::Quit) => break,
                        Ok(WatchCommand::Logout) => {
                            self.auth.logout()?;
                            writeln!(out, "Logged out.")?;
                            break;
                        },
                        Ok(command) => {
                            apply(view, command).await?;
                            redraw(view, out).await?;
                        },
                        Err(message) => writeln!(out, "{message}")?,
                    }
                },
                action = actions.recv() => match action {
                    Ok(SeatMapAction::SeatsLoaded { .. }) => redraw(view, out).await?,
                    Ok(_) => {},
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Watch display lagged");
                    },
                    Err(RecvError::Closed) => break,
                },
            }
        }
        Ok(())
    }

    async fn mount(&self) -> Result<SeatMapView, CliError> {
        let session = self.auth.resume()?;
        let view = SeatMapView::mount(session, Arc::clone(&self.api), self.options.clone()).await?;
        Ok(view)
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Print the map once the first fetch is in, or fail if it did not succeed.
async fn show<W: Write>(view: &SeatMapView, out: &mut W) -> Result<(), CliError> {
    view.loaded().await?;
    let (loaded, error) = view
        .state(|s| (s.snapshot.is_some(), s.last_refresh_error.clone()))
        .await;
    if let (false, Some(error)) = (loaded, error) {
        return Err(CliError::SeatsUnavailable(error));
    }
    write!(out, "{}", view.state(render_view).await)?;
    Ok(())
}

async fn book<W: Write>(view: &SeatMapView, count: SeatCount, out: &mut W) -> Result<(), CliError> {
    view.loaded().await?;
    let outcome = view.book(count).await;
    write!(out, "{}", view.state(render_view).await)?;
    outcome?;
    Ok(())
}

async fn reset<W: Write>(view: &SeatMapView, out: &mut W) -> Result<(), CliError> {
    view.loaded().await?;
    let outcome = view.reset().await;
    write!(out, "{}", view.state(render_view).await)?;
    outcome?;
    Ok(())
}

/// Run a typed command; refusals stay in the view's error fields.
async fn apply(view: &SeatMapView, command: WatchCommand) -> Result<(), CliError> {
    match command {
        WatchCommand::Book(count) => match view.book(count).await {
            Ok(_) | Err(ViewError::Booking(_) | ViewError::BookingInFlight) => Ok(()),
            Err(error) => Err(error.into()),
        },
        WatchCommand::Reset => match view.reset().await {
            Ok(()) | Err(ViewError::Reset(_)) => Ok(()),
            Err(error) => Err(error.into()),
        },
        WatchCommand::Refresh => Ok(view.refresh().await?),
        WatchCommand::Logout | WatchCommand::Quit => Ok(()),
    }
}

async fn redraw<W: Write>(view: &SeatMapView, out: &mut W) -> Result<(), CliError> {
    // Clear screen, cursor home
    write!(out, "\x1B[2J\x1B[H")?;
    write!(out, "{}", view.state(render_view).await)?;
    if let Some(at) = view.state(|s| s.last_refreshed_at).await {
        writeln!(out, "Updated {}", at.format("%H:%M:%S"))?;
    }
    writeln!(out, "{WATCH_HELP}")?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;

    #[test]
    fn test_watch_commands_parse() {
        assert_eq!(
            "book 3".parse::<WatchCommand>(),
            Ok(WatchCommand::Book(SeatCount::new(3).unwrap()))
        );
        assert_eq!("  RESET ".parse::<WatchCommand>(), Ok(WatchCommand::Reset));
        assert_eq!("exit".parse::<WatchCommand>(), Ok(WatchCommand::Quit));
        assert_eq!("book".parse::<WatchCommand>(), Err("Usage: book <1-7>".to_string()));
        assert_eq!(
            "book 8".parse::<WatchCommand>(),
            Err("Seat count must be between 1 and 7, got 8".to_string())
        );
        assert!("dance"
            .parse::<WatchCommand>()
            .unwrap_err()
            .starts_with("Unknown command `dance`"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::View(ViewError::Booking("full".into())).exit_code(), 1);
        assert_eq!(CliError::View(ViewError::Reset("no".into())).exit_code(), 1);
        assert_eq!(CliError::Mount(MountError::AuthRequired).exit_code(), 2);
        assert_eq!(
            CliError::Auth(AuthError::Validation(ValidationError::InvalidEmail)).exit_code(),
            3
        );
        assert_eq!(
            CliError::Auth(AuthError::Api(ApiError::Network("down".into()))).exit_code(),
            4
        );
        assert_eq!(CliError::Store(StoreError::Timeout).exit_code(), 4);
    }

    #[test]
    fn test_errors_display_bare_message() {
        let error = CliError::Auth(AuthError::Api(ApiError::Rejected {
            status: 401,
            message: "Invalid credentials".to_string(),
        }));
        assert_eq!(error.to_string(), "Invalid credentials");

        let error = CliError::Validation(ValidationError::SeatCountOutOfRange {
            got: 0,
            min: 1,
            max: 7,
        });
        assert_eq!(error.to_string(), "Seat count must be between 1 and 7, got 0");
    }
}
