//! Commands run end to end against the in-memory backend.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code

use clap::Parser;
use railseat::auth::Authenticator;
use railseat::cli::{App, Cli, CliError};
use railseat::mocks::MockBackend;
use railseat::session::{AuthToken, CredentialStore, MemoryCredentialStore};
use railseat::sync::SyncOptions;
use railseat_client::ApiError;
use railseat_testing::test_clock;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};

struct Harness {
    backend: Arc<MockBackend>,
    credentials: Arc<MemoryCredentialStore>,
    app: App,
}

fn harness(signed_in: bool) -> Harness {
    let backend = Arc::new(MockBackend::coach(80));
    let credentials = Arc::new(if signed_in {
        MemoryCredentialStore::with_token(AuthToken::new("test-token").unwrap())
    } else {
        MemoryCredentialStore::new()
    });
    let options = SyncOptions {
        poll_interval: Duration::from_millis(1500),
        wait_timeout: Duration::from_secs(10),
        clock: Arc::new(test_clock()),
    };
    let app = App::new(
        Authenticator::new(backend.clone(), credentials.clone()),
        backend.clone(),
        options,
    );

    Harness {
        backend,
        credentials,
        app,
    }
}

async fn run(app: &App, args: &[&str]) -> (Result<(), CliError>, String) {
    let cli = Cli::try_parse_from(std::iter::once("railseat").chain(args.iter().copied()))
        .expect("arguments parse");
    let mut out = Vec::new();
    let result = app.run(cli.command, &mut out).await;
    (result, String::from_utf8(out).unwrap())
}

#[tokio::test(start_paused = true)]
async fn test_sign_in_rejection_prints_backend_message() {
    let h = harness(false);

    let (result, _) = run(
        &h.app,
        &["signin", "--email", "ada@example.com", "--password", "wrong"],
    )
    .await;

    let error = result.unwrap_err();
    assert_eq!(error.to_string(), "Invalid credentials");
    assert_eq!(error.exit_code(), 4);
    assert!(!error.is_rendered());
    assert_eq!(h.credentials.load().unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_email_is_an_input_error() {
    let h = harness(false);

    let (result, _) = run(&h.app, &["signin", "--email", "nope", "--password", "x"]).await;

    let error = result.unwrap_err();
    assert_eq!(error.to_string(), "Email address is invalid");
    assert_eq!(error.exit_code(), 3);
    assert_eq!(h.backend.calls().sign_in, 0);
}

#[tokio::test(start_paused = true)]
async fn test_signup_stores_session_and_logout_clears_it() {
    let h = harness(false);

    let (result, out) = run(
        &h.app,
        &[
            "signup",
            "--first-name",
            "Ada",
            "--last-name",
            "Lovelace",
            "--email",
            "ada@example.com",
            "--password",
            "secret",
        ],
    )
    .await;
    result.unwrap();
    assert!(out.starts_with("User created successfully\n"));
    assert!(h.credentials.load().unwrap().is_some());

    let (result, out) = run(&h.app, &["logout"]).await;
    result.unwrap();
    assert_eq!(out, "Logged out.\n");
    assert_eq!(h.credentials.load().unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn test_zero_seat_booking_never_reaches_backend() {
    let h = harness(true);

    let (result, out) = run(&h.app, &["book", "0"]).await;

    let error = result.unwrap_err();
    assert_eq!(error.to_string(), "Seat count must be between 1 and 7, got 0");
    assert_eq!(error.exit_code(), 3);
    assert!(out.is_empty());
    assert_eq!(h.backend.calls().fetch, 0);
    assert_eq!(h.backend.calls().book, 0);
}

#[tokio::test(start_paused = true)]
async fn test_commands_without_session_require_sign_in() {
    let h = harness(false);

    let (result, _) = run(&h.app, &["seats"]).await;

    let error = result.unwrap_err();
    assert_eq!(error.exit_code(), 2);
    assert_eq!(error.to_string(), "Not signed in. Run `railseat signin` first.");
    assert_eq!(h.backend.calls().fetch, 0);
}

#[tokio::test(start_paused = true)]
async fn test_seats_prints_the_map() {
    let h = harness(true);
    h.backend.set_row(1, "1100000");

    let (result, out) = run(&h.app, &["seats"]).await;

    result.unwrap();
    assert!(out.starts_with("Available Seats: 78\n"));
    assert!(out.contains("   1*   2*   3 "));
}

#[tokio::test(start_paused = true)]
async fn test_seats_reports_unreachable_backend() {
    let h = harness(true);
    h.backend
        .fail_fetches(Some(ApiError::Network("connection refused".to_string())));

    let (result, out) = run(&h.app, &["seats"]).await;

    let error = result.unwrap_err();
    assert_eq!(error.to_string(), "connection refused");
    assert_eq!(error.exit_code(), 4);
    assert!(out.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_book_prints_booked_seats() {
    let h = harness(true);

    let (result, out) = run(&h.app, &["book", "3"]).await;

    result.unwrap();
    assert!(out.starts_with("Available Seats: 77\n"));
    assert!(out.contains("Successfully booked seats: 1, 2, 3\n"));
}

#[tokio::test(start_paused = true)]
async fn test_booking_rejection_is_shown_once_with_its_own_status() {
    let h = harness(true);
    h.backend.fail_next_booking(ApiError::Rejected {
        status: 400,
        message: "Seats unavailable".to_string(),
    });

    let (result, out) = run(&h.app, &["book", "2"]).await;

    let error = result.unwrap_err();
    assert_eq!(error.exit_code(), 1);
    assert!(error.is_rendered());
    assert!(out.ends_with("Seats unavailable\n"));
}

#[tokio::test(start_paused = true)]
async fn test_watch_books_and_resets_while_polling() {
    let h = harness(true);
    let (mut keys, input) = tokio::io::duplex(64);
    let mut out = Vec::new();

    let typing = async {
        tokio::time::sleep(Duration::from_millis(3100)).await;
        h.backend.set_row(2, "1111111");
        tokio::time::sleep(Duration::from_millis(1500)).await;
        keys.write_all(b"book 3\n").await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        keys.write_all(b"reset\n").await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        keys.write_all(b"quit\n").await.unwrap();
    };
    let (result, ()) = tokio::join!(h.app.watch(BufReader::new(input), &mut out), typing);

    result.unwrap();
    let out = String::from_utf8(out).unwrap();
    let polled = out.find("Available Seats: 73\n").expect("poll picked up row 2");
    let booked = out
        .find("Successfully booked seats: 1, 2, 3\n")
        .expect("booking shown");
    let reset = out.rfind("Available Seats: 80\n").expect("reset shown");
    assert!(polled < booked && booked < reset);
    assert!(h.backend.calls().fetch >= 4);
    assert_eq!(h.backend.calls().book, 1);
    assert_eq!(h.backend.calls().reset, 1);

    let fetches = h.backend.calls().fetch;
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(h.backend.calls().fetch, fetches);
}

#[tokio::test(start_paused = true)]
async fn test_watch_reports_bad_input_and_logs_out() {
    let h = harness(true);
    let mut out = Vec::new();

    h.app
        .watch(&b"book 9\ndance\n\nlogout\n"[..], &mut out)
        .await
        .unwrap();

    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("Seat count must be between 1 and 7, got 9\n"));
    assert!(out.contains("Unknown command `dance`"));
    assert!(out.ends_with("Logged out.\n"));
    assert_eq!(h.backend.calls().book, 0);
    assert_eq!(h.credentials.load().unwrap(), None);
}
