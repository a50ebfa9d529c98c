use rusqlite::Connection;
use time::Duration;

use crate::{AppState, PasswordHash, User, create_user, initialize_db};

/// The password given to every user made by [must_create_test_user].
pub(crate) const TEST_PASSWORD: &str = "hunter2";

/// The token signing secret used by [must_create_test_state].
pub(crate) const TEST_SECRET: &str = "nafstenoas";

/// The bcrypt cost used in tests. Low so that tests run quickly.
const TEST_HASH_COST: u32 = 4;

#[track_caller]
pub(crate) fn must_create_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("could not create in-memory SQLite database");
    initialize_db(&connection).expect("could not initialize test DB");

    connection
}

#[track_caller]
pub(crate) fn must_create_test_user(username: &str, connection: &Connection) -> User {
    let password_hash = PasswordHash::from_raw_password(TEST_PASSWORD, TEST_HASH_COST)
        .expect("could not hash test password");

    create_user(username, password_hash, connection).expect("could not create test user")
}

#[track_caller]
pub(crate) fn must_create_test_state() -> AppState {
    AppState::new(
        Connection::open_in_memory().expect("could not create in-memory SQLite database"),
        TEST_SECRET,
        Duration::hours(1),
        TEST_HASH_COST,
    )
    .expect("could not create test app state")
}
