//! The API endpoints URIs.

/// The route for creating a new user.
pub const REGISTER: &str = "/register";
/// The route for exchanging a username and password for a token.
pub const LOG_IN: &str = "/login";
/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/transactions";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/transactions/{transaction_id}";
/// The route for the income and expense summary.
pub const SUMMARY: &str = "/summary";

/// The concrete [TRANSACTION] path for `transaction_id`.
#[cfg(test)]
pub(crate) fn transaction_path(transaction_id: i64) -> String {
    TRANSACTION.replace("{transaction_id}", &transaction_id.to_string())
}

#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::transaction_path;

    #[test]
    fn endpoints_are_valid_uris() {
        for endpoint in [
            endpoints::REGISTER,
            endpoints::LOG_IN,
            endpoints::TRANSACTIONS,
            endpoints::TRANSACTION,
            endpoints::SUMMARY,
        ] {
            assert!(endpoint.parse::<Uri>().is_ok(), "{endpoint} is not a valid URI");
        }
    }

    #[test]
    fn transaction_path_fills_in_id() {
        let path = transaction_path(17);

        assert_eq!(path, "/transactions/17");
        assert!(path.parse::<Uri>().is_ok());
    }

    #[test]
    fn transaction_path_keeps_sign_of_id() {
        assert_eq!(transaction_path(-3), "/transactions/-3");
    }
}
