#![allow(missing_docs)]

pub(crate) mod db;
pub(crate) mod http;

pub(crate) use db::{
    TEST_PASSWORD, must_create_test_connection, must_create_test_state,
    must_create_test_user,
};
pub(crate) use http::{assert_content_type, assert_status, parse_json_body};
