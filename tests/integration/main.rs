//! Integration tests for dsx.

mod helpers;

mod cli_test;
mod extract_test;
mod filename_test;
mod render_test;
