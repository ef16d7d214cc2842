//! Workspace integration tests: the session manager, HTTP adapter and views
//! wired together against an in-process API server.

mod helpers;
mod session_test;
mod views_test;
