//! Pipeline tests driven by in-memory fakes.
