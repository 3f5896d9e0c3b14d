// Pedantic lint configuration for the crate.
// - missing_errors_doc: Error handling is self-evident from Result types
// - missing_panics_doc: Panics are rare and documented inline
// - fn_params_excessive_bools: CLI flags are naturally boolean
// - module_name_repetitions: tidy::TidyCli style names read better at call sites
// - needless_pass_by_value: Sometimes clearer semantically
// - option_if_let_else: if-let is often clearer
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::fn_params_excessive_bools,
    clippy::module_name_repetitions,
    clippy::needless_pass_by_value,
    clippy::option_if_let_else
)]

pub mod cli;
pub mod config;
pub mod error;
pub mod tidy;
pub mod unify;
