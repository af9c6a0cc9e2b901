//! The matching logic proof checking kernel.
//!
//! The kernel receives three instruction streams (assumptions, claims,
//! and the proof) and decides whether the proof establishes every
//! claim from the assumptions. Instructions drive a stack machine whose
//! terms are matching logic patterns: pattern-builder instructions
//! compose syntax, axiom-schema instructions mint proved conclusions,
//! inference-rule instructions combine them, and the journal
//! instruction discharges declared claims in order.
//!
//! The kernel is a batch checker built for re-execution inside a
//! zero-knowledge proving system: it is single threaded, allocates only
//! what the instruction stream demands, touches no clock, file, or
//! network, and reports exactly one bit (plus a diagnostic error for
//! callers that want one). See [`verify_buffers`] for the embedding
//! entry point and [`verify_streams`] for the raw-stream equivalent.

// rust lints we want
#![warn(
  bare_trait_objects,
  elided_lifetimes_in_paths,
  missing_copy_implementations,
  missing_debug_implementations,
  future_incompatible,
  rust_2018_idioms,
  trivial_numeric_casts,
  unreachable_pub,
  unused,
  missing_docs
)]
#![deny(unsafe_code)]
// all the clippy
#![warn(clippy::all, clippy::pedantic)]
// clippy lints we don't want
#![allow(
  clippy::missing_errors_doc,
  clippy::module_name_repetitions,
  clippy::must_use_candidate,
  clippy::enum_glob_use
)]

mod check;
mod error;
mod pattern;
mod state;
mod subst;

pub use check::{verify_buffers, verify_streams};
pub use error::VerifyError;
pub use pattern::{
  app, bot, esubst, evar, exists, forall, implies, metavar, metavar_s_fresh,
  metavar_unconstrained, mu, negate, ssubst, svar, symbol, Pattern,
};
pub use state::{Entry, Machine, Phase, Term};
pub use subst::{apply_esubst, apply_ssubst, instantiate};

pub use mlb_parser::{EVarId, MetaVarConstraints, MetaVarId, SVarId, SymId};
