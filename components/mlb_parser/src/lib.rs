//! Decoder for the MLB binary proof format.
//!
//! An MLB proof run consists of three byte streams: the assumptions
//! (gamma), the claims, and the proof itself. Each stream is a flat
//! sequence of one-byte instructions with one-byte operands, executed
//! against a stack machine by a consuming checker. This crate knows the
//! wire format only: instruction numbering, operand layout, and the
//! decoding of a raw byte buffer into [`Inst`] values. It assigns no
//! meaning to the instructions it decodes.

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
  clippy::must_use_candidate
)]

mod parser;

pub use parser::*;

/// Instruction numbering used in the MLB specification.
///
/// The gap between [`PUBLISH`](cmd::PUBLISH) and
/// [`CLEAN_META_VAR`](cmd::CLEAN_META_VAR) is reserved; the two high
/// codes are decoder conveniences emitted by compact proof formats.
pub mod cmd {
  /// `EVAR = 2`: push an element variable pattern.
  pub const EVAR: u8 = 2;
  /// `SVAR = 3`: push a set variable pattern.
  pub const SVAR: u8 = 3;
  /// `SYMBOL = 4`: push a constant symbol pattern.
  pub const SYMBOL: u8 = 4;
  /// `IMPLICATION = 5`: combine the top two patterns into `left -> right`.
  pub const IMPLICATION: u8 = 5;
  /// `APPLICATION = 6`: combine the top two patterns into `left . right`.
  pub const APPLICATION: u8 = 6;
  /// `MU = 7`: bind the top pattern under a least fixpoint.
  pub const MU: u8 = 7;
  /// `EXISTS = 8`: bind the top pattern under an existential.
  pub const EXISTS: u8 = 8;
  /// `META_VAR = 9`: push a schematic metavariable with five constraint lists.
  pub const META_VAR: u8 = 9;
  /// `ESUBST = 10`: wrap a pattern in an explicit element substitution.
  pub const ESUBST: u8 = 10;
  /// `SSUBST = 11`: wrap a pattern in an explicit set substitution.
  pub const SSUBST: u8 = 11;
  /// `PROP1 = 12`: the axiom schema `phi0 -> (phi1 -> phi0)`.
  pub const PROP1: u8 = 12;
  /// `PROP2 = 13`: the axiom schema
  /// `(phi0 -> (phi1 -> phi2)) -> ((phi0 -> phi1) -> (phi0 -> phi2))`.
  pub const PROP2: u8 = 13;
  /// `PROP3 = 14`: the axiom schema `~~phi0 -> phi0`.
  pub const PROP3: u8 = 14;
  /// `QUANTIFIER = 15`: the quantifier axiom schema.
  pub const QUANTIFIER: u8 = 15;
  /// `PROPAGATION_OR = 16`: reserved for the or-propagation schema.
  pub const PROPAGATION_OR: u8 = 16;
  /// `PROPAGATION_EXISTS = 17`: reserved for the exists-propagation schema.
  pub const PROPAGATION_EXISTS: u8 = 17;
  /// `PRE_FIXPOINT = 18`: reserved for the pre-fixpoint schema.
  pub const PRE_FIXPOINT: u8 = 18;
  /// `EXISTENCE = 19`: the existence axiom schema.
  pub const EXISTENCE: u8 = 19;
  /// `SINGLETON = 20`: reserved for the singleton-context schema.
  pub const SINGLETON: u8 = 20;
  /// `MODUS_PONENS = 21`: pop an implication and its antecedent, push the
  /// consequent.
  pub const MODUS_PONENS: u8 = 21;
  /// `GENERALIZATION = 22`: universal generalization over `x0`.
  pub const GENERALIZATION: u8 = 22;
  /// `FRAME = 23`: reserved for the framing rule.
  pub const FRAME: u8 = 23;
  /// `SUBSTITUTION = 24`: substitute a set variable in a conclusion.
  pub const SUBSTITUTION: u8 = 24;
  /// `KNASTER_TARSKI = 25`: reserved for the fixpoint rule.
  pub const KNASTER_TARSKI: u8 = 25;
  /// `INSTANTIATE = 26`: instantiate metavariables in the top term.
  pub const INSTANTIATE: u8 = 26;
  /// `POP = 27`: discard the top of the stack.
  pub const POP: u8 = 27;
  /// `SAVE = 28`: copy the top of the stack into memory.
  pub const SAVE: u8 = 28;
  /// `LOAD = 29`: push a copy of a memory slot.
  pub const LOAD: u8 = 29;
  /// `PUBLISH = 30`: record an assumption, declare a claim, or discharge one,
  /// depending on the execution phase.
  pub const PUBLISH: u8 = 30;
  /// `CLEAN_META_VAR = 137`: [`META_VAR`] with all five constraint lists
  /// empty, encoded without the list bytes.
  pub const CLEAN_META_VAR: u8 = 137;
  /// `NO_OP = 138`: end of the instruction stream for a phase.
  pub const NO_OP: u8 = 138;
}

macro_rules! id_type {
  ($(#[$doc:meta])* $id:ident) => {
    $(#[$doc])*
    #[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Default)]
    pub struct $id(pub u8);

    impl $id {
      /// Convert this newtyped identifier into its underlying byte.
      #[must_use]
      pub fn into_inner(self) -> u8 { self.0 }
    }

    impl std::fmt::Debug for $id {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { self.0.fmt(f) }
    }

    impl std::fmt::Display for $id {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { self.0.fmt(f) }
    }

    impl From<u8> for $id {
      fn from(n: u8) -> Self { Self(n) }
    }
  };
}

id_type! {
  /// The name of an element variable, `x0 .. x255`.
  EVarId
}
id_type! {
  /// The name of a set variable, `X0 .. X255`.
  SVarId
}
id_type! {
  /// The name of a constant symbol.
  SymId
}
id_type! {
  /// The name of a schematic metavariable, `phi0 .. phi255`.
  MetaVarId
}

/// The five constraint lists carried by a metavariable.
///
/// A pattern instantiating the metavariable must be e-fresh in every
/// variable of `e_fresh`, s-fresh in every variable of `s_fresh`, and
/// have the named polarity for every variable of `positive` and
/// `negative`. `app_ctx_holes` names the element variables that must
/// occur as application-context holes; it is only consulted for
/// well-formedness (a hole cannot also be required fresh).
///
/// Only membership is meaningful, but the lists preserve their encoded
/// order so that equality and re-serialization are bit-exact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MetaVarConstraints {
  /// Element variables the instantiation must be e-fresh in.
  pub e_fresh: Vec<EVarId>,
  /// Set variables the instantiation must be s-fresh in.
  pub s_fresh: Vec<SVarId>,
  /// Set variables the instantiation must be positive in.
  pub positive: Vec<SVarId>,
  /// Set variables the instantiation must be negative in.
  pub negative: Vec<SVarId>,
  /// Element variables holding application-context holes.
  pub app_ctx_holes: Vec<EVarId>,
}

impl MetaVarConstraints {
  /// Do the constraint lists admit at least one instantiation?
  /// An application-context hole occurs in the pattern, so requiring it
  /// fresh at the same time is unsatisfiable.
  #[must_use]
  pub fn satisfiable(&self) -> bool {
    self.app_ctx_holes.iter().all(|hole| !self.e_fresh.contains(hole))
  }
}
