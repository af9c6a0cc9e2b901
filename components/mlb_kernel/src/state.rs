//! The virtual machine state: stack, memory, journal, and axiom store.

use std::collections::VecDeque;

use crate::error::VerifyError;
use crate::pattern::Pattern;

/// A stack slot: either a syntactic pattern under construction or a
/// conclusion that has already been established. Pattern builders only
/// consume `Pattern` terms; inference rules only consume `Proved` ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
  /// A syntactic pattern.
  Pattern(Pattern),
  /// An established conclusion.
  Proved(Pattern),
}

/// A memory slot, with the same two shapes as a [`Term`].
/// Saving and loading copy the pattern; memory never aliases the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
  /// A saved syntactic pattern.
  Pattern(Pattern),
  /// A saved conclusion.
  Proved(Pattern),
}

impl Entry {
  fn to_term(&self) -> Term {
    match self {
      Entry::Pattern(p) => Term::Pattern(p.clone()),
      Entry::Proved(p) => Term::Proved(p.clone()),
    }
  }
}

impl From<&Term> for Entry {
  fn from(term: &Term) -> Entry {
    match term {
      Term::Pattern(p) => Entry::Pattern(p.clone()),
      Term::Proved(p) => Entry::Proved(p.clone()),
    }
  }
}

/// Which of the three instruction streams is executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  /// Loading the assumptions; `Publish` records an axiom.
  Gamma,
  /// Declaring the claims; `Publish` appends to the journal.
  Claims,
  /// Executing the proof; `Publish` discharges the next claim.
  Proof,
}

impl std::fmt::Display for Phase {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(match self {
      Phase::Gamma => "gamma",
      Phase::Claims => "claims",
      Phase::Proof => "proof",
    })
  }
}

/// The machine a proof run executes on.
///
/// The stack and memory are phase-local (the driver clears them between
/// streams); the journal and the axiom store persist across phases.
/// The fields are public so that embedders and tests can inspect a
/// finished or failed run.
#[derive(Debug, Default)]
pub struct Machine {
  /// The working stack of terms.
  pub stack: Vec<Term>,
  /// Saved entries, indexed by `Load` in save order.
  pub memory: Vec<Entry>,
  /// Declared claims, discharged front to back in declaration order.
  pub claims: VecDeque<Pattern>,
  /// Assumptions recorded during the gamma phase.
  pub axioms: Vec<Entry>,
}

impl Machine {
  /// An empty machine.
  #[must_use]
  pub fn new() -> Self {
    Machine::default()
  }

  pub(crate) fn pop_term(&mut self) -> Result<Term, VerifyError> {
    self.stack.pop().ok_or(VerifyError::StackUnderflow)
  }

  pub(crate) fn pop_pattern(&mut self) -> Result<Pattern, VerifyError> {
    match self.pop_term()? {
      Term::Pattern(p) => Ok(p),
      Term::Proved(_) => Err(VerifyError::ExpectedPattern),
    }
  }

  pub(crate) fn pop_proved(&mut self) -> Result<Pattern, VerifyError> {
    match self.pop_term()? {
      Term::Proved(p) => Ok(p),
      Term::Pattern(_) => Err(VerifyError::ExpectedProved),
    }
  }

  pub(crate) fn top_term(&self) -> Result<&Term, VerifyError> {
    self.stack.last().ok_or(VerifyError::StackUnderflow)
  }

  pub(crate) fn load(&self, index: u8) -> Result<Term, VerifyError> {
    self
      .memory
      .get(index as usize)
      .map(Entry::to_term)
      .ok_or(VerifyError::LoadOutOfRange { index, len: self.memory.len() })
  }
}
