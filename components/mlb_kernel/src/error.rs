//! The kernel's rejection reasons.

use crate::pattern::Pattern;
use crate::state::Phase;
use mlb_parser::{EVarId, MetaVarId, ParseError, SVarId};

/// Why a proof run was rejected.
///
/// Every variant is fatal: the checker stops at the first violation and
/// the embedding runtime reports failure. The payloads exist purely for
/// diagnostics; a host re-executing the kernel inside a proof system
/// only observes the success bit.
#[derive(Debug, PartialEq, Eq)]
pub enum VerifyError {
  /// The instruction stream itself failed to decode.
  Parse(ParseError),
  /// An instruction popped more terms than the stack holds.
  StackUnderflow,
  /// An instruction needed a pattern but found a proved conclusion.
  ExpectedPattern,
  /// An instruction needed a proved conclusion but found a pattern.
  ExpectedProved,
  /// A metavariable's application-context holes intersect its e-fresh
  /// constraints, so no instantiation can ever satisfy it.
  UnsatisfiableMetaVar(MetaVarId),
  /// A fixpoint was constructed over a body that is not positive in the
  /// bound variable.
  NonPositiveMu(SVarId),
  /// An element substitution was constructed for a variable with no
  /// free occurrence in the body.
  VacuousESubst(EVarId),
  /// A set substitution was constructed for a variable with no free
  /// occurrence in the body.
  VacuousSSubst(SVarId),
  /// An instantiation's plug is not e-fresh in a constrained variable.
  EFreshViolation {
    /// The metavariable being instantiated.
    metavar: MetaVarId,
    /// The variable the plug was required to be fresh in.
    evar: EVarId,
  },
  /// An instantiation's plug is not s-fresh in a constrained variable.
  SFreshViolation {
    /// The metavariable being instantiated.
    metavar: MetaVarId,
    /// The variable the plug was required to be fresh in.
    svar: SVarId,
  },
  /// An instantiation's plug is not positive in a constrained variable.
  PositivityViolation {
    /// The metavariable being instantiated.
    metavar: MetaVarId,
    /// The variable the plug was required to be positive in.
    svar: SVarId,
  },
  /// An instantiation's plug is not negative in a constrained variable.
  NegativityViolation {
    /// The metavariable being instantiated.
    metavar: MetaVarId,
    /// The variable the plug was required to be negative in.
    svar: SVarId,
  },
  /// An instantiation named a metavariable past the end of the supplied
  /// plug list.
  MissingPlug {
    /// The metavariable with no corresponding plug.
    metavar: MetaVarId,
    /// Its position in the instantiation's id list.
    index: usize,
    /// How many plugs were supplied.
    supplied: usize,
  },
  /// An inference rule needed an implication at the top of the stack.
  ExpectedImplication(&'static str),
  /// The popped hypothesis does not match the implication's antecedent.
  AntecedentMismatch,
  /// Generalization's bound variable occurs free in the consequent.
  BoundVarNotFresh(EVarId),
  /// The substitution rule was applied to a fully concrete conclusion.
  SubstOnConcreteTerm,
  /// A load named a memory slot that was never written.
  LoadOutOfRange {
    /// The requested slot.
    index: u8,
    /// The number of live slots.
    len: usize,
  },
  /// The opcode is reserved and its schema is not implemented yet.
  Unsupported(&'static str),
  /// The opcode is not legal in the current execution phase.
  IllegalInPhase(&'static str, Phase),
  /// A published conclusion differs from the next expected claim.
  ClaimMismatch {
    /// The claim at the head of the journal.
    claim: Box<Pattern>,
    /// The conclusion that was published.
    theorem: Box<Pattern>,
  },
  /// A conclusion was published with no claims left to discharge.
  NoPendingClaim,
  /// The proof ended with claims still waiting to be published.
  UndischargedClaims(usize),
}

impl From<ParseError> for VerifyError {
  fn from(e: ParseError) -> Self {
    VerifyError::Parse(e)
  }
}

impl std::fmt::Display for VerifyError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      VerifyError::Parse(e) => e.fmt(f),
      VerifyError::StackUnderflow => write!(f, "insufficient stack items"),
      VerifyError::ExpectedPattern => write!(f, "expected a pattern on the stack"),
      VerifyError::ExpectedProved => write!(f, "expected a proved conclusion on the stack"),
      VerifyError::UnsatisfiableMetaVar(id) => write!(
        f,
        "metavariable phi{id} requires an application-context hole that it also requires fresh"
      ),
      VerifyError::NonPositiveMu(var) =>
        write!(f, "fixpoint body is not positive in the bound variable X{var}"),
      VerifyError::VacuousESubst(var) =>
        write!(f, "substitution binds x{var}, which has no free occurrence in the body"),
      VerifyError::VacuousSSubst(var) =>
        write!(f, "substitution binds X{var}, which has no free occurrence in the body"),
      VerifyError::EFreshViolation { metavar, evar } =>
        write!(f, "instantiation of phi{metavar} breaks a freshness constraint on x{evar}"),
      VerifyError::SFreshViolation { metavar, svar } =>
        write!(f, "instantiation of phi{metavar} breaks a freshness constraint on X{svar}"),
      VerifyError::PositivityViolation { metavar, svar } =>
        write!(f, "instantiation of phi{metavar} breaks a positivity constraint on X{svar}"),
      VerifyError::NegativityViolation { metavar, svar } =>
        write!(f, "instantiation of phi{metavar} breaks a negativity constraint on X{svar}"),
      VerifyError::MissingPlug { metavar, index, supplied } => write!(
        f,
        "instantiation names phi{metavar} at position {index} but supplies only {supplied} plugs"
      ),
      VerifyError::ExpectedImplication(rule) =>
        write!(f, "{rule} expects an implication as its first argument"),
      VerifyError::AntecedentMismatch =>
        write!(f, "the hypothesis does not match the implication's antecedent"),
      VerifyError::BoundVarNotFresh(var) =>
        write!(f, "the bound variable x{var} must be fresh in the conclusion"),
      VerifyError::SubstOnConcreteTerm =>
        write!(f, "the substitution rule applies only to schematic conclusions"),
      VerifyError::LoadOutOfRange { index, len } =>
        write!(f, "load of memory slot {index}, but only {len} slots are saved"),
      VerifyError::Unsupported(name) => write!(f, "instruction {name} is not supported yet"),
      VerifyError::IllegalInPhase(name, phase) =>
        write!(f, "instruction {name} is not legal in the {phase} phase"),
      VerifyError::ClaimMismatch { claim, theorem } => write!(
        f,
        "the published conclusion does not prove the pending claim: \
         expected {claim:?}, found {theorem:?}"
      ),
      VerifyError::NoPendingClaim =>
        write!(f, "a conclusion was published but every claim is already discharged"),
      VerifyError::UndischargedClaims(n) =>
        write!(f, "the proof ended with {n} undischarged claim(s)"),
    }
  }
}

impl std::error::Error for VerifyError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      VerifyError::Parse(e) => Some(e),
      _ => None,
    }
  }
}
