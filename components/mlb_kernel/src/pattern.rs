//! Matching logic patterns and their structural predicates.
//!
//! A [`Pattern`] is an owned syntax tree: every subterm has exactly one
//! parent and cloning is a deep copy. The checker never shares subtrees
//! between stack slots, memory entries, or claims, so dropping an owner
//! releases its whole tree.

use mlb_parser::{EVarId, MetaVarConstraints, MetaVarId, SVarId, SymId};

/// A matching logic pattern.
///
/// `Implication`, `Application`, `Exists`, and `Mu` are the connectives
/// and binders of the calculus. `MetaVar` is a schematic pattern whose
/// constraint lists bound what may be substituted for it. `ESubst` and
/// `SSubst` are explicit, un-evaluated substitutions; they stay pending
/// until instantiation makes their body concrete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
  /// An element variable `x`.
  EVar(EVarId),
  /// A set variable `X`.
  SVar(SVarId),
  /// A constant symbol `sigma`.
  Symbol(SymId),
  /// `left -> right`.
  Implication {
    /// The antecedent.
    left: Box<Pattern>,
    /// The consequent.
    right: Box<Pattern>,
  },
  /// The application `left . right`.
  Application {
    /// The function position.
    left: Box<Pattern>,
    /// The argument position.
    right: Box<Pattern>,
  },
  /// `exists var. body`.
  Exists {
    /// The bound element variable.
    var: EVarId,
    /// The scope of the binder.
    body: Box<Pattern>,
  },
  /// The least fixpoint `mu var. body`.
  Mu {
    /// The bound set variable.
    var: SVarId,
    /// The scope of the binder.
    body: Box<Pattern>,
  },
  /// A schematic metavariable `phi`.
  MetaVar {
    /// The metavariable's name.
    id: MetaVarId,
    /// What an instantiation of this metavariable must satisfy.
    constraints: MetaVarConstraints,
  },
  /// The explicit substitution `body[plug / evar]`.
  ESubst {
    /// The pattern being substituted into.
    body: Box<Pattern>,
    /// The element variable being replaced.
    evar: EVarId,
    /// The replacement.
    plug: Box<Pattern>,
  },
  /// The explicit substitution `body[plug / svar]`.
  SSubst {
    /// The pattern being substituted into.
    body: Box<Pattern>,
    /// The set variable being replaced.
    svar: SVarId,
    /// The replacement.
    plug: Box<Pattern>,
  },
}

/// Construct an element variable pattern.
#[must_use]
pub fn evar(id: EVarId) -> Pattern {
  Pattern::EVar(id)
}

/// Construct a set variable pattern.
#[must_use]
pub fn svar(id: SVarId) -> Pattern {
  Pattern::SVar(id)
}

/// Construct a symbol pattern.
#[must_use]
pub fn symbol(id: SymId) -> Pattern {
  Pattern::Symbol(id)
}

/// Construct `left -> right`.
#[must_use]
pub fn implies(left: Pattern, right: Pattern) -> Pattern {
  Pattern::Implication { left: Box::new(left), right: Box::new(right) }
}

/// Construct the application `left . right`.
#[must_use]
pub fn app(left: Pattern, right: Pattern) -> Pattern {
  Pattern::Application { left: Box::new(left), right: Box::new(right) }
}

/// Construct `exists var. body`.
#[must_use]
pub fn exists(var: EVarId, body: Pattern) -> Pattern {
  Pattern::Exists { var, body: Box::new(body) }
}

/// Construct `mu var. body`. Does not check positivity; see
/// [`Pattern::well_formed`].
#[must_use]
pub fn mu(var: SVarId, body: Pattern) -> Pattern {
  Pattern::Mu { var, body: Box::new(body) }
}

/// Construct the explicit substitution `body[plug / evar]`.
#[must_use]
pub fn esubst(body: Pattern, evar: EVarId, plug: Pattern) -> Pattern {
  Pattern::ESubst { body: Box::new(body), evar, plug: Box::new(plug) }
}

/// Construct the explicit substitution `body[plug / svar]`.
#[must_use]
pub fn ssubst(body: Pattern, svar: SVarId, plug: Pattern) -> Pattern {
  Pattern::SSubst { body: Box::new(body), svar, plug: Box::new(plug) }
}

/// Construct a metavariable with the given constraint lists.
#[must_use]
pub fn metavar(id: MetaVarId, constraints: MetaVarConstraints) -> Pattern {
  Pattern::MetaVar { id, constraints }
}

/// Construct a metavariable with no constraints at all.
#[must_use]
pub fn metavar_unconstrained(id: MetaVarId) -> Pattern {
  metavar(id, MetaVarConstraints::default())
}

/// Construct a metavariable that is s-fresh in `fresh` and carries the
/// given polarity lists.
#[must_use]
pub fn metavar_s_fresh(
  id: MetaVarId, fresh: SVarId, positive: Vec<SVarId>, negative: Vec<SVarId>,
) -> Pattern {
  metavar(
    id,
    MetaVarConstraints { s_fresh: vec![fresh], positive, negative, ..MetaVarConstraints::default() },
  )
}

/// Bottom, encoded as `mu X0. X0`.
#[must_use]
pub fn bot() -> Pattern {
  mu(SVarId(0), svar(SVarId(0)))
}

/// Negation, encoded as `pat -> bot`.
#[must_use]
pub fn negate(pat: Pattern) -> Pattern {
  implies(pat, bot())
}

/// Universal quantification, encoded as `~(exists var. ~pat)`.
#[must_use]
pub fn forall(var: EVarId, pat: Pattern) -> Pattern {
  negate(exists(var, negate(pat)))
}

impl Pattern {
  /// Does `evar` have no free occurrence in this pattern?
  ///
  /// A metavariable answers from its `e_fresh` constraint list: its
  /// instantiations are obligated to keep the listed variables fresh,
  /// and nothing else is known about them. Both substitution arms
  /// assume the substitution is well-formed, so the plug occurs in the
  /// result and its variables count.
  #[must_use]
  pub fn e_fresh(&self, evar: EVarId) -> bool {
    match self {
      Pattern::EVar(name) => *name != evar,
      Pattern::SVar(_) | Pattern::Symbol(_) => true,
      Pattern::MetaVar { constraints, .. } => constraints.e_fresh.contains(&evar),
      Pattern::Implication { left, right } | Pattern::Application { left, right } =>
        left.e_fresh(evar) && right.e_fresh(evar),
      Pattern::Exists { var, body } => evar == *var || body.e_fresh(evar),
      Pattern::Mu { body, .. } => body.e_fresh(evar),
      Pattern::ESubst { body, evar: evar_id, plug } => {
        if evar == *evar_id {
          // Every free occurrence in the body is replaced, so freshness
          // depends on the plug alone.
          return plug.e_fresh(evar);
        }
        body.e_fresh(evar) && plug.e_fresh(evar)
      }
      Pattern::SSubst { body, plug, .. } => body.e_fresh(evar) && plug.e_fresh(evar),
    }
  }

  /// Does `svar` have no free occurrence in this pattern?
  /// The mirror image of [`e_fresh`](Self::e_fresh), with the roles of
  /// `Exists` and `Mu` swapped.
  #[must_use]
  pub fn s_fresh(&self, svar: SVarId) -> bool {
    match self {
      Pattern::EVar(_) | Pattern::Symbol(_) => true,
      Pattern::SVar(name) => *name != svar,
      Pattern::MetaVar { constraints, .. } => constraints.s_fresh.contains(&svar),
      Pattern::Implication { left, right } | Pattern::Application { left, right } =>
        left.s_fresh(svar) && right.s_fresh(svar),
      Pattern::Exists { body, .. } => body.s_fresh(svar),
      Pattern::Mu { var, body } => svar == *var || body.s_fresh(svar),
      Pattern::ESubst { body, plug, .. } => body.s_fresh(svar) && plug.s_fresh(svar),
      Pattern::SSubst { body, svar: svar_id, plug } => {
        if svar == *svar_id {
          return plug.s_fresh(svar);
        }
        body.s_fresh(svar) && plug.s_fresh(svar)
      }
    }
  }

  /// Does every free occurrence of `svar` sit under an even number of
  /// negations?
  ///
  /// Required positivity of the bound variable is what makes a `Mu`
  /// well-formed. A metavariable consults its `positive` constraint
  /// list; freshness is deliberately not taken to imply positivity, the
  /// prover must spell the polarity out. The `ESubst` arm is a sound
  /// approximation: the body must be positive and the plug must not
  /// mention `svar` at all.
  #[must_use]
  pub fn positive(&self, svar: SVarId) -> bool {
    match self {
      Pattern::EVar(_) | Pattern::SVar(_) | Pattern::Symbol(_) => true,
      Pattern::MetaVar { constraints, .. } => constraints.positive.contains(&svar),
      Pattern::Implication { left, right } => left.negative(svar) && right.positive(svar),
      Pattern::Application { left, right } => left.positive(svar) && right.positive(svar),
      Pattern::Exists { body, .. } => body.positive(svar),
      Pattern::Mu { var, body } => svar == *var || body.positive(svar),
      Pattern::ESubst { body, plug, .. } => body.positive(svar) && plug.s_fresh(svar),
      Pattern::SSubst { body, svar: svar_id, plug } => {
        // The plug lands wherever svar_id occurred; its occurrences of
        // svar end up positive when the polarities compose.
        let plug_positive_svar = plug.s_fresh(svar)
          || (body.positive(*svar_id) && plug.positive(svar))
          || (body.negative(*svar_id) && plug.negative(svar));
        if svar == *svar_id {
          return plug_positive_svar;
        }
        body.positive(svar) && plug_positive_svar
      }
    }
  }

  /// Does every free occurrence of `svar` sit under an odd number of
  /// negations? The dual of [`positive`](Self::positive); note that a
  /// bare `SVar(svar)` is positive and not negative, while `Exists`
  /// demands outright freshness of the body.
  #[must_use]
  pub fn negative(&self, svar: SVarId) -> bool {
    match self {
      Pattern::EVar(_) | Pattern::Symbol(_) => true,
      Pattern::SVar(name) => *name != svar,
      Pattern::MetaVar { constraints, .. } => constraints.negative.contains(&svar),
      Pattern::Implication { left, right } => left.positive(svar) && right.negative(svar),
      Pattern::Application { left, right } => left.negative(svar) && right.negative(svar),
      Pattern::Exists { body, .. } => body.s_fresh(svar),
      Pattern::Mu { var, body } => svar == *var || body.negative(svar),
      Pattern::ESubst { body, plug, .. } => body.negative(svar) && plug.s_fresh(svar),
      Pattern::SSubst { body, svar: svar_id, plug } => {
        let plug_negative_svar = plug.s_fresh(svar)
          || (body.positive(*svar_id) && plug.negative(svar))
          || (body.negative(*svar_id) && plug.positive(svar));
        if svar == *svar_id {
          return plug_negative_svar;
        }
        body.negative(svar) && plug_negative_svar
      }
    }
  }

  /// Node-local well-formedness, assuming well-formed subpatterns.
  ///
  /// Only four node kinds carry a side condition: a metavariable's
  /// application-context holes must not be required fresh, a fixpoint
  /// body must be positive in the bound variable, and an explicit
  /// substitution must actually bind (a substitution for a variable
  /// with no free occurrence is vacuous and must not be constructed).
  #[must_use]
  pub fn well_formed(&self) -> bool {
    match self {
      Pattern::MetaVar { constraints, .. } => constraints.satisfiable(),
      Pattern::Mu { var, body } => body.positive(*var),
      Pattern::ESubst { body, evar, .. } => !body.e_fresh(*evar),
      Pattern::SSubst { body, svar, .. } => !body.s_fresh(*svar),
      _ => true,
    }
  }
}
