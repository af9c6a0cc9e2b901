//! Instantiation of metavariables and application of explicit
//! substitutions.

use crate::error::VerifyError;
use crate::pattern::{app, esubst, exists, implies, mu, ssubst, Pattern};
use mlb_parser::{EVarId, MetaVarId, SVarId};

/// Substitute `plug` for every free occurrence of the element variable
/// `evar` in `pattern`.
///
/// Concrete nodes are rewritten outright; binders shadow their own
/// variable; a schematic node (metavariable or pending substitution)
/// cannot be searched, so the substitution stays pending around it.
#[must_use]
pub fn apply_esubst(pattern: &Pattern, evar: EVarId, plug: &Pattern) -> Pattern {
  match pattern {
    Pattern::EVar(e) =>
      if *e == evar {
        plug.clone()
      } else {
        pattern.clone()
      },
    Pattern::Implication { left, right } =>
      implies(apply_esubst(left, evar, plug), apply_esubst(right, evar, plug)),
    Pattern::Application { left, right } =>
      app(apply_esubst(left, evar, plug), apply_esubst(right, evar, plug)),
    Pattern::Exists { var, .. } if *var == evar => pattern.clone(),
    Pattern::Exists { var, body } => exists(*var, apply_esubst(body, evar, plug)),
    Pattern::Mu { var, body } => mu(*var, apply_esubst(body, evar, plug)),
    Pattern::MetaVar { .. } | Pattern::ESubst { .. } | Pattern::SSubst { .. } =>
      esubst(pattern.clone(), evar, plug.clone()),
    Pattern::SVar(_) | Pattern::Symbol(_) => pattern.clone(),
  }
}

/// Substitute `plug` for every free occurrence of the set variable
/// `svar` in `pattern`. The mirror image of [`apply_esubst`].
#[must_use]
pub fn apply_ssubst(pattern: &Pattern, svar: SVarId, plug: &Pattern) -> Pattern {
  match pattern {
    Pattern::SVar(s) =>
      if *s == svar {
        plug.clone()
      } else {
        pattern.clone()
      },
    Pattern::Implication { left, right } =>
      implies(apply_ssubst(left, svar, plug), apply_ssubst(right, svar, plug)),
    Pattern::Application { left, right } =>
      app(apply_ssubst(left, svar, plug), apply_ssubst(right, svar, plug)),
    Pattern::Exists { var, body } => exists(*var, apply_ssubst(body, svar, plug)),
    Pattern::Mu { var, .. } if *var == svar => pattern.clone(),
    Pattern::Mu { var, body } => mu(*var, apply_ssubst(body, svar, plug)),
    Pattern::MetaVar { .. } | Pattern::ESubst { .. } | Pattern::SSubst { .. } =>
      ssubst(pattern.clone(), svar, plug.clone()),
    Pattern::EVar(_) | Pattern::Symbol(_) => pattern.clone(),
  }
}

/// Simultaneously replace the metavariables named in `vars` by the
/// corresponding patterns in `plugs`.
///
/// Returns `Ok(None)` when `p` contains none of the named
/// metavariables, so callers can keep the original allocation. When a
/// metavariable appears more than once in `vars`, the first entry wins.
/// Every replacement checks the metavariable's four constraint kinds
/// against its plug; a violation rejects the proof, as does a
/// metavariable whose position in `vars` has no matching plug.
///
/// A pending substitution whose body or plug was rewritten is
/// re-applied afterwards: instantiation is the only point where a
/// substitution's body can become concrete.
pub fn instantiate(
  p: &Pattern, vars: &[MetaVarId], plugs: &[Pattern],
) -> Result<Option<Pattern>, VerifyError> {
  Ok(match p {
    Pattern::EVar(_) | Pattern::SVar(_) | Pattern::Symbol(_) => None,
    Pattern::MetaVar { id, constraints } => {
      let Some(pos) = vars.iter().position(|v| v == id) else { return Ok(None) };
      if pos >= plugs.len() {
        return Err(VerifyError::MissingPlug { metavar: *id, index: pos, supplied: plugs.len() });
      }
      let plug = &plugs[pos];
      for &evar in &constraints.e_fresh {
        if !plug.e_fresh(evar) {
          return Err(VerifyError::EFreshViolation { metavar: *id, evar });
        }
      }
      for &svar in &constraints.s_fresh {
        if !plug.s_fresh(svar) {
          return Err(VerifyError::SFreshViolation { metavar: *id, svar });
        }
      }
      for &svar in &constraints.positive {
        if !plug.positive(svar) {
          return Err(VerifyError::PositivityViolation { metavar: *id, svar });
        }
      }
      for &svar in &constraints.negative {
        if !plug.negative(svar) {
          return Err(VerifyError::NegativityViolation { metavar: *id, svar });
        }
      }
      Some(plug.clone())
    }
    Pattern::Implication { left, right } => {
      let l = instantiate(left, vars, plugs)?;
      let r = instantiate(right, vars, plugs)?;
      if l.is_none() && r.is_none() {
        None
      } else {
        Some(implies(
          l.unwrap_or_else(|| (**left).clone()),
          r.unwrap_or_else(|| (**right).clone()),
        ))
      }
    }
    Pattern::Application { left, right } => {
      let l = instantiate(left, vars, plugs)?;
      let r = instantiate(right, vars, plugs)?;
      if l.is_none() && r.is_none() {
        None
      } else {
        Some(app(l.unwrap_or_else(|| (**left).clone()), r.unwrap_or_else(|| (**right).clone())))
      }
    }
    Pattern::Exists { var, body } => instantiate(body, vars, plugs)?.map(|b| exists(*var, b)),
    Pattern::Mu { var, body } => instantiate(body, vars, plugs)?.map(|b| mu(*var, b)),
    Pattern::ESubst { body, evar, plug } => {
      let b = instantiate(body, vars, plugs)?;
      let q = instantiate(plug, vars, plugs)?;
      if b.is_none() && q.is_none() {
        None
      } else {
        let b = b.unwrap_or_else(|| (**body).clone());
        let q = q.unwrap_or_else(|| (**plug).clone());
        Some(apply_esubst(&b, *evar, &q))
      }
    }
    Pattern::SSubst { body, svar, plug } => {
      let b = instantiate(body, vars, plugs)?;
      let q = instantiate(plug, vars, plugs)?;
      if b.is_none() && q.is_none() {
        None
      } else {
        let b = b.unwrap_or_else(|| (**body).clone());
        let q = q.unwrap_or_else(|| (**plug).clone());
        Some(apply_ssubst(&b, *svar, &q))
      }
    }
  })
}
