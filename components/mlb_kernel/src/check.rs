//! Instruction execution and the three-phase proof driver.

use log::{debug, trace};
use mlb_parser::{stream_contents, EVarId, Inst, InstIter, MetaVarId};

use crate::error::VerifyError;
use crate::pattern::{
  app, esubst, evar, exists, implies, metavar, metavar_unconstrained, mu, negate, ssubst, svar,
  symbol, Pattern,
};
use crate::state::{Entry, Machine, Phase, Term};
use crate::subst::instantiate;

/// `phi0 -> (phi1 -> phi0)`.
fn prop1() -> Pattern {
  let phi0 = metavar_unconstrained(MetaVarId(0));
  let phi1 = metavar_unconstrained(MetaVarId(1));
  implies(phi0.clone(), implies(phi1, phi0))
}

/// `(phi0 -> (phi1 -> phi2)) -> ((phi0 -> phi1) -> (phi0 -> phi2))`.
fn prop2() -> Pattern {
  let phi0 = metavar_unconstrained(MetaVarId(0));
  let phi1 = metavar_unconstrained(MetaVarId(1));
  let phi2 = metavar_unconstrained(MetaVarId(2));
  implies(
    implies(phi0.clone(), implies(phi1.clone(), phi2.clone())),
    implies(implies(phi0.clone(), phi1), implies(phi0, phi2)),
  )
}

/// `~~phi0 -> phi0`.
fn prop3() -> Pattern {
  let phi0 = metavar_unconstrained(MetaVarId(0));
  implies(negate(negate(phi0.clone())), phi0)
}

/// `phi0[x1 / x0] -> exists x0. phi0`.
fn quantifier() -> Pattern {
  let phi0 = metavar_unconstrained(MetaVarId(0));
  implies(esubst(phi0.clone(), EVarId(0), evar(EVarId(1))), exists(EVarId(0), phi0))
}

/// `exists x0. x0`.
fn existence() -> Pattern {
  exists(EVarId(0), evar(EVarId(0)))
}

/// Is this instruction restricted to the proof phase?
/// Everything that mints or consumes a proved conclusion is; the gamma
/// and claims phases only construct patterns.
fn proof_only(inst: &Inst) -> bool {
  matches!(
    inst,
    Inst::Prop1
      | Inst::Prop2
      | Inst::Prop3
      | Inst::Quantifier
      | Inst::PropagationOr
      | Inst::PropagationExists
      | Inst::PreFixpoint
      | Inst::Existence
      | Inst::Singleton
      | Inst::ModusPonens
      | Inst::Generalization
      | Inst::Frame
      | Inst::Substitution(_)
      | Inst::KnasterTarski
      | Inst::Instantiate(_)
  )
}

impl Machine {
  /// Execute one instruction stream under the given phase.
  /// The stream ends at the buffer's end or at an explicit `NO_OP`.
  pub fn execute(&mut self, stream: &[u8], phase: Phase) -> Result<(), VerifyError> {
    debug!("{phase} phase: executing {} byte(s)", stream.len());
    let mut insts = InstIter::new(stream);
    while let Some(inst) = insts.next_inst()? {
      trace!("{phase}: {inst:?}, stack depth {}", self.stack.len());
      self.step(inst, phase)?;
    }
    Ok(())
  }

  /// Execute a single instruction.
  fn step(&mut self, inst: Inst, phase: Phase) -> Result<(), VerifyError> {
    if phase != Phase::Proof && proof_only(&inst) {
      return Err(VerifyError::IllegalInPhase(inst.name(), phase));
    }
    match inst {
      // Pattern builders
      Inst::EVar(id) => self.stack.push(Term::Pattern(evar(id))),
      Inst::SVar(id) => self.stack.push(Term::Pattern(svar(id))),
      Inst::Symbol(id) => self.stack.push(Term::Pattern(symbol(id))),
      Inst::Implication => {
        let right = self.pop_pattern()?;
        let left = self.pop_pattern()?;
        self.stack.push(Term::Pattern(implies(left, right)));
      }
      Inst::Application => {
        let right = self.pop_pattern()?;
        let left = self.pop_pattern()?;
        self.stack.push(Term::Pattern(app(left, right)));
      }
      Inst::Exists(var) => {
        let body = self.pop_pattern()?;
        self.stack.push(Term::Pattern(exists(var, body)));
      }
      Inst::Mu(var) => {
        let body = self.pop_pattern()?;
        let pat = mu(var, body);
        if !pat.well_formed() {
          return Err(VerifyError::NonPositiveMu(var));
        }
        self.stack.push(Term::Pattern(pat));
      }
      Inst::MetaVar(id, constraints) => {
        let pat = metavar(id, constraints);
        if !pat.well_formed() {
          return Err(VerifyError::UnsatisfiableMetaVar(id));
        }
        self.stack.push(Term::Pattern(pat));
      }
      Inst::ESubst(var) => {
        let plug = self.pop_pattern()?;
        let body = self.pop_pattern()?;
        let pat = esubst(body, var, plug);
        if !pat.well_formed() {
          return Err(VerifyError::VacuousESubst(var));
        }
        self.stack.push(Term::Pattern(pat));
      }
      Inst::SSubst(var) => {
        let plug = self.pop_pattern()?;
        let body = self.pop_pattern()?;
        let pat = ssubst(body, var, plug);
        if !pat.well_formed() {
          return Err(VerifyError::VacuousSSubst(var));
        }
        self.stack.push(Term::Pattern(pat));
      }

      // Axiom schemas
      Inst::Prop1 => self.stack.push(Term::Proved(prop1())),
      Inst::Prop2 => self.stack.push(Term::Proved(prop2())),
      Inst::Prop3 => self.stack.push(Term::Proved(prop3())),
      Inst::Quantifier => self.stack.push(Term::Proved(quantifier())),
      Inst::Existence => self.stack.push(Term::Proved(existence())),
      Inst::PropagationOr
      | Inst::PropagationExists
      | Inst::PreFixpoint
      | Inst::Singleton
      | Inst::Frame
      | Inst::KnasterTarski => return Err(VerifyError::Unsupported(inst.name())),

      // Inference rules
      Inst::ModusPonens => {
        let implication = self.pop_proved()?;
        let hypothesis = self.pop_proved()?;
        match implication {
          Pattern::Implication { left, right } => {
            if *left != hypothesis {
              return Err(VerifyError::AntecedentMismatch);
            }
            self.stack.push(Term::Proved(*right));
          }
          _ => return Err(VerifyError::ExpectedImplication("ModusPonens")),
        }
      }
      Inst::Generalization => match self.pop_proved()? {
        Pattern::Implication { left, right } => {
          let var = EVarId(0);
          if !right.e_fresh(var) {
            return Err(VerifyError::BoundVarNotFresh(var));
          }
          self.stack.push(Term::Proved(implies(exists(var, *left), *right)));
        }
        _ => return Err(VerifyError::ExpectedImplication("Generalization")),
      },
      Inst::Substitution(var) => {
        let plug = self.pop_pattern()?;
        let conclusion = self.pop_proved()?;
        match conclusion {
          Pattern::MetaVar { .. } | Pattern::ESubst { .. } | Pattern::SSubst { .. } => {}
          _ => return Err(VerifyError::SubstOnConcreteTerm),
        }
        // Substituting a variable with no free occurrence is the identity.
        if conclusion.s_fresh(var) {
          self.stack.push(Term::Proved(conclusion));
        } else {
          self.stack.push(Term::Proved(ssubst(conclusion, var, plug)));
        }
      }

      // Meta rule
      Inst::Instantiate(ids) => {
        let term = self.pop_term()?;
        let mut plugs = Vec::with_capacity(ids.len());
        for _ in &ids {
          plugs.push(self.pop_pattern()?);
        }
        let rewritten = match term {
          Term::Pattern(p) => {
            let q = instantiate(&p, &ids, &plugs)?.unwrap_or(p);
            Term::Pattern(q)
          }
          Term::Proved(p) => {
            let q = instantiate(&p, &ids, &plugs)?.unwrap_or(p);
            Term::Proved(q)
          }
        };
        self.stack.push(rewritten);
      }

      // Stack and memory
      Inst::Pop => {
        self.pop_term()?;
      }
      Inst::Save => {
        let entry = Entry::from(self.top_term()?);
        self.memory.push(entry);
      }
      Inst::Load(index) => {
        let term = self.load(index)?;
        self.stack.push(term);
      }

      // Journal
      Inst::Publish => match phase {
        Phase::Gamma => {
          let assumption = self.pop_pattern()?;
          self.axioms.push(Entry::Proved(assumption));
        }
        Phase::Claims => {
          let claim = self.pop_pattern()?;
          self.claims.push_back(claim);
        }
        Phase::Proof => {
          let theorem = self.pop_proved()?;
          let claim = self.claims.pop_front().ok_or(VerifyError::NoPendingClaim)?;
          if claim != theorem {
            return Err(VerifyError::ClaimMismatch {
              claim: Box::new(claim),
              theorem: Box::new(theorem),
            });
          }
        }
      },
    }
    Ok(())
  }
}

/// Check a proof run given three raw instruction streams.
///
/// The gamma stream records the assumptions, the claims stream declares
/// what the proof must establish, and the proof stream derives it. The
/// stack and memory are phase-local; the assumptions recorded by the
/// gamma phase become the proof phase's initial memory, so a proof
/// refers to its axioms by `Load`. The run succeeds when every stream
/// executes without a violation and every declared claim was published,
/// in order.
pub fn verify_streams(gamma: &[u8], claims: &[u8], proof: &[u8]) -> Result<(), VerifyError> {
  let mut machine = Machine::new();
  machine.execute(gamma, Phase::Gamma)?;

  machine.stack.clear();
  machine.memory.clear();
  machine.execute(claims, Phase::Claims)?;

  machine.stack.clear();
  machine.memory = std::mem::take(&mut machine.axioms);
  machine.execute(proof, Phase::Proof)?;

  if !machine.claims.is_empty() {
    return Err(VerifyError::UndischargedClaims(machine.claims.len()));
  }
  debug!("all claims discharged");
  Ok(())
}

/// Check a proof run given the three length-prefixed buffers supplied
/// by the embedding runtime: each buffer's first byte is the stream
/// length `n`, and bytes `1..=n` are the instruction stream.
pub fn verify_buffers(gamma: &[u8], claims: &[u8], proof: &[u8]) -> Result<(), VerifyError> {
  verify_streams(stream_contents(gamma), stream_contents(claims), stream_contents(proof))
}

#[cfg(test)]
mod tests {
  use super::*;
  use mlb_parser::{cmd, SVarId, SymId};

  fn run(machine: &mut Machine, stream: &[u8], phase: Phase) {
    machine.execute(stream, phase).expect("execution should succeed");
  }

  #[test]
  fn publish_per_phase() {
    let mut m = Machine::new();
    m.stack.push(Term::Pattern(symbol(SymId(0))));
    run(&mut m, &[cmd::PUBLISH], Phase::Gamma);
    assert!(m.stack.is_empty());
    assert!(m.claims.is_empty());
    assert_eq!(m.axioms, vec![Entry::Proved(symbol(SymId(0)))]);

    let mut m = Machine::new();
    m.stack.push(Term::Pattern(symbol(SymId(0))));
    run(&mut m, &[cmd::PUBLISH], Phase::Claims);
    assert!(m.stack.is_empty());
    assert_eq!(Vec::from(m.claims.clone()), vec![symbol(SymId(0))]);
    assert!(m.axioms.is_empty());

    let mut m = Machine::new();
    m.stack.push(Term::Proved(symbol(SymId(0))));
    m.claims.push_back(symbol(SymId(0)));
    run(&mut m, &[cmd::PUBLISH], Phase::Proof);
    assert!(m.stack.is_empty());
    assert!(m.claims.is_empty());
  }

  #[test]
  fn publish_mismatch_is_fatal() {
    let mut m = Machine::new();
    m.stack.push(Term::Proved(symbol(SymId(1))));
    m.claims.push_back(symbol(SymId(0)));
    assert!(matches!(
      m.execute(&[cmd::PUBLISH], Phase::Proof),
      Err(VerifyError::ClaimMismatch { .. })
    ));
  }

  #[test]
  fn construct_phi_implies_phi() {
    #[rustfmt::skip]
    let proof = [
      cmd::META_VAR, 0, 0, 0, 0, 0, 0, // phi0
      cmd::SAVE,                       // @0
      cmd::LOAD, 0,                    // phi0 ; phi0
      cmd::IMPLICATION,                // phi0 -> phi0
    ];
    let mut m = Machine::new();
    run(&mut m, &proof, Phase::Proof);
    let phi0 = metavar_unconstrained(MetaVarId(0));
    assert_eq!(m.stack, vec![Term::Pattern(implies(phi0.clone(), phi0))]);
  }

  #[test]
  fn construct_phi_implies_phi_with_constraints() {
    // Rotate the one non-empty constraint list through all five slots.
    let mut lists: Vec<Vec<u8>> = vec![vec![1], vec![], vec![], vec![], vec![]];
    for _ in 0..5 {
      let mut proof = vec![cmd::META_VAR, 1];
      for list in &lists {
        proof.push(u8::try_from(list.len()).expect("test lists are short"));
        proof.extend_from_slice(list);
      }
      proof.extend_from_slice(&[cmd::SAVE, cmd::LOAD, 0, cmd::IMPLICATION]);

      let mut m = Machine::new();
      run(&mut m, &proof, Phase::Proof);
      match &m.stack[..] {
        [Term::Pattern(Pattern::Implication { left, right })] => assert_eq!(left, right),
        stack => panic!("unexpected stack: {stack:?}"),
      }
      lists.rotate_right(1);
    }
  }

  #[test]
  fn tautology_derivation() {
    // phi0 -> phi0, by Prop1, Prop2, and modus ponens twice.
    #[rustfmt::skip]
    let proof = [
      // p1 = phi0 -> (phi0 -> phi0)
      cmd::CLEAN_META_VAR, 0, cmd::PROP1, cmd::INSTANTIATE, 1, 1,
      // p2 = phi0 -> ((phi0 -> phi0) -> phi0)
      cmd::CLEAN_META_VAR, 0, cmd::CLEAN_META_VAR, 0, cmd::IMPLICATION,
      cmd::PROP1, cmd::INSTANTIATE, 1, 1,
      // p3 = p2's statement -> ((phi0 -> (phi0 -> phi0)) -> (phi0 -> phi0))
      cmd::CLEAN_META_VAR, 0,
      cmd::CLEAN_META_VAR, 0, cmd::CLEAN_META_VAR, 0, cmd::IMPLICATION,
      cmd::PROP2, cmd::INSTANTIATE, 2, 1, 2,
      // p3 + p2 gives phi0 -> (phi0 -> phi0) -> (phi0 -> phi0); then p1.
      cmd::MODUS_PONENS,
      cmd::MODUS_PONENS,
    ];
    let mut m = Machine::new();
    run(&mut m, &proof, Phase::Proof);
    let phi0 = metavar_unconstrained(MetaVarId(0));
    assert_eq!(m.stack, vec![Term::Proved(implies(phi0.clone(), phi0))]);
  }

  #[test]
  fn generalization() {
    let mut m = Machine::new();
    m.stack.push(Term::Proved(implies(symbol(SymId(0)), symbol(SymId(1)))));
    run(&mut m, &[cmd::GENERALIZATION], Phase::Proof);
    assert_eq!(
      m.stack,
      vec![Term::Proved(implies(exists(EVarId(0), symbol(SymId(0))), symbol(SymId(1))))]
    );
  }

  #[test]
  fn generalization_requires_fresh_conclusion() {
    let mut m = Machine::new();
    m.stack.push(Term::Proved(implies(symbol(SymId(0)), evar(EVarId(0)))));
    assert_eq!(
      m.execute(&[cmd::GENERALIZATION], Phase::Proof),
      Err(VerifyError::BoundVarNotFresh(EVarId(0)))
    );
  }

  #[test]
  fn reserved_rules_are_fatal() {
    for opcode in [
      cmd::PROPAGATION_OR,
      cmd::PROPAGATION_EXISTS,
      cmd::PRE_FIXPOINT,
      cmd::SINGLETON,
      cmd::FRAME,
      cmd::KNASTER_TARSKI,
    ] {
      let mut m = Machine::new();
      assert!(
        matches!(m.execute(&[opcode, 0], Phase::Proof), Err(VerifyError::Unsupported(_))),
        "opcode {opcode}"
      );
    }
  }

  #[test]
  fn proved_ops_are_illegal_outside_the_proof_phase() {
    for phase in [Phase::Gamma, Phase::Claims] {
      let mut m = Machine::new();
      assert!(matches!(
        m.execute(&[cmd::PROP1], phase),
        Err(VerifyError::IllegalInPhase("Prop1", _))
      ));
    }
  }

  #[test]
  fn substitution_rule() {
    let mut m = Machine::new();
    m.stack.push(Term::Proved(metavar_unconstrained(MetaVarId(0))));
    m.stack.push(Term::Pattern(symbol(SymId(0))));
    run(&mut m, &[cmd::SUBSTITUTION, 0], Phase::Proof);
    assert_eq!(
      m.stack,
      vec![Term::Proved(ssubst(metavar_unconstrained(MetaVarId(0)), SVarId(0), symbol(SymId(0))))]
    );

    // A conclusion s-fresh in the substituted variable passes through.
    let fresh = crate::pattern::metavar_s_fresh(MetaVarId(0), SVarId(0), vec![], vec![]);
    let mut m = Machine::new();
    m.stack.push(Term::Proved(fresh.clone()));
    m.stack.push(Term::Pattern(symbol(SymId(0))));
    run(&mut m, &[cmd::SUBSTITUTION, 0], Phase::Proof);
    assert_eq!(m.stack, vec![Term::Proved(fresh)]);

    // And a concrete conclusion is rejected outright.
    let mut m = Machine::new();
    m.stack.push(Term::Proved(symbol(SymId(1))));
    m.stack.push(Term::Pattern(symbol(SymId(0))));
    assert_eq!(
      m.execute(&[cmd::SUBSTITUTION, 0], Phase::Proof),
      Err(VerifyError::SubstOnConcreteTerm)
    );
  }

  #[test]
  fn save_copies_rather_than_aliases() {
    let mut m = Machine::new();
    run(&mut m, &[cmd::SYMBOL, 5, cmd::SAVE, cmd::POP, cmd::LOAD, 0], Phase::Proof);
    assert_eq!(m.stack, vec![Term::Pattern(symbol(SymId(5)))]);
    assert_eq!(m.memory, vec![Entry::Pattern(symbol(SymId(5)))]);
  }
}
