use mlb_parser::{cmd, EVarId, Inst, InstIter, MetaVarConstraints, MetaVarId, SVarId, SymId};

/// Decode a whole proof stream the way a checker drives the cursor.
#[test]
fn decode_a_realistic_stream() {
  #[rustfmt::skip]
  let stream = [
    cmd::META_VAR, 0, 0, 0, 0, 0, 0,
    cmd::SAVE,
    cmd::LOAD, 0,
    cmd::IMPLICATION,
    cmd::PROP2,
    cmd::INSTANTIATE, 2, 1, 2,
    cmd::MODUS_PONENS,
    cmd::SYMBOL, 9,
    cmd::EXISTS, 1,
    cmd::MU, 2,
    cmd::ESUBST, 3,
    cmd::SSUBST, 4,
    cmd::SUBSTITUTION, 5,
    cmd::PUBLISH,
    cmd::NO_OP,
  ];
  let mut it = InstIter::new(&stream);
  let mut insts = vec![];
  while let Some(inst) = it.next_inst().expect("the stream is well-formed") {
    insts.push(inst);
  }
  assert_eq!(
    insts,
    vec![
      Inst::MetaVar(MetaVarId(0), MetaVarConstraints::default()),
      Inst::Save,
      Inst::Load(0),
      Inst::Implication,
      Inst::Prop2,
      Inst::Instantiate(vec![MetaVarId(1), MetaVarId(2)]),
      Inst::ModusPonens,
      Inst::Symbol(SymId(9)),
      Inst::Exists(EVarId(1)),
      Inst::Mu(SVarId(2)),
      Inst::ESubst(EVarId(3)),
      Inst::SSubst(SVarId(4)),
      Inst::Substitution(SVarId(5)),
      Inst::Publish,
    ]
  );
}

/// Every assigned opcode decodes; every hole in the numbering is an
/// error.
#[test]
fn opcode_space_is_exact() {
  for opcode in 0u8..=255 {
    let stream = [opcode, 0, 0, 0, 0, 0, 0];
    let result = InstIter::new(&stream).next_inst();
    let assigned = (2..=30).contains(&opcode) || opcode == cmd::CLEAN_META_VAR;
    if assigned {
      assert!(matches!(result, Ok(Some(_))), "opcode {opcode}: {result:?}");
    } else if opcode == cmd::NO_OP {
      assert_eq!(result, Ok(None));
    } else {
      assert!(result.is_err(), "opcode {opcode}: {result:?}");
    }
  }
}
