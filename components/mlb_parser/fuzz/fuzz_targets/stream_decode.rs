#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate mlb_parser;

fuzz_target!(|data: &[u8]| {
  let mut it = mlb_parser::InstIter::new(mlb_parser::stream_contents(data));
  loop {
    match it.next_inst() {
      Ok(Some(_)) => {}
      Ok(None) | Err(_) => break,
    }
  }
});
