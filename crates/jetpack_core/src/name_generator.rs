use std::fmt::Debug;

use phf::{phf_set, Set};
use rustc_hash::FxHashSet;
use swc_core::ecma::atoms::Atom;

pub static RESERVED_NAMES: Set<&'static str> = phf_set! {
    "arguments",
    "await",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "eval",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "interface",
    "let",
    "NaN",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "static",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "undefined",
    "var",
    "void",
    "while",
    "with",
    "yield",
};

pub fn is_reserved_name(name: &str) -> bool {
  RESERVED_NAMES.contains(name)
}

/// Hands out identifiers that are unique among everything it, or a generator it is chained to,
/// has seen.
pub trait NameGenerator: Debug + Send + Sync {
  /// `None` means `original` is free and has been taken as is.
  fn next(&mut self, original: &Atom) -> Option<Atom>;

  fn is_name_used(&self, name: &Atom) -> bool;
}

/// Names nobody may take: globals referenced without a declaration, and in readable mode the
/// names declared in nested scopes.
#[derive(Debug, Default)]
pub struct UnresolvedNameCollector {
  used_names: FxHashSet<Atom>,
}

impl UnresolvedNameCollector {
  pub fn insert_all<'a>(&mut self, names: impl IntoIterator<Item = &'a Atom>) {
    self.used_names.extend(names.into_iter().cloned());
  }

  pub fn len(&self) -> usize {
    self.used_names.len()
  }

  pub fn is_empty(&self) -> bool {
    self.used_names.is_empty()
  }
}

impl NameGenerator for UnresolvedNameCollector {
  fn next(&mut self, _original: &Atom) -> Option<Atom> {
    None
  }

  fn is_name_used(&self, name: &Atom) -> bool {
    self.used_names.contains(name)
  }
}

/// Keeps names as written and appends `_0`, `_1`... on collisions.
#[derive(Debug, Default)]
pub struct ReadableNameGenerator {
  used_names: FxHashSet<Atom>,
  counter: u32,
  prev: Option<Box<dyn NameGenerator>>,
}

impl ReadableNameGenerator {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_prev(prev: Box<dyn NameGenerator>) -> Self {
    Self {
      prev: Some(prev),
      ..Default::default()
    }
  }
}

impl NameGenerator for ReadableNameGenerator {
  fn next(&mut self, original: &Atom) -> Option<Atom> {
    if !self.is_name_used(original) {
      self.used_names.insert(original.clone());
      return None;
    }
    loop {
      let candidate: Atom = format!("{}_{}", original, self.counter).into();
      self.counter += 1;
      if !self.is_name_used(&candidate) {
        self.used_names.insert(candidate.clone());
        return Some(candidate);
      }
    }
  }

  fn is_name_used(&self, name: &Atom) -> bool {
    is_reserved_name(name)
      || self.used_names.contains(name)
      || self.prev.as_ref().map_or(false, |prev| prev.is_name_used(name))
  }
}

const FIRST_CHAR_CANDIDATES: &[u8] = b"qwertyuiopasdfghjklzxcvbnmQWERTYUIOPASDFGHJKLZXCVBNM_$";
const CHAR_CANDIDATES: &[u8] = b"1234567890qwertyuiopasdfghjklzxcvbnmQWERTYUIOPASDFGHJKLZXCVBNM_$";

/// Produces the shortest names first: `q`, `w`, `e`... then two characters and so on. The
/// requested name is ignored.
#[derive(Debug, Default)]
pub struct MinifyNameGenerator {
  used_names: FxHashSet<Atom>,
  counter: u32,
  prev: Option<Box<dyn NameGenerator>>,
}

impl MinifyNameGenerator {
  pub fn new() -> Self {
    Self::default()
  }

  /// Continues after every generator in `generators`: the counter is their maximum and their
  /// used names are kept.
  pub fn merge(generators: impl IntoIterator<Item = MinifyNameGenerator>) -> Self {
    generators
      .into_iter()
      .fold(Self::default(), |mut merged, generator| {
        merged.counter = merged.counter.max(generator.counter);
        merged.used_names.extend(generator.used_names);
        merged
      })
  }

  pub fn with_prev(mut self, prev: Box<dyn NameGenerator>) -> Self {
    self.prev = Some(prev);
    self
  }

  /// Marks `names` as taken without issuing them.
  pub fn reserve<'a>(&mut self, names: impl IntoIterator<Item = &'a Atom>) {
    self.used_names.extend(names.into_iter().cloned());
  }

  fn gen_name(&mut self) -> Atom {
    let mut name = String::new();
    let mut value = self.counter as usize;
    name.push(FIRST_CHAR_CANDIDATES[value % FIRST_CHAR_CANDIDATES.len()] as char);
    value /= FIRST_CHAR_CANDIDATES.len();
    while value > 0 {
      name.push(CHAR_CANDIDATES[value % CHAR_CANDIDATES.len()] as char);
      value /= CHAR_CANDIDATES.len();
    }
    self.counter += 1;
    name.into()
  }
}

impl NameGenerator for MinifyNameGenerator {
  fn next(&mut self, _original: &Atom) -> Option<Atom> {
    loop {
      let name = self.gen_name();
      if !self.is_name_used(&name) {
        self.used_names.insert(name.clone());
        return Some(name);
      }
    }
  }

  fn is_name_used(&self, name: &Atom) -> bool {
    is_reserved_name(name)
      || self.used_names.contains(name)
      || self.prev.as_ref().map_or(false, |prev| prev.is_name_used(name))
  }
}
