// Copyright 2025 Chisomo Makombo Sakala
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Post-coordinated expression construction.
//!
//! Each input triple becomes one equivalence axiom defining a fresh synthetic
//! concept as the base concept refined by a role group of finding site and
//! associated morphology.
use std::fmt;

/// Namespace of the SNOMED CT OWL distribution.
pub const SNOMED_IRI: &str = "http://www.ihtsdo.org/";

/// Role group property.
pub const ROLE_GROUP: &str = "RoleGroup";

/// `363698007 |Finding site|`.
pub const FINDING_SITE: &str = "363698007";

/// `116676008 |Associated morphology|`.
pub const ASSOCIATED_MORPHOLOGY: &str = "116676008";

/// Prefix of the generated concept names.
pub const SYNTHETIC_PREFIX: &str = "exp";

/// One `base, body structure, morphology` line from the triples file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
  pub base_concept: String,
  pub body_structure: String,
  pub morphology: String,
}

impl Triple {
  /// Parses a tab-separated line. Returns `None` when fewer than three
  /// non-empty fields are present; trailing fields are ignored.
  pub fn parse(line: &str) -> Option<Self> {
    let mut fields = line.trim_end_matches(['\r', '\n']).split('\t');
    let mut next = || fields.next().map(str::trim).filter(|f| !f.is_empty());

    let base_concept = next()?.to_string();
    let body_structure = next()?.to_string();
    let morphology = next()?.to_string();

    Some(Triple {
      base_concept,
      body_structure,
      morphology,
    })
  }
}

/// A named entity reference rendered as a full IRI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Iri(String);

impl Iri {
  pub fn new(iri: impl Into<String>) -> Self {
    Iri(iri.into())
  }

  /// `http://www.ihtsdo.org/SCT_<id>`
  pub fn sct(id: &str) -> Self {
    Iri(format!("{SNOMED_IRI}SCT_{id}"))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for Iri {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "<{}>", self.0)
  }
}

/// The subset of OWL class expressions the benchmark generates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassExpression {
  Class(Iri),
  Intersection(Vec<ClassExpression>),
  SomeValuesFrom {
    property: Iri,
    filler: Box<ClassExpression>,
  },
}

impl ClassExpression {
  fn some(property: Iri, filler: ClassExpression) -> Self {
    ClassExpression::SomeValuesFrom {
      property,
      filler: Box::new(filler),
    }
  }
}

impl fmt::Display for ClassExpression {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ClassExpression::Class(iri) => write!(f, "{iri}"),
      ClassExpression::Intersection(operands) => {
        f.write_str("ObjectIntersectionOf(")?;
        for (idx, operand) in operands.iter().enumerate() {
          if idx > 0 {
            f.write_str(" ")?;
          }
          write!(f, "{operand}")?;
        }
        f.write_str(")")
      }
      ClassExpression::SomeValuesFrom { property, filler } => {
        write!(f, "ObjectSomeValuesFrom({property} {filler})")
      }
    }
  }
}

/// Axiom kinds counted towards the ontology size metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxiomKind {
  SubClassOf,
  EquivalentClasses,
}

impl AxiomKind {
  pub fn as_str(self) -> &'static str {
    match self {
      AxiomKind::SubClassOf => "SubClassOf",
      AxiomKind::EquivalentClasses => "EquivalentClasses",
    }
  }
}

/// `EquivalentClasses(<name> <definition>)`, rendered in OWL functional syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquivalenceAxiom {
  pub name: Iri,
  pub definition: ClassExpression,
}

impl EquivalenceAxiom {
  pub fn kind(&self) -> AxiomKind {
    AxiomKind::EquivalentClasses
  }
}

impl fmt::Display for EquivalenceAxiom {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "EquivalentClasses({} {})", self.name, self.definition)
  }
}

/// Builds the expression axioms for one run.
///
/// The builder holds no ontology state: it only returns axioms, and the
/// driver decides when to apply them.
#[derive(Debug, Clone, Copy)]
pub struct ExpressionBuilder {
  jump_size: u64,
}

impl ExpressionBuilder {
  pub fn new(jump_size: u64) -> Self {
    ExpressionBuilder { jump_size }
  }

  /// Name of the concept generated for line `offset` of iteration `iteration`.
  ///
  /// `offset` is always below `jump_size`, so `iteration * jump_size + offset`
  /// never repeats within a run.
  pub fn synthetic_name(&self, iteration: u64, offset: u64) -> Iri {
    Iri::new(format!(
      "{SYNTHETIC_PREFIX}{}",
      iteration * self.jump_size + offset
    ))
  }

  /// `exp ≡ Base ⊓ ∃RoleGroup.(∃FindingSite.Body ⊓ ∃AssociatedMorphology.Morph)`
  pub fn build(&self, triple: &Triple, iteration: u64, offset: u64) -> EquivalenceAxiom {
    let group = ClassExpression::Intersection(vec![
      ClassExpression::some(
        Iri::sct(FINDING_SITE),
        ClassExpression::Class(Iri::sct(&triple.body_structure)),
      ),
      ClassExpression::some(
        Iri::sct(ASSOCIATED_MORPHOLOGY),
        ClassExpression::Class(Iri::sct(&triple.morphology)),
      ),
    ]);

    let definition = ClassExpression::Intersection(vec![
      ClassExpression::Class(Iri::sct(&triple.base_concept)),
      ClassExpression::some(Iri::new(format!("{SNOMED_IRI}{ROLE_GROUP}")), group),
    ]);

    EquivalenceAxiom {
      name: self.synthetic_name(iteration, offset),
      definition,
    }
  }
}
