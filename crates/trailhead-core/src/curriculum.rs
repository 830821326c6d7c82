use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Stable identifier of a concept in the curriculum table.
///
/// Ids are assigned by the curriculum author and never change at runtime; the
/// stock tables simply number concepts in listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptId(pub u32);

impl std::fmt::Display for ConceptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ConceptId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// One concept as supplied by the curriculum table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptSpec {
    pub id: ConceptId,
    pub name: String,
    /// Concepts that must be known before this one becomes reachable, in the
    /// author's listing order.
    #[serde(default)]
    pub prereqs: Vec<ConceptId>,
}

/// The static curriculum table, as deserialized from JSON.
///
/// ```json
/// {
///   "concepts": [
///     { "id": 0, "name": "Numbers" },
///     { "id": 1, "name": "Addition", "prereqs": [0] }
///   ],
///   "initiallyKnown": [0]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurriculumSpec {
    pub concepts: Vec<ConceptSpec>,
    /// Concepts the learner starts out knowing. When omitted, the first
    /// listed concept is the entry point (the pathway sims always seed one).
    #[serde(default)]
    pub initially_known: Vec<ConceptId>,
}

/// A validated concept plus its derived layer depth.
#[derive(Debug, Clone)]
pub struct Concept {
    pub id: ConceptId,
    pub name: String,
    pub prereqs: Vec<ConceptId>,
    /// Longest-path distance from a root: `0` for a concept with no prereqs,
    /// else `1 + max(depth(p))` over its prereqs. Drives the layering bias
    /// of the layout simulation and nothing else.
    pub depth: u32,
}

/// The validated prerequisite DAG: concept table plus derived structure
/// (edge list, layer depths) that never changes for the life of a session.
#[derive(Debug, Clone)]
pub struct Curriculum {
    concepts: Vec<Concept>,
    index: FxHashMap<ConceptId, usize>,
    edges: Vec<(ConceptId, ConceptId)>,
    initially_known: Vec<ConceptId>,
    max_depth: u32,
}

impl Curriculum {
    /// Validates a table and derives depths and the edge list.
    ///
    /// Rejects duplicate ids, prereq references to absent concepts, and
    /// prerequisite cycles. Cycle detection exists so depth computation is
    /// total; a well-formed table behaves exactly as an assumed DAG would.
    pub fn new(spec: CurriculumSpec) -> Result<Self> {
        if spec.concepts.is_empty() {
            return Err(Error::EmptyCurriculum);
        }

        let mut index: FxHashMap<ConceptId, usize> = FxHashMap::default();
        for (i, c) in spec.concepts.iter().enumerate() {
            if index.insert(c.id, i).is_some() {
                return Err(Error::DuplicateId { id: c.id.0 });
            }
        }

        for c in &spec.concepts {
            for p in &c.prereqs {
                if *p == c.id {
                    return Err(Error::SelfPrereq { concept: c.id.0 });
                }
                if !index.contains_key(p) {
                    return Err(Error::UnknownPrereq {
                        concept: c.id.0,
                        prereq: p.0,
                    });
                }
            }
        }

        let depths = compute_depths(&spec.concepts, &index)?;
        let max_depth = depths.iter().copied().max().unwrap_or(0);

        // Edge list in table order: one `prereq -> concept` pair per listed
        // prerequisite. Nothing ever dedupes or reorders this.
        let mut edges: Vec<(ConceptId, ConceptId)> = Vec::new();
        for c in &spec.concepts {
            for p in &c.prereqs {
                edges.push((*p, c.id));
            }
        }

        let initially_known = if spec.initially_known.is_empty() {
            vec![spec.concepts[0].id]
        } else {
            for id in &spec.initially_known {
                if !index.contains_key(id) {
                    return Err(Error::UnknownInitiallyKnown { id: id.0 });
                }
            }
            spec.initially_known
        };

        let concepts = spec
            .concepts
            .into_iter()
            .zip(depths)
            .map(|(c, depth)| Concept {
                id: c.id,
                name: c.name,
                prereqs: c.prereqs,
                depth,
            })
            .collect();

        Ok(Self {
            concepts,
            index,
            edges,
            initially_known,
            max_depth,
        })
    }

    /// Parses and validates a curriculum from its JSON form.
    pub fn from_json(text: &str) -> Result<Self> {
        let spec: CurriculumSpec = serde_json::from_str(text)?;
        Self::new(spec)
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Concepts in table order. Table order is the canonical order for
    /// everything downstream (progress vectors, layout bodies, scenes).
    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    pub fn get(&self, id: ConceptId) -> Option<&Concept> {
        self.index.get(&id).map(|&i| &self.concepts[i])
    }

    /// Position of a concept in table order.
    pub fn index_of(&self, id: ConceptId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Derived `(prereq, concept)` pairs in table order.
    pub fn edges(&self) -> &[(ConceptId, ConceptId)] {
        &self.edges
    }

    pub fn initially_known(&self) -> &[ConceptId] {
        &self.initially_known
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }
}

/// Longest-path depths via a Kahn pass over prereq edges.
///
/// Iterative on purpose: a recursive `depth(n)` never returns on a cyclic
/// table, and this is the one place cycles can be caught cheaply.
fn compute_depths(
    concepts: &[ConceptSpec],
    index: &FxHashMap<ConceptId, usize>,
) -> Result<Vec<u32>> {
    let n = concepts.len();
    let mut remaining: Vec<usize> = concepts.iter().map(|c| c.prereqs.len()).collect();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (i, c) in concepts.iter().enumerate() {
        for p in &c.prereqs {
            dependents[index[p]].push(i);
        }
    }

    let mut depths = vec![0u32; n];
    let mut queue: std::collections::VecDeque<usize> =
        (0..n).filter(|&i| remaining[i] == 0).collect();
    let mut processed = 0usize;
    while let Some(i) = queue.pop_front() {
        processed += 1;
        for &d in &dependents[i] {
            depths[d] = depths[d].max(depths[i] + 1);
            remaining[d] -= 1;
            if remaining[d] == 0 {
                queue.push_back(d);
            }
        }
    }

    if processed < n {
        // Any concept with prereqs still outstanding sits on a cycle.
        let stuck = remaining
            .iter()
            .position(|&r| r > 0)
            .map(|i| concepts[i].id.0)
            .unwrap_or(0);
        return Err(Error::PrereqCycle { id: stuck });
    }

    Ok(depths)
}

/// The arithmetic table the stock pathway sim ships with.
///
/// `Numbers` feeds `Addition`, which feeds both `Subtraction` and
/// `Multiplication`; `Division` needs both of those; `Fractions`, `Decimals`
/// and `Percentages` hang off the back. Only `Numbers` starts known.
pub fn arithmetic_basics() -> Curriculum {
    fn concept(id: u32, name: &str, prereqs: &[u32]) -> ConceptSpec {
        ConceptSpec {
            id: ConceptId(id),
            name: name.to_string(),
            prereqs: prereqs.iter().copied().map(ConceptId).collect(),
        }
    }

    let spec = CurriculumSpec {
        concepts: vec![
            concept(0, "Numbers", &[]),
            concept(1, "Addition", &[0]),
            concept(2, "Subtraction", &[1]),
            concept(3, "Multiplication", &[1]),
            concept(4, "Division", &[2, 3]),
            concept(5, "Fractions", &[4]),
            concept(6, "Decimals", &[4]),
            concept(7, "Percentages", &[5, 6]),
        ],
        initially_known: Vec::new(),
    };

    // The stock table is a DAG by construction.
    Curriculum::new(spec).expect("builtin curriculum is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_of(table: &[(u32, &str, &[u32])]) -> CurriculumSpec {
        CurriculumSpec {
            concepts: table
                .iter()
                .map(|(id, name, prereqs)| ConceptSpec {
                    id: ConceptId(*id),
                    name: name.to_string(),
                    prereqs: prereqs.iter().copied().map(ConceptId).collect(),
                })
                .collect(),
            initially_known: Vec::new(),
        }
    }

    #[test]
    fn arithmetic_depths_follow_longest_paths() {
        let c = arithmetic_basics();
        let depth = |id: u32| c.get(ConceptId(id)).unwrap().depth;
        assert_eq!(depth(0), 0, "Numbers is a root");
        assert_eq!(depth(1), 1);
        assert_eq!(depth(2), 2);
        assert_eq!(depth(3), 2);
        assert_eq!(depth(4), 3, "Division sits below both of its prereqs");
        assert_eq!(depth(5), 4);
        assert_eq!(depth(6), 4);
        assert_eq!(depth(7), 5);
        assert_eq!(c.max_depth(), 5);
    }

    #[test]
    fn depth_is_longest_not_shortest_path() {
        // `d` is reachable from the root in one hop but its longest chain is
        // root -> a -> b -> d.
        let c = Curriculum::new(spec_of(&[
            (0, "root", &[]),
            (1, "a", &[0]),
            (2, "b", &[1]),
            (3, "d", &[0, 2]),
        ]))
        .unwrap();
        assert_eq!(c.get(ConceptId(3)).unwrap().depth, 3);
    }

    #[test]
    fn depth_assignment_covers_every_concept() {
        let c = arithmetic_basics();
        assert_eq!(c.concepts().len(), 8);
        for concept in c.concepts() {
            assert!(concept.depth <= c.max_depth());
        }
    }

    #[test]
    fn edges_follow_table_order() {
        let c = arithmetic_basics();
        assert_eq!(c.edges()[0], (ConceptId(0), ConceptId(1)));
        assert!(c.edges().contains(&(ConceptId(2), ConceptId(4))));
        assert!(c.edges().contains(&(ConceptId(3), ConceptId(4))));
        let prereq_count: usize = c.concepts().iter().map(|n| n.prereqs.len()).sum();
        assert_eq!(c.edges().len(), prereq_count);
    }

    #[test]
    fn empty_table_is_rejected() {
        let err = Curriculum::new(CurriculumSpec::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyCurriculum));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Curriculum::new(spec_of(&[(0, "a", &[]), (0, "b", &[])])).unwrap_err();
        assert!(matches!(err, Error::DuplicateId { id: 0 }));
    }

    #[test]
    fn unknown_prereq_is_rejected() {
        let err = Curriculum::new(spec_of(&[(0, "a", &[]), (1, "b", &[9])])).unwrap_err();
        assert!(matches!(err, Error::UnknownPrereq { concept: 1, prereq: 9 }));
    }

    #[test]
    fn self_prereq_is_rejected() {
        let err = Curriculum::new(spec_of(&[(0, "a", &[0])])).unwrap_err();
        assert!(matches!(err, Error::SelfPrereq { concept: 0 }));
    }

    #[test]
    fn cycle_is_rejected_not_looped_on() {
        let err = Curriculum::new(spec_of(&[
            (0, "root", &[]),
            (1, "a", &[2]),
            (2, "b", &[1]),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::PrereqCycle { .. }));
    }

    #[test]
    fn initially_known_defaults_to_first_listed_concept() {
        let c = arithmetic_basics();
        assert_eq!(c.initially_known(), &[ConceptId(0)]);
    }

    #[test]
    fn initially_known_with_unknown_id_is_rejected() {
        let mut spec = spec_of(&[(0, "a", &[])]);
        spec.initially_known = vec![ConceptId(7)];
        let err = Curriculum::new(spec).unwrap_err();
        assert!(matches!(err, Error::UnknownInitiallyKnown { id: 7 }));
    }

    #[test]
    fn from_json_accepts_camel_case_table() {
        let c = Curriculum::from_json(
            r#"{
                "concepts": [
                    { "id": 0, "name": "Numbers" },
                    { "id": 1, "name": "Addition", "prereqs": [0] }
                ],
                "initiallyKnown": [0]
            }"#,
        )
        .unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c.get(ConceptId(1)).unwrap().prereqs, vec![ConceptId(0)]);
        assert_eq!(c.get(ConceptId(1)).unwrap().depth, 1);
    }

    #[test]
    fn from_json_surfaces_parse_errors() {
        let err = Curriculum::from_json("{ not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
