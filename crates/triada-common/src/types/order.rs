//! Component orders for sorted triple sequences.

use std::cmp::Ordering;
use std::fmt;

use super::{Id, TripleId, TripleRole};

/// The component order of a sorted triples sequence.
///
/// An order names which triple component is compared first, second and
/// third. Compact triples forms store their elements in the lexicographic
/// sequence induced by one of the six permutations; `Unknown` marks a
/// mutable list that has not been sorted yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Order {
    /// No defined order (unsorted building form).
    #[default]
    Unknown = 0,
    /// Subject, predicate, object. The canonical default.
    Spo = 1,
    /// Subject, object, predicate.
    Sop = 2,
    /// Predicate, subject, object.
    Pso = 3,
    /// Predicate, object, subject.
    Pos = 4,
    /// Object, subject, predicate.
    Osp = 5,
    /// Object, predicate, subject.
    Ops = 6,
}

impl Order {
    /// All six defined orders.
    pub const DEFINED: [Order; 6] =
        [Order::Spo, Order::Sop, Order::Pso, Order::Pos, Order::Osp, Order::Ops];

    /// Parses an order name, yielding `Unknown` for anything unrecognized.
    #[must_use]
    pub fn parse(name: &str) -> Order {
        match name {
            "SPO" => Order::Spo,
            "SOP" => Order::Sop,
            "PSO" => Order::Pso,
            "POS" => Order::Pos,
            "OSP" => Order::Osp,
            "OPS" => Order::Ops,
            _ => Order::Unknown,
        }
    }

    /// The roles in comparison position, first to third.
    ///
    /// `Unknown` maps to the SPO permutation so that comparison helpers
    /// stay total; callers that care must check for `Unknown` themselves.
    #[must_use]
    pub fn components(self) -> [TripleRole; 3] {
        use TripleRole::{Object, Predicate, Subject};
        match self {
            Order::Unknown | Order::Spo => [Subject, Predicate, Object],
            Order::Sop => [Subject, Object, Predicate],
            Order::Pso => [Predicate, Subject, Object],
            Order::Pos => [Predicate, Object, Subject],
            Order::Osp => [Object, Subject, Predicate],
            Order::Ops => [Object, Predicate, Subject],
        }
    }

    /// Permutes a triple into native coordinates `(a, b, c)` under this
    /// order. Wildcard components stay 0.
    #[must_use]
    pub fn encode(self, t: &TripleId) -> (Id, Id, Id) {
        let pick = |role: TripleRole| match role {
            TripleRole::Subject => t.subject,
            TripleRole::Predicate => t.predicate,
            TripleRole::Object => t.object,
        };
        let [f, s, th] = self.components();
        (pick(f), pick(s), pick(th))
    }

    /// Reassembles native coordinates `(a, b, c)` into an SPO triple.
    #[must_use]
    pub fn decode(self, a: Id, b: Id, c: Id) -> TripleId {
        let mut t = TripleId::default();
        let coords = [a, b, c];
        for (role, value) in self.components().into_iter().zip(coords) {
            match role {
                TripleRole::Subject => t.subject = value,
                TripleRole::Predicate => t.predicate = value,
                TripleRole::Object => t.object = value,
            }
        }
        t
    }

    /// Lexicographic comparison of two triples under this order.
    #[must_use]
    pub fn cmp_triples(self, x: &TripleId, y: &TripleId) -> Ordering {
        self.encode(x).cmp(&self.encode(y))
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Order::Unknown => "Unknown",
            Order::Spo => "SPO",
            Order::Sop => "SOP",
            Order::Pso => "PSO",
            Order::Pos => "POS",
            Order::Osp => "OSP",
            Order::Ops => "OPS",
        };
        f.write_str(name)
    }
}
