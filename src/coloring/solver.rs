use crate::sat::cnf::{self, Clause, Cnf, Literal};
use crate::sat::dimacs;
use crate::sat::gateway::{GatewayError, SatSolver, Verdict};
use rustc_hash::FxHashSet;
use std::fmt::Display;
use std::path::Path;
use tracing::debug;

/// The closed three-colour palette. The declaration order is the palette
/// order the variable numbering depends on, so it must never be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    Red,
    Green,
    Blue,
}

impl Color {
    /// Every palette member, in palette order.
    pub const ALL: [Self; 3] = [Self::Red, Self::Green, Self::Blue];

    /// Number of colours in the palette.
    pub const COUNT: usize = Self::ALL.len();

    /// One-based palette index used by the variable numbering.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Red => 1,
            Self::Green => 2,
            Self::Blue => 3,
        }
    }

    /// Inverse of [`Color::index`]. Indices outside `[1, 3]` are a caller
    /// contract violation.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        match index {
            1 => Self::Red,
            2 => Self::Green,
            _ => Self::Blue,
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Red => write!(f, "R"),
            Self::Green => write!(f, "G"),
            Self::Blue => write!(f, "B"),
        }
    }
}

/// An undirected graph over contiguous zero-based vertex indices.
///
/// Edges are normalized to `(min, max)` and deduplicated, so the clause count
/// derived from `edges().len()` matches the DIMACS header exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    num_vertices: usize,
    edges: Vec<(usize, usize)>,
}

impl Graph {
    #[must_use]
    pub fn new(num_vertices: usize, edges: &[(usize, usize)]) -> Self {
        let mut seen = FxHashSet::default();
        let mut normalized = Vec::with_capacity(edges.len());
        for &(u, v) in edges {
            debug_assert!(u < num_vertices && v < num_vertices && u != v);
            let edge = (u.min(v), u.max(v));
            if seen.insert(edge) {
                normalized.push(edge);
            }
        }
        Self {
            num_vertices,
            edges: normalized,
        }
    }

    /// The standard Petersen graph: an outer 5-cycle, an inner pentagram and
    /// five spokes joining them; 10 vertices, 15 edges, known 3-colourable.
    #[must_use]
    pub fn petersen() -> Self {
        let mut edges = Vec::with_capacity(15);
        for i in 0..5 {
            edges.push((i, (i + 1) % 5));
            edges.push((i, i + 5));
            edges.push((5 + i, 5 + (i + 2) % 5));
        }
        Self::new(10, &edges)
    }

    #[must_use]
    pub const fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    #[must_use]
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Builds the clause base whose models are exactly the proper
    /// 3-colourings: per vertex an exactly-one group over its colour
    /// variables, and per edge and colour a conflict clause forbidding both
    /// endpoints that colour.
    #[must_use]
    pub fn to_cnf(&self) -> Cnf {
        let mut clauses = vec![];

        for vertex in 0..self.num_vertices {
            let vars: Vec<Literal> = Color::ALL
                .iter()
                .map(|&color| Variable::new(vertex, color).literal())
                .collect();
            clauses.extend(cnf::exactly_one(&vars));
        }

        for &(u, v) in &self.edges {
            for color in Color::ALL {
                clauses.push(Clause::from_slice(&[
                    -Variable::new(u, color).literal(),
                    -Variable::new(v, color).literal(),
                ]));
            }
        }

        Cnf::new(self.num_vertices * Color::COUNT, clauses)
    }

    /// Reconstructs the colour assignment from a satisfying model by
    /// inverting the variable numbering over its positive literals.
    #[must_use]
    pub fn decode_model(&self, model: &[Literal]) -> Vec<Color> {
        let mut colors = vec![Color::Red; self.num_vertices];
        for &lit in model.iter().filter(|&&lit| lit > 0) {
            let var = Variable::decode(lit.unsigned_abs() as usize);
            colors[var.vertex] = var.color;
        }
        colors
    }

    /// Encodes the graph, hands the DIMACS file to the solver and decodes the
    /// model. `Ok(None)` means no proper 3-colouring exists.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] when the CNF file cannot be written or the
    /// solver cannot produce a verdict.
    pub fn solve(
        &self,
        solver: &dyn SatSolver,
        cnf_path: &Path,
    ) -> Result<Option<Vec<Color>>, GatewayError> {
        let cnf = self.to_cnf();
        debug!(
            num_vars = cnf.num_vars,
            num_clauses = cnf.len(),
            "encoded graph"
        );
        dimacs::write_file(&cnf, cnf_path)?;

        match solver.solve(cnf_path)? {
            Verdict::Satisfiable(model) => Ok(Some(self.decode_model(&model))),
            Verdict::Unsatisfiable => Ok(None),
        }
    }
}

/// One problem-domain atom: "vertex carries colour".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variable {
    pub vertex: usize,
    pub color: Color,
}

impl Variable {
    #[must_use]
    pub const fn new(vertex: usize, color: Color) -> Self {
        Self { vertex, color }
    }

    /// Maps the atom onto its CNF variable, a bijection onto
    /// `[1, 3 * num_vertices]`.
    #[must_use]
    pub const fn encode(self) -> usize {
        self.vertex * Color::COUNT + self.color.index()
    }

    /// Exact algebraic inverse of [`Variable::encode`].
    #[must_use]
    pub const fn decode(var: usize) -> Self {
        let offset = var - 1;
        Self {
            vertex: offset / Color::COUNT,
            color: Color::from_index(offset % Color::COUNT + 1),
        }
    }

    fn literal(self) -> Literal {
        i32::try_from(self.encode()).expect("variable exceeds literal range")
    }
}
