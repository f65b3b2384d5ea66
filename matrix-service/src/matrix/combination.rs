// Matrix Combinations
// Generates and counts the ordered combination set of a matrix

use crate::parser::models::Param;

use serde::Serialize;

/// One concrete assignment of a value to every matrix param
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Combination {
    /// Position in generation order, as an unpadded decimal string
    pub id: String,
    /// One string param per matrix param, in matrix declaration order
    pub params: Vec<Param>,
}

impl Combination {
    fn new(id: usize, mut params: Vec<Param>, name: &str, value: &str) -> Self {
        params.push(Param::string(name, value));
        Self {
            id: id.to_string(),
            params,
        }
    }

    /// Value assigned to the named matrix param
    pub fn value(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .and_then(|p| p.value.as_str())
    }
}

/// Builds the full ordered combination set of a matrix
pub struct CombinationGenerator;

impl CombinationGenerator {
    /// Generate every combination of the matrix.
    ///
    /// Params are distributed in declaration order. For each later param its
    /// values form the outer loop and the combinations built so far the inner
    /// loop, so earlier params vary fastest. Ids are assigned 0.. in that
    /// order, which keeps them stable across repeated calls.
    ///
    /// An empty matrix yields no combinations. A param with no values
    /// annihilates the set.
    pub fn generate(matrix: &[Param]) -> Vec<Combination> {
        let Some((first, rest)) = matrix.split_first() else {
            return Vec::new();
        };

        let mut combinations: Vec<Combination> = first
            .matrix_values()
            .iter()
            .enumerate()
            .map(|(i, value)| Combination::new(i, Vec::new(), &first.name, value))
            .collect();

        for param in rest {
            combinations = Self::distribute_param(param, &combinations);
        }

        combinations
    }

    fn distribute_param(param: &Param, existing: &[Combination]) -> Vec<Combination> {
        let values = param.matrix_values();
        let mut expanded = Vec::with_capacity(values.len() * existing.len());

        for value in values {
            for combination in existing {
                let id = expanded.len();
                expanded.push(Combination::new(
                    id,
                    combination.params.clone(),
                    &param.name,
                    value,
                ));
            }
        }

        expanded
    }
}

/// Computes the size of a matrix's combination set without building it
pub struct CombinationCounter;

impl CombinationCounter {
    /// Product of the value counts of every matrix param, or 0 for an empty
    /// matrix. Saturates at `usize::MAX` instead of overflowing.
    pub fn count(matrix: &[Param]) -> usize {
        if matrix.is_empty() {
            return 0;
        }

        matrix
            .iter()
            .fold(1usize, |acc, param| acc.saturating_mul(param.matrix_values().len()))
    }
}
