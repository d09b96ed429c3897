//! Dense Gauss-Jordan elimination for the flow system.

use super::system::Equation;

/// Relative magnitude below which a pivot candidate counts as zero.
const PIVOT_TOLERANCE: f64 = 1e-9;

/// Result of reducing a system.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Exactly one solution
    Unique(Vec<f64>),
    /// No solution
    Inconsistent,
    /// Infinitely many solutions
    Underdetermined { free: usize },
}

/// Augmented matrix `[A | b]` stored row-major.
#[derive(Debug, Clone)]
pub struct AugmentedMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl AugmentedMatrix {
    /// Assemble the matrix of a set of equations over `num_vars` variables.
    pub fn new(equations: &[Equation], num_vars: usize) -> Self {
        let cols = num_vars;
        let mut data = vec![0.0; equations.len() * (cols + 1)];
        for (row, eq) in equations.iter().enumerate() {
            let base = row * (cols + 1);
            for &(var, coef) in &eq.terms {
                data[base + var] += coef;
            }
            data[base + cols] = eq.constant;
        }
        Self {
            rows: equations.len(),
            cols,
            data,
        }
    }

    fn at(&self, row: usize, col: usize) -> f64 {
        self.data[row * (self.cols + 1) + col]
    }

    fn rhs(&self, row: usize) -> f64 {
        self.at(row, self.cols)
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        let width = self.cols + 1;
        for j in 0..width {
            self.data.swap(a * width + j, b * width + j);
        }
    }

    /// Divide a row by a value.
    fn scale_row(&mut self, row: usize, divisor: f64) {
        let width = self.cols + 1;
        for value in &mut self.data[row * width..(row + 1) * width] {
            *value /= divisor;
        }
    }

    /// `target -= factor * source`
    fn eliminate(&mut self, target: usize, source: usize, factor: f64) {
        let width = self.cols + 1;
        for j in 0..width {
            let s = self.data[source * width + j];
            self.data[target * width + j] -= factor * s;
        }
    }

    /// Scale each row so its largest coefficient is 1 in magnitude.
    fn normalize_rows(&mut self) {
        for row in 0..self.rows {
            let max = (0..self.cols).map(|j| self.at(row, j).abs()).fold(0.0, f64::max);
            if max > 0.0 {
                self.scale_row(row, max);
            }
        }
    }

    /// Reduce to row echelon form and classify the solution set.
    pub fn solve(mut self) -> Outcome {
        let scale = (0..self.rows).map(|r| self.rhs(r).abs()).fold(1.0, f64::max);
        self.normalize_rows();

        let mut pivots: Vec<usize> = Vec::new();
        let mut pivot_row = 0;

        for col in 0..self.cols {
            if pivot_row == self.rows {
                break;
            }

            // Find pivot
            let mut max_val = self.at(pivot_row, col).abs();
            let mut max_row = pivot_row;
            for r in (pivot_row + 1)..self.rows {
                let val = self.at(r, col).abs();
                if val > max_val {
                    max_val = val;
                    max_row = r;
                }
            }
            if max_val < PIVOT_TOLERANCE {
                continue;
            }

            if max_row != pivot_row {
                self.swap_rows(pivot_row, max_row);
            }
            let pivot = self.at(pivot_row, col);
            self.scale_row(pivot_row, pivot);

            for r in 0..self.rows {
                if r != pivot_row {
                    let factor = self.at(r, col);
                    if factor != 0.0 {
                        self.eliminate(r, pivot_row, factor);
                    }
                }
            }

            pivots.push(col);
            pivot_row += 1;
        }

        let rank = pivots.len();
        let residual_tolerance = PIVOT_TOLERANCE * scale;
        if (rank..self.rows).any(|r| self.rhs(r).abs() > residual_tolerance) {
            return Outcome::Inconsistent;
        }
        if rank < self.cols {
            return Outcome::Underdetermined {
                free: self.cols - rank,
            };
        }

        let mut solution = vec![0.0; self.cols];
        for (row, &col) in pivots.iter().enumerate() {
            solution[col] = self.rhs(row);
        }
        Outcome::Unique(solution)
    }
}

/// Solve a system of equations over `num_vars` variables.
pub fn solve(equations: &[Equation], num_vars: usize) -> Outcome {
    AugmentedMatrix::new(equations, num_vars).solve()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unique_solution() {
        // v0 = 4, v0 - 2 v1 = 0, v1 - v2 = 0
        let eqs = vec![
            Equation::pin(0, 4.0),
            Equation::ratio(0, 1, 2.0),
            Equation::ratio(1, 2, 1.0),
        ];
        match solve(&eqs, 3) {
            Outcome::Unique(x) => {
                assert_relative_eq!(x[0], 4.0);
                assert_relative_eq!(x[1], 2.0);
                assert_relative_eq!(x[2], 2.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_redundant_rows_are_fine() {
        let eqs = vec![
            Equation::pin(0, 3.0),
            Equation::sum(0, &[1, 2]),
            Equation::pin(1, 1.0),
            Equation::pin(2, 2.0),
        ];
        assert_eq!(solve(&eqs, 3), Outcome::Unique(vec![3.0, 1.0, 2.0]));
    }

    #[test]
    fn test_inconsistent() {
        let eqs = vec![Equation::pin(0, 1.0), Equation::ratio(0, 1, 1.0), Equation::pin(1, 2.0)];
        assert_eq!(solve(&eqs, 2), Outcome::Inconsistent);
    }

    #[test]
    fn test_underdetermined() {
        let eqs = vec![Equation::sum(0, &[1, 2]), Equation::pin(0, 5.0)];
        assert_eq!(solve(&eqs, 3), Outcome::Underdetermined { free: 1 });
    }

    #[test]
    fn test_large_magnitudes() {
        let eqs = vec![Equation::pin(0, 2.4e7), Equation::ratio(0, 1, 1e-4)];
        match solve(&eqs, 2) {
            Outcome::Unique(x) => assert_relative_eq!(x[1], 2.4e11, max_relative = 1e-12),
            other => panic!("unexpected {other:?}"),
        }
    }
}
