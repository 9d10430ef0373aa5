use crate::errors::LabCryptoError;
use crate::ring::{Matrix, Ring, Vector};

/// Checks that `matrix` is square and returns its order.
fn square_order(matrix: &Matrix) -> Result<usize, LabCryptoError> {
    let n = matrix.len();
    for (i, row) in matrix.iter().enumerate() {
        if row.len() != n {
            return Err(LabCryptoError::DimensionMismatch(format!(
                "Row {} has length {} but expected {}",
                i,
                row.len(),
                n
            )));
        }
    }
    Ok(n)
}

/// Computes `det(matrix) mod m` by cofactor expansion along the first row.
///
/// Intended for the 2×2 and 3×3 systems of the key-recovery code, where
/// expansion is cheaper than elimination and needs no invertible pivots
/// (the modulus is an alphabet size and usually composite).
///
/// # Errors
///
/// Returns `LabCryptoError::DimensionMismatch` if the matrix is not square.
pub fn determinant(matrix: &Matrix, ring: &Ring) -> Result<i64, LabCryptoError> {
    let n = square_order(matrix)?;
    Ok(det_unchecked(matrix, n, ring))
}

fn det_unchecked(matrix: &Matrix, n: usize, ring: &Ring) -> i64 {
    match n {
        0 => ring.normalize(1),
        1 => ring.normalize(matrix[0][0]),
        2 => ring.sub(
            ring.mul(matrix[0][0], matrix[1][1]),
            ring.mul(matrix[0][1], matrix[1][0]),
        ),
        _ => {
            let mut det = 0;
            for col in 0..n {
                let minor: Matrix = matrix[1..]
                    .iter()
                    .map(|row| {
                        row.iter()
                            .enumerate()
                            .filter(|&(j, _)| j != col)
                            .map(|(_, &v)| v)
                            .collect()
                    })
                    .collect();
                let term = ring.mul(matrix[0][col], det_unchecked(&minor, n - 1, ring));
                det = if col % 2 == 0 {
                    ring.add(det, term)
                } else {
                    ring.sub(det, term)
                };
            }
            det
        }
    }
}

/// Copy of `matrix` with column `col` replaced by `values`.
fn replace_column(matrix: &Matrix, col: usize, values: &Vector) -> Matrix {
    matrix
        .iter()
        .zip(values)
        .map(|(row, &v)| {
            let mut row = row.clone();
            row[col] = v;
            row
        })
        .collect()
}

/// Solves `A·x ≡ b (mod m)` with Cramer's rule.
///
/// The solution is unique exactly when `det(A)` is a unit of the ring.
///
/// # Errors
///
/// * `DimensionMismatch` if `A` is not square or `b` has the wrong length.
/// * `NoInverse` if `det(A)` shares a factor with the modulus.
///
/// # Example
///
/// ```
/// # use lab_crypto::ring::{Ring, matrix_ops::cramer_solve};
/// let ring = Ring::try_with(26).unwrap();
/// // x + y = 8, x + 2y = 11  ->  x = 5, y = 3
/// let x = cramer_solve(&vec![vec![1, 1], vec![1, 2]], &vec![8, 11], &ring).unwrap();
/// assert_eq!(x, vec![5, 3]);
/// ```
pub fn cramer_solve(a: &Matrix, b: &Vector, ring: &Ring) -> Result<Vector, LabCryptoError> {
    let n = square_order(a)?;
    if b.len() != n {
        return Err(LabCryptoError::DimensionMismatch(format!(
            "Right-hand side length ({}) must match matrix order ({})",
            b.len(),
            n
        )));
    }

    let det = det_unchecked(a, n, ring);
    let det_inv = ring.inv(det)?;

    Ok((0..n)
        .map(|col| {
            let det_col = det_unchecked(&replace_column(a, col, b), n, ring);
            ring.mul(det_col, det_inv)
        })
        .collect())
}
