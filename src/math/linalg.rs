/// Power iteration estimate of the dominant eigenvalue of a non-negative
/// square matrix. Callers check squareness; an empty matrix yields 0.
///
/// Iterates on `A + sI` with `s` the largest row sum. The shift keeps the
/// Perron root strictly dominant, so periodic matrices (eigenvalues spread
/// around the circle of radius rho, e.g. bipartite contact) still converge
/// instead of cycling.
pub fn spectral_radius(a: &[Vec<f64>], max_iter: usize, tol: f64) -> f64 {
    let n = a.len();
    if n == 0 { return 0.0; }

    let shift = a.iter().map(|row| row.iter().sum::<f64>()).fold(0.0, f64::max);
    if shift == 0.0 { return 0.0; }

    // Positive start vector so reducible non-negative matrices still converge
    let mut x = vec![1.0 / (n as f64).sqrt(); n];
    let mut y = vec![0.0; n];
    let mut lambda_old = 0.0;

    for _ in 0..max_iter {
        mat_vec(a, &x, &mut y);
        for i in 0..n { y[i] += shift * x[i]; }
        // Rayleigh quotient, x is unit length
        let lambda: f64 = y.iter().zip(&x).map(|(yi, xi)| yi * xi).sum();

        let norm = y.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm == 0.0 { return 0.0; }
        for i in 0..n { x[i] = y[i] / norm; }

        if (lambda - lambda_old).abs() <= tol * lambda.abs().max(1.0) {
            return (lambda - shift).max(0.0);
        }
        lambda_old = lambda;
    }
    (lambda_old - shift).max(0.0)
}

pub fn mat_vec(a: &[Vec<f64>], x: &[f64], out: &mut [f64]) {
    for (o, row) in out.iter_mut().zip(a) {
        *o = row.iter().zip(x).map(|(aij, xj)| aij * xj).sum();
    }
}
