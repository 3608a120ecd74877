/// Classical fixed-step RK4 for autonomous systems `y' = f(y)`.
///
/// Holds its stage buffers so a whole run steps without allocating.
pub struct Rk4 {
    k1: Vec<f64>,
    k2: Vec<f64>,
    k3: Vec<f64>,
    k4: Vec<f64>,
    ytmp: Vec<f64>,
}

impl Rk4 {
    pub fn new(n: usize) -> Self {
        Self {
            k1: vec![0.0; n],
            k2: vec![0.0; n],
            k3: vec![0.0; n],
            k4: vec![0.0; n],
            ytmp: vec![0.0; n],
        }
    }

    pub fn dim(&self) -> usize {
        self.k1.len()
    }

    /// Advance `y` by one step of size `dt`. `y.len()` must equal `dim()`.
    pub fn step<F>(&mut self, y: &mut [f64], dt: f64, mut f: F)
    where
        F: FnMut(&[f64], &mut [f64]),
    {
        let n = y.len();
        debug_assert_eq!(n, self.dim());
        let (k1, k2, k3, k4, ytmp) = (&mut self.k1, &mut self.k2, &mut self.k3, &mut self.k4, &mut self.ytmp);

        f(y, k1);

        for i in 0..n { ytmp[i] = y[i] + 0.5 * dt * k1[i]; }
        f(ytmp, k2);

        for i in 0..n { ytmp[i] = y[i] + 0.5 * dt * k2[i]; }
        f(ytmp, k3);

        for i in 0..n { ytmp[i] = y[i] + dt * k3[i]; }
        f(ytmp, k4);

        for i in 0..n {
            y[i] += (dt / 6.0) * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_decay_matches_closed_form() {
        let mut rk = Rk4::new(1);
        let mut y = [1.0];
        for _ in 0..40 {
            rk.step(&mut y, 0.25, |y, dy| dy[0] = -0.5 * y[0]);
        }
        let exact = (-0.5f64 * 10.0).exp();
        assert!((y[0] - exact).abs() < 1e-6, "y={} exact={}", y[0], exact);
    }

    #[test]
    fn linear_invariant_is_preserved() {
        // x -> y transfer keeps x + y constant
        let mut rk = Rk4::new(2);
        let mut y = [3.0, 1.0];
        for _ in 0..100 {
            rk.step(&mut y, 0.1, |y, dy| {
                dy[0] = -0.3 * y[0];
                dy[1] = 0.3 * y[0];
            });
        }
        assert!((y[0] + y[1] - 4.0).abs() < 1e-12);
    }
}
