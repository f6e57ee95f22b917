use num::Float;
use crate::OptError;




/**
 * @brief      Kreisselmeier-Steinhauser aggregate of g: a smooth upper bound
 *             on max(g),
 *
 * ```text
 *                 KS(g) = max(g) + ln(sum_i exp(rho (g_i - max(g)))) / rho
 *
 *             Larger rho gives a tighter but less smooth bound. Shifting by
 *             max(g) keeps the exponentials in (0, 1].
 * ```
 */
pub fn ks_aggregate<T: Float>(g: &[T], rho: T) -> Result<T, OptError> {
    if g.is_empty() {
        return Err(OptError::Aggregation("no values to aggregate".into()));
    }
    if !(rho.is_finite() && rho > T::zero()) {
        return Err(OptError::Aggregation("rho must be positive and finite".into()));
    }
    let max = g.iter().fold(T::neg_infinity(), |m, &x| m.max(x));
    let sum = g.iter().fold(T::zero(), |s, &x| s + (rho * (x - max)).exp());
    Ok(max + sum.ln() / rho)
}




// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn never_below_the_maximum() {
        let g = [0.12, 0.31, -0.4, 0.30, 0.305];
        for rho in [0.1, 1.0, 10.0, 1e4] {
            assert!(ks_aggregate(&g, rho).unwrap() >= 0.31);
        }
    }

    #[test]
    fn approaches_the_maximum_as_rho_grows() {
        let g = [1.0, 2.5, 2.0, -3.0];
        let gaps: Vec<f64> = [0.5, 1.0, 2.0, 10.0].iter().map(|&rho| ks_aggregate(&g, rho).unwrap() - 2.5).collect();
        assert!(gaps.windows(2).all(|w| w[1] < w[0]));
        assert!(ks_aggregate(&g, 1e4).unwrap() - 2.5 < 1e-8);
    }

    #[test]
    fn constant_vector_adds_log_n_over_rho() {
        let g = vec![0.7; 8];
        for rho in [0.5, 1.0, 30.0] {
            assert_relative_eq!(ks_aggregate(&g, rho).unwrap(), 0.7 + (8.0_f64).ln() / rho, epsilon = 1e-12);
        }
        assert_eq!(ks_aggregate(&[0.7], 1.0).unwrap(), 0.7);
    }

    #[test]
    fn large_rho_and_values_do_not_overflow() {
        let g = [1e3, 999.0, 998.0];
        let ks = ks_aggregate(&g, 1e4).unwrap();
        assert!(ks.is_finite());
        assert_relative_eq!(ks, 1e3, epsilon = 1e-9);
    }

    #[test]
    fn works_in_single_precision() {
        let ks = ks_aggregate(&[1.0_f32, 1.0], 1.0).unwrap();
        assert_relative_eq!(ks, 1.0 + 2.0_f32.ln(), epsilon = 1e-6);
    }

    #[test]
    fn rejects_empty_input_and_bad_rho() {
        assert!(ks_aggregate::<f64>(&[], 1.0).is_err());
        assert!(ks_aggregate(&[1.0], 0.0).is_err());
        assert!(ks_aggregate(&[1.0], -2.0).is_err());
        assert!(ks_aggregate(&[1.0], f64::INFINITY).is_err());
    }
}
