use crate::{DistanceFunction, Primitive};

const EIGENVALUE_PRECISION: f64 = 1e-11;
const MAX_NEWTON_STEPS: usize = 50;
const ROOT_TOLERANCE: f64 = 1e-12;

/// Minimal root-mean-square deviation between two conformations.
///
/// Vectors are read as `dims / 3` atoms in atom-major order (`x0,y0,z0,x1,y1,z1,...`).
/// Both conformations are moved to their centroid and optimally rotated onto each
/// other using the quaternion characteristic polynomial (QCP) method. The largest
/// eigenvalue of the key matrix is found by Newton-Raphson iteration.
pub struct MinRmsdDistance;

impl<T: Primitive> DistanceFunction<T> for MinRmsdDistance {
    fn distance(&self, a: &[T], b: &[T]) -> T {
        let atoms = a.len() / 3;
        if atoms == 0 {
            return T::zero();
        }
        let a = centered(a);
        let b = centered(b);
        let rmsd = qcp_rmsd(&a, &b, atoms);
        T::from(rmsd).unwrap_or_else(T::nan)
    }
}

fn centered<T: Primitive>(coords: &[T]) -> Vec<[f64; 3]> {
    let mut atoms: Vec<[f64; 3]> = coords.chunks_exact(3)
        .map(|c| [
            c[0].to_f64().unwrap_or(f64::NAN),
            c[1].to_f64().unwrap_or(f64::NAN),
            c[2].to_f64().unwrap_or(f64::NAN),
        ])
        .collect();
    let n = atoms.len() as f64;
    let mut center = [0.0f64; 3];
    atoms.iter().for_each(|atom| (0..3).for_each(|i| center[i] += atom[i]));
    center.iter_mut().for_each(|c| *c /= n);
    atoms.iter_mut().for_each(|atom| (0..3).for_each(|i| atom[i] -= center[i]));
    atoms
}

fn qcp_rmsd(a: &[[f64; 3]], b: &[[f64; 3]], atoms: usize) -> f64 {
    let inner = |c: &[[f64; 3]]| -> f64 { c.iter().map(|v| v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sum() };
    let e0 = (inner(a) + inner(b)) * 0.5;

    // Cross-covariance s[i][j] = sum(a_i * b_j)
    let mut s = [[0.0f64; 3]; 3];
    a.iter().zip(b.iter()).for_each(|(va, vb)| {
        for i in 0..3 {
            for j in 0..3 {
                s[i][j] += va[i] * vb[j];
            }
        }
    });
    let [[sxx, sxy, sxz], [syx, syy, syz], [szx, szy, szz]] = s;

    let (sxx2, syy2, szz2) = (sxx * sxx, syy * syy, szz * szz);
    let (sxy2, syz2, sxz2) = (sxy * sxy, syz * syz, sxz * sxz);
    let (syx2, szy2, szx2) = (syx * syx, szy * szy, szx * szx);

    let syz_szy_m_syy_szz2 = 2.0 * (syz * szy - syy * szz);
    let sxx2_syy2_szz2_syz2_szy2 = syy2 + szz2 - sxx2 + syz2 + szy2;

    let c2 = -2.0 * (sxx2 + syy2 + szz2 + sxy2 + syx2 + sxz2 + szx2 + syz2 + szy2);
    let c1 = 8.0 * (sxx * syz * szy + syy * szx * sxz + szz * sxy * syx
        - sxx * syy * szz - syz * szx * sxy - szy * syx * sxz);

    let sxz_p_szx = sxz + szx;
    let syz_p_szy = syz + szy;
    let sxy_p_syx = sxy + syx;
    let syz_m_szy = syz - szy;
    let sxz_m_szx = sxz - szx;
    let sxy_m_syx = sxy - syx;
    let sxx_p_syy = sxx + syy;
    let sxx_m_syy = sxx - syy;
    let sxy2_sxz2_syx2_szx2 = sxy2 + sxz2 - syx2 - szx2;

    let c0 = sxy2_sxz2_syx2_szx2 * sxy2_sxz2_syx2_szx2
        + (sxx2_syy2_szz2_syz2_szy2 + syz_szy_m_syy_szz2) * (sxx2_syy2_szz2_syz2_szy2 - syz_szy_m_syy_szz2)
        + (-sxz_p_szx * syz_m_szy + sxy_m_syx * (sxx_m_syy - szz))
            * (-sxz_m_szx * syz_p_szy + sxy_m_syx * (sxx_m_syy + szz))
        + (-sxz_p_szx * syz_p_szy - sxy_p_syx * (sxx_p_syy - szz))
            * (-sxz_m_szx * syz_m_szy - sxy_p_syx * (sxx_p_syy + szz))
        + (sxy_p_syx * syz_p_szy + sxz_p_szx * (sxx_m_syy + szz))
            * (-sxy_m_syx * syz_m_szy + sxz_p_szx * (sxx_p_syy + szz))
        + (sxy_p_syx * syz_m_szy + sxz_m_szx * (sxx_m_syy - szz))
            * (-sxy_m_syx * syz_p_szy + sxz_m_szx * (sxx_p_syy - szz));

    // e0 bounds the largest root from above; if it is a root already, the conformations superpose exactly.
    // Must be caught before Newton, which is unstable on the double roots of linear structures.
    let p_e0 = ((e0 * e0 + c2) * e0 + c1) * e0 + c0;
    if p_e0.abs() <= ROOT_TOLERANCE * e0 * e0 * e0 * e0 {
        return 0.0;
    }

    // Newton-Raphson for the largest root, starting from the upper bound e0
    let mut eigenvalue = e0;
    for _ in 0..MAX_NEWTON_STEPS {
        let previous = eigenvalue;
        let x2 = eigenvalue * eigenvalue;
        let b = (x2 + c2) * eigenvalue;
        let a = b + c1;
        let denominator = 2.0 * x2 * eigenvalue + b + a;
        if denominator == 0.0 {
            break;
        }
        eigenvalue -= (a * eigenvalue + c0) / denominator;
        if (eigenvalue - previous).abs() < (EIGENVALUE_PRECISION * eigenvalue).abs() {
            break;
        }
    }

    (2.0 * (e0 - eigenvalue.min(e0)) / atoms as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TETRAHEDRON: [f64; 12] = [
        0.0, 0.0, 0.0,
        1.0, 0.0, 0.0,
        0.0, 2.0, 0.0,
        0.0, 0.0, 3.0,
    ];

    #[test]
    fn identical_conformations() {
        assert_approx_eq!(MinRmsdDistance.distance(&TETRAHEDRON, &TETRAHEDRON), 0.0, 1e-6);
    }

    #[test]
    fn invariant_under_rotation_and_translation() {
        // 90 degree rotation around z: (x, y, z) -> (-y, x, z), then shifted
        let moved: Vec<f64> = TETRAHEDRON.chunks_exact(3)
            .flat_map(|c| [-c[1] + 5.0, c[0] - 2.0, c[2] + 0.5])
            .collect();
        assert_approx_eq!(MinRmsdDistance.distance(&TETRAHEDRON, &moved), 0.0, 1e-5);
        assert_approx_eq!(MinRmsdDistance.distance(&moved, &TETRAHEDRON), 0.0, 1e-5);
    }

    #[test]
    fn stretched_pair() {
        // Centered: (+-0.5, 0, 0) vs (+-1, 0, 0) -> every atom is off by 0.5
        let a = [0.0f64, 0.0, 0.0, 1.0, 0.0, 0.0];
        let b = [0.0f64, 0.0, 0.0, 2.0, 0.0, 0.0];
        assert_approx_eq!(MinRmsdDistance.distance(&a, &b), 0.5, 1e-6);
    }

    #[test]
    fn linear_conformations() {
        // Two atoms, same bond length, different orientation: a degenerate largest root
        let a = [0.0f64, 0.0, 0.0, 1.0, 0.0, 0.0];
        let b = [5.0f64, 5.0, 5.0, 5.0, 6.0, 5.0];
        assert_approx_eq!(MinRmsdDistance.distance(&a, &b), 0.0, 1e-6);
        assert_approx_eq!(MinRmsdDistance.distance(&a, &a), 0.0, 1e-6);
    }

    #[test]
    fn works_for_f32() {
        let a: Vec<f32> = TETRAHEDRON.iter().map(|&v| v as f32).collect();
        let b: Vec<f32> = a.iter().map(|&v| v + 3.0).collect();
        assert_approx_eq!(MinRmsdDistance.distance(&a, &b), 0.0f32, 1e-3);
    }
}
