use anyhow::bail;

pub type Result<T> = anyhow::Result<T>;

pub type MatX3<T> = Vec<[T;3]>;  // Nx3 matrix
pub type Mat33<T> = [[T;3];3];   // 3x3 matrix
pub type Vec3<T>  = [T;3];


pub fn mat33_transpose(m: &Mat33<f64>) -> Mat33<f64> {
    let mut ret = [[0.0f64; 3]; 3];
    for i in 0 .. 3 {
        for j in 0 .. 3 {
            ret[i][j] = m[j][i];
        }
    }
    ret
}


pub fn mat33_det(m: &Mat33<f64>) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}


pub fn mat33_inv(m: &Mat33<f64>) -> Result<Mat33<f64>> {
    let det = mat33_det(m);
    if det.abs() < 1e-12 {
        bail!("Singular lattice matrix, cannot invert: {:?}", m);
    }
    let mut ret = [[0.0f64; 3]; 3];
    for i in 0 .. 3 {
        let (i1, i2) = ((i + 1) % 3, (i + 2) % 3);
        for j in 0 .. 3 {
            let (j1, j2) = ((j + 1) % 3, (j + 2) % 3);
            // Transposed cofactor, hence the swapped indexing.
            ret[i][j] = (m[j1][i1] * m[j2][i2] - m[j1][i2] * m[j2][i1]) / det;
        }
    }
    Ok(ret)
}


pub fn mat33_dot_vec3(m: &Mat33<f64>, v: &Vec3<f64>) -> Vec3<f64> {
    let mut ret = [0.0f64; 3];
    for (i, item) in ret.iter_mut().enumerate() {
        *item = m[i][0] * v[0] + m[i][1] * v[1] + m[i][2] * v[2];
    }
    ret
}


pub fn vec3_add(a: &Vec3<f64>, b: &Vec3<f64>) -> Vec3<f64> {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}


pub fn vec3_sub(a: &Vec3<f64>, b: &Vec3<f64>) -> Vec3<f64> {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}


pub fn vec3_scale(a: &Vec3<f64>, s: f64) -> Vec3<f64> {
    [a[0] * s, a[1] * s, a[2] * s]
}


pub fn vec3_dot(a: &Vec3<f64>, b: &Vec3<f64>) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}


pub fn vec3_cross(a: &Vec3<f64>, b: &Vec3<f64>) -> Vec3<f64> {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}


pub fn vec3_norm(a: &Vec3<f64>) -> f64 {
    vec3_dot(a, a).sqrt()
}


#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mat33_inv() {
        let eye: Mat33<f64> = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        assert_eq!(mat33_inv(&eye).unwrap(), eye);

        let m: Mat33<f64> = [[2.0, 0.0, 0.0], [0.0, 4.0, 0.0], [1.0, 0.0, 8.0]];
        let minv = mat33_inv(&m).unwrap();
        for i in 0 .. 3 {
            let col = [minv[0][i], minv[1][i], minv[2][i]];
            let row = mat33_dot_vec3(&m, &col);
            for (j, x) in row.iter().enumerate() {
                let expect = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(*x, expect, epsilon = 1e-12);
            }
        }

        let singular: Mat33<f64> = [[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 0.0, 1.0]];
        assert!(mat33_inv(&singular).is_err());
    }

    #[test]
    fn test_mat33_det() {
        let m: Mat33<f64> = [[2.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 4.0]];
        assert_abs_diff_eq!(mat33_det(&m), 24.0);
    }

    #[test]
    fn test_vec3_ops() {
        let a = [1.0, 0.0, 0.0];
        let b = [0.0, 1.0, 0.0];
        assert_eq!(vec3_cross(&a, &b), [0.0, 0.0, 1.0]);
        assert_abs_diff_eq!(vec3_dot(&a, &b), 0.0);
        assert_abs_diff_eq!(vec3_norm(&[3.0, 4.0, 0.0]), 5.0);
    }
}
