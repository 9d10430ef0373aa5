/// Computes the greatest common divisor of two numbers. The result is never negative.
pub fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        let temp = b;
        b = a % b;
        a = temp;
    }
    a.abs()
}

/// Finds (g, x, y) such that ax + by = g = gcd(a, b), with g >= 0.
///
/// Iterative form: keeps the two most recent remainders and their Bezout
/// coefficients instead of recursing.
pub fn extended_gcd(a: i64, b: i64) -> (i64, i64, i64) {
    let (mut old_r, mut r) = (a, b);
    let (mut old_x, mut x) = (1i64, 0i64);
    let (mut old_y, mut y) = (0i64, 1i64);

    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_x, x) = (x, old_x - q * x);
        (old_y, y) = (y, old_y - q * y);
    }

    if old_r < 0 {
        return (-old_r, -old_x, -old_y);
    }

    (old_r, old_x, old_y)
}
