use num::Float;

/// Similar to numpy.interp, for a single point
///
/// `coords` must be sorted by x. Inputs left of the first coordinate take its y,
/// inputs right of the last take the last y. Vertical segments (repeated x) resolve
/// to the right-hand value.
pub(crate) fn interp<F: Float>(x: F, coords: &[(F, F)]) -> F {
    let (Some(&(first_x, first_y)), Some(&(last_x, last_y))) = (coords.first(), coords.last()) else {
        return F::nan();
    };

    // Base cases
    if x <= first_x {
        return first_y;
    }
    if x >= last_x {
        return last_y;
    }

    for window in coords.windows(2) {
        let (x1, y1) = window[0];
        let (x2, y2) = window[1];

        // Actual interpolation
        if x1 <= x && x <= x2 {
            if x2 == x1 {
                return y2;
            }

            return y1 + (x - x1) * (y2 - y1) / (x2 - x1);
        }
    }

    // Only NaN inputs fall through
    F::nan()
}

#[test]
fn test_interp() {
    let x = [0., 1., 1.5, 2.72, 3.24];
    let coords = [(1., 3.), (2., 2.), (3., 0.)];

    assert_eq!(x.map(|x| interp(x, &coords)), [3., 3., 2.5, 0.5599999999999996, 0.]);

    let x = [2.5, -1., 7.5];
    let coords = [(0., 0.), (1., 2.), (2., 5.), (3., 3.), (4.5, 2.)];

    assert_eq!(x.map(|x| interp(x, &coords)), [4., 0., 2.]);
}

#[test]
fn test_interp_edge_cases() {
    assert!(interp(1.0f64, &[]).is_nan());
    assert!(interp(f64::NAN, &[(0., 0.), (1., 1.)]).is_nan());
    assert_eq!(interp(5., &[(0., 0.), (5., 1.), (5., 3.), (10., 3.)]), 1.);
    assert_eq!(interp(5.5, &[(0., 0.), (5., 1.), (5., 3.), (10., 3.)]), 3.);
}
