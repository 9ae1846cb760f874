/// Evenly spaced samples over a closed interval, computed like `numpy.linspace`.
#[derive(Clone, Debug)]
pub struct Linspace {
    start: f64,
    step: f64,
    index: usize,
    len: usize,
}

impl Linspace {
    pub fn new(min: f64, max: f64, n: usize) -> Self {
        let step = if n > 1 {
            // REVIEW: try_from instead of cast?
            let num_steps = (n - 1) as f64;
            (max - min) / num_steps
        } else {
            0.
        };
        Linspace {
            start: min,
            step,
            index: 0,
            len: n,
        }
    }
}

impl Iterator for Linspace {
    type Item = f64;

    #[inline]
    fn next(&mut self) -> Option<f64> {
        if self.index >= self.len {
            None
        } else {
            let i = self.index;
            self.index += 1;
            Some(self.start + self.step * i as f64)
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.len - self.index;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Linspace {}

#[test]
fn test_linspace() {
    let points: Vec<_> = Linspace::new(0., 200., 201).collect();

    assert_eq!(points.len(), 201);
    assert_eq!(points[0], 0.);
    assert_eq!(points[75], 75.);
    assert_eq!(points[200], 200.);

    let half: Vec<_> = Linspace::new(40., 41., 3).collect();

    assert_eq!(half, vec![40., 40.5, 41.]);
    assert_eq!(Linspace::new(1., 5., 1).collect::<Vec<_>>(), vec![1.]);
    assert_eq!(Linspace::new(1., 5., 0).len(), 0);
}
