//! Can't find in std lib?

pub trait Average {
    type Result;
    fn average(self) -> Self::Result;
}

/// Arithmetic mean of two samples.
impl Average for (f64, f64) {
    type Result = f64;
    fn average(self) -> Self::Result {
        let (a, b) = self;
        (a + b) / 2.
    }
}

#[test]
fn t_average() {
    assert_eq!((20., 10.).average(), 15.);
    assert_eq!((10., 11.).average(), 10.5);
    assert_eq!((-1., 1.).average(), 0.);
}
