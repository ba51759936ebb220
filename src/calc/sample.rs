/// A maximal contiguous sequence of valid, in-range samples, rendered as
/// one continuous line segment. Always non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRun {
    pub points: Vec<(f64, f64)>,
}

impl SampleRun {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Walk the domain in `resolution` equal steps, evaluating `f` at each
/// sample. Undefined results and samples outside `y_range` close the
/// current run; runs never merge across a gap. This is what lets a curve
/// with vertical asymptotes or partial domains (tan, ln) render as
/// disjoint segments instead of spurious near-vertical connecting lines.
pub fn sample_runs<F>(
    f: F,
    domain: (f64, f64),
    y_range: (f64, f64),
    resolution: usize,
) -> Vec<SampleRun>
where
    F: Fn(f64) -> Option<f64>,
{
    let (x_min, x_max) = domain;
    let (y_min, y_max) = y_range;
    let steps = resolution.max(1);

    let mut runs = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();

    for i in 0..=steps {
        let x = x_min + (x_max - x_min) * i as f64 / steps as f64;
        match f(x) {
            Some(y) if y >= y_min && y <= y_max => current.push((x, y)),
            _ => {
                if !current.is_empty() {
                    runs.push(SampleRun {
                        points: std::mem::take(&mut current),
                    });
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(SampleRun { points: current });
    }
    runs
}
